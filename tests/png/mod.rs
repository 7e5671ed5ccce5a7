use plainpng::{png::*, *};
use walkdir::WalkDir;

/// The fixtures are filled with this pattern, and each one stores its rows
/// with a different mix of filter types.
fn fixture_sample(x: usize, y: usize, ch: usize) -> u8 {
  ((x * 37 + y * 91 + ch * 53 + x * y * 13) % 256) as u8
}

fn check_fixture(bytes: &[u8], width: u32, height: u32, channels: Channels) {
  let buffer = decode_png(bytes).unwrap();
  assert_eq!((buffer.width(), buffer.height()), (width, height));
  assert_eq!(buffer.channels(), channels);
  for y in 0..height {
    for x in 0..width {
      let pixel = buffer.pixel(x, y).unwrap();
      for (ch, sample) in pixel.iter().enumerate() {
        assert_eq!(*sample, fixture_sample(x as usize, y as usize, ch), "x:{x} y:{y} ch:{ch}");
      }
    }
  }
}

#[test]
fn test_fixture_rgb_all_filters() {
  // rows use None, Sub, Up, Average, Paeth, with a tEXt chunk and three IDATs
  check_fixture(include_bytes!("rgb_all_filters_7x5.png"), 7, 5, Channels::Rgb);
}

#[test]
fn test_fixture_grey_paeth() {
  check_fixture(include_bytes!("grey_paeth_9x6.png"), 9, 6, Channels::Grey);
}

#[test]
fn test_fixture_grey_average_up() {
  check_fixture(include_bytes!("grey_average_up_4x4.png"), 4, 4, Channels::Grey);
}

#[test]
fn test_fixture_rgb_sub_1x1() {
  check_fixture(include_bytes!("rgb_sub_1x1.png"), 1, 1, Channels::Rgb);
}

#[test]
fn test_all_png_files_decode() {
  let mut count = 0;
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    if entry.path().extension().and_then(|ext| ext.to_str()) != Some("png") {
      continue;
    }
    let bytes = std::fs::read(entry.path()).unwrap();
    let buffer = decode_png(&bytes).unwrap_or_else(|e| panic!("{}: {e}", entry.path().display()));
    // a decoded image encodes and decodes to itself
    assert_eq!(decode_png(&encode_png(&buffer)).unwrap(), buffer);
    count += 1;
  }
  assert!(count >= 4);
}

#[test]
fn test_ChunkReader_no_panics() {
  // iter ALL files in the test folder, even non-png files shouldn't panic it.
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    let v = match std::fs::read(entry.path()) {
      Ok(v) => v,
      Err(e) => {
        println!("Error reading file: {e:?}");
        continue;
      }
    };
    for _ in ChunkReader::new(&v) {
      //
    }
    let _ = decode_png(&v);
  }
  // even totally random data should never panic the reader or the decoder!
  for _ in 0..10 {
    let mut v = super::rand_bytes(1024);
    for _ in ChunkReader::new(&v) {
      //
    }
    let _ = decode_png(&v);
    v[..8].copy_from_slice(&PNG_SIGNATURE);
    let _ = decode_png(&v);
  }
}

#[test]
fn test_random_round_trips() {
  for (width, height) in [(1, 1), (1, 7), (7, 1), (13, 9), (64, 3)] {
    for channels in [Channels::Grey, Channels::Rgb] {
      let samples = super::rand_bytes(width as usize * height as usize * channels.count());
      let buffer = PixelBuffer::from_samples(width, height, channels, samples).unwrap();
      let png = encode_png(&buffer);
      assert_eq!(decode_png(&png).unwrap(), buffer, "{width}x{height} {channels:?}");
    }
  }
}

#[test]
fn test_rgb_greyscale_conversions_through_png() {
  let bytes = include_bytes!("rgb_all_filters_7x5.png");
  let rgb = decode_png(bytes).unwrap();
  let grey = to_greyscale(&rgb);
  let grey_again = decode_png(&encode_png(&grey)).unwrap();
  assert_eq!(grey_again, grey);
  assert_eq!(grey_again.pixel(3, 2), Some(&[fixture_sample(3, 2, 0)][..]));
  assert_ne!(to_rgb(&grey_again), rgb);
}
