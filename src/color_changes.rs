#![forbid(unsafe_code)]

//! Conversions between greyscale and RGB pixel buffers.
//!
//! These are plain channel shuffles. Going from RGB to greyscale keeps only the
//! red channel, it does *not* compute a weighted luminance, so converting to
//! greyscale and back is lossy whenever green or blue differ from red.

use alloc::vec::Vec;

use crate::image::{Channels, PixelBuffer};

/// Makes a 1-channel buffer from the red sample of each RGB pixel.
///
/// A buffer that's already greyscale is returned as a copy.
#[must_use]
pub fn to_greyscale(buffer: &PixelBuffer) -> PixelBuffer {
  match buffer.rgb_pixels() {
    Some(pixels) => {
      let samples: Vec<u8> = pixels.iter().map(|[r, _g, _b]| *r).collect();
      rebuild(buffer, Channels::Grey, samples)
    }
    None => buffer.clone(),
  }
}

/// Makes a 3-channel buffer by copying each greyscale sample into red, green,
/// and blue.
///
/// A buffer that's already RGB is returned as a copy.
#[must_use]
pub fn to_rgb(buffer: &PixelBuffer) -> PixelBuffer {
  match buffer.channels() {
    Channels::Grey => {
      let samples: Vec<u8> = buffer.samples().iter().flat_map(|&y| [y, y, y]).collect();
      rebuild(buffer, Channels::Rgb, samples)
    }
    Channels::Rgb => buffer.clone(),
  }
}

fn rebuild(source: &PixelBuffer, channels: Channels, samples: Vec<u8>) -> PixelBuffer {
  // the source already proved that its pixel count fits, and the sample count
  // comes straight from that pixel count.
  match PixelBuffer::from_samples(source.width(), source.height(), channels, samples) {
    Ok(buffer) => buffer,
    Err(_) => unreachable!("converted sample count always matches the dimensions"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rgb_2x1() -> PixelBuffer {
    PixelBuffer::from_samples(2, 1, Channels::Rgb, alloc::vec![10, 20, 30, 40, 50, 60]).unwrap()
  }

  #[test]
  fn test_to_greyscale_takes_red() {
    let grey = to_greyscale(&rgb_2x1());
    assert_eq!(grey.channels(), Channels::Grey);
    assert_eq!(grey.samples(), &[10, 40]);
  }

  #[test]
  fn test_to_rgb_replicates() {
    let grey = PixelBuffer::from_samples(1, 2, Channels::Grey, alloc::vec![7, 200]).unwrap();
    let rgb = to_rgb(&grey);
    assert_eq!(rgb.channels(), Channels::Rgb);
    assert_eq!((rgb.width(), rgb.height()), (1, 2));
    assert_eq!(rgb.samples(), &[7, 7, 7, 200, 200, 200]);
  }

  #[test]
  fn test_greyscale_round_trip_is_lossy() {
    let original = rgb_2x1();
    assert_ne!(to_rgb(&to_greyscale(&original)), original);
  }

  #[test]
  fn test_same_channel_conversions_copy() {
    let original = rgb_2x1();
    assert_eq!(to_rgb(&original), original);
    let grey = to_greyscale(&original);
    assert_eq!(to_greyscale(&grey), grey);
  }
}
