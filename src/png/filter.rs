use super::*;

/// Makes the filtered image data for a pixel buffer.
///
/// Every row gets filter type 0 (None): a `0` byte followed by the row's
/// samples unchanged. No other filter is ever picked, so the output (and the
/// compressed size) only depends on the pixels.
#[must_use]
pub fn filter_scanlines(buffer: &PixelBuffer) -> Vec<u8> {
  let mut out = Vec::with_capacity((buffer.stride() + 1) * buffer.height() as usize);
  for row in buffer.rows() {
    out.push(FilterType::None as u8);
    out.extend_from_slice(row);
  }
  out
}

#[test]
fn test_filter_scanlines_none_everywhere() {
  let buffer =
    PixelBuffer::from_samples(2, 2, Channels::Grey, alloc::vec![1, 2, 3, 4]).unwrap();
  assert_eq!(filter_scanlines(&buffer), [0, 1, 2, 0, 3, 4]);
}

#[test]
fn test_filter_then_reconstruct() {
  let buffer =
    PixelBuffer::from_samples(1, 2, Channels::Rgb, alloc::vec![9, 8, 7, 6, 5, 4]).unwrap();
  let header = ImageHeader::for_buffer(&buffer);
  assert_eq!(reconstruct_scanlines(&header, &filter_scanlines(&buffer)), Ok(buffer));
}
