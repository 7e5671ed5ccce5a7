//! Reconstruction of filtered scanlines.
//!
//! From the PNG spec:
//!
//! > Filters are applied to **bytes**, not to pixels, regardless of the bit
//! > depth or color type of the image.
//!
//! Each scanline starts with a filter type byte. Every other byte `x` of the
//! line was stored as a delta from some combination of its already
//! reconstructed neighbors:
//!
//! ```text
//! c b
//! a x
//! ```
//!
//! `a` is the same channel of the pixel to the left, `b` the byte directly
//! above, `c` the same channel of the pixel above and to the left. Neighbors
//! outside the image count as 0.

use super::*;

use log::trace;

/// A per-scanline filter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FilterType {
  None = 0,
  Sub = 1,
  Up = 2,
  Average = 3,
  Paeth = 4,
}
impl TryFrom<u8> for FilterType {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => Self::None,
      1 => Self::Sub,
      2 => Self::Up,
      3 => Self::Average,
      4 => Self::Paeth,
      _ => return Err(PngError::UnknownFilterType(value)),
    })
  }
}

/// Reconstructed `a`: the same channel one pixel to the left, or 0 in the
/// first pixel of a row.
#[inline]
#[must_use]
pub fn recon_a(recon: &[u8], stride: usize, bpp: usize, row: usize, col: usize) -> u8 {
  if col >= bpp {
    recon[row * stride + col - bpp]
  } else {
    0
  }
}

/// Reconstructed `b`: the byte directly above, or 0 in the first row.
#[inline]
#[must_use]
pub fn recon_b(recon: &[u8], stride: usize, row: usize, col: usize) -> u8 {
  if row > 0 {
    recon[(row - 1) * stride + col]
  } else {
    0
  }
}

/// Reconstructed `c`: the same channel one pixel up and to the left, or 0 if
/// that's outside the image.
#[inline]
#[must_use]
pub fn recon_c(recon: &[u8], stride: usize, bpp: usize, row: usize, col: usize) -> u8 {
  if row > 0 && col >= bpp {
    recon[(row - 1) * stride + col - bpp]
  } else {
    0
  }
}

/// The Paeth filter function computes a simple linear function of the three
/// neighboring bytes (left `a`, above `b`, upper left `c`).
///
/// The output is whichever neighbor is closest to `a + b - c`.
#[inline]
#[must_use]
pub const fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
  // The PNG spec says "The calculations within the PaethPredictor function
  // shall be performed exactly, without overflow.", so this is i32 math.
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  // The order of these tests decides ties, it must not change.
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

/// Reconstructs one byte given its filtered value and reconstructed
/// neighbors. All additions wrap at 256.
#[inline]
#[must_use]
pub const fn reconstruct_byte(filter: FilterType, x: u8, a: u8, b: u8, c: u8) -> u8 {
  match filter {
    FilterType::None => x,
    FilterType::Sub => x.wrapping_add(a),
    FilterType::Up => x.wrapping_add(b),
    // the sum of two bytes can exceed a byte, so average in u16
    FilterType::Average => x.wrapping_add(((a as u16 + b as u16) / 2) as u8),
    FilterType::Paeth => x.wrapping_add(paeth_predictor(a, b, c)),
  }
}

/// Turns decompressed, filtered image data into a pixel buffer.
///
/// `filtered` must hold at least `header.filtered_len()` bytes: for each row a
/// filter type byte and then `stride` filtered bytes. Bytes past that are
/// ignored.
///
/// ## Failure
/// * `TruncatedStream` if `filtered` is too short.
/// * `UnknownFilterType` if a row's filter byte isn't 0 through 4.
pub fn reconstruct_scanlines(header: &ImageHeader, filtered: &[u8]) -> PngResult<PixelBuffer> {
  let channels = header.channels()?;
  let bpp = channels.count();
  let stride = header.stride()?;
  let needed = header.filtered_len()?;
  if filtered.len() < needed {
    return Err(PngError::TruncatedStream);
  }
  if filtered.len() > needed {
    trace!("ignoring {} bytes past the end of the image data", filtered.len() - needed);
  }

  let mut buffer = PixelBuffer::new(header.width, header.height, channels)?;
  let recon = buffer.samples_mut();
  // rows are processed top to bottom and bytes left to right, so every
  // neighbor that's read has already been written.
  for (row, line) in filtered[..needed].chunks_exact(stride + 1).enumerate() {
    let (&filter_byte, line) = match line.split_first() {
      Some(split) => split,
      None => return Err(PngError::TruncatedStream),
    };
    let filter = FilterType::try_from(filter_byte)?;
    trace!("row {row}: {filter:?}");
    for (col, &x) in line.iter().enumerate() {
      let a = recon_a(recon, stride, bpp, row, col);
      let b = recon_b(recon, stride, row, col);
      let c = recon_c(recon, stride, bpp, row, col);
      recon[row * stride + col] = reconstruct_byte(filter, x, a, b, c);
    }
  }
  Ok(buffer)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn header(width: u32, height: u32, color_type: PngColorType) -> ImageHeader {
    ImageHeader {
      width,
      height,
      bit_depth: 8,
      color_type,
      compression_method: 0,
      filter_method: 0,
      interlace_method: 0,
    }
  }

  #[test]
  fn test_paeth_predictor_ties() {
    // all equal distances: a wins
    assert_eq!(paeth_predictor(0, 0, 0), 0);
    assert_eq!(paeth_predictor(5, 5, 5), 5);
    // p = 10 + 20 - 10 = 20: b is exact
    assert_eq!(paeth_predictor(10, 20, 10), 20);
    // p = 10 + 20 - 20 = 10: a is exact
    assert_eq!(paeth_predictor(10, 20, 20), 10);
    // p = 100 + 100 - 250 = -50: pa = pb = 150, pc = 300, a wins the tie
    assert_eq!(paeth_predictor(100, 100, 250), 100);
    // p = 50 + 200 - 100 = 150: pa = 100, pb = 50, pc = 50, b wins the tie
    assert_eq!(paeth_predictor(50, 200, 100), 200);
    // p = 200 + 10 - 120 = 90: pa = 110, pb = 80, pc = 30, c
    assert_eq!(paeth_predictor(200, 10, 120), 120);
  }

  #[test]
  fn test_filter_type_try_from() {
    assert_eq!(FilterType::try_from(4), Ok(FilterType::Paeth));
    assert_eq!(FilterType::try_from(5), Err(PngError::UnknownFilterType(5)));
    assert_eq!(FilterType::try_from(255), Err(PngError::UnknownFilterType(255)));
  }

  #[test]
  fn test_none_filter_single_row() {
    let h = header(3, 1, PngColorType::RGB);
    let filtered = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
    let buffer = reconstruct_scanlines(&h, &filtered).unwrap();
    assert_eq!(buffer.samples(), &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
  }

  #[test]
  fn test_sub_wraps_around() {
    let h = header(2, 1, PngColorType::Y);
    let buffer = reconstruct_scanlines(&h, &[1, 100, 200]).unwrap();
    assert_eq!(buffer.samples(), &[100, 44]);
  }

  #[test]
  fn test_sub_uses_pixel_to_the_left() {
    // with 3 channels, `a` is 3 bytes back, not 1
    let h = header(2, 1, PngColorType::RGB);
    let buffer = reconstruct_scanlines(&h, &[1, 10, 20, 30, 1, 2, 3]).unwrap();
    assert_eq!(buffer.samples(), &[10, 20, 30, 11, 22, 33]);
  }

  #[test]
  fn test_up_and_average() {
    let h = header(2, 2, PngColorType::Y);
    #[rustfmt::skip]
    let filtered = [
      0, 100, 250,
      2, 10, 10,
    ];
    let up = reconstruct_scanlines(&h, &filtered).unwrap();
    assert_eq!(up.samples(), &[100, 250, 110, 4]);

    #[rustfmt::skip]
    let filtered = [
      3, 100, 250,
      3, 10, 10,
    ];
    // row 0: 100, 250 + 100/2 = 300 -> 44
    // row 1: 10 + 100/2 = 60, 10 + (60 + 44)/2 = 62
    let avg = reconstruct_scanlines(&h, &filtered).unwrap();
    assert_eq!(avg.samples(), &[100, 44, 60, 62]);
  }

  #[test]
  fn test_average_sum_does_not_overflow() {
    let h = header(2, 2, PngColorType::Y);
    let filtered = [0, 200, 200, 3, 56, 0];
    let buffer = reconstruct_scanlines(&h, &filtered).unwrap();
    // row 1: 56 + 200/2 = 156, then 0 + (156 + 200)/2 = 178 (not 50)
    assert_eq!(buffer.samples(), &[200, 200, 156, 178]);
  }

  #[test]
  fn test_paeth_on_edges_is_plain() {
    // row 0 and column 0 always predict 0 or the only available neighbor,
    // so a single pixel is just the filtered value.
    let h = header(1, 1, PngColorType::RGB);
    let buffer = reconstruct_scanlines(&h, &[4, 7, 8, 9]).unwrap();
    assert_eq!(buffer.samples(), &[7, 8, 9]);
    // on row 0, b = c = 0 so paeth picks a and behaves like Sub
    let h = header(3, 1, PngColorType::Y);
    let buffer = reconstruct_scanlines(&h, &[4, 7, 1, 1]).unwrap();
    assert_eq!(buffer.samples(), &[7, 8, 9]);
  }

  #[test]
  fn test_paeth_full() {
    let h = header(2, 2, PngColorType::Y);
    #[rustfmt::skip]
    let filtered = [
      0, 10, 20,
      4, 5, 3,
    ];
    // (1,0): a=0 b=10 c=0 -> p=10, pa=10 pb=0 pc=10 -> b: 5+10 = 15
    // (1,1): a=15 b=20 c=10 -> p=25, pa=10 pb=5 pc=15 -> b: 3+20 = 23
    let buffer = reconstruct_scanlines(&h, &filtered).unwrap();
    assert_eq!(buffer.samples(), &[10, 20, 15, 23]);
  }

  #[test]
  fn test_unknown_filter_is_an_error() {
    let h = header(1, 2, PngColorType::Y);
    assert_eq!(reconstruct_scanlines(&h, &[0, 1, 5, 1]), Err(PngError::UnknownFilterType(5)));
  }

  #[test]
  fn test_short_and_long_input() {
    let h = header(2, 2, PngColorType::Y);
    assert_eq!(reconstruct_scanlines(&h, &[0, 1, 2, 0, 3]), Err(PngError::TruncatedStream));
    let buffer = reconstruct_scanlines(&h, &[0, 1, 2, 0, 3, 4, 99, 99]).unwrap();
    assert_eq!(buffer.samples(), &[1, 2, 3, 4]);
  }

  #[test]
  fn test_neighbor_lookups() {
    // 2 pixels of 1 byte, 2 rows
    let recon = [1, 2, 3, 4];
    assert_eq!(recon_a(&recon, 2, 1, 0, 0), 0);
    assert_eq!(recon_a(&recon, 2, 1, 1, 1), 3);
    assert_eq!(recon_b(&recon, 2, 0, 1), 0);
    assert_eq!(recon_b(&recon, 2, 1, 1), 2);
    assert_eq!(recon_c(&recon, 2, 1, 1, 0), 0);
    assert_eq!(recon_c(&recon, 2, 1, 1, 1), 1);
  }
}
