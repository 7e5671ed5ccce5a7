#![forbid(unsafe_code)]

//! Provides the heap-allocated pixel buffer type.

use alloc::vec::Vec;

use crate::{PngError, PngResult};

/// Converts an `(x,y)` position within a given `width` 2D space into a linear
/// pixel index.
///
/// Multiply by the channel count to get the first sample's offset.
#[inline]
#[must_use]
pub const fn xy_width_to_index(x: u32, y: u32, width: u32) -> usize {
  (y as usize) * (width as usize) + (x as usize)
}

/// How many 8-bit samples make up each pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Channels {
  /// One greyscale sample.
  Grey = 1,
  /// Red, green, and blue samples, in that order.
  Rgb = 3,
}
impl Channels {
  /// The number of samples per pixel.
  #[inline]
  #[must_use]
  pub const fn count(self) -> usize {
    self as usize
  }
}

/// A rectangular grid of 8-bit samples, stored row-major.
///
/// Each row is `stride() == width * channels` bytes, with the samples of each
/// pixel next to each other. The fields are private so that the sample vector
/// always matches the dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PixelBuffer {
  width: u32,
  height: u32,
  channels: Channels,
  samples: Vec<u8>,
}
impl PixelBuffer {
  /// Makes a buffer with every sample set to 0.
  ///
  /// ## Failure
  /// * `WidthOrHeightZero` if either dimension is 0.
  /// * If `height * width * channels` doesn't fit in a `usize`.
  pub fn new(width: u32, height: u32, channels: Channels) -> PngResult<Self> {
    let len = sample_count(width, height, channels)?;
    Ok(Self { width, height, channels, samples: alloc::vec![0; len] })
  }

  /// Wraps an existing sample vector.
  ///
  /// ## Failure
  /// * `WidthOrHeightZero` if either dimension is 0.
  /// * `BufferSizeMismatch` if `samples.len()` isn't exactly
  ///   `height * width * channels`.
  pub fn from_samples(
    width: u32, height: u32, channels: Channels, samples: Vec<u8>,
  ) -> PngResult<Self> {
    if sample_count(width, height, channels)? != samples.len() {
      return Err(PngError::BufferSizeMismatch);
    }
    Ok(Self { width, height, channels, samples })
  }

  /// Width in pixels.
  #[inline]
  #[must_use]
  pub const fn width(&self) -> u32 {
    self.width
  }

  /// Height in pixels.
  #[inline]
  #[must_use]
  pub const fn height(&self) -> u32 {
    self.height
  }

  #[inline]
  #[must_use]
  pub const fn channels(&self) -> Channels {
    self.channels
  }

  /// Bytes per row.
  #[inline]
  #[must_use]
  pub const fn stride(&self) -> usize {
    (self.width as usize) * self.channels.count()
  }

  /// All samples, row-major.
  #[inline]
  #[must_use]
  pub fn samples(&self) -> &[u8] {
    &self.samples
  }

  #[inline]
  pub(crate) fn samples_mut(&mut self) -> &mut [u8] {
    &mut self.samples
  }

  /// Unwraps the buffer into its sample vector.
  #[inline]
  #[must_use]
  pub fn into_samples(self) -> Vec<u8> {
    self.samples
  }

  /// Gets a row of samples, or `None` if `y` is out of bounds.
  #[inline]
  #[must_use]
  pub fn row(&self, y: u32) -> Option<&[u8]> {
    if y < self.height {
      let stride = self.stride();
      let start = (y as usize) * stride;
      self.samples.get(start..start + stride)
    } else {
      None
    }
  }

  /// Iterates the rows from top to bottom.
  #[inline]
  pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
    let stride = self.stride();
    (0..self.height as usize).map(move |y| &self.samples[y * stride..(y + 1) * stride])
  }

  /// Gets the samples of the pixel at the position, or `None` if the position
  /// is out of bounds.
  #[inline]
  #[must_use]
  pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
    if x < self.width && y < self.height {
      let c = self.channels.count();
      let i = xy_width_to_index(x, y, self.width) * c;
      self.samples.get(i..i + c)
    } else {
      None
    }
  }

  /// Gets the samples of the pixel at the position mutably, or `None` if the
  /// position is out of bounds.
  #[inline]
  #[must_use]
  pub fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8]> {
    if x < self.width && y < self.height {
      let c = self.channels.count();
      let i = xy_width_to_index(x, y, self.width) * c;
      self.samples.get_mut(i..i + c)
    } else {
      None
    }
  }

  /// Views an RGB buffer as `[r, g, b]` pixels.
  ///
  /// Greyscale buffers give `None`.
  #[inline]
  #[must_use]
  pub fn rgb_pixels(&self) -> Option<&[[u8; 3]]> {
    match self.channels {
      Channels::Rgb => Some(bytemuck::cast_slice(&self.samples)),
      Channels::Grey => None,
    }
  }
}

fn sample_count(width: u32, height: u32, channels: Channels) -> PngResult<usize> {
  if width == 0 || height == 0 {
    return Err(PngError::WidthOrHeightZero);
  }
  usize::try_from(width)?
    .checked_mul(channels.count())
    .and_then(|stride| stride.checked_mul(height as usize))
    .ok_or(PngError::CheckedMath)
}

#[test]
fn test_pixel_buffer_layout() {
  let samples = alloc::vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
  let buffer = PixelBuffer::from_samples(2, 2, Channels::Rgb, samples).unwrap();
  assert_eq!(buffer.stride(), 6);
  assert_eq!(buffer.row(1), Some(&[7, 8, 9, 10, 11, 12][..]));
  assert_eq!(buffer.row(2), None);
  assert_eq!(buffer.pixel(1, 0), Some(&[4, 5, 6][..]));
  assert_eq!(buffer.pixel(2, 0), None);
  assert_eq!(buffer.rgb_pixels().unwrap()[3], [10, 11, 12]);
  assert_eq!(buffer.rows().count(), 2);
}

#[test]
fn test_pixel_buffer_size_mismatch() {
  assert_eq!(
    PixelBuffer::from_samples(2, 2, Channels::Grey, alloc::vec![0; 5]),
    Err(PngError::BufferSizeMismatch)
  );
  let mut buffer = PixelBuffer::new(3, 1, Channels::Grey).unwrap();
  buffer.pixel_mut(2, 0).unwrap()[0] = 9;
  assert_eq!(buffer.samples(), &[0, 0, 9]);
  assert!(buffer.rgb_pixels().is_none());
}

#[test]
fn test_pixel_buffer_rejects_zero_size() {
  for (width, height) in [(0, 3), (3, 0), (0, 0)] {
    assert_eq!(PixelBuffer::new(width, height, Channels::Rgb), Err(PngError::WidthOrHeightZero));
    assert_eq!(
      PixelBuffer::from_samples(width, height, Channels::Grey, Vec::new()),
      Err(PngError::WidthOrHeightZero)
    );
  }
}
