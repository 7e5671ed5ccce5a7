use core::num::TryFromIntError;

use crate::png::PngColorType;

/// An error from the `plainpng` crate.
///
/// Every error is terminal for the decode or encode call that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum PngError {
  /// The first 8 bytes aren't the PNG signature.
  #[error("not a png file: the signature bytes are wrong")]
  InvalidSignature,

  /// The data ended before a chunk, the chunk sequence, or the image data was
  /// complete.
  #[error("the png data stream ended early")]
  TruncatedStream,

  /// The header uses a color type that's valid PNG but isn't supported here.
  #[error("unsupported color type: {}", .0.name())]
  UnsupportedColorType(PngColorType),

  /// The header uses a bit depth other than 8.
  #[error("the only bit depth supported is 8, bit depth in image is {0}")]
  UnsupportedBitDepth(u8),

  /// A scanline starts with a filter type byte other than 0 through 4.
  #[error("unknown filter type: {0}")]
  UnknownFilterType(u8),

  /// The zlib codec failed. Holds the raw `TINFLStatus` code.
  #[error("zlib decompression failed with status {0}")]
  Compression(i8),

  /// The first chunk after the signature isn't `IHDR`.
  #[error("the first chunk is not IHDR")]
  FirstChunkNotIhdr,

  /// The `IHDR` payload isn't 13 bytes.
  #[error("IHDR payload must be 13 bytes, found {0}")]
  IllegalHeaderLength(usize),

  /// The color type byte isn't any PNG color type.
  #[error("illegal color type: {0}")]
  IllegalColorType(u8),

  /// The compression method byte isn't 0.
  #[error("illegal compression method: {0}")]
  IllegalCompressionMethod(u8),

  /// The filter method byte isn't 0.
  #[error("illegal filter method: {0}")]
  IllegalFilterMethod(u8),

  /// The image is interlaced.
  #[error("interlaced images are not supported")]
  InterlaceNotSupported,

  /// The declared width and/or height of this image is 0.
  #[error("image width or height is 0")]
  WidthOrHeightZero,

  /// A checked math operation failed.
  #[error("image dimensions overflow the address space")]
  CheckedMath,

  /// A sample vector doesn't match the `width * height * channels` it was
  /// paired with.
  #[error("sample count does not match the buffer dimensions")]
  BufferSizeMismatch,
}

/// Shorthand for results with a [`PngError`].
pub type PngResult<T> = Result<T, PngError>;

impl From<TryFromIntError> for PngError {
  #[inline]
  fn from(_: TryFromIntError) -> Self {
    Self::CheckedMath
  }
}

#[cfg(feature = "miniz_oxide")]
impl From<miniz_oxide::inflate::TINFLStatus> for PngError {
  #[inline]
  fn from(status: miniz_oxide::inflate::TINFLStatus) -> Self {
    Self::Compression(status as i8)
  }
}
