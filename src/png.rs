#![forbid(unsafe_code)]

//! Module for working with PNG data.
//!
//! * [Portable Network Graphics Specification (Second Edition)][png-spec]
//!
//! [png-spec]: https://www.w3.org/TR/2003/REC-PNG-20031110/
//!
//! ## What's Supported
//!
//! Only a small part of PNG is handled: 8 bits per sample, greyscale or RGB,
//! not interlaced. Everything else is rejected with a specific [`PngError`]
//! instead of being decoded badly.
//!
//! This module does *not* attempt "stream" decoding. The whole PNG is a single
//! byte slice, and all of the compressed image data is gathered up before it's
//! decompressed.
//!
//! ## Automatic Decoding and Encoding
//!
//! Call [`decode_png`] or [`encode_png`]. These require the `miniz_oxide`
//! crate feature (on by default).
//!
//! ## Manual Decoding
//!
//! If you'd rather use some other zlib implementation:
//!
//! 1) Call [`read_header`] to check the signature and get the [`ImageHeader`]
//!    along with a [`ChunkReader`] for the rest of the chunks.
//! 2) Call [`collect_idat`] on that reader to join all the `IDAT` payloads.
//! 3) Decompress that with any zlib decompressor. This gives you *filtered*
//!    data, not the final pixels.
//! 4) Call [`reconstruct_scanlines`] to undo the filtering and get a
//!    [`PixelBuffer`].
//!
//! Encoding by hand is the reverse: [`filter_scanlines`], compress, then
//! [`write_chunk`] for `IHDR`, `IDAT`, and `IEND` after the
//! [`PNG_SIGNATURE`].
//!
//! ## Checksums
//!
//! Chunk CRCs are written when encoding but are **not** checked when decoding.
//! Each [`RawChunk`] keeps the declared value and can compute the real one if
//! you want to compare them yourself.

use core::fmt::{Debug, Write};

use alloc::vec::Vec;

use crate::{
  image::{Channels, PixelBuffer},
  PngError, PngResult,
};

mod chunk;
pub use chunk::*;

mod ihdr;
pub use ihdr::*;

mod idat;
pub use idat::*;

mod unfilter;
pub use unfilter::*;

mod filter;
pub use filter::*;


/// Settings for [`encode_png_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodeOptions {
  /// The zlib compression level, 0 (store only) through 10.
  pub compression_level: u8,
}
impl Default for EncodeOptions {
  #[inline]
  fn default() -> Self {
    Self { compression_level: 6 }
  }
}

/// Decodes PNG bytes into a pixel buffer.
///
/// The buffer has one channel for greyscale images and three for RGB images.
///
/// ## Failure
/// * Anything that [`read_header`], [`collect_idat`], [`inflate_limited`], or
///   [`reconstruct_scanlines`] reports.
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
pub fn decode_png(bytes: &[u8]) -> PngResult<PixelBuffer> {
  let (header, chunks) = read_header(bytes)?;
  log::debug!("decoding png: {header:?}");
  let zlib_data = collect_idat(chunks)?;
  let filtered = inflate_limited(&zlib_data, header.filtered_len()?)?;
  log::debug!("inflated {} zlib bytes to {} filtered bytes", zlib_data.len(), filtered.len());
  reconstruct_scanlines(&header, &filtered)
}

/// Encodes a pixel buffer as PNG bytes using the default [`EncodeOptions`].
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
#[must_use]
pub fn encode_png(buffer: &PixelBuffer) -> Vec<u8> {
  encode_png_with(buffer, EncodeOptions::default())
}

/// Encodes a pixel buffer as PNG bytes.
///
/// The output is the signature, an `IHDR` (8-bit, greyscale or RGB to match
/// the buffer), one `IDAT` holding all the image data, and an `IEND`. Every
/// scanline uses filter type 0.
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
#[must_use]
pub fn encode_png_with(buffer: &PixelBuffer, options: EncodeOptions) -> Vec<u8> {
  let header = ImageHeader::for_buffer(buffer);
  let compressed = deflate(&filter_scanlines(buffer), options.compression_level);
  log::debug!("encoding png: {header:?}, {} compressed bytes", compressed.len());
  let mut out = Vec::with_capacity(PNG_SIGNATURE.len() + 25 + 12 + compressed.len() + 12);
  out.extend_from_slice(&PNG_SIGNATURE);
  write_chunk(&mut out, ChunkType::IHDR, &header.to_bytes());
  write_chunk(&mut out, ChunkType::IDAT, &compressed);
  write_chunk(&mut out, ChunkType::IEND, &[]);
  out
}
