use super::*;

use log::trace;

/// Gathers the compressed image data from the chunks after `IHDR`.
///
/// The payloads of all `IDAT` chunks are joined in order, up to the `IEND`
/// chunk. Chunk boundaries mean nothing to the zlib stream. Any other chunk is
/// skipped.
///
/// ## Failure
/// * `TruncatedStream` if a chunk is cut short or there's no `IEND`.
pub fn collect_idat<'b, I>(chunks: I) -> PngResult<Vec<u8>>
where
  I: IntoIterator<Item = PngResult<RawChunk<'b>>>,
{
  let mut zlib_data = Vec::new();
  for chunk in chunks {
    let chunk = chunk?;
    match chunk.chunk_type {
      ChunkType::IEND => return Ok(zlib_data),
      ChunkType::IDAT => zlib_data.extend_from_slice(chunk.payload),
      other => trace!(
        "skipping {} chunk {:?} ({} bytes)",
        if other.is_critical() { "critical" } else { "ancillary" },
        other,
        chunk.payload.len()
      ),
    }
  }
  Err(PngError::TruncatedStream)
}

/// Decompresses the joined `IDAT` data into filtered scanlines.
///
/// ## Failure
/// * `Compression` if the data isn't a valid zlib stream.
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
pub fn inflate(zlib_data: &[u8]) -> PngResult<Vec<u8>> {
  miniz_oxide::inflate::decompress_to_vec_zlib(zlib_data).map_err(|e| PngError::from(e.status))
}

/// Like [`inflate`], but stops after `max_len` bytes of output.
///
/// A stream that would produce more than that is cut off at `max_len` rather
/// than being an error, since anything past the image data is ignored anyway.
///
/// ## Failure
/// * `Compression` if the data isn't a valid zlib stream.
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
pub fn inflate_limited(zlib_data: &[u8], max_len: usize) -> PngResult<Vec<u8>> {
  use miniz_oxide::inflate::{decompress_to_vec_zlib_with_limit, TINFLStatus};
  match decompress_to_vec_zlib_with_limit(zlib_data, max_len) {
    Ok(filtered) => Ok(filtered),
    Err(e) if e.status == TINFLStatus::HasMoreOutput => {
      trace!("inflated output cut off at {max_len} bytes");
      Ok(e.output)
    }
    Err(e) => Err(PngError::from(e.status)),
  }
}

/// Compresses filtered scanlines into a zlib stream for a single `IDAT`.
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
#[must_use]
pub fn deflate(filtered: &[u8], level: u8) -> Vec<u8> {
  miniz_oxide::deflate::compress_to_vec_zlib(filtered, level)
}

#[test]
fn test_collect_idat_joins_in_order() {
  let mut bytes = Vec::new();
  write_chunk(&mut bytes, ChunkType::IDAT, &[1, 2]);
  write_chunk(&mut bytes, ChunkType(*b"tEXt"), b"Comment\0hi");
  write_chunk(&mut bytes, ChunkType::IDAT, &[3]);
  write_chunk(&mut bytes, ChunkType::IEND, &[]);
  // anything after IEND isn't read
  write_chunk(&mut bytes, ChunkType::IDAT, &[4]);
  assert_eq!(collect_idat(ChunkReader::new(&bytes)), Ok(alloc::vec![1, 2, 3]));
}

#[test]
fn test_collect_idat_needs_iend() {
  let mut bytes = Vec::new();
  write_chunk(&mut bytes, ChunkType::IDAT, &[1, 2]);
  assert_eq!(collect_idat(ChunkReader::new(&bytes)), Err(PngError::TruncatedStream));
  write_chunk(&mut bytes, ChunkType::IEND, &[]);
  bytes.pop();
  assert_eq!(collect_idat(ChunkReader::new(&bytes)), Err(PngError::TruncatedStream));
}

#[cfg(feature = "miniz_oxide")]
#[test]
fn test_inflate_deflate() {
  let data: Vec<u8> = (0..=255).cycle().take(1000).collect();
  let packed = deflate(&data, 6);
  assert_eq!(inflate(&packed), Ok(data));
  assert!(matches!(inflate(&[1, 2, 3, 4]), Err(PngError::Compression(_))));
  assert!(matches!(inflate(&[]), Err(PngError::Compression(_))));
}

#[cfg(feature = "miniz_oxide")]
#[test]
fn test_inflate_limited_stops_at_limit() {
  let data: Vec<u8> = (0..=255).cycle().take(4096).collect();
  let packed = deflate(&data, 6);
  assert_eq!(inflate_limited(&packed, 4096), Ok(data.clone()));
  assert_eq!(inflate_limited(&packed, 1 << 20), Ok(data.clone()));
  assert_eq!(inflate_limited(&packed, 10), Ok(data[..10].to_vec()));
  assert!(matches!(inflate_limited(&[1, 2, 3, 4], 10), Err(PngError::Compression(_))));
}
