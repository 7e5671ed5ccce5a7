use super::*;

/// The 4-byte type code of a chunk.
///
/// Using an array type means a chunk type can't be the wrong length.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ChunkType(pub [u8; 4]);
#[allow(nonstandard_style)]
impl ChunkType {
  pub const IHDR: Self = Self(*b"IHDR");
  pub const IDAT: Self = Self(*b"IDAT");
  pub const IEND: Self = Self(*b"IEND");

  /// Critical chunks have bit 5 of the first byte clear (an uppercase ASCII
  /// letter).
  #[inline]
  #[must_use]
  pub const fn is_critical(self) -> bool {
    (self.0[0] & 32) == 0
  }
}
impl Debug for ChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_char(self.0[0] as char)?;
    f.write_char(self.0[1] as char)?;
    f.write_char(self.0[2] as char)?;
    f.write_char(self.0[3] as char)?;
    Ok(())
  }
}

/// A chunk as it appears in the data stream: type, payload, and the CRC that
/// the stream claims for it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawChunk<'b> {
  pub chunk_type: ChunkType,
  pub payload: &'b [u8],
  pub declared_crc: u32,
}
impl Debug for RawChunk<'_> {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("RawChunk")
      .field("chunk_type", &self.chunk_type)
      .field("payload", &(&self.payload[..self.payload.len().min(12)], self.payload.len()))
      .field("declared_crc", &self.declared_crc)
      .finish()
  }
}
impl RawChunk<'_> {
  /// Computes the CRC that this chunk *should* have.
  ///
  /// The decoder never calls this, the declared value is kept as-is. If you
  /// care about corruption you can compare the two yourself.
  #[inline]
  #[must_use]
  pub fn compute_crc(&self) -> u32 {
    chunk_crc(self.chunk_type, self.payload)
  }
}

/// CRC-32 over the type code followed by the payload.
#[inline]
#[must_use]
pub fn chunk_crc(chunk_type: ChunkType, payload: &[u8]) -> u32 {
  let mut hasher = crc32fast::Hasher::new();
  hasher.update(&chunk_type.0);
  hasher.update(payload);
  hasher.finalize()
}

#[inline]
fn try_pull_byte_array<const N: usize>(bytes: &[u8]) -> PngResult<([u8; N], &[u8])> {
  match bytes.split_first_chunk::<N>() {
    Some((head, tail)) => Ok((*head, tail)),
    None => Err(PngError::TruncatedStream),
  }
}

/// Reads successive chunks out of the bytes that follow the signature.
///
/// As an iterator this gives `Ok` chunks until the bytes run out exactly at a
/// chunk boundary. A partial chunk gives a single `Err(TruncatedStream)`,
/// after which the iterator is done.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkReader<'b> {
  spare: &'b [u8],
}
impl<'b> ChunkReader<'b> {
  /// Pass the bytes *after* the signature (see [`read_signature`]).
  #[inline]
  #[must_use]
  pub const fn new(bytes: &'b [u8]) -> Self {
    Self { spare: bytes }
  }

  /// If all bytes have been used up.
  #[inline]
  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.spare.is_empty()
  }

  /// Reads the next chunk.
  ///
  /// The declared CRC is read but not checked.
  ///
  /// ## Failure
  /// * `TruncatedStream` if there's fewer bytes left than the chunk needs.
  ///   The reader is left empty afterwards.
  pub fn read_chunk(&mut self) -> PngResult<RawChunk<'b>> {
    let spare = self.spare;
    self.spare = &[];
    let (len_bytes, rest) = try_pull_byte_array::<4>(spare)?;
    let (type_bytes, rest) = try_pull_byte_array::<4>(rest)?;
    let len = usize::try_from(u32::from_be_bytes(len_bytes))?;
    if rest.len() < len {
      return Err(PngError::TruncatedStream);
    }
    let (payload, rest) = rest.split_at(len);
    let (crc_bytes, rest) = try_pull_byte_array::<4>(rest)?;
    self.spare = rest;
    Ok(RawChunk {
      chunk_type: ChunkType(type_bytes),
      payload,
      declared_crc: u32::from_be_bytes(crc_bytes),
    })
  }
}
impl<'b> Iterator for ChunkReader<'b> {
  type Item = PngResult<RawChunk<'b>>;
  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    if self.spare.is_empty() {
      None
    } else {
      Some(self.read_chunk())
    }
  }
}
impl core::iter::FusedIterator for ChunkReader<'_> {}

/// Appends one framed chunk to `out`: length, type, payload, CRC.
///
/// ## Panics
/// * If the payload is longer than `u32::MAX` bytes.
pub fn write_chunk(out: &mut Vec<u8>, chunk_type: ChunkType, payload: &[u8]) {
  let len = u32::try_from(payload.len()).expect("chunk payloads are limited to u32::MAX bytes");
  out.reserve(12 + payload.len());
  out.extend_from_slice(&len.to_be_bytes());
  out.extend_from_slice(&chunk_type.0);
  out.extend_from_slice(payload);
  out.extend_from_slice(&chunk_crc(chunk_type, payload).to_be_bytes());
}

#[test]
fn test_write_chunk_empty_idat_crc() {
  let mut out = Vec::new();
  write_chunk(&mut out, ChunkType::IDAT, b"");
  assert_eq!(&out[..8], &[0, 0, 0, 0, b'I', b'D', b'A', b'T']);
  assert_eq!(out.len(), 12);
  let crc = u32::from_be_bytes(out[8..12].try_into().unwrap());
  assert_eq!(crc, crc32fast::hash(b"IDAT"));
  assert_eq!(crc, 0x35AF_061E);
}

#[test]
fn test_write_chunk_iend_bytes() {
  let mut out = Vec::new();
  write_chunk(&mut out, ChunkType::IEND, &[]);
  assert_eq!(out, [0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]);
}

#[test]
fn test_read_chunk_back() {
  let mut out = Vec::new();
  write_chunk(&mut out, ChunkType(*b"teST"), &[1, 2, 3]);
  write_chunk(&mut out, ChunkType::IEND, &[]);
  let mut reader = ChunkReader::new(&out);
  let first = reader.read_chunk().unwrap();
  assert_eq!(first.chunk_type, ChunkType(*b"teST"));
  assert!(!first.chunk_type.is_critical());
  assert_eq!(first.payload, &[1, 2, 3]);
  assert_eq!(first.declared_crc, first.compute_crc());
  let second = reader.read_chunk().unwrap();
  assert_eq!(second.chunk_type, ChunkType::IEND);
  assert!(second.chunk_type.is_critical());
  assert!(reader.is_empty());
  assert!(reader.next().is_none());
}

#[test]
fn test_read_chunk_crc_not_verified() {
  let mut out = Vec::new();
  write_chunk(&mut out, ChunkType::IDAT, &[9, 9]);
  let last = out.len() - 1;
  out[last] ^= 0xFF;
  let chunk = ChunkReader::new(&out).read_chunk().unwrap();
  assert_eq!(chunk.payload, &[9, 9]);
  assert_ne!(chunk.declared_crc, chunk.compute_crc());
}

#[test]
fn test_read_chunk_truncated() {
  let mut out = Vec::new();
  write_chunk(&mut out, ChunkType::IDAT, &[1, 2, 3, 4, 5]);
  // every strict prefix is a truncated chunk
  for cut in 1..out.len() {
    let mut reader = ChunkReader::new(&out[..cut]);
    assert_eq!(reader.next(), Some(Err(PngError::TruncatedStream)), "cut: {cut}");
    assert_eq!(reader.next(), None, "cut: {cut}");
  }
  // a length claiming more than is present
  let lying = [0xFF, 0xFF, 0xFF, 0xFF, b'I', b'D', b'A', b'T', 1, 2, 3];
  assert_eq!(ChunkReader::new(&lying).read_chunk(), Err(PngError::TruncatedStream));
}

#[test]
fn test_chunk_type_debug() {
  assert_eq!(alloc::format!("{:?}", ChunkType::IHDR), "IHDR");
}
