use super::*;

/// The first eight bytes of a PNG datastream should match these bytes.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Checks the signature and gives back the bytes that follow it.
///
/// ## Failure
/// * `InvalidSignature` if any of the available signature bytes is wrong.
/// * `TruncatedStream` if the bytes are a correct but incomplete signature.
pub fn read_signature(bytes: &[u8]) -> PngResult<&[u8]> {
  let checked = bytes.len().min(PNG_SIGNATURE.len());
  if bytes[..checked] != PNG_SIGNATURE[..checked] {
    Err(PngError::InvalidSignature)
  } else if checked < PNG_SIGNATURE.len() {
    Err(PngError::TruncatedStream)
  } else {
    Ok(&bytes[checked..])
  }
}

/// The types of color that PNG has.
///
/// Only [`Y`](Self::Y) and [`RGB`](Self::RGB) can be decoded, the rest exist
/// so that errors can say what was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngColorType {
  /// Greyscale
  Y = 0,
  /// Red, Green, Blue
  RGB = 2,
  /// Index into a palette.
  Index = 3,
  /// Greyscale + Alpha
  YA = 4,
  /// Red, Green, Blue, Alpha
  RGBA = 6,
}
impl PngColorType {
  /// A short human name, used in error messages.
  #[inline]
  #[must_use]
  pub const fn name(self) -> &'static str {
    match self {
      Self::Y => "greyscale",
      Self::RGB => "rgb",
      Self::Index => "palette",
      Self::YA => "greyscale-alpha",
      Self::RGBA => "rgba",
    }
  }

  /// The pixel layout for the supported color types.
  #[inline]
  #[must_use]
  pub const fn channels(self) -> Option<Channels> {
    match self {
      Self::Y => Some(Channels::Grey),
      Self::RGB => Some(Channels::Rgb),
      _ => None,
    }
  }
}
impl TryFrom<u8> for PngColorType {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => PngColorType::Y,
      2 => PngColorType::RGB,
      3 => PngColorType::Index,
      4 => PngColorType::YA,
      6 => PngColorType::RGBA,
      _ => return Err(PngError::IllegalColorType(value)),
    })
  }
}
impl From<Channels> for PngColorType {
  #[inline]
  fn from(channels: Channels) -> Self {
    match channels {
      Channels::Grey => Self::Y,
      Channels::Rgb => Self::RGB,
    }
  }
}

/// Image Header
///
/// Only headers that this crate can decode are ever produced by
/// [`parse`](Self::parse): 8-bit greyscale or RGB, not interlaced, non-zero
/// size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageHeader {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// bits per sample
  pub bit_depth: u8,
  /// pixel color type
  pub color_type: PngColorType,
  pub compression_method: u8,
  pub filter_method: u8,
  pub interlace_method: u8,
}
impl ImageHeader {
  /// Parses and validates an `IHDR` payload.
  ///
  /// ## Failure
  /// * Palette, greyscale-alpha, and RGBA images fail with
  ///   `UnsupportedColorType`, whatever their bit depth.
  /// * Greyscale and RGB images with a bit depth other than 8 fail with
  ///   `UnsupportedBitDepth`.
  /// * Non-zero compression/filter methods, interlacing, and zero dimensions
  ///   are also errors.
  pub fn parse(payload: &[u8]) -> PngResult<Self> {
    let [w0, w1, w2, w3, h0, h1, h2, h3, bit_depth, color_type, compression_method, filter_method, interlace_method] =
      *payload
    else {
      return Err(PngError::IllegalHeaderLength(payload.len()));
    };
    let color_type = PngColorType::try_from(color_type)?;
    if color_type.channels().is_none() {
      return Err(PngError::UnsupportedColorType(color_type));
    }
    if bit_depth != 8 {
      return Err(PngError::UnsupportedBitDepth(bit_depth));
    }
    if compression_method != 0 {
      return Err(PngError::IllegalCompressionMethod(compression_method));
    }
    if filter_method != 0 {
      return Err(PngError::IllegalFilterMethod(filter_method));
    }
    if interlace_method != 0 {
      return Err(PngError::InterlaceNotSupported);
    }
    let header = Self {
      width: u32::from_be_bytes([w0, w1, w2, w3]),
      height: u32::from_be_bytes([h0, h1, h2, h3]),
      bit_depth,
      color_type,
      compression_method,
      filter_method,
      interlace_method,
    };
    if header.width == 0 || header.height == 0 {
      return Err(PngError::WidthOrHeightZero);
    }
    Ok(header)
  }

  /// The header that describes a pixel buffer.
  #[inline]
  #[must_use]
  pub fn for_buffer(buffer: &PixelBuffer) -> Self {
    Self {
      width: buffer.width(),
      height: buffer.height(),
      bit_depth: 8,
      color_type: PngColorType::from(buffer.channels()),
      compression_method: 0,
      filter_method: 0,
      interlace_method: 0,
    }
  }

  /// The `IHDR` payload bytes.
  #[inline]
  #[must_use]
  pub fn to_bytes(&self) -> [u8; 13] {
    let [w0, w1, w2, w3] = self.width.to_be_bytes();
    let [h0, h1, h2, h3] = self.height.to_be_bytes();
    [
      w0,
      w1,
      w2,
      w3,
      h0,
      h1,
      h2,
      h3,
      self.bit_depth,
      self.color_type as u8,
      self.compression_method,
      self.filter_method,
      self.interlace_method,
    ]
  }

  /// Samples per pixel.
  ///
  /// ## Failure
  /// * `UnsupportedColorType` for headers that weren't made by `parse`.
  #[inline]
  pub fn channels(&self) -> PngResult<Channels> {
    self.color_type.channels().ok_or(PngError::UnsupportedColorType(self.color_type))
  }

  /// Bytes of sample data per row, not counting the filter byte.
  #[inline]
  pub fn stride(&self) -> PngResult<usize> {
    usize::try_from(self.width)?.checked_mul(self.channels()?.count()).ok_or(PngError::CheckedMath)
  }

  /// The length of the decompressed, still filtered, image data: each row is a
  /// filter byte followed by `stride` bytes.
  #[inline]
  pub fn filtered_len(&self) -> PngResult<usize> {
    self
      .stride()?
      .checked_add(1)
      .and_then(|line| line.checked_mul(usize::try_from(self.height).ok()?))
      .ok_or(PngError::CheckedMath)
  }
}

/// Checks the signature and reads the `IHDR` chunk.
///
/// Gives back the header along with a reader positioned at the chunk after
/// `IHDR`.
///
/// ## Failure
/// * Any error from [`read_signature`] or [`ImageHeader::parse`].
/// * `FirstChunkNotIhdr` if the first chunk is some other type.
pub fn read_header(bytes: &[u8]) -> PngResult<(ImageHeader, ChunkReader<'_>)> {
  let mut reader = ChunkReader::new(read_signature(bytes)?);
  let first = reader.read_chunk()?;
  if first.chunk_type != ChunkType::IHDR {
    return Err(PngError::FirstChunkNotIhdr);
  }
  let header = ImageHeader::parse(first.payload)?;
  Ok((header, reader))
}

#[cfg(test)]
fn ihdr_payload(width: u32, height: u32, bit_depth: u8, color_type: u8) -> [u8; 13] {
  let [w0, w1, w2, w3] = width.to_be_bytes();
  let [h0, h1, h2, h3] = height.to_be_bytes();
  [w0, w1, w2, w3, h0, h1, h2, h3, bit_depth, color_type, 0, 0, 0]
}

#[test]
fn test_read_signature() {
  let mut bytes = PNG_SIGNATURE.to_vec();
  bytes.push(42);
  assert_eq!(read_signature(&bytes), Ok(&[42][..]));
  for i in 0..PNG_SIGNATURE.len() {
    let mut bad = bytes.clone();
    bad[i] = bad[i].wrapping_add(1);
    assert_eq!(read_signature(&bad), Err(PngError::InvalidSignature), "i: {i}");
  }
  assert_eq!(read_signature(&PNG_SIGNATURE[..5]), Err(PngError::TruncatedStream));
  assert_eq!(read_signature(b"GIF"), Err(PngError::InvalidSignature));
  assert_eq!(read_signature(&[]), Err(PngError::TruncatedStream));
}

#[test]
fn test_parse_supported_headers() {
  let grey = ImageHeader::parse(&ihdr_payload(3, 2, 8, 0)).unwrap();
  assert_eq!((grey.width, grey.height), (3, 2));
  assert_eq!(grey.channels(), Ok(Channels::Grey));
  assert_eq!(grey.stride(), Ok(3));
  assert_eq!(grey.filtered_len(), Ok(8));
  let rgb = ImageHeader::parse(&ihdr_payload(3, 2, 8, 2)).unwrap();
  assert_eq!(rgb.color_type, PngColorType::RGB);
  assert_eq!(rgb.stride(), Ok(9));
  assert_eq!(rgb.filtered_len(), Ok(20));
  assert_eq!(rgb.to_bytes(), ihdr_payload(3, 2, 8, 2));
}

#[test]
fn test_parse_rejects_unsupported_color_types() {
  for bit_depth in [1, 2, 4, 8, 16] {
    assert_eq!(
      ImageHeader::parse(&ihdr_payload(1, 1, bit_depth, 3)),
      Err(PngError::UnsupportedColorType(PngColorType::Index))
    );
    assert_eq!(
      ImageHeader::parse(&ihdr_payload(1, 1, bit_depth, 4)),
      Err(PngError::UnsupportedColorType(PngColorType::YA))
    );
    assert_eq!(
      ImageHeader::parse(&ihdr_payload(1, 1, bit_depth, 6)),
      Err(PngError::UnsupportedColorType(PngColorType::RGBA))
    );
  }
  assert_eq!(ImageHeader::parse(&ihdr_payload(1, 1, 8, 5)), Err(PngError::IllegalColorType(5)));
}

#[test]
fn test_parse_rejects_other_bit_depths() {
  for bit_depth in [1, 2, 4, 16] {
    assert_eq!(
      ImageHeader::parse(&ihdr_payload(1, 1, bit_depth, 0)),
      Err(PngError::UnsupportedBitDepth(bit_depth))
    );
  }
  assert_eq!(ImageHeader::parse(&ihdr_payload(1, 1, 16, 2)), Err(PngError::UnsupportedBitDepth(16)));
  assert_eq!(ImageHeader::parse(&ihdr_payload(1, 1, 7, 2)), Err(PngError::UnsupportedBitDepth(7)));
}

#[test]
fn test_parse_rejects_bad_methods_and_sizes() {
  let mut p = ihdr_payload(1, 1, 8, 2);
  p[10] = 1;
  assert_eq!(ImageHeader::parse(&p), Err(PngError::IllegalCompressionMethod(1)));
  let mut p = ihdr_payload(1, 1, 8, 2);
  p[11] = 1;
  assert_eq!(ImageHeader::parse(&p), Err(PngError::IllegalFilterMethod(1)));
  let mut p = ihdr_payload(1, 1, 8, 2);
  p[12] = 1;
  assert_eq!(ImageHeader::parse(&p), Err(PngError::InterlaceNotSupported));
  assert_eq!(ImageHeader::parse(&ihdr_payload(0, 1, 8, 2)), Err(PngError::WidthOrHeightZero));
  assert_eq!(ImageHeader::parse(&ihdr_payload(1, 0, 8, 0)), Err(PngError::WidthOrHeightZero));
  assert_eq!(ImageHeader::parse(&[0; 12]), Err(PngError::IllegalHeaderLength(12)));
}

#[test]
fn test_read_header_needs_ihdr_first() {
  let mut bytes = PNG_SIGNATURE.to_vec();
  write_chunk(&mut bytes, ChunkType::IDAT, &[]);
  assert_eq!(read_header(&bytes).unwrap_err(), PngError::FirstChunkNotIhdr);

  let mut bytes = PNG_SIGNATURE.to_vec();
  write_chunk(&mut bytes, ChunkType::IHDR, &ihdr_payload(4, 5, 8, 0));
  let (header, reader) = read_header(&bytes).unwrap();
  assert_eq!((header.width, header.height), (4, 5));
  assert!(reader.is_empty());
}
