//! The fixed BLP stream header (C6).
//!
//! Wire layout, all little-endian, exactly 28 bytes:
//!
//! | offset | size | field |
//! |-------:|-----:|------|
//! | 0 | 4 | magic (`"BLP0"` or `"BLP1"`) |
//! | 4 | 4 | encoding-kind code (JPEG=0, INDEXED=1) |
//! | 8 | 4 | alphaBits (0/1/4/8) |
//! | 12 | 4 | width |
//! | 16 | 4 | height |
//! | 20 | 4 | reserved (ignored on read, written as zero) |
//! | 24 | 4 | hasMipmaps (0 or != 0) |

use crate::error::HeaderError;
use crate::io_util::{ByteReader, ByteWriter, Cursor};

/// Fixed size of the header in bytes.
pub const HEADER_SIZE: usize = 28;

/// The two file versions this crate supports. BLP2 (World of Warcraft) is
/// explicitly out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlpVersion {
    /// Warcraft III ROC: mipmaps always live in external sidecar files.
    Blp0,
    /// Warcraft III TFT: mipmaps live in an internal offset/size table.
    Blp1,
}

impl BlpVersion {
    const MAGIC_BLP0: &'static [u8; 4] = b"BLP0";
    const MAGIC_BLP1: &'static [u8; 4] = b"BLP1";

    fn from_magic(magic: [u8; 4]) -> Option<Self> {
        match &magic {
            m if m == Self::MAGIC_BLP0 => Some(BlpVersion::Blp0),
            m if m == Self::MAGIC_BLP1 => Some(BlpVersion::Blp1),
            _ => None,
        }
    }

    fn magic(self) -> &'static [u8; 4] {
        match self {
            BlpVersion::Blp0 => Self::MAGIC_BLP0,
            BlpVersion::Blp1 => Self::MAGIC_BLP1,
        }
    }

    /// Whether mipmaps are stored internally (directory + offsets) or
    /// externally (one sidecar file per level).
    pub fn has_internal_mipmaps(self) -> bool {
        matches!(self, BlpVersion::Blp1)
    }
}

/// Which payload processor owns the content following the mipmap table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingKind {
    /// Shared-header JPEG streams, one per mipmap.
    Jpeg,
    /// 8-bit palette index plus optional sub-byte alpha.
    Indexed,
}

impl EncodingKind {
    fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(EncodingKind::Jpeg),
            1 => Some(EncodingKind::Indexed),
            _ => None,
        }
    }

    fn code(self) -> u32 {
        match self {
            EncodingKind::Jpeg => 0,
            EncodingKind::Indexed => 1,
        }
    }

    /// Alpha bit depths this encoding kind accepts.
    pub fn allowed_alpha_bits(self) -> &'static [u32] {
        match self {
            EncodingKind::Jpeg => &[0, 8],
            EncodingKind::Indexed => &[0, 1, 4, 8],
        }
    }
}

/// Maximum width/height a BLP file can declare.
pub const MAX_DIMENSION: u32 = 1 << 16;

/// The parsed fixed header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamHeader {
    /// File format version (BLP0 or BLP1).
    pub version: BlpVersion,
    /// Which payload processor applies.
    pub encoding: EncodingKind,
    /// Alpha channel bit depth: 0, 1, 4, or 8.
    pub alpha_bits: u32,
    /// Full-scale image width in pixels.
    pub width: u32,
    /// Full-scale image height in pixels.
    pub height: u32,
    /// Whether the file carries a mipmap pyramid beyond level 0.
    pub has_mipmaps: bool,
}

impl StreamHeader {
    /// Number of mipmap levels, including level 0.
    ///
    /// `floor(log2(max(width,height))) + 1` when `has_mipmaps`, else 1.
    pub fn mipmap_count(&self) -> usize {
        if self.has_mipmaps {
            let max_dim = self.width.max(self.height).max(1);
            (u32::BITS - max_dim.leading_zeros()) as usize
        } else {
            1
        }
    }

    /// Dimensions of mipmap level `i`: `(max(width >> i, 1), max(height >> i, 1))`.
    pub fn mipmap_size(&self, i: usize) -> (u32, u32) {
        let shift = i.min(31) as u32;
        (
            (self.width >> shift).max(1),
            (self.height >> shift).max(1),
        )
    }

    /// Pixel count of mipmap level `i`.
    pub fn mipmap_pixels(&self, i: usize) -> u32 {
        let (w, h) = self.mipmap_size(i);
        w * h
    }

    /// Parse the 28-byte fixed header from the start of `input`.
    pub fn parse(input: &[u8]) -> Result<Self, HeaderError> {
        let mut reader = Cursor::new(input);

        let mut magic = [0u8; 4];
        let magic_bytes = reader.read_bytes(4)?;
        magic.copy_from_slice(&magic_bytes);
        let version = BlpVersion::from_magic(magic).ok_or_else(|| {
            HeaderError::UnsupportedMagic(String::from_utf8_lossy(&magic).into_owned())
        })?;

        let encoding_code = reader.read_u32_le()?;
        let encoding = EncodingKind::from_code(encoding_code)
            .ok_or(HeaderError::UnsupportedEncoding(encoding_code))?;

        let alpha_bits = reader.read_u32_le()?;
        if !encoding.allowed_alpha_bits().contains(&alpha_bits) {
            return Err(HeaderError::UnsupportedAlpha {
                bits: alpha_bits,
                encoding,
            });
        }

        let width = reader.read_u32_le()?;
        let height = reader.read_u32_le()?;
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(HeaderError::InvalidDimensions { width, height });
        }

        let _reserved = reader.read_u32_le()?;
        let has_mipmaps = reader.read_u32_le()? != 0;

        Ok(StreamHeader {
            version,
            encoding,
            alpha_bits,
            width,
            height,
            has_mipmaps,
        })
    }

    /// Serialize the 28-byte fixed header.
    pub fn write(&self) -> [u8; HEADER_SIZE] {
        let mut w = ByteWriter::with_capacity(HEADER_SIZE);
        w.write_bytes(self.version.magic());
        w.write_u32_le(self.encoding.code());
        w.write_u32_le(self.alpha_bits);
        w.write_u32_le(self.width);
        w.write_u32_le(self.height);
        w.write_u32_le(0); // reserved, always zero on write
        w.write_u32_le(self.has_mipmaps as u32);
        let bytes = w.into_bytes();
        let mut out = [0u8; HEADER_SIZE];
        out.copy_from_slice(&bytes);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(width: u32, height: u32, has_mipmaps: bool) -> StreamHeader {
        StreamHeader {
            version: BlpVersion::Blp1,
            encoding: EncodingKind::Indexed,
            alpha_bits: 0,
            width,
            height,
            has_mipmaps,
        }
    }

    #[test]
    fn mipmap_count_matches_floor_log2_plus_one() {
        assert_eq!(header(512, 256, true).mipmap_count(), 10);
        assert_eq!(header(1, 4, true).mipmap_count(), 3);
        assert_eq!(header(4, 7, true).mipmap_count(), 3);
        assert_eq!(header(1, 1, true).mipmap_count(), 1);
        assert_eq!(header(768, 128, true).mipmap_count(), 10);
        assert_eq!(header(512, 256, false).mipmap_count(), 1);
    }

    #[test]
    fn mipmap_size_halves_and_floors_at_one() {
        let h = header(8, 2, true);
        assert_eq!(h.mipmap_size(0), (8, 2));
        assert_eq!(h.mipmap_size(1), (4, 1));
        assert_eq!(h.mipmap_size(2), (2, 1));
        assert_eq!(h.mipmap_size(3), (1, 1));
    }

    #[test]
    fn round_trips_through_bytes() {
        let h = header(17, 33, true);
        let bytes = h.write();
        let parsed = StreamHeader::parse(&bytes).unwrap();
        assert_eq!(h, parsed);
    }

    #[test]
    fn rejects_bad_magic() {
        let bytes = [0u8; HEADER_SIZE];
        assert!(StreamHeader::parse(&bytes).is_err());
    }

    #[test]
    fn rejects_unrecognized_encoding_code() {
        let mut bytes = header(4, 4, false).write();
        bytes[4..8].copy_from_slice(&7u32.to_le_bytes());
        assert!(matches!(
            StreamHeader::parse(&bytes),
            Err(HeaderError::UnsupportedEncoding(7))
        ));
    }

    #[test]
    fn rejects_alpha_bits_outside_allowed_set() {
        let mut h = header(4, 4, false);
        h.encoding = EncodingKind::Jpeg;
        h.alpha_bits = 4;
        let bytes = h.write();
        assert!(StreamHeader::parse(&bytes).is_err());
    }

    #[test]
    fn reserved_field_is_ignored_on_read_and_zero_on_write() {
        let h = header(4, 4, false);
        let mut bytes = h.write();
        assert_eq!(&bytes[20..24], &[0, 0, 0, 0]);
        bytes[20..24].copy_from_slice(&0xABCD_EF01u32.to_le_bytes());
        let parsed = StreamHeader::parse(&bytes).unwrap();
        assert_eq!(parsed, h);
    }
}
