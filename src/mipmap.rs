//! Mipmap chunk location (C5): internal offset/size table (BLP1) vs.
//! external per-level sidecar files (BLP0).

use std::path::{Path, PathBuf};

use crate::error::MipmapError;
use crate::path::make_mipmap_path;

/// Byte offset/size table for up to 16 mipmap levels, as stored right after
/// the fixed header in a BLP1 file (128 bytes: 16 `u32` offsets followed by
/// 16 `u32` sizes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipmapDirectory {
    /// Byte offset of each level, from the start of the file.
    pub offsets: [u32; 16],
    /// Byte size of each level.
    pub sizes: [u32; 16],
}

impl MipmapDirectory {
    /// Byte size of the serialized directory (16 offsets + 16 sizes, `u32` each).
    pub const SIZE: usize = 16 * 4 * 2;

    /// Parse the 128-byte directory starting at `input[0..]`.
    pub fn parse(input: &[u8]) -> Result<Self, MipmapError> {
        if input.len() < Self::SIZE {
            return Err(MipmapError::OutOfBounds {
                index: 0,
                offset: 0,
                size: Self::SIZE as u32,
                file_len: input.len(),
            });
        }
        let mut offsets = [0u32; 16];
        let mut sizes = [0u32; 16];
        for (i, slot) in offsets.iter_mut().enumerate() {
            *slot = u32::from_le_bytes(input[i * 4..i * 4 + 4].try_into().unwrap());
        }
        let base = 16 * 4;
        for (i, slot) in sizes.iter_mut().enumerate() {
            *slot = u32::from_le_bytes(input[base + i * 4..base + i * 4 + 4].try_into().unwrap());
        }
        Ok(Self { offsets, sizes })
    }

    /// Serialize back to 128 bytes.
    pub fn write(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        for (i, &v) in self.offsets.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&v.to_le_bytes());
        }
        let base = 16 * 4;
        for (i, &v) in self.sizes.iter().enumerate() {
            out[base + i * 4..base + i * 4 + 4].copy_from_slice(&v.to_le_bytes());
        }
        out
    }

    /// Extract mipmap `i`'s chunk from the full file buffer, bounds-checked.
    pub fn chunk<'a>(&self, file: &'a [u8], i: usize) -> Result<&'a [u8], MipmapError> {
        let offset = self.offsets[i];
        let size = self.sizes[i];
        let end = offset
            .checked_add(size)
            .ok_or(MipmapError::OutOfBounds {
                index: i,
                offset,
                size,
                file_len: file.len(),
            })?;
        if offset as usize >= file.len() || end as usize > file.len() {
            return Err(MipmapError::OutOfBounds {
                index: i,
                offset,
                size,
                file_len: file.len(),
            });
        }
        Ok(&file[offset as usize..end as usize])
    }
}

/// Locates mipmap chunks for read/write, by file version.
#[derive(Debug, Clone)]
pub enum MipmapManager {
    /// BLP1: chunks live inside the file, addressed by [`MipmapDirectory`].
    Internal(MipmapDirectory),
    /// BLP0: chunks live in sibling `<base>.b<NN>` files next to `base_path`.
    External {
        /// Path to the main `.blp` file; sidecar names are derived from it.
        base_path: PathBuf,
    },
}

impl MipmapManager {
    /// Read mipmap `i`'s bytes. For the internal variant `file` must be the
    /// complete file buffer; for the external variant it's ignored.
    pub fn read_chunk(&self, file: &[u8], i: usize) -> Result<Vec<u8>, MipmapError> {
        match self {
            MipmapManager::Internal(dir) => Ok(dir.chunk(file, i)?.to_vec()),
            MipmapManager::External { base_path } => {
                let sidecar = make_mipmap_path(base_path, i)
                    .ok_or_else(|| MipmapError::InvalidFilename(base_path.clone()))?;
                if !sidecar.is_file() {
                    return Err(MipmapError::MipmapMissing(i));
                }
                std::fs::read(&sidecar).map_err(|e| MipmapError::Io(sidecar, e))
            }
        }
    }

    /// `flushTo(i)`: forward-only consumers may use this to assert mipmaps
    /// `[0, i)` will never be requested again. This implementation keeps the
    /// whole file buffered in memory, so it is a documented no-op rather
    /// than an actual release point.
    pub fn flush_to(&self, _i: usize) {}

    /// Write every sidecar file for the external variant, deriving names
    /// from `base_path`. No-op for the internal variant (its chunks are
    /// written inline by the encoder).
    pub fn write_external_sidecars(
        base_path: &Path,
        levels: &[Vec<u8>],
    ) -> Result<(), MipmapError> {
        for (i, bytes) in levels.iter().enumerate() {
            let sidecar = make_mipmap_path(base_path, i)
                .ok_or_else(|| MipmapError::InvalidFilename(base_path.to_path_buf()))?;
            std::fs::write(&sidecar, bytes).map_err(|e| MipmapError::Io(sidecar, e))?;
        }
        Ok(())
    }

    /// Build the internal directory for `levels` starting right after
    /// `prelude_end` (the byte offset where the processor's prelude ends).
    pub fn build_internal_directory(prelude_end: usize, levels: &[Vec<u8>]) -> MipmapDirectory {
        let mut offsets = [0u32; 16];
        let mut sizes = [0u32; 16];
        let mut cursor = prelude_end;
        for (i, level) in levels.iter().enumerate().take(16) {
            offsets[i] = cursor as u32;
            sizes[i] = level.len() as u32;
            cursor += level.len();
        }
        MipmapDirectory { offsets, sizes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_round_trips() {
        let dir = MipmapDirectory {
            offsets: [28, 44, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            sizes: [16, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        };
        let bytes = dir.write();
        let parsed = MipmapDirectory::parse(&bytes).unwrap();
        assert_eq!(dir, parsed);
    }

    #[test]
    fn chunk_extraction_rejects_out_of_bounds() {
        let dir = MipmapDirectory {
            offsets: [100, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            sizes: [10, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        };
        let file = vec![0u8; 50];
        assert!(dir.chunk(&file, 0).is_err());
    }

    #[test]
    fn build_internal_directory_packs_sequentially() {
        let levels = vec![vec![0u8; 16], vec![0u8; 4], vec![0u8; 1]];
        let dir = MipmapManager::build_internal_directory(100, &levels);
        assert_eq!(dir.offsets[0..3], [100, 116, 120]);
        assert_eq!(dir.sizes[0..3], [16, 4, 1]);
    }
}
