//! Decode driver (C7): header -> mipmap table -> processor prelude, then
//! per-mipmap decode on demand.

use std::path::{Path, PathBuf};

use crate::error::{Error, MipmapError};
use crate::header::{BlpVersion, HEADER_SIZE, StreamHeader};
use crate::mipmap::{MipmapDirectory, MipmapManager};
use crate::processor::Processor;
use crate::raster::Image;
use crate::warning::{LogWarningSink, WarningKind, WarningSink};

/// Options controlling a single [`Decoder::read`] call.
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    /// For `alphaBits == 0` JPEG content, scan every decoded pixel and warn
    /// if any came back non-opaque. Opt-in behavior, on by default: it's an
    /// O(pixels) pass, but callers that don't want it can turn it off.
    pub deep_alpha_check: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            deep_alpha_check: true,
        }
    }
}

/// Decodes a BLP stream: parses the fixed header and mipmap table once at
/// construction, then decodes mipmaps on demand via [`Decoder::read`].
pub struct Decoder {
    header: StreamHeader,
    processor: Processor,
    mipmap_manager: MipmapManager,
    file_bytes: Vec<u8>,
    warning_sink: Box<dyn WarningSink>,
}

impl Decoder {
    /// Load a BLP file from disk. For BLP0 (external mipmaps), sidecar
    /// files are looked up next to `path` lazily, on each [`Decoder::read`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).map_err(|e| Error::Io(path.to_path_buf(), e))?;
        Self::build(bytes, Some(path.to_path_buf()))
    }

    /// Decode from an in-memory buffer. BLP1 (internal mipmaps) works fully
    /// offline; BLP0 (external mipmaps) can only ever yield level 0, since
    /// there's no path to derive sidecar names from.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Error> {
        Self::build(bytes, None)
    }

    fn build(bytes: Vec<u8>, path: Option<PathBuf>) -> Result<Self, Error> {
        let header = StreamHeader::parse(&bytes)?;
        let mut cursor = HEADER_SIZE;

        let mipmap_manager = if header.version.has_internal_mipmaps() {
            let dir = MipmapDirectory::parse(&bytes[cursor..])?;
            cursor += MipmapDirectory::SIZE;
            MipmapManager::Internal(dir)
        } else {
            let base_path = path
                .clone()
                .ok_or_else(|| MipmapError::InvalidFilename(PathBuf::new()))?;
            MipmapManager::External { base_path }
        };

        let mut prelude_sink = LogWarningSink;
        let (processor, consumed) =
            Processor::read_prelude(header.encoding, &bytes[cursor..], &mut prelude_sink)?;
        let _ = consumed;

        Ok(Self {
            header,
            processor,
            mipmap_manager,
            file_bytes: bytes,
            warning_sink: Box::new(LogWarningSink),
        })
    }

    /// The parsed fixed header.
    pub fn header(&self) -> &StreamHeader {
        &self.header
    }

    /// Number of mipmap levels available.
    pub fn mipmap_count(&self) -> usize {
        self.header.mipmap_count()
    }

    /// Dimensions of mipmap level `i`.
    pub fn dimensions(&self, i: usize) -> (u32, u32) {
        self.header.mipmap_size(i)
    }

    /// File format version.
    pub fn version(&self) -> BlpVersion {
        self.header.version
    }

    /// Replace the sink every subsequent [`Decoder::read`] call reports
    /// non-fatal warnings to. Defaults to [`LogWarningSink`].
    pub fn set_warning_sink(&mut self, sink: Box<dyn WarningSink>) {
        self.warning_sink = sink;
    }

    /// Decode mipmap level `mipmap_index` into an RGBA8 [`Image`]. A missing
    /// BLP0 sidecar is fatal at level 0; beyond it, the level is recovered
    /// as a transparent placeholder and reported via [`WarningKind::MipmapAbsent`].
    pub fn read(&mut self, mipmap_index: usize, options: ReadOptions) -> Result<Image, Error> {
        if mipmap_index >= self.mipmap_count() {
            return Err(MipmapError::InvalidMipmapIndex(mipmap_index).into());
        }
        let chunk = match self
            .mipmap_manager
            .read_chunk(&self.file_bytes, mipmap_index)
        {
            Ok(chunk) => chunk,
            Err(MipmapError::MipmapMissing(i)) if i > 0 => {
                self.warning_sink.warn(WarningKind::MipmapAbsent { mipmap: i });
                let (w, h) = self.header.mipmap_size(i);
                return Ok(Image::new(w, h));
            }
            Err(e) => return Err(e.into()),
        };
        let image = self.processor.decode(
            &chunk,
            mipmap_index,
            &self.header,
            options.deep_alpha_check,
            self.warning_sink.as_mut(),
        )?;
        Ok(image)
    }
}
