//! Error types, split by phase like the upstream parser/convert/encode
//! modules, composed into a single top-level [`Error`] via `#[from]`.

use std::path::PathBuf;
use thiserror::Error;

use crate::jpeg_codec::JpegCodecError;

/// Ran out of input before a fixed-size field could be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unexpected end of stream")]
pub struct EndOfStream;

/// Errors parsing or validating the fixed [`crate::header::StreamHeader`].
#[derive(Debug, Error)]
pub enum HeaderError {
    /// First four bytes were neither `BLP0` nor `BLP1`.
    #[error("unsupported magic value {0:?}, expected \"BLP0\" or \"BLP1\"")]
    UnsupportedMagic(String),
    /// The encoding-kind code wasn't one of the two recognized values.
    #[error("unsupported encoding code {0}, expected 0 (Jpeg) or 1 (Indexed)")]
    UnsupportedEncoding(u32),
    /// `alphaBits` was outside the set the encoding kind allows.
    #[error("unsupported alpha bit depth {bits} for {encoding:?} encoding")]
    UnsupportedAlpha {
        /// The offending alpha bit depth.
        bits: u32,
        /// The encoding kind that rejected it.
        encoding: crate::header::EncodingKind,
    },
    /// Width or height was zero, or exceeded the format's `2^16` ceiling.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },
    /// Header truncated mid-field.
    #[error(transparent)]
    EndOfStream(#[from] EndOfStream),
}

/// Errors locating or reading a mipmap chunk.
#[derive(Debug, Error)]
pub enum MipmapError {
    /// Mipmap 0 is always required; missing external sidecars at any other
    /// level are recoverable and surfaced as a warning instead.
    #[error("mipmap level {0} is missing")]
    MipmapMissing(usize),
    /// Mipmap index requested beyond what the header declares.
    #[error("invalid mipmap index {0}")]
    InvalidMipmapIndex(usize),
    /// Internal offset/size table pointed outside the file.
    #[error("mipmap {index} chunk [{offset}, {offset}+{size}) is out of bounds for a {file_len}-byte file")]
    OutOfBounds {
        /// Mipmap level.
        index: usize,
        /// Declared start offset.
        offset: u32,
        /// Declared byte size.
        size: u32,
        /// Length of the file the offset was checked against.
        file_len: usize,
    },
    /// External variant requires a `.blp`-suffixed path.
    #[error("cannot derive a mipmap sidecar name for {0}")]
    InvalidFilename(PathBuf),
    /// Filesystem I/O failure reading or writing a sidecar file.
    #[error("filesystem error with {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
}

/// Errors from the indexed or JPEG payload processors.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// `(x, y)` outside `[0, width) x [0, height)`.
    #[error("coordinate ({x}, {y}) is out of bounds for a {width}x{height} raster")]
    InvalidCoord {
        /// Requested x.
        x: u32,
        /// Requested y.
        y: u32,
        /// Raster width.
        width: u32,
        /// Raster height.
        height: u32,
    },
    /// Alpha accessor used on a layout with `alpha_bits == 0`.
    #[error("raster has no alpha band")]
    NoAlphaBand,
    /// Ran out of prelude/header bytes.
    #[error(transparent)]
    EndOfStream(#[from] EndOfStream),
    /// The external JPEG codec failed.
    #[error(transparent)]
    ExternalJpeg(#[from] JpegCodecError),
}

/// Errors specific to the write path (dimension/mipmap bookkeeping).
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Width exceeds the format's `2^16` ceiling.
    #[error("BLP supports width up to 65536, got {0}")]
    WidthTooHigh(u32),
    /// Height exceeds the format's `2^16` ceiling.
    #[error("BLP supports height up to 65536, got {0}")]
    HeightTooHigh(u32),
    /// `write_levels` was called with a number of levels that doesn't match
    /// the header's mipmap count.
    #[error("expected {expected} mipmap levels, got {actual}")]
    WrongLevelCount {
        /// Levels the header requires.
        expected: usize,
        /// Levels actually supplied.
        actual: usize,
    },
    /// A supplied level's dimensions don't match `mipmap_size(i)`.
    #[error("level {level} should be {expected_w}x{expected_h}, got {actual_w}x{actual_h}")]
    WrongLevelDimensions {
        /// Mipmap level.
        level: usize,
        /// Expected width.
        expected_w: u32,
        /// Expected height.
        expected_h: u32,
        /// Supplied width.
        actual_w: u32,
        /// Supplied height.
        actual_h: u32,
    },
}

/// Top-level error type returned by the public decoder/encoder API.
#[derive(Debug, Error)]
pub enum Error {
    /// Header parsing/validation failed.
    #[error(transparent)]
    Header(#[from] HeaderError),
    /// Mipmap location/IO failed.
    #[error(transparent)]
    Mipmap(#[from] MipmapError),
    /// Payload processor failed.
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    /// Encode-path bookkeeping failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// Raw filesystem I/O failure opening the main file.
    #[error("filesystem error with {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
}

impl From<EndOfStream> for Error {
    fn from(e: EndOfStream) -> Self {
        Error::Header(HeaderError::EndOfStream(e))
    }
}
