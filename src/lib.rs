//! Parser and encoder for Warcraft III `BLP0`/`BLP1` texture files.
//!
//! A BLP stream is a fixed 28-byte header ([`header::StreamHeader`])
//! followed by a mipmap location table (internal directory for BLP1,
//! external sidecar files for BLP0, see [`mipmap`]) and one of two content
//! encodings: 256-entry palette indices with optional packed sub-byte alpha
//! ([`processor::indexed`]), or shared-header JPEG streams
//! ([`processor::jpeg`]). [`reader::Decoder`] and [`writer::Encoder`] drive
//! the whole pipeline; everything else is a building block they compose.

pub mod debug;
pub mod error;
pub mod header;
pub mod io_util;
pub mod jpeg_codec;
pub mod mipmap;
pub mod palette;
pub mod path;
pub mod processor;
pub mod raster;
pub mod reader;
pub mod sample_layout;
pub mod warning;
pub mod writer;

pub use error::Error;
pub use header::{BlpVersion, EncodingKind, StreamHeader};
pub use jpeg_codec::{ImageJpegCodec, JpegCodec, JpegCodecError};
pub use palette::{ColorSpace, Palette};
pub use raster::{Image, IndexedPixels};
pub use reader::{Decoder, ReadOptions};
pub use warning::{LogWarningSink, NullWarningSink, WarningKind, WarningSink};
pub use writer::{DimensionOptimization, EncodeOptions, EncodedBlp, Encoder};
