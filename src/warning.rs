//! Typed, non-fatal warning events (C8).
//!
//! Corruption that can be patched is reported through here and decoding
//! proceeds; message formatting/localization is explicitly out of scope for
//! the core (spec.md §1) — `Display` below is a plain developer-facing
//! rendering, not a localized user-facing string.

use std::fmt;

/// A single non-fatal warning raised while decoding or encoding a BLP file.
#[derive(Debug, Clone, PartialEq)]
pub enum WarningKind {
    /// An indexed mipmap's byte buffer didn't match the expected size; it
    /// was right-padded with zeros or truncated.
    BadDataBuffer {
        /// Mipmap level.
        mipmap: usize,
        /// Bytes actually present.
        actual: usize,
        /// Bytes `PackedSampleLayout::buffer_size` expected.
        expected: usize,
    },
    /// A decoded JPEG mipmap's dimensions didn't match the header; it was
    /// cropped or padded with transparent black.
    BadMipmapDimension {
        /// Mipmap level.
        mipmap: usize,
        /// Width/height the header declared.
        expected: (u32, u32),
        /// Width/height the JPEG decoder actually produced.
        actual: (u32, u32),
    },
    /// An `alphaBits == 0` JPEG mipmap decoded with non-opaque pixels.
    BadPixelAlpha {
        /// Mipmap level.
        mipmap: usize,
        /// Number of pixels whose alpha sample was not 255.
        transparent_count: usize,
        /// Total pixel count in the mipmap.
        total_pixels: usize,
    },
    /// The shared JPEG header prelude exceeded the 624-byte soft limit.
    BadJpegHeader {
        /// Bytes the prelude declared.
        actual: usize,
        /// The soft ceiling (624).
        limit: usize,
    },
    /// A mipmap beyond level 0 has no external sidecar file on disk. Level 0
    /// is always required and stays fatal; missing levels above it are
    /// recovered as a fully-transparent placeholder at the expected size.
    MipmapAbsent {
        /// Mipmap level.
        mipmap: usize,
    },
    /// The external JPEG decoder reported a non-fatal problem.
    JpegDecoderWarning {
        /// Name of the host JPEG codec that raised it.
        vendor: &'static str,
        /// The codec's own message.
        message: String,
    },
    /// The external JPEG encoder reported a non-fatal problem.
    JpegEncoderWarning {
        /// Name of the host JPEG codec that raised it.
        vendor: &'static str,
        /// The codec's own message.
        message: String,
    },
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::BadDataBuffer {
                mipmap,
                actual,
                expected,
            } => write!(
                f,
                "mipmap {mipmap}: data buffer is {actual} bytes, expected {expected}"
            ),
            WarningKind::BadMipmapDimension {
                mipmap,
                expected,
                actual,
            } => write!(
                f,
                "mipmap {mipmap}: decoded dimensions {}x{} don't match expected {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
            WarningKind::BadPixelAlpha {
                mipmap,
                transparent_count,
                total_pixels,
            } => write!(
                f,
                "mipmap {mipmap}: {transparent_count}/{total_pixels} pixels are not opaque in an alpha-less image"
            ),
            WarningKind::BadJpegHeader { actual, limit } => write!(
                f,
                "shared JPEG header is {actual} bytes, soft limit is {limit}"
            ),
            WarningKind::MipmapAbsent { mipmap } => write!(
                f,
                "mipmap {mipmap}: no sidecar file found, substituting a transparent placeholder"
            ),
            WarningKind::JpegDecoderWarning { vendor, message } => {
                write!(f, "[{vendor}] decoder warning: {message}")
            }
            WarningKind::JpegEncoderWarning { vendor, message } => {
                write!(f, "[{vendor}] encoder warning: {message}")
            }
        }
    }
}

/// Sink that receives warnings synchronously as they're raised.
pub trait WarningSink {
    /// Handle one warning.
    fn warn(&mut self, kind: WarningKind);
}

impl<F: FnMut(WarningKind)> WarningSink for F {
    fn warn(&mut self, kind: WarningKind) {
        (self)(kind)
    }
}

/// Default sink: forwards every warning to the `log` crate at `warn` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWarningSink;

impl WarningSink for LogWarningSink {
    fn warn(&mut self, kind: WarningKind) {
        log::warn!("{kind}");
    }
}

/// Sink that discards every warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullWarningSink;

impl WarningSink for NullWarningSink {
    fn warn(&mut self, _kind: WarningKind) {}
}
