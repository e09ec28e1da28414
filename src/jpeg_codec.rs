//! The host JPEG codec boundary (spec.md §1: "the core consumes a
//! `JpegDecode(bytes) -> raster` and `JpegEncode(raster, quality) -> bytes`
//! capability"). [`JpegProcessor`](crate::processor::jpeg::JpegProcessor)
//! never imports an image-decoding crate directly; it only talks to this
//! trait, so a consumer can swap in a different host codec.

use std::io::Cursor;

use image::{ColorType, DynamicImage, ImageFormat, ImageReader};
use thiserror::Error;

use crate::raster::Raster4;
use crate::warning::{WarningKind, WarningSink};

/// Error surfaced by a [`JpegCodec`] implementation.
#[derive(Debug, Error)]
pub enum JpegCodecError {
    /// The host codec rejected the bytes outright.
    #[error("[{vendor}] {message}")]
    Failed {
        /// Name of the host codec.
        vendor: &'static str,
        /// The codec's own error message.
        message: String,
    },
}

/// The external collaborator BLP's JPEG processor delegates to. Always
/// decodes/encodes 4-band RGBA rasters; the BGRA<->RGBA reorder and
/// dimension reconciliation live in the BLP processor, not here.
pub trait JpegCodec {
    /// Name surfaced in wrapped warnings/errors (spec.md §7: "JPEG codec
    /// warnings are surfaced through the warning sink with the provider's
    /// vendor name attached").
    fn vendor(&self) -> &'static str;

    /// Decode a complete JPEG byte stream into a 4-band RGBA raster.
    /// Non-fatal observations are reported through `sink` as
    /// [`WarningKind::JpegDecoderWarning`], tagged with [`Self::vendor`].
    fn decode(&self, bytes: &[u8], sink: &mut dyn WarningSink) -> Result<Raster4, JpegCodecError>;

    /// Encode a 4-band RGBA raster into a complete JPEG byte stream at the
    /// given quality (`0.0..=1.0`). Non-fatal observations are reported
    /// through `sink` as [`WarningKind::JpegEncoderWarning`], tagged with
    /// [`Self::vendor`].
    fn encode(
        &self,
        raster: &Raster4,
        quality: f32,
        sink: &mut dyn WarningSink,
    ) -> Result<Vec<u8>, JpegCodecError>;
}

/// Default host JPEG codec, backed by the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageJpegCodec;

impl JpegCodec for ImageJpegCodec {
    fn vendor(&self) -> &'static str {
        "image"
    }

    fn decode(&self, bytes: &[u8], sink: &mut dyn WarningSink) -> Result<Raster4, JpegCodecError> {
        let reader = ImageReader::with_format(Cursor::new(bytes), ImageFormat::Jpeg);
        let decoded = reader.decode().map_err(|e| JpegCodecError::Failed {
            vendor: self.vendor(),
            message: e.to_string(),
        })?;
        if decoded.color() != ColorType::Rgba8 {
            sink.warn(WarningKind::JpegDecoderWarning {
                vendor: self.vendor(),
                message: format!(
                    "source was {:?}, promoted to RGBA8 with alpha filled in",
                    decoded.color()
                ),
            });
        }
        let rgba = decoded.into_rgba8();
        let (width, height) = (rgba.width(), rgba.height());
        Ok(Raster4 {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    fn encode(
        &self,
        raster: &Raster4,
        quality: f32,
        sink: &mut dyn WarningSink,
    ) -> Result<Vec<u8>, JpegCodecError> {
        let clamped = quality.clamp(0.0, 1.0);
        if clamped != quality {
            sink.warn(WarningKind::JpegEncoderWarning {
                vendor: self.vendor(),
                message: format!("quality {quality} out of range, clamped to {clamped}"),
            });
        }
        let quality_u8 = (clamped * 100.0).round() as u8;
        if quality_u8 == 0 {
            sink.warn(WarningKind::JpegEncoderWarning {
                vendor: self.vendor(),
                message: "quality rounded to 0, raised to the encoder's minimum of 1".to_owned(),
            });
        }
        let mut out = Vec::new();
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality_u8.max(1));
        let rgba = image::RgbaImage::from_raw(raster.width, raster.height, raster.pixels.clone())
            .ok_or_else(|| JpegCodecError::Failed {
                vendor: self.vendor(),
                message: "raster buffer size doesn't match width*height*4".to_owned(),
            })?;
        let dynamic = DynamicImage::ImageRgba8(rgba).into_rgb8();
        encoder
            .encode_image(&dynamic)
            .map_err(|e| JpegCodecError::Failed {
                vendor: self.vendor(),
                message: e.to_string(),
            })?;
        Ok(out)
    }
}
