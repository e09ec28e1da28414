//! Payload processors: one tagged-variant type, no class hierarchy (spec.md
//! §9's explicit design note), wrapping the indexed (C3) and JPEG (C4)
//! content models behind a shared prelude/decode/encode surface.

pub mod indexed;
pub mod jpeg;

use crate::error::ProcessorError;
use crate::header::{EncodingKind, StreamHeader};
use crate::palette::Palette;
use crate::raster::Image;
use crate::warning::WarningSink;

pub use indexed::IndexedProcessor;
pub use jpeg::JpegProcessor;

/// The payload processor selected by a header's [`EncodingKind`].
#[derive(Debug)]
pub enum Processor {
    /// C3: palette index band plus optional packed alpha band.
    Indexed(IndexedProcessor),
    /// C4: shared-header JPEG streams.
    Jpeg(JpegProcessor),
}

impl Processor {
    /// Read the encoding-specific prelude that follows the mipmap table.
    /// Returns `(processor, bytes_consumed)`.
    pub fn read_prelude(
        encoding: EncodingKind,
        bytes: &[u8],
        sink: &mut dyn WarningSink,
    ) -> Result<(Self, usize), ProcessorError> {
        match encoding {
            EncodingKind::Indexed => {
                let processor = IndexedProcessor::read_prelude(bytes)?;
                Ok((Processor::Indexed(processor), IndexedProcessor::PRELUDE_SIZE))
            }
            EncodingKind::Jpeg => {
                let (processor, consumed) = JpegProcessor::read_prelude(bytes, sink)?;
                Ok((Processor::Jpeg(processor), consumed))
            }
        }
    }

    /// Serialize this processor's prelude.
    pub fn write_prelude(&self) -> Vec<u8> {
        match self {
            Processor::Indexed(p) => p.write_prelude().to_vec(),
            Processor::Jpeg(p) => p.write_prelude(),
        }
    }

    /// Decode mipmap `mipmap_index`'s raw chunk bytes into an [`Image`].
    pub fn decode(
        &self,
        bytes: &[u8],
        mipmap_index: usize,
        header: &StreamHeader,
        deep_alpha_check: bool,
        sink: &mut dyn WarningSink,
    ) -> Result<Image, ProcessorError> {
        match self {
            Processor::Indexed(p) => Ok(p.decode(bytes, mipmap_index, header, sink)),
            Processor::Jpeg(p) => p.decode(bytes, mipmap_index, header, deep_alpha_check, sink),
        }
    }

    /// Encode every level of a full mipmap pyramid. The indexed processor
    /// can do this one level at a time; the JPEG processor needs every
    /// level at once to derive the shared header, so both paths are
    /// unified behind this one entry point.
    pub fn encode_all(
        &mut self,
        images: &[Image],
        header: &StreamHeader,
        quality: f32,
        sink: &mut dyn WarningSink,
    ) -> Result<Vec<Vec<u8>>, ProcessorError> {
        match self {
            Processor::Indexed(p) => images
                .iter()
                .enumerate()
                .map(|(i, image)| p.encode(image, header, i))
                .collect(),
            Processor::Jpeg(p) => p.encode_all(images, header.alpha_bits, quality, sink),
        }
    }

    /// Adopt a palette for indexed encoding (no-op for JPEG). Falls back to
    /// [`Palette::universal_fallback`] when neither an existing palette nor
    /// a supplied one is available.
    pub fn adopt_palette(&mut self, supplied: Option<Palette>) {
        if let Processor::Indexed(p) = self {
            let palette = supplied
                .unwrap_or_else(|| Palette::universal_fallback(crate::palette::ColorSpace::Srgb));
            p.palette = palette;
        }
    }
}
