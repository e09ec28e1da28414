//! Indexed (palette + optional sub-byte alpha) payload processor (C3).

use crate::error::ProcessorError;
use crate::header::StreamHeader;
use crate::palette::{rescale_alpha, Palette};
use crate::raster::{Image, IndexedPixels};
use crate::sample_layout::PackedSampleLayout;
use crate::warning::{WarningKind, WarningSink};

/// 256-entry-palette indexed content. The prelude (256 little-endian `u32`
/// palette words, 1024 bytes) is read once per session and applies to every
/// mipmap.
#[derive(Debug, Clone)]
pub struct IndexedProcessor {
    /// The active 256-entry palette.
    pub palette: Palette,
}

impl IndexedProcessor {
    /// Byte size of the palette prelude (256 little-endian `u32` words).
    pub const PRELUDE_SIZE: usize = 1024;

    /// Wrap an already-known palette (e.g. freshly built for an encode
    /// session).
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    /// Read exactly 1024 bytes (256 little-endian `u32` words) as the
    /// palette prelude. Unused words are preserved verbatim.
    pub fn read_prelude(bytes: &[u8]) -> Result<Self, ProcessorError> {
        if bytes.len() < Self::PRELUDE_SIZE {
            return Err(crate::error::EndOfStream.into());
        }
        let mut words = [0u32; 256];
        for (i, word) in words.iter_mut().enumerate() {
            let off = i * 4;
            *word = u32::from_le_bytes(bytes[off..off + 4].try_into().unwrap());
        }
        Ok(Self::new(Palette::from_words(&words)))
    }

    /// Emit exactly 1024 bytes (256 little-endian `u32` words).
    pub fn write_prelude(&self) -> [u8; Self::PRELUDE_SIZE] {
        let words = self.palette.to_words();
        let mut out = [0u8; Self::PRELUDE_SIZE];
        for (i, w) in words.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&w.to_le_bytes());
        }
        out
    }

    /// Decode one mipmap's byte blob into an [`Image`], fixing up a
    /// wrong-sized buffer by zero-padding or truncating (non-fatal,
    /// reported as [`WarningKind::BadDataBuffer`]).
    pub fn decode(
        &self,
        bytes: &[u8],
        mipmap_index: usize,
        header: &StreamHeader,
        sink: &mut dyn WarningSink,
    ) -> Image {
        let (w, h) = header.mipmap_size(mipmap_index);
        let alpha_bits = header.alpha_bits as u8;
        let layout = PackedSampleLayout::new(w, h, alpha_bits);
        let expected = layout.buffer_size();

        let buf: Vec<u8> = if bytes.len() != expected {
            sink.warn(WarningKind::BadDataBuffer {
                mipmap: mipmap_index,
                actual: bytes.len(),
                expected,
            });
            let mut fixed = bytes.to_vec();
            fixed.resize(expected, 0);
            fixed
        } else {
            bytes.to_vec()
        };

        let mut image = Image::new(w, h);
        let mut palette_indices = Vec::with_capacity((w * h) as usize);
        let mut alpha_samples = Vec::with_capacity(if alpha_bits > 0 { (w * h) as usize } else { 0 });

        for y in 0..h {
            for x in 0..w {
                let index = layout.get_index(&buf, x, y).unwrap_or(0);
                let rgb = self.palette.entry(index);
                let alpha8 = if alpha_bits > 0 {
                    let sample = layout.get_alpha(&buf, x, y).unwrap_or(0);
                    alpha_samples.push(sample);
                    rescale_alpha(sample, alpha_bits, 8)
                } else {
                    255
                };
                image.set_pixel(x, y, [rgb[0], rgb[1], rgb[2], alpha8]);
                palette_indices.push(index);
            }
        }

        image.indexed = Some(IndexedPixels {
            palette_indices,
            alpha_samples,
            alpha_bits,
        });
        image
    }

    /// Encode one mipmap. If `image.indexed` already conforms to this
    /// encoding's `(w, h, alpha_bits)`, its buffer is copied through
    /// verbatim; otherwise the raster is rebuilt by rescaling alpha (or
    /// quantizing RGB to the nearest palette entry when no indexed side
    /// channel is present).
    pub fn encode(
        &self,
        image: &Image,
        header: &StreamHeader,
        mipmap_index: usize,
    ) -> Result<Vec<u8>, ProcessorError> {
        let (w, h) = header.mipmap_size(mipmap_index);
        let alpha_bits = header.alpha_bits as u8;
        let layout = PackedSampleLayout::new(w, h, alpha_bits);
        let mut buf = vec![0u8; layout.buffer_size()];

        if let Some(idx) = &image.indexed {
            if image.width == w && image.height == h {
                for y in 0..h {
                    for x in 0..w {
                        let i = (y * w + x) as usize;
                        layout.set_index(&mut buf, x, y, idx.palette_indices[i])?;
                        if alpha_bits > 0 {
                            let sample = if idx.alpha_bits > 0 {
                                idx.alpha_samples.get(i).copied().unwrap_or(0)
                            } else {
                                0
                            };
                            let rescaled = rescale_alpha(sample, idx.alpha_bits, alpha_bits);
                            layout.set_alpha(&mut buf, x, y, rescaled)?;
                        }
                    }
                }
                return Ok(buf);
            }
        }

        // No usable indexed side channel: quantize RGB against the active
        // palette (best-effort nearest neighbor, spec.md §4.2).
        let model = crate::palette::IndexPaletteModel::new(self.palette.clone(), crate::palette::ColorSpace::Srgb);
        for y in 0..h.min(image.height) {
            for x in 0..w.min(image.width) {
                let [r, g, b, a] = image.get_pixel(x, y);
                let index = model.quantize([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]);
                layout.set_index(&mut buf, x, y, index)?;
                if alpha_bits > 0 {
                    let sample = rescale_alpha(a, 8, alpha_bits);
                    layout.set_alpha(&mut buf, x, y, sample)?;
                } else {
                    let _ = a;
                }
            }
        }
        if alpha_bits > 0 {
            // Pixels outside the source image's bounds (shouldn't normally
            // happen; dimensions are driven by the header) get max alpha.
            for y in 0..h {
                for x in 0..w {
                    if x >= image.width || y >= image.height {
                        let max_alpha = ((1u32 << alpha_bits) - 1) as u8;
                        layout.set_alpha(&mut buf, x, y, max_alpha)?;
                    }
                }
            }
        }
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{BlpVersion, EncodingKind};
    use crate::warning::NullWarningSink;

    fn header(w: u32, h: u32, alpha_bits: u32) -> StreamHeader {
        StreamHeader {
            version: BlpVersion::Blp1,
            encoding: EncodingKind::Indexed,
            alpha_bits,
            width: w,
            height: h,
            has_mipmaps: false,
        }
    }

    #[test]
    fn scenario_1_two_by_two_no_alpha() {
        let mut words = [0u32; 256];
        words[0] = 0x00_0000_FF; // red
        words[1] = 0x00_00_FF00; // green
        words[2] = 0x00_FF_0000; // blue
        words[3] = 0x00_FF_FFFF; // white
        let proc = IndexedProcessor::new(Palette::from_words(&words));
        let payload = vec![0u8, 1, 2, 3];
        let h = header(2, 2, 0);
        let mut sink = NullWarningSink;
        let image = proc.decode(&payload, 0, &h, &mut sink);
        assert_eq!(image.get_pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(1, 0), [0, 255, 0, 255]);
        assert_eq!(image.get_pixel(0, 1), [0, 0, 255, 255]);
        assert_eq!(image.get_pixel(1, 1), [255, 255, 255, 255]);

        let encoded = proc.encode(&image, &h, 0).unwrap();
        assert_eq!(encoded, payload);
    }

    #[test]
    fn scenario_2_one_bit_alpha() {
        let proc = IndexedProcessor::new(Palette::from_entries(&[[0, 0, 0]; 256]));
        let h = header(4, 1, 1);
        let payload = vec![0u8, 0, 0, 0, 0x05];
        let mut sink = NullWarningSink;
        let image = proc.decode(&payload, 0, &h, &mut sink);
        let encoded = proc.encode(&image, &h, 0).unwrap();
        assert_eq!(encoded, payload);
    }

    #[test]
    fn scenario_3_four_bit_alpha() {
        let proc = IndexedProcessor::new(Palette::from_entries(&[[0, 0, 0]; 256]));
        let h = header(2, 1, 4);
        let payload = vec![0u8, 0, 0x3A];
        let mut sink = NullWarningSink;
        let image = proc.decode(&payload, 0, &h, &mut sink);
        let encoded = proc.encode(&image, &h, 0).unwrap();
        assert_eq!(encoded, payload);
    }

    #[test]
    fn short_buffer_is_padded_and_warns() {
        let proc = IndexedProcessor::new(Palette::from_entries(&[[1, 2, 3]; 256]));
        let h = header(4, 1, 1); // expects 5 bytes
        let payload = vec![0u8, 0, 0, 0]; // one byte short
        let mut warnings = vec![];
        let mut sink = |k: WarningKind| warnings.push(k);
        let image = proc.decode(&payload, 0, &h, &mut sink);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], WarningKind::BadDataBuffer { .. }));
        assert_eq!(image.width, 4);
    }

    #[test]
    fn identical_palette_quantizes_to_index_zero() {
        let proc = IndexedProcessor::new(Palette::from_entries(&[[42, 42, 42]; 256]));
        let h = header(1, 1, 0);
        let mut image = Image::new(1, 1);
        image.set_pixel(0, 0, [200, 10, 10, 255]);
        let encoded = proc.encode(&image, &h, 0).unwrap();
        assert_eq!(encoded[0], 0);
    }
}
