//! Shared-header JPEG payload processor (C4).

use crate::error::ProcessorError;
use crate::header::StreamHeader;
use crate::io_util::{ByteReader, Cursor};
use crate::jpeg_codec::{ImageJpegCodec, JpegCodec};
use crate::raster::{Image, Raster4};
use crate::warning::{WarningKind, WarningSink};

/// Soft ceiling on the shared JPEG header prelude (spec.md §3/§4.4).
pub const MAX_JPEG_HEADER: usize = 624;

/// JPEG content: a shared byte prefix plus one JPEG tail per mipmap, all
/// sharing the same [`JpegCodec`] session.
pub struct JpegProcessor {
    /// The byte prefix prepended to every mipmap's tail to reconstruct a
    /// complete JPEG stream.
    pub shared_header: Vec<u8>,
    codec: Box<dyn JpegCodec>,
}

impl std::fmt::Debug for JpegProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JpegProcessor")
            .field("shared_header_len", &self.shared_header.len())
            .field("codec", &self.codec.vendor())
            .finish()
    }
}

impl Default for JpegProcessor {
    fn default() -> Self {
        Self {
            shared_header: Vec::new(),
            codec: Box::new(ImageJpegCodec),
        }
    }
}

impl JpegProcessor {
    /// Build a processor around a specific host [`JpegCodec`].
    pub fn with_codec(codec: Box<dyn JpegCodec>) -> Self {
        Self {
            shared_header: Vec::new(),
            codec,
        }
    }

    /// Read the prelude: a little-endian `u32` length followed by that many
    /// bytes of shared header. Returns `(processor, bytes_consumed)`.
    pub fn read_prelude(
        bytes: &[u8],
        sink: &mut dyn WarningSink,
    ) -> Result<(Self, usize), ProcessorError> {
        let mut reader = Cursor::new(bytes);
        let len = reader.read_u32_le()? as usize;
        if len > reader.remaining() {
            return Err(crate::error::EndOfStream.into());
        }
        if len > MAX_JPEG_HEADER {
            sink.warn(WarningKind::BadJpegHeader {
                actual: len,
                limit: MAX_JPEG_HEADER,
            });
        }
        let header = reader.read_bytes(len)?;
        let consumed = reader.position();
        let mut processor = Self::default();
        processor.shared_header = header;
        Ok((processor, consumed))
    }

    /// Emit the prelude: a little-endian `u32` length followed by the
    /// shared header bytes.
    pub fn write_prelude(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.shared_header.len());
        out.extend_from_slice(&(self.shared_header.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.shared_header);
        out
    }

    /// Decode one mipmap: reassemble `shared_header || mipmap_bytes`,
    /// decode via the host codec, undo the `BGRA -> RGBA` storage order,
    /// reconcile dimensions, and optionally deep-check alpha.
    pub fn decode(
        &self,
        mipmap_bytes: &[u8],
        mipmap_index: usize,
        header: &StreamHeader,
        deep_check: bool,
        sink: &mut dyn WarningSink,
    ) -> Result<Image, ProcessorError> {
        let mut full = Vec::with_capacity(self.shared_header.len() + mipmap_bytes.len());
        full.extend_from_slice(&self.shared_header);
        full.extend_from_slice(mipmap_bytes);

        let mut raster = self.codec.decode(&full, sink)?;
        raster.swap_red_blue();

        let (expected_w, expected_h) = header.mipmap_size(mipmap_index);
        if raster.width != expected_w || raster.height != expected_h {
            sink.warn(WarningKind::BadMipmapDimension {
                mipmap: mipmap_index,
                expected: (expected_w, expected_h),
                actual: (raster.width, raster.height),
            });
            raster = raster.resize_canvas(expected_w, expected_h);
        }

        if deep_check && header.alpha_bits == 0 {
            let total_pixels = (expected_w as usize) * (expected_h as usize);
            let transparent_count = raster
                .pixels
                .chunks_exact(4)
                .filter(|px| px[3] != 255)
                .count();
            if transparent_count > 0 {
                sink.warn(WarningKind::BadPixelAlpha {
                    mipmap: mipmap_index,
                    transparent_count,
                    total_pixels,
                });
            }
        }

        let mut pixels = raster.pixels;
        if header.alpha_bits == 0 {
            // Alpha band is only exposed when alpha_bits == 8.
            for px in pixels.chunks_exact_mut(4) {
                px[3] = 255;
            }
        }

        Ok(Image {
            width: expected_w,
            height: expected_h,
            pixels,
            indexed: None,
        })
    }

    /// Encode every mipmap, then derive and strip the shared header
    /// (longest common byte prefix across all encodings, truncated to
    /// [`MAX_JPEG_HEADER`]). Needs every level at once, unlike the indexed
    /// processor, which can work level-by-level.
    pub fn encode_all(
        &mut self,
        images: &[Image],
        alpha_bits: u32,
        quality: f32,
        sink: &mut dyn WarningSink,
    ) -> Result<Vec<Vec<u8>>, ProcessorError> {
        let mut full_jpegs = Vec::with_capacity(images.len());
        for image in images {
            let mut raster = Raster4 {
                width: image.width,
                height: image.height,
                pixels: image.pixels.clone(),
            };
            if alpha_bits == 0 {
                for px in raster.pixels.chunks_exact_mut(4) {
                    px[3] = 255;
                }
            }
            raster.swap_red_blue();
            full_jpegs.push(self.codec.encode(&raster, quality, sink)?);
        }

        let shared_len = longest_common_prefix_len(&full_jpegs).min(MAX_JPEG_HEADER);
        self.shared_header = full_jpegs
            .first()
            .map(|j| j[..shared_len].to_vec())
            .unwrap_or_default();

        Ok(full_jpegs
            .into_iter()
            .map(|jpeg| jpeg[shared_len..].to_vec())
            .collect())
    }
}

/// Longest byte prefix common to every entry in `buffers` (0 if empty or if
/// `buffers` is empty).
fn longest_common_prefix_len(buffers: &[Vec<u8>]) -> usize {
    let Some(first) = buffers.first() else {
        return 0;
    };
    let mut len = first.len();
    for buf in &buffers[1..] {
        len = len.min(buf.len());
        len = (0..len).take_while(|&i| buf[i] == first[i]).count().min(len);
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_header_is_longest_common_prefix() {
        let buffers = vec![
            vec![1u8, 2, 3, 4, 5, 6],
            vec![1u8, 2, 3, 0, 0],
        ];
        assert_eq!(longest_common_prefix_len(&buffers), 3);
    }

    /// A test double whose encoded output is a fixed 700-byte filler prefix
    /// (longer than [`MAX_JPEG_HEADER`]) followed by the raw raster bytes,
    /// modeling how a real JPEG's quantization-table header is
    /// encoder-setting-driven while its entropy-coded scan data is
    /// content-driven.
    struct FixedPrefixCodec;

    impl JpegCodec for FixedPrefixCodec {
        fn vendor(&self) -> &'static str {
            "fixed-prefix-test-double"
        }

        fn decode(
            &self,
            _bytes: &[u8],
            _sink: &mut dyn WarningSink,
        ) -> Result<Raster4, crate::jpeg_codec::JpegCodecError> {
            unimplemented!("not exercised by this test")
        }

        fn encode(
            &self,
            raster: &Raster4,
            _quality: f32,
            _sink: &mut dyn WarningSink,
        ) -> Result<Vec<u8>, crate::jpeg_codec::JpegCodecError> {
            let mut out = vec![0xAAu8; 700];
            out.extend_from_slice(&raster.pixels);
            Ok(out)
        }
    }

    #[test]
    fn encode_all_truncates_shared_header_to_max() {
        let images = vec![
            Image {
                width: 1,
                height: 1,
                pixels: vec![1, 2, 3, 255],
                indexed: None,
            },
            Image {
                width: 1,
                height: 1,
                pixels: vec![9, 8, 7, 255],
                indexed: None,
            },
            Image {
                width: 1,
                height: 1,
                pixels: vec![50, 60, 70, 255],
                indexed: None,
            },
        ];

        let mut processor = JpegProcessor::with_codec(Box::new(FixedPrefixCodec));
        let mut sink = crate::warning::NullWarningSink;
        let payloads = processor.encode_all(&images, 8, 0.9, &mut sink).unwrap();

        // The common 700-byte filler is longer than MAX_JPEG_HEADER, so the
        // shared header is capped there rather than absorbing the whole
        // filler.
        assert_eq!(processor.shared_header, vec![0xAAu8; MAX_JPEG_HEADER]);

        // Each payload carries the leftover filler bytes plus the full
        // (swapped) pixel data, none of it lost to the cap.
        let leftover_filler = 700 - MAX_JPEG_HEADER;
        for payload in &payloads {
            assert_eq!(payload.len(), leftover_filler + 4);
            assert_eq!(&payload[..leftover_filler], &vec![0xAAu8; leftover_filler][..]);
        }
        // The per-mipmap tails still differ, since the source pixels did.
        assert_ne!(payloads[0], payloads[1]);
        assert_ne!(payloads[1], payloads[2]);
    }

    #[test]
    fn empty_input_has_no_shared_header() {
        assert_eq!(longest_common_prefix_len(&[]), 0);
    }

    #[test]
    fn prelude_round_trips() {
        let mut warnings = vec![];
        let mut sink = |k| warnings.push(k);
        let mut proc = JpegProcessor::default();
        proc.shared_header = vec![1, 2, 3, 4, 5];
        let bytes = proc.write_prelude();
        let (parsed, consumed) = JpegProcessor::read_prelude(&bytes, &mut sink).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(parsed.shared_header, proc.shared_header);
        assert!(warnings.is_empty());
    }

    #[test]
    fn oversized_header_warns_but_succeeds() {
        let mut header_bytes = vec![0u8; 4 + MAX_JPEG_HEADER + 1];
        header_bytes[0..4].copy_from_slice(&((MAX_JPEG_HEADER + 1) as u32).to_le_bytes());
        let mut warnings = vec![];
        let mut sink = |k| warnings.push(k);
        let (parsed, _) = JpegProcessor::read_prelude(&header_bytes, &mut sink).unwrap();
        assert_eq!(parsed.shared_header.len(), MAX_JPEG_HEADER + 1);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], WarningKind::BadJpegHeader { .. }));
    }

    #[test]
    fn header_longer_than_stream_is_fatal() {
        let mut header_bytes = vec![0u8; 4 + 2];
        header_bytes[0..4].copy_from_slice(&100u32.to_le_bytes());
        let mut sink = crate::warning::NullWarningSink;
        assert!(JpegProcessor::read_prelude(&header_bytes, &mut sink).is_err());
    }
}
