//! Integration tests for BLP file parsing and encoding, covering the full
//! read/write pipeline across both versions and both payload encodings.

use blp_codec::header::{BlpVersion, EncodingKind};
use blp_codec::jpeg_codec::{JpegCodec, JpegCodecError};
use blp_codec::processor::JpegProcessor;
use blp_codec::raster::Raster4;
use blp_codec::reader::{Decoder, ReadOptions};
use blp_codec::warning::{WarningKind, WarningSink};
use blp_codec::writer::{EncodeOptions, Encoder};

/// A 1-pixel-precise stand-in for a real JPEG codec: serializes width, height
/// and raw pixel bytes verbatim (bar a small quantization step on encode to
/// emulate lossy compression). `JpegProcessor` only ever talks to the
/// [`JpegCodec`] trait, so this exercises its shared-header/band-reorder
/// machinery without depending on a real JPEG encoder's output being stable
/// across `image` crate versions.
struct LossyRasterCodec;

impl JpegCodec for LossyRasterCodec {
    fn vendor(&self) -> &'static str {
        "lossy-raster-test-double"
    }

    fn decode(&self, bytes: &[u8], _sink: &mut dyn WarningSink) -> Result<Raster4, JpegCodecError> {
        let width = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let height = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        Ok(Raster4 {
            width,
            height,
            pixels: bytes[8..].to_vec(),
        })
    }

    fn encode(
        &self,
        raster: &Raster4,
        _quality: f32,
        _sink: &mut dyn WarningSink,
    ) -> Result<Vec<u8>, JpegCodecError> {
        let mut out = Vec::with_capacity(8 + raster.pixels.len());
        out.extend_from_slice(&raster.width.to_le_bytes());
        out.extend_from_slice(&raster.height.to_le_bytes());
        // Round each sample to the nearest even value, the way block-based
        // quantization loses the low bit.
        out.extend(raster.pixels.iter().map(|&b| b & !1));
        Ok(out)
    }
}

/// A codec that always decodes with a single non-opaque pixel, regardless of
/// what it was handed, used to exercise the opaque-declared deep alpha check.
struct AlwaysTransparentCodec;

impl JpegCodec for AlwaysTransparentCodec {
    fn vendor(&self) -> &'static str {
        "always-transparent-test-double"
    }

    fn decode(
        &self,
        _bytes: &[u8],
        _sink: &mut dyn WarningSink,
    ) -> Result<Raster4, JpegCodecError> {
        Ok(Raster4 {
            width: 1,
            height: 1,
            pixels: vec![5, 6, 7, 40],
        })
    }

    fn encode(
        &self,
        raster: &Raster4,
        _quality: f32,
        _sink: &mut dyn WarningSink,
    ) -> Result<Vec<u8>, JpegCodecError> {
        Ok(raster.pixels.clone())
    }
}

fn header_for(
    encoding: EncodingKind,
    alpha_bits: u32,
    width: u32,
    height: u32,
) -> blp_codec::header::StreamHeader {
    blp_codec::header::StreamHeader {
        version: BlpVersion::Blp1,
        encoding,
        alpha_bits,
        width,
        height,
        has_mipmaps: false,
    }
}

/// Seed scenario 4: JPEG BLP1, 1x1, alphaBits=8, RGBA(10,20,30,128).
/// After RGBA->BGRA and a JPEG round-trip, the decoded pixel must be within
/// +/-2 per channel of the original.
#[test]
fn jpeg_round_trip_preserves_rgba_within_tolerance() {
    let header = header_for(EncodingKind::Jpeg, 8, 1, 1);
    let original = blp_codec::raster::Image {
        width: 1,
        height: 1,
        pixels: vec![10, 20, 30, 128],
        indexed: None,
    };

    let mut processor = JpegProcessor::with_codec(Box::new(LossyRasterCodec));
    let mut encode_sink = blp_codec::warning::NullWarningSink;
    let payloads = processor
        .encode_all(std::slice::from_ref(&original), 8, 0.9, &mut encode_sink)
        .unwrap();
    assert_eq!(payloads.len(), 1);

    let mut sink = blp_codec::warning::NullWarningSink;
    let decoded = processor
        .decode(&payloads[0], 0, &header, false, &mut sink)
        .unwrap();

    let expected = [10u8, 20, 30, 128];
    let actual = decoded.get_pixel(0, 0);
    for c in 0..4 {
        let diff = (expected[c] as i16 - actual[c] as i16).abs();
        assert!(
            diff <= 2,
            "channel {c}: expected {}, got {} (diff {diff})",
            expected[c],
            actual[c]
        );
    }
}

/// Seed scenario 5: BLP0 indexed external variant, 4x4 with mipmaps. The main
/// file carries only the header and palette; sidecars hold the raw index
/// buffers (16, 4, and 1 bytes for the three pyramid levels).
#[test]
fn external_variant_splits_mipmaps_into_sidecars() {
    let dir = tempfile::tempdir().unwrap();
    let blp_path = dir.path().join("wall.blp");

    let mut encoder = Encoder::new(
        BlpVersion::Blp0,
        EncodingKind::Indexed,
        0,
        EncodeOptions::default(),
    )
    .unwrap();
    let image = blp_codec::raster::Image::new(4, 4);
    let encoded = encoder.write_single(&image).unwrap();
    encoded.write_to_path(&blp_path).unwrap();

    let sidecars = encoded.sidecars.as_ref().unwrap();
    assert_eq!(sidecars.len(), 3);
    assert_eq!(sidecars[0].len(), 16);
    assert_eq!(sidecars[1].len(), 4);
    assert_eq!(sidecars[2].len(), 1);

    assert!(std::fs::metadata(dir.path().join("wall.b00")).is_ok());
    assert!(std::fs::metadata(dir.path().join("wall.b01")).is_ok());
    assert!(std::fs::metadata(dir.path().join("wall.b02")).is_ok());

    let mut decoder = Decoder::open(&blp_path).unwrap();
    assert_eq!(decoder.mipmap_count(), 3);
    assert_eq!(decoder.dimensions(0), (4, 4));
    assert_eq!(decoder.dimensions(1), (2, 2));
    assert_eq!(decoder.dimensions(2), (1, 1));

    for level in 0..3 {
        let img = decoder.read(level, ReadOptions::default()).unwrap();
        let (w, h) = decoder.dimensions(level);
        assert_eq!((img.width, img.height), (w, h));
    }
}

/// Seed scenario 6: a BLP1/JPEG/alphaBits=0 file whose embedded JPEG carries
/// a non-opaque pixel raises BAD_PIXEL_ALPHA exactly once, and the decoded
/// image is still reported opaque (the alpha band isn't exposed when
/// alphaBits == 0).
#[test]
fn opaque_jpeg_with_non_opaque_pixel_warns_once_and_stays_opaque() {
    let header = header_for(EncodingKind::Jpeg, 0, 1, 1);
    let processor = JpegProcessor::with_codec(Box::new(AlwaysTransparentCodec));

    let mut warnings = Vec::new();
    let mut sink = |kind| warnings.push(kind);
    let decoded = processor.decode(&[], 0, &header, true, &mut sink).unwrap();

    assert_eq!(warnings.len(), 1);
    assert!(matches!(warnings[0], WarningKind::BadPixelAlpha { .. }));
    assert_eq!(decoded.get_pixel(0, 0), [5, 6, 7, 255]);
}
