//! Encode driver (C7): dimension optimization, auto-mipmap generation, and
//! the inverse of [`crate::reader::Decoder`]'s file layout.

use std::path::Path;

use crate::error::{EncodeError, Error, HeaderError};
use crate::header::{BlpVersion, EncodingKind, HEADER_SIZE, StreamHeader};
use crate::mipmap::{MipmapDirectory, MipmapManager};
use crate::palette::{ColorSpace, Palette};
use crate::processor::{IndexedProcessor, JpegProcessor, Processor};
use crate::raster::Image;
use crate::warning::{LogWarningSink, WarningSink};

/// How to reconcile a source image larger than the format's `2^16` ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DimensionOptimization {
    /// Reject oversized images outright.
    None,
    /// Scale both axes down by the same factor, preserving aspect ratio.
    #[default]
    Ratio,
    /// Clamp each axis independently, changing the aspect ratio if needed.
    Clamp,
}

/// Default target dimension for `Ratio`/`Clamp` dimension optimization.
/// Distinct from [`crate::header::MAX_DIMENSION`], the format's absolute
/// `2^16` ceiling: this is the write-path's own convention for how large an
/// auto-optimized texture should be, and nothing in the source material
/// pins down an authoritative value, so it's exposed as a knob on
/// [`EncodeOptions`] rather than a hardcoded constant.
pub const DEFAULT_ENCODE_MAX_DIMENSION: u32 = 512;

/// Options controlling an [`Encoder::write_single`] call.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// JPEG quality in `0.0..=1.0`. Ignored for indexed content.
    pub quality: f32,
    /// How to handle a source image exceeding `max_dimension`.
    pub dimension_optimization: DimensionOptimization,
    /// The ceiling `Ratio`/`Clamp` dimension optimization targets.
    /// `None` dimension optimization instead rejects anything over
    /// [`crate::header::MAX_DIMENSION`], the format's own hard ceiling.
    pub max_dimension: u32,
    /// Build a full mipmap pyramid via 2x2 area averaging. When `false`,
    /// the file carries only level 0.
    pub auto_mipmaps: bool,
    /// Palette to encode indexed content against. `None` falls back to
    /// [`Palette::universal_fallback`]. Ignored for JPEG content.
    pub palette: Option<Palette>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            quality: 0.9,
            dimension_optimization: DimensionOptimization::default(),
            max_dimension: DEFAULT_ENCODE_MAX_DIMENSION,
            auto_mipmaps: true,
            palette: None,
        }
    }
}

/// The two pieces an encode produces: the main `.blp` bytes, and — for
/// [`BlpVersion::Blp0`] — one sidecar payload per mipmap level beyond what
/// the main file carries.
#[derive(Debug, Clone)]
pub struct EncodedBlp {
    /// Complete bytes of the main `.blp` file.
    pub main_file: Vec<u8>,
    /// `Some` only for [`BlpVersion::Blp0`]: one sidecar payload per level,
    /// to be written at the path [`crate::path::make_mipmap_path`] derives.
    pub sidecars: Option<Vec<Vec<u8>>>,
}

impl EncodedBlp {
    /// Write the main file to `path`, and — if this encode produced
    /// external sidecars — write those alongside it.
    pub fn write_to_path(&self, path: &Path) -> Result<(), Error> {
        std::fs::write(path, &self.main_file).map_err(|e| Error::Io(path.to_path_buf(), e))?;
        if let Some(sidecars) = &self.sidecars {
            MipmapManager::write_external_sidecars(path, sidecars)?;
        }
        Ok(())
    }
}

/// Encodes RGBA8 [`Image`]s into a BLP byte stream.
pub struct Encoder {
    version: BlpVersion,
    encoding: EncodingKind,
    alpha_bits: u32,
    options: EncodeOptions,
    warning_sink: Box<dyn WarningSink>,
}

impl Encoder {
    /// Build an encoder targeting `version`/`encoding`/`alpha_bits`. Fails
    /// immediately if `alpha_bits` isn't one `encoding` accepts.
    pub fn new(
        version: BlpVersion,
        encoding: EncodingKind,
        alpha_bits: u32,
        options: EncodeOptions,
    ) -> Result<Self, Error> {
        if !encoding.allowed_alpha_bits().contains(&alpha_bits) {
            return Err(HeaderError::UnsupportedAlpha {
                bits: alpha_bits,
                encoding,
            }
            .into());
        }
        Ok(Self {
            version,
            encoding,
            alpha_bits,
            options,
            warning_sink: Box::new(LogWarningSink),
        })
    }

    /// Replace the sink every subsequent encode call reports non-fatal
    /// warnings to. Defaults to [`LogWarningSink`].
    pub fn set_warning_sink(&mut self, sink: Box<dyn WarningSink>) {
        self.warning_sink = sink;
    }

    fn optimize_dimensions(&self, image: &Image) -> Result<Image, Error> {
        use crate::header::MAX_DIMENSION;
        let (w, h) = (image.width, image.height);
        match self.options.dimension_optimization {
            DimensionOptimization::None => {
                if w > MAX_DIMENSION {
                    return Err(EncodeError::WidthTooHigh(w).into());
                }
                if h > MAX_DIMENSION {
                    return Err(EncodeError::HeightTooHigh(h).into());
                }
                Ok(image.clone())
            }
            DimensionOptimization::Ratio => {
                let max = self.options.max_dimension.min(MAX_DIMENSION);
                if w <= max && h <= max {
                    return Ok(image.clone());
                }
                let scale = (max as f64 / w.max(h) as f64).min(1.0);
                let nw = ((w as f64 * scale).floor() as u32).max(1);
                let nh = ((h as f64 * scale).floor() as u32).max(1);
                Ok(image.downscale_area_average(nw, nh))
            }
            DimensionOptimization::Clamp => {
                let max = self.options.max_dimension.min(MAX_DIMENSION);
                if w <= max && h <= max {
                    return Ok(image.clone());
                }
                let nw = w.min(max);
                let nh = h.min(max);
                Ok(image.downscale_area_average(nw, nh))
            }
        }
    }

    fn build_pyramid(&self, base: Image) -> Vec<Image> {
        if !self.options.auto_mipmaps {
            return vec![base];
        }
        let max_dim = base.width.max(base.height).max(1);
        let count = (u32::BITS - max_dim.leading_zeros()) as usize;
        (0..count)
            .map(|i| {
                if i == 0 {
                    base.clone()
                } else {
                    let nw = (base.width >> i).max(1);
                    let nh = (base.height >> i).max(1);
                    base.downscale_area_average(nw, nh)
                }
            })
            .collect()
    }

    /// Encode a single image, optimizing its dimensions and (optionally)
    /// building its mipmap pyramid automatically.
    pub fn write_single(&mut self, image: &Image) -> Result<EncodedBlp, Error> {
        let optimized = self.optimize_dimensions(image)?;
        let levels = self.build_pyramid(optimized);
        self.encode_pyramid(levels)
    }

    /// Encode an already-built mipmap pyramid verbatim. `levels.len()` must
    /// match the level-0 dimensions' natural mipmap count whenever more
    /// than one level is supplied, and each level's dimensions must match
    /// [`StreamHeader::mipmap_size`].
    pub fn write_levels(&mut self, levels: Vec<Image>) -> Result<EncodedBlp, Error> {
        self.encode_pyramid(levels)
    }

    fn encode_pyramid(&mut self, levels: Vec<Image>) -> Result<EncodedBlp, Error> {
        let base = levels
            .first()
            .ok_or(EncodeError::WrongLevelCount {
                expected: 1,
                actual: 0,
            })?
            .clone();

        let has_mipmaps = levels.len() > 1;
        let header = StreamHeader {
            version: self.version,
            encoding: self.encoding,
            alpha_bits: self.alpha_bits,
            width: base.width,
            height: base.height,
            has_mipmaps,
        };

        let expected_count = header.mipmap_count();
        if levels.len() != expected_count {
            return Err(EncodeError::WrongLevelCount {
                expected: expected_count,
                actual: levels.len(),
            }
            .into());
        }
        for (i, level) in levels.iter().enumerate() {
            let (expected_w, expected_h) = header.mipmap_size(i);
            if level.width != expected_w || level.height != expected_h {
                return Err(EncodeError::WrongLevelDimensions {
                    level: i,
                    expected_w,
                    expected_h,
                    actual_w: level.width,
                    actual_h: level.height,
                }
                .into());
            }
        }

        let mut processor = match self.encoding {
            EncodingKind::Indexed => {
                Processor::Indexed(IndexedProcessor::new(Palette::universal_fallback(
                    ColorSpace::Srgb,
                )))
            }
            EncodingKind::Jpeg => Processor::Jpeg(JpegProcessor::default()),
        };
        processor.adopt_palette(self.options.palette.clone());

        let payloads = processor.encode_all(
            &levels,
            &header,
            self.options.quality,
            self.warning_sink.as_mut(),
        )?;
        let prelude = processor.write_prelude();

        if header.version.has_internal_mipmaps() {
            let prelude_end = HEADER_SIZE + MipmapDirectory::SIZE + prelude.len();
            let directory = MipmapManager::build_internal_directory(prelude_end, &payloads);
            let mut main_file =
                Vec::with_capacity(prelude_end + payloads.iter().map(Vec::len).sum::<usize>());
            main_file.extend_from_slice(&header.write());
            main_file.extend_from_slice(&directory.write());
            main_file.extend_from_slice(&prelude);
            for payload in &payloads {
                main_file.extend_from_slice(payload);
            }
            Ok(EncodedBlp {
                main_file,
                sidecars: None,
            })
        } else {
            let mut main_file = Vec::with_capacity(HEADER_SIZE + prelude.len());
            main_file.extend_from_slice(&header.write());
            main_file.extend_from_slice(&prelude);
            Ok(EncodedBlp {
                main_file,
                sidecars: Some(payloads),
            })
        }
    }
}
