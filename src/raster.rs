//! Public pixel raster type and the raw-RGBA shape the JPEG codec boundary
//! speaks (§9's `Raster`/`PixelFormat`/`ColorModel` triad, expressed as
//! plain records rather than a class hierarchy).

use custom_debug::Debug as CustomDebug;

use crate::debug::trimmed_bytes_fmt;

/// Per-pixel palette index and raw (unrescaled) alpha sample, kept around so
/// an indexed mipmap that was decoded and never touched can be re-encoded
/// byte-for-byte (spec.md §4.3 Encode: "copy its data buffer verbatim").
#[derive(CustomDebug, Clone, PartialEq, Eq)]
pub struct IndexedPixels {
    /// One palette index per pixel, row-major.
    #[debug(with = trimmed_bytes_fmt)]
    pub palette_indices: Vec<u8>,
    /// One alpha sample per pixel, already unpacked to a plain byte in
    /// `[0, 2^alpha_bits - 1]`. Empty when the source had no alpha band.
    #[debug(with = trimmed_bytes_fmt)]
    pub alpha_samples: Vec<u8>,
    /// Bit depth `alpha_samples` values were packed at.
    pub alpha_bits: u8,
}

/// A decoded (or about-to-be-encoded) image: plain interleaved RGBA8,
/// row-major, top-to-bottom, left-to-right.
#[derive(CustomDebug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes, RGBA order.
    #[debug(with = trimmed_bytes_fmt)]
    pub pixels: Vec<u8>,
    /// Present only when this image was decoded from indexed content;
    /// carried so a round-trip re-encode can skip re-quantizing.
    pub indexed: Option<IndexedPixels>,
}

impl Image {
    /// Allocate a new all-zero (transparent black) RGBA8 image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * 4],
            indexed: None,
        }
    }

    /// Read the RGBA8 pixel at `(x, y)`.
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Write the RGBA8 pixel at `(x, y)`.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels[i..i + 4].copy_from_slice(&rgba);
    }

    /// Downscale by 2x2 area averaging, flooring odd dimensions to 1.
    /// Used to build the auto-mipmap pyramid and to apply `Ratio`/`Clamp`
    /// dimension optimization.
    pub fn downscale_area_average(&self, new_width: u32, new_height: u32) -> Image {
        let mut out = Image::new(new_width, new_height);
        if new_width == 0 || new_height == 0 {
            return out;
        }
        let x_ratio = self.width as f64 / new_width as f64;
        let y_ratio = self.height as f64 / new_height as f64;

        for oy in 0..new_height {
            let sy0 = (oy as f64 * y_ratio).floor() as u32;
            let sy1 = (((oy + 1) as f64 * y_ratio).ceil() as u32)
                .max(sy0 + 1)
                .min(self.height);
            for ox in 0..new_width {
                let sx0 = (ox as f64 * x_ratio).floor() as u32;
                let sx1 = (((ox + 1) as f64 * x_ratio).ceil() as u32)
                    .max(sx0 + 1)
                    .min(self.width);

                let mut acc = [0u64; 4];
                let mut count = 0u64;
                for sy in sy0..sy1 {
                    for sx in sx0..sx1 {
                        let p = self.get_pixel(sx, sy);
                        for c in 0..4 {
                            acc[c] += p[c] as u64;
                        }
                        count += 1;
                    }
                }
                let count = count.max(1);
                let avg = [
                    (acc[0] / count) as u8,
                    (acc[1] / count) as u8,
                    (acc[2] / count) as u8,
                    (acc[3] / count) as u8,
                ];
                out.set_pixel(ox, oy, avg);
            }
        }
        out
    }
}

/// The raw raster shape the [`crate::jpeg_codec::JpegCodec`] boundary speaks:
/// always RGBA8, always 4 bands, independent of what the BLP payload above
/// it ultimately exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster4 {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl Raster4 {
    /// Apply the self-inverse `[2, 1, 0, 3]` band permutation in place
    /// (swaps the R and B bands; used both `BGRA -> RGBA` and `RGBA -> BGRA`).
    pub fn swap_red_blue(&mut self) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.swap(0, 2);
        }
    }

    /// Crop or zero-pad (transparent black, on the right/bottom edges) to
    /// `(new_width, new_height)`.
    pub fn resize_canvas(&self, new_width: u32, new_height: u32) -> Raster4 {
        let mut out = Raster4 {
            width: new_width,
            height: new_height,
            pixels: vec![0u8; new_width as usize * new_height as usize * 4],
        };
        let copy_w = self.width.min(new_width);
        let copy_h = self.height.min(new_height);
        for y in 0..copy_h {
            let src_row = (y as usize * self.width as usize) * 4;
            let dst_row = (y as usize * new_width as usize) * 4;
            let len = copy_w as usize * 4;
            out.pixels[dst_row..dst_row + len]
                .copy_from_slice(&self.pixels[src_row..src_row + len]);
        }
        out
    }
}
