use blp_codec::header::{BlpVersion, EncodingKind};
use blp_codec::raster::Image;
use blp_codec::writer::{EncodeOptions, Encoder};
use image::DynamicImage;

fn main() {
    let input_filename = std::env::args().nth(1).unwrap_or("test.png".to_owned());
    let output_filename = std::env::args().nth(2).unwrap_or("output.blp".to_owned());

    let img_file: DynamicImage = image::ImageReader::open(&input_filename)
        .expect("open")
        .decode()
        .expect("decode");
    let rgba = img_file.into_rgba8();
    let image = Image {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
        indexed: None,
    };

    let mut encoder = Encoder::new(
        BlpVersion::Blp1,
        EncodingKind::Indexed,
        1,
        EncodeOptions::default(),
    )
    .expect("valid encoder options");
    let encoded = encoder.write_single(&image).expect("encoded");
    encoded
        .write_to_path(std::path::Path::new(&output_filename))
        .expect("saved");
}
