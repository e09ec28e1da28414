use blp_codec::reader::{Decoder, ReadOptions};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        println!("Usage: {} <input.blp> [output.png]", args[0]);
        println!("\nExample: Convert a BLP texture file to PNG");
        return;
    }

    let blp_filename = &args[1];
    let output_filename = args.get(2).map(String::as_str).unwrap_or("output.png");

    match Decoder::open(blp_filename) {
        Ok(mut decoder) => {
            println!("✓ Loaded BLP file: {blp_filename}");
            println!("  Version: {:?}", decoder.version());
            let (w, h) = decoder.dimensions(0);
            println!("  Dimensions: {w}x{h}");
            println!("  Mipmaps: {}", decoder.mipmap_count());

            match decoder.read(0, ReadOptions::default()) {
                Ok(image) => {
                    let buf = match image::RgbaImage::from_raw(image.width, image.height, image.pixels) {
                        Some(buf) => buf,
                        None => {
                            eprintln!("✗ Decoded raster size doesn't match its own dimensions");
                            return;
                        }
                    };
                    match buf.save(output_filename) {
                        Ok(_) => println!("✓ Saved as: {output_filename}"),
                        Err(e) => eprintln!("✗ Failed to save image: {e}"),
                    }
                }
                Err(e) => eprintln!("✗ Failed to decode mipmap 0: {e}"),
            }
        }
        Err(e) => {
            eprintln!("✗ Failed to load BLP file '{blp_filename}': {e}");
            eprintln!("\nTip: Make sure the file exists and is a valid BLP texture file.");
        }
    }
}
