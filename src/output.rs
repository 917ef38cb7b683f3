//! Writing rendered images to disk

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::{Rgb, RgbImage};
use log::info;

use crate::{error::Result, render::RenderedImage, Color};

/// Gamma-correct for gamma = 2.0 and scale the color to between 0 and 255
///
/// Negative and NaN channels map to 0
pub fn encode_channel(val: f64) -> u8 {
    let gamma = val.max(0.0).sqrt();
    (256.0 * gamma.clamp(0.0, 0.999)) as u8
}

pub fn get_pixel(color: &Color) -> Rgb<u8> {
    Rgb([
        encode_channel(color[0]),
        encode_channel(color[1]),
        encode_channel(color[2]),
    ])
}

/// Write the image as a plain text PPM
pub fn write_ppm<W: Write>(image: &RenderedImage, mut writer: W) -> std::io::Result<()> {
    write!(writer, "P3\n{} {}\n255\n", image.width, image.height)?;
    for color in &image.pixels {
        let Rgb([r, g, b]) = get_pixel(color);
        writeln!(writer, "{r} {g} {b}")?;
    }
    writer.flush()
}

pub fn to_rgb_image(image: &RenderedImage) -> RgbImage {
    RgbImage::from_fn(image.width as u32, image.height as u32, |x, y| {
        get_pixel(&image.pixel(x as usize, y as usize))
    })
}

/// Save the image, `.ppm` files are written as text, anything else goes through `image`
pub fn save(image: &RenderedImage, path: &Path) -> Result<()> {
    let is_ppm = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("ppm"))
        .unwrap_or(false);
    if is_ppm {
        write_ppm(image, BufWriter::new(File::create(path)?))?;
    } else {
        to_rgb_image(image).save(path)?;
    }
    info!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> RenderedImage {
        RenderedImage {
            width: 2,
            height: 2,
            pixels: vec![
                Color::new(0.0, 0.25, 1.0),
                Color::new(4.0, -1.0, f64::NAN),
                Color::new(0.5, 0.5, 0.5),
                Color::new(1.0, 0.0, 0.0),
            ],
        }
    }

    #[test]
    fn test_encode_channel() {
        assert_eq!(encode_channel(0.0), 0);
        assert_eq!(encode_channel(0.25), 128);
        assert_eq!(encode_channel(1.0), 255);
        assert_eq!(encode_channel(25.0), 255);
        assert_eq!(encode_channel(-3.0), 0);
        assert_eq!(encode_channel(f64::NAN), 0);
    }

    #[test]
    fn test_write_ppm() {
        let mut buf = Vec::new();
        write_ppm(&tiny(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[..3], ["P3", "2 2", "255"]);
        assert_eq!(lines[3], "0 128 255");
        assert_eq!(lines[4], "255 0 0");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn test_to_rgb_image_is_row_major() {
        let img = to_rgb_image(&tiny());
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(*img.get_pixel(1, 1), Rgb([255, 0, 0]));
        assert_eq!(*img.get_pixel(0, 0), Rgb([0, 128, 255]));
    }
}
