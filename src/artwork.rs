use anyhow::{Context, Result};
use eframe::egui::ColorImage;
use image::{imageops::overlay, DynamicImage, GenericImageView, Rgba, RgbaImage};

// Spotify embeds its wordmark in a fixed band of GSMTC thumbnails; this crop
// removes it and leaves the square cover.
const SPOTIFY_CROP: (u32, u32, u32, u32) = (33, 0, 234, 234);

/// Decode raw thumbnail bytes and normalize them for display and palette
/// extraction: Spotify artwork gets the wordmark band cropped, everything
/// else is padded to a square on a black matte.
pub fn decode_artwork(bytes: &[u8], app_id: Option<&str>) -> Result<ColorImage> {
    let img = image::load_from_memory(bytes).context("Failed to decode thumbnail")?;
    let img = if is_spotify(app_id) {
        crop_wordmark(&img)
    } else {
        pad_square(&img)
    };
    Ok(to_color_image(&img))
}

fn is_spotify(app_id: Option<&str>) -> bool {
    app_id
        .map(|id| id.to_lowercase().contains("spotify"))
        .unwrap_or(false)
}

fn crop_wordmark(img: &DynamicImage) -> DynamicImage {
    let (x, y, w, h) = SPOTIFY_CROP;
    let (width, height) = img.dimensions();
    if width < x + w || height < h {
        // Unexpected dimensions; keep the artwork intact rather than clip it.
        return pad_square(img);
    }
    img.crop_imm(x, y, w, h)
}

fn pad_square(img: &DynamicImage) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width == height {
        return img.clone();
    }

    let size = width.max(height);
    let mut square = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 255]));
    let x = (size - width) / 2;
    let y = (size - height) / 2;
    overlay(&mut square, &img.to_rgba8(), x.into(), y.into());
    DynamicImage::ImageRgba8(square)
}

fn to_color_image(img: &DynamicImage) -> ColorImage {
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let pixels = rgba.into_raw();
    ColorImage::from_rgba_unmultiplied(size, &pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([90, 120, 200, 255]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .expect("encode test image");
        buf.into_inner()
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(decode_artwork(&[0u8, 1, 2, 3], None).is_err());
    }

    #[test]
    fn non_square_artwork_is_padded_square() {
        let bytes = png_bytes(40, 20);
        let image = decode_artwork(&bytes, Some("vlc")).expect("decode");
        assert_eq!(image.size, [40, 40]);
    }

    #[test]
    fn spotify_artwork_gets_the_wordmark_cropped() {
        let bytes = png_bytes(300, 300);
        let image = decode_artwork(&bytes, Some("Spotify.exe")).expect("decode");
        assert_eq!(image.size, [234, 234]);
    }

    #[test]
    fn undersized_spotify_artwork_is_left_uncropped() {
        let bytes = png_bytes(64, 64);
        let image = decode_artwork(&bytes, Some("spotify")).expect("decode");
        assert_eq!(image.size, [64, 64]);
    }
}
