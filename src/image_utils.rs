use std::{io::Cursor, path::Path, path::PathBuf};

use anyhow::{anyhow, Result};
use eframe::egui;
use fast_image_resize::{images::Image, PixelType, ResizeOptions, Resizer};
use image::{DynamicImage, RgbImage, RgbaImage};
use zune_jpeg::JpegDecoder;

/// A decoded photo ready to be uploaded as a texture.
pub struct PreloadedImage {
    pub path: PathBuf,
    pub color_image: egui::ColorImage,
    pub load_duration: std::time::Duration,
}

pub fn to_color_image(img: &DynamicImage) -> egui::ColorImage {
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let pixels = rgba.into_raw();
    egui::ColorImage::from_rgba_unmultiplied(size, &pixels)
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.eq_ignore_ascii_case("jpg") || s.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false)
}

/// Decodes JPEGs with zune-jpeg and everything else (or anything zune
/// rejects) with the `image` crate.
pub fn decode_image(path: &Path, bytes: &[u8]) -> Result<DynamicImage> {
    if is_jpeg(path) {
        if let Some(image) = decode_jpeg(bytes) {
            return Ok(image);
        }
    }
    image::load_from_memory(bytes)
        .map_err(|err| anyhow!("Failed to decode {}: {err}", path.display()))
}

fn decode_jpeg(bytes: &[u8]) -> Option<DynamicImage> {
    let mut decoder = JpegDecoder::new(Cursor::new(bytes));
    let pixels = decoder.decode().ok()?;
    let info = decoder.info()?;
    // Grayscale and CMYK output do not fit an RGB buffer and fall through.
    RgbImage::from_raw(info.width as u32, info.height as u32, pixels).map(DynamicImage::ImageRgb8)
}

/// Largest size with the same aspect ratio whose longer side is at most
/// `max_side`. Images that already fit are left alone.
pub fn fit_dimensions(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_side || longest == 0 {
        return (width, height);
    }
    let scale = max_side as f64 / longest as f64;
    let scaled = |side: u32| ((side as f64 * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

/// Shrinks `image` to the display target size.
pub fn downscale_for_display(image: DynamicImage, max_side: u32) -> Result<DynamicImage> {
    let (new_w, new_h) = fit_dimensions(image.width(), image.height(), max_side);
    if (new_w, new_h) == (image.width(), image.height()) {
        return Ok(image);
    }

    let rgba = image.to_rgba8();
    let src_image = Image::from_vec_u8(rgba.width(), rgba.height(), rgba.into_raw(), PixelType::U8x4)?;
    let mut dst_image = Image::new(new_w, new_h, PixelType::U8x4);
    let mut resizer = Resizer::new();
    resizer.resize(&src_image, &mut dst_image, &ResizeOptions::default())?;

    RgbaImage::from_raw(new_w, new_h, dst_image.into_vec())
        .map(DynamicImage::ImageRgba8)
        .ok_or_else(|| anyhow!("Resized buffer does not match {new_w}x{new_h}"))
}
