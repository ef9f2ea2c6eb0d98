//! Compositing an aura over a photo and encoding results for download.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, ImageEncoder, RgbImage, RgbaImage};
use ndarray::{Axis, Zip};

use super::RgbaField;
use crate::color::to_channel;
use crate::config::ExportConfig;
use crate::error::{KirlianError, KirlianResult};

/// Alpha-blend `aura` over `photo`.
///
/// The aura is resized to the photo when their sizes differ. Photo alpha
/// is kept as is. If compositing fails the photo is returned unchanged.
pub fn overlay_aura(photo: &RgbaImage, aura: &RgbaField) -> RgbaImage {
    match try_overlay(photo, aura) {
        Ok(result) => result,
        Err(err) => {
            tracing::warn!(error = %err, "aura overlay failed, keeping original photo");
            photo.clone()
        }
    }
}

fn try_overlay(photo: &RgbaImage, aura: &RgbaField) -> KirlianResult<RgbaImage> {
    let (width, height) = photo.dimensions();
    if width == 0 || height == 0 {
        return Err(KirlianError::InvalidInput("photo is empty".into()));
    }
    if aura.width() == 0 || aura.height() == 0 {
        return Err(KirlianError::InvalidInput("aura is empty".into()));
    }

    let aura = if (aura.width(), aura.height()) != (width, height) {
        tracing::debug!(
            from = ?(aura.width(), aura.height()),
            to = ?(width, height),
            "resizing aura to photo"
        );
        RgbaField::from_image(&imageops::resize(
            &aura.to_image(),
            width,
            height,
            FilterType::Triangle,
        ))
    } else {
        aura.clone()
    };

    let mut result = RgbaField::from_image(photo);
    Zip::from(result.pixels.lanes_mut(Axis(2)))
        .and(aura.pixels.lanes(Axis(2)))
        .par_for_each(|mut out, src| {
            let alpha = src[3] as f32 / 255.0;
            for channel in 0..3 {
                out[channel] =
                    to_channel((1.0 - alpha) * out[channel] as f32 + alpha * src[channel] as f32);
            }
        });

    Ok(result.to_image())
}

/// Output size that fits `max_dimension` while keeping the aspect ratio.
pub fn fit_within(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if width <= max_dimension && height <= max_dimension {
        return (width, height);
    }
    let max = max_dimension as f64;
    if width > height {
        let scaled = (height as f64 * (max / width as f64)) as u32;
        (max_dimension, scaled.max(1))
    } else {
        let scaled = (width as f64 * (max / height as f64)) as u32;
        (scaled.max(1), max_dimension)
    }
}

/// Encode as JPEG, downscaling to the export limit and flattening any
/// transparency onto white.
pub fn export_jpeg(image: &RgbaImage, export: &ExportConfig) -> KirlianResult<Vec<u8>> {
    let scaled = downscale(image, export.max_dimension);
    let flattened = flatten_on_white(&scaled);

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, export.jpeg_quality).encode(
        flattened.as_raw(),
        flattened.width(),
        flattened.height(),
        ColorType::Rgb8,
    )?;
    Ok(bytes)
}

/// Encode as RGBA PNG at the original size.
pub fn export_png(image: &RgbaImage) -> KirlianResult<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ColorType::Rgba8,
    )?;
    Ok(bytes)
}

fn downscale(image: &RgbaImage, max_dimension: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    let (target_w, target_h) = fit_within(width, height, max_dimension);
    if (target_w, target_h) == (width, height) {
        image.clone()
    } else {
        imageops::resize(image, target_w, target_h, FilterType::Triangle)
    }
}

fn flatten_on_white(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let alpha = a as f32 / 255.0;
        let over_white = |c: u8| to_channel((c as f32 * alpha + 255.0 * (1.0 - alpha)).round());
        image::Rgb([over_white(r), over_white(g), over_white(b)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn opaque_aura_replaces_photo_color() {
        let photo = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        let mut aura = RgbaField::transparent(4, 4);
        aura.set(1, 1, [200, 100, 50, 255]);
        let result = overlay_aura(&photo, &aura);
        assert_eq!(result.get_pixel(1, 1).0, [200, 100, 50, 255]);
        assert_eq!(result.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn half_alpha_blends_and_keeps_photo_alpha() {
        let photo = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 200]));
        let mut aura = RgbaField::transparent(1, 1);
        aura.set(0, 0, [255, 255, 255, 51]);
        let result = overlay_aura(&photo, &aura);
        assert_eq!(result.get_pixel(0, 0).0, [51, 51, 51, 200]);
    }

    #[test]
    fn aura_is_resized_to_photo() {
        let photo = RgbaImage::from_pixel(30, 20, Rgba([0, 0, 0, 255]));
        let mut aura = RgbaField::transparent(3, 2);
        for y in 0..2 {
            for x in 0..3 {
                aura.set(x, y, [255, 0, 0, 255]);
            }
        }
        let result = overlay_aura(&photo, &aura);
        assert_eq!(result.dimensions(), (30, 20));
        assert_eq!(result.get_pixel(15, 10).0, [255, 0, 0, 255]);
    }

    #[test]
    fn failure_returns_original_photo() {
        let photo = RgbaImage::from_pixel(5, 5, Rgba([1, 2, 3, 255]));
        let result = overlay_aura(&photo, &RgbaField::transparent(0, 0));
        assert_eq!(result, photo);
    }

    #[test]
    fn fit_within_keeps_aspect_ratio() {
        assert_eq!(fit_within(800, 600, 1200), (800, 600));
        assert_eq!(fit_within(2400, 1200, 1200), (1200, 600));
        assert_eq!(fit_within(1000, 3000, 1200), (400, 1200));
    }

    #[test]
    fn jpeg_export_is_downscaled_and_decodable() {
        let image = RgbaImage::from_pixel(300, 100, Rgba([255, 0, 0, 0]));
        let export = ExportConfig {
            max_dimension: 150,
            jpeg_quality: 85,
        };
        let bytes = export_jpeg(&image, &export).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (150, 50));
        // Fully transparent pixels flatten to white.
        let [r, g, b] = decoded.get_pixel(75, 25).0;
        assert!(r > 240 && g > 240 && b > 240);
    }

    #[test]
    fn png_export_round_trips() {
        let image = RgbaImage::from_pixel(3, 2, Rgba([9, 8, 7, 6]));
        let bytes = export_png(&image).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded, image);
    }
}
