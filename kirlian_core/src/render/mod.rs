//! Rendering of chakra figures, 3D scenes, auras and organ maps.

pub mod aura;
pub mod field;
pub mod figure;
pub mod organs;
pub mod overlay;
pub mod scene;

pub use aura::{render_aura, AuraCompositor};
pub use field::{FieldStatistics, RgbaField};
pub use figure::{render_figure, FigureModel};
pub use organs::{render_organ_detail, render_organ_map};
pub use overlay::{export_jpeg, export_png, overlay_aura};
pub use scene::{render_scene_png, ChakraScene};

use image::RgbImage;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::{KirlianError, KirlianResult};

/// Points of a closed ellipse outline in world coordinates.
///
/// `angle_deg` rotates the ellipse counter-clockwise around its center.
pub(crate) fn ellipse_points(
    center: (f64, f64),
    semi_x: f64,
    semi_y: f64,
    angle_deg: f64,
    segments: usize,
) -> Vec<(f64, f64)> {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    (0..=segments)
        .map(|step| {
            let t = step as f64 / segments as f64 * std::f64::consts::TAU;
            let (x, y) = (semi_x * t.cos(), semi_y * t.sin());
            (center.0 + x * cos - y * sin, center.1 + x * sin + y * cos)
        })
        .collect()
}

/// Draw into an in-memory RGB canvas through a plotters bitmap backend.
pub(crate) fn draw_rgb<F>(width: u32, height: u32, draw: F) -> KirlianResult<RgbImage>
where
    F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> KirlianResult<()>,
{
    if width == 0 || height == 0 {
        return Err(KirlianError::InvalidInput(format!(
            "canvas must be non-empty, got {width}x{height}"
        )));
    }
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw(&root)?;
        root.present().map_err(KirlianError::render)?;
    }
    RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| KirlianError::Render("canvas buffer size mismatch".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ellipse_points_close_the_outline() {
        let points = ellipse_points((1.0, 2.0), 3.0, 1.0, 0.0, 16);
        assert_eq!(points.len(), 17);
        let (first, last) = (points[0], points[16]);
        assert!((first.0 - last.0).abs() < 1e-9 && (first.1 - last.1).abs() < 1e-9);
        assert!((first.0 - 4.0).abs() < 1e-9);
    }

    #[test]
    fn rotated_ellipse_swaps_axes() {
        let points = ellipse_points((0.0, 0.0), 2.0, 1.0, 90.0, 4);
        assert!(points[0].0.abs() < 1e-9);
        assert!((points[0].1 - 2.0).abs() < 1e-9);
    }

    #[test]
    fn draw_rgb_rejects_empty_canvas() {
        assert!(draw_rgb(0, 10, |_| Ok(())).is_err());
    }
}
