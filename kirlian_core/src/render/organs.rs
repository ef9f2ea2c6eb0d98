//! Organ map and single-organ glow rendering.

use std::iter;

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage, RgbaImage};
use plotters::prelude::*;

use super::{draw_rgb, ellipse_points};
use crate::diagnostics::organs::{Organ, OrganStatus};
use crate::diagnostics::report::DiagnosticData;
use crate::error::{KirlianError, KirlianResult};

const SEGMENTS: usize = 48;
const SILHOUETTE: RGBColor = RGBColor(211, 211, 211);

/// Glow layers drawn around a detailed organ view, outermost last.
const GLOW_LAYERS: u32 = 5;
const GLOW_ALPHA: f64 = 0.5;
/// Margin around the unit square so the outer glow stays on canvas.
const DETAIL_MARGIN: f64 = 0.15;

/// Body silhouette with one status-colored ellipse per organ part.
pub fn render_organ_map(data: &DiagnosticData, width: u32, height: u32) -> KirlianResult<RgbImage> {
    draw_rgb(width, height, |root| {
        root.fill(&WHITE).map_err(KirlianError::render)?;
        let mut chart = ChartBuilder::on(root)
            .build_cartesian_2d(0.0f64..1.0f64, 0.0f64..1.0f64)
            .map_err(KirlianError::render)?;

        let silhouette = [
            ((0.5, 0.85), 0.08, 0.08, 0.0, 0.7),
            ((0.5, 0.5), 0.15, 0.3, 0.0, 0.5),
            ((0.3, 0.55), 0.05, 0.2, 30.0, 0.5),
            ((0.7, 0.55), 0.05, 0.2, -30.0, 0.5),
            ((0.4, 0.2), 0.05, 0.2, -10.0, 0.5),
            ((0.6, 0.2), 0.05, 0.2, 10.0, 0.5),
        ];
        chart
            .draw_series(silhouette.iter().map(|&(center, sx, sy, angle, alpha)| {
                Polygon::new(
                    ellipse_points(center, sx, sy, angle, SEGMENTS),
                    SILHOUETTE.mix(alpha).filled(),
                )
            }))
            .map_err(KirlianError::render)?;

        for organ in Organ::ALL {
            let status = organ.status(data);
            let ([r, g, b], alpha) = status.rgba();
            let style = RGBColor(r, g, b).mix(alpha).filled();
            chart
                .draw_series(organ.shapes().iter().map(|part| {
                    Polygon::new(
                        ellipse_points(
                            (part.x, part.y),
                            part.width / 2.0,
                            part.height / 2.0,
                            part.angle,
                            SEGMENTS,
                        ),
                        style,
                    )
                }))
                .map_err(KirlianError::render)?;
        }
        Ok(())
    })
}

/// Square detail view: concentric status glow with an optional organ
/// picture drawn on top of it.
///
/// Organs without data get no glow.
pub fn render_organ_detail(
    status: OrganStatus,
    organ_image: Option<&RgbaImage>,
    size: u32,
) -> KirlianResult<RgbImage> {
    let window = -DETAIL_MARGIN..1.0 + DETAIL_MARGIN;
    let mut canvas = draw_rgb(size, size, |root| {
        root.fill(&WHITE).map_err(KirlianError::render)?;
        if status == OrganStatus::NoData {
            return Ok(());
        }
        let mut chart = ChartBuilder::on(root)
            .build_cartesian_2d(window.clone(), window.clone())
            .map_err(KirlianError::render)?;
        let ([r, g, b], _) = status.rgba();
        for layer in (1..=GLOW_LAYERS).rev() {
            let alpha = GLOW_ALPHA * layer as f64 / 7.0;
            let scale = 1.0 + (6 - layer) as f64 * 0.05;
            chart
                .draw_series(iter::once(Polygon::new(
                    ellipse_points((0.5, 0.5), scale / 2.0, scale / 2.0, 0.0, SEGMENTS),
                    RGBColor(r, g, b).mix(alpha).filled(),
                )))
                .map_err(KirlianError::render)?;
        }
        Ok(())
    })?;

    if let Some(picture) = organ_image {
        paste_centered(&mut canvas, picture);
    }
    Ok(canvas)
}

/// Blend `picture` over the unit-square region of the detail canvas.
fn paste_centered(canvas: &mut RgbImage, picture: &RgbaImage) {
    let size = canvas.width() as f64;
    let span = 1.0 + 2.0 * DETAIL_MARGIN;
    let offset = (DETAIL_MARGIN / span * size).round() as u32;
    let inner = ((1.0 / span) * size).round().max(1.0) as u32;
    if picture.width() == 0 || picture.height() == 0 {
        tracing::warn!("organ picture is empty, drawing glow only");
        return;
    }
    let scaled = imageops::resize(picture, inner, inner, FilterType::Triangle);

    for (x, y, pixel) in scaled.enumerate_pixels() {
        let (cx, cy) = (x + offset, y + offset);
        if cx >= canvas.width() || cy >= canvas.height() {
            continue;
        }
        let alpha = pixel[3] as f32 / 255.0;
        let below = canvas.get_pixel(cx, cy).0;
        let blended = [0, 1, 2].map(|c| {
            crate::color::to_channel(below[c] as f32 * (1.0 - alpha) + pixel[c] as f32 * alpha)
        });
        canvas.put_pixel(cx, cy, Rgb(blended));
    }
}
