//! Flat chakra figure: stick silhouette, chakra discs and a layered biofield.
//!
//! Geometry lives in a world window of x in [-2.5, 2.5] and y in [-1, 8]
//! and is scaled onto the requested canvas. [`FigureModel`] holds the
//! computed shapes so the layout can be inspected without rasterizing.

use std::iter;

use image::RgbImage;
use kirlian_shared::{Chakra, ChakraEnergyProfile};
use plotters::prelude::*;
use serde::Serialize;

use super::{draw_rgb, ellipse_points};
use crate::color::{chakra_color, weighted_blend, Rgb};
use crate::error::{KirlianError, KirlianResult};

const X_RANGE: std::ops::Range<f64> = -2.5..2.5;
const Y_RANGE: std::ops::Range<f64> = -1.0..8.0;

const SPINE_BASE: f64 = 2.0;
const SPINE_STEP: f64 = 0.8;
const DISC_ALPHA: f64 = 0.8;
const PULSE_THRESHOLD: f32 = 0.7;

const BIOFIELD_CENTER: (f64, f64) = (0.0, 4.0);
const BIOFIELD_WIDTH: f64 = 4.5;
const BIOFIELD_HEIGHT: f64 = 8.0;
const BIOFIELD_LAYERS: usize = 7;

const SILHOUETTE_GREY: RGBColor = RGBColor(128, 128, 128);
const SEGMENTS: usize = 64;

#[derive(Debug, Clone, Serialize)]
pub struct ChakraDisc {
    pub chakra: Chakra,
    pub center: (f64, f64),
    pub radius: f64,
    pub color: Rgb,
    pub alpha: f64,
    /// Halo rings `(radius, alpha)` drawn for high-energy chakras.
    pub pulses: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BiofieldLayer {
    pub center: (f64, f64),
    pub width: f64,
    pub height: f64,
    pub color: Rgb,
    pub alpha: f64,
}

/// Shapes of one chakra figure, innermost biofield layer first.
#[derive(Debug, Clone, Serialize)]
pub struct FigureModel {
    pub discs: Vec<ChakraDisc>,
    pub biofield: Vec<BiofieldLayer>,
}

impl FigureModel {
    pub fn from_profile(profile: &ChakraEnergyProfile) -> Self {
        let discs = Chakra::ALL
            .iter()
            .map(|&chakra| {
                let energy = profile.fraction(chakra);
                let radius = 0.3 + 0.2 * energy as f64;
                let pulses = if energy > PULSE_THRESHOLD {
                    (1..=3)
                        .map(|k| (radius * (1.0 + 0.4 * k as f64), 0.2 - 0.05 * k as f64))
                        .collect()
                } else {
                    Vec::new()
                };
                ChakraDisc {
                    chakra,
                    center: (0.0, SPINE_BASE + SPINE_STEP * chakra.index() as f64),
                    radius,
                    color: chakra_color(profile, chakra),
                    alpha: DISC_ALPHA,
                    pulses,
                }
            })
            .collect();

        let avg = (profile.average() / 100.0) as f64;
        let biofield = (0..BIOFIELD_LAYERS)
            .map(|layer| {
                let depth = layer as f64 / BIOFIELD_LAYERS as f64;
                let scale = (0.6 + 0.4 * avg) * (1.0 + 0.15 * layer as f64);
                BiofieldLayer {
                    center: BIOFIELD_CENTER,
                    width: BIOFIELD_WIDTH * scale,
                    height: BIOFIELD_HEIGHT * scale,
                    color: biofield_color(profile, depth),
                    alpha: 0.15 * (1.0 - depth) * avg,
                }
            })
            .collect();

        Self { discs, biofield }
    }
}

/// Blend of energy colors where each chakra dominates the layer whose depth
/// matches its position on the spine.
fn biofield_color(profile: &ChakraEnergyProfile, depth: f64) -> Rgb {
    let last = (Chakra::COUNT - 1) as f64;
    weighted_blend(Chakra::ALL.iter().map(|&chakra| {
        let position = 1.0 - (chakra.index() as f64 / last - depth).abs();
        (
            chakra_color(profile, chakra),
            (profile.fraction(chakra) as f64 * position) as f32,
        )
    }))
    .unwrap_or([0, 0, 0])
}

/// Rasterize the chakra figure for `profile` onto a `width` x `height`
/// canvas with a black background.
pub fn render_figure(
    profile: &ChakraEnergyProfile,
    width: u32,
    height: u32,
) -> KirlianResult<RgbImage> {
    let model = FigureModel::from_profile(profile);
    draw_rgb(width, height, |root| {
        root.fill(&BLACK).map_err(KirlianError::render)?;
        let mut chart = ChartBuilder::on(root)
            .build_cartesian_2d(X_RANGE, Y_RANGE)
            .map_err(KirlianError::render)?;

        for layer in model.biofield.iter().rev() {
            let outline = ellipse_points(
                layer.center,
                layer.width / 2.0,
                layer.height / 2.0,
                0.0,
                SEGMENTS,
            );
            chart
                .draw_series(iter::once(Polygon::new(
                    outline,
                    rgb(layer.color).mix(layer.alpha).filled(),
                )))
                .map_err(KirlianError::render)?;
        }

        let grey = SILHOUETTE_GREY.mix(0.7);
        let strokes = vec![
            ellipse_points((0.0, 7.0), 0.5, 0.5, 0.0, SEGMENTS),
            vec![(0.0, 6.5), (0.0, 2.0)],
            vec![(-1.0, 5.5), (0.0, 6.0), (1.0, 5.5)],
            vec![(-0.5, 2.0), (0.0, 0.5), (0.5, 2.0)],
        ];
        chart
            .draw_series(
                strokes
                    .into_iter()
                    .map(|points| PathElement::new(points, grey.stroke_width(1))),
            )
            .map_err(KirlianError::render)?;

        for disc in &model.discs {
            let color = rgb(disc.color);
            for &(radius, alpha) in &disc.pulses {
                chart
                    .draw_series(iter::once(Polygon::new(
                        ellipse_points(disc.center, radius, radius, 0.0, SEGMENTS),
                        color.mix(alpha).filled(),
                    )))
                    .map_err(KirlianError::render)?;
            }
            chart
                .draw_series(iter::once(Polygon::new(
                    ellipse_points(disc.center, disc.radius, disc.radius, 0.0, SEGMENTS),
                    color.mix(disc.alpha).filled(),
                )))
                .map_err(KirlianError::render)?;
        }
        Ok(())
    })
}

fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color[0], color[1], color[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discs_follow_the_spine() {
        let model = FigureModel::from_profile(&ChakraEnergyProfile::uniform(50.0));
        assert_eq!(model.discs.len(), 7);
        assert!((model.discs[0].center.1 - 2.0).abs() < 1e-9);
        assert!((model.discs[6].center.1 - 6.8).abs() < 1e-9);
        assert!((model.discs[3].radius - 0.4).abs() < 1e-6);
        assert!(model.discs.iter().all(|disc| disc.pulses.is_empty()));
    }

    #[test]
    fn high_energy_adds_three_fading_pulses() {
        let profile = ChakraEnergyProfile::zeros().with(Chakra::Throat, 90.0);
        let model = FigureModel::from_profile(&profile);
        let throat = &model.discs[Chakra::Throat.index()];
        assert_eq!(throat.pulses.len(), 3);
        assert!((throat.pulses[0].1 - 0.15).abs() < 1e-9);
        assert!((throat.pulses[2].1 - 0.05).abs() < 1e-9);
        assert!(throat.pulses[2].0 > throat.pulses[0].0);
    }

    #[test]
    fn biofield_fades_with_depth_and_vanishes_without_energy() {
        let model = FigureModel::from_profile(&ChakraEnergyProfile::uniform(100.0));
        assert_eq!(model.biofield.len(), 7);
        assert!((model.biofield[0].alpha - 0.15).abs() < 1e-9);
        assert!(model.biofield[6].alpha < model.biofield[0].alpha);
        assert!((model.biofield[0].width - 4.5).abs() < 1e-9);

        let empty = FigureModel::from_profile(&ChakraEnergyProfile::zeros());
        assert!(empty.biofield.iter().all(|layer| layer.alpha == 0.0));
        assert!(empty.biofield.iter().all(|layer| layer.color == [0, 0, 0]));
    }

    #[test]
    fn renders_requested_canvas() {
        let image = render_figure(&ChakraEnergyProfile::uniform(80.0), 100, 180).unwrap();
        assert_eq!(image.dimensions(), (100, 180));
        // Only the faint outer biofield reaches the corners; the heart disc
        // sits at world (0, 4.4).
        let corner = image.get_pixel(0, 0).0;
        assert!(corner.iter().all(|c| *c < 60), "corner pixel {corner:?}");
        let heart = image.get_pixel(50, 72).0;
        assert!(heart[1] > heart[0], "heart pixel {heart:?}");
    }
}
