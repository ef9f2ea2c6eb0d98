//! Three-dimensional chakra scene.
//!
//! The scene is a plain data model (spine, chakra spheres, aura spheroids)
//! that serializes to JSON for external viewers and can be rasterized with a
//! plotters 3D chart as a wireframe preview.

use std::iter;

use image::RgbImage;
use kirlian_shared::{Chakra, ChakraEnergyProfile};
use plotters::prelude::*;
use serde::{Deserialize, Serialize};

use super::draw_rgb;
use crate::color::{chakra_color, weighted_blend, Rgb};
use crate::error::{KirlianError, KirlianResult};

const SPINE: (f64, f64) = (1.5, 7.0);
const SPHERE_BASE: f64 = 1.8;
const SPHERE_STEP: f64 = 0.8;
const AURA_CENTER_Z: f64 = 3.5;
const AURA_LAYERS: usize = 5;
/// Relative height of each chakra along the body, bottom to top.
const CHAKRA_HEIGHTS: [f64; Chakra::COUNT] = [0.0, 0.16, 0.33, 0.5, 0.67, 0.84, 1.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSphere {
    pub chakra: Chakra,
    /// Height along the spine; x and y are always 0.
    pub z: f64,
    pub size: f64,
    pub color: Rgb,
    pub opacity: f64,
    /// `(scale, opacity)` of translucent pulse shells.
    pub pulses: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuraSpheroid {
    pub center_z: f64,
    pub semi_axes: [f64; 3],
    pub color: Rgb,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChakraScene {
    pub spine: (f64, f64),
    pub spheres: Vec<SceneSphere>,
    pub layers: Vec<AuraSpheroid>,
}

impl ChakraScene {
    pub fn from_profile(profile: &ChakraEnergyProfile) -> Self {
        let spheres = Chakra::ALL
            .iter()
            .map(|&chakra| {
                let energy = profile.fraction(chakra) as f64;
                let pulses = if energy > 0.7 {
                    (1..=3)
                        .map(|k| (1.0 + 0.4 * k as f64, 0.3 - 0.07 * k as f64))
                        .collect()
                } else {
                    Vec::new()
                };
                SceneSphere {
                    chakra,
                    z: SPHERE_BASE + SPHERE_STEP * chakra.index() as f64,
                    size: 0.2 + 0.15 * energy,
                    color: chakra_color(profile, chakra),
                    opacity: 0.8,
                    pulses,
                }
            })
            .collect();

        let avg = (profile.average() / 100.0) as f64;
        let growth = 0.7 + 0.5 * avg;
        let layers = (0..AURA_LAYERS)
            .map(|layer| {
                let i = layer as f64;
                AuraSpheroid {
                    center_z: AURA_CENTER_Z,
                    semi_axes: [
                        (1.0 + 0.3 * i) * growth,
                        (1.0 + 0.3 * i) * growth,
                        3.5 * (1.0 + 0.2 * i) * growth,
                    ],
                    color: layer_color(profile, layer),
                    opacity: 0.15 * (1.0 - 0.7 * i / AURA_LAYERS as f64) * avg,
                }
            })
            .collect();

        Self {
            spine: SPINE,
            spheres,
            layers,
        }
    }

    pub fn to_json(&self) -> KirlianResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> KirlianResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Color of aura layer `layer`, weighted toward chakras at the same height.
pub fn layer_color(profile: &ChakraEnergyProfile, layer: usize) -> Rgb {
    let layer_height = if AURA_LAYERS > 1 {
        layer as f64 / (AURA_LAYERS - 1) as f64
    } else {
        0.5
    };
    weighted_blend(Chakra::ALL.iter().map(|&chakra| {
        let proximity = 1.0 - ((CHAKRA_HEIGHTS[chakra.index()] - layer_height).abs() * 2.5).min(1.0);
        (
            chakra_color(profile, chakra),
            (profile.fraction(chakra) as f64 * proximity) as f32,
        )
    }))
    .unwrap_or([0, 0, 0])
}

/// Wireframe preview of `scene` on a black canvas.
///
/// Scene height maps to the chart's vertical axis.
pub fn render_scene_png(scene: &ChakraScene, width: u32, height: u32) -> KirlianResult<RgbImage> {
    let marker_scale = height as f64 / 25.0;
    draw_rgb(width, height, |root| {
        root.fill(&BLACK).map_err(KirlianError::render)?;
        let mut chart = ChartBuilder::on(root)
            .build_cartesian_3d(-3.0f64..3.0f64, 0.0f64..8.0f64, -3.0f64..3.0f64)
            .map_err(KirlianError::render)?;
        chart.with_projection(|mut pb| {
            pb.yaw = 0.6;
            pb.pitch = 0.25;
            pb.scale = 0.95;
            pb.into_matrix()
        });

        for layer in scene.layers.iter().rev().filter(|layer| layer.opacity > 0.0) {
            let style = rgb(layer.color).mix(layer.opacity.max(0.05) * 2.0);
            for ring in spheroid_rings(layer) {
                chart
                    .draw_series(LineSeries::new(ring, style.stroke_width(1)))
                    .map_err(KirlianError::render)?;
            }
        }

        chart
            .draw_series(LineSeries::new(
                [(0.0, scene.spine.0, 0.0), (0.0, scene.spine.1, 0.0)],
                RGBColor(200, 200, 200).mix(0.5).stroke_width(2),
            ))
            .map_err(KirlianError::render)?;

        for sphere in &scene.spheres {
            let color = rgb(sphere.color);
            let center = (0.0, sphere.z, 0.0);
            let radius = (sphere.size * marker_scale).round().max(1.0) as i32;
            for &(scale, opacity) in &sphere.pulses {
                let pulse = (sphere.size * scale * marker_scale).round() as i32;
                chart
                    .draw_series(iter::once(Circle::new(
                        center,
                        pulse,
                        color.mix(opacity).filled(),
                    )))
                    .map_err(KirlianError::render)?;
            }
            chart
                .draw_series(iter::once(Circle::new(
                    center,
                    radius,
                    color.mix(sphere.opacity).filled(),
                )))
                .map_err(KirlianError::render)?;
        }
        Ok(())
    })
}

/// Latitude and meridian rings of a spheroid, in chart coordinates.
fn spheroid_rings(layer: &AuraSpheroid) -> Vec<Vec<(f64, f64, f64)>> {
    const STEPS: usize = 40;
    let [ax, ay, az] = layer.semi_axes;
    let mut rings = Vec::new();

    for lat in 1..6 {
        let v = std::f64::consts::PI * lat as f64 / 6.0;
        let ring = (0..=STEPS)
            .map(|step| {
                let u = std::f64::consts::TAU * step as f64 / STEPS as f64;
                (
                    ax * u.cos() * v.sin(),
                    layer.center_z + az * v.cos(),
                    ay * u.sin() * v.sin(),
                )
            })
            .collect();
        rings.push(ring);
    }

    for meridian in 0..4 {
        let u = std::f64::consts::PI * meridian as f64 / 4.0;
        let ring = (0..=STEPS)
            .map(|step| {
                let v = std::f64::consts::TAU * step as f64 / STEPS as f64;
                (
                    ax * u.cos() * v.sin(),
                    layer.center_z + az * v.cos(),
                    ay * u.sin() * v.sin(),
                )
            })
            .collect();
        rings.push(ring);
    }
    rings
}

fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color[0], color[1], color[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spheres_stack_along_spine() {
        let scene = ChakraScene::from_profile(&ChakraEnergyProfile::uniform(60.0));
        let heights: Vec<f64> = scene.spheres.iter().map(|s| s.z).collect();
        assert!((heights[0] - 1.8).abs() < 1e-9);
        assert!((heights[6] - 6.6).abs() < 1e-9);
        assert!((scene.spheres[0].size - 0.29).abs() < 1e-6);
        assert!(scene.spheres.iter().all(|s| s.pulses.is_empty()));
    }

    #[test]
    fn pulses_fade_outward() {
        let scene = ChakraScene::from_profile(&ChakraEnergyProfile::uniform(100.0));
        let pulses = &scene.spheres[0].pulses;
        assert_eq!(pulses.len(), 3);
        assert!((pulses[0].1 - 0.23).abs() < 1e-9);
        assert!((pulses[2].1 - 0.09).abs() < 1e-9);
    }

    #[test]
    fn aura_layers_grow_and_fade() {
        let scene = ChakraScene::from_profile(&ChakraEnergyProfile::uniform(100.0));
        assert_eq!(scene.layers.len(), 5);
        let first = &scene.layers[0];
        assert!((first.semi_axes[0] - 1.2).abs() < 1e-9);
        assert!((first.semi_axes[2] - 4.2).abs() < 1e-9);
        assert!((first.opacity - 0.15).abs() < 1e-9);
        assert!(scene.layers[4].semi_axes[0] > first.semi_axes[0]);
        assert!(scene.layers[4].opacity < first.opacity);
    }

    #[test]
    fn bottom_layer_is_tinted_by_lower_chakras() {
        let profile = ChakraEnergyProfile::zeros()
            .with(Chakra::Root, 100.0)
            .with(Chakra::Crown, 100.0);
        assert_eq!(layer_color(&profile, 0), Chakra::Root.color_rgb());
        assert_eq!(layer_color(&profile, 4), Chakra::Crown.color_rgb());
        assert_eq!(layer_color(&profile, 2), [0, 0, 0]);
    }

    #[test]
    fn json_round_trip() {
        let scene = ChakraScene::from_profile(&ChakraEnergyProfile::uniform(75.0));
        let json = scene.to_json().unwrap();
        assert!(json.contains("\"semi_axes\""));
        assert_eq!(ChakraScene::from_json(&json).unwrap(), scene);
    }

    #[test]
    fn preview_has_requested_size() {
        let scene = ChakraScene::from_profile(&ChakraEnergyProfile::uniform(75.0));
        let image = render_scene_png(&scene, 120, 150).unwrap();
        assert_eq!(image.dimensions(), (120, 150));
    }
}
