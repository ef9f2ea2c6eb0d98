//! Per-pixel aura compositor.
//!
//! The aura is drawn around an implied human silhouette: a vertical stack of
//! width bands centred horizontally. Every chakra radiates from its own
//! height on that silhouette with a reach proportional to its energy. For
//! each pixel the chakra influences are normalized into a color blend and
//! the opacity falls off with distance from the silhouette.
//!
//! Rows are computed in parallel; the output does not depend on scheduling.

use kirlian_shared::{Chakra, ChakraEnergyProfile};
use ndarray::Array3;
use rayon::prelude::*;

use super::RgbaField;
use crate::color::{boost, to_alpha, weighted_blend};
use crate::config::AuraConfig;

/// Vertical chakra anchors as a fraction of image height, measured from the
/// top edge (Crown near the top, Root near the bottom).
const CHAKRA_ANCHORS: [f64; Chakra::COUNT] = [0.85, 0.75, 0.65, 0.50, 0.35, 0.20, 0.05];

/// Share of the shorter image side used as the nominal aura radius.
const BASE_RADIUS_SHARE: f64 = 0.4;
/// Margin kept between the aura and the image border.
const EDGE_MARGIN: f64 = 0.9;
/// Reach of a zero-energy chakra relative to the base radius.
const MIN_REACH: f64 = 0.3;
/// Vertical center used when fitting the aura inside the canvas.
const CENTER_Y_SHARE: f64 = 0.45;

/// Influence weights at or below this are ignored.
const MIN_WEIGHT: f64 = 0.01;
const ANGLE_SHARE: f64 = 0.7;
const HORIZONTAL_SHARE: f64 = 0.3;

/// Aura compositor with tunable color boost and opacity ceiling.
///
/// # Examples
///
/// ```
/// use kirlian_core::render::aura::AuraCompositor;
/// use kirlian_shared::ChakraEnergyProfile;
///
/// let compositor = AuraCompositor::default();
/// let aura = compositor.render(&ChakraEnergyProfile::uniform(80.0), 120, 160);
/// assert_eq!((aura.width(), aura.height()), (120, 160));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuraCompositor {
    pub brightness_boost: f32,
    pub max_opacity: f32,
}

impl Default for AuraCompositor {
    fn default() -> Self {
        Self {
            brightness_boost: 1.25,
            max_opacity: 0.7,
        }
    }
}

impl From<&AuraConfig> for AuraCompositor {
    fn from(config: &AuraConfig) -> Self {
        Self {
            brightness_boost: config.brightness_boost,
            max_opacity: config.max_opacity,
        }
    }
}

impl AuraCompositor {
    /// Render an aura of exactly `width` x `height` pixels.
    ///
    /// An all-zero profile produces a fully transparent field.
    pub fn render(&self, profile: &ChakraEnergyProfile, width: u32, height: u32) -> RgbaField {
        if width == 0 || height == 0 {
            return RgbaField::transparent(width, height);
        }

        let geometry = AuraGeometry::new(profile, width, height);
        let rows: Vec<Vec<u8>> = (0..height)
            .into_par_iter()
            .map(|y| {
                let mut row = vec![0u8; width as usize * 4];
                for x in 0..width {
                    if let Some(rgba) = self.shade(profile, &geometry, x, y) {
                        let offset = x as usize * 4;
                        row[offset..offset + 4].copy_from_slice(&rgba);
                    }
                }
                row
            })
            .collect();

        let pixels = Array3::from_shape_vec(
            (height as usize, width as usize, 4),
            rows.into_iter().flatten().collect(),
        )
        .expect("rows are width * 4 bytes each");
        let field = RgbaField { pixels };
        tracing::debug!(aura = %field, "rendered aura");
        field
    }

    fn shade(
        &self,
        profile: &ChakraEnergyProfile,
        geometry: &AuraGeometry,
        x: u32,
        y: u32,
    ) -> Option<[u8; 4]> {
        let height = geometry.height as f64;
        let body_dist = geometry.body_distance(x, y);

        let mut influences: Vec<(Chakra, f64)> = Vec::with_capacity(Chakra::COUNT);
        for chakra in Chakra::ALL {
            let energy = profile.fraction(chakra) as f64;
            if energy <= 0.0 {
                continue;
            }
            let reach = geometry.reach[chakra.index()];
            if body_dist > reach {
                continue;
            }
            let anchor_y = (CHAKRA_ANCHORS[chakra.index()] * height).floor();
            let vertical = (y as f64 - anchor_y).abs() / (height * 0.5);
            let angle_weight = (1.0 - vertical).max(0.0);
            let horizontal_weight = if reach > 0.0 {
                1.0 - body_dist / reach
            } else {
                1.0
            };
            let weight =
                (angle_weight * ANGLE_SHARE + horizontal_weight * HORIZONTAL_SHARE) * energy;
            if weight > MIN_WEIGHT {
                influences.push((chakra, weight));
            }
        }

        let blended = weighted_blend(
            influences
                .iter()
                .map(|(chakra, weight)| (chakra.aura_rgb(), *weight as f32)),
        )?;
        let [r, g, b] = boost(blended, self.brightness_boost);

        let alpha = if body_dist <= 0.0 {
            to_alpha(self.max_opacity)
        } else {
            let max_reach = influences
                .iter()
                .map(|(chakra, _)| geometry.reach[chakra.index()])
                .fold(0.0f64, f64::max);
            let falloff = if max_reach > 0.0 {
                1.0 - body_dist / max_reach
            } else {
                0.0
            };
            if falloff < 0.0 {
                0
            } else {
                to_alpha((falloff * self.max_opacity as f64) as f32)
            }
        };

        Some([r, g, b, alpha])
    }
}

/// Render with the default boost (1.25) and opacity ceiling (70 %).
pub fn render_aura(profile: &ChakraEnergyProfile, width: u32, height: u32) -> RgbaField {
    AuraCompositor::default().render(profile, width, height)
}

/// Half-width of the silhouette (as a fraction of image width) at a
/// relative height measured from the top edge.
pub fn silhouette_half_width(rel_y: f64) -> f64 {
    if rel_y < 0.2 {
        0.15
    } else if rel_y < 0.4 {
        0.2 + (rel_y - 0.2) * 0.5
    } else if rel_y < 0.6 {
        0.3
    } else if rel_y < 0.8 {
        0.3 - (rel_y - 0.6)
    } else {
        0.15
    }
}

/// Per-render constants shared by every pixel.
struct AuraGeometry {
    width: u32,
    height: u32,
    center_x: f64,
    reach: [f64; Chakra::COUNT],
}

impl AuraGeometry {
    fn new(profile: &ChakraEnergyProfile, width: u32, height: u32) -> Self {
        let center_x = (width / 2) as f64;
        let center_y = (height as f64 * CENTER_Y_SHARE).floor();
        let (w, h) = (width as f64, height as f64);

        let nominal = w.min(h) * BASE_RADIUS_SHARE;
        let edge_x = center_x.min(w - center_x) * EDGE_MARGIN;
        let edge_y = center_y.min(h - center_y) * EDGE_MARGIN;
        let base_radius = nominal.min(edge_x).min(edge_y);

        let reach = Chakra::ALL.map(|chakra| {
            base_radius * (MIN_REACH + (1.0 - MIN_REACH) * profile.fraction(chakra) as f64)
        });

        Self {
            width,
            height,
            center_x,
            reach,
        }
    }

    /// Horizontal pixel distance from the silhouette edge, 0 inside it.
    fn body_distance(&self, x: u32, y: u32) -> f64 {
        let w = self.width as f64;
        let rel_y = y as f64 / self.height as f64;
        let dx = (x as f64 - self.center_x) / w;
        (dx.abs() - silhouette_half_width(rel_y)).max(0.0) * w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_matches_requested_dimensions() {
        for (w, h) in [(1, 1), (7, 3), (64, 48), (33, 90)] {
            let aura = render_aura(&ChakraEnergyProfile::uniform(70.0), w, h);
            assert_eq!((aura.width(), aura.height()), (w, h));
        }
    }

    #[test]
    fn zero_profile_is_fully_transparent() {
        let aura = render_aura(&ChakraEnergyProfile::zeros(), 80, 100);
        assert!(aura.is_fully_transparent());
        assert!(aura.pixels.iter().all(|v| *v == 0));
    }

    #[test]
    fn silhouette_core_gets_max_opacity() {
        let aura = render_aura(&ChakraEnergyProfile::uniform(100.0), 100, 120);
        // Center column at heart height lies inside the silhouette.
        let [_, _, _, alpha] = aura.get(50, 60);
        assert_eq!(alpha, 178);
    }

    #[test]
    fn opacity_falls_off_away_from_silhouette() {
        // Wide canvas so the corners fall beyond every chakra's reach.
        let aura = render_aura(&ChakraEnergyProfile::uniform(100.0), 400, 200);
        let inside = aura.get(200, 100)[3];
        let near = aura.get(325, 100)[3];
        let corner = aura.get(0, 0)[3];
        assert!(inside > near, "inside {inside} near {near}");
        assert_eq!(corner, 0);
    }

    #[test]
    fn single_chakra_tints_with_its_palette() {
        let profile = ChakraEnergyProfile::zeros().with(Chakra::Heart, 100.0);
        let aura = render_aura(&profile, 100, 100);
        let [r, g, b, a] = aura.get(50, 50);
        assert_eq!((r, g, b), (0, 255, 0));
        assert!(a > 0);
    }

    #[test]
    fn custom_opacity_ceiling_is_respected() {
        let compositor = AuraCompositor {
            brightness_boost: 1.0,
            max_opacity: 0.2,
        };
        let aura = compositor.render(&ChakraEnergyProfile::uniform(90.0), 60, 60);
        assert!(aura.pixels.outer_iter().all(|row| row
            .outer_iter()
            .all(|px| px[3] <= to_alpha(0.2))));
    }

    #[test]
    fn band_profile_is_continuous_at_shoulders() {
        assert!((silhouette_half_width(0.399_999) - 0.3).abs() < 1e-4);
        assert!((silhouette_half_width(0.6) - 0.3).abs() < 1e-9);
        assert!((silhouette_half_width(0.799_999) - 0.1).abs() < 1e-4);
    }
}
