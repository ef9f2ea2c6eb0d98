//! Glow metrics of a single GRV-gram and the ten-finger energy model.

use std::collections::VecDeque;

use image::RgbImage;
use kirlian_shared::{balance_index, Chakra, ChakraEnergyProfile, EnergyDetail, Language};
use ndarray::{Array2, Axis, Zip};
use serde::{Deserialize, Serialize};

use super::{Finger, Hand};

/// Glow metrics extracted from one finger scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GrvMetrics {
    /// Pixels enclosed by the outer glow contours, holes included.
    pub area: f64,
    /// Mean grayscale level over the whole frame.
    pub intensity: f64,
    /// Ratio of the darker to the brighter half, in `[0, 1]`.
    pub symmetry: f64,
    pub contour_count: usize,
}

/// Luma with BT.601 weights, rounded to the nearest level.
pub fn grayscale(image: &RgbImage) -> Array2<u8> {
    let (width, height) = image.dimensions();
    let mut gray = Array2::<u8>::zeros((height as usize, width as usize));
    Zip::indexed(&mut gray).par_for_each(|(row, col), value| {
        let [r, g, b] = image.get_pixel(col as u32, row as u32).0;
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        *value = luma.round().clamp(0.0, 255.0) as u8;
    });
    gray
}

/// Measure a scan. Empty frames produce zeroed metrics.
pub fn analyze(image: &RgbImage, threshold: u8) -> GrvMetrics {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        tracing::warn!("cannot analyze an empty GRV-gram");
        return GrvMetrics::default();
    }

    let gray = grayscale(image);
    let mask = gray.mapv(|level| level > threshold);
    let (area, contour_count) = outer_regions(&mask);

    let intensity = mean(gray.iter().copied(), gray.len());
    let split = width as usize / 2;
    let left = gray.slice_axis(Axis(1), (..split).into());
    let right = gray.slice_axis(Axis(1), (split..).into());
    let left_mean = mean(left.iter().copied(), left.len());
    let right_mean = mean(right.iter().copied(), right.len());
    let brighter = left_mean.max(right_mean);
    let symmetry = if brighter > 0.0 {
        left_mean.min(right_mean) / brighter
    } else {
        0.0
    };

    let metrics = GrvMetrics {
        area: area as f64,
        intensity,
        symmetry,
        contour_count,
    };
    tracing::debug!(?metrics, "analyzed GRV-gram");
    metrics
}

fn mean(values: impl Iterator<Item = u8>, len: usize) -> f64 {
    if len == 0 {
        return 0.0;
    }
    values.map(f64::from).sum::<f64>() / len as f64
}

/// Filled area and count of the outermost glow regions.
///
/// Background reachable from the frame edge (4-connected) is "outside";
/// everything else is enclosed. Glow regions are 8-connected, and only
/// regions touching the outside or the frame edge count as outer contours.
fn outer_regions(mask: &Array2<bool>) -> (usize, usize) {
    let (rows, cols) = mask.dim();
    let mut outside = Array2::<bool>::from_elem((rows, cols), false);
    let mut queue = VecDeque::new();

    for row in 0..rows {
        for col in 0..cols {
            let edge = row == 0 || col == 0 || row + 1 == rows || col + 1 == cols;
            if edge && !mask[[row, col]] {
                outside[[row, col]] = true;
                queue.push_back((row, col));
            }
        }
    }
    while let Some((row, col)) = queue.pop_front() {
        for (nr, nc) in neighbors4(row, col, rows, cols) {
            if !mask[[nr, nc]] && !outside[[nr, nc]] {
                outside[[nr, nc]] = true;
                queue.push_back((nr, nc));
            }
        }
    }

    let area = outside.iter().filter(|is_outside| !**is_outside).count();

    let mut seen = Array2::<bool>::from_elem((rows, cols), false);
    let mut outer = 0usize;
    for row in 0..rows {
        for col in 0..cols {
            if !mask[[row, col]] || seen[[row, col]] {
                continue;
            }
            let mut touches_outside = false;
            seen[[row, col]] = true;
            queue.push_back((row, col));
            while let Some((r, c)) = queue.pop_front() {
                if r == 0 || c == 0 || r + 1 == rows || c + 1 == cols {
                    touches_outside = true;
                }
                for (nr, nc) in neighbors4(r, c, rows, cols) {
                    if outside[[nr, nc]] {
                        touches_outside = true;
                    }
                }
                for (nr, nc) in neighbors8(r, c, rows, cols) {
                    if mask[[nr, nc]] && !seen[[nr, nc]] {
                        seen[[nr, nc]] = true;
                        queue.push_back((nr, nc));
                    }
                }
            }
            if touches_outside {
                outer += 1;
            }
        }
    }
    (area, outer)
}

fn neighbors4(
    row: usize,
    col: usize,
    rows: usize,
    cols: usize,
) -> impl Iterator<Item = (usize, usize)> {
    [(-1i64, 0i64), (1, 0), (0, -1), (0, 1)]
        .into_iter()
        .filter_map(move |(dr, dc)| offset(row, col, dr, dc, rows, cols))
}

fn neighbors8(
    row: usize,
    col: usize,
    rows: usize,
    cols: usize,
) -> impl Iterator<Item = (usize, usize)> {
    (-1i64..=1)
        .flat_map(|dr| (-1i64..=1).map(move |dc| (dr, dc)))
        .filter(|&(dr, dc)| dr != 0 || dc != 0)
        .filter_map(move |(dr, dc)| offset(row, col, dr, dc, rows, cols))
}

fn offset(row: usize, col: usize, dr: i64, dc: i64, rows: usize, cols: usize) -> Option<(usize, usize)> {
    let r = row as i64 + dr;
    let c = col as i64 + dc;
    (r >= 0 && c >= 0 && (r as usize) < rows && (c as usize) < cols).then(|| (r as usize, c as usize))
}

/// Chakras fed by a finger, with weights. Both hands share the table.
pub fn finger_chakras(finger: Finger) -> &'static [(Chakra, f64)] {
    match finger {
        Finger::Thumb => &[(Chakra::Root, 0.3), (Chakra::Sacral, 0.1)],
        Finger::Index => &[(Chakra::Throat, 0.3), (Chakra::ThirdEye, 0.1)],
        Finger::Middle => &[(Chakra::SolarPlexus, 0.3), (Chakra::Heart, 0.1)],
        Finger::Ring => &[(Chakra::Heart, 0.3), (Chakra::Throat, 0.1)],
        Finger::Pinky => &[(Chakra::Crown, 0.3), (Chakra::ThirdEye, 0.1)],
    }
}

/// Chakra energies derived from a complete ten-finger scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyModel {
    pub chakra_values: ChakraEnergyProfile,
    pub overall_energy: f32,
    pub balance_index: f32,
    pub details: Vec<EnergyDetail>,
}

/// Combined glow factor in `[0, 1]`: 70 % area, 30 % brightness.
pub fn glow_factor(metrics: &GrvMetrics, area_norm: f64) -> f64 {
    let area = if area_norm > 0.0 {
        (metrics.area / area_norm).min(1.0)
    } else {
        0.0
    };
    area * 0.7 + (metrics.intensity / 255.0) * 0.3
}

/// Fold per-finger metrics into chakra energies.
pub fn energy_model<'a, I>(scans: I, area_norm: f64, lang: Language) -> EnergyModel
where
    I: IntoIterator<Item = (Hand, Finger, &'a GrvMetrics)>,
{
    let mut totals = [0.0f64; Chakra::COUNT];
    for (_hand, finger, metrics) in scans {
        let factor = glow_factor(metrics, area_norm);
        for &(chakra, weight) in finger_chakras(finger) {
            totals[chakra.index()] += factor * weight;
        }
    }

    let chakra_values =
        ChakraEnergyProfile::from_values(totals.map(|total| (total.min(1.0) * 100.0) as f32));
    EnergyModel {
        overall_energy: chakra_values.average(),
        balance_index: balance_index(&chakra_values),
        details: chakra_values.details(lang),
        chakra_values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn square_ring(size: u32, inner: u32, outer: u32) -> RgbImage {
        let center = size as i64 / 2;
        RgbImage::from_fn(size, size, |x, y| {
            let d = (x as i64 - center).abs().max((y as i64 - center).abs());
            if d >= inner as i64 && d <= outer as i64 {
                Rgb([200, 200, 200])
            } else {
                Rgb([0, 0, 0])
            }
        })
    }

    #[test]
    fn grayscale_uses_luma_weights() {
        let image = RgbImage::from_pixel(1, 1, Rgb([255, 0, 0]));
        assert_eq!(grayscale(&image)[[0, 0]], 76);
    }

    #[test]
    fn ring_area_includes_its_hole() {
        // Ring occupies Chebyshev distances 3..=5 around (10, 10): an 11x11
        // filled square.
        let metrics = analyze(&square_ring(21, 3, 5), 50);
        assert_eq!(metrics.area, 121.0);
        assert_eq!(metrics.contour_count, 1);
    }

    #[test]
    fn nested_blob_is_not_an_outer_contour() {
        let mut image = square_ring(21, 3, 5);
        image.put_pixel(10, 10, Rgb([255, 255, 255]));
        let metrics = analyze(&image, 50);
        assert_eq!(metrics.contour_count, 1);
        assert_eq!(metrics.area, 121.0);
    }

    #[test]
    fn separate_blobs_are_counted() {
        let mut image = RgbImage::new(10, 10);
        image.put_pixel(2, 2, Rgb([255, 255, 255]));
        image.put_pixel(7, 7, Rgb([255, 255, 255]));
        let metrics = analyze(&image, 50);
        assert_eq!(metrics.contour_count, 2);
        assert_eq!(metrics.area, 2.0);
    }

    #[test]
    fn symmetry_of_one_sided_glow() {
        let image = RgbImage::from_fn(4, 2, |x, _| {
            if x < 2 {
                Rgb([100, 100, 100])
            } else {
                Rgb([50, 50, 50])
            }
        });
        let metrics = analyze(&image, 50);
        assert!((metrics.symmetry - 0.5).abs() < 1e-9);
        assert!((metrics.intensity - 75.0).abs() < 1e-9);
    }

    #[test]
    fn black_and_empty_frames_zero_out() {
        let dark = analyze(&RgbImage::new(8, 8), 50);
        assert_eq!(dark, GrvMetrics::default());
        assert_eq!(analyze(&RgbImage::new(0, 0), 50), GrvMetrics::default());
    }

    #[test]
    fn energy_model_weights_fingers() {
        let full = GrvMetrics {
            area: 50_000.0,
            intensity: 255.0,
            symmetry: 1.0,
            contour_count: 1,
        };
        let scans: Vec<(Hand, Finger, GrvMetrics)> = super::super::all_slots()
            .map(|(hand, finger)| (hand, finger, full))
            .collect();
        let model = energy_model(
            scans.iter().map(|(h, f, m)| (*h, *f, m)),
            50_000.0,
            Language::En,
        );
        // Root: 0.3 from each thumb.
        assert!((model.chakra_values.get(Chakra::Root) - 60.0).abs() < 1e-4);
        // Sacral: 0.1 from each thumb.
        assert!((model.chakra_values.get(Chakra::Sacral) - 20.0).abs() < 1e-4);
        // Heart: 0.1 (middle) + 0.3 (ring), both hands.
        assert!((model.chakra_values.get(Chakra::Heart) - 80.0).abs() < 1e-4);
        assert_eq!(model.details.len(), 7);
        assert!(model.balance_index <= 100.0);
    }

    #[test]
    fn glow_factor_caps_area() {
        let metrics = GrvMetrics {
            area: 1e9,
            intensity: 0.0,
            ..Default::default()
        };
        assert!((glow_factor(&metrics, 50_000.0) - 0.7).abs() < 1e-12);
    }
}
