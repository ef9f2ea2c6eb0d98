//! Deterministic synthetic GRV-grams.
//!
//! A scan is a dark frame with a bluish corona ring around the fingertip.
//! Ring geometry and brightness are drawn from an RNG seeded by the session
//! seed and the finger identity, so the same session always produces the
//! same ten images. Per-pixel noise is keyed by pixel index, which keeps the
//! parallel fill reproducible.

use image::RgbImage;
use ndarray::{Array3, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::{Finger, Hand};
use crate::config::GrvConfig;

/// Number of corona streamers around the ring.
const STREAMERS: f64 = 24.0;
const BACKGROUND: f64 = 8.0;
const NOISE_AMPLITUDE: f64 = 12.0;

#[derive(Debug, Clone, Copy)]
pub struct GrvSimulator {
    pub image_size: u32,
    pub session_seed: u64,
}

impl Default for GrvSimulator {
    fn default() -> Self {
        Self::from(&GrvConfig::default())
    }
}

impl From<&GrvConfig> for GrvSimulator {
    fn from(config: &GrvConfig) -> Self {
        Self {
            image_size: config.image_size,
            session_seed: config.session_seed,
        }
    }
}

/// Ring parameters for one finger.
#[derive(Debug, Clone, Copy)]
struct Corona {
    center: (f64, f64),
    radius: f64,
    thickness: f64,
    peak: f64,
    streamer_depth: f64,
    streamer_phase: f64,
}

impl GrvSimulator {
    pub fn new(image_size: u32, session_seed: u64) -> Self {
        Self {
            image_size,
            session_seed,
        }
    }

    /// Seed for one finger, mixed from the session seed and the slot.
    pub fn finger_seed(&self, hand: Hand, finger: Finger) -> u64 {
        let slot = (hand.index() * Finger::ALL.len() + finger.index()) as u64 + 1;
        splitmix64(self.session_seed ^ splitmix64(slot))
    }

    pub fn capture(&self, hand: Hand, finger: Finger) -> RgbImage {
        let seed = self.finger_seed(hand, finger);
        let size = self.image_size as usize;
        let corona = self.corona(seed);

        let mut pixels = Array3::<u8>::zeros((size, size, 3));
        pixels
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(y, mut row)| {
                for x in 0..size {
                    let glow = corona.intensity(x as f64, y as f64);
                    let noise = (unit_noise(seed, (y * size + x) as u64) - 0.5) * 2.0 * NOISE_AMPLITUDE;
                    let tint = [0.6, 0.7, 1.0];
                    for channel in 0..3 {
                        let value = BACKGROUND + glow * tint[channel] + noise;
                        row[[x, channel]] = value.round().clamp(0.0, 255.0) as u8;
                    }
                }
            });

        tracing::debug!(%hand, %finger, seed, "simulated GRV capture");
        let raw = pixels.into_raw_vec();
        RgbImage::from_raw(self.image_size, self.image_size, raw)
            .expect("simulated frame is size * size * 3")
    }

    fn corona(&self, seed: u64) -> Corona {
        let mut rng = StdRng::seed_from_u64(seed);
        let size = self.image_size as f64;
        let jitter = size * 0.03;
        Corona {
            center: (
                size / 2.0 + rng.gen_range(-jitter..=jitter),
                size / 2.0 + rng.gen_range(-jitter..=jitter),
            ),
            radius: size * rng.gen_range(0.26..0.36),
            thickness: size * rng.gen_range(0.04..0.08),
            peak: rng.gen_range(150.0..240.0),
            streamer_depth: rng.gen_range(0.1..0.4),
            streamer_phase: rng.gen_range(0.0..std::f64::consts::TAU),
        }
    }
}

impl Corona {
    fn intensity(&self, x: f64, y: f64) -> f64 {
        let (dx, dy) = (x - self.center.0, y - self.center.1);
        let distance = (dx * dx + dy * dy).sqrt();
        let theta = dy.atan2(dx);
        let streamers = 1.0 + self.streamer_depth * (STREAMERS * theta + self.streamer_phase).sin();
        // Streamers stretch the ring outward only.
        let spread = if distance > self.radius {
            self.thickness * streamers.max(0.2)
        } else {
            self.thickness
        };
        let offset = (distance - self.radius) / spread;
        self.peak * (-offset * offset).exp()
    }
}

fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn unit_noise(seed: u64, index: u64) -> f64 {
    (splitmix64(seed ^ index.wrapping_mul(0xD6E8_FEB8_6659_FD93)) >> 11) as f64 / (1u64 << 53) as f64
}
