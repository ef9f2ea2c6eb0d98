use std::fmt::{self, Display};

use image::RgbaImage;
use ndarray::{Array3, Axis};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::{KirlianError, KirlianResult};

/// An RGBA pixel buffer stored as `[height, width, 4]`.
///
/// This is the exchange format of the aura compositor and the overlay
/// stage. Channels are straight (non-premultiplied) 8-bit values.
///
/// # Examples
///
/// ```
/// use kirlian_core::RgbaField;
///
/// let field = RgbaField::transparent(64, 32);
/// assert_eq!((field.width(), field.height()), (64, 32));
/// assert!(field.is_fully_transparent());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaField {
    pub pixels: Array3<u8>,
}

impl RgbaField {
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            pixels: Array3::zeros((height as usize, width as usize, 4)),
        }
    }

    /// Wrap an existing `[height, width, 4]` array.
    pub fn from_array(pixels: Array3<u8>) -> KirlianResult<Self> {
        if pixels.dim().2 != 4 {
            return Err(KirlianError::InvalidInput(format!(
                "expected 4 channels, got {}",
                pixels.dim().2
            )));
        }
        Ok(Self { pixels })
    }

    pub fn from_image(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let pixels = Array3::from_shape_vec(
            (height as usize, width as usize, 4),
            image.as_raw().clone(),
        )
        .expect("RgbaImage buffer is height * width * 4");
        Self { pixels }
    }

    pub fn to_image(&self) -> RgbaImage {
        let standard = self.pixels.as_standard_layout();
        let raw = standard.iter().copied().collect::<Vec<u8>>();
        RgbaImage::from_raw(self.width(), self.height(), raw)
            .expect("field buffer is height * width * 4")
    }

    pub fn width(&self) -> u32 {
        self.pixels.dim().1 as u32
    }

    pub fn height(&self) -> u32 {
        self.pixels.dim().0 as u32
    }

    pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
        let (row, col) = (y as usize, x as usize);
        [
            self.pixels[[row, col, 0]],
            self.pixels[[row, col, 1]],
            self.pixels[[row, col, 2]],
            self.pixels[[row, col, 3]],
        ]
    }

    pub fn set(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let (row, col) = (y as usize, x as usize);
        for (channel, value) in rgba.into_iter().enumerate() {
            self.pixels[[row, col, channel]] = value;
        }
    }

    pub fn is_fully_transparent(&self) -> bool {
        self.pixels.index_axis(Axis(2), 3).iter().all(|a| *a == 0)
    }

    pub fn statistics(&self) -> FieldStatistics {
        let (height, width, _) = self.pixels.dim();
        let cells = (height * width).max(1) as f32;

        let mut mean_rgb = [0.0f32; 3];
        for (channel, mean) in mean_rgb.iter_mut().enumerate() {
            let view = self.pixels.index_axis(Axis(2), channel);
            let sum: u64 = view.iter().map(|v| *v as u64).sum();
            *mean = sum as f32 / cells;
        }

        let alpha = self.pixels.index_axis(Axis(2), 3);
        let alpha_values: Vec<u8> = alpha.iter().copied().collect();
        let alpha_sum: u64 = alpha_values.par_iter().map(|v| *v as u64).sum();
        let covered = alpha_values.par_iter().filter(|v| **v > 0).count();

        FieldStatistics {
            width: width as u32,
            height: height as u32,
            mean_rgb,
            mean_alpha: alpha_sum as f32 / cells,
            coverage: covered as f32 / cells,
        }
    }
}

impl Display for RgbaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.statistics();
        write!(
            f,
            "RgbaField {}x{} mean_rgb=({:.1},{:.1},{:.1}) mean_alpha={:.1} coverage={:.3}",
            stats.width,
            stats.height,
            stats.mean_rgb[0],
            stats.mean_rgb[1],
            stats.mean_rgb[2],
            stats.mean_alpha,
            stats.coverage,
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq)]
pub struct FieldStatistics {
    pub width: u32,
    pub height: u32,
    pub mean_rgb: [f32; 3],
    pub mean_alpha: f32,
    /// Fraction of pixels with non-zero alpha.
    pub coverage: f32,
}
