//! Energy-driven color math on 8-bit RGB triplets.
//!
//! All helpers saturate into `[0, 255]`; fractional results are truncated
//! toward zero so repeated blends never drift upward.

use kirlian_shared::{Chakra, ChakraEnergyProfile};

pub type Rgb = [u8; 3];

pub const BLACK: Rgb = [0, 0, 0];

/// Color of a chakra at the given energy fraction.
///
/// From 50 % upward the base color is shown unchanged; below that it fades
/// linearly to black (0 % energy is pure black, 50 % the full base color).
pub fn energy_color(base: Rgb, energy: f32) -> Rgb {
    let energy = if energy.is_finite() {
        energy.clamp(0.0, 1.0)
    } else {
        0.0
    };
    if energy >= 0.5 {
        return base;
    }
    let level = energy * 2.0;
    base.map(|channel| to_channel(channel as f32 * level))
}

/// Energy-adjusted base color of `chakra` within `profile`.
pub fn chakra_color(profile: &ChakraEnergyProfile, chakra: Chakra) -> Rgb {
    energy_color(chakra.color_rgb(), profile.fraction(chakra))
}

/// Linear interpolation between two colors, `ratio` clamped to `[0, 1]`.
pub fn interpolate(a: Rgb, b: Rgb, ratio: f32) -> Rgb {
    let ratio = if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    };
    [0, 1, 2].map(|i| to_channel(a[i] as f32 * (1.0 - ratio) + b[i] as f32 * ratio))
}

/// Normalized weighted average of colors.
///
/// Negative and non-finite weights are ignored. Returns `None` when the
/// remaining weights sum to zero.
pub fn weighted_blend<I>(items: I) -> Option<Rgb>
where
    I: IntoIterator<Item = (Rgb, f32)>,
{
    let mut accum = [0.0f32; 3];
    let mut weight_sum = 0.0f32;
    for (color, weight) in items {
        if !weight.is_finite() || weight <= 0.0 {
            continue;
        }
        weight_sum += weight;
        for channel in 0..3 {
            accum[channel] += color[channel] as f32 * weight;
        }
    }
    if weight_sum > 0.0 {
        Some(accum.map(|c| to_channel(c / weight_sum)))
    } else {
        None
    }
}

/// Multiply every channel by `factor`, capping at 255.
pub fn boost(color: Rgb, factor: f32) -> Rgb {
    color.map(|channel| to_channel(channel as f32 * factor))
}

/// Truncate a float channel into `u8`, saturating at both ends.
pub fn to_channel(value: f32) -> u8 {
    if value.is_finite() {
        value.clamp(0.0, 255.0) as u8
    } else {
        0
    }
}

/// Convert an opacity fraction into an 8-bit alpha value.
pub fn to_alpha(fraction: f32) -> u8 {
    to_channel(255.0 * fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_color_keeps_base_above_half() {
        assert_eq!(energy_color([255, 128, 0], 0.5), [255, 128, 0]);
        assert_eq!(energy_color([255, 128, 0], 1.0), [255, 128, 0]);
        assert_eq!(energy_color([255, 128, 0], 7.0), [255, 128, 0]);
    }

    #[test]
    fn energy_color_fades_to_black() {
        assert_eq!(energy_color([255, 128, 0], 0.0), BLACK);
        assert_eq!(energy_color([200, 100, 50], 0.25), [100, 50, 25]);
        assert_eq!(energy_color([255, 255, 255], -1.0), BLACK);
        assert_eq!(energy_color([255, 255, 255], f32::NAN), BLACK);
    }

    #[test]
    fn interpolate_endpoints() {
        assert_eq!(interpolate([0, 0, 0], [200, 100, 50], 0.0), [0, 0, 0]);
        assert_eq!(interpolate([0, 0, 0], [200, 100, 50], 1.0), [200, 100, 50]);
        assert_eq!(interpolate([0, 0, 0], [200, 100, 50], 0.5), [100, 50, 25]);
    }

    #[test]
    fn weighted_blend_normalizes() {
        let blended = weighted_blend([([255, 0, 0], 1.0), ([0, 0, 255], 1.0)]).unwrap();
        assert_eq!(blended, [127, 0, 127]);
        assert_eq!(weighted_blend([([255, 0, 0], 0.0)]), None);
        assert_eq!(weighted_blend(Vec::<(Rgb, f32)>::new()), None);
    }

    #[test]
    fn blend_of_chakra_colors_stays_in_range_for_all_energies() {
        for step in 0..=100 {
            let energy = step as f32;
            let profile = ChakraEnergyProfile::uniform(energy).with(Chakra::Heart, 100.0 - energy);
            let items = Chakra::ALL
                .iter()
                .map(|c| (chakra_color(&profile, *c), profile.fraction(*c)));
            if let Some(color) = weighted_blend(items) {
                // u8 already bounds the channel; check the boost path too.
                let boosted = boost(color, 1.25);
                assert!(boosted.iter().all(|c| *c as u32 <= 255));
            }
        }
    }

    #[test]
    fn boost_caps_at_255() {
        assert_eq!(boost([240, 100, 0], 1.25), [255, 125, 0]);
    }

    #[test]
    fn alpha_saturates() {
        assert_eq!(to_alpha(0.7), 178);
        assert_eq!(to_alpha(-0.3), 0);
        assert_eq!(to_alpha(2.0), 255);
    }
}
