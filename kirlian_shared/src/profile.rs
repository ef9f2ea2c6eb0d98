//! Per-chakra energy profile and balance metrics.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chakra::{Chakra, Language};

/// Upper bound of every chakra energy value.
pub const MAX_ENERGY: f32 = 100.0;

/// Values below this are classified as deficient.
const DEFICIENT_BELOW: f32 = 30.0;
/// Values below this (and not deficient) are classified as balanced.
const BALANCED_BELOW: f32 = 70.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProfileError {
    #[error("unknown chakra '{0}'")]
    UnknownChakra(String),
    #[error("invalid energy value '{value}' for {name}")]
    InvalidValue { name: String, value: String },
    #[error("malformed energy assignment '{0}', expected NAME=VALUE")]
    Malformed(String),
}

/// Energy level (0..=100) for each of the seven chakras.
///
/// Every constructor and setter clamps into `[0, 100]`; non-finite input is
/// stored as 0. The profile is a plain value: recomputations replace it
/// wholesale.
///
/// # Examples
///
/// ```
/// use kirlian_shared::{Chakra, ChakraEnergyProfile};
///
/// let profile = ChakraEnergyProfile::parse_assignments("Root=80, Heart=140").unwrap();
/// assert_eq!(profile.get(Chakra::Root), 80.0);
/// assert_eq!(profile.get(Chakra::Heart), 100.0);
/// assert_eq!(profile.get(Chakra::Crown), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f32>", into = "BTreeMap<String, f32>")]
pub struct ChakraEnergyProfile {
    values: [f32; Chakra::COUNT],
}

impl ChakraEnergyProfile {
    pub fn zeros() -> Self {
        Self {
            values: [0.0; Chakra::COUNT],
        }
    }

    pub fn uniform(value: f32) -> Self {
        Self {
            values: [clamp_energy(value); Chakra::COUNT],
        }
    }

    /// Build from values ordered Root..Crown.
    pub fn from_values(values: [f32; Chakra::COUNT]) -> Self {
        Self {
            values: values.map(clamp_energy),
        }
    }

    pub fn get(&self, chakra: Chakra) -> f32 {
        self.values[chakra.index()]
    }

    /// Energy scaled into `[0, 1]`.
    pub fn fraction(&self, chakra: Chakra) -> f32 {
        self.get(chakra) / MAX_ENERGY
    }

    pub fn set(&mut self, chakra: Chakra, value: f32) {
        self.values[chakra.index()] = clamp_energy(value);
    }

    pub fn with(mut self, chakra: Chakra, value: f32) -> Self {
        self.set(chakra, value);
        self
    }

    pub fn values(&self) -> [f32; Chakra::COUNT] {
        self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (Chakra, f32)> + '_ {
        Chakra::ALL.iter().map(move |chakra| (*chakra, self.get(*chakra)))
    }

    pub fn average(&self) -> f32 {
        self.values.iter().sum::<f32>() / Chakra::COUNT as f32
    }

    pub fn is_all_zero(&self) -> bool {
        self.values.iter().all(|v| *v <= 0.0)
    }

    /// Parse a comma separated list of `NAME=VALUE` assignments.
    ///
    /// Chakras that are not mentioned stay at 0.
    pub fn parse_assignments(input: &str) -> Result<Self, ProfileError> {
        let mut profile = Self::zeros();
        for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = part
                .split_once('=')
                .ok_or_else(|| ProfileError::Malformed(part.to_string()))?;
            let chakra = Chakra::from_name(name)
                .ok_or_else(|| ProfileError::UnknownChakra(name.trim().to_string()))?;
            let value: f32 = value
                .trim()
                .parse()
                .map_err(|_| ProfileError::InvalidValue {
                    name: chakra.name().to_string(),
                    value: value.trim().to_string(),
                })?;
            profile.set(chakra, value);
        }
        Ok(profile)
    }

    /// Detailed state for every chakra.
    pub fn details(&self, lang: Language) -> Vec<EnergyDetail> {
        self.iter()
            .map(|(chakra, value)| {
                let state = EnergyState::classify(value);
                EnergyDetail {
                    chakra,
                    value,
                    state,
                    description: state.describe(chakra, lang),
                }
            })
            .collect()
    }
}

impl Default for ChakraEnergyProfile {
    fn default() -> Self {
        Self::uniform(50.0)
    }
}

impl TryFrom<BTreeMap<String, f32>> for ChakraEnergyProfile {
    type Error = ProfileError;

    fn try_from(map: BTreeMap<String, f32>) -> Result<Self, Self::Error> {
        let mut profile = Self::zeros();
        for (name, value) in map {
            let chakra = Chakra::from_name(&name).ok_or(ProfileError::UnknownChakra(name))?;
            profile.set(chakra, value);
        }
        Ok(profile)
    }
}

impl From<ChakraEnergyProfile> for BTreeMap<String, f32> {
    fn from(profile: ChakraEnergyProfile) -> Self {
        profile
            .iter()
            .map(|(chakra, value)| (chakra.name().to_string(), value))
            .collect()
    }
}

impl fmt::Display for ChakraEnergyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (chakra, value) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{}={:.1}", chakra.name(), value)?;
        }
        Ok(())
    }
}

fn clamp_energy(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, MAX_ENERGY)
    } else {
        0.0
    }
}

/// Qualitative state of a single chakra energy value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyState {
    Deficient,
    Balanced,
    Excessive,
}

impl EnergyState {
    pub fn classify(value: f32) -> Self {
        if value < DEFICIENT_BELOW {
            EnergyState::Deficient
        } else if value < BALANCED_BELOW {
            EnergyState::Balanced
        } else {
            EnergyState::Excessive
        }
    }

    pub fn label(self, lang: Language) -> &'static str {
        match (self, lang) {
            (EnergyState::Deficient, Language::En) => "deficient",
            (EnergyState::Balanced, Language::En) => "balanced",
            (EnergyState::Excessive, Language::En) => "excessive",
            (EnergyState::Deficient, Language::Ru) => "недостаток",
            (EnergyState::Balanced, Language::Ru) => "баланс",
            (EnergyState::Excessive, Language::Ru) => "избыток",
        }
    }

    fn describe(self, chakra: Chakra, lang: Language) -> String {
        let info = chakra.info();
        match (self, lang) {
            (EnergyState::Deficient, Language::En) => format!(
                "Insufficient energy in the {} chakra. Possible signs: {}.",
                info.name,
                info.imbalanced_signs.to_lowercase()
            ),
            (EnergyState::Balanced, Language::En) => format!(
                "Balanced {} chakra. Qualities: {}.",
                info.name,
                info.balanced_qualities.to_lowercase()
            ),
            (EnergyState::Excessive, Language::En) => format!(
                "Excessive energy in the {} chakra. Overactivity around: {}.",
                info.name,
                info.associated_with.to_lowercase()
            ),
            (EnergyState::Deficient, Language::Ru) => {
                format!("Недостаточная энергия: {}.", info.name_ru)
            }
            (EnergyState::Balanced, Language::Ru) => {
                format!("Сбалансированная энергия: {}.", info.name_ru)
            }
            (EnergyState::Excessive, Language::Ru) => {
                format!("Избыточная энергия: {}.", info.name_ru)
            }
        }
    }
}

/// Per-chakra summary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyDetail {
    pub chakra: Chakra,
    pub value: f32,
    pub state: EnergyState,
    pub description: String,
}

/// Balance index in `[0, 100]`: 100 for a perfectly flat profile.
///
/// The mean absolute deviation is compared against `avg * (n - 1) / n`;
/// an all-zero profile counts as balanced.
pub fn balance_index(profile: &ChakraEnergyProfile) -> f32 {
    let n = Chakra::COUNT as f32;
    let avg = profile.average();
    let avg_deviation = profile
        .values
        .iter()
        .map(|value| (value - avg).abs())
        .sum::<f32>()
        / n;
    let max_deviation = avg * (n - 1.0) / n;
    if max_deviation > 0.0 {
        (100.0 * (1.0 - avg_deviation / max_deviation)).clamp(0.0, 100.0)
    } else {
        100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_clamp() {
        let profile =
            ChakraEnergyProfile::from_values([-5.0, 0.0, 50.0, 100.0, 150.0, f32::NAN, 99.5]);
        assert_eq!(
            profile.values(),
            [0.0, 0.0, 50.0, 100.0, 100.0, 0.0, 99.5]
        );
    }

    #[test]
    fn parse_assignments_rejects_unknown_names() {
        let err = ChakraEnergyProfile::parse_assignments("Root=10,Spleen=4").unwrap_err();
        assert_eq!(err, ProfileError::UnknownChakra("Spleen".into()));
        assert!(matches!(
            ChakraEnergyProfile::parse_assignments("Root"),
            Err(ProfileError::Malformed(_))
        ));
        assert!(matches!(
            ChakraEnergyProfile::parse_assignments("Root=abc"),
            Err(ProfileError::InvalidValue { .. })
        ));
    }

    #[test]
    fn json_round_trip_uses_names() {
        let profile = ChakraEnergyProfile::zeros().with(Chakra::ThirdEye, 42.0);
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"Third Eye\":42.0"));
        let back: ChakraEnergyProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn flat_profile_is_fully_balanced() {
        assert_eq!(balance_index(&ChakraEnergyProfile::uniform(60.0)), 100.0);
        assert_eq!(balance_index(&ChakraEnergyProfile::zeros()), 100.0);
    }

    #[test]
    fn uneven_profile_loses_balance() {
        let profile = ChakraEnergyProfile::uniform(60.0).with(Chakra::Heart, 0.0);
        let index = balance_index(&profile);
        assert!(index > 0.0 && index < 100.0, "index = {index}");
    }

    #[test]
    fn state_thresholds() {
        assert_eq!(EnergyState::classify(29.9), EnergyState::Deficient);
        assert_eq!(EnergyState::classify(30.0), EnergyState::Balanced);
        assert_eq!(EnergyState::classify(69.9), EnergyState::Balanced);
        assert_eq!(EnergyState::classify(70.0), EnergyState::Excessive);
    }

    #[test]
    fn details_cover_every_chakra() {
        let details = ChakraEnergyProfile::uniform(10.0).details(Language::En);
        assert_eq!(details.len(), 7);
        assert!(details[0].description.contains("Root"));
        assert!(details.iter().all(|d| d.state == EnergyState::Deficient));
    }
}
