//! The seven chakras and their static reference data.
//!
//! Chakras are ordered bottom to top. The ordinal is used as the storage
//! index inside [`crate::ChakraEnergyProfile`] and as the vertical slot in
//! every renderer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Interface language for labels and descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ru,
    En,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ru" | "russian" => Ok(Language::Ru),
            "en" | "english" => Ok(Language::En),
            other => Err(format!("unsupported language '{other}'")),
        }
    }
}

/// One of the seven chakras, bottom (Root) to top (Crown).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(usize)]
pub enum Chakra {
    Root = 0,
    Sacral = 1,
    SolarPlexus = 2,
    Heart = 3,
    Throat = 4,
    ThirdEye = 5,
    Crown = 6,
}

/// Static descriptive record for a chakra.
#[derive(Debug, Clone, Copy)]
pub struct ChakraInfo {
    pub name: &'static str,
    pub name_ru: &'static str,
    pub sanskrit_name: &'static str,
    pub location: &'static str,
    pub element: &'static str,
    /// Base color used by the figure and scene renderers.
    pub color_rgb: [u8; 3],
    /// Palette used by the aura compositor.
    pub aura_rgb: [u8; 3],
    pub associated_with: &'static str,
    pub balanced_qualities: &'static str,
    pub imbalanced_signs: &'static str,
}

const CHAKRA_TABLE: [ChakraInfo; 7] = [
    ChakraInfo {
        name: "Root",
        name_ru: "Корневая",
        sanskrit_name: "Muladhara",
        location: "Base of spine",
        element: "Earth",
        color_rgb: [255, 0, 0],
        aura_rgb: [255, 0, 0],
        associated_with: "Survival, grounding, stability, basic needs",
        balanced_qualities: "Security, stability, grounded, confident",
        imbalanced_signs: "Fear, anxiety, financial insecurity, disconnection",
    },
    ChakraInfo {
        name: "Sacral",
        name_ru: "Сакральная",
        sanskrit_name: "Svadhisthana",
        location: "Lower abdomen",
        element: "Water",
        color_rgb: [255, 128, 0],
        aura_rgb: [255, 128, 0],
        associated_with: "Creativity, sexuality, pleasure, emotional balance",
        balanced_qualities: "Creative, passionate, emotionally balanced, sensual",
        imbalanced_signs: "Emotional numbness, lack of creativity, reproductive issues",
    },
    ChakraInfo {
        name: "Solar Plexus",
        name_ru: "Солнечное сплетение",
        sanskrit_name: "Manipura",
        location: "Upper abdomen/stomach area",
        element: "Fire",
        color_rgb: [255, 255, 0],
        aura_rgb: [255, 255, 0],
        associated_with: "Personal power, self-esteem, confidence, willpower",
        balanced_qualities: "Confident, purposeful, disciplined, driven",
        imbalanced_signs: "Low self-esteem, digestive issues, inability to set boundaries",
    },
    ChakraInfo {
        name: "Heart",
        name_ru: "Сердечная",
        sanskrit_name: "Anahata",
        location: "Center of chest",
        element: "Air",
        color_rgb: [0, 255, 0],
        aura_rgb: [0, 255, 0],
        associated_with: "Love, compassion, forgiveness, relationships",
        balanced_qualities: "Loving, compassionate, forgiving, empathetic",
        imbalanced_signs: "Grief, anger, resentment, fear of intimacy",
    },
    ChakraInfo {
        name: "Throat",
        name_ru: "Горловая",
        sanskrit_name: "Vishuddha",
        location: "Throat",
        element: "Ether",
        color_rgb: [0, 191, 255],
        aura_rgb: [0, 191, 255],
        associated_with: "Communication, self-expression, truth, authentic voice",
        balanced_qualities: "Articulate, honest, good listener, authentic expression",
        imbalanced_signs: "Difficulty speaking truth, fear of speaking, inability to express",
    },
    ChakraInfo {
        name: "Third Eye",
        name_ru: "Третий глаз",
        sanskrit_name: "Ajna",
        location: "Center of forehead",
        element: "Light",
        color_rgb: [75, 0, 130],
        aura_rgb: [0, 0, 255],
        associated_with: "Intuition, insight, imagination",
        balanced_qualities: "Intuitive, perceptive, discerning, visionary",
        imbalanced_signs: "Lack of direction, poor intuition, headaches, insomnia",
    },
    ChakraInfo {
        name: "Crown",
        name_ru: "Коронная",
        sanskrit_name: "Sahasrara",
        location: "Top of head",
        element: "Cosmic Energy",
        color_rgb: [148, 0, 211],
        aura_rgb: [128, 0, 128],
        associated_with: "Spiritual connection, higher consciousness",
        balanced_qualities: "Spiritually connected, wise, integrated",
        imbalanced_signs: "Spiritual disconnection, materialism, cynicism, apathy",
    },
];

impl Chakra {
    pub const COUNT: usize = 7;

    /// All chakras, bottom to top.
    pub const ALL: [Chakra; 7] = [
        Chakra::Root,
        Chakra::Sacral,
        Chakra::SolarPlexus,
        Chakra::Heart,
        Chakra::Throat,
        Chakra::ThirdEye,
        Chakra::Crown,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn info(self) -> &'static ChakraInfo {
        &CHAKRA_TABLE[self.index()]
    }

    /// Canonical English name ("Solar Plexus", "Third Eye", ...).
    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn localized_name(self, lang: Language) -> &'static str {
        match lang {
            Language::En => self.info().name,
            Language::Ru => self.info().name_ru,
        }
    }

    pub fn color_rgb(self) -> [u8; 3] {
        self.info().color_rgb
    }

    pub fn aura_rgb(self) -> [u8; 3] {
        self.info().aura_rgb
    }

    /// Resolve a chakra from a loosely written name.
    ///
    /// Case, spaces, underscores and hyphens are ignored, so `"solar_plexus"`,
    /// `"SolarPlexus"` and `"Solar Plexus"` all resolve. Sanskrit and Russian
    /// names are accepted too.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = normalize_key(name);
        Self::ALL.into_iter().find(|chakra| {
            let info = chakra.info();
            normalize_key(info.name) == key
                || normalize_key(info.sanskrit_name) == key
                || normalize_key(info.name_ru) == key
        })
    }
}

impl fmt::Display for Chakra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Chakra {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Chakra::from_name(s).ok_or_else(|| format!("unknown chakra '{s}'"))
    }
}

fn normalize_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_follow_table_order() {
        for (idx, chakra) in Chakra::ALL.iter().enumerate() {
            assert_eq!(chakra.index(), idx);
            assert_eq!(Chakra::from_index(idx), Some(*chakra));
        }
        assert_eq!(Chakra::from_index(7), None);
    }

    #[test]
    fn from_name_is_forgiving() {
        assert_eq!(Chakra::from_name("Solar Plexus"), Some(Chakra::SolarPlexus));
        assert_eq!(Chakra::from_name("solar_plexus"), Some(Chakra::SolarPlexus));
        assert_eq!(Chakra::from_name("ThirdEye"), Some(Chakra::ThirdEye));
        assert_eq!(Chakra::from_name("ajna"), Some(Chakra::ThirdEye));
        assert_eq!(Chakra::from_name("Корневая"), Some(Chakra::Root));
        assert_eq!(Chakra::from_name("spleen"), None);
    }

    #[test]
    fn aura_palette_differs_only_for_upper_chakras() {
        assert_eq!(Chakra::Heart.aura_rgb(), Chakra::Heart.color_rgb());
        assert_eq!(Chakra::ThirdEye.aura_rgb(), [0, 0, 255]);
        assert_eq!(Chakra::Crown.aura_rgb(), [128, 0, 128]);
    }

    #[test]
    fn language_parses() {
        assert_eq!("EN".parse::<Language>(), Ok(Language::En));
        assert_eq!("ru".parse::<Language>(), Ok(Language::Ru));
        assert!("de".parse::<Language>().is_err());
    }
}
