//! Simulated gas-discharge (GRV) finger scans and their analysis.
//!
//! A full scan covers the five fingers of both hands. Each image is reduced
//! to a handful of glow metrics, and the ten metric sets are folded into a
//! chakra energy model.

pub mod analysis;
pub mod session;
pub mod simulator;

pub use analysis::{analyze, energy_model, EnergyModel, GrvMetrics};
pub use session::{GrvSession, SessionRecord};
pub use simulator::GrvSimulator;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hand {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Hand {
    pub const ALL: [Hand; 2] = [Hand::Left, Hand::Right];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Hand::Left => "left",
            Hand::Right => "right",
        }
    }
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Finger::Thumb => "thumb",
            Finger::Index => "index",
            Finger::Middle => "middle",
            Finger::Ring => "ring",
            Finger::Pinky => "pinky",
        }
    }
}

/// Every `(hand, finger)` slot in scan order.
pub fn all_slots() -> impl Iterator<Item = (Hand, Finger)> {
    Hand::ALL
        .into_iter()
        .flat_map(|hand| Finger::ALL.into_iter().map(move |finger| (hand, finger)))
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Finger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Hand::Left),
            "right" | "r" => Ok(Hand::Right),
            other => Err(format!("unknown hand '{other}'")),
        }
    }
}

impl FromStr for Finger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Finger::ALL
            .into_iter()
            .find(|finger| finger.as_str() == key)
            .ok_or_else(|| format!("unknown finger '{key}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_slots_in_scan_order() {
        let slots: Vec<_> = all_slots().collect();
        assert_eq!(slots.len(), 10);
        assert_eq!(slots[0], (Hand::Left, Finger::Thumb));
        assert_eq!(slots[9], (Hand::Right, Finger::Pinky));
    }

    #[test]
    fn parse_names() {
        assert_eq!("Right".parse::<Hand>(), Ok(Hand::Right));
        assert_eq!(" pinky ".parse::<Finger>(), Ok(Finger::Pinky));
        assert!("toe".parse::<Finger>().is_err());
    }
}
