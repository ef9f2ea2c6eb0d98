//! Kirlian Shared Library
//!
//! Shared types for the Kirlian platform.
//!
//! This library provides:
//! - The fixed table of seven chakras with their colors and descriptive text
//! - [`ChakraEnergyProfile`], the clamped per-chakra energy record every
//!   renderer and analyzer exchanges
//! - Balance metrics and energy-state classification

pub mod chakra;
pub mod profile;

pub use chakra::{Chakra, ChakraInfo, Language};
pub use profile::{
    balance_index, ChakraEnergyProfile, EnergyDetail, EnergyState, ProfileError, MAX_ENERGY,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
