//! # Kirlian Core
//!
//! Rendering and analysis engine for chakra energy profiles. A profile is a
//! set of seven energies in `[0, 100]`; it can be entered by hand, derived
//! from a diagnostic PDF report, or estimated from simulated GRV finger
//! scans, and is then drawn as a chakra figure, a 3D scene or a per-pixel
//! aura that can be composited over a photo.
//!
//! ## Quick Start
//!
//! ```rust
//! use kirlian_core::{render_aura, overlay_aura, ChakraEnergyProfile};
//! use image::{Rgba, RgbaImage};
//!
//! let profile = ChakraEnergyProfile::parse_assignments("Root=80,Heart=65,Crown=40").unwrap();
//! let aura = render_aura(&profile, 200, 240);
//! let stats = aura.statistics();
//! println!("Aura coverage: {:.2}", stats.coverage);
//!
//! let photo = RgbaImage::from_pixel(400, 480, Rgba([30, 30, 30, 255]));
//! let composed = overlay_aura(&photo, &aura);
//! assert_eq!(composed.dimensions(), (400, 480));
//! ```
//!
//! ## Core Modules
//!
//! - [`config`] - Application configuration via TOML
//! - [`color`] - Energy-scaled colors and weighted blends
//! - [`render`] - Figure, scene, aura, overlay and organ renderers
//! - [`diagnostics`] - PDF report parsing, chakra mapping, organ status
//! - [`grv`] - Simulated finger scans and the energy model
//! - [`logging`] - JSON line-delimited operation log

pub mod color;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod grv;
pub mod logging;
pub mod render;

pub use config::{AppConfig, AuraConfig, ConfigError, ExportConfig, GrvConfig, RenderConfig};
pub use diagnostics::{
    map_to_chakras, organ_report, DiagnosticData, DiagnosticParameter, DiagnosticReport, Organ,
    OrganStatus, ParameterStatus,
};
pub use error::{KirlianError, KirlianResult};
pub use grv::{EnergyModel, Finger, GrvMetrics, GrvSession, GrvSimulator, Hand};
pub use kirlian_shared::{Chakra, ChakraEnergyProfile, Language};
pub use logging::OperationLog;
pub use render::{
    export_jpeg, export_png, overlay_aura, render_aura, render_figure, render_organ_detail,
    render_organ_map, render_scene_png, AuraCompositor, ChakraScene, FieldStatistics, FigureModel,
    RgbaField,
};
