//! Application configuration via TOML files.
//!
//! Every section is optional; missing keys fall back to the defaults the
//! renderers were tuned with. Values are validated once at load time so the
//! render and analysis code can trust them.

use std::fs;
use std::path::{Path, PathBuf};

use kirlian_shared::Language;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Top-level configuration loaded from `config/kirlian.toml`.
///
/// # Examples
///
/// ```
/// use kirlian_core::AppConfig;
///
/// let config = AppConfig::load_from_file("config/kirlian.toml")
///     .unwrap_or_else(|_| AppConfig::default());
/// println!("Aura canvas: {}x{}", config.aura.width, config.aura.height);
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppConfig {
    pub render: RenderConfig,
    pub aura: AuraConfig,
    pub export: ExportConfig,
    pub grv: GrvConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_str(&contents)
    }

    pub fn from_str(toml_str: &str) -> Result<Self, ConfigError> {
        let raw: RawAppConfig =
            toml::from_str(toml_str).map_err(|err| ConfigError::Parse(err.to_string()))?;

        Ok(Self {
            render: RenderConfig::try_from(&raw.render)?,
            aura: AuraConfig::try_from(&raw.aura)?,
            export: ExportConfig::try_from(&raw.export)?,
            grv: GrvConfig::try_from(&raw.grv)?,
            logging: LoggingConfig::from(&raw.logging),
        })
    }
}

/// Canvas sizes for the figure and scene renderers.
#[derive(Debug, Clone, Serialize)]
pub struct RenderConfig {
    pub figure_width: u32,
    pub figure_height: u32,
    pub scene_width: u32,
    pub scene_height: u32,
    pub organ_map_width: u32,
    pub organ_map_height: u32,
    pub language: Language,
}

impl RenderConfig {
    fn try_from(raw: &RawRender) -> Result<Self, ConfigError> {
        for (name, value) in [
            ("render.figure_width", raw.figure_width),
            ("render.figure_height", raw.figure_height),
            ("render.scene_width", raw.scene_width),
            ("render.scene_height", raw.scene_height),
            ("render.organ_map_width", raw.organ_map_width),
            ("render.organ_map_height", raw.organ_map_height),
        ] {
            ensure_canvas(name, value)?;
        }

        Ok(Self {
            figure_width: raw.figure_width,
            figure_height: raw.figure_height,
            scene_width: raw.scene_width,
            scene_height: raw.scene_height,
            organ_map_width: raw.organ_map_width,
            organ_map_height: raw.organ_map_height,
            language: raw.language,
        })
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::try_from(&RawRender::default()).expect("default render config is valid")
    }
}

/// Aura compositor parameters.
#[derive(Debug, Clone, Serialize)]
pub struct AuraConfig {
    pub width: u32,
    pub height: u32,
    /// Multiplier applied to the blended color before capping at 255.
    pub brightness_boost: f32,
    /// Opacity ceiling as a fraction of 255.
    pub max_opacity: f32,
}

impl AuraConfig {
    fn try_from(raw: &RawAura) -> Result<Self, ConfigError> {
        ensure_canvas("aura.width", raw.width)?;
        ensure_canvas("aura.height", raw.height)?;
        if !raw.brightness_boost.is_finite() || raw.brightness_boost <= 0.0 {
            return Err(ConfigError::Parse(
                "aura.brightness_boost must be positive".into(),
            ));
        }
        if !raw.max_opacity.is_finite() || !(0.0..=1.0).contains(&raw.max_opacity) {
            return Err(ConfigError::Parse(
                "aura.max_opacity must lie in [0, 1]".into(),
            ));
        }

        Ok(Self {
            width: raw.width,
            height: raw.height,
            brightness_boost: raw.brightness_boost,
            max_opacity: raw.max_opacity,
        })
    }
}

impl Default for AuraConfig {
    fn default() -> Self {
        Self::try_from(&RawAura::default()).expect("default aura config is valid")
    }
}

/// Download/export parameters.
#[derive(Debug, Clone, Serialize)]
pub struct ExportConfig {
    pub max_dimension: u32,
    pub jpeg_quality: u8,
}

impl ExportConfig {
    fn try_from(raw: &RawExport) -> Result<Self, ConfigError> {
        ensure_canvas("export.max_dimension", raw.max_dimension)?;
        if raw.jpeg_quality == 0 || raw.jpeg_quality > 100 {
            return Err(ConfigError::Parse(
                "export.jpeg_quality must lie in 1..=100".into(),
            ));
        }
        Ok(Self {
            max_dimension: raw.max_dimension,
            jpeg_quality: raw.jpeg_quality,
        })
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::try_from(&RawExport::default()).expect("default export config is valid")
    }
}

/// Simulated GRV capture and analysis parameters.
#[derive(Debug, Clone, Serialize)]
pub struct GrvConfig {
    pub image_size: u32,
    pub session_seed: u64,
    /// Grayscale level above which a pixel counts as glow.
    pub threshold: u8,
    /// Glow area (pixels) that maps to a full area factor.
    pub area_norm: f32,
}

impl GrvConfig {
    fn try_from(raw: &RawGrv) -> Result<Self, ConfigError> {
        ensure_canvas("grv.image_size", raw.image_size)?;
        if !raw.area_norm.is_finite() || raw.area_norm <= 0.0 {
            return Err(ConfigError::Parse("grv.area_norm must be positive".into()));
        }
        Ok(Self {
            image_size: raw.image_size,
            session_seed: raw.session_seed,
            threshold: raw.threshold,
            area_norm: raw.area_norm,
        })
    }
}

impl Default for GrvConfig {
    fn default() -> Self {
        Self::try_from(&RawGrv::default()).expect("default grv config is valid")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub log_dir: PathBuf,
}

impl From<&RawLogging> for LoggingConfig {
    fn from(raw: &RawLogging) -> Self {
        Self {
            enabled: raw.enabled,
            log_dir: PathBuf::from(&raw.log_dir),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::from(&RawLogging::default())
    }
}

/// Largest canvas side accepted anywhere; keeps per-pixel loops bounded.
const MAX_CANVAS: u32 = 8192;

fn ensure_canvas(name: &str, value: u32) -> Result<(), ConfigError> {
    if value == 0 || value > MAX_CANVAS {
        return Err(ConfigError::Parse(format!(
            "{name} must lie in 1..={MAX_CANVAS}"
        )));
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
struct RawAppConfig {
    #[serde(default)]
    render: RawRender,
    #[serde(default)]
    aura: RawAura,
    #[serde(default)]
    export: RawExport,
    #[serde(default)]
    grv: RawGrv,
    #[serde(default)]
    logging: RawLogging,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawRender {
    figure_width: u32,
    figure_height: u32,
    scene_width: u32,
    scene_height: u32,
    organ_map_width: u32,
    organ_map_height: u32,
    language: Language,
}

impl Default for RawRender {
    fn default() -> Self {
        Self {
            figure_width: 600,
            figure_height: 1080,
            scene_width: 800,
            scene_height: 1000,
            organ_map_width: 480,
            organ_map_height: 840,
            language: Language::Ru,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawAura {
    width: u32,
    height: u32,
    brightness_boost: f32,
    max_opacity: f32,
}

impl Default for RawAura {
    fn default() -> Self {
        Self {
            width: 500,
            height: 600,
            brightness_boost: 1.25,
            max_opacity: 0.7,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawExport {
    max_dimension: u32,
    jpeg_quality: u8,
}

impl Default for RawExport {
    fn default() -> Self {
        Self {
            max_dimension: 1200,
            jpeg_quality: 85,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawGrv {
    image_size: u32,
    session_seed: u64,
    threshold: u8,
    area_norm: f32,
}

impl Default for RawGrv {
    fn default() -> Self {
        Self {
            image_size: 256,
            session_seed: 42,
            threshold: 50,
            area_norm: 50_000.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawLogging {
    enabled: bool,
    log_dir: String,
}

impl Default for RawLogging {
    fn default() -> Self {
        Self {
            enabled: true,
            log_dir: "logs".to_string(),
        }
    }
}
