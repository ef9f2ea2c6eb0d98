//! Error type shared by the rendering and analysis pipelines.

use kirlian_shared::ProfileError;
use thiserror::Error;

use crate::config::ConfigError;

/// Result alias for fallible engine operations.
pub type KirlianResult<T> = Result<T, KirlianError>;

#[derive(Debug, Error)]
pub enum KirlianError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to extract text from PDF: {0}")]
    Pdf(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Analysis needs a scan of every finger on both hands.
    #[error("missing GRV-grams for: {}", .missing.join(", "))]
    MissingImages { missing: Vec<String> },

    #[error("render failed: {0}")]
    Render(String),
}

impl KirlianError {
    /// Wrap a drawing backend failure from plotters.
    pub(crate) fn render<E: std::fmt::Display>(err: E) -> Self {
        KirlianError::Render(err.to_string())
    }
}
