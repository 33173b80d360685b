//! Configuration module for Stockcast.
//!
//! Runtime settings come from environment variables (optionally a `.env` file);
//! the feature and labeling rules are compile-time constants.

mod model_env_config;
pub mod pipeline_constants;

pub use model_env_config::{
    DEFAULT_MAX_SAMPLES, DEFAULT_MIN_SAMPLES, DEFAULT_MODEL_PATH, DEFAULT_SEED, ModelEnvConfig,
};

use anyhow::{Context, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub model: ModelEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let model = ModelEnvConfig::from_env().context("Failed to load model config")?;
        Ok(Self { model })
    }
}
