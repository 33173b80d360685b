//! Model configuration parsing from environment variables.
//!
//! This module handles the artifact location and the sampling/seed parameters shared
//! by dataset building and training.

use anyhow::{Context, Result, ensure};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_MODEL_PATH: &str = "data/ml/model.json";
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_MAX_SAMPLES: usize = 300;
pub const DEFAULT_MIN_SAMPLES: usize = 50;

/// Model environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEnvConfig {
    pub model_path: PathBuf,
    pub seed: u64,
    pub max_samples: usize,
    pub min_samples: usize,
}

impl Default for ModelEnvConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            seed: DEFAULT_SEED,
            max_samples: DEFAULT_MAX_SAMPLES,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

impl ModelEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup (the process env in production).
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let model_path = lookup("STOCKCAST_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));
        let seed = Self::parse(&lookup, "STOCKCAST_SEED", DEFAULT_SEED)?;
        let max_samples = Self::parse(&lookup, "STOCKCAST_MAX_SAMPLES", DEFAULT_MAX_SAMPLES)?;
        let min_samples = Self::parse(&lookup, "STOCKCAST_MIN_SAMPLES", DEFAULT_MIN_SAMPLES)?;

        ensure!(min_samples > 0, "STOCKCAST_MIN_SAMPLES must be positive");
        ensure!(
            max_samples >= min_samples,
            "STOCKCAST_MAX_SAMPLES ({}) must not be below STOCKCAST_MIN_SAMPLES ({})",
            max_samples,
            min_samples
        );

        Ok(Self {
            model_path,
            seed,
            max_samples,
            min_samples,
        })
    }

    fn parse<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
    where
        F: Fn(&str) -> Option<String>,
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match lookup(key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .context(format!("Failed to parse {}", key)),
            None => Ok(default),
        }
    }
}
