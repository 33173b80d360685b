//! Qualifying-row selection and bounded, seeded sampling of the training set.

use crate::config::{DEFAULT_MAX_SAMPLES, DEFAULT_MIN_SAMPLES, DEFAULT_SEED};
use crate::domain::errors::PipelineError;
use crate::domain::ml::feature_registry::{default_feature_names, features_to_vector};
use crate::domain::ml::feature_row::FeatureRow;
use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A labeled row with every model feature present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub date: NaiveDate,
    pub close: f64,
    pub features: Vec<f64>,
    pub label: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    /// Column order of every `TrainingSample::features`.
    pub feature_names: Vec<String>,
    pub samples: Vec<TrainingSample>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn labels(&self) -> Vec<u8> {
        self.samples.iter().map(|s| s.label).collect()
    }

    pub fn positive_share(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().filter(|s| s.label == 1).count() as f64 / self.samples.len() as f64
    }
}

#[derive(Debug, Clone)]
pub struct DatasetBuilder {
    feature_names: Vec<String>,
    min_samples: usize,
    max_samples: usize,
    seed: u64,
}

impl Default for DatasetBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl DatasetBuilder {
    pub fn new(seed: u64) -> Self {
        Self {
            feature_names: default_feature_names(),
            min_samples: DEFAULT_MIN_SAMPLES,
            max_samples: DEFAULT_MAX_SAMPLES,
            seed,
        }
    }

    pub fn with_limits(mut self, min_samples: usize, max_samples: usize) -> Self {
        self.min_samples = min_samples;
        self.max_samples = max_samples;
        self
    }

    /// Rows with a label and every model feature, in input order.
    pub fn qualifying(&self, rows: &[FeatureRow]) -> Vec<TrainingSample> {
        rows.iter()
            .filter_map(|row| {
                let label = row.label?;
                let features = features_to_vector(row, &self.feature_names)?;
                Some(TrainingSample {
                    date: row.record.date,
                    close: row.record.close,
                    features,
                    label,
                })
            })
            .collect()
    }

    /// Filters `rows` and, above `max_samples`, draws a seeded sample without
    /// replacement. Drawn rows keep their date order.
    pub fn build(&self, rows: &[FeatureRow]) -> Result<TrainingSet, PipelineError> {
        let qualifying = self.qualifying(rows);

        if qualifying.len() < self.min_samples {
            warn!(
                "Only {} qualifying rows out of {} (need {})",
                qualifying.len(),
                rows.len(),
                self.min_samples
            );
            return Err(PipelineError::InsufficientData {
                available: qualifying.len(),
                required: self.min_samples,
            });
        }

        let samples = if qualifying.len() > self.max_samples {
            let mut rng = StdRng::seed_from_u64(self.seed);
            let mut picked = index::sample(&mut rng, qualifying.len(), self.max_samples).into_vec();
            picked.sort_unstable();
            picked.into_iter().map(|i| qualifying[i].clone()).collect()
        } else {
            qualifying
        };

        info!(
            "Training set: {} samples from {} rows (seed {})",
            samples.len(),
            rows.len(),
            self.seed
        );

        Ok(TrainingSet {
            feature_names: self.feature_names.clone(),
            samples,
        })
    }
}
