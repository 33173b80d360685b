//! Top-level composition of the feature, training and inference stages.
//!
//! Every stage failure becomes a [`Diagnostic`] entry; computed feature rows are
//! always part of the output.

use crate::application::feature_engineering_service::FeatureEngine;
use crate::application::ml::dataset::DatasetBuilder;
use crate::application::ml::labeler::Labeler;
use crate::application::ml::predictor::Predictor;
use crate::application::ml::trainer::ModelTrainer;
use crate::config::ModelEnvConfig;
use crate::domain::errors::PipelineError;
use crate::domain::market::ohlcv::OhlcvRecord;
use crate::domain::ml::artifact::ModelArtifact;
use crate::domain::ml::feature_row::FeatureRow;
use crate::domain::ml::recommendation::{AnalysisEntry, Diagnostic, TrainingSummary};
use crate::domain::ports::{ArtifactStore, OhlcvSource};
use tracing::{error, info, warn};

/// Which stages run after feature computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    /// Rows only.
    Features,
    /// Rows plus a training summary.
    Train,
    /// Rows plus a recommendation from the stored model.
    Predict,
    /// Retrain, persist, then recommend from the new model.
    TrainAndPredict,
}

pub struct AnalysisWorkflow<S> {
    store: S,
    labeler: Labeler,
    builder: DatasetBuilder,
    trainer: ModelTrainer,
}

impl<S: ArtifactStore> AnalysisWorkflow<S> {
    pub fn new(store: S, config: &ModelEnvConfig) -> Self {
        Self {
            store,
            labeler: Labeler::default(),
            builder: DatasetBuilder::new(config.seed)
                .with_limits(config.min_samples, config.max_samples),
            trainer: ModelTrainer::new(config.seed),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetches the history from `source` and runs [`AnalysisWorkflow::run`].
    pub fn run_source(&self, source: &dyn OhlcvSource, mode: AnalysisMode) -> Vec<AnalysisEntry> {
        match source.daily_history() {
            Ok(records) => self.run(&records, mode),
            Err(e) => {
                error!("Price history unavailable: {:#}", e);
                vec![diagnostic(&PipelineError::DataUnavailable {
                    reason: format!("{:#}", e),
                })]
            }
        }
    }

    /// Labeled rows in date order, followed by at most one trailing entry.
    pub fn run(&self, records: &[OhlcvRecord], mode: AnalysisMode) -> Vec<AnalysisEntry> {
        let rows = match self.labeled_rows(records) {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Feature computation failed: {}", e);
                return vec![diagnostic(&e)];
            }
        };

        let trailing = match mode {
            AnalysisMode::Features => None,
            AnalysisMode::Train => Some(
                self.train(&rows)
                    .map(|artifact| AnalysisEntry::Training {
                        training: summary(&artifact),
                    })
                    .unwrap_or_else(|e| diagnostic(&e)),
            ),
            AnalysisMode::Predict => Some(
                Predictor::load(&self.store)
                    .and_then(|predictor| predictor.predict_rows(&rows))
                    .map(|prediction| AnalysisEntry::Prediction { prediction })
                    .unwrap_or_else(|e| diagnostic(&e)),
            ),
            AnalysisMode::TrainAndPredict => Some(
                self.train(&rows)
                    .and_then(Predictor::new)
                    .and_then(|predictor| predictor.predict_rows(&rows))
                    .map(|prediction| AnalysisEntry::Prediction { prediction })
                    .unwrap_or_else(|e| diagnostic(&e)),
            ),
        };

        let mut entries: Vec<AnalysisEntry> = rows
            .into_iter()
            .map(|row| AnalysisEntry::Row(Box::new(row)))
            .collect();
        entries.extend(trailing);
        entries
    }

    /// Feature rows with forward-return labels attached.
    pub fn labeled_rows(&self, records: &[OhlcvRecord]) -> Result<Vec<FeatureRow>, PipelineError> {
        let mut rows = FeatureEngine::compute(records)?;
        self.labeler.apply(&mut rows);
        Ok(rows)
    }

    /// Builds the training set from `rows`, fits the model and replaces the stored
    /// artifact.
    pub fn train(&self, rows: &[FeatureRow]) -> Result<ModelArtifact, PipelineError> {
        let set = self.builder.build(rows)?;
        let artifact = self.trainer.train(&set)?;

        self.store
            .save(&artifact)
            .map_err(|e| PipelineError::Training {
                reason: format!("could not persist model to {}: {:#}", self.store.location(), e),
            })?;

        info!("Model stored at {}", self.store.location());
        Ok(artifact)
    }
}

fn summary(artifact: &ModelArtifact) -> TrainingSummary {
    TrainingSummary {
        train_accuracy: artifact.train_accuracy,
        test_accuracy: artifact.test_accuracy,
        n_training_points: artifact.n_training_points,
        n_test_points: artifact.n_test_points,
        feature_importances: artifact.feature_importances.clone(),
    }
}

fn diagnostic(error: &PipelineError) -> AnalysisEntry {
    AnalysisEntry::Diagnostic(Diagnostic::from(error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mock::{InMemoryArtifactStore, InMemoryOhlcvSource};
    use chrono::{Days, NaiveDate};

    fn flat(n: usize) -> Vec<OhlcvRecord> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                OhlcvRecord::new(
                    start.checked_add_days(Days::new(i as u64)).unwrap(),
                    100.0,
                    100.0,
                    100.0,
                    100.0,
                    1000,
                )
            })
            .collect()
    }

    fn workflow() -> AnalysisWorkflow<InMemoryArtifactStore> {
        AnalysisWorkflow::new(InMemoryArtifactStore::default(), &ModelEnvConfig::default())
    }

    fn trailing_status(entries: &[AnalysisEntry]) -> Option<&str> {
        match entries.last() {
            Some(AnalysisEntry::Diagnostic(d)) => Some(d.status.as_str()),
            _ => None,
        }
    }

    #[test]
    fn test_features_mode_emits_rows_only() {
        let entries = workflow().run(&flat(40), AnalysisMode::Features);
        assert_eq!(entries.len(), 40);
        assert!(entries.iter().all(|e| e.row().is_some()));
    }

    #[test]
    fn test_short_history_trains_to_insufficient_data() {
        let entries = workflow().run(&flat(300), AnalysisMode::TrainAndPredict);
        assert_eq!(entries.len(), 301);
        assert_eq!(trailing_status(&entries), Some("insufficient_data"));
    }

    #[test]
    fn test_predict_without_model() {
        let entries = workflow().run(&flat(30), AnalysisMode::Predict);
        assert_eq!(entries.len(), 31);
        assert_eq!(trailing_status(&entries), Some("model_not_found"));
    }

    #[test]
    fn test_empty_history_is_data_unavailable() {
        let entries = workflow().run(&[], AnalysisMode::Features);
        assert_eq!(trailing_status(&entries), Some("data_unavailable"));
    }

    #[test]
    fn test_source_failure_is_data_unavailable() {
        let source = InMemoryOhlcvSource::failing("provider timeout");
        let entries = workflow().run_source(&source, AnalysisMode::Predict);
        assert_eq!(entries.len(), 1);
        assert_eq!(trailing_status(&entries), Some("data_unavailable"));
    }
}
