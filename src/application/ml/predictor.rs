use crate::application::market_data::rolling::round_to;
use crate::domain::errors::PipelineError;
use crate::domain::ml::artifact::ModelArtifact;
use crate::domain::ml::classifier::Classifier;
use crate::domain::ml::feature_registry::features_to_vector;
use crate::domain::ml::feature_row::FeatureRow;
use crate::domain::ml::recommendation::{AnalysisEntry, FeatureValue, Recommendation, Signal};
use crate::domain::ports::ArtifactStore;
use tracing::{debug, info};

/// Serves BUY/SELL recommendations from a validated model artifact.
#[derive(Debug, Clone)]
pub struct Predictor {
    artifact: ModelArtifact,
}

impl Predictor {
    pub fn new(artifact: ModelArtifact) -> Result<Self, PipelineError> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    /// Loads the current artifact from `store`.
    ///
    /// A missing artifact is `ModelNotFound`; an unreadable or incompatible one is a
    /// `Prediction` error.
    pub fn load(store: &dyn ArtifactStore) -> Result<Self, PipelineError> {
        let artifact = store
            .load()
            .map_err(|e| PipelineError::Prediction {
                reason: format!("{:#}", e),
            })?
            .ok_or_else(|| PipelineError::ModelNotFound {
                location: store.location(),
            })?;

        info!(
            "Loaded model from {} ({} features, trained {})",
            store.location(),
            artifact.feature_names.len(),
            artifact.trained_at
        );
        Self::new(artifact)
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Predicts from the feature rows of a published output sequence; entries that
    /// are not rows are ignored.
    pub fn predict(&self, entries: &[AnalysisEntry]) -> Result<Recommendation, PipelineError> {
        self.predict_latest(entries.iter().filter_map(AnalysisEntry::row))
    }

    pub fn predict_rows(&self, rows: &[FeatureRow]) -> Result<Recommendation, PipelineError> {
        self.predict_latest(rows.iter())
    }

    /// Uses the newest row carrying every artifact feature.
    fn predict_latest<'a, I>(&self, rows: I) -> Result<Recommendation, PipelineError>
    where
        I: DoubleEndedIterator<Item = &'a FeatureRow>,
    {
        let names = &self.artifact.feature_names;
        let (row, features) = rows
            .rev()
            .find_map(|row| features_to_vector(row, names).map(|v| (row, v)))
            .ok_or(PipelineError::NoCompleteData {
                required: names.len(),
            })?;

        let model = &self.artifact.model;
        let proba = model.predict_proba(&features)?;
        let signal = Signal::from_class(model.predict(&features)?);

        let buy_probability = round_to(proba[1] * 100.0, 2);
        let sell_probability = round_to(proba[0] * 100.0, 2);

        debug!(
            date = %row.record.date,
            buy = buy_probability,
            sell = sell_probability,
            "scored latest complete row"
        );

        Ok(Recommendation {
            date: row.record.date,
            recommendation: signal,
            confidence: buy_probability.max(sell_probability),
            buy_probability,
            sell_probability,
            current_price: row.record.close,
            features_used: names
                .iter()
                .zip(features)
                .map(|(feature, value)| FeatureValue {
                    feature: feature.clone(),
                    value,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::ohlcv::OhlcvRecord;
    use crate::domain::ml::artifact::ARTIFACT_FORMAT_VERSION;
    use crate::domain::ml::decision_tree::{DecisionTree, TreeNode};
    use crate::domain::ml::random_forest::RandomForest;
    use crate::domain::ml::recommendation::Diagnostic;
    use crate::infrastructure::mock::InMemoryArtifactStore;
    use chrono::{NaiveDate, Utc};

    /// BUY with 80% when the first feature exceeds 0, SELL with 70% otherwise.
    fn stump_artifact(names: &[&str]) -> ModelArtifact {
        let root = TreeNode::split(
            0,
            0.0,
            TreeNode::leaf([0.7, 0.3], 10),
            TreeNode::leaf([0.2, 0.8], 10),
        );
        let tree = DecisionTree::new(root, names.len());
        ModelArtifact {
            format_version: ARTIFACT_FORMAT_VERSION,
            feature_names: names.iter().map(|s| s.to_string()).collect(),
            model: RandomForest::from_trees(vec![tree], names.len()),
            train_accuracy: 1.0,
            test_accuracy: 1.0,
            feature_importances: Vec::new(),
            n_training_points: 20,
            n_test_points: 5,
            seed: 42,
            trained_at: Utc::now(),
        }
    }

    fn row(day: u32, change_1d: Option<f64>, change_1w: Option<f64>) -> FeatureRow {
        let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        FeatureRow {
            price_change_1d: change_1d,
            price_change_1w: change_1w,
            ..FeatureRow::from_record(OhlcvRecord::new(date, 1.0, 1.0, 1.0, 10.0 + day as f64, 5))
        }
    }

    #[test]
    fn test_uses_newest_complete_row() {
        let predictor =
            Predictor::new(stump_artifact(&["Price_Change_1D", "Price_Change_1W"])).unwrap();
        let rows = vec![
            row(1, Some(-1.0), Some(0.5)),
            row(2, Some(2.0), Some(0.5)),
            row(3, Some(3.0), None),
        ];

        let rec = predictor.predict_rows(&rows).unwrap();
        assert_eq!(rec.date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(rec.recommendation, Signal::Buy);
        assert_eq!(rec.buy_probability, 80.0);
        assert_eq!(rec.sell_probability, 20.0);
        assert_eq!(rec.confidence, 80.0);
        assert_eq!(rec.current_price, 12.0);
        assert_eq!(rec.features_used[0].feature, "Price_Change_1D");
        assert_eq!(rec.features_used[0].value, 2.0);
    }

    #[test]
    fn test_feature_order_follows_artifact() {
        let rows = vec![row(1, Some(-1.0), Some(4.0))];

        let by_day =
            Predictor::new(stump_artifact(&["Price_Change_1D", "Price_Change_1W"])).unwrap();
        let by_week =
            Predictor::new(stump_artifact(&["Price_Change_1W", "Price_Change_1D"])).unwrap();

        assert_eq!(by_day.predict_rows(&rows).unwrap().recommendation, Signal::Sell);
        assert_eq!(by_week.predict_rows(&rows).unwrap().recommendation, Signal::Buy);
    }

    #[test]
    fn test_non_row_entries_are_skipped() {
        let predictor = Predictor::new(stump_artifact(&["Price_Change_1D"])).unwrap();
        let entries = vec![
            AnalysisEntry::Row(Box::new(row(1, Some(-3.0), None))),
            AnalysisEntry::Diagnostic(Diagnostic {
                status: "model_not_found".to_string(),
                message: "stale".to_string(),
            }),
        ];
        let rec = predictor.predict(&entries).unwrap();
        assert_eq!(rec.recommendation, Signal::Sell);
        assert_eq!(rec.confidence, 70.0);
    }

    #[test]
    fn test_no_complete_row() {
        let predictor = Predictor::new(stump_artifact(&["Price_Change_1D"])).unwrap();
        let err = predictor.predict_rows(&[row(1, None, Some(1.0))]).unwrap_err();
        assert_eq!(err, PipelineError::NoCompleteData { required: 1 });
    }

    #[test]
    fn test_load_from_empty_store_is_model_not_found() {
        let store = InMemoryArtifactStore::default();
        let err = Predictor::load(&store).unwrap_err();
        assert_eq!(err.status(), "model_not_found");
    }

    #[test]
    fn test_load_rejects_unknown_features() {
        let store =
            InMemoryArtifactStore::with_artifact(stump_artifact(&["Price_Change_1D", "RSI_14"]));
        let err = Predictor::load(&store).unwrap_err();
        assert_eq!(err.status(), "prediction_error");
    }
}
