use crate::domain::errors::PipelineError;
use crate::domain::ml::feature_registry::unknown_features;
use crate::domain::ml::random_forest::RandomForest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bumped whenever the persisted layout changes incompatibly.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Output of one training run. Read-only once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    /// Column order of the model input. Inference must build vectors in this order.
    pub feature_names: Vec<String>,
    pub model: RandomForest,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    /// Sorted by descending importance.
    pub feature_importances: Vec<FeatureImportance>,
    pub n_training_points: usize,
    pub n_test_points: usize,
    pub seed: u64,
    pub trained_at: DateTime<Utc>,
}

impl ModelArtifact {
    /// Checks that this artifact can be served by the current feature engine.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(PipelineError::Prediction {
                reason: format!(
                    "unsupported artifact format v{} (expected v{})",
                    self.format_version, ARTIFACT_FORMAT_VERSION
                ),
            });
        }

        let unknown = unknown_features(&self.feature_names);
        if !unknown.is_empty() {
            return Err(PipelineError::Prediction {
                reason: format!("artifact uses unknown features: {}", unknown.join(", ")),
            });
        }

        if self.feature_names.len() != self.model.n_features() {
            return Err(PipelineError::Prediction {
                reason: format!(
                    "artifact lists {} features but the model expects {}",
                    self.feature_names.len(),
                    self.model.n_features()
                ),
            });
        }

        if let Some(feature) = self.model.max_split_feature()
            && feature >= self.model.n_features()
        {
            return Err(PipelineError::Prediction {
                reason: format!(
                    "model splits on column {} but takes only {} features",
                    feature,
                    self.model.n_features()
                ),
            });
        }

        Ok(())
    }
}

/// Pairs importances with names and sorts them, highest first. Ties keep column order.
pub fn rank_importances(names: &[String], importances: &[f64]) -> Vec<FeatureImportance> {
    let mut ranking: Vec<FeatureImportance> = names
        .iter()
        .zip(importances)
        .map(|(name, &importance)| FeatureImportance {
            feature: name.clone(),
            importance,
        })
        .collect();
    ranking.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::decision_tree::{DecisionTree, TreeNode};

    fn artifact(names: &[&str]) -> ModelArtifact {
        let tree = DecisionTree::new(TreeNode::leaf([0.5, 0.5], 1), names.len());
        ModelArtifact {
            format_version: ARTIFACT_FORMAT_VERSION,
            feature_names: names.iter().map(|s| s.to_string()).collect(),
            model: RandomForest::from_trees(vec![tree], names.len()),
            train_accuracy: 1.0,
            test_accuracy: 1.0,
            feature_importances: Vec::new(),
            n_training_points: 1,
            n_test_points: 0,
            seed: 42,
            trained_at: Utc::now(),
        }
    }

    #[test]
    fn test_rank_importances_descending() {
        let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let ranking = rank_importances(&names, &[0.2, 0.5, 0.3]);
        let order: Vec<&str> = ranking.iter().map(|r| r.feature.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_validate_accepts_known_features() {
        assert!(artifact(&["Price_Change_1D", "MA50_above_MA150"]).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_feature() {
        let err = artifact(&["Price_Change_1D", "rsi"]).validate().unwrap_err();
        assert!(err.to_string().contains("rsi"));
    }

    #[test]
    fn test_validate_rejects_split_outside_input() {
        let mut a = artifact(&["Price_Change_1D", "MA50_above_MA150"]);
        let root = TreeNode::split(
            5,
            0.5,
            TreeNode::leaf([1.0, 0.0], 3),
            TreeNode::leaf([0.0, 1.0], 3),
        );
        a.model = RandomForest::from_trees(vec![DecisionTree::new(root, 2)], 2);

        let err = a.validate().unwrap_err();
        assert_eq!(err.status(), "prediction_error");
        assert!(err.to_string().contains("column 5"));
    }

    #[test]
    fn test_validate_rejects_other_format_version() {
        let mut a = artifact(&["Price_Change_1D"]);
        a.format_version = 99;
        assert_eq!(a.validate().unwrap_err().status(), "prediction_error");
    }
}
