//! Random forest of weighted CART trees with class-balanced sample weights.

use super::decision_tree::{DecisionTree, TreeConfig};
use crate::domain::errors::PipelineError;
use crate::domain::ml::classifier::Classifier;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Random forest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split (sqrt of total if None)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Weight classes inversely to their frequency
    pub class_balanced: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 20,
            min_samples_leaf: 10,
            max_features: None,
            bootstrap: true,
            class_balanced: true,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    n_features: usize,
    class_weights: [f64; 2],
    trees: Vec<DecisionTree>,
    feature_importances: Vec<f64>,
}

impl RandomForest {
    /// Fits the forest on `x` (one row per sample) and binary labels `y`.
    ///
    /// Tree `i` draws its bootstrap sample and split candidates from `seed + i`,
    /// so two fits on the same data produce the same forest.
    pub fn fit(x: &[Vec<f64>], y: &[u8], config: ForestConfig) -> Result<Self, PipelineError> {
        let n_features = validate_training_data(x, y)?;
        if config.n_trees == 0 {
            return Err(training_error("forest needs at least one tree"));
        }

        let class_weights = if config.class_balanced {
            balanced_class_weights(y)
        } else {
            [1.0, 1.0]
        };
        let max_features = config
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().ceil() as usize)
            .clamp(1, n_features);
        let tree_config = TreeConfig {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
            max_features,
        };

        let n = x.len();
        let mut importances = vec![0.0; n_features];
        let mut trees = Vec::with_capacity(config.n_trees);

        for i in 0..config.n_trees {
            let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(i as u64));
            let indices: Vec<usize> = if config.bootstrap {
                (0..n).map(|_| rng.random_range(0..n)).collect()
            } else {
                (0..n).collect()
            };

            let mut tree_importances = vec![0.0; n_features];
            let tree = DecisionTree::fit(
                x,
                y,
                indices,
                class_weights,
                &tree_config,
                &mut rng,
                &mut tree_importances,
            );

            // Each tree contributes a normalized importance vector
            let total: f64 = tree_importances.iter().sum();
            if total > 0.0 {
                for (acc, imp) in importances.iter_mut().zip(&tree_importances) {
                    *acc += imp / total;
                }
            }
            trees.push(tree);
        }

        let sum: f64 = importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut importances {
                *imp /= sum;
            }
        }

        Ok(Self {
            config,
            n_features,
            class_weights,
            trees,
            feature_importances: importances,
        })
    }

    /// Assembles a forest from already grown trees.
    pub fn from_trees(trees: Vec<DecisionTree>, n_features: usize) -> Self {
        Self {
            config: ForestConfig {
                n_trees: trees.len(),
                ..Default::default()
            },
            n_features,
            class_weights: [1.0, 1.0],
            trees,
            feature_importances: vec![0.0; n_features],
        }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn class_weights(&self) -> [f64; 2] {
        self.class_weights
    }

    /// Highest feature index read by any split in the forest.
    pub fn max_split_feature(&self) -> Option<usize> {
        self.trees.iter().filter_map(|t| t.root().max_feature()).max()
    }

    /// Normalized impurity-decrease importances, indexed like the training columns.
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}

impl Classifier for RandomForest {
    /// Mean of the leaf distributions reached in every tree.
    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], PipelineError> {
        if self.trees.is_empty() {
            return Err(PipelineError::Prediction {
                reason: "forest has no trees".to_string(),
            });
        }

        let mut sum = [0.0; 2];
        for tree in &self.trees {
            let proba = tree.predict_proba(features)?;
            sum[0] += proba[0];
            sum[1] += proba[1];
        }
        let n = self.trees.len() as f64;
        Ok([sum[0] / n, sum[1] / n])
    }

    fn name(&self) -> &str {
        "Random Forest Classifier"
    }
}

/// `n / (2 * n_c)` per class; a class missing from `y` keeps weight 0.
pub fn balanced_class_weights(y: &[u8]) -> [f64; 2] {
    let n = y.len() as f64;
    let positives = y.iter().filter(|&&label| label == 1).count() as f64;
    let negatives = n - positives;
    let weight = |count: f64| if count > 0.0 { n / (2.0 * count) } else { 0.0 };
    [weight(negatives), weight(positives)]
}

fn validate_training_data(x: &[Vec<f64>], y: &[u8]) -> Result<usize, PipelineError> {
    if x.is_empty() {
        return Err(training_error("no training samples"));
    }
    if x.len() != y.len() {
        return Err(training_error(&format!(
            "{} samples but {} labels",
            x.len(),
            y.len()
        )));
    }
    let n_features = x[0].len();
    if n_features == 0 {
        return Err(training_error("samples have no features"));
    }
    if let Some(row) = x.iter().position(|r| r.len() != n_features) {
        return Err(training_error(&format!(
            "sample {} has {} features, expected {}",
            row,
            x[row].len(),
            n_features
        )));
    }
    if x.iter().flatten().any(|v| !v.is_finite()) {
        return Err(training_error("non-finite feature value"));
    }
    if let Some(label) = y.iter().find(|&&label| label > 1) {
        return Err(training_error(&format!("label {} is not binary", label)));
    }
    Ok(n_features)
}

fn training_error(reason: &str) -> PipelineError {
    PipelineError::Training {
        reason: reason.to_string(),
    }
}
