use crate::application::ml::dataset::TrainingSet;
use crate::config::DEFAULT_SEED;
use crate::config::pipeline_constants::TEST_FRACTION;
use crate::domain::errors::PipelineError;
use crate::domain::ml::artifact::{ARTIFACT_FORMAT_VERSION, ModelArtifact, rank_importances};
use crate::domain::ml::classifier::{Classifier, accuracy};
use crate::domain::ml::random_forest::{ForestConfig, RandomForest};
use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

/// Sample indices of a stratified hold-out split, each side in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Fits the class-balanced random forest and packages it as a [`ModelArtifact`].
#[derive(Debug, Clone)]
pub struct ModelTrainer {
    forest: ForestConfig,
    test_fraction: f64,
}

impl Default for ModelTrainer {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl ModelTrainer {
    pub fn new(seed: u64) -> Self {
        Self {
            forest: ForestConfig {
                seed,
                ..Default::default()
            },
            test_fraction: TEST_FRACTION,
        }
    }

    pub fn with_forest_config(forest: ForestConfig) -> Self {
        Self {
            forest,
            test_fraction: TEST_FRACTION,
        }
    }

    /// Stratified split: each class sends `round(n_c * test_fraction)` of its
    /// samples, chosen by a seeded shuffle, to the test side.
    pub fn split(&self, labels: &[u8]) -> TrainTestSplit {
        let mut rng = StdRng::seed_from_u64(self.forest.seed);
        let mut train = Vec::with_capacity(labels.len());
        let mut test = Vec::new();

        for class in [0u8, 1u8] {
            let mut members: Vec<usize> = labels
                .iter()
                .enumerate()
                .filter(|&(_, &label)| label == class)
                .map(|(i, _)| i)
                .collect();
            members.shuffle(&mut rng);

            let n_test = (members.len() as f64 * self.test_fraction).round() as usize;
            test.extend_from_slice(&members[..n_test]);
            train.extend_from_slice(&members[n_test..]);
        }

        train.sort_unstable();
        test.sort_unstable();
        TrainTestSplit { train, test }
    }

    pub fn train(&self, set: &TrainingSet) -> Result<ModelArtifact, PipelineError> {
        if set.is_empty() {
            return Err(PipelineError::Training {
                reason: "training set is empty".to_string(),
            });
        }

        let labels = set.labels();
        let split = self.split(&labels);
        if split.train.is_empty() || split.test.is_empty() {
            return Err(PipelineError::Training {
                reason: format!(
                    "cannot hold out a test set from {} samples ({} train / {} test)",
                    set.len(),
                    split.train.len(),
                    split.test.len()
                ),
            });
        }

        let gather = |indices: &[usize]| -> (Vec<Vec<f64>>, Vec<u8>) {
            indices
                .iter()
                .map(|&i| (set.samples[i].features.clone(), set.samples[i].label))
                .unzip()
        };
        let (x_train, y_train) = gather(&split.train);
        let (x_test, y_test) = gather(&split.test);

        debug!(
            train = x_train.len(),
            test = x_test.len(),
            trees = self.forest.n_trees,
            "fitting random forest"
        );
        let model = RandomForest::fit(&x_train, &y_train, self.forest.clone())?;
        let [w0, w1] = model.class_weights();
        debug!(
            "{} fitted with {} trees, class weights {:.3}/{:.3}",
            model.name(),
            model.n_trees(),
            w0,
            w1
        );

        let train_accuracy = accuracy(&model, &x_train, &y_train)?;
        let test_accuracy = accuracy(&model, &x_test, &y_test)?;
        let feature_importances = rank_importances(&set.feature_names, model.feature_importances());

        info!(
            "Model trained: train accuracy {:.4}, test accuracy {:.4} ({} train / {} test)",
            train_accuracy,
            test_accuracy,
            x_train.len(),
            x_test.len()
        );
        if let Some(top) = feature_importances.first() {
            info!("Top feature: {} ({:.4})", top.feature, top.importance);
        }

        Ok(ModelArtifact {
            format_version: ARTIFACT_FORMAT_VERSION,
            feature_names: set.feature_names.clone(),
            model,
            train_accuracy,
            test_accuracy,
            feature_importances,
            n_training_points: x_train.len(),
            n_test_points: x_test.len(),
            seed: self.forest.seed,
            trained_at: Utc::now(),
        })
    }
}
