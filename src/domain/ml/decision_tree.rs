//! Weighted CART classification tree (Gini impurity) for binary labels.

use crate::domain::errors::PipelineError;
use crate::domain::ml::classifier::Classifier;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

const IMPURITY_EPSILON: f64 = 1e-12;

/// Growth limits for a single tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    pub max_depth: usize,
    /// Nodes with fewer samples become leaves.
    pub min_samples_split: usize,
    /// Each child of a split keeps at least this many samples.
    pub min_samples_leaf: usize,
    /// Non-constant features inspected per split, drawn at random.
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        probabilities: [f64; 2],
        n_samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    pub fn leaf(probabilities: [f64; 2], n_samples: usize) -> Self {
        TreeNode::Leaf {
            probabilities,
            n_samples,
        }
    }

    pub fn split(feature: usize, threshold: f64, left: TreeNode, right: TreeNode) -> Self {
        TreeNode::Split {
            feature,
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Highest feature index any split below this node reads.
    pub fn max_feature(&self) -> Option<usize> {
        match self {
            TreeNode::Leaf { .. } => None,
            TreeNode::Split {
                feature,
                left,
                right,
                ..
            } => [Some(*feature), left.max_feature(), right.max_feature()]
                .into_iter()
                .flatten()
                .max(),
        }
    }

    fn probabilities(&self, features: &[f64]) -> [f64; 2] {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { probabilities, .. } => return *probabilities,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    root: TreeNode,
    n_features: usize,
}

impl DecisionTree {
    pub fn new(root: TreeNode, n_features: usize) -> Self {
        Self { root, n_features }
    }

    /// Grows a tree over `indices` (duplicates allowed, as produced by bootstrapping).
    ///
    /// Every sample counts with the weight of its class. Impurity decreases are
    /// accumulated per feature into `importances`.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[u8],
        indices: Vec<usize>,
        class_weights: [f64; 2],
        config: &TreeConfig,
        rng: &mut StdRng,
        importances: &mut [f64],
    ) -> Self {
        let n_features = x.first().map(|r| r.len()).unwrap_or(0);
        let mut builder = TreeBuilder {
            x,
            y,
            class_weights,
            config,
            n_features,
            importances,
        };
        let root = builder.grow(indices, 0, rng);
        Self { root, n_features }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

impl Classifier for DecisionTree {
    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], PipelineError> {
        if features.len() != self.n_features {
            return Err(PipelineError::Prediction {
                reason: format!(
                    "expected {} features, got {}",
                    self.n_features,
                    features.len()
                ),
            });
        }
        Ok(self.root.probabilities(features))
    }

    fn name(&self) -> &str {
        "Decision Tree"
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

struct TreeBuilder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [u8],
    class_weights: [f64; 2],
    config: &'a TreeConfig,
    n_features: usize,
    importances: &'a mut [f64],
}

impl TreeBuilder<'_> {
    fn grow(&mut self, indices: Vec<usize>, depth: usize, rng: &mut StdRng) -> TreeNode {
        let totals = self.class_totals(&indices);
        let impurity = gini(totals);

        if depth >= self.config.max_depth
            || indices.len() < self.config.min_samples_split
            || impurity <= IMPURITY_EPSILON
        {
            return self.make_leaf(totals, indices.len());
        }

        let Some(best) = self.best_split(&indices, totals, impurity, rng) else {
            return self.make_leaf(totals, indices.len());
        };

        self.importances[best.feature] += best.gain;

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.x[i][best.feature] <= best.threshold);

        let left = self.grow(left, depth + 1, rng);
        let right = self.grow(right, depth + 1, rng);
        TreeNode::split(best.feature, best.threshold, left, right)
    }

    fn make_leaf(&self, totals: [f64; 2], n_samples: usize) -> TreeNode {
        let weight = totals[0] + totals[1];
        let probabilities = if weight > 0.0 {
            [totals[0] / weight, totals[1] / weight]
        } else {
            [0.5, 0.5]
        };
        TreeNode::leaf(probabilities, n_samples)
    }

    fn class_totals(&self, indices: &[usize]) -> [f64; 2] {
        let mut totals = [0.0; 2];
        for &i in indices {
            let class = usize::from(self.y[i]);
            totals[class] += self.class_weights[class];
        }
        totals
    }

    fn best_split(
        &self,
        indices: &[usize],
        totals: [f64; 2],
        impurity: f64,
        rng: &mut StdRng,
    ) -> Option<BestSplit> {
        let mut candidates: Vec<usize> = (0..self.n_features).collect();
        candidates.shuffle(rng);
        let max_features = self.config.max_features.max(1);

        let n = indices.len();
        let parent_score = (totals[0] + totals[1]) * impurity;
        let mut best: Option<BestSplit> = None;
        let mut visited = 0usize;

        // Features constant within the node do not count towards `max_features`, and
        // the search goes on past the budget until some valid split is found.
        for feature in candidates {
            if visited >= max_features && best.is_some() {
                break;
            }

            let mut sorted = indices.to_vec();
            sorted.sort_by(|&a, &b| self.x[a][feature].total_cmp(&self.x[b][feature]));

            let mut varied = false;
            let mut left = [0.0; 2];
            for pos in 0..n.saturating_sub(1) {
                let i = sorted[pos];
                let class = usize::from(self.y[i]);
                left[class] += self.class_weights[class];

                let value = self.x[i][feature];
                let next_value = self.x[sorted[pos + 1]][feature];
                if value == next_value {
                    continue;
                }
                varied = true;

                let n_left = pos + 1;
                if n_left < self.config.min_samples_leaf
                    || n - n_left < self.config.min_samples_leaf
                {
                    continue;
                }

                let right = [totals[0] - left[0], totals[1] - left[1]];
                let child_score =
                    (left[0] + left[1]) * gini(left) + (right[0] + right[1]) * gini(right);
                let gain = parent_score - child_score;

                if gain > IMPURITY_EPSILON && best.as_ref().is_none_or(|b| gain > b.gain) {
                    best = Some(BestSplit {
                        feature,
                        threshold: (value + next_value) / 2.0,
                        gain,
                    });
                }
            }

            if varied {
                visited += 1;
            }
        }

        best
    }
}

fn gini(totals: [f64; 2]) -> f64 {
    let weight = totals[0] + totals[1];
    if weight <= 0.0 {
        return 0.0;
    }
    let p0 = totals[0] / weight;
    let p1 = totals[1] / weight;
    1.0 - p0 * p0 - p1 * p1
}
