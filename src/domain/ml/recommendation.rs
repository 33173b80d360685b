use crate::domain::errors::PipelineError;
use crate::domain::market::ohlcv::session_date;
use crate::domain::ml::artifact::FeatureImportance;
use crate::domain::ml::feature_row::FeatureRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
}

impl Signal {
    pub fn from_class(class: u8) -> Self {
        if class == 1 { Signal::Buy } else { Signal::Sell }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureValue {
    pub feature: String,
    pub value: f64,
}

/// Model output for the most recent complete row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(with = "session_date")]
    pub date: NaiveDate,
    pub recommendation: Signal,
    /// Larger of the buy and sell percentages.
    pub confidence: f64,
    pub buy_probability: f64,
    pub sell_probability: f64,
    pub current_price: f64,
    /// Inputs in the order the model consumed them.
    pub features_used: Vec<FeatureValue>,
}

/// Summary appended after a training-only run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub n_training_points: usize,
    pub n_test_points: usize,
    pub feature_importances: Vec<FeatureImportance>,
}

/// Why a trailing prediction could not be produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub status: String,
    pub message: String,
}

impl From<&PipelineError> for Diagnostic {
    fn from(error: &PipelineError) -> Self {
        Self {
            status: error.status().to_string(),
            message: error.to_string(),
        }
    }
}

/// One element of the published output sequence.
///
/// Rows come first in date order; at most one trailing entry of another kind follows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisEntry {
    Prediction { prediction: Recommendation },
    Training { training: TrainingSummary },
    Diagnostic(Diagnostic),
    Row(Box<FeatureRow>),
}

impl AnalysisEntry {
    pub fn row(&self) -> Option<&FeatureRow> {
        match self {
            AnalysisEntry::Row(row) => Some(row),
            _ => None,
        }
    }
}
