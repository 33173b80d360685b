use thiserror::Error;

/// Errors raised by the feature, training and inference pipeline.
///
/// Every variant maps to a stable status tag (see [`PipelineError::status`]) so the
/// workflow boundary can turn it into a structured diagnostic instead of a fault.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("No price data available: {reason}")]
    DataUnavailable { reason: String },

    #[error("Invalid price series: {reason}")]
    InvalidSeries { reason: String },

    #[error("Insufficient training data: {available} qualifying rows, need {required}")]
    InsufficientData { available: usize, required: usize },

    #[error("Model training failed: {reason}")]
    Training { reason: String },

    #[error("No trained model found at {location}")]
    ModelNotFound { location: String },

    #[error("No row has all {required} model features present")]
    NoCompleteData { required: usize },

    #[error("Prediction failed: {reason}")]
    Prediction { reason: String },
}

impl PipelineError {
    /// Machine-readable tag surfaced in diagnostic entries.
    pub fn status(&self) -> &'static str {
        match self {
            PipelineError::DataUnavailable { .. } => "data_unavailable",
            PipelineError::InvalidSeries { .. } => "invalid_series",
            PipelineError::InsufficientData { .. } => "insufficient_data",
            PipelineError::Training { .. } => "training_error",
            PipelineError::ModelNotFound { .. } => "model_not_found",
            PipelineError::NoCompleteData { .. } => "no_complete_data",
            PipelineError::Prediction { .. } => "prediction_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_formatting() {
        let error = PipelineError::InsufficientData {
            available: 12,
            required: 50,
        };

        let msg = error.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("50"));
        assert_eq!(error.status(), "insufficient_data");
    }

    #[test]
    fn test_status_tags_are_distinct() {
        let errors = [
            PipelineError::DataUnavailable { reason: "x".into() },
            PipelineError::InvalidSeries { reason: "x".into() },
            PipelineError::InsufficientData {
                available: 0,
                required: 50,
            },
            PipelineError::Training { reason: "x".into() },
            PipelineError::ModelNotFound {
                location: "x".into(),
            },
            PipelineError::NoCompleteData { required: 16 },
            PipelineError::Prediction { reason: "x".into() },
        ];

        let mut tags: Vec<&str> = errors.iter().map(|e| e.status()).collect();
        tags.sort();
        tags.dedup();
        assert_eq!(tags.len(), errors.len());
    }
}
