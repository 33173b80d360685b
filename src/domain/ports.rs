use crate::domain::market::ohlcv::OhlcvRecord;
use crate::domain::ml::artifact::ModelArtifact;
use crate::domain::ml::feature_row::FeatureRow;
use anyhow::Result;

/// Supplier of the daily price history for one instrument.
pub trait OhlcvSource {
    /// Sessions in ascending date order without duplicates.
    fn daily_history(&self) -> Result<Vec<OhlcvRecord>>;
}

/// Storage for the single current model artifact.
///
/// `save` replaces the previous artifact wholesale; a concurrent `load` sees either
/// the old or the new artifact, never a partial write.
pub trait ArtifactStore {
    fn load(&self) -> Result<Option<ModelArtifact>>;
    fn save(&self, artifact: &ModelArtifact) -> Result<()>;
    /// Human-readable location used in diagnostics.
    fn location(&self) -> String;
}

/// Stateful per-session feature computation.
pub trait FeatureEngineeringService {
    /// Consumes the next session (ascending date order) and returns its row.
    fn update(&mut self, record: &OhlcvRecord) -> FeatureRow;
}
