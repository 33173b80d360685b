pub mod artifact_persistence;
pub mod csv_source;
pub mod mock;

pub use artifact_persistence::JsonFileArtifactStore;
pub use csv_source::CsvOhlcvSource;
