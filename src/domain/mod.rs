// Market data domain
pub mod market;

// Model domain: features, classifier, artifact, recommendation
pub mod ml;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;
