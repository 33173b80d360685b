// Trailing-window helpers for the feature engine
pub mod rolling;
