// Market data processing
pub mod feature_engineering_service;
pub mod market_data;

// Labeling, dataset building, training and inference
pub mod ml;

// Stage orchestration
pub mod workflow;
