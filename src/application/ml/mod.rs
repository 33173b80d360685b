pub mod dataset;
pub mod labeler;
pub mod predictor;
pub mod trainer;
