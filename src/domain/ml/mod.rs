pub mod artifact;
pub mod classifier;
pub mod decision_tree;
pub mod feature_registry;
pub mod feature_row;
pub mod random_forest;
pub mod recommendation;
