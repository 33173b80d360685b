use crate::domain::ml::feature_row::FeatureRow;

/// Ordered list of the model input features.
/// The order is recorded in every trained artifact; inference reads features in the
/// artifact's order, so any change here only affects newly trained models.
pub const FEATURE_NAMES: &[&str] = &[
    "MA50_above_MA150",
    "MA150_above_MA200",
    "Price_above_MA50",
    "Volume_20MA_uptrend",
    "MA200_uptrend_past_month",
    "MA200_uptrend_past_6months",
    "MA200_uptrend_past_year",
    "Price_above_52week_low_30pct",
    "Price_within_25pct_of_52week_high",
    "Week_Price_Range",
    "Month_Price_Range",
    "Price_Change_1D",
    "Price_Change_1W",
    "Price_Change_1M",
    "Price_Change_3M",
    "Price_more_rise_than_fall_month",
];

/// Every field the feature engine computes, model inputs included.
pub const KNOWN_FEATURES: &[&str] = &[
    "MA10",
    "MA20",
    "MA50",
    "MA150",
    "MA200",
    "Volume_20MA",
    "MA50_above_MA150",
    "MA150_above_MA200",
    "Price_above_MA50",
    "Volume_20MA_uptrend",
    "MA200_uptrend_past_month",
    "MA200_uptrend_past_6months",
    "MA200_uptrend_past_year",
    "Price_above_52week_low_30pct",
    "Price_within_25pct_of_52week_high",
    "Price_more_rise_than_fall_month",
    "Week_Price_Range",
    "Month_Price_Range",
    "Price_Change_1D",
    "Price_Change_1W",
    "Price_Change_1M",
    "Price_Change_3M",
];

pub fn default_feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}

/// Names in `names` that the feature engine does not compute.
pub fn unknown_features(names: &[String]) -> Vec<String> {
    names
        .iter()
        .filter(|n| !KNOWN_FEATURES.contains(&n.as_str()))
        .cloned()
        .collect()
}

/// Builds the input vector for `row` in exactly the order of `names`.
/// Returns `None` as soon as one of the named features is absent.
pub fn features_to_vector(row: &FeatureRow, names: &[String]) -> Option<Vec<f64>> {
    names.iter().map(|name| row.feature(name)).collect()
}
