//! Fixed window lengths and thresholds of the feature and labeling rules.
//!
//! These reproduce the reference behaviour and are not tuning knobs.

/// Close moving-average windows, in sessions.
pub const MA_WINDOWS: [usize; 5] = [10, 20, 50, 150, 200];
pub const VOLUME_MA_WINDOW: usize = 20;

/// Volume_20MA_uptrend: at least 7 rises among the last 10 changes.
pub const VOLUME_TREND_CHANGES: usize = 10;
pub const VOLUME_TREND_MIN_RISES: usize = 7;

/// MA200 uptrend horizons as (changes inspected, rises required).
pub const MA200_TREND_MONTH: (usize, usize) = (22, 20);
pub const MA200_TREND_6MONTHS: (usize, usize) = (132, 119);
pub const MA200_TREND_YEAR: (usize, usize) = (252, 227);

/// 52-week extremes window.
pub const YEAR_WINDOW: usize = 252;
pub const ABOVE_52WEEK_LOW_MIN: f64 = 0.30;
pub const WITHIN_52WEEK_HIGH_MAX: f64 = 0.25;

pub const WEEK_WINDOW: usize = 5;
pub const MONTH_WINDOW: usize = 22;

/// Lags of Price_Change_1D/1W/1M/3M.
pub const PRICE_CHANGE_LAGS: [usize; 4] = [1, 5, 22, 66];

/// Forward horizon and return threshold of the label.
pub const LABEL_HORIZON: usize = 22;
pub const LABEL_RETURN_THRESHOLD: f64 = 0.01;

/// Hold-out share of the stratified split.
pub const TEST_FRACTION: f64 = 0.2;
