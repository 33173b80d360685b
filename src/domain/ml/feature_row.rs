use crate::domain::market::ohlcv::OhlcvRecord;
use serde::{Deserialize, Serialize};

/// One input session plus every derived field.
///
/// `None` means the field could not be computed yet (not enough history, or for
/// `label` not enough future). It is never folded into zero or false.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureRow {
    #[serde(flatten)]
    pub record: OhlcvRecord,

    #[serde(rename = "MA10")]
    pub ma_10: Option<f64>,
    #[serde(rename = "MA20")]
    pub ma_20: Option<f64>,
    #[serde(rename = "MA50")]
    pub ma_50: Option<f64>,
    #[serde(rename = "MA150")]
    pub ma_150: Option<f64>,
    #[serde(rename = "MA200")]
    pub ma_200: Option<f64>,
    #[serde(rename = "Volume_20MA")]
    pub volume_ma_20: Option<f64>,

    #[serde(rename = "MA50_above_MA150")]
    pub ma50_above_ma150: Option<u8>,
    #[serde(rename = "MA150_above_MA200")]
    pub ma150_above_ma200: Option<u8>,
    #[serde(rename = "Price_above_MA50")]
    pub price_above_ma50: Option<u8>,
    #[serde(rename = "Volume_20MA_uptrend")]
    pub volume_ma20_uptrend: Option<u8>,
    #[serde(rename = "MA200_uptrend_past_month")]
    pub ma200_uptrend_month: Option<u8>,
    #[serde(rename = "MA200_uptrend_past_6months")]
    pub ma200_uptrend_6months: Option<u8>,
    #[serde(rename = "MA200_uptrend_past_year")]
    pub ma200_uptrend_year: Option<u8>,
    #[serde(rename = "Price_above_52week_low_30pct")]
    pub above_52week_low_30pct: Option<u8>,
    #[serde(rename = "Price_within_25pct_of_52week_high")]
    pub within_25pct_of_52week_high: Option<u8>,
    #[serde(rename = "Price_more_rise_than_fall_month")]
    pub more_rise_than_fall_month: Option<u8>,

    #[serde(rename = "Week_Price_Range")]
    pub week_price_range: Option<f64>,
    #[serde(rename = "Month_Price_Range")]
    pub month_price_range: Option<f64>,

    #[serde(rename = "Price_Change_1D")]
    pub price_change_1d: Option<f64>,
    #[serde(rename = "Price_Change_1W")]
    pub price_change_1w: Option<f64>,
    #[serde(rename = "Price_Change_1M")]
    pub price_change_1m: Option<f64>,
    #[serde(rename = "Price_Change_3M")]
    pub price_change_3m: Option<f64>,

    #[serde(rename = "Label")]
    pub label: Option<u8>,
}

impl FeatureRow {
    /// A row with only the session data filled in.
    pub fn from_record(record: OhlcvRecord) -> Self {
        Self {
            record,
            ..Default::default()
        }
    }

    /// Looks a derived field up by its published name.
    ///
    /// Flags are returned as `0.0`/`1.0`. Unknown names and absent values are `None`.
    pub fn feature(&self, name: &str) -> Option<f64> {
        let flag = |v: Option<u8>| v.map(f64::from);
        match name {
            "MA10" => self.ma_10,
            "MA20" => self.ma_20,
            "MA50" => self.ma_50,
            "MA150" => self.ma_150,
            "MA200" => self.ma_200,
            "Volume_20MA" => self.volume_ma_20,
            "MA50_above_MA150" => flag(self.ma50_above_ma150),
            "MA150_above_MA200" => flag(self.ma150_above_ma200),
            "Price_above_MA50" => flag(self.price_above_ma50),
            "Volume_20MA_uptrend" => flag(self.volume_ma20_uptrend),
            "MA200_uptrend_past_month" => flag(self.ma200_uptrend_month),
            "MA200_uptrend_past_6months" => flag(self.ma200_uptrend_6months),
            "MA200_uptrend_past_year" => flag(self.ma200_uptrend_year),
            "Price_above_52week_low_30pct" => flag(self.above_52week_low_30pct),
            "Price_within_25pct_of_52week_high" => flag(self.within_25pct_of_52week_high),
            "Price_more_rise_than_fall_month" => flag(self.more_rise_than_fall_month),
            "Week_Price_Range" => self.week_price_range,
            "Month_Price_Range" => self.month_price_range,
            "Price_Change_1D" => self.price_change_1d,
            "Price_Change_1W" => self.price_change_1w,
            "Price_Change_1M" => self.price_change_1m,
            "Price_Change_3M" => self.price_change_3m,
            _ => None,
        }
    }
}
