use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily session for a single instrument.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OhlcvRecord {
    #[serde(rename = "Date", with = "session_date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: u64,
}

impl OhlcvRecord {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Returns the index of the first record that breaks strictly ascending date order.
pub fn first_out_of_order(records: &[OhlcvRecord]) -> Option<usize> {
    records
        .windows(2)
        .position(|w| w[1].date <= w[0].date)
        .map(|i| i + 1)
}

/// Session dates are emitted as `YYYY-MM-DD 00:00:00` and accepted with or
/// without the time part.
pub mod session_date {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
    const DATE_FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date.and_hms_opt(0, 0, 0).unwrap_or_default();
        serializer.serialize_str(&formatted.format(DATE_TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(raw.trim()).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveDate, String> {
        NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT)
            .map(|dt| dt.date())
            .or_else(|_| NaiveDate::parse_from_str(raw, DATE_FORMAT))
            .map_err(|e| format!("invalid session date '{}': {}", raw, e))
    }
}
