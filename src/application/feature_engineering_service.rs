use crate::application::market_data::rolling::{
    RiseFallCounter, RollingMean, Windowed, rolling_max, rolling_mean, rolling_min, round_to,
};
use crate::config::pipeline_constants::{
    ABOVE_52WEEK_LOW_MIN, MA_WINDOWS, MA200_TREND_6MONTHS, MA200_TREND_MONTH, MA200_TREND_YEAR,
    MONTH_WINDOW, PRICE_CHANGE_LAGS, VOLUME_MA_WINDOW, VOLUME_TREND_CHANGES,
    VOLUME_TREND_MIN_RISES, WEEK_WINDOW, WITHIN_52WEEK_HIGH_MAX, YEAR_WINDOW,
};
use crate::domain::errors::PipelineError;
use crate::domain::market::ohlcv::{OhlcvRecord, first_out_of_order};
use crate::domain::ml::feature_row::FeatureRow;
use crate::domain::ports::FeatureEngineeringService;
use std::collections::VecDeque;
use ta::indicators::{Maximum, Minimum};
use tracing::{debug, info};

/// Rolling price-range feature: highest High minus lowest Low over a window.
struct PriceRange {
    high: Windowed<Maximum>,
    low: Windowed<Minimum>,
}

impl PriceRange {
    fn new(period: usize) -> Result<Self, PipelineError> {
        Ok(Self {
            high: rolling_max(period)?,
            low: rolling_min(period)?,
        })
    }

    fn next(&mut self, high: f64, low: f64) -> Option<f64> {
        let high = self.high.next(high);
        let low = self.low.next(low);
        Some(high? - low?)
    }
}

/// Uptrend flag over the last `changes` moves of a series.
struct TrendFlag {
    counter: RiseFallCounter,
    min_rises: usize,
}

impl TrendFlag {
    fn new((changes, min_rises): (usize, usize)) -> Self {
        Self {
            counter: RiseFallCounter::new(changes),
            min_rises,
        }
    }

    fn next(&mut self, value: Option<f64>) -> Option<u8> {
        self.counter
            .next(value)
            .map(|(rises, _)| flag(rises >= self.min_rises))
    }
}

/// Incremental daily feature computation.
///
/// Each `update` consumes one session and only looks at that session and the ones
/// before it.
pub struct TechnicalFeatureEngineeringService {
    ma_10: RollingMean,
    ma_20: RollingMean,
    ma_50: RollingMean,
    ma_150: RollingMean,
    ma_200: RollingMean,
    volume_ma: RollingMean,
    year_high: Windowed<Maximum>,
    year_low: Windowed<Minimum>,
    week_range: PriceRange,
    month_range: PriceRange,
    volume_trend: TrendFlag,
    ma200_trend_month: TrendFlag,
    ma200_trend_6months: TrendFlag,
    ma200_trend_year: TrendFlag,
    close_moves: RiseFallCounter,
    close_history: VecDeque<f64>,
    history_len: usize,
}

impl TechnicalFeatureEngineeringService {
    pub fn new() -> Result<Self, PipelineError> {
        let [w10, w20, w50, w150, w200] = MA_WINDOWS;
        let max_lag = PRICE_CHANGE_LAGS.iter().copied().max().unwrap_or(0);

        Ok(Self {
            ma_10: rolling_mean(w10)?,
            ma_20: rolling_mean(w20)?,
            ma_50: rolling_mean(w50)?,
            ma_150: rolling_mean(w150)?,
            ma_200: rolling_mean(w200)?,
            volume_ma: rolling_mean(VOLUME_MA_WINDOW)?,
            year_high: rolling_max(YEAR_WINDOW)?,
            year_low: rolling_min(YEAR_WINDOW)?,
            week_range: PriceRange::new(WEEK_WINDOW)?,
            month_range: PriceRange::new(MONTH_WINDOW)?,
            volume_trend: TrendFlag::new((VOLUME_TREND_CHANGES, VOLUME_TREND_MIN_RISES)),
            ma200_trend_month: TrendFlag::new(MA200_TREND_MONTH),
            ma200_trend_6months: TrendFlag::new(MA200_TREND_6MONTHS),
            ma200_trend_year: TrendFlag::new(MA200_TREND_YEAR),
            close_moves: RiseFallCounter::new(MONTH_WINDOW),
            close_history: VecDeque::with_capacity(max_lag + 1),
            history_len: max_lag + 1,
        })
    }

    /// Percent change of `close` against the close `lag` sessions back.
    fn price_change(&self, close: f64, lag: usize) -> Option<f64> {
        // close_history already ends with the current close
        let len = self.close_history.len();
        if len <= lag {
            return None;
        }
        let earlier = self.close_history[len - 1 - lag];
        Some((close - earlier) / earlier * 100.0)
    }
}

impl FeatureEngineeringService for TechnicalFeatureEngineeringService {
    fn update(&mut self, record: &OhlcvRecord) -> FeatureRow {
        let close = record.close;

        let ma_10 = self.ma_10.next(close);
        let ma_20 = self.ma_20.next(close);
        let ma_50 = self.ma_50.next(close);
        let ma_150 = self.ma_150.next(close);
        let ma_200 = self.ma_200.next(close);
        let volume_ma = self.volume_ma.next(record.volume as f64);

        let year_high = self.year_high.next(close);
        let year_low = self.year_low.next(close);
        let week_range = self.week_range.next(record.high, record.low);
        let month_range = self.month_range.next(record.high, record.low);

        // Trend flags look at the unrounded averages
        let volume_trend = self.volume_trend.next(volume_ma);
        let ma200_month = self.ma200_trend_month.next(ma_200);
        let ma200_6months = self.ma200_trend_6months.next(ma_200);
        let ma200_year = self.ma200_trend_year.next(ma_200);
        let more_rise_than_fall = self
            .close_moves
            .next(Some(close))
            .map(|(rises, falls)| flag(rises > falls));

        self.close_history.push_back(close);
        if self.close_history.len() > self.history_len {
            self.close_history.pop_front();
        }
        let [lag_1d, lag_1w, lag_1m, lag_3m] = PRICE_CHANGE_LAGS;

        // MA relations compare the emitted averages so a row never contradicts itself
        let ma_50_out = ma_50.map(round2);
        let ma_150_out = ma_150.map(round2);
        let ma_200_out = ma_200.map(round2);

        let above_52week_low =
            year_low.map(|low| flag((close - low) / low >= ABOVE_52WEEK_LOW_MIN));
        let within_52week_high =
            year_high.map(|high| flag((high - close) / high <= WITHIN_52WEEK_HIGH_MAX));

        FeatureRow {
            record: record.clone(),
            ma_10: ma_10.map(round2),
            ma_20: ma_20.map(round2),
            ma_50: ma_50_out,
            ma_150: ma_150_out,
            ma_200: ma_200_out,
            volume_ma_20: volume_ma.map(|v| round_to(v, 0)),
            ma50_above_ma150: greater(ma_50_out, ma_150_out),
            ma150_above_ma200: greater(ma_150_out, ma_200_out),
            price_above_ma50: greater(Some(close), ma_50_out),
            volume_ma20_uptrend: volume_trend,
            ma200_uptrend_month: ma200_month,
            ma200_uptrend_6months: ma200_6months,
            ma200_uptrend_year: ma200_year,
            above_52week_low_30pct: above_52week_low,
            within_25pct_of_52week_high: within_52week_high,
            more_rise_than_fall_month: more_rise_than_fall,
            week_price_range: week_range.map(round2),
            month_price_range: month_range.map(round2),
            price_change_1d: self.price_change(close, lag_1d).map(round2),
            price_change_1w: self.price_change(close, lag_1w).map(round2),
            price_change_1m: self.price_change(close, lag_1m).map(round2),
            price_change_3m: self.price_change(close, lag_3m).map(round2),
            label: None,
        }
    }
}

/// Batch entry point: one row per input session, in input order.
pub struct FeatureEngine;

impl FeatureEngine {
    pub fn compute(records: &[OhlcvRecord]) -> Result<Vec<FeatureRow>, PipelineError> {
        if records.is_empty() {
            return Err(PipelineError::DataUnavailable {
                reason: "price history is empty".to_string(),
            });
        }
        if let Some(index) = first_out_of_order(records) {
            return Err(PipelineError::InvalidSeries {
                reason: format!(
                    "session {} ({}) is not after the previous session",
                    index, records[index].date
                ),
            });
        }
        if let Some(bad) = records
            .iter()
            .find(|r| !(r.close.is_finite() && r.close > 0.0))
        {
            return Err(PipelineError::InvalidSeries {
                reason: format!("non-positive close {} on {}", bad.close, bad.date),
            });
        }

        let mut service = TechnicalFeatureEngineeringService::new()?;
        let rows: Vec<FeatureRow> = records.iter().map(|r| service.update(r)).collect();

        let first_complete = rows.iter().position(|r| r.ma200_uptrend_year.is_some());
        debug!(?first_complete, "first row with the full year of MA200 history");
        info!(
            "Computed {} feature rows ({} to {})",
            rows.len(),
            records[0].date,
            records[records.len() - 1].date
        );
        Ok(rows)
    }
}

fn flag(value: bool) -> u8 {
    u8::from(value)
}

fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

fn greater(a: Option<f64>, b: Option<f64>) -> Option<u8> {
    Some(flag(a? > b?))
}
