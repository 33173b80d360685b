#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stockcast::domain::market::ohlcv::OhlcvRecord;

pub fn day(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 1, 1)
        .and_then(|d| d.checked_add_days(Days::new(i as u64)))
        .expect("valid test date")
}

/// Every session at the same price and volume.
pub fn flat_series(n: usize, price: f64) -> Vec<OhlcvRecord> {
    (0..n)
        .map(|i| OhlcvRecord::new(day(i), price, price, price, price, 1_000))
        .collect()
}

/// Close `100 + i`, High/Low one unit around it.
pub fn rising_series(n: usize) -> Vec<OhlcvRecord> {
    (0..n)
        .map(|i| {
            let close = 100.0 + i as f64;
            OhlcvRecord::new(day(i), close - 0.5, close + 1.0, close - 1.0, close, 1_000 + i as u64)
        })
        .collect()
}

/// Seeded random walk with a slight upward drift.
pub fn noisy_series(n: usize, seed: u64) -> Vec<OhlcvRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut close: f64 = 50.0;
    (0..n)
        .map(|i| {
            let open = close;
            close *= 1.0 + rng.random_range(-0.025..0.028);
            let high = open.max(close) * (1.0 + rng.random_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.random_range(0.0..0.01));
            let volume = rng.random_range(50_000..150_000);
            OhlcvRecord::new(day(i), open, high, low, close, volume)
        })
        .collect()
}

/// `noisy_series(noisy, seed)` followed by `flat` sessions closing at `price`.
pub fn settling_series(noisy: usize, seed: u64, flat: usize, price: f64) -> Vec<OhlcvRecord> {
    let mut records = noisy_series(noisy, seed);
    records.extend(
        (noisy..noisy + flat).map(|i| OhlcvRecord::new(day(i), price, price, price, price, 1_000)),
    );
    records
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();
}
