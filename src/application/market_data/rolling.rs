//! Trailing-window building blocks for the feature engine.
//!
//! All windows count sessions, not calendar days, and yield `None` until they hold
//! a full window of observations.

use crate::domain::errors::PipelineError;
use std::collections::VecDeque;
use ta::Next;
use ta::indicators::{Maximum, Minimum};

/// Wraps a `ta` indicator so that it only reports once `period` inputs were seen.
pub struct Windowed<I> {
    indicator: I,
    period: usize,
    seen: usize,
}

impl<I> Windowed<I>
where
    I: Next<f64, Output = f64>,
{
    fn wrap(indicator: I, period: usize) -> Self {
        Self {
            indicator,
            period,
            seen: 0,
        }
    }

    pub fn next(&mut self, value: f64) -> Option<f64> {
        let output = self.indicator.next(value);
        self.seen = (self.seen + 1).min(self.period);
        (self.seen == self.period).then_some(output)
    }
}

/// Mean of the last `period` values, summed afresh from the retained window each
/// session so that a window of equal values always yields the same mean.
pub struct RollingMean {
    period: usize,
    window: VecDeque<f64>,
}

impl RollingMean {
    pub fn next(&mut self, value: f64) -> Option<f64> {
        self.window.push_back(value);
        if self.window.len() > self.period {
            self.window.pop_front();
        }
        (self.window.len() == self.period)
            .then(|| self.window.iter().sum::<f64>() / self.period as f64)
    }
}

pub fn rolling_mean(period: usize) -> Result<RollingMean, PipelineError> {
    if period == 0 {
        return Err(indicator_error("mean", period, "period must be positive"));
    }
    Ok(RollingMean {
        period,
        window: VecDeque::with_capacity(period + 1),
    })
}

pub fn rolling_max(period: usize) -> Result<Windowed<Maximum>, PipelineError> {
    Maximum::new(period)
        .map(|max| Windowed::wrap(max, period))
        .map_err(|e| indicator_error("max", period, e))
}

pub fn rolling_min(period: usize) -> Result<Windowed<Minimum>, PipelineError> {
    Minimum::new(period)
        .map(|min| Windowed::wrap(min, period))
        .map_err(|e| indicator_error("min", period, e))
}

fn indicator_error(kind: &str, period: usize, error: impl std::fmt::Debug) -> PipelineError {
    PipelineError::InvalidSeries {
        reason: format!("cannot build rolling {} over {} sessions: {:?}", kind, period, error),
    }
}

/// Counts strictly rising and strictly falling session-over-session changes over the
/// last `window` changes of a series.
pub struct RiseFallCounter {
    window: usize,
    changes: VecDeque<i8>,
    rises: usize,
    falls: usize,
    previous: Option<f64>,
}

impl RiseFallCounter {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            changes: VecDeque::with_capacity(window + 1),
            rises: 0,
            falls: 0,
            previous: None,
        }
    }

    /// Feeds the next value of the series and returns `(rises, falls)` once `window`
    /// changes are known. An absent value restarts the count.
    pub fn next(&mut self, value: Option<f64>) -> Option<(usize, usize)> {
        let Some(value) = value else {
            self.changes.clear();
            self.rises = 0;
            self.falls = 0;
            self.previous = None;
            return None;
        };

        if let Some(previous) = self.previous.replace(value) {
            let direction = if value > previous {
                1
            } else if value < previous {
                -1
            } else {
                0
            };
            self.push(direction);
        }

        (self.changes.len() == self.window).then_some((self.rises, self.falls))
    }

    fn push(&mut self, direction: i8) {
        match direction {
            1 => self.rises += 1,
            -1 => self.falls += 1,
            _ => {}
        }
        self.changes.push_back(direction);

        if self.changes.len() > self.window {
            match self.changes.pop_front() {
                Some(1) => self.rises -= 1,
                Some(-1) => self.falls -= 1,
                _ => {}
            }
        }
    }
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
