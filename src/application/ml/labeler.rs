use crate::config::pipeline_constants::{LABEL_HORIZON, LABEL_RETURN_THRESHOLD};
use crate::domain::ml::feature_row::FeatureRow;
use tracing::debug;

/// Forward-return labeling: 1 when the close `horizon` sessions ahead is more than
/// `threshold` above today's close.
#[derive(Debug, Clone, Copy)]
pub struct Labeler {
    horizon: usize,
    threshold: f64,
}

impl Default for Labeler {
    fn default() -> Self {
        Self {
            horizon: LABEL_HORIZON,
            threshold: LABEL_RETURN_THRESHOLD,
        }
    }
}

impl Labeler {
    /// `(future_close - close) / close` for row `index`, if the future row exists.
    pub fn future_return(&self, closes: &[f64], index: usize) -> Option<f64> {
        let future_close = closes.get(index + self.horizon)?;
        let close = closes.get(index)?;
        Some((future_close - close) / close)
    }

    pub fn label_for(&self, future_return: f64) -> u8 {
        u8::from(future_return > self.threshold)
    }

    /// Sets `label` on every row; the last `horizon` rows end up unlabeled.
    pub fn apply(&self, rows: &mut [FeatureRow]) {
        let closes: Vec<f64> = rows.iter().map(|r| r.record.close).collect();
        let mut labeled = 0usize;

        for (i, row) in rows.iter_mut().enumerate() {
            row.label = self.future_return(&closes, i).map(|r| self.label_for(r));
            if row.label.is_some() {
                labeled += 1;
            }
        }

        debug!(labeled, total = rows.len(), "applied forward-return labels");
    }
}
