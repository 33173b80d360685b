use crate::domain::errors::PipelineError;

/// Binary classifier producing a `[p(class 0), p(class 1)]` distribution.
pub trait Classifier {
    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], PipelineError>;

    /// Class with the highest probability; ties resolve to class 0.
    fn predict(&self, features: &[f64]) -> Result<u8, PipelineError> {
        let proba = self.predict_proba(features)?;
        Ok(if proba[1] > proba[0] { 1 } else { 0 })
    }

    fn name(&self) -> &str;
}

/// Share of rows whose predicted class matches the label.
pub fn accuracy<C: Classifier + ?Sized>(
    model: &C,
    x: &[Vec<f64>],
    y: &[u8],
) -> Result<f64, PipelineError> {
    if x.is_empty() {
        return Ok(0.0);
    }
    let mut correct = 0usize;
    for (features, &label) in x.iter().zip(y) {
        if model.predict(features)? == label {
            correct += 1;
        }
    }
    Ok(correct as f64 / x.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Threshold(f64);

    impl Classifier for Threshold {
        fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], PipelineError> {
            Ok(if features[0] > self.0 {
                [0.3, 0.7]
            } else {
                [0.6, 0.4]
            })
        }

        fn name(&self) -> &str {
            "threshold"
        }
    }

    #[test]
    fn test_accuracy_counts_matches() {
        let model = Threshold(0.0);
        let x = vec![vec![1.0], vec![-1.0], vec![2.0], vec![-3.0]];
        let y = vec![1, 0, 0, 0];
        assert_eq!(accuracy(&model, &x, &y).unwrap(), 0.75);
    }

    #[test]
    fn test_tie_predicts_class_zero() {
        struct Even;
        impl Classifier for Even {
            fn predict_proba(&self, _: &[f64]) -> Result<[f64; 2], PipelineError> {
                Ok([0.5, 0.5])
            }
            fn name(&self) -> &str {
                "even"
            }
        }
        assert_eq!(Even.predict(&[0.0]).unwrap(), 0);
    }
}
