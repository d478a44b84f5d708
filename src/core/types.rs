//! Core type definitions

use crate::core::{Result, SVMError};
use crate::utils::{geq, leq};
use crate::vector::DataVector;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tolerance used for KKT checks, bound detection and pruning
pub const EPSILON: f64 = 1e-3;

/// Prediction result containing label and decision value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class label (+1 or -1)
    pub label: i32,
    /// Raw decision function value
    pub decision_value: f64,
}

impl Prediction {
    /// Create a prediction from a raw decision value; the sign is the class
    pub fn from_decision_value(decision_value: f64) -> Self {
        Self {
            label: if decision_value >= 0.0 { 1 } else { -1 },
            decision_value,
        }
    }

    /// Get confidence as absolute value of decision value
    pub fn confidence(&self) -> f64 {
        self.decision_value.abs()
    }
}

/// Labeled training example as read from a dataset
#[derive(Clone, Debug)]
pub struct Sample {
    /// Input vector
    pub features: DataVector,
    /// Class label (+1 or -1 for binary classification)
    pub label: i32,
}

impl Sample {
    /// Create a new sample
    pub fn new(features: impl Into<DataVector>, label: i32) -> Self {
        Self {
            features: features.into(),
            label,
        }
    }
}

/// One training example in an SVM working set
///
/// `alpha` is only ever changed by the SMO solver. `bound` caches whether
/// `alpha` sits at 0 or at `C` (within [`EPSILON`]) and is recomputed after
/// every multiplier update.
#[derive(Clone, Debug)]
pub struct SupportVector {
    pub(crate) x: DataVector,
    pub(crate) y: f64,
    pub(crate) alpha: f64,
    pub(crate) bound: bool,
}

impl SupportVector {
    /// Create an untrained example with `alpha = 0`
    ///
    /// Fails with [`SVMError::InvalidLabel`] unless `y` is -1 or +1.
    pub fn new(x: DataVector, y: i32) -> Result<Self> {
        if y != 1 && y != -1 {
            return Err(SVMError::InvalidLabel(y));
        }
        Ok(Self {
            x,
            y: f64::from(y),
            alpha: 0.0,
            bound: true,
        })
    }

    /// The input vector
    pub fn x(&self) -> &DataVector {
        &self.x
    }

    /// The target class
    pub fn y(&self) -> i32 {
        self.y as i32
    }

    /// The Lagrange multiplier
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Is the multiplier at one of its bounds?
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Set the multiplier and recompute the bound flag against `c`
    pub(crate) fn set_alpha(&mut self, alpha: f64, c: f64) {
        self.alpha = alpha;
        self.bound = leq(alpha, 0.0, EPSILON) || geq(alpha, c, EPSILON);
    }
}

/// Budget for a single SMO training run
///
/// Both limits are checked once per outer-loop pass.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Maximum number of outer-loop passes
    pub max_passes: Option<usize>,
    /// Maximum wall-clock time
    pub time_limit: Option<Duration>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_passes: Some(10_000),
            time_limit: None,
        }
    }
}

/// Summary of an SMO training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Number of outer-loop passes performed
    pub passes: usize,
    /// Number of successful pairwise steps
    pub steps: usize,
    /// Whether a full examine-all pass made no changes
    pub converged: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction() {
        let pred = Prediction::from_decision_value(2.5);
        assert_eq!(pred.label, 1);
        assert_eq!(pred.decision_value, 2.5);
        assert_eq!(pred.confidence(), 2.5);

        let neg_pred = Prediction::from_decision_value(-1.8);
        assert_eq!(neg_pred.label, -1);
        assert_eq!(neg_pred.confidence(), 1.8);
    }

    #[test]
    fn test_support_vector_labels() {
        let x = DataVector::from(vec![1.0]);
        for y in [1, -1] {
            let v = SupportVector::new(x.clone(), y).expect("valid label");
            assert_eq!(v.y(), y);
            assert_eq!(v.alpha(), 0.0);
            assert!(v.is_bound());
        }
    }

    #[test]
    fn test_support_vector_rejects_invalid_labels() {
        let x = DataVector::from(vec![1.0]);
        for y in [0, 2, -2, 3, i32::MIN, i32::MAX] {
            assert!(matches!(
                SupportVector::new(x.clone(), y),
                Err(SVMError::InvalidLabel(got)) if got == y
            ));
        }
    }

    #[test]
    fn test_support_vector_bound_flag() {
        let mut v = SupportVector::new(DataVector::from(vec![1.0]), 1).unwrap();
        v.set_alpha(0.5, 1.0);
        assert!(!v.is_bound());
        v.set_alpha(1.0 - EPSILON / 2.0, 1.0);
        assert!(v.is_bound());
        v.set_alpha(EPSILON / 2.0, 1.0);
        assert!(v.is_bound());
        // hard margin: only the lower bound exists
        v.set_alpha(1e6, f64::INFINITY);
        assert!(!v.is_bound());
    }

    #[test]
    fn test_solver_config_default() {
        let config = SolverConfig::default();
        assert_eq!(config.max_passes, Some(10_000));
        assert!(config.time_limit.is_none());
    }

    #[test]
    fn test_sample() {
        let sample = Sample::new(vec![1.0, 3.0], -1);
        assert_eq!(sample.label, -1);
        assert_eq!(sample.features, DataVector::from(vec![1.0, 3.0]));
    }
}
