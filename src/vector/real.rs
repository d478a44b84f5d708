//! Dense real-valued vectors

use crate::core::{Result, SVMError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A vector of real numbers stored contiguously
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RealVector {
    values: Vec<f64>,
}

impl RealVector {
    /// Create a new dense vector
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Number of components
    pub fn dim(&self) -> usize {
        self.values.len()
    }

    /// Borrow the components
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Compute x^T * y
    pub fn dot_product(&self, other: &RealVector) -> Result<f64> {
        self.check_dim(other)?;
        Ok(self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(&a, &b)| a * b)
            .sum())
    }

    /// Compute ||x - y||²
    pub fn squared_distance(&self, other: &RealVector) -> Result<f64> {
        self.check_dim(other)?;
        Ok(self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(&a, &b)| {
                let d = a - b;
                d * d
            })
            .sum())
    }

    fn check_dim(&self, other: &RealVector) -> Result<()> {
        if self.dim() != other.dim() {
            return Err(SVMError::DimensionMismatch {
                expected: self.dim(),
                actual: other.dim(),
            });
        }
        Ok(())
    }
}

impl From<Vec<f64>> for RealVector {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl From<&[f64]> for RealVector {
    fn from(values: &[f64]) -> Self {
        Self::new(values.to_vec())
    }
}

impl fmt::Display for RealVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.values)
    }
}
