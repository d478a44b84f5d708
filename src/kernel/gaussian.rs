//! Gaussian (radial basis function) kernel implementation
//!
//! The Gaussian kernel is defined as: K(x, y) = exp(-||x - y||² / (2σ²))
//! where σ² (the variance) controls the kernel width.

use crate::core::{Result, SVMError};
use crate::kernel::Kernel;
use crate::vector::DataVector;
use serde::{Deserialize, Serialize};

/// Gaussian kernel: K(x, y) = exp(-||x - y||² / (2σ²))
///
/// The variance controls the "reach" of each training example:
/// - Small variance: only close points are similar (potential overfitting)
/// - Large variance: distant points still interact (potential underfitting)
///
/// For bit vectors the squared distance is the Hamming distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GaussianParams")]
pub struct GaussianKernel {
    variance: f64,
}

#[derive(Deserialize)]
struct GaussianParams {
    variance: f64,
}

impl TryFrom<GaussianParams> for GaussianKernel {
    type Error = SVMError;

    fn try_from(params: GaussianParams) -> Result<Self> {
        GaussianKernel::new(params.variance)
    }
}

impl GaussianKernel {
    /// Create a new Gaussian kernel with the given variance
    ///
    /// Fails unless the variance is positive and finite.
    pub fn new(variance: f64) -> Result<Self> {
        if !variance.is_finite() || variance <= 0.0 {
            return Err(SVMError::InvalidParameter(format!(
                "Variance must be positive and finite, got: {variance}"
            )));
        }
        Ok(Self { variance })
    }

    /// Gaussian kernel with unit variance
    pub fn unit_variance() -> Self {
        Self { variance: 1.0 }
    }

    /// Get the variance parameter
    pub fn variance(&self) -> f64 {
        self.variance
    }
}

impl Default for GaussianKernel {
    fn default() -> Self {
        Self::unit_variance()
    }
}

impl Kernel for GaussianKernel {
    fn compute(&self, x: &DataVector, y: &DataVector) -> Result<f64> {
        let squared_distance = x.squared_distance(y)?;
        Ok((-squared_distance / (2.0 * self.variance)).exp())
    }
}
