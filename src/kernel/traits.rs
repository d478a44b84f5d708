//! Kernel trait definition

use crate::core::Result;
use crate::vector::DataVector;

/// Kernel function trait
///
/// A kernel function K(x, y) must be symmetric and satisfy Mercer's condition
/// to be valid for SVM. Violations are not detectable statically; the SMO
/// solver reports them as [`crate::core::SVMError::NonMercerKernel`] when it
/// meets a pair with negative curvature.
pub trait Kernel {
    /// Compute kernel value K(x, y)
    ///
    /// Fails if `x` and `y` do not share a representation and dimension.
    fn compute(&self, x: &DataVector, y: &DataVector) -> Result<f64>;
}

impl<K: Kernel + ?Sized> Kernel for &K {
    fn compute(&self, x: &DataVector, y: &DataVector) -> Result<f64> {
        (**self).compute(x, y)
    }
}
