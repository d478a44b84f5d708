//! Linear kernel implementation

use crate::core::Result;
use crate::kernel::Kernel;
use crate::vector::DataVector;
use serde::{Deserialize, Serialize};

/// Linear kernel: K(x, y) = x^T * y
///
/// The simplest kernel, the dot product of the two vectors. For bit vectors
/// this is the number of shared set bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearKernel;

impl LinearKernel {
    /// Create a new linear kernel
    pub fn new() -> Self {
        Self
    }
}

impl Kernel for LinearKernel {
    fn compute(&self, x: &DataVector, y: &DataVector) -> Result<f64> {
        x.dot_product(y)
    }
}
