//! Kernel functions for SVM

pub mod gaussian;
pub mod linear;
pub mod traits;

pub use self::gaussian::*;
pub use self::linear::*;
pub use self::traits::*;

use crate::core::Result;
use crate::vector::DataVector;
use serde::{Deserialize, Serialize};

/// Kernel chosen at runtime, e.g. from the command line or a saved model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KernelFunction {
    Linear,
    Gaussian(GaussianKernel),
}

impl KernelFunction {
    /// Short identifier used in model summaries
    pub fn name(&self) -> &'static str {
        match self {
            KernelFunction::Linear => "linear",
            KernelFunction::Gaussian(_) => "gaussian",
        }
    }
}

impl Default for KernelFunction {
    fn default() -> Self {
        KernelFunction::Linear
    }
}

impl Kernel for KernelFunction {
    fn compute(&self, x: &DataVector, y: &DataVector) -> Result<f64> {
        match self {
            KernelFunction::Linear => LinearKernel.compute(x, y),
            KernelFunction::Gaussian(k) => k.compute(x, y),
        }
    }
}

impl From<LinearKernel> for KernelFunction {
    fn from(_: LinearKernel) -> Self {
        KernelFunction::Linear
    }
}

impl From<GaussianKernel> for KernelFunction {
    fn from(k: GaussianKernel) -> Self {
        KernelFunction::Gaussian(k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_function_dispatch() {
        let x = DataVector::from(vec![1.0, 2.0]);
        let y = DataVector::from(vec![2.0, 1.0]);

        let linear = KernelFunction::from(LinearKernel::new());
        assert_eq!(linear.compute(&x, &y).unwrap(), 4.0);
        assert_eq!(linear.name(), "linear");

        let gaussian = KernelFunction::from(GaussianKernel::unit_variance());
        assert_eq!(
            gaussian.compute(&x, &y).unwrap(),
            GaussianKernel::unit_variance().compute(&x, &y).unwrap()
        );
        assert_eq!(gaussian.name(), "gaussian");
    }

    #[test]
    fn test_kernel_function_serde() {
        let kernel = KernelFunction::from(GaussianKernel::new(0.25).unwrap());
        let json = serde_json::to_string(&kernel).unwrap();
        assert!(json.contains("\"type\":\"gaussian\""));

        let back: KernelFunction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kernel);
    }
}
