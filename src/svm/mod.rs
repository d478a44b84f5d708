//! The Support Vector Machine aggregate
//!
//! An [`SVM`] owns its working set of [`SupportVector`]s, the threshold `b`,
//! the kernel and the soft-margin constant `C`. Training mutates the
//! multipliers and the threshold in place (see [`crate::solver::SMOSolver`]);
//! afterwards [`SVM::prune`] discards every example that is not a support
//! vector and [`SVM::output`] evaluates the decision function.

use crate::core::{Result, SVMError, SVMModel, SupportVector, EPSILON};
use crate::kernel::{Kernel, LinearKernel};
use crate::vector::DataVector;

/// A soft-margin Support Vector Machine with an arbitrary kernel
#[derive(Debug, Clone)]
pub struct SVM<K: Kernel> {
    /// Working set, addressed by index during training
    pub(crate) vectors: Vec<SupportVector>,
    /// The threshold
    pub(crate) b: f64,
    kernel: K,
    c: f64,
}

impl<K: Kernel> SVM<K> {
    /// Create a soft-margin SVM
    ///
    /// `c` must be positive; `f64::INFINITY` gives a hard-margin SVM.
    pub fn new(kernel: K, c: f64) -> Result<Self> {
        if c.is_nan() || c <= 0.0 {
            return Err(SVMError::InvalidParameter(format!(
                "Soft-margin parameter C must be positive, got: {c}"
            )));
        }
        Ok(Self {
            vectors: Vec::new(),
            b: 0.0,
            kernel,
            c,
        })
    }

    /// Create a hard-margin SVM (C = +inf)
    pub fn hard_margin(kernel: K) -> Self {
        Self {
            vectors: Vec::new(),
            b: 0.0,
            kernel,
            c: f64::INFINITY,
        }
    }

    /// Add a training example with target class `y`
    ///
    /// Fails if `y` is not -1 or +1, or if `x` does not match the
    /// representation and dimension of the examples already added.
    pub fn add(&mut self, x: impl Into<DataVector>, y: i32) -> Result<()> {
        let v = SupportVector::new(x.into(), y)?;
        if let Some(first) = self.vectors.first() {
            if first.x.kind() != v.x.kind() {
                return Err(SVMError::RepresentationMismatch {
                    left: first.x.kind(),
                    right: v.x.kind(),
                });
            }
            if first.x.dim() != v.x.dim() {
                return Err(SVMError::DimensionMismatch {
                    expected: first.x.dim(),
                    actual: v.x.dim(),
                });
            }
        }
        self.vectors.push(v);
        Ok(())
    }

    /// Calculate the output u = Σⱼ αⱼ yⱼ K(xⱼ, x) - b
    ///
    /// Examples whose multiplier is within [`EPSILON`] of zero are skipped;
    /// before pruning this only saves kernel evaluations.
    pub fn output(&self, x: &DataVector) -> Result<f64> {
        let mut u = -self.b;
        for v in &self.vectors {
            if v.alpha <= EPSILON {
                continue;
            }
            u += v.alpha * v.y * self.kernel.compute(&v.x, x)?;
        }
        Ok(u)
    }

    /// Throw away all non-support vectors (α ≤ EPSILON)
    pub fn prune(&mut self) {
        self.vectors.retain(|v| v.alpha > EPSILON);
    }

    /// Number of examples in the working set
    pub fn size(&self) -> usize {
        self.vectors.len()
    }

    /// Check if the working set is empty
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Dimension of the input vectors, once any have been added
    pub fn dim(&self) -> Option<usize> {
        self.vectors.first().map(|v| v.x.dim())
    }

    /// The working set in insertion order
    pub fn vectors(&self) -> &[SupportVector] {
        &self.vectors
    }

    /// The threshold b
    pub fn threshold(&self) -> f64 {
        self.b
    }

    /// The soft-margin parameter C
    pub fn c(&self) -> f64 {
        self.c
    }

    /// The kernel function
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Are all multipliers and the threshold still zero?
    pub fn is_untrained(&self) -> bool {
        self.b == 0.0 && self.vectors.iter().all(|v| v.alpha == 0.0)
    }
}

impl Default for SVM<LinearKernel> {
    /// Hard-margin SVM with a linear kernel
    fn default() -> Self {
        Self::hard_margin(LinearKernel::new())
    }
}

impl<K: Kernel> SVMModel for SVM<K> {
    fn decision_value(&self, x: &DataVector) -> Result<f64> {
        self.output(x)
    }

    fn n_support_vectors(&self) -> usize {
        self.vectors.iter().filter(|v| v.alpha > EPSILON).count()
    }

    fn bias(&self) -> f64 {
        self.b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::GaussianKernel;
    use crate::vector::BitVector;

    fn two_point_svm() -> SVM<LinearKernel> {
        let mut svm = SVM::hard_margin(LinearKernel::new());
        svm.add(vec![1.0, 0.0], 1).unwrap();
        svm.add(vec![-1.0, 0.0], -1).unwrap();
        svm
    }

    #[test]
    fn test_svm_creation() {
        let svm = SVM::new(GaussianKernel::unit_variance(), 10.0).unwrap();
        assert_eq!(svm.c(), 10.0);
        assert_eq!(svm.threshold(), 0.0);
        assert_eq!(svm.size(), 0);
        assert!(svm.is_empty());

        let svm = SVM::default();
        assert!(svm.c().is_infinite());
    }

    #[test]
    fn test_svm_invalid_c() {
        for c in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                SVM::new(LinearKernel::new(), c),
                Err(SVMError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_add() {
        let svm = two_point_svm();
        assert_eq!(svm.size(), 2);
        assert_eq!(svm.dim(), Some(2));
        assert!(svm.vectors().iter().all(|v| v.alpha() == 0.0 && v.is_bound()));
        assert_eq!(svm.vectors()[1].y(), -1);
        assert!(svm.is_untrained());
    }

    #[test]
    fn test_add_invalid_label() {
        let mut svm = two_point_svm();
        assert!(matches!(
            svm.add(vec![0.0, 1.0], 0),
            Err(SVMError::InvalidLabel(0))
        ));
        assert_eq!(svm.size(), 2);
    }

    #[test]
    fn test_add_mismatched_vectors() {
        let mut svm = two_point_svm();
        assert!(matches!(
            svm.add(BitVector::from_bits(&[true, false]), 1),
            Err(SVMError::RepresentationMismatch { .. })
        ));
        assert!(matches!(
            svm.add(vec![1.0, 2.0, 3.0], 1),
            Err(SVMError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
        assert_eq!(svm.size(), 2);
    }

    #[test]
    fn test_output() {
        let mut svm = two_point_svm();
        let x = DataVector::from(vec![2.0, 5.0]);
        assert_eq!(svm.output(&x).unwrap(), 0.0);

        svm.vectors[0].alpha = 0.5;
        svm.vectors[1].alpha = 0.5;
        svm.b = 0.25;
        // 0.5 * 2 + 0.5 * 2 - 0.25
        assert_eq!(svm.output(&x).unwrap(), 1.75);
        assert_eq!(svm.predict(&x).unwrap().label, 1);
        assert_eq!(svm.n_support_vectors(), 2);
        assert!(!svm.is_untrained());
    }

    #[test]
    fn test_output_skips_negligible_multipliers() {
        let mut svm = two_point_svm();
        svm.vectors[0].alpha = EPSILON / 2.0;
        let x = DataVector::from(vec![1.0, 0.0]);
        assert_eq!(svm.output(&x).unwrap(), 0.0);
    }

    #[test]
    fn test_output_mismatch() {
        let mut svm = two_point_svm();
        svm.vectors[0].alpha = 1.0;
        let x = DataVector::from(BitVector::from_bits(&[true, true]));
        assert!(matches!(
            svm.output(&x),
            Err(SVMError::RepresentationMismatch { .. })
        ));
    }

    #[test]
    fn test_prune_idempotent() {
        let mut svm = two_point_svm();
        svm.add(vec![3.0, 0.0], 1).unwrap();
        svm.vectors[0].alpha = 0.5;
        svm.vectors[1].alpha = 0.5;
        svm.vectors[2].alpha = EPSILON;

        svm.prune();
        assert_eq!(svm.size(), 2);
        let once: Vec<f64> = svm.vectors().iter().map(|v| v.alpha()).collect();

        svm.prune();
        let twice: Vec<f64> = svm.vectors().iter().map(|v| v.alpha()).collect();
        assert_eq!(once, twice);
        assert!(svm.vectors().iter().all(|v| v.alpha() > EPSILON));
    }
}
