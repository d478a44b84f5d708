//! Input vector representations
//!
//! Kernels only ever see a [`DataVector`]. Both operands of a kernel must use
//! the same representation; combining a dense vector with a bit vector is a
//! configuration defect and is reported as
//! [`SVMError::RepresentationMismatch`].

pub mod bit;
pub mod real;

pub use self::bit::*;
pub use self::real::*;

use crate::core::{Result, SVMError};
use serde::{Deserialize, Serialize};

/// Closed set of vector representations accepted by kernels
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DataVector {
    Real(RealVector),
    Bit(BitVector),
}

impl DataVector {
    /// Dot product of two vectors of the same representation
    pub fn dot_product(&self, other: &DataVector) -> Result<f64> {
        match (self, other) {
            (DataVector::Real(x), DataVector::Real(y)) => x.dot_product(y),
            (DataVector::Bit(x), DataVector::Bit(y)) => x.dot_product(y).map(f64::from),
            _ => Err(self.mismatch(other)),
        }
    }

    /// Squared Euclidean distance; the Hamming distance for bit vectors
    pub fn squared_distance(&self, other: &DataVector) -> Result<f64> {
        match (self, other) {
            (DataVector::Real(x), DataVector::Real(y)) => x.squared_distance(y),
            (DataVector::Bit(x), DataVector::Bit(y)) => x.hamming_distance(y).map(f64::from),
            _ => Err(self.mismatch(other)),
        }
    }

    /// Number of components (bits for a bit vector)
    pub fn dim(&self) -> usize {
        match self {
            DataVector::Real(x) => x.dim(),
            DataVector::Bit(x) => x.len(),
        }
    }

    /// Name of the representation, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            DataVector::Real(_) => "real",
            DataVector::Bit(_) => "bit",
        }
    }

    fn mismatch(&self, other: &DataVector) -> SVMError {
        SVMError::RepresentationMismatch {
            left: self.kind(),
            right: other.kind(),
        }
    }
}

impl From<RealVector> for DataVector {
    fn from(v: RealVector) -> Self {
        DataVector::Real(v)
    }
}

impl From<BitVector> for DataVector {
    fn from(v: BitVector) -> Self {
        DataVector::Bit(v)
    }
}

impl From<Vec<f64>> for DataVector {
    fn from(values: Vec<f64>) -> Self {
        DataVector::Real(RealVector::new(values))
    }
}

impl From<&[f64]> for DataVector {
    fn from(values: &[f64]) -> Self {
        DataVector::Real(RealVector::from(values))
    }
}

impl std::fmt::Display for DataVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataVector::Real(x) => std::fmt::Display::fmt(x, f),
            DataVector::Bit(x) => std::fmt::Display::fmt(x, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_real() {
        let x = DataVector::from(vec![1.0, 2.0]);
        let y = DataVector::from(vec![3.0, 4.0]);
        assert_eq!(x.dot_product(&y).unwrap(), 11.0);
        assert_eq!(x.squared_distance(&y).unwrap(), 8.0);
        assert_eq!(x.dim(), 2);
        assert_eq!(x.kind(), "real");
    }

    #[test]
    fn test_dispatch_bit() {
        let x = DataVector::from(BitVector::from_bits(&[true, true, false]));
        let y = DataVector::from(BitVector::from_bits(&[false, true, true]));
        assert_eq!(x.dot_product(&y).unwrap(), 1.0);
        assert_eq!(x.squared_distance(&y).unwrap(), 2.0);
        assert_eq!(x.dim(), 3);
        assert_eq!(x.kind(), "bit");
    }

    #[test]
    fn test_mixed_representations_rejected() {
        let x = DataVector::from(vec![1.0, 0.0]);
        let y = DataVector::from(BitVector::from_bits(&[true, false]));

        match x.dot_product(&y) {
            Err(SVMError::RepresentationMismatch { left, right }) => {
                assert_eq!(left, "real");
                assert_eq!(right, "bit");
            }
            other => panic!("expected representation mismatch, got {other:?}"),
        }
        assert!(matches!(
            y.squared_distance(&x),
            Err(SVMError::RepresentationMismatch {
                left: "bit",
                right: "real"
            })
        ));
    }
}
