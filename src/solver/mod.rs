//! SVM solver implementations
//!
//! This module implements the Sequential Minimal Optimization (SMO) algorithm
//! as described in "Sequential Minimal Optimization: A Fast Algorithm for
//! Training Support Vector Machines" by John C. Platt.

pub mod smo;

pub use self::smo::*;
