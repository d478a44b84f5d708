//! Data loading and dataset implementations
//!
//! This module provides implementations of the Dataset trait for the
//! LibSVM and CSV text formats.

pub mod csv;
pub mod libsvm;

pub use self::csv::*;
pub use self::libsvm::*;
