//! Binary classifiers in Rust
//!
//! A soft-margin Support Vector Machine trained with Platt's Sequential
//! Minimal Optimization (SMO) algorithm, over dense real vectors or packed
//! bit vectors with linear and Gaussian kernels, plus a small feed-forward
//! neural network trained with stochastic back-propagation.

pub mod ann;
pub mod api;
pub mod cache;
pub mod core;
pub mod data;
pub mod demo;
pub mod kernel;
pub mod persistence;
pub mod solver;
pub mod svm;
pub mod utils;
pub mod vector;

// Re-export main types for convenience
pub use crate::ann::NeuralNetwork;
pub use crate::api::{EvaluationMetrics, ModelInfo, SVMBuilder, TrainedModel};
pub use crate::cache::ErrorCache;
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{Result, SVMError};
pub use crate::data::{CSVDataset, LibSVMDataset};
pub use crate::kernel::{GaussianKernel, Kernel, KernelFunction, LinearKernel};
pub use crate::solver::SMOSolver;
pub use crate::svm::SVM;
pub use crate::vector::{BitVector, DataVector, RealVector};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
