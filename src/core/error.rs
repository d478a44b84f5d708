//! Error types for the classifiers

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SVMError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid label: expected -1 or +1, got {0}")]
    InvalidLabel(i32),

    #[error("Vector representation mismatch: cannot combine {left} with {right}")]
    RepresentationMismatch {
        left: &'static str,
        right: &'static str,
    },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("The kernel function does not obey Mercer's condition (eta = {eta})")]
    NonMercerKernel { eta: f64 },

    #[error("SVM has already been trained: all multipliers and the threshold must be zero")]
    NotInitialState,

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, SVMError>;
