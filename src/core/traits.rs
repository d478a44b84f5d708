//! Core traits

use crate::core::{Prediction, Result, Sample};
use crate::vector::DataVector;

/// Dataset abstraction for labeled examples
pub trait Dataset {
    /// Number of samples in the dataset
    fn len(&self) -> usize;

    /// Number of features (dimensionality)
    fn dim(&self) -> usize;

    /// Get a single sample by index
    ///
    /// # Panics
    /// Panics if index >= len()
    fn get_sample(&self, i: usize) -> Sample;

    /// Get multiple samples
    fn get_batch(&self, indices: &[usize]) -> Vec<Sample> {
        indices.iter().map(|&i| self.get_sample(i)).collect()
    }

    /// Get every sample in order
    fn samples(&self) -> Vec<Sample> {
        (0..self.len()).map(|i| self.get_sample(i)).collect()
    }

    /// Get all labels as a vector
    fn get_labels(&self) -> Vec<i32>;

    /// Check if the dataset is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A trained binary classifier
pub trait SVMModel {
    /// Raw decision value; the sign is the predicted class
    fn decision_value(&self, x: &DataVector) -> Result<f64>;

    /// Predict a single input
    fn predict(&self, x: &DataVector) -> Result<Prediction> {
        self.decision_value(x).map(Prediction::from_decision_value)
    }

    /// Predict multiple inputs
    fn predict_batch(&self, xs: &[DataVector]) -> Result<Vec<Prediction>> {
        xs.iter().map(|x| self.predict(x)).collect()
    }

    /// Get the number of support vectors
    fn n_support_vectors(&self) -> usize;

    /// Get the threshold term
    fn bias(&self) -> f64;
}
