//! High-level API for Support Vector Machine operations
//!
//! This module provides a user-friendly interface for common SVM tasks,
//! including training, prediction, and model evaluation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rclassify::api::SVMBuilder;
//! use rclassify::kernel::GaussianKernel;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Train a model on data
//! let model = SVMBuilder::with_kernel(GaussianKernel::new(0.5)?)
//!     .with_c(10.0)
//!     .with_seed(42)
//!     .train_from_file("data.libsvm")?;
//!
//! // Make predictions
//! let predictions = model.predict_from_file("test.libsvm")?;
//! println!("Accuracy: {:.2}%", model.evaluate_from_file("test.libsvm")? * 100.0);
//! # Ok(())
//! # }
//! ```

use crate::core::{
    Dataset, Prediction, Result, SVMError, SVMModel, Sample, SolverConfig, TrainingReport,
};
use crate::data::{CSVDataset, LibSVMDataset};
use crate::kernel::{Kernel, LinearKernel};
use crate::solver::SMOSolver;
use crate::svm::SVM;
use crate::vector::DataVector;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::time::Duration;

/// Builder for training an SVM
pub struct SVMBuilder<K: Kernel = LinearKernel> {
    kernel: K,
    c: f64,
    seed: Option<u64>,
    config: SolverConfig,
}

impl SVMBuilder<LinearKernel> {
    /// Create a new builder with linear kernel and default parameters
    pub fn new() -> Self {
        Self::with_kernel(LinearKernel::new())
    }
}

impl Default for SVMBuilder<LinearKernel> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kernel> SVMBuilder<K> {
    /// Create a builder with a custom kernel
    pub fn with_kernel(kernel: K) -> Self {
        Self {
            kernel,
            c: 1.0,
            seed: None,
            config: SolverConfig::default(),
        }
    }

    /// Set the soft-margin parameter C
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Use a hard margin (C = +inf)
    pub fn hard_margin(mut self) -> Self {
        self.c = f64::INFINITY;
        self
    }

    /// Seed the solver's random generator for reproducible training
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the maximum number of outer-loop passes (`None` for no limit)
    pub fn with_max_passes(mut self, max_passes: Option<usize>) -> Self {
        self.config.max_passes = max_passes;
        self
    }

    /// Stop training after the given wall-clock time
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.config.time_limit = Some(limit);
        self
    }

    /// Train on a dataset
    pub fn train<D: Dataset>(self, dataset: &D) -> Result<TrainedModel<K>> {
        self.train_samples(&dataset.samples())
    }

    /// Train on samples
    ///
    /// The returned model is already pruned to its support vectors.
    pub fn train_samples(self, samples: &[Sample]) -> Result<TrainedModel<K>> {
        if samples.is_empty() {
            return Err(SVMError::EmptyDataset);
        }

        let mut svm = SVM::new(self.kernel, self.c)?;
        for sample in samples {
            svm.add(sample.features.clone(), sample.label)?;
        }

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let report = SMOSolver::new(self.config, rng).train(&mut svm)?;

        svm.prune();
        info!(
            "Trained on {} samples: {} support vectors, b = {:.6}",
            samples.len(),
            svm.size(),
            svm.threshold()
        );
        Ok(TrainedModel::new(svm, report))
    }

    /// Train from LibSVM format file
    pub fn train_from_file<P: AsRef<Path>>(self, path: P) -> Result<TrainedModel<K>> {
        let dataset = LibSVMDataset::from_file(path)?;
        self.train(&dataset)
    }

    /// Train from CSV file (automatically detects headers)
    pub fn train_from_csv<P: AsRef<Path>>(self, path: P) -> Result<TrainedModel<K>> {
        let dataset = CSVDataset::from_file(path)?;
        self.train(&dataset)
    }
}

/// Trained SVM model with high-level prediction interface
#[derive(Debug, Clone)]
pub struct TrainedModel<K: Kernel> {
    svm: SVM<K>,
    report: TrainingReport,
}

impl<K: Kernel> TrainedModel<K> {
    pub(crate) fn new(svm: SVM<K>, report: TrainingReport) -> Self {
        Self { svm, report }
    }

    /// Predict a single sample
    pub fn predict(&self, sample: &Sample) -> Result<Prediction> {
        self.svm.predict(&sample.features)
    }

    /// Predict multiple samples
    pub fn predict_batch(&self, samples: &[Sample]) -> Result<Vec<Prediction>> {
        samples.iter().map(|s| self.predict(s)).collect()
    }

    /// Predict from dataset
    pub fn predict_dataset<D: Dataset>(&self, dataset: &D) -> Result<Vec<Prediction>> {
        self.predict_batch(&dataset.samples())
    }

    /// Predict from LibSVM file
    pub fn predict_from_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Prediction>> {
        let dataset = self.load_libsvm(path)?;
        self.predict_dataset(&dataset)
    }

    /// Predict from CSV file
    pub fn predict_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Prediction>> {
        let dataset = CSVDataset::from_file(path)?;
        self.predict_dataset(&dataset)
    }

    /// Evaluate accuracy on a dataset
    pub fn evaluate<D: Dataset>(&self, dataset: &D) -> Result<f64> {
        Ok(self.evaluate_detailed(dataset)?.accuracy())
    }

    /// Evaluate accuracy from LibSVM file
    pub fn evaluate_from_file<P: AsRef<Path>>(&self, path: P) -> Result<f64> {
        let dataset = self.load_libsvm(path)?;
        self.evaluate(&dataset)
    }

    /// Evaluate accuracy from CSV file
    pub fn evaluate_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<f64> {
        let dataset = CSVDataset::from_file(path)?;
        self.evaluate(&dataset)
    }

    /// Get detailed evaluation metrics
    pub fn evaluate_detailed<D: Dataset>(&self, dataset: &D) -> Result<EvaluationMetrics> {
        let predictions = self.predict_dataset(dataset)?;
        let labels = dataset.get_labels();
        Ok(EvaluationMetrics::from_predictions(&predictions, &labels))
    }

    /// Get model information
    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            n_support_vectors: self.svm.size(),
            bias: self.svm.threshold(),
            c: self.svm.c(),
            dim: self.svm.dim().unwrap_or(0),
            passes: self.report.passes,
            converged: self.report.converged,
        }
    }

    /// Summary of the training run that produced this model
    pub fn report(&self) -> &TrainingReport {
        &self.report
    }

    /// Get the underlying SVM
    pub fn inner(&self) -> &SVM<K> {
        &self.svm
    }

    pub fn into_inner(self) -> SVM<K> {
        self.svm
    }

    /// LibSVM files omit trailing zero features, so widen to the model's
    /// input dimension
    fn load_libsvm<P: AsRef<Path>>(&self, path: P) -> Result<LibSVMDataset> {
        let dataset = LibSVMDataset::from_file(path)?;
        match self.svm.dim() {
            Some(dim) => dataset.with_dim(dim),
            None => Ok(dataset),
        }
    }
}

impl<K: Kernel> SVMModel for TrainedModel<K> {
    fn decision_value(&self, x: &DataVector) -> Result<f64> {
        self.svm.output(x)
    }

    fn n_support_vectors(&self) -> usize {
        self.svm.size()
    }

    fn bias(&self) -> f64 {
        self.svm.threshold()
    }
}

/// Detailed evaluation metrics
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationMetrics {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl EvaluationMetrics {
    fn new(tp: usize, tn: usize, fp: usize, fn_: usize) -> Self {
        Self {
            true_positives: tp,
            true_negatives: tn,
            false_positives: fp,
            false_negatives: fn_,
        }
    }

    /// Tally predictions against the true labels
    pub fn from_predictions(predictions: &[Prediction], labels: &[i32]) -> Self {
        let mut tp = 0; // True positives
        let mut tn = 0; // True negatives
        let mut fp = 0; // False positives
        let mut fn_ = 0; // False negatives

        for (pred, &actual) in predictions.iter().zip(labels.iter()) {
            match (pred.label > 0, actual > 0) {
                (true, true) => tp += 1,
                (false, false) => tn += 1,
                (true, false) => fp += 1,
                (false, true) => fn_ += 1,
            }
        }

        Self::new(tp, tn, fp, fn_)
    }

    /// Total number of evaluated samples
    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    /// Calculate accuracy: (TP + TN) / (TP + TN + FP + FN)
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.true_positives + self.true_negatives) as f64 / total as f64
        }
    }

    /// Calculate precision: TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        let denominator = self.true_positives + self.false_positives;
        if denominator == 0 {
            0.0
        } else {
            self.true_positives as f64 / denominator as f64
        }
    }

    /// Calculate recall (sensitivity): TP / (TP + FN)
    pub fn recall(&self) -> f64 {
        let denominator = self.true_positives + self.false_negatives;
        if denominator == 0 {
            0.0
        } else {
            self.true_positives as f64 / denominator as f64
        }
    }

    /// Calculate F1 score: 2 * (precision * recall) / (precision + recall)
    pub fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * (p * r) / (p + r)
        }
    }

    /// Calculate specificity: TN / (TN + FP)
    pub fn specificity(&self) -> f64 {
        let denominator = self.true_negatives + self.false_positives;
        if denominator == 0 {
            0.0
        } else {
            self.true_negatives as f64 / denominator as f64
        }
    }
}

/// Model information
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub n_support_vectors: usize,
    pub bias: f64,
    pub c: f64,
    /// Input dimension, 0 if the model has no support vectors
    pub dim: usize,
    pub passes: usize,
    pub converged: bool,
}

/// Convenience functions for quick operations
pub mod quick {
    use super::*;

    /// Train a linear SVM on LibSVM data with default parameters
    pub fn train_libsvm<P: AsRef<Path>>(path: P) -> Result<TrainedModel<LinearKernel>> {
        SVMBuilder::new().train_from_file(path)
    }

    /// Train a linear SVM on CSV data with default parameters
    pub fn train_csv<P: AsRef<Path>>(path: P) -> Result<TrainedModel<LinearKernel>> {
        SVMBuilder::new().train_from_csv(path)
    }

    /// Quick evaluation: train on training file, test on test file
    pub fn evaluate_split<P1: AsRef<Path>, P2: AsRef<Path>>(
        train_path: P1,
        test_path: P2,
    ) -> Result<f64> {
        let model = train_libsvm(train_path)?;
        model.evaluate_from_file(test_path)
    }

    /// Hold-out validation with a sequential split
    pub fn simple_validation<D: Dataset>(dataset: &D, train_ratio: f64, c: f64) -> Result<f64> {
        if train_ratio <= 0.0 || train_ratio >= 1.0 {
            return Err(SVMError::InvalidParameter(format!(
                "Train ratio must be between 0 and 1, got: {train_ratio}"
            )));
        }

        let samples = dataset.samples();
        let train_size = (samples.len() as f64 * train_ratio) as usize;
        let (train_samples, test_samples) = samples.split_at(train_size);
        if train_samples.is_empty() || test_samples.is_empty() {
            return Err(SVMError::InvalidDataset(format!(
                "Cannot split {} samples with ratio {train_ratio}",
                samples.len()
            )));
        }

        let model = SVMBuilder::new().with_c(c).train_samples(train_samples)?;

        let mut correct = 0;
        for sample in test_samples {
            if model.predict(sample)?.label == sample.label {
                correct += 1;
            }
        }

        Ok(correct as f64 / test_samples.len() as f64)
    }
}
