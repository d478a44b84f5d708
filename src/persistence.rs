//! Model serialization and persistence
//!
//! Trained models are stored as JSON: the kernel, the soft-margin parameter,
//! the threshold and every support vector with its multiplier, plus some
//! metadata. Loading rebuilds an [`SVM`] ready for [`SVM::output`].

use crate::api::TrainedModel;
use crate::core::{Result, SVMError, TrainingReport};
use crate::kernel::{Kernel, KernelFunction};
use crate::svm::SVM;
use crate::vector::DataVector;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serializable representation of a trained SVM model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableModel {
    /// Kernel function and its parameters
    pub kernel: KernelFunction,
    /// Soft-margin parameter C, `None` for a hard margin
    pub c: Option<f64>,
    /// Threshold b
    pub bias: f64,
    /// Support vectors
    pub support_vectors: Vec<SerializableSupportVector>,
    /// Summary of the training run
    pub report: TrainingReport,
    /// Model metadata
    pub metadata: ModelMetadata,
}

/// Serializable support vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableSupportVector {
    pub x: DataVector,
    pub y: i32,
    pub alpha: f64,
}

/// Model metadata for tracking and validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    /// Number of support vectors
    pub n_support_vectors: usize,
    /// Creation timestamp
    pub created_at: String,
}

impl SerializableModel {
    /// Create a serializable model from a trained model
    pub fn from_trained_model<K>(model: &TrainedModel<K>) -> Self
    where
        K: Kernel + Clone + Into<KernelFunction>,
    {
        let svm = model.inner();
        let support_vectors: Vec<SerializableSupportVector> = svm
            .vectors()
            .iter()
            .map(|v| SerializableSupportVector {
                x: v.x().clone(),
                y: v.y(),
                alpha: v.alpha(),
            })
            .collect();

        Self {
            kernel: svm.kernel().clone().into(),
            c: Some(svm.c()).filter(|c| c.is_finite()),
            bias: svm.threshold(),
            metadata: ModelMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                n_support_vectors: support_vectors.len(),
                created_at: chrono::Utc::now().to_rfc3339(),
            },
            support_vectors,
            report: model.report().clone(),
        }
    }

    /// Save model to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(SVMError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| SVMError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load model from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(SVMError::IoError)?;
        let reader = BufReader::new(file);
        let model = serde_json::from_reader(reader)
            .map_err(|e| SVMError::SerializationError(e.to_string()))?;
        Ok(model)
    }

    /// Rebuild the SVM
    ///
    /// Fails if the stored state could not have come out of training: an
    /// invalid C, label or multiplier, or vectors of mixed representation.
    pub fn to_svm(&self) -> Result<SVM<KernelFunction>> {
        let mut svm = match self.c {
            Some(c) => SVM::new(self.kernel, c)?,
            None => SVM::hard_margin(self.kernel),
        };

        for sv in &self.support_vectors {
            if !sv.alpha.is_finite() || sv.alpha <= 0.0 {
                return Err(SVMError::InvalidParameter(format!(
                    "Support vector multiplier must be positive, got: {}",
                    sv.alpha
                )));
            }
            svm.add(sv.x.clone(), sv.y)?;
            let c = svm.c();
            if let Some(v) = svm.vectors.last_mut() {
                v.set_alpha(sv.alpha, c);
            }
        }
        svm.b = self.bias;

        Ok(svm)
    }

    /// Convert back to a trained model
    pub fn to_trained_model(&self) -> Result<TrainedModel<KernelFunction>> {
        Ok(TrainedModel::new(self.to_svm()?, self.report.clone()))
    }

    /// Print model summary
    pub fn print_summary(&self) {
        println!("=== SVM Model Summary ===");
        println!("Kernel: {}", self.kernel.name());
        if let KernelFunction::Gaussian(gaussian) = &self.kernel {
            println!("  Variance: {}", gaussian.variance());
        }
        match self.c {
            Some(c) => println!("C: {c}"),
            None => println!("C: inf (hard margin)"),
        }
        println!("Support Vectors: {}", self.metadata.n_support_vectors);
        println!("Bias: {:.6}", self.bias);
        println!(
            "Training: {} passes, {} steps, converged: {}",
            self.report.passes, self.report.steps, self.report.converged
        );
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SVMBuilder;
    use crate::core::{SVMModel, Sample};
    use crate::kernel::{GaussianKernel, LinearKernel};
    use crate::vector::BitVector;
    use approx::assert_relative_eq;
    use tempfile::NamedTempFile;

    fn xor_samples() -> Vec<Sample> {
        vec![
            Sample::new(vec![-1.0, -1.0], -1),
            Sample::new(vec![1.0, -1.0], 1),
            Sample::new(vec![-1.0, 1.0], 1),
            Sample::new(vec![1.0, 1.0], -1),
        ]
    }

    #[test]
    fn test_model_serialization() -> Result<()> {
        let samples = xor_samples();
        let model = SVMBuilder::with_kernel(GaussianKernel::unit_variance())
            .with_c(100.0)
            .with_seed(1)
            .train_samples(&samples)?;
        let serializable = SerializableModel::from_trained_model(&model);

        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        serializable.save_to_file(temp_file.path())?;
        let loaded = SerializableModel::load_from_file(temp_file.path())?;

        assert_eq!(loaded.kernel, KernelFunction::Gaussian(GaussianKernel::unit_variance()));
        assert_eq!(loaded.c, Some(100.0));
        assert_eq!(loaded.support_vectors.len(), model.info().n_support_vectors);
        assert_eq!(loaded.report, *model.report());

        let restored = loaded.to_trained_model()?;
        for sample in &samples {
            assert_relative_eq!(
                restored.decision_value(&sample.features)?,
                model.decision_value(&sample.features)?,
                epsilon = 1e-9
            );
        }
        Ok(())
    }

    #[test]
    fn test_hard_margin_serialization() -> Result<()> {
        let samples = vec![Sample::new(vec![1.0], 1), Sample::new(vec![-1.0], -1)];
        let model = SVMBuilder::new().hard_margin().with_seed(1).train_samples(&samples)?;
        let serializable = SerializableModel::from_trained_model(&model);
        assert_eq!(serializable.c, None);
        assert_eq!(serializable.kernel, KernelFunction::Linear);

        let json = serde_json::to_string(&serializable)
            .map_err(|e| SVMError::SerializationError(e.to_string()))?;
        let loaded: SerializableModel = serde_json::from_str(&json)
            .map_err(|e| SVMError::SerializationError(e.to_string()))?;
        let svm = loaded.to_svm()?;
        assert!(svm.c().is_infinite());
        assert_eq!(svm.size(), 2);
        Ok(())
    }

    #[test]
    fn test_bit_vector_model() -> Result<()> {
        let samples = vec![
            Sample::new(BitVector::from_bits(&[true, true, false]), 1),
            Sample::new(BitVector::from_bits(&[false, false, true]), -1),
        ];
        let model = SVMBuilder::with_kernel(LinearKernel::new())
            .with_seed(1)
            .train_samples(&samples)?;
        let svm = SerializableModel::from_trained_model(&model).to_svm()?;
        for sample in &samples {
            assert_eq!(svm.predict(&sample.features)?.label, sample.label);
        }
        Ok(())
    }

    #[test]
    fn test_invalid_model_state() {
        let mut model = SerializableModel {
            kernel: KernelFunction::Linear,
            c: Some(1.0),
            bias: 0.0,
            support_vectors: vec![SerializableSupportVector {
                x: DataVector::from(vec![1.0]),
                y: 1,
                alpha: -0.5,
            }],
            report: TrainingReport {
                passes: 1,
                steps: 1,
                converged: true,
            },
            metadata: ModelMetadata {
                library_version: "0.0.0".to_string(),
                n_support_vectors: 1,
                created_at: String::new(),
            },
        };
        assert!(matches!(model.to_svm(), Err(SVMError::InvalidParameter(_))));

        model.support_vectors[0].alpha = 0.5;
        model.support_vectors[0].y = 3;
        assert!(matches!(model.to_svm(), Err(SVMError::InvalidLabel(3))));

        model.support_vectors[0].y = 1;
        model.c = Some(0.0);
        assert!(matches!(model.to_svm(), Err(SVMError::InvalidParameter(_))));
    }

    #[test]
    fn test_load_rejects_corrupt_vectors_and_kernels() -> Result<()> {
        let samples = vec![
            Sample::new(BitVector::from_bits(&[true, true, false, false]), 1),
            Sample::new(BitVector::from_bits(&[false, false, true, true]), -1),
        ];
        let model = SVMBuilder::with_kernel(GaussianKernel::unit_variance())
            .with_seed(1)
            .train_samples(&samples)?;
        let json = serde_json::to_value(SerializableModel::from_trained_model(&model))
            .map_err(|e| SVMError::SerializationError(e.to_string()))?;

        let load = |value: &serde_json::Value| -> Result<SerializableModel> {
            let temp_file = NamedTempFile::new().expect("Failed to create temp file");
            std::fs::write(temp_file.path(), value.to_string()).map_err(SVMError::IoError)?;
            SerializableModel::load_from_file(temp_file.path())
        };
        assert_eq!(load(&json)?.support_vectors.len(), 2);

        // bits set above the length would corrupt every popcount
        let mut stray_bits = json.clone();
        stray_bits["support_vectors"][0]["x"]["words"] = serde_json::json!([255]);
        assert!(matches!(load(&stray_bits), Err(SVMError::SerializationError(_))));

        let mut short_words = json.clone();
        short_words["support_vectors"][0]["x"]["len"] = serde_json::json!(200);
        assert!(matches!(load(&short_words), Err(SVMError::SerializationError(_))));

        let mut bad_variance = json;
        bad_variance["kernel"]["variance"] = serde_json::json!(-1.0);
        assert!(matches!(load(&bad_variance), Err(SVMError::SerializationError(_))));
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let result = SerializableModel::load_from_file("/non/existent/model.json");
        assert!(matches!(result, Err(SVMError::IoError(_))));
    }

    #[test]
    fn test_load_garbage() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "not json").unwrap();
        let result = SerializableModel::load_from_file(temp_file.path());
        assert!(matches!(result, Err(SVMError::SerializationError(_))));
    }
}
