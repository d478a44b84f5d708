//! XOR demonstrations for both classifiers
//!
//! XOR is the classic problem no linear classifier can solve: a Gaussian
//! SVM and a network with one hidden layer both can.

use crate::ann::NeuralNetwork;
use crate::core::{Result, Sample, SolverConfig, TrainingReport};
use crate::kernel::{GaussianKernel, Kernel};
use crate::solver::SMOSolver;
use crate::svm::SVM;
use crate::vector::DataVector;
use rand::Rng;
use rand_distr::StandardNormal;

/// The four XOR inputs in ±1 encoding with their classes
pub const XOR_POINTS: [([f64; 2], i32); 4] = [
    ([-1.0, -1.0], -1),
    ([1.0, -1.0], 1),
    ([-1.0, 1.0], 1),
    ([1.0, 1.0], -1),
];

/// Soft-margin parameter of the SVM demo
pub const SVM_DEMO_C: f64 = 100.0;

/// `copies` noisy samples of every XOR point, each coordinate perturbed by
/// Gaussian noise with standard deviation 0.5
pub fn noisy_xor<R: Rng>(copies: usize, rng: &mut R) -> Vec<Sample> {
    let mut samples = Vec::with_capacity(4 * copies);
    for (x, y) in XOR_POINTS {
        for _ in 0..copies {
            let noisy: Vec<f64> = x
                .iter()
                .map(|&xi| xi + rng.sample::<f64, _>(StandardNormal) / 2.0)
                .collect();
            samples.push(Sample::new(noisy, y));
        }
    }
    samples
}

/// Result of the SVM demo
#[derive(Debug, Clone)]
pub struct SvmXorDemo {
    pub svm: SVM<GaussianKernel>,
    pub report: TrainingReport,
    /// SVM output at each of the four noiseless XOR points
    pub outputs: Vec<(DataVector, f64)>,
}

/// Train a Gaussian SVM (unit variance, C = 100) on noisy XOR
pub fn svm_xor<R: Rng>(copies: usize, rng: &mut R) -> Result<SvmXorDemo> {
    let mut svm = SVM::new(GaussianKernel::unit_variance(), SVM_DEMO_C)?;
    for sample in noisy_xor(copies, rng) {
        svm.add(sample.features, sample.label)?;
    }

    let report = SMOSolver::new(SolverConfig::default(), rng).train(&mut svm)?;
    svm.prune();

    let outputs = evaluate_corners(&svm)?;
    Ok(SvmXorDemo {
        svm,
        report,
        outputs,
    })
}

fn evaluate_corners<K: Kernel>(svm: &SVM<K>) -> Result<Vec<(DataVector, f64)>> {
    XOR_POINTS
        .iter()
        .map(|(x, _)| {
            let v = DataVector::from(x.to_vec());
            let u = svm.output(&v)?;
            Ok((v, u))
        })
        .collect()
}

/// Result of the network demo
#[derive(Debug, Clone)]
pub struct AnnXorDemo {
    pub network: NeuralNetwork,
    /// Network output for each XOR input (0/1 encoding), before and after
    /// training
    pub untrained: Vec<(Vec<f64>, f64)>,
    pub trained: Vec<(Vec<f64>, f64)>,
}

/// Train a network with the given hidden layers on XOR in 0/1 encoding
pub fn ann_xor<R: Rng>(
    hidden: &[usize],
    iterations: usize,
    eta: f64,
    rng: &mut R,
) -> Result<AnnXorDemo> {
    let inputs = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let outputs = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];

    let mut layers = vec![2];
    layers.extend_from_slice(hidden);
    layers.push(1);
    let mut network = NeuralNetwork::new(&layers, rng)?;

    let untrained = network_outputs(&mut network, &inputs)?;
    network.train(&inputs, &outputs, iterations, eta, rng)?;
    let trained = network_outputs(&mut network, &inputs)?;

    Ok(AnnXorDemo {
        network,
        untrained,
        trained,
    })
}

fn network_outputs(
    network: &mut NeuralNetwork,
    inputs: &[Vec<f64>],
) -> Result<Vec<(Vec<f64>, f64)>> {
    inputs
        .iter()
        .map(|input| {
            let y = network.feed_forward(input)?[0];
            Ok((input.clone(), y))
        })
        .collect()
}
