//! Multi-layer feed-forward artificial neural network
//!
//! Sigmoid units, squared error, trained with stochastic back-propagation.
//! Every layer except the output layer carries a bias unit whose activation
//! is fixed at 1; it is unit 0 of that layer's activation vector.

use crate::core::{Result, SVMError};
use log::info;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Standard deviation of the initial weights
const INITIAL_WEIGHT_SCALE: f64 = 0.1;

/// The logistic function
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Derivative of the sigmoid, expressed in terms of its output
fn sigmoid_derivative(y: f64) -> f64 {
    y * (1.0 - y)
}

/// A feed-forward network of sigmoid units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuralNetwork {
    layer_sizes: Vec<usize>,
    /// `weights[l - 1][j][i]`: from unit `i` of layer `l - 1` (bias first)
    /// to non-bias unit `j` of layer `l`
    weights: Vec<Vec<Vec<f64>>>,
    /// Current activations, bias unit first on every non-output layer
    activations: Vec<Vec<f64>>,
    /// Current deltas of the non-bias units of layers 1..
    deltas: Vec<Vec<f64>>,
}

impl NeuralNetwork {
    /// Create a network with the given number of units per layer, input
    /// layer first and output layer last
    ///
    /// Weights are drawn from N(0, 0.1²).
    pub fn new<R: Rng>(layer_sizes: &[usize], rng: &mut R) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(SVMError::InvalidParameter(format!(
                "A network needs at least an input and an output layer, got {} layers",
                layer_sizes.len()
            )));
        }
        if let Some(layer) = layer_sizes.iter().position(|&size| size == 0) {
            return Err(SVMError::InvalidParameter(format!(
                "Layer {layer} has no units"
            )));
        }

        let output_layer = layer_sizes.len() - 1;
        let activations: Vec<Vec<f64>> = layer_sizes
            .iter()
            .enumerate()
            .map(|(layer, &size)| {
                if layer == output_layer {
                    vec![0.0; size]
                } else {
                    let mut units = vec![0.0; size + 1];
                    units[0] = 1.0; // bias unit
                    units
                }
            })
            .collect();

        let weights: Vec<Vec<Vec<f64>>> = layer_sizes
            .windows(2)
            .map(|pair| {
                (0..pair[1])
                    .map(|_| {
                        (0..=pair[0])
                            .map(|_| rng.sample::<f64, _>(StandardNormal) * INITIAL_WEIGHT_SCALE)
                            .collect()
                    })
                    .collect()
            })
            .collect();

        let deltas = layer_sizes[1..].iter().map(|&size| vec![0.0; size]).collect();

        Ok(Self {
            layer_sizes: layer_sizes.to_vec(),
            weights,
            activations,
            deltas,
        })
    }

    /// Number of units per layer, excluding bias units
    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    pub fn num_layers(&self) -> usize {
        self.layer_sizes.len()
    }

    fn output_layer(&self) -> usize {
        self.layer_sizes.len() - 1
    }

    /// Index of the first non-bias unit in the activation vector of `layer`
    fn first_unit(&self, layer: usize) -> usize {
        if layer == self.output_layer() {
            0
        } else {
            1
        }
    }

    /// Update the activations of every unit and return the output layer
    pub fn feed_forward(&mut self, input: &[f64]) -> Result<&[f64]> {
        if input.len() != self.layer_sizes[0] {
            return Err(SVMError::DimensionMismatch {
                expected: self.layer_sizes[0],
                actual: input.len(),
            });
        }
        self.activations[0][1..].copy_from_slice(input);

        for layer in 1..self.num_layers() {
            let first = self.first_unit(layer);
            let (previous, current) = self.activations.split_at_mut(layer);
            let inputs = &previous[layer - 1];
            for (j, incoming) in self.weights[layer - 1].iter().enumerate() {
                let x: f64 = incoming.iter().zip(inputs).map(|(w, y)| w * y).sum();
                current[0][first + j] = sigmoid(x);
            }
        }

        Ok(&self.activations[self.output_layer()])
    }

    /// Perform a single iteration of back-propagation towards `target`
    ///
    /// Uses the activations left by the last [`feed_forward`](Self::feed_forward).
    pub fn back_prop(&mut self, target: &[f64], eta: f64) -> Result<()> {
        let output_layer = self.output_layer();
        if target.len() != self.layer_sizes[output_layer] {
            return Err(SVMError::DimensionMismatch {
                expected: self.layer_sizes[output_layer],
                actual: target.len(),
            });
        }

        // error of the output units
        for (k, (delta, y)) in self.deltas[output_layer - 1]
            .iter_mut()
            .zip(&self.activations[output_layer])
            .enumerate()
        {
            *delta = (y - target[k]) * sigmoid_derivative(*y);
        }

        // propagate to the hidden units
        for layer in (1..output_layer).rev() {
            let (lower, upper) = self.deltas.split_at_mut(layer);
            let next_deltas = &upper[0];
            let next_weights = &self.weights[layer];
            for (j, delta) in lower[layer - 1].iter_mut().enumerate() {
                let sum: f64 = next_weights
                    .iter()
                    .zip(next_deltas)
                    .map(|(incoming, d)| incoming[j + 1] * d)
                    .sum();
                *delta = sigmoid_derivative(self.activations[layer][j + 1]) * sum;
            }
        }

        // gradient descent
        for layer in 1..=output_layer {
            let inputs = &self.activations[layer - 1];
            for (incoming, delta) in self.weights[layer - 1]
                .iter_mut()
                .zip(&self.deltas[layer - 1])
            {
                for (w, y) in incoming.iter_mut().zip(inputs) {
                    *w -= eta * delta * y;
                }
            }
        }

        Ok(())
    }

    /// Train with stochastic back-propagation: each iteration feeds one
    /// randomly chosen sample forward and back-propagates its error
    pub fn train<R: Rng>(
        &mut self,
        inputs: &[Vec<f64>],
        outputs: &[Vec<f64>],
        iterations: usize,
        eta: f64,
        rng: &mut R,
    ) -> Result<()> {
        if inputs.is_empty() {
            return Err(SVMError::EmptyDataset);
        }
        if inputs.len() != outputs.len() {
            return Err(SVMError::InvalidDataset(format!(
                "{} inputs but {} outputs",
                inputs.len(),
                outputs.len()
            )));
        }

        info!(
            "Training {:?} network for {iterations} iterations (eta = {eta})",
            self.layer_sizes
        );
        for _ in 0..iterations {
            let sample = rng.gen_range(0..inputs.len());
            self.feed_forward(&inputs[sample])?;
            self.back_prop(&outputs[sample], eta)?;
        }
        Ok(())
    }

    /// Activations of the non-bias units in `layer`
    pub fn activations(&self, layer: usize) -> Option<&[f64]> {
        let units = self.activations.get(layer)?;
        Some(&units[self.first_unit(layer)..])
    }

    /// Weights of the connections into non-bias unit `unit` of `layer`,
    /// starting with the bias weight
    pub fn weights(&self, layer: usize, unit: usize) -> Option<&[f64]> {
        let incoming = self.weights.get(layer.checked_sub(1)?)?.get(unit)?;
        Some(incoming)
    }
}
