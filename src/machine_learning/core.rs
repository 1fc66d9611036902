//! Core traits and types for machine learning models

use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::machine_learning::loss::{softmax, LossFunction};
use crate::machine_learning::optimizer::Optimizer;

/// Errors that can occur in machine learning models
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// Dimensionality mismatch in input or output data
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A class label outside the model's output range
    #[error("Label {label} out of range for {classes} classes")]
    InvalidLabel { label: u8, classes: usize },
}

/// Base trait for all machine learning models
pub trait Model {
    /// Type of input data
    type Input;

    /// Type of output predictions
    type Output;

    /// Returns the number of trainable parameters in the model
    fn parameter_count(&self) -> usize;

    /// Gets the current model parameters
    fn get_parameters(&self) -> Vec<f64>;

    /// Sets the model parameters
    fn set_parameters(&mut self, parameters: &[f64]) -> Result<(), ModelError>;

    /// Returns the input and output dimensions
    fn dimensions(&self) -> (usize, usize);
}

/// Trait for models that can make predictions
pub trait PredictiveModel: Model {
    /// Make a prediction for a single input
    fn predict(&self, input: &Self::Input) -> Result<Self::Output, ModelError>;

    /// Make predictions for a batch of inputs
    fn predict_batch(&self, inputs: &[Self::Input]) -> Result<Vec<Self::Output>, ModelError> {
        inputs.iter().map(|input| self.predict(input)).collect()
    }
}

/// Per-epoch metrics recorded while fitting a model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub loss: Vec<f64>,
    pub accuracy: Vec<f64>,
    pub val_loss: Vec<f64>,
    pub val_accuracy: Vec<f64>,
}

/// Index of the largest probability
pub fn argmax(probs: &Array1<f64>) -> usize {
    let mut best = 0;
    for (i, &p) in probs.iter().enumerate() {
        if p > probs[best] {
            best = i;
        }
    }
    best
}

fn one_hot(label: u8, classes: usize) -> Result<Array1<f64>, ModelError> {
    let index = label as usize;
    if index >= classes {
        return Err(ModelError::InvalidLabel { label, classes });
    }

    let mut target = Array1::zeros(classes);
    target[index] = 1.0;
    Ok(target)
}

/// A single dense layer with softmax output.
///
/// Flattened inputs map to one logit per class; predictions are softmax
/// probabilities. This is the classifier trained on both raw images and
/// quanvolution features.
#[derive(Clone)]
pub struct DenseClassifier {
    input_dim: usize,
    output_dim: usize,
    weight: Array2<f64>,
    bias: Array1<f64>,
}

impl DenseClassifier {
    /// Creates a classifier with weights drawn from the given generator.
    ///
    /// Weights are uniform in [-1/sqrt(input_dim), 1/sqrt(input_dim)],
    /// biases start at zero. Initialization draws from the injected
    /// generator only, so a run's seed fixes the model.
    pub fn new(input_dim: usize, output_dim: usize, rng: &mut StdRng) -> Self {
        let weight_scale = 1.0 / (input_dim as f64).sqrt();
        let mut weight = Array2::zeros((output_dim, input_dim));

        for value in weight.iter_mut() {
            *value = (2.0 * rng.gen::<f64>() - 1.0) * weight_scale;
        }

        DenseClassifier {
            input_dim,
            output_dim,
            weight,
            bias: Array1::zeros(output_dim),
        }
    }

    /// Raw class scores Wx + b
    fn logits(&self, input: &ArrayView1<f64>) -> Result<Array1<f64>, ModelError> {
        if input.len() != self.input_dim {
            return Err(ModelError::DimensionMismatch(
                format!("Expected input dim {}, got {}", self.input_dim, input.len())
            ));
        }

        Ok(self.weight.dot(input) + &self.bias)
    }

    /// Mean loss and accuracy over a labeled set
    pub fn evaluate<L>(
        &self,
        inputs: &Array2<f64>,
        labels: &Array1<u8>,
        loss_fn: &L,
    ) -> Result<(f64, f64), ModelError>
    where
        L: LossFunction<Input = Array1<f64>>,
    {
        if inputs.nrows() != labels.len() {
            return Err(ModelError::DimensionMismatch(
                format!("{} inputs but {} labels", inputs.nrows(), labels.len())
            ));
        }

        let mut total_loss = 0.0;
        let mut correct = 0;

        for (input, &label) in inputs.outer_iter().zip(labels.iter()) {
            let logits = self.logits(&input)?;
            let target = one_hot(label, self.output_dim)?;

            total_loss += loss_fn.calculate_loss(&logits, &target);
            if argmax(&softmax(&logits)) == label as usize {
                correct += 1;
            }
        }

        let n = labels.len() as f64;
        Ok((total_loss / n, correct as f64 / n))
    }

    /// Train with minibatch gradient descent, recording per-epoch metrics
    /// on the training and validation sets.
    pub fn fit<L, O>(
        &mut self,
        train: (&Array2<f64>, &Array1<u8>),
        validation: (&Array2<f64>, &Array1<u8>),
        optimizer: &O,
        loss_fn: &L,
        n_epochs: usize,
        batch_size: usize,
        rng: &mut StdRng,
    ) -> Result<TrainingHistory, ModelError>
    where
        L: LossFunction<Input = Array1<f64>>,
        O: Optimizer + ?Sized,
    {
        let (train_inputs, train_labels) = train;
        let (val_inputs, val_labels) = validation;

        if train_inputs.nrows() != train_labels.len() {
            return Err(ModelError::DimensionMismatch(
                format!("{} inputs but {} labels", train_inputs.nrows(), train_labels.len())
            ));
        }
        if batch_size == 0 {
            return Err(ModelError::DimensionMismatch(
                "batch size must be positive".to_string()
            ));
        }

        let mut history = TrainingHistory::default();
        let mut indices: Vec<usize> = (0..train_inputs.nrows()).collect();

        for _epoch in 0..n_epochs {
            indices.shuffle(rng);

            for batch in indices.chunks(batch_size) {
                let mut grad_weight = Array2::zeros((self.output_dim, self.input_dim));
                let mut grad_bias = Array1::zeros(self.output_dim);

                for &idx in batch {
                    let input = train_inputs.row(idx);
                    let logits = self.logits(&input)?;
                    let target = one_hot(train_labels[idx], self.output_dim)?;

                    // Gradient of the loss with respect to the logits;
                    // for softmax cross-entropy this is probs - target
                    let grad_logits = loss_fn.calculate_gradients(&logits, &target);

                    for (row, &g) in grad_logits.iter().enumerate() {
                        grad_bias[row] += g;
                        for (col, &x) in input.iter().enumerate() {
                            grad_weight[[row, col]] += g * x;
                        }
                    }
                }

                let scale = 1.0 / batch.len() as f64;
                grad_weight *= scale;
                grad_bias *= scale;

                // Flatten through the Model parameter plumbing so any
                // optimizer can consume the update
                let mut parameters = self.get_parameters();
                let gradients: Vec<f64> = grad_weight
                    .iter()
                    .chain(grad_bias.iter())
                    .copied()
                    .collect();

                optimizer.update(&mut parameters, &gradients);
                self.set_parameters(&parameters)?;
            }

            let (train_loss, train_accuracy) =
                self.evaluate(train_inputs, train_labels, loss_fn)?;
            let (val_loss, val_accuracy) = self.evaluate(val_inputs, val_labels, loss_fn)?;

            history.loss.push(train_loss);
            history.accuracy.push(train_accuracy);
            history.val_loss.push(val_loss);
            history.val_accuracy.push(val_accuracy);
        }

        Ok(history)
    }
}

impl Model for DenseClassifier {
    type Input = Array1<f64>;
    type Output = Array1<f64>;

    fn parameter_count(&self) -> usize {
        self.output_dim * self.input_dim + self.output_dim
    }

    fn get_parameters(&self) -> Vec<f64> {
        self.weight
            .iter()
            .chain(self.bias.iter())
            .copied()
            .collect()
    }

    fn set_parameters(&mut self, parameters: &[f64]) -> Result<(), ModelError> {
        if parameters.len() != self.parameter_count() {
            return Err(ModelError::DimensionMismatch(
                format!("Expected {} parameters, got {}", self.parameter_count(), parameters.len())
            ));
        }

        let mut param_idx = 0;

        for row in 0..self.output_dim {
            for col in 0..self.input_dim {
                self.weight[[row, col]] = parameters[param_idx];
                param_idx += 1;
            }
        }

        for row in 0..self.output_dim {
            self.bias[row] = parameters[param_idx];
            param_idx += 1;
        }

        Ok(())
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.input_dim, self.output_dim)
    }
}

impl PredictiveModel for DenseClassifier {
    fn predict(&self, input: &Self::Input) -> Result<Self::Output, ModelError> {
        let logits = self.logits(&input.view())?;
        Ok(softmax(&logits))
    }
}
