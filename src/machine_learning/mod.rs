//! Machine learning components
//!
//! A small classical stack: dataset loading, one dense softmax classifier,
//! the loss and optimizers it trains with. The quantum preprocessing feeds
//! this module but never depends on it.

pub mod core;
pub mod loss;
pub mod optimizer;
pub mod dataset;

/// Re-exports of commonly used components
pub mod prelude {
    pub use super::core::{
        argmax, DenseClassifier, Model, ModelError, PredictiveModel, TrainingHistory,
    };
    pub use super::dataset::{flatten_batch, MnistDataset};
    pub use super::loss::{softmax, LossFunction, SoftmaxCrossEntropy};
    pub use super::optimizer::{Adam, GradientDescent, Optimizer};
}
