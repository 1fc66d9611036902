//! Quanvolution pipeline driver
//!
//! Loads MNIST, runs the quantum convolution over the train and test
//! subsets (or reloads cached features), then trains the same dense
//! classifier on quantum features and on raw images so the two training
//! histories can be compared. Histories are written as JSON next to the
//! feature cache.

use std::env;
use std::fs;

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, Level};

use quanvolve::config::PipelineConfig;
use quanvolve::error::QuanvError;
use quanvolve::machine_learning::prelude::*;
use quanvolve::persistence::FeatureCache;
use quanvolve::quanv::{CircuitParameters, PatchQuantumTransform, QuanvKernel};

const TRAIN_FEATURES: &str = "q_train_images";
const TEST_FEATURES: &str = "q_test_images";

fn main() -> Result<(), QuanvError> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let config = match env::args().nth(1) {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    config.validate()?;

    info!(
        n_layers = config.n_layers,
        n_train = config.n_train,
        n_test = config.n_test,
        seed = config.random_seed,
        "starting quanvolution pipeline"
    );

    let train = MnistDataset::from_idx(
        config.data_path.join("train-images-idx3-ubyte"),
        config.data_path.join("train-labels-idx1-ubyte"),
    )?
    .take(config.n_train)?;

    let test = MnistDataset::from_idx(
        config.data_path.join("t10k-images-idx3-ubyte"),
        config.data_path.join("t10k-labels-idx1-ubyte"),
    )?
    .take(config.n_test)?;

    let cache = FeatureCache::new(&config.save_path)?;

    if config.preprocess {
        let params = CircuitParameters::generate(config.n_layers, config.random_seed)?;
        let transform = PatchQuantumTransform::new(QuanvKernel::new(params)?);

        info!("quantum pre-processing of train images");
        let q_train = transform.transform_batch(&train.images)?;

        info!("quantum pre-processing of test images");
        let q_test = transform.transform_batch(&test.images)?;

        cache.save(TRAIN_FEATURES, &q_train)?;
        cache.save(TEST_FEATURES, &q_test)?;
    }

    // Both branches read back from the cache, so a cached run and a fresh
    // run train on identical bytes
    let q_train_images = cache.load(TRAIN_FEATURES)?;
    let q_test_images = cache.load(TEST_FEATURES)?;

    info!("training on quantum features");
    let q_history = train_classifier(
        &config,
        &flatten_batch(&q_train_images),
        &train.labels,
        &flatten_batch(&q_test_images),
        &test.labels,
    )?;

    info!("training on raw images");
    let c_history = train_classifier(
        &config,
        &flatten_batch(&train.images),
        &train.labels,
        &flatten_batch(&test.images),
        &test.labels,
    )?;

    fs::write(
        config.save_path.join("q_history.json"),
        serde_json::to_string_pretty(&q_history)?,
    )?;
    fs::write(
        config.save_path.join("c_history.json"),
        serde_json::to_string_pretty(&c_history)?,
    )?;

    info!(
        with_quantum = q_history.val_accuracy.last().copied().unwrap_or(0.0),
        without_quantum = c_history.val_accuracy.last().copied().unwrap_or(0.0),
        "final validation accuracy"
    );

    Ok(())
}

fn train_classifier(
    config: &PipelineConfig,
    inputs: &Array2<f64>,
    labels: &Array1<u8>,
    val_inputs: &Array2<f64>,
    val_labels: &Array1<u8>,
) -> Result<TrainingHistory, QuanvError> {
    let mut rng = StdRng::seed_from_u64(config.random_seed);
    let mut model = DenseClassifier::new(inputs.ncols(), 10, &mut rng);
    let optimizer = Adam::default();

    let history = model.fit(
        (inputs, labels),
        (val_inputs, val_labels),
        &optimizer,
        &SoftmaxCrossEntropy,
        config.n_epochs,
        config.batch_size,
        &mut rng,
    )?;

    Ok(history)
}
