// src/config.rs
//! Pipeline configuration

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::QuanvError;

/// Configuration of the quanvolution pipeline.
///
/// All randomness in a run derives from `random_seed`; nothing is seeded
/// from the clock, so two runs with the same configuration and dataset are
/// identical.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Depth of the randomized kernel circuit (>= 1)
    pub n_layers: usize,

    /// Number of training images taken from the dataset
    pub n_train: usize,

    /// Number of test images taken from the dataset
    pub n_test: usize,

    /// Number of training epochs for the classifier
    pub n_epochs: usize,

    /// Minibatch size for the classifier
    pub batch_size: usize,

    /// Recompute the quantum features (true) or load them from the cache
    pub preprocess: bool,

    /// Directory holding the feature cache and training histories
    pub save_path: PathBuf,

    /// Directory holding the MNIST IDX files
    pub data_path: PathBuf,

    /// Seed for parameter generation and classifier initialization
    pub random_seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            n_layers: 1,
            n_train: 50,
            n_test: 30,
            n_epochs: 30,
            batch_size: 4,
            preprocess: true,
            save_path: PathBuf::from("quanv_cache"),
            data_path: PathBuf::from("data"),
            random_seed: 0,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file. Missing fields fall back to
    /// their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, QuanvError> {
        let text = fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration invariants.
    pub fn validate(&self) -> Result<(), QuanvError> {
        if self.n_layers == 0 {
            return Err(QuanvError::Config("n_layers must be at least 1".to_string()));
        }
        if self.n_train == 0 || self.n_test == 0 {
            return Err(QuanvError::Config(
                "n_train and n_test must be positive".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(QuanvError::Config("batch_size must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_layers_rejected() {
        let config = PipelineConfig {
            n_layers: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{"n_layers": 2}"#).unwrap();
        assert_eq!(config.n_layers, 2);
        assert_eq!(config.n_train, 50);
        assert!(config.preprocess);
    }
}
