//! Quanvolutional Image Preprocessing
//!
//! This crate implements a "quanvolution": a fixed, seeded quantum circuit
//! applied as a sliding-window feature extractor over 2x2 image patches,
//! evaluated by exact statevector simulation. The resulting multi-channel
//! feature tensors feed a small dense classifier, so that training on
//! quantum-processed and raw images can be compared side by side.

pub mod config;
pub mod error;
pub mod machine_learning;
pub mod persistence;
pub mod quantum;
pub mod quanv;
pub mod simulators;

// Create a prelude module for convenient imports
pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::error::QuanvError;
    pub use crate::quanv::{CircuitParameters, PatchQuantumTransform, QuanvKernel};
    pub use crate::simulators::StatevectorSimulator;
}

// Version and crate information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
