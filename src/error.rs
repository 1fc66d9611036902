// src/error.rs
//! Crate-level error type
//!
//! The low-level quantum primitives report errors as strings, matching the
//! simulator internals; everything above that boundary converts into
//! [`QuanvError`] so callers get one error surface for the whole pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the quanvolution pipeline
#[derive(Debug, Error)]
pub enum QuanvError {
    /// Image dimensions violate the transform preconditions
    #[error(
        "invalid image shape {height}x{width}x{channels}: \
         height and width must be even and >= 2, with a single channel"
    )]
    InvalidImageShape {
        height: usize,
        width: usize,
        channels: usize,
    },

    /// A kernel input was NaN or infinite
    #[error("non-finite input value at encoding position {index}")]
    NonFiniteInput { index: usize },

    /// Kernel evaluation failed for a specific patch
    #[error("evaluation failed for patch at ({row}, {col})")]
    Patch {
        row: usize,
        col: usize,
        #[source]
        source: Box<QuanvError>,
    },

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A requested cache blob does not exist
    #[error("cached features not found at {}; set preprocess = true to recompute", path.display())]
    CacheMiss { path: PathBuf },

    /// A cache blob exists but cannot be decoded
    #[error("malformed tensor file {}: {reason}", path.display())]
    MalformedTensorFile { path: PathBuf, reason: String },

    /// Dataset file is not valid IDX data
    #[error("invalid IDX file {}: {reason}", path.display())]
    InvalidIdx { path: PathBuf, reason: String },

    /// Error from the underlying quantum simulation
    #[error("quantum evaluation error: {0}")]
    Quantum(String),

    /// Error from classifier training or prediction
    #[error("model error: {0}")]
    Model(#[from] crate::machine_learning::core::ModelError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
