// src/quanv/params.rs
//! Circuit parameter table
//!
//! The randomized kernel circuit is parametrized by a fixed table of
//! rotation angles, drawn once per run from an explicitly seeded generator
//! and never mutated afterwards. The table is threaded into the kernel as a
//! plain value; nothing in this crate keeps parameter state at module level.

use std::f64::consts::PI;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::QuanvError;
use crate::quanv::WIRES;

/// Fixed rotation-angle table of shape (n_layers, 4), values in [0, 2π)
#[derive(Debug, Clone)]
pub struct CircuitParameters {
    angles: Array2<f64>,
    seed: u64,
}

impl CircuitParameters {
    /// Draw a fresh parameter table from the given seed.
    ///
    /// The same seed always yields the same table; the seed is recorded so
    /// the kernel built from these parameters is reproducible end to end.
    pub fn generate(n_layers: usize, seed: u64) -> Result<Self, QuanvError> {
        if n_layers == 0 {
            return Err(QuanvError::Config(
                "n_layers must be at least 1".to_string(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut angles = Array2::zeros((n_layers, WIRES));
        for value in angles.iter_mut() {
            *value = rng.gen_range(0.0..2.0 * PI);
        }

        Ok(CircuitParameters { angles, seed })
    }

    /// Build a parameter table from explicit angles.
    ///
    /// Used by tests and callers that need a known table, e.g. the all-zero
    /// table whose kernel maps the zero patch to +1 on every channel.
    pub fn from_angles(angles: Array2<f64>, seed: u64) -> Result<Self, QuanvError> {
        if angles.nrows() == 0 {
            return Err(QuanvError::Config(
                "parameter table must have at least one layer".to_string(),
            ));
        }
        if angles.ncols() != WIRES {
            return Err(QuanvError::Config(format!(
                "parameter table must have {} columns, got {}",
                WIRES,
                angles.ncols()
            )));
        }

        Ok(CircuitParameters { angles, seed })
    }

    /// Number of circuit layers
    pub fn n_layers(&self) -> usize {
        self.angles.nrows()
    }

    /// The angle table, shape (n_layers, 4)
    pub fn angles(&self) -> &Array2<f64> {
        &self.angles
    }

    /// Seed the table was drawn from
    pub fn seed(&self) -> u64 {
        self.seed
    }
}
