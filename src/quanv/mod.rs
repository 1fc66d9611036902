// src/quanv/mod.rs
//! Quanvolution: a fixed quantum circuit as a convolution kernel
//!
//! A small quantum circuit plays the role of a convolution kernel: each
//! non-overlapping 2x2 patch of an input image is encoded into a 4-qubit
//! register, pushed through a fixed randomized circuit, and read out as 4
//! Pauli-Z expectation values that become the channels of one output pixel.
//! The circuit parameters are drawn once from a seeded generator and shared
//! read-only by every evaluation, so the whole transform is a pure function
//! of the image and the parameters.

pub mod params;
pub mod kernel;
pub mod transform;

pub use params::CircuitParameters;
pub use kernel::QuanvKernel;
pub use transform::{PatchQuantumTransform, patch_origins};

/// Number of qubits in the kernel register, equal to the pixels per patch
/// and to the output channel count.
pub const WIRES: usize = 4;

/// Side length of the square image patch fed into the kernel.
pub const PATCH_SIZE: usize = 2;
