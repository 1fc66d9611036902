// src/quantum/gate.rs
//! Quantum gates
//!
//! This module defines the gate trait together with the standard and
//! parametrized gates used by the quanvolution circuit. Gates are specified
//! by their matrix on the qubits they act on; embedding into a larger
//! register happens when a gate is applied to specific wires.

use std::fmt::Debug;
use num_complex::Complex64;
use ndarray::{array, Array1, Array2};

use super::state::StateVector;

/// Common complex numbers used in quantum gates
pub mod constants {
    use num_complex::Complex64;

    /// The imaginary unit i
    pub const I: Complex64 = Complex64::new(0.0, 1.0);

    /// 1/sqrt(2)
    pub const FRAC_1_SQRT_2: f64 = 0.7071067811865475;
}

/// Trait for quantum gates
pub trait QuantumGate: Debug + Send + Sync {
    /// Returns the number of qubits this gate acts on
    fn qubit_count(&self) -> usize;

    /// Returns the matrix representation of this gate
    fn matrix(&self) -> Array2<Complex64>;

    /// Returns a display name for this gate
    fn name(&self) -> String;

    /// Create a clone of this gate
    fn clone_box(&self) -> Box<dyn QuantumGate>;

    /// Apply this gate to specific qubits in a state
    fn apply_to_qubits(
        &self,
        state: &StateVector,
        qubits: &[usize]
    ) -> Result<StateVector, String> {
        if qubits.len() != self.qubit_count() {
            return Err(format!(
                "Gate acts on {} qubits, but {} target qubits were specified",
                self.qubit_count(), qubits.len()
            ));
        }

        for &q in qubits {
            if q >= state.qubit_count() {
                return Err(format!("Qubit index {} out of range", q));
            }
        }

        let full_matrix = self.embed(state.qubit_count(), qubits);
        state.apply_matrix(&full_matrix)
    }

    /// Expand the gate matrix to the full register, acting as the identity
    /// on every qubit outside `target_qubits`. Qubit 0 is the most
    /// significant bit of a basis-state index (big-endian).
    fn embed(
        &self,
        total_qubits: usize,
        target_qubits: &[usize]
    ) -> Array2<Complex64> {
        let gate_matrix = self.matrix();
        let dim = 1 << total_qubits;
        let mut result = Array2::zeros((dim, dim));

        // Single-qubit gate on a single-qubit register needs no embedding
        if total_qubits == 1 && target_qubits.len() == 1 && target_qubits[0] == 0 {
            return gate_matrix;
        }

        // Sort target_qubits to ensure consistent ordering
        let mut sorted_targets = target_qubits.to_vec();
        sorted_targets.sort();

        for i in 0..dim {
            for j in 0..dim {
                let mut matches = true;
                // Check that non-target bits match
                for q in 0..total_qubits {
                    if !sorted_targets.contains(&q) {
                        let shift = total_qubits - 1 - q;
                        let bit_i = (i >> shift) & 1;
                        let bit_j = (j >> shift) & 1;
                        if bit_i != bit_j {
                            matches = false;
                            break;
                        }
                    }
                }

                if matches {
                    // Extract the target qubits into a smaller index
                    let num_target = sorted_targets.len();
                    let mut sub_i = 0;
                    let mut sub_j = 0;

                    for (k, &q) in sorted_targets.iter().enumerate() {
                        let shift_full = total_qubits - 1 - q;
                        let bit_i = (i >> shift_full) & 1;
                        let bit_j = (j >> shift_full) & 1;
                        sub_i |= bit_i << ((num_target - 1) - k);
                        sub_j |= bit_j << ((num_target - 1) - k);
                    }

                    result[[i, j]] = gate_matrix[[sub_i, sub_j]];
                }
            }
        }

        result
    }
}

impl Clone for Box<dyn QuantumGate> {
    fn clone(&self) -> Box<dyn QuantumGate> {
        self.clone_box()
    }
}

/// Standard quantum gates (Pauli, Hadamard, CNOT)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StandardGate {
    /// Identity gate
    I(usize), // number of qubits

    /// Pauli-X gate (NOT gate)
    X,

    /// Pauli-Z gate
    Z,

    /// Hadamard gate
    H,

    /// CNOT gate
    CNOT,
}

impl QuantumGate for StandardGate {
    fn qubit_count(&self) -> usize {
        match self {
            StandardGate::I(n) => *n,
            StandardGate::X | StandardGate::Z | StandardGate::H => 1,
            StandardGate::CNOT => 2,
        }
    }

    fn matrix(&self) -> Array2<Complex64> {
        use constants::*;
        match self {
            StandardGate::I(n) => {
                let dim = 1 << n;
                Array2::from_diag(&Array1::from_elem(dim, Complex64::new(1.0, 0.0)))
            },
            StandardGate::X => {
                array![
                    [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
                    [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)]
                ]
            },
            StandardGate::Z => {
                array![
                    [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
                    [Complex64::new(0.0, 0.0), Complex64::new(-1.0, 0.0)]
                ]
            },
            StandardGate::H => {
                let factor = Complex64::new(FRAC_1_SQRT_2, 0.0);
                array![
                    [factor, factor],
                    [factor, -factor]
                ]
            },
            StandardGate::CNOT => {
                array![
                    [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0), Complex64::new(0.0, 0.0), Complex64::new(0.0, 0.0)],
                    [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0), Complex64::new(0.0, 0.0)],
                    [Complex64::new(0.0, 0.0), Complex64::new(0.0, 0.0), Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
                    [Complex64::new(0.0, 0.0), Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)]
                ]
            },
        }
    }

    fn name(&self) -> String {
        match self {
            StandardGate::I(n) => format!("I({})", n),
            StandardGate::X => "X".to_string(),
            StandardGate::Z => "Z".to_string(),
            StandardGate::H => "H".to_string(),
            StandardGate::CNOT => "CNOT".to_string(),
        }
    }

    fn clone_box(&self) -> Box<dyn QuantumGate> {
        Box::new(self.clone())
    }
}

/// Parametrized rotation gates
#[derive(Clone, Debug)]
pub enum ParametrizedGate {
    /// Rotation around X-axis
    Rx(f64),

    /// Rotation around Y-axis
    Ry(f64),

    /// Rotation around Z-axis
    Rz(f64),
}

impl QuantumGate for ParametrizedGate {
    fn qubit_count(&self) -> usize {
        1
    }

    fn matrix(&self) -> Array2<Complex64> {
        match self {
            ParametrizedGate::Rx(theta) => {
                let cos = (theta / 2.0).cos();
                let sin = (theta / 2.0).sin();
                array![
                    [Complex64::new(cos, 0.0), Complex64::new(0.0, -sin)],
                    [Complex64::new(0.0, -sin), Complex64::new(cos, 0.0)]
                ]
            },
            ParametrizedGate::Ry(theta) => {
                let cos = (theta / 2.0).cos();
                let sin = (theta / 2.0).sin();
                array![
                    [Complex64::new(cos, 0.0), Complex64::new(-sin, 0.0)],
                    [Complex64::new(sin, 0.0), Complex64::new(cos, 0.0)]
                ]
            },
            ParametrizedGate::Rz(theta) => {
                let phase_pos = Complex64::new(0.0, theta / 2.0).exp();
                let phase_neg = Complex64::new(0.0, -theta / 2.0).exp();
                array![
                    [phase_neg, Complex64::new(0.0, 0.0)],
                    [Complex64::new(0.0, 0.0), phase_pos]
                ]
            },
        }
    }

    fn name(&self) -> String {
        match self {
            ParametrizedGate::Rx(theta) => format!("Rx({:.2})", theta),
            ParametrizedGate::Ry(theta) => format!("Ry({:.2})", theta),
            ParametrizedGate::Rz(theta) => format!("Rz({:.2})", theta),
        }
    }

    fn clone_box(&self) -> Box<dyn QuantumGate> {
        Box::new(self.clone())
    }
}
