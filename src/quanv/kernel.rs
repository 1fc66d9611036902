// src/quanv/kernel.rs
//! The quantum convolution kernel
//!
//! A fixed 4-qubit circuit evaluated in closed form. Each evaluation encodes
//! four scalars as Ry rotations on the ground state, applies a randomized
//! layered circuit whose structure and angles are fixed at construction, and
//! reads out one exact Pauli-Z expectation value per qubit.

use std::f64::consts::PI;
use num_complex::Complex64;
use ndarray::{array, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::QuanvError;
use crate::quantum::circuit::CircuitBuilder;
use crate::quantum::state::StateVector;
use crate::quanv::params::CircuitParameters;
use crate::quanv::WIRES;
use crate::simulators::StatevectorSimulator;

/// Seed for the randomized gate layout, independent of the angle seed so
/// the same layout is kept while parameter tables vary.
const DEFAULT_LAYOUT_SEED: u64 = 42;

/// Probability of inserting an entangling CNOT before each rotation
const RATIO_IMPRIMITIVE: f64 = 0.3;

/// Deterministic evaluator mapping 4 real inputs to 4 expectation values
#[derive(Clone)]
pub struct QuanvKernel {
    params: CircuitParameters,
    /// Unitary of the randomized layer circuit over the full register,
    /// composed once at construction
    layer_unitary: Array2<Complex64>,
}

impl QuanvKernel {
    /// Build a kernel from a parameter table, using the default gate layout
    pub fn new(params: CircuitParameters) -> Result<Self, QuanvError> {
        Self::with_layout_seed(params, DEFAULT_LAYOUT_SEED)
    }

    /// Build a kernel with an explicit layout seed.
    ///
    /// The layout seed fixes which wires the rotations land on, their axes,
    /// and where entangling gates are inserted; the parameter table fixes
    /// the rotation angles. Together they fully determine the kernel.
    pub fn with_layout_seed(params: CircuitParameters, layout_seed: u64) -> Result<Self, QuanvError> {
        let mut rng = StdRng::seed_from_u64(layout_seed);
        let mut builder = CircuitBuilder::new(WIRES);

        for layer in params.angles().outer_iter() {
            let mut next = 0;
            while next < layer.len() {
                if rng.gen_bool(RATIO_IMPRIMITIVE) {
                    // Entangling gate on a random ordered pair of wires
                    let control = rng.gen_range(0..WIRES);
                    let mut target = rng.gen_range(0..WIRES - 1);
                    if target >= control {
                        target += 1;
                    }
                    builder.cnot(control, target).map_err(QuanvError::Quantum)?;
                } else {
                    // Rotation consuming the next angle of this layer
                    let angle = layer[next];
                    let wire = rng.gen_range(0..WIRES);
                    match rng.gen_range(0..3) {
                        0 => builder.rx(wire, angle).map_err(QuanvError::Quantum)?,
                        1 => builder.ry(wire, angle).map_err(QuanvError::Quantum)?,
                        _ => builder.rz(wire, angle).map_err(QuanvError::Quantum)?,
                    }
                    next += 1;
                }
            }
        }

        let layer_unitary = builder
            .build()
            .as_single_matrix()
            .map_err(QuanvError::Quantum)?;

        Ok(QuanvKernel {
            params,
            layer_unitary,
        })
    }

    /// The parameter table this kernel was built from
    pub fn params(&self) -> &CircuitParameters {
        &self.params
    }

    /// Number of qubits, equal to the input and output arity
    pub fn qubit_count(&self) -> usize {
        WIRES
    }

    /// Evaluate the kernel on four input scalars.
    ///
    /// Input j is encoded as Ry(π·phi[j]) on qubit j; the returned values
    /// are the Pauli-Z expectations of qubits 0..3, each in [-1, 1]. The
    /// evaluation is a pure function: identical inputs yield bit-identical
    /// outputs.
    pub fn evaluate(&self, phi: &[f64; WIRES]) -> Result<[f64; WIRES], QuanvError> {
        for (index, value) in phi.iter().enumerate() {
            if !value.is_finite() {
                return Err(QuanvError::NonFiniteInput { index });
            }
        }

        // Product state of the encoded qubits, wire 0 leftmost
        let mut state = Self::encoded_qubit(phi[0])?;
        for &value in &phi[1..] {
            state = state.tensor(&Self::encoded_qubit(value)?);
        }

        let mut simulator = StatevectorSimulator::from_state(state);
        simulator
            .apply_operator(&self.layer_unitary)
            .map_err(QuanvError::Quantum)?;

        let mut out = [0.0; WIRES];
        for (wire, slot) in out.iter_mut().enumerate() {
            *slot = simulator.z_expectation(wire).map_err(QuanvError::Quantum)?;
        }

        Ok(out)
    }

    /// Single qubit state Ry(π·value)|0⟩ = cos(π·value/2)|0⟩ + sin(π·value/2)|1⟩
    fn encoded_qubit(value: f64) -> Result<StateVector, QuanvError> {
        let theta = PI * value;
        let amplitudes = array![
            Complex64::new((theta / 2.0).cos(), 0.0),
            Complex64::new((theta / 2.0).sin(), 0.0),
        ];

        StateVector::new(1, amplitudes).map_err(QuanvError::Quantum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_zero_parameters_zero_input_gives_plus_one() {
        // Identity evolution on the ground state: every Z expectation is +1
        let params = CircuitParameters::from_angles(Array2::zeros((1, WIRES)), 0).unwrap();
        let kernel = QuanvKernel::new(params).unwrap();

        let out = kernel.evaluate(&[0.0; WIRES]).unwrap();
        for &value in &out {
            assert!((value - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let params = CircuitParameters::generate(2, 7).unwrap();
        let kernel = QuanvKernel::new(params).unwrap();

        let phi = [0.1, 0.4, 0.7, 0.9];
        let a = kernel.evaluate(&phi).unwrap();
        let b = kernel.evaluate(&phi).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_outputs_bounded() {
        let params = CircuitParameters::generate(3, 11).unwrap();
        let kernel = QuanvKernel::new(params).unwrap();

        // The encoding tolerates inputs outside [0, 1]
        let out = kernel.evaluate(&[-2.5, 0.0, 0.5, 13.0]).unwrap();
        for &value in &out {
            assert!((-1.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_nan_input_rejected() {
        let params = CircuitParameters::generate(1, 0).unwrap();
        let kernel = QuanvKernel::new(params).unwrap();

        let result = kernel.evaluate(&[0.0, f64::NAN, 0.0, 0.0]);
        assert!(matches!(result, Err(QuanvError::NonFiniteInput { index: 1 })));
    }

    #[test]
    fn test_same_seed_same_kernel() {
        let phi = [0.3, 0.6, 0.2, 0.8];

        let a = QuanvKernel::new(CircuitParameters::generate(2, 5).unwrap()).unwrap();
        let b = QuanvKernel::new(CircuitParameters::generate(2, 5).unwrap()).unwrap();
        assert_eq!(a.evaluate(&phi).unwrap(), b.evaluate(&phi).unwrap());
    }
}
