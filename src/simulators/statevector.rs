//! Statevector simulator
//!
//! This module implements an exact statevector simulator for quantum
//! circuits. Measurement statistics are computed in closed form from the
//! amplitudes; no sampling noise is modeled anywhere in this crate.
use std::collections::HashMap;
use std::fmt;
use num_complex::Complex64;
use ndarray::Array2;

use crate::quantum::circuit::QuantumCircuit;
use crate::quantum::state::StateVector;
use crate::quantum::gate::QuantumGate;

/// A measurement outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Measurement yielded 0
    Zero,
    /// Measurement yielded 1
    One,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Zero => write!(f, "0"),
            Outcome::One => write!(f, "1"),
        }
    }
}

/// An exact statevector simulator for quantum circuits
#[derive(Clone)]
pub struct StatevectorSimulator {
    /// The current state of the simulator
    state: StateVector,
}

impl StatevectorSimulator {
    /// Create a new statevector simulator with the specified number of qubits
    pub fn new(qubit_count: usize) -> Self {
        StatevectorSimulator {
            state: StateVector::zero_state(qubit_count),
        }
    }

    /// Create a simulator from an existing state vector
    pub fn from_state(state: StateVector) -> Self {
        StatevectorSimulator { state }
    }

    /// Get the current state vector
    pub fn state(&self) -> &StateVector {
        &self.state
    }

    /// Reset the simulator to the |0...0⟩ state
    pub fn reset(&mut self) {
        self.state = StateVector::zero_state(self.state.qubit_count());
    }

    /// Get the number of qubits in the simulator
    pub fn qubit_count(&self) -> usize {
        self.state.qubit_count()
    }

    /// Apply a quantum gate to the specified qubits
    pub fn apply_gate(&mut self, gate: &dyn QuantumGate, qubits: &[usize]) -> Result<(), String> {
        let new_state = gate.apply_to_qubits(&self.state, qubits)?;
        self.state = new_state;
        Ok(())
    }

    /// Apply a unitary operator over the full register
    pub fn apply_operator(&mut self, operator: &Array2<Complex64>) -> Result<(), String> {
        let dim = 1 << self.qubit_count();
        if operator.shape() != [dim, dim] {
            return Err(format!(
                "Operator dimension mismatch: expected {}x{}, got {}x{}",
                dim, dim, operator.shape()[0], operator.shape()[1]
            ));
        }

        self.state = self.state.apply_matrix(operator)?;
        Ok(())
    }

    /// Run a quantum circuit, applying its gates in sequence
    pub fn run_circuit(&mut self, circuit: &QuantumCircuit) -> Result<(), String> {
        if circuit.qubit_count > self.qubit_count() {
            return Err(format!(
                "Circuit has {} qubits, but simulator has only {} qubits",
                circuit.qubit_count,
                self.qubit_count()
            ));
        }

        self.state = circuit.apply(&self.state)?;
        Ok(())
    }

    /// Measurement probabilities of a single qubit, without collapsing the state
    pub fn measure_qubit_probability(&self, qubit: usize) -> Result<HashMap<Outcome, f64>, String> {
        if qubit >= self.qubit_count() {
            return Err(format!("Qubit index {} out of range", qubit));
        }

        let mut probabilities = HashMap::new();
        let dim = 1 << self.qubit_count();
        let mut prob_zero = 0.0;
        let mut prob_one = 0.0;

        // Big-endian bit order: qubit 0 is the most significant bit
        for i in 0..dim {
            let bit = (i >> (self.qubit_count() - 1 - qubit)) & 1;
            let prob = self.state.probability(i);

            if bit == 0 {
                prob_zero += prob;
            } else {
                prob_one += prob;
            }
        }

        probabilities.insert(Outcome::Zero, prob_zero);
        probabilities.insert(Outcome::One, prob_one);

        Ok(probabilities)
    }

    /// Exact Pauli-Z expectation value of a single qubit, in [-1, 1]
    pub fn z_expectation(&self, qubit: usize) -> Result<f64, String> {
        let probabilities = self.measure_qubit_probability(qubit)?;
        let prob_zero = probabilities.get(&Outcome::Zero).unwrap_or(&0.0);
        let prob_one = probabilities.get(&Outcome::One).unwrap_or(&0.0);
        Ok(prob_zero - prob_one)
    }

    /// Calculate the expectation value of an observable on a single qubit
    pub fn expectation_value_single_qubit(&self, observable: &Array2<Complex64>, qubit: usize)
                                          -> Result<f64, String> {
        if qubit >= self.qubit_count() {
            return Err(format!("Qubit index {} out of range", qubit));
        }

        if observable.shape() != [2, 2] {
            return Err(format!(
                "Single-qubit observable must be 2x2, got {}x{}",
                observable.shape()[0], observable.shape()[1]
            ));
        }

        // For the Z operator, measurement probabilities give the answer directly
        if self.is_z_operator(observable) {
            return self.z_expectation(qubit);
        }

        // For other observables, expand to full system size and use the general method
        let full_observable = self.expand_single_qubit_observable(observable, qubit)?;
        self.expectation_value(&full_observable)
    }

    // Helper method to check if an observable is the Z operator
    fn is_z_operator(&self, observable: &Array2<Complex64>) -> bool {
        let z00 = Complex64::new(1.0, 0.0);
        let z11 = Complex64::new(-1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);

        (observable[[0, 0]] - z00).norm_sqr() < 1e-10 &&
        (observable[[0, 1]] - zero).norm_sqr() < 1e-10 &&
        (observable[[1, 0]] - zero).norm_sqr() < 1e-10 &&
        (observable[[1, 1]] - z11).norm_sqr() < 1e-10
    }

    // Expand an observable to act on a specified qubit of the full register
    fn expand_single_qubit_observable(&self,
                                      observable: &Array2<Complex64>,
                                      qubit: usize
    ) -> Result<Array2<Complex64>, String> {
        if qubit >= self.qubit_count() {
            return Err(format!("Qubit index {} out of range", qubit));
        }

        let total_qubits = self.qubit_count();
        let dim = 1 << total_qubits;
        let mut result = Array2::zeros((dim, dim));

        // Construct I ⊗ ... ⊗ O ⊗ ... ⊗ I with O at the specified qubit
        for i in 0..dim {
            for j in 0..dim {
                // Check if all bits except the qubit of interest match
                let mut matches = true;
                for q in 0..total_qubits {
                    if q != qubit {
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
                    let shift = total_qubits - 1 - qubit;
                    let bit_i = (i >> shift) & 1;
                    let bit_j = (j >> shift) & 1;

                    result[[i, j]] = observable[[bit_i, bit_j]];
                }
            }
        }

        Ok(result)
    }

    /// Calculate the expectation value ⟨ψ|O|ψ⟩ of a Hermitian observable
    pub fn expectation_value(&self, observable: &Array2<Complex64>) -> Result<f64, String> {
        let dim = 1 << self.qubit_count();
        if observable.shape() != [dim, dim] {
            return Err(format!(
                "Observable dimension mismatch: expected {}x{}, got {}x{}",
                dim, dim, observable.shape()[0], observable.shape()[1]
            ));
        }

        let state_vec = self.state.amplitudes();
        let o_psi = observable.dot(state_vec);

        let mut expectation = Complex64::new(0.0, 0.0);
        for i in 0..dim {
            expectation += state_vec[i].conj() * o_psi[i];
        }

        // The expectation value should be real for a Hermitian observable
        if expectation.im.abs() > 1e-10 {
            return Err(format!(
                "Non-real expectation value: {}. Observable might not be Hermitian.",
                expectation
            ));
        }

        Ok(expectation.re)
    }
}
