// src/quantum/circuit.rs
//! Quantum circuits as ordered gate sequences

use num_complex::Complex64;
use ndarray::{Array1, Array2};

use crate::quantum::gate::{QuantumGate, StandardGate, ParametrizedGate};
use crate::quantum::state::StateVector;

/// A quantum circuit consisting of a sequence of gates
#[derive(Debug)]
pub struct QuantumCircuit {
    pub gates: Vec<(Box<dyn QuantumGate>, Vec<usize>)>,
    pub qubit_count: usize,
}

impl QuantumCircuit {
    /// Create a new empty quantum circuit
    pub fn new(qubit_count: usize) -> Self {
        QuantumCircuit {
            gates: Vec::new(),
            qubit_count,
        }
    }

    pub fn add_gate(&mut self, gate: Box<dyn QuantumGate>, qubits: &[usize]) -> Result<(), String> {
        // Validate qubit indices
        for &q in qubits {
            if q >= self.qubit_count {
                return Err(format!("Qubit index {} out of range", q));
            }
        }

        // Check gate's qubit count matches the specified qubits
        if gate.qubit_count() != qubits.len() {
            return Err(format!(
                "Gate acts on {} qubits, but {} qubits were specified",
                gate.qubit_count(), qubits.len()
            ));
        }

        self.gates.push((gate, qubits.to_vec()));
        Ok(())
    }

    /// Get the number of gates in the circuit
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Apply the circuit to a quantum state
    pub fn apply(&self, state: &StateVector) -> Result<StateVector, String> {
        if state.qubit_count() < self.qubit_count {
            return Err(format!(
                "State has {} qubits, but circuit requires at least {} qubits",
                state.qubit_count(), self.qubit_count
            ));
        }

        // Apply each gate in sequence
        let mut current_state = state.clone();
        for (gate, qubits) in &self.gates {
            current_state = gate.apply_to_qubits(&current_state, qubits)?;
        }

        Ok(current_state)
    }

    /// Collapse the circuit into a single unitary matrix over the full
    /// register. Gates are composed in application order, so the returned
    /// matrix applied once is equivalent to running the whole circuit.
    pub fn as_single_matrix(&self) -> Result<Array2<Complex64>, String> {
        let dim = 1 << self.qubit_count;
        let mut result = Array2::from_diag(&Array1::from_elem(dim, Complex64::new(1.0, 0.0)));

        for (gate, qubits) in &self.gates {
            let full = gate.embed(self.qubit_count, qubits);
            result = full.dot(&result);
        }

        Ok(result)
    }
}

impl Clone for QuantumCircuit {
    fn clone(&self) -> Self {
        QuantumCircuit {
            gates: self.gates.iter()
                .map(|(gate, qubits)| (gate.clone_box(), qubits.clone()))
                .collect(),
            qubit_count: self.qubit_count,
        }
    }
}

/// A builder for quantum circuits
pub struct CircuitBuilder {
    circuit: QuantumCircuit,
}

impl CircuitBuilder {
    /// Create a new circuit builder
    pub fn new(qubit_count: usize) -> Self {
        CircuitBuilder {
            circuit: QuantumCircuit::new(qubit_count),
        }
    }

    /// Build the quantum circuit
    pub fn build(self) -> QuantumCircuit {
        self.circuit
    }

    /// Internal helper to add a gate
    pub fn add_gate<G: QuantumGate + 'static>(&mut self, gate: G, qubits: &[usize]) -> Result<(), String> {
        self.circuit.add_gate(Box::new(gate), qubits)
    }

    /// Add a Hadamard gate
    pub fn h(&mut self, qubit: usize) -> Result<(), String> {
        self.add_gate(StandardGate::H, &[qubit])
    }

    /// Add a Pauli-X gate
    pub fn x(&mut self, qubit: usize) -> Result<(), String> {
        self.add_gate(StandardGate::X, &[qubit])
    }

    /// Add a Pauli-Z gate
    pub fn z(&mut self, qubit: usize) -> Result<(), String> {
        self.add_gate(StandardGate::Z, &[qubit])
    }

    /// Add a CNOT gate
    pub fn cnot(&mut self, control: usize, target: usize) -> Result<(), String> {
        self.add_gate(StandardGate::CNOT, &[control, target])
    }

    /// Add an Rx gate
    pub fn rx(&mut self, qubit: usize, theta: f64) -> Result<(), String> {
        self.add_gate(ParametrizedGate::Rx(theta), &[qubit])
    }

    /// Add an Ry gate
    pub fn ry(&mut self, qubit: usize, theta: f64) -> Result<(), String> {
        self.add_gate(ParametrizedGate::Ry(theta), &[qubit])
    }

    /// Add an Rz gate
    pub fn rz(&mut self, qubit: usize, theta: f64) -> Result<(), String> {
        self.add_gate(ParametrizedGate::Rz(theta), &[qubit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_single_matrix_matches_sequential_application() {
        let mut builder = CircuitBuilder::new(2);
        builder.h(0).unwrap();
        builder.cnot(0, 1).unwrap();
        let circuit = builder.build();

        let state = StateVector::zero_state(2);
        let sequential = circuit.apply(&state).unwrap();

        let matrix = circuit.as_single_matrix().unwrap();
        let collapsed = state.apply_matrix(&matrix).unwrap();

        for i in 0..4 {
            let diff = sequential.amplitudes()[i] - collapsed.amplitudes()[i];
            assert!(diff.norm() < 1e-10);
        }
    }

    #[test]
    fn test_add_gate_rejects_out_of_range_qubit() {
        let mut circuit = QuantumCircuit::new(2);
        let result = circuit.add_gate(Box::new(StandardGate::X), &[2]);
        assert!(result.is_err());
    }
}
