// src/quantum/state.rs
//! Quantum state representation
//!
//! This module defines the statevector representation used by the
//! quanvolution kernel and the simulator.

use std::fmt::{self, Display};
use num_complex::Complex64;
use ndarray::{Array1, Array2};

/// State vector representation of a multi-qubit quantum state
#[derive(Clone, Debug)]
pub struct StateVector {
    /// Number of qubits
    qubit_count: usize,

    /// The state vector as an array of complex amplitudes
    amplitudes: Array1<Complex64>,
}

impl StateVector {
    /// Create a new state vector with the given amplitudes
    pub fn new(qubit_count: usize, amplitudes: Array1<Complex64>) -> Result<Self, String> {
        let expected_dim = 1 << qubit_count;

        if amplitudes.len() != expected_dim {
            return Err(format!(
                "State vector dimension mismatch: expected {}, got {}",
                expected_dim, amplitudes.len()
            ));
        }

        let state = StateVector {
            qubit_count,
            amplitudes,
        };

        if !state.is_valid() {
            return Err("State vector is not normalized".to_string());
        }

        Ok(state)
    }

    /// Create a new state vector in the computational basis state |index⟩
    pub fn computational_basis(qubit_count: usize, index: usize) -> Result<Self, String> {
        let dim = 1 << qubit_count;

        if index >= dim {
            return Err(format!(
                "Index {} is out of range for {}-qubit state",
                index, qubit_count
            ));
        }

        let mut amplitudes = Array1::zeros(dim);
        amplitudes[index] = Complex64::new(1.0, 0.0);

        Ok(StateVector {
            qubit_count,
            amplitudes,
        })
    }

    /// Create the ground state |00...0⟩
    pub fn zero_state(qubit_count: usize) -> Self {
        Self::computational_basis(qubit_count, 0)
            .unwrap_or_else(|_| unreachable!("index 0 is always in range"))
    }

    /// Returns the number of qubits in this state
    pub fn qubit_count(&self) -> usize {
        self.qubit_count
    }

    /// Returns the dimension of the Hilbert space (2^n for n qubits)
    pub fn dimension(&self) -> usize {
        1 << self.qubit_count
    }

    /// Check that the state is normalized
    pub fn is_valid(&self) -> bool {
        let norm_sqr: f64 = self.amplitudes
            .iter()
            .map(|amp| amp.norm_sqr())
            .sum();

        (norm_sqr - 1.0).abs() < 1e-10
    }

    /// Inner product ⟨self|other⟩
    pub fn inner_product(&self, other: &Self) -> Result<Complex64, String> {
        if self.qubit_count != other.qubit_count {
            return Err(format!(
                "Dimension mismatch in inner product: {} vs {} qubits",
                self.qubit_count, other.qubit_count
            ));
        }

        let mut result = Complex64::new(0.0, 0.0);
        for i in 0..self.dimension() {
            result += self.amplitudes[i].conj() * other.amplitudes[i];
        }

        Ok(result)
    }

    /// Probability of measuring the given bit string
    pub fn probability(&self, bit_string: usize) -> f64 {
        if bit_string >= self.dimension() {
            return 0.0;
        }

        self.amplitudes[bit_string].norm_sqr()
    }

    /// Get a reference to the amplitudes
    pub fn amplitudes(&self) -> &Array1<Complex64> {
        &self.amplitudes
    }

    /// Apply a unitary matrix to this state vector
    pub fn apply_matrix(&self, matrix: &Array2<Complex64>) -> Result<Self, String> {
        let dim = self.dimension();

        if matrix.shape() != [dim, dim] {
            return Err(format!(
                "Matrix dimension mismatch: expected {}x{}, got {}x{}",
                dim, dim, matrix.shape()[0], matrix.shape()[1]
            ));
        }

        let new_amplitudes = matrix.dot(&self.amplitudes);

        Ok(StateVector {
            qubit_count: self.qubit_count,
            amplitudes: new_amplitudes,
        })
    }

    /// Tensor product with another state. The left operand occupies the
    /// higher-order (big-endian) bit positions of the combined register.
    pub fn tensor(&self, other: &Self) -> Self {
        let self_dim = self.dimension();
        let other_dim = other.dimension();
        let new_dim = self_dim * other_dim;
        let new_qubit_count = self.qubit_count + other.qubit_count;

        let mut new_amplitudes = Array1::zeros(new_dim);

        for i in 0..self_dim {
            for j in 0..other_dim {
                let idx = i * other_dim + j;
                new_amplitudes[idx] = self.amplitudes[i] * other.amplitudes[j];
            }
        }

        StateVector {
            qubit_count: new_qubit_count,
            amplitudes: new_amplitudes,
        }
    }
}

impl Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}-qubit state:", self.qubit_count)?;

        let threshold = 1e-10;
        let mut has_entries = false;

        for i in 0..self.dimension() {
            let amp = self.amplitudes[i];
            if amp.norm_sqr() > threshold {
                has_entries = true;

                // Convert i to binary representation for the ket label
                let bit_string = format!("{:0width$b}", i, width = self.qubit_count);

                write!(f, "  ({:.6}{:+.6}i) |{}⟩", amp.re, amp.im, bit_string)?;

                let prob = amp.norm_sqr();
                if prob > threshold {
                    write!(f, " [{:.1}%]", prob * 100.0)?;
                }

                writeln!(f)?;
            }
        }

        if !has_entries {
            writeln!(f, "  (zero state)")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_state_is_ground_state() {
        let state = StateVector::zero_state(2);
        assert_eq!(state.dimension(), 4);
        assert!((state.probability(0) - 1.0).abs() < 1e-12);
        assert!(state.probability(1) < 1e-12);
    }

    #[test]
    fn test_tensor_bit_order_is_big_endian() {
        // |1⟩ ⊗ |0⟩ must be |10⟩, i.e. index 2 of the combined register
        let one = StateVector::computational_basis(1, 1).unwrap();
        let zero = StateVector::zero_state(1);
        let combined = one.tensor(&zero);

        assert_eq!(combined.qubit_count(), 2);
        assert!((combined.probability(0b10) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unnormalized_state_rejected() {
        let amplitudes = Array1::from(vec![
            Complex64::new(1.0, 0.0),
            Complex64::new(1.0, 0.0),
        ]);
        assert!(StateVector::new(1, amplitudes).is_err());
    }
}
