// tests/simulator_tests.rs
//! Tests for the statevector simulator

use num_complex::Complex64;
use ndarray::array;
use std::f64::consts::PI;

use quanvolve::quantum::circuit::CircuitBuilder;
use quanvolve::simulators::{Outcome, StatevectorSimulator};

/// Helper function for comparing complex numbers with tolerance
fn complex_approx_eq(a: Complex64, b: Complex64, epsilon: f64) -> bool {
    (a - b).norm() < epsilon
}

/// Helper function for comparing f64 with tolerance
fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

#[test]
fn test_simulator_bell_state() {
    // Create a Bell state circuit
    let mut builder = CircuitBuilder::new(2);
    builder.h(0).unwrap();
    builder.cnot(0, 1).unwrap();
    let circuit = builder.build();

    let mut simulator = StatevectorSimulator::new(2);
    simulator.run_circuit(&circuit).unwrap();

    // Check that the state is a Bell state
    let amplitudes = simulator.state().amplitudes();
    let sqrt2_inv = 1.0 / 2.0_f64.sqrt();

    assert!(complex_approx_eq(amplitudes[0], Complex64::new(sqrt2_inv, 0.0), 1e-10));
    assert!(complex_approx_eq(amplitudes[1], Complex64::new(0.0, 0.0), 1e-10));
    assert!(complex_approx_eq(amplitudes[2], Complex64::new(0.0, 0.0), 1e-10));
    assert!(complex_approx_eq(amplitudes[3], Complex64::new(sqrt2_inv, 0.0), 1e-10));

    // Both qubits measure 0 and 1 with equal probability
    let probs = simulator.measure_qubit_probability(0).unwrap();
    assert!(approx_eq(probs[&Outcome::Zero], 0.5, 1e-10));
    assert!(approx_eq(probs[&Outcome::One], 0.5, 1e-10));
}

#[test]
fn test_z_expectation_of_basis_states() {
    let simulator = StatevectorSimulator::new(1);
    assert!(approx_eq(simulator.z_expectation(0).unwrap(), 1.0, 1e-12));

    let mut simulator = StatevectorSimulator::new(1);
    simulator
        .apply_gate(&quanvolve::quantum::StandardGate::X, &[0])
        .unwrap();
    assert!(approx_eq(simulator.z_expectation(0).unwrap(), -1.0, 1e-12));
}

#[test]
fn test_general_observable_path() {
    // ⟨X⟩ of the |+⟩ state is 1; X is not Z, so this takes the expansion path
    let mut builder = CircuitBuilder::new(2);
    builder.h(0).unwrap();

    let mut simulator = StatevectorSimulator::new(2);
    simulator.run_circuit(&builder.build()).unwrap();

    let x_observable = array![
        [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
        [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)]
    ];

    let expectation = simulator.expectation_value_single_qubit(&x_observable, 0).unwrap();
    assert!(approx_eq(expectation, 1.0, 1e-10));
}

#[test]
fn test_z_expectation_of_superposition_is_zero() {
    let mut builder = CircuitBuilder::new(1);
    builder.h(0).unwrap();

    let mut simulator = StatevectorSimulator::new(1);
    simulator.run_circuit(&builder.build()).unwrap();

    assert!(approx_eq(simulator.z_expectation(0).unwrap(), 0.0, 1e-10));
}

#[test]
fn test_z_expectation_after_ry_is_cosine() {
    for &theta in &[0.0, 0.4, PI / 2.0, 2.1, PI] {
        let mut builder = CircuitBuilder::new(1);
        builder.ry(0, theta).unwrap();

        let mut simulator = StatevectorSimulator::new(1);
        simulator.run_circuit(&builder.build()).unwrap();

        assert!(approx_eq(simulator.z_expectation(0).unwrap(), theta.cos(), 1e-10));
    }
}

#[test]
fn test_z_observable_matches_fast_path() {
    let mut builder = CircuitBuilder::new(2);
    builder.ry(0, 0.7).unwrap();
    builder.cnot(0, 1).unwrap();

    let mut simulator = StatevectorSimulator::new(2);
    simulator.run_circuit(&builder.build()).unwrap();

    let z_observable = array![
        [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
        [Complex64::new(0.0, 0.0), Complex64::new(-1.0, 0.0)]
    ];

    for qubit in 0..2 {
        let general = simulator.expectation_value_single_qubit(&z_observable, qubit).unwrap();
        let fast = simulator.z_expectation(qubit).unwrap();
        assert!(approx_eq(general, fast, 1e-10));
    }
}

#[test]
fn test_expectation_of_entangled_qubits() {
    // In a Bell state both marginals are maximally mixed
    let mut builder = CircuitBuilder::new(2);
    builder.h(0).unwrap();
    builder.cnot(0, 1).unwrap();

    let mut simulator = StatevectorSimulator::new(2);
    simulator.run_circuit(&builder.build()).unwrap();

    assert!(approx_eq(simulator.z_expectation(0).unwrap(), 0.0, 1e-10));
    assert!(approx_eq(simulator.z_expectation(1).unwrap(), 0.0, 1e-10));
}

#[test]
fn test_apply_operator_rejects_wrong_dimension() {
    let mut simulator = StatevectorSimulator::new(2);
    let too_small = array![
        [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
        [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)]
    ];

    assert!(simulator.apply_operator(&too_small).is_err());
}

#[test]
fn test_reset_returns_to_ground_state() {
    let mut builder = CircuitBuilder::new(1);
    builder.x(0).unwrap();

    let mut simulator = StatevectorSimulator::new(1);
    simulator.run_circuit(&builder.build()).unwrap();
    simulator.reset();

    assert!(approx_eq(simulator.z_expectation(0).unwrap(), 1.0, 1e-12));
}
