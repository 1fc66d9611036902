// tests/machine_learning_tests.rs
//! Tests for the machine learning module

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;

use quanvolve::machine_learning::prelude::*;

/// Helper function for comparing f64 with tolerance
fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Two well-separated point clouds in the plane, labels 0 and 1
fn separable_toy_set() -> (Array2<f64>, Array1<u8>) {
    let mut rows = Vec::new();
    let mut labels = Vec::new();

    for i in 0..10 {
        let jitter = i as f64 * 0.01;
        rows.push([0.0 + jitter, 0.1 + jitter]);
        labels.push(0u8);
        rows.push([1.0 - jitter, 0.9 - jitter]);
        labels.push(1u8);
    }

    let inputs = Array2::from_shape_fn((rows.len(), 2), |(i, j)| rows[i][j]);
    (inputs, Array1::from(labels))
}

#[test]
fn test_prediction_is_a_probability_distribution() {
    let mut rng = StdRng::seed_from_u64(0);
    let model = DenseClassifier::new(4, 10, &mut rng);

    let probs = model.predict(&Array1::from(vec![0.1, 0.5, 0.9, 0.2])).unwrap();

    assert_eq!(probs.len(), 10);
    assert!(approx_eq(probs.sum(), 1.0, 1e-12));
    assert!(probs.iter().all(|&p| p >= 0.0));
}

#[test]
fn test_parameter_round_trip() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut model = DenseClassifier::new(3, 2, &mut rng);

    let parameters = model.get_parameters();
    assert_eq!(parameters.len(), model.parameter_count());
    assert_eq!(model.parameter_count(), 3 * 2 + 2);

    model.set_parameters(&parameters).unwrap();
    assert_eq!(model.get_parameters(), parameters);
}

#[test]
fn test_set_parameters_rejects_wrong_length() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut model = DenseClassifier::new(3, 2, &mut rng);

    assert!(model.set_parameters(&[0.0; 5]).is_err());
}

#[test]
fn test_fit_learns_separable_data() {
    let (inputs, labels) = separable_toy_set();
    let mut rng = StdRng::seed_from_u64(3);
    let mut model = DenseClassifier::new(2, 2, &mut rng);

    let history = model
        .fit(
            (&inputs, &labels),
            (&inputs, &labels),
            &GradientDescent::new(0.5),
            &SoftmaxCrossEntropy,
            50,
            4,
            &mut rng,
        )
        .unwrap();

    assert_eq!(history.val_accuracy.len(), 50);
    assert!(approx_eq(*history.val_accuracy.last().unwrap(), 1.0, 1e-12));

    // Loss must decrease over training
    assert!(history.loss.last().unwrap() < history.loss.first().unwrap());
}

#[test]
fn test_history_lengths_match_epoch_count() {
    let (inputs, labels) = separable_toy_set();
    let mut rng = StdRng::seed_from_u64(4);
    let mut model = DenseClassifier::new(2, 2, &mut rng);

    let history = model
        .fit(
            (&inputs, &labels),
            (&inputs, &labels),
            &Adam::default(),
            &SoftmaxCrossEntropy,
            7,
            4,
            &mut rng,
        )
        .unwrap();

    assert_eq!(history.loss.len(), 7);
    assert_eq!(history.accuracy.len(), 7);
    assert_eq!(history.val_loss.len(), 7);
    assert_eq!(history.val_accuracy.len(), 7);
}

#[test]
fn test_training_is_reproducible_for_fixed_seed() {
    let (inputs, labels) = separable_toy_set();

    let run = || {
        let mut rng = StdRng::seed_from_u64(5);
        let mut model = DenseClassifier::new(2, 2, &mut rng);
        model
            .fit(
                (&inputs, &labels),
                (&inputs, &labels),
                &GradientDescent::new(0.1),
                &SoftmaxCrossEntropy,
                5,
                4,
                &mut rng,
            )
            .unwrap();
        model.get_parameters()
    };

    assert_eq!(run(), run());
}

#[test]
fn test_label_out_of_range_is_rejected() {
    let inputs = Array2::zeros((2, 2));
    let labels = Array1::from(vec![0u8, 2u8]);
    let mut rng = StdRng::seed_from_u64(6);
    let mut model = DenseClassifier::new(2, 2, &mut rng);

    let result = model.fit(
        (&inputs, &labels),
        (&inputs, &labels),
        &GradientDescent::new(0.1),
        &SoftmaxCrossEntropy,
        1,
        2,
        &mut rng,
    );

    assert!(matches!(result, Err(ModelError::InvalidLabel { label: 2, .. })));
}

#[test]
fn test_gradient_descent_step() {
    let optimizer = GradientDescent::new(0.1);
    let mut parameters = vec![1.0, -2.0];
    optimizer.update(&mut parameters, &[0.5, -0.5]);

    assert!(approx_eq(parameters[0], 0.95, 1e-12));
    assert!(approx_eq(parameters[1], -1.95, 1e-12));
}

#[test]
fn test_adam_moves_against_gradient() {
    let optimizer = Adam::default();
    let mut parameter = vec![1.0];

    for _ in 0..200 {
        let gradient = vec![parameter[0]];
        optimizer.update(&mut parameter, &gradient);
    }

    assert!(parameter[0] < 1.0);
    assert!(parameter[0] > -1.0);
}

#[test]
fn test_argmax_picks_largest() {
    let probs = Array1::from(vec![0.1, 0.05, 0.6, 0.25]);
    assert_eq!(argmax(&probs), 2);
}
