//! Loss functions for machine learning models

use ndarray::Array1;

/// Trait for loss functions
pub trait LossFunction {
    /// Type of input for loss calculation
    type Input;

    /// Calculate the loss between predictions and targets
    fn calculate_loss(&self, predictions: &Self::Input, targets: &Self::Input) -> f64;

    /// Calculate gradients of the loss with respect to predictions
    fn calculate_gradients(&self, predictions: &Self::Input, targets: &Self::Input) -> Self::Input;
}

/// Helper function to compute softmax probabilities
pub fn softmax(x: &Array1<f64>) -> Array1<f64> {
    let max_val = x.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let exp_x = x.mapv(|xi| (xi - max_val).exp());
    let sum_exp = exp_x.sum();
    exp_x / sum_exp
}

/// Categorical cross-entropy over softmax-activated logits.
///
/// `calculate_loss` takes raw logits and a one-hot target vector; gradients
/// are with respect to the logits, where softmax cross-entropy reduces to
/// the difference of probabilities and targets.
#[derive(Debug, Clone, Copy)]
pub struct SoftmaxCrossEntropy;

impl LossFunction for SoftmaxCrossEntropy {
    type Input = Array1<f64>;

    fn calculate_loss(&self, logits: &Self::Input, targets: &Self::Input) -> f64 {
        let probs = softmax(logits);
        let mut loss = 0.0;

        for (p, t) in probs.iter().zip(targets.iter()) {
            if *t > 0.0 {
                // Clip probabilities to avoid numerical issues
                let p_clipped = p.max(1e-15);
                loss -= t * p_clipped.ln();
            }
        }

        loss
    }

    fn calculate_gradients(&self, logits: &Self::Input, targets: &Self::Input) -> Self::Input {
        softmax(logits) - targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&array![1.0, 2.0, 3.0]);
        assert!((probs.sum() - 1.0).abs() < 1e-12);
        assert!(probs.iter().all(|&p| p > 0.0));
    }

    #[test]
    fn test_loss_is_zero_for_confident_correct_prediction() {
        let loss_fn = SoftmaxCrossEntropy;
        // Strongly peaked logits on the target class
        let logits = array![50.0, 0.0, 0.0];
        let target = array![1.0, 0.0, 0.0];
        assert!(loss_fn.calculate_loss(&logits, &target) < 1e-10);
    }

    #[test]
    fn test_gradient_vanishes_at_target_distribution() {
        let loss_fn = SoftmaxCrossEntropy;
        let logits = array![0.0, 0.0];
        let target = array![0.5, 0.5];
        let grads = loss_fn.calculate_gradients(&logits, &target);
        for &g in grads.iter() {
            assert!(g.abs() < 1e-12);
        }
    }
}
