//! Optimization algorithms for machine learning models
use std::sync::Mutex;

/// Trait for optimization algorithms
pub trait Optimizer: Send + Sync {
    /// Update parameters using gradients
    fn update(&self, parameters: &mut [f64], gradients: &[f64]);

    /// Reset the optimizer's internal state
    fn reset(&mut self);
}

/// Gradient Descent optimizer
#[derive(Debug, Clone)]
pub struct GradientDescent {
    learning_rate: f64,
}

impl GradientDescent {
    /// Creates a new Gradient Descent optimizer
    pub fn new(learning_rate: f64) -> Self {
        GradientDescent { learning_rate }
    }
}

impl Optimizer for GradientDescent {
    fn update(&self, parameters: &mut [f64], gradients: &[f64]) {
        assert_eq!(parameters.len(), gradients.len(), "Parameter and gradient dimensions must match");

        for (param, grad) in parameters.iter_mut().zip(gradients.iter()) {
            *param -= self.learning_rate * grad;
        }
    }

    fn reset(&mut self) {
        // Gradient descent has no state to reset
    }
}

/// Adaptive Moment Estimation (Adam) optimizer
#[derive(Debug)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    m: Mutex<Vec<f64>>,        // First moment estimate
    v: Mutex<Vec<f64>>,        // Second moment estimate
    t: Mutex<usize>,           // Timestep
}

impl Adam {
    /// Creates a new Adam optimizer
    pub fn new(learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Adam {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            m: Mutex::new(Vec::new()),
            v: Mutex::new(Vec::new()),
            t: Mutex::new(0),
        }
    }
}

impl Default for Adam {
    fn default() -> Self {
        Adam::new(0.001, 0.9, 0.999, 1e-8)
    }
}

impl Clone for Adam {
    fn clone(&self) -> Self {
        let m = self.m.lock().unwrap().clone();
        let v = self.v.lock().unwrap().clone();
        let t = *self.t.lock().unwrap();

        Adam {
            learning_rate: self.learning_rate,
            beta1: self.beta1,
            beta2: self.beta2,
            epsilon: self.epsilon,
            m: Mutex::new(m),
            v: Mutex::new(v),
            t: Mutex::new(t),
        }
    }
}

impl Optimizer for Adam {
    fn update(&self, parameters: &mut [f64], gradients: &[f64]) {
        let n = parameters.len();
        assert_eq!(n, gradients.len(), "Parameter and gradient dimensions must match");

        // Get locks for mutable access to internal state
        let mut m = self.m.lock().unwrap();
        let mut v = self.v.lock().unwrap();
        let mut t = self.t.lock().unwrap();

        // Initialize moment estimates if not already done
        if m.is_empty() {
            *m = vec![0.0; n];
        }

        if v.is_empty() {
            *v = vec![0.0; n];
        }

        // Increment timestep
        *t += 1;
        let t_value = *t;

        // Update parameters
        for i in 0..n {
            // Update biased first moment estimate
            m[i] = self.beta1 * m[i] + (1.0 - self.beta1) * gradients[i];

            // Update biased second raw moment estimate
            v[i] = self.beta2 * v[i] + (1.0 - self.beta2) * gradients[i] * gradients[i];

            // Compute bias-corrected moment estimates
            let m_hat = m[i] / (1.0 - self.beta1.powi(t_value as i32));
            let v_hat = v[i] / (1.0 - self.beta2.powi(t_value as i32));

            parameters[i] -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
        }
    }

    fn reset(&mut self) {
        self.m.lock().unwrap().clear();
        self.v.lock().unwrap().clear();
        *self.t.lock().unwrap() = 0;
    }
}
