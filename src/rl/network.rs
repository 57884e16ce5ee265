//! Feed-forward Q-network for the snake agent
//!
//! # Architecture
//!
//! ```text
//! Input: [batch, 11]
//!   ↓ Linear(11 → hidden) + ReLU
//!   ↓ Linear(hidden → 3)
//! Output: [batch, 3] one Q-value per relative action
//! ```
//!
//! # Example
//!
//! ```rust
//! use snake_dqn::rl::QNetworkConfig;
//! use burn::backend::ndarray::NdArrayDevice;
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//!
//! type Backend = NdArray<f32>;
//!
//! let device = NdArrayDevice::default();
//! let network = QNetworkConfig::new(256).init::<Backend>(&device);
//!
//! let q_values = network.forward(Tensor::zeros([8, 11], &device));
//! assert_eq!(q_values.dims(), [8, 3]);
//! ```

use burn::{
    module::Module,
    nn::{Linear, LinearConfig},
    tensor::{Tensor, TensorData, activation::relu, backend::Backend},
};

use crate::error::AgentError;
use crate::game::NUM_ACTIONS;

use super::model::{ActionValues, QModel};
use super::transition::{STATE_SIZE, StateVector};

/// Layer sizes of a [`QNetwork`]
#[derive(Debug, Clone)]
pub struct QNetworkConfig {
    /// Number of input features (default: 11)
    pub input_size: usize,

    /// Width of the hidden layer (default: 256)
    pub hidden_size: usize,

    /// Number of outputs, one per action (default: 3)
    pub num_actions: usize,
}

impl QNetworkConfig {
    pub fn new(hidden_size: usize) -> Self {
        Self {
            input_size: STATE_SIZE,
            hidden_size,
            num_actions: NUM_ACTIONS,
        }
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> QNetwork<B> {
        QNetwork {
            hidden: LinearConfig::new(self.input_size, self.hidden_size).init(device),
            output: LinearConfig::new(self.hidden_size, self.num_actions).init(device),
        }
    }
}

impl Default for QNetworkConfig {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Two-layer perceptron mapping a state vector to per-action Q-values
///
/// Generic over the Burn backend so the same module serves training
/// (`Autodiff<NdArray>`) and greedy play (`NdArray`).
#[derive(Module, Debug)]
pub struct QNetwork<B: Backend> {
    hidden: Linear<B>,
    output: Linear<B>,
}

impl<B: Backend> QNetwork<B> {
    /// `[batch, 11]` states to `[batch, 3]` Q-values
    pub fn forward(&self, states: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.hidden.forward(states));
        self.output.forward(x)
    }

    pub fn device(&self) -> B::Device {
        self.output.weight.val().device()
    }
}

/// Build a `[rows, STATE_SIZE]` input tensor from a row-major buffer
pub fn states_tensor<B: Backend>(flat: Vec<f32>, rows: usize, device: &B::Device) -> Tensor<B, 2> {
    Tensor::from_data(TensorData::new(flat, [rows, STATE_SIZE]), device)
}

/// Copy a `[rows, NUM_ACTIONS]` output tensor back to the host
pub fn to_host<B: Backend>(q_values: Tensor<B, 2>) -> Result<Vec<f32>, AgentError> {
    q_values
        .into_data()
        .to_vec::<f32>()
        .map_err(|err| AgentError::Model(format!("{err:?}")))
}

impl<B: Backend> QModel for QNetwork<B> {
    fn q_values(&self, state: &StateVector) -> Result<ActionValues, AgentError> {
        let input = states_tensor::<B>(state.to_f32().to_vec(), 1, &self.device());
        let values = to_host(self.forward(input))?;

        let row: [f32; NUM_ACTIONS] = values.as_slice().try_into().map_err(|_| {
            AgentError::Model(format!(
                "expected {NUM_ACTIONS} Q-values, got {}",
                values.len()
            ))
        })?;
        Ok(ActionValues(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::Autodiff;
    use burn::backend::ndarray::{NdArray, NdArrayDevice};
    use burn::tensor::Distribution;

    type TestBackend = NdArray<f32>;
    type TestAutodiffBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn test_forward_pass_shapes() {
        let device = NdArrayDevice::default();
        let network = QNetworkConfig::new(32).init::<TestBackend>(&device);

        for batch_size in [1, 4, 16, 1000] {
            let q_values = network.forward(Tensor::zeros([batch_size, STATE_SIZE], &device));
            assert_eq!(q_values.dims(), [batch_size, NUM_ACTIONS]);
        }
    }

    #[test]
    fn test_q_values_match_batched_forward() {
        let device = NdArrayDevice::default();
        let network = QNetworkConfig::default().init::<TestBackend>(&device);
        let state = StateVector::from_flags([
            true, false, false, false, true, false, false, false, true, true, false,
        ]);

        let single = network.q_values(&state).unwrap();

        let batch: Vec<f32> = state.to_f32().repeat(3);
        let batched = to_host(network.forward(states_tensor::<TestBackend>(batch, 3, &device)))
            .unwrap();

        for row in batched.chunks(NUM_ACTIONS) {
            for (a, b) in row.iter().zip(single.0.iter()) {
                assert!((a - b).abs() < 1e-5, "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_output_finite() {
        let device = NdArrayDevice::default();
        let network = QNetworkConfig::default().init::<TestBackend>(&device);

        let states = Tensor::random([8, STATE_SIZE], Distribution::Uniform(0.0, 1.0), &device);
        let values = to_host(network.forward(states)).unwrap();

        assert_eq!(values.len(), 8 * NUM_ACTIONS);
        assert!(values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_gradient_flow() {
        let device = NdArrayDevice::default();
        let network = QNetworkConfig::new(16).init::<TestAutodiffBackend>(&device);

        let states = Tensor::<TestAutodiffBackend, 2>::ones([2, STATE_SIZE], &device).require_grad();
        let loss = network.forward(states.clone()).sum();
        let gradients = loss.backward();

        assert!(
            states.grad(&gradients).is_some(),
            "Gradients should flow back to the input states"
        );
    }
}
