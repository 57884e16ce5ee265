//! Q-learning trainer over a [`QNetwork`]
//!
//! Each update regresses the network's prediction towards a Bellman target.
//! The target starts as a copy of the prediction, so only the entry of the
//! action actually taken carries any error:
//!
//! ```text
//! target[i][a_i] = r_i                                  if terminal
//!                  r_i + gamma * max_a Q(s'_i, a)       otherwise
//! loss = mean((prediction - target)^2)
//! ```
//!
//! The next-state values come from the network being trained; there is no
//! separate target network.

use std::path::{Path, PathBuf};

use burn::{
    module::AutodiffModule,
    optim::{Adam, AdamConfig, GradientsParams, Optimizer, adaptor::OptimizerAdaptor},
    tensor::{ElementConversion, Tensor, TensorData, backend::AutodiffBackend},
};

use crate::error::AgentError;
use crate::game::NUM_ACTIONS;

use super::config::AgentConfig;
use super::model::{ActionValues, Checkpoint, Learner, QModel};
use super::network::{QNetwork, QNetworkConfig, states_tensor, to_host};
use super::persistence::{ModelMetadata, save_network};
use super::transition::{StateVector, TransitionBatch};

/// Builds the regression target for a batch
///
/// `predicted` and `next_q` are row-major `[batch.len(), NUM_ACTIONS]`.
pub fn q_targets(batch: &TransitionBatch, predicted: &[f32], next_q: &[f32], gamma: f32) -> Vec<f32> {
    let mut target = predicted.to_vec();

    for (i, action) in batch.actions.iter().enumerate() {
        let mut q_new = batch.rewards[i];
        if !batch.terminals[i] {
            let row = &next_q[i * NUM_ACTIONS..(i + 1) * NUM_ACTIONS];
            let mut values = [0.0; NUM_ACTIONS];
            values.copy_from_slice(row);
            q_new += gamma * ActionValues(values).max();
        }
        target[i * NUM_ACTIONS + action.index()] = q_new;
    }

    target
}

/// Adam-optimized Q-learner that saves itself on request
pub struct DqnLearner<B: AutodiffBackend> {
    network: QNetwork<B>,
    optim: OptimizerAdaptor<Adam, QNetwork<B>, B>,
    config: AgentConfig,
    model_path: PathBuf,
    device: B::Device,
    updates: usize,
}

impl<B: AutodiffBackend> DqnLearner<B> {
    /// Fresh network sized from `config`
    pub fn new(config: AgentConfig, model_path: impl Into<PathBuf>, device: B::Device) -> Self {
        let network = QNetworkConfig::new(config.hidden_size).init::<B>(&device);
        Self::from_network(network, config, model_path, device)
    }

    /// Continue training an existing network
    pub fn from_network(
        network: QNetwork<B>,
        config: AgentConfig,
        model_path: impl Into<PathBuf>,
        device: B::Device,
    ) -> Self {
        Self {
            network,
            optim: AdamConfig::new().init(),
            config,
            model_path: model_path.into(),
            device,
            updates: 0,
        }
    }

    pub fn network(&self) -> &QNetwork<B> {
        &self.network
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Gradient updates applied so far
    pub fn updates(&self) -> usize {
        self.updates
    }
}

impl<B: AutodiffBackend> QModel for DqnLearner<B> {
    fn q_values(&self, state: &StateVector) -> Result<ActionValues, AgentError> {
        self.network.valid().q_values(state)
    }
}

impl<B: AutodiffBackend> Learner for DqnLearner<B> {
    fn train_step(&mut self, batch: &TransitionBatch) -> Result<f32, AgentError> {
        let rows = batch.len();
        if rows == 0 {
            return Ok(0.0);
        }

        let states = states_tensor::<B>(batch.states_flat(), rows, &self.device);
        let prediction = self.network.forward(states);
        let predicted = to_host(prediction.clone().detach())?;

        let next_states =
            states_tensor::<B::InnerBackend>(batch.next_states_flat(), rows, &self.device);
        let next_q = to_host(self.network.valid().forward(next_states))?;

        let target = q_targets(batch, &predicted, &next_q, self.config.gamma);
        let target = Tensor::<B, 2>::from_data(
            TensorData::new(target, [rows, NUM_ACTIONS]),
            &self.device,
        );

        let diff = prediction - target;
        let loss = (diff.clone() * diff).mean();
        let loss_value = loss.clone().into_scalar().elem::<f32>();
        if !loss_value.is_finite() {
            return Err(AgentError::Trainer(format!("loss is {loss_value}")));
        }

        let grads = GradientsParams::from_grads(loss.backward(), &self.network);
        self.network = self
            .optim
            .step(self.config.learning_rate, self.network.clone(), grads);
        self.updates += 1;

        Ok(loss_value)
    }

    fn save(&self, checkpoint: &Checkpoint) -> Result<(), AgentError> {
        let metadata = ModelMetadata::new(self.config.clone(), checkpoint);
        save_network(&self.network.valid(), &self.model_path, &metadata)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::RelativeAction;
    use crate::rl::persistence::load_network;
    use crate::rl::transition::Transition;
    use crate::rl::{InferenceBackend, TrainingBackend, default_device};
    use tempfile::TempDir;

    fn state(bits: [bool; 11]) -> StateVector {
        StateVector::from_flags(bits)
    }

    fn batch_of(transitions: &[Transition]) -> TransitionBatch {
        transitions.iter().collect()
    }

    fn learner(path: PathBuf) -> DqnLearner<TrainingBackend> {
        let config = AgentConfig {
            hidden_size: 32,
            learning_rate: 0.01,
            ..Default::default()
        };
        DqnLearner::new(config, path, default_device())
    }

    #[test]
    fn test_terminal_target_is_reward() {
        let batch = batch_of(&[Transition::new(
            StateVector::default(),
            RelativeAction::TurnRight,
            -10.0,
            StateVector::default(),
            true,
        )]);

        let target = q_targets(&batch, &[0.1, 0.2, 0.3], &[5.0, 6.0, 7.0], 0.9);

        assert_eq!(target, vec![0.1, -10.0, 0.3]);
    }

    #[test]
    fn test_non_terminal_target_bootstraps() {
        let batch = batch_of(&[
            Transition::new(
                StateVector::default(),
                RelativeAction::Straight,
                10.0,
                StateVector::default(),
                false,
            ),
            Transition::new(
                StateVector::default(),
                RelativeAction::TurnLeft,
                0.0,
                StateVector::default(),
                false,
            ),
        ]);
        let predicted = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let next_q = [1.0, 2.0, 0.5, -1.0, -3.0, -2.0];

        let target = q_targets(&batch, &predicted, &next_q, 0.5);

        assert_eq!(target, vec![11.0, 2.0, 3.0, 4.0, 5.0, -0.5]);
    }

    #[test]
    fn test_train_step_reduces_loss_on_fixed_batch() {
        let dir = TempDir::new().unwrap();
        let mut learner = learner(dir.path().join("model"));
        let danger_ahead = state([
            true, false, false, false, true, false, false, false, true, false, false,
        ]);
        let batch = batch_of(&[Transition::new(
            danger_ahead,
            RelativeAction::Straight,
            -10.0,
            danger_ahead,
            true,
        )]);

        let first = learner.train_step(&batch).unwrap();
        let mut last = first;
        for _ in 0..50 {
            last = learner.train_step(&batch).unwrap();
        }

        assert!(first > 0.0);
        assert!(last < first, "loss did not decrease: {first} -> {last}");
        assert_eq!(learner.updates(), 51);
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut learner = learner(dir.path().join("model"));

        assert_eq!(learner.train_step(&TransitionBatch::default()).unwrap(), 0.0);
        assert_eq!(learner.updates(), 0);
    }

    #[test]
    fn test_q_values_have_one_entry_per_action() {
        let dir = TempDir::new().unwrap();
        let learner = learner(dir.path().join("model"));

        let values = learner.q_values(&StateVector::default()).unwrap();

        assert_eq!(values.0.len(), NUM_ACTIONS);
        assert!(values.0.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_save_writes_loadable_model() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model").join("model");
        let learner = learner(path.clone());

        learner
            .save(&Checkpoint {
                episode: 3,
                score: 9,
            })
            .unwrap();

        let (network, metadata) =
            load_network::<InferenceBackend>(&path, &default_device()).unwrap();
        assert_eq!(metadata.episode, 3);
        assert_eq!(metadata.score, 9);

        let input = StateVector::default();
        let expected = learner.q_values(&input).unwrap();
        let actual = network.q_values(&input).unwrap();
        for (a, b) in expected.0.iter().zip(actual.0.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }
}
