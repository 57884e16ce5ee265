//! Deep Q-learning for the snake game
//!
//! Provides:
//! - 11-feature state extraction relative to the snake's heading
//! - Bounded FIFO experience replay
//! - Epsilon-greedy action selection on a linear episode schedule
//! - Short-memory and long-memory training through the [`Learner`] seam
//! - An episode iterator that persists the model on every new record

use burn::backend::{
    Autodiff,
    ndarray::{NdArray, NdArrayDevice},
};

pub mod agent;
pub mod config;
pub mod environment;
pub mod features;
pub mod memory;
pub mod model;
pub mod network;
pub mod persistence;
pub mod policy;
pub mod session;
pub mod trainer;
pub mod transition;

#[cfg(test)]
pub(crate) mod testing;

pub use agent::Agent;
pub use config::AgentConfig;
pub use environment::{Game, SnakeEnvironment, StepOutcome};
pub use features::extract_state;
pub use memory::ReplayMemory;
pub use model::{ActionValues, Checkpoint, Learner, QModel};
pub use network::{QNetwork, QNetworkConfig};
pub use persistence::{ModelMetadata, load_metadata, load_network, save_network};
pub use policy::{Decision, EpsilonSchedule, decide, greedy_action};
pub use session::{EpisodeResult, TrainingSession};
pub use trainer::DqnLearner;
pub use transition::{STATE_SIZE, StateVector, Transition, TransitionBatch};

/// Backend used for training (with autodiff)
pub type TrainingBackend = Autodiff<NdArray<f32>>;

/// Backend used to run a trained model
pub type InferenceBackend = NdArray<f32>;

/// CPU device shared by both backends
pub fn default_device() -> NdArrayDevice {
    NdArrayDevice::default()
}
