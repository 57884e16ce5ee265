//! Contracts between the learning loop and the value model it trains

use crate::error::AgentError;
use crate::game::{NUM_ACTIONS, RelativeAction};

use super::transition::{StateVector, TransitionBatch};

/// Per-action scores produced by a model for one state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionValues(pub [f32; NUM_ACTIONS]);

impl ActionValues {
    /// Index of the highest score; ties go to the first index and NaN never wins
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (idx, &value) in self.0.iter().enumerate().skip(1) {
            if value > self.0[best] || (self.0[best].is_nan() && !value.is_nan()) {
                best = idx;
            }
        }
        best
    }

    pub fn best_action(&self) -> RelativeAction {
        RelativeAction::ALL[self.argmax()]
    }

    pub fn max(&self) -> f32 {
        self.0[self.argmax()]
    }
}

/// Identifies the model snapshot being persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    /// Episodes completed when the snapshot was taken
    pub episode: usize,
    /// Score of the episode that triggered the save
    pub score: u32,
}

/// Maps a state vector to one score per action
pub trait QModel {
    fn q_values(&self, state: &StateVector) -> Result<ActionValues, AgentError>;
}

/// A model that can be trained in place and persisted
///
/// `train_step` performs one gradient update over the whole batch, whether it
/// holds a single transition or a replay sample, and returns the loss.
pub trait Learner: QModel {
    fn train_step(&mut self, batch: &TransitionBatch) -> Result<f32, AgentError>;

    /// Persist the current weights; format and location belong to the model
    fn save(&self, checkpoint: &Checkpoint) -> Result<(), AgentError>;
}
