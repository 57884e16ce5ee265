//! Scripted game and learner used by the unit tests

use std::cell::{Cell, RefCell};
use std::path::PathBuf;

use crate::error::{AgentError, PersistenceError};
use crate::game::{Direction, Position, RelativeAction};

use super::environment::{Game, StepOutcome};
use super::model::{ActionValues, Checkpoint, Learner, QModel};
use super::transition::{StateVector, TransitionBatch};

/// Game whose episodes end after a fixed number of steps with scripted scores
pub struct ScriptedGame {
    scores: Vec<u32>,
    episode_length: usize,
    body: Vec<Position>,
    episode: usize,
    step_in_episode: usize,
    pub steps_taken: usize,
    pub resets: usize,
    fail_collision: bool,
    fail_step_at: Option<usize>,
}

impl ScriptedGame {
    /// One episode per score; episodes past the script score 0
    pub fn new(scores: Vec<u32>) -> Self {
        Self {
            scores,
            episode_length: 3,
            body: vec![Position::new(5, 5), Position::new(4, 5)],
            episode: 0,
            step_in_episode: 0,
            steps_taken: 0,
            resets: 0,
            fail_collision: false,
            fail_step_at: None,
        }
    }

    pub fn with_episode_length(mut self, steps: usize) -> Self {
        self.episode_length = steps.max(1);
        self
    }

    pub fn failing_collision_test(mut self) -> Self {
        self.fail_collision = true;
        self
    }

    /// Make the `n`-th call to `step` (0-based, across episodes) fail
    pub fn failing_step_at(mut self, n: usize) -> Self {
        self.fail_step_at = Some(n);
        self
    }
}

impl Game for ScriptedGame {
    fn head(&self) -> Position {
        self.body[0]
    }

    fn heading(&self) -> Direction {
        Direction::Right
    }

    fn food(&self) -> Position {
        Position::new(8, 2)
    }

    fn body(&self) -> &[Position] {
        &self.body
    }

    fn is_collision(&self, point: Position) -> Result<bool, AgentError> {
        if self.fail_collision {
            return Err(AgentError::Game("collision probe failed".into()));
        }
        Ok(self.body[1..].contains(&point))
    }

    fn step(&mut self, _action: RelativeAction) -> Result<StepOutcome, AgentError> {
        if self.fail_step_at == Some(self.steps_taken) {
            return Err(AgentError::Game("step failed".into()));
        }
        self.steps_taken += 1;
        self.step_in_episode += 1;

        let score = self.scores.get(self.episode).copied().unwrap_or(0);
        let terminal = self.step_in_episode >= self.episode_length;
        Ok(StepOutcome {
            reward: if terminal { -10.0 } else { 0.0 },
            terminal,
            score: if terminal { score } else { 0 },
        })
    }

    fn reset(&mut self) -> Result<(), AgentError> {
        self.resets += 1;
        self.episode += 1;
        self.step_in_episode = 0;
        Ok(())
    }
}

/// Learner with fixed Q-values that records every call made to it
pub struct ScriptedLearner {
    q_values: [f32; 3],
    pub forward_calls: Cell<usize>,
    /// Size of every batch passed to `train_step`, in call order
    pub train_batches: Vec<usize>,
    pub last_batch: Option<TransitionBatch>,
    pub saves: RefCell<Vec<Checkpoint>>,
    fail_forward: bool,
    fail_train: bool,
    fail_save: bool,
}

impl ScriptedLearner {
    pub fn with_q_values(q_values: [f32; 3]) -> Self {
        Self {
            q_values,
            forward_calls: Cell::new(0),
            train_batches: Vec::new(),
            last_batch: None,
            saves: RefCell::new(Vec::new()),
            fail_forward: false,
            fail_train: false,
            fail_save: false,
        }
    }

    pub fn failing_forward(mut self) -> Self {
        self.fail_forward = true;
        self
    }

    pub fn failing_train(mut self) -> Self {
        self.fail_train = true;
        self
    }

    pub fn failing_save(mut self) -> Self {
        self.fail_save = true;
        self
    }

    pub fn save_count(&self) -> usize {
        self.saves.borrow().len()
    }
}

impl Default for ScriptedLearner {
    fn default() -> Self {
        Self::with_q_values([0.5, 0.25, 0.0])
    }
}

impl QModel for ScriptedLearner {
    fn q_values(&self, _state: &StateVector) -> Result<ActionValues, AgentError> {
        self.forward_calls.set(self.forward_calls.get() + 1);
        if self.fail_forward {
            return Err(AgentError::Model("forward failed".into()));
        }
        Ok(ActionValues(self.q_values))
    }
}

impl Learner for ScriptedLearner {
    fn train_step(&mut self, batch: &TransitionBatch) -> Result<f32, AgentError> {
        if self.fail_train {
            return Err(AgentError::Trainer("update failed".into()));
        }
        self.train_batches.push(batch.len());
        self.last_batch = Some(batch.clone());
        Ok(batch.len() as f32)
    }

    fn save(&self, checkpoint: &Checkpoint) -> Result<(), AgentError> {
        if self.fail_save {
            return Err(PersistenceError::Save {
                path: PathBuf::from("scripted"),
                reason: "save failed".into(),
            }
            .into());
        }
        self.saves.borrow_mut().push(*checkpoint);
        Ok(())
    }
}
