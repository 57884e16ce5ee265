//! Training orchestrator
//!
//! The agent owns the replay memory and the episode counter and decides when
//! the learner is trained:
//!
//! - **short memory**: every step's transition is trained on immediately as a
//!   batch of one;
//! - **long memory**: at each episode end a sample of up to `batch_size`
//!   transitions from the whole history is trained on in one update.
//!
//! A transition is therefore seen at least once immediately and possibly
//! again in later replay batches.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{AgentError, ConfigError};
use crate::game::RelativeAction;

use super::config::AgentConfig;
use super::environment::Game;
use super::features::extract_state;
use super::memory::ReplayMemory;
use super::model::Learner;
use super::policy::{Decision, EpsilonSchedule, decide};
use super::transition::{StateVector, Transition, TransitionBatch};

/// Deep Q-learning agent driving a [`Learner`]
pub struct Agent<L, R = StdRng> {
    learner: L,
    memory: ReplayMemory,
    schedule: EpsilonSchedule,
    batch_size: usize,
    episodes: usize,
    rng: R,
}

impl<L: Learner> Agent<L, StdRng> {
    /// Create an agent, seeding its RNG from `config.seed` or the OS
    pub fn new(learner: L, config: &AgentConfig) -> Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(learner, config, rng)
    }
}

impl<L: Learner, R: Rng> Agent<L, R> {
    pub fn with_rng(learner: L, config: &AgentConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            learner,
            memory: ReplayMemory::new(config.max_memory),
            schedule: EpsilonSchedule::new(config.epsilon_start, config.epsilon_range),
            batch_size: config.batch_size,
            episodes: 0,
            rng,
        })
    }

    /// Feature vector for the game's current snapshot
    pub fn state_of<G: Game + ?Sized>(&self, game: &G) -> Result<StateVector, AgentError> {
        extract_state(game)
    }

    /// Epsilon-greedy decision under the current episode count
    pub fn decide(&mut self, state: &StateVector) -> Result<Decision, AgentError> {
        decide(
            &self.schedule,
            self.episodes,
            state,
            &self.learner,
            &mut self.rng,
        )
    }

    pub fn select_action(&mut self, state: &StateVector) -> Result<RelativeAction, AgentError> {
        self.decide(state).map(|decision| decision.action())
    }

    /// Record a transition for later replay
    pub fn observe(&mut self, transition: Transition) {
        self.memory.push(transition);
    }

    /// Short-memory update on the latest transition alone
    pub fn train_step_immediate(&mut self, transition: &Transition) -> Result<f32, AgentError> {
        self.learner.train_step(&TransitionBatch::single(transition))
    }

    /// Long-memory update on a replay sample
    ///
    /// Returns `Ok(None)` without touching the learner when memory is empty.
    pub fn train_step_replay(&mut self) -> Result<Option<f32>, AgentError> {
        if self.memory.is_empty() {
            return Ok(None);
        }

        let batch: TransitionBatch = self
            .memory
            .sample(self.batch_size, &mut self.rng)
            .into_iter()
            .collect();

        self.learner.train_step(&batch).map(Some)
    }

    /// Close an episode: bump the counter, then replay
    ///
    /// The counter moves first so the next episode's exploration already
    /// reflects the finished one.
    pub fn complete_episode(&mut self) -> Result<Option<f32>, AgentError> {
        self.episodes += 1;
        self.train_step_replay()
    }

    /// Completed episodes
    pub fn episodes(&self) -> usize {
        self.episodes
    }

    /// Current exploration probability
    pub fn exploration_probability(&self) -> f64 {
        self.schedule.exploration_probability(self.episodes)
    }

    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }

    pub fn learner(&self) -> &L {
        &self.learner
    }

    pub fn learner_mut(&mut self) -> &mut L {
        &mut self.learner
    }

    pub fn into_learner(self) -> L {
        self.learner
    }
}
