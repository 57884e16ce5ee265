//! Epsilon-greedy action selection
//!
//! Exploration follows a linear schedule over episodes: with the default
//! `start = 80` and `range = 200`, episode 0 explores with probability 0.4
//! and episode 80 onward is purely greedy.

use rand::Rng;

use crate::error::AgentError;
use crate::game::RelativeAction;

use super::model::QModel;
use super::transition::StateVector;

/// Linear exploration schedule driven by the episode counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpsilonSchedule {
    /// Threshold at episode 0
    pub start: u32,
    /// Draws are uniform over `[0, range)`
    pub range: u32,
}

impl Default for EpsilonSchedule {
    fn default() -> Self {
        Self {
            start: 80,
            range: 200,
        }
    }
}

impl EpsilonSchedule {
    pub fn new(start: u32, range: u32) -> Self {
        Self { start, range }
    }

    /// Threshold for the given episode: `max(0, start - episodes)`
    pub fn epsilon(&self, episodes: usize) -> u32 {
        let episodes = u32::try_from(episodes).unwrap_or(u32::MAX);
        self.start.saturating_sub(episodes)
    }

    pub fn exploration_probability(&self, episodes: usize) -> f64 {
        if self.range == 0 {
            return 0.0;
        }
        f64::from(self.epsilon(episodes).min(self.range)) / f64::from(self.range)
    }
}

/// Outcome of one action selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Uniformly random action
    Explore(RelativeAction),
    /// Highest-scoring action according to the model
    Exploit(RelativeAction),
}

impl Decision {
    pub fn action(&self) -> RelativeAction {
        match self {
            Decision::Explore(action) | Decision::Exploit(action) => *action,
        }
    }

    pub fn is_exploration(&self) -> bool {
        matches!(self, Decision::Explore(_))
    }
}

/// Pick an action for `state` given how many episodes have completed
///
/// No random draw is made once epsilon has reached zero.
pub fn decide<M, R>(
    schedule: &EpsilonSchedule,
    episodes: usize,
    state: &StateVector,
    model: &M,
    rng: &mut R,
) -> Result<Decision, AgentError>
where
    M: QModel + ?Sized,
    R: Rng + ?Sized,
{
    let epsilon = schedule.epsilon(episodes);
    if epsilon > 0 && schedule.range > 0 && rng.random_range(0..schedule.range) < epsilon {
        let idx = rng.random_range(0..RelativeAction::ALL.len());
        return Ok(Decision::Explore(RelativeAction::ALL[idx]));
    }

    greedy_action(model, state).map(Decision::Exploit)
}

/// Arg-max of the model's scores; ties resolve to the lowest index
pub fn greedy_action<M: QModel + ?Sized>(
    model: &M,
    state: &StateVector,
) -> Result<RelativeAction, AgentError> {
    Ok(model.q_values(state)?.best_action())
}
