//! State vectors and the transitions recorded from them

use std::ops::Index;

use crate::game::RelativeAction;

/// Number of features in a [`StateVector`]
pub const STATE_SIZE: usize = 11;

/// Fixed-layout 0/1 feature vector describing one game snapshot
///
/// | index | feature |
/// |---|---|
/// | 0..=2 | danger straight / right / left |
/// | 3..=6 | heading left / right / up / down |
/// | 7..=10 | food left / right / up / down of the head |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StateVector(pub [u8; STATE_SIZE]);

impl StateVector {
    pub fn from_flags(flags: [bool; STATE_SIZE]) -> Self {
        Self(flags.map(u8::from))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Network input row
    pub fn to_f32(&self) -> [f32; STATE_SIZE] {
        self.0.map(f32::from)
    }
}

impl Index<usize> for StateVector {
    type Output = u8;

    fn index(&self, idx: usize) -> &u8 {
        &self.0[idx]
    }
}

/// One environment step: `(state, action, reward, next_state, terminal)`
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: StateVector,
    pub action: RelativeAction,
    pub reward: f32,
    pub next_state: StateVector,
    pub terminal: bool,
}

impl Transition {
    pub fn new(
        state: StateVector,
        action: RelativeAction,
        reward: f32,
        next_state: StateVector,
        terminal: bool,
    ) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            terminal,
        }
    }
}

/// Transitions unzipped into parallel columns, the shape the trainer consumes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionBatch {
    pub states: Vec<StateVector>,
    pub actions: Vec<RelativeAction>,
    pub rewards: Vec<f32>,
    pub next_states: Vec<StateVector>,
    pub terminals: Vec<bool>,
}

impl TransitionBatch {
    /// A batch holding exactly one transition
    pub fn single(transition: &Transition) -> Self {
        std::iter::once(transition).collect()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn push(&mut self, transition: &Transition) {
        self.states.push(transition.state);
        self.actions.push(transition.action);
        self.rewards.push(transition.reward);
        self.next_states.push(transition.next_state);
        self.terminals.push(transition.terminal);
    }

    /// Row-major `[len, STATE_SIZE]` buffer of the states
    pub fn states_flat(&self) -> Vec<f32> {
        flatten(&self.states)
    }

    /// Row-major `[len, STATE_SIZE]` buffer of the next states
    pub fn next_states_flat(&self) -> Vec<f32> {
        flatten(&self.next_states)
    }

    /// Row-major `[len, NUM_ACTIONS]` one-hot buffer of the actions
    pub fn actions_one_hot(&self) -> Vec<f32> {
        self.actions
            .iter()
            .flat_map(|action| action.one_hot())
            .collect::<Vec<_>>()
    }
}

impl<'a> FromIterator<&'a Transition> for TransitionBatch {
    fn from_iter<I: IntoIterator<Item = &'a Transition>>(iter: I) -> Self {
        let mut batch = TransitionBatch::default();
        for transition in iter {
            batch.push(transition);
        }
        batch
    }
}

fn flatten(states: &[StateVector]) -> Vec<f32> {
    states.iter().flat_map(StateVector::to_f32).collect()
}
