//! Bounded experience replay memory
//!
//! Transitions are kept in insertion order. Once the memory is full, every
//! push evicts the oldest transition, regardless of reward or how often it
//! was sampled.

use std::collections::VecDeque;

use rand::Rng;
use rand::seq::index;

use super::transition::Transition;

/// Fixed-capacity FIFO of past transitions
///
/// # Example
///
/// ```rust
/// use snake_dqn::game::RelativeAction;
/// use snake_dqn::rl::{ReplayMemory, StateVector, Transition};
///
/// let mut memory = ReplayMemory::new(2);
/// for reward in [1.0, 2.0, 3.0] {
///     memory.push(Transition::new(
///         StateVector::default(),
///         RelativeAction::Straight,
///         reward,
///         StateVector::default(),
///         false,
///     ));
/// }
///
/// assert_eq!(memory.len(), 2);
/// assert_eq!(memory.iter().next().unwrap().reward, 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct ReplayMemory {
    buffer: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayMemory {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append at the tail, evicting the head when full
    pub fn push(&mut self, transition: Transition) {
        if self.capacity == 0 {
            return;
        }
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// Draw a replay batch
    ///
    /// With more than `batch_size` transitions stored, returns `batch_size`
    /// distinct transitions chosen uniformly without replacement. Otherwise
    /// returns every stored transition, oldest first.
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Vec<&Transition> {
        if self.buffer.len() <= batch_size {
            return self.buffer.iter().collect();
        }

        index::sample(rng, self.buffer.len(), batch_size)
            .into_iter()
            .map(|i| &self.buffer[i])
            .collect()
    }

    /// Stored transitions, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.capacity
    }
}
