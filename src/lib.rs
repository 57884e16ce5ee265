//! Snake DQN - a snake agent that learns by deep Q-learning
//!
//! This library provides:
//! - Core game logic (game module)
//! - The learning loop: state features, replay memory, epsilon-greedy
//!   policy, training orchestration and the episode iterator (rl module)
//! - Training statistics and score history (metrics module)
//! - Train and play execution modes (modes module)

pub mod config;
pub mod error;
pub mod game;
pub mod metrics;
pub mod modes;
pub mod rl;
