//! Core game logic module for Snake
//!
//! Pure game rules with no I/O or rendering. The learning loop reaches it
//! through [`crate::rl::Game`], implemented by [`crate::rl::SnakeEnvironment`].

pub mod action;
pub mod config;
pub mod engine;
pub mod state;

pub use action::{Direction, NUM_ACTIONS, RelativeAction};
pub use config::GameConfig;
pub use engine::{GameEngine, StepInfo, StepResult};
pub use state::{GameState, Position, Snake, TerminationCause};
