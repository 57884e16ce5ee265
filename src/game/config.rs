use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Board size, rules and reward shaping for the game
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid in cells
    pub grid_width: usize,
    /// Height of the game grid in cells
    pub grid_height: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,

    /// Reward for eating food
    pub food_reward: f32,
    /// Reward for an ordinary step
    pub step_reward: f32,
    /// Reward for dying or stalling
    pub death_penalty: f32,

    /// An episode ends once steps since reset exceed `stall_factor * snake length`
    pub stall_factor: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 32,
            grid_height: 24,
            initial_snake_length: 3,
            food_reward: 10.0,
            step_reward: 0.0,
            death_penalty: -10.0,
            stall_factor: 100,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_snake_length == 0 {
            return Err(ConfigError::Validation(
                "game.initial_snake_length must be >= 1".into(),
            ));
        }
        // The snake spawns at the centre heading right, its tail trailing left.
        if self.grid_width < self.initial_snake_length * 2 || self.grid_height < 2 {
            return Err(ConfigError::Validation(format!(
                "game grid {}x{} is too small for a snake of length {}",
                self.grid_width, self.grid_height, self.initial_snake_length
            )));
        }
        if self.stall_factor == 0 {
            return Err(ConfigError::Validation(
                "game.stall_factor must be >= 1".into(),
            ));
        }
        Ok(())
    }
}
