//! Agent hyperparameter configuration

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Hyperparameters of the deep Q-learning agent
///
/// Defaults reproduce the classic snake DQN setup: a 100k transition replay
/// memory, 1000 transition replay batches and a linear exploration schedule
/// that reaches pure exploitation after 80 episodes.
///
/// # Example
///
/// ```rust
/// use snake_dqn::rl::AgentConfig;
///
/// let config = AgentConfig {
///     gamma: 0.95,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Replay memory capacity; the oldest transition is evicted first
    ///
    /// Default: 100_000
    pub max_memory: usize,

    /// Transitions sampled for each end-of-episode replay update
    ///
    /// Default: 1000
    pub batch_size: usize,

    /// Learning rate for the Adam optimizer
    ///
    /// Default: 1e-3
    pub learning_rate: f64,

    /// Discount factor applied to the next state's best Q-value
    ///
    /// Default: 0.9
    pub gamma: f32,

    /// Width of the network's hidden layer
    ///
    /// Default: 256
    pub hidden_size: usize,

    /// Exploration threshold at episode 0; decays by one per episode
    ///
    /// Default: 80
    pub epsilon_start: u32,

    /// Size of the uniform draw compared against the threshold
    ///
    /// Default: 200
    pub epsilon_range: u32,

    /// Seed for exploration and replay sampling; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that all hyperparameters are in valid ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_memory == 0 {
            return Err(ConfigError::Validation(
                "agent.max_memory must be >= 1".into(),
            ));
        }

        if self.batch_size == 0 {
            return Err(ConfigError::Validation(
                "agent.batch_size must be >= 1".into(),
            ));
        }

        if self.learning_rate <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "agent.learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }

        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(ConfigError::Validation(format!(
                "agent.gamma must be in [0, 1], got {}",
                self.gamma
            )));
        }

        if self.hidden_size == 0 {
            return Err(ConfigError::Validation(
                "agent.hidden_size must be >= 1".into(),
            ));
        }

        if self.epsilon_range == 0 {
            return Err(ConfigError::Validation(
                "agent.epsilon_range must be >= 1".into(),
            ));
        }

        if self.epsilon_start > self.epsilon_range {
            return Err(ConfigError::Validation(format!(
                "agent.epsilon_start ({}) cannot exceed agent.epsilon_range ({})",
                self.epsilon_start, self.epsilon_range
            )));
        }

        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_memory: 100_000,
            batch_size: 1000,
            learning_rate: 1e-3,
            gamma: 0.9,
            hidden_size: 256,
            epsilon_start: 80,
            epsilon_range: 200,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.max_memory, 100_000);
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.learning_rate, 1e-3);
        assert_eq!(config.gamma, 0.9);
        assert_eq!(config.hidden_size, 256);
        assert_eq!(config.epsilon_start, 80);
        assert_eq!(config.epsilon_range, 200);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(AgentConfig::new().validate().is_ok());
    }

    #[test]
    fn test_validation_zero_memory() {
        let mut config = AgentConfig::default();
        config.max_memory = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_batch_size() {
        let mut config = AgentConfig::default();
        config.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_batch_larger_than_memory_is_allowed() {
        let config = AgentConfig {
            max_memory: 10,
            batch_size: 1000,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_gamma_out_of_range() {
        let mut config = AgentConfig::default();
        config.gamma = 1.5;
        assert!(config.validate().is_err());

        config.gamma = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_negative_learning_rate() {
        let mut config = AgentConfig::default();
        config.learning_rate = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_epsilon_start_exceeds_range() {
        let mut config = AgentConfig::default();
        config.epsilon_start = 300;
        assert!(config.validate().is_err());

        config.epsilon_range = 0;
        config.epsilon_start = 0;
        assert!(config.validate().is_err());
    }
}
