//! Training mode for the DQN agent
//!
//! Builds the environment, learner and agent from an [`AppConfig`], then
//! drives a [`TrainingSession`] until its episode limit, an interrupt, or a
//! collaborator failure. Every completed episode goes to [`TrainingStats`]
//! and the log; the score history is exported at teardown when configured.
//!
//! # Example
//!
//! ```rust,ignore
//! use snake_dqn::config::AppConfig;
//! use snake_dqn::modes::TrainMode;
//!
//! let mut config = AppConfig::default();
//! config.training.max_episodes = Some(100);
//!
//! let mut train_mode = TrainMode::new(config);
//! train_mode.run()?;
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::{AgentError, ConfigError};
use crate::metrics::TrainingStats;
use crate::rl::{
    Agent, DqnLearner, EpisodeResult, SnakeEnvironment, TrainingBackend, TrainingSession,
    default_device,
};

/// Configuration for training mode
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Where the best model is saved (`<path>.mpk` and `<path>.meta.json`)
    pub model_path: PathBuf,

    /// Stop after this many episodes; `None` trains until interrupted
    pub max_episodes: Option<usize>,

    /// Log a progress line every N episodes
    pub log_frequency: usize,

    /// Episodes in the rolling statistics window
    pub stats_window: usize,

    /// Write the `(episode, score, mean_score)` history here at teardown
    pub history_path: Option<PathBuf>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model/model"),
            max_episodes: None,
            log_frequency: 1,
            stats_window: 100,
            history_path: None,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "training.model_path must not be empty".into(),
            ));
        }
        if self.log_frequency == 0 {
            return Err(ConfigError::Validation(
                "training.log_frequency must be >= 1".into(),
            ));
        }
        if self.stats_window == 0 {
            return Err(ConfigError::Validation(
                "training.stats_window must be >= 1".into(),
            ));
        }
        if self.max_episodes == Some(0) {
            return Err(ConfigError::Validation(
                "training.max_episodes must be >= 1 when set".into(),
            ));
        }
        Ok(())
    }
}

/// Runs training and owns its statistics
pub struct TrainMode {
    config: AppConfig,
    stats: TrainingStats,
    stop: Arc<AtomicBool>,
}

impl TrainMode {
    pub fn new(config: AppConfig) -> Self {
        let stats = TrainingStats::new(config.training.stats_window);
        Self {
            config,
            stats,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an interrupt flag with the caller
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    /// Train until the episode limit or an interrupt
    pub fn run(&mut self) -> Result<()> {
        self.config.validate().context("invalid configuration")?;
        self.log_header();

        let env = match self.config.agent.seed {
            Some(seed) => SnakeEnvironment::with_seed(self.config.game.clone(), seed),
            None => SnakeEnvironment::new(self.config.game.clone()),
        };
        let learner = DqnLearner::<TrainingBackend>::new(
            self.config.agent.clone(),
            self.config.training.model_path.clone(),
            default_device(),
        );
        let agent = Agent::new(learner, &self.config.agent).context("creating agent")?;
        let session =
            TrainingSession::new(env, agent).with_stop_flag(Arc::clone(&self.stop));

        let outcome = match self.config.training.max_episodes {
            Some(limit) => self.consume(session.take(limit)),
            None => self.consume(session),
        };

        // The history is worth keeping even when training failed part way.
        self.export_history()?;
        outcome?;

        info!(summary = %self.stats.format_summary(), "Training complete");
        Ok(())
    }

    /// Record and log every episode the session yields
    fn consume<I>(&mut self, results: I) -> Result<()>
    where
        I: Iterator<Item = Result<EpisodeResult, AgentError>>,
    {
        for result in results {
            let result = result.context("training session failed")?;
            self.stats.record_episode(&result);

            if result.episode % self.config.training.log_frequency == 0 {
                info!(
                    episode = result.episode,
                    score = result.score,
                    record = result.record,
                    mean_score = format_args!("{:.2}", result.mean_score),
                    steps = result.steps,
                    "Episode complete"
                );
            }
        }
        Ok(())
    }

    fn export_history(&self) -> Result<()> {
        let Some(path) = &self.config.training.history_path else {
            return Ok(());
        };
        if self.stats.history().is_empty() {
            warn!("No episodes completed, score history not written");
            return Ok(());
        }

        self.stats
            .write_history(path)
            .with_context(|| format!("writing score history to {}", path.display()))?;
        info!(path = %path.display(), episodes = self.stats.total_episodes(), "Score history written");
        Ok(())
    }

    fn log_header(&self) {
        let game = &self.config.game;
        let agent = &self.config.agent;
        let training = &self.config.training;
        info!(
            grid = format_args!("{}x{}", game.grid_width, game.grid_height),
            max_episodes = ?training.max_episodes,
            model_path = %training.model_path.display(),
            "Starting DQN training"
        );
        info!(
            max_memory = agent.max_memory,
            batch_size = agent.batch_size,
            learning_rate = agent.learning_rate,
            gamma = agent.gamma,
            hidden_size = agent.hidden_size,
            epsilon_start = agent.epsilon_start,
            epsilon_range = agent.epsilon_range,
            seed = ?agent.seed,
            "Agent configuration"
        );
    }
}
