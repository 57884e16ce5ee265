//! Greedy evaluation of a saved model
//!
//! Loads the network written by training and plays a fixed number of
//! episodes with no exploration, logging each score.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tracing::info;

use crate::game::GameConfig;
use crate::rl::{
    Game, InferenceBackend, QModel, QNetwork, SnakeEnvironment, default_device, extract_state,
    greedy_action, load_network,
};

/// Scores of an evaluation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayReport {
    pub scores: Vec<u32>,
}

impl PlayReport {
    pub fn best(&self) -> u32 {
        self.scores.iter().copied().max().unwrap_or(0)
    }

    pub fn mean(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        self.scores.iter().map(|&s| f64::from(s)).sum::<f64>() / self.scores.len() as f64
    }
}

pub struct PlayMode {
    network: QNetwork<InferenceBackend>,
    env: SnakeEnvironment,
    episodes: usize,
    stop: Arc<AtomicBool>,
}

impl PlayMode {
    pub fn new(model_path: &Path, config: GameConfig, episodes: usize) -> Result<Self> {
        config.validate().context("invalid game configuration")?;

        let (network, metadata) = load_network::<InferenceBackend>(model_path, &default_device())
            .with_context(|| format!("loading model from {}", model_path.display()))?;
        info!(
            path = %model_path.display(),
            episode = metadata.episode,
            score = metadata.score,
            version = %metadata.version,
            "Loaded model"
        );

        Ok(Self {
            network,
            env: SnakeEnvironment::new(config),
            episodes,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    pub fn run(&mut self) -> Result<PlayReport> {
        let mut report = PlayReport::default();

        for episode in 1..=self.episodes {
            let Some(score) = play_episode(&mut self.env, &self.network, &self.stop)? else {
                break;
            };
            report.scores.push(score);
            info!(episode, score, "Episode complete");
        }

        info!(
            episodes = report.scores.len(),
            best = report.best(),
            mean_score = format_args!("{:.2}", report.mean()),
            "Evaluation complete"
        );
        Ok(report)
    }
}

/// Play one greedy episode from a fresh reset; `None` if interrupted
fn play_episode<G, M>(game: &mut G, model: &M, stop: &AtomicBool) -> Result<Option<u32>>
where
    G: Game + ?Sized,
    M: QModel + ?Sized,
{
    game.reset()?;
    loop {
        if stop.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let state = extract_state(&*game)?;
        let action = greedy_action(model, &state)?;
        let outcome = game.step(action)?;
        if outcome.terminal {
            return Ok(Some(outcome.score));
        }
    }
}

/// Default location of the model written by `train`
pub fn default_model_path() -> PathBuf {
    crate::modes::TrainConfig::default().model_path
}
