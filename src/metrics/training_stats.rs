//! Training statistics and score history
//!
//! Keeps rolling averages over the most recent episodes for progress logs,
//! and the full `(episode, score, mean_score)` history that can be exported
//! as JSON once training stops.

use std::collections::VecDeque;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::rl::EpisodeResult;

/// One row of the score history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScorePoint {
    pub episode: usize,
    pub score: u32,
    /// Mean score over every episode up to and including this one
    pub mean_score: f64,
}

/// Training statistics tracker with rolling averages
///
/// # Example
///
/// ```rust
/// use snake_dqn::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(100);
/// stats.record(1, 5, 40, -10.0, Some(0.5));
///
/// assert_eq!(stats.record_score(), 5);
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    scores: VecDeque<u32>,
    lengths: VecDeque<usize>,
    rewards: VecDeque<f32>,
    replay_losses: VecDeque<f32>,
    history: Vec<ScorePoint>,
    total_episodes: usize,
    total_steps: usize,
    total_score: u64,
    record: u32,
    window_size: usize,
}

impl TrainingStats {
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            scores: VecDeque::with_capacity(window_size),
            lengths: VecDeque::with_capacity(window_size),
            rewards: VecDeque::with_capacity(window_size),
            replay_losses: VecDeque::with_capacity(window_size),
            history: Vec::new(),
            total_episodes: 0,
            total_steps: 0,
            total_score: 0,
            record: 0,
            window_size,
        }
    }

    /// Record the completion of an episode
    pub fn record(
        &mut self,
        episode: usize,
        score: u32,
        steps: usize,
        reward: f32,
        replay_loss: Option<f32>,
    ) {
        Self::push_deque(&mut self.scores, score, self.window_size);
        Self::push_deque(&mut self.lengths, steps, self.window_size);
        Self::push_deque(&mut self.rewards, reward, self.window_size);
        if let Some(loss) = replay_loss {
            Self::push_deque(&mut self.replay_losses, loss, self.window_size);
        }

        self.total_episodes += 1;
        self.total_steps += steps;
        self.total_score += u64::from(score);
        self.record = self.record.max(score);

        self.history.push(ScorePoint {
            episode,
            score,
            mean_score: self.mean_score(),
        });
    }

    pub fn record_episode(&mut self, result: &EpisodeResult) {
        self.record(
            result.episode,
            result.score,
            result.steps,
            result.total_reward,
            result.replay_loss,
        );
    }

    /// Mean score over every recorded episode
    pub fn mean_score(&self) -> f64 {
        if self.total_episodes == 0 {
            return 0.0;
        }
        self.total_score as f64 / self.total_episodes as f64
    }

    /// Mean score over the rolling window
    pub fn rolling_mean_score(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        self.scores.iter().map(|&s| f64::from(s)).sum::<f64>() / self.scores.len() as f64
    }

    pub fn mean_episode_length(&self) -> f32 {
        if self.lengths.is_empty() {
            return 0.0;
        }
        self.lengths.iter().sum::<usize>() as f32 / self.lengths.len() as f32
    }

    pub fn mean_episode_reward(&self) -> f32 {
        Self::mean(&self.rewards)
    }

    pub fn mean_replay_loss(&self) -> f32 {
        Self::mean(&self.replay_losses)
    }

    /// Best score seen so far
    pub fn record_score(&self) -> u32 {
        self.record
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn history(&self) -> &[ScorePoint] {
        &self.history
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Episodes: {} | Steps: {} | Record: {} | Mean: {:.2} | Recent: {:.2} | Len: {:.1} | Reward: {:.2} | Loss: {:.4}",
            self.total_episodes,
            self.total_steps,
            self.record,
            self.mean_score(),
            self.rolling_mean_score(),
            self.mean_episode_length(),
            self.mean_episode_reward(),
            self.mean_replay_loss(),
        )
    }

    /// Write the score history as a JSON array, creating parent directories
    pub fn write_history(&self, path: &Path) -> Result<(), PersistenceError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| PersistenceError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(&self.history)?;
        std::fs::write(path, json).map_err(|source| PersistenceError::MetadataWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    fn mean(deque: &VecDeque<f32>) -> f32 {
        if deque.is_empty() {
            0.0
        } else {
            deque.iter().sum::<f32>() / deque.len() as f32
        }
    }

    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new() {
        let stats = TrainingStats::new(100);
        assert_eq!(stats.window_size(), 100);
        assert_eq!(stats.total_episodes(), 0);
        assert_eq!(stats.mean_score(), 0.0);
        assert_eq!(stats.rolling_mean_score(), 0.0);
        assert_eq!(stats.mean_replay_loss(), 0.0);
        assert!(stats.history().is_empty());
    }

    #[test]
    fn test_record_tracks_totals_and_record() {
        let mut stats = TrainingStats::new(100);
        stats.record(1, 3, 50, 20.0, Some(1.5));
        stats.record(2, 7, 80, 60.0, Some(0.5));
        stats.record(3, 2, 30, 10.0, None);

        assert_eq!(stats.total_episodes(), 3);
        assert_eq!(stats.total_steps(), 160);
        assert_eq!(stats.record_score(), 7);
        assert!((stats.mean_score() - 4.0).abs() < 1e-9);
        assert!((stats.mean_replay_loss() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rolling_window_evicts_oldest() {
        let mut stats = TrainingStats::new(2);
        stats.record(1, 10, 1, 0.0, None);
        stats.record(2, 2, 1, 0.0, None);
        stats.record(3, 4, 1, 0.0, None);

        assert!((stats.rolling_mean_score() - 3.0).abs() < 1e-9);
        assert!((stats.mean_score() - 16.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.record_score(), 10);
    }

    #[test]
    fn test_history_carries_running_mean() {
        let mut stats = TrainingStats::new(10);
        for (i, score) in [3, 7, 2].into_iter().enumerate() {
            stats.record(i + 1, score, 10, 0.0, None);
        }

        let means: Vec<f64> = stats.history().iter().map(|p| p.mean_score).collect();
        assert_eq!(means, vec![3.0, 5.0, 4.0]);
        assert_eq!(stats.history()[1].episode, 2);
    }

    #[test]
    fn test_format_summary() {
        let mut stats = TrainingStats::new(100);
        stats.record(1, 5, 150, 15.5, Some(0.02));

        let summary = stats.format_summary();
        assert!(summary.contains("Episodes: 1"));
        assert!(summary.contains("Steps: 150"));
        assert!(summary.contains("Record: 5"));
        assert!(summary.contains("Mean: 5.00"));
        assert!(summary.contains("Len: 150.0"));
        assert!(summary.contains("Loss: 0.0200"));
    }

    #[test]
    fn test_write_history_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("runs").join("scores.json");
        let mut stats = TrainingStats::new(10);
        stats.record(1, 1, 5, -10.0, None);
        stats.record(2, 3, 9, 10.0, None);

        stats.write_history(&path).unwrap();

        let json = std::fs::read_to_string(&path).unwrap();
        let rows: Vec<ScorePoint> = serde_json::from_str(&json).unwrap();
        assert_eq!(rows, stats.history());
    }
}
