//! Episode loop
//!
//! A [`TrainingSession`] is an endless iterator: every call to `next` plays
//! one complete episode and yields its [`EpisodeResult`]. Bound a run with
//! `take`, or hand the session a stop flag that an interrupt handler raises.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::error::AgentError;

use super::agent::Agent;
use super::environment::Game;
use super::model::{Checkpoint, Learner};
use super::transition::Transition;

/// Summary of one completed episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeResult {
    /// 1-based episode number, equal to the agent's episode counter
    pub episode: usize,
    pub score: u32,
    /// Best score seen so far, this episode included
    pub record: u32,
    /// Whether this episode beat the record and the model was saved
    pub new_record: bool,
    pub steps: usize,
    pub total_reward: f32,
    /// Loss of the end-of-episode replay update
    pub replay_loss: Option<f32>,
    /// Mean score over every episode of the session
    pub mean_score: f64,
}

pub struct TrainingSession<G, L, R = StdRng> {
    game: G,
    agent: Agent<L, R>,
    record: Option<u32>,
    total_score: u64,
    stop: Option<Arc<AtomicBool>>,
    finished: bool,
}

impl<G: Game, L: Learner, R: Rng> TrainingSession<G, L, R> {
    pub fn new(game: G, agent: Agent<L, R>) -> Self {
        Self {
            game,
            agent,
            record: None,
            total_score: 0,
            stop: None,
            finished: false,
        }
    }

    /// End the session before the next step once `flag` is raised
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop = Some(flag);
        self
    }

    /// Start from a known best score, e.g. one read back from saved metadata
    pub fn with_record(mut self, record: u32) -> Self {
        self.record = Some(record);
        self
    }

    pub fn record(&self) -> Option<u32> {
        self.record
    }

    pub fn agent(&self) -> &Agent<L, R> {
        &self.agent
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn into_parts(self) -> (G, Agent<L, R>) {
        (self.game, self.agent)
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Run steps until the game reports a terminal transition
    ///
    /// Returns `Ok(None)` when the stop flag interrupts the episode.
    fn play_episode(&mut self) -> Result<Option<EpisodeResult>, AgentError> {
        let mut steps = 0;
        let mut total_reward = 0.0;

        loop {
            if self.stop_requested() {
                return Ok(None);
            }

            let state = self.agent.state_of(&self.game)?;
            let action = self.agent.select_action(&state)?;
            let outcome = self.game.step(action)?;
            let next_state = self.agent.state_of(&self.game)?;

            steps += 1;
            total_reward += outcome.reward;

            let transition = Transition::new(
                state,
                action,
                outcome.reward,
                next_state,
                outcome.terminal,
            );
            self.agent.train_step_immediate(&transition)?;
            self.agent.observe(transition);

            if outcome.terminal {
                return self
                    .finish_episode(outcome.score, steps, total_reward)
                    .map(Some);
            }
        }
    }

    fn finish_episode(
        &mut self,
        score: u32,
        steps: usize,
        total_reward: f32,
    ) -> Result<EpisodeResult, AgentError> {
        self.game.reset()?;
        let replay_loss = self.agent.complete_episode()?;
        let episode = self.agent.episodes();

        if let Some(loss) = replay_loss {
            debug!(episode, loss, memory = self.agent.memory().len(), "Replay update");
        }

        let new_record = matches!(self.record, Some(best) if score > best);
        let record = match self.record {
            Some(best) => best.max(score),
            None => score,
        };
        self.record = Some(record);

        if new_record {
            self.agent
                .learner()
                .save(&Checkpoint { episode, score })?;
            info!(episode, score, "New record, model saved");
        }

        self.total_score += u64::from(score);
        let mean_score = self.total_score as f64 / episode as f64;

        Ok(EpisodeResult {
            episode,
            score,
            record,
            new_record,
            steps,
            total_reward,
            replay_loss,
            mean_score,
        })
    }
}

impl<G: Game, L: Learner, R: Rng> Iterator for TrainingSession<G, L, R> {
    type Item = Result<EpisodeResult, AgentError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.play_episode() {
            Ok(Some(result)) => Some(Ok(result)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}
