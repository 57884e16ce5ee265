use crate::error::AgentError;
use crate::game::{
    Direction, GameConfig, GameEngine, GameState, Position, RelativeAction, StepResult,
};

/// What the game reports back after one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub reward: f32,
    pub terminal: bool,
    /// Score of the running episode after this tick
    pub score: u32,
}

/// The game as seen by the learning loop
///
/// `is_collision` must answer for arbitrary board points, not just the head,
/// so the feature extractor can look one cell ahead in every direction.
pub trait Game {
    fn head(&self) -> Position;
    fn heading(&self) -> Direction;
    fn food(&self) -> Position;
    fn body(&self) -> &[Position];
    fn is_collision(&self, point: Position) -> Result<bool, AgentError>;
    fn step(&mut self, action: RelativeAction) -> Result<StepOutcome, AgentError>;
    fn reset(&mut self) -> Result<(), AgentError>;
}

/// Snake environment for reinforcement learning
///
/// Wraps the game engine and its current state behind the [`Game`] contract.
pub struct SnakeEnvironment {
    engine: GameEngine,
    state: GameState,
    last_step: Option<StepResult>,
}

impl SnakeEnvironment {
    pub fn new(config: GameConfig) -> Self {
        Self::from_engine(GameEngine::new(config))
    }

    /// Environment with reproducible food placement
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::from_engine(GameEngine::with_seed(config, seed))
    }

    fn from_engine(mut engine: GameEngine) -> Self {
        let state = engine.reset();
        Self {
            engine,
            state,
            last_step: None,
        }
    }

    /// Current game state (for testing/debugging)
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Full result of the most recent tick, including why the game ended
    pub fn last_step(&self) -> Option<&StepResult> {
        self.last_step.as_ref()
    }
}

impl Game for SnakeEnvironment {
    fn head(&self) -> Position {
        self.state.snake.head()
    }

    fn heading(&self) -> Direction {
        self.state.snake.direction
    }

    fn food(&self) -> Position {
        self.state.food
    }

    fn body(&self) -> &[Position] {
        &self.state.snake.body
    }

    fn is_collision(&self, point: Position) -> Result<bool, AgentError> {
        Ok(self.state.is_collision(point))
    }

    fn step(&mut self, action: RelativeAction) -> Result<StepOutcome, AgentError> {
        let result = self.engine.step(&mut self.state, action);
        let outcome = StepOutcome {
            reward: result.reward,
            terminal: result.terminated,
            score: self.state.score,
        };
        self.last_step = Some(result);
        Ok(outcome)
    }

    fn reset(&mut self) -> Result<(), AgentError> {
        self.state = self.engine.reset();
        self.last_step = None;
        Ok(())
    }
}
