use super::{
    action::{Direction, RelativeAction},
    config::GameConfig,
    state::{GameState, Position, Snake, TerminationCause},
};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Information about a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Why the game ended, if it did
    pub termination: Option<TerminationCause>,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub reward: f32,
    pub terminated: bool,
    pub info: StepInfo,
}

/// The game engine that handles all game logic
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
}

impl GameEngine {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Engine whose food placement is reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Start a fresh episode: centred snake heading right, new food
    pub fn reset(&mut self) -> GameState {
        let center_x = (self.config.grid_width / 2) as i32;
        let center_y = (self.config.grid_height / 2) as i32;

        let snake = Snake::new(
            Position::new(center_x, center_y),
            Direction::Right,
            self.config.initial_snake_length,
        );

        let food = self.spawn_food_avoid_snake(&snake);

        GameState::new(snake, food, self.config.grid_width, self.config.grid_height)
    }

    /// Advance the game by one tick
    pub fn step(&mut self, state: &mut GameState, action: RelativeAction) -> StepResult {
        if !state.is_alive {
            return StepResult {
                reward: 0.0,
                terminated: true,
                info: StepInfo {
                    ate_food: false,
                    termination: None,
                },
            };
        }

        state.steps += 1;
        state.snake.direction = state.snake.direction.turned(action);
        let new_head = state.snake.head().moved_in_direction(state.snake.direction);

        if let Some(cause) = self.check_termination(state, new_head) {
            state.is_alive = false;

            return StepResult {
                reward: self.config.death_penalty,
                terminated: true,
                info: StepInfo {
                    ate_food: false,
                    termination: Some(cause),
                },
            };
        }

        let ate_food = new_head == state.food;
        state.snake.move_snake(ate_food);

        let mut reward = self.config.step_reward;
        if ate_food {
            state.score += 1;
            state.food = self.spawn_food_avoid_snake(&state.snake);
            reward = self.config.food_reward;
        }

        StepResult {
            reward,
            terminated: false,
            info: StepInfo {
                ate_food,
                termination: None,
            },
        }
    }

    fn check_termination(&self, state: &GameState, pos: Position) -> Option<TerminationCause> {
        if !state.is_in_bounds(pos) {
            return Some(TerminationCause::Wall);
        }

        if state.snake.collides_with_body(pos) {
            return Some(TerminationCause::SelfCollision);
        }

        let limit = self.config.stall_factor as usize * state.snake.len();
        if state.steps as usize > limit {
            return Some(TerminationCause::Stalled);
        }

        None
    }

    /// Spawn food at a random empty cell
    fn spawn_food_avoid_snake(&mut self, snake: &Snake) -> Position {
        let (width, height) = (self.config.grid_width, self.config.grid_height);

        for _ in 0..width * height * 4 {
            let x = self.rng.random_range(0..width) as i32;
            let y = self.rng.random_range(0..height) as i32;
            let pos = Position::new(x, y);

            if !snake.body.contains(&pos) {
                return pos;
            }
        }

        // Nearly full board: take the first free cell, or the head if none is left.
        (0..height as i32)
            .flat_map(|y| (0..width as i32).map(move |x| Position::new(x, y)))
            .find(|pos| !snake.body.contains(pos))
            .unwrap_or_else(|| snake.head())
    }
}
