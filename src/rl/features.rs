//! Reduction of a game snapshot to the 11-feature state vector

use crate::error::AgentError;
use crate::game::Direction;

use super::environment::Game;
use super::transition::{STATE_SIZE, StateVector};

/// Build the state vector for the game's current snapshot
///
/// Danger is probed one cell from the head in every absolute direction and
/// then read relative to the heading: straight is the heading itself, right
/// its clockwise neighbour, left its counter-clockwise neighbour. Collision
/// test failures propagate.
pub fn extract_state<G: Game + ?Sized>(game: &G) -> Result<StateVector, AgentError> {
    let head = game.head();
    let heading = game.heading();
    let food = game.food();

    let danger = |direction: Direction| game.is_collision(head.moved_in_direction(direction));

    let mut features = [false; STATE_SIZE];

    features[0] = danger(heading)?;
    features[1] = danger(heading.clockwise())?;
    features[2] = danger(heading.counter_clockwise())?;

    features[3] = heading == Direction::Left;
    features[4] = heading == Direction::Right;
    features[5] = heading == Direction::Up;
    features[6] = heading == Direction::Down;

    features[7] = food.x < head.x;
    features[8] = food.x > head.x;
    features[9] = food.y < head.y;
    features[10] = food.y > head.y;

    Ok(StateVector::from_flags(features))
}
