use serde::{Deserialize, Serialize};

/// Number of actions the agent can choose from
pub const NUM_ACTIONS: usize = 3;

/// Absolute direction of travel on the board
///
/// Screen coordinates: `y` grows downward, so `Up` is `(0, -1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns the delta (dx, dy) for moving in this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// The direction reached by a right turn
    pub fn clockwise(&self) -> Direction {
        match self {
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
            Direction::Up => Direction::Right,
        }
    }

    /// The direction reached by a left turn
    pub fn counter_clockwise(&self) -> Direction {
        match self {
            Direction::Right => Direction::Up,
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
        }
    }

    /// Heading after applying a relative action
    pub fn turned(&self, action: RelativeAction) -> Direction {
        match action {
            RelativeAction::Straight => *self,
            RelativeAction::TurnRight => self.clockwise(),
            RelativeAction::TurnLeft => self.counter_clockwise(),
        }
    }
}

/// Action relative to the snake's current heading
///
/// The index order matches the one-hot layout fed to the trainer:
/// `[straight, right, left]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelativeAction {
    Straight,
    TurnRight,
    TurnLeft,
}

impl RelativeAction {
    pub const ALL: [RelativeAction; NUM_ACTIONS] = [
        RelativeAction::Straight,
        RelativeAction::TurnRight,
        RelativeAction::TurnLeft,
    ];

    /// Position of this action in the one-hot vector
    pub fn index(&self) -> usize {
        match self {
            RelativeAction::Straight => 0,
            RelativeAction::TurnRight => 1,
            RelativeAction::TurnLeft => 2,
        }
    }

    /// Inverse of [`RelativeAction::index`]; `None` for out-of-range indices
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn one_hot(&self) -> [f32; NUM_ACTIONS] {
        let mut encoded = [0.0; NUM_ACTIONS];
        encoded[self.index()] = 1.0;
        encoded
    }
}
