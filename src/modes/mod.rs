pub mod play;
pub mod train;

pub use play::{PlayMode, PlayReport};
pub use train::{TrainConfig, TrainMode};
