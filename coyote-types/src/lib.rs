//! Type definitions for the game-state side of coyote

pub mod error;
pub mod game_state;
pub mod recognition;
pub mod stats;

pub use error::{Error, Result};
pub use game_state::{GameState, Load, Observation};
pub use recognition::Recognition;
pub use stats::PollStats;
