//! Snake Rush: an endless single-player snake game.
//!
//! This crate is the simulation core. It owns the snake, the food board, the
//! speed curve and the leaderboard, and knows nothing about windows or audio
//! devices; the `snake_rush` binary drives it with ggez.

pub mod config;
pub mod error;
pub mod food;
pub mod grid;
pub mod leaderboard;
pub mod policy;
pub mod session;
pub mod snake;

pub use config::{Config, Settings};
pub use error::{ConfigError, PersistenceError};
pub use food::{Food, FoodTier};
pub use grid::{Direction, Grid, Position};
pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use session::{Command, MusicCue, Session, SessionEvent, SessionState, Snapshot, Sound};
pub use snake::{Snake, Step};
