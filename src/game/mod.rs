//! Game Logic Module
//!
//! Word-guessing rules and the engine that applies them.
//!
//! ## Module Structure
//!
//! - `hint`: Per-letter hints and their wire names
//! - `score`: Duplicate-aware guess scoring
//! - `state`: Game record, attempts, status report
//! - `engine`: Create/retrieve/play/resign over a store

pub mod engine;
pub mod hint;
pub mod score;
pub mod state;

// Re-export key types
pub use engine::{GameConfig, GameEngine, GameError, GameStore, Turn};
pub use hint::LetterHint;
pub use score::{score, score_word};
pub use state::{Attempt, Game, GameStatus, Rejection, StatusReport};
