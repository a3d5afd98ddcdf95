//! # Wordle Game Server
//!
//! Stateful five-letter word guessing game, served over WebSocket.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      WORDLE SERVER                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  dictionary/     - Word list, membership, random secrets     │
//! │                                                              │
//! │  store/          - ID-keyed versioned persistence            │
//! │                                                              │
//! │  game/           - Game rules                                │
//! │  ├── hint.rs     - Per-letter hints                          │
//! │  ├── score.rs    - Duplicate-aware scoring                   │
//! │  ├── state.rs    - Game, attempts, status report             │
//! │  └── engine.rs   - Create / play / resign over the store     │
//! │                                                              │
//! │  network/        - WebSocket API                             │
//! │  ├── server.rs   - Connection handling                       │
//! │  └── protocol.rs - Message types                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! Every shared component is safe to use from many threads at once:
//! - The dictionary loads its word list exactly once
//! - The store guards its map with a reader/writer lock
//! - Game saves are version-checked, so concurrent guesses on one game
//!   are retried rather than lost

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod dictionary;
pub mod game;
pub mod network;
pub mod store;

// Re-export commonly used types
pub use dictionary::{Dictionary, DictionaryError, WordSource};
pub use game::{GameConfig, GameEngine, GameError, GameStatus, LetterHint, Rejection, StatusReport, Turn};
pub use network::{GameServer, ServerConfig};
pub use store::{MemoryStore, Store, StoreError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Letters per word
pub const WORD_LENGTH: usize = 5;
