//! Game Engine
//!
//! Creates, loads, and advances games. Games are persisted through an
//! injected [`Store`] as bincode blobs. Saves are version-checked, so a game
//! modified by someone else since it was loaded fails with a write conflict
//! instead of silently overwriting their attempt.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::score::score_word;
use super::state::{Attempt, Game, GameStatus, Rejection, StatusReport};
use crate::dictionary::{Dictionary, DictionaryError};
use crate::store::{Store, StoreError};

/// Reload-and-retry budget for `*_by_id` operations that hit a write conflict.
pub const MAX_WRITE_RETRIES: usize = 16;

/// Store holding serialized games.
pub type GameStore = dyn Store<Vec<u8>>;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Game rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    /// Letters per word.
    pub word_length: usize,
    /// Ceiling on all attempts, valid or not.
    pub max_attempts: usize,
    /// Ceiling on attempts that passed validation.
    pub max_valid_attempts: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            word_length: crate::WORD_LENGTH,
            max_attempts: 12,
            max_valid_attempts: 6,
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Game engine errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Validation failure outside a turn (bad secret word).
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// No game is stored under this ID.
    #[error("game {0} not found")]
    NotFound(String),

    /// Stored bytes are not a game, or a game failed to encode.
    #[error("game serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Scoring was handed a result buffer of the wrong size.
    #[error("result buffer holds {actual} hints, expected {expected}")]
    NilResult {
        /// Letters in the secret.
        expected: usize,
        /// Hints the buffer can hold.
        actual: usize,
    },

    /// The dictionary could not be loaded.
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),

    /// Store failure, including invalid IDs and write conflicts.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GameError {
    /// Is this a stale-write conflict that a reload may resolve.
    pub fn is_conflict(&self) -> bool {
        matches!(self, GameError::Store(StoreError::Conflict { .. }))
    }
}

/// Outcome of a move. A rejected move still carries a current report.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    /// Game state after the move.
    pub report: StatusReport,
    /// Why the move was refused, if it was.
    pub rejection: Option<Rejection>,
}

impl Turn {
    fn accepted(report: StatusReport) -> Self {
        Self {
            report,
            rejection: None,
        }
    }

    fn rejected(report: StatusReport, rejection: Rejection) -> Self {
        Self {
            report,
            rejection: Some(rejection),
        }
    }

    /// True if the move was applied as requested.
    pub fn is_accepted(&self) -> bool {
        self.rejection.is_none()
    }
}

fn new_game_id() -> String {
    Uuid::new_v4().simple().to_string()
}

// =============================================================================
// ENGINE
// =============================================================================

/// Drives games against a dictionary and a store.
pub struct GameEngine {
    config: GameConfig,
    dictionary: Arc<Dictionary>,
    store: Arc<GameStore>,
}

impl GameEngine {
    /// Create an engine over shared dictionary and store instances.
    pub fn new(config: GameConfig, dictionary: Arc<Dictionary>, store: Arc<GameStore>) -> Self {
        Self {
            config,
            dictionary,
            store,
        }
    }

    /// Game rules in force.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Dictionary used for validation and generation.
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Uppercase `word` and check its length and dictionary membership.
    /// A word equal to `secret` needs no dictionary entry.
    fn validate_word(&self, word: &str, secret: &str) -> Result<String, Rejection> {
        let word = word.to_uppercase();
        if word.chars().count() != self.config.word_length {
            return Err(Rejection::WordLength);
        }
        if word == secret.to_uppercase() {
            return Ok(word);
        }
        if !self.dictionary.is_word_valid(&word) {
            return Err(Rejection::WordNotInDictionary);
        }
        Ok(word)
    }

    /// Encode and save `game` at the version it was loaded at.
    fn persist(&self, game: &mut Game) -> Result<(), GameError> {
        let bytes = bincode::serialize(game)?;
        game.version = self.store.save_if_version(&game.id, game.version, bytes)?;
        Ok(())
    }

    /// Start a game. Without a secret (or with an empty one) a random
    /// dictionary word is used.
    pub fn create(&self, secret_word: Option<&str>) -> Result<Game, GameError> {
        let secret = match secret_word.filter(|w| !w.is_empty()) {
            Some(word) => word.to_string(),
            None => self.dictionary.generate_word()?,
        };
        let secret = self.validate_word(&secret, &secret)?;

        let mut game = Game::new(new_game_id(), secret);
        self.persist(&mut game)?;

        info!("Created game {}", game.id);
        Ok(game)
    }

    /// Load a game by ID.
    ///
    /// A valid but absent ID is [`GameError::NotFound`], not a serialization
    /// error, so callers can tell a missing game from a corrupt record.
    pub fn retrieve(&self, id: &str) -> Result<Game, GameError> {
        let record = self
            .store
            .load(id)?
            .ok_or_else(|| GameError::NotFound(id.to_string()))?;

        let mut game: Game = bincode::deserialize(&record.content)?;
        game.version = record.version;
        Ok(game)
    }

    /// Submit a guess.
    ///
    /// Refused guesses come back as a [`Turn`] with a rejection. Rejected
    /// words still use up an attempt and are saved. On `Err` the in-memory
    /// `game` may be ahead of the store and should be reloaded.
    pub fn play(&self, game: &mut Game, try_word: &str) -> Result<Turn, GameError> {
        if game.status.is_terminal() {
            debug!("Game {} is over, ignoring guess", game.id);
            return Ok(Turn::rejected(game.describe(), Rejection::GameOver));
        }

        if game.turns_exhausted(&self.config) {
            game.status = GameStatus::Lost;
            game.touch();
            self.persist(game)?;
            info!("Game {} out of turns", game.id);
            return Ok(Turn::rejected(game.describe(), Rejection::OutOfTurns));
        }

        let mut attempt = Attempt::blank(self.config.word_length);
        let rejection = match self.validate_word(try_word, &game.secret_word) {
            Ok(word) => {
                score_word(&game.secret_word, &word, &mut attempt.try_result)?;
                attempt.try_word = word;
                attempt.is_valid_word = true;
                None
            }
            Err(rejection) => {
                attempt.try_word = try_word.to_uppercase();
                Some(rejection)
            }
        };

        let won = attempt.is_winner();
        debug!(
            "Game {} attempt {}: {} {:?}",
            game.id,
            game.attempts.len() + 1,
            attempt.try_word,
            rejection
        );
        game.record_attempt(attempt);

        if won {
            game.status = GameStatus::Won;
        } else if game.turns_exhausted(&self.config) {
            game.status = GameStatus::Lost;
        }
        self.persist(game)?;

        if game.status.is_terminal() {
            info!("Game {} finished: {:?}", game.id, game.status);
        }

        let report = game.describe();
        Ok(match rejection {
            Some(rejection) => Turn::rejected(report, rejection),
            None => Turn::accepted(report),
        })
    }

    /// Give up. Finished games are refused with [`Rejection::GameOver`] and
    /// left untouched.
    pub fn resign(&self, game: &mut Game) -> Result<Turn, GameError> {
        if game.status.is_terminal() {
            return Ok(Turn::rejected(game.describe(), Rejection::GameOver));
        }

        game.status = GameStatus::Resigned;
        game.touch();
        self.persist(game)?;

        info!("Game {} resigned", game.id);
        Ok(Turn::accepted(game.describe()))
    }

    /// Load, guess, and save, reloading if another writer got there first.
    pub fn play_by_id(&self, id: &str, try_word: &str) -> Result<Turn, GameError> {
        self.update(id, |engine, game| engine.play(game, try_word))
    }

    /// Load, resign, and save, reloading if another writer got there first.
    pub fn resign_by_id(&self, id: &str) -> Result<Turn, GameError> {
        self.update(id, |engine, game| engine.resign(game))
    }

    fn update<F>(&self, id: &str, mut apply: F) -> Result<Turn, GameError>
    where
        F: FnMut(&Self, &mut Game) -> Result<Turn, GameError>,
    {
        let mut retries = 0;
        loop {
            let mut game = self.retrieve(id)?;
            match apply(self, &mut game) {
                Err(e) if e.is_conflict() && retries < MAX_WRITE_RETRIES => {
                    retries += 1;
                    warn!("Write conflict on game {}, retry {}", id, retries);
                }
                result => return result,
            }
        }
    }

    /// Status report for a stored game.
    pub fn describe(&self, id: &str) -> Result<StatusReport, GameError> {
        Ok(self.retrieve(id)?.describe())
    }

    /// Remove a game from the store.
    pub fn delete(&self, id: &str) -> Result<(), GameError> {
        match self.store.delete(id) {
            Err(StoreError::NotFound(id)) => Err(GameError::NotFound(id)),
            result => {
                result?;
                info!("Deleted game {}", id);
                Ok(())
            }
        }
    }
}
