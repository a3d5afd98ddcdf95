//! Game State Definitions
//!
//! The game record, its attempts, and the status report handed to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::engine::GameConfig;
use super::hint::LetterHint;

// =============================================================================
// GAME STATUS
// =============================================================================

/// Lifecycle state of a game. Only `InPlay` accepts further moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameStatus {
    /// Accepting guesses.
    #[default]
    InPlay,
    /// Secret word guessed.
    Won,
    /// Ran out of attempts.
    Lost,
    /// Player gave up.
    Resigned,
}

impl GameStatus {
    /// Is this an absorbing state.
    #[inline]
    pub fn is_terminal(self) -> bool {
        self != GameStatus::InPlay
    }
}

// =============================================================================
// REJECTIONS
// =============================================================================

/// Recoverable refusals. Always delivered together with a status report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// The game is no longer in play.
    #[error("game is finished")]
    GameOver,
    /// The attempt ceiling was already reached.
    #[error("out of turns")]
    OutOfTurns,
    /// The word has the wrong number of letters.
    #[error("invalid word length")]
    WordLength,
    /// The word is the right length but not in the dictionary.
    #[error("word is not in dictionary")]
    WordNotInDictionary,
}

// =============================================================================
// ATTEMPT
// =============================================================================

/// One submitted guess and its hints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    /// Uppercased guess as submitted.
    pub try_word: String,
    /// Passed length and dictionary checks.
    pub is_valid_word: bool,
    /// One hint per position; all Blank unless the word was valid.
    pub try_result: Vec<LetterHint>,
    /// When the attempt was made.
    #[serde(rename = "timeStamp")]
    pub timestamp: DateTime<Utc>,
}

impl Attempt {
    /// Unscored attempt with a Blank-filled result.
    pub fn blank(word_length: usize) -> Self {
        Self {
            try_word: String::new(),
            is_valid_word: false,
            try_result: vec![LetterHint::Blank; word_length],
            timestamp: Utc::now(),
        }
    }

    /// Every position scored Green.
    pub fn is_winner(&self) -> bool {
        !self.try_result.is_empty() && self.try_result.iter().all(|h| *h == LetterHint::Green)
    }
}

// =============================================================================
// GAME
// =============================================================================

/// A single game.
///
/// Persisted as an opaque blob; `version` is the store version this copy
/// was loaded at and is never serialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub(crate) id: String,
    pub(crate) secret_word: String,
    pub(crate) status: GameStatus,
    pub(crate) attempts: Vec<Attempt>,
    pub(crate) valid_attempts: u32,
    pub(crate) last_updated: DateTime<Utc>,
    #[serde(skip)]
    pub(crate) version: u64,
}

impl Game {
    /// Fresh in-play game. `secret_word` must already be validated.
    pub(crate) fn new(id: String, secret_word: String) -> Self {
        Self {
            id,
            secret_word,
            status: GameStatus::InPlay,
            attempts: Vec::new(),
            valid_attempts: 0,
            last_updated: Utc::now(),
            version: 0,
        }
    }

    /// Game identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The secret word.
    pub fn secret_word(&self) -> &str {
        &self.secret_word
    }

    /// Current status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Attempts in submission order.
    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    /// Attempts whose word passed validation.
    pub fn valid_attempts(&self) -> u32 {
        self.valid_attempts
    }

    /// Time of the last mutation.
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Store version this copy was loaded or saved at.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Either attempt ceiling reached.
    pub fn turns_exhausted(&self, config: &GameConfig) -> bool {
        self.attempts.len() >= config.max_attempts
            || self.valid_attempts as usize >= config.max_valid_attempts
    }

    /// Append an attempt, counting it as valid if its word passed validation.
    pub(crate) fn record_attempt(&mut self, attempt: Attempt) {
        if attempt.is_valid_word {
            self.valid_attempts += 1;
        }
        self.attempts.push(attempt);
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    /// Snapshot for callers. Does not mutate the game.
    pub fn describe(&self) -> StatusReport {
        StatusReport {
            id: self.id.clone(),
            game_status: self.status,
            secret_word: self.status.is_terminal().then(|| self.secret_word.clone()),
            attempts: self.attempts.clone(),
            attempts_used: self.attempts.len(),
            valid_attempts: self.valid_attempts,
            winning_attempt: (self.status == GameStatus::Won).then_some(self.attempts.len()),
            last_updated: self.last_updated,
        }
    }
}

// =============================================================================
// STATUS REPORT
// =============================================================================

/// Externally visible snapshot of a game.
///
/// The secret word is only revealed once the game is over.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    /// Game identifier.
    pub id: String,
    /// Current status.
    pub game_status: GameStatus,
    /// Present only when the game is not in play.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_word: Option<String>,
    /// All attempts so far.
    pub attempts: Vec<Attempt>,
    /// Number of attempts, valid or not.
    pub attempts_used: usize,
    /// Number of valid attempts.
    pub valid_attempts: u32,
    /// 1-based attempt number that won. Present only when won.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_attempt: Option<usize>,
    /// Time of the last mutation.
    pub last_updated: DateTime<Utc>,
}

impl StatusReport {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_game() -> Game {
        Game::new("c0ffee".to_string(), "HAPPY".to_string())
    }

    #[test]
    fn test_new_game_in_play() {
        let game = sample_game();
        assert_eq!(game.status(), GameStatus::InPlay);
        assert!(game.attempts().is_empty());
        assert_eq!(game.valid_attempts(), 0);
    }

    #[test]
    fn test_blank_attempt() {
        let attempt = Attempt::blank(5);
        assert_eq!(attempt.try_word, "");
        assert!(!attempt.is_valid_word);
        assert_eq!(attempt.try_result, vec![LetterHint::Blank; 5]);
        assert!(!attempt.is_winner());
    }

    #[test]
    fn test_record_attempt_counts_valid_words() {
        let mut game = sample_game();

        let mut valid = Attempt::blank(5);
        valid.try_word = "CRANE".to_string();
        valid.is_valid_word = true;
        game.record_attempt(valid);
        game.record_attempt(Attempt::blank(5));

        assert_eq!(game.attempts().len(), 2);
        assert_eq!(game.attempts()[0].try_word, "CRANE");
        assert_eq!(game.valid_attempts(), 1);
    }

    #[test]
    fn test_report_hides_secret_in_play() {
        let json = sample_game().describe().to_json().unwrap();

        for field in ["\"id\"", "\"gameStatus\"", "\"attempts\"", "\"attemptsUsed\"", "\"validAttempts\""] {
            assert!(json.contains(field), "missing {field} in {json}");
        }
        assert!(!json.contains("secretWord"));
        assert!(!json.contains("winningAttempt"));
        assert!(json.contains("\"InPlay\""));
    }

    #[test]
    fn test_report_reveals_secret_when_over() {
        let mut game = sample_game();
        game.status = GameStatus::Resigned;

        let report = game.describe();
        assert_eq!(report.secret_word.as_deref(), Some("HAPPY"));
        assert_eq!(report.winning_attempt, None);
    }

    #[test]
    fn test_report_winning_attempt() {
        let mut game = sample_game();
        game.record_attempt(Attempt::blank(5));
        game.record_attempt(Attempt::blank(5));
        game.status = GameStatus::Won;

        let report = game.describe();
        assert_eq!(report.winning_attempt, Some(2));
        assert_eq!(report.attempts_used, 2);
    }

    #[test]
    fn test_attempt_json_field_names() {
        let json = serde_json::to_string(&Attempt::blank(5)).unwrap();
        for field in ["tryWord", "isValidWord", "tryResult", "timeStamp"] {
            assert!(json.contains(field), "missing {field} in {json}");
        }
    }

    #[test]
    fn test_report_json_roundtrip() {
        let mut game = sample_game();
        game.status = GameStatus::Lost;
        let report = game.describe();

        let parsed = StatusReport::from_json(&report.to_json().unwrap()).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_version_not_serialized() {
        let mut game = sample_game();
        game.version = 42;

        let bytes = bincode::serialize(&game).unwrap();
        let decoded: Game = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded.version(), 0);
        assert_eq!(decoded.id(), "c0ffee");
    }

    #[test]
    fn test_rejection_names() {
        assert_eq!(Rejection::WordNotInDictionary.to_string(), "word is not in dictionary");
        assert_eq!(
            serde_json::to_string(&Rejection::OutOfTurns).unwrap(),
            "\"out_of_turns\""
        );
    }
}
