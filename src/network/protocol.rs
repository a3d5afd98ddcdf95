//! Protocol Messages
//!
//! Wire format for client-server communication over WebSocket.
//! Every message is a JSON object tagged by its `type` field.

use serde::{Deserialize, Serialize};

use crate::game::{GameError, Rejection, StatusReport, Turn};
use crate::store::StoreError;

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start a game, optionally with a chosen secret word.
    NewGame {
        /// Secret word; a random dictionary word when absent or empty.
        #[serde(default)]
        word: Option<String>,
    },

    /// Request the current status of a game.
    Describe {
        /// Game identifier.
        id: String,
    },

    /// Submit a guess.
    Guess {
        /// Game identifier.
        id: String,
        /// Guessed word, any case.
        word: String,
    },

    /// Give up on a game.
    Resign {
        /// Game identifier.
        id: String,
    },

    /// Ping for latency measurement.
    Ping {
        /// Client timestamp, echoed back.
        timestamp: u64,
    },
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Game status, possibly with the reason a move was refused.
    Game {
        /// Current state of the game.
        game: StatusReport,
        /// Set when the move was refused.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rejection: Option<Rejection>,
    },

    /// Pong response.
    Pong {
        /// Client timestamp from the ping.
        timestamp: u64,
        /// Server time in Unix milliseconds.
        server_time: u64,
    },

    /// Error message.
    Error(ServerError),

    /// Server is closing the connection.
    Shutdown {
        /// Why.
        reason: String,
    },
}

impl From<Turn> for ServerMessage {
    fn from(turn: Turn) -> Self {
        ServerMessage::Game {
            game: turn.report,
            rejection: turn.rejection,
        }
    }
}

impl From<StatusReport> for ServerMessage {
    fn from(game: StatusReport) -> Self {
        ServerMessage::Game {
            game,
            rejection: None,
        }
    }
}

/// Server error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerError {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

impl ServerError {
    /// Create an error with the given code.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Empty or malformed game ID.
    InvalidId,
    /// No game with this ID.
    GameNotFound,
    /// Secret word refused when creating a game.
    InvalidWord,
    /// Message could not be parsed.
    InvalidInput,
    /// Server-side failure.
    InternalError,
}

impl ErrorCode {
    /// Does this code blame the client rather than the server.
    pub fn is_client_error(self) -> bool {
        !matches!(self, ErrorCode::InternalError)
    }
}

impl From<&GameError> for ServerError {
    fn from(error: &GameError) -> Self {
        let code = match error {
            GameError::Rejected(_) => ErrorCode::InvalidWord,
            GameError::NotFound(_) | GameError::Store(StoreError::NotFound(_)) => {
                ErrorCode::GameNotFound
            }
            GameError::Store(StoreError::InvalidId) => ErrorCode::InvalidId,
            GameError::Store(StoreError::Conflict { .. })
            | GameError::Serialization(_)
            | GameError::NilResult { .. }
            | GameError::Dictionary(_) => ErrorCode::InternalError,
        };
        ServerError::new(code, error.to_string())
    }
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
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
    use crate::game::GameStatus;
    use chrono::Utc;

    fn sample_report() -> StatusReport {
        StatusReport {
            id: "c0ffee".to_string(),
            game_status: GameStatus::InPlay,
            secret_word: None,
            attempts: Vec::new(),
            attempts_used: 0,
            valid_attempts: 0,
            winning_attempt: None,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_client_message_wire_format() {
        let msg = ClientMessage::from_json(r#"{"type":"guess","id":"c0ffee","word":"crane"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Guess {
                id: "c0ffee".to_string(),
                word: "crane".to_string(),
            }
        );

        let json = ClientMessage::Resign { id: "c0ffee".to_string() }.to_json().unwrap();
        assert_eq!(json, r#"{"type":"resign","id":"c0ffee"}"#);
    }

    #[test]
    fn test_new_game_word_is_optional() {
        let msg = ClientMessage::from_json(r#"{"type":"new_game"}"#).unwrap();
        assert_eq!(msg, ClientMessage::NewGame { word: None });

        let msg = ClientMessage::from_json(r#"{"type":"new_game","word":"happy"}"#).unwrap();
        assert_eq!(msg, ClientMessage::NewGame { word: Some("happy".to_string()) });
    }

    #[test]
    fn test_unknown_message_rejected() {
        assert!(ClientMessage::from_json(r#"{"type":"teleport"}"#).is_err());
        assert!(ClientMessage::from_json(r#"{"type":"guess","id":"c0ffee"}"#).is_err());
        assert!(ClientMessage::from_json("not json").is_err());
    }

    #[test]
    fn test_game_message_roundtrip() {
        let msg = ServerMessage::Game {
            game: sample_report(),
            rejection: Some(Rejection::WordNotInDictionary),
        };

        let json = msg.to_json().unwrap();
        assert!(json.contains(r#""type":"game""#));
        assert!(json.contains(r#""rejection":"word_not_in_dictionary""#));
        assert_eq!(ServerMessage::from_json(&json).unwrap(), msg);
    }

    #[test]
    fn test_accepted_turn_omits_rejection() {
        let msg = ServerMessage::from(sample_report());
        let json = msg.to_json().unwrap();
        assert!(!json.contains("rejection"));
    }

    #[test]
    fn test_error_codes() {
        let msg = ServerMessage::Error(ServerError::new(ErrorCode::GameNotFound, "game 4b1d not found"));
        let json = msg.to_json().unwrap();
        assert!(json.contains(r#""type":"error""#));
        assert!(json.contains("game_not_found"));
    }

    #[test]
    fn test_game_error_mapping() {
        let cases = [
            (GameError::Rejected(Rejection::WordLength), ErrorCode::InvalidWord),
            (GameError::NotFound("4b1d".to_string()), ErrorCode::GameNotFound),
            (GameError::Store(StoreError::InvalidId), ErrorCode::InvalidId),
            (GameError::NilResult { expected: 5, actual: 0 }, ErrorCode::InternalError),
        ];

        for (error, code) in cases {
            let server_error = ServerError::from(&error);
            assert_eq!(server_error.code, code);
            assert_eq!(server_error.message, error.to_string());
        }
        assert!(!ErrorCode::InternalError.is_client_error());
        assert!(ErrorCode::InvalidId.is_client_error());
    }
}
