//! Network Layer
//!
//! WebSocket server exposing the game engine as JSON messages.
//! Game rules live in `game/`; this layer only routes requests.

pub mod protocol;
pub mod server;

pub use protocol::{ClientMessage, ErrorCode, ServerError, ServerMessage};
pub use server::{GameServer, GameServerError, ServerConfig};
