//! Line-framed wire protocol between the coordinator and players.
//!
//! One line carries one logical message:
//! - coordinator → player: a drawn word, or the literal `WIN` (game over)
//! - player → coordinator: the literal `WIN` (win claim)

use tokio_util::codec::LinesCodec;
use tracing::instrument;

/// Literal shared by the game-over broadcast and the win claim.
pub const WIN: &str = "WIN";

/// Longest line either side accepts.
pub const MAX_LINE_LENGTH: usize = 1024;

/// Builds the framing codec used on every connection.
pub fn codec() -> LinesCodec {
    LinesCodec::new_with_max_length(MAX_LINE_LENGTH)
}

/// Checks whether a word can travel as a single drawn-word message.
pub fn is_wire_safe(word: &str) -> bool {
    !word.trim().is_empty()
        && word != WIN
        && word.len() <= MAX_LINE_LENGTH
        && !word.contains(['\n', '\r'])
}

/// Errors decoding a received line.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ProtocolError {
    /// An empty line; treated as a disconnect.
    #[display("Received an empty message")]
    Empty,

    /// A line the receiver does not understand.
    #[display("Unexpected message: {_0:?}")]
    Unexpected(#[error(not(source))] String),
}

/// Message sent by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// The word drawn this round.
    Word(String),
    /// The game has ended; stop playing.
    GameOver,
}

impl ServerMessage {
    /// Encodes the message as one line, without the terminator.
    pub fn encode(&self) -> String {
        match self {
            Self::Word(word) => word.clone(),
            Self::GameOver => WIN.to_string(),
        }
    }

    /// Decodes a line received from the coordinator.
    #[instrument]
    pub fn decode(line: &str) -> Result<Self, ProtocolError> {
        match line {
            "" => Err(ProtocolError::Empty),
            WIN => Ok(Self::GameOver),
            word => Ok(Self::Word(word.to_string())),
        }
    }
}

/// Message sent by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessage {
    /// The player has completed a winning pattern.
    WinClaim,
}

impl ClientMessage {
    /// Encodes the message as one line, without the terminator.
    pub fn encode(&self) -> String {
        match self {
            Self::WinClaim => WIN.to_string(),
        }
    }

    /// Decodes a line received from a player.
    #[instrument]
    pub fn decode(line: &str) -> Result<Self, ProtocolError> {
        match line {
            "" => Err(ProtocolError::Empty),
            WIN => Ok(Self::WinClaim),
            other => Err(ProtocolError::Unexpected(other.to_string())),
        }
    }
}
