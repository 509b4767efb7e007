//! Error types for the game model, engine construction and match creation.

use thiserror::Error;
use uuid::Uuid;

use crate::game::types::PlayerId;

/// Errors raised by the board, the game aggregate and engine construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("unsupported number of players: {0} (expected 1 to 4)")]
    UnsupportedPlayersCount(usize),

    #[error("too many users for this game: maximum allowed {max}, received {received}")]
    TooManyUsers { max: usize, received: usize },

    #[error("the game type {0} is not yet supported")]
    UnsupportedGameType(u8),

    #[error("a {rows}x{columns} board has no start layout for {players} players")]
    BoardTooSmall {
        rows: usize,
        columns: usize,
        players: usize,
    },

    #[error("player {0} appears twice in the roster")]
    DuplicatePlayer(PlayerId),

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("position ({row}, {column}) is not a playable tile")]
    InvalidPosition { row: i32, column: i32 },

    #[error("the tile is not taken by a player")]
    TileNotTaken,
}

/// Rejection of a `start` request, surfaced to the client as an `error` message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartError {
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Creation(#[from] GameError),
}

impl StartError {
    /// Error code sent on the wire as `error.type`.
    pub fn code(&self) -> &'static str {
        match self {
            StartError::InvalidInput(_) => "INVALID_INPUT",
            StartError::Creation(_) => "GAME_CREATION_FAILED",
        }
    }
}

/// Failures of inbound commands addressed to a match.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("no running match with id {0}")]
    UnknownMatch(Uuid),

    #[error("player {0} is not part of a running match")]
    UnknownPlayer(PlayerId),
}

impl SessionError {
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::UnknownMatch(_) => "UNKNOWN_MATCH",
            SessionError::UnknownPlayer(_) => "UNKNOWN_PLAYER",
        }
    }
}
