//! Error types for the session

use thiserror::Error;

/// Session-level errors surfaced to callers.
///
/// All of these are terminal per-request: the coordinator never retries
/// internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// A player tried to connect with an empty name.
    #[error("player name is empty")]
    EmptyName,

    /// A player with this name is already connected.
    #[error("a player with name {0:?} is already connected to the game")]
    AlreadyConnected(String),

    /// The game is already started; no new players may connect.
    #[error("the game is already started")]
    AlreadyStarted,

    /// The coordinator has shut down and no longer accepts requests.
    #[error("the session is closed")]
    SessionClosed,
}
