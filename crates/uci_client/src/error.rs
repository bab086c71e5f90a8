//! Errors and recovered faults of an engine session.

use chess_core::Move;
use thiserror::Error;

/// A request was refused or the engine could not be reached.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine handshake has not completed")]
    NotReady,
    #[error("engine is already searching")]
    Busy,
    #[error("game is over, nothing to search")]
    GameOver,
    #[error("failed to start engine `{path}`: {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("engine transport failed: {0}")]
    Transport(#[from] std::io::Error),
    #[error("engine closed its output")]
    Closed,
}

/// An engine reply that could not be turned into a move. The session
/// recovers from these on its own; they are reported, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("engine reported no move (`{0}`)")]
    NoMove(String),
    #[error("engine move {0} is illegal in the current position")]
    IllegalMove(Move),
}
