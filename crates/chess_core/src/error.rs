//! Errors reported by the rules-engine wrapper.

use thiserror::Error;

use crate::types::Move;

/// A proposed move was not played. The game is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("illegal move {0}")]
    Illegal(Move),
    #[error("malformed move text `{0}`")]
    Malformed(String),
    #[error("no move matches `{0}`")]
    UnknownSan(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid FEN `{fen}`")]
pub struct FenError {
    pub fen: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PgnError {
    #[error("invalid FEN tag: {0}")]
    Fen(#[from] FenError),
    #[error("move {ply}: {source}")]
    Move {
        ply: usize,
        #[source]
        source: MoveError,
    },
    #[error("unterminated {0} in movetext")]
    Unterminated(&'static str),
}
