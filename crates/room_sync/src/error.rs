use chess_core::MoveError;
use thiserror::Error;

/// Failure reported by a document backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("document store is unreachable")]
    Unavailable,
    #[error("document `{collection}/{id}` does not exist")]
    Missing { collection: String, id: String },
    #[error("document could not be encoded: {0}")]
    Encode(String),
    #[error("document store I/O failed: {0}")]
    Io(String),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("room `{0}` not found")]
    RoomNotFound(String),
    #[error("room `{0}` is full")]
    RoomFull(String),
    #[error("sync unavailable: {0}")]
    SyncUnavailable(#[from] StoreError),
    #[error("not in a room")]
    NotInRoom,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("the game in this room has ended")]
    GameEnded,
    #[error(transparent)]
    IllegalMove(#[from] MoveError),
    #[error("room `{id}` holds an unreadable document: {reason}")]
    CorruptRoom { id: String, reason: String },
}
