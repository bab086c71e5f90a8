//! Shared-game rooms for two remote players.
//!
//! A room is one document in a [`DocumentStore`]. Both players write to it
//! with top-level merges (last writer wins) and follow it through a
//! subscription; [`SyncSession`] enforces turn ownership locally and keeps a
//! [`chess_core::Game`] in step with the document.

pub mod error;
pub mod file_store;
pub mod room;
pub mod session;
pub mod store;

pub use error::{StoreError, SyncError};
pub use file_store::FileStore;
pub use room::{GameRoom, HistoryEntry, Players, RoomStatus, Side};
pub use session::{SyncSession, ROOMS};
pub use store::{Document, DocumentStore, MemoryStore, SetOptions, Subscription};
