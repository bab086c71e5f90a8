//! Rules-engine capability for the chess client.
//!
//! Legality, move generation and board state come from `cozy-chess`; this
//! crate adds what the coordinators need on top of it:
//! - `Game`: position plus history, SAN, game-end detection, undo
//! - PGN export/import and UCI move text
//! - the `GameObserver` rendering callbacks and status text
//! - a countdown `Clock` with the material tie-break

pub mod clock;
pub mod error;
pub mod game;
pub mod observer;
pub mod pgn;
mod san;
pub mod types;
pub mod uci;

pub use clock::*;
pub use error::*;
pub use game::*;
pub use observer::*;
pub use types::*;
pub use uci::{move_to_uci, parse_uci_move};
