//! Client side of the UCI protocol.
//!
//! [`EngineSession`] owns the conversation with one engine process: it runs
//! the handshake, sends at most one search at a time and applies the reply
//! to a [`chess_core::Game`], ignoring replies that belong to a game the
//! player has already abandoned.

pub mod config;
pub mod error;
pub mod protocol;
pub mod session;
pub mod transport;

pub use config::EngineConfig;
pub use error::{EngineError, ProtocolError};
pub use protocol::{BestMove, EngineCommand, EngineMessage, HandshakeStep};
pub use session::{EngineEvent, EngineSession, EngineState, Inbound};
pub use transport::{ChannelTransport, EngineEnd, EngineTransport, ProcessTransport};
