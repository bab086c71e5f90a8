//! UCI wire format.
//!
//! Outbound commands are rendered from [`EngineCommand`]; every inbound line
//! is decoded exactly once into an [`EngineMessage`] at the channel boundary,
//! so the session never looks at raw strings.

use std::fmt;

use chess_core::{parse_uci_move, Move};

/// Commands sent to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Uci,
    IsReady,
    UciNewGame,
    SetOption { name: String, value: String },
    PositionFen(String),
    GoDepth(u8),
    Stop,
    Quit,
}

impl EngineCommand {
    pub fn skill_level(level: u8) -> Self {
        EngineCommand::SetOption {
            name: "Skill Level".to_string(),
            value: level.to_string(),
        }
    }
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineCommand::Uci => write!(f, "uci"),
            EngineCommand::IsReady => write!(f, "isready"),
            EngineCommand::UciNewGame => write!(f, "ucinewgame"),
            EngineCommand::SetOption { name, value } => {
                write!(f, "setoption name {name} value {value}")
            }
            EngineCommand::PositionFen(fen) => write!(f, "position fen {fen}"),
            EngineCommand::GoDepth(depth) => write!(f, "go depth {depth}"),
            EngineCommand::Stop => write!(f, "stop"),
            EngineCommand::Quit => write!(f, "quit"),
        }
    }
}

/// Which handshake reply arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStep {
    /// `uciok`: the engine listed its id and options.
    Uci,
    /// `readyok`: the engine finished initialising.
    Ready,
}

/// Payload of a `bestmove` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestMove {
    /// The move, if the token had the `<from><to>[promo]` shape.
    pub best: Option<Move>,
    /// Token as sent, e.g. `e7e5` or `(none)`; `None` if the line ended early.
    pub token: Option<String>,
    pub ponder: Option<Move>,
}

/// Messages received from the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineMessage {
    HandshakeAck(HandshakeStep),
    BestMove(BestMove),
    /// Anything else: `id`, `option`, `info`, banners.
    Info(String),
}

impl EngineMessage {
    pub fn decode(line: &str) -> Self {
        let line = line.trim();
        let mut words = line.split_whitespace();
        match words.next() {
            Some("uciok") => EngineMessage::HandshakeAck(HandshakeStep::Uci),
            Some("readyok") => EngineMessage::HandshakeAck(HandshakeStep::Ready),
            Some("bestmove") => {
                let token = words.next();
                let best = token.and_then(|t| parse_uci_move(t).ok());
                let ponder = match (words.next(), words.next()) {
                    (Some("ponder"), Some(p)) => parse_uci_move(p).ok(),
                    _ => None,
                };
                EngineMessage::BestMove(BestMove {
                    best,
                    token: token.map(str::to_string),
                    ponder,
                })
            }
            _ => EngineMessage::Info(line.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod protocol_tests;
