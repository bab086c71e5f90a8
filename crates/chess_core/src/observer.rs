//! Rendering callbacks and the status line shown to the player.

use std::sync::Mutex;

use crate::game::{Game, Outcome};
use crate::types::color_name;

/// Callbacks the coordinators invoke whenever they change something the
/// player can see. All methods default to doing nothing.
pub trait GameObserver: Send + Sync {
    fn on_position_changed(&self) {}

    fn on_status_changed(&self, _text: &str) {}

    fn on_opponent_identified(&self, _id: &str) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl GameObserver for NoopObserver {}

/// One observed callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    PositionChanged,
    Status(String),
    Opponent(String),
}

/// Observer that keeps every callback in order. Useful for headless
/// embedding and tests.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Observed>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: Observed) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }

    pub fn events(&self) -> Vec<Observed> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last_status(&self) -> Option<String> {
        self.events().into_iter().rev().find_map(|e| match e {
            Observed::Status(text) => Some(text),
            _ => None,
        })
    }

    pub fn position_changes(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Observed::PositionChanged))
            .count()
    }
}

impl GameObserver for RecordingObserver {
    fn on_position_changed(&self) {
        self.push(Observed::PositionChanged);
    }

    fn on_status_changed(&self, text: &str) {
        self.push(Observed::Status(text.to_string()));
    }

    fn on_opponent_identified(&self, id: &str) {
        self.push(Observed::Opponent(id.to_string()));
    }
}

/// Terminal message if the game is over, otherwise whose move it is.
pub fn status_text(game: &Game) -> String {
    match outcome_text(game) {
        Some(text) => text,
        None => format!("{} to move", color_name(game.turn())),
    }
}

pub fn outcome_text(game: &Game) -> Option<String> {
    match game.outcome()? {
        Outcome::Checkmate { winner } => Some(format!("{} wins by checkmate!", color_name(winner))),
        Outcome::Draw(_) => Some("It's a draw!".to_string()),
    }
}
