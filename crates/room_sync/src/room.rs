//! The shared room document.

use chrono::{DateTime, Utc};
use chess_core::{color_name, Color, Game, MoveRecord, Outcome, START_FEN};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::Document;

/// Side to move as stored in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "w")]
    White,
    #[serde(rename = "b")]
    Black,
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    #[default]
    Ongoing,
    Ended,
}

/// One played move as stored in `history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
    pub san: String,
}

impl From<&MoveRecord> for HistoryEntry {
    fn from(record: &MoveRecord) -> Self {
        let uci = record.mv.to_string();
        Self {
            from: uci[0..2].to_string(),
            to: uci[2..4].to_string(),
            promotion: uci.get(4..).filter(|p| !p.is_empty()).map(str::to_string),
            san: record.san.clone(),
        }
    }
}

impl HistoryEntry {
    /// Move text in `<from><to>[promo]` form.
    pub fn uci(&self) -> String {
        format!(
            "{}{}{}",
            self.from,
            self.to,
            self.promotion.as_deref().unwrap_or_default()
        )
    }
}

/// Player identities holding the two seats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Players {
    #[serde(default)]
    pub w: Option<String>,
    #[serde(default)]
    pub b: Option<String>,
}

impl Players {
    pub fn seat_of(&self, player: &str) -> Option<Color> {
        if self.w.as_deref() == Some(player) {
            Some(Color::White)
        } else if self.b.as_deref() == Some(player) {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn get(&self, color: Color) -> Option<&str> {
        match color {
            Color::White => self.w.as_deref(),
            Color::Black => self.b.as_deref(),
        }
    }

    pub fn set(&mut self, color: Color, player: &str) {
        let seat = match color {
            Color::White => &mut self.w,
            Color::Black => &mut self.b,
        };
        *seat = Some(player.to_string());
    }

    /// First empty seat, white before black.
    pub fn free_seat(&self) -> Option<Color> {
        if self.w.is_none() {
            Some(Color::White)
        } else if self.b.is_none() {
            Some(Color::Black)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRoom {
    pub fen: String,
    pub turn: Side,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub players: Players,
    #[serde(default)]
    pub status: RoomStatus,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

impl GameRoom {
    /// Fresh room at the start position with `creator` playing white.
    pub fn new(creator: &str) -> Self {
        let mut players = Players::default();
        players.set(Color::White, creator);
        Self {
            fen: START_FEN.to_string(),
            turn: Side::White,
            history: Vec::new(),
            players,
            status: RoomStatus::Ongoing,
            winner: None,
            version: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn from_document(doc: Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(doc))
    }

    pub fn to_document(&self) -> Result<Document, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            // A struct always serializes to an object
            _ => Ok(Document::new()),
        }
    }

    /// Only the named top-level fields, for a merge write.
    pub fn fields(&self, keys: &[&str]) -> Result<Document, serde_json::Error> {
        let mut doc = self.to_document()?;
        doc.retain(|key, _| keys.contains(&key.as_str()));
        Ok(doc)
    }

    pub fn is_ended(&self) -> bool {
        self.status == RoomStatus::Ended
    }

    /// Record `record`, just played in `game`, and stamp the new version.
    pub fn record_move(&mut self, game: &Game, record: &MoveRecord) {
        self.fen = game.fen();
        self.turn = game.turn().into();
        self.history.push(record.into());
        if let Some(outcome) = game.outcome() {
            self.status = RoomStatus::Ended;
            self.winner = Some(winner_label(outcome).to_string());
        }
        self.touch();
    }

    /// Back to the start position; seats are kept.
    pub fn restart(&mut self) {
        self.fen = START_FEN.to_string();
        self.turn = Side::White;
        self.history.clear();
        self.status = RoomStatus::Ongoing;
        self.winner = None;
        self.touch();
    }

    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }
}

/// `"White"`, `"Black"` or `"Draw"`.
pub fn winner_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Checkmate { winner } => color_name(winner),
        Outcome::Draw(_) => "Draw",
    }
}

#[cfg(test)]
#[path = "room_tests.rs"]
mod room_tests;
