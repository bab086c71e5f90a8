//! Countdown clock and the material tie-break used when a flag falls.
//!
//! The clock has no timer of its own: the event loop calls [`Clock::tick`]
//! once per second and the running side loses that second.

use crate::game::Game;
use crate::types::*;

/// Default time per side, in minutes.
pub const DEFAULT_MINUTES: u32 = 10;

/// Chess clock for both players
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clock {
    initial_secs: u32,
    white_secs: u32,
    black_secs: u32,
    /// Which side's clock is running
    running_for: Option<Color>,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(DEFAULT_MINUTES)
    }
}

impl Clock {
    pub fn new(minutes: u32) -> Self {
        let secs = minutes.saturating_mul(60);
        Self {
            initial_secs: secs,
            white_secs: secs,
            black_secs: secs,
            running_for: None,
        }
    }

    /// Refill both sides and start counting for `color`.
    pub fn reset(&mut self, color: Color) {
        self.white_secs = self.initial_secs;
        self.black_secs = self.initial_secs;
        self.running_for = Some(color);
    }

    /// Hand the clock to `color`, typically the side to move after a move.
    pub fn switch_to(&mut self, color: Color) {
        if self.running_for.is_some() {
            self.running_for = Some(color);
        }
    }

    pub fn stop(&mut self) {
        self.running_for = None;
    }

    pub fn running_for(&self) -> Option<Color> {
        self.running_for
    }

    pub fn remaining(&self, color: Color) -> u32 {
        match color {
            Color::White => self.white_secs,
            Color::Black => self.black_secs,
        }
    }

    /// Take one second from the running side. Returns the side whose flag
    /// just fell; the clock stops when that happens.
    pub fn tick(&mut self) -> Option<Color> {
        let color = self.running_for?;
        let left = match color {
            Color::White => &mut self.white_secs,
            Color::Black => &mut self.black_secs,
        };
        *left = left.saturating_sub(1);
        if *left == 0 {
            self.stop();
            return Some(color);
        }
        None
    }

    pub fn flagged(&self) -> Option<Color> {
        if self.white_secs == 0 {
            Some(Color::White)
        } else if self.black_secs == 0 {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// Format seconds as MM:SS
    pub fn format_time(secs: u32) -> String {
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    pub fn display(&self) -> String {
        format!(
            "White {}  Black {}",
            Self::format_time(self.white_secs),
            Self::format_time(self.black_secs)
        )
    }
}

/// Material count for one side: p=1, n=3, b=3, r=5, q=9; kings are free.
pub fn material_points(game: &Game, color: Color) -> u32 {
    let board = game.board();
    let value = |kind: PieceKind| match kind {
        PieceKind::Pawn => 1,
        PieceKind::Knight | PieceKind::Bishop => 3,
        PieceKind::Rook => 5,
        PieceKind::Queen => 9,
        PieceKind::King => 0,
    };
    PieceKind::ALL
        .iter()
        .map(|&kind| value(kind) * (board.pieces(kind) & board.colors(color)).len())
        .sum()
}

/// Verdict after a flag fall, decided on material alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointsVerdict {
    Winner(Color),
    Equal,
}

pub fn decide_on_points(game: &Game) -> PointsVerdict {
    let white = material_points(game, Color::White);
    let black = material_points(game, Color::Black);
    if white > black {
        PointsVerdict::Winner(Color::White)
    } else if black > white {
        PointsVerdict::Winner(Color::Black)
    } else {
        PointsVerdict::Equal
    }
}

impl std::fmt::Display for PointsVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointsVerdict::Winner(color) => write!(f, "{} wins on points!", color_name(*color)),
            PointsVerdict::Equal => write!(f, "Draw by equal points!"),
        }
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod clock_tests;
