//! Move choice: uniformly random at skill level 0, one-ply greedy above it.

use chess_core::{material_points, Game, Move};
use rand::seq::SliceRandom;
use rand::Rng;

/// Highest `Skill Level` accepted.
pub const MAX_LEVEL: u8 = 20;

const MATE_SCORE: i32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mover {
    level: u8,
}

impl Default for Mover {
    fn default() -> Self {
        Self { level: MAX_LEVEL }
    }
}

impl Mover {
    pub fn new(level: u8) -> Self {
        Self {
            level: level.min(MAX_LEVEL),
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn set_level(&mut self, level: u8) {
        self.level = level.min(MAX_LEVEL);
    }

    /// Pick a move for the side to move, `None` if there is none.
    ///
    /// Below the top level a share of moves is played at random, shrinking
    /// as the level rises.
    pub fn choose<R: Rng>(&self, game: &Game, rng: &mut R) -> Option<Move> {
        let moves = game.legal_moves();
        if moves.is_empty() {
            return None;
        }
        let blunder_chance = f64::from(MAX_LEVEL - self.level) / f64::from(MAX_LEVEL);
        if rng.gen_bool(blunder_chance) {
            return moves.choose(rng).copied();
        }

        let scored: Vec<(i32, Move)> = moves.iter().map(|&mv| (score(game, mv), mv)).collect();
        let best = scored.iter().map(|(s, _)| *s).max()?;
        let top: Vec<Move> = scored
            .into_iter()
            .filter(|(s, _)| *s == best)
            .map(|(_, mv)| mv)
            .collect();
        top.choose(rng).copied()
    }
}

/// Material balance for the mover after `mv`; mate beats everything, a
/// draw counts as level material.
fn score(game: &Game, mv: Move) -> i32 {
    let us = game.turn();
    let mut next = game.clone();
    if next.make_move(mv).is_err() {
        return i32::MIN;
    }
    if next.in_checkmate() {
        return MATE_SCORE;
    }
    if next.in_draw() {
        return 0;
    }
    material_points(&next, us) as i32 - material_points(&next, !us) as i32
}

#[cfg(test)]
#[path = "mover_tests.rs"]
mod mover_tests;
