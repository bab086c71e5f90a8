//! Game state on top of the rules engine.
//!
//! `Game` keeps the starting board plus one entry per ply, so history, undo
//! and repetition checks never need to replay moves. Every mutation goes
//! through `make_move`, `load`, `reset` or `undo`; a rejected move leaves the
//! game untouched.

use cozy_chess::Board;

use crate::error::{FenError, MoveError};
use crate::san::{find_san, legal_engine_moves, san};
use crate::types::*;
use crate::uci::{from_engine_move, to_engine_move};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Why a game ended in a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawReason {
    Stalemate,
    FiftyMoveRule,
    InsufficientMaterial,
    ThreefoldRepetition,
}

/// Terminal result of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Checkmate { winner: Color },
    Draw(DrawReason),
}

#[derive(Debug, Clone)]
struct Ply {
    board: Board,
    record: MoveRecord,
}

#[derive(Debug, Clone)]
pub struct Game {
    start: Board,
    plies: Vec<Ply>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self {
            start: Board::default(),
            plies: Vec::new(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let start = Board::from_fen(fen.trim(), false).map_err(|_| FenError {
            fen: fen.to_string(),
        })?;
        Ok(Self {
            start,
            plies: Vec::new(),
        })
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        self.plies.last().map_or(&self.start, |p| &p.board)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Replace the position and forget the history. On error nothing changes.
    pub fn load(&mut self, fen: &str) -> Result<(), FenError> {
        *self = Self::from_fen(fen)?;
        Ok(())
    }

    pub fn fen(&self) -> String {
        self.board().to_string()
    }

    /// FEN of the position the history starts from.
    pub fn start_fen(&self) -> String {
        self.start.to_string()
    }

    pub fn turn(&self) -> Color {
        self.board().side_to_move()
    }

    pub fn get(&self, sq: Square) -> Option<ColoredPiece> {
        let board = self.board();
        Some(ColoredPiece {
            color: board.color_on(sq)?,
            kind: board.piece_on(sq)?,
        })
    }

    /// Apply `mv` if it is legal. A pawn reaching the last rank without an
    /// explicit promotion becomes a queen.
    pub fn make_move(&mut self, mv: Move) -> Result<MoveRecord, MoveError> {
        let board = self.board();
        let mut mv = mv;
        if mv.promotion.is_none() && self.is_promotion_square(mv) {
            mv.promotion = Some(PieceKind::Queen);
        }
        let engine_mv = to_engine_move(board, mv);
        if !board.is_legal(engine_mv) {
            return Err(MoveError::Illegal(mv));
        }
        Ok(self.push(engine_mv))
    }

    /// Apply a move given in SAN (`Nf3`, `exd5`, `O-O`, `e8=Q+`).
    pub fn make_san_move(&mut self, token: &str) -> Result<MoveRecord, MoveError> {
        let engine_mv =
            find_san(self.board(), token).ok_or_else(|| MoveError::UnknownSan(token.to_string()))?;
        Ok(self.push(engine_mv))
    }

    fn is_promotion_square(&self, mv: Move) -> bool {
        let board = self.board();
        let last_rank = match board.side_to_move() {
            Color::White => Rank::Eighth,
            Color::Black => Rank::First,
        };
        board.piece_on(mv.from) == Some(PieceKind::Pawn) && mv.to.rank() == last_rank
    }

    fn push(&mut self, engine_mv: cozy_chess::Move) -> MoveRecord {
        let board = self.board();
        let record = MoveRecord {
            mv: from_engine_move(board, engine_mv),
            color: board.side_to_move(),
            san: san(board, engine_mv),
        };
        let mut next = board.clone();
        next.play_unchecked(engine_mv);
        self.plies.push(Ply {
            board: next,
            record: record.clone(),
        });
        record
    }

    /// Take back the last ply.
    pub fn undo(&mut self) -> Option<MoveRecord> {
        self.plies.pop().map(|p| p.record)
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        let board = self.board();
        legal_engine_moves(board)
            .into_iter()
            .map(|mv| from_engine_move(board, mv))
            .collect()
    }

    /// Destination squares reachable from `from`. Promotions collapse to one
    /// entry per square.
    pub fn moves_from(&self, from: Square) -> Vec<Square> {
        let mut targets: Vec<Square> = self
            .legal_moves()
            .into_iter()
            .filter(|m| m.from == from)
            .map(|m| m.to)
            .collect();
        targets.dedup();
        targets
    }

    pub fn history(&self) -> Vec<String> {
        self.plies.iter().map(|p| p.record.san.clone()).collect()
    }

    pub fn records(&self) -> impl Iterator<Item = &MoveRecord> {
        self.plies.iter().map(|p| &p.record)
    }

    pub fn ply_count(&self) -> usize {
        self.plies.len()
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.plies.last().map(|p| &p.record)
    }

    pub fn in_check(&self) -> bool {
        !self.board().checkers().is_empty()
    }

    pub fn in_checkmate(&self) -> bool {
        self.in_check() && !self.has_legal_move_left()
    }

    pub fn in_stalemate(&self) -> bool {
        !self.in_check() && !self.has_legal_move_left()
    }

    fn has_legal_move_left(&self) -> bool {
        self.board().generate_moves(|moves| !moves.is_empty())
    }

    pub fn is_fifty_move_draw(&self) -> bool {
        self.board().halfmove_clock() >= 100
    }

    pub fn is_insufficient_material(&self) -> bool {
        let board = self.board();
        let heavy = board.pieces(PieceKind::Pawn)
            | board.pieces(PieceKind::Rook)
            | board.pieces(PieceKind::Queen);
        if !heavy.is_empty() {
            return false;
        }
        let knights = board.pieces(PieceKind::Knight);
        let bishops = board.pieces(PieceKind::Bishop);
        if knights.len() + bishops.len() <= 1 {
            return true;
        }
        // Only bishops left, all on one square color
        knights.is_empty() && {
            let light = bishops.into_iter().filter(|&sq| is_light_square(sq)).count();
            light == 0 || light == bishops.len() as usize
        }
    }

    /// The current position has occurred at least three times.
    pub fn is_threefold_repetition(&self) -> bool {
        let current = self.board();
        let earlier = std::iter::once(&self.start)
            .chain(self.plies.iter().map(|p| &p.board))
            .filter(|b| b.same_position(current))
            .count();
        earlier >= 3
    }

    pub fn in_draw(&self) -> bool {
        self.draw_reason().is_some()
    }

    fn draw_reason(&self) -> Option<DrawReason> {
        if self.in_stalemate() {
            Some(DrawReason::Stalemate)
        } else if self.is_fifty_move_draw() {
            Some(DrawReason::FiftyMoveRule)
        } else if self.is_insufficient_material() {
            Some(DrawReason::InsufficientMaterial)
        } else if self.is_threefold_repetition() {
            Some(DrawReason::ThreefoldRepetition)
        } else {
            None
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        if self.in_checkmate() {
            return Some(Outcome::Checkmate {
                winner: !self.turn(),
            });
        }
        self.draw_reason().map(Outcome::Draw)
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }
}

#[cfg(test)]
#[path = "game_tests.rs"]
mod game_tests;
