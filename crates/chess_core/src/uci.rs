//! UCI move text and the translation between standard castling notation and
//! the rules engine's king-takes-rook encoding.

use cozy_chess::Board;

use crate::error::MoveError;
use crate::types::*;

pub fn move_to_uci(mv: Move) -> String {
    mv.to_string()
}

/// Parse `<from><to>[promotion]`. Only the shape is checked here; legality is
/// the game's business.
pub fn parse_uci_move(txt: &str) -> Result<Move, MoveError> {
    let malformed = || MoveError::Malformed(txt.to_string());
    if !(4..=5).contains(&txt.len()) || !txt.is_ascii() {
        return Err(malformed());
    }
    let from = coord_to_sq(&txt[0..2]).ok_or_else(malformed)?;
    let to = coord_to_sq(&txt[2..4]).ok_or_else(malformed)?;
    let promotion = match txt[4..].chars().next() {
        Some(c) => Some(promotion_from_char(c).ok_or_else(malformed)?),
        None => None,
    };
    Ok(Move {
        from,
        to,
        promotion,
    })
}

/// Convert a standard move into the rules engine's encoding for `board`.
pub(crate) fn to_engine_move(board: &Board, mv: Move) -> cozy_chess::Move {
    let stm = board.side_to_move();
    let mut to = mv.to;
    let is_king = board.piece_on(mv.from) == Some(PieceKind::King)
        && board.color_on(mv.from) == Some(stm);
    let two_files = (mv.to.file() as i8 - mv.from.file() as i8).abs() == 2;
    if is_king && two_files && mv.from.rank() == mv.to.rank() {
        let rights = board.castle_rights(stm);
        let rook_file = if mv.to.file() as u8 > mv.from.file() as u8 {
            rights.short
        } else {
            rights.long
        };
        if let Some(file) = rook_file {
            to = Square::new(file, mv.from.rank());
        }
    }
    cozy_chess::Move {
        from: mv.from,
        to,
        promotion: mv.promotion,
    }
}

/// Convert a rules-engine move played from `board` back to standard form.
pub(crate) fn from_engine_move(board: &Board, mv: cozy_chess::Move) -> Move {
    let stm = board.side_to_move();
    let castles = board.piece_on(mv.from) == Some(PieceKind::King)
        && board.color_on(mv.to) == Some(stm);
    let to = if castles {
        let file = if mv.to.file() as u8 > mv.from.file() as u8 {
            File::G
        } else {
            File::C
        };
        Square::new(file, mv.from.rank())
    } else {
        mv.to
    };
    Move {
        from: mv.from,
        to,
        promotion: mv.promotion,
    }
}

#[cfg(test)]
#[path = "uci_tests.rs"]
mod uci_tests;
