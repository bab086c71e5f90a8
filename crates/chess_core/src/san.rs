//! Standard Algebraic Notation for moves in a given position.

use cozy_chess::Board;

use crate::types::*;

/// All legal moves in the rules engine's encoding.
pub(crate) fn legal_engine_moves(board: &Board) -> Vec<cozy_chess::Move> {
    let mut moves = Vec::new();
    board.generate_moves(|piece_moves| {
        moves.extend(piece_moves);
        false
    });
    moves
}

fn piece_letter(kind: PieceKind) -> Option<char> {
    match kind {
        PieceKind::King => Some('K'),
        PieceKind::Queen => Some('Q'),
        PieceKind::Rook => Some('R'),
        PieceKind::Bishop => Some('B'),
        PieceKind::Knight => Some('N'),
        PieceKind::Pawn => None,
    }
}

/// SAN without the check/mate suffix. `mv` must be legal on `board`.
fn san_body(board: &Board, mv: cozy_chess::Move) -> String {
    let stm = board.side_to_move();
    let piece = match board.piece_on(mv.from) {
        Some(p) => p,
        None => return format!("{}{}", mv.from, mv.to),
    };

    // Castling: the king lands on its own rook
    if piece == PieceKind::King && board.color_on(mv.to) == Some(stm) {
        return if mv.to.file() as u8 > mv.from.file() as u8 {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        };
    }

    let mut san = String::new();
    let is_capture = board.color_on(mv.to) == Some(!stm)
        || (piece == PieceKind::Pawn && mv.from.file() != mv.to.file());

    match piece_letter(piece) {
        Some(letter) => {
            san.push(letter);
            // Disambiguate against other pieces of the same kind reaching the same square
            let rivals: Vec<Square> = legal_engine_moves(board)
                .into_iter()
                .filter(|m| m.to == mv.to && m.from != mv.from)
                .filter(|m| board.piece_on(m.from) == Some(piece))
                .map(|m| m.from)
                .collect();
            if !rivals.is_empty() {
                let same_file = rivals.iter().any(|s| s.file() == mv.from.file());
                let same_rank = rivals.iter().any(|s| s.rank() == mv.from.rank());
                if !same_file {
                    san.push(file_char(mv.from));
                } else if !same_rank {
                    san.push(rank_char(mv.from));
                } else {
                    san.push(file_char(mv.from));
                    san.push(rank_char(mv.from));
                }
            }
        }
        None => {
            if is_capture {
                san.push(file_char(mv.from));
            }
        }
    }

    if is_capture {
        san.push('x');
    }
    san.push_str(&mv.to.to_string());

    if let Some(promo) = mv.promotion {
        san.push('=');
        san.push(piece_letter(promo).unwrap_or('Q'));
    }
    san
}

/// Full SAN including `+` / `#`. `mv` must be legal on `board`.
pub(crate) fn san(board: &Board, mv: cozy_chess::Move) -> String {
    let mut san = san_body(board, mv);
    let mut after = board.clone();
    after.play_unchecked(mv);
    if !after.checkers().is_empty() {
        let escapes = after.generate_moves(|moves| !moves.is_empty());
        san.push(if escapes { '+' } else { '#' });
    }
    san
}

fn normalize(token: &str) -> String {
    token
        .trim_end_matches(['+', '#', '!', '?'])
        .replace("0-0-0", "O-O-O")
        .replace("0-0", "O-O")
        .replace('=', "")
}

/// Find the legal move whose SAN matches `token`.
pub(crate) fn find_san(board: &Board, token: &str) -> Option<cozy_chess::Move> {
    let wanted = normalize(token);
    if wanted.is_empty() {
        return None;
    }
    legal_engine_moves(board)
        .into_iter()
        .find(|&mv| normalize(&san_body(board, mv)) == wanted)
}
