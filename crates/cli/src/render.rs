//! Plain-text board.

use chess_core::{Color, ColoredPiece, File, Game, PieceKind, Rank, Square};

fn piece_char(piece: ColoredPiece) -> char {
    let c = match piece.kind {
        PieceKind::Pawn => 'p',
        PieceKind::Knight => 'n',
        PieceKind::Bishop => 'b',
        PieceKind::Rook => 'r',
        PieceKind::Queen => 'q',
        PieceKind::King => 'k',
    };
    match piece.color {
        Color::White => c.to_ascii_uppercase(),
        Color::Black => c,
    }
}

/// White at the bottom, uppercase for white pieces, `.` for empty squares.
pub fn board_text(game: &Game) -> String {
    let mut out = String::new();
    for rank in Rank::ALL.iter().rev() {
        out.push_str(&format!("{} ", *rank as usize + 1));
        for &file in File::ALL.iter() {
            let c = game.get(Square::new(file, *rank)).map_or('.', piece_char);
            out.push(' ');
            out.push(c);
        }
        out.push('\n');
    }
    out.push_str("   a b c d e f g h\n");
    out
}

/// Legal destinations from `square`, one line.
pub fn moves_text(game: &Game, square: Square) -> String {
    let targets = game.moves_from(square);
    if targets.is_empty() {
        return format!("No legal moves from {square}.");
    }
    let names: Vec<String> = targets.iter().map(|sq| sq.to_string()).collect();
    format!("{square}: {}", names.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_position() {
        let text = board_text(&Game::new());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "8  r n b q k b n r");
        assert_eq!(lines[1], "7  p p p p p p p p");
        assert_eq!(lines[4], "4  . . . . . . . .");
        assert_eq!(lines[7], "1  R N B Q K B N R");
        assert_eq!(lines[8], "   a b c d e f g h");
    }

    #[test]
    fn test_moves_text() {
        let game = Game::new();
        let knight = chess_core::coord_to_sq("b1").unwrap();
        assert_eq!(moves_text(&game, knight), "b1: a3 c3");
        let empty = chess_core::coord_to_sq("e4").unwrap();
        assert_eq!(moves_text(&game, empty), "No legal moves from e4.");
    }
}
