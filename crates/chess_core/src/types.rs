use std::fmt;

pub use cozy_chess::{Color, File, Piece as PieceKind, Rank, Square};

/// A piece together with its owner, as seen on a board square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColoredPiece {
    pub color: Color,
    pub kind: PieceKind,
}

/// A move in standard notation: castling is the king's two-square step
/// (`e1g1`), never the rules engine's internal king-takes-rook form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(from: Square, to: Square, promotion: PieceKind) -> Self {
        Self {
            from,
            to,
            promotion: Some(promotion),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(p) = self.promotion {
            write!(f, "{}", promotion_char(p))?;
        }
        Ok(())
    }
}

/// A move that the rules engine accepted, with its SAN relative to the
/// position it was played from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    pub mv: Move,
    pub color: Color,
    pub san: String,
}

// Helpers

/// Parse a square label such as `e4`.
pub fn coord_to_sq(c: &str) -> Option<Square> {
    let b = c.as_bytes();
    if b.len() != 2 {
        return None;
    }
    let f = b[0].to_ascii_lowercase();
    let r = b[1];
    if !(b'a'..=b'h').contains(&f) || !(b'1'..=b'8').contains(&r) {
        return None;
    }
    Some(Square::new(
        File::index((f - b'a') as usize),
        Rank::index((r - b'1') as usize),
    ))
}

pub fn file_char(sq: Square) -> char {
    (b'a' + sq.file() as u8) as char
}

pub fn rank_char(sq: Square) -> char {
    (b'1' + sq.rank() as u8) as char
}

/// Lowercase UCI promotion suffix.
pub fn promotion_char(kind: PieceKind) -> char {
    match kind {
        PieceKind::Queen => 'q',
        PieceKind::Rook => 'r',
        PieceKind::Bishop => 'b',
        PieceKind::Knight => 'n',
        PieceKind::Pawn => 'p',
        PieceKind::King => 'k',
    }
}

pub fn promotion_from_char(c: char) -> Option<PieceKind> {
    match c.to_ascii_lowercase() {
        'q' => Some(PieceKind::Queen),
        'r' => Some(PieceKind::Rook),
        'b' => Some(PieceKind::Bishop),
        'n' => Some(PieceKind::Knight),
        _ => None,
    }
}

/// `"White"` / `"Black"`, the labels used in status text and room winners.
pub fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}

/// `'w'` / `'b'`, the FEN side-to-move letter.
pub fn color_letter(color: Color) -> char {
    match color {
        Color::White => 'w',
        Color::Black => 'b',
    }
}

pub fn color_from_letter(c: char) -> Option<Color> {
    match c {
        'w' => Some(Color::White),
        'b' => Some(Color::Black),
        _ => None,
    }
}

/// Light squares have an odd file + rank sum (a1 is dark).
pub fn is_light_square(sq: Square) -> bool {
    (sq.file() as usize + sq.rank() as usize) % 2 == 1
}
