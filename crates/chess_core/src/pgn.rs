//! PGN export and import.

use crate::error::PgnError;
use crate::game::{Game, Outcome, START_FEN};
use crate::types::Color;

const LINE_WIDTH: usize = 80;

impl Game {
    /// `1-0`, `0-1`, `1/2-1/2` or `*`.
    pub fn result_tag(&self) -> &'static str {
        match self.outcome() {
            Some(Outcome::Checkmate {
                winner: Color::White,
            }) => "1-0",
            Some(Outcome::Checkmate {
                winner: Color::Black,
            }) => "0-1",
            Some(Outcome::Draw(_)) => "1/2-1/2",
            None => "*",
        }
    }

    /// Seven-tag-roster PGN of the game so far.
    pub fn pgn(&self) -> String {
        let result = self.result_tag();
        let mut out = String::new();
        for (tag, value) in [
            ("Event", "Casual Game"),
            ("Site", "?"),
            ("Date", "????.??.??"),
            ("Round", "?"),
            ("White", "White"),
            ("Black", "Black"),
            ("Result", result),
        ] {
            out.push_str(&format!("[{tag} \"{value}\"]\n"));
        }
        let start_fen = self.start_fen();
        if start_fen != START_FEN {
            out.push_str("[SetUp \"1\"]\n");
            out.push_str(&format!("[FEN \"{start_fen}\"]\n"));
        }
        out.push('\n');

        let mut tokens = Vec::new();
        let mut number = fullmove_number(&start_fen);
        for (i, record) in self.records().enumerate() {
            match record.color {
                Color::White => tokens.push(format!("{number}.")),
                Color::Black if i == 0 => tokens.push(format!("{number}...")),
                Color::Black => {}
            }
            tokens.push(record.san.clone());
            if record.color == Color::Black {
                number += 1;
            }
        }
        tokens.push(result.to_string());

        let mut line = String::new();
        for token in tokens {
            if !line.is_empty() && line.len() + 1 + token.len() > LINE_WIDTH {
                out.push_str(&line);
                out.push('\n');
                line.clear();
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&token);
        }
        out.push_str(&line);
        out.push('\n');
        out
    }

    /// Replace this game with the one described by `text`. On any error the
    /// game is left as it was.
    pub fn load_pgn(&mut self, text: &str) -> Result<(), PgnError> {
        let mut fen = None;
        let mut movetext = String::new();
        for line in text.lines() {
            let line = line.trim();
            if let Some(tag) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                if let Some((key, value)) = tag.split_once(' ') {
                    if key == "FEN" {
                        fen = Some(value.trim().trim_matches('"').to_string());
                    }
                }
                continue;
            }
            // `;` comments run to end of line
            let line = line.split(';').next().unwrap_or("");
            movetext.push_str(line);
            movetext.push(' ');
        }

        let mut game = match fen {
            Some(fen) => Game::from_fen(&fen)?,
            None => Game::new(),
        };
        for (ply, token) in movetext_tokens(&movetext)?.into_iter().enumerate() {
            game.make_san_move(&token)
                .map_err(|source| PgnError::Move {
                    ply: ply + 1,
                    source,
                })?;
        }
        *self = game;
        Ok(())
    }
}

fn fullmove_number(fen: &str) -> u32 {
    fen.split_whitespace()
        .nth(5)
        .and_then(|n| n.parse().ok())
        .unwrap_or(1)
}

/// SAN tokens of a movetext section, with comments, variations, NAGs, move
/// numbers and the result marker removed.
fn movetext_tokens(movetext: &str) -> Result<Vec<String>, PgnError> {
    let mut cleaned = String::with_capacity(movetext.len());
    let mut comment = false;
    let mut depth = 0usize;
    for ch in movetext.chars() {
        match ch {
            '{' if !comment => comment = true,
            '}' if comment => {
                comment = false;
                cleaned.push(' ');
            }
            _ if comment => {}
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                cleaned.push(' ');
            }
            _ if depth > 0 => {}
            _ => cleaned.push(ch),
        }
    }
    if comment {
        return Err(PgnError::Unterminated("comment"));
    }
    if depth > 0 {
        return Err(PgnError::Unterminated("variation"));
    }

    let mut tokens = Vec::new();
    for raw in cleaned.split_whitespace() {
        if matches!(raw, "1-0" | "0-1" | "1/2-1/2" | "*") || raw.starts_with('$') {
            continue;
        }
        // `12.`, `12...` and `12.e4`; `0-0` has no dot and is kept
        let token = if raw.starts_with(|c: char| c.is_ascii_digit()) && raw.contains('.') {
            raw.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.')
        } else {
            raw
        };
        if token.is_empty() {
            continue;
        }
        tokens.push(token.to_string());
    }
    Ok(tokens)
}

#[cfg(test)]
#[path = "pgn_tests.rs"]
mod pgn_tests;
