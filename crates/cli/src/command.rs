//! One line of user input.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chess_core::{coord_to_sq, parse_uci_move, Move, Square};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `e2e4`, `e7e8n`
    Move(Move),
    /// `moves e2`: legal destinations from a square
    Moves(Square),
    New,
    Fen,
    Pgn,
    Save(PathBuf),
    Load(PathBuf),
    Board,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  <from><to>[q|r|b|n]  play a move, e.g. e2e4 or e7e8n
  moves <square>       list legal destinations from a square
  new                  start a new game
  board                print the board
  fen                  print the position as FEN
  pgn                  print the game as PGN
  save <path>          write the game to a PGN file
  load <path>          read a game from a PGN file
  help                 show this text
  quit                 exit";

impl Command {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        let rest: Vec<&str> = words.collect();
        let path = || -> Result<PathBuf> {
            match rest.as_slice() {
                [] => bail!("`{head}` needs a file path"),
                parts => Ok(PathBuf::from(parts.join(" "))),
            }
        };

        let command = match head.to_ascii_lowercase().as_str() {
            "moves" => {
                let square = rest.first().context("`moves` needs a square, e.g. moves e2")?;
                Command::Moves(coord_to_sq(square).with_context(|| format!("no such square `{square}`"))?)
            }
            "new" => Command::New,
            "fen" => Command::Fen,
            "pgn" => Command::Pgn,
            "board" => Command::Board,
            "save" => Command::Save(path()?),
            "load" => Command::Load(path()?),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => match parse_uci_move(head) {
                Ok(mv) => Command::Move(mv),
                Err(_) => bail!("unknown command `{head}`; type `help`"),
            },
        };
        Ok(Some(command))
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod command_tests;
