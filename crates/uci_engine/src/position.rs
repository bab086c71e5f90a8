//! `position` command arguments.

use anyhow::{bail, Context, Result};
use chess_core::{parse_uci_move, Game};

/// Build the game described by the words after `position`:
/// `startpos [moves ...]` or `fen <fen> [moves ...]`.
pub fn parse_position(args: &[&str]) -> Result<Game> {
    let moves_at = args.iter().position(|&w| w == "moves").unwrap_or(args.len());
    let (setup, moves) = args.split_at(moves_at);

    let mut game = match setup {
        ["startpos"] => Game::new(),
        ["fen", fen @ ..] if !fen.is_empty() => {
            let fen = fen.join(" ");
            Game::from_fen(&fen)?
        }
        _ => bail!("expected `startpos` or `fen <fen>`, got `{}`", setup.join(" ")),
    };

    for word in moves.iter().skip(1) {
        let mv = parse_uci_move(word)?;
        game.make_move(mv)
            .with_context(|| format!("replaying `{word}`"))?;
    }
    Ok(game)
}

#[cfg(test)]
#[path = "position_tests.rs"]
mod position_tests;
