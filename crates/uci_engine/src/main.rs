//! Minimal UCI engine. Speaks enough of the protocol for the chess client:
//! handshake, `Skill Level`, `position`, `go`, `stop`, `quit`.

mod mover;
mod position;

use std::io::{self, BufRead, Write};

use anyhow::Result;
use chess_core::{move_to_uci, Game};
use rand::thread_rng;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use mover::{Mover, MAX_LEVEL};
use position::parse_position;

fn main() -> Result<()> {
    // stdout carries the protocol; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let mut game = Game::new();
    let mut mover = Mover::default();

    for line in stdin.lock().lines() {
        let line = line?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = parts.split_first() else {
            continue;
        };
        debug!(%line, "command");

        match command {
            "uci" => {
                writeln!(stdout, "id name ML-chess uci_engine {}", env!("CARGO_PKG_VERSION"))?;
                writeln!(stdout, "id author ML-chess")?;
                writeln!(
                    stdout,
                    "option name Skill Level type spin default {MAX_LEVEL} min 0 max {MAX_LEVEL}"
                )?;
                writeln!(stdout, "uciok")?;
            }
            "isready" => writeln!(stdout, "readyok")?,
            "setoption" => {
                if let Some(level) = skill_level(args) {
                    mover.set_level(level);
                }
            }
            "ucinewgame" => game = Game::new(),
            "position" => match parse_position(args) {
                Ok(parsed) => game = parsed,
                Err(e) => warn!(error = %e, "bad position command; keeping previous position"),
            },
            "go" => {
                // Search limits are ignored; the answer is immediate
                match mover.choose(&game, &mut thread_rng()) {
                    Some(mv) => writeln!(stdout, "bestmove {}", move_to_uci(mv))?,
                    None => writeln!(stdout, "bestmove (none)")?,
                }
            }
            // Nothing runs in the background, so there is nothing to stop
            "stop" => {}
            "quit" => break,
            _ => debug!(%command, "ignored"),
        }
        stdout.flush()?;
    }
    Ok(())
}

/// `name Skill Level value <n>`
fn skill_level(args: &[&str]) -> Option<u8> {
    let value_at = args.iter().position(|&w| w == "value")?;
    let name = args.get(1..value_at)?.join(" ");
    if !args.first().is_some_and(|&w| w == "name") || !name.eq_ignore_ascii_case("skill level") {
        return None;
    }
    args.get(value_at + 1)?.parse().ok()
}
