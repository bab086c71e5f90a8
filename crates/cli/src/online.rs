//! Terminal front-end for one seat of a shared room: stdin commands and room
//! snapshots multiplexed on one task.

use std::io::Write;

use anyhow::{Context, Result};
use chess_core::{color_name, Game};
use room_sync::{Document, DocumentStore, SyncSession};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::app::Flow;
use crate::command::{Command, HELP};
use crate::render::{board_text, moves_text};

pub struct OnlineApp<W: Write, S: DocumentStore> {
    game: Game,
    session: SyncSession<S>,
    /// Last status line printed, to skip repeats from our own writes
    last_status: Option<String>,
    out: W,
}

impl<W: Write, S: DocumentStore> OnlineApp<W, S> {
    pub fn new(session: SyncSession<S>, out: W) -> Self {
        Self {
            game: Game::new(),
            session,
            last_status: None,
            out,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn session(&self) -> &SyncSession<S> {
        &self.session
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Create a room (no id) or take a seat in `room`, then follow it.
    pub async fn open(&mut self, room: Option<&str>) -> Result<()> {
        let id = self
            .session
            .open_or_create(room, &mut self.game)
            .await
            .context("opening the room")?;
        self.session
            .subscribe()
            .await
            .context("following the room")?;

        let color = self.session.color().map_or("?", color_name);
        writeln!(self.out, "Room {id}; you play {color}.")?;
        if room.is_none() {
            writeln!(
                self.out,
                "Your opponent joins with: chess_cli --mode online --room {id}"
            )?;
        }
        Ok(())
    }

    /// Open the room and read commands from `input` until `quit`, end of
    /// input, or the room feed ends.
    pub async fn run<R: AsyncBufRead + Unpin>(mut self, room: Option<&str>, input: R) -> Result<W> {
        self.open(room).await?;
        let mut lines = input.lines();
        self.prompt()?;
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("reading stdin")? else {
                        break;
                    };
                    if self.on_line(&line).await? == Flow::Quit {
                        break;
                    }
                    self.prompt()?;
                }
                snapshot = self.session.recv() => {
                    if self.on_snapshot(snapshot)? == Flow::Quit {
                        break;
                    }
                }
            }
        }
        self.session.leave(&mut self.game);
        Ok(self.out)
    }

    pub async fn on_line(&mut self, line: &str) -> Result<Flow> {
        match Command::parse(line) {
            Ok(Some(command)) => self.execute(command).await,
            Ok(None) => Ok(Flow::Continue),
            Err(e) => {
                writeln!(self.out, "{e}")?;
                Ok(Flow::Continue)
            }
        }
    }

    pub async fn execute(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Move(mv) => match self.session.submit_move(mv, &mut self.game).await {
                Ok(record) => {
                    debug!(san = %record.san, "move submitted");
                    self.show_board()?;
                    self.show_status()?;
                }
                Err(e) => writeln!(self.out, "{e}")?,
            },
            Command::Moves(square) => writeln!(self.out, "{}", moves_text(&self.game, square))?,
            Command::New => match self.session.request_rematch(&mut self.game).await {
                Ok(()) => {
                    writeln!(self.out, "Rematch started.")?;
                    self.show_board()?;
                    self.show_status()?;
                }
                Err(e) => writeln!(self.out, "{e}")?,
            },
            Command::Board => self.show_board()?,
            Command::Fen => writeln!(self.out, "{}", self.game.fen())?,
            Command::Pgn => writeln!(self.out, "{}", self.game.pgn())?,
            Command::Save(path) => {
                std::fs::write(&path, self.game.pgn())
                    .with_context(|| format!("writing {}", path.display()))?;
                writeln!(self.out, "Saved to {}.", path.display())?;
            }
            Command::Load(_) => {
                writeln!(self.out, "Loading a game is not available in a shared room.")?;
            }
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Apply one snapshot from the room feed; `None` means the feed ended.
    pub fn on_snapshot(&mut self, snapshot: Option<Document>) -> Result<Flow> {
        let Some(doc) = snapshot else {
            warn!("room feed ended");
            writeln!(self.out, "Lost the room feed; leaving.")?;
            return Ok(Flow::Quit);
        };
        let before = self.game.fen();
        let opponent = self.session.opponent().map(str::to_string);
        if let Err(e) = self.session.apply_snapshot(doc, &mut self.game) {
            writeln!(self.out, "{e}")?;
            return Ok(Flow::Continue);
        }

        if let Some(joined) = self.session.opponent() {
            if opponent.as_deref() != Some(joined) {
                info!(opponent = joined, "opponent seated");
                writeln!(self.out, "Opponent {joined} is here.")?;
            }
        }
        if self.game.fen() != before {
            self.show_board()?;
        }
        self.show_status()?;
        Ok(Flow::Continue)
    }

    fn show_board(&mut self) -> Result<()> {
        write!(self.out, "\n{}", board_text(&self.game))?;
        Ok(())
    }

    fn show_status(&mut self) -> Result<()> {
        let status = self.session.status(&self.game);
        if status.is_some() && status != self.last_status {
            if let Some(text) = &status {
                writeln!(self.out, "{text}")?;
            }
            self.last_status = status;
        }
        Ok(())
    }

    fn prompt(&mut self) -> Result<()> {
        write!(self.out, "> ")?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "online_tests.rs"]
mod online_tests;
