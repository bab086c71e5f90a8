//! Terminal game loop: stdin commands, engine replies and the clock, all
//! multiplexed on one task.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use chess_core::{
    color_name, decide_on_points, status_text, Clock, Color, Game, Move,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};
use uci_client::{
    EngineError, EngineEvent, EngineSession, EngineState, EngineTransport, Inbound,
    ProcessTransport, ProtocolError,
};

use crate::command::{Command, HELP};
use crate::config::ClientConfig;
use crate::render::{board_text, moves_text};

/// The engine always plays black.
const ENGINE_COLOR: Color = Color::Black;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App<W: Write, T: EngineTransport = ProcessTransport> {
    game: Game,
    clock: Option<Clock>,
    engine: Option<EngineSession<T>>,
    /// Set when the game ended on the clock; the board alone can't tell
    flagged: bool,
    /// The engine gave up its turn (no usable reply or no reply in time);
    /// the human moves for it once
    engine_yielded: bool,
    out: W,
}

impl<W: Write, T: EngineTransport> App<W, T> {
    pub fn new(config: &ClientConfig, engine: Option<EngineSession<T>>, out: W) -> Self {
        let clock = (config.clock_minutes > 0).then(|| {
            let mut clock = Clock::new(config.clock_minutes);
            clock.reset(Color::White);
            clock
        });
        Self {
            game: Game::new(),
            clock,
            engine,
            flagged: false,
            engine_yielded: false,
            out,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn clock(&self) -> Option<&Clock> {
        self.clock.as_ref()
    }

    pub fn engine(&self) -> Option<&EngineSession<T>> {
        self.engine.as_ref()
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn is_over(&self) -> bool {
        self.flagged || self.game.is_game_over()
    }

    /// Read commands from `input` until `quit` or end of input.
    pub async fn run<R: AsyncBufRead + Unpin>(mut self, input: R) -> Result<W> {
        let mut lines = input.lines();
        let mut ticks = tokio::time::interval(Duration::from_secs(1));
        // The first tick completes immediately
        ticks.tick().await;

        self.show_board()?;
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
                inbound = engine_recv(&mut self.engine) => {
                    self.on_engine(inbound).await?;
                }
                _ = ticks.tick(), if self.clock.is_some() => {
                    self.on_tick()?;
                }
            }
        }

        if let Some(engine) = self.engine.take() {
            if let Err(e) = engine.shutdown().await {
                debug!(error = %e, "engine already gone at shutdown");
            }
        }
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
            Command::Move(mv) => self.human_move(mv).await?,
            Command::Moves(square) => writeln!(self.out, "{}", moves_text(&self.game, square))?,
            Command::New => {
                self.game.reset();
                self.restart().await?;
                writeln!(self.out, "New game.")?;
                self.show_board()?;
            }
            Command::Board => self.show_board()?,
            Command::Fen => writeln!(self.out, "{}", self.game.fen())?,
            Command::Pgn => writeln!(self.out, "{}", self.game.pgn())?,
            Command::Save(path) => {
                std::fs::write(&path, self.game.pgn())
                    .with_context(|| format!("writing {}", path.display()))?;
                writeln!(self.out, "Saved to {}.", path.display())?;
            }
            Command::Load(path) => {
                let text = match std::fs::read_to_string(&path) {
                    Ok(text) => text,
                    Err(e) => {
                        writeln!(self.out, "Cannot read {}: {e}", path.display())?;
                        return Ok(Flow::Continue);
                    }
                };
                if let Err(e) = self.game.load_pgn(&text) {
                    writeln!(self.out, "Cannot load {}: {e}", path.display())?;
                    return Ok(Flow::Continue);
                }
                info!(path = %path.display(), plies = self.game.ply_count(), "game loaded");
                self.restart().await?;
                writeln!(self.out, "Loaded {}.", path.display())?;
                self.show_board()?;
                self.engine_turn().await?;
            }
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Clock back to full, engine told about the new game.
    async fn restart(&mut self) -> Result<()> {
        self.flagged = false;
        self.engine_yielded = false;
        if let Some(clock) = self.clock.as_mut() {
            clock.reset(self.game.turn());
        }
        if let Some(engine) = self.engine.as_mut() {
            engine.new_game().await?;
        }
        Ok(())
    }

    async fn human_move(&mut self, mv: Move) -> Result<()> {
        if self.is_over() {
            writeln!(self.out, "The game is over; type `new` to play again.")?;
            return Ok(());
        }
        if self.engine.is_some() && self.game.turn() == ENGINE_COLOR && !self.engine_yielded {
            writeln!(self.out, "Wait for the engine to move.")?;
            return Ok(());
        }
        match self.game.make_move(mv) {
            Ok(record) => {
                debug!(san = %record.san, "human move");
                self.engine_yielded = false;
                self.after_move()?;
                self.engine_turn().await?;
            }
            Err(e) => writeln!(self.out, "{e}")?,
        }
        Ok(())
    }

    /// Ask the engine to move if it is its turn. A request refused because
    /// the handshake is still running is retried on `Ready`.
    async fn engine_turn(&mut self) -> Result<()> {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(());
        };
        if self.game.turn() != ENGINE_COLOR || self.flagged || self.game.is_game_over() {
            return Ok(());
        }
        match engine.request_move(&self.game, None).await {
            Ok(_) => {
                writeln!(self.out, "Engine is thinking...")?;
                Ok(())
            }
            Err(EngineError::NotReady | EngineError::Busy | EngineError::GameOver) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn on_engine(&mut self, inbound: Inbound) -> Result<()> {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(());
        };
        let Some(event) = engine.handle(inbound, &mut self.game) else {
            return Ok(());
        };
        match event {
            EngineEvent::Ready => {
                info!("engine ready");
                self.engine_turn().await?;
            }
            EngineEvent::MoveApplied(record) => {
                writeln!(self.out, "Engine plays {}.", record.san)?;
                self.after_move()?;
            }
            EngineEvent::Discarded(reason) => {
                let text = match reason {
                    ProtocolError::NoMove(_) => "Engine found no move.".to_string(),
                    ProtocolError::IllegalMove(mv) => format!("Engine sent an illegal move ({mv})."),
                };
                writeln!(self.out, "{text} Your move.")?;
                self.engine_yielded = true;
            }
            EngineEvent::StaleReply { .. } => {}
            EngineEvent::TimedOut => {
                writeln!(self.out, "Engine did not answer in time. Your move.")?;
                self.engine_yielded = true;
            }
            EngineEvent::Closed => {
                warn!("engine exited; continuing without it");
                writeln!(self.out, "Engine exited; both sides are now yours.")?;
                self.engine = None;
            }
        }
        Ok(())
    }

    pub fn on_tick(&mut self) -> Result<()> {
        if self.is_over() {
            return Ok(());
        }
        let Some(clock) = self.clock.as_mut() else {
            return Ok(());
        };
        if let Some(loser) = clock.tick() {
            self.flagged = true;
            let verdict = decide_on_points(&self.game);
            info!(loser = color_name(loser), %verdict, "flag fell");
            writeln!(self.out, "{} is out of time. {verdict}", color_name(loser))?;
        }
        Ok(())
    }

    fn after_move(&mut self) -> Result<()> {
        if let Some(clock) = self.clock.as_mut() {
            if self.game.is_game_over() {
                clock.stop();
            } else {
                clock.switch_to(self.game.turn());
            }
        }
        self.show_board()
    }

    fn show_board(&mut self) -> Result<()> {
        write!(self.out, "\n{}", board_text(&self.game))?;
        if let Some(clock) = &self.clock {
            writeln!(self.out, "{}", clock.display())?;
        }
        writeln!(self.out, "{}", status_text(&self.game))?;
        Ok(())
    }

    fn prompt(&mut self) -> Result<()> {
        let searching = self
            .engine
            .as_ref()
            .is_some_and(|e| e.state() == EngineState::Searching);
        if !searching {
            write!(self.out, "> ")?;
        }
        self.out.flush()?;
        Ok(())
    }
}

async fn engine_recv<T: EngineTransport>(engine: &mut Option<EngineSession<T>>) -> Inbound {
    match engine {
        Some(engine) => engine.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod app_tests;
