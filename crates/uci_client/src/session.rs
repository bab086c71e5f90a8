//! Engine session: handshake, one search at a time, stale-reply rejection.
//!
//! ```text
//! Uninitialized --start--> AwaitingHandshake --readyok--> Idle
//! Idle --request_move--> Searching --bestmove--> Idle
//! any --new_game--> generation + 1 (Searching falls back to Idle)
//! ```
//!
//! Every `go` is tagged with the generation current when it was sent. UCI
//! answers searches in order, so the oldest unanswered tag always belongs to
//! the next `bestmove`. A reply whose tag is not the current generation is
//! stale and is dropped without touching the game.

use std::collections::VecDeque;
use std::sync::Arc;

use chess_core::{status_text, Game, GameObserver, MoveRecord, NoopObserver};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::config::{EngineConfig, MAX_SKILL_LEVEL};
use crate::error::{EngineError, ProtocolError};
use crate::protocol::{BestMove, EngineCommand, EngineMessage, HandshakeStep};
use crate::transport::{EngineTransport, ProcessTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    AwaitingHandshake,
    Idle,
    Searching,
}

/// What the session did with an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Handshake finished; requests are accepted from now on.
    Ready,
    /// The engine's move was legal and has been played.
    MoveApplied(MoveRecord),
    /// The reply could not be used. The session is idle again and the
    /// human has the move.
    Discarded(ProtocolError),
    /// A reply to a search from an older generation, or to no search at
    /// all. Nothing was applied.
    StaleReply { generation: Option<u64> },
    /// The configured search timeout passed without a reply.
    TimedOut,
    /// The engine went away.
    Closed,
}

/// Something pulled off the transport, not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Message(EngineMessage),
    TimedOut,
    Closed,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    generation: u64,
    deadline: Option<Instant>,
}

pub struct EngineSession<T: EngineTransport = ProcessTransport> {
    transport: T,
    config: EngineConfig,
    observer: Arc<dyn GameObserver>,
    state: EngineState,
    generation: u64,
    pending: Option<Pending>,
    /// Generations of `go` commands whose `bestmove` has not arrived yet
    unanswered: VecDeque<u64>,
}

impl EngineSession<ProcessTransport> {
    /// Start the configured engine binary and begin the handshake.
    pub async fn spawn(config: EngineConfig) -> Result<Self, EngineError> {
        let transport = ProcessTransport::spawn(&config.path, &config.args)?;
        Self::start(transport, config).await
    }
}

impl<T: EngineTransport> EngineSession<T> {
    /// Take ownership of `transport` and send the handshake.
    pub async fn start(transport: T, config: EngineConfig) -> Result<Self, EngineError> {
        let mut session = Self {
            transport,
            config,
            observer: Arc::new(NoopObserver),
            state: EngineState::Uninitialized,
            generation: 0,
            pending: None,
            unanswered: VecDeque::new(),
        };
        session.send(EngineCommand::Uci).await?;
        session.send(EngineCommand::IsReady).await?;
        session.state = EngineState::AwaitingHandshake;
        Ok(session)
    }

    pub fn with_observer(mut self, observer: Arc<dyn GameObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_searching(&self) -> bool {
        self.state == EngineState::Searching
    }

    async fn send(&mut self, command: EngineCommand) -> Result<(), EngineError> {
        let line = command.to_string();
        debug!(%line, "> engine");
        self.transport.send(&line).await
    }

    /// Wait until the handshake completes. Messages arriving meanwhile are
    /// handled as usual.
    pub async fn wait_ready(&mut self, game: &mut Game) -> Result<(), EngineError> {
        while self.state != EngineState::Idle {
            match self.next_event(game).await {
                Some(EngineEvent::Closed) | None => return Err(EngineError::Closed),
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Ask for a move in the current position. `level` falls back to the
    /// configured skill level. Returns the generation tag of the request.
    ///
    /// Refused without any engine traffic while a search is running, before
    /// the handshake finished, or when the game is already over.
    pub async fn request_move(&mut self, game: &Game, level: Option<u8>) -> Result<u64, EngineError> {
        match self.state {
            EngineState::Searching => {
                warn!(generation = self.generation, "move requested while searching; ignored");
                return Err(EngineError::Busy);
            }
            EngineState::Uninitialized | EngineState::AwaitingHandshake => {
                warn!("move requested before engine handshake; ignored");
                return Err(EngineError::NotReady);
            }
            EngineState::Idle => {}
        }
        if game.is_game_over() {
            return Err(EngineError::GameOver);
        }

        let level = level.unwrap_or(self.config.skill_level).min(MAX_SKILL_LEVEL);
        let depth = self.config.depth_for(level);
        self.send(EngineCommand::skill_level(level)).await?;
        self.send(EngineCommand::PositionFen(game.fen())).await?;
        self.send(EngineCommand::GoDepth(depth)).await?;

        self.unanswered.push_back(self.generation);
        self.pending = Some(Pending {
            generation: self.generation,
            deadline: self.config.search_timeout().map(|t| Instant::now() + t),
        });
        self.state = EngineState::Searching;
        info!(generation = self.generation, level, depth, "engine search started");
        Ok(self.generation)
    }

    /// Forget any running search and tell the engine a new game begins.
    /// The engine process itself keeps running.
    pub async fn new_game(&mut self) -> Result<(), EngineError> {
        let was_searching = self.state == EngineState::Searching;
        self.generation += 1;
        self.pending = None;
        if was_searching {
            self.state = EngineState::Idle;
            self.send(EngineCommand::Stop).await?;
        }
        self.send(EngineCommand::UciNewGame).await?;
        info!(generation = self.generation, was_searching, "engine reset for new game");
        Ok(())
    }

    /// Send `quit`. The session is unusable afterwards.
    pub async fn shutdown(mut self) -> Result<T, EngineError> {
        self.send(EngineCommand::Quit).await?;
        Ok(self.transport)
    }

    /// Pull the next message off the transport, honoring the search
    /// timeout. Cancel safe.
    pub async fn recv(&mut self) -> Inbound {
        let deadline = self.pending.and_then(|p| p.deadline);
        let line = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, self.transport.recv()).await {
                Ok(line) => line,
                Err(_) => return Inbound::TimedOut,
            },
            None => self.transport.recv().await,
        };
        match line {
            Some(line) => {
                debug!(%line, "< engine");
                Inbound::Message(EngineMessage::decode(&line))
            }
            None => Inbound::Closed,
        }
    }

    /// Run one inbound item through the state machine. Returns `None` for
    /// messages that change nothing visible.
    pub fn handle(&mut self, inbound: Inbound, game: &mut Game) -> Option<EngineEvent> {
        match inbound {
            Inbound::Message(message) => self.handle_message(message, game),
            Inbound::TimedOut => self.handle_timeout(),
            Inbound::Closed => {
                warn!("engine closed its output");
                self.pending = None;
                self.unanswered.clear();
                self.state = EngineState::Uninitialized;
                Some(EngineEvent::Closed)
            }
        }
    }

    /// Receive and handle until something worth reporting happens.
    pub async fn next_event(&mut self, game: &mut Game) -> Option<EngineEvent> {
        loop {
            let inbound = self.recv().await;
            let closed = inbound == Inbound::Closed;
            if let Some(event) = self.handle(inbound, game) {
                return Some(event);
            }
            if closed {
                return None;
            }
        }
    }

    pub fn handle_message(&mut self, message: EngineMessage, game: &mut Game) -> Option<EngineEvent> {
        match message {
            EngineMessage::HandshakeAck(HandshakeStep::Uci) => {
                trace!("uciok");
                None
            }
            EngineMessage::HandshakeAck(HandshakeStep::Ready) => {
                if self.state == EngineState::AwaitingHandshake {
                    self.state = EngineState::Idle;
                    info!("engine ready");
                    Some(EngineEvent::Ready)
                } else {
                    None
                }
            }
            EngineMessage::BestMove(best) => Some(self.handle_best_move(best, game)),
            EngineMessage::Info(text) => {
                trace!(%text, "engine info");
                None
            }
        }
    }

    fn handle_best_move(&mut self, best: BestMove, game: &mut Game) -> EngineEvent {
        let tag = self.unanswered.pop_front();
        let current = self
            .pending
            .filter(|p| self.state == EngineState::Searching && Some(p.generation) == tag);
        if current.is_none() {
            debug!(?tag, generation = self.generation, "stale bestmove dropped");
            return EngineEvent::StaleReply { generation: tag };
        }

        self.pending = None;
        self.state = EngineState::Idle;

        let Some(mv) = best.best else {
            let token = best.token.unwrap_or_default();
            warn!(%token, "engine returned no usable move");
            return EngineEvent::Discarded(ProtocolError::NoMove(token));
        };
        match game.make_move(mv) {
            Ok(record) => {
                info!(mv = %record.mv, san = %record.san, "engine move applied");
                self.observer.on_position_changed();
                self.observer.on_status_changed(&status_text(game));
                EngineEvent::MoveApplied(record)
            }
            Err(e) => {
                warn!(error = %e, fen = %game.fen(), "engine move rejected");
                EngineEvent::Discarded(ProtocolError::IllegalMove(mv))
            }
        }
    }

    fn handle_timeout(&mut self) -> Option<EngineEvent> {
        let pending = self.pending.take()?;
        warn!(generation = pending.generation, "engine search timed out");
        // The reply may still come; bumping the generation makes it stale
        self.generation += 1;
        self.state = EngineState::Idle;
        Some(EngineEvent::TimedOut)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
