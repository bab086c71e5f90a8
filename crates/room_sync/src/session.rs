//! Coordinator for one player in a shared room.
//!
//! The session never trusts the document for move legality: a move is
//! checked by the local [`Game`] before anything is written, and remote
//! snapshots only replace the local position wholesale.

use std::sync::Arc;

use chess_core::{
    color_name, outcome_text, Color, Game, GameObserver, Move, MoveRecord, NoopObserver,
};
use tracing::{debug, info, warn};

use crate::error::SyncError;
use crate::room::{GameRoom, HistoryEntry};
use crate::store::{Document, DocumentStore, SetOptions, Subscription};

/// Collection holding room documents.
pub const ROOMS: &str = "games";

/// Fields written after a move or a rematch.
const GAME_FIELDS: &[&str] = &[
    "fen",
    "turn",
    "history",
    "status",
    "winner",
    "version",
    "updatedAt",
];

struct Joined {
    id: String,
    color: Color,
    /// Last document seen or written
    room: GameRoom,
    subscription: Option<Subscription>,
    opponent: Option<String>,
}

pub struct SyncSession<S: DocumentStore> {
    store: S,
    player: String,
    observer: Arc<dyn GameObserver>,
    joined: Option<Joined>,
}

impl<S: DocumentStore> SyncSession<S> {
    /// `player` is this client's stable identity; it decides seat reclaim
    /// on rejoin.
    pub fn new(store: S, player: impl Into<String>) -> Self {
        Self {
            store,
            player: player.into(),
            observer: Arc::new(NoopObserver),
            joined: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn GameObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn room_id(&self) -> Option<&str> {
        self.joined.as_ref().map(|j| j.id.as_str())
    }

    pub fn color(&self) -> Option<Color> {
        self.joined.as_ref().map(|j| j.color)
    }

    pub fn opponent(&self) -> Option<&str> {
        self.joined.as_ref()?.opponent.as_deref()
    }

    /// Last known room document.
    pub fn room(&self) -> Option<&GameRoom> {
        self.joined.as_ref().map(|j| &j.room)
    }

    /// Status line for the last known room state, e.g. `"Your move"`.
    pub fn status(&self, game: &Game) -> Option<String> {
        let joined = self.joined.as_ref()?;
        Some(room_status(&joined.room, joined.color, game))
    }

    /// Create a room (no id) or take a seat in an existing one. Returns the
    /// room id. Any previous room is left first.
    pub async fn open_or_create(
        &mut self,
        room_id: Option<&str>,
        game: &mut Game,
    ) -> Result<String, SyncError> {
        if self.joined.is_some() {
            self.leave(game);
        }
        match room_id {
            None => self.create(game).await,
            Some(id) => self.join(id, game).await,
        }
    }

    async fn create(&mut self, game: &mut Game) -> Result<String, SyncError> {
        let room = GameRoom::new(&self.player);
        let doc = room.to_document().map_err(|e| encode_error(&e))?;
        let id = self.store.create(ROOMS, doc).await?;
        info!(room = %id, player = %self.player, "room created");

        game.reset();
        self.joined = Some(Joined {
            id: id.clone(),
            color: Color::White,
            room,
            subscription: None,
            opponent: None,
        });
        Ok(id)
    }

    async fn join(&mut self, id: &str, game: &mut Game) -> Result<String, SyncError> {
        let doc = self
            .store
            .get(ROOMS, id)
            .await?
            .ok_or_else(|| SyncError::RoomNotFound(id.to_string()))?;
        let mut room = decode(id, doc)?;

        let color = match room.players.seat_of(&self.player) {
            Some(color) => {
                info!(room = %id, color = color_name(color), "rejoined room");
                color
            }
            None => {
                let color = room
                    .players
                    .free_seat()
                    .ok_or_else(|| SyncError::RoomFull(id.to_string()))?;
                room.players.set(color, &self.player);
                let claim = room.fields(&["players"]).map_err(|e| encode_error(&e))?;
                self.store.set(ROOMS, id, claim, SetOptions::merge()).await?;
                info!(room = %id, color = color_name(color), "joined room");
                color
            }
        };

        if game.fen() != room.fen {
            follow(game, &room).map_err(|e| corrupt(id, &e))?;
        }
        let opponent = room.players.get(!color).map(str::to_string);
        self.joined = Some(Joined {
            id: id.to_string(),
            color,
            room,
            subscription: None,
            opponent: None,
        });
        if let Some(opponent) = opponent {
            self.identify_opponent(&opponent);
        }
        Ok(id.to_string())
    }

    /// Start following the room document. The first snapshot arrives at
    /// once.
    pub async fn subscribe(&mut self) -> Result<(), SyncError> {
        let joined = self.joined.as_mut().ok_or(SyncError::NotInRoom)?;
        let subscription = self.store.subscribe(ROOMS, &joined.id).await?;
        joined.subscription = Some(subscription);
        debug!(room = %joined.id, "subscribed to room");
        Ok(())
    }

    pub fn is_subscribed(&self) -> bool {
        self.joined
            .as_ref()
            .is_some_and(|j| j.subscription.is_some())
    }

    /// Wait for the next snapshot. Pending forever when not subscribed, so
    /// it can sit in a `select!` unconditionally. Cancel safe.
    pub async fn recv(&mut self) -> Option<Document> {
        match self.joined.as_mut().and_then(|j| j.subscription.as_mut()) {
            Some(subscription) => subscription.next().await,
            None => std::future::pending().await,
        }
    }

    /// Receive and apply the next snapshot. `None` once the feed ended.
    pub async fn next_snapshot(&mut self, game: &mut Game) -> Option<Result<(), SyncError>> {
        let doc = self.recv().await?;
        Some(self.apply_snapshot(doc, game))
    }

    /// Apply the newest snapshot already delivered, skipping older ones.
    /// Returns whether there was one.
    pub fn catch_up(&mut self, game: &mut Game) -> Result<bool, SyncError> {
        let latest = self
            .joined
            .as_mut()
            .and_then(|j| j.subscription.as_mut())
            .and_then(Subscription::latest);
        match latest {
            Some(doc) => self.apply_snapshot(doc, game).map(|()| true),
            None => Ok(false),
        }
    }

    /// Bring `game` and the status line in line with a room snapshot.
    pub fn apply_snapshot(&mut self, doc: Document, game: &mut Game) -> Result<(), SyncError> {
        let joined = self.joined.as_mut().ok_or(SyncError::NotInRoom)?;
        let room = decode(&joined.id, doc)?;

        if game.fen() != room.fen {
            follow(game, &room).map_err(|e| corrupt(&joined.id, &e))?;
            debug!(room = %joined.id, version = room.version, fen = %room.fen, "remote position applied");
            self.observer.on_position_changed();
        }

        let status = room_status(&room, joined.color, game);
        let opponent = room.players.get(!joined.color).map(str::to_string);
        joined.room = room;
        self.observer.on_status_changed(&status);
        if let Some(opponent) = opponent {
            self.identify_opponent(&opponent);
        }
        Ok(())
    }

    fn identify_opponent(&mut self, opponent: &str) {
        let Some(joined) = self.joined.as_mut() else {
            return;
        };
        if joined.opponent.as_deref() == Some(opponent) {
            return;
        }
        info!(room = %joined.id, %opponent, "opponent identified");
        joined.opponent = Some(opponent.to_string());
        self.observer.on_opponent_identified(opponent);
    }

    /// Play a move for this player's side and publish it.
    ///
    /// Nothing changes when it is not our turn, the game has ended or the
    /// move is illegal. If publishing fails the move is taken back.
    pub async fn submit_move(&mut self, mv: Move, game: &mut Game) -> Result<MoveRecord, SyncError> {
        let joined = self.joined.as_mut().ok_or(SyncError::NotInRoom)?;
        if joined.room.is_ended() {
            return Err(SyncError::GameEnded);
        }
        if game.turn() != joined.color {
            debug!(room = %joined.id, mv = %mv, "move attempted out of turn");
            return Err(SyncError::NotYourTurn);
        }
        let record = game.make_move(mv)?;

        let mut room = joined.room.clone();
        room.record_move(game, &record);
        let published = match room.fields(GAME_FIELDS) {
            Ok(fields) => self
                .store
                .set(ROOMS, &joined.id, fields, SetOptions::merge())
                .await
                .map_err(SyncError::from),
            Err(e) => Err(encode_error(&e).into()),
        };
        if let Err(e) = published {
            warn!(room = %joined.id, mv = %mv, error = %e, "publish failed; move taken back");
            game.undo();
            return Err(e);
        }

        info!(room = %joined.id, san = %record.san, version = room.version, "move published");
        let status = room_status(&room, joined.color, game);
        joined.room = room;
        self.observer.on_position_changed();
        self.observer.on_status_changed(&status);
        Ok(record)
    }

    /// Restart the shared game from the start position. Either player may
    /// do this at any time; seats are kept.
    pub async fn request_rematch(&mut self, game: &mut Game) -> Result<(), SyncError> {
        let joined = self.joined.as_mut().ok_or(SyncError::NotInRoom)?;
        let mut room = joined.room.clone();
        room.restart();
        let fields = room.fields(GAME_FIELDS).map_err(|e| encode_error(&e))?;
        self.store
            .set(ROOMS, &joined.id, fields, SetOptions::merge())
            .await?;
        info!(room = %joined.id, "rematch started");

        game.reset();
        let status = room_status(&room, joined.color, game);
        joined.room = room;
        self.observer.on_position_changed();
        self.observer.on_status_changed(&status);
        Ok(())
    }

    /// Stop following the room and reset the local game. The room document
    /// and the opponent are left alone.
    pub fn leave(&mut self, game: &mut Game) {
        if let Some(joined) = self.joined.take() {
            info!(room = %joined.id, "left room");
        }
        game.reset();
        self.observer.on_position_changed();
    }
}

/// Catch `game` up with `room`: replay the missing history entries when the
/// local moves are a prefix of the room's, otherwise load the FEN.
fn follow(game: &mut Game, room: &GameRoom) -> Result<(), chess_core::FenError> {
    if let Some(caught_up) = replay(game, &room.history) {
        if caught_up.fen() == room.fen {
            *game = caught_up;
            return Ok(());
        }
    }
    game.load(&room.fen)
}

fn replay(game: &Game, history: &[HistoryEntry]) -> Option<Game> {
    let played = game.history();
    if played.len() > history.len()
        || !played.iter().zip(history).all(|(san, entry)| *san == entry.san)
    {
        return None;
    }
    let mut next = game.clone();
    for entry in &history[played.len()..] {
        let mv = chess_core::parse_uci_move(&entry.uci()).ok()?;
        next.make_move(mv).ok()?;
    }
    Some(next)
}

/// Status line for `color` given the room and the synced game.
fn room_status(room: &GameRoom, color: Color, game: &Game) -> String {
    if room.is_ended() {
        return outcome_text(game).unwrap_or_else(|| match room.winner.as_deref() {
            Some("Draw") | None => "It's a draw!".to_string(),
            Some(winner) => format!("{winner} wins!"),
        });
    }
    if Color::from(room.turn) == color {
        "Your move".to_string()
    } else {
        "Opponent's move".to_string()
    }
}

fn decode(id: &str, doc: Document) -> Result<GameRoom, SyncError> {
    GameRoom::from_document(doc).map_err(|e| corrupt(id, &e))
}

fn corrupt(id: &str, reason: &dyn std::fmt::Display) -> SyncError {
    warn!(room = %id, %reason, "unreadable room document");
    SyncError::CorruptRoom {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}

fn encode_error(e: &serde_json::Error) -> crate::error::StoreError {
    crate::error::StoreError::Encode(e.to_string())
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
