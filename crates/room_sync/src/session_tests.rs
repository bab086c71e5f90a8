use super::*;
use crate::room::RoomStatus;
use chess_core::{coord_to_sq, START_FEN};

fn play(game: &mut Game, uci: &str) -> MoveRecord {
    game.make_move(chess_core::parse_uci_move(uci).unwrap()).unwrap()
}

fn room_after(moves: &[&str]) -> (GameRoom, Game) {
    let mut game = Game::new();
    let mut room = GameRoom::new("alice");
    for uci in moves {
        let record = play(&mut game, uci);
        room.record_move(&game, &record);
    }
    (room, game)
}

#[test]
fn test_status_follows_turn() {
    let (room, game) = room_after(&["e2e4"]);
    assert_eq!(room_status(&room, Color::Black, &game), "Your move");
    assert_eq!(room_status(&room, Color::White, &game), "Opponent's move");
}

#[test]
fn test_status_when_ended() {
    let (room, game) = room_after(&["f2f3", "e7e5", "g2g4", "d8h4"]);
    assert_eq!(room.status, RoomStatus::Ended);
    assert_eq!(room_status(&room, Color::White, &game), "Black wins by checkmate!");

    // Ended without a decisive local position, e.g. a resignation by
    // another client
    let mut resigned = GameRoom::new("alice");
    resigned.status = RoomStatus::Ended;
    resigned.winner = Some("White".into());
    assert_eq!(room_status(&resigned, Color::Black, &Game::new()), "White wins!");
}

#[test]
fn test_follow_replays_history() {
    let (room, _) = room_after(&["e2e4", "e7e5", "g1f3"]);
    let mut game = Game::new();
    play(&mut game, "e2e4");

    follow(&mut game, &room).unwrap();
    assert_eq!(game.fen(), room.fen);
    assert_eq!(game.history(), vec!["e4", "e5", "Nf3"]);
}

#[test]
fn test_follow_loads_fen_on_divergence() {
    let (room, _) = room_after(&["d2d4"]);
    let mut game = Game::new();
    play(&mut game, "e2e4");

    follow(&mut game, &room).unwrap();
    assert_eq!(game.fen(), room.fen);
    assert!(game.history().is_empty());
}

#[test]
fn test_follow_rematch_resets() {
    let (mut room, mut game) = room_after(&["e2e4", "e7e5"]);
    room.restart();
    follow(&mut game, &room).unwrap();
    assert_eq!(game.fen(), START_FEN);
    assert_eq!(game.ply_count(), 0);
}

#[test]
fn test_follow_rejects_bad_fen() {
    let mut room = GameRoom::new("alice");
    room.fen = "not a position".into();
    let mut game = Game::new();
    play(&mut game, "e2e4");
    let before = game.fen();

    assert!(follow(&mut game, &room).is_err());
    assert_eq!(game.fen(), before);
}

#[test]
fn test_replay_skips_unparseable_entries() {
    let (mut room, _) = room_after(&["e2e4"]);
    room.history[0].to = "z9".into();
    assert!(replay(&Game::new(), &room.history).is_none());
    assert!(coord_to_sq("z9").is_none());
}
