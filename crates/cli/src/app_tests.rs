use super::*;
use uci_client::{ChannelTransport, EngineConfig, EngineEnd, EngineMessage};

type TestApp = App<Vec<u8>, ChannelTransport>;

fn config(clock_minutes: u32) -> ClientConfig {
    ClientConfig {
        clock_minutes,
        ..Default::default()
    }
}

fn output(app: TestApp) -> String {
    String::from_utf8(app.into_output()).unwrap()
}

fn reply(line: &str) -> Inbound {
    Inbound::Message(EngineMessage::decode(line))
}

async fn ai_app() -> (TestApp, EngineEnd) {
    let (transport, mut engine) = ChannelTransport::pair();
    let session = EngineSession::start(transport, EngineConfig::default())
        .await
        .unwrap();
    engine.drain();
    (App::new(&config(0), Some(session), Vec::new()), engine)
}

#[tokio::test]
async fn test_local_game_until_mate() {
    let mut app: TestApp = App::new(&config(0), None, Vec::new());
    for line in ["f2f3", "e7e5", "g2g4", "d8h4"] {
        assert_eq!(app.on_line(line).await.unwrap(), Flow::Continue);
    }
    assert!(app.game().in_checkmate());
    app.on_line("a2a3").await.unwrap();
    assert_eq!(app.game().ply_count(), 4);

    let out = output(app);
    assert!(out.contains("Black wins by checkmate!"), "{out}");
    assert!(out.contains("The game is over"), "{out}");
}

#[tokio::test]
async fn test_bad_input_is_reported() {
    let mut app: TestApp = App::new(&config(0), None, Vec::new());
    app.on_line("e2e5").await.unwrap();
    app.on_line("castle").await.unwrap();
    assert_eq!(app.game().ply_count(), 0);

    let out = output(app);
    assert!(out.contains("e2e5"), "{out}");
    assert!(out.contains("unknown command `castle`"), "{out}");
}

#[tokio::test]
async fn test_quit_and_new() {
    let mut app: TestApp = App::new(&config(0), None, Vec::new());
    app.on_line("e2e4").await.unwrap();
    app.on_line("new").await.unwrap();
    assert_eq!(app.game().ply_count(), 0);
    assert_eq!(app.on_line("quit").await.unwrap(), Flow::Quit);
}

#[tokio::test]
async fn test_moves_listing() {
    let mut app: TestApp = App::new(&config(0), None, Vec::new());
    app.on_line("moves g1").await.unwrap();
    app.on_line("moves e4").await.unwrap();
    let out = output(app);
    assert!(out.contains("g1: "), "{out}");
    assert!(out.contains("f3") && out.contains("h3"), "{out}");
    assert!(out.contains("No legal moves from e4."), "{out}");
}

#[tokio::test]
async fn test_engine_answers_human_move() {
    let (mut app, mut engine) = ai_app().await;
    app.on_engine(reply("uciok")).await.unwrap();
    app.on_engine(reply("readyok")).await.unwrap();
    assert!(engine.drain().is_empty(), "white to move, nothing to ask");

    app.on_line("e2e4").await.unwrap();
    let sent = engine.drain();
    assert_eq!(sent.last().map(String::as_str), Some("go depth 9"));

    app.on_line("d2d4").await.unwrap();
    assert_eq!(app.game().ply_count(), 1, "engine's turn");

    app.on_engine(reply("bestmove e7e5")).await.unwrap();
    assert_eq!(app.game().history(), vec!["e4", "e5"]);

    let out = output(app);
    assert!(out.contains("Wait for the engine to move."), "{out}");
    assert!(out.contains("Engine plays e5."), "{out}");
}

#[tokio::test]
async fn test_move_before_handshake_is_answered_after_it() {
    let (mut app, mut engine) = ai_app().await;
    app.on_line("e2e4").await.unwrap();
    assert!(engine.drain().is_empty());

    app.on_engine(reply("readyok")).await.unwrap();
    let sent = engine.drain();
    assert_eq!(sent.len(), 3, "{sent:?}");
    assert!(sent[1].starts_with("position fen "));
}

#[tokio::test]
async fn test_engine_without_move() {
    let (mut app, mut engine) = ai_app().await;
    app.on_engine(reply("readyok")).await.unwrap();
    app.on_line("e2e4").await.unwrap();
    app.on_engine(reply("bestmove (none)")).await.unwrap();
    assert_eq!(app.game().ply_count(), 1);
    assert_eq!(app.engine().map(|e| e.state()), Some(EngineState::Idle));

    // Black's move is now the human's
    app.on_line("e7e5").await.unwrap();
    assert_eq!(app.game().history(), vec!["e4", "e5"]);
    engine.drain();

    // and the engine is asked again after White's next move
    app.on_line("g1f3").await.unwrap();
    assert_eq!(engine.drain().last().map(String::as_str), Some("go depth 9"));

    let out = output(app);
    assert!(out.contains("Engine found no move. Your move."), "{out}");
    assert!(!out.contains("Wait for the engine to move."), "{out}");
}

#[tokio::test]
async fn test_illegal_engine_move_hands_over_the_turn() {
    let (mut app, _engine) = ai_app().await;
    app.on_engine(reply("readyok")).await.unwrap();
    app.on_line("e2e4").await.unwrap();
    app.on_engine(reply("bestmove e2e5")).await.unwrap();
    assert_eq!(app.game().ply_count(), 1);

    app.on_line("e7e5").await.unwrap();
    assert_eq!(app.game().ply_count(), 2);
    // Only one move for the engine's side
    app.on_line("d2d4").await.unwrap();
    app.on_line("d7d5").await.unwrap();
    assert_eq!(app.game().ply_count(), 3);

    let out = output(app);
    assert!(out.contains("Engine sent an illegal move (e2e5). Your move."), "{out}");
    assert!(out.contains("Wait for the engine to move."), "{out}");
}

#[tokio::test]
async fn test_engine_timeout_hands_over_the_turn() {
    let (mut app, _engine) = ai_app().await;
    app.on_engine(reply("readyok")).await.unwrap();
    app.on_line("e2e4").await.unwrap();
    app.on_engine(Inbound::TimedOut).await.unwrap();
    assert_eq!(app.engine().map(|e| e.state()), Some(EngineState::Idle));

    app.on_line("c7c5").await.unwrap();
    assert_eq!(app.game().history(), vec!["e4", "c5"]);
    assert!(output(app).contains("Engine did not answer in time. Your move."));
}

#[tokio::test]
async fn test_new_game_discards_pending_reply() {
    let (mut app, mut engine) = ai_app().await;
    app.on_engine(reply("readyok")).await.unwrap();
    app.on_line("e2e4").await.unwrap();
    app.on_line("new").await.unwrap();
    assert_eq!(&engine.drain()[3..], ["stop", "ucinewgame"]);

    app.on_engine(reply("bestmove e7e5")).await.unwrap();
    assert_eq!(app.game().ply_count(), 0);
}

#[tokio::test]
async fn test_engine_exit() {
    let (mut app, _engine) = ai_app().await;
    app.on_engine(Inbound::Closed).await.unwrap();
    assert!(app.engine().is_none());
    app.on_line("e2e4").await.unwrap();
    app.on_line("e7e5").await.unwrap();
    assert_eq!(app.game().ply_count(), 2);
}

#[tokio::test]
async fn test_flag_fall_decides_on_points() {
    let mut app: TestApp = App::new(&config(1), None, Vec::new());
    for _ in 0..60 {
        app.on_tick().unwrap();
    }
    assert_eq!(app.clock().map(|c| c.remaining(Color::White)), Some(0));
    app.on_line("e2e4").await.unwrap();
    assert_eq!(app.game().ply_count(), 0);

    let out = output(app);
    assert!(out.contains("White is out of time. Draw by equal points!"), "{out}");
}

#[tokio::test]
async fn test_clock_follows_turn() {
    let mut app: TestApp = App::new(&config(5), None, Vec::new());
    app.on_tick().unwrap();
    app.on_line("e2e4").await.unwrap();
    app.on_tick().unwrap();
    app.on_tick().unwrap();
    let clock = app.clock().unwrap();
    assert_eq!(clock.remaining(Color::White), 299);
    assert_eq!(clock.remaining(Color::Black), 298);
}

#[tokio::test]
async fn test_save_and_load_pgn() {
    let path = std::env::temp_dir().join(format!("chess_cli_test_{}.pgn", std::process::id()));
    let path_text = path.display().to_string();

    let mut app: TestApp = App::new(&config(0), None, Vec::new());
    for line in ["e2e4", "c7c5", "g1f3"] {
        app.on_line(line).await.unwrap();
    }
    app.on_line(&format!("save {path_text}")).await.unwrap();

    let mut other: TestApp = App::new(&config(0), None, Vec::new());
    other.on_line(&format!("load {path_text}")).await.unwrap();
    assert_eq!(other.game().history(), vec!["e4", "c5", "Nf3"]);
    assert_eq!(other.game().fen(), app.game().fen());

    std::fs::write(&path, "1. e4 Ke7?? 2. Qxe7").unwrap();
    other.on_line(&format!("load {path_text}")).await.unwrap();
    assert_eq!(other.game().ply_count(), 3, "failed load keeps the game");
    assert!(output(other).contains("Cannot load"));

    let _ = std::fs::remove_file(&path);
}
