use super::*;
use serde_json::json;

fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

/// Fresh directory under the system temp dir, removed on drop.
struct TempRoot(PathBuf);

impl TempRoot {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("room_sync_{}", Uuid::new_v4().simple()));
        Self(dir)
    }

    fn store(&self) -> FileStore {
        FileStore::new(&self.0).with_poll_interval(Duration::from_millis(10))
    }
}

impl Drop for TempRoot {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

#[tokio::test]
async fn test_documents_are_shared_through_the_directory() {
    let root = TempRoot::new();
    let (one, two) = (root.store(), root.store());

    let id = one.create("games", doc(json!({ "fen": "a", "turn": "w" }))).await.unwrap();
    assert!(root.0.join("games").join(format!("{id}.json")).is_file());

    two.set("games", &id, doc(json!({ "turn": "b" })), SetOptions::merge())
        .await
        .unwrap();
    let fetched = one.get("games", &id).await.unwrap().unwrap();
    assert_eq!(fetched, doc(json!({ "fen": "a", "turn": "b" })));

    two.set("games", &id, doc(json!({ "turn": "w" })), SetOptions::replace())
        .await
        .unwrap();
    assert_eq!(
        one.get("games", &id).await.unwrap().unwrap(),
        doc(json!({ "turn": "w" }))
    );
}

#[tokio::test]
async fn test_unknown_and_unsafe_ids() {
    let root = TempRoot::new();
    let store = root.store();
    assert_eq!(store.get("games", "nope").await.unwrap(), None);
    assert_eq!(store.get("games", "../escape").await.unwrap(), None);

    let err = store
        .set("games", "../escape", Document::new(), SetOptions::merge())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Missing { .. }), "{err}");
}

#[tokio::test]
async fn test_merge_into_missing_document_creates_it() {
    let root = TempRoot::new();
    let store = root.store();
    store
        .set("games", "fresh", doc(json!({ "fen": "x" })), SetOptions::merge())
        .await
        .unwrap();
    assert_eq!(
        store.get("games", "fresh").await.unwrap(),
        Some(doc(json!({ "fen": "x" })))
    );
}

#[tokio::test]
async fn test_subscription_sees_writes_from_another_store() {
    let root = TempRoot::new();
    let (one, two) = (root.store(), root.store());
    let id = one.create("games", doc(json!({ "version": 0 }))).await.unwrap();

    let mut sub = one.subscribe("games", &id).await.unwrap();
    assert_eq!(sub.next().await, Some(doc(json!({ "version": 0 }))));

    two.set("games", &id, doc(json!({ "version": 1 })), SetOptions::merge())
        .await
        .unwrap();
    let next = tokio::time::timeout(Duration::from_secs(2), sub.next())
        .await
        .expect("snapshot within the timeout");
    assert_eq!(next, Some(doc(json!({ "version": 1 }))));
}

#[tokio::test]
async fn test_unreadable_file_is_an_io_error() {
    let root = TempRoot::new();
    let store = root.store();
    let dir = root.0.join("games");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("broken.json"), "[1, 2").unwrap();

    let err = store.get("games", "broken").await.unwrap_err();
    assert!(matches!(err, StoreError::Io(_)), "{err}");
}

#[tokio::test]
async fn test_two_sessions_play_through_files() {
    use crate::session::SyncSession;
    use chess_core::{parse_uci_move, Game};

    let root = TempRoot::new();
    let mut white = SyncSession::new(root.store(), "alice");
    let mut black = SyncSession::new(root.store(), "bob");
    let (mut white_game, mut black_game) = (Game::new(), Game::new());

    let id = white.open_or_create(None, &mut white_game).await.unwrap();
    black.open_or_create(Some(&id), &mut black_game).await.unwrap();
    black.subscribe().await.unwrap();
    black.next_snapshot(&mut black_game).await.unwrap().unwrap();

    let mv = parse_uci_move("e2e4").unwrap();
    white.submit_move(mv, &mut white_game).await.unwrap();
    tokio::time::timeout(Duration::from_secs(2), black.next_snapshot(&mut black_game))
        .await
        .expect("snapshot within the timeout")
        .unwrap()
        .unwrap();
    assert_eq!(black_game.history(), vec!["e4"]);
    assert_eq!(black.status(&black_game).as_deref(), Some("Your move"));
}
