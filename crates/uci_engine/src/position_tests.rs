use super::*;

fn words(s: &str) -> Vec<&str> {
    s.split_whitespace().collect()
}

#[test]
fn test_startpos() {
    let game = parse_position(&words("startpos")).unwrap();
    assert_eq!(game.fen(), chess_core::START_FEN);
}

#[test]
fn test_startpos_with_moves() {
    let game = parse_position(&words("startpos moves e2e4 e7e5 g1f3")).unwrap();
    assert_eq!(game.history(), vec!["e4", "e5", "Nf3"]);
}

#[test]
fn test_fen_with_castling_move() {
    let game = parse_position(&words(
        "fen r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1 moves e1g1",
    ))
    .unwrap();
    assert_eq!(game.history(), vec!["O-O"]);
}

#[test]
fn test_rejects_garbage() {
    assert!(parse_position(&words("")).is_err());
    assert!(parse_position(&words("fen")).is_err());
    assert!(parse_position(&words("fen not/a/fen w - - 0 1")).is_err());
    assert!(parse_position(&words("startpos moves e2e5")).is_err());
}
