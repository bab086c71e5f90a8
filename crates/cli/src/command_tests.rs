use super::*;
use chess_core::PieceKind;

fn parse(line: &str) -> Command {
    Command::parse(line).unwrap().unwrap()
}

#[test]
fn test_blank_line() {
    assert_eq!(Command::parse("   ").unwrap(), None);
}

#[test]
fn test_moves() {
    let Command::Move(mv) = parse("e7e8n") else {
        panic!("expected a move");
    };
    assert_eq!(mv.from, coord_to_sq("e7").unwrap());
    assert_eq!(mv.promotion, Some(PieceKind::Knight));
    assert_eq!(parse("moves g1"), Command::Moves(coord_to_sq("g1").unwrap()));
}

#[test]
fn test_keywords() {
    assert_eq!(parse("NEW"), Command::New);
    assert_eq!(parse("fen"), Command::Fen);
    assert_eq!(parse("exit"), Command::Quit);
    assert_eq!(parse("save games/my game.pgn"), Command::Save("games/my game.pgn".into()));
}

#[test]
fn test_errors() {
    assert!(Command::parse("load").is_err());
    assert!(Command::parse("moves").is_err());
    assert!(Command::parse("moves z9").is_err());
    assert!(Command::parse("castle").is_err());
}
