use super::*;
use chess_core::parse_uci_move;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

#[test]
fn test_level_is_clamped() {
    assert_eq!(Mover::new(99).level(), MAX_LEVEL);
    let mut mover = Mover::new(3);
    mover.set_level(42);
    assert_eq!(mover.level(), MAX_LEVEL);
}

#[test]
fn test_no_move_when_mated() {
    let game =
        Game::from_fen("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4").unwrap();
    assert_eq!(Mover::default().choose(&game, &mut rng()), None);
}

#[test]
fn test_greedy_takes_free_queen() {
    // White rook on a1 can take an undefended queen on a8
    let game = Game::from_fen("q6k/8/8/8/8/8/8/R6K w - - 0 1").unwrap();
    let mv = Mover::default().choose(&game, &mut rng()).unwrap();
    assert_eq!(mv, parse_uci_move("a1a8").unwrap());
}

#[test]
fn test_greedy_prefers_mate() {
    // Back-rank mate with Ra8 beats winning the bishop on d1
    let game = Game::from_fen("6k1/5ppp/8/8/8/8/8/R2b2K1 w - - 0 1").unwrap();
    let mv = Mover::default().choose(&game, &mut rng()).unwrap();
    assert_eq!(mv, parse_uci_move("a1a8").unwrap());
}

#[test]
fn test_random_level_plays_legal_moves() {
    let game = Game::new();
    let legal = game.legal_moves();
    let mover = Mover::new(0);
    let mut rng = rng();
    for _ in 0..50 {
        let mv = mover.choose(&game, &mut rng).unwrap();
        assert!(legal.contains(&mv));
    }
}
