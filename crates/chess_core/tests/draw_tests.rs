//! Tests for game-end detection through the public `Game` API
//!
//! This module tests all draw conditions plus the checkmate/check split:
//! - Stalemate
//! - Fifty-move rule
//! - Threefold repetition
//! - Insufficient material

use chess_core::{coord_to_sq, status_text, DrawReason, Game, Move, Outcome};

fn game(fen: &str) -> Game {
    Game::from_fen(fen).expect("valid FEN")
}

// =============================================================================
// Stalemate Tests
// =============================================================================

#[test]
fn test_stalemate_king_and_pawn_endgame() {
    // White king on g6, white pawn on g7, black king on g8
    let g = game("6k1/6P1/6K1/8/8/8/8/8 b - - 0 1");

    assert!(g.legal_moves().is_empty());
    assert!(!g.in_check(), "Stalemate means king is not in check");
    assert_eq!(g.outcome(), Some(Outcome::Draw(DrawReason::Stalemate)));
    assert_eq!(status_text(&g), "It's a draw!");
}

// =============================================================================
// Fifty-Move Rule Tests
// =============================================================================

#[test]
fn test_fifty_move_rule_at_100_halfmoves() {
    let g = game("8/8/8/4k3/8/4K3/4P3/8 w - - 100 60");
    assert!(g.is_fifty_move_draw());
    assert_eq!(g.outcome(), Some(Outcome::Draw(DrawReason::FiftyMoveRule)));
}

#[test]
fn test_fifty_move_rule_reset_on_pawn_move() {
    let mut g = game("8/8/8/4k3/8/3K4/4P3/8 w - - 99 60");
    assert!(!g.is_fifty_move_draw());

    let e2 = coord_to_sq("e2").unwrap();
    let e3 = coord_to_sq("e3").unwrap();
    g.make_move(Move::new(e2, e3)).unwrap();

    assert!(!g.is_fifty_move_draw(), "Pawn move should reset halfmove clock");
    assert_eq!(g.board().halfmove_clock(), 0);
}

// =============================================================================
// Insufficient Material Tests
// =============================================================================

#[test]
fn test_insufficient_material_minor_pieces() {
    for fen in [
        "8/8/8/4k3/8/4K3/8/8 w - - 0 1",
        "8/8/8/4k3/8/4KB2/8/8 w - - 0 1",
        "8/8/8/4k3/8/4K3/8/6N1 w - - 0 1",
        "8/8/4b3/4k3/8/4K3/8/8 w - - 0 1",
        // Bishops on f8 and c1 share a square color
        "5b2/8/8/4k3/8/4K3/8/2B5 w - - 0 1",
    ] {
        assert!(game(fen).is_insufficient_material(), "{fen}");
        assert!(game(fen).in_draw(), "{fen}");
    }
}

#[test]
fn test_sufficient_material() {
    for fen in [
        // Opposite colored bishops
        "2b5/8/8/4k3/8/4K3/8/2B5 w - - 0 1",
        "8/8/8/4k3/8/4K3/4P3/8 w - - 0 1",
        "8/8/8/4k3/8/4K3/8/4R3 w - - 0 1",
        "8/8/8/4k3/8/4K3/8/4Q3 w - - 0 1",
        "8/8/8/4k3/8/4K3/3NN3/8 w - - 0 1",
    ] {
        assert!(!game(fen).is_insufficient_material(), "{fen}");
    }
}

// =============================================================================
// Integration Tests - Not Checkmate Scenarios
// =============================================================================

#[test]
fn test_checkmate_is_not_stalemate() {
    // Scholar's mate
    let g = game("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4");

    assert!(g.legal_moves().is_empty());
    assert!(g.in_checkmate());
    assert!(!g.in_stalemate());
    assert_eq!(status_text(&g), "White wins by checkmate!");
}

#[test]
fn test_check_is_not_checkmate() {
    let g = game("rnbqkbnr/ppppp1pp/8/5p1Q/4P3/8/PPPP1PPP/RNB1KBNR b KQkq - 1 2");

    assert!(!g.legal_moves().is_empty());
    assert!(g.in_check());
    assert!(!g.in_checkmate());
    assert_eq!(status_text(&g), "Black to move");
}
