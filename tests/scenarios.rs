//! Literal end-to-end scenarios from the test plan: a forced mate, a
//! single-reply position, stalemate, and checkmate detection.

use corvid::eval::MaterialPstEvaluator;
use corvid::movegen::{generate_legal_moves, GenMode};
use corvid::position::Position;
use corvid::search::control::SearchControl;
use corvid::search::{iterative_deepening, SearchLimits, SearchState};
use corvid::types::CHECKMATE;

fn search_to_depth(fen: &str, depth: i32) -> corvid::search::SearchResult {
    let pos = Position::from_fen(fen).unwrap();
    let mut state = SearchState::new(4);
    let mut eval = MaterialPstEvaluator::new();
    let control = SearchControl::new();
    control.reset(std::time::Instant::now(), 0);
    let limits = SearchLimits { depth: Some(depth), ..SearchLimits::default() };
    iterative_deepening(&mut state, &pos, &mut eval, &control, &limits, |_, _| {})
}

#[test]
fn mate_in_one_is_found_with_maximal_score() {
    let result = search_to_depth("8/8/8/8/8/6K1/R7/6k1 w - - 0 8", 3);
    assert_eq!(result.best_move.to_string(), "a2a1");
    assert_eq!(result.score, CHECKMATE - 1);
    assert!(result.mate_found);
}

#[test]
fn position_with_exactly_one_legal_move() {
    let fen = "rnbq1bnr/ppp1pppp/4k3/3pP3/3P2Q1/8/PPP2PPP/RNB1KBNR b KQ - 2 4";
    let pos = Position::from_fen(fen).unwrap();
    let legal = generate_legal_moves(&pos, GenMode::All);
    assert_eq!(legal.len(), 1);
    assert_eq!(legal.iter().next().unwrap().to_string(), "f7f5");
}

#[test]
fn stalemate_has_no_legal_moves_and_no_check() {
    let pos = Position::from_fen("7k/5K2/6Q1/8/8/8/8/8 b - - 0 1").unwrap();
    assert_eq!(generate_legal_moves(&pos, GenMode::All).len(), 0);
    assert!(!pos.has_check());
}

#[test]
fn checkmate_has_no_legal_moves_and_is_check() {
    let pos = Position::from_fen("rn2kbnr/pbpp1ppp/8/1p2p1q1/4K3/3P4/PPP1PPPP/RNBQ1BNR w kq - 0 1").unwrap();
    assert_eq!(generate_legal_moves(&pos, GenMode::All).len(), 0);
    assert!(pos.has_check());
}

#[test]
fn startpos_depth_5_completes_and_returns_legal_first_move() {
    let pos = Position::startpos();
    let result = search_to_depth("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 5);
    assert!(result.depth >= 5);
    let legal = generate_legal_moves(&pos, GenMode::All);
    assert!(legal.iter().any(|m| *m == result.best_move), "bestmove {} not in legal move list", result.best_move);
}
