//! End-to-end behaviour of rules and search together.

use chess_engine::{find_move, movegen, GameStatus, Position};
use chess_search::{evaluate, spawn_search, SearchConfig, Searcher, CHECKMATE, INFINITY};
use proptest::prelude::*;

fn play(position: &mut Position, moves: &[&str]) {
    for text in moves {
        let mv = find_move(position, text).unwrap();
        position.make_move(mv).unwrap();
    }
}

#[test]
fn start_position_has_twenty_moves() {
    let mut position = Position::startpos();
    assert_eq!(position.legal_moves().len(), 20);
    assert_eq!(position.status(), GameStatus::Ongoing);
}

#[test]
fn fools_mate_is_detected() {
    let mut position = Position::startpos();
    play(&mut position, &["f2f3", "e7e5", "g2g4", "d8h4"]);
    assert!(position.legal_moves().is_empty());
    assert!(position.is_checkmate());
    assert!(!position.is_stalemate());
}

#[test]
fn lone_bishop_is_a_draw() {
    let mut position = Position::parse("8/8/8/4k3/8/8/8/2B1K3 w - - 0 1").unwrap();
    assert!(!movegen::legal_moves(&position).is_empty());
    assert!(position.legal_moves().is_empty());
    assert!(position.is_stalemate());
    assert!(!position.is_checkmate());
}

#[test]
fn search_finds_fools_mate_at_every_depth() {
    for depth in 1..=3 {
        let mut position = Position::startpos();
        play(&mut position, &["f2f3", "e7e5", "g2g4"]);
        let moves = position.legal_moves();
        let mut searcher = Searcher::default();
        let best = searcher.find_best_move(&mut position, &moves, depth).unwrap();
        assert_eq!(best.to_uci(), "d8h4", "depth {}", depth);
    }
}

#[test]
fn mated_side_scores_as_lost() {
    let mut position = Position::startpos();
    play(&mut position, &["f2f3", "e7e5", "g2g4", "d8h4"]);
    let mut searcher = Searcher::default();
    assert_eq!(searcher.search(&mut position, 2, -INFINITY, INFINITY, true), -CHECKMATE);
}

#[test]
fn threaded_search_hands_back_a_legal_move() {
    let mut position = Position::startpos();
    play(&mut position, &["e2e4", "e7e5"]);
    let moves = position.legal_moves();

    let task = spawn_search(Searcher::default(), position.clone(), moves.clone(), 2);
    let outcome = task.wait().unwrap();
    let best = outcome.best_move.unwrap();
    assert!(moves.contains(&best));

    // The returned searcher keeps its tables for the next move.
    let mut searcher = outcome.searcher;
    assert!(!searcher.tt().is_empty());
    position.make_move(best).unwrap();
    assert!(searcher.best_move(&mut position).is_some());
}

#[test]
fn suggestion_uses_suggest_depth() {
    let config = SearchConfig {
        depth: 3,
        suggest_depth: 1,
        ..SearchConfig::default()
    };
    let mut position = Position::parse("4k3/pppp4/8/8/8/8/3q1PPP/4K3 w - - 0 1").unwrap();
    let mut searcher = Searcher::new(config);
    let suggestion = searcher.suggest_move(&mut position).unwrap();
    assert_eq!(suggestion.to_uci(), "e1d2");
    let shallow_nodes = searcher.nodes();

    searcher.clear();
    assert_eq!(searcher.best_move(&mut position).unwrap().to_uci(), "e1d2");
    assert!(searcher.nodes() > shallow_nodes);
}

proptest! {
    #[test]
    fn evaluation_is_pure(choices in prop::collection::vec(any::<usize>(), 0..30)) {
        let mut position = Position::startpos();
        for choice in choices {
            let moves = movegen::legal_moves(&position);
            if moves.is_empty() {
                break;
            }
            position.make_move(moves[choice % moves.len()]).unwrap();
        }
        let before = position.clone();
        let first = evaluate(&position);
        prop_assert_eq!(first, evaluate(&position));
        prop_assert_eq!(&position, &before);
    }
}
