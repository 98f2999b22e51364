//! Depth-limited minimax search.
//!
//! Scores are always from White's point of view: White maximizes, Black
//! minimizes. The recursion is alpha-beta with principal variation search,
//! a transposition table with bound flags, null-move pruning, and killer and
//! history move ordering. There is no quiescence search.

use chess_core::{Color, Move};
use chess_engine::{GameStatus, Position};
use rand::seq::SliceRandom;

use crate::config::SearchConfig;
use crate::eval::{evaluate, CHECKMATE};
use crate::ordering::{order_moves, HistoryTable, KillerTable};
use crate::tt::{Bound, TranspositionTable};

/// Larger than any reachable score.
pub const INFINITY: i32 = 1_000_000;

/// Search context: configuration plus the tables that persist across moves.
#[derive(Debug, Clone)]
pub struct Searcher {
    config: SearchConfig,
    tt: TranspositionTable,
    killers: KillerTable,
    history: HistoryTable,
    nodes: u64,
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Self {
        Searcher {
            tt: TranspositionTable::new(config.tt_capacity),
            killers: KillerTable::default(),
            history: HistoryTable::default(),
            nodes: 0,
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Nodes visited by the most recent root search.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Forgets everything learned in previous searches.
    pub fn clear(&mut self) {
        self.tt.clear();
        self.killers.clear();
        self.history.clear();
    }

    /// Best move for the side to move at the configured depth.
    pub fn best_move(&mut self, position: &mut Position) -> Option<Move> {
        let moves = position.legal_moves();
        self.find_best_move(position, &moves, self.config.depth)
    }

    /// Cheaper search at the configured suggestion depth.
    pub fn suggest_move(&mut self, position: &mut Position) -> Option<Move> {
        let moves = position.legal_moves();
        self.find_best_move(position, &moves, self.config.suggest_depth)
    }

    /// Chooses one of `moves` (the legal moves of `position`) by searching
    /// `depth` plies. Returns `None` only when `moves` is empty.
    ///
    /// `position` is mutated during the search and restored before return.
    pub fn find_best_move(&mut self, position: &mut Position, moves: &[Move], depth: u32) -> Option<Move> {
        if moves.is_empty() {
            return None;
        }
        self.nodes = 0;

        if let Some(mate) = self.mate_in_one(position, moves) {
            tracing::debug!(%mate, "mate in one");
            return Some(mate);
        }

        let depth = self.adjusted_depth(position, depth.max(1));
        let white = position.side_to_move() == Color::White;
        let mut moves = moves.to_vec();

        let mut pv_move = None;
        for shallow in 1..depth {
            let (best, score) = self.search_root(position, &moves, shallow, white);
            tracing::debug!(depth = shallow, best = ?best, score, nodes = self.nodes, "iteration complete");
            pv_move = best;
        }

        let mut tail_start = 0;
        if let Some(pv) = pv_move {
            if let Some(idx) = moves.iter().position(|&mv| mv == pv) {
                moves[..=idx].rotate_right(1);
                tail_start = 1;
            }
        }
        order_moves(&mut moves[tail_start..], depth, &self.killers, &self.history);

        let (best, score) = self.search_root(position, &moves, depth, white);
        let (probes, hits) = self.tt.stats();
        tracing::trace!(tt_len = self.tt.len(), probes, hits, "transposition table");

        match best {
            Some(mv) => {
                tracing::debug!(%mv, score, depth, nodes = self.nodes, "search finished");
                Some(mv)
            }
            None => {
                let fallback = moves.choose(&mut rand::thread_rng()).copied();
                tracing::warn!(fallback = ?fallback, "no root move selected, picking at random");
                fallback
            }
        }
    }

    /// A move after which the opponent is checkmated.
    fn mate_in_one(&mut self, position: &mut Position, moves: &[Move]) -> Option<Move> {
        moves.iter().copied().find(|&mv| {
            if position.make_move(mv).is_err() {
                return false;
            }
            position.legal_moves();
            let mate = position.is_checkmate();
            position.undo_move();
            mate
        })
    }

    /// Deepens a search at the configured depth when few pieces remain.
    /// Any other requested depth, such as the suggestion depth, is kept.
    fn adjusted_depth(&self, position: &Position, depth: u32) -> u32 {
        if !self.config.endgame_extension || depth != self.config.depth {
            return depth;
        }
        match position.piece_count() {
            0..=4 => depth + 4,
            5..=7 => depth + 2,
            _ => depth,
        }
    }

    /// Full-window search of every root move; keeps the first strictly best.
    fn search_root(&mut self, position: &mut Position, moves: &[Move], depth: u32, white: bool) -> (Option<Move>, i32) {
        let mut best = None;
        let mut best_score = if white { -INFINITY } else { INFINITY };

        for &mv in moves {
            if position.make_move(mv).is_err() {
                continue;
            }
            let score = self.search(position, depth - 1, -INFINITY, INFINITY, !white);
            position.undo_move();

            if (white && score > best_score) || (!white && score < best_score) {
                best_score = score;
                best = Some(mv);
            }
        }
        (best, best_score)
    }

    /// Minimax value of `position` searched `depth` plies within
    /// `(alpha, beta)`, White maximizing.
    ///
    /// `maximizing` must be true exactly when White is to move (it is flipped
    /// together with the side by null moves).
    pub fn search(&mut self, position: &mut Position, depth: u32, mut alpha: i32, mut beta: i32, maximizing: bool) -> i32 {
        self.nodes += 1;
        let hash = position.zobrist_hash();

        if let Some(entry) = self.tt.probe(hash, depth, maximizing) {
            match entry.bound {
                Bound::Exact => return entry.score,
                Bound::Lower => alpha = alpha.max(entry.score),
                Bound::Upper => beta = beta.min(entry.score),
            }
            if alpha >= beta {
                return entry.score;
            }
        }
        let (alpha_orig, beta_orig) = (alpha, beta);

        let mut moves = position.legal_moves();
        if moves.is_empty() {
            let score = match position.status() {
                GameStatus::Checkmate if maximizing => -CHECKMATE,
                GameStatus::Checkmate => CHECKMATE,
                _ => 0,
            };
            self.tt.store(hash, depth, maximizing, score, Bound::Exact);
            return score;
        }

        if let Some(score) = self.null_move(position, depth, alpha, beta, maximizing) {
            return score;
        }

        if depth == 0 {
            let score = evaluate(position);
            self.tt.store(hash, depth, maximizing, score, Bound::Exact);
            return score;
        }

        order_moves(&mut moves, depth, &self.killers, &self.history);

        let mut best = if maximizing { -INFINITY } else { INFINITY };
        for (i, &mv) in moves.iter().enumerate() {
            if position.make_move(mv).is_err() {
                continue;
            }
            let score = if i == 0 {
                self.search(position, depth - 1, alpha, beta, !maximizing)
            } else {
                let (lo, hi) = if maximizing { (alpha, alpha + 1) } else { (beta - 1, beta) };
                let scout = self.search(position, depth - 1, lo, hi, !maximizing);
                if alpha < scout && scout < beta {
                    self.search(position, depth - 1, alpha, beta, !maximizing)
                } else {
                    scout
                }
            };
            position.undo_move();

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }
            if alpha >= beta {
                if !mv.is_capture() {
                    self.killers.record(depth, mv);
                    self.history.reward(depth, mv);
                }
                break;
            }
        }

        self.tt.store(hash, depth, maximizing, best, Bound::classify(best, alpha_orig, beta_orig));
        best
    }

    /// Lets the opponent move twice in a row at reduced depth. If the side
    /// to move still reaches its bound, the node is cut off.
    fn null_move(&mut self, position: &mut Position, depth: u32, alpha: i32, beta: i32, maximizing: bool) -> Option<i32> {
        if depth <= 2
            || position.in_check()
            || position.non_king_piece_count() <= self.config.null_move_min_pieces
        {
            return None;
        }
        let reduced = depth.saturating_sub(self.config.null_move_reduction);

        position.pass_turn();
        let score = if maximizing {
            self.search(position, reduced, beta - 1, beta, false)
        } else {
            self.search(position, reduced, alpha, alpha + 1, true)
        };
        position.pass_turn();

        let cutoff = if maximizing { score >= beta } else { score <= alpha };
        cutoff.then_some(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_null_moves() -> SearchConfig {
        SearchConfig {
            null_move_min_pieces: 64,
            endgame_extension: false,
            ..SearchConfig::default()
        }
    }

    /// Plain minimax with no pruning and no table.
    fn minimax(position: &mut Position, depth: u32, maximizing: bool) -> i32 {
        let moves = position.legal_moves();
        if moves.is_empty() {
            return match position.status() {
                GameStatus::Checkmate if maximizing => -CHECKMATE,
                GameStatus::Checkmate => CHECKMATE,
                _ => 0,
            };
        }
        if depth == 0 {
            return evaluate(position);
        }
        let scores = moves.into_iter().map(|mv| {
            position.make_move(mv).unwrap();
            let score = minimax(position, depth - 1, !maximizing);
            position.undo_move();
            score
        });
        if maximizing {
            scores.max().unwrap()
        } else {
            scores.min().unwrap()
        }
    }

    #[test]
    fn search_matches_plain_minimax() {
        for fen in [
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
            "4k3/8/3q4/8/3N4/8/3Q4/4K3 b - - 0 1",
            "6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1",
        ] {
            let mut position = Position::parse(fen).unwrap();
            let before = position.clone();
            let maximizing = position.side_to_move() == Color::White;
            let expected = minimax(&mut position, 3, maximizing);

            let mut searcher = Searcher::new(no_null_moves());
            let first = searcher.search(&mut position, 3, -INFINITY, INFINITY, maximizing);
            let second = searcher.search(&mut position, 3, -INFINITY, INFINITY, maximizing);
            assert_eq!(first, expected, "{}", fen);
            assert_eq!(second, expected, "{}", fen);
            assert_eq!(position.to_fen(), before.to_fen());
        }
    }

    #[test]
    fn zero_width_windows_bound_the_true_value() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
        let mut position = Position::parse(fen).unwrap();
        let exact = minimax(&mut position, 2, true);

        let mut searcher = Searcher::new(no_null_moves());
        let below = searcher.search(&mut position, 2, exact - 51, exact - 50, true);
        assert!(below >= exact - 50);
        let above = searcher.search(&mut position, 2, exact + 50, exact + 51, true);
        assert!(above <= exact + 50);
        assert_eq!(searcher.search(&mut position, 2, -INFINITY, INFINITY, true), exact);
    }

    #[test]
    fn finds_back_rank_mate() {
        let mut position = Position::parse("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").unwrap();
        let mut searcher = Searcher::default();
        let best = searcher.best_move(&mut position).unwrap();
        assert_eq!(best.to_uci(), "a1a8");
    }

    #[test]
    fn takes_hanging_queen() {
        let mut position = Position::parse("4k3/5ppp/3q4/8/8/8/3R1PPP/4K3 w - - 0 1").unwrap();
        let mut searcher = Searcher::default();
        let moves = position.legal_moves();
        let best = searcher.find_best_move(&mut position, &moves, 2).unwrap();
        assert_eq!(best.to_uci(), "d2d6");
    }

    #[test]
    fn empty_move_list_gives_none() {
        let mut position = Position::startpos();
        let mut searcher = Searcher::default();
        assert_eq!(searcher.find_best_move(&mut position, &[], 3), None);
    }

    #[test]
    fn endgame_extension_depths() {
        let searcher = Searcher::default();
        let four = Position::parse("4k3/8/8/8/8/8/3PP3/4K3 w - - 0 1").unwrap();
        let seven = Position::parse("4k3/3pp3/8/8/8/8/3PP3/4K3 w - - 0 1").unwrap();
        assert_eq!(searcher.adjusted_depth(&four, 4), 8);
        assert_eq!(searcher.adjusted_depth(&seven, 4), 6);
        assert_eq!(searcher.adjusted_depth(&Position::startpos(), 4), 4);
        // Only the configured depth is extended.
        assert_eq!(searcher.adjusted_depth(&four, 2), 2);
        assert_eq!(searcher.adjusted_depth(&seven, 3), 3);
        let plain = Searcher::new(no_null_moves());
        assert_eq!(plain.adjusted_depth(&four, 4), 4);
    }

    #[test]
    fn extension_follows_configured_depth() {
        let searcher = Searcher::new(SearchConfig { depth: 3, ..SearchConfig::default() });
        let four = Position::parse("4k3/8/8/8/8/8/3PP3/4K3 w - - 0 1").unwrap();
        assert_eq!(searcher.adjusted_depth(&four, 3), 7);
        assert_eq!(searcher.adjusted_depth(&four, 4), 4);
    }

    #[test]
    fn suggestion_is_not_extended_in_endings() {
        let fen = "8/8/4k3/8/8/3K4/3R4/8 w - - 0 1";
        let mut position = Position::parse(fen).unwrap();
        let before = position.to_fen();
        let mut extended = Searcher::default();
        let suggestion = extended.suggest_move(&mut position);
        assert!(suggestion.is_some());
        assert_eq!(position.to_fen(), before);

        let mut plain = Searcher::new(SearchConfig { endgame_extension: false, ..SearchConfig::default() });
        assert_eq!(plain.suggest_move(&mut position), suggestion);
        assert_eq!(extended.nodes(), plain.nodes());
    }

    #[test]
    fn search_restores_position() {
        let mut position = Position::parse("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
        let before = position.to_fen();
        let mut searcher = Searcher::default();
        let moves = position.legal_moves();
        let best = searcher.find_best_move(&mut position, &moves, 3);
        assert!(best.is_some_and(|mv| moves.contains(&mv)));
        assert_eq!(position.to_fen(), before);
    }

    // White is a queen and a rook ahead with eleven non-king pieces on the board.
    const WHITE_AHEAD: &str = "r3k3/pppp4/8/8/8/8/PPPP4/RQ2K3 w - - 0 1";

    #[test]
    fn null_move_needs_more_than_two_plies() {
        let mut position = Position::parse(WHITE_AHEAD).unwrap();
        let mut searcher = Searcher::default();
        assert_eq!(searcher.null_move(&mut position, 2, -INFINITY, 0, true), None);
        assert_eq!(searcher.nodes(), 0);

        let score = searcher.null_move(&mut position, 3, -INFINITY, 0, true);
        assert!(score.is_some_and(|score| score >= 0));
        assert!(searcher.nodes() > 0);
        assert_eq!(position.to_fen(), WHITE_AHEAD);
        assert_eq!(position.side_to_move(), Color::White);
    }

    #[test]
    fn null_move_cuts_for_the_minimizer() {
        let fen = "rq2k3/pppp4/8/8/8/8/PPPP4/R3K3 b - - 0 1";
        let mut position = Position::parse(fen).unwrap();
        let mut searcher = Searcher::default();
        let score = searcher.null_move(&mut position, 3, 0, INFINITY, false);
        assert!(score.is_some_and(|score| score <= 0));
        assert_eq!(position.to_fen(), fen);
    }

    #[test]
    fn null_move_fails_when_the_bound_is_out_of_reach() {
        let mut position = Position::parse(WHITE_AHEAD).unwrap();
        let mut searcher = Searcher::default();
        assert_eq!(searcher.null_move(&mut position, 3, -INFINITY, CHECKMATE, true), None);
        assert!(searcher.nodes() > 0);
    }

    #[test]
    fn null_move_skipped_in_check() {
        // Eight non-king pieces, White in check from the queen on d2.
        let mut position = Position::parse("4k3/pppp4/8/8/8/8/3q1PPP/4K3 w - - 0 1").unwrap();
        let mut searcher = Searcher::default();
        assert_eq!(searcher.null_move(&mut position, 5, -INFINITY, -CHECKMATE, true), None);
        assert_eq!(searcher.nodes(), 0);

        // Every child sits at depth 2, so pruning changes nothing at depth 3.
        let mut pruning = Searcher::default();
        let mut plain = Searcher::new(no_null_moves());
        let with = pruning.search(&mut position, 3, -INFINITY, INFINITY, true);
        let without = plain.search(&mut position, 3, -INFINITY, INFINITY, true);
        assert_eq!(with, without);
        assert_eq!(pruning.nodes(), plain.nodes());
    }

    #[test]
    fn null_move_skipped_with_few_pieces() {
        // Six non-king pieces: not more than the default threshold.
        let fen = "4k3/8/8/8/8/8/PPPP4/RQ2K3 w - - 0 1";
        let mut position = Position::parse(fen).unwrap();
        let mut searcher = Searcher::default();
        assert_eq!(searcher.null_move(&mut position, 3, -INFINITY, 0, true), None);
        assert_eq!(searcher.nodes(), 0);

        let mut lower = Searcher::new(SearchConfig {
            null_move_min_pieces: 5,
            ..SearchConfig::default()
        });
        assert!(lower.null_move(&mut position, 3, -INFINITY, 0, true).is_some());
    }

    #[test]
    fn null_move_cutoff_skips_real_moves() {
        let mut position = Position::parse(WHITE_AHEAD).unwrap();

        let mut null_only = Searcher::default();
        let null_score = null_only.null_move(&mut position, 3, -INFINITY, 0, true).unwrap();

        let mut pruning = Searcher::default();
        let score = pruning.search(&mut position, 3, -INFINITY, 0, true);
        assert_eq!(score, null_score);
        assert_eq!(pruning.nodes(), null_only.nodes() + 1);
        assert_eq!(pruning.killers.get(3), [None, None]);

        let mut plain = Searcher::new(no_null_moves());
        plain.search(&mut position, 3, -INFINITY, 0, true);
        assert!(plain.nodes() > pruning.nodes());
        assert_eq!(position.to_fen(), WHITE_AHEAD);
    }

    #[test]
    fn quiet_cutoff_records_killer_and_history() {
        // No captures available, so the first move tried is quiet and fails high.
        let mut position = Position::parse("4k3/8/8/8/8/8/3R4/4K3 w - - 0 1").unwrap();
        let mut searcher = Searcher::default();
        let score = searcher.search(&mut position, 1, -INFINITY, 0, true);
        assert!(score >= 0);

        let [first, second] = searcher.killers.get(1);
        let killer = first.unwrap();
        assert!(!killer.is_capture());
        assert_eq!(second, None);
        assert_eq!(searcher.history.get(1, killer), 2);
    }

    #[test]
    fn capture_cutoff_records_nothing() {
        let mut position = Position::parse("4k3/8/3q4/8/8/8/3R4/4K3 w - - 0 1").unwrap();
        let takes_queen = position
            .legal_moves()
            .into_iter()
            .find(|mv| mv.to_uci() == "d2d6")
            .unwrap();
        assert!(takes_queen.is_capture());

        let mut searcher = Searcher::default();
        let score = searcher.search(&mut position, 1, -INFINITY, 0, true);
        assert!(score >= 0);
        assert_eq!(searcher.killers.get(1), [None, None]);
        assert_eq!(searcher.history.get(1, takes_queen), 0);
    }
}
