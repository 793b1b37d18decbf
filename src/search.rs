use std::env;
use std::time::Duration;

use chess::{Board, BoardStatus, ChessMove, MoveGen};
use log::debug;

use crate::eval::evaluate;
use crate::ordering::{noisy_moves, ordered_moves};
use crate::time::SearchClock;
use crate::tt::{from_tt, to_tt, Bound, TranspositionTable};
use crate::types::*;

/// Search state for one engine session: the transposition table survives
/// across `go` commands, the clock and time flag live for a single one.
pub struct Search {
    pub nodes: u64,
    pub tt: TranspositionTable,
    clock: Option<SearchClock>,
    time_up: bool,
}

impl Search {
    pub fn new() -> Self {
        let tt_mb = env::var("TT_MB")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(128);
        Self {
            nodes: 0,
            tt: TranspositionTable::new_from_mb(tt_mb),
            clock: None,
            time_up: false,
        }
    }

    /// Forget cached results (ucinewgame).
    pub fn reset(&mut self) {
        self.tt.clear();
    }

    #[inline]
    fn out_of_time(&self) -> bool {
        self.clock.as_ref().map_or(false, SearchClock::expired)
    }

    /// Pick a move for the side to move within the wall-clock budget, by
    /// iterative deepening with the previous iteration's choice searched
    /// first. An iteration the deadline interrupts is discarded wholesale.
    pub fn find_best_move(&mut self, board: &Board, budget: Duration) -> Option<ChessMove> {
        let root_moves: Vec<ChessMove> = MoveGen::new_legal(board).collect();
        if root_moves.is_empty() {
            return None;
        }
        if root_moves.len() == 1 {
            return Some(root_moves[0]);
        }

        self.clock = Some(SearchClock::start(budget));
        self.time_up = false;
        self.tt.new_search();

        let mut best_move = root_moves[0];

        for depth in 1..=MAX_ITER_DEPTH {
            if self.time_up || self.out_of_time() {
                break;
            }

            let mut best_score = -INF;
            let mut iteration_best = None;

            let previous = best_move;
            for m in std::iter::once(previous)
                .chain(root_moves.iter().copied().filter(|&m| m != previous))
            {
                let child = board.make_move_new(m);
                let score = -self.negamax(&child, depth - 1, 1, -INF, INF);
                if self.time_up {
                    break;
                }
                if score > best_score {
                    best_score = score;
                    iteration_best = Some(m);
                }
            }

            if self.time_up {
                // A half-searched depth proves nothing; keep the move from
                // the last iteration that ran to completion.
                break;
            }

            if let Some(m) = iteration_best {
                best_move = m;
            }
            debug!(
                "depth {depth}: best {best_move} score {best_score} nodes {}",
                self.nodes
            );

            if best_score.abs() > MATE_THRESHOLD {
                break;
            }
        }

        self.clock = None;
        Some(best_move)
    }

    /// Fail-hard negamax. Mate scores are `-(MATE - ply)` so nearer mates
    /// win; the best move at each node is recorded through the TT.
    fn negamax(&mut self, b: &Board, depth: i32, ply: i32, mut alpha: i32, beta: i32) -> i32 {
        if self.out_of_time() {
            self.time_up = true;
            return evaluate(b);
        }
        self.nodes += 1;

        let key = board_key(b);

        let mut hint = None;
        if let Some(entry) = self.tt.probe(key) {
            if i32::from(entry.depth) >= depth {
                let score = from_tt(entry.score, ply);
                match entry.bound {
                    Bound::Exact => return score,
                    Bound::Lower if score >= beta => return beta,
                    Bound::Upper if score <= alpha => return alpha,
                    _ => {}
                }
            }
            hint = entry.best_move();
        }

        match b.status() {
            BoardStatus::Checkmate => return -(MATE - ply),
            BoardStatus::Stalemate => return 0,
            BoardStatus::Ongoing => {}
        }

        if depth == 0 {
            return self.quiesce(b, alpha, beta);
        }

        let moves = ordered_moves(b, hint);
        let entry_alpha = alpha;
        let mut best_move = moves[0];

        for &m in &moves {
            let child = b.make_move_new(m);
            let score = -self.negamax(&child, depth - 1, ply + 1, -beta, -alpha);
            if self.time_up {
                return alpha;
            }
            if score >= beta {
                self.tt
                    .store(key, depth, to_tt(beta, ply), Bound::Lower, Some(m));
                return beta;
            }
            if score > alpha {
                alpha = score;
                best_move = m;
            }
        }

        let bound = if alpha == entry_alpha {
            Bound::Upper
        } else {
            Bound::Exact
        };
        self.tt
            .store(key, depth, to_tt(alpha, ply), bound, Some(best_move));
        alpha
    }

    /// Quiescence: stand pat, then captures and promotion pushes only,
    /// until the position goes quiet. No transposition table here.
    fn quiesce(&mut self, b: &Board, mut alpha: i32, beta: i32) -> i32 {
        if self.out_of_time() {
            self.time_up = true;
            return evaluate(b);
        }
        self.nodes += 1;

        let stand = evaluate(b);
        if stand >= beta {
            return beta;
        }
        if stand > alpha {
            alpha = stand;
        }

        for m in noisy_moves(b) {
            let child = b.make_move_new(m);
            let score = -self.quiesce(&child, -beta, -alpha);
            if self.time_up {
                return alpha;
            }
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }
}

impl Default for Search {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::{Piece, Square};
    use std::str::FromStr;
    use std::time::Instant;

    fn board(fen: &str) -> Board {
        Board::from_str(fen).expect("valid fen")
    }

    fn mv(from: Square, to: Square) -> ChessMove {
        ChessMove::new(from, to, None)
    }

    // Reference tree search with no pruning, no table and no deadline,
    // over the same evaluator and the same noisy-move definition.
    fn ref_quiesce(b: &Board) -> i32 {
        let mut best = evaluate(b);
        for m in noisy_moves(b) {
            best = best.max(-ref_quiesce(&b.make_move_new(m)));
        }
        best
    }

    fn ref_minimax(b: &Board, depth: i32, ply: i32) -> i32 {
        match b.status() {
            BoardStatus::Checkmate => return -(MATE - ply),
            BoardStatus::Stalemate => return 0,
            BoardStatus::Ongoing => {}
        }
        if depth == 0 {
            return ref_quiesce(b);
        }
        let mut best = -INF;
        for m in MoveGen::new_legal(b) {
            best = best.max(-ref_minimax(&b.make_move_new(m), depth - 1, ply + 1));
        }
        best
    }

    #[test]
    fn alpha_beta_matches_plain_minimax() {
        let positions = [
            "4k3/1pp5/8/8/8/8/5PP1/4K3 w - - 0 1",
            "k7/8/8/3q4/1N2P3/8/8/K7 w - - 0 1",
            "6k1/5ppp/8/8/8/8/5PPP/R5K1 b - - 0 1",
        ];
        for fen in positions {
            let b = board(fen);
            for depth in 1..=3 {
                let mut search = Search::new();
                let got = search.negamax(&b, depth, 0, -INF, INF);
                let want = ref_minimax(&b, depth, 0);
                assert_eq!(got, want, "depth {depth} of {fen}");
            }
        }
    }

    #[test]
    fn second_search_rides_the_table() {
        let b = board("4k3/1pp5/8/8/8/8/5PP1/4K3 w - - 0 1");
        let mut search = Search::new();

        let first_score = search.negamax(&b, 4, 0, -INF, INF);
        let first_nodes = search.nodes;

        search.nodes = 0;
        let second_score = search.negamax(&b, 4, 0, -INF, INF);
        let second_nodes = search.nodes;

        assert_eq!(first_score, second_score);
        assert!(
            second_nodes < first_nodes,
            "table should shrink the revisit: {second_nodes} vs {first_nodes}"
        );

        // The cached best move is a legal one.
        let entry = search.tt.probe(board_key(&b)).expect("root entry");
        let best = entry.best_move().expect("root best move");
        assert!(MoveGen::new_legal(&b).any(|m| m == best));
    }

    #[test]
    fn finds_back_rank_mate() {
        let b = board("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1");
        let mut search = Search::new();
        let best = search
            .find_best_move(&b, Duration::from_millis(2000))
            .expect("has moves");
        assert_eq!(best, mv(Square::A1, Square::A8));
    }

    #[test]
    fn never_stumbles_into_stalemate() {
        let b = board("7k/5Q2/6K1/8/8/8/8/8 w - - 0 1");
        let mut search = Search::new();
        let best = search
            .find_best_move(&b, Duration::from_millis(1000))
            .expect("has moves");
        assert!(MoveGen::new_legal(&b).any(|m| m == best), "legal move");
        assert_ne!(
            b.make_move_new(best).status(),
            BoardStatus::Stalemate,
            "{best} throws away the win"
        );
    }

    #[test]
    fn takes_the_hanging_queen() {
        let b = board("k7/8/8/3q4/4P3/8/8/K7 w - - 0 1");
        let mut search = Search::new();
        let best = search
            .find_best_move(&b, Duration::from_millis(500))
            .expect("has moves");
        assert_eq!(best, mv(Square::E4, Square::D5));
    }

    #[test]
    fn promotes_to_queen_not_under() {
        let b = board("8/P7/8/8/8/8/k7/7K w - - 0 1");
        let mut search = Search::new();
        let best = search
            .find_best_move(&b, Duration::from_millis(500))
            .expect("has moves");
        assert_eq!(best.get_source(), Square::A7);
        assert_eq!(best.get_dest(), Square::A8);
        assert_eq!(best.get_promotion(), Some(Piece::Queen));
    }

    #[test]
    fn respects_a_tight_deadline() {
        let started = Instant::now();
        let mut search = Search::new();
        let best = search.find_best_move(&Board::default(), Duration::from_millis(50));
        let elapsed = started.elapsed();

        let best = best.expect("startpos has moves");
        assert!(MoveGen::new_legal(&Board::default()).any(|m| m == best));
        assert!(
            elapsed < Duration::from_millis(250),
            "took {elapsed:?} against a 50ms budget"
        );
    }

    #[test]
    fn board_is_untouched_by_searching() {
        let b = board("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2");
        let before = board_key(&b);
        let mut search = Search::new();
        search.find_best_move(&b, Duration::from_millis(200));
        assert_eq!(board_key(&b), before);
    }

    #[test]
    fn dead_positions_yield_no_move() {
        // Stalemate: nothing to play.
        let b = board("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        let mut search = Search::new();
        assert_eq!(search.find_best_move(&b, Duration::from_millis(100)), None);
    }

    #[test]
    fn forced_single_reply_returns_immediately() {
        // Checked king with a single escape square.
        let b = board("7k/R7/8/8/8/8/8/1K5R b - - 0 1");
        let legal: Vec<ChessMove> = MoveGen::new_legal(&b).collect();
        assert_eq!(legal.len(), 1, "test position should have one reply");
        let mut search = Search::new();
        assert_eq!(
            search.find_best_move(&b, Duration::from_millis(100)),
            Some(legal[0])
        );
    }
}
