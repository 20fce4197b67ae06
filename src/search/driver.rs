//! Iterative deepening driver: runs negamax at increasing depths with
//! aspiration windows around the previous score, consults the opening book
//! before move 10, and stops on a deadline or explicit stop signal
//! (spec.md §4.1, §4.7). Grounded on examples/jeff-pow-Titan/src/search/thread.rs
//! for the iterative-deepening loop shape and best-move bookkeeping.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::board::Board;
use crate::book::{BookSelection, OpeningBook};
use crate::movegen::{self, GenMode};
use crate::moves::Move;
use crate::search::game_time::Deadline;
use crate::search::negamax::negamax;
use crate::search::{Searcher, MATE_SCORE};

/// Request-scoped search options (spec.md §3's `SearchConfig`). Fields beyond
/// the obvious depth/time/node limits are read straight out of `Searcher` by
/// `negamax`/`quiescence` rather than threaded as extra call arguments.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub max_depth: u8,
    pub hard_time_limit: Option<Duration>,
    pub node_limit: Option<u64>,
    pub use_book: bool,
    pub book_files: Vec<PathBuf>,
    pub book_selection_mode: BookSelection,
    pub book_weight_threshold: u16,
    pub lmr_min_depth: u8,
    pub lmr_min_moves: usize,
    pub disable_null_move: bool,
    pub disable_razoring: bool,
    pub razoring_margin_scale: i32,
    /// Only NumThreads=1 (single-threaded search) is implemented; see spec.md
    /// §5's note that a conforming implementation may do so and document it.
    pub num_threads: u8,
    pub debug_mode: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            hard_time_limit: None,
            node_limit: None,
            use_book: true,
            book_files: Vec::new(),
            book_selection_mode: BookSelection::WeightedRandom,
            book_weight_threshold: 0,
            lmr_min_depth: 3,
            lmr_min_moves: 4,
            disable_null_move: false,
            disable_razoring: false,
            razoring_margin_scale: 100,
            num_threads: 1,
            debug_mode: false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SearchStats {
    pub nodes: u64,
    pub qnodes: u64,
    pub depth_reached: u8,
    pub tt_cutoffs: u64,
    pub first_move_cutoffs: u64,
    pub total_cutoffs: u64,
    pub lmr_reductions: u64,
    pub lmr_researches: u64,
    pub null_move_attempts: u64,
    pub null_move_cutoffs: u64,
    pub razoring_attempts: u64,
    pub razoring_cutoffs: u64,
    pub razoring_failures: u64,
    pub delta_pruned: u64,
    pub book_move_used: bool,
    pub elapsed: Duration,
}

#[derive(Clone, Debug)]
pub struct SearchResult {
    pub best_move: Move,
    pub score: i32,
    pub pv: Vec<Move>,
    pub stats: SearchStats,
}

const ASPIRATION_WINDOW: i32 = 35;
const ASPIRATION_FULL_WIDEN: i32 = 1000;

/// Runs iterative deepening from `board`'s position. The book is only
/// consulted while `board.fullmove_number <= 10` (spec.md §4.7's book-gate
/// open question, resolved this way to match every opening-book integration in
/// the example pack, which all cut off book probes a handful of moves into the
/// game rather than keeping it alive indefinitely).
pub fn search(
    board: &Board,
    config: SearchConfig,
    book: Option<&OpeningBook>,
    tt: &mut crate::search::transposition::TranspositionTable,
) -> SearchResult {
    let start = Instant::now();
    if config.use_book && board.fullmove_number <= 10 {
        if let Some(book) = book {
            if let Some(m) = book.lookup(board, config.book_selection_mode, config.book_weight_threshold) {
                // spec.md §7: an illegal move from the book is treated as not-found.
                let legal = movegen::generate_legal(board, GenMode::All);
                if legal.iter().any(|sm| sm.m == m) {
                    let mut stats = SearchStats { book_move_used: true, ..SearchStats::default() };
                    stats.elapsed = start.elapsed();
                    return SearchResult { best_move: m, score: 0, pv: vec![m], stats };
                }
            }
        }
    }

    let deadline = Deadline::new(config.hard_time_limit);
    let mut searcher = Searcher::new(tt, &deadline, config.node_limit, config.clone());

    let legal = movegen::generate_legal(board, GenMode::All);
    if legal.is_empty() {
        let mut stats = searcher.stats.clone();
        stats.elapsed = start.elapsed();
        return SearchResult {
            best_move: Move::NULL,
            score: if board.in_check() { -MATE_SCORE } else { 0 },
            pv: vec![],
            stats,
        };
    }

    searcher.tt.increment_age();
    searcher.push_history(board.hash);

    let mut best_move = legal[0];
    let mut best_score = -MATE_SCORE;
    let mut prev_score = 0i32;

    for depth in 1..=config.max_depth {
        let mut window = ASPIRATION_WINDOW;
        let (mut alpha, mut beta) =
            if depth <= 1 { (-MATE_SCORE, MATE_SCORE) } else { (prev_score - window, prev_score + window) };

        let score = loop {
            let score = negamax(&mut searcher, board, depth, depth, alpha, beta, 0, true);
            if searcher.should_abort() {
                break score;
            }
            if score <= alpha {
                window *= 2;
                alpha = if window > ASPIRATION_FULL_WIDEN { -MATE_SCORE - 1 } else { prev_score - window };
            } else if score >= beta {
                window *= 2;
                beta = if window > ASPIRATION_FULL_WIDEN { MATE_SCORE + 1 } else { prev_score + window };
            } else {
                break score;
            }
        };

        if searcher.should_abort() && depth > 1 {
            break;
        }

        prev_score = score;
        best_score = score;
        searcher.stats.depth_reached = depth;
        if let Some(probe) = searcher.tt.probe(board.hash, 0) {
            if probe.best_move.is_well_formed() {
                best_move = probe.best_move;
            }
        }
        if config.debug_mode {
            log::debug!("depth {depth} score {score} nodes {}", searcher.stats.nodes);
        }

        if searcher.should_abort() {
            break;
        }
        if score.abs() >= MATE_SCORE - 1 {
            break;
        }
    }

    let mut stats = searcher.stats.clone();
    stats.elapsed = start.elapsed();
    SearchResult { best_move, score: best_score, pv: vec![best_move], stats }
}
