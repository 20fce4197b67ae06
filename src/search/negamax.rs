//! The main alpha-beta search: negamax with PVS re-search, null-move pruning,
//! razoring, late move reductions, and check extensions (spec.md §4.2).
//! Grounded on examples/jeff-pow-Titan/src/search/search.rs for the overall node
//! shape and pruning gates, adapted to this crate's TT/ordering/quiescence APIs.

use crate::board::Board;
use crate::eval;
use crate::movegen::{self, GenMode};
use crate::moves::Move;
use crate::search::ordering;
use crate::search::quiescence::quiescence;
use crate::search::transposition::Bound;
use crate::search::{Searcher, MATE_SCORE};
use crate::types::pieces::PieceName;

const NULL_MOVE_MIN_DEPTH: u8 = 3;
const MATE_DISTANCE_THRESHOLD: i32 = 1000;

fn is_mate_score(score: i32) -> bool {
    score.abs() >= MATE_SCORE - MATE_DISTANCE_THRESHOLD
}

/// Razoring margins by depth (spec.md §4.2 step 6); index 0 is unused since
/// razoring never fires at depth 0 (that's the quiescence horizon).
const RAZOR_MARGIN: [i32; 4] = [0, 100, 150, 200];

fn lmr_reduction(depth: u8, move_index: usize) -> u8 {
    // log-based reduction table, the standard formula used across the example
    // pack's engines (spec.md §4.2.6): larger at higher depth and later in the
    // move list, floored at zero so low depths/early moves see no reduction.
    let d = (depth as f64).max(1.0).ln();
    let m = (move_index as f64).max(1.0).ln();
    let r = 0.75 + d * m / 2.25;
    (r as u8).min(depth.saturating_sub(1))
}

/// Has a non-pawn, non-king piece for the side to move, used to gate null-move
/// pruning against zugzwang-prone king+pawn endgames (spec.md §4.2.3).
fn has_non_pawn_material(board: &Board) -> bool {
    let us = board.side_to_move;
    board.pieces(us, PieceName::Knight).count()
        + board.pieces(us, PieceName::Bishop).count()
        + board.pieces(us, PieceName::Rook).count()
        + board.pieces(us, PieceName::Queen).count()
        > 0
}

#[allow(clippy::too_many_arguments)]
pub fn negamax(
    searcher: &mut Searcher,
    board: &Board,
    mut depth: u8,
    root_depth: u8,
    mut alpha: i32,
    beta: i32,
    ply: u32,
    allow_null: bool,
) -> i32 {
    searcher.stats.nodes += 1;
    if ply > 0 && searcher.is_repetition_or_fifty(board) {
        return 0;
    }
    if searcher.should_abort() {
        // spec.md §4.2 step 1: a cancelled node returns alpha, not a made-up score.
        return alpha;
    }

    let in_check = board.in_check();
    // Check extension: only one per path, gated on still being above the
    // iteration's starting depth so a long forcing sequence can't re-extend
    // without bound (spec.md §4.2 step 2).
    if in_check && depth < root_depth {
        depth += 1;
    }
    if depth == 0 {
        return quiescence(searcher, board, alpha, beta, ply);
    }

    let pv_node = beta - alpha > 1;
    let original_alpha = alpha;

    let tt_move;
    if let Some(probe) = searcher.tt.probe(board.hash, ply) {
        tt_move = if probe.best_move.is_well_formed() { probe.best_move } else { Move::NULL };
        if !pv_node && probe.depth >= depth {
            match probe.bound {
                Bound::Exact => {
                    searcher.stats.tt_cutoffs += 1;
                    return probe.score;
                }
                Bound::LowerBound if probe.score >= beta => {
                    searcher.stats.tt_cutoffs += 1;
                    return probe.score;
                }
                Bound::UpperBound if probe.score <= alpha => {
                    searcher.stats.tt_cutoffs += 1;
                    return probe.score;
                }
                _ => {}
            }
        }
    } else {
        tt_move = Move::NULL;
    }

    // Razoring: if we're so far below alpha that only a quiescence search could
    // plausibly save us, drop straight into one instead of searching further
    // (spec.md §4.2.5).
    if !searcher.config.disable_razoring && !pv_node && !in_check && (1..=3).contains(&depth) {
        let margin = (RAZOR_MARGIN[depth as usize] * searcher.config.razoring_margin_scale) / 100;
        if eval::evaluate(board) + margin < alpha {
            searcher.stats.razoring_attempts += 1;
            let score = quiescence(searcher, board, alpha, beta, ply);
            if score <= alpha {
                searcher.stats.razoring_cutoffs += 1;
                return score;
            }
            searcher.stats.razoring_failures += 1;
        }
    }

    // Null-move pruning: give the opponent a free move and see if we're still
    // winning by enough to trust a cutoff, skipped near-zugzwang positions and
    // while already searching a null-move line (spec.md §4.2.3).
    if !searcher.config.disable_null_move
        && !pv_node
        && allow_null
        && !in_check
        && depth >= NULL_MOVE_MIN_DEPTH
        && has_non_pawn_material(board)
        && !is_mate_score(beta)
        && eval::evaluate(board) >= beta
    {
        searcher.stats.null_move_attempts += 1;
        let mut next = *board;
        next.make_null_move();
        let reduction = 2 + u8::from(depth >= 6);
        let null_score = -negamax(
            searcher,
            &next,
            depth.saturating_sub(1 + reduction),
            root_depth,
            -beta,
            -beta + 1,
            ply + 1,
            false,
        );
        if searcher.should_abort() {
            return alpha;
        }
        if null_score >= beta && !is_mate_score(null_score) {
            searcher.stats.null_move_cutoffs += 1;
            return beta;
        }
    }

    let mut moves = movegen::generate_pseudo_legal(board, GenMode::All);
    ordering::score_moves(board, &mut moves, tt_move, &searcher.killers, &searcher.history, ply as usize);

    let mut best_score = -MATE_SCORE;
    let mut best_move = Move::NULL;
    let mut searched = 0usize;

    for i in 0..moves.len() {
        let sm = moves.pick_move(i);
        let m = sm.m;
        if movegen::leaves_king_in_check(board, m) {
            continue;
        }

        let is_capture = board.piece_at(m.to()).is_some() || m.is_en_passant();
        let is_quiet = !is_capture && m.promotion().is_none();

        let mut next = *board;
        next.make_move(m);
        searcher.push_history(next.hash);

        let score = if searched == 0 {
            -negamax(searcher, &next, depth - 1, root_depth, -beta, -alpha, ply + 1, true)
        } else {
            let move_index = searched + 1;
            let mut reduction = 0;
            if is_quiet
                && depth >= searcher.config.lmr_min_depth
                && move_index > searcher.config.lmr_min_moves
                && !in_check
            {
                reduction = lmr_reduction(depth, move_index);
                searcher.stats.lmr_reductions += 1;
            }
            let reduced_depth = depth.saturating_sub(1 + reduction);
            let mut s = -negamax(searcher, &next, reduced_depth, root_depth, -alpha - 1, -alpha, ply + 1, true);
            if s > alpha && (reduction > 0 || s < beta) {
                if reduction > 0 {
                    searcher.stats.lmr_researches += 1;
                }
                s = -negamax(searcher, &next, depth - 1, root_depth, -beta, -alpha, ply + 1, true);
            }
            s
        };

        searcher.pop_history();
        searched += 1;

        if searcher.should_abort() {
            return alpha;
        }

        if score > best_score {
            best_score = score;
            best_move = m;
        }
        if score > alpha {
            alpha = score;
        }
        if alpha >= beta {
            if is_quiet {
                searcher.killers.store(ply as usize, m);
                searcher.history.update(board.side_to_move, m.piece_moving(), m.to(), depth);
            }
            searcher.stats.total_cutoffs += 1;
            if searched == 1 {
                searcher.stats.first_move_cutoffs += 1;
            }
            break;
        }
    }

    if searched == 0 {
        return if in_check { -MATE_SCORE + ply as i32 } else { 0 };
    }

    let bound = if best_score <= original_alpha {
        Bound::UpperBound
    } else if best_score >= beta {
        Bound::LowerBound
    } else {
        Bound::Exact
    };
    searcher.tt.store(board.hash, best_move, best_score, depth, bound, ply);

    best_score
}
