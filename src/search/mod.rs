pub mod driver;
pub mod game_time;
pub mod negamax;
pub mod ordering;
pub mod quiescence;
pub mod repetition;
pub mod see;
pub mod transposition;

use crate::board::Board;
use crate::search::driver::{SearchConfig, SearchStats};
use crate::search::game_time::Deadline;
use crate::search::ordering::{HistoryTable, KillerTable};
use crate::search::repetition::RepetitionTable;
use crate::search::transposition::TranspositionTable;

pub const MATE_SCORE: i32 = 30_000;

const NODE_CHECK_INTERVAL: u64 = 2048;

/// Per-search mutable state threaded through every negamax/quiescence call:
/// the shared transposition table, move-ordering heuristics, repetition
/// history, the request-scoped config, and the deadline/node-budget
/// cancellation gate (spec.md §4).
pub struct Searcher<'a> {
    pub tt: &'a mut TranspositionTable,
    pub killers: KillerTable,
    pub history: HistoryTable,
    pub repetition: RepetitionTable,
    pub stats: SearchStats,
    pub config: SearchConfig,
    deadline: &'a Deadline,
    node_limit: Option<u64>,
    aborted: bool,
}

impl<'a> Searcher<'a> {
    pub fn new(
        tt: &'a mut TranspositionTable,
        deadline: &'a Deadline,
        node_limit: Option<u64>,
        config: SearchConfig,
    ) -> Self {
        Self {
            tt,
            killers: KillerTable::new(),
            history: HistoryTable::new(),
            repetition: RepetitionTable::new(),
            stats: SearchStats::default(),
            config,
            deadline,
            node_limit,
            aborted: false,
        }
    }

    pub fn push_history(&mut self, hash: u64) {
        self.repetition.push(hash);
    }

    pub fn pop_history(&mut self) {
        self.repetition.pop();
    }

    pub fn is_repetition_or_fifty(&self, board: &Board) -> bool {
        if board.halfmove_clock >= 100 {
            return true;
        }
        self.repetition.is_repetition(board.hash, board.halfmove_clock as usize)
    }

    /// Only checks the wall clock/stop flag every `NODE_CHECK_INTERVAL` nodes,
    /// since syscalling a clock on every node would dominate search time at high
    /// node rates (spec.md §4.1).
    pub fn should_abort(&mut self) -> bool {
        if self.aborted {
            return true;
        }
        if !self.stats.nodes.is_multiple_of(NODE_CHECK_INTERVAL) {
            return false;
        }
        if let Some(limit) = self.node_limit {
            if self.stats.nodes >= limit {
                self.aborted = true;
                return true;
            }
        }
        if self.deadline.should_stop() {
            self.aborted = true;
            return true;
        }
        false
    }
}
