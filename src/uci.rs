//! Minimal UCI front end: enough of the protocol (spec.md §6) to make this
//! crate a runnable engine for manual testing and GUI hookup. Grounded on
//! examples/jeff-pow-Titan/src/engine/uci.rs's command loop and `setoption`
//! handling, trimmed to the options this crate actually has (Hash, OwnBook).

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use itertools::Itertools;
use log::info;

use crate::board::{fen, Board};
use crate::book::OpeningBook;
use crate::moves::Move;
use crate::search::driver::{self, SearchConfig};
use crate::search::transposition::TranspositionTable;

const ENGINE_NAME: &str = "Corvid";
const ENGINE_AUTHOR: &str = "Corvid contributors";
const DEFAULT_HASH_MB: usize = 16;

pub struct UciEngine {
    board: Board,
    tt: TranspositionTable,
    book: Option<OpeningBook>,
    use_book: bool,
}

impl UciEngine {
    pub fn new() -> Self {
        Self {
            board: Board::default(),
            tt: TranspositionTable::new(DEFAULT_HASH_MB),
            book: None,
            use_book: true,
        }
    }

    pub fn run(&mut self) {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if !self.handle_command(line.trim()) {
                break;
            }
        }
    }

    /// Returns false when the engine should exit its main loop.
    fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else { return true };

        match command {
            "uci" => {
                println!("id name {ENGINE_NAME}");
                println!("id author {ENGINE_AUTHOR}");
                println!("option name Hash type spin default {DEFAULT_HASH_MB} min 1 max 4096");
                println!("option name OwnBook type check default true");
                println!("option name BookFile type string default <empty>");
                println!("uciok");
            }
            "isready" => println!("readyok"),
            "ucinewgame" => {
                self.tt.clear();
                self.board = Board::default();
            }
            "setoption" => self.handle_setoption(line),
            "position" => self.handle_position(line),
            "go" => self.handle_go(line),
            "stop" => {}
            "quit" => return false,
            "d" => println!("{}", self.board),
            _ => info!("ignoring unrecognized UCI command: {line}"),
        }
        io::stdout().flush().ok();
        true
    }

    fn handle_setoption(&mut self, line: &str) {
        let after_name = line.split_once("name ").map(|x| x.1).unwrap_or("");
        let (name, value) = match after_name.split_once(" value ") {
            Some((n, v)) => (n.trim(), Some(v.trim())),
            None => (after_name.trim(), None),
        };
        match name {
            "Hash" => {
                if let Some(mb) = value.and_then(|v| v.parse::<usize>().ok()) {
                    self.tt = TranspositionTable::new(mb.max(1));
                }
            }
            "OwnBook" => {
                self.use_book = value.map(|v| v == "true").unwrap_or(true);
            }
            "BookFile" => {
                if let Some(path) = value {
                    self.book = OpeningBook::from_file(&PathBuf::from(path)).ok();
                }
            }
            _ => {}
        }
    }

    fn handle_position(&mut self, line: &str) {
        let rest = line.strip_prefix("position ").unwrap_or("");
        let (board_part, moves_part) = match rest.split_once("moves ") {
            Some((b, m)) => (b, Some(m)),
            None => (rest, None),
        };

        self.board = if let Some(fen_str) = board_part.strip_prefix("fen ") {
            fen::from_fen(fen_str.trim()).unwrap_or_default()
        } else {
            Board::default()
        };

        if let Some(moves_str) = moves_part {
            for uci_move in moves_str.split_whitespace() {
                if let Some(m) = self.find_move_by_uci(uci_move) {
                    self.board.make_move(m);
                }
            }
        }
    }

    fn find_move_by_uci(&self, uci: &str) -> Option<Move> {
        let legal = crate::movegen::generate_legal(&self.board, crate::movegen::GenMode::All);
        let found = legal.iter().map(|sm| sm.m).find(|m| m.to_uci() == uci);
        found
    }

    fn handle_go(&mut self, line: &str) {
        let mut config = SearchConfig { use_book: self.use_book, ..SearchConfig::default() };
        // "go" options all arrive as keyword/value pairs, so walk them two at a
        // time the way the UCI front end this is grounded on parses `setoption`.
        for (key, value) in line.split_whitespace().skip(1).tuples::<(_, _)>() {
            match key {
                "depth" => {
                    if let Ok(d) = value.parse() {
                        config.max_depth = d;
                    }
                }
                "movetime" => {
                    if let Ok(ms) = value.parse() {
                        config.hard_time_limit = Some(Duration::from_millis(ms));
                    }
                }
                "nodes" => {
                    if let Ok(n) = value.parse() {
                        config.node_limit = Some(n);
                    }
                }
                _ => {}
            }
        }

        let result = driver::search(&self.board, config, self.book.as_ref(), &mut self.tt);
        println!(
            "info depth {} score cp {} nodes {}",
            result.stats.depth_reached, result.score, result.stats.nodes
        );
        println!("bestmove {}", result.best_move.to_uci());
    }
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new()
    }
}
