use thiserror::Error;

use crate::board::castling::CastlingRights;
use crate::board::Board;
use crate::types::bitboard::Bitboard;
use crate::types::pieces::{Color, Piece, PieceName, NUM_PIECE_NAMES};
use crate::types::square::Square;
use crate::zobrist;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// FEN is an I/O-boundary format (UCI `position fen ...`), so failures are a typed
/// error rather than a panic, following examples/jeff-pow-Titan's split between
/// internal invariant panics and boundary-facing `Result`s.
#[derive(Debug, Error)]
pub enum FenError {
    #[error("FEN must have 6 space-separated fields, found {0}")]
    WrongFieldCount(usize),
    #[error("board field must have 8 ranks, found {0}")]
    WrongRankCount(usize),
    #[error("unrecognized piece character '{0}'")]
    BadPieceChar(char),
    #[error("a rank's square count does not sum to 8")]
    RankNotEightSquares,
    #[error("side-to-move field must be 'w' or 'b', found '{0}'")]
    BadSideToMove(String),
    #[error("invalid en passant square '{0}'")]
    BadEnPassant(String),
    #[error("invalid halfmove clock '{0}'")]
    BadHalfmoveClock(String),
    #[error("invalid fullmove number '{0}'")]
    BadFullmoveNumber(String),
}

pub fn from_fen(fen: &str) -> Result<Board, FenError> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(FenError::WrongFieldCount(fields.len()));
    }

    let ranks: Vec<&str> = fields[0].split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::WrongRankCount(ranks.len()));
    }

    let mut mailbox = [Piece::None; 64];
    for (rank_from_top, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_from_top as u8;
        let mut file = 0u8;
        for c in rank_str.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as u8;
                continue;
            }
            if file >= 8 {
                return Err(FenError::RankNotEightSquares);
            }
            let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
            let name = match c.to_ascii_lowercase() {
                'p' => PieceName::Pawn,
                'n' => PieceName::Knight,
                'b' => PieceName::Bishop,
                'r' => PieceName::Rook,
                'q' => PieceName::Queen,
                'k' => PieceName::King,
                other => return Err(FenError::BadPieceChar(other)),
            };
            mailbox[Square::from_file_rank(file, rank).idx()] = Piece::new(name, color);
            file += 1;
        }
        if file != 8 {
            return Err(FenError::RankNotEightSquares);
        }
    }

    let side_to_move = match fields[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(FenError::BadSideToMove(other.to_string())),
    };

    let mut rights = 0u8;
    for c in fields[2].chars() {
        rights |= match c {
            'K' => castling::WHITE_KINGSIDE,
            'Q' => castling::WHITE_QUEENSIDE,
            'k' => castling::BLACK_KINGSIDE,
            'q' => castling::BLACK_QUEENSIDE,
            '-' => 0,
            _ => 0,
        };
    }
    let castling_rights = CastlingRights(rights);

    let en_passant = if fields[3] == "-" {
        None
    } else {
        Some(fields[3].parse::<Square>().map_err(|_| FenError::BadEnPassant(fields[3].to_string()))?)
    };

    let halfmove_clock: u16 =
        fields[4].parse().map_err(|_| FenError::BadHalfmoveClock(fields[4].to_string()))?;
    let fullmove_number: u16 =
        fields[5].parse().map_err(|_| FenError::BadFullmoveNumber(fields[5].to_string()))?;

    let mut piece_bb = [[Bitboard::EMPTY; NUM_PIECE_NAMES]; 2];
    let mut color_bb = [Bitboard::EMPTY; 2];
    for sq in Square::iter() {
        if let Piece::Some(name, color) = mailbox[sq.idx()] {
            piece_bb[color.idx()][name.idx()] |= Bitboard::from_square(sq);
            color_bb[color.idx()] |= Bitboard::from_square(sq);
        }
    }

    let mut board = Board {
        mailbox,
        piece_bb,
        color_bb,
        side_to_move,
        castling_rights,
        en_passant,
        halfmove_clock,
        fullmove_number,
        hash: 0,
    };
    board.hash = compute_hash(&board);
    Ok(board)
}

/// Recomputes the Zobrist hash from scratch; used only at load time and in tests
/// that check the incremental delta against a from-scratch recompute (spec.md §8).
pub fn compute_hash(board: &Board) -> u64 {
    let mut hash = 0u64;
    for sq in Square::iter() {
        if let Piece::Some(name, color) = board.piece_at(sq) {
            zobrist::toggle_piece(&mut hash, color, name, sq);
        }
    }
    zobrist::toggle_castling(&mut hash, board.castling_rights.0);
    if let Some(ep) = board.en_passant {
        if crate::board::ep_capturable(board, ep, board.side_to_move) {
            zobrist::toggle_en_passant(&mut hash, ep.file());
        }
    }
    if board.side_to_move == Color::Black {
        zobrist::toggle_side_to_move(&mut hash);
    }
    hash
}

pub fn to_fen(board: &Board) -> String {
    let mut s = String::new();
    for rank_from_top in 0..8u8 {
        let rank = 7 - rank_from_top;
        let mut empty_run = 0u8;
        for file in 0..8u8 {
            let piece = board.piece_at(Square::from_file_rank(file, rank));
            if piece.is_none() {
                empty_run += 1;
                continue;
            }
            if empty_run > 0 {
                s.push_str(&empty_run.to_string());
                empty_run = 0;
            }
            s.push(piece.char());
        }
        if empty_run > 0 {
            s.push_str(&empty_run.to_string());
        }
        if rank_from_top != 7 {
            s.push('/');
        }
    }
    s.push(' ');
    s.push(if board.side_to_move == Color::White { 'w' } else { 'b' });
    s.push(' ');
    let r = board.castling_rights.0;
    if r == 0 {
        s.push('-');
    } else {
        if r & castling::WHITE_KINGSIDE != 0 {
            s.push('K');
        }
        if r & castling::WHITE_QUEENSIDE != 0 {
            s.push('Q');
        }
        if r & castling::BLACK_KINGSIDE != 0 {
            s.push('k');
        }
        if r & castling::BLACK_QUEENSIDE != 0 {
            s.push('q');
        }
    }
    s.push(' ');
    match board.en_passant {
        Some(sq) => s.push_str(&sq.to_string()),
        None => s.push('-'),
    }
    s.push_str(&format!(" {} {}", board.halfmove_clock, board.fullmove_number));
    s
}

use crate::board::castling;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_round_trips() {
        let board = from_fen(STARTING_FEN).unwrap();
        assert_eq!(to_fen(&board), STARTING_FEN);
    }

    #[test]
    fn rejects_malformed_fen() {
        assert!(from_fen("not a fen").is_err());
    }

    #[test]
    fn hash_matches_from_scratch_recompute() {
        let board = from_fen(STARTING_FEN).unwrap();
        assert_eq!(board.hash, compute_hash(&board));
    }
}
