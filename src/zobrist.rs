//! Zobrist hashing: a whole-board hash function plus the incremental delta update
//! the search and repetition table rely on so `make_move`/`make_null_move` never
//! have to recompute a hash from scratch (spec.md §4.8).
//!
//! Grounded on examples/jeff-pow-Titan/src/board/zobrist.rs for the key-table layout
//! (piece-square array, turn key, castling array, en-passant file array) and on
//! spec.md §4.8 for the delta formula, which the teacher's implementation doesn't
//! have (Titan recomputes the hash from scratch after each move).

use crate::types::pieces::{Color, PieceName, NUM_PIECE_NAMES};
use crate::types::square::Square;

struct Rng(u64);

impl Rng {
    fn next_u64(&mut self) -> u64 {
        // splitmix64, used only to seed deterministic key tables at startup.
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

lazy_static::lazy_static! {
    static ref PIECE_SQUARE_KEYS: [[[u64; 64]; NUM_PIECE_NAMES]; 2] = {
        let mut rng = Rng(0x2545_F491_4F6C_DD1D);
        std::array::from_fn(|_color| {
            std::array::from_fn(|_piece| std::array::from_fn(|_sq| rng.next_u64()))
        })
    };
    static ref CASTLING_KEYS: [u64; 16] = {
        let mut rng = Rng(0x0123_4567_89AB_CDEF);
        std::array::from_fn(|_| rng.next_u64())
    };
    static ref EP_FILE_KEYS: [u64; 8] = {
        let mut rng = Rng(0xFEDC_BA98_7654_3210);
        std::array::from_fn(|_| rng.next_u64())
    };
    static ref SIDE_KEY: u64 = Rng(0xDEAD_BEEF_CAFE_F00D).next_u64();
}

pub fn piece_square_key(color: Color, piece: PieceName, sq: Square) -> u64 {
    PIECE_SQUARE_KEYS[color.idx()][piece.idx()][sq.idx()]
}

pub fn castling_key(rights: u8) -> u64 {
    CASTLING_KEYS[rights as usize]
}

pub fn en_passant_key(file: u8) -> u64 {
    EP_FILE_KEYS[file as usize]
}

pub fn side_to_move_key() -> u64 {
    *SIDE_KEY
}

/// XORs a piece in or out of a hash on a given square; since XOR is its own
/// inverse, the same call both places and removes.
pub fn toggle_piece(hash: &mut u64, color: Color, piece: PieceName, sq: Square) {
    *hash ^= piece_square_key(color, piece, sq);
}

pub fn toggle_side_to_move(hash: &mut u64) {
    *hash ^= side_to_move_key();
}

pub fn toggle_castling(hash: &mut u64, rights: u8) {
    *hash ^= castling_key(rights);
}

pub fn toggle_en_passant(hash: &mut u64, file: u8) {
    *hash ^= en_passant_key(file);
}
