use std::ops::{BitAnd, BitOr, BitOrAssign};

use crate::types::pieces::Color;

pub const WHITE_KINGSIDE: u8 = 0b0001;
pub const WHITE_QUEENSIDE: u8 = 0b0010;
pub const BLACK_KINGSIDE: u8 = 0b0100;
pub const BLACK_QUEENSIDE: u8 = 0b1000;

/// Castling rights packed as a 4-bit mask, matching examples/jeff-pow-Titan's
/// board/board.rs field layout but expressed as free functions over a plain u8
/// (rather than a bitflags newtype) since the TT and zobrist tables key on it
/// as a raw 0..16 index (spec.md §4.8).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct CastlingRights(pub u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);

    pub fn kingside(self, color: Color) -> bool {
        let mask = match color {
            Color::White => WHITE_KINGSIDE,
            Color::Black => BLACK_KINGSIDE,
        };
        self.0 & mask != 0
    }

    pub fn queenside(self, color: Color) -> bool {
        let mask = match color {
            Color::White => WHITE_QUEENSIDE,
            Color::Black => BLACK_QUEENSIDE,
        };
        self.0 & mask != 0
    }

    /// Clears whichever rights are invalidated by a piece leaving `from` or a rook
    /// being captured on `to` (spec.md movegen contract: moving/capturing a rook or
    /// king revokes the corresponding right(s), permanently).
    pub fn updated_after_move(self, from_rights_mask: u8, to_rights_mask: u8) -> CastlingRights {
        CastlingRights(self.0 & !from_rights_mask & !to_rights_mask)
    }
}

impl BitOr for CastlingRights {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        CastlingRights(self.0 | rhs.0)
    }
}

impl BitOrAssign for CastlingRights {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for CastlingRights {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self::Output {
        CastlingRights(self.0 & rhs.0)
    }
}

/// Rights-mask touched when a piece moves away from this square (rook or king's
/// home square), used both to update rights and to know what to revoke when a
/// rook is captured there.
pub fn rights_mask_for_square(sq: u8) -> u8 {
    match sq {
        0 => WHITE_QUEENSIDE,  // a1
        4 => WHITE_KINGSIDE | WHITE_QUEENSIDE, // e1
        7 => WHITE_KINGSIDE,  // h1
        56 => BLACK_QUEENSIDE, // a8
        60 => BLACK_KINGSIDE | BLACK_QUEENSIDE, // e8
        63 => BLACK_KINGSIDE, // h8
        _ => 0,
    }
}
