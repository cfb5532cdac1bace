//! Zobrist keys: independent random 64-bit keys per (piece, square),
//! castling-rights combination, en-passant file, and side to move.
//!
//! Keys are generated once from a fixed-seed PRNG so that two runs of the
//! engine hash identically; this is not a security property, it is a
//! reproducibility one (useful for perft diffing and bug reports).

use std::sync::LazyLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::castling::CastlingRights;
use crate::piece::Piece;
use crate::square::{File, Square};

pub struct ZobristKeys {
    /// `piece[piece.table_index()][square]`
    pub piece: [[u64; 64]; 12],
    /// One key per castling-rights bitfield value (16 combinations).
    pub castling: [u64; 16],
    /// One key per en-passant target file.
    pub ep_file: [u64; 8],
    pub side_to_move: u64,
}

impl ZobristKeys {
    fn generate() -> Self {
        let mut rng = StdRng::seed_from_u64(0xC0FF_EE15_CAFE_D00D);
        let mut piece = [[0u64; 64]; 12];
        for table in &mut piece {
            for key in table.iter_mut() {
                *key = rng.gen();
            }
        }
        let mut castling = [0u64; 16];
        for key in castling.iter_mut() {
            *key = rng.gen();
        }
        let mut ep_file = [0u64; 8];
        for key in ep_file.iter_mut() {
            *key = rng.gen();
        }
        ZobristKeys { piece, castling, ep_file, side_to_move: rng.gen() }
    }

    #[inline]
    pub fn piece_key(&self, piece: Piece, sq: Square) -> u64 {
        self.piece[piece.table_index()][sq.as_index()]
    }

    #[inline]
    pub fn castling_key(&self, rights: CastlingRights) -> u64 {
        self.castling[rights.0 as usize]
    }

    #[inline]
    pub fn ep_key(&self, file: File) -> u64 {
        self.ep_file[file.as_index()]
    }
}

pub static ZOBRIST: LazyLock<ZobristKeys> = LazyLock::new(ZobristKeys::generate);

/// Only the pawn piece-square keys, folded into a side-channel key used as
/// the evaluator's pawn-structure cache lookup.
#[inline]
pub fn is_pawn(piece: Piece) -> bool {
    piece.piece_type == crate::piece::PieceType::Pawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{Color, PieceType};

    #[test]
    fn distinct_piece_square_keys() {
        let k1 = ZOBRIST.piece_key(Piece::new(Color::White, PieceType::Pawn), Square::E2);
        let k2 = ZOBRIST.piece_key(Piece::new(Color::White, PieceType::Pawn), Square::E4);
        assert_ne!(k1, k2);
    }

    #[test]
    fn deterministic_across_instances() {
        let a = ZobristKeys::generate();
        let b = ZobristKeys::generate();
        assert_eq!(a.side_to_move, b.side_to_move);
        assert_eq!(a.piece[0][0], b.piece[0][0]);
    }
}
