//! Static evaluation: interface only, per the core's contract.
//!
//! `Evaluator::evaluate` must be a pure, deterministic, side-to-move-relative
//! function of a `Position`, cheap enough to call at every search leaf. The
//! core does not prescribe evaluation weights; `MaterialPstEvaluator` below
//! is a minimal default (material + piece-square tables) so the engine is
//! playable without a tuned external evaluator plugged in.

use crate::piece::{Color, Piece, PieceType};
use crate::position::Position;
use crate::square::Square;
use crate::types::{Value, CHECKMATE};

/// A pure function from position to centipawn value, signed from the side
/// to move's perspective. May consult `position.pawn_key()` to cache
/// pawn-structure terms.
pub trait Evaluator {
    fn evaluate(&mut self, position: &Position) -> Value;
}

pub mod pst {
    use super::{PieceType, Square};

    #[rustfmt::skip]
    const PAWN_MG: [i32; 64] = [
         0,   0,   0,   0,   0,   0,   0,   0,
         5,  10,  10, -20, -20,  10,  10,   5,
         5,  -5, -10,   0,   0, -10,  -5,   5,
         0,   0,   0,  20,  20,   0,   0,   0,
         5,   5,  10,  25,  25,  10,   5,   5,
        10,  10,  20,  30,  30,  20,  10,  10,
        50,  50,  50,  50,  50,  50,  50,  50,
         0,   0,   0,   0,   0,   0,   0,   0,
    ];

    #[rustfmt::skip]
    const KNIGHT_MG: [i32; 64] = [
        -50, -40, -30, -30, -30, -30, -40, -50,
        -40, -20,   0,   5,   5,   0, -20, -40,
        -30,   5,  10,  15,  15,  10,   5, -30,
        -30,   0,  15,  20,  20,  15,   0, -30,
        -30,   5,  15,  20,  20,  15,   5, -30,
        -30,   0,  10,  15,  15,  10,   0, -30,
        -40, -20,   0,   0,   0,   0, -20, -40,
        -50, -40, -30, -30, -30, -30, -40, -50,
    ];

    #[rustfmt::skip]
    const BISHOP_MG: [i32; 64] = [
        -20, -10, -10, -10, -10, -10, -10, -20,
        -10,   5,   0,   0,   0,   0,   5, -10,
        -10,  10,  10,  10,  10,  10,  10, -10,
        -10,   0,  10,  10,  10,  10,   0, -10,
        -10,   5,   5,  10,  10,   5,   5, -10,
        -10,   0,   5,  10,  10,   5,   0, -10,
        -10,   0,   0,   0,   0,   0,   0, -10,
        -20, -10, -10, -10, -10, -10, -10, -20,
    ];

    #[rustfmt::skip]
    const ROOK_MG: [i32; 64] = [
         0,   0,   0,   5,   5,   0,   0,   0,
        -5,   0,   0,   0,   0,   0,   0,  -5,
        -5,   0,   0,   0,   0,   0,   0,  -5,
        -5,   0,   0,   0,   0,   0,   0,  -5,
        -5,   0,   0,   0,   0,   0,   0,  -5,
        -5,   0,   0,   0,   0,   0,   0,  -5,
         5,  10,  10,  10,  10,  10,  10,   5,
         0,   0,   0,   0,   0,   0,   0,   0,
    ];

    const QUEEN_MG: [i32; 64] = [0; 64];

    #[rustfmt::skip]
    const KING_MG: [i32; 64] = [
        20,  30,  10,   0,   0,  10,  30,  20,
        20,  20,   0,   0,   0,   0,  20,  20,
       -10, -20, -20, -20, -20, -20, -20, -10,
       -20, -30, -30, -40, -40, -30, -30, -20,
       -30, -40, -40, -50, -50, -40, -40, -30,
       -30, -40, -40, -50, -50, -40, -40, -30,
       -30, -40, -40, -50, -50, -40, -40, -30,
       -30, -40, -40, -50, -50, -40, -40, -30,
    ];

    #[rustfmt::skip]
    const KING_EG: [i32; 64] = [
        -50, -30, -30, -30, -30, -30, -30, -50,
        -30, -30,   0,   0,   0,   0, -30, -30,
        -30, -10,  20,  30,  30,  20, -10, -30,
        -30, -10,  30,  40,  40,  30, -10, -30,
        -30, -10,  30,  40,  40,  30, -10, -30,
        -30, -10,  20,  30,  30,  20, -10, -30,
        -30, -20, -10,   0,   0, -10, -20, -30,
        -50, -40, -30, -20, -20, -30, -40, -50,
    ];

    fn table(piece_type: PieceType, endgame: bool) -> &'static [i32; 64] {
        match (piece_type, endgame) {
            (PieceType::Pawn, _) => &PAWN_MG,
            (PieceType::Knight, _) => &KNIGHT_MG,
            (PieceType::Bishop, _) => &BISHOP_MG,
            (PieceType::Rook, _) => &ROOK_MG,
            (PieceType::Queen, _) => &QUEEN_MG,
            (PieceType::King, false) => &KING_MG,
            (PieceType::King, true) => &KING_EG,
        }
    }

    /// (midgame, endgame) piece-square value for a white piece on `sq`.
    /// Callers mirror the square vertically for black.
    #[must_use]
    pub fn value(piece_type: PieceType, sq: Square, color_white: bool) -> (i32, i32) {
        let idx = if color_white { sq.flip_rank().as_index() } else { sq.as_index() };
        (table(piece_type, false)[idx], table(piece_type, true)[idx])
    }
}

/// Pawn-structure term cache, keyed by `position.pawn_key()`. Direct-mapped
/// to keep lookups branch-free; collisions just recompute.
pub struct PawnCache {
    entries: Vec<Option<(u64, i32)>>,
    mask: usize,
}

impl PawnCache {
    #[must_use]
    pub fn new(size_pow2: usize) -> Self {
        let size = size_pow2.next_power_of_two().max(1);
        PawnCache { entries: vec![None; size], mask: size - 1 }
    }

    pub fn get_or_compute(&mut self, pawn_key: u64, compute: impl FnOnce() -> i32) -> i32 {
        let idx = (pawn_key as usize) & self.mask;
        if let Some((key, value)) = self.entries[idx] {
            if key == pawn_key {
                return value;
            }
        }
        let value = compute();
        self.entries[idx] = Some((pawn_key, value));
        value
    }
}

impl Default for PawnCache {
    fn default() -> Self {
        PawnCache::new(1 << 14)
    }
}

/// Material + piece-square default evaluator. Tapers between the midgame
/// and endgame tables by `position.phase()`.
pub struct MaterialPstEvaluator {
    pawn_cache: PawnCache,
}

impl Default for MaterialPstEvaluator {
    fn default() -> Self {
        MaterialPstEvaluator { pawn_cache: PawnCache::default() }
    }
}

impl MaterialPstEvaluator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn pawn_structure_term(position: &Position) -> i32 {
        // Doubled pawns: a small penalty per extra pawn on a file.
        let mut penalty = 0;
        for color in [Color::White, Color::Black] {
            let pawns = position.pieces_bb(color, PieceType::Pawn);
            let sign = if color == Color::White { -1 } else { 1 };
            for file in 0..8u8 {
                let count = (pawns & crate::bitboard::Bitboard::file_mask(crate::square::File(file))).popcount();
                if count > 1 {
                    penalty += sign * 10 * (count as i32 - 1);
                }
            }
        }
        penalty
    }
}

impl Evaluator for MaterialPstEvaluator {
    fn evaluate(&mut self, position: &Position) -> Value {
        let phase = position.phase().clamp(0, 24);
        let mg = position.psq_mg(Color::White) - position.psq_mg(Color::Black)
            + position.material(Color::White)
            - position.material(Color::Black);
        let eg = position.psq_eg(Color::White) - position.psq_eg(Color::Black)
            + position.material(Color::White)
            - position.material(Color::Black);
        let tapered = (mg * phase + eg * (24 - phase)) / 24;
        let pawn_key = position.pawn_key();
        let pawn_term = self.pawn_cache.get_or_compute(pawn_key, || Self::pawn_structure_term(position));
        let white_relative = tapered + pawn_term + 10; // small tempo bonus for side to move, applied below
        let score = if position.side_to_move() == Color::White { white_relative } else { -white_relative };
        score.clamp(-(CHECKMATE - 1), CHECKMATE - 1)
    }
}

#[must_use]
pub fn piece_static_value(piece: Piece) -> i32 {
    piece.piece_type.value()
}
