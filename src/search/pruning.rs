//! Small standalone predicates used by the pruning/reduction bundle in the
//! main search loop. Kept separate from `mod.rs` so each knob can be read
//! (and unit-tested) independently of the recursive driver.

use crate::piece::PieceType;
use crate::position::Position;
use crate::r#move::Move;
use crate::see;
use crate::types::Depth;

use super::SearchOptions;

/// King-and-pawns-only positions are unsafe for null-move pruning: passing
/// is much more likely to be illusively good (zugzwang) when there is
/// little material left to shuffle.
#[must_use]
pub fn is_zugzwang_prone(position: &Position, side: crate::piece::Color) -> bool {
    position.material_non_pawn(side) == 0
}

/// Reverse futility pruning margin: grows linearly with depth.
#[must_use]
pub fn rfp_margin(depth: Depth) -> i32 {
    80 * depth
}

/// A "good capture" per the quiescence admission rule: the victim clearly
/// outvalues the attacker, or it continues a recapture chain on the
/// opponent's last move's destination, or the destination square is
/// simply undefended.
#[must_use]
pub fn is_good_capture(position: &Position, mv: Move, options: &SearchOptions) -> bool {
    if options.use_quiescence_see {
        return see::see(position, mv) >= 0;
    }

    if let (Some(victim), Some(attacker)) = (position.piece_at(mv.dest()), position.piece_at(mv.origin())) {
        if victim.piece_type.value() > attacker.piece_type.value() + 50 {
            return true;
        }
    } else if mv.is_en_passant() {
        return true;
    }

    if let Some(last) = position.last_move() {
        if last.dest() == mv.dest() {
            return true;
        }
    }

    let us = position.side_to_move();
    !position.is_attacked(mv.dest(), us.opposite())
}

#[must_use]
pub fn piece_value(piece_type: PieceType) -> i32 {
    piece_type.value()
}
