//! Static exchange evaluation: simulates the full capture sequence on a
//! single square without touching the real position, to judge whether a
//! capture is profitable before spending search effort on it.

use crate::bitboard::Bitboard;
use crate::piece::{Color, PieceType};
use crate::position::Position;
use crate::r#move::Move;
use crate::square::Square;
use crate::tables;

fn attackers_to(sq: Square, occ: Bitboard, pieces: &[[Bitboard; 6]; 2], side: Color) -> Bitboard {
    let idx = side.as_index();
    let mut atk = Bitboard::EMPTY;
    atk |= pieces[idx][PieceType::Pawn.as_index()] & tables::pawn_attacks(side.opposite(), sq);
    atk |= pieces[idx][PieceType::Knight.as_index()] & tables::KNIGHT_ATTACKS[sq.as_index()];
    atk |= pieces[idx][PieceType::King.as_index()] & tables::KING_ATTACKS[sq.as_index()];

    let bishop_attacks = tables::bishop_attacks(sq, occ);
    atk |= (pieces[idx][PieceType::Bishop.as_index()] | pieces[idx][PieceType::Queen.as_index()]) & bishop_attacks;

    let rook_attacks = tables::rook_attacks(sq, occ);
    atk |= (pieces[idx][PieceType::Rook.as_index()] | pieces[idx][PieceType::Queen.as_index()]) & rook_attacks;

    atk
}

fn least_valuable(pieces: &[[Bitboard; 6]; 2], side: Color, candidates: Bitboard) -> Option<(Square, PieceType)> {
    for piece_type in [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ] {
        let bb = pieces[side.as_index()][piece_type.as_index()] & candidates;
        if let Some(sq) = bb.lsb() {
            return Some((sq, piece_type));
        }
    }
    None
}

/// Static exchange value of playing `mv` on `position`, in centipawns from
/// the moving side's perspective. Zero for non-captures (and for en
/// passant, whose victim does not sit on the destination square in a way
/// this simulation models cleanly -- callers treat it as always-profitable
/// instead, matching its typically-small material stakes).
#[must_use]
pub fn see(position: &Position, mv: Move) -> i32 {
    if mv.is_en_passant() {
        return PieceType::Pawn.value();
    }
    let Some(victim) = position.piece_at(mv.dest()) else {
        return 0;
    };
    let Some(attacker) = position.piece_at(mv.origin()) else {
        return 0;
    };

    let mut pieces = [[Bitboard::EMPTY; 6]; 2];
    for color in [Color::White, Color::Black] {
        for piece_type in crate::piece::PIECE_TYPES {
            pieces[color.as_index()][piece_type.as_index()] = position.pieces_bb(color, piece_type);
        }
    }
    let mut occ = position.occupancy();

    let from_bb = Bitboard::from_square(mv.origin());
    let to_bb = Bitboard::from_square(mv.dest());

    pieces[attacker.color.as_index()][attacker.piece_type.as_index()] &= !from_bb;
    occ &= !from_bb;
    pieces[victim.color.as_index()][victim.piece_type.as_index()] &= !to_bb;
    occ &= !to_bb;
    pieces[attacker.color.as_index()][attacker.piece_type.as_index()] |= to_bb;
    occ |= to_bb;

    let mut gains = vec![victim.piece_type.value()];
    let mut side = victim.color;
    let mut last_attacker_value = attacker.piece_type.value();

    loop {
        let atks = attackers_to(mv.dest(), occ, &pieces, side);
        let Some((sq, piece_type)) = least_valuable(&pieces, side, atks) else {
            break;
        };
        gains.push(last_attacker_value - gains.last().copied().unwrap_or(0));
        last_attacker_value = piece_type.value();

        let mask = Bitboard::from_square(sq);
        pieces[side.as_index()][piece_type.as_index()] &= !mask;
        occ &= !mask;
        side = side.opposite();
    }

    // Unwind the forced-exchange sequence from the last capture backward:
    // at each ply the side to move either takes the previous gain or stops,
    // whichever is worse for the side one ply further back.
    for i in (0..gains.len().saturating_sub(1)).rev() {
        gains[i] = gains[i].min(-gains[i + 1]);
    }
    gains[0]
}

/// True if `see(mv) >= threshold`, the common pruning query -- avoids
/// building the full gains chain further than needed isn't worth the
/// complexity here since chains are at most 16 deep in legal chess.
#[must_use]
pub fn see_at_least(position: &Position, mv: Move, threshold: i32) -> bool {
    see(position, mv) >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pawn_takes_pawn_is_neutral() {
        let pos = Position::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - -").unwrap();
        let mv = Move::quiet(Square::E4, Square::D5);
        assert_eq!(see(&pos, mv), PieceType::Pawn.value());
    }

    #[test]
    fn queen_takes_defended_pawn_loses_material() {
        let pos = Position::from_fen("4k3/8/3p4/8/8/8/8/3QK3 w - -").unwrap();
        let mv = Move::quiet(Square::D1, Square::D6);
        assert_eq!(see(&pos, mv), PieceType::Pawn.value());
    }

    #[test]
    fn rook_takes_pawn_defended_by_pawn_loses_exchange() {
        let pos = Position::from_fen("4k3/8/2p5/3p4/8/3R4/8/4K3 w - -").unwrap();
        let mv = Move::quiet(Square::D3, Square::D5);
        let value = see(&pos, mv);
        assert!(value < 0, "expected a losing exchange, got {value}");
    }
}
