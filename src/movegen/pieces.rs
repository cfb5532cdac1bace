//! Per-piece-type pseudo-legal move emitters. Each function appends moves
//! directly onto the caller's buffer instead of returning a fresh `Vec`, so
//! a full generation pass allocates exactly one `MoveList`.

use super::GenMode;
use crate::bitboard::Bitboard;
use crate::piece::{Color, PieceType};
use crate::position::Position;
use crate::r#move::{Move, MoveList};
use crate::square::{Rank, Square};
use crate::tables;

fn target_mask(pos: &Position, us: Color, mode: GenMode, evasion: Option<Bitboard>) -> Bitboard {
    let not_own = !pos.color_occupancy(us);
    let base = match mode {
        GenMode::All => not_own,
        GenMode::NonQuiet => pos.color_occupancy(us.opposite()),
        GenMode::Quiet => not_own & !pos.color_occupancy(us.opposite()),
    };
    match evasion {
        Some(restrict) => base & restrict,
        None => base,
    }
}

pub fn generate_knight_moves(pos: &Position, moves: &mut MoveList, mode: GenMode, evasion: Option<Bitboard>) {
    let us = pos.side_to_move();
    let targets = target_mask(pos, us, mode, evasion);
    let mut knights = pos.pieces_bb(us, PieceType::Knight);
    while let Some(from) = knights.pop_lsb() {
        let attacks = tables::KNIGHT_ATTACKS[from.as_index()] & targets;
        for to in attacks.iter() {
            moves.push(Move::quiet(from, to));
        }
    }
}

pub fn generate_king_moves(pos: &Position, moves: &mut MoveList, mode: GenMode, _not_in_check: bool) {
    let us = pos.side_to_move();
    let targets = target_mask(pos, us, mode, None);
    let from = pos.king_square(us);
    let attacks = tables::KING_ATTACKS[from.as_index()] & targets;
    for to in attacks.iter() {
        moves.push(Move::quiet(from, to));
    }
}

pub fn generate_slider_moves(
    pos: &Position,
    moves: &mut MoveList,
    mode: GenMode,
    evasion: Option<Bitboard>,
    piece_type: PieceType,
) {
    let us = pos.side_to_move();
    let targets = target_mask(pos, us, mode, evasion);
    let occ = pos.occupancy();
    let mut pieces = pos.pieces_bb(us, piece_type);
    while let Some(from) = pieces.pop_lsb() {
        let attacks = match piece_type {
            PieceType::Bishop => tables::bishop_attacks(from, occ),
            PieceType::Rook => tables::rook_attacks(from, occ),
            PieceType::Queen => tables::queen_attacks(from, occ),
            _ => unreachable!("generate_slider_moves called with a non-slider piece type"),
        } & targets;
        for to in attacks.iter() {
            moves.push(Move::quiet(from, to));
        }
    }
}

pub fn generate_pawn_moves(pos: &Position, moves: &mut MoveList, mode: GenMode, evasion: Option<Bitboard>) {
    let us = pos.side_to_move();
    let them = us.opposite();
    let occ = pos.occupancy();
    let enemy = pos.color_occupancy(them);
    let promo_rank = us.promotion_rank();
    let mut pawns = pos.pieces_bb(us, PieceType::Pawn);

    while let Some(from) = pawns.pop_lsb() {
        // Pushes.
        if mode != GenMode::NonQuiet {
            if let Some(one) = push_square(from, us) {
                if !occ.contains(one) {
                    emit_pawn_move(moves, from, one, promo_rank, evasion);
                    if from.rank() == start_rank(us) {
                        if let Some(two) = push_square(one, us) {
                            if !occ.contains(two) && allowed(two, evasion) {
                                moves.push(Move::quiet(from, two));
                            }
                        }
                    }
                }
            }
        }

        // Captures (including promotion-captures) and en passant.
        if mode != GenMode::Quiet {
            let attacks = tables::pawn_attacks(us, from);
            for to in (attacks & enemy).iter() {
                emit_pawn_move(moves, from, to, promo_rank, evasion);
            }
            if let Some(ep) = pos.ep_square() {
                if attacks.contains(ep) && ep_evasion_allowed(ep, us, evasion) {
                    moves.push(Move::en_passant(from, ep));
                }
            }
        }
    }
}

/// En passant can evade check either by landing on a blocking square or by
/// capturing the checking pawn itself, which sits one rank behind `ep`, not
/// on `ep` -- so the destination-only `evasion` mask isn't enough on its own.
fn ep_evasion_allowed(ep: Square, us: Color, evasion: Option<Bitboard>) -> bool {
    match evasion {
        Some(mask) => {
            let captured_sq = push_square(ep, us.opposite()).unwrap_or(ep);
            mask.contains(ep) || mask.contains(captured_sq)
        }
        None => true,
    }
}

fn allowed(sq: Square, evasion: Option<Bitboard>) -> bool {
    match evasion {
        Some(mask) => mask.contains(sq),
        None => true,
    }
}

fn emit_pawn_move(moves: &mut MoveList, from: Square, to: Square, promo_rank: Rank, evasion: Option<Bitboard>) {
    if !allowed(to, evasion) {
        return;
    }
    if to.rank() == promo_rank {
        for piece_type in [PieceType::Queen, PieceType::Knight, PieceType::Rook, PieceType::Bishop] {
            moves.push(Move::promotion(from, to, piece_type));
        }
    } else {
        moves.push(Move::quiet(from, to));
    }
}

fn push_square(sq: Square, color: Color) -> Option<Square> {
    let idx = sq.as_index() as i32 + color.pawn_push() as i32;
    if (0..64).contains(&idx) {
        Some(Square::from_index(idx as u8))
    } else {
        None
    }
}

fn start_rank(color: Color) -> Rank {
    match color {
        Color::White => Rank(1),
        Color::Black => Rank(6),
    }
}
