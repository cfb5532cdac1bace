//! Precomputed attack, ray, and mask tables, plus magic-bitboard sliding
//! attacks for rooks and bishops.
//!
//! Magic numbers are found at process start by the classic random-sparse-
//! candidate search (try a candidate, verify it gives a collision-free
//! perfect hash over every occupancy subset of the relevant mask, keep
//! trying otherwise). The search is seeded, so it is deterministic across
//! runs; it is not a performance-critical path since it happens once.

use std::sync::LazyLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bitboard::Bitboard;
use crate::piece::Color;
use crate::square::{File, Rank, Square};

const ROOK_DELTAS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DELTAS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Ray-trace from `sq` in each of `deltas`, stopping at (and including) the
/// first occupied square.
fn sliding_attacks(sq: Square, occ: Bitboard, deltas: &[(i8, i8)]) -> Bitboard {
    let mut bb = Bitboard::EMPTY;
    for &(df, dr) in deltas {
        let mut cur = sq;
        while let Some(next) = cur.offset(df, dr) {
            bb.set(next);
            if occ.contains(next) {
                break;
            }
            cur = next;
        }
    }
    bb
}

/// The "relevant occupancy" mask for a slider on `sq`: every square a blocker
/// could occupy and still affect the attack set, i.e. every ray square
/// except the final (edge) one in each direction.
fn relevant_mask(sq: Square, deltas: &[(i8, i8)]) -> Bitboard {
    let mut bb = Bitboard::EMPTY;
    for &(df, dr) in deltas {
        let mut cur = sq;
        while let Some(next) = cur.offset(df, dr) {
            if next.offset(df, dr).is_some() {
                bb.set(next);
            }
            cur = next;
        }
    }
    bb
}

struct MagicEntry {
    mask: Bitboard,
    magic: u64,
    shift: u32,
    offset: usize,
}

pub struct MagicTable {
    entries: [MagicEntry; 64],
    attacks: Vec<Bitboard>,
}

impl MagicTable {
    #[inline]
    fn index(&self, sq: Square, occ: Bitboard) -> usize {
        let e = &self.entries[sq.as_index()];
        let relevant = occ.0 & e.mask.0;
        let idx = relevant.wrapping_mul(e.magic) >> e.shift;
        e.offset + idx as usize
    }

    #[inline]
    pub fn attacks(&self, sq: Square, occ: Bitboard) -> Bitboard {
        self.attacks[self.index(sq, occ)]
    }
}

/// Enumerate every subset of `mask`'s set bits via the carry-rippler trick.
fn subsets_of(mask: Bitboard) -> Vec<Bitboard> {
    let mut subsets = Vec::with_capacity(1 << mask.popcount());
    let mut subset: u64 = 0;
    loop {
        subsets.push(Bitboard(subset));
        if subset == mask.0 {
            break;
        }
        subset = subset.wrapping_sub(mask.0) & mask.0;
    }
    subsets
}

fn find_magic(sq: Square, deltas: &[(i8, i8)], rng: &mut StdRng) -> (u64, u32, Bitboard, Vec<Bitboard>) {
    let mask = relevant_mask(sq, deltas);
    let bits = mask.popcount();
    let shift = 64 - bits;
    let size = 1usize << bits;
    let subsets = subsets_of(mask);
    let reference: Vec<Bitboard> = subsets.iter().map(|&occ| sliding_attacks(sq, occ, deltas)).collect();

    loop {
        let magic: u64 = rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>();
        if ((mask.0.wrapping_mul(magic)) >> 56).count_ones() < 6 {
            continue;
        }
        let mut table = vec![None; size];
        let mut ok = true;
        for (occ, &attack) in subsets.iter().zip(reference.iter()) {
            let idx = (occ.0.wrapping_mul(magic) >> shift) as usize;
            match table[idx] {
                None => table[idx] = Some(attack),
                Some(existing) if existing == attack => {}
                Some(_) => {
                    ok = false;
                    break;
                }
            }
        }
        if ok {
            let filled: Vec<Bitboard> = table.into_iter().map(|v| v.unwrap_or(Bitboard::EMPTY)).collect();
            return (magic, shift, mask, filled);
        }
    }
}

fn build_magic_table(deltas: &'static [(i8, i8)], seed: u64) -> MagicTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut attacks = Vec::new();
    let mut entries: Vec<MagicEntry> = Vec::with_capacity(64);
    for idx in 0..64 {
        let sq = Square::from_index(idx);
        let (magic, shift, mask, table) = find_magic(sq, deltas, &mut rng);
        let offset = attacks.len();
        attacks.extend(table);
        entries.push(MagicEntry { mask, magic, shift, offset });
    }
    let entries: [MagicEntry; 64] = entries.try_into().unwrap_or_else(|_| unreachable!());
    MagicTable { entries, attacks }
}

pub static ROOK_MAGICS: LazyLock<MagicTable> =
    LazyLock::new(|| build_magic_table(&ROOK_DELTAS, 0x9E37_79B9_7F4A_7C15));
pub static BISHOP_MAGICS: LazyLock<MagicTable> =
    LazyLock::new(|| build_magic_table(&BISHOP_DELTAS, 0xBF58_476D_1CE4_E5B9));

#[inline]
#[must_use]
pub fn rook_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    ROOK_MAGICS.attacks(sq, occ)
}

#[inline]
#[must_use]
pub fn bishop_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    BISHOP_MAGICS.attacks(sq, occ)
}

#[inline]
#[must_use]
pub fn queen_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    rook_attacks(sq, occ) | bishop_attacks(sq, occ)
}

fn step_attacks(deltas: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    for idx in 0..64 {
        let sq = Square::from_index(idx);
        let mut bb = Bitboard::EMPTY;
        for &(df, dr) in deltas {
            if let Some(to) = sq.offset(df, dr) {
                bb.set(to);
            }
        }
        table[idx] = bb;
    }
    table
}

const KNIGHT_DELTAS: [(i8, i8); 8] =
    [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)];
const KING_DELTAS: [(i8, i8); 8] =
    [(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1)];

pub static KNIGHT_ATTACKS: LazyLock<[Bitboard; 64]> = LazyLock::new(|| step_attacks(&KNIGHT_DELTAS));
pub static KING_ATTACKS: LazyLock<[Bitboard; 64]> = LazyLock::new(|| step_attacks(&KING_DELTAS));

pub static PAWN_ATTACKS: LazyLock<[[Bitboard; 64]; 2]> = LazyLock::new(|| {
    [
        step_attacks(&[(1, 1), (-1, 1)]),   // White
        step_attacks(&[(1, -1), (-1, -1)]), // Black
    ]
});

#[inline]
#[must_use]
pub fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    PAWN_ATTACKS[color.as_index()][sq.as_index()]
}

/// `BETWEEN[a][b]`: squares strictly between `a` and `b` if they share a
/// rank, file, or diagonal; empty otherwise.
pub static BETWEEN: LazyLock<[[Bitboard; 64]; 64]> = LazyLock::new(|| {
    let mut table = [[Bitboard::EMPTY; 64]; 64];
    let dirs: [(i8, i8); 8] = [(1, 0), (-1, 0), (0, 1), (0, -1), (1, 1), (1, -1), (-1, 1), (-1, -1)];
    for a_idx in 0..64 {
        let a = Square::from_index(a_idx);
        for &(df, dr) in &dirs {
            let mut bb = Bitboard::EMPTY;
            let mut cur = a;
            while let Some(next) = cur.offset(df, dr) {
                table[a_idx][next.as_index()] = bb;
                bb.set(next);
                cur = next;
            }
        }
    }
    table
});

#[inline]
#[must_use]
pub fn between(a: Square, b: Square) -> Bitboard {
    BETWEEN[a.as_index()][b.as_index()]
}

/// Full ray from `sq` toward the edge in each of 8 directions, excluding
/// `sq` itself. Indexed N, NE, E, SE, S, SW, W, NW.
pub static RAYS: LazyLock<[[Bitboard; 8]; 64]> = LazyLock::new(|| {
    let dirs: [(i8, i8); 8] = [(0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1)];
    let mut table = [[Bitboard::EMPTY; 8]; 64];
    for idx in 0..64 {
        let sq = Square::from_index(idx);
        for (d, &(df, dr)) in dirs.iter().enumerate() {
            let mut bb = Bitboard::EMPTY;
            let mut cur = sq;
            while let Some(next) = cur.offset(df, dr) {
                bb.set(next);
                cur = next;
            }
            table[idx][d] = bb;
        }
    }
    table
});

pub static PASSED_PAWN_MASK: LazyLock<[[Bitboard; 64]; 2]> = LazyLock::new(|| {
    let mut out = [[Bitboard::EMPTY; 64]; 2];
    for idx in 0..64 {
        let sq = Square::from_index(idx);
        for color in [Color::White, Color::Black] {
            let mut bb = Bitboard::EMPTY;
            let dr: i8 = if color == Color::White { 1 } else { -1 };
            let mut rank = sq.rank().0 as i8 + dr;
            while (0..8).contains(&rank) {
                for df in [-1i8, 0, 1] {
                    let file = sq.file().0 as i8 + df;
                    if (0..8).contains(&file) {
                        bb.set(Square::new(File(file as u8), Rank(rank as u8)));
                    }
                }
                rank += dr;
            }
            out[color.as_index()][idx] = bb;
        }
    }
    out
});

/// Squares that must be empty, and squares the king passes through and must
/// not be attacked, for castling on `color`'s kingside/queenside.
pub struct CastlePath {
    pub empty: Bitboard,
    pub king_path: [Square; 3], // origin, transit, dest - all must be unattacked
}

#[must_use]
pub fn castle_path(color: Color, kingside: bool) -> CastlePath {
    match (color, kingside) {
        (Color::White, true) => CastlePath {
            empty: Bitboard(0x60), // f1, g1
            king_path: [Square::E1, Square::from_index(5), Square::from_index(6)],
        },
        (Color::White, false) => CastlePath {
            empty: Bitboard(0x0E), // b1, c1, d1
            king_path: [Square::E1, Square::from_index(3), Square::from_index(2)],
        },
        (Color::Black, true) => CastlePath {
            empty: Bitboard(0x60 << 56),
            king_path: [Square::E8, Square::from_index(61), Square::from_index(62)],
        },
        (Color::Black, false) => CastlePath {
            empty: Bitboard(0x0E << 56),
            king_path: [Square::E8, Square::from_index(59), Square::from_index(58)],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rook_attacks_open_board_from_a1() {
        let attacks = rook_attacks(Square::A1, Bitboard::EMPTY);
        assert_eq!(attacks.popcount(), 14);
    }

    #[test]
    fn rook_attacks_blocked_by_occupant() {
        let occ = Bitboard::from_square(Square::A4);
        let attacks = rook_attacks(Square::A1, occ);
        assert!(attacks.contains(Square::A4));
        assert!(!attacks.contains(Square::from_index(Square::A4.as_index() + 8)));
    }

    #[test]
    fn bishop_attacks_open_board_from_d4() {
        let sq = "d4".parse::<Square>().unwrap();
        let attacks = bishop_attacks(sq, Bitboard::EMPTY);
        assert_eq!(attacks.popcount(), 13);
    }

    #[test]
    fn knight_attacks_from_corner() {
        assert_eq!(KNIGHT_ATTACKS[Square::A1.as_index()].popcount(), 2);
    }

    #[test]
    fn king_attacks_from_corner() {
        assert_eq!(KING_ATTACKS[Square::A1.as_index()].popcount(), 3);
    }

    #[test]
    fn between_is_empty_for_non_aligned_squares() {
        assert!(between(Square::A1, Square::from_index(10)).is_empty() || Square::A1.as_index() == 10);
    }

    #[test]
    fn between_a1_a8_is_the_six_middle_squares() {
        assert_eq!(between(Square::A1, Square::A8).popcount(), 6);
    }

    #[test]
    fn queen_attacks_is_union_of_rook_and_bishop() {
        let sq = Square::E4;
        let occ = Bitboard::EMPTY;
        assert_eq!(queen_attacks(sq, occ), rook_attacks(sq, occ) | bishop_attacks(sq, occ));
    }
}
