//! Translating between textual move notations and the legal moves of a
//! position. Both parsers work by generating legal moves and matching
//! against them, rather than constructing a `Move` speculatively, so a
//! parsed move is always known-legal or rejected.

use super::{generate_legal_moves, GenMode};
use crate::error::MoveParseError;
use crate::piece::PieceType;
use crate::position::Position;
use crate::r#move::Move;
use crate::square::Square;

/// Parses a UCI long-algebraic move (`e2e4`, `e7e8q`) against `position`'s
/// legal moves.
pub fn move_from_uci(position: &Position, text: &str) -> Result<Move, MoveParseError> {
    let text = text.trim();
    if text.len() < 4 || text.len() > 5 {
        return Err(MoveParseError::Malformed(text.to_string()));
    }
    let origin: Square = text[0..2].parse().map_err(|_| MoveParseError::Malformed(text.to_string()))?;
    let dest: Square = text[2..4].parse().map_err(|_| MoveParseError::Malformed(text.to_string()))?;
    let promo = if text.len() == 5 {
        Some(PieceType::from_char(text.as_bytes()[4] as char).ok_or_else(|| MoveParseError::Malformed(text.to_string()))?)
    } else {
        None
    };

    let legal = generate_legal_moves(position, GenMode::All);
    let found = legal.iter().find(|mv| {
        mv.origin() == origin && mv.dest() == dest && mv.promotion_piece() == promo
    });
    found.copied().ok_or_else(|| MoveParseError::NotLegal(text.to_string()))
}

/// Parses a (possibly check/mate-annotated) SAN move against `position`'s
/// legal moves. Disambiguation is resolved by filtering on origin file/rank
/// hints; an unresolved ambiguity is reported rather than guessed at.
pub fn move_from_san(position: &Position, text: &str) -> Result<Move, MoveParseError> {
    let trimmed = text.trim();
    let without_ep = trimmed.strip_suffix("e.p.").map(str::trim_end).unwrap_or(trimmed);
    let cleaned = without_ep.trim_end_matches(['+', '#']);
    if cleaned == "O-O" || cleaned == "0-0" {
        return find_castling(position, true);
    }
    if cleaned == "O-O-O" || cleaned == "0-0-0" {
        return find_castling(position, false);
    }

    let (piece_type, rest) = match cleaned.chars().next() {
        Some(c @ ('N' | 'B' | 'R' | 'Q' | 'K')) => (PieceType::from_char(c).unwrap(), &cleaned[1..]),
        _ => (PieceType::Pawn, cleaned),
    };

    let rest = rest.trim_start_matches('x');
    let (disambig, promo, dest_str) = split_san_tail(rest);
    let dest: Square = dest_str.parse().map_err(|_| MoveParseError::Malformed(text.to_string()))?;

    let legal = generate_legal_moves(position, GenMode::All);
    let mut candidates: Vec<Move> = legal
        .iter()
        .copied()
        .filter(|mv| {
            mv.dest() == dest
                && position
                    .piece_at(mv.origin())
                    .map(|p| p.piece_type == piece_type)
                    .unwrap_or(false)
                && mv.promotion_piece() == promo
        })
        .collect();

    if disambig.len() == 1 {
        let c = disambig.chars().next().unwrap();
        candidates.retain(|mv| {
            if c.is_ascii_digit() {
                mv.origin().rank().as_index() + 1 == c.to_digit(10).unwrap() as usize
            } else {
                mv.origin().file().as_index() == (c as u8 - b'a') as usize
            }
        });
    } else if disambig.len() == 2 {
        if let Ok(origin) = disambig.parse::<Square>() {
            candidates.retain(|mv| mv.origin() == origin);
        }
    }

    match candidates.len() {
        0 => Err(MoveParseError::NotLegal(text.to_string())),
        1 => Ok(candidates[0]),
        _ => Err(MoveParseError::Ambiguous(text.to_string())),
    }
}

fn split_san_tail(rest: &str) -> (String, Option<PieceType>, &str) {
    if let Some(eq_pos) = rest.find('=') {
        let promo = PieceType::from_char(rest.as_bytes()[eq_pos + 1] as char);
        let (head, _) = rest.split_at(eq_pos);
        split_disambig(head, promo)
    } else if let Some(last) = rest.chars().last().filter(|c| matches!(*c, 'N' | 'B' | 'R' | 'Q') && rest.len() > 2) {
        // Trailing promotion-piece letter with no `=` (e.g. "e8Q"). A real
        // destination square always ends in a digit, so this is unambiguous.
        let promo = PieceType::from_char(last);
        split_disambig(&rest[..rest.len() - 1], promo)
    } else {
        split_disambig(rest, None)
    }
}

fn split_disambig(head: &str, promo: Option<PieceType>) -> (String, Option<PieceType>, &str) {
    if head.len() > 2 {
        let (disambig, dest) = head.split_at(head.len() - 2);
        (disambig.to_string(), promo, dest)
    } else {
        (String::new(), promo, head)
    }
}

fn find_castling(position: &Position, kingside: bool) -> Result<Move, MoveParseError> {
    let legal = generate_legal_moves(position, GenMode::All);
    legal
        .iter()
        .find(|mv| {
            mv.is_castling() && {
                let king_file = mv.dest().file().as_index();
                (kingside && king_file == 6) || (!kingside && king_file == 2)
            }
        })
        .copied()
        .ok_or_else(|| MoveParseError::NotLegal("castling not legal".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uci_parses_simple_pawn_push() {
        let pos = Position::startpos();
        let mv = move_from_uci(&pos, "e2e4").unwrap();
        assert_eq!(mv.origin(), "e2".parse::<Square>().unwrap());
        assert_eq!(mv.dest(), "e4".parse::<Square>().unwrap());
    }

    #[test]
    fn uci_rejects_illegal_move() {
        let pos = Position::startpos();
        assert!(move_from_uci(&pos, "e2e5").is_err());
    }

    #[test]
    fn san_parses_knight_development() {
        let pos = Position::startpos();
        let mv = move_from_san(&pos, "Nf3").unwrap();
        assert_eq!(mv.dest(), "f3".parse::<Square>().unwrap());
    }

    #[test]
    fn san_parses_kingside_castle() {
        let pos = Position::from_fen("r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQK2R w KQkq -").unwrap();
        let mv = move_from_san(&pos, "O-O").unwrap();
        assert!(mv.is_castling());
    }

    #[test]
    fn san_parses_trailing_promotion_letter_without_equals() {
        let pos = Position::from_fen("8/P7/8/8/8/8/8/k6K w - - 0 1").unwrap();
        let mv = move_from_san(&pos, "a8Q").unwrap();
        assert_eq!(mv.promotion_piece(), Some(PieceType::Queen));
    }

    #[test]
    fn san_parses_en_passant_suffix() {
        let pos = Position::from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1").unwrap();
        let mv = move_from_san(&pos, "dxe3 e.p.").unwrap();
        assert!(mv.is_en_passant());
    }
}
