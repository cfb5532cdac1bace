//! Core of a UCI-compatible chess engine: board representation, move
//! generation, search, and transposition table.
//!
//! The UCI text protocol, opening book, and evaluation weights live at the
//! edges of this crate (`uci`, `engine`) and are thin observers over the
//! core described in `position`, `movegen`, `search`, and `tt`.

pub mod bitboard;
pub mod castling;
pub mod engine;
pub mod error;
pub mod eval;
pub mod r#move;
pub mod movegen;
pub mod piece;
pub mod position;
pub mod see;
pub mod search;
pub mod square;
pub mod tables;
pub mod tt;
pub mod types;
pub mod uci;
pub mod zobrist;

pub use bitboard::Bitboard;
pub use castling::CastlingRights;
pub use error::{EngineError, FenError, MoveParseError};
pub use piece::{Color, Piece, PieceType};
pub use position::Position;
pub use r#move::{Move, MoveType};
pub use square::{File, Rank, Square};
pub use types::{Depth, Value};
