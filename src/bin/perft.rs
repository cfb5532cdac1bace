//! Standalone perft driver: `perft [fen] <depth>` (FEN defaults to the
//! start position), printing node counts and a root-move divide, the way
//! `perft_divide` did for the old board representation.

use std::env;
use std::time::Instant;

use corvid::movegen::{generate_legal_moves, GenMode};
use corvid::position::Position;

fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = generate_legal_moves(pos, GenMode::All);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for mv in moves.iter() {
        pos.make_move(*mv);
        nodes += perft(pos, depth - 1);
        pos.unmake_move(*mv);
    }
    nodes
}

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().skip(1).collect();

    let (fen, depth) = match args.len() {
        0 => {
            eprintln!("usage: perft [fen] <depth>");
            std::process::exit(1);
        }
        1 => (None, args[0].parse::<u32>().expect("depth must be an integer")),
        _ => {
            let depth = args.last().unwrap().parse::<u32>().expect("depth must be an integer");
            (Some(args[..args.len() - 1].join(" ")), depth)
        }
    };

    let mut pos = match fen {
        Some(f) => Position::from_fen(&f).unwrap_or_else(|e| panic!("invalid fen '{f}': {e}")),
        None => Position::startpos(),
    };

    println!("perft divide, depth {depth}");
    let start = Instant::now();

    if depth == 0 {
        println!("total: 1 nodes in {:?}", start.elapsed());
        return;
    }

    let moves = generate_legal_moves(&pos, GenMode::All);
    let mut total = 0u64;
    for mv in moves.iter() {
        pos.make_move(*mv);
        let count = perft(&mut pos, depth - 1);
        pos.unmake_move(*mv);
        println!("  {mv}: {count}");
        total += count;
    }
    let elapsed = start.elapsed();
    println!("total: {total} nodes in {elapsed:?}");
}
