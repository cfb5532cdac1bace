//! Benchmarks for move generation, evaluation, and search throughput.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use corvid::engine::{compute_time_limit_ms, TimeControlInput};
use corvid::eval::{Evaluator, MaterialPstEvaluator};
use corvid::movegen::{generate_legal_moves, GenMode};
use corvid::position::Position;
use corvid::search::control::SearchControl;
use corvid::search::{iterative_deepening, SearchLimits, SearchState};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const MIDDLEGAME: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";

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

fn bench_perft(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");

    let startpos = Position::startpos();
    for depth in 1..=4 {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            b.iter(|| perft(&mut startpos.clone(), black_box(depth)))
        });
    }

    let kiwipete = Position::from_fen(KIWIPETE).unwrap();
    for depth in 1..=3 {
        group.bench_with_input(BenchmarkId::new("kiwipete", depth), &depth, |b, &depth| {
            b.iter(|| perft(&mut kiwipete.clone(), black_box(depth)))
        });
    }

    group.finish();
}

fn bench_movegen(c: &mut Criterion) {
    let mut group = c.benchmark_group("movegen");

    let startpos = Position::startpos();
    group.bench_function("startpos", |b| b.iter(|| black_box(generate_legal_moves(&startpos, GenMode::All))));

    let middlegame = Position::from_fen(MIDDLEGAME).unwrap();
    group.bench_function("middlegame", |b| b.iter(|| black_box(generate_legal_moves(&middlegame, GenMode::All))));

    let kiwipete = Position::from_fen(KIWIPETE).unwrap();
    group.bench_function("kiwipete", |b| b.iter(|| black_box(generate_legal_moves(&kiwipete, GenMode::All))));

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);

    for depth in [3, 4, 5] {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            b.iter(|| {
                let pos = Position::startpos();
                let mut state = SearchState::new(1);
                let mut eval = MaterialPstEvaluator::new();
                let control = SearchControl::new();
                control.reset(std::time::Instant::now(), 0);
                let limits = SearchLimits { depth: Some(depth), ..SearchLimits::default() };
                iterative_deepening(&mut state, &pos, &mut eval, &control, &limits, |_, _| {})
            })
        });
    }

    for depth in [3, 4] {
        let fen = "r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4";
        group.bench_with_input(BenchmarkId::new("tactical", depth), &depth, |b, &depth| {
            b.iter(|| {
                let pos = Position::from_fen(fen).unwrap();
                let mut state = SearchState::new(1);
                let mut eval = MaterialPstEvaluator::new();
                let control = SearchControl::new();
                control.reset(std::time::Instant::now(), 0);
                let limits = SearchLimits { depth: Some(depth), ..SearchLimits::default() };
                iterative_deepening(&mut state, &pos, &mut eval, &control, &limits, |_, _| {})
            })
        });
    }

    group.finish();
}

fn bench_eval(c: &mut Criterion) {
    let mut group = c.benchmark_group("eval");

    let positions = [
        ("startpos", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
        ("middlegame", MIDDLEGAME),
        ("endgame", "8/5k2/8/8/8/8/5K2/4R3 w - - 0 1"),
    ];

    for (name, fen) in positions {
        let pos = Position::from_fen(fen).unwrap();
        group.bench_with_input(BenchmarkId::new("position", name), &pos, |b, pos| {
            let mut eval = MaterialPstEvaluator::new();
            b.iter(|| black_box(eval.evaluate(pos)))
        });
    }

    group.finish();
}

fn bench_time_control(c: &mut Criterion) {
    c.bench_function("time_control/clock_mode", |b| {
        b.iter(|| {
            compute_time_limit_ms(&TimeControlInput {
                remaining_ms: Some(black_box(60_000)),
                increment_ms: 500,
                moves_to_go: None,
                phase: 20,
                extra_time_multiplier: 1.0,
                ..Default::default()
            })
        })
    });
}

criterion_group!(benches, bench_perft, bench_movegen, bench_search, bench_eval, bench_time_control);
criterion_main!(benches);
