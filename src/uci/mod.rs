//! The Universal Chess Interface loop: a thin, synchronous reader of stdin
//! that drives an [`EngineController`] and writes `info`/`bestmove` lines
//! back to stdout. Nothing here touches the board, move generator, or
//! search directly -- that boundary is `EngineController`'s job, so this
//! module stays a translation layer between text and the engine API.

pub mod command;
pub mod options;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use log::{debug, info, warn};

use crate::engine::{EngineController, SearchParams};
use crate::movegen::move_from_uci;
use crate::position::Position;
use crate::r#move::Move;
use crate::search::{SearchLimits, SearchResult, SearchStats};
use crate::types::{is_mate_score, CHECKMATE, MAX_PLY};

use command::{parse_uci_command, GoParams, UciCommand};

const DEFAULT_HASH_MB: usize = 16;
const MAX_DEPTH: u32 = MAX_PLY as u32;

/// Runs the UCI loop to completion (`quit`, or stdin closing). Blocks the
/// calling thread; all searching happens on the worker thread that
/// `EngineController::start_search` spawns internally.
pub fn run() {
    let mut controller = EngineController::new(DEFAULT_HASH_MB);
    controller.set_info_callback(Some(Arc::new(report_iteration) as Arc<dyn Fn(&SearchStats, &SearchResult) + Send + Sync>));

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!("stdin read error: {e}");
                break;
            }
        };

        match parse_uci_command(&line) {
            UciCommand::Uci => {
                println!("id name corvid");
                println!("id author the corvid authors");
                options::print_options(DEFAULT_HASH_MB);
                println!("uciok");
            }
            UciCommand::IsReady => {
                let _ = controller.is_ready();
                println!("readyok");
            }
            UciCommand::UciNewGame => {
                if let Err(e) = controller.new_game() {
                    warn!("ucinewgame: {e}");
                }
            }
            UciCommand::Position(parts) => {
                if let Err(e) = apply_position_command(&mut controller, &parts) {
                    println!("info string {e}");
                }
            }
            UciCommand::Go(params) => {
                if let Err(e) = start_go(&mut controller, params) {
                    println!("info string {e}");
                }
            }
            UciCommand::Stop => {
                if let Err(e) = controller.stop_search() {
                    debug!("stop: {e}");
                }
            }
            UciCommand::PonderHit => {
                if let Err(e) = controller.ponderhit() {
                    debug!("ponderhit: {e}");
                }
            }
            UciCommand::SetOption { name, value } => {
                if let Err(e) = options::apply(&mut controller, &name, value.as_deref()) {
                    println!("info string {e}");
                }
            }
            UciCommand::Debug(on) => {
                debug!("debug mode set to {on}");
            }
            UciCommand::Quit => {
                if controller.is_searching() {
                    let _ = controller.stop_search();
                }
                break;
            }
            UciCommand::Unknown(text) => {
                if !text.is_empty() {
                    info!("ignoring unrecognized command: {text}");
                }
            }
        }

        let _ = stdout.flush();
    }
}

/// `position [startpos|fen f1 .. f6] [moves m1 m2 ...]`. `parts[0]` is
/// always `"position"`.
fn apply_position_command(controller: &mut EngineController, parts: &[String]) -> Result<(), String> {
    let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
    let mut i = 1;
    if i >= parts.len() {
        return Err("position: missing startpos/fen".to_string());
    }

    let mut position = if parts[i] == "startpos" {
        i += 1;
        Position::startpos()
    } else if parts[i] == "fen" {
        if i + 6 >= parts.len() {
            return Err("position fen: missing fields".to_string());
        }
        let fen = parts[i + 1..i + 7].join(" ");
        i += 7;
        Position::from_fen(&fen).map_err(|e| format!("invalid fen: {e}"))?
    } else {
        return Err(format!("position: expected startpos or fen, got {}", parts[i]));
    };

    if i < parts.len() && parts[i] == "moves" {
        i += 1;
        while i < parts.len() {
            match move_from_uci(&position, parts[i]) {
                Ok(mv) => position.make_move(mv),
                Err(e) => return Err(format!("invalid move '{}': {e}", parts[i])),
            }
            i += 1;
        }
    }

    controller.set_position(position).map_err(|e| e.to_string())
}

/// Validates and starts a `go` command. Rejections (bad depth/mate bounds,
/// a search already running) are reported as `info string` and the search
/// is simply not started, per the core's "state-mismatch and limit
/// violations are not exceptions" policy.
fn start_go(controller: &mut EngineController, go: GoParams) -> Result<(), String> {
    if let Some(d) = go.depth {
        if d == 0 || d > MAX_DEPTH {
            return Err(format!("depth {d} outside [1, {MAX_DEPTH}]"));
        }
    }
    if let Some(m) = go.mate {
        if m == 0 || m > MAX_DEPTH {
            return Err(format!("mate {m} outside [1, {MAX_DEPTH}]"));
        }
    }
    if !go.infinite && !go.ponder && go.depth.is_none() && go.nodes.is_none() && go.movetime.is_none() && go.mate.is_none() && go.wtime.is_none() && go.btime.is_none() {
        return Err("go: no depth/nodes/movetime/mate/clock given and neither infinite nor ponder".to_string());
    }

    let position = controller.position().clone();
    let mut search_moves = None;
    if !go.search_moves.is_empty() {
        let mut resolved = Vec::with_capacity(go.search_moves.len());
        for text in &go.search_moves {
            resolved.push(move_from_uci(&position, text).map_err(|e| format!("searchmoves: invalid move '{text}': {e}"))?);
        }
        search_moves = Some(resolved);
    }

    // "mate N" is accepted as a depth budget (N full moves of plies) rather
    // than a dedicated proof-search mode; the recursive search still just
    // reports a mate score when it finds one within that horizon.
    let depth = match (go.depth, go.mate) {
        (Some(d), Some(m)) => Some(d.min(m.saturating_mul(2))),
        (Some(d), None) => Some(d),
        (None, Some(m)) => Some(m.saturating_mul(2)),
        (None, None) => None,
    };

    let limits = SearchLimits {
        depth: depth.map(|d| d as i32),
        nodes: go.nodes,
        move_time_ms: go.movetime,
        white_time_ms: None,
        black_time_ms: None,
        white_inc_ms: None,
        black_inc_ms: None,
        moves_to_go: go.movestogo,
        mate: go.mate,
        infinite: go.infinite,
        ponder: go.ponder,
        search_moves,
    };

    let params = SearchParams {
        limits,
        white_time_ms: go.wtime,
        black_time_ms: go.btime,
        white_inc_ms: go.winc.unwrap_or(0),
        black_inc_ms: go.binc.unwrap_or(0),
    };

    controller.start_search(params, report_bestmove).map_err(|e| e.to_string())
}

fn report_bestmove(result: SearchResult) {
    if result.best_move.is_none() {
        println!("bestmove 0000");
        return;
    }
    match result.ponder_move {
        Some(ponder) if !ponder.is_none() => println!("bestmove {} ponder {}", result.best_move, ponder),
        _ => println!("bestmove {}", result.best_move),
    }
    let _ = io::stdout().flush();
}

/// Runs once per completed iterative-deepening depth -- the search core has
/// no mid-node callback hook, so this is also the natural throttle point
/// for `info` lines: one completed depth is always coarser than any
/// node/time-based throttle would be.
fn report_iteration(stats: &SearchStats, result: &SearchResult) {
    let mut line = format!("info depth {} seldepth {} multipv 1", result.depth, stats.current_seldepth);
    line.push_str(&format!(" score {}", format_score(result.score)));
    line.push_str(&format!(" nodes {}", result.nodes));
    line.push_str(&format!(" nps {}", nodes_per_second(result.nodes, result.time_ms)));
    line.push_str(&format!(" time {}", result.time_ms));
    if !result.pv.is_empty() {
        line.push_str(" pv ");
        line.push_str(&format_pv(&result.pv));
    }
    println!("{line}");
}

fn format_pv(pv: &[Move]) -> String {
    pv.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
}

fn nodes_per_second(nodes: u64, time_ms: u64) -> u64 {
    if time_ms == 0 {
        nodes.saturating_mul(1000)
    } else {
        nodes.saturating_mul(1000) / time_ms
    }
}

fn format_score(value: i32) -> String {
    if is_mate_score(value) {
        let plies_to_mate = CHECKMATE - value.abs();
        let moves_to_mate = (plies_to_mate + 1) / 2;
        let signed = if value > 0 { moves_to_mate } else { -moves_to_mate };
        format!("mate {signed}")
    } else {
        format!("cp {value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_score_reports_centipawns_for_ordinary_values() {
        assert_eq!(format_score(37), "cp 37");
        assert_eq!(format_score(-120), "cp -120");
    }

    #[test]
    fn format_score_reports_positive_mate_distance() {
        assert_eq!(format_score(CHECKMATE - 1), "mate 1");
    }

    #[test]
    fn format_score_reports_negative_mate_distance() {
        assert_eq!(format_score(-(CHECKMATE - 3)), "mate -2");
    }

    #[test]
    fn nodes_per_second_handles_zero_elapsed_time() {
        assert_eq!(nodes_per_second(12_345, 0), 12_345_000);
    }
}
