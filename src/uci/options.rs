//! The `setoption`-visible knob table. `print_options` emits the
//! `option name ... type ...` lines `uci` is required to answer with;
//! `apply` routes a parsed name/value pair to the engine controller or
//! straight into `SearchOptions`.

use crate::engine::EngineController;
use crate::search::SearchOptions;

const MAX_HASH_MB: usize = 65536;

fn print_spin(name: &str, default: impl std::fmt::Display, min: impl std::fmt::Display, max: impl std::fmt::Display) {
    println!("option name {name} type spin default {default} min {min} max {max}");
}

fn print_check(name: &str, default: bool) {
    println!("option name {name} type check default {}", if default { "true" } else { "false" });
}

fn print_button(name: &str) {
    println!("option name {name} type button");
}

/// Prints every option this core recognizes, in the order `setoption name
/// X` is documented. `hash_mb` reflects the table size the controller was
/// constructed with; the boolean/numeric defaults come straight from
/// `SearchOptions::default()` so the two never drift apart.
pub fn print_options(hash_mb: usize) {
    let defaults = SearchOptions::default();

    print_spin("Hash", hash_mb, 1, MAX_HASH_MB);
    print_button("Clear Hash");
    print_check("OwnBook", false);
    print_check("Ponder", false);

    print_check("Use AlphaBeta", defaults.use_alpha_beta);
    print_check("Use Pvs", defaults.use_pvs);
    print_check("Use Aspiration", defaults.use_aspiration);

    print_check("Use Hash", defaults.use_hash);
    print_check("Use Hash Value", defaults.use_hash_value);
    print_check("Use Hash PvMove", defaults.use_hash_pv_move);
    print_check("Use Hash Quiescence", defaults.use_hash_quiescence);
    print_check("Use Hash Eval", defaults.use_hash_eval);

    print_check("Use Killer Moves", defaults.use_killer_moves);
    print_check("Use History Moves", defaults.use_history_moves);
    print_check("Use History Counter", defaults.use_history_counter);

    print_check("Use Mate Distance Pruning", defaults.use_mate_distance_pruning);

    print_check("Use Quiescence", defaults.use_quiescence);
    print_check("Use Quiescence Standpat", defaults.use_quiescence_standpat);
    print_check("Use Quiescence SEE", defaults.use_quiescence_see);

    print_check("Use Razoring", defaults.use_razoring);
    print_spin("Razor Margin", defaults.razor_margin, 50, 1000);

    print_check("Use Reverse Futility Pruning", defaults.use_reverse_futility_pruning);

    print_check("Use Null Move Pruning", defaults.use_null_move_pruning);
    print_spin("Null Move Depth", defaults.null_move_depth, 1, 10);
    print_spin("Null Depth Reduction", defaults.null_depth_reduction, 1, 5);

    print_check("Use IID", defaults.use_iid);
    print_spin("IID Move Depth", defaults.iid_move_depth, 3, 12);
    print_spin("IID Depth Reduction", defaults.iid_depth_reduction, 1, 5);
}

/// Applies one `setoption name X [value V]` pair. Errors are returned as
/// plain strings for the caller to forward as `info string`; nothing here
/// panics on a bad value, it just leaves the option unchanged.
pub fn apply(controller: &mut EngineController, name: &str, value: Option<&str>) -> Result<(), String> {
    let normalized = name.trim().to_ascii_lowercase();
    let as_bool = |v: Option<&str>| v.is_some_and(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1"));

    match normalized.as_str() {
        "hash" => {
            let mb = value.and_then(|v| v.parse::<usize>().ok()).unwrap_or(16).clamp(1, MAX_HASH_MB);
            controller.resize_hash(mb).map_err(|e| format!("{e}"))
        }
        "clear hash" => controller.clear_hash().map_err(|e| format!("{e}")),
        "ownbook" => {
            controller.set_own_book(as_bool(value));
            Ok(())
        }
        "ponder" => {
            controller.set_ponder_allowed(as_bool(value));
            Ok(())
        }
        "use alphabeta" => set(controller, |o| o.use_alpha_beta = as_bool(value)),
        "use pvs" => set(controller, |o| o.use_pvs = as_bool(value)),
        "use aspiration" => set(controller, |o| o.use_aspiration = as_bool(value)),
        "use hash" => set(controller, |o| o.use_hash = as_bool(value)),
        "use hash value" => set(controller, |o| o.use_hash_value = as_bool(value)),
        "use hash pvmove" => set(controller, |o| o.use_hash_pv_move = as_bool(value)),
        "use hash quiescence" => set(controller, |o| o.use_hash_quiescence = as_bool(value)),
        "use hash eval" => set(controller, |o| o.use_hash_eval = as_bool(value)),
        "use killer moves" => set(controller, |o| o.use_killer_moves = as_bool(value)),
        "use history moves" => set(controller, |o| o.use_history_moves = as_bool(value)),
        "use history counter" => set(controller, |o| o.use_history_counter = as_bool(value)),
        "use mate distance pruning" => set(controller, |o| o.use_mate_distance_pruning = as_bool(value)),
        "use quiescence" => set(controller, |o| o.use_quiescence = as_bool(value)),
        "use quiescence standpat" => set(controller, |o| o.use_quiescence_standpat = as_bool(value)),
        "use quiescence see" => set(controller, |o| o.use_quiescence_see = as_bool(value)),
        "use razoring" => set(controller, |o| o.use_razoring = as_bool(value)),
        "razor margin" => {
            if let Some(v) = value.and_then(|v| v.parse::<i32>().ok()) {
                set(controller, |o| o.razor_margin = v.clamp(50, 1000))
            } else {
                Ok(())
            }
        }
        "use reverse futility pruning" => set(controller, |o| o.use_reverse_futility_pruning = as_bool(value)),
        "use null move pruning" => set(controller, |o| o.use_null_move_pruning = as_bool(value)),
        "null move depth" => {
            if let Some(v) = value.and_then(|v| v.parse::<i32>().ok()) {
                set(controller, |o| o.null_move_depth = v.clamp(1, 10))
            } else {
                Ok(())
            }
        }
        "null depth reduction" => {
            if let Some(v) = value.and_then(|v| v.parse::<i32>().ok()) {
                set(controller, |o| o.null_depth_reduction = v.clamp(1, 5))
            } else {
                Ok(())
            }
        }
        "use iid" => set(controller, |o| o.use_iid = as_bool(value)),
        "iid move depth" => {
            if let Some(v) = value.and_then(|v| v.parse::<i32>().ok()) {
                set(controller, |o| o.iid_move_depth = v.clamp(3, 12))
            } else {
                Ok(())
            }
        }
        "iid depth reduction" => {
            if let Some(v) = value.and_then(|v| v.parse::<i32>().ok()) {
                set(controller, |o| o.iid_depth_reduction = v.clamp(1, 5))
            } else {
                Ok(())
            }
        }
        _ => Err(format!("unknown option: {name}")),
    }
}

fn set(controller: &mut EngineController, mutator: impl FnOnce(&mut SearchOptions)) -> Result<(), String> {
    controller.apply_options(mutator);
    Ok(())
}
