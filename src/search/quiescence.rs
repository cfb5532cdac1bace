//! Quiescence search: resolves the noisy tail of the tree (captures,
//! promotions, and check evasions) beyond the nominal search horizon so the
//! static evaluator is never asked to judge a position with a hanging piece
//! on the board.

use crate::eval::Evaluator;
use crate::movegen::GenMode;
use crate::position::Position;
use crate::r#move::Move;
use crate::tt::{self, Bound};
use crate::types::{Value, CHECKMATE, MAX_PLY};

use super::control::SearchControl;
use super::pruning::is_good_capture;
use super::SearchState;

pub fn qsearch(
    state: &mut SearchState,
    pos: &mut Position,
    eval: &mut dyn Evaluator,
    control: &SearchControl,
    ply: usize,
    mut alpha: Value,
    beta: Value,
    is_pv: bool,
) -> Value {
    control.node_visited();
    if control.should_stop() {
        return alpha;
    }
    state.stats.nodes += 1;
    state.stats.current_seldepth = state.stats.current_seldepth.max(ply as u32);

    if !state.options.use_quiescence || ply >= MAX_PLY {
        state.stats.leaf_evals += 1;
        return eval.evaluate(pos);
    }

    let mut beta = beta;
    if state.options.use_mate_distance_pruning {
        alpha = alpha.max(-CHECKMATE + ply as i32);
        beta = beta.min(CHECKMATE - ply as i32);
        if alpha >= beta {
            return alpha;
        }
    }

    let key = pos.zobrist_key();
    let mut tt_static_eval = None;
    if state.options.use_hash_quiescence {
        if let Some(entry) = state.tt.probe(key) {
            tt_static_eval = Some(entry.static_eval);
            if state.options.use_hash_value {
                let v = tt::value_from_tt(entry.value, ply as i32);
                let usable = match entry.bound {
                    Bound::Exact => true,
                    Bound::Lower => v >= beta,
                    Bound::Upper => v <= alpha,
                };
                if usable {
                    return v;
                }
            }
        }
    }

    let in_check = pos.has_check();
    let mut best_value;
    if in_check {
        best_value = -CHECKMATE + ply as i32;
    } else {
        let stand_pat = tt_static_eval.unwrap_or_else(|| {
            state.stats.leaf_evals += 1;
            eval.evaluate(pos)
        });
        if state.options.use_quiescence_standpat {
            if stand_pat >= beta {
                state.tt.store(key, 0, tt::value_to_tt(beta, ply as i32), Bound::Upper, Move::NONE, stand_pat, false);
                return beta;
            }
            alpha = alpha.max(stand_pat);
        }
        best_value = stand_pat;
    }

    state.generators[ply].reset(Move::NONE);
    let mode = if in_check { GenMode::All } else { GenMode::NonQuiet };
    let mut any_move = false;

    loop {
        let mv = state.gen_next(pos, mode, ply);
        if mv.is_none() {
            break;
        }

        if !in_check && pos.is_capturing_move(mv) && !is_good_capture(pos, mv, &state.options) {
            continue;
        }

        pos.make_move(mv);
        if !pos.was_legal_move() {
            pos.unmake_move(mv);
            continue;
        }
        any_move = true;

        let score = -qsearch(state, pos, eval, control, ply + 1, -beta, -alpha, is_pv);
        pos.unmake_move(mv);

        if control.should_stop() {
            return alpha;
        }

        if score > best_value {
            best_value = score;
            if score > alpha {
                alpha = score;
                state.set_pv(ply, mv);
                if alpha >= beta {
                    break;
                }
            }
        }
    }

    if !any_move && in_check {
        return -CHECKMATE + ply as i32;
    }
    best_value
}
