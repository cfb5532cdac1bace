//! Negamax search with PVS, null-move pruning, razoring, reverse futility
//! pruning, internal iterative deepening, and a transposition table shared
//! with (but not locked against) the timer thread in `engine`.
//!
//! Two open questions the core deliberately leaves unresolved are settled
//! here rather than guessed at: aspiration windows are implemented as a
//! conventional widen-on-fail loop around the full-window root search (a
//! sanctioned, non-tuned default), and late-move reductions are *not*
//! applied -- `lmr_depth` is always equal to the move's nominal new depth,
//! so the PVS re-search control flow is present and exercised but never
//! actually shrinks a subtree. Tuning a reduction schedule is out of scope
//! here and would otherwise just be an invented constant.

pub mod control;
mod extensions;
mod pruning;
mod quiescence;

use crate::eval::Evaluator;
use crate::movegen::{generate_legal_moves, GenMode, MoveGenerator, OrderingTables};
use crate::position::Position;
use crate::r#move::Move;
use crate::tt::{self, Bound, TranspositionTable};
use crate::types::{Depth, Value, CHECKMATE, MATE_THRESHOLD, MAX_PLY, VALUE_DRAW, VALUE_NONE};

pub use control::SearchControl;
pub use pruning::is_good_capture;

/// Every pruning/reduction/ordering knob the UCI option table exposes.
#[derive(Clone, Copy, Debug)]
pub struct SearchOptions {
    pub use_alpha_beta: bool,
    pub use_pvs: bool,
    pub use_aspiration: bool,

    pub use_hash: bool,
    pub use_hash_value: bool,
    pub use_hash_pv_move: bool,
    pub use_hash_quiescence: bool,
    pub use_hash_eval: bool,

    pub use_killer_moves: bool,
    pub use_history_moves: bool,
    pub use_history_counter: bool,

    pub use_mate_distance_pruning: bool,

    pub use_quiescence: bool,
    pub use_quiescence_standpat: bool,
    pub use_quiescence_see: bool,

    pub use_razoring: bool,
    pub razor_margin: i32,

    pub use_reverse_futility_pruning: bool,

    pub use_null_move_pruning: bool,
    pub null_move_depth: Depth,
    pub null_depth_reduction: Depth,

    pub use_iid: bool,
    pub iid_move_depth: Depth,
    pub iid_depth_reduction: Depth,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            use_alpha_beta: true,
            use_pvs: true,
            use_aspiration: true,

            use_hash: true,
            use_hash_value: true,
            use_hash_pv_move: true,
            use_hash_quiescence: true,
            use_hash_eval: true,

            use_killer_moves: true,
            use_history_moves: true,
            use_history_counter: true,

            use_mate_distance_pruning: true,

            use_quiescence: true,
            use_quiescence_standpat: true,
            use_quiescence_see: true,

            use_razoring: true,
            razor_margin: 300,

            use_reverse_futility_pruning: true,

            use_null_move_pruning: true,
            null_move_depth: 3,
            null_depth_reduction: 3,

            use_iid: true,
            iid_move_depth: 6,
            iid_depth_reduction: 2,
        }
    }
}

/// Node/time/depth caps for one `go` command.
#[derive(Clone, Debug, Default)]
pub struct SearchLimits {
    pub depth: Option<Depth>,
    pub nodes: Option<u64>,
    pub move_time_ms: Option<u64>,
    pub white_time_ms: Option<u64>,
    pub black_time_ms: Option<u64>,
    pub white_inc_ms: Option<u64>,
    pub black_inc_ms: Option<u64>,
    pub moves_to_go: Option<u32>,
    pub mate: Option<u32>,
    pub infinite: bool,
    pub ponder: bool,
    pub search_moves: Option<Vec<Move>>,
}

/// Running counters surfaced to the UCI observer through `info`.
#[derive(Clone, Debug, Default)]
pub struct SearchStats {
    pub nodes: u64,
    pub leaf_evals: u64,
    pub beta_cuts: u64,
    pub first_move_beta_cuts: u64,
    pub tt_hits: u64,
    pub tt_misses: u64,
    pub tt_cuts: u64,
    pub tt_no_cuts: u64,
    pub pvs_researches: u64,
    pub lmr_researches: u64,
    pub null_move_cuts: u64,
    pub razorings: u64,
    pub mate_distance_prunings: u64,
    pub check_extensions: u64,
    pub iid_searches: u64,
    pub iid_moves: u64,
    pub current_depth: Depth,
    pub current_seldepth: u32,
    pub current_root_move: Move,
    pub current_root_move_index: usize,
}

#[derive(Clone, Debug)]
pub struct SearchResult {
    pub best_move: Move,
    pub ponder_move: Option<Move>,
    pub score: Value,
    pub mate_found: bool,
    pub depth: Depth,
    pub time_ms: u64,
    pub nodes: u64,
    pub pv: Vec<Move>,
}

impl SearchResult {
    fn no_move(draw: bool) -> Self {
        SearchResult {
            best_move: Move::NONE,
            ponder_move: None,
            score: if draw { VALUE_DRAW } else { -CHECKMATE },
            mate_found: !draw,
            depth: 0,
            time_ms: 0,
            nodes: 0,
            pv: Vec::new(),
        }
    }
}

/// Everything the recursive search owns exclusively: the transposition
/// table handle, move ordering heuristics, per-ply scratch generators, and
/// the triangular PV table. Built once per engine and reused across
/// searches; only `prepare_new_search` resets the per-search parts.
pub struct SearchState {
    pub tt: TranspositionTable,
    pub ordering: OrderingTables,
    pub options: SearchOptions,
    pub stats: SearchStats,
    generators: Vec<MoveGenerator>,
    pv_table: Vec<Vec<Move>>,
    pv_len: Vec<usize>,
}

impl SearchState {
    #[must_use]
    pub fn new(hash_mb: usize) -> Self {
        SearchState {
            tt: TranspositionTable::new(hash_mb),
            ordering: OrderingTables::new(MAX_PLY),
            options: SearchOptions::default(),
            stats: SearchStats::default(),
            generators: (0..=MAX_PLY).map(|_| MoveGenerator::new()).collect(),
            pv_table: (0..=MAX_PLY + 1).map(|_| vec![Move::NONE; MAX_PLY + 1]).collect(),
            pv_len: vec![0; MAX_PLY + 2],
        }
    }

    /// Clears everything that should not survive a `ucinewgame`: hash table
    /// contents and the learned killer/history/counter-move heuristics.
    pub fn new_game(&mut self) {
        self.tt.clear();
        self.ordering.clear();
    }

    /// Resets per-search bookkeeping. Killer/history tables deliberately
    /// survive across searches within the same game.
    fn prepare_new_search(&mut self) {
        self.stats = SearchStats::default();
        self.tt.age_entries();
        for len in &mut self.pv_len {
            *len = 0;
        }
        for gen in &mut self.generators {
            gen.reset(Move::NONE);
        }
    }

    fn gen_next(&mut self, pos: &Position, mode: GenMode, ply: usize) -> Move {
        self.generators[ply].next(pos, mode, ply, &self.ordering)
    }

    fn pv_first_move(&self, ply: usize) -> Move {
        if self.pv_len[ply] > 0 {
            self.pv_table[ply][0]
        } else {
            Move::NONE
        }
    }

    fn pv_slice(&self, ply: usize) -> &[Move] {
        &self.pv_table[ply][..self.pv_len[ply]]
    }

    /// Installs `mv` as the new best line at `ply`, prefixed onto whatever
    /// continuation is already recorded one ply deeper.
    fn set_pv(&mut self, ply: usize, mv: Move) {
        let child_len = self.pv_len[ply + 1];
        let (head, tail) = self.pv_table.split_at_mut(ply + 1);
        head[ply][0] = mv;
        head[ply][1..1 + child_len].copy_from_slice(&tail[0][..child_len]);
        self.pv_len[ply] = 1 + child_len;
    }
}

struct RootMove {
    mv: Move,
    value: Value,
    pv: Vec<Move>,
}

/// Runs iterative deepening from `position` until `limits` or `control`
/// calls a halt, returning the best line found at the deepest completed
/// iteration.
pub fn iterative_deepening(
    state: &mut SearchState,
    position: &Position,
    eval: &mut dyn Evaluator,
    control: &SearchControl,
    limits: &SearchLimits,
    mut on_iteration: impl FnMut(&SearchStats, &SearchResult),
) -> SearchResult {
    state.prepare_new_search();
    let mut pos = position.clone();

    if pos.check_repetition(2) || pos.halfmove_clock() >= 100 {
        return SearchResult::no_move(true);
    }

    let mut root_moves: Vec<RootMove> = generate_legal_moves(&pos, GenMode::All)
        .iter()
        .filter(|mv| limits.search_moves.as_ref().map_or(true, |sm| sm.contains(mv)))
        .map(|&mv| RootMove { mv, value: VALUE_NONE, pv: vec![mv] })
        .collect();

    if root_moves.is_empty() {
        return SearchResult::no_move(!pos.has_check());
    }

    let max_depth = limits.depth.unwrap_or(MAX_PLY as Depth).min(MAX_PLY as Depth);
    let mut prev_score: Value = 0;
    let mut last_completed_depth: Depth = 0;
    let mut final_pv = vec![root_moves[0].mv];
    let mut final_score: Value = 0;

    for depth in 1..=max_depth {
        state.stats.current_depth = depth;

        let score = if state.options.use_aspiration && depth > 3 {
            aspiration_search(state, &mut pos, eval, control, &mut root_moves, depth, prev_score)
        } else {
            root_search(state, &mut pos, eval, control, &mut root_moves, depth, -CHECKMATE, CHECKMATE)
        };

        if control.should_stop() && depth > 1 {
            break;
        }

        prev_score = score;
        final_score = score;
        last_completed_depth = depth;
        final_pv = root_moves[0].pv.clone();

        let partial = SearchResult {
            best_move: final_pv.first().copied().unwrap_or(root_moves[0].mv),
            ponder_move: final_pv.get(1).copied(),
            score: final_score,
            mate_found: crate::types::is_mate_score(final_score),
            depth: last_completed_depth,
            time_ms: control.elapsed_ms(),
            nodes: control.node_count(),
            pv: final_pv.clone(),
        };
        on_iteration(&state.stats, &partial);

        if control.should_stop() || root_moves.len() == 1 {
            break;
        }
        root_moves.sort_by(|a, b| b.value.cmp(&a.value));
    }

    let best_move = final_pv.first().copied().unwrap_or(root_moves[0].mv);
    let ponder_move = final_pv.get(1).copied().or_else(|| {
        let mut scratch = pos.clone();
        scratch.make_move(best_move);
        state.tt.probe(scratch.zobrist_key()).map(|e| e.best_move).filter(|m| !m.is_none())
    });

    SearchResult {
        best_move,
        ponder_move,
        score: final_score,
        mate_found: crate::types::is_mate_score(final_score),
        depth: last_completed_depth,
        time_ms: control.elapsed_ms(),
        nodes: control.node_count(),
        pv: final_pv,
    }
}

/// Conventional widen-on-fail aspiration window: search a narrow band
/// around the previous iteration's score, doubling and re-centering on
/// whichever side fails until the true score lands inside the window.
fn aspiration_search(
    state: &mut SearchState,
    pos: &mut Position,
    eval: &mut dyn Evaluator,
    control: &SearchControl,
    root_moves: &mut [RootMove],
    depth: Depth,
    prev_score: Value,
) -> Value {
    let mut delta: Value = 25;
    let mut alpha = (prev_score - delta).max(-CHECKMATE);
    let mut beta = (prev_score + delta).min(CHECKMATE);

    loop {
        let score = root_search(state, pos, eval, control, root_moves, depth, alpha, beta);
        if control.should_stop() {
            return score;
        }
        if score <= alpha {
            alpha = (alpha - delta).max(-CHECKMATE);
            delta = delta.saturating_mul(2);
        } else if score >= beta {
            beta = (beta + delta).min(CHECKMATE);
            delta = delta.saturating_mul(2);
        } else {
            return score;
        }
    }
}

fn root_search(
    state: &mut SearchState,
    pos: &mut Position,
    eval: &mut dyn Evaluator,
    control: &SearchControl,
    root_moves: &mut [RootMove],
    depth: Depth,
    alpha: Value,
    beta: Value,
) -> Value {
    let mut best_value = -CHECKMATE;
    let mut local_alpha = alpha;

    for (i, rm) in root_moves.iter_mut().enumerate() {
        state.stats.current_root_move = rm.mv;
        state.stats.current_root_move_index = i;

        pos.make_move(rm.mv);
        let value = if !state.options.use_pvs || i == 0 {
            -negamax(state, pos, eval, control, 1, depth - 1, -beta, -local_alpha, true, true)
        } else {
            let mut v = -negamax(state, pos, eval, control, 1, depth - 1, -local_alpha - 1, -local_alpha, false, true);
            if v > local_alpha && v < beta && !control.should_stop() {
                state.stats.pvs_researches += 1;
                v = -negamax(state, pos, eval, control, 1, depth - 1, -beta, -local_alpha, true, true);
            }
            v
        };
        pos.unmake_move(rm.mv);

        if control.should_stop() {
            break;
        }

        rm.value = value;
        if value > best_value {
            best_value = value;
            let mut pv = vec![rm.mv];
            pv.extend_from_slice(state.pv_slice(1));
            rm.pv = pv;
        }
        if value > local_alpha {
            local_alpha = value;
        }
        if state.options.use_alpha_beta && value >= beta {
            break;
        }
    }
    best_value
}

/// The recursive negamax/PVS driver. Returns `VALUE_NONE` only when the
/// caller should discard the result because `control` signaled a stop
/// mid-search; every other return is a genuine score.
#[allow(clippy::too_many_arguments)]
fn negamax(
    state: &mut SearchState,
    pos: &mut Position,
    eval: &mut dyn Evaluator,
    control: &SearchControl,
    ply: usize,
    depth: Depth,
    alpha: Value,
    beta: Value,
    is_pv: bool,
    do_null: bool,
) -> Value {
    control.node_visited();
    if control.should_stop() {
        return VALUE_NONE;
    }
    state.stats.nodes += 1;

    if depth <= 0 || ply >= MAX_PLY {
        return quiescence::qsearch(state, pos, eval, control, ply, alpha, beta, is_pv);
    }

    let mut alpha = alpha;
    let mut beta = beta;
    if state.options.use_mate_distance_pruning {
        alpha = alpha.max(-CHECKMATE + ply as i32);
        beta = beta.min(CHECKMATE - ply as i32);
        if alpha >= beta {
            state.stats.mate_distance_prunings += 1;
            return alpha;
        }
    }

    let in_check = pos.has_check();
    let key = pos.zobrist_key();
    let alpha_orig = alpha;

    let mut tt_move = Move::NONE;
    let mut tt_static_eval: Option<Value> = None;
    if state.options.use_hash {
        match state.tt.probe(key) {
            Some(entry) => {
                state.stats.tt_hits += 1;
                tt_move = entry.best_move;
                tt_static_eval = Some(entry.static_eval);
                if state.options.use_hash_value && entry.depth >= depth && !is_pv {
                    let v = tt::value_from_tt(entry.value, ply as i32);
                    let usable = match entry.bound {
                        Bound::Exact => true,
                        Bound::Lower => v >= beta,
                        Bound::Upper => v <= alpha,
                    };
                    if usable {
                        state.stats.tt_cuts += 1;
                        return v;
                    }
                    state.stats.tt_no_cuts += 1;
                }
            }
            None => state.stats.tt_misses += 1,
        }
    }

    let static_eval = if in_check {
        VALUE_NONE
    } else if state.options.use_hash_eval && tt_static_eval.is_some() {
        tt_static_eval.unwrap()
    } else {
        state.stats.leaf_evals += 1;
        eval.evaluate(pos)
    };

    if state.options.use_razoring && depth == 1 && !in_check && static_eval + state.options.razor_margin <= alpha {
        state.stats.razorings += 1;
        return quiescence::qsearch(state, pos, eval, control, ply, alpha, beta, is_pv);
    }

    if state.options.use_reverse_futility_pruning && depth <= 3 && !is_pv && !in_check && do_null {
        let margin = pruning::rfp_margin(depth);
        if static_eval - margin >= beta {
            return static_eval - margin;
        }
    }

    let mut mate_threat = false;
    if state.options.use_null_move_pruning
        && do_null
        && !is_pv
        && !in_check
        && depth >= state.options.null_move_depth
        && !pruning::is_zugzwang_prone(pos, pos.side_to_move())
    {
        let bonus: Depth = if depth > 8 || (depth > 6 && pos.phase() >= 3) { 1 } else { 0 };
        let r = state.options.null_depth_reduction + bonus;
        pos.do_null_move();
        let score = -negamax(state, pos, eval, control, ply + 1, depth - 1 - r, -beta, -beta + 1, false, false);
        pos.undo_null_move();

        if control.should_stop() {
            return VALUE_NONE;
        }
        let score = score.min(MATE_THRESHOLD);
        if score < -MATE_THRESHOLD {
            mate_threat = true;
        }
        if score >= beta && !mate_threat {
            state.stats.null_move_cuts += 1;
            state.tt.store(key, depth, tt::value_to_tt(score, ply as i32), Bound::Lower, Move::NONE, static_eval, mate_threat);
            return score;
        }
    }

    if state.options.use_iid
        && is_pv
        && do_null
        && tt_move.is_none()
        && depth >= state.options.iid_move_depth
    {
        state.stats.iid_searches += 1;
        negamax(state, pos, eval, control, ply, depth - state.options.iid_depth_reduction, alpha, beta, true, true);
        let found = state.pv_first_move(ply);
        if !found.is_none() {
            state.stats.iid_moves += 1;
            tt_move = found;
        }
    }

    let seed = if state.options.use_hash_pv_move { tt_move } else { Move::NONE };
    state.generators[ply].reset(seed);
    state.pv_len[ply] = 0;

    let mut best_value = VALUE_NONE;
    let mut best_move = Move::NONE;
    let mut move_index = 0usize;

    loop {
        let mv = state.gen_next(pos, GenMode::All, ply);
        if mv.is_none() {
            break;
        }

        let gives_check = pos.gives_check(mv);

        pos.make_move(mv);
        if !pos.was_legal_move() {
            pos.unmake_move(mv);
            continue;
        }

        let extension = extensions::check_extension(gives_check, move_index, depth);
        if extension > 0 {
            state.stats.check_extensions += 1;
        }
        let new_depth = depth - 1 + extension;
        // Reserved late-move-reduction hook: no reduction schedule has been
        // tuned, so `lmr_depth` always equals `new_depth` and the re-search
        // branch below never actually fires from a shrunk window.
        let lmr_depth = new_depth;

        let is_draw = pos.check_repetition(2) || pos.halfmove_clock() >= 100;
        let value = if is_draw {
            VALUE_DRAW
        } else if !state.options.use_pvs || move_index == 0 {
            -negamax(state, pos, eval, control, ply + 1, lmr_depth, -beta, -alpha, is_pv, true)
        } else {
            state.stats.pvs_researches += 1;
            let mut v = -negamax(state, pos, eval, control, ply + 1, lmr_depth, -alpha - 1, -alpha, false, true);
            if v > alpha && !control.should_stop() {
                if lmr_depth < new_depth {
                    state.stats.lmr_researches += 1;
                    v = -negamax(state, pos, eval, control, ply + 1, new_depth, -alpha - 1, -alpha, false, true);
                }
                if v > alpha && v < beta {
                    v = -negamax(state, pos, eval, control, ply + 1, new_depth, -beta, -alpha, true, true);
                }
            }
            v
        };

        pos.unmake_move(mv);

        if control.should_stop() {
            return VALUE_NONE;
        }

        move_index += 1;

        if value > best_value {
            best_value = value;
            best_move = mv;

            if value > alpha {
                alpha = value;
                state.set_pv(ply, mv);

                if value >= beta {
                    if state.options.use_alpha_beta {
                        state.stats.beta_cuts += 1;
                        if move_index == 1 {
                            state.stats.first_move_beta_cuts += 1;
                        }
                        if !pos.is_capturing_move(mv) {
                            if state.options.use_killer_moves {
                                state.ordering.record_killer(ply, mv);
                            }
                            if state.options.use_history_counter {
                                if let Some(last) = pos.last_move() {
                                    state.ordering.set_counter(last.origin(), last.dest(), mv);
                                }
                            }
                            if state.options.use_history_moves {
                                state.ordering.record_history_bonus(pos.side_to_move(), mv.origin(), mv.dest(), depth);
                            }
                        }
                        state.tt.store(key, depth, tt::value_to_tt(value, ply as i32), Bound::Lower, mv, static_eval, mate_threat);
                        return value;
                    }
                }
            }
        } else if !pos.is_capturing_move(mv) && state.options.use_history_moves {
            state.ordering.record_history_penalty(pos.side_to_move(), mv.origin(), mv.dest(), depth);
        }
    }

    if move_index == 0 {
        return if in_check { -CHECKMATE + ply as i32 } else { VALUE_DRAW };
    }

    let bound = if best_value <= alpha_orig { Bound::Upper } else { Bound::Exact };
    state.tt.store(key, depth, tt::value_to_tt(best_value, ply as i32), bound, best_move, static_eval, mate_threat);
    best_value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::MaterialPstEvaluator;

    fn search_fixed_depth(fen: &str, depth: Depth) -> SearchResult {
        let pos = Position::from_fen(fen).unwrap();
        let mut state = SearchState::new(1);
        let mut eval = MaterialPstEvaluator::new();
        let control = SearchControl::new();
        control.reset(std::time::Instant::now(), 0);
        let limits = SearchLimits { depth: Some(depth), ..SearchLimits::default() };
        iterative_deepening(&mut state, &pos, &mut eval, &control, &limits, |_, _| {})
    }

    #[test]
    fn finds_mate_in_one() {
        let result = search_fixed_depth("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", 3);
        assert!(result.mate_found);
        assert_eq!(result.score, CHECKMATE - 1);
        assert_eq!(result.best_move.to_string(), "a1a8");
    }

    #[test]
    fn avoids_losing_material_with_one_legal_reply() {
        let pos = Position::from_fen("rnbq1bnr/ppp1pppp/4k3/3pP3/3P2Q1/8/PPP2PPP/RNB1KBNR b KQ - 2 4").unwrap();
        let legal = crate::movegen::generate_legal_moves(&pos, GenMode::All);
        assert_eq!(legal.len(), 1);
        let result = search_fixed_depth("rnbq1bnr/ppp1pppp/4k3/3pP3/3P2Q1/8/PPP2PPP/RNB1KBNR b KQ - 2 4", 2);
        assert_eq!(result.best_move, legal.as_slice()[0]);
    }

    #[test]
    fn stalemate_returns_draw_with_no_move() {
        let result = search_fixed_depth("7k/5K2/6Q1/8/8/8/8/8 b - -", 4);
        assert_eq!(result.best_move, Move::NONE);
        assert_eq!(result.score, VALUE_DRAW);
    }

    #[test]
    fn material_search_prefers_free_capture() {
        let result = search_fixed_depth("4k3/8/8/3p4/4P3/8/8/4K3 w - -", 3);
        assert!(result.score > 0);
    }
}
