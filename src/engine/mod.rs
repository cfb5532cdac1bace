//! Search driver: owns the board and the long-lived search state, and
//! manages the worker/timer thread pair that runs one search at a time.
//!
//! Concurrency model: exactly one worker thread runs the recursive search
//! at a time, and (when a clock or `movetime` was given) one timer thread
//! busy-waits in short slices and flips the shared stop flag when the
//! deadline passes. The transposition table is the only state genuinely
//! shared across threads, and it is lock-free internally (see `tt.rs`); the
//! `Mutex<SearchState>` below exists to serialize *searches* (and
//! resizes/clears between them), not to protect a hot path.

mod time_control;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::error::EngineError;
use crate::eval::MaterialPstEvaluator;
use crate::position::Position;
use crate::search::{self, SearchControl, SearchLimits, SearchOptions, SearchResult, SearchState, SearchStats};

pub use time_control::{compute_time_limit_ms, TimeControlInput};

const TIMER_POLL_SLICE_MS: u64 = 5;

pub type InfoCallback = Arc<dyn Fn(&SearchStats, &SearchResult) + Send + Sync>;

/// Parameters for one `go` command, already resolved from UCI tokens down
/// to the shapes `search::iterative_deepening` and the time-control
/// arithmetic expect.
#[derive(Clone, Debug, Default)]
pub struct SearchParams {
    pub limits: SearchLimits,
    pub white_time_ms: Option<u64>,
    pub black_time_ms: Option<u64>,
    pub white_inc_ms: u64,
    pub black_inc_ms: u64,
}

struct SearchJob {
    control: Arc<SearchControl>,
    worker: JoinHandle<()>,
    timer: Option<JoinHandle<()>>,
    pondering: Arc<AtomicBool>,
    planned_time_limit_ms: Option<u64>,
}

impl SearchJob {
    fn stop_and_wait(self) {
        self.control.set_stop();
        self.pondering.store(false, Ordering::SeqCst);
        let _ = self.worker.join();
        if let Some(timer) = self.timer {
            let _ = timer.join();
        }
    }

    fn signal_stop(&self) {
        self.control.set_stop();
        self.pondering.store(false, Ordering::SeqCst);
    }

    fn ponderhit(&self) -> Result<(), EngineError> {
        if !self.pondering.load(Ordering::SeqCst) {
            return Err(EngineError::NotPondering);
        }
        let start = Instant::now();
        self.control.restart_clock(start);
        if let Some(limit_ms) = self.planned_time_limit_ms {
            let deadline = start + Duration::from_millis(limit_ms);
            let stop = Arc::clone(&self.control);
            thread::spawn(move || busy_wait_then_stop(deadline, &stop));
        }
        self.pondering.store(false, Ordering::SeqCst);
        Ok(())
    }
}

fn busy_wait_then_stop(deadline: Instant, control: &SearchControl) {
    loop {
        if control.should_stop() {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            control.set_stop();
            return;
        }
        thread::sleep((deadline - now).min(Duration::from_millis(TIMER_POLL_SLICE_MS)));
    }
}

pub struct EngineController {
    position: Position,
    state: Arc<Mutex<SearchState>>,
    job: Option<SearchJob>,
    info_callback: Option<InfoCallback>,
    /// UCI-visible option the core accepts but does not act on: this crate
    /// carries no opening book, so every search always runs. Kept so
    /// `setoption name OwnBook` round-trips cleanly instead of erroring.
    own_book: bool,
    ponder_allowed: bool,
    past_first_search: bool,
}

impl EngineController {
    #[must_use]
    pub fn new(hash_mb: usize) -> Self {
        EngineController {
            position: Position::startpos(),
            state: Arc::new(Mutex::new(SearchState::new(hash_mb))),
            job: None,
            info_callback: None,
            own_book: false,
            ponder_allowed: false,
            past_first_search: false,
        }
    }

    #[must_use]
    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn set_position(&mut self, position: Position) -> Result<(), EngineError> {
        if self.is_searching() {
            return Err(EngineError::AlreadySearching);
        }
        self.position = position;
        Ok(())
    }

    pub fn set_info_callback(&mut self, cb: Option<InfoCallback>) {
        self.info_callback = cb;
    }

    pub fn set_own_book(&mut self, enabled: bool) {
        self.own_book = enabled;
    }

    pub fn set_ponder_allowed(&mut self, enabled: bool) {
        self.ponder_allowed = enabled;
    }

    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.job.is_some()
    }

    pub fn apply_options(&mut self, mutator: impl FnOnce(&mut SearchOptions)) {
        mutator(&mut self.state.lock().options);
    }

    pub fn resize_hash(&mut self, mb: usize) -> Result<(), EngineError> {
        if self.is_searching() {
            return Err(EngineError::ResizeWhileSearching);
        }
        self.state.lock().tt.resize(mb);
        Ok(())
    }

    pub fn clear_hash(&mut self) -> Result<(), EngineError> {
        if self.is_searching() {
            return Err(EngineError::ResizeWhileSearching);
        }
        self.state.lock().tt.clear();
        Ok(())
    }

    /// `ucinewgame`: resets the board, the hash table, and the learned
    /// move-ordering heuristics, and re-arms the leaving-the-book extra
    /// time bonus for the next search.
    pub fn new_game(&mut self) -> Result<(), EngineError> {
        if self.is_searching() {
            self.stop_search()?;
        }
        self.position = Position::startpos();
        self.state.lock().new_game();
        self.past_first_search = false;
        Ok(())
    }

    /// `isready`: the controller never defers work past the call that
    /// produced it, so readiness is immediate once no search is mutating
    /// shared state.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        let _ = self.state.lock();
        true
    }

    #[must_use]
    pub fn hash_full(&self) -> u32 {
        self.state.lock().tt.hash_full()
    }

    /// Signals stop and blocks until the worker has finished. The final
    /// result reaches the caller through the `on_complete` callback given
    /// to `start_search`, not through this method's return value.
    pub fn stop_search(&mut self) -> Result<(), EngineError> {
        match self.job.take() {
            Some(job) => {
                job.stop_and_wait();
                Ok(())
            }
            None => Err(EngineError::NotSearching),
        }
    }

    pub fn signal_stop(&self) -> Result<(), EngineError> {
        match &self.job {
            Some(job) => {
                job.signal_stop();
                Ok(())
            }
            None => Err(EngineError::NotSearching),
        }
    }

    pub fn ponderhit(&self) -> Result<(), EngineError> {
        match &self.job {
            Some(job) => job.ponderhit(),
            None => Err(EngineError::NotSearching),
        }
    }

    fn build_time_limit(&self, params: &SearchParams) -> Option<u64> {
        if params.limits.ponder || params.limits.infinite {
            return None;
        }
        if let Some(mt) = params.limits.move_time_ms {
            return compute_time_limit_ms(&TimeControlInput { move_time_ms: Some(mt), ..Default::default() });
        }
        let (remaining_ms, increment_ms) = match self.position.side_to_move() {
            crate::piece::Color::White => (params.white_time_ms, params.white_inc_ms),
            crate::piece::Color::Black => (params.black_time_ms, params.black_inc_ms),
        };
        let remaining_ms = remaining_ms?;
        let extra_time_multiplier = if self.past_first_search { 1.0 } else { 2.0 };
        compute_time_limit_ms(&TimeControlInput {
            move_time_ms: None,
            remaining_ms: Some(remaining_ms),
            increment_ms,
            moves_to_go: params.limits.moves_to_go,
            phase: self.position.phase(),
            extra_time_multiplier,
        })
    }

    /// Starts a search in the background. `on_complete` runs on the worker
    /// thread once the search concludes (naturally, by a stop signal, or by
    /// `stop_search`/`ponderhit` timing out).
    pub fn start_search<F>(&mut self, mut params: SearchParams, on_complete: F) -> Result<(), EngineError>
    where
        F: FnOnce(SearchResult) + Send + 'static,
    {
        if self.is_searching() {
            return Err(EngineError::AlreadySearching);
        }

        params.limits.ponder = params.limits.ponder && self.ponder_allowed;
        let time_limit_ms = self.build_time_limit(&params);

        let node_limit = params.limits.nodes.unwrap_or(0);
        let start = Instant::now();
        let control = SearchControl::new();
        control.reset(start, node_limit);

        let pondering = Arc::new(AtomicBool::new(params.limits.ponder));
        let timer = if !params.limits.ponder && !params.limits.infinite {
            time_limit_ms.map(|limit_ms| {
                let deadline = start + Duration::from_millis(limit_ms);
                let stop = Arc::clone(&control);
                thread::spawn(move || busy_wait_then_stop(deadline, &stop))
            })
        } else {
            None
        };

        let position = self.position.clone();
        let state = Arc::clone(&self.state);
        let control_for_worker = Arc::clone(&control);
        let pondering_for_worker = Arc::clone(&pondering);
        let info_callback = self.info_callback.clone();
        let barrier = Arc::new(Barrier::new(2));
        let barrier_for_worker = Arc::clone(&barrier);
        let limits = params.limits.clone();

        let worker = thread::Builder::new()
            .name("corvid-search".to_string())
            .spawn(move || {
                let mut guard = state.lock();
                barrier_for_worker.wait();

                let mut eval = MaterialPstEvaluator::new();
                let result = search::iterative_deepening(&mut guard, &position, &mut eval, &control_for_worker, &limits, |stats, partial| {
                    if let Some(cb) = &info_callback {
                        cb(stats, partial);
                    }
                });
                drop(guard);

                while pondering_for_worker.load(Ordering::SeqCst) && !control_for_worker.should_stop() {
                    thread::sleep(Duration::from_millis(TIMER_POLL_SLICE_MS));
                }

                on_complete(result);
            })
            .expect("failed to spawn search worker thread");

        // startSearch only returns once the worker has acquired the search
        // state lock and is about to begin its first iteration.
        barrier.wait();

        self.past_first_search = true;
        self.job = Some(SearchJob { control, worker, timer, pondering, planned_time_limit_ms: time_limit_ms });
        Ok(())
    }
}
