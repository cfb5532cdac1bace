//! Time-budget arithmetic for the `go` command: turns `movetime` or a
//! clock-plus-increment pair into a single millisecond deadline the timer
//! thread enforces.

/// Inputs needed to compute a search deadline. All time fields are
/// milliseconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeControlInput {
    pub move_time_ms: Option<u64>,
    pub remaining_ms: Option<u64>,
    pub increment_ms: u64,
    pub moves_to_go: Option<u32>,
    /// Game phase in 0..=24, 24 = full material, 0 = bare kings.
    pub phase: i32,
    /// Multiplier applied to the computed budget. `2.0` on the first move
    /// of a game (no opening book is consulted here, so "leaving the
    /// book" happens unconditionally on move one); `1.0` otherwise.
    pub extra_time_multiplier: f64,
}

const MOVE_TIME_SAFETY_MARGIN_MS: u64 = 20;

/// `None` means search until told to stop (infinite / ponder / depth-only
/// search with no clock given).
#[must_use]
pub fn compute_time_limit_ms(input: &TimeControlInput) -> Option<u64> {
    if let Some(move_time) = input.move_time_ms {
        let reduced = move_time.saturating_sub(MOVE_TIME_SAFETY_MARGIN_MS);
        return Some(reduced.max(1));
    }

    let remaining = input.remaining_ms?;
    let moves_left = input
        .moves_to_go
        .unwrap_or_else(|| 15 + (25.0 * f64::from(input.phase) / 24.0).round() as u32)
        .max(1);

    let time_left_ms = remaining as f64 + f64::from(moves_left) * input.increment_ms as f64;
    let base = time_left_ms / f64::from(moves_left);
    let limit = if base < 100.0 { 0.8 * base } else { 0.9 * base };
    let limit = limit * input.extra_time_multiplier;
    Some(limit.max(1.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_time_mode_subtracts_safety_margin() {
        let input = TimeControlInput { move_time_ms: Some(1000), ..Default::default() };
        assert_eq!(compute_time_limit_ms(&input), Some(980));
    }

    #[test]
    fn move_time_mode_never_reaches_zero() {
        let input = TimeControlInput { move_time_ms: Some(5), ..Default::default() };
        assert_eq!(compute_time_limit_ms(&input), Some(1));
    }

    #[test]
    fn clock_mode_uses_low_time_fraction_below_threshold() {
        let input = TimeControlInput {
            remaining_ms: Some(500),
            increment_ms: 0,
            moves_to_go: Some(20),
            phase: 24,
            extra_time_multiplier: 1.0,
            ..Default::default()
        };
        // base = 500/20 = 25ms, under the 100ms threshold -> 0.8 fraction
        assert_eq!(compute_time_limit_ms(&input), Some(20));
    }

    #[test]
    fn clock_mode_uses_high_time_fraction_above_threshold() {
        let input = TimeControlInput {
            remaining_ms: Some(60_000),
            increment_ms: 0,
            moves_to_go: Some(20),
            phase: 24,
            extra_time_multiplier: 1.0,
            ..Default::default()
        };
        // base = 3000ms, at/above threshold -> 0.9 fraction
        assert_eq!(compute_time_limit_ms(&input), Some(2700));
    }

    #[test]
    fn extra_time_multiplier_scales_budget() {
        let input = TimeControlInput {
            remaining_ms: Some(60_000),
            increment_ms: 0,
            moves_to_go: Some(20),
            phase: 24,
            extra_time_multiplier: 2.0,
        };
        assert_eq!(compute_time_limit_ms(&input), Some(5400));
    }

    #[test]
    fn no_clock_information_yields_no_deadline() {
        let input = TimeControlInput::default();
        assert_eq!(compute_time_limit_ms(&input), None);
    }
}
