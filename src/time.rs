use std::time::{Duration, Instant};

use chess::Color;

pub const DEFAULT_BUDGET: Duration = Duration::from_millis(5000);

// Keep this much back from a movetime for transmission overhead.
const TRANSMISSION_RESERVE: u64 = 100;
// Never allocate less than this from a running game clock.
const MIN_CLOCK_SLICE: Duration = Duration::from_millis(100);

/// Wall-clock deadline for one search.
pub struct SearchClock {
    start: Instant,
    budget: Duration,
}

impl SearchClock {
    pub fn start(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    #[inline]
    pub fn expired(&self) -> bool {
        self.start.elapsed() >= self.budget
    }
}

/// Map `go` arguments to a time budget. The first recognized token wins:
/// `depth` is treated as a hint worth a second per ply rather than a hard
/// horizon, `movetime` is honored minus the transmission reserve, and a
/// running game clock spends a twentieth of what remains.
pub fn budget_from_go(tokens: &[&str], side_to_move: Color) -> Duration {
    let mut i = 1;
    while i + 1 < tokens.len() {
        let value = tokens[i + 1].parse::<u64>();
        match tokens[i] {
            "depth" => {
                return value
                    .map(|d| Duration::from_millis(d.saturating_mul(1000)))
                    .unwrap_or(DEFAULT_BUDGET);
            }
            "movetime" => {
                return value
                    .map(|ms| Duration::from_millis(ms.saturating_sub(TRANSMISSION_RESERVE)))
                    .unwrap_or(DEFAULT_BUDGET);
            }
            "wtime" if side_to_move == Color::White => {
                return value
                    .map(|ms| Duration::from_millis(ms / 20).max(MIN_CLOCK_SLICE))
                    .unwrap_or(DEFAULT_BUDGET);
            }
            "btime" if side_to_move == Color::Black => {
                return value
                    .map(|ms| Duration::from_millis(ms / 20).max(MIN_CLOCK_SLICE))
                    .unwrap_or(DEFAULT_BUDGET);
            }
            _ => i += 1,
        }
    }
    DEFAULT_BUDGET
}
