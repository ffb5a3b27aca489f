use crate::state;
use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// LimitCheck
// ---------------------------------------------------------------------------

/// Verdict for one service against its effective ceiling.
#[derive(Debug, Clone, Serialize)]
pub struct LimitCheck {
    pub exceeded: bool,
    pub message: String,
}

/// Decide whether `used` requests have exhausted `ceiling` within the window
/// anchored at `window_start`.
///
/// An already-expired window can never be exceeded — the caller's next reset
/// will zero the counts, so the verdict reports that instead of a stale denial.
pub fn check(
    used: u64,
    ceiling: u64,
    window_start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> LimitCheck {
    if state::window_expired(window_start, now) {
        return LimitCheck {
            exceeded: false,
            message: "window reset: counts restart from zero".to_string(),
        };
    }
    let resets_in = state::seconds_until_reset(window_start, now);
    if used >= ceiling {
        LimitCheck {
            exceeded: true,
            message: format!("{used}/{ceiling} used, window resets in {resets_in}s"),
        }
    } else {
        LimitCheck {
            exceeded: false,
            message: format!("{} of {} remaining", ceiling - used, ceiling),
        }
    }
}

/// Apply the schedule factor to a configured ceiling. Floors, but never below
/// one — a ceiling of zero would deny everything for the rest of the window.
pub fn effective_ceiling(base: u32, factor: f64) -> u64 {
    ((f64::from(base) * factor).floor() as u64).max(1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
