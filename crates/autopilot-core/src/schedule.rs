use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

// ---------------------------------------------------------------------------
// Schedule factor
// ---------------------------------------------------------------------------

/// Multiplier applied to each service's configured hourly ceiling, derived
/// from UTC wall-clock time only. First match wins:
///
/// 1. outside 08:00–18:00 UTC → 0.7
/// 2. Saturday/Sunday        → 0.6
/// 3. 10:00–16:00 UTC peak   → 1.3
/// 4. otherwise              → 1.0
///
/// The weekend rule only fires inside business hours, so a Saturday at
/// 03:00 UTC gets the off-hours factor, not a compounded one.
pub fn schedule_factor(now: DateTime<Utc>) -> f64 {
    let hour = now.hour();
    if !(8..18).contains(&hour) {
        return 0.7;
    }
    if matches!(now.weekday(), Weekday::Sat | Weekday::Sun) {
        return 0.6;
    }
    if (10..16).contains(&hour) {
        return 1.3;
    }
    1.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
