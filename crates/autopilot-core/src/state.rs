use crate::error::Result;
use crate::io;
use crate::service::Service;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Length of one accounting window.
pub const WINDOW_SECS: i64 = 3600;

// ---------------------------------------------------------------------------
// RateLimitState
// ---------------------------------------------------------------------------

/// Cumulative request counts per tracked service within the current window.
///
/// Owned by a single process invocation: loaded at start, mutated in memory,
/// written back at the end. Concurrent invocations are not coordinated —
/// last writer wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitState {
    pub coderabbit_requests: u64,
    pub claude_requests: u64,
    pub cursor_requests: u64,
    pub window_start: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl RateLimitState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            coderabbit_requests: 0,
            claude_requests: 0,
            cursor_requests: 0,
            window_start: now,
            last_updated: now,
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Load persisted state from `path`.
    ///
    /// Missing file, unreadable file, and unparsable content all yield a
    /// fresh state anchored at `now` — a cold start is never an error.
    pub fn load(path: &Path, now: DateTime<Utc>) -> Self {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "no readable state, starting fresh");
                return Self::new(now);
            }
        };
        match serde_json::from_str(&data) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid state file, starting fresh");
                Self::new(now)
            }
        }
    }

    /// Persist to `path`, stamping `last_updated = now` first.
    ///
    /// Write failures propagate; read-side failures never do.
    pub fn save(&mut self, path: &Path, now: DateTime<Utc>) -> Result<()> {
        self.last_updated = now;
        let data = serde_json::to_string_pretty(self)?;
        io::atomic_write(path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Window accounting
    // -----------------------------------------------------------------------

    /// Zero all counts and open a new window at `now` iff the current window
    /// has expired; otherwise return the state unchanged. Pure.
    pub fn reset_window_if_needed(self, now: DateTime<Utc>) -> Self {
        if window_expired(self.window_start, now) {
            tracing::debug!(window_start = %self.window_start, "window expired, resetting counts");
            Self::new(now)
        } else {
            self
        }
    }

    pub fn count(&self, service: Service) -> u64 {
        match service {
            Service::Coderabbit => self.coderabbit_requests,
            Service::Claude => self.claude_requests,
            Service::Cursor => self.cursor_requests,
        }
    }

    /// Add `n` requests to a service's counter.
    pub fn record(&mut self, service: Service, n: u64) {
        let counter = match service {
            Service::Coderabbit => &mut self.coderabbit_requests,
            Service::Claude => &mut self.claude_requests,
            Service::Cursor => &mut self.cursor_requests,
        };
        *counter += n;
        self.last_updated = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Window helpers
// ---------------------------------------------------------------------------

/// True once more than [`WINDOW_SECS`] have elapsed since `window_start`.
pub fn window_expired(window_start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - window_start > Duration::seconds(WINDOW_SECS)
}

/// Seconds until the current window rolls over. Zero once already expired.
pub fn seconds_until_reset(window_start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (window_start + Duration::seconds(WINDOW_SECS) - now)
        .num_seconds()
        .max(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_fresh_state() {
        let dir = TempDir::new().unwrap();
        let now = Utc::now();
        let state = RateLimitState::load(&dir.path().join("absent.json"), now);
        assert_eq!(state.coderabbit_requests, 0);
        assert_eq!(state.claude_requests, 0);
        assert_eq!(state.cursor_requests, 0);
        assert_eq!(state.window_start, now);
        assert_eq!(state.last_updated, now);
    }

    #[test]
    fn corrupt_file_yields_fresh_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rate-limits.json");
        std::fs::write(&path, "{not json at all").unwrap();
        let now = Utc::now();
        let state = RateLimitState::load(&path, now);
        assert_eq!(state.claude_requests, 0);
        assert_eq!(state.window_start, now);
    }

    #[test]
    fn wrong_shape_yields_fresh_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rate-limits.json");
        std::fs::write(&path, r#"{"claude_requests": "three"}"#).unwrap();
        let state = RateLimitState::load(&path, Utc::now());
        assert_eq!(state.claude_requests, 0);
    }

    #[test]
    fn save_load_roundtrip_preserves_counts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".autopilot/rate-limits.json");
        let now = Utc::now();

        let mut state = RateLimitState::new(now);
        state.record(Service::Claude, 3);
        state.record(Service::Cursor, 1);
        state.save(&path, now).unwrap();

        let loaded = RateLimitState::load(&path, now).reset_window_if_needed(now);
        assert_eq!(loaded.claude_requests, 3);
        assert_eq!(loaded.cursor_requests, 1);
        assert_eq!(loaded.coderabbit_requests, 0);
    }

    #[test]
    fn save_stamps_last_updated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rate-limits.json");
        let start = Utc::now() - Duration::minutes(10);
        let later = Utc::now();

        let mut state = RateLimitState::new(start);
        state.save(&path, later).unwrap();

        let loaded = RateLimitState::load(&path, later);
        assert_eq!(loaded.window_start, start);
        assert_eq!(loaded.last_updated, later);
    }

    #[test]
    fn expired_window_resets_counts() {
        let now = Utc::now();
        let mut state = RateLimitState::new(now - Duration::hours(2));
        state.record(Service::Coderabbit, 9);

        let reset = state.reset_window_if_needed(now);
        assert_eq!(reset.coderabbit_requests, 0);
        assert_eq!(reset.window_start, now);
    }

    #[test]
    fn live_window_left_unchanged() {
        let now = Utc::now();
        let mut state = RateLimitState::new(now - Duration::minutes(30));
        state.record(Service::Cursor, 4);

        let window_start = state.window_start;
        let kept = state.reset_window_if_needed(now);
        assert_eq!(kept.cursor_requests, 4);
        assert_eq!(kept.window_start, window_start);
    }

    #[test]
    fn expiry_is_strictly_past_one_hour() {
        let now = Utc::now();
        assert!(!window_expired(now - Duration::seconds(WINDOW_SECS), now));
        assert!(window_expired(now - Duration::seconds(WINDOW_SECS + 1), now));
    }

    #[test]
    fn seconds_until_reset_counts_down() {
        let now = Utc::now();
        let secs = seconds_until_reset(now - Duration::minutes(45), now);
        assert_eq!(secs, 900);
        assert_eq!(seconds_until_reset(now - Duration::hours(3), now), 0);
    }

    #[test]
    fn wire_format_field_names() {
        let state = RateLimitState::new(Utc::now());
        let json = serde_json::to_string(&state).unwrap();
        for key in [
            "coderabbit_requests",
            "claude_requests",
            "cursor_requests",
            "window_start",
            "last_updated",
        ] {
            assert!(json.contains(key), "missing key {key}");
        }
    }
}
