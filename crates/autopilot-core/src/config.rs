use crate::error::{AutopilotError, Result};
use crate::service::Service;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Environment variables
// ---------------------------------------------------------------------------

/// Bearer credential for workflow dispatch calls.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Override for the persisted rate-limit state location.
pub const STATE_PATH_ENV: &str = "AUTOPILOT_STATE_PATH";

const CODERABBIT_HOURLY_ENV: &str = "AUTOPILOT_CODERABBIT_HOURLY";
const CLAUDE_HOURLY_ENV: &str = "AUTOPILOT_CLAUDE_HOURLY";
const CURSOR_HOURLY_ENV: &str = "AUTOPILOT_CURSOR_HOURLY";

// ---------------------------------------------------------------------------
// RateLimitConfig
// ---------------------------------------------------------------------------

/// Static per-service ceilings plus the state-file override.
///
/// Constructed once per invocation (usually from the environment) and passed
/// into each entry point — never read from globals after startup.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitConfig {
    pub coderabbit_hourly: u32,
    pub claude_hourly: u32,
    pub cursor_hourly: u32,
    pub state_path: Option<PathBuf>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            coderabbit_hourly: 10,
            claude_hourly: 60,
            cursor_hourly: 30,
            state_path: None,
        }
    }
}

impl RateLimitConfig {
    /// Build from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparsable ceiling overrides are
    /// ignored with a warning rather than aborting a scheduled run.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        for (key, slot) in [
            (CODERABBIT_HOURLY_ENV, &mut cfg.coderabbit_hourly),
            (CLAUDE_HOURLY_ENV, &mut cfg.claude_hourly),
            (CURSOR_HOURLY_ENV, &mut cfg.cursor_hourly),
        ] {
            if let Some(raw) = lookup(key) {
                match raw.trim().parse::<u32>() {
                    Ok(v) => *slot = v,
                    Err(_) => {
                        tracing::warn!(key, value = %raw, "ignoring unparsable ceiling override");
                    }
                }
            }
        }
        cfg.state_path = lookup(STATE_PATH_ENV)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        cfg
    }

    pub fn ceiling(&self, service: Service) -> u32 {
        match service {
            Service::Coderabbit => self.coderabbit_hourly,
            Service::Claude => self.claude_hourly,
            Service::Cursor => self.cursor_hourly,
        }
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Read the dispatch credential from the environment. Missing or blank is a
/// configuration error — callers decide whether a credential is required
/// (dry runs are not).
pub fn github_token() -> Result<String> {
    std::env::var(TOKEN_ENV)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .ok_or(AutopilotError::MissingCredential(TOKEN_ENV))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn defaults_without_overrides() {
        let cfg = RateLimitConfig::from_lookup(|_| None);
        assert_eq!(cfg, RateLimitConfig::default());
        assert_eq!(cfg.ceiling(Service::Coderabbit), 10);
        assert_eq!(cfg.ceiling(Service::Claude), 60);
        assert_eq!(cfg.ceiling(Service::Cursor), 30);
    }

    #[test]
    fn env_overrides_apply() {
        let cfg = RateLimitConfig::from_lookup(lookup_from(&[
            ("AUTOPILOT_CLAUDE_HOURLY", "5"),
            ("AUTOPILOT_STATE_PATH", "/var/lib/autopilot/state.json"),
        ]));
        assert_eq!(cfg.claude_hourly, 5);
        assert_eq!(cfg.coderabbit_hourly, 10);
        assert_eq!(
            cfg.state_path,
            Some(PathBuf::from("/var/lib/autopilot/state.json"))
        );
    }

    #[test]
    fn unparsable_override_is_ignored() {
        let cfg =
            RateLimitConfig::from_lookup(lookup_from(&[("AUTOPILOT_CURSOR_HOURLY", "a lot")]));
        assert_eq!(cfg.cursor_hourly, 30);
    }

    #[test]
    fn blank_state_path_is_ignored() {
        let cfg = RateLimitConfig::from_lookup(lookup_from(&[("AUTOPILOT_STATE_PATH", "  ")]));
        assert_eq!(cfg.state_path, None);
    }
}
