use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// The external review/agent services whose request volume is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    Coderabbit,
    Claude,
    Cursor,
}

impl Service {
    pub fn all() -> &'static [Service] {
        &[Service::Coderabbit, Service::Claude, Service::Cursor]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Service::Coderabbit => "coderabbit",
            Service::Claude => "claude",
            Service::Cursor => "cursor",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Service {
    type Err = crate::error::AutopilotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "coderabbit" => Ok(Service::Coderabbit),
            "claude" => Ok(Service::Claude),
            "cursor" => Ok(Service::Cursor),
            _ => Err(crate::error::AutopilotError::UnknownService(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
