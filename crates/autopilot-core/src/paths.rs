use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const AUTOPILOT_DIR: &str = ".autopilot";

pub const STATE_FILE: &str = ".autopilot/rate-limits.json";
pub const TARGETS_FILE: &str = ".autopilot/targets.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn autopilot_dir(root: &Path) -> PathBuf {
    root.join(AUTOPILOT_DIR)
}

pub fn state_path(root: &Path) -> PathBuf {
    root.join(STATE_FILE)
}

pub fn targets_path(root: &Path) -> PathBuf {
    root.join(TARGETS_FILE)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
