use std::path::{Path, PathBuf};

/// Resolve the project root.
///
/// Priority:
/// 1. `--root` flag / `AUTOPILOT_ROOT` env var (passed in as `explicit`)
/// 2. Nearest ancestor of `cwd` containing `.autopilot/`
/// 3. Nearest ancestor of `cwd` containing `.git/`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    for marker in [".autopilot", ".git"] {
        if let Some(dir) = cwd.ancestors().find(|d| d.join(marker).is_dir()) {
            return dir.to_path_buf();
        }
    }

    cwd
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        let elsewhere = TempDir::new().unwrap();
        assert_eq!(resolve_root(Some(elsewhere.path())), elsewhere.path());
    }
}
