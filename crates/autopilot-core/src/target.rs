use crate::error::{AutopilotError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// WorkflowTarget
// ---------------------------------------------------------------------------

/// One remotely triggerable workflow. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowTarget {
    pub owner: String,
    pub repo: String,
    /// Workflow file name (e.g. `ci.yml`) or numeric workflow id.
    pub workflow: String,
    #[serde(rename = "ref", default = "default_ref")]
    pub git_ref: String,
    #[serde(default)]
    pub inputs: HashMap<String, String>,
}

fn default_ref() -> String {
    "main".to_string()
}

impl WorkflowTarget {
    /// `owner/repo`, the form selectors and summaries use.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

#[derive(Debug, Deserialize)]
struct TargetsFile {
    #[serde(default)]
    targets: Vec<WorkflowTarget>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parse the `targets` array from a JSON config document.
///
/// Operator errors are fatal: a missing file, a malformed document, an entry
/// with a missing or empty required field, and an empty target list all fail
/// the whole run before anything is dispatched.
pub fn load_targets(path: &Path) -> Result<Vec<WorkflowTarget>> {
    if !path.exists() {
        return Err(AutopilotError::TargetsNotFound(path.display().to_string()));
    }
    let data = std::fs::read_to_string(path)?;
    let parsed: TargetsFile = serde_json::from_str(&data)
        .map_err(|e| AutopilotError::InvalidTargetsConfig(e.to_string()))?;
    if parsed.targets.is_empty() {
        return Err(AutopilotError::NoTargets);
    }
    for (index, target) in parsed.targets.iter().enumerate() {
        validate_target(index, target)?;
    }
    Ok(parsed.targets)
}

fn validate_target(index: usize, target: &WorkflowTarget) -> Result<()> {
    for (field, value) in [
        ("owner", &target.owner),
        ("repo", &target.repo),
        ("workflow", &target.workflow),
        ("ref", &target.git_ref),
    ] {
        if value.trim().is_empty() {
            return Err(AutopilotError::InvalidTarget {
                index,
                reason: format!("'{field}' must not be empty"),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Retain targets matched by any selector; no selectors keeps everything.
/// A selector matches either `owner/repo` or the bare repo name, exact and
/// case-sensitive.
pub fn filter_targets(targets: &[WorkflowTarget], selectors: &[String]) -> Vec<WorkflowTarget> {
    if selectors.is_empty() {
        return targets.to_vec();
    }
    targets
        .iter()
        .filter(|t| {
            selectors
                .iter()
                .any(|s| *s == t.full_name() || *s == t.repo)
        })
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Validation warnings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ConfigWarning {
    pub message: String,
}

static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_re() -> &'static Regex {
    NAME_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap())
}

/// Non-fatal lint over an already-loaded target list. Duplicate entries and
/// implausible names dispatch fine from this tool's perspective but usually
/// mean a config typo.
pub fn validate_targets(targets: &[WorkflowTarget]) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for target in targets {
        let key = (target.full_name(), target.workflow.clone());
        if !seen.insert(key) {
            warnings.push(ConfigWarning {
                message: format!(
                    "duplicate target: '{}' workflow '{}' appears more than once",
                    target.full_name(),
                    target.workflow
                ),
            });
        }

        for (field, value) in [("owner", &target.owner), ("repo", &target.repo)] {
            if !name_re().is_match(value) {
                warnings.push(ConfigWarning {
                    message: format!(
                        "'{value}' does not look like a GitHub {field} name"
                    ),
                });
            }
        }

        let looks_like_file =
            target.workflow.ends_with(".yml") || target.workflow.ends_with(".yaml");
        let looks_like_id = target.workflow.chars().all(|c| c.is_ascii_digit());
        if !looks_like_file && !looks_like_id {
            warnings.push(ConfigWarning {
                message: format!(
                    "workflow '{}' on '{}' is neither a .yml/.yaml file nor a numeric id",
                    target.workflow,
                    target.full_name()
                ),
            });
        }
    }

    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join("targets.json");
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn target(owner: &str, repo: &str) -> WorkflowTarget {
        WorkflowTarget {
            owner: owner.to_string(),
            repo: repo.to_string(),
            workflow: "ci.yml".to_string(),
            git_ref: "main".to_string(),
            inputs: HashMap::new(),
        }
    }

    #[test]
    fn load_parses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{"targets": [{"owner": "octo", "repo": "app", "workflow": "deploy.yml"}]}"#,
        );
        let targets = load_targets(&path).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].git_ref, "main");
        assert!(targets[0].inputs.is_empty());
        assert_eq!(targets[0].full_name(), "octo/app");
    }

    #[test]
    fn load_parses_explicit_ref_and_inputs() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{"targets": [{"owner": "octo", "repo": "app", "workflow": "deploy.yml",
                "ref": "release", "inputs": {"env": "prod"}}]}"#,
        );
        let targets = load_targets(&path).unwrap();
        assert_eq!(targets[0].git_ref, "release");
        assert_eq!(targets[0].inputs["env"], "prod");
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = load_targets(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, AutopilotError::TargetsNotFound(_)));
    }

    #[test]
    fn empty_target_list_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"targets": []}"#);
        assert!(matches!(
            load_targets(&path).unwrap_err(),
            AutopilotError::NoTargets
        ));
    }

    #[test]
    fn absent_targets_key_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{}"#);
        assert!(matches!(
            load_targets(&path).unwrap_err(),
            AutopilotError::NoTargets
        ));
    }

    #[test]
    fn missing_required_field_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"targets": [{"owner": "octo", "repo": "app"}]}"#);
        assert!(matches!(
            load_targets(&path).unwrap_err(),
            AutopilotError::InvalidTargetsConfig(_)
        ));
    }

    #[test]
    fn empty_required_field_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{"targets": [{"owner": "", "repo": "app", "workflow": "ci.yml"}]}"#,
        );
        let err = load_targets(&path).unwrap_err();
        assert!(matches!(
            err,
            AutopilotError::InvalidTarget { index: 0, .. }
        ));
    }

    #[test]
    fn filter_matches_full_name() {
        let targets = vec![target("owner1", "repoA"), target("owner2", "repoB")];
        let kept = filter_targets(&targets, &["owner1/repoA".to_string()]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].repo, "repoA");
    }

    #[test]
    fn filter_matches_bare_repo() {
        let targets = vec![target("owner1", "repoA"), target("owner2", "repoB")];
        let kept = filter_targets(&targets, &["repoB".to_string()]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].owner, "owner2");
    }

    #[test]
    fn filter_is_case_sensitive() {
        let targets = vec![target("owner1", "repoA")];
        assert!(filter_targets(&targets, &["REPOA".to_string()]).is_empty());
        assert!(filter_targets(&targets, &["Owner1/repoA".to_string()]).is_empty());
    }

    #[test]
    fn no_selectors_keeps_all() {
        let targets = vec![target("owner1", "repoA"), target("owner2", "repoB")];
        assert_eq!(filter_targets(&targets, &[]).len(), 2);
    }

    #[test]
    fn validate_flags_duplicates() {
        let targets = vec![target("octo", "app"), target("octo", "app")];
        let warnings = validate_targets(&targets);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
    }

    #[test]
    fn validate_flags_odd_names_and_workflows() {
        let mut odd = target("good owner", "app");
        odd.workflow = "deploy".to_string();
        let warnings = validate_targets(&[odd]);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("does not look like a GitHub owner name")));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("neither a .yml/.yaml file nor a numeric id")));
    }

    #[test]
    fn validate_accepts_clean_config() {
        let mut by_id = target("octo", "app");
        by_id.workflow = "8442".to_string();
        let warnings = validate_targets(&[target("octo", "other-app"), by_id]);
        assert!(warnings.is_empty());
    }
}
