use crate::output::print_json;
use anyhow::Context;
use autopilot_core::paths;
use autopilot_core::target;
use clap::Subcommand;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Check the targets config for fatal errors and suspicious entries
    Validate {
        /// Targets config (default: .autopilot/targets.json under the root)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

pub fn run(root: &Path, subcommand: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcommand {
        ConfigSubcommand::Validate { config } => validate(root, config.as_deref(), json),
    }
}

fn validate(root: &Path, config_path: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| paths::targets_path(root));
    let targets = target::load_targets(&path)
        .with_context(|| format!("failed to load targets from {}", path.display()))?;
    let warnings = target::validate_targets(&targets);

    if json {
        return print_json(&serde_json::json!({
            "targets": targets.len(),
            "warnings": warnings,
        }));
    }

    for warning in &warnings {
        println!("warning: {}", warning.message);
    }
    if warnings.is_empty() {
        println!("ok: {} targets", targets.len());
    } else {
        println!("\n{} targets, {} warnings", targets.len(), warnings.len());
    }
    Ok(())
}
