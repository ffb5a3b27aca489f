use crate::output::{print_json, print_table};
use anyhow::{bail, Context};
use autopilot_core::config;
use autopilot_core::dispatch::{DispatchOutcome, Dispatcher};
use autopilot_core::paths;
use autopilot_core::target;
use std::path::Path;

pub fn run(
    root: &Path,
    config_path: Option<&Path>,
    selectors: &[String],
    dry_run: bool,
    json: bool,
) -> anyhow::Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| paths::targets_path(root));
    let targets = target::load_targets(&path)
        .with_context(|| format!("failed to load targets from {}", path.display()))?;

    let selected = target::filter_targets(&targets, selectors);
    if selected.is_empty() {
        // Only reachable with selectors present — an empty config is fatal earlier.
        bail!("no targets matched selectors: {}", selectors.join(", "));
    }

    // Dry runs never talk to the network, so they don't need a credential.
    let token = if dry_run {
        None
    } else {
        Some(config::github_token()?)
    };

    let dispatcher = Dispatcher::new(token)?;
    let summary = dispatcher.run(&selected, dry_run);

    if json {
        print_json(&summary)?;
    } else {
        let rows: Vec<Vec<String>> = summary
            .outcomes
            .iter()
            .map(|o| {
                vec![
                    o.target.clone(),
                    o.workflow.clone(),
                    status_of(o).to_string(),
                    o.message.clone(),
                ]
            })
            .collect();
        print_table(&["TARGET", "WORKFLOW", "STATUS", "MESSAGE"], &rows);
        println!(
            "\nAttempted: {}  Executed: {}  Failed: {}",
            summary.attempted, summary.executed, summary.failed
        );
    }

    if summary.any_failed() {
        bail!(
            "{} of {} dispatches failed",
            summary.failed,
            summary.attempted
        );
    }
    Ok(())
}

fn status_of(outcome: &DispatchOutcome) -> &'static str {
    if outcome.executed {
        "executed"
    } else if outcome.failed {
        "failed"
    } else {
        "dry-run"
    }
}
