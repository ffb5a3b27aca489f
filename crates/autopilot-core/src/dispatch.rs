use crate::error::{AutopilotError, Result};
use crate::target::WorkflowTarget;
use serde::Serialize;
use serde_json::json;

pub const GITHUB_API_BASE: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("autopilot/", env!("CARGO_PKG_VERSION"));

/// Error bodies are reported back to the operator; keep them readable.
const MAX_ERROR_BODY: usize = 200;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of attempting (or simulating) one dispatch. Created once per target
/// per run, used only for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchOutcome {
    pub target: String,
    pub workflow: String,
    pub executed: bool,
    pub failed: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchSummary {
    pub attempted: usize,
    pub executed: usize,
    pub failed: usize,
    pub outcomes: Vec<DispatchOutcome>,
}

impl DispatchSummary {
    pub fn any_failed(&self) -> bool {
        self.failed > 0
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Issues `workflow_dispatch` trigger calls, one target at a time.
///
/// No retries and no concurrency: runs are driven by schedulers that handle
/// their own cadence, and a failed target must not stop the rest of the list.
pub struct Dispatcher {
    client: reqwest::blocking::Client,
    api_base: String,
    token: Option<String>,
}

impl Dispatcher {
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_api_base(token, GITHUB_API_BASE)
    }

    /// Point the dispatcher at a different API origin (used by tests).
    pub fn with_api_base(token: Option<String>, api_base: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.into(),
            token,
        })
    }

    /// Trigger one target, or simulate it. Network errors and non-success
    /// responses become a failed outcome — they never abort the run.
    pub fn dispatch(&self, target: &WorkflowTarget, dry_run: bool) -> DispatchOutcome {
        if dry_run {
            return DispatchOutcome {
                target: target.full_name(),
                workflow: target.workflow.clone(),
                executed: false,
                failed: false,
                message: format!(
                    "dry run: would trigger '{}' on ref '{}'",
                    target.workflow, target.git_ref
                ),
            };
        }

        match self.trigger(target) {
            Ok(()) => DispatchOutcome {
                target: target.full_name(),
                workflow: target.workflow.clone(),
                executed: true,
                failed: false,
                message: format!("triggered '{}' on ref '{}'", target.workflow, target.git_ref),
            },
            Err(e) => {
                tracing::warn!(repo = %target.full_name(), error = %e, "dispatch failed");
                DispatchOutcome {
                    target: target.full_name(),
                    workflow: target.workflow.clone(),
                    executed: false,
                    failed: true,
                    message: format!("failed: {e}"),
                }
            }
        }
    }

    fn trigger(&self, target: &WorkflowTarget) -> Result<()> {
        let url = format!(
            "{}/repos/{}/{}/actions/workflows/{}/dispatches",
            self.api_base, target.owner, target.repo, target.workflow
        );

        let mut body = serde_json::Map::new();
        body.insert("ref".to_string(), json!(target.git_ref));
        if !target.inputs.is_empty() {
            body.insert("inputs".to_string(), json!(target.inputs));
        }

        let mut request = self
            .client
            .post(&url)
            .header("Accept", "application/vnd.github+json")
            .json(&serde_json::Value::Object(body));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().unwrap_or_default();
            body.truncate(MAX_ERROR_BODY);
            return Err(AutopilotError::DispatchRejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Dispatch every target sequentially and aggregate the outcomes.
    pub fn run(&self, targets: &[WorkflowTarget], dry_run: bool) -> DispatchSummary {
        let mut outcomes = Vec::with_capacity(targets.len());
        for target in targets {
            tracing::info!(
                repo = %target.full_name(),
                workflow = %target.workflow,
                dry_run,
                "dispatching"
            );
            outcomes.push(self.dispatch(target, dry_run));
        }
        let executed = outcomes.iter().filter(|o| o.executed).count();
        let failed = outcomes.iter().filter(|o| o.failed).count();
        DispatchSummary {
            attempted: outcomes.len(),
            executed,
            failed,
            outcomes,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
