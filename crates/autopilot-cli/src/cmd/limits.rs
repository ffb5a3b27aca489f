use crate::output::{print_json, print_table};
use anyhow::{bail, Context};
use autopilot_core::config::RateLimitConfig;
use autopilot_core::limiter;
use autopilot_core::paths;
use autopilot_core::schedule;
use autopilot_core::service::Service;
use autopilot_core::state::{self, RateLimitState};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use std::path::Path;
use std::str::FromStr;

#[derive(Subcommand)]
pub enum LimitsSubcommand {
    /// Show request counts against every service's ceiling
    Show,

    /// Check one service against its effective ceiling (exit 1 when exceeded)
    Check { service: String },

    /// Add requests to a service's counter
    Record {
        service: String,

        /// Number of requests to add
        #[arg(long, default_value = "1")]
        count: u64,
    },

    /// Zero all counts and open a fresh window
    Reset,
}

pub fn run(root: &Path, subcommand: LimitsSubcommand, json: bool) -> anyhow::Result<()> {
    let cfg = RateLimitConfig::from_env();
    let path = cfg
        .state_path
        .clone()
        .unwrap_or_else(|| paths::state_path(root));
    let now = Utc::now();

    match subcommand {
        LimitsSubcommand::Show => show(&cfg, &path, now, json),
        LimitsSubcommand::Check { service } => check(&cfg, &path, &service, now, json),
        LimitsSubcommand::Record { service, count } => {
            record(&path, &service, count, now, json)
        }
        LimitsSubcommand::Reset => reset(&path, now, json),
    }
}

// ---------------------------------------------------------------------------
// Subcommand bodies
// ---------------------------------------------------------------------------

#[derive(serde::Serialize)]
struct ServiceRow {
    service: &'static str,
    used: u64,
    ceiling: u32,
    effective_ceiling: u64,
    exceeded: bool,
}

fn show(
    cfg: &RateLimitConfig,
    path: &Path,
    now: DateTime<Utc>,
    json: bool,
) -> anyhow::Result<()> {
    let loaded = RateLimitState::load(path, now).reset_window_if_needed(now);
    let factor = schedule::schedule_factor(now);
    let resets_in = state::seconds_until_reset(loaded.window_start, now);

    let rows: Vec<ServiceRow> = Service::all()
        .iter()
        .map(|&svc| {
            let effective = limiter::effective_ceiling(cfg.ceiling(svc), factor);
            let used = loaded.count(svc);
            ServiceRow {
                service: svc.as_str(),
                used,
                ceiling: cfg.ceiling(svc),
                effective_ceiling: effective,
                exceeded: used >= effective,
            }
        })
        .collect();

    if json {
        #[derive(serde::Serialize)]
        struct ShowOutput<'a> {
            schedule_factor: f64,
            window_start: DateTime<Utc>,
            resets_in_secs: i64,
            services: &'a [ServiceRow],
        }
        return print_json(&ShowOutput {
            schedule_factor: factor,
            window_start: loaded.window_start,
            resets_in_secs: resets_in,
            services: &rows,
        });
    }

    println!("Schedule factor: {factor}");
    println!("Window resets in: {resets_in}s");
    println!();
    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.service.to_string(),
                r.used.to_string(),
                r.ceiling.to_string(),
                r.effective_ceiling.to_string(),
                if r.exceeded { "exceeded" } else { "ok" }.to_string(),
            ]
        })
        .collect();
    print_table(&["SERVICE", "USED", "CEILING", "EFFECTIVE", "STATE"], &table);
    Ok(())
}

fn check(
    cfg: &RateLimitConfig,
    path: &Path,
    service_raw: &str,
    now: DateTime<Utc>,
    json: bool,
) -> anyhow::Result<()> {
    let service = Service::from_str(service_raw)?;
    let mut current = RateLimitState::load(path, now).reset_window_if_needed(now);
    let factor = schedule::schedule_factor(now);
    let effective = limiter::effective_ceiling(cfg.ceiling(service), factor);
    let verdict = limiter::check(current.count(service), effective, current.window_start, now);

    // A reset window is worth keeping even when the caller only asked a question.
    current
        .save(path, now)
        .with_context(|| format!("failed to persist state to {}", path.display()))?;

    if json {
        #[derive(serde::Serialize)]
        struct CheckOutput<'a> {
            service: &'static str,
            used: u64,
            effective_ceiling: u64,
            schedule_factor: f64,
            exceeded: bool,
            message: &'a str,
        }
        print_json(&CheckOutput {
            service: service.as_str(),
            used: current.count(service),
            effective_ceiling: effective,
            schedule_factor: factor,
            exceeded: verdict.exceeded,
            message: &verdict.message,
        })?;
    } else {
        println!("{service}: {}", verdict.message);
    }

    if verdict.exceeded {
        bail!("rate limit exceeded for {service}");
    }
    Ok(())
}

fn record(
    path: &Path,
    service_raw: &str,
    count: u64,
    now: DateTime<Utc>,
    json: bool,
) -> anyhow::Result<()> {
    let service = Service::from_str(service_raw)?;
    let mut current = RateLimitState::load(path, now).reset_window_if_needed(now);
    current.record(service, count);
    current
        .save(path, now)
        .with_context(|| format!("failed to persist state to {}", path.display()))?;

    if json {
        print_json(&serde_json::json!({
            "service": service.as_str(),
            "used": current.count(service),
        }))?;
    } else {
        println!("{service}: {} used this window", current.count(service));
    }
    Ok(())
}

fn reset(path: &Path, now: DateTime<Utc>, json: bool) -> anyhow::Result<()> {
    let mut fresh = RateLimitState::new(now);
    fresh
        .save(path, now)
        .with_context(|| format!("failed to persist state to {}", path.display()))?;

    if json {
        print_json(&fresh)?;
    } else {
        println!("window reset: all counts zeroed");
    }
    Ok(())
}
