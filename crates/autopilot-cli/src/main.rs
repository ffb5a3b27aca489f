mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, limits::LimitsSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "autopilot",
    about = "CI automation toolkit — hourly rate-limit windows and remote workflow dispatch",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .autopilot/ or .git/)
    #[arg(long, global = true, env = "AUTOPILOT_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trigger configured remote workflows
    Dispatch {
        /// Targets config (default: .autopilot/targets.json under the root)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Select targets by "owner/repo" or bare repo name (repeatable)
        #[arg(long = "target", visible_alias = "service")]
        targets: Vec<String>,

        /// Report what would be triggered without any network call
        #[arg(long)]
        dry_run: bool,
    },

    /// Inspect and mutate the hourly rate-limit window
    Limits {
        #[command(subcommand)]
        subcommand: LimitsSubcommand,
    },

    /// Validate the targets configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Dispatch {
            config,
            targets,
            dry_run,
        } => cmd::dispatch::run(&root, config.as_deref(), &targets, dry_run, cli.json),
        Commands::Limits { subcommand } => cmd::limits::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
