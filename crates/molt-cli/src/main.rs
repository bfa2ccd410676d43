//! Molt agent CLI - unattended reply agent for one Moltbook board
//!
//! Usage:
//!   molt-agent                      Poll forever with a random delay between cycles
//!   molt-agent --once               Run a single cycle and exit
//!   molt-agent --config <file>      Use a different config file
//!   molt-agent --state <file>       Use a different state document
//!
//! Exit codes: 0 on normal completion, 2 on configuration errors,
//! 1 on any other failure.

use anyhow::{Context, Result};
use clap::Parser;
use molt_core::{AgentConfig, MoltError};
use molt_gateway::{get_api_key, HttpGateway};
use molt_orchestrator::{render_guide, CycleOutcome, HeuristicStrategy, Scheduler};
use molt_store::{FileStateStore, StateStore};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "molt-agent")]
#[command(author, version, about = "Unattended Moltbook reply agent")]
struct Cli {
    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,

    /// Agent configuration file
    #[arg(long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,

    /// Persistent state document
    #[arg(long, value_name = "FILE", default_value = "memory/state.json")]
    state: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install logger: {e}");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Configuration and credentials are checked before anything touches disk or network
    let config = AgentConfig::load(&cli.config)?;
    let api_key = get_api_key()?;

    let store = FileStateStore::open(&cli.state)
        .with_context(|| format!("Failed to open state at {}", cli.state.display()))?;
    let gateway = HttpGateway::new(&config, &api_key)?;

    info!(
        "Starting {} | DRY_RUN={} | submolt={}",
        config.name, config.dry_run, config.submolt
    );
    debug!("{}", render_guide());

    let scheduler = Scheduler::new(config, store, gateway, HeuristicStrategy);

    if cli.once {
        let outcome = scheduler.run_cycle().await?;
        report(&outcome);
        let recent = scheduler.store().count_actions_in_last_hour()?;
        debug!("Actions in the last hour: {}", recent);
        return Ok(());
    }

    scheduler.run_forever().await?;
    Ok(())
}

fn report(outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::RateLimited { actions_in_window } => {
            info!("Cycle skipped: {} actions in the last hour", actions_in_window)
        }
        CycleOutcome::NoCandidate { fetched } => {
            info!("No reply this cycle ({} posts checked)", fetched)
        }
        CycleOutcome::Replied { post_id, dry_run } => {
            info!("Cycle done: post {} (dry_run={})", post_id, dry_run)
        }
    }
}

/// Map a failure to the process exit code, looking through added context
fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<MoltError>())
        .map(MoltError::exit_code)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["molt-agent"]).unwrap();
        assert!(!cli.once);
        assert!(!cli.verbose);
        assert_eq!(cli.config, PathBuf::from("config.json"));
        assert_eq!(cli.state, PathBuf::from("memory/state.json"));
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "molt-agent",
            "--once",
            "-v",
            "--config",
            "/etc/molt.json",
            "--state",
            "/tmp/state.json",
        ])
        .unwrap();
        assert!(cli.once);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("/etc/molt.json"));
        assert_eq!(cli.state, PathBuf::from("/tmp/state.json"));
    }

    #[test]
    fn test_exit_codes() {
        let config_err = anyhow::Error::new(MoltError::Config("bad".into()));
        assert_eq!(exit_code_for(&config_err), 2);

        let wrapped = anyhow::Error::new(MoltError::Config("bad".into())).context("loading");
        assert_eq!(exit_code_for(&wrapped), 2);

        let request_err = anyhow::Error::new(MoltError::RequestFailed {
            attempts: 3,
            last_error: "HTTP 500".into(),
        });
        assert_eq!(exit_code_for(&request_err), 1);

        assert_eq!(exit_code_for(&anyhow::anyhow!("plain")), 1);
    }
}
