//! Headless driver for the VRU digital twin

mod cli;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command, RunArgs};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use vrutwin_core::config::TwinConfig;
use vrutwin_core::driver;
use vrutwin_core::facility;
use vrutwin_core::view::SimulationView;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .init();
}

fn load_config(path: Option<&std::path::Path>) -> Result<TwinConfig> {
    match path {
        Some(path) => TwinConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(TwinConfig::default()),
    }
}

fn simulated_span(seconds: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(seconds)
        .with_context(|| format!("--seconds must be a non-negative number, got {}", seconds))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Run(args) => run(args).await,
        Command::Facilities => {
            report::print_catalog(facility::catalog());
            Ok(())
        }
        Command::Config { config } => {
            let config = load_config(config.as_deref())?;
            println!("{}", config.to_json()?);
            Ok(())
        }
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(facility) = args.facility {
        config.facility = facility;
    }
    if let Some(seed) = args.seed {
        config.log.seed = Some(seed);
    }
    let span = simulated_span(args.seconds)?;

    let snapshot = if args.realtime {
        tracing::info!(facility = %config.facility, seconds = args.seconds, "Running twin in real time");
        let handle = driver::spawn(config);
        handle.start().await?;
        tokio::time::sleep(span).await;
        handle.shutdown().await?
    } else {
        tracing::info!(facility = %config.facility, seconds = args.seconds, "Fast-forwarding twin");
        let mut view = SimulationView::mount(config);
        view.set_running(true, Duration::ZERO);
        driver::fast_forward(&mut view, Duration::ZERO, span);
        let snapshot = view.snapshot();
        view.teardown();
        snapshot
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        report::print_summary(&snapshot);
    }
    Ok(())
}
