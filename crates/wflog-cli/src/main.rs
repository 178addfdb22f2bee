use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wflog_cli::commands::{events, mine};
use wflog_cli::{Cli, Commands, Config, InputArgs};

/// Load config and apply the command-line overrides.
fn load_config(config_path: Option<&Path>, input: &InputArgs) -> Result<Config> {
    let mut config = Config::load_from(config_path).context("failed to load configuration")?;
    input.apply(&mut config);
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match &cli.command {
        Some(Commands::Mine {
            input,
            output,
            noise_threshold,
            dependency_threshold,
            task_changes,
        }) => {
            let mut config = load_config(cli.config.as_deref(), input)?;
            if let Some(value) = noise_threshold {
                config.noise_threshold = *value;
            }
            if let Some(value) = dependency_threshold {
                config.dependency_threshold = *value;
            }
            if *task_changes {
                config.discover_task_changes = true;
            }
            mine::run(&input.input, output, &input.apps, &config)?;
        }
        Some(Commands::Events { input, stats }) => {
            let config = load_config(cli.config.as_deref(), input)?;
            events::run(&input.input, &input.apps, &config, *stats)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
