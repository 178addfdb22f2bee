//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use wflog_core::{LabelStyle, MatchMode};

use crate::config::Config;

/// Process mining for wiki workflow event logs.
///
/// Reads `events.*` logs, normalizes transition and task-change events per
/// application and mines workflow graphs from them.
#[derive(Debug, Parser)]
#[command(name = "wflog", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Mine workflow graphs and write a wiki markup report.
    Mine {
        #[command(flatten)]
        input: InputArgs,

        /// Report file; replaced on every run.
        #[arg(short, long)]
        output: PathBuf,

        /// Noise threshold of the inductive miner, in [0, 1].
        #[arg(long)]
        noise_threshold: Option<f64>,

        /// Dependency threshold of the heuristic miner, in [-1, 1].
        #[arg(long, allow_negative_numbers = true)]
        dependency_threshold: Option<f64>,

        /// Feed task changes to discovery as well as transitions.
        #[arg(long)]
        task_changes: bool,
    },

    /// Print normalized events as JSON lines.
    Events {
        #[command(flatten)]
        input: InputArgs,

        /// Print ingest statistics to stderr.
        #[arg(long)]
        stats: bool,
    },
}

/// Where to read events and which applications to select.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// Directory containing the event log files.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Application identifier (e.g. `SomeAppWFG`); repeatable.
    #[arg(short = 'a', long = "app", required = true, num_args = 1..)]
    pub apps: Vec<String>,

    /// Glob of log file names inside the input directory.
    #[arg(long)]
    pub pattern: Option<String>,

    /// How application identifiers are matched: token, substring or regex.
    #[arg(long = "match")]
    pub match_mode: Option<MatchMode>,

    /// Transition label style: direct or qualified.
    #[arg(long)]
    pub labels: Option<LabelStyle>,
}

impl InputArgs {
    /// Applies the flags given on the command line over `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(pattern) = &self.pattern {
            config.file_pattern.clone_from(pattern);
        }
        if let Some(mode) = self.match_mode {
            config.app_match = mode;
        }
        if let Some(labels) = self.labels {
            config.transition_labels = labels;
        }
    }
}
