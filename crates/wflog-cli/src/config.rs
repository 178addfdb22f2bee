//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use wflog_core::{DEFAULT_FILE_PATTERN, IngestOptions, LabelStyle, MatchMode};
use wflog_mining::{DEFAULT_DEPENDENCY_THRESHOLD, DEFAULT_NOISE_THRESHOLD, MinerSettings};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Glob of log file names inside the input directory.
    pub file_pattern: String,
    /// How application identifiers are matched against event bodies.
    pub app_match: MatchMode,
    /// Label style for transition events.
    pub transition_labels: LabelStyle,
    /// Noise tolerance of the inductive miner.
    pub noise_threshold: f64,
    /// Dependency cut-off of the heuristic miner.
    pub dependency_threshold: f64,
    /// Feed task changes to discovery as well as transitions.
    pub discover_task_changes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            app_match: MatchMode::default(),
            transition_labels: LabelStyle::default(),
            noise_threshold: DEFAULT_NOISE_THRESHOLD,
            dependency_threshold: DEFAULT_DEPENDENCY_THRESHOLD,
            discover_task_changes: false,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // WFLOG_NOISE_THRESHOLD, WFLOG_APP_MATCH, ...
        figment = figment.merge(Env::prefixed("WFLOG_"));

        figment.extract()
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            file_pattern: self.file_pattern.clone(),
            labels: self.transition_labels,
        }
    }

    pub const fn miner_settings(&self) -> MinerSettings {
        MinerSettings {
            noise_threshold: self.noise_threshold,
            dependency_threshold: self.dependency_threshold,
        }
    }
}

/// Returns the platform-specific config directory for wflog.
///
/// On Linux: `~/.config/wflog`
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("wflog"))
}
