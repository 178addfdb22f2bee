//! Implementation of the `wflog mine` command.
//!
//! Reads the event log once, then writes one tab pane per application to the
//! report and the application's handover network next to it.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use wflog_core::{AppEvents, AppMatcher, EventLog, NormalizedEvent};
use wflog_mining::handover_of_work;

use crate::config::Config;
use crate::markup::{AppSection, write_app_section};

/// Path of the handover network written next to `output`.
pub fn handover_path(output: &Path) -> PathBuf {
    let mut path = output.as_os_str().to_owned();
    path.push(".sn.txt");
    PathBuf::from(path)
}

/// Run the mine command.
pub fn run(input: &Path, output: &Path, apps: &[String], config: &Config) -> Result<()> {
    // Truncate before reading so a failed run leaves an empty report.
    let file = File::create(output)
        .with_context(|| format!("failed to create report: {}", output.display()))?;
    let mut writer = BufWriter::new(file);

    let log = EventLog::from_dir(input, &config.ingest_options())
        .with_context(|| format!("failed to read event log: {}", input.display()))?;

    let settings = config.miner_settings();
    let handover_file = handover_path(output);
    let handover_attachment = handover_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    for app in apps {
        let matcher = AppMatcher::new(app.as_str(), config.app_match)?;
        let selection = log.for_application(&matcher);
        let discovery: Vec<&NormalizedEvent> = match &selection {
            AppEvents::Events(events) => {
                events.discovery_events(config.discover_task_changes)
            }
            AppEvents::NoData { application } => {
                tracing::info!(application, "no matching log entries");
                Vec::new()
            }
        };

        write_app_section(
            &mut writer,
            &AppSection {
                selection: &selection,
                discovery: &discovery,
                settings: &settings,
                handover_attachment: &handover_attachment,
            },
        )
        .with_context(|| format!("failed to write report: {}", output.display()))?;

        let network = handover_of_work(discovery.iter().copied());
        fs::write(&handover_file, network.to_dot()).with_context(|| {
            format!(
                "failed to write handover network: {}",
                handover_file.display()
            )
        })?;

        tracing::info!(
            application = app.as_str(),
            events = selection.events().len(),
            mined = discovery.len(),
            "processed application"
        );
    }

    writer
        .flush()
        .with_context(|| format!("failed to write report: {}", output.display()))?;
    Ok(())
}
