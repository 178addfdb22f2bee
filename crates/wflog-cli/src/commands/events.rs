//! Implementation of the `wflog events` command.
//!
//! Outputs each application's merged event stream as JSONL to stdout.

use std::io::{BufWriter, Write, stderr, stdout};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use wflog_core::{AppMatcher, EventLog, NormalizedEvent};

use crate::config::Config;

/// One output line: the event tagged with the application it was selected for.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    pub application: &'a str,
    #[serde(flatten)]
    pub event: &'a NormalizedEvent,
}

/// Run the events command.
pub fn run(input: &Path, apps: &[String], config: &Config, stats: bool) -> Result<()> {
    let log = EventLog::from_dir(input, &config.ingest_options())
        .with_context(|| format!("failed to read event log: {}", input.display()))?;

    let stdout = stdout();
    let mut writer = BufWriter::new(stdout.lock());
    'apps: for app in apps {
        let matcher = AppMatcher::new(app.as_str(), config.app_match)?;
        let selection = log.for_application(&matcher);
        if selection.is_no_data() {
            tracing::warn!(application = app.as_str(), "no matching log entries");
            continue;
        }

        for event in selection.events() {
            let record = EventRecord {
                application: selection.application(),
                event,
            };
            serde_json::to_writer(&mut writer, &record).context("failed to serialize event")?;
            // Handle broken pipe gracefully (e.g., when piped to `head`)
            if writeln!(writer).is_err() {
                break 'apps;
            }
        }
    }
    // A closed pipe surfaces here too.
    let _ = writer.flush();

    if stats {
        let mut err = stderr().lock();
        serde_json::to_writer_pretty(&mut err, log.stats())
            .context("failed to serialize statistics")?;
        writeln!(err)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};
    use wflog_core::{CaseId, EventKind, UserId};

    #[test]
    fn test_record_flattens_event() {
        let event = NormalizedEvent {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            user: UserId::new("alice").unwrap(),
            activity: "Review".to_string(),
            name: "Review".to_string(),
            state: "Review".to_string(),
            case_id: CaseId::new("Case1").unwrap(),
            kind: EventKind::Transition,
            raw_body: "event:TRANSITION;AppA".to_string(),
        };
        let record = EventRecord {
            application: "AppA",
            event: &event,
        };
        insta::assert_snapshot!(serde_json::to_string(&record).unwrap(), @r#"{"application":"AppA","timestamp":"2024-01-01T10:00:00Z","user":"alice","activity":"Review","name":"Review","state":"Review","case_id":"Case1","kind":"transition","raw_body":"event:TRANSITION;AppA"}"#);
    }
}
