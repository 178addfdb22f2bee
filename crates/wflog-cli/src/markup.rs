//! Wiki markup report: one tab pane per application.

use std::fmt::Write as _;
use std::io::{self, Write};

use wflog_core::{AppEvents, NormalizedEvent};
use wflog_mining::{MinerKind, MinerSettings, RenderStyle, render};

/// Shown in place of a graph when an application has nothing to mine.
pub const NO_DATA_MESSAGE: &str = "No matching log entries for this app";

/// Wiki topic included in every application's "Recommendations" tab.
pub const RECOMMENDATIONS_TOPIC: &str = "PmDashboardRecommendations";

/// Shared overview image shown in every application's "Workflow" tab.
pub const WORKFLOW_OVERVIEW_IMAGE: &str = "/pub/Main/PmDashboard/WorkflowAppOverview.png";

/// Inputs for one application's section of the report.
pub struct AppSection<'a> {
    pub selection: &'a AppEvents,
    /// Events handed to discovery.
    pub discovery: &'a [&'a NormalizedEvent],
    pub settings: &'a MinerSettings,
    /// Attachment name of the handover network.
    pub handover_attachment: &'a str,
}

/// Writes the tab pane of one application.
///
/// A failing miner or renderer only affects its own tab.
pub fn write_app_section<W: Write>(out: &mut W, section: &AppSection<'_>) -> io::Result<()> {
    let app = section.selection.application();

    writeln!(out, "%TAB{{\"{app}\"}}%")?;
    writeln!(out, "%TABPANE{{class=\"jqTabPaneFlatSub\"}}%")?;

    let metrics = format!("{app}/AppMetrics");
    writeln!(out, "%TAB{{\"App Metrics\" encode=\"none\"}}%")?;
    writeln!(out, "<p>[[{metrics}][{metrics}]]</p>")?;
    writeln!(out, "%ENDTAB%")?;

    writeln!(out, "%TAB{{\"Recommendations\"}}%")?;
    writeln!(
        out,
        "%INCLUDE{{\"{RECOMMENDATIONS_TOPIC}\" disablerewriteurls=\"on\"}}%"
    )?;
    writeln!(out, "%ENDTAB%")?;

    writeln!(out, "%TAB{{\"Workflow\"}}%")?;
    writeln!(
        out,
        "<div class=\"prom-large-asset\"><img style=\"max-width:70vw;cursor:pointer;\" src=\"{WORKFLOW_OVERVIEW_IMAGE}\" /></div>"
    )?;
    writeln!(out, "%ENDTAB%")?;

    writeln!(out, "%TAB{{\"Handover of Work\"}}%")?;
    writeln!(
        out,
        "%INCLUDE{{\"%ATTACHURL%/{}\" raw=\"on\" literal=\"on\" encode=\"none\"}}%",
        section.handover_attachment
    )?;
    writeln!(out, "%ENDTAB%")?;

    for style in RenderStyle::ALL {
        for kind in MinerKind::ALL {
            writeln!(out, "%TAB{{\"{kind} ({style})\"}}%")?;
            match model_tab(section, kind, style) {
                Ok(Some(dot)) => {
                    writeln!(out, "<dot>")?;
                    out.write_all(&dot)?;
                    writeln!(out, "</dot>")?;
                }
                Ok(None) => writeln!(out, "{NO_DATA_MESSAGE}")?,
                Err(message) => {
                    tracing::warn!(
                        application = app,
                        miner = %kind,
                        style = %style,
                        error = %message,
                        "discovery failed"
                    );
                    writeln!(out, "{}", html_escape(&message))?;
                }
            }
            writeln!(out, "%ENDTAB%")?;
        }
    }

    writeln!(out, "%TAB{{\"Event Log\"}}%")?;
    out.write_all(event_table(section.selection.events()).as_bytes())?;
    writeln!(out, "%ENDTAB%")?;

    writeln!(out, "%ENDTABPANE%")?;
    writeln!(out, "%ENDTAB%")?;
    Ok(())
}

/// Rendered graph of one miner and style, `None` when there is nothing to mine.
fn model_tab(
    section: &AppSection<'_>,
    kind: MinerKind,
    style: RenderStyle,
) -> Result<Option<Vec<u8>>, String> {
    if section.selection.is_no_data() || section.discovery.is_empty() {
        return Ok(None);
    }
    let miner = kind.miner(section.settings).map_err(|e| e.to_string())?;
    let graph = miner
        .discover(section.discovery)
        .map_err(|e| e.to_string())?;
    Ok(Some(render(&graph, style)))
}

const TABLE_COLUMNS: [&str; 8] = [
    "timestamp",
    "user",
    "activity",
    "name",
    "state",
    "case",
    "kind",
    "raw_body",
];

/// Renders events as an HTML table.
pub fn event_table(events: &[NormalizedEvent]) -> String {
    let mut html = String::new();
    let _ = writeln!(html, "<table border=\"1\" class=\"dataframe ma-table\">");
    let _ = writeln!(html, "  <thead>");
    let _ = writeln!(html, "    <tr style=\"text-align: right;\">");
    for column in TABLE_COLUMNS {
        let _ = writeln!(html, "      <th>{column}</th>");
    }
    let _ = writeln!(html, "    </tr>");
    let _ = writeln!(html, "  </thead>");
    let _ = writeln!(html, "  <tbody>");
    for event in events {
        let cells = [
            event.timestamp.to_rfc3339(),
            event.user.to_string(),
            event.activity.clone(),
            event.name.clone(),
            event.state.clone(),
            event.case_id.to_string(),
            event.kind.to_string(),
            event.raw_body.clone(),
        ];
        let _ = writeln!(html, "    <tr>");
        for cell in &cells {
            let _ = writeln!(html, "      <td>{}</td>", html_escape(cell));
        }
        let _ = writeln!(html, "    </tr>");
    }
    let _ = writeln!(html, "  </tbody>");
    let _ = writeln!(html, "</table>");
    html
}

/// Escapes markup characters and writes non-ASCII as numeric references.
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c if c.is_ascii() => escaped.push(c),
            c => {
                let _ = write!(escaped, "&#{};", u32::from(c));
            }
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};
    use wflog_core::{AppEventLog, CaseId, EventKind, UserId};

    fn event(case: &str, minute: u32, name: &str, user: &str, kind: EventKind) -> NormalizedEvent {
        NormalizedEvent {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 10, minute, 0).unwrap(),
            user: UserId::new(user).unwrap(),
            activity: name.to_string(),
            name: name.to_string(),
            state: name.to_string(),
            case_id: CaseId::new(case).unwrap(),
            kind,
            raw_body: format!("{};AppA;concept:{name};case:{case}", kind.marker()),
        }
    }

    fn write(selection: &AppEvents, discovery: &[&NormalizedEvent]) -> String {
        let settings = MinerSettings::default();
        let section = AppSection {
            selection,
            discovery,
            settings: &settings,
            handover_attachment: "report.txt.sn.txt",
        };
        let mut out = Vec::new();
        write_app_section(&mut out, &section).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn escapes_markup_and_non_ascii() {
        assert_eq!(html_escape("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
        assert_eq!(html_escape("Prüfung"), "Pr&#252;fung");
    }

    #[test]
    fn event_table_lists_escaped_raw_body() {
        let mut logged = event("1", 0, "open", "ann", EventKind::Transition);
        logged.raw_body = "event:TRANSITION;AppA;concept:Prüfung <neu>;case:1".to_string();
        let html = event_table(&[logged]);
        assert!(html.contains(
            "<td>event:TRANSITION;AppA;concept:Pr&#252;fung &lt;neu&gt;;case:1</td>"
        ));
    }

    #[test]
    fn no_data_section() {
        let selection = AppEvents::NoData {
            application: "AppX".to_string(),
        };
        let markup = write(&selection, &[]);
        insta::assert_snapshot!(markup, @r#"
        %TAB{"AppX"}%
        %TABPANE{class="jqTabPaneFlatSub"}%
        %TAB{"App Metrics" encode="none"}%
        <p>[[AppX/AppMetrics][AppX/AppMetrics]]</p>
        %ENDTAB%
        %TAB{"Recommendations"}%
        %INCLUDE{"PmDashboardRecommendations" disablerewriteurls="on"}%
        %ENDTAB%
        %TAB{"Workflow"}%
        <div class="prom-large-asset"><img style="max-width:70vw;cursor:pointer;" src="/pub/Main/PmDashboard/WorkflowAppOverview.png" /></div>
        %ENDTAB%
        %TAB{"Handover of Work"}%
        %INCLUDE{"%ATTACHURL%/report.txt.sn.txt" raw="on" literal="on" encode="none"}%
        %ENDTAB%
        %TAB{"inductive (frequency)"}%
        No matching log entries for this app
        %ENDTAB%
        %TAB{"heuristic (frequency)"}%
        No matching log entries for this app
        %ENDTAB%
        %TAB{"inductive (simple)"}%
        No matching log entries for this app
        %ENDTAB%
        %TAB{"heuristic (simple)"}%
        No matching log entries for this app
        %ENDTAB%
        %TAB{"Event Log"}%
        <table border="1" class="dataframe ma-table">
          <thead>
            <tr style="text-align: right;">
              <th>timestamp</th>
              <th>user</th>
              <th>activity</th>
              <th>name</th>
              <th>state</th>
              <th>case</th>
              <th>kind</th>
              <th>raw_body</th>
            </tr>
          </thead>
          <tbody>
          </tbody>
        </table>
        %ENDTAB%
        %ENDTABPANE%
        %ENDTAB%
        "#);
    }

    #[test]
    fn graphs_are_wrapped_in_dot_tags() {
        let events = vec![
            event("1", 0, "open", "ann", EventKind::Transition),
            event("1", 1, "close", "bob", EventKind::Transition),
        ];
        let discovery: Vec<&NormalizedEvent> = events.iter().collect();
        let selection = selection_with(events.clone());
        let markup = write(&selection, &discovery);

        assert_eq!(markup.matches("<dot>").count(), 4);
        assert_eq!(markup.matches("</dot>").count(), 4);
        assert_eq!(markup.matches("digraph workflow {").count(), 4);
        assert!(markup.contains("<td>2024-01-01T10:01:00+00:00</td>"));
        assert!(markup.contains("<td>event:TRANSITION;AppA;concept:close;case:1</td>"));
        assert!(!markup.contains(NO_DATA_MESSAGE));
    }

    #[test]
    fn empty_discovery_view_shows_no_data() {
        let events = vec![event("1", 0, "Task - done", "ann", EventKind::TaskChange)];
        let selection = selection_with(events);
        let markup = write(&selection, &[]);
        assert_eq!(markup.matches(NO_DATA_MESSAGE).count(), 4);
        assert!(markup.contains("<td>task_change</td>"));
    }

    #[test]
    fn miner_errors_stay_in_their_tab() {
        let events = vec![event("1", 0, "open", "ann", EventKind::Transition)];
        let discovery: Vec<&NormalizedEvent> = events.iter().collect();
        let selection = selection_with(events.clone());
        let settings = MinerSettings {
            noise_threshold: 3.0,
            ..MinerSettings::default()
        };
        let section = AppSection {
            selection: &selection,
            discovery: &discovery,
            settings: &settings,
            handover_attachment: "r.sn.txt",
        };
        let mut out = Vec::new();
        write_app_section(&mut out, &section).unwrap();
        let markup = String::from_utf8(out).unwrap();

        // Inductive fails in both styles, heuristic still renders.
        assert_eq!(
            markup
                .matches("noise_threshold must be within range, got 3")
                .count(),
            2
        );
        assert_eq!(markup.matches("<dot>").count(), 2);
        assert!(markup.ends_with("%ENDTABPANE%\n%ENDTAB%\n"));
    }

    fn selection_with(events: Vec<NormalizedEvent>) -> AppEvents {
        AppEvents::Events(AppEventLog::new("AppA", events))
    }
}
