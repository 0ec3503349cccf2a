//! Final report rendering

use std::fmt::Write;

use clap::ValueEnum;
use rvoip_session_counter::{Direction, SessionSnapshot};
use serde::Serialize;

use crate::replay::ReplayStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    snapshot: &'a SessionSnapshot,
    replay: ReplayStats,
}

pub fn render(
    summary: &str,
    snapshot: &SessionSnapshot,
    stats: ReplayStats,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&JsonReport { snapshot, replay: stats })?),
        OutputFormat::Text => Ok(render_text(summary, snapshot, stats)),
    }
}

fn render_text(summary: &str, snapshot: &SessionSnapshot, stats: ReplayStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", summary);
    let _ = writeln!(out, "{:<8} {:>8} {:>8}", "DIR", "CURRENT", "PEAK");
    for direction in Direction::ALL {
        let current = snapshot.sessions.get(&direction).copied().unwrap_or(0);
        let peak = snapshot.peak_sessions.get(&direction).copied().unwrap_or(0);
        let _ = writeln!(out, "{:<8} {:>8} {:>8}", direction.as_str(), current, peak);
    }
    let _ = writeln!(
        out,
        "{} records, {} changes, {} dialogs still tracked ({} established)",
        stats.records, stats.changes, snapshot.tracked_dialogs, snapshot.established_dialogs
    );
    out
}
