//! Import progress reporting.
//!
//! Renders [`ImportEvent`]s during `qso import` so users see which record
//! is being handled and what happened to it. Progress is emitted on
//! **stderr** so stdout remains parseable for scripts.

use std::io::Write;

use qsolog_core::progress::{ImportEvent, ImportProgress, NoProgress};
use qsolog_core::reconcile::Decision;

fn decision_word(decision: &Decision) -> &'static str {
    match decision {
        Decision::Inserted { .. } => "inserted",
        Decision::Updated { .. } => "updated",
        Decision::Skipped { .. } => "skipped",
        Decision::Failed { .. } => "failed",
    }
}

/// Human-friendly progress on stderr: "import log.adi  record 1,234  inserted".
pub struct StderrProgress;

impl ImportProgress for StderrProgress {
    fn report(&self, event: ImportEvent) {
        let line = match &event {
            ImportEvent::Fetching { source } => format!("import {}  fetching...\n", source),
            ImportEvent::Record {
                source,
                ordinal,
                decision,
            } => format!(
                "import {}  record {}  {}\n",
                source,
                format_number(*ordinal as u64),
                decision_word(decision)
            ),
            ImportEvent::Finished { source, outcome } => format!(
                "import {}  done  {} imported, {} skipped, {} errors\n",
                source,
                format_number(outcome.imported),
                format_number(outcome.skipped),
                format_number(outcome.errored)
            ),
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ImportProgress for JsonProgress {
    fn report(&self, event: ImportEvent) {
        let obj = match &event {
            ImportEvent::Fetching { source } => serde_json::json!({
                "event": "progress",
                "source": source,
                "phase": "fetching"
            }),
            ImportEvent::Record {
                source,
                ordinal,
                decision,
            } => {
                let mut obj = serde_json::json!({
                    "event": "progress",
                    "source": source,
                    "phase": "record",
                    "n": ordinal,
                    "decision": decision_word(decision)
                });
                if let Decision::Failed { error } = decision {
                    obj["error"] = serde_json::Value::String(error.clone());
                }
                obj
            }
            ImportEvent::Finished { source, outcome } => serde_json::json!({
                "event": "progress",
                "source": source,
                "phase": "finished",
                "imported": outcome.imported,
                "skipped": outcome.skipped,
                "errors": outcome.errored
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Parse the `--progress` flag value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "off" | "none" => Some(ProgressMode::Off),
            "human" => Some(ProgressMode::Human),
            "json" => Some(ProgressMode::Json),
            _ => None,
        }
    }

    /// Build a reporter for this mode.
    pub fn reporter(&self) -> Box<dyn ImportProgress> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
