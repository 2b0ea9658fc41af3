//! Core data models used throughout QsoLog.
//!
//! These types represent contacts as they flow from the interchange codec
//! through reconciliation into storage, plus the per-invocation result
//! summaries handed back to callers.

use serde::{Deserialize, Serialize};

/// Format-neutral representation of one contact (QSO).
///
/// Dates are `YYYY-MM-DD` strings and times are `HH:MM:SS` strings once
/// decoded. Numeric fields use `0` for "absent".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QsoRecord {
    pub callsign: String,
    pub date: String,
    pub time_on: String,
    pub time_off: String,
    pub frequency_mhz: f64,
    pub band: String,
    pub mode: String,
    pub rst_sent: String,
    pub rst_received: String,
    pub operator_name: String,
    /// Operator location (QTH).
    pub location: String,
    pub country: String,
    pub grid_square: String,
    pub power_watts: i32,
    pub comment: String,
    /// QSL received.
    pub confirmed: bool,
}

impl QsoRecord {
    /// The natural key identifying "the same contact" across sources.
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            callsign: self.callsign.clone(),
            date: self.date.clone(),
            time_on: self.time_on.clone(),
        }
    }

    /// Fill every empty field of `self` from `other`.
    ///
    /// Empty means an empty string, a non-positive number, or `false`.
    /// Non-empty values on `self` are never overwritten.
    pub fn fill_missing_from(&mut self, other: &QsoRecord) {
        fill_str(&mut self.callsign, &other.callsign);
        fill_str(&mut self.date, &other.date);
        fill_str(&mut self.time_on, &other.time_on);
        fill_str(&mut self.time_off, &other.time_off);
        if self.frequency_mhz <= 0.0 && other.frequency_mhz > 0.0 {
            self.frequency_mhz = other.frequency_mhz;
        }
        fill_str(&mut self.band, &other.band);
        fill_str(&mut self.mode, &other.mode);
        fill_str(&mut self.rst_sent, &other.rst_sent);
        fill_str(&mut self.rst_received, &other.rst_received);
        fill_str(&mut self.operator_name, &other.operator_name);
        fill_str(&mut self.location, &other.location);
        fill_str(&mut self.country, &other.country);
        fill_str(&mut self.grid_square, &other.grid_square);
        if self.power_watts <= 0 && other.power_watts > 0 {
            self.power_watts = other.power_watts;
        }
        fill_str(&mut self.comment, &other.comment);
        self.confirmed = self.confirmed || other.confirmed;
    }
}

fn fill_str(target: &mut String, source: &str) {
    if target.is_empty() && !source.is_empty() {
        *target = source.to_string();
    }
}

/// `(callsign, date, time_on)`: exact-match natural key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub callsign: String,
    pub date: String,
    pub time_on: String,
}

/// A contact as persisted by a [`ContactStore`](crate::store::ContactStore).
#[derive(Debug, Clone, PartialEq)]
pub struct StoredContact {
    pub id: String,
    pub record: QsoRecord,
    /// Unix seconds.
    pub created_at: i64,
    /// Unix seconds.
    pub updated_at: i64,
}

/// How the reconciler treats records that match an existing contact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportPolicy {
    #[serde(default)]
    pub merge_duplicates: bool,
    #[serde(default)]
    pub update_existing: bool,
}

impl ImportPolicy {
    /// Whether incoming records are matched against stored contacts at all.
    pub fn checks_existing(&self) -> bool {
        self.merge_duplicates || self.update_existing
    }
}

/// Result summary of one import invocation. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub success: bool,
    #[serde(rename = "importedCount")]
    pub imported: u64,
    #[serde(rename = "skippedCount")]
    pub skipped: u64,
    #[serde(rename = "errorCount")]
    pub errored: u64,
    pub errors: Vec<String>,
    pub message: String,
}

impl ImportOutcome {
    /// An empty, successful outcome ready to accumulate counts.
    pub fn started(source: &str) -> Self {
        Self {
            success: true,
            imported: 0,
            skipped: 0,
            errored: 0,
            errors: Vec::new(),
            message: format!("Processing records from {}", source),
        }
    }

    /// An outcome for an import that failed before any record was processed.
    pub fn aborted(source: &str, reason: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            imported: 0,
            skipped: 0,
            errored: 1,
            errors: vec![format!("Failed to retrieve data from {}: {}", source, reason)],
            message: format!("{} import failed", source),
        }
    }

    pub fn record_error(&mut self, error: String) {
        self.errored += 1;
        self.errors.push(error);
    }

    /// Write the final summary message.
    pub fn finish(&mut self, source: &str) {
        self.message = if self.errored == 0 {
            format!(
                "Successfully imported {} contacts from {}",
                self.imported, source
            )
        } else {
            format!(
                "Imported {} contacts with {} errors from {}",
                self.imported, self.errored, source
            )
        };
    }
}

/// Result summary of one duplicate-collapse pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollapseOutcome {
    /// Groups whose extra members were removed.
    pub groups_merged: u64,
    /// Rows deleted across all groups.
    pub removed: u64,
    pub errors: Vec<String>,
}
