//! Per-record decode failures.
//!
//! Both variants are non-fatal: the offending record is skipped, reported,
//! and decoding continues with the next record.

use thiserror::Error;

/// A record that could not be turned into a [`QsoRecord`](crate::models::QsoRecord).
///
/// `ordinal` is the 1-based position of the record in its source stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The record's text does not form a decodable record.
    #[error("record {ordinal}: {reason}")]
    Structural { ordinal: usize, reason: String },

    /// The record decoded but a mandatory field is missing.
    #[error("record {ordinal}: missing required field {field}")]
    Validation { ordinal: usize, field: &'static str },
}

impl RecordError {
    pub fn ordinal(&self) -> usize {
        match self {
            RecordError::Structural { ordinal, .. } | RecordError::Validation { ordinal, .. } => {
                *ordinal
            }
        }
    }
}
