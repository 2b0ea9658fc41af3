//! External record sources.
//!
//! A [`RecordSource`] hands back raw ADIF text that feeds the same decoder
//! as a local file. Network services can answer a bad request with an
//! HTML error page or a login form under status 200, so every response body
//! goes through [`classify_response`] before it is decoded.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::adif::find_ci;
use crate::models::QsoRecord;

const EXCERPT_CHARS: usize = 200;

/// Why an external source produced no records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("authentication failed: check username and password")]
    AuthenticationFailed,

    #[error("service error: {0}")]
    ServiceError(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// A provider of raw ADIF text.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Human-readable name used in import messages.
    fn label(&self) -> String;

    /// Retrieve the full ADIF payload.
    async fn fetch(&self) -> Result<String, SourceError>;

    /// Source-specific normalization applied to every decoded record.
    fn adjust(&self, _record: &mut QsoRecord) {}
}

/// Decide whether an HTTP response carries an ADIF payload.
///
/// A body is accepted only if it contains an `<EOH>` marker. Bodies
/// without one are classified by their wording, since services report
/// failures as status-200 text pages.
pub fn classify_response(status: u16, body: String) -> Result<String, SourceError> {
    match status {
        401 | 403 => return Err(SourceError::AuthenticationFailed),
        200..=299 => {}
        _ => return Err(SourceError::ServiceError(format!("HTTP {}", status))),
    }

    if find_ci(&body, "<EOH>").is_some() {
        return Ok(body);
    }

    if find_ci(&body, "login").is_some() || find_ci(&body, "password").is_some() {
        return Err(SourceError::AuthenticationFailed);
    }
    if find_ci(&body, "error").is_some() {
        return Err(SourceError::ServiceError(excerpt(&body)));
    }
    if body.trim().is_empty() {
        return Err(SourceError::MalformedResponse("empty response body".to_string()));
    }
    Err(SourceError::MalformedResponse(format!(
        "missing <EOH> marker: {}",
        excerpt(&body)
    )))
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    let mut out: String = trimmed.chars().take(EXCERPT_CHARS).collect();
    if trimmed.chars().count() > EXCERPT_CHARS {
        out.push_str("...");
    }
    out
}
