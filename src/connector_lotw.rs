//! ARRL Logbook of the World (LoTW) connector.
//!
//! Downloads the confirmed-contact report for one account as ADIF text and
//! hands it to the same decoder used for local files.
//!
//! # Configuration
//!
//! ```toml
//! [lotw]
//! base_url = "https://lotw.arrl.org"
//! username = "W1AW"
//! timeout_secs = 30
//! default_start_date = "1945-01-01"
//! ```
//!
//! # Environment Variables
//!
//! - `LOTW_PASSWORD`: account password (or `--password`)
//! - `LOTW_USERNAME`: account name when neither `--username` nor
//!   `lotw.username` is set
//!
//! # Request
//!
//! `GET {base_url}/lotwuser/lotwreport.adi` with
//!
//! | Parameter | Value |
//! |-----------|-------|
//! | `login`, `password` | account credentials |
//! | `qso_query` | `1` |
//! | `qso_qsl`, `qso_qsldetail`, `qso_withown` | `yes` |
//! | `qso_qslsince` | start date |
//! | `qso_enddate` | end date, only when given |
//!
//! LoTW answers bad credentials and server faults with status-200 text
//! pages, so the body is checked with
//! [`classify_response`](qsolog_core::source::classify_response) before
//! decoding.

use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use qsolog_core::models::QsoRecord;
use qsolog_core::source::{classify_response, RecordSource, SourceError};

use crate::config::{parse_date, LotwConfig};

const REPORT_PATH: &str = "/lotwuser/lotwreport.adi";
const DEFAULT_COMMENT: &str = "Imported from LoTW";

/// Account credentials for LoTW.
#[derive(Clone)]
pub struct LotwCredentials {
    pub username: String,
    pub password: String,
}

// Keeps the password out of debug output.
impl std::fmt::Debug for LotwCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LotwCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A LoTW report request that implements [`RecordSource`].
pub struct LotwConnector {
    client: reqwest::Client,
    base_url: String,
    credentials: LotwCredentials,
    start_date: String,
    end_date: Option<String>,
    timeout: Duration,
}

impl LotwConnector {
    /// Build a connector for one report request.
    ///
    /// `start_date` falls back to `lotw.default_start_date`. Both dates
    /// must be `YYYY-MM-DD`; they are checked here so a bad date never
    /// reaches the network.
    pub fn new(
        config: &LotwConfig,
        credentials: LotwCredentials,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Self> {
        if credentials.username.trim().is_empty() {
            bail!("LoTW username is required (--username, LOTW_USERNAME, or lotw.username)");
        }
        if credentials.password.is_empty() {
            bail!("LoTW password is required (--password or LOTW_PASSWORD)");
        }

        let start_date = start_date.unwrap_or(&config.default_start_date).to_string();
        let start = parse_date(&start_date, "start date")?;
        if let Some(end) = end_date {
            if parse_date(end, "end date")? < start {
                bail!("end date {} is before start date {}", end, start_date);
            }
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .user_agent(concat!("qsolog/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            start_date,
            end_date: end_date.map(str::to_string),
            timeout,
        })
    }

    pub fn report_url(&self) -> String {
        format!("{}{}", self.base_url, REPORT_PATH)
    }

    fn query_params(&self) -> Vec<(&'static str, &str)> {
        let mut params = vec![
            ("login", self.credentials.username.as_str()),
            ("password", self.credentials.password.as_str()),
            ("qso_query", "1"),
            ("qso_qsl", "yes"),
            ("qso_qsldetail", "yes"),
            ("qso_withown", "yes"),
            ("qso_qslsince", self.start_date.as_str()),
        ];
        if let Some(end) = &self.end_date {
            params.push(("qso_enddate", end.as_str()));
        }
        params
    }

    fn transport_error(&self, e: reqwest::Error) -> SourceError {
        if e.is_timeout() {
            SourceError::Timeout(self.timeout)
        } else {
            // The URL carries the password as a query parameter.
            SourceError::Network(e.without_url().to_string())
        }
    }
}

#[async_trait]
impl RecordSource for LotwConnector {
    fn label(&self) -> String {
        format!("LoTW for {}", self.credentials.username)
    }

    async fn fetch(&self) -> Result<String, SourceError> {
        tracing::info!(
            url = %self.report_url(),
            username = %self.credentials.username,
            since = %self.start_date,
            until = ?self.end_date,
            "requesting LoTW report"
        );

        let response = self
            .client
            .get(self.report_url())
            .query(&self.query_params())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;
        tracing::debug!(status, bytes = body.len(), "LoTW response received");

        classify_response(status, body)
    }

    fn adjust(&self, record: &mut QsoRecord) {
        record.confirmed = true;
        record.band = record.band.to_lowercase();
        if record.comment.is_empty() {
            record.comment = DEFAULT_COMMENT.to_string();
        }
    }
}
