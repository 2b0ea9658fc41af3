//! Import orchestration.
//!
//! Coordinates the import flow: source → decoder → reconciler → store.
//! Local files and LoTW converge on the same path once raw ADIF text is in
//! hand; a source that fails to deliver aborts the import before any record
//! is touched.

use std::path::Path;

use anyhow::{Context, Result};

use qsolog_core::adif::Decoder;
use qsolog_core::models::{ImportOutcome, ImportPolicy};
use qsolog_core::progress::{ImportEvent, ImportProgress};
use qsolog_core::reconcile::Reconciler;
use qsolog_core::source::RecordSource;
use qsolog_core::store::ContactStore;

use crate::config::Config;
use crate::connector_lotw::{LotwConnector, LotwCredentials};
use crate::progress::ProgressMode;
use crate::sqlite_store::SqliteStore;

/// Decode `text` and reconcile every record into `store`.
pub async fn import_adif<S: ContactStore + ?Sized>(
    store: &S,
    text: &str,
    source: &str,
    policy: ImportPolicy,
    decoder: &Decoder,
    progress: &dyn ImportProgress,
) -> ImportOutcome {
    let outcome = Reconciler::new(store, policy)
        .with_progress(progress)
        .reconcile(decoder.decode_str(text), source)
        .await;
    progress.report(ImportEvent::Finished {
        source: source.to_string(),
        outcome: outcome.clone(),
    });
    outcome
}

/// Fetch from `source`, apply its adjustments, and reconcile into `store`.
///
/// A fetch failure yields an outcome with `success = false` and a single
/// error; no record is processed.
pub async fn import_from_source<S, R>(
    store: &S,
    source: &R,
    policy: ImportPolicy,
    decoder: &Decoder,
    progress: &dyn ImportProgress,
) -> ImportOutcome
where
    S: ContactStore + ?Sized,
    R: RecordSource + ?Sized,
{
    let label = source.label();
    progress.report(ImportEvent::Fetching {
        source: label.clone(),
    });

    let outcome = match source.fetch().await {
        Ok(text) => {
            let records = decoder.decode_str(&text).map(|item| {
                item.map(|mut record| {
                    source.adjust(&mut record);
                    record
                })
            });
            Reconciler::new(store, policy)
                .with_progress(progress)
                .reconcile(records, &label)
                .await
        }
        Err(e) => {
            tracing::warn!(source = %label, error = %e, "source fetch failed");
            ImportOutcome::aborted(&label, e)
        }
    };

    progress.report(ImportEvent::Finished {
        source: label,
        outcome: outcome.clone(),
    });
    outcome
}

/// Where to print an import summary.
#[derive(Debug, Clone, Copy)]
pub struct ImportOutput {
    pub json: bool,
    pub progress: ProgressMode,
}

/// `qso import file <PATH>`.
pub async fn run_import_file(
    config: &Config,
    path: &Path,
    policy: ImportPolicy,
    output: ImportOutput,
) -> Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    // ADIF files in the wild are often Latin-1.
    let text = String::from_utf8_lossy(&bytes);
    let label = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let store = SqliteStore::open(config).await?;
    let reporter = output.progress.reporter();
    let outcome = import_adif(
        &store,
        &text,
        &label,
        policy,
        &Decoder::new(),
        reporter.as_ref(),
    )
    .await;

    print_outcome(&outcome, output.json)
}

/// Options for `qso import lotw`.
#[derive(Debug, Clone, Default)]
pub struct LotwImportArgs {
    pub username: Option<String>,
    pub password: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// `qso import lotw`.
pub async fn run_import_lotw(
    config: &Config,
    args: LotwImportArgs,
    policy: ImportPolicy,
    output: ImportOutput,
) -> Result<()> {
    let username = args
        .username
        .or_else(|| std::env::var("LOTW_USERNAME").ok())
        .or_else(|| config.lotw.username.clone())
        .unwrap_or_default();
    let password = args
        .password
        .or_else(|| std::env::var("LOTW_PASSWORD").ok())
        .unwrap_or_default();

    let connector = LotwConnector::new(
        &config.lotw,
        LotwCredentials { username, password },
        args.start_date.as_deref(),
        args.end_date.as_deref(),
    )?;

    let store = SqliteStore::open(config).await?;
    let reporter = output.progress.reporter();
    let outcome = import_from_source(
        &store,
        &connector,
        policy,
        &Decoder::new(),
        reporter.as_ref(),
    )
    .await;

    print_outcome(&outcome, output.json)
}

fn print_outcome(outcome: &ImportOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    println!("imported: {}", outcome.imported);
    println!("skipped: {}", outcome.skipped);
    println!("errors: {}", outcome.errored);
    for error in &outcome.errors {
        println!("  {}", error);
    }
    println!("{}", outcome.message);
    Ok(())
}
