//! Export stored contacts as an ADIF file.
//!
//! Writes the standard export preamble followed by one record per
//! contact, optionally limited to an inclusive date range. Without an
//! explicit output path the file name is derived from the range, e.g.
//! `qsolog_export_20240101_to_20241231.adi`.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::PathBuf;

use qsolog_core::adif::{write_adif, ExportHeader};

use crate::config::{parse_date, Config};
use crate::sqlite_store::SqliteStore;

const FILE_PREFIX: &str = "qsolog_export";

/// Options for `qso export`.
#[derive(Debug, Clone, Default)]
pub struct ExportArgs {
    /// Target file; `-` means stdout.
    pub output: Option<PathBuf>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// File name for an export covering `[start, end]`.
pub fn export_file_name(start: Option<&str>, end: Option<&str>, now: DateTime<Utc>) -> String {
    let compact = |d: &str| d.replace('-', "");
    match (start, end) {
        (Some(s), Some(e)) => format!("{}_{}_to_{}.adi", FILE_PREFIX, compact(s), compact(e)),
        (Some(s), None) => format!("{}_from_{}.adi", FILE_PREFIX, compact(s)),
        (None, Some(e)) => format!("{}_until_{}.adi", FILE_PREFIX, compact(e)),
        (None, None) => format!("{}_{}.adi", FILE_PREFIX, now.format("%Y%m%d_%H%M%S")),
    }
}

/// Write every contact within the range to `w`. Returns the record count.
pub async fn export_contacts<W: Write>(
    store: &SqliteStore,
    w: &mut W,
    header: &ExportHeader,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<usize> {
    let contacts = store.list_between(start, end).await?;
    let count = write_adif(w, header, contacts.iter().map(|c| &c.record))
        .context("Failed to write export")?;
    w.flush()?;
    Ok(count)
}

/// `qso export`.
pub async fn run_export(config: &Config, args: ExportArgs) -> Result<()> {
    let start = args.start_date.as_deref();
    let end = args.end_date.as_deref();
    if let Some(s) = start {
        parse_date(s, "start date")?;
    }
    if let Some(e) = end {
        parse_date(e, "end date")?;
    }
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            bail!("end date {} is before start date {}", e, s);
        }
    }

    let now = Utc::now();
    let header = ExportHeader {
        program_id: config.export.program_id.clone(),
        program_version: env!("CARGO_PKG_VERSION").to_string(),
        generated_at: now,
    };
    let store = SqliteStore::open(config).await?;

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(export_file_name(start, end, now)));

    if path.as_os_str() == "-" {
        let mut stdout = std::io::stdout();
        let count = export_contacts(&store, &mut stdout, &header, start, end).await?;
        tracing::info!(count, "exported contacts to stdout");
        return Ok(());
    }

    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    let count = export_contacts(&store, &mut writer, &header, start, end).await?;
    println!("exported {} contacts to {}", count, path.display());
    Ok(())
}
