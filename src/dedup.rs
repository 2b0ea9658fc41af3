//! `qso dedup`: merge stored contacts that share a callsign, date, and
//! start time.

use anyhow::Result;

use qsolog_core::collapse::collapse_duplicates;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

pub async fn run_dedup(config: &Config) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let outcome = collapse_duplicates(&store).await?;

    println!("merged: {} duplicate records", outcome.removed);
    if outcome.groups_merged > 0 {
        println!("  groups: {}", outcome.groups_merged);
    }
    for error in &outcome.errors {
        println!("  {}", error);
    }
    Ok(())
}
