use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create the schema on an open pool. Safe to run repeatedly.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    // Create contacts table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contacts (
            id TEXT PRIMARY KEY,
            callsign TEXT NOT NULL,
            contact_date TEXT NOT NULL,
            time_on TEXT NOT NULL,
            time_off TEXT NOT NULL DEFAULT '',
            frequency REAL NOT NULL DEFAULT 0,
            band TEXT NOT NULL DEFAULT '',
            mode TEXT NOT NULL DEFAULT '',
            rst_sent TEXT NOT NULL DEFAULT '',
            rst_received TEXT NOT NULL DEFAULT '',
            operator_name TEXT NOT NULL DEFAULT '',
            qth TEXT NOT NULL DEFAULT '',
            country TEXT NOT NULL DEFAULT '',
            grid_square TEXT NOT NULL DEFAULT '',
            power_watts INTEGER NOT NULL DEFAULT 0,
            comment TEXT NOT NULL DEFAULT '',
            confirmed INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Lookup index for (callsign, date, time_on). Not UNIQUE: plain imports
    // may store duplicates until the collapser merges them.
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_contacts_dedup ON contacts(callsign, contact_date, time_on)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_contacts_date ON contacts(contact_date)")
        .execute(pool)
        .await?;

    Ok(())
}
