//! SQLite-backed [`ContactStore`] implementation.
//!
//! Maps each [`ContactStore`] operation onto the `contacts` table created
//! by [`migrate`](crate::migrate).

use anyhow::{bail, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use qsolog_core::models::{DedupKey, QsoRecord, StoredContact};
use qsolog_core::store::ContactStore;

use crate::config::Config;
use crate::{db, migrate};

const CONTACT_COLUMNS: &str = "id, callsign, contact_date, time_on, time_off, frequency, band, \
     mode, rst_sent, rst_received, operator_name, qth, country, grid_square, power_watts, \
     comment, confirmed, created_at, updated_at";

/// SQLite implementation of the [`ContactStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the configured database, creating the schema if needed.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::apply_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Contacts whose date falls within `[start, end]`, oldest first.
    ///
    /// Both bounds are optional `YYYY-MM-DD` strings and inclusive.
    pub async fn list_between(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<StoredContact>> {
        let sql = format!(
            "SELECT {} FROM contacts \
             WHERE (? IS NULL OR contact_date >= ?) AND (? IS NULL OR contact_date <= ?) \
             ORDER BY contact_date, time_on, created_at, rowid",
            CONTACT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(start)
            .bind(start)
            .bind(end)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_contact).collect()
    }
}

fn row_to_contact(row: &SqliteRow) -> Result<StoredContact> {
    Ok(StoredContact {
        id: row.try_get("id")?,
        record: QsoRecord {
            callsign: row.try_get("callsign")?,
            date: row.try_get("contact_date")?,
            time_on: row.try_get("time_on")?,
            time_off: row.try_get("time_off")?,
            frequency_mhz: row.try_get("frequency")?,
            band: row.try_get("band")?,
            mode: row.try_get("mode")?,
            rst_sent: row.try_get("rst_sent")?,
            rst_received: row.try_get("rst_received")?,
            operator_name: row.try_get("operator_name")?,
            location: row.try_get("qth")?,
            country: row.try_get("country")?,
            grid_square: row.try_get("grid_square")?,
            power_watts: row.try_get("power_watts")?,
            comment: row.try_get("comment")?,
            confirmed: row.try_get::<i64, _>("confirmed")? != 0,
        },
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

const UPDATE_SQL: &str = r#"
    UPDATE contacts SET
        callsign = ?, contact_date = ?, time_on = ?, time_off = ?, frequency = ?,
        band = ?, mode = ?, rst_sent = ?, rst_received = ?, operator_name = ?,
        qth = ?, country = ?, grid_square = ?, power_watts = ?, comment = ?,
        confirmed = ?, updated_at = ?
    WHERE id = ?
"#;

#[async_trait]
impl ContactStore for SqliteStore {
    async fn find_by_key(&self, key: &DedupKey) -> Result<Option<StoredContact>> {
        let sql = format!(
            "SELECT {} FROM contacts WHERE callsign = ? AND contact_date = ? AND time_on = ? \
             ORDER BY created_at, rowid LIMIT 1",
            CONTACT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&key.callsign)
            .bind(&key.date)
            .bind(&key.time_on)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_contact).transpose()
    }

    async fn insert(&self, record: &QsoRecord) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO contacts (id, callsign, contact_date, time_on, time_off, frequency,
                                  band, mode, rst_sent, rst_received, operator_name, qth,
                                  country, grid_square, power_watts, comment, confirmed,
                                  created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&record.callsign)
        .bind(&record.date)
        .bind(&record.time_on)
        .bind(&record.time_off)
        .bind(record.frequency_mhz)
        .bind(&record.band)
        .bind(&record.mode)
        .bind(&record.rst_sent)
        .bind(&record.rst_received)
        .bind(&record.operator_name)
        .bind(&record.location)
        .bind(&record.country)
        .bind(&record.grid_square)
        .bind(record.power_watts)
        .bind(&record.comment)
        .bind(record.confirmed)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update(&self, id: &str, record: &QsoRecord) -> Result<()> {
        let result = bind_update(sqlx::query(UPDATE_SQL), id, record)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            bail!("contact {} not found", id);
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<StoredContact>> {
        let sql = format!(
            "SELECT {} FROM contacts ORDER BY created_at, rowid",
            CONTACT_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_contact).collect()
    }

    async fn merge_group(&self, keeper: &StoredContact, remove_ids: &[String]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = bind_update(sqlx::query(UPDATE_SQL), &keeper.id, &keeper.record)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            bail!("contact {} not found", keeper.id);
        }

        for id in remove_ids.iter().filter(|id| **id != keeper.id) {
            sqlx::query("DELETE FROM contacts WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contacts")
            .fetch_one(&self.pool)
            .await?;
        Ok(n as u64)
    }
}

fn bind_update<'q>(
    query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    id: &'q str,
    record: &'q QsoRecord,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    query
        .bind(&record.callsign)
        .bind(&record.date)
        .bind(&record.time_on)
        .bind(&record.time_off)
        .bind(record.frequency_mhz)
        .bind(&record.band)
        .bind(&record.mode)
        .bind(&record.rst_sent)
        .bind(&record.rst_received)
        .bind(&record.operator_name)
        .bind(&record.location)
        .bind(&record.country)
        .bind(&record.grid_square)
        .bind(record.power_watts)
        .bind(&record.comment)
        .bind(record.confirmed)
        .bind(chrono::Utc::now().timestamp())
        .bind(id)
}
