//! Storage abstraction for QsoLog.
//!
//! The [`ContactStore`] trait is the only thing the reconciler and the
//! duplicate collapser know about persistence, so the same engine runs
//! against SQLite in the application and against [`memory::InMemoryStore`]
//! in tests.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{DedupKey, QsoRecord, StoredContact};

/// Abstract contact storage.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`find_by_key`](ContactStore::find_by_key) | Look up a contact by its natural key |
/// | [`insert`](ContactStore::insert) | Store a new contact, returning its ID |
/// | [`update`](ContactStore::update) | Overwrite the fields of an existing contact |
/// | [`list_all`](ContactStore::list_all) | Every contact, oldest first |
/// | [`merge_group`](ContactStore::merge_group) | Rewrite a keeper and delete its duplicates atomically |
/// | [`count`](ContactStore::count) | Number of stored contacts |
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Find a contact whose `(callsign, date, time_on)` equals `key`.
    ///
    /// When several match, the earliest created one is returned.
    async fn find_by_key(&self, key: &DedupKey) -> Result<Option<StoredContact>>;

    /// Insert a new contact and return its generated ID.
    async fn insert(&self, record: &QsoRecord) -> Result<String>;

    /// Replace every field of contact `id` with `record`, bumping `updated_at`.
    async fn update(&self, id: &str, record: &QsoRecord) -> Result<()>;

    /// All contacts ordered by `created_at`, ties in storage order.
    async fn list_all(&self) -> Result<Vec<StoredContact>>;

    /// Write `keeper`'s fields and delete `remove_ids` as one unit.
    ///
    /// Either both happen or neither does.
    async fn merge_group(&self, keeper: &StoredContact, remove_ids: &[String]) -> Result<()>;

    async fn count(&self) -> Result<u64>;
}
