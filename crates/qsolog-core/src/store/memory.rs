//! In-memory [`ContactStore`] implementation for tests.
//!
//! Contacts live in a `Vec` behind `std::sync::RwLock`, so storage order is
//! insertion order.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::models::{DedupKey, QsoRecord, StoredContact};

use super::ContactStore;

/// In-memory store for testing.
pub struct InMemoryStore {
    contacts: RwLock<Vec<StoredContact>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            contacts: RwLock::new(Vec::new()),
        }
    }

    /// Seed a contact with explicit ID and timestamps.
    pub fn insert_stored(&self, contact: StoredContact) -> Result<()> {
        self.write()?.push(contact);
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<StoredContact>>> {
        self.contacts
            .read()
            .map_err(|_| anyhow!("contact store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<StoredContact>>> {
        self.contacts
            .write()
            .map_err(|_| anyhow!("contact store lock poisoned"))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_key(contact: &StoredContact, key: &DedupKey) -> bool {
    contact.record.callsign == key.callsign
        && contact.record.date == key.date
        && contact.record.time_on == key.time_on
}

#[async_trait]
impl ContactStore for InMemoryStore {
    async fn find_by_key(&self, key: &DedupKey) -> Result<Option<StoredContact>> {
        let contacts = self.read()?;
        Ok(contacts
            .iter()
            .filter(|c| matches_key(c, key))
            .min_by_key(|c| c.created_at)
            .cloned())
    }

    async fn insert(&self, record: &QsoRecord) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let id = uuid::Uuid::new_v4().to_string();
        self.write()?.push(StoredContact {
            id: id.clone(),
            record: record.clone(),
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn update(&self, id: &str, record: &QsoRecord) -> Result<()> {
        let mut contacts = self.write()?;
        let Some(contact) = contacts.iter_mut().find(|c| c.id == id) else {
            bail!("contact {} not found", id);
        };
        contact.record = record.clone();
        contact.updated_at = chrono::Utc::now().timestamp();
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<StoredContact>> {
        let mut all = self.read()?.clone();
        all.sort_by_key(|c| c.created_at);
        Ok(all)
    }

    async fn merge_group(&self, keeper: &StoredContact, remove_ids: &[String]) -> Result<()> {
        let mut contacts = self.write()?;
        let Some(stored) = contacts.iter_mut().find(|c| c.id == keeper.id) else {
            bail!("contact {} not found", keeper.id);
        };
        stored.record = keeper.record.clone();
        stored.updated_at = chrono::Utc::now().timestamp();
        contacts.retain(|c| c.id == keeper.id || !remove_ids.contains(&c.id));
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.read()?.len() as u64)
    }
}
