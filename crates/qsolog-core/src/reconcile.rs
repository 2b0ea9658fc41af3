//! Import reconciliation.
//!
//! Merges a stream of decoded records into a [`ContactStore`] according to
//! an [`ImportPolicy`]:
//!
//! | `merge_duplicates` | `update_existing` | existing match | action |
//! |--------------------|-------------------|----------------|--------|
//! | false | false | (not looked up) | insert |
//! | any   | any   | none            | insert |
//! | any   | true  | found           | update the existing contact |
//! | true  | false | found           | skip |
//!
//! Records are handled strictly in order, so each record sees the effects
//! of the ones before it. A failing record is counted and reported; it
//! never stops the batch.

use crate::error::RecordError;
use crate::models::{ImportOutcome, ImportPolicy, QsoRecord};
use crate::progress::{ImportEvent, ImportProgress};
use crate::store::ContactStore;

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Inserted { id: String },
    Updated { id: String },
    Skipped { existing_id: String },
    Failed { error: String },
}

/// Applies an [`ImportPolicy`] to records against a store.
pub struct Reconciler<'a, S: ContactStore + ?Sized> {
    store: &'a S,
    policy: ImportPolicy,
    progress: Option<&'a dyn ImportProgress>,
}

impl<'a, S: ContactStore + ?Sized> Reconciler<'a, S> {
    pub fn new(store: &'a S, policy: ImportPolicy) -> Self {
        Self {
            store,
            policy,
            progress: None,
        }
    }

    /// Report one [`ImportEvent::Record`] per record to `progress`.
    pub fn with_progress(mut self, progress: &'a dyn ImportProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Reconcile every record from `records`, labelled `source` in messages.
    pub async fn reconcile<I>(&self, records: I, source: &str) -> ImportOutcome
    where
        I: IntoIterator<Item = Result<QsoRecord, RecordError>>,
    {
        let mut outcome = ImportOutcome::started(source);

        for (index, item) in records.into_iter().enumerate() {
            let ordinal = index + 1;
            let decision = match item {
                Ok(record) => self.apply(&record).await,
                Err(e) => {
                    tracing::warn!(source, ordinal = e.ordinal(), error = %e, "skipping undecodable record");
                    Decision::Failed {
                        error: e.to_string(),
                    }
                }
            };

            match &decision {
                Decision::Inserted { .. } | Decision::Updated { .. } => outcome.imported += 1,
                Decision::Skipped { .. } => outcome.skipped += 1,
                Decision::Failed { error } => outcome.record_error(error.clone()),
            }

            if let Some(progress) = self.progress {
                progress.report(ImportEvent::Record {
                    source: source.to_string(),
                    ordinal,
                    decision,
                });
            }
        }

        outcome.finish(source);
        tracing::info!(
            source,
            imported = outcome.imported,
            skipped = outcome.skipped,
            errored = outcome.errored,
            "import finished"
        );
        outcome
    }

    /// Apply the policy to a single record.
    pub async fn apply(&self, record: &QsoRecord) -> Decision {
        let callsign = record.callsign.as_str();

        if self.policy.checks_existing() {
            let existing = match self.store.find_by_key(&record.dedup_key()).await {
                Ok(existing) => existing,
                Err(e) => {
                    tracing::warn!(callsign, error = %e, "duplicate lookup failed");
                    return Decision::Failed {
                        error: format!("Error checking for duplicate {}: {}", callsign, e),
                    };
                }
            };

            if let Some(existing) = existing {
                if self.policy.update_existing {
                    return match self.store.update(&existing.id, record).await {
                        Ok(()) => {
                            tracing::debug!(callsign, id = %existing.id, "updated existing contact");
                            Decision::Updated { id: existing.id }
                        }
                        Err(e) => {
                            tracing::warn!(callsign, error = %e, "update failed");
                            Decision::Failed {
                                error: format!("Error updating {}: {}", callsign, e),
                            }
                        }
                    };
                }
                tracing::debug!(callsign, id = %existing.id, "duplicate skipped");
                return Decision::Skipped {
                    existing_id: existing.id,
                };
            }
        }

        match self.store.insert(record).await {
            Ok(id) => {
                tracing::debug!(callsign, id = %id, "inserted contact");
                Decision::Inserted { id }
            }
            Err(e) => {
                tracing::warn!(callsign, error = %e, "insert failed");
                Decision::Failed {
                    error: format!("Error creating {}: {}", callsign, e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use anyhow::{bail, Result};
    use async_trait::async_trait;

    use super::*;
    use crate::adif::Decoder;
    use crate::models::{DedupKey, StoredContact};
    use crate::store::memory::InMemoryStore;

    const LOG: &str = "<CALL:4>W1AW<QSO_DATE:8>20250920<TIME_ON:4>1430<FREQ:6>14.205<EOR>\n\
                       <CALL:5>K1ABC<QSO_DATE:8>20250920<TIME_ON:4>1500<FREQ:5>7.074<MODE:2>CW<EOR>\n";

    fn records(input: &str) -> Vec<Result<QsoRecord, RecordError>> {
        Decoder::new().decode_str(input).collect()
    }

    fn policy(merge_duplicates: bool, update_existing: bool) -> ImportPolicy {
        ImportPolicy {
            merge_duplicates,
            update_existing,
        }
    }

    #[tokio::test]
    async fn test_plain_import_inserts_everything() {
        let store = InMemoryStore::new();
        let reconciler = Reconciler::new(&store, policy(false, false));

        let first = reconciler.reconcile(records(LOG), "log.adi").await;
        let second = reconciler.reconcile(records(LOG), "log.adi").await;

        assert!(first.success);
        assert_eq!(first.imported, 2);
        assert_eq!(second.imported, 2);
        assert_eq!(store.count().await.unwrap(), 4);
        assert_eq!(first.message, "Successfully imported 2 contacts from log.adi");
    }

    #[tokio::test]
    async fn test_merge_import_is_idempotent() {
        let store = InMemoryStore::new();
        let reconciler = Reconciler::new(&store, policy(true, false));

        reconciler.reconcile(records(LOG), "log.adi").await;
        let again = reconciler.reconcile(records(LOG), "log.adi").await;

        assert_eq!(again.imported, 0);
        assert_eq!(again.skipped, 2);
        assert_eq!(again.errored, 0);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_existing_overwrites_fields() {
        let store = InMemoryStore::new();
        Reconciler::new(&store, policy(false, false))
            .reconcile(records(LOG), "first.adi")
            .await;

        let changed = LOG.replace("<MODE:2>CW", "<MODE:3>FT8");
        let outcome = Reconciler::new(&store, policy(false, true))
            .reconcile(records(&changed), "second.adi")
            .await;

        assert_eq!(outcome.imported, 2);
        assert_eq!(outcome.skipped, 0);
        assert_eq!(store.count().await.unwrap(), 2);
        let k1abc = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.record.callsign == "K1ABC")
            .unwrap();
        assert_eq!(k1abc.record.mode, "FT8");
    }

    #[tokio::test]
    async fn test_in_batch_duplicates_see_earlier_records() {
        let store = InMemoryStore::new();
        let twice = "<CALL:4>W1AW<QSO_DATE:8>20250920<TIME_ON:4>1430<MODE:3>SSB<EOR>\
                     <CALL:4>W1AW<QSO_DATE:8>20250920<TIME_ON:4>1430<MODE:2>CW<EOR>";
        let outcome = Reconciler::new(&store, policy(true, true))
            .reconcile(records(twice), "twice.adi")
            .await;

        assert_eq!(outcome.imported, 2);
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.list_all().await.unwrap()[0].record.mode, "CW");
    }

    #[tokio::test]
    async fn test_decode_errors_are_counted() {
        let store = InMemoryStore::new();
        let input = "<CALL:4>W1AW<EOR><QSO_DATE:8>20250920<EOR><CALL:5>K1ABC<EOR>";
        let outcome = Reconciler::new(&store, policy(false, false))
            .reconcile(records(input), "mixed.adi")
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.imported, 2);
        assert_eq!(outcome.errored, 1);
        assert_eq!(outcome.errors, vec!["record 2: missing required field CALL"]);
        assert_eq!(outcome.message, "Imported 2 contacts with 1 errors from mixed.adi");
    }

    /// Which store call [`FailingStore`] rejects.
    #[derive(Clone, Copy, PartialEq)]
    enum FailOn {
        Lookup,
        Insert,
        Update,
    }

    /// Store that fails one kind of call for one callsign.
    struct FailingStore {
        inner: InMemoryStore,
        reject: &'static str,
        fail_on: FailOn,
    }

    impl FailingStore {
        fn new(reject: &'static str, fail_on: FailOn) -> Self {
            Self {
                inner: InMemoryStore::new(),
                reject,
                fail_on,
            }
        }
    }

    #[async_trait]
    impl ContactStore for FailingStore {
        async fn find_by_key(&self, key: &DedupKey) -> Result<Option<StoredContact>> {
            if self.fail_on == FailOn::Lookup && key.callsign == self.reject {
                bail!("db locked");
            }
            self.inner.find_by_key(key).await
        }
        async fn insert(&self, record: &QsoRecord) -> Result<String> {
            if self.fail_on == FailOn::Insert && record.callsign == self.reject {
                bail!("disk full");
            }
            self.inner.insert(record).await
        }
        async fn update(&self, id: &str, record: &QsoRecord) -> Result<()> {
            if self.fail_on == FailOn::Update && record.callsign == self.reject {
                bail!("read-only");
            }
            self.inner.update(id, record).await
        }
        async fn list_all(&self) -> Result<Vec<StoredContact>> {
            self.inner.list_all().await
        }
        async fn merge_group(&self, keeper: &StoredContact, remove_ids: &[String]) -> Result<()> {
            self.inner.merge_group(keeper, remove_ids).await
        }
        async fn count(&self) -> Result<u64> {
            self.inner.count().await
        }
    }

    #[tokio::test]
    async fn test_store_failure_does_not_abort_batch() {
        let store = FailingStore::new("W1AW", FailOn::Insert);
        let outcome = Reconciler::new(&store, policy(false, false))
            .reconcile(records(LOG), "log.adi")
            .await;

        assert_eq!(outcome.imported, 1);
        assert_eq!(outcome.errored, 1);
        assert_eq!(outcome.errors, vec!["Error creating W1AW: disk full"]);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_reported_and_batch_continues() {
        let store = FailingStore::new("W1AW", FailOn::Lookup);
        let outcome = Reconciler::new(&store, policy(true, false))
            .reconcile(records(LOG), "log.adi")
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.imported, 1);
        assert_eq!(outcome.skipped, 0);
        assert_eq!(outcome.errored, 1);
        assert_eq!(
            outcome.errors,
            vec!["Error checking for duplicate W1AW: db locked"]
        );
        let stored = store.list_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].record.callsign, "K1ABC");
    }

    #[tokio::test]
    async fn test_update_failure_is_reported_and_batch_continues() {
        let store = FailingStore::new("W1AW", FailOn::Update);
        Reconciler::new(&store, policy(false, false))
            .reconcile(records(LOG), "first.adi")
            .await;

        let changed = LOG.replace("<MODE:2>CW", "<MODE:3>FT8");
        let outcome = Reconciler::new(&store, policy(false, true))
            .reconcile(records(&changed), "second.adi")
            .await;

        assert_eq!(outcome.imported, 1);
        assert_eq!(outcome.errored, 1);
        assert_eq!(outcome.errors, vec!["Error updating W1AW: read-only"]);
        assert_eq!(store.count().await.unwrap(), 2);
        let k1abc = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.record.callsign == "K1ABC")
            .unwrap();
        assert_eq!(k1abc.record.mode, "FT8");
    }

    struct Recorder(Mutex<Vec<(usize, Decision)>>);

    impl ImportProgress for Recorder {
        fn report(&self, event: ImportEvent) {
            if let ImportEvent::Record {
                ordinal, decision, ..
            } = event
            {
                self.0.lock().unwrap().push((ordinal, decision));
            }
        }
    }

    #[tokio::test]
    async fn test_progress_receives_one_event_per_record() {
        let store = InMemoryStore::new();
        let recorder = Recorder(Mutex::new(Vec::new()));
        Reconciler::new(&store, policy(true, false))
            .with_progress(&recorder)
            .reconcile(records(LOG), "log.adi")
            .await;
        Reconciler::new(&store, policy(true, false))
            .with_progress(&recorder)
            .reconcile(records(LOG), "log.adi")
            .await;

        let events = recorder.0.lock().unwrap();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], (1, Decision::Inserted { .. })));
        assert!(matches!(events[3], (2, Decision::Skipped { .. })));
    }
}
