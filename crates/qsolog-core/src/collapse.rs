//! Duplicate collapsing over stored contacts.
//!
//! Groups every stored contact by [`DedupKey`](crate::models::DedupKey),
//! keeps the earliest created member of each group, fills its empty fields
//! from the other members, and removes the rest through
//! [`ContactStore::merge_group`].

use std::collections::HashMap;

use anyhow::{Context, Result};

use crate::models::{CollapseOutcome, DedupKey, StoredContact};
use crate::store::ContactStore;

/// Collapse every group of duplicates in `store`.
///
/// Only the initial listing is fatal; a group that fails to merge is
/// reported in [`CollapseOutcome::errors`] and the remaining groups are
/// still processed.
pub async fn collapse_duplicates<S: ContactStore + ?Sized>(store: &S) -> Result<CollapseOutcome> {
    let contacts = store
        .list_all()
        .await
        .context("Failed to list contacts for duplicate merge")?;

    let mut outcome = CollapseOutcome::default();
    for group in group_by_key(contacts) {
        let Some((keeper, others)) = merge_members(group) else {
            continue;
        };
        let remove_ids: Vec<String> = others.iter().map(|c| c.id.clone()).collect();

        match store.merge_group(&keeper, &remove_ids).await {
            Ok(()) => {
                tracing::debug!(
                    callsign = %keeper.record.callsign,
                    keeper = %keeper.id,
                    removed = remove_ids.len(),
                    "merged duplicate group"
                );
                outcome.groups_merged += 1;
                outcome.removed += remove_ids.len() as u64;
            }
            Err(e) => {
                tracing::warn!(callsign = %keeper.record.callsign, error = %e, "merge failed");
                outcome.errors.push(format!(
                    "Error merging duplicates of {} on {} {}: {}",
                    keeper.record.callsign, keeper.record.date, keeper.record.time_on, e
                ));
            }
        }
    }

    tracing::info!(
        groups = outcome.groups_merged,
        removed = outcome.removed,
        "duplicate merge finished"
    );
    Ok(outcome)
}

/// Group contacts by key, preserving first-seen group order and the
/// member order of `contacts`.
fn group_by_key(contacts: Vec<StoredContact>) -> Vec<Vec<StoredContact>> {
    let mut index: HashMap<DedupKey, usize> = HashMap::new();
    let mut groups: Vec<Vec<StoredContact>> = Vec::new();
    for contact in contacts {
        let key = contact.record.dedup_key();
        match index.get(&key) {
            Some(&i) => groups[i].push(contact),
            None => {
                index.insert(key, groups.len());
                groups.push(vec![contact]);
            }
        }
    }
    groups
}

/// Pick the keeper of a group and fill its gaps from the others.
///
/// `group` must already be in creation order. Returns `None` for groups
/// with a single member.
fn merge_members(mut group: Vec<StoredContact>) -> Option<(StoredContact, Vec<StoredContact>)> {
    if group.len() < 2 {
        return None;
    }
    let others = group.split_off(1);
    let mut keeper = group.pop()?;
    for other in &others {
        keeper.record.fill_missing_from(&other.record);
    }
    Some((keeper, others))
}
