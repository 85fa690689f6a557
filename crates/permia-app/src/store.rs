// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::ids::RowId;
use crate::record::Record;

/// Identity-keyed, insertion-ordered rows of one entity kind.
///
/// Every mutation installs a fresh `Arc<[R]>`, so a snapshot taken before a
/// patch keeps seeing the rows it was taken from.
#[derive(Debug, Clone)]
pub struct RowStore<R: Record> {
    rows: Arc<[R]>,
    index: HashMap<RowId, usize>,
    revision: u64,
}

impl<R: Record> Default for RowStore<R> {
    fn default() -> Self {
        Self {
            rows: Arc::from(Vec::new()),
            index: HashMap::new(),
            revision: 0,
        }
    }
}

impl<R: Record> RowStore<R> {
    pub fn new(records: Vec<R>) -> Self {
        let mut store = Self::default();
        store.replace_all(records);
        store
    }

    /// Discards the current rows and installs `records`. A record whose id
    /// repeats an earlier one is dropped.
    pub fn replace_all(&mut self, records: Vec<R>) {
        let incoming = records.len();
        let mut index = HashMap::with_capacity(incoming);
        let mut rows = Vec::with_capacity(incoming);
        for record in records {
            if index.contains_key(record.id()) {
                warn!(
                    kind = R::KIND.as_str(),
                    id = %record.id(),
                    "dropping record with duplicate id"
                );
                continue;
            }
            index.insert(record.id().clone(), rows.len());
            rows.push(record);
        }
        debug!(
            kind = R::KIND.as_str(),
            incoming,
            kept = rows.len(),
            "row store replaced"
        );
        self.rows = Arc::from(rows);
        self.index = index;
        self.revision += 1;
    }

    /// Replaces the row with `id` by `updater(existing)`. Returns false when
    /// no row has that id or the updater tried to change the id.
    pub fn patch<F>(&mut self, id: &RowId, updater: F) -> bool
    where
        F: FnOnce(&R) -> R,
    {
        let Some(&position) = self.index.get(id) else {
            debug!(kind = R::KIND.as_str(), %id, "patch target not found");
            return false;
        };
        let updated = updater(&self.rows[position]);
        if updated.id() != id {
            warn!(
                kind = R::KIND.as_str(),
                %id,
                new_id = %updated.id(),
                "rejecting patch that changes the row id"
            );
            return false;
        }
        let mut rows = self.rows.to_vec();
        rows[position] = updated;
        self.rows = Arc::from(rows);
        self.revision += 1;
        true
    }

    pub fn snapshot(&self) -> Arc<[R]> {
        Arc::clone(&self.rows)
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn get(&self, id: &RowId) -> Option<&R> {
        self.index.get(id).map(|&position| &self.rows[position])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Bumped by every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::RowStore;
    use crate::model::{CardStatus, VirtualCard};
    use crate::RowId;

    fn card(id: &str, balance: f64) -> VirtualCard {
        VirtualCard {
            id: RowId::from(id),
            pan: format!("4111 0000 0000 000{id}"),
            expiry: "12/27".to_owned(),
            cvv: "123".to_owned(),
            balance,
            provider: "Brocard".to_owned(),
            status: CardStatus::Available,
        }
    }

    #[test]
    fn patch_with_missing_id_changes_nothing() {
        let mut store = RowStore::new(vec![card("1", 10.0), card("2", 20.0)]);
        let before = store.snapshot();
        let revision = store.revision();

        assert!(!store.patch(&RowId::from("9"), |row| row.clone()));
        assert_eq!(store.rows(), &before[..]);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn patch_replaces_one_row_and_keeps_order() {
        let mut store = RowStore::new(vec![card("1", 10.0), card("2", 20.0), card("3", 30.0)]);
        let before = store.snapshot();

        assert!(store.patch(&RowId::from("2"), |row| VirtualCard {
            status: CardStatus::Used,
            ..row.clone()
        }));

        let ids: Vec<&str> = store.rows().iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert_eq!(store.rows()[1].status, CardStatus::Used);
        assert_eq!(before[1].status, CardStatus::Available);
    }

    #[test]
    fn patch_rejects_id_change() {
        let mut store = RowStore::new(vec![card("1", 10.0)]);
        assert!(!store.patch(&RowId::from("1"), |row| VirtualCard {
            id: RowId::from("7"),
            ..row.clone()
        }));
        assert!(store.get(&RowId::from("1")).is_some());
        assert!(store.get(&RowId::from("7")).is_none());
    }

    #[test]
    fn replace_all_drops_duplicate_ids() {
        let mut store = RowStore::new(vec![card("1", 10.0)]);
        store.replace_all(vec![card("5", 1.0), card("6", 2.0), card("5", 3.0)]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&RowId::from("5")).map(|row| row.balance), Some(1.0));
        assert!(store.get(&RowId::from("1")).is_none());
    }

    #[test]
    fn empty_store() {
        let store: RowStore<VirtualCard> = RowStore::default();
        assert!(store.is_empty());
        assert_eq!(store.revision(), 0);
    }
}
