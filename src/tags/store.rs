//! In-memory tag tables
//!
//! Each named table sits behind its own readers-writer lock. A reload clears
//! the table and inserts the new records in a second write section, so a
//! reader arriving in between sees an empty table.

use parking_lot::{RwLock, RwLockReadGuard};
use tracing::info;

use super::record::{TableKind, TagRecord};

pub struct TagStore {
    tables: [RwLock<Vec<TagRecord>>; 5],
}

impl TagStore {
    pub fn new() -> Self {
        Self {
            tables: Default::default(),
        }
    }

    /// Clear `kind`, then insert `records` (records with an empty term are dropped)
    pub fn replace(&self, kind: TableKind, records: Vec<TagRecord>) {
        self.clear(kind);

        let records: Vec<TagRecord> = records.into_iter().filter(|r| !r.term.is_empty()).collect();
        let count = records.len();
        self.table(kind).write().extend(records);

        info!("Loaded {} records into {} table", count, kind);
    }

    pub fn clear(&self, kind: TableKind) {
        self.table(kind).write().clear();
    }

    /// Mutate a table in place under the write lock
    pub fn update<F>(&self, kind: TableKind, f: F)
    where
        F: FnOnce(&mut Vec<TagRecord>),
    {
        f(&mut self.table(kind).write());
    }

    pub fn read(&self, kind: TableKind) -> RwLockReadGuard<'_, Vec<TagRecord>> {
        self.table(kind).read()
    }

    pub fn len(&self, kind: TableKind) -> usize {
        self.table(kind).read().len()
    }

    pub fn total_len(&self) -> usize {
        TableKind::ALL.iter().map(|kind| self.len(*kind)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    fn table(&self, kind: TableKind) -> &RwLock<Vec<TagRecord>> {
        &self.tables[kind.index()]
    }
}

impl Default for TagStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_and_clear() {
        let store = TagStore::new();
        assert!(store.is_empty());

        store.replace(
            TableKind::Main,
            vec![TagRecord::plain("cat"), TagRecord::plain(""), TagRecord::plain("dog")],
        );
        store.replace(TableKind::Extra, vec![TagRecord::plain("masterpiece")]);
        assert_eq!(store.len(TableKind::Main), 2);
        assert_eq!(store.total_len(), 3);

        store.replace(TableKind::Main, vec![TagRecord::plain("bird")]);
        assert_eq!(store.read(TableKind::Main)[0].term, "bird");
        assert_eq!(store.len(TableKind::Main), 1);

        store.clear(TableKind::Extra);
        assert_eq!(store.len(TableKind::Extra), 0);
        assert_eq!(store.len(TableKind::Main), 1);
    }

    #[test]
    fn test_update_in_place() {
        let store = TagStore::new();
        store.replace(TableKind::Main, vec![TagRecord::plain("cat")]);
        store.update(TableKind::Main, |records| {
            records[0].translate = Some("猫".to_string());
        });
        assert_eq!(store.read(TableKind::Main)[0].translate.as_deref(), Some("猫"));
    }

    #[test]
    fn test_concurrent_readers() {
        let store = std::sync::Arc::new(TagStore::new());
        store.replace(TableKind::Main, vec![TagRecord::plain("cat")]);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.read(TableKind::Main).len())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
    }
}
