use crate::{Error, Record, Result};
use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Records handed out by a scan, in the collection's natural order
pub type RecordCursor = std::vec::IntoIter<Arc<Record>>;

/// Read-only access to named record collections.
///
/// Implementations must tolerate concurrent callers; the engine never writes.
pub trait RecordStore: Send + Sync {
    /// All records of `collection` in natural (insertion) order
    fn scan(&self, collection: &str) -> Result<RecordCursor>;

    /// Number of records in `collection`
    fn count(&self, collection: &str) -> Result<usize> {
        Ok(self.scan(collection)?.len())
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    fn scan(&self, collection: &str) -> Result<RecordCursor> {
        (**self).scan(collection)
    }

    fn count(&self, collection: &str) -> Result<usize> {
        (**self).count(collection)
    }
}

/// Configuration for a collection
#[derive(Debug, Clone, Default)]
pub struct CollectionConfig {
    pub name: String,
}

struct Inner {
    records: Vec<Arc<Record>>,
    positions: AHashMap<String, usize>,
}

/// An ordered, in-memory collection of records keyed by item id
pub struct Collection {
    config: CollectionConfig,
    inner: RwLock<Inner>,
}

impl Collection {
    pub fn new(config: CollectionConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(Inner {
                records: Vec::new(),
                positions: AHashMap::new(),
            }),
        }
    }

    pub fn with_records(config: CollectionConfig, records: Vec<Record>) -> Result<Self> {
        let collection = Self::new(config);
        collection.batch_upsert(records)?;
        Ok(collection)
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn count(&self) -> usize {
        self.inner.read().records.len()
    }

    /// Insert or replace a record. A replaced record keeps its position.
    pub fn upsert(&self, record: Record) -> Result<()> {
        if record.item_id.trim().is_empty() {
            return Err(Error::Storage(format!(
                "record without itemId in collection '{}'",
                self.config.name
            )));
        }

        let mut inner = self.inner.write();
        let record = Arc::new(record);
        match inner.positions.get(&record.item_id).copied() {
            Some(pos) => inner.records[pos] = record,
            None => {
                let pos = inner.records.len();
                inner.positions.insert(record.item_id.clone(), pos);
                inner.records.push(record);
            }
        }
        Ok(())
    }

    pub fn batch_upsert(&self, records: Vec<Record>) -> Result<()> {
        for record in records {
            self.upsert(record)?;
        }
        Ok(())
    }

    pub fn get(&self, item_id: &str) -> Option<Arc<Record>> {
        let inner = self.inner.read();
        inner.positions.get(item_id).map(|&pos| inner.records[pos].clone())
    }

    /// Snapshot of all records; the lock is released before the caller iterates
    pub fn iter(&self) -> RecordCursor {
        self.inner.read().records.clone().into_iter()
    }
}

impl RecordStore for Collection {
    fn scan(&self, collection: &str) -> Result<RecordCursor> {
        if collection != self.config.name {
            return Err(Error::CollectionNotFound(collection.to_string()));
        }
        Ok(self.iter())
    }

    fn count(&self, collection: &str) -> Result<usize> {
        if collection != self.config.name {
            return Err(Error::CollectionNotFound(collection.to_string()));
        }
        Ok(Collection::count(self))
    }
}
