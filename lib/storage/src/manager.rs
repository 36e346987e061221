use crate::snapshot::{read_snapshot, SnapshotFormat};
use mybay_core::{Collection, CollectionConfig, Error, RecordCursor, RecordStore, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Named collections, loaded once and then served read-only
pub struct CatalogManager {
    collections: Arc<RwLock<HashMap<String, Arc<Collection>>>>,
    data_dir: Option<PathBuf>,
}

impl Default for CatalogManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogManager {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            data_dir: None,
        }
    }

    /// Load every `*.json` / `*.jsonl` snapshot in `data_dir`. Files with any
    /// other extension are ignored; a malformed snapshot fails the whole load.
    pub fn load_dir<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        if !data_dir.is_dir() {
            return Err(Error::Storage(format!(
                "data directory {} does not exist",
                data_dir.display()
            )));
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(&data_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && SnapshotFormat::from_path(path).is_some())
            .collect();
        paths.sort();

        let mut collections = HashMap::new();
        for path in paths {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            if collections.contains_key(&name) {
                return Err(Error::Storage(format!(
                    "collection '{}' has more than one snapshot file",
                    name
                )));
            }
            let records = read_snapshot(&path)?;
            debug!(
                collection = %name,
                path = %path.display(),
                records = records.len(),
                "snapshot read"
            );
            let config = CollectionConfig { name: name.clone() };
            let collection = Collection::with_records(config, records)?;
            collections.insert(name, Arc::new(collection));
        }

        info!(
            data_dir = %data_dir.display(),
            collections = collections.len(),
            "catalog loaded"
        );

        Ok(Self {
            collections: Arc::new(RwLock::new(collections)),
            data_dir: Some(data_dir),
        })
    }

    /// Register a collection, replacing any previous one of the same name
    pub fn insert_collection(&self, collection: Collection) -> Arc<Collection> {
        let collection = Arc::new(collection);
        self.collections
            .write()
            .insert(collection.name().to_string(), collection.clone());
        collection
    }

    #[inline]
    pub fn get_collection(&self, name: &str) -> Option<Arc<Collection>> {
        self.collections.read().get(name).cloned()
    }

    #[inline]
    #[must_use]
    pub fn list_collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    #[inline]
    #[must_use]
    pub fn collection_exists(&self, name: &str) -> bool {
        self.collections.read().contains_key(name)
    }

    #[inline]
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }
}

impl RecordStore for CatalogManager {
    fn scan(&self, collection: &str) -> Result<RecordCursor> {
        // Release the catalog lock before touching the collection
        let found = self.get_collection(collection);
        match found {
            Some(c) => c.scan(collection),
            None => Err(Error::CollectionNotFound(collection.to_string())),
        }
    }
}
