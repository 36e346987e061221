pub mod manager;
pub mod snapshot;

pub use manager::CatalogManager;
pub use snapshot::{read_snapshot, write_snapshot, SnapshotFormat};
