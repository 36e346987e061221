//! # mybay
//!
//! A filter engine for marketplace listing catalogs.
//!
//! Each listing carries `details`, `derived` and `llmDerived` attributes. A
//! request names a collection and a set of field clauses. Every clause matches
//! directly (normalized equality) or, when a variant threshold is set, as a
//! variant within an edit or numeric distance. The engine returns one page of
//! matches in the collection's natural order plus, on request, value
//! distributions, facets and price statistics.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! mybay --data-dir ./data --request request.json
//! ```
//!
//! where `./data/MacBookPro.json` holds an array of records and
//! `request.json` is:
//!
//! ```json
//! {
//!   "collection": "MacBookPro",
//!   "filters": [{"field": "ramSize", "values": ["16"]}],
//!   "page": 1,
//!   "pageSize": 10
//! }
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use mybay::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let catalog = CatalogManager::new();
//! let collection = Collection::new(CollectionConfig { name: "MacBookPro".to_string() });
//! let mut record = Record::new("item-1");
//! record.derived.cpu_model = vec!["i7-7820HQ".to_string()];
//! collection.upsert(record).unwrap();
//! catalog.insert_collection(collection);
//!
//! let engine = SearchEngine::new(Arc::new(catalog), EngineConfig::default()).unwrap();
//! let request = FilterRequest::new("MacBookPro")
//!     .filter(ClauseSpec::new("cpuModel", vec![json!("i7-7820")]).with_threshold(2.0));
//! let response = engine.execute(&request).unwrap();
//! assert_eq!(response.total_count, 1);
//! ```
//!
//! ## Crate Structure
//!
//! - `mybay-core` - Record model, field catalog, matching and predicates
//! - `mybay-query` - Request validation, planning, pagination and statistics
//! - `mybay-storage` - Collection catalog and snapshot loading

// Re-export core types
pub use mybay_core::{
    ClauseResolver, Collection, CollectionConfig, Error, FieldGroup, FieldKind, FieldMatcher,
    FieldName, Filter, FilterClause, MatchKind, NumericRange, Predicate, Record, RecordStore,
    Result, Scalar,
};

// Re-export query layer
pub use mybay_query::{
    ClauseSpec, EngineConfig, ErrorResponse, FieldStats, FilterRequest, ItemsResponse, PageResult,
    PriceStats, QueryPlanner, SearchEngine, SortSpec, StatsAggregator,
};

// Re-export storage
pub use mybay_storage::CatalogManager;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CatalogManager, ClauseSpec, Collection, CollectionConfig, EngineConfig, Error,
        ErrorResponse, FieldGroup, FieldName, FilterRequest, ItemsResponse, Record, RecordStore,
        Result, SearchEngine,
    };
}
