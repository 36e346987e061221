//! # mybay Query
//!
//! Request validation, query planning and aggregation on top of `mybay-core`.
//!
//! ## Flow
//!
//! ```text
//! FilterRequest ──validate──> Query ──QueryPlanner──> PageResult
//!                               │                        │
//!                               └──StatsAggregator──> stats / facets / price stats
//!                                                        │
//!                                                  ItemsResponse
//! ```
//!
//! ## Example
//!
//! ```rust
//! use mybay_core::{Collection, CollectionConfig, Record};
//! use mybay_query::{ClauseSpec, EngineConfig, FilterRequest, SearchEngine};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let collection = Collection::new(CollectionConfig { name: "MacBookPro".to_string() });
//! let mut record = Record::new("item-1");
//! record.derived.ram_size = vec![16.0];
//! collection.upsert(record).unwrap();
//!
//! let engine = SearchEngine::new(Arc::new(collection), EngineConfig::default()).unwrap();
//! let request = FilterRequest::new("MacBookPro")
//!     .filter(ClauseSpec::new("ramSize", vec![json!("16")]))
//!     .paged(1, 10);
//! let response = engine.execute(&request).unwrap();
//! assert_eq!(response.total_count, 1);
//! ```

pub mod config;
pub mod engine;
pub mod planner;
pub mod request;
pub mod response;
pub mod sort;
pub mod stats;

pub use config::EngineConfig;
pub use engine::SearchEngine;
pub use planner::{PageResult, QueryPlanner};
pub use request::{ClauseSpec, FilterRequest, Pagination, Query, SortSpec};
pub use response::{ErrorEnvelope, ErrorResponse, ItemsResponse};
pub use sort::{SortDirection, SortKey};
pub use stats::{
    compute_price_buckets, compute_price_stats, FieldStats, FieldValueDistribution, FilterValue,
    PriceBucket, PriceStats, StatsAggregator,
};
