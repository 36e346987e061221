//! # mybay Core
//!
//! Core library for the mybay listing filter engine.
//!
//! This crate provides the fundamental data structures and matching logic:
//!
//! - [`Record`] - A catalog item with `details`, `derived` and `llmDerived` attribute groups
//! - [`FieldName`] / [`FieldGroup`] - The closed catalog of filterable fields
//! - [`FieldMatcher`] - Direct and variant (fuzzy) matching of one field against one clause
//! - [`ClauseResolver`] / [`Predicate`] - Boolean composition of clauses into a record predicate
//! - [`RecordStore`] / [`Collection`] - Read-only record access and an in-memory implementation
//!
//! ## Example
//!
//! ```rust
//! use mybay_core::{ClauseResolver, FieldName, FilterClause, Record, Scalar};
//!
//! let mut record = Record::new("item-1");
//! record.derived.ram_size = vec![16.0];
//!
//! let clause = FilterClause::new(
//!     FieldName::RamSize,
//!     vec![Scalar::Text("16".to_string())],
//!     None,
//! ).unwrap();
//! let resolver = ClauseResolver::new(vec![clause]);
//! assert!(resolver.evaluate(&record));
//! ```

pub mod collection;
pub mod distance;
pub mod error;
pub mod field;
pub mod filter;
pub mod matcher;
pub mod record;

pub use collection::{Collection, CollectionConfig, RecordCursor, RecordStore};
pub use distance::{edit_distance, numeric_distance, DistanceMetric};
pub use error::{Error, Result};
pub use field::{FieldGroup, FieldKind, FieldName};
pub use filter::{ClauseResolver, Filter, MatchResult, NumericRange, Predicate};
pub use matcher::{FieldMatcher, FilterClause, MatchKind};
pub use record::{
    canonical_number, normalize_text, Derived, Details, FieldValues, LlmDerived, Price, Record,
    ReturnPeriod, ReturnTerms, Scalar,
};
