use crate::config::EngineConfig;
use crate::request::{FilterRequest, Query};
use crate::sort::sort_by_keys;
use mybay_core::{MatchResult, Record, RecordStore, Result};
use std::sync::Arc;
use tracing::debug;

/// One page of matching records
#[derive(Debug, Clone)]
pub struct PageResult {
    pub items: Vec<Arc<Record>>,
    pub total_count: usize,
    pub total_pages: usize,
    pub page: usize,
    pub page_size: usize,
    /// Matches that satisfied at least one clause only through a variant hit
    pub variant_matches: usize,
}

/// Resolves a request against a store and slices out the requested page
pub struct QueryPlanner<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    config: &'a EngineConfig,
}

impl<'a, S: RecordStore + ?Sized> QueryPlanner<'a, S> {
    pub fn new(store: &'a S, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    /// Validate and run a wire request. Validation errors are raised before
    /// the store is touched.
    pub fn plan(&self, request: &FilterRequest) -> Result<PageResult> {
        let query = request.validate(self.config)?;
        self.execute(&query)
    }

    pub fn execute(&self, query: &Query) -> Result<PageResult> {
        let pagination = query.pagination;
        let skip = pagination.skip();
        let take = pagination.page_size;

        debug!(
            collection = %query.collection,
            clauses = query.resolver.clauses().len(),
            page = pagination.page,
            page_size = take,
            "planning query"
        );

        let cursor = self.store.scan(&query.collection)?;
        let matches = cursor.filter_map(|record| query.resolver.resolve(&record));

        let mut total_count = 0;
        let mut variant_matches = 0;
        let mut items = Vec::with_capacity(take.min(64));

        if query.sort.is_empty() {
            // Natural order: count everything, keep only the page window
            for (index, m) in matches.enumerate() {
                total_count += 1;
                if m.used_variant() {
                    variant_matches += 1;
                }
                if index >= skip && items.len() < take {
                    items.push(m.record);
                }
            }
        } else {
            let mut all: Vec<MatchResult> = matches.collect();
            sort_by_keys(&mut all, &query.sort, |m| m.record.as_ref());
            total_count = all.len();
            variant_matches = all.iter().filter(|m| m.used_variant()).count();
            items.extend(all.into_iter().skip(skip).take(take).map(|m| m.record));
        }

        let total_pages = pagination.total_pages(total_count);
        debug!(
            collection = %query.collection,
            total_count,
            total_pages,
            returned = items.len(),
            variant_matches,
            "query resolved"
        );

        Ok(PageResult {
            items,
            total_count,
            total_pages,
            page: pagination.page,
            page_size: take,
            variant_matches,
        })
    }
}
