use crate::config::EngineConfig;
use crate::planner::QueryPlanner;
use crate::request::FilterRequest;
use crate::response::ItemsResponse;
use crate::stats::StatsAggregator;
use mybay_core::{RecordStore, Result};
use std::sync::Arc;
use tracing::info;

/// Entry point used by callers: validate, plan, paginate and aggregate.
///
/// Holds no per-request state, so one engine can serve concurrent callers.
pub struct SearchEngine<S: RecordStore + ?Sized> {
    store: Arc<S>,
    config: EngineConfig,
}

impl<S: RecordStore + ?Sized> SearchEngine<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn execute(&self, request: &FilterRequest) -> Result<ItemsResponse> {
        let query = request.validate(&self.config)?;
        let store: &S = &self.store;

        let page = QueryPlanner::new(store, &self.config).execute(&query)?;
        let variant_matches = page.variant_matches;
        let mut response = ItemsResponse::from(page);

        let aggregator = StatsAggregator::new(store);
        if let Some(field) = query.stats_field {
            response.stats = Some(aggregator.aggregate(&query.collection, &query.resolver, field)?);
        }
        if query.price_stats {
            response.price_stats =
                aggregator.price_stats(&query.collection, &query.resolver, &self.config)?;
        }
        if !query.facets.is_empty() {
            response.available_filters = Some(aggregator.available_filters(
                &query.collection,
                &query.resolver,
                &query.facets,
            )?);
        }

        info!(
            collection = %query.collection,
            total = response.total_count,
            page = response.page,
            variant_matches,
            "executed filter request"
        );
        Ok(response)
    }
}
