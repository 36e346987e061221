//! Value distributions and price statistics
//!
//! Distributions answer "which values of this field are still selectable":
//! the matched side applies every constraint except the ones on the field
//! itself, the full side ignores all constraints. Nothing here is cached;
//! each call rescans the store.

use crate::config::EngineConfig;
use ahash::AHashSet;
use mybay_core::{ClauseResolver, FieldName, Record, RecordStore, Result};
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Normalized value -> occurrence count
pub type FieldValueDistribution = BTreeMap<String, usize>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldStats {
    pub field: FieldName,
    pub matched_distribution: FieldValueDistribution,
    pub full_distribution: FieldValueDistribution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterValue {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBucket {
    pub range_min: u64,
    pub range_max: u64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_buckets: Option<Vec<PriceBucket>>,
}

/// Count each distinct normalized value of `field` once per record
fn tally(distribution: &mut FieldValueDistribution, record: &Record, field: FieldName) {
    let values = record.values(field);
    if values.is_empty() {
        return;
    }
    let distinct: AHashSet<String> = values.iter().map(|v| v.normalized()).collect();
    for key in distinct {
        *distribution.entry(key).or_insert(0) += 1;
    }
}

/// Distribution of `field` over an arbitrary record sequence
pub fn distribution<'r, I>(records: I, field: FieldName) -> FieldValueDistribution
where
    I: IntoIterator<Item = &'r Record>,
{
    let mut out = FieldValueDistribution::new();
    for record in records {
        tally(&mut out, record, field);
    }
    out
}

/// Sort by count descending, then value ascending
pub fn ranked(distribution: &FieldValueDistribution) -> Vec<FilterValue> {
    let mut values: Vec<FilterValue> = distribution
        .iter()
        .map(|(value, count)| FilterValue {
            value: value.clone(),
            count: *count,
        })
        .collect();
    values.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    values
}

pub struct StatsAggregator<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> StatsAggregator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Matched and full distributions of `target` in one scan
    pub fn aggregate(
        &self,
        collection: &str,
        base: &ClauseResolver,
        target: FieldName,
    ) -> Result<FieldStats> {
        let relaxed = base.without_field(target);
        let mut matched = FieldValueDistribution::new();
        let mut full = FieldValueDistribution::new();

        for record in self.store.scan(collection)? {
            tally(&mut full, &record, target);
            if relaxed.evaluate(&record) {
                tally(&mut matched, &record, target);
            }
        }

        debug!(
            collection,
            field = %target,
            matched_values = matched.len(),
            full_values = full.len(),
            "aggregated field distribution"
        );

        Ok(FieldStats {
            field: target,
            matched_distribution: matched,
            full_distribution: full,
        })
    }

    /// Selectable values for several facet fields, each excluding its own constraints
    pub fn available_filters(
        &self,
        collection: &str,
        base: &ClauseResolver,
        fields: &[FieldName],
    ) -> Result<BTreeMap<String, Vec<FilterValue>>> {
        let resolvers: Vec<(FieldName, ClauseResolver)> =
            fields.iter().map(|f| (*f, base.without_field(*f))).collect();
        let mut distributions: Vec<FieldValueDistribution> =
            vec![FieldValueDistribution::new(); fields.len()];

        for record in self.store.scan(collection)? {
            for ((field, resolver), dist) in resolvers.iter().zip(distributions.iter_mut()) {
                if resolver.evaluate(&record) {
                    tally(dist, &record, *field);
                }
            }
        }

        Ok(resolvers
            .iter()
            .zip(distributions.iter())
            .map(|((field, _), dist)| (field.as_str().to_string(), ranked(dist)))
            .collect())
    }

    /// Price summary over matched records with price constraints lifted
    pub fn price_stats(
        &self,
        collection: &str,
        base: &ClauseResolver,
        config: &EngineConfig,
    ) -> Result<Option<PriceStats>> {
        let relaxed = base.without_field(FieldName::Price);
        let prices: Vec<f64> = self
            .store
            .scan(collection)?
            .filter(|record| relaxed.evaluate(record))
            .filter_map(|record| record.price())
            .filter(|p| config.accepts_price(*p))
            .collect();

        Ok(compute_price_stats(&prices, config))
    }
}

/// `None` when no price passes `config.accepts_price`
pub fn compute_price_stats(prices: &[f64], config: &EngineConfig) -> Option<PriceStats> {
    let prices: Vec<f64> = prices.iter().copied().filter(|p| config.accepts_price(*p)).collect();
    if prices.is_empty() {
        return None;
    }

    let mut sorted: Vec<OrderedFloat<f64>> = prices.iter().copied().map(OrderedFloat).collect();
    sorted.sort();

    let count = sorted.len();
    let mid = count / 2;
    let median = if count % 2 == 0 {
        (sorted[mid - 1].0 + sorted[mid].0) / 2.0
    } else {
        sorted[mid].0
    };

    Some(PriceStats {
        min: sorted[0].0,
        max: sorted[count - 1].0,
        mean: prices.iter().sum::<f64>() / count as f64,
        median,
        count,
        price_buckets: compute_price_buckets(
            &prices,
            config.price_bucket_width,
            config.min_prices_for_buckets,
            config.max_price_buckets,
        ),
    })
}

/// Fixed-width histogram: `1..=w`, `w+1..=2w`, ... up to the bucket holding the max.
///
/// At most `max_buckets` buckets are produced; prices past the last one are
/// counted in it. Non-finite prices are skipped. `None` when there are fewer
/// than `min_prices` prices.
pub fn compute_price_buckets(
    prices: &[f64],
    width: u32,
    min_prices: usize,
    max_buckets: usize,
) -> Option<Vec<PriceBucket>> {
    let prices: Vec<f64> = prices.iter().copied().filter(|p| p.is_finite()).collect();
    if prices.len() < min_prices.max(1) || width == 0 || max_buckets == 0 {
        return None;
    }

    let width = width as f64;
    let last = max_buckets - 1;
    // Index computed in f64 and clamped before the cast
    let index_of = |price: f64| {
        let index = (price / width).ceil() - 1.0;
        index.clamp(0.0, last as f64) as usize
    };

    let max = prices.iter().copied().fold(f64::MIN, f64::max);
    let bucket_count = index_of(max) + 1;

    let mut counts = vec![0usize; bucket_count];
    for price in &prices {
        counts[index_of(*price)] += 1;
    }

    Some(
        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| PriceBucket {
                range_min: (i as f64 * width) as u64 + 1,
                range_max: ((i + 1) as f64 * width) as u64,
                count,
            })
            .collect(),
    )
}
