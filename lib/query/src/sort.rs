//! Optional explicit ordering
//!
//! Without sort keys the collection's natural order is kept. With keys, the
//! sort is stable and records lacking a value sort last in either direction.
//! Categorical fields (condition, the LLM axes, specs completeness and
//! consistency) order by their stored rank rather than their text.

use mybay_core::{FieldKind, FieldName, Record, Scalar};
use ordered_float::OrderedFloat;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn from_i64(direction: i64) -> Option<Self> {
        match direction {
            1 => Some(SortDirection::Ascending),
            -1 => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: FieldName,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortValue {
    Bool(bool),
    Number(OrderedFloat<f64>),
    Text(String),
}

// Multi-valued fields sort on their first value.
fn sort_value(record: &Record, field: FieldName) -> Option<SortValue> {
    if field.is_ranked() {
        return record.rank(field).map(|r| SortValue::Number(OrderedFloat(r as f64)));
    }
    let first = record.values(field).into_iter().next()?;
    Some(match (field.kind(), first) {
        (FieldKind::Numeric, value) => SortValue::Number(OrderedFloat(value.as_f64()?)),
        (_, Scalar::Bool(b)) => SortValue::Bool(b),
        (_, value) => SortValue::Text(value.normalized()),
    })
}

fn compare(a: &Record, b: &Record, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ordering = match (sort_value(a, key.field), sort_value(b, key.field)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => match key.direction {
                SortDirection::Ascending => x.cmp(&y),
                SortDirection::Descending => y.cmp(&x),
            },
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Stable in-place sort of anything that exposes a record
pub fn sort_by_keys<T, F>(items: &mut [T], keys: &[SortKey], record: F)
where
    F: Fn(&T) -> &Record,
{
    if keys.is_empty() {
        return;
    }
    items.sort_by(|a, b| compare(record(a), record(b), keys));
}
