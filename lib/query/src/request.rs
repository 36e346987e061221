//! Filter request shapes and validation
//!
//! [`FilterRequest`] is the loosely-typed wire form. [`FilterRequest::validate`]
//! turns it into a [`Query`] whose fields, values and pagination are all
//! checked, so planning never starts on a bad request.

use crate::config::EngineConfig;
use crate::sort::{SortDirection, SortKey};
use mybay_core::{
    ClauseResolver, Error, FieldGroup, FieldName, FilterClause, NumericRange, Result, Scalar,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One field constraint as sent by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClauseSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<FieldGroup>,
    pub field: String,
    #[serde(default)]
    pub values: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_threshold: Option<f64>,
}

impl ClauseSpec {
    pub fn new(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            group: None,
            field: field.into(),
            values,
            variant_threshold: None,
        }
    }

    pub fn in_group(mut self, group: FieldGroup) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.variant_threshold = Some(threshold);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub field: String,
    /// 1 ascending, -1 descending
    #[serde(default = "ascending")]
    pub direction: i64,
}

fn ascending() -> i64 {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    #[serde(alias = "name")]
    pub collection: String,
    #[serde(default)]
    pub filters: Vec<ClauseSpec>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub page_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<String>,
    #[serde(default)]
    pub price_stats: bool,
}

impl FilterRequest {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..Default::default()
        }
    }

    pub fn filter(mut self, clause: ClauseSpec) -> Self {
        self.filters.push(clause);
        self
    }

    pub fn paged(mut self, page: i64, page_size: i64) -> Self {
        self.page = Some(page);
        self.page_size = Some(page_size);
        self
    }

    pub fn stats_for(mut self, field: impl Into<String>) -> Self {
        self.stats_field = Some(field.into());
        self
    }

    /// Parse a request body. A body that does not fit the request shape is a
    /// client error, not a serialization fault.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::invalid(format!("malformed request: {}", e)))
    }

    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| Error::invalid(format!("malformed request: {}", e)))
    }

    /// Check everything and build the executable query
    pub fn validate(&self, config: &EngineConfig) -> Result<Query> {
        let collection = self.collection.trim();
        if collection.is_empty() {
            return Err(Error::invalid("collection must not be empty"));
        }

        let pagination = Pagination::new(
            self.page.unwrap_or(1),
            self.page_size.unwrap_or(config.default_page_size as i64),
            config.max_page_size,
        )?;

        let mut clauses = Vec::with_capacity(self.filters.len());
        for spec in &self.filters {
            let field = FieldName::resolve(spec.group, &spec.field)?;
            // An empty selection places no constraint on the field
            if spec.values.is_empty() {
                continue;
            }
            let values = spec
                .values
                .iter()
                .map(|v| scalar_from_json(field, v))
                .collect::<Result<Vec<_>>>()?;
            clauses.push(FilterClause::new(field, values, spec.variant_threshold)?);
        }

        let mut resolver = ClauseResolver::new(clauses);
        let price_range =
            NumericRange::from_bounds(FieldName::Price, self.min_price, self.max_price)?;
        if let Some(range) = price_range {
            resolver = resolver.with_range(range);
        }

        let stats_field = self
            .stats_field
            .as_deref()
            .map(|name| FieldName::resolve(None, name))
            .transpose()?;

        let sort = self
            .sort
            .iter()
            .map(|spec| {
                let field = FieldName::resolve(None, &spec.field)?;
                let direction = SortDirection::from_i64(spec.direction).ok_or_else(|| {
                    Error::invalid(format!(
                        "sort direction for '{}' must be 1 or -1, got {}",
                        spec.field, spec.direction
                    ))
                })?;
                Ok(SortKey { field, direction })
            })
            .collect::<Result<Vec<_>>>()?;

        let facets = self
            .facets
            .iter()
            .map(|name| FieldName::resolve(None, name))
            .collect::<Result<Vec<_>>>()?;

        Ok(Query {
            collection: collection.to_string(),
            resolver,
            pagination,
            stats_field,
            sort,
            facets,
            price_stats: self.price_stats,
        })
    }
}

fn scalar_from_json(field: FieldName, value: &Value) -> Result<Scalar> {
    match value {
        Value::String(s) => Ok(Scalar::Text(s.clone())),
        Value::Number(n) => n
            .as_f64()
            .map(Scalar::Number)
            .ok_or_else(|| Error::invalid(format!("unrepresentable number for '{}'", field))),
        Value::Bool(b) => Ok(Scalar::Bool(*b)),
        other => Err(Error::invalid(format!(
            "filter values for '{}' must be strings, numbers or booleans, got {}",
            field, other
        ))),
    }
}

/// Validated page coordinates. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
}

impl Pagination {
    pub fn new(page: i64, page_size: i64, max_page_size: usize) -> Result<Self> {
        if page < 1 {
            return Err(Error::invalid(format!("page must be >= 1, got {}", page)));
        }
        if page_size <= 0 {
            return Err(Error::invalid(format!("pageSize must be > 0, got {}", page_size)));
        }
        if page_size as u64 > max_page_size as u64 {
            return Err(Error::invalid(format!(
                "pageSize must be <= {}, got {}",
                max_page_size, page_size
            )));
        }
        Ok(Self {
            page: page as usize,
            page_size: page_size as usize,
        })
    }

    pub fn skip(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }
}

/// A fully validated request
#[derive(Debug, Clone)]
pub struct Query {
    pub collection: String,
    pub resolver: ClauseResolver,
    pub pagination: Pagination,
    pub stats_field: Option<FieldName>,
    pub sort: Vec<SortKey>,
    pub facets: Vec<FieldName>,
    pub price_stats: bool,
}
