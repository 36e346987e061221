use crate::planner::PageResult;
use crate::stats::{FieldStats, FilterValue, PriceStats};
use mybay_core::{Error, Record};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsResponse {
    pub items: Vec<Record>,
    pub total_count: usize,
    pub total_pages: usize,
    pub page: usize,
    pub page_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<FieldStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_stats: Option<PriceStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_filters: Option<BTreeMap<String, Vec<FilterValue>>>,
}

impl From<PageResult> for ItemsResponse {
    fn from(page: PageResult) -> Self {
        Self {
            items: page.items.iter().map(|r| Record::clone(r)).collect(),
            total_count: page.total_count,
            total_pages: page.total_pages,
            page: page.page,
            page_size: page.page_size,
            stats: None,
            price_stats: None,
            available_filters: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    pub details: Option<Vec<String>>,
}

/// `{"error": {"code", "message", "details"}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorEnvelope,
    #[serde(skip)]
    pub status: u16,
}

impl From<&Error> for ErrorResponse {
    fn from(err: &Error) -> Self {
        let details = match err {
            Error::InvalidRequest(reason) => Some(vec![reason.clone()]),
            _ => None,
        };
        let message = match err {
            Error::InvalidRequest(_) => "Request validation failed".to_string(),
            other => other.to_string(),
        };
        Self {
            error: ErrorEnvelope {
                code: err.code().to_string(),
                message,
                details,
            },
            status: err.status_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_envelope() {
        let err = Error::invalid("unknown field 'screenColor'");
        let body = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
        assert_eq!(
            body,
            json!({"error": {
                "code": "VALIDATION_ERROR",
                "message": "Request validation failed",
                "details": ["unknown field 'screenColor'"]
            }})
        );
        assert_eq!(ErrorResponse::from(&err).status, 422);
    }

    #[test]
    fn test_not_found_and_unavailable_envelopes() {
        let not_found = ErrorResponse::from(&Error::CollectionNotFound("Unknown".into()));
        assert_eq!(not_found.error.code, "HTTP_404");
        assert!(not_found.error.message.to_lowercase().contains("not found"));
        assert!(not_found.error.details.is_none());

        let down = ErrorResponse::from(&Error::StoreUnavailable("timeout".into()));
        assert_eq!(down.status, 503);
        assert_eq!(down.error.code, "STORE_UNAVAILABLE");
    }

    #[test]
    fn test_items_response_camel_case() {
        let page = PageResult {
            items: vec![],
            total_count: 0,
            total_pages: 0,
            page: 1,
            page_size: 10,
            variant_matches: 0,
        };
        let body = serde_json::to_value(ItemsResponse::from(page)).unwrap();
        assert_eq!(body["totalCount"], 0);
        assert_eq!(body["pageSize"], 10);
        assert!(body.get("stats").is_none());
        assert!(body.get("availableFilters").is_none());
    }
}
