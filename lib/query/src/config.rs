use mybay_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for request validation and statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Page size used when a request omits `pageSize`
    pub default_page_size: usize,
    /// Largest accepted `pageSize`
    pub max_page_size: usize,
    /// Width of a price histogram bucket, in currency units
    pub price_bucket_width: u32,
    /// Fewer prices than this and no histogram is produced
    pub min_prices_for_buckets: usize,
    /// Prices above this are treated as bogus and left out of price stats
    pub max_price: Option<f64>,
    /// Upper bound on histogram length; higher prices land in the last bucket
    pub max_price_buckets: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
            price_bucket_width: 100,
            min_prices_for_buckets: 3,
            max_price: None,
            max_price_buckets: 1000,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.default_page_size == 0 || self.max_page_size == 0 {
            return Err(Error::InvalidConfig("page sizes must be positive".to_string()));
        }
        if self.default_page_size > self.max_page_size {
            return Err(Error::InvalidConfig(format!(
                "defaultPageSize {} exceeds maxPageSize {}",
                self.default_page_size, self.max_page_size
            )));
        }
        if self.price_bucket_width == 0 {
            return Err(Error::InvalidConfig("priceBucketWidth must be positive".to_string()));
        }
        if self.max_price_buckets == 0 {
            return Err(Error::InvalidConfig("maxPriceBuckets must be positive".to_string()));
        }
        if let Some(cap) = self.max_price {
            if !cap.is_finite() || cap <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "maxPrice must be a positive number, got {}",
                    cap
                )));
            }
        }
        Ok(())
    }

    /// Whether a price takes part in price statistics
    pub fn accepts_price(&self, price: f64) -> bool {
        price.is_finite() && self.max_price.map_or(true, |cap| price <= cap)
    }

    /// Load from a JSON file; missing keys take their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: EngineConfig = serde_json::from_str(&raw)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"maxPageSize": 50}"#).unwrap();
        assert_eq!(config.max_page_size, 50);
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.max_price, None);
        assert_eq!(config.max_price_buckets, 1000);
    }

    #[test]
    fn test_invalid_configs() {
        let config = EngineConfig {
            default_page_size: 200,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = EngineConfig {
            price_bucket_width: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            max_price_buckets: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        for cap in [0.0, -5.0, f64::INFINITY, f64::NAN] {
            let config = EngineConfig {
                max_price: Some(cap),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "cap {} accepted", cap);
        }
    }

    #[test]
    fn test_accepts_price() {
        let open = EngineConfig::default();
        assert!(open.accepts_price(1e12));
        assert!(!open.accepts_price(f64::NAN));

        let capped = EngineConfig {
            max_price: Some(5000.0),
            ..Default::default()
        };
        assert!(capped.accepts_price(5000.0));
        assert!(!capped.accepts_price(9999.0));
        assert!(!capped.accepts_price(f64::INFINITY));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"defaultPageSize": 25, "priceBucketWidth": 50}"#).unwrap();

        let config = EngineConfig::from_json_file(&path).unwrap();
        assert_eq!(config.default_page_size, 25);
        assert_eq!(config.price_bucket_width, 50);

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            EngineConfig::from_json_file(&path),
            Err(Error::InvalidConfig(_))
        ));
    }
}
