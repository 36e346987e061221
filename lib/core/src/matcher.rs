//! Per-field matching
//!
//! A [`FilterClause`] is a validated constraint on one field. [`FieldMatcher`]
//! classifies a record's values for that field as a direct hit, a variant hit
//! (within the clause's distance threshold) or no match.

use crate::distance::{within, DistanceMetric};
use crate::field::{FieldKind, FieldName};
use crate::record::{normalize_text, FieldValues, Record, Scalar};
use crate::{Error, Result};
use ahash::AHashSet;

/// Outcome of matching one field against one clause.
///
/// Ordered by precedence: a direct hit beats a variant hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchKind {
    NoMatch,
    Variant,
    Direct,
}

impl MatchKind {
    pub fn is_match(&self) -> bool {
        !matches!(self, MatchKind::NoMatch)
    }
}

/// One validated field constraint
#[derive(Debug, Clone)]
pub struct FilterClause {
    field: FieldName,
    accepted: Vec<Scalar>,
    keys: AHashSet<String>,
    threshold: Option<f64>,
}

impl FilterClause {
    /// Build a clause, coercing accepted values to the field's kind.
    ///
    /// Fails with `InvalidRequest` on an empty value set, a value that does not
    /// fit the field kind, or a negative/non-finite threshold.
    pub fn new(field: FieldName, values: Vec<Scalar>, threshold: Option<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::invalid(format!("filter on '{}' has no accepted values", field)));
        }
        if let Some(t) = threshold {
            if !t.is_finite() || t < 0.0 {
                return Err(Error::invalid(format!(
                    "variant threshold for '{}' must be a non-negative number, got {}",
                    field, t
                )));
            }
        }

        let accepted = values
            .into_iter()
            .map(|v| coerce(field, v))
            .collect::<Result<Vec<_>>>()?;
        let keys = accepted.iter().map(Scalar::normalized).collect();

        Ok(Self {
            field,
            accepted,
            keys,
            threshold,
        })
    }

    pub fn field(&self) -> FieldName {
        self.field
    }

    pub fn accepted(&self) -> &[Scalar] {
        &self.accepted
    }

    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }

    /// Threshold 0 or absent disables the variant path, as do fields without a metric.
    pub fn variant_enabled(&self) -> bool {
        self.threshold.map_or(false, |t| t > 0.0)
            && DistanceMetric::from(self.field.kind()) != DistanceMetric::Unsupported
    }

    fn accepts_directly(&self, value: &Scalar) -> bool {
        self.keys.contains(&value.normalized())
    }

    fn accepts_as_variant(&self, value: &Scalar) -> bool {
        let Some(threshold) = self.threshold else {
            return false;
        };
        let metric = DistanceMetric::from(self.field.kind());
        self.accepted.iter().any(|candidate| {
            metric
                .distance(value, candidate)
                .map_or(false, |d| within(d, threshold))
        })
    }
}

fn coerce(field: FieldName, value: Scalar) -> Result<Scalar> {
    match field.kind() {
        FieldKind::Text => match value {
            Scalar::Text(s) => Ok(Scalar::Text(s)),
            other => Ok(Scalar::Text(other.to_string())),
        },
        FieldKind::Numeric => value.as_f64().map(Scalar::Number).ok_or_else(|| {
            Error::invalid(format!("value '{}' is not numeric for field '{}'", value, field))
        }),
        FieldKind::Boolean => match value {
            Scalar::Bool(b) => Ok(Scalar::Bool(b)),
            Scalar::Text(ref s) => match normalize_text(s).as_str() {
                "true" | "yes" | "y" => Ok(Scalar::Bool(true)),
                "false" | "no" | "n" => Ok(Scalar::Bool(false)),
                _ => Err(Error::invalid(format!(
                    "value '{}' is not a boolean for field '{}'",
                    value, field
                ))),
            },
            Scalar::Number(_) => Err(Error::invalid(format!(
                "value '{}' is not a boolean for field '{}'",
                value, field
            ))),
        },
    }
}

/// Classifies record values against a clause
pub struct FieldMatcher;

impl FieldMatcher {
    /// Classify `values` (all values a record holds for the clause's field).
    pub fn matches(values: &[Scalar], clause: &FilterClause) -> MatchKind {
        if values.is_empty() {
            return MatchKind::NoMatch;
        }
        if values.iter().any(|v| clause.accepts_directly(v)) {
            return MatchKind::Direct;
        }
        if clause.variant_enabled() && values.iter().any(|v| clause.accepts_as_variant(v)) {
            return MatchKind::Variant;
        }
        MatchKind::NoMatch
    }

    /// Classify a record. Main spec fields are also tested against their
    /// analysis `bestGuess`.
    pub fn classify(record: &Record, clause: &FilterClause) -> MatchKind {
        let values: FieldValues = record.match_values(clause.field());
        Self::matches(&values, clause)
    }

    pub fn is_direct(record: &Record, clause: &FilterClause) -> bool {
        Self::classify(record, clause) == MatchKind::Direct
    }

    /// Within threshold of some accepted value and not a direct hit
    pub fn is_variant(record: &Record, clause: &FilterClause) -> bool {
        Self::classify(record, clause) == MatchKind::Variant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Scalar {
        Scalar::Text(s.to_string())
    }

    fn clause(field: FieldName, values: &[&str], threshold: Option<f64>) -> FilterClause {
        FilterClause::new(field, values.iter().map(|v| text(v)).collect(), threshold).unwrap()
    }

    #[test]
    fn test_absent_value_never_matches() {
        let c = clause(FieldName::Color, &["silver"], Some(10.0));
        assert_eq!(FieldMatcher::matches(&[], &c), MatchKind::NoMatch);
    }

    #[test]
    fn test_direct_match_is_normalized() {
        let c = clause(FieldName::Color, &["  Space   Gray"], None);
        assert_eq!(FieldMatcher::matches(&[text("space gray")], &c), MatchKind::Direct);
        assert_eq!(FieldMatcher::matches(&[text("silver")], &c), MatchKind::NoMatch);
    }

    #[test]
    fn test_numeric_direct_match_ignores_formatting() {
        let c = clause(FieldName::RamSize, &["16"], None);
        assert_eq!(FieldMatcher::matches(&[Scalar::Number(16.0)], &c), MatchKind::Direct);
        let c = clause(FieldName::ScreenSize, &["15.40"], None);
        assert_eq!(FieldMatcher::matches(&[Scalar::Number(15.4)], &c), MatchKind::Direct);
    }

    #[test]
    fn test_threshold_zero_disables_variants() {
        let c = clause(FieldName::CpuModel, &["i7-7820HQ"], Some(0.0));
        assert!(!c.variant_enabled());
        assert_eq!(FieldMatcher::matches(&[text("i7-7820HK")], &c), MatchKind::NoMatch);
    }

    #[test]
    fn test_text_variant_within_edit_distance() {
        let c = clause(FieldName::CpuModel, &["i7-7820HQ"], Some(1.0));
        assert_eq!(FieldMatcher::matches(&[text("I7-7820hk")], &c), MatchKind::Variant);
        assert_eq!(FieldMatcher::matches(&[text("i5-7267U")], &c), MatchKind::NoMatch);
    }

    #[test]
    fn test_numeric_variant_boundary() {
        let c = clause(FieldName::SsdSize, &["512"], Some(256.0));
        assert_eq!(FieldMatcher::matches(&[Scalar::Number(256.0)], &c), MatchKind::Variant);
        assert_eq!(FieldMatcher::matches(&[Scalar::Number(255.0)], &c), MatchKind::NoMatch);
        assert_eq!(FieldMatcher::matches(&[Scalar::Number(768.0)], &c), MatchKind::Variant);
        assert_eq!(FieldMatcher::matches(&[Scalar::Number(769.0)], &c), MatchKind::NoMatch);
    }

    #[test]
    fn test_direct_beats_variant() {
        let c = clause(FieldName::RamSize, &["8", "16"], Some(8.0));
        // 16 is a variant of 8 and a direct hit on 16
        assert_eq!(FieldMatcher::matches(&[Scalar::Number(16.0)], &c), MatchKind::Direct);
        // any direct hit among several record values wins
        assert_eq!(
            FieldMatcher::matches(&[Scalar::Number(12.0), Scalar::Number(8.0)], &c),
            MatchKind::Direct
        );
    }

    #[test]
    fn test_non_numeric_value_rejected_for_numeric_field() {
        let err = FilterClause::new(FieldName::RamSize, vec![text("lots")], None).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        assert!(FilterClause::new(FieldName::Color, vec![text("silver")], Some(-1.0)).is_err());
        assert!(FilterClause::new(FieldName::Color, vec![text("silver")], Some(f64::NAN)).is_err());
        assert!(FilterClause::new(FieldName::Color, vec![], None).is_err());
    }

    #[test]
    fn test_boolean_field_direct_only() {
        let c = clause(FieldName::ReturnsAccepted, &["yes"], Some(5.0));
        assert!(!c.variant_enabled());
        assert_eq!(FieldMatcher::matches(&[Scalar::Bool(true)], &c), MatchKind::Direct);
        assert_eq!(FieldMatcher::matches(&[Scalar::Bool(false)], &c), MatchKind::NoMatch);
    }

    #[test]
    fn test_classify_record() {
        let mut record = Record::new("r1");
        record.derived.ram_size = vec![16.0];
        let c = clause(FieldName::RamSize, &["16"], None);
        assert_eq!(FieldMatcher::classify(&record, &c), MatchKind::Direct);
        assert!(FieldMatcher::is_direct(&record, &c));
        assert!(!FieldMatcher::is_variant(&record, &c));
    }
}
