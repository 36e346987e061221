//! Record predicates
//!
//! Clauses are composed into an explicit boolean expression tree:
//!
//! ```text
//! And[
//!   Or[Direct(ramSize), Variant(ramSize)],
//!   Or[Direct(color),   Variant(color)],
//!   Range(price, 500..=1000),
//! ]
//! ```
//!
//! The tree is built once per request and evaluated per record.

use crate::field::{FieldKind, FieldName};
use crate::matcher::{FieldMatcher, FilterClause, MatchKind};
use crate::{Error, Record, Result};
use smallvec::SmallVec;
use std::sync::Arc;

pub trait Filter {
    fn matches(&self, record: &Record) -> bool;
}

/// Inclusive numeric range on one field; either bound may be open
#[derive(Debug, Clone, PartialEq)]
pub struct NumericRange {
    pub field: FieldName,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumericRange {
    pub fn new(field: FieldName, min: Option<f64>, max: Option<f64>) -> Result<Self> {
        if field.kind() != FieldKind::Numeric {
            return Err(Error::invalid(format!("range filter on non-numeric field '{}'", field)));
        }
        for bound in [min, max].into_iter().flatten() {
            if !bound.is_finite() {
                return Err(Error::invalid(format!("range bound on '{}' must be finite", field)));
            }
        }
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(Error::invalid(format!(
                    "range on '{}' has min {} greater than max {}",
                    field, lo, hi
                )));
            }
        }
        Ok(Self { field, min, max })
    }

    /// `None` when both bounds are open
    pub fn from_bounds(
        field: FieldName,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<Option<Self>> {
        if min.is_none() && max.is_none() {
            return Ok(None);
        }
        Self::new(field, min, max).map(Some)
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |lo| value >= lo) && self.max.map_or(true, |hi| value <= hi)
    }
}

#[derive(Debug, Clone)]
pub enum Predicate {
    Always,
    Direct(Arc<FilterClause>),
    Variant(Arc<FilterClause>),
    Range(NumericRange),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// `Or[Direct, Variant]` for one clause
    pub fn clause(clause: Arc<FilterClause>) -> Self {
        if clause.variant_enabled() {
            Predicate::Or(vec![Predicate::Direct(clause.clone()), Predicate::Variant(clause)])
        } else {
            Predicate::Direct(clause)
        }
    }

    fn matches_record<'p>(&'p self, record: &Record, seen: &mut Classified<'p>) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Direct(clause) => seen.kind(record, clause) == MatchKind::Direct,
            Predicate::Variant(clause) => seen.kind(record, clause) == MatchKind::Variant,
            Predicate::Range(range) => record
                .values(range.field)
                .iter()
                .filter_map(|v| v.as_f64())
                .any(|v| range.contains(v)),
            Predicate::And(children) => children.iter().all(|c| c.matches_record(record, seen)),
            Predicate::Or(children) => children.iter().any(|c| c.matches_record(record, seen)),
        }
    }
}

impl Filter for Predicate {
    fn matches(&self, record: &Record) -> bool {
        self.matches_record(record, &mut Classified::default())
    }
}

/// Per-record memo so each clause is classified once, however many leaves name it
#[derive(Default)]
struct Classified<'p> {
    kinds: SmallVec<[(&'p FilterClause, MatchKind); 4]>,
}

impl<'p> Classified<'p> {
    fn kind(&mut self, record: &Record, clause: &'p FilterClause) -> MatchKind {
        if let Some((_, kind)) = self.kinds.iter().find(|(c, _)| std::ptr::eq(*c, clause)) {
            return *kind;
        }
        let kind = FieldMatcher::classify(record, clause);
        self.kinds.push((clause, kind));
        kind
    }
}

/// A matching record with the per-clause match kinds that admitted it
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub record: Arc<Record>,
    pub kinds: Vec<(FieldName, MatchKind)>,
}

impl MatchResult {
    /// At least one clause was satisfied only through a variant match
    pub fn used_variant(&self) -> bool {
        self.kinds.iter().any(|(_, k)| *k == MatchKind::Variant)
    }
}

/// Whole-record predicate over a request's clauses
#[derive(Debug, Clone)]
pub struct ClauseResolver {
    clauses: Vec<Arc<FilterClause>>,
    ranges: Vec<NumericRange>,
    predicate: Predicate,
}

impl ClauseResolver {
    pub fn new(clauses: Vec<FilterClause>) -> Self {
        Self::from_parts(clauses.into_iter().map(Arc::new).collect(), Vec::new())
    }

    pub fn with_range(mut self, range: NumericRange) -> Self {
        self.ranges.push(range);
        Self::from_parts(self.clauses, self.ranges)
    }

    fn from_parts(clauses: Vec<Arc<FilterClause>>, ranges: Vec<NumericRange>) -> Self {
        let mut children: Vec<Predicate> = clauses.iter().cloned().map(Predicate::clause).collect();
        children.extend(ranges.iter().cloned().map(Predicate::Range));

        let predicate = if children.is_empty() {
            Predicate::Always
        } else {
            Predicate::And(children)
        };

        Self {
            clauses,
            ranges,
            predicate,
        }
    }

    pub fn clauses(&self) -> &[Arc<FilterClause>] {
        &self.clauses
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn is_unconstrained(&self) -> bool {
        matches!(self.predicate, Predicate::Always)
    }

    pub fn evaluate(&self, record: &Record) -> bool {
        self.predicate.matches(record)
    }

    pub fn resolve(&self, record: &Arc<Record>) -> Option<MatchResult> {
        let mut seen = Classified::default();
        if !self.predicate.matches_record(record, &mut seen) {
            return None;
        }
        let kinds = self
            .clauses
            .iter()
            .map(|c| (c.field(), seen.kind(record, c)))
            .collect();
        Some(MatchResult {
            record: record.clone(),
            kinds,
        })
    }

    /// Same constraints minus everything that targets `field`
    pub fn without_field(&self, field: FieldName) -> Self {
        Self::from_parts(
            self.clauses.iter().filter(|c| c.field() != field).cloned().collect(),
            self.ranges.iter().filter(|r| r.field != field).cloned().collect(),
        )
    }

    /// Same clauses with all ranges removed
    pub fn without_ranges(&self) -> Self {
        Self::from_parts(self.clauses.clone(), Vec::new())
    }
}

impl Filter for ClauseResolver {
    fn matches(&self, record: &Record) -> bool {
        self.evaluate(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Price, Scalar};

    fn laptop(id: &str, ram: f64, color: &str, price: f64) -> Arc<Record> {
        let mut r = Record::new(id);
        r.derived.ram_size = vec![ram];
        r.derived.color = vec![color.to_string()];
        r.details.price = Some(Price { value: price, currency: None });
        Arc::new(r)
    }

    fn clause(field: FieldName, values: &[&str], threshold: Option<f64>) -> FilterClause {
        FilterClause::new(
            field,
            values.iter().map(|v| Scalar::Text(v.to_string())).collect(),
            threshold,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_resolver_matches_everything() {
        let resolver = ClauseResolver::new(vec![]);
        assert!(resolver.is_unconstrained());
        assert!(resolver.evaluate(&laptop("a", 8.0, "silver", 100.0)));
    }

    #[test]
    fn test_and_across_clauses() {
        let resolver = ClauseResolver::new(vec![
            clause(FieldName::RamSize, &["16"], None),
            clause(FieldName::Color, &["silver"], None),
        ]);
        assert!(resolver.evaluate(&laptop("a", 16.0, "Silver", 100.0)));
        assert!(!resolver.evaluate(&laptop("b", 16.0, "space gray", 100.0)));
        assert!(!resolver.evaluate(&laptop("c", 8.0, "silver", 100.0)));
    }

    #[test]
    fn test_or_between_direct_and_variant() {
        let resolver = ClauseResolver::new(vec![clause(FieldName::RamSize, &["16"], Some(8.0))]);
        match resolver.predicate() {
            Predicate::And(children) => assert!(matches!(children[0], Predicate::Or(_))),
            other => panic!("unexpected predicate {:?}", other),
        }
        assert!(resolver.evaluate(&laptop("a", 16.0, "silver", 1.0)));
        assert!(resolver.evaluate(&laptop("b", 8.0, "silver", 1.0)));
        assert!(!resolver.evaluate(&laptop("c", 4.0, "silver", 1.0)));
    }

    #[test]
    fn test_absent_field_short_circuits() {
        let resolver = ClauseResolver::new(vec![clause(FieldName::CpuModel, &["i7"], Some(5.0))]);
        assert!(!resolver.evaluate(&laptop("a", 16.0, "silver", 1.0)));
    }

    #[test]
    fn test_resolve_reports_match_kinds() {
        let resolver = ClauseResolver::new(vec![
            clause(FieldName::RamSize, &["16"], Some(8.0)),
            clause(FieldName::Color, &["silver"], None),
        ]);
        let direct = resolver.resolve(&laptop("a", 16.0, "silver", 1.0)).unwrap();
        assert!(!direct.used_variant());
        let variant = resolver.resolve(&laptop("b", 8.0, "silver", 1.0)).unwrap();
        assert!(variant.used_variant());
        assert_eq!(variant.kinds[0], (FieldName::RamSize, MatchKind::Variant));
        assert!(resolver.resolve(&laptop("c", 8.0, "gold", 1.0)).is_none());
    }

    #[test]
    fn test_price_range() {
        let range = NumericRange::new(FieldName::Price, Some(500.0), Some(1000.0)).unwrap();
        let resolver = ClauseResolver::new(vec![]).with_range(range);
        assert!(resolver.evaluate(&laptop("a", 8.0, "silver", 500.0)));
        assert!(resolver.evaluate(&laptop("b", 8.0, "silver", 1000.0)));
        assert!(!resolver.evaluate(&laptop("c", 8.0, "silver", 1000.01)));
        assert!(!resolver.evaluate(&Arc::new(Record::new("no-price"))));
    }

    #[test]
    fn test_range_validation() {
        assert!(NumericRange::new(FieldName::Color, Some(1.0), None).is_err());
        assert!(NumericRange::new(FieldName::Price, Some(10.0), Some(1.0)).is_err());
        assert!(NumericRange::from_bounds(FieldName::Price, None, None).unwrap().is_none());
    }

    #[test]
    fn test_without_field_drops_clause_and_range() {
        let resolver = ClauseResolver::new(vec![
            clause(FieldName::RamSize, &["16"], None),
            clause(FieldName::Color, &["gold"], None),
        ])
        .with_range(NumericRange::new(FieldName::Price, None, Some(10.0)).unwrap());

        let relaxed = resolver.without_field(FieldName::Color);
        assert_eq!(relaxed.clauses().len(), 1);
        assert!(!relaxed.evaluate(&laptop("a", 16.0, "silver", 100.0)));
        let silver = laptop("a", 16.0, "silver", 100.0);
        assert!(relaxed.without_field(FieldName::Price).evaluate(&silver));
        assert!(resolver
            .without_ranges()
            .without_field(FieldName::Color)
            .evaluate(&silver));
    }

    #[test]
    fn test_clause_classified_once_per_record() {
        let resolver = ClauseResolver::new(vec![clause(FieldName::RamSize, &["16"], Some(4.0))]);
        let hit = laptop("a", 12.0, "silver", 1.0);
        let miss = laptop("b", 64.0, "silver", 1.0);

        let mut seen = Classified::default();
        let clause = &resolver.clauses()[0];
        assert_eq!(seen.kind(&hit, clause), MatchKind::Variant);
        // Memoized: a second lookup for the same clause does not re-read the record
        assert_eq!(seen.kind(&miss, clause), MatchKind::Variant);
        assert_eq!(seen.kinds.len(), 1);

        let result = resolver.resolve(&hit).unwrap();
        assert_eq!(result.kinds, vec![(FieldName::RamSize, MatchKind::Variant)]);
        assert!(resolver.resolve(&miss).is_none());
    }

    #[test]
    fn test_best_guess_satisfies_clause() {
        let mut record = Record::new("guess");
        record.analysis = Some(
            serde_json::from_value(serde_json::json!({
                "specsAnalysis": {"releaseYear": {"bestGuess": "2017"}}
            }))
            .unwrap(),
        );
        let record = Arc::new(record);

        let year = ClauseResolver::new(vec![clause(FieldName::ReleaseYear, &["2017"], None)]);
        assert_eq!(
            year.resolve(&record).unwrap().kinds,
            vec![(FieldName::ReleaseYear, MatchKind::Direct)]
        );
        let other = ClauseResolver::new(vec![clause(FieldName::ReleaseYear, &["2019"], None)]);
        assert!(!other.evaluate(&record));
    }
}
