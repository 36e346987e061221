use crate::field::FieldName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;

/// A single observed value of a field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Scalar {
    /// Canonical comparison key: normalized text, canonical number or `true`/`false`
    pub fn normalized(&self) -> String {
        match self {
            Scalar::Text(s) => normalize_text(s),
            Scalar::Number(n) => canonical_number(*n),
            Scalar::Bool(b) => b.to_string(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(s) => s.trim().parse().ok(),
            Scalar::Bool(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Number(n) => f.write_str(&canonical_number(*n)),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// All values a record holds for one field. Empty means absent.
pub type FieldValues = SmallVec<[Scalar; 2]>;

/// Trim, collapse whitespace runs and lowercase.
pub fn normalize_text(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// `16.0` renders as `16`, `15.4` stays `15.4`.
pub fn canonical_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    #[serde(deserialize_with = "number_or_string")]
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageAsset {
    pub image_url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnPeriod {
    pub value: Option<i64>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnTerms {
    pub returns_accepted: Option<bool>,
    pub refund_method: Option<String>,
    pub return_shipping_cost_payer: Option<String>,
    pub return_period: Option<ReturnPeriod>,
}

/// Listing metadata as scraped from the source marketplace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Details {
    pub title: Option<String>,
    pub condition: Option<String>,
    pub condition_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Option<Price>,
    pub return_terms: Option<ReturnTerms>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub buying_options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageAsset>,
    pub item_web_url: Option<String>,
}

/// One catalog variant a listing was compared against
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VariantSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_size: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub part_number: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub color: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_cores: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_speed: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub ssd_size: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub ram_size: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VariantMatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<VariantSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub discrepancies: Vec<String>,
}

/// Specs extracted from the listing text. Each field may carry several candidates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Derived {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub release_year: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub laptop_model: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub cpu_model: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub cpu_family: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub cpu_speed: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub ram_size: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub ssd_size: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub screen_size: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub color: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub model_number: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub model_id: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub part_number: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specs_conflict: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub variants: Vec<VariantMatch>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub missing: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specs_quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_rank: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specs_completeness_rank: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specs_consistency_rank: Option<i64>,
    /// Keys this model does not know, kept so records survive a load/save
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Condition axes assessed by a language model, as short codes ("G", "Y", "N", ...).
///
/// The `*Rank` companions are read for sorting but never written back out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmDerived {
    pub charger: Option<String>,
    pub battery: Option<String>,
    pub screen: Option<String>,
    pub keyboard: Option<String>,
    pub housing: Option<String>,
    pub audio: Option<String>,
    pub ports: Option<String>,
    pub functionality: Option<String>,
    pub component_listing: Option<String>,
    #[serde(rename = "return")]
    pub return_policy: Option<String>,
    #[serde(skip_serializing)]
    pub charger_rank: Option<i64>,
    #[serde(skip_serializing)]
    pub battery_rank: Option<i64>,
    #[serde(skip_serializing)]
    pub screen_rank: Option<i64>,
    #[serde(skip_serializing)]
    pub keyboard_rank: Option<i64>,
    #[serde(skip_serializing)]
    pub housing_rank: Option<i64>,
    #[serde(skip_serializing)]
    pub audio_rank: Option<i64>,
    #[serde(skip_serializing)]
    pub ports_rank: Option<i64>,
    #[serde(skip_serializing)]
    pub functionality_rank: Option<i64>,
    #[serde(skip_serializing)]
    pub component_listing_rank: Option<i64>,
}

/// Per-spec verdict of the variant analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_guess: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Quality assessment of a listing's extracted specs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Analysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specs_completeness: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specs_consistency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_distance: Option<f64>,
    /// Keyed by camelCase field name (`releaseYear`, `ramSize`, ...)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub specs_analysis: BTreeMap<String, SpecAnalysis>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One catalog item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub item_id: String,
    #[serde(default)]
    pub details: Details,
    #[serde(default)]
    pub derived: Derived,
    #[serde(default)]
    pub llm_derived: LlmDerived,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inserted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            details: Details::default(),
            derived: Derived::default(),
            llm_derived: LlmDerived::default(),
            analysis: None,
            inserted_at: None,
            updated_at: None,
            processed_at: None,
            extra: Map::new(),
        }
    }

    pub fn price(&self) -> Option<f64> {
        self.details.price.as_ref().map(|p| p.value)
    }

    /// Values the record holds for `field`; empty when absent.
    pub fn values(&self, field: FieldName) -> FieldValues {
        let d = &self.details;
        let returns = d.return_terms.as_ref();
        let x = &self.derived;
        let l = &self.llm_derived;
        let a = self.analysis.as_ref();

        match field {
            FieldName::Title => text(&d.title),
            FieldName::Condition => text(&d.condition),
            FieldName::Price => self.price().map(Scalar::Number).into_iter().collect(),
            FieldName::ReturnsAccepted => returns
                .and_then(|r| r.returns_accepted)
                .map(Scalar::Bool)
                .into_iter()
                .collect(),
            FieldName::ReturnShippingCostPayer => {
                text(&returns.and_then(|r| r.return_shipping_cost_payer.clone()))
            }
            FieldName::RefundMethod => text(&returns.and_then(|r| r.refund_method.clone())),
            FieldName::ItemWebUrl => text(&d.item_web_url),
            FieldName::ReleaseYear => texts(&x.release_year),
            FieldName::LaptopModel => texts(&x.laptop_model),
            FieldName::CpuModel => texts(&x.cpu_model),
            FieldName::CpuFamily => texts(&x.cpu_family),
            FieldName::CpuSpeed => numbers(&x.cpu_speed),
            FieldName::RamSize => numbers(&x.ram_size),
            FieldName::SsdSize => numbers(&x.ssd_size),
            FieldName::ScreenSize => numbers(&x.screen_size),
            FieldName::Color => texts(&x.color),
            FieldName::ModelNumber => texts(&x.model_number),
            FieldName::ModelId => texts(&x.model_id),
            FieldName::PartNumber => texts(&x.part_number),
            FieldName::SpecsCompleteness => text(&a.and_then(|a| a.specs_completeness.clone())),
            FieldName::SpecsConsistency => text(&a.and_then(|a| a.specs_consistency.clone())),
            FieldName::Charger => text(&l.charger),
            FieldName::Battery => text(&l.battery),
            FieldName::Screen => text(&l.screen),
            FieldName::Keyboard => text(&l.keyboard),
            FieldName::Housing => text(&l.housing),
            FieldName::Audio => text(&l.audio),
            FieldName::Ports => text(&l.ports),
            FieldName::Functionality => text(&l.functionality),
            FieldName::ComponentListing => text(&l.component_listing),
        }
    }

    /// The analysis `bestGuess` for a main spec field, if any
    pub fn best_guess(&self, field: FieldName) -> FieldValues {
        if !field.has_best_guess() {
            return FieldValues::new();
        }
        let guess = self
            .analysis
            .as_ref()
            .and_then(|a| a.specs_analysis.get(field.as_str()))
            .and_then(|s| s.best_guess.as_ref());

        let mut out = FieldValues::new();
        match guess {
            Some(Value::Array(items)) => items.iter().for_each(|v| push_json(&mut out, v)),
            Some(v) => push_json(&mut out, v),
            None => {}
        }
        out
    }

    /// Values a filter clause is tested against: the field itself, then its `bestGuess`
    pub fn match_values(&self, field: FieldName) -> FieldValues {
        let mut values = self.values(field);
        values.extend(self.best_guess(field));
        values
    }

    /// Stored sort rank of a categorical field
    pub fn rank(&self, field: FieldName) -> Option<i64> {
        let l = &self.llm_derived;
        match field {
            FieldName::Condition => self.derived.condition_rank,
            FieldName::SpecsCompleteness => self.derived.specs_completeness_rank,
            FieldName::SpecsConsistency => self.derived.specs_consistency_rank,
            FieldName::Charger => l.charger_rank,
            FieldName::Battery => l.battery_rank,
            FieldName::Screen => l.screen_rank,
            FieldName::Keyboard => l.keyboard_rank,
            FieldName::Housing => l.housing_rank,
            FieldName::Audio => l.audio_rank,
            FieldName::Ports => l.ports_rank,
            FieldName::Functionality => l.functionality_rank,
            FieldName::ComponentListing => l.component_listing_rank,
            _ => None,
        }
    }
}

fn push_json(out: &mut FieldValues, value: &Value) {
    match value {
        Value::String(s) if !s.trim().is_empty() => out.push(Scalar::Text(s.clone())),
        Value::Number(n) => out.extend(n.as_f64().map(Scalar::Number)),
        Value::Bool(b) => out.push(Scalar::Bool(*b)),
        _ => {}
    }
}

// Blank strings count as absent.
fn text(value: &Option<String>) -> FieldValues {
    value
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| Scalar::Text(s.clone()))
        .collect()
}

fn texts(values: &[String]) -> FieldValues {
    values
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| Scalar::Text(s.clone()))
        .collect()
}

fn numbers(values: &[f64]) -> FieldValues {
    values
        .iter()
        .filter(|n| n.is_finite())
        .map(|n| Scalar::Number(*n))
        .collect()
}

fn one_or_many<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(v)) => vec![v],
        Some(OneOrMany::Many(v)) => v,
    })
}

// Marketplace APIs report prices as decimal strings.
fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid price value '{}'", s))),
    }
}
