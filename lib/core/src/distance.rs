//! Distance functions used for variant matching
//!
//! Every function returns a non-negative distance where 0.0 means identical.
//! Text is compared on normalized strings, numbers on their absolute difference.

use crate::field::FieldKind;
use crate::record::{normalize_text, Scalar};

/// Tolerance applied when comparing a numeric distance against a threshold,
/// so a difference of exactly `t` stays within `t` despite float rounding.
pub const NUMERIC_TOLERANCE: f64 = 1e-9;

/// Distance metric for a field kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    /// Levenshtein distance on normalized strings
    Edit,
    /// |a - b|
    Absolute,
    /// No meaningful distance; variant matching is disabled
    Unsupported,
}

impl From<FieldKind> for DistanceMetric {
    fn from(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text => DistanceMetric::Edit,
            FieldKind::Numeric => DistanceMetric::Absolute,
            FieldKind::Boolean => DistanceMetric::Unsupported,
        }
    }
}

impl DistanceMetric {
    /// Distance between two scalars, `None` when they cannot be compared
    pub fn distance(&self, a: &Scalar, b: &Scalar) -> Option<f64> {
        match self {
            DistanceMetric::Edit => {
                let (a, b) = (normalize_text(&a.to_string()), normalize_text(&b.to_string()));
                Some(edit_distance(&a, &b) as f64)
            }
            DistanceMetric::Absolute => Some(numeric_distance(a.as_f64()?, b.as_f64()?)),
            DistanceMetric::Unsupported => None,
        }
    }
}

/// Calculate absolute numeric distance
pub fn numeric_distance(a: f64, b: f64) -> f64 {
    (a - b).abs()
}

/// Check a distance against an inclusive threshold
#[inline]
pub fn within(distance: f64, threshold: f64) -> bool {
    distance <= threshold + NUMERIC_TOLERANCE
}

/// Levenshtein edit distance over Unicode scalar values
///
/// Uses the two-row dynamic programming formulation, O(len(a) * len(b)) time
/// and O(len(b)) memory.
pub fn edit_distance(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let b_chars: Vec<char> = b.chars().collect();
    let n = b_chars.len();
    if a.is_empty() {
        return n;
    }
    if n == 0 {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr: Vec<usize> = vec![0; n + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for j in 1..=n {
            let cost = if ca == b_chars[j - 1] { 0 } else { 1 };
            let deletion = prev[j] + 1;
            let insertion = curr[j - 1] + 1;
            let substitution = prev[j - 1] + cost;
            curr[j] = deletion.min(insertion).min(substitution);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
