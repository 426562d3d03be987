//! Execution result types.
//!
//! Bit-string labels put the lowest-indexed qubit rightmost (OpenQASM 3
//! convention): `"01"` means qubit 0 measured `1` and qubit 1 measured `0`.
//! Labels are kept in ordered maps so iteration, display and tie-breaking
//! are deterministic.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Tolerance used when checking that a distribution is normalised.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-6;

/// Render a basis-state index as a bit string of `width` characters.
pub fn bit_label(index: u64, width: usize) -> String {
    format!("{index:0width$b}")
}

/// Measurement counts for one circuit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    counts: BTreeMap<String, u64>,
}

impl Counts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` occurrences of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.counts.entry(bitstring.into()).or_default() += count;
    }

    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.counts.iter()
    }

    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Counts sorted by frequency, most frequent first.
    pub fn sorted(&self) -> Vec<(&String, &u64)> {
        let mut items: Vec<_> = self.counts.iter().collect();
        items.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        items
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut counts = Self::new();
        for (key, value) in iter {
            counts.insert(key, value);
        }
        counts
    }
}

/// Probability mass per bit-string label for one circuit.
///
/// Hardware quasi-probabilities may carry small negative entries after
/// error mitigation; they are stored as given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuasiDistribution {
    probs: BTreeMap<String, f64>,
}

impl QuasiDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empirical distribution of a set of counts.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_counts(counts: &Counts) -> Self {
        let total = counts.total_shots();
        if total == 0 {
            return Self::new();
        }
        let total = total as f64;
        counts
            .iter()
            .map(|(k, &v)| (k.clone(), v as f64 / total))
            .collect()
    }

    /// Set the mass of `label`, replacing any previous value.
    pub fn insert(&mut self, label: impl Into<String>, probability: f64) {
        self.probs.insert(label.into(), probability);
    }

    pub fn get(&self, label: &str) -> f64 {
        self.probs.get(label).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.probs.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.probs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.probs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.probs.values().sum()
    }

    /// Whether the masses sum to one within [`NORMALIZATION_TOLERANCE`].
    pub fn is_normalized(&self) -> bool {
        (self.total() - 1.0).abs() <= NORMALIZATION_TOLERANCE
    }

    /// The label with the largest mass.
    ///
    /// Ties go to the lexicographically smallest label.
    pub fn most_likely(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (label, &p) in &self.probs {
            match best {
                Some((_, bp)) if p <= bp => {}
                _ => best = Some((label.as_str(), p)),
            }
        }
        best
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for QuasiDistribution {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut dist = Self::new();
        for (label, p) in iter {
            dist.insert(label, p);
        }
        dist
    }
}

impl fmt::Display for QuasiDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (label, p)) in self.probs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{label}': {p:.4}")?;
        }
        f.write_str("}")
    }
}

/// Outcome of one circuit of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitResult {
    pub distribution: QuasiDistribution,
    /// Raw counts, when the backend reports them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counts: Option<Counts>,
    /// Backend-specific metadata for this circuit.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl CircuitResult {
    /// Result built from sampled counts.
    pub fn from_counts(counts: Counts) -> Self {
        Self {
            distribution: QuasiDistribution::from_counts(&counts),
            counts: Some(counts),
            metadata: serde_json::Value::Null,
        }
    }

    pub fn from_distribution(distribution: QuasiDistribution) -> Self {
        Self {
            distribution,
            counts: None,
            metadata: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Result of a batch job: one entry per submitted circuit, in submission
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub circuits: Vec<CircuitResult>,
    /// Shots per circuit.
    pub shots: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    /// Job-level metadata.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl ExecutionResult {
    pub fn new(circuits: Vec<CircuitResult>, shots: u32) -> Self {
        Self {
            circuits,
            shots,
            execution_time_ms: None,
            metadata: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn with_execution_time(mut self, time_ms: u64) -> Self {
        self.execution_time_ms = Some(time_ms);
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Number of circuit results.
    pub fn len(&self) -> usize {
        self.circuits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circuits.is_empty()
    }

    /// Distributions in submission order.
    pub fn distributions(&self) -> impl Iterator<Item = &QuasiDistribution> {
        self.circuits.iter().map(|c| &c.distribution)
    }

    /// Per-circuit metadata in submission order.
    pub fn circuit_metadata(&self) -> impl Iterator<Item = &serde_json::Value> {
        self.circuits.iter().map(|c| &c.metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_label() {
        assert_eq!(bit_label(5, 3), "101");
        assert_eq!(bit_label(1, 4), "0001");
        assert_eq!(bit_label(0, 1), "0");
    }

    #[test]
    fn test_counts_basic() {
        let mut counts = Counts::new();
        counts.insert("00", 500);
        counts.insert("11", 400);
        counts.insert("11", 100);

        assert_eq!(counts.get("00"), 500);
        assert_eq!(counts.get("11"), 500);
        assert_eq!(counts.get("01"), 0);
        assert_eq!(counts.total_shots(), 1000);
        assert_eq!(counts.sorted()[0].0, "00");
    }

    #[test]
    fn test_distribution_from_counts() {
        let counts: Counts = [("000", 250), ("101", 750)].into_iter().collect();
        let dist = QuasiDistribution::from_counts(&counts);

        assert!((dist.get("101") - 0.75).abs() < 1e-12);
        assert_eq!(dist.get("111"), 0.0);
        assert!(dist.is_normalized());
        assert_eq!(dist.most_likely(), Some(("101", 0.75)));
    }

    #[test]
    fn test_most_likely_tie_prefers_smallest_label() {
        let dist: QuasiDistribution = [("11", 0.5), ("01", 0.5)].into_iter().collect();
        assert_eq!(dist.most_likely(), Some(("01", 0.5)));
        assert!(QuasiDistribution::new().most_likely().is_none());
    }

    #[test]
    fn test_distribution_display() {
        let dist: QuasiDistribution = [("10", 0.25), ("01", 0.75)].into_iter().collect();
        assert_eq!(dist.to_string(), "{'01': 0.7500, '10': 0.2500}");
    }

    #[test]
    fn test_execution_result() {
        let counts: Counts = [("00", 500), ("11", 500)].into_iter().collect();
        let result = ExecutionResult::new(
            vec![CircuitResult::from_counts(counts.clone()), CircuitResult::from_counts(counts)],
            1000,
        )
        .with_execution_time(42);

        assert_eq!(result.len(), 2);
        assert_eq!(result.execution_time_ms, Some(42));
        assert!(result.distributions().all(QuasiDistribution::is_normalized));
    }
}
