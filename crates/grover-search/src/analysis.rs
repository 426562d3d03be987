//! Result analysis: arg-max per distribution and a verdict against the
//! known target.

use std::fmt;

use grover_hal::QuasiDistribution;
use tracing::warn;

use crate::error::{SearchError, SearchResult};
use crate::target::BitString;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Failure,
}

impl Verdict {
    pub fn is_correct(self) -> bool {
        self == Verdict::Correct
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Correct => f.write_str("Correct!"),
            Verdict::Failure => f.write_str("Failure!"),
        }
    }
}

/// Outcome for one circuit of the batch.
#[derive(Debug, Clone)]
pub struct IterationReport {
    pub iterations: u32,
    /// Most likely label.
    pub answer: String,
    /// Probability of `answer`.
    pub probability: f64,
    /// Probability the distribution gives the target.
    pub target_probability: f64,
    pub verdict: Verdict,
    /// Whether the masses summed to one. Quasi-probabilities from
    /// mitigated runs need not.
    pub normalized: bool,
    pub distribution: QuasiDistribution,
}

/// Reports for a whole batch, in batch order.
#[derive(Debug, Clone)]
pub struct Analysis {
    target: BitString,
    reports: Vec<IterationReport>,
}

impl Analysis {
    pub fn target(&self) -> &BitString {
        &self.target
    }

    pub fn reports(&self) -> &[IterationReport] {
        &self.reports
    }

    /// Number of circuits whose most likely outcome was the target.
    pub fn successes(&self) -> usize {
        self.reports.iter().filter(|r| r.verdict.is_correct()).count()
    }

    /// The report that gave the target the highest probability; the first
    /// one wins ties.
    pub fn best(&self) -> Option<&IterationReport> {
        self.reports.iter().reduce(|best, r| {
            if r.target_probability > best.target_probability {
                r
            } else {
                best
            }
        })
    }

    pub fn all_correct(&self) -> bool {
        self.reports.iter().all(|r| r.verdict.is_correct())
    }
}

/// Compare each distribution's most likely label with `target`.
///
/// `iterations[i]` is the count `distributions[i]` was produced with. Ties
/// for the maximum go to the lexicographically smallest label.
pub fn analyze(
    iterations: &[u32],
    distributions: &[QuasiDistribution],
    target: &BitString,
) -> SearchResult<Analysis> {
    if iterations.len() != distributions.len() {
        return Err(SearchError::ResultMismatch {
            expected: iterations.len(),
            got: distributions.len(),
        });
    }

    let reports = iterations
        .iter()
        .zip(distributions)
        .map(|(&k, dist)| {
            let (answer, probability) = dist
                .most_likely()
                .ok_or(SearchError::EmptyDistribution { iterations: k })?;
            let normalized = dist.is_normalized();
            if !normalized {
                warn!(
                    "distribution for {k} iterations sums to {:.4}, not 1",
                    dist.total()
                );
            }
            let verdict = if target == answer {
                Verdict::Correct
            } else {
                Verdict::Failure
            };
            Ok(IterationReport {
                iterations: k,
                answer: answer.to_string(),
                probability,
                target_probability: dist.get(target.as_str()),
                verdict,
                normalized,
                distribution: dist.clone(),
            })
        })
        .collect::<SearchResult<Vec<_>>>()?;

    Ok(Analysis {
        target: target.clone(),
        reports,
    })
}
