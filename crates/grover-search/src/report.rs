//! Text rendering of an [`Analysis`].
//!
//! None of this feeds back into the verdicts; it only formats them.

use std::collections::BTreeSet;
use std::fmt::{self, Write};

use grover_hal::QuasiDistribution;

use crate::analysis::{Analysis, IterationReport};

pub const RESULTS_BANNER: &str =
    "===================================== RESULTS =====================================";

/// One bar cell per this many percent.
const PERCENT_PER_CELL: f64 = 2.0;

const MARKERS: [char; 8] = ['█', '▓', '▒', '░', '#', '=', '+', '*'];

pub fn optimal_line(optimal: u32, qubits: u32) -> String {
    format!("The optimal amount of Grover iterations is: {optimal} with {qubits} qubits")
}

/// The block printed for one circuit of the batch.
pub fn iteration_block(report: &IterationReport, target: &str) -> String {
    format!(
        "With {} iterations the following probabilities were returned: \n {}\n\
         Maximum probability was for the value {}\n\
         Correct answer: {}\n\
         {}\n",
        report.iterations, report.distribution, report.answer, target, report.verdict
    )
}

pub fn render_analysis(analysis: &Analysis) -> String {
    analysis
        .reports()
        .iter()
        .map(|r| iteration_block(r, analysis.target().as_str()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Legend entry for a series.
pub fn legend_label(iterations: u32) -> String {
    if iterations == 1 {
        "1 iteration".to_string()
    } else {
        format!("{iterations} iterations")
    }
}

/// Probability per label, one bar per iteration count.
#[derive(Debug, Clone)]
pub struct Histogram {
    series: Vec<(u32, QuasiDistribution)>,
    width: usize,
}

impl Histogram {
    pub fn new(width: usize) -> Self {
        Self {
            series: Vec::new(),
            width,
        }
    }

    pub fn from_analysis(analysis: &Analysis) -> Self {
        let mut hist = Self::new(analysis.target().width());
        for report in analysis.reports() {
            hist.push(report.iterations, report.distribution.clone());
        }
        hist
    }

    pub fn push(&mut self, iterations: u32, distribution: QuasiDistribution) {
        self.series.push((iterations, distribution));
    }

    /// Index of the last entry on the x axis.
    pub fn max_entry(&self) -> u64 {
        match self.width {
            0 => 0,
            w if w >= 64 => u64::MAX,
            w => (1u64 << w) - 1,
        }
    }

    pub fn x_label(&self) -> String {
        format!("Which entry in the data [0,..,{}]", self.max_entry())
    }

    fn marker(series: usize) -> char {
        MARKERS[series % MARKERS.len()]
    }

    /// Every label any series reports, ordered by entry index.
    fn labels(&self) -> Vec<&str> {
        let labels: BTreeSet<&str> = self
            .series
            .iter()
            .flat_map(|(_, d)| d.labels())
            .collect();
        let mut labels: Vec<&str> = labels.into_iter().collect();
        labels.sort_by_key(|l| (u64::from_str_radix(l, 2).ok(), *l));
        labels
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn write_to(&self, out: &mut impl Write) -> fmt::Result {
        for (i, (k, _)) in self.series.iter().enumerate() {
            writeln!(out, "  {} {}", Self::marker(i), legend_label(*k))?;
        }
        writeln!(out)?;

        for label in self.labels() {
            let entry = u64::from_str_radix(label, 2)
                .map(|v| v.to_string())
                .unwrap_or_else(|_| "?".to_string());
            for (i, (_, dist)) in self.series.iter().enumerate() {
                let percent = dist.get(label).max(0.0) * 100.0;
                let cells = (percent / PERCENT_PER_CELL).round() as usize;
                let bar: String = std::iter::repeat_n(Self::marker(i), cells).collect();
                if i == 0 {
                    write!(out, "  {label} ({entry:>3}) ")?;
                } else {
                    write!(out, "  {:w$} ", "", w = label.len() + 6)?;
                }
                writeln!(out, "{percent:>6.2}% {bar}")?;
            }
        }

        writeln!(out)?;
        writeln!(out, "  {}", self.x_label())
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_to(&mut out);
        out
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::target::BitString;

    fn sample() -> Analysis {
        let dists: Vec<QuasiDistribution> = vec![
            [("00", 0.25), ("01", 0.25), ("10", 0.25), ("11", 0.25)]
                .into_iter()
                .collect(),
            [("10", 1.0)].into_iter().collect(),
        ];
        analyze(&[0, 1], &dists, &BitString::parse("10").unwrap()).unwrap()
    }

    #[test]
    fn test_optimal_line() {
        assert_eq!(
            optimal_line(2, 3),
            "The optimal amount of Grover iterations is: 2 with 3 qubits"
        );
    }

    #[test]
    fn test_iteration_block_lines() {
        let analysis = sample();
        let block = iteration_block(&analysis.reports()[1], "10");
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(
            lines[0],
            "With 1 iterations the following probabilities were returned: "
        );
        assert_eq!(lines[1], " {'10': 1.0000}");
        assert_eq!(lines[2], "Maximum probability was for the value 10");
        assert_eq!(lines[3], "Correct answer: 10");
        assert_eq!(lines[4], "Correct!");
    }

    #[test]
    fn test_render_analysis_has_every_block() {
        let text = render_analysis(&sample());
        assert_eq!(text.matches("Correct answer: 10").count(), 2);
        assert!(text.contains("Failure!"));
        assert!(text.contains("Correct!"));
    }

    #[test]
    fn test_legend_uses_real_counts() {
        assert_eq!(legend_label(0), "0 iterations");
        assert_eq!(legend_label(1), "1 iteration");
        assert_eq!(legend_label(7), "7 iterations");
    }

    #[test]
    fn test_histogram_layout() {
        let hist = Histogram::from_analysis(&sample());
        let text = hist.render();
        assert!(text.contains("█ 0 iterations"));
        assert!(text.contains("▓ 1 iteration\n"));
        assert!(text.contains("Which entry in the data [0,..,3]"));
        // one row per label and series
        assert_eq!(text.matches('%').count(), 8);
        assert!(text.contains("100.00% ▓▓▓▓▓"));
        let first = text.find("00 (  0)").unwrap();
        let last = text.find("11 (  3)").unwrap();
        assert!(first < last);
        assert_eq!(text, hist.to_string());
    }

    #[test]
    fn test_empty_histogram() {
        let hist = Histogram::new(3);
        assert_eq!(hist.max_entry(), 7);
        assert!(hist.render().ends_with("Which entry in the data [0,..,7]\n"));
    }
}
