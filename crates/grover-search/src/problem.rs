//! The amplification problem: which state is good, and its phase oracle.

use grover_ir::QubitId;

use crate::target::BitString;

/// Phase oracle marking a single basis state.
///
/// Realised as `X` on every qubit whose marked bit is `0`, a multi-controlled
/// Z over all qubits, then the same `X` gates again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseOracle {
    marked: BitString,
}

impl PhaseOracle {
    pub fn marked(&self) -> &BitString {
        &self.marked
    }

    pub fn num_qubits(&self) -> u32 {
        u32::try_from(self.marked.width()).unwrap_or(u32::MAX)
    }

    /// Qubits that must be flipped so the marked state reads all ones.
    pub fn zero_qubits(&self) -> Vec<QubitId> {
        (0u32..)
            .zip(self.marked.qubit_bits())
            .filter(|(_, bit)| !bit)
            .map(|(q, _)| QubitId(q))
            .collect()
    }
}

/// Descriptor handed from target selection to circuit construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmplificationProblem {
    oracle: PhaseOracle,
}

impl AmplificationProblem {
    pub fn new(target: BitString) -> Self {
        Self {
            oracle: PhaseOracle { marked: target },
        }
    }

    pub fn target(&self) -> &BitString {
        &self.oracle.marked
    }

    pub fn num_qubits(&self) -> u32 {
        self.oracle.num_qubits()
    }

    /// Whether a measured label is the good state.
    pub fn is_good_state(&self, label: &str) -> bool {
        self.oracle.marked == label
    }

    pub fn oracle(&self) -> &PhaseOracle {
        &self.oracle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(bits: &str) -> AmplificationProblem {
        AmplificationProblem::new(BitString::parse(bits).unwrap())
    }

    #[test]
    fn test_problem_wraps_target_unchanged() {
        let p = problem("101");
        assert_eq!(p.target(), &BitString::parse("101").unwrap());
        assert_eq!(p.num_qubits(), 3);
        assert!(p.is_good_state("101"));
        assert!(!p.is_good_state("011"));
        assert!(!p.is_good_state("0101"));
    }

    #[test]
    fn test_oracle_flips_zero_bits() {
        // qubit 0 is the rightmost character
        assert_eq!(problem("101").oracle().zero_qubits(), vec![QubitId(1)]);
        assert_eq!(
            problem("100").oracle().zero_qubits(),
            vec![QubitId(0), QubitId(1)]
        );
        assert!(problem("111").oracle().zero_qubits().is_empty());
    }
}
