//! Target description consumed by the passes.

/// Native gate names of a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasisGates {
    gates: Vec<String>,
}

/// Entangling gate a basis provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntanglingGate {
    CX,
    CZ,
}

impl BasisGates {
    pub fn new(gates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            gates: gates.into_iter().map(Into::into).collect(),
        }
    }

    /// Eagle/Falcon style IBM basis: `rz`, `sx`, `x`, `cx`.
    pub fn ibm() -> Self {
        Self::new(["id", "rz", "sx", "x", "cx", "measure", "barrier"])
    }

    /// Heron style IBM basis, with `cz` as the entangling gate.
    pub fn heron() -> Self {
        Self::new(["id", "rz", "sx", "x", "cz", "measure", "barrier"])
    }

    pub fn contains(&self, gate: &str) -> bool {
        self.gates.iter().any(|g| g == gate)
    }

    pub fn gates(&self) -> &[String] {
        &self.gates
    }

    /// The entangling gate to lower onto, `cx` preferred.
    pub fn entangling_gate(&self) -> Option<EntanglingGate> {
        if self.contains("cx") {
            Some(EntanglingGate::CX)
        } else if self.contains("cz") {
            Some(EntanglingGate::CZ)
        } else {
            None
        }
    }

    /// Whether the passes in this crate can target the basis.
    pub fn is_supported(&self) -> bool {
        self.entangling_gate().is_some() && ["rz", "sx", "x"].iter().all(|g| self.contains(g))
    }
}

impl Default for BasisGates {
    fn default() -> Self {
        Self::ibm()
    }
}
