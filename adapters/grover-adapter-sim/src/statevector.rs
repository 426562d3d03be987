//! State-vector simulation engine.
//!
//! Basis index bit `i` holds qubit `i`, matching the label convention of
//! [`grover_hal::bit_label`].

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use num_complex::Complex64;

use grover_ir::{Instruction, InstructionKind, StandardGate};

type Matrix2 = [[Complex64; 2]; 2];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// Amplitudes of an `n`-qubit pure state.
#[derive(Debug, Clone)]
pub struct Statevector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl Statevector {
    /// `|0…0⟩` on `num_qubits` qubits.
    pub fn new(num_qubits: usize) -> Self {
        let mut amplitudes = vec![ZERO; 1 << num_qubits];
        amplitudes[0] = ONE;
        Self {
            amplitudes,
            num_qubits,
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Apply a gate instruction. Measurements and barriers leave the state
    /// untouched; the caller samples at the end.
    pub fn apply(&mut self, instruction: &Instruction) {
        if let InstructionKind::Gate(gate) = &instruction.kind {
            let qubits: Vec<usize> = instruction.qubits.iter().map(|q| q.index()).collect();
            self.apply_gate(*gate, &qubits);
        }
    }

    fn apply_gate(&mut self, gate: StandardGate, q: &[usize]) {
        if let Some(phase) = gate.diagonal_phase() {
            // Rz differs from P only by a global phase
            self.apply_controlled_phase(1 << q[0], phase);
            return;
        }
        match gate {
            StandardGate::H => {
                let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
                self.apply_single(q[0], [[h, h], [h, -h]]);
            }
            StandardGate::X => self.apply_controlled_x(0, q[0]),
            StandardGate::SX => {
                let a = Complex64::new(0.5, 0.5);
                let b = Complex64::new(0.5, -0.5);
                self.apply_single(q[0], [[a, b], [b, a]]);
            }
            StandardGate::CX => self.apply_controlled_x(1 << q[0], q[1]),
            StandardGate::CZ => self.apply_controlled_phase((1 << q[0]) | (1 << q[1]), PI),
            StandardGate::CP(lambda) => {
                self.apply_controlled_phase((1 << q[0]) | (1 << q[1]), lambda);
            }
            StandardGate::CCX => self.apply_controlled_x((1 << q[0]) | (1 << q[1]), q[2]),
            // single-qubit diagonals, applied above
            StandardGate::Z
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::Rz(_)
            | StandardGate::P(_) => {}
        }
    }

    fn apply_single(&mut self, qubit: usize, m: Matrix2) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    /// Flip `target` on every basis state where all `controls` bits are set.
    fn apply_controlled_x(&mut self, controls: usize, target: usize) {
        let tgt = 1 << target;
        for i in 0..self.amplitudes.len() {
            if i & controls == controls && i & tgt == 0 {
                self.amplitudes.swap(i, i | tgt);
            }
        }
    }

    /// Multiply by `e^{iλ}` every basis state where all `mask` bits are set.
    fn apply_controlled_phase(&mut self, mask: usize, lambda: f64) {
        let phase = Complex64::from_polar(1.0, lambda);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask == mask {
                *amp *= phase;
            }
        }
    }

    /// Probability of each basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }
}
