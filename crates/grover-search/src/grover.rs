//! Grover circuit construction.

use std::f64::consts::PI;

use grover_ir::{Circuit, IrResult, QubitId};

use crate::problem::AmplificationProblem;

/// Number of Grover iterations that maximises the success probability for
/// one marked state among `2^num_qubits`.
///
/// `floor(π / (4·asin(√(1/2^n))))`, which is 2 for three qubits.
pub fn optimal_iterations(num_qubits: u32) -> u32 {
    let theta = amplitude_angle(num_qubits);
    // finite and non-negative for every n >= 1
    (PI / (4.0 * theta)).floor() as u32
}

/// Probability of measuring the marked state after `iterations` rounds:
/// `sin²((2k+1)·θ)` with `θ = asin(1/√N)`.
pub fn success_probability(num_qubits: u32, iterations: u32) -> f64 {
    let theta = amplitude_angle(num_qubits);
    ((2.0 * f64::from(iterations) + 1.0) * theta).sin().powi(2)
}

fn amplitude_angle(num_qubits: u32) -> f64 {
    let n = i32::try_from(num_qubits).unwrap_or(i32::MAX);
    2f64.powi(-n).sqrt().asin()
}

/// The search circuit for `iterations` rounds of oracle and diffusion,
/// without measurements.
pub fn grover_circuit(problem: &AmplificationProblem, iterations: u32) -> IrResult<Circuit> {
    let mut circuit = Circuit::with_size(
        format!("grover_k{iterations}"),
        problem.num_qubits(),
        0,
    );
    let qubits: Vec<QubitId> = circuit.qubits().collect();

    for &q in &qubits {
        circuit.h(q)?;
    }
    for _ in 0..iterations {
        apply_oracle(&mut circuit, problem, &qubits)?;
        apply_diffusion(&mut circuit, &qubits)?;
    }
    Ok(circuit)
}

fn apply_oracle(
    circuit: &mut Circuit,
    problem: &AmplificationProblem,
    qubits: &[QubitId],
) -> IrResult<()> {
    let flips = problem.oracle().zero_qubits();
    for &q in &flips {
        circuit.x(q)?;
    }
    multi_controlled_z(circuit, qubits)?;
    for &q in &flips {
        circuit.x(q)?;
    }
    Ok(())
}

fn apply_diffusion(circuit: &mut Circuit, qubits: &[QubitId]) -> IrResult<()> {
    for &q in qubits {
        circuit.h(q)?;
    }
    for &q in qubits {
        circuit.x(q)?;
    }
    multi_controlled_z(circuit, qubits)?;
    for &q in qubits {
        circuit.x(q)?;
    }
    for &q in qubits {
        circuit.h(q)?;
    }
    Ok(())
}

/// Phase flip of the all-ones state of `qubits`, without ancillas.
pub fn multi_controlled_z(circuit: &mut Circuit, qubits: &[QubitId]) -> IrResult<()> {
    match qubits {
        [] => Ok(()),
        [q] => circuit.z(*q).map(|_| ()),
        [c, t] => circuit.cz(*c, *t).map(|_| ()),
        [c1, c2, t] => {
            circuit.h(*t)?;
            circuit.ccx(*c1, *c2, *t)?;
            circuit.h(*t)?;
            Ok(())
        }
        [controls @ .., t] => multi_controlled_phase(circuit, PI, controls, *t),
    }
}

/// `C^n P(λ)`: phase `e^{iλ}` when every control and the target are one.
///
/// Splits off the last control `c`:
/// `CP(λ/2)(c,t) · C^{n-1}X(→c) · CP(−λ/2)(c,t) · C^{n-1}X(→c) · C^{n-1}P(λ/2)(t)`.
fn multi_controlled_phase(
    circuit: &mut Circuit,
    lambda: f64,
    controls: &[QubitId],
    target: QubitId,
) -> IrResult<()> {
    match controls {
        [] => circuit.p(lambda, target).map(|_| ()),
        [c] => circuit.cp(lambda, *c, target).map(|_| ()),
        [rest @ .., last] => {
            circuit.cp(lambda / 2.0, *last, target)?;
            multi_controlled_x(circuit, rest, *last)?;
            circuit.cp(-lambda / 2.0, *last, target)?;
            multi_controlled_x(circuit, rest, *last)?;
            multi_controlled_phase(circuit, lambda / 2.0, rest, target)
        }
    }
}

fn multi_controlled_x(circuit: &mut Circuit, controls: &[QubitId], target: QubitId) -> IrResult<()> {
    match controls {
        [] => circuit.x(target).map(|_| ()),
        [c] => circuit.cx(*c, target).map(|_| ()),
        [c1, c2] => circuit.ccx(*c1, *c2, target).map(|_| ()),
        _ => {
            circuit.h(target)?;
            multi_controlled_phase(circuit, PI, controls, target)?;
            circuit.h(target)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use grover_adapter_sim::Statevector;

    use super::*;
    use crate::target::TargetSelector;

    fn probabilities(circuit: &Circuit) -> Vec<f64> {
        let mut sv = Statevector::new(circuit.num_qubits());
        for inst in circuit.instructions() {
            sv.apply(inst);
        }
        sv.probabilities()
    }

    #[test]
    fn test_optimal_iterations() {
        assert_eq!(optimal_iterations(1), 1);
        assert_eq!(optimal_iterations(2), 1);
        assert_eq!(optimal_iterations(3), 2);
        assert_eq!(optimal_iterations(4), 3);
        assert_eq!(optimal_iterations(10), 25);
    }

    #[test]
    fn test_success_probability() {
        assert!((success_probability(3, 0) - 0.125).abs() < 1e-12);
        assert!((success_probability(3, 2) - 0.9453125).abs() < 1e-9);
        // two qubits, one iteration is exact
        assert!((success_probability(2, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_multi_controlled_z_is_exact() {
        for n in 1..=5_u32 {
            let mut circuit = Circuit::with_size("mcz", n, 0);
            let qubits: Vec<QubitId> = circuit.qubits().collect();
            for &q in &qubits {
                circuit.h(q).unwrap();
            }
            multi_controlled_z(&mut circuit, &qubits).unwrap();

            let mut sv = Statevector::new(n as usize);
            for inst in circuit.instructions() {
                sv.apply(inst);
            }
            let amp = 1.0 / f64::from(1u32 << n).sqrt();
            let last = (1usize << n) - 1;
            for (i, a) in sv.amplitudes().iter().enumerate() {
                let expected = if i == last { -amp } else { amp };
                assert!(
                    (a.re - expected).abs() < 1e-9 && a.im.abs() < 1e-9,
                    "n={n}, basis {i}: {a}"
                );
            }
        }
    }

    #[test]
    fn test_grover_finds_every_three_qubit_target() {
        let selector = TargetSelector::for_qubits(3).unwrap();
        let expected = success_probability(3, 2);
        for index in 0..8 {
            let problem = AmplificationProblem::new(selector.encode(index).unwrap());
            let circuit = grover_circuit(&problem, optimal_iterations(3)).unwrap();
            let p = probabilities(&circuit);
            assert!(
                (p[index as usize] - expected).abs() < 1e-9,
                "target {index}: {}",
                p[index as usize]
            );
        }
    }

    #[test]
    fn test_grover_four_qubits_uses_recursive_mcz() {
        let selector = TargetSelector::for_qubits(4).unwrap();
        let problem = AmplificationProblem::new(selector.encode(11).unwrap());
        let circuit = grover_circuit(&problem, 3).unwrap();
        let p = probabilities(&circuit);
        assert!((p[11] - success_probability(4, 3)).abs() < 1e-9);
        assert!(circuit.gate_counts().contains_key("cp"));
    }

    #[test]
    fn test_zero_iterations_is_uniform() {
        let problem = AmplificationProblem::new(TargetSelector::for_qubits(3).unwrap().encode(2).unwrap());
        let circuit = grover_circuit(&problem, 0).unwrap();
        assert_eq!(circuit.name(), "grover_k0");
        assert!(probabilities(&circuit).iter().all(|p| (p - 0.125).abs() < 1e-12));
    }
}
