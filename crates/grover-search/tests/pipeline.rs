//! End-to-end runs of the search pipeline against the local simulator.

use async_trait::async_trait;
use grover_adapter_sim::SimulatorBackend;
use grover_hal::Backend;
use grover_search::{
    AmplificationProblem, BackendProvider, DEFAULT_ITERATIONS, DispatchOutcome, Dispatcher,
    ExecutionMode, SearchResult, TargetSelector, Verdict, analyze, build_batch,
    optimal_iterations, success_probability,
};

/// Exact simulators for both modes; the hardware path still goes through
/// basis translation because the simulator advertises `rz`/`sx`/`x`/`cx`.
struct LocalProvider;

#[async_trait]
impl BackendProvider for LocalProvider {
    async fn simulator(&self) -> SearchResult<Box<dyn Backend>> {
        Ok(Box::new(SimulatorBackend::new().with_exact(true)))
    }

    async fn hardware(&self) -> SearchResult<Box<dyn Backend>> {
        Ok(Box::new(SimulatorBackend::new().with_exact(true)))
    }
}

async fn run(qubits: u32, index: u64, iterations: &[u32], mode: ExecutionMode) -> grover_search::Analysis {
    let selector = TargetSelector::for_qubits(qubits).unwrap();
    let target = selector.target(index).unwrap();
    let problem = AmplificationProblem::new(target.bits.clone());
    let batch = build_batch(&problem, iterations).unwrap();

    let dispatcher = Dispatcher::new(LocalProvider);
    let DispatchOutcome::Completed(execution) = dispatcher.dispatch(&batch, 1000, mode).await.unwrap() else {
        panic!("run was aborted");
    };
    analyze(&batch.iterations(), &execution.distributions(), &target.bits).unwrap()
}

#[tokio::test]
async fn test_default_sweep_three_qubits() {
    let analysis = run(3, 5, &DEFAULT_ITERATIONS, ExecutionMode::Simulate).await;
    assert_eq!(analysis.reports().len(), 8);
    assert_eq!(analysis.target().as_str(), "101");

    // k = 0 is uniform, so the smallest label wins the tie.
    let zero = &analysis.reports()[0];
    assert_eq!(zero.answer, "000");
    assert_eq!(zero.verdict, Verdict::Failure);

    let optimal = &analysis.reports()[2];
    assert_eq!(optimal.iterations, 2);
    assert_eq!(optimal.answer, "101");
    assert_eq!(optimal.verdict, Verdict::Correct);
    assert!((optimal.target_probability - success_probability(3, 2)).abs() < 1e-9);

    for report in analysis.reports() {
        let expected = success_probability(3, report.iterations);
        assert!(
            (report.target_probability - expected).abs() < 1e-9,
            "k={} got {} expected {}",
            report.iterations,
            report.target_probability,
            expected
        );
    }
    // 13θ lands closer to 3π/2 than 5θ does to π/2.
    assert_eq!(analysis.best().unwrap().iterations, 6);
}

#[tokio::test]
async fn test_every_three_qubit_target_found_at_optimum() {
    let k = optimal_iterations(3);
    for index in 0..8 {
        let analysis = run(3, index, &[k], ExecutionMode::Simulate).await;
        assert!(analysis.all_correct(), "target {index} not found");
    }
}

#[tokio::test]
async fn test_hardware_path_matches_simulation() {
    let iterations = [1, 2, 3];
    let simulated = run(3, 6, &iterations, ExecutionMode::Simulate).await;
    let compiled = run(3, 6, &iterations, ExecutionMode::Hardware).await;

    for (s, h) in simulated.reports().iter().zip(compiled.reports()) {
        assert_eq!(s.answer, h.answer);
        assert_eq!(s.verdict, h.verdict);
        assert!((s.target_probability - h.target_probability).abs() < 1e-6);
    }
}

#[tokio::test]
async fn test_four_qubits_uses_phase_ladder() {
    let k = optimal_iterations(4);
    assert_eq!(k, 3);
    let analysis = run(4, 11, &[k], ExecutionMode::Simulate).await;
    let report = &analysis.reports()[0];
    assert_eq!(report.answer, "1011");
    assert!(report.target_probability > 0.95);
}

#[tokio::test]
async fn test_abort_returns_without_results() {
    let selector = TargetSelector::for_qubits(2).unwrap();
    let problem = AmplificationProblem::new(selector.target(1).unwrap().bits);
    let batch = build_batch(&problem, &[1]).unwrap();
    let outcome = Dispatcher::new(LocalProvider)
        .dispatch(&batch, 100, ExecutionMode::from_selection("q"))
        .await
        .unwrap();
    assert!(matches!(outcome, DispatchOutcome::Aborted));
}
