//! Property-based tests for target encoding and circuit construction.

use grover_search::{
    AmplificationProblem, BitString, SearchError, TargetSelector, build_batch, optimal_iterations,
    success_probability,
};
use proptest::prelude::*;

fn arb_selector() -> impl Strategy<Value = TargetSelector> {
    (2_u64..=4096).prop_map(|n| TargetSelector::new(n).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn encode_decode_roundtrip(selector in arb_selector(), seed in any::<u64>()) {
        let index = seed % selector.range_size();
        let bits = selector.encode(index).unwrap();
        prop_assert_eq!(bits.width(), selector.width() as usize);
        prop_assert_eq!(selector.decode(&bits).unwrap(), index);
    }

    #[test]
    fn width_is_minimal(selector in arb_selector()) {
        let w = selector.width();
        prop_assert!(selector.range_size() <= 1 << w);
        prop_assert!(selector.range_size() > 1 << (w - 1));
    }

    #[test]
    fn out_of_range_rejected(selector in arb_selector(), extra in 0_u64..1000) {
        let index = selector.range_size() + extra;
        let is_out_of_range = matches!(
            selector.encode(index),
            Err(SearchError::TargetOutOfRange { .. })
        );
        prop_assert!(is_out_of_range);
    }

    #[test]
    fn labels_are_binary(bits in "[01]{1,12}") {
        let parsed = BitString::parse(&bits).unwrap();
        prop_assert_eq!(parsed.as_str(), bits.as_str());
    }

    #[test]
    fn batch_preserves_order(iterations in prop::collection::vec(0_u32..6, 1..6)) {
        let problem = AmplificationProblem::new(BitString::parse("011").unwrap());
        let batch = build_batch(&problem, &iterations).unwrap();
        prop_assert_eq!(batch.iterations(), iterations);
        for entry in &batch {
            prop_assert!(entry.circuit.is_measured());
            prop_assert_eq!(entry.circuit.num_qubits(), 3);
        }
    }

    #[test]
    fn optimum_beats_half(n in 2_u32..=12) {
        prop_assert!(success_probability(n, optimal_iterations(n)) > 0.5);
    }
}
