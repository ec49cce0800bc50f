use markplan_model::{MdpBuilder, PomdpBuilder, SparseMdp};
use proptest::prelude::*;

use crate::{belief_update, observation_probability, ValueIteration};

/// Random small discounted MDPs: every `(state, action)` row splits its mass
/// between two (possibly equal) successors.
fn arb_mdp() -> impl Strategy<Value = SparseMdp> {
    (2usize..5, 1usize..4).prop_flat_map(|(n, m)| {
        let rows = n * m;
        (
            Just(n),
            Just(m),
            prop::collection::vec((0..n, 0..n, 0.05f64..0.95), rows),
            prop::collection::vec(-1.0f64..1.0, rows),
            0.2f64..0.9,
        )
            .prop_map(|(n, m, transitions, rewards, discount)| {
                let mut builder = MdpBuilder::new(n, m);
                builder.discount(discount).horizon(10_000).epsilon(1e-4);
                for (row, &(first, second, weight)) in transitions.iter().enumerate() {
                    let state = row / m;
                    let action = row % m;
                    builder
                        .transition(state, action, first, weight)
                        .expect("transition")
                        .transition(state, action, second, 1.0 - weight)
                        .expect("transition")
                        .reward(state, action, rewards[row])
                        .expect("reward");
                }
                builder.build().expect("model should build")
            })
    })
}

proptest! {
    #[test]
    fn value_iteration_is_deterministic(mdp in arb_mdp()) {
        let zeros = vec![0.0; mdp.num_states()];
        let first = ValueIteration::solve(&mdp, &zeros).expect("solve should succeed");
        let second = ValueIteration::solve(&mdp, &zeros).expect("solve should succeed");

        prop_assert_eq!(first.values(), second.values());
        prop_assert_eq!(first.actions(), second.actions());
        for state in 0..mdp.num_states() {
            prop_assert!(first.action(state).expect("action") < mdp.num_actions());
        }
    }

    #[test]
    fn sweep_deltas_contract(mdp in arb_mdp(), seed_value in -2.0f64..2.0) {
        let initial = vec![seed_value; mdp.num_states()];
        let mut deltas = Vec::new();
        let _ = ValueIteration::solve_with_hook(&mdp, &initial, |metrics| {
            deltas.push(metrics.max_delta);
        })
        .expect("solve should succeed");

        for pair in deltas.windows(2) {
            prop_assert!(pair[1] <= pair[0] + 1e-9, "deltas grew: {:?}", pair);
        }
    }

    #[test]
    fn tiger_belief_updates_stay_normalized(p in 0.0f64..=1.0) {
        let mut builder = PomdpBuilder::new(2, 3, 2);
        builder.discount(0.95).horizon(10).epsilon(1e-4);
        builder
            .transition(0, 0, 0, 1.0).expect("transition")
            .transition(1, 0, 1, 1.0).expect("transition");
        for action in 1..3 {
            for state in 0..2 {
                builder
                    .transition(state, action, 0, 0.5).expect("transition")
                    .transition(state, action, 1, 0.5).expect("transition");
            }
        }
        builder
            .observation(0, 0, 0, 0.85).expect("observation")
            .observation(0, 0, 1, 0.15).expect("observation")
            .observation(0, 1, 0, 0.15).expect("observation")
            .observation(0, 1, 1, 0.85).expect("observation");
        for action in 1..3 {
            for state in 0..2 {
                builder
                    .observation(action, state, 0, 0.5).expect("observation")
                    .observation(action, state, 1, 0.5).expect("observation");
            }
        }
        builder.belief(&[(0, 0.5), (1, 0.5)]).expect("belief");
        let pomdp = builder.build().expect("model should build");

        let belief = [1.0 - p, p];
        for action in 0..3 {
            for observation in 0..2 {
                let prob = observation_probability(&pomdp, &belief, action, observation)
                    .expect("probability should compute");
                if prob > 1e-9 {
                    let updated = belief_update(&pomdp, &belief, action, observation)
                        .expect("positive-mass update should succeed");
                    let total: f64 = updated.iter().sum();
                    prop_assert!((total - 1.0).abs() < 1e-6, "sum {}", total);
                }
            }
        }
    }
}
