use markplan_model::{MdpBuilder, SparseMdp};

use crate::{PlanError, Step, ValueIteration};

/// Two states, two actions: staying in state 0 pays nothing, moving to the
/// absorbing state 1 pays 1 once.
fn absorbing_goal_mdp() -> SparseMdp {
    let mut builder = MdpBuilder::new(2, 2);
    builder.discount(0.9).horizon(1000).epsilon(1e-6);
    builder
        .transition(0, 0, 0, 1.0)
        .expect("transition")
        .transition(0, 1, 1, 1.0)
        .expect("transition")
        .transition(1, 0, 1, 1.0)
        .expect("transition")
        .transition(1, 1, 1, 1.0)
        .expect("transition")
        .reward(0, 1, 1.0)
        .expect("reward");
    builder.build().expect("model should build")
}

#[test]
fn absorbing_goal_prefers_the_paying_action() {
    let mdp = absorbing_goal_mdp();
    let policy = ValueIteration::solve(&mdp, &[0.0, 0.0]).expect("solve should succeed");

    assert_eq!(policy.num_states(), 2);
    assert_eq!(policy.num_actions(), 2);
    assert!((policy.value(0).expect("state 0") - 1.0).abs() < 1e-9);
    assert!(policy.value(1).expect("state 1").abs() < 1e-9);
    assert_eq!(policy.action(0), Some(1));
    // Both actions at state 1 are identical, so the lowest index wins.
    assert_eq!(policy.action(1), Some(0));
}

#[test]
fn fixed_inputs_give_identical_policies() {
    let mdp = absorbing_goal_mdp();
    let first = ValueIteration::solve(&mdp, &[0.3, -0.7]).expect("solve should succeed");
    let second = ValueIteration::solve(&mdp, &[0.3, -0.7]).expect("solve should succeed");

    assert_eq!(first.values(), second.values());
    assert_eq!(first.actions(), second.actions());
}

#[test]
fn horizon_caps_the_sweep_count() {
    let mut builder = MdpBuilder::new(2, 2);
    builder.discount(0.9).horizon(1).epsilon(1e-12);
    builder
        .transition(0, 0, 1, 1.0)
        .expect("transition")
        .transition(0, 1, 1, 1.0)
        .expect("transition")
        .transition(1, 0, 0, 1.0)
        .expect("transition")
        .transition(1, 1, 0, 1.0)
        .expect("transition")
        .reward(0, 0, 1.0)
        .expect("reward");
    let mdp = builder.build().expect("model should build");

    let mut planner = ValueIteration::new(&mdp, &[0.0, 0.0]).expect("planner should build");
    assert_eq!(planner.update(), Step::Converged);
    assert_eq!(planner.sweeps(), 1);
}

#[test]
fn converged_values_satisfy_the_bellman_residual_bound() {
    let mut builder = MdpBuilder::new(3, 2);
    builder.discount(0.8).horizon(10_000).epsilon(1e-5);
    builder
        .transition(0, 0, 1, 0.6)
        .expect("transition")
        .transition(0, 0, 2, 0.4)
        .expect("transition")
        .transition(0, 1, 2, 1.0)
        .expect("transition")
        .transition(1, 0, 0, 1.0)
        .expect("transition")
        .transition(1, 1, 2, 1.0)
        .expect("transition")
        .transition(2, 0, 2, 1.0)
        .expect("transition")
        .transition(2, 1, 0, 1.0)
        .expect("transition")
        .reward(0, 0, 0.5)
        .expect("reward")
        .reward(1, 1, 1.0)
        .expect("reward")
        .reward(2, 1, -0.5)
        .expect("reward");
    let mdp = builder.build().expect("model should build");

    let policy = ValueIteration::solve(&mdp, &[0.0; 3]).expect("solve should succeed");

    for state in 0..3 {
        let mut best_q = f64::NEG_INFINITY;
        for action in 0..2 {
            let mut q = mdp.reward(state, action);
            for (next, prob) in mdp.successors(state, action) {
                q += mdp.discount() * prob * policy.value(next).expect("value");
            }
            if q > best_q {
                best_q = q;
            }
        }
        let residual = (policy.value(state).expect("value") - best_q).abs();
        assert!(residual <= mdp.epsilon(), "residual {residual} at {state}");
    }
}

#[test]
fn sweep_deltas_shrink_monotonically() {
    let mdp = absorbing_goal_mdp();
    let mut deltas = Vec::new();
    let _ = ValueIteration::solve_with_hook(&mdp, &[5.0, -3.0], |metrics| {
        deltas.push(metrics.max_delta);
    })
    .expect("solve should succeed");

    assert!(!deltas.is_empty());
    for pair in deltas.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-9, "deltas grew: {pair:?}");
    }
}

#[test]
fn wrong_initial_value_length_is_rejected() {
    let mdp = absorbing_goal_mdp();
    let err = ValueIteration::new(&mdp, &[0.0]).expect_err("length mismatch should fail");
    assert!(matches!(err, PlanError::InvalidArgument { .. }));
}
