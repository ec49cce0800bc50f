use markplan_model::SparsePomdp;

use crate::planner::error::PlanError;

/// Probability of seeing `observation` after taking `action` in belief `b`:
/// `sum_s b[s] * sum_l T[s,a,l] * O[a, S[s,a,l], o]`.
pub fn observation_probability(
    pomdp: &SparsePomdp,
    belief: &[f64],
    action: usize,
    observation: usize,
) -> Result<f64, PlanError> {
    let dynamics = pomdp.dynamics();
    if belief.len() != dynamics.num_states() {
        return Err(PlanError::InvalidArgument {
            reason: "belief length must equal the state count",
        });
    }
    if action >= dynamics.num_actions() || observation >= pomdp.num_observations() {
        return Err(PlanError::InvalidArgument {
            reason: "action or observation index out of range",
        });
    }

    let mut total = 0.0;
    for (state, &mass) in belief.iter().enumerate() {
        if mass == 0.0 {
            continue;
        }
        let mut value = 0.0;
        for (next, prob) in dynamics.successors(state, action) {
            value += prob * pomdp.observation(action, next, observation);
        }
        total += value * mass;
    }
    Ok(total)
}

/// Bayesian belief update: `b'[s'] ∝ O[a,s',o] * sum_s b[s] * T[s,a,·→s']`,
/// normalized to sum to 1. Fails with [`PlanError::DegenerateBelief`] when
/// the chosen observation has zero mass under `(b, a)`.
pub fn belief_update(
    pomdp: &SparsePomdp,
    belief: &[f64],
    action: usize,
    observation: usize,
) -> Result<Vec<f64>, PlanError> {
    let dynamics = pomdp.dynamics();
    let n = dynamics.num_states();
    if belief.len() != n {
        return Err(PlanError::InvalidArgument {
            reason: "belief length must equal the state count",
        });
    }
    if action >= dynamics.num_actions() || observation >= pomdp.num_observations() {
        return Err(PlanError::InvalidArgument {
            reason: "action or observation index out of range",
        });
    }

    let mut next = vec![0.0_f64; n];
    for (state, &mass) in belief.iter().enumerate() {
        if mass == 0.0 {
            continue;
        }
        for (successor, prob) in dynamics.successors(state, action) {
            next[successor] += prob * mass;
        }
    }

    let mut total = 0.0;
    for (successor, slot) in next.iter_mut().enumerate() {
        *slot *= pomdp.observation(action, successor, observation);
        total += *slot;
    }

    if total <= 0.0 {
        return Err(PlanError::DegenerateBelief {
            action,
            observation,
        });
    }

    for slot in &mut next {
        *slot /= total;
    }
    Ok(next)
}
