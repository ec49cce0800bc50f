use markplan_model::SparseMdp;

/// One maximizing Bellman backup for a single state.
///
/// `Q(s,a) = R[s,a] + gamma * sum_i T[s,a,i] * values[S[s,a,i]]` over the
/// valid sparse entries. Ties break toward the lowest action index.
pub(crate) fn backup_max(mdp: &SparseMdp, state: usize, values: &[f64]) -> (usize, f64) {
    let mut best_action = 0;
    let mut best_q = f64::NEG_INFINITY;

    for action in 0..mdp.num_actions() {
        let mut future = 0.0;
        for (next, prob) in mdp.successors(state, action) {
            future += prob * values[next];
        }
        let q = mdp.reward(state, action) + mdp.discount() * future;

        if q > best_q {
            best_q = q;
            best_action = action;
        }
    }

    (best_action, best_q)
}

/// One minimizing backup for a single state, for cost models with zero-cost
/// absorbing goals. Same sparse walk and tie-break as [`backup_max`].
pub(crate) fn backup_min_cost(mdp: &SparseMdp, state: usize, values: &[f64]) -> (usize, f64) {
    let mut best_action = 0;
    let mut best_q = f64::INFINITY;

    for action in 0..mdp.num_actions() {
        let mut future = 0.0;
        for (next, prob) in mdp.successors(state, action) {
            future += prob * values[next];
        }
        let q = mdp.reward(state, action) + mdp.discount() * future;

        if q < best_q {
            best_q = q;
            best_action = action;
        }
    }

    (best_action, best_q)
}
