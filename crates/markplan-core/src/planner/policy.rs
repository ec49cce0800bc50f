/// Value-function policy over a fully observable model: one value and one
/// greedy action per state.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueFunction {
    num_states: usize,
    num_actions: usize,
    values: Vec<f64>,
    actions: Vec<usize>,
}

impl ValueFunction {
    pub(crate) fn new(
        num_states: usize,
        num_actions: usize,
        values: Vec<f64>,
        actions: Vec<usize>,
    ) -> Self {
        Self {
            num_states,
            num_actions,
            values,
            actions,
        }
    }

    /// Return the number of states.
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Return the number of actions.
    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    /// Return the value of one state.
    pub fn value(&self, state: usize) -> Option<f64> {
        self.values.get(state).copied()
    }

    /// Return the greedy action at one state.
    pub fn action(&self, state: usize) -> Option<usize> {
        self.actions.get(state).copied()
    }

    /// Borrow all state values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Borrow all greedy actions.
    pub fn actions(&self) -> &[usize] {
        &self.actions
    }
}

/// Alpha-vector policy over belief space: each vector is the value of a
/// conditional plan, labelled with the plan's first action. The induced
/// value function is the upper envelope of the set.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaVectors {
    num_states: usize,
    num_actions: usize,
    alphas: Vec<f64>,
    actions: Vec<usize>,
}

impl AlphaVectors {
    pub(crate) fn new(
        num_states: usize,
        num_actions: usize,
        alphas: Vec<f64>,
        actions: Vec<usize>,
    ) -> Self {
        Self {
            num_states,
            num_actions,
            alphas,
            actions,
        }
    }

    /// Return the number of states.
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Return the number of actions.
    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    /// Return how many alpha-vectors the policy holds.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check if the policy holds no alpha-vectors.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Borrow one alpha-vector.
    pub fn alpha(&self, index: usize) -> Option<&[f64]> {
        if index >= self.len() {
            return None;
        }
        let base = index * self.num_states;
        Some(&self.alphas[base..base + self.num_states])
    }

    /// Return the action label of one alpha-vector.
    pub fn action(&self, index: usize) -> Option<usize> {
        self.actions.get(index).copied()
    }

    /// Compute the optimal value and action at a dense belief.
    ///
    /// Maximizes the dot product over all vectors; on ties the first vector
    /// wins. Returns `None` when the set is empty or the belief length does
    /// not match the model.
    pub fn value_and_action(&self, belief: &[f64]) -> Option<(f64, usize)> {
        if belief.len() != self.num_states {
            return None;
        }

        let mut best: Option<(f64, usize)> = None;
        for index in 0..self.len() {
            let base = index * self.num_states;
            let value: f64 = belief
                .iter()
                .zip(&self.alphas[base..base + self.num_states])
                .map(|(b, a)| b * a)
                .sum();
            match best {
                Some((best_value, _)) if value <= best_value => {}
                _ => best = Some((value, index)),
            }
        }

        best.map(|(value, index)| (value, self.actions[index]))
    }
}
