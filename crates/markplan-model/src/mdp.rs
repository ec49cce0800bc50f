use crate::ModelError;

/// Floating point tolerance used when validating probability rows.
pub(crate) const PROB_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone)]
/// Immutable sparse MDP description.
///
/// Transition structure is stored row-wise: for each `(state, action)` pair
/// there are up to `max_successors` entries of parallel successor-id /
/// probability arrays, with a negative id terminating the row early. All
/// kernels walk rows through [`SparseMdp::successors`] rather than assuming a
/// dense layout.
pub struct SparseMdp {
    num_states: usize,
    num_actions: usize,
    max_successors: usize,
    discount: f64,
    horizon: usize,
    epsilon: f64,
    successors: Vec<i32>,
    probabilities: Vec<f64>,
    rewards: Vec<f64>,
}

impl SparseMdp {
    /// Validate and construct a sparse MDP.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        num_states: usize,
        num_actions: usize,
        max_successors: usize,
        discount: f64,
        horizon: usize,
        epsilon: f64,
        successors: Vec<i32>,
        probabilities: Vec<f64>,
        rewards: Vec<f64>,
    ) -> Result<Self, ModelError> {
        if num_states == 0 {
            return Err(ModelError::EmptyDimension { what: "state" });
        }
        if num_actions == 0 {
            return Err(ModelError::EmptyDimension { what: "action" });
        }
        if max_successors == 0 {
            return Err(ModelError::EmptyDimension { what: "successor slot" });
        }
        if num_states > i32::MAX as usize {
            return Err(ModelError::TooManyStates { states: num_states });
        }
        if !discount.is_finite() || !(0.0..=1.0).contains(&discount) {
            return Err(ModelError::InvalidDiscount { value: discount });
        }
        if horizon == 0 {
            return Err(ModelError::InvalidHorizon);
        }
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(ModelError::InvalidEpsilon { value: epsilon });
        }

        let row_count = num_states * num_actions;
        let expected = row_count * max_successors;
        if successors.len() != expected {
            return Err(ModelError::ArrayLength {
                array: "successors",
                expected,
                actual: successors.len(),
            });
        }
        if probabilities.len() != expected {
            return Err(ModelError::ArrayLength {
                array: "probabilities",
                expected,
                actual: probabilities.len(),
            });
        }
        if rewards.len() != row_count {
            return Err(ModelError::ArrayLength {
                array: "rewards",
                expected: row_count,
                actual: rewards.len(),
            });
        }

        // Check each (state, action) row up to its sentinel. Entries beyond
        // the sentinel are never read and stay unchecked. An empty row is
        // allowed and encodes a state with no successors under that action.
        for row in 0..row_count {
            let base = row * max_successors;
            let mut sum = 0.0_f64;
            let mut entries = 0;
            for i in 0..max_successors {
                let id = successors[base + i];
                if id < 0 {
                    break;
                }
                if id as usize >= num_states {
                    return Err(ModelError::IndexOutOfRange {
                        array: "successors",
                        row,
                        value: id as i64,
                        states: num_states,
                    });
                }
                let prob = probabilities[base + i];
                if !prob.is_finite() || !(0.0..=1.0).contains(&prob) {
                    return Err(ModelError::InvalidProbability {
                        array: "probabilities",
                        row,
                        value: prob,
                    });
                }
                sum += prob;
                entries += 1;
            }
            if entries > 0 && (sum - 1.0).abs() > PROB_TOLERANCE {
                return Err(ModelError::ProbabilitySum {
                    array: "probabilities",
                    row,
                    sum,
                    tolerance: PROB_TOLERANCE,
                });
            }
        }

        Ok(Self {
            num_states,
            num_actions,
            max_successors,
            discount,
            horizon,
            epsilon,
            successors,
            probabilities,
            rewards,
        })
    }

    /// Return the number of states.
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Return the number of actions.
    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    /// Return the sparse row width (max successors per state-action pair).
    pub fn max_successors(&self) -> usize {
        self.max_successors
    }

    /// Return the discount factor.
    pub fn discount(&self) -> f64 {
        self.discount
    }

    /// Return the iteration cap.
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Return the convergence threshold.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Return the immediate reward (or cost) for `(state, action)`.
    pub fn reward(&self, state: usize, action: usize) -> f64 {
        self.rewards[state * self.num_actions + action]
    }

    /// Iterate the valid `(successor, probability)` entries of one row.
    pub fn successors(&self, state: usize, action: usize) -> SuccessorIter<'_> {
        let base = (state * self.num_actions + action) * self.max_successors;
        SuccessorIter {
            ids: &self.successors[base..base + self.max_successors],
            probs: &self.probabilities[base..base + self.max_successors],
            cursor: 0,
        }
    }
}

#[derive(Debug, Clone)]
/// Iterator over the valid entries of one sparse `(state, action)` row.
/// Stops at the first negative successor id.
pub struct SuccessorIter<'a> {
    ids: &'a [i32],
    probs: &'a [f64],
    cursor: usize,
}

impl<'a> Iterator for SuccessorIter<'a> {
    type Item = (usize, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.ids.len() {
            return None;
        }
        let id = self.ids[self.cursor];
        if id < 0 {
            return None;
        }
        let prob = self.probs[self.cursor];
        self.cursor += 1;
        Some((id as usize, prob))
    }
}
