use crate::mdp::PROB_TOLERANCE;
use crate::{ModelError, SparseMdp};

#[derive(Debug, Clone)]
/// A fixed set of belief points stored sparsely.
///
/// Each belief is a distribution over states, kept as up to `max_support`
/// parallel id/probability entries with a negative id terminating the row.
pub struct BeliefSet {
    num_states: usize,
    len: usize,
    max_support: usize,
    support: Vec<i32>,
    probs: Vec<f64>,
}

impl BeliefSet {
    /// Validate and construct a belief set over `num_states` states.
    pub fn new(
        num_states: usize,
        len: usize,
        max_support: usize,
        support: Vec<i32>,
        probs: Vec<f64>,
    ) -> Result<Self, ModelError> {
        if num_states == 0 {
            return Err(ModelError::EmptyDimension { what: "state" });
        }
        if len == 0 {
            return Err(ModelError::EmptyDimension { what: "belief" });
        }
        if max_support == 0 {
            return Err(ModelError::EmptyDimension { what: "belief support slot" });
        }

        let expected = len * max_support;
        if support.len() != expected {
            return Err(ModelError::ArrayLength {
                array: "belief support",
                expected,
                actual: support.len(),
            });
        }
        if probs.len() != expected {
            return Err(ModelError::ArrayLength {
                array: "belief probabilities",
                expected,
                actual: probs.len(),
            });
        }

        for row in 0..len {
            let base = row * max_support;
            let mut sum = 0.0_f64;
            let mut entries = 0;
            for i in 0..max_support {
                let id = support[base + i];
                if id < 0 {
                    break;
                }
                if id as usize >= num_states {
                    return Err(ModelError::IndexOutOfRange {
                        array: "belief support",
                        row,
                        value: id as i64,
                        states: num_states,
                    });
                }
                let prob = probs[base + i];
                if !prob.is_finite() || !(0.0..=1.0).contains(&prob) {
                    return Err(ModelError::InvalidProbability {
                        array: "belief probabilities",
                        row,
                        value: prob,
                    });
                }
                sum += prob;
                entries += 1;
            }
            if entries == 0 {
                return Err(ModelError::EmptyBelief { row });
            }
            if (sum - 1.0).abs() > PROB_TOLERANCE {
                return Err(ModelError::ProbabilitySum {
                    array: "belief probabilities",
                    row,
                    sum,
                    tolerance: PROB_TOLERANCE,
                });
            }
        }

        Ok(Self {
            num_states,
            len,
            max_support,
            support,
            probs,
        })
    }

    /// Convert a batch of dense belief rows into sparse form.
    ///
    /// `rows` holds `len` concatenated length-`num_states` distributions.
    /// The support width is recomputed from the widest row.
    pub fn from_dense(num_states: usize, rows: &[f64], len: usize) -> Result<Self, ModelError> {
        if num_states == 0 {
            return Err(ModelError::EmptyDimension { what: "state" });
        }
        if len == 0 {
            return Err(ModelError::EmptyDimension { what: "belief" });
        }
        if rows.len() != len * num_states {
            return Err(ModelError::ArrayLength {
                array: "dense beliefs",
                expected: len * num_states,
                actual: rows.len(),
            });
        }

        let mut entries: Vec<Vec<(usize, f64)>> = Vec::with_capacity(len);
        let mut max_support = 1;
        for row in 0..len {
            let dense = &rows[row * num_states..(row + 1) * num_states];
            let sparse: Vec<(usize, f64)> = dense
                .iter()
                .enumerate()
                .filter(|(_, &p)| p > 0.0)
                .map(|(s, &p)| (s, p))
                .collect();
            if sparse.is_empty() {
                return Err(ModelError::EmptyBelief { row });
            }
            if sparse.len() > max_support {
                max_support = sparse.len();
            }
            entries.push(sparse);
        }

        let mut support = vec![-1_i32; len * max_support];
        let mut probs = vec![0.0_f64; len * max_support];
        for (row, sparse) in entries.iter().enumerate() {
            let base = row * max_support;
            for (i, &(s, p)) in sparse.iter().enumerate() {
                support[base + i] = s as i32;
                probs[base + i] = p;
            }
        }

        Self::new(num_states, len, max_support, support, probs)
    }

    /// Return how many states the beliefs range over.
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Return the number of belief points.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the belief set is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Return the sparse row width (max support entries per belief).
    pub fn max_support(&self) -> usize {
        self.max_support
    }

    /// Iterate the valid `(state, probability)` entries of one belief.
    pub fn support(&self, belief: usize) -> SupportIter<'_> {
        let base = belief * self.max_support;
        SupportIter {
            ids: &self.support[base..base + self.max_support],
            probs: &self.probs[base..base + self.max_support],
            cursor: 0,
        }
    }

    /// Decode one belief into a dense length-`num_states` distribution.
    pub fn dense(&self, belief: usize) -> Option<Vec<f64>> {
        if belief >= self.len {
            return None;
        }
        let mut out = vec![0.0_f64; self.num_states];
        for (s, p) in self.support(belief) {
            out[s] = p;
        }
        Some(out)
    }
}

#[derive(Debug, Clone)]
/// Iterator over the valid entries of one sparse belief row.
/// Stops at the first negative state id.
pub struct SupportIter<'a> {
    ids: &'a [i32],
    probs: &'a [f64],
    cursor: usize,
}

impl<'a> Iterator for SupportIter<'a> {
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

#[derive(Debug, Clone)]
/// Immutable sparse POMDP description.
///
/// Composes the MDP dynamics with an observation model addressed
/// `[action, successor, observation]` and a fixed set of belief points.
pub struct SparsePomdp {
    dynamics: SparseMdp,
    num_observations: usize,
    observations: Vec<f64>,
    beliefs: BeliefSet,
}

impl SparsePomdp {
    /// Validate and construct a sparse POMDP.
    pub fn new(
        dynamics: SparseMdp,
        num_observations: usize,
        observations: Vec<f64>,
        beliefs: BeliefSet,
    ) -> Result<Self, ModelError> {
        if num_observations == 0 {
            return Err(ModelError::EmptyDimension { what: "observation" });
        }

        let n = dynamics.num_states();
        let m = dynamics.num_actions();
        let expected = m * n * num_observations;
        if observations.len() != expected {
            return Err(ModelError::ArrayLength {
                array: "observations",
                expected,
                actual: observations.len(),
            });
        }

        // Each (action, successor) row is a distribution over observations.
        for row in 0..m * n {
            let base = row * num_observations;
            let mut sum = 0.0_f64;
            for o in 0..num_observations {
                let prob = observations[base + o];
                if !prob.is_finite() || !(0.0..=1.0).contains(&prob) {
                    return Err(ModelError::InvalidProbability {
                        array: "observations",
                        row,
                        value: prob,
                    });
                }
                sum += prob;
            }
            if (sum - 1.0).abs() > PROB_TOLERANCE {
                return Err(ModelError::ProbabilitySum {
                    array: "observations",
                    row,
                    sum,
                    tolerance: PROB_TOLERANCE,
                });
            }
        }

        if beliefs.num_states() != n {
            return Err(ModelError::BeliefStateMismatch {
                expected: beliefs.num_states(),
                actual: n,
            });
        }

        Ok(Self {
            dynamics,
            num_observations,
            observations,
            beliefs,
        })
    }

    /// Borrow the underlying MDP dynamics.
    pub fn dynamics(&self) -> &SparseMdp {
        &self.dynamics
    }

    /// Return the number of observations.
    pub fn num_observations(&self) -> usize {
        self.num_observations
    }

    /// Return `Pr(observation | action, successor)`.
    pub fn observation(&self, action: usize, successor: usize, observation: usize) -> f64 {
        self.observations[(action * self.dynamics.num_states() + successor)
            * self.num_observations
            + observation]
    }

    /// Borrow the belief set.
    pub fn beliefs(&self) -> &BeliefSet {
        &self.beliefs
    }

    /// Return a copy of this POMDP with a different belief set.
    /// Used after belief expansion to grow the set a planner samples from.
    pub fn replace_beliefs(&self, beliefs: BeliefSet) -> Result<Self, ModelError> {
        Self::new(
            self.dynamics.clone(),
            self.num_observations,
            self.observations.clone(),
            beliefs,
        )
    }
}
