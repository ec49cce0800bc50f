use crate::{BeliefSet, ModelError, SparseMdp, SparsePomdp};

#[derive(Debug, Clone)]
/// Struct to build sparse MDPs programmatically.
/// Accumulates transitions and rewards, computes the sparse row width, and
/// validates everything on `build`.
pub struct MdpBuilder {
    num_states: usize,
    num_actions: usize,
    discount: f64,
    horizon: usize,
    epsilon: f64,
    transitions: Vec<Vec<(usize, f64)>>,
    rewards: Vec<f64>,
}

impl MdpBuilder {
    /// Create a builder for a model with fixed state and action counts.
    /// Defaults: discount 0.95, horizon 100, epsilon 1e-3, zero rewards.
    pub fn new(num_states: usize, num_actions: usize) -> Self {
        Self {
            num_states,
            num_actions,
            discount: 0.95,
            horizon: 100,
            epsilon: 1e-3,
            transitions: vec![Vec::new(); num_states * num_actions],
            rewards: vec![0.0; num_states * num_actions],
        }
    }

    /// Set the discount factor.
    pub fn discount(&mut self, discount: f64) -> &mut Self {
        self.discount = discount;
        self
    }

    /// Set the iteration cap.
    pub fn horizon(&mut self, horizon: usize) -> &mut Self {
        self.horizon = horizon;
        self
    }

    /// Set the convergence threshold.
    pub fn epsilon(&mut self, epsilon: f64) -> &mut Self {
        self.epsilon = epsilon;
        self
    }

    fn check_state(&self, state: usize) -> Result<(), ModelError> {
        if state >= self.num_states {
            return Err(ModelError::BuilderStateRange {
                state,
                states: self.num_states,
            });
        }
        Ok(())
    }

    fn check_action(&self, action: usize) -> Result<(), ModelError> {
        if action >= self.num_actions {
            return Err(ModelError::BuilderActionRange {
                action,
                actions: self.num_actions,
            });
        }
        Ok(())
    }

    /// Set the immediate reward (or cost) for `(state, action)`.
    pub fn reward(
        &mut self,
        state: usize,
        action: usize,
        value: f64,
    ) -> Result<&mut Self, ModelError> {
        self.check_state(state)?;
        self.check_action(action)?;
        self.rewards[state * self.num_actions + action] = value;
        Ok(self)
    }

    /// Add one probabilistic transition to a `(state, action)` row.
    pub fn transition(
        &mut self,
        state: usize,
        action: usize,
        next: usize,
        prob: f64,
    ) -> Result<&mut Self, ModelError> {
        self.check_state(state)?;
        self.check_action(action)?;
        self.check_state(next)?;
        self.transitions[state * self.num_actions + action].push((next, prob));
        Ok(self)
    }

    /// Produce the validated sparse model.
    pub fn build(self) -> Result<SparseMdp, ModelError> {
        let max_successors = self
            .transitions
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(1);

        let row_count = self.num_states * self.num_actions;
        let mut successors = vec![-1_i32; row_count * max_successors];
        let mut probabilities = vec![0.0_f64; row_count * max_successors];
        for (row, entries) in self.transitions.iter().enumerate() {
            let base = row * max_successors;
            for (i, &(next, prob)) in entries.iter().enumerate() {
                successors[base + i] = next as i32;
                probabilities[base + i] = prob;
            }
        }

        SparseMdp::new(
            self.num_states,
            self.num_actions,
            max_successors,
            self.discount,
            self.horizon,
            self.epsilon,
            successors,
            probabilities,
            self.rewards,
        )
    }
}

#[derive(Debug, Clone)]
/// Struct to build sparse POMDPs programmatically.
/// Wraps an [`MdpBuilder`] for the dynamics and adds the observation table
/// and the belief points.
pub struct PomdpBuilder {
    mdp: MdpBuilder,
    num_observations: usize,
    observations: Vec<f64>,
    beliefs: Vec<Vec<(usize, f64)>>,
}

impl PomdpBuilder {
    /// Create a builder with fixed state, action, and observation counts.
    pub fn new(num_states: usize, num_actions: usize, num_observations: usize) -> Self {
        Self {
            mdp: MdpBuilder::new(num_states, num_actions),
            num_observations,
            observations: vec![0.0; num_actions * num_states * num_observations],
            beliefs: Vec::new(),
        }
    }

    /// Set the discount factor.
    pub fn discount(&mut self, discount: f64) -> &mut Self {
        self.mdp.discount(discount);
        self
    }

    /// Set the iteration cap.
    pub fn horizon(&mut self, horizon: usize) -> &mut Self {
        self.mdp.horizon(horizon);
        self
    }

    /// Set the convergence threshold.
    pub fn epsilon(&mut self, epsilon: f64) -> &mut Self {
        self.mdp.epsilon(epsilon);
        self
    }

    /// Set the immediate reward (or cost) for `(state, action)`.
    pub fn reward(
        &mut self,
        state: usize,
        action: usize,
        value: f64,
    ) -> Result<&mut Self, ModelError> {
        self.mdp.reward(state, action, value)?;
        Ok(self)
    }

    /// Add one probabilistic transition to a `(state, action)` row.
    pub fn transition(
        &mut self,
        state: usize,
        action: usize,
        next: usize,
        prob: f64,
    ) -> Result<&mut Self, ModelError> {
        self.mdp.transition(state, action, next, prob)?;
        Ok(self)
    }

    /// Set `Pr(observation | action, successor)`.
    pub fn observation(
        &mut self,
        action: usize,
        successor: usize,
        observation: usize,
        prob: f64,
    ) -> Result<&mut Self, ModelError> {
        self.mdp.check_action(action)?;
        self.mdp.check_state(successor)?;
        if observation >= self.num_observations {
            return Err(ModelError::BuilderObservationRange {
                observation,
                observations: self.num_observations,
            });
        }
        self.observations[(action * self.mdp.num_states + successor) * self.num_observations
            + observation] = prob;
        Ok(self)
    }

    /// Add one belief point from its sparse `(state, probability)` support.
    pub fn belief(&mut self, support: &[(usize, f64)]) -> Result<&mut Self, ModelError> {
        for &(state, _) in support {
            self.mdp.check_state(state)?;
        }
        self.beliefs.push(support.to_vec());
        Ok(self)
    }

    /// Produce the validated sparse model.
    pub fn build(self) -> Result<SparsePomdp, ModelError> {
        let num_states = self.mdp.num_states;
        let dynamics = self.mdp.build()?;

        if self.beliefs.is_empty() {
            return Err(ModelError::EmptyDimension { what: "belief" });
        }
        let len = self.beliefs.len();
        let max_support = self
            .beliefs
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(1);

        let mut support = vec![-1_i32; len * max_support];
        let mut probs = vec![0.0_f64; len * max_support];
        for (row, entries) in self.beliefs.iter().enumerate() {
            let base = row * max_support;
            for (i, &(state, prob)) in entries.iter().enumerate() {
                support[base + i] = state as i32;
                probs[base + i] = prob;
            }
        }
        let beliefs = BeliefSet::new(num_states, len, max_support, support, probs)?;

        SparsePomdp::new(dynamics, self.num_observations, self.observations, beliefs)
    }
}
