use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{ModelError, SparseMdp};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Serializable MDP schema used for YAML IO and validation.
///
/// States and actions carry string ids; `compile` resolves them to the dense
/// indices of the sparse runtime model in declaration order. Every state
/// must declare the same number of actions.
pub struct MdpSpec {
    /// Schema version for future compatibility checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Discount factor in `[0, 1]`.
    pub discount: f64,
    /// Iteration cap for the planners.
    pub horizon: usize,
    /// Convergence threshold for the planners.
    pub epsilon: f64,
    /// All state declarations in the model.
    pub states: Vec<StateSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A single state declaration in the MDP schema.
pub struct StateSpec {
    /// Unique state id.
    pub id: String,
    /// Available actions from this state, in action-index order.
    pub actions: Vec<ActionSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A named action with its immediate reward and stochastic outcomes.
/// An empty outcome list encodes a state with no successors under this
/// action.
pub struct ActionSpec {
    pub id: String,
    pub reward: f64,
    #[serde(default)]
    pub outcomes: Vec<OutcomeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// One probabilistic transition for an action.
pub struct OutcomeSpec {
    pub next: String,
    pub prob: f64,
}

impl MdpSpec {
    /// Validate ids, action layout, and probability constraints.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.states.is_empty() {
            return Err(ModelError::EmptyDimension { what: "state" });
        }

        // State ids must be unique.
        let mut ids = HashSet::with_capacity(self.states.len());
        for state in &self.states {
            if !ids.insert(state.id.clone()) {
                return Err(ModelError::DuplicateStateId {
                    id: state.id.clone(),
                });
            }
        }

        // All states must declare the same number of actions; the dense
        // action index is the position in each state's list.
        let num_actions = self.states[0].actions.len();
        if num_actions == 0 {
            return Err(ModelError::EmptyDimension { what: "action" });
        }

        let known_ids: HashMap<_, _> = self.states.iter().map(|s| (&s.id, true)).collect();

        for (s, state) in self.states.iter().enumerate() {
            if state.actions.len() != num_actions {
                return Err(ModelError::ActionCountMismatch {
                    state: state.id.clone(),
                    expected: num_actions,
                    actual: state.actions.len(),
                });
            }

            let mut action_ids = HashSet::with_capacity(state.actions.len());
            for (a, action) in state.actions.iter().enumerate() {
                if !action_ids.insert(action.id.clone()) {
                    return Err(ModelError::DuplicateActionId {
                        state: state.id.clone(),
                        action: action.id.clone(),
                    });
                }

                let row = s * num_actions + a;
                let mut sum = 0.0_f64;
                for outcome in &action.outcomes {
                    if !outcome.prob.is_finite() || !(0.0..=1.0).contains(&outcome.prob) {
                        return Err(ModelError::InvalidProbability {
                            array: "outcomes",
                            row,
                            value: outcome.prob,
                        });
                    }
                    if !known_ids.contains_key(&outcome.next) {
                        return Err(ModelError::UnknownNextState {
                            state: state.id.clone(),
                            action: action.id.clone(),
                            next: outcome.next.clone(),
                        });
                    }
                    sum += outcome.prob;
                }

                // Outcome probabilities for a non-empty action must sum to 1.
                if !action.outcomes.is_empty() && (sum - 1.0).abs() > 1e-9 {
                    return Err(ModelError::ProbabilitySum {
                        array: "outcomes",
                        row,
                        sum,
                        tolerance: 1e-9,
                    });
                }
            }
        }

        Ok(())
    }

    /// Compile this spec into the sparse runtime representation.
    pub fn compile(&self) -> Result<SparseMdp, ModelError> {
        self.validate()?;

        let num_states = self.states.len();
        let num_actions = self.states[0].actions.len();

        let mut index_of = HashMap::with_capacity(num_states);
        for (idx, state) in self.states.iter().enumerate() {
            index_of.insert(&state.id, idx);
        }

        let max_successors = self
            .states
            .iter()
            .flat_map(|s| s.actions.iter())
            .map(|a| a.outcomes.len())
            .max()
            .unwrap_or(0)
            .max(1);

        let row_count = num_states * num_actions;
        let mut successors = vec![-1_i32; row_count * max_successors];
        let mut probabilities = vec![0.0_f64; row_count * max_successors];
        let mut rewards = vec![0.0_f64; row_count];

        for (s, state) in self.states.iter().enumerate() {
            for (a, action) in state.actions.iter().enumerate() {
                let row = s * num_actions + a;
                rewards[row] = action.reward;
                let base = row * max_successors;
                for (i, outcome) in action.outcomes.iter().enumerate() {
                    // Resolution cannot fail here: validate() checked every
                    // outcome target.
                    if let Some(&next) = index_of.get(&outcome.next) {
                        successors[base + i] = next as i32;
                        probabilities[base + i] = outcome.prob;
                    }
                }
            }
        }

        SparseMdp::new(
            num_states,
            num_actions,
            max_successors,
            self.discount,
            self.horizon,
            self.epsilon,
            successors,
            probabilities,
            rewards,
        )
    }
}
