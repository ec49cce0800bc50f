use markplan_model::SparseMdp;

use crate::planner::{
    bellman,
    error::{PlanError, Step},
    policy::ValueFunction,
};

/// Per-sweep progress record reported through `solve_with_hook`.
#[derive(Debug, Clone, Copy)]
pub struct SweepMetrics {
    pub sweep: usize,
    pub max_delta: f64,
}

#[derive(Debug, Clone)]
/// Synchronous value iteration for discounted MDPs.
///
/// Owns a pair of value buffers: `values` always holds the most recently
/// completed sweep and `values_next` is the scratch the next sweep writes
/// before the two are swapped.
pub struct ValueIteration<'a> {
    mdp: &'a SparseMdp,
    values: Vec<f64>,
    values_next: Vec<f64>,
    actions: Vec<usize>,
    sweeps: usize,
    last_delta: f64,
}

impl<'a> ValueIteration<'a> {
    /// Create a planner seeded with an initial value function.
    pub fn new(mdp: &'a SparseMdp, initial_values: &[f64]) -> Result<Self, PlanError> {
        if mdp.num_states() == 0 || mdp.num_actions() == 0 {
            return Err(PlanError::InvalidArgument {
                reason: "model has no states or actions",
            });
        }
        if initial_values.len() != mdp.num_states() {
            return Err(PlanError::InvalidArgument {
                reason: "initial value length must equal the state count",
            });
        }

        Ok(Self {
            mdp,
            values: initial_values.to_vec(),
            values_next: initial_values.to_vec(),
            actions: vec![0; mdp.num_states()],
            sweeps: 0,
            last_delta: f64::INFINITY,
        })
    }

    /// Threshold on the sweep-to-sweep value change that guarantees an
    /// epsilon-optimal result under discounting.
    fn threshold(&self) -> f64 {
        let gamma = self.mdp.discount();
        if gamma > 0.0 && gamma < 1.0 {
            self.mdp.epsilon() * (1.0 - gamma) / (2.0 * gamma)
        } else {
            self.mdp.epsilon()
        }
    }

    /// Perform one synchronous sweep over all states.
    ///
    /// Returns [`Step::Converged`] when the max value change drops below the
    /// threshold, or unconditionally once the sweep count reaches the model
    /// horizon.
    pub fn update(&mut self) -> Step {
        let mut max_delta = 0.0_f64;
        for state in 0..self.mdp.num_states() {
            let (action, q) = bellman::backup_max(self.mdp, state, &self.values);
            let delta = (q - self.values[state]).abs();
            if delta > max_delta {
                max_delta = delta;
            }
            self.values_next[state] = q;
            self.actions[state] = action;
        }

        std::mem::swap(&mut self.values, &mut self.values_next);
        self.sweeps += 1;
        self.last_delta = max_delta;

        if self.sweeps >= self.mdp.horizon() || max_delta < self.threshold() {
            Step::Converged
        } else {
            Step::Progress
        }
    }

    /// Return how many sweeps have been performed.
    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    /// Return the max value change of the most recent sweep.
    pub fn last_delta(&self) -> f64 {
        self.last_delta
    }

    /// Return a freshly allocated policy from the current buffers.
    pub fn policy(&self) -> ValueFunction {
        ValueFunction::new(
            self.mdp.num_states(),
            self.mdp.num_actions(),
            self.values.clone(),
            self.actions.clone(),
        )
    }

    /// Run value iteration to convergence and return the policy.
    pub fn solve(mdp: &'a SparseMdp, initial_values: &[f64]) -> Result<ValueFunction, PlanError> {
        Self::solve_with_hook(mdp, initial_values, |_| {})
    }

    /// Run value iteration to convergence, invoking a callback after each
    /// completed sweep.
    pub fn solve_with_hook<F>(
        mdp: &'a SparseMdp,
        initial_values: &[f64],
        mut on_sweep: F,
    ) -> Result<ValueFunction, PlanError>
    where
        F: FnMut(&SweepMetrics),
    {
        let mut planner = Self::new(mdp, initial_values)?;
        loop {
            let status = planner.update();
            on_sweep(&SweepMetrics {
                sweep: planner.sweeps,
                max_delta: planner.last_delta,
            });
            if status == Step::Converged {
                break;
            }
        }
        Ok(planner.policy())
    }
}
