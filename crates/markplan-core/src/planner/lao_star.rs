use markplan_model::SparseMdp;

use crate::planner::{
    bellman,
    error::{PlanError, Step},
    policy::ValueFunction,
};

/// Per-iteration progress record reported through `solve_with_hook`.
#[derive(Debug, Clone, Copy)]
pub struct LaoStarMetrics {
    pub iteration: usize,
    pub envelope: usize,
    pub residual: f64,
}

#[derive(Debug, Clone)]
/// LAO* for stochastic shortest-path problems.
///
/// Rewards are read as non-negative costs with zero-cost absorbing goals;
/// the planner minimizes expected total cost from state 0. Values start at
/// the caller's admissible heuristic and states outside the envelope keep
/// their heuristic value until expanded.
pub struct LaoStar<'a> {
    mdp: &'a SparseMdp,
    values: Vec<f64>,
    actions: Vec<usize>,
    expanded: Vec<bool>,
    iterations: usize,
    last_residual: f64,
}

impl<'a> LaoStar<'a> {
    /// Create a planner seeded with an admissible heuristic.
    /// The envelope initially contains only the start state (state 0).
    pub fn new(mdp: &'a SparseMdp, heuristic: &[f64]) -> Result<Self, PlanError> {
        if mdp.num_states() == 0 || mdp.num_actions() == 0 {
            return Err(PlanError::InvalidArgument {
                reason: "model has no states or actions",
            });
        }
        if heuristic.len() != mdp.num_states() {
            return Err(PlanError::InvalidArgument {
                reason: "heuristic length must equal the state count",
            });
        }

        let mut expanded = vec![false; mdp.num_states()];
        expanded[0] = true;

        Ok(Self {
            mdp,
            values: heuristic.to_vec(),
            actions: vec![0; mdp.num_states()],
            expanded,
            iterations: 0,
            last_residual: f64::INFINITY,
        })
    }

    /// Walk the greedy solution graph from the start state through expanded
    /// states and collect every successor that falls outside the envelope.
    fn collect_fringe(&self) -> Vec<usize> {
        let n = self.mdp.num_states();
        let mut visited = vec![false; n];
        let mut discovered = vec![false; n];
        let mut fringe = Vec::new();
        let mut worklist = vec![0_usize];
        visited[0] = true;

        while let Some(state) = worklist.pop() {
            for (next, _prob) in self.mdp.successors(state, self.actions[state]) {
                if self.expanded[next] {
                    if !visited[next] {
                        visited[next] = true;
                        worklist.push(next);
                    }
                } else if !discovered[next] {
                    discovered[next] = true;
                    fringe.push(next);
                }
            }
        }

        fringe
    }

    /// Run in-place minimizing backups over the envelope until a full sweep
    /// leaves the greedy policy unchanged or the residual drops below
    /// epsilon, capped at `horizon` sweeps. Returns the last sweep residual.
    fn backup_envelope(&mut self) -> f64 {
        let members: Vec<usize> = (0..self.mdp.num_states())
            .filter(|&s| self.expanded[s])
            .collect();

        let mut residual = f64::INFINITY;
        for _ in 0..self.mdp.horizon() {
            let mut policy_changed = false;
            residual = 0.0;
            for &state in &members {
                let (action, q) = bellman::backup_min_cost(self.mdp, state, &self.values);
                let delta = (q - self.values[state]).abs();
                if delta > residual {
                    residual = delta;
                }
                if action != self.actions[state] {
                    self.actions[state] = action;
                    policy_changed = true;
                }
                self.values[state] = q;
            }
            if !policy_changed || residual < self.mdp.epsilon() {
                break;
            }
        }

        residual
    }

    /// One expansion-and-backup iteration.
    fn iterate(&mut self) -> Step {
        let fringe = self.collect_fringe();
        let expanded_any = !fringe.is_empty();
        for state in fringe {
            self.expanded[state] = true;
        }

        let residual = self.backup_envelope();
        self.iterations += 1;
        self.last_residual = residual;

        if !expanded_any && residual < self.mdp.epsilon() {
            Step::Converged
        } else {
            Step::Progress
        }
    }

    /// Return how many iterations have been performed.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Return the number of states in the envelope.
    pub fn envelope_len(&self) -> usize {
        self.expanded.iter().filter(|&&e| e).count()
    }

    /// Return a freshly allocated policy. Unexpanded states keep their
    /// heuristic value and action 0.
    pub fn policy(&self) -> ValueFunction {
        ValueFunction::new(
            self.mdp.num_states(),
            self.mdp.num_actions(),
            self.values.clone(),
            self.actions.clone(),
        )
    }

    /// Run LAO* to convergence (or the horizon cap) and return the policy.
    pub fn solve(mdp: &'a SparseMdp, heuristic: &[f64]) -> Result<ValueFunction, PlanError> {
        Self::solve_with_hook(mdp, heuristic, |_| {})
    }

    /// Run LAO* to convergence, invoking a callback after each iteration.
    pub fn solve_with_hook<F>(
        mdp: &'a SparseMdp,
        heuristic: &[f64],
        mut on_iteration: F,
    ) -> Result<ValueFunction, PlanError>
    where
        F: FnMut(&LaoStarMetrics),
    {
        let mut planner = Self::new(mdp, heuristic)?;
        loop {
            let status = planner.iterate();
            on_iteration(&LaoStarMetrics {
                iteration: planner.iterations,
                envelope: planner.envelope_len(),
                residual: planner.last_residual,
            });
            if status == Step::Converged || planner.iterations >= mdp.horizon() {
                break;
            }
        }
        Ok(planner.policy())
    }
}
