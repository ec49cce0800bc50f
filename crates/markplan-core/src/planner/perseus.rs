use markplan_model::SparsePomdp;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::planner::{
    error::{PlanError, Step},
    policy::AlphaVectors,
};

/// Per-update progress record reported through `solve_with_hook`.
#[derive(Debug, Clone, Copy)]
pub struct PerseusMetrics {
    pub horizon_step: usize,
    pub pending: usize,
    pub pool_len: usize,
}

#[derive(Debug, Clone)]
/// A bounded pool of alpha-vectors with a paired action per vector.
/// Capacity equals the belief count; the active prefix is `len` vectors.
struct AlphaPool {
    num_states: usize,
    capacity: usize,
    data: Vec<f64>,
    actions: Vec<usize>,
    len: usize,
}

impl AlphaPool {
    fn with_initial(num_states: usize, capacity: usize, initial: &[f64]) -> Self {
        Self {
            num_states,
            capacity,
            data: initial.to_vec(),
            actions: vec![0; capacity],
            len: 0,
        }
    }

    fn alpha(&self, index: usize) -> &[f64] {
        let base = index * self.num_states;
        &self.data[base..base + self.num_states]
    }

    fn action(&self, index: usize) -> usize {
        self.actions[index]
    }

    fn push(&mut self, alpha: &[f64], action: usize) -> Result<(), PlanError> {
        if self.len == self.capacity {
            return Err(PlanError::OutOfMemory {
                capacity: self.capacity,
            });
        }
        let base = self.len * self.num_states;
        self.data[base..base + self.num_states].copy_from_slice(alpha);
        self.actions[self.len] = action;
        self.len += 1;
        Ok(())
    }

    fn clear(&mut self) {
        self.len = 0;
    }
}

/// Dot product of a sparse belief with an alpha-vector.
fn b_dot_alpha(pomdp: &SparsePomdp, belief: usize, alpha: &[f64]) -> f64 {
    pomdp
        .beliefs()
        .support(belief)
        .map(|(state, prob)| prob * alpha[state])
        .sum()
}

/// Value of a belief under a pool: the max dot product, together with the
/// first maximizing vector index. `None` for an empty pool.
fn value_at(pomdp: &SparsePomdp, belief: usize, pool: &AlphaPool) -> Option<(f64, usize)> {
    let mut best: Option<(f64, usize)> = None;
    for index in 0..pool.len {
        let value = b_dot_alpha(pomdp, belief, pool.alpha(index));
        match best {
            Some((best_value, _)) if value <= best_value => {}
            _ => best = Some((value, index)),
        }
    }
    best
}

/// Discounted one-step projection of a pool vector through the dynamics and
/// observation model: `gamma * sum_l O[a, s'_l, o] * T[s, a, l] * alpha[s'_l]`.
fn projected(
    pomdp: &SparsePomdp,
    state: usize,
    action: usize,
    observation: usize,
    alpha: &[f64],
) -> f64 {
    let mut value = 0.0;
    for (next, prob) in pomdp.dynamics().successors(state, action) {
        value += pomdp.observation(action, next, observation) * prob * alpha[next];
    }
    pomdp.dynamics().discount() * value
}

/// One point-based Bellman backup at a belief: returns the best candidate
/// alpha-vector and its action.
///
/// Per action the candidate starts from the immediate-reward column; each
/// observation then contributes the projection of the source-pool vector
/// that maximizes the projected score over the belief support. An empty
/// source pool contributes nothing, leaving pure immediate-reward vectors.
fn backup(pomdp: &SparsePomdp, belief: usize, pool: &AlphaPool) -> (Vec<f64>, usize) {
    let dynamics = pomdp.dynamics();
    let n = dynamics.num_states();

    let mut best_value = f64::NEG_INFINITY;
    let mut best_alpha = vec![0.0_f64; n];
    let mut best_action = 0;
    let mut alpha = vec![0.0_f64; n];

    for action in 0..dynamics.num_actions() {
        for (state, slot) in alpha.iter_mut().enumerate() {
            *slot = dynamics.reward(state, action);
        }

        for observation in 0..pomdp.num_observations() {
            let mut best_index: Option<(f64, usize)> = None;
            for index in 0..pool.len {
                let candidate = pool.alpha(index);
                let mut score = 0.0;
                for (state, prob) in pomdp.beliefs().support(belief) {
                    score += prob * projected(pomdp, state, action, observation, candidate);
                }
                match best_index {
                    Some((best_score, _)) if score <= best_score => {}
                    _ => best_index = Some((score, index)),
                }
            }

            if let Some((_, index)) = best_index {
                let chosen = pool.alpha(index);
                for (state, slot) in alpha.iter_mut().enumerate() {
                    *slot += projected(pomdp, state, action, observation, chosen);
                }
            }
        }

        let value = b_dot_alpha(pomdp, belief, &alpha);
        if value > best_value {
            best_value = value;
            best_alpha.copy_from_slice(&alpha);
            best_action = action;
        }
    }

    (best_alpha, best_action)
}

#[derive(Debug, Clone)]
/// Perseus: randomized point-based value iteration for POMDPs.
///
/// Keeps two bounded alpha-vector pools: `cur` holds the last completed
/// horizon and seeds every backup, `next` collects the vectors of the
/// horizon in progress. A horizon finishes when no belief's value under
/// `next` is below its value under `cur`; the pools then swap.
pub struct Perseus<'a> {
    pomdp: &'a SparsePomdp,
    cur: AlphaPool,
    next: AlphaPool,
    pending: Vec<usize>,
    horizon_step: usize,
    rng: ChaCha8Rng,
}

impl<'a> Perseus<'a> {
    /// Create a planner seeded with an initial alpha-vector array of shape
    /// `[belief count, state count]` and a deterministic RNG seed.
    pub fn new(pomdp: &'a SparsePomdp, initial_gamma: &[f64], seed: u64) -> Result<Self, PlanError> {
        let n = pomdp.dynamics().num_states();
        let r = pomdp.beliefs().len();
        if n == 0 || r == 0 {
            return Err(PlanError::InvalidArgument {
                reason: "model has no states or beliefs",
            });
        }
        if initial_gamma.len() != r * n {
            return Err(PlanError::InvalidArgument {
                reason: "initial alpha-vector array must have belief-count rows",
            });
        }

        Ok(Self {
            pomdp,
            cur: AlphaPool::with_initial(n, r, initial_gamma),
            next: AlphaPool::with_initial(n, r, initial_gamma),
            pending: (0..r).collect(),
            horizon_step: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// One randomized update: back up a sampled pending belief, append the
    /// improving vector (or the old best) to the in-progress pool, and
    /// recompute which beliefs still degraded.
    ///
    /// Returns [`Step::Converged`] when no belief degraded, which closes the
    /// current horizon: the pools swap, the new in-progress pool empties,
    /// and every belief becomes pending again.
    pub fn update(&mut self) -> Result<Step, PlanError> {
        let pick = self.rng.gen_range(0..self.pending.len());
        let belief = self.pending[pick];

        let (alpha, action) = backup(self.pomdp, belief, &self.cur);
        let new_value = b_dot_alpha(self.pomdp, belief, &alpha);

        // Append the backed-up vector if it improves this belief, otherwise
        // carry over the old pool's best vector for it.
        match value_at(self.pomdp, belief, &self.cur) {
            Some((old_value, old_index)) if new_value < old_value => {
                let kept_alpha = self.cur.alpha(old_index).to_vec();
                let kept_action = self.cur.action(old_index);
                self.next.push(&kept_alpha, kept_action)?;
            }
            _ => self.next.push(&alpha, action)?,
        }

        let r = self.pomdp.beliefs().len();
        self.pending.clear();
        for belief in 0..r {
            let old = value_at(self.pomdp, belief, &self.cur).map(|(v, _)| v);
            let new = value_at(self.pomdp, belief, &self.next).map(|(v, _)| v);
            let degraded = match (old, new) {
                (Some(old), Some(new)) => new < old,
                (Some(_), None) => true,
                _ => false,
            };
            if degraded {
                self.pending.push(belief);
            }
        }

        if self.pending.is_empty() {
            self.horizon_step += 1;
            std::mem::swap(&mut self.cur, &mut self.next);
            self.next.clear();
            self.pending.extend(0..r);
            return Ok(Step::Converged);
        }

        Ok(Step::Progress)
    }

    /// Return how many horizons have completed.
    pub fn horizon_step(&self) -> usize {
        self.horizon_step
    }

    /// Return how many beliefs still await improvement this horizon.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Return a freshly allocated policy from the last completed horizon.
    pub fn policy(&self) -> AlphaVectors {
        let n = self.pomdp.dynamics().num_states();
        AlphaVectors::new(
            n,
            self.pomdp.dynamics().num_actions(),
            self.cur.data[..self.cur.len * n].to_vec(),
            self.cur.actions[..self.cur.len].to_vec(),
        )
    }

    /// Run Perseus for the model horizon and return the policy.
    pub fn solve(
        pomdp: &'a SparsePomdp,
        initial_gamma: &[f64],
        seed: u64,
    ) -> Result<AlphaVectors, PlanError> {
        Self::solve_with_hook(pomdp, initial_gamma, seed, |_| {})
    }

    /// Run Perseus for the model horizon, invoking a callback after each
    /// update.
    pub fn solve_with_hook<F>(
        pomdp: &'a SparsePomdp,
        initial_gamma: &[f64],
        seed: u64,
        mut on_update: F,
    ) -> Result<AlphaVectors, PlanError>
    where
        F: FnMut(&PerseusMetrics),
    {
        let mut planner = Self::new(pomdp, initial_gamma, seed)?;
        while planner.horizon_step < pomdp.dynamics().horizon() {
            loop {
                let status = planner.update()?;
                on_update(&PerseusMetrics {
                    horizon_step: planner.horizon_step,
                    pending: planner.pending.len(),
                    pool_len: planner.cur.len.max(planner.next.len),
                });
                if status == Step::Converged {
                    break;
                }
            }
        }
        Ok(planner.policy())
    }
}
