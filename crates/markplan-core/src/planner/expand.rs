use markplan_model::SparsePomdp;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::planner::{
    belief::{belief_update, observation_probability},
    error::PlanError,
};

/// Give up after this many consecutive non-empty trajectories that died
/// before recording a single belief.
const MAX_DRY_TRAJECTORIES: usize = 10_000;

/// Configuration for random-trajectory belief expansion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpandConfig {
    /// How many new beliefs to collect.
    pub num_beliefs: usize,
    /// Seed for the trajectory RNG.
    pub seed: u64,
}

impl Default for ExpandConfig {
    fn default() -> Self {
        ExpandConfig {
            num_beliefs: 64,
            seed: 0,
        }
    }
}

impl ExpandConfig {
    fn validate(&self) -> Result<(), PlanError> {
        if self.num_beliefs == 0 {
            return Err(PlanError::InvalidArgument {
                reason: "num_beliefs must be greater than 0",
            });
        }
        Ok(())
    }
}

/// A batch of dense beliefs produced by expansion, together with the widest
/// support seen. Convert back to the sparse form with
/// `BeliefSet::from_dense` when growing a model's belief set.
#[derive(Debug, Clone)]
pub struct DenseBeliefs {
    len: usize,
    num_states: usize,
    data: Vec<f64>,
    max_support: usize,
}

impl DenseBeliefs {
    /// Return how many beliefs were collected.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Return the state count each belief ranges over.
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Return the widest support observed across the batch.
    pub fn max_support(&self) -> usize {
        self.max_support
    }

    /// Borrow one dense belief row.
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        if index >= self.len {
            return None;
        }
        let base = index * self.num_states;
        Some(&self.data[base..base + self.num_states])
    }

    /// Borrow the whole row-major batch.
    pub fn data(&self) -> &[f64] {
        &self.data
    }
}

/// Grow the belief set by simulating random trajectories.
///
/// Each trajectory restarts from the model's first belief, runs for a
/// uniformly drawn number of steps up to the model horizon, picks a uniform
/// action per step, samples an observation by inverse CDF over
/// `Pr(o | b, a)`, and records the updated belief. A step whose sampled
/// observation has zero posterior mass abandons the trajectory; a long run
/// of trajectories that all die this way surfaces the underlying error.
pub fn expand_random(
    pomdp: &SparsePomdp,
    config: &ExpandConfig,
) -> Result<DenseBeliefs, PlanError> {
    config.validate()?;

    let dynamics = pomdp.dynamics();
    let n = dynamics.num_states();
    let num_actions = dynamics.num_actions();
    let num_observations = pomdp.num_observations();
    let horizon = dynamics.horizon();

    let initial = pomdp.beliefs().dense(0).ok_or(PlanError::InvalidArgument {
        reason: "model has no beliefs",
    })?;

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut data = vec![0.0_f64; config.num_beliefs * n];
    let mut collected = 0;
    let mut max_support = 0;
    let mut dry_trajectories = 0;
    let mut last_degenerate: Option<PlanError> = None;

    while collected < config.num_beliefs {
        // Trajectory lengths are randomized so domains that drift away from
        // parts of the simplex still contribute beliefs from many depths.
        let steps = rng.gen_range(0..=horizon);
        let mut belief = initial.clone();
        let before = collected;

        for _ in 0..steps {
            let action = rng.gen_range(0..num_actions);
            let target: f64 = rng.gen();

            let mut accumulated = 0.0;
            let mut chosen = None;
            for observation in 0..num_observations {
                accumulated += observation_probability(pomdp, &belief, action, observation)?;
                if accumulated >= target {
                    chosen = Some(observation);
                    break;
                }
            }
            let Some(observation) = chosen else {
                break;
            };

            match belief_update(pomdp, &belief, action, observation) {
                Ok(updated) => belief = updated,
                Err(err @ PlanError::DegenerateBelief { .. }) => {
                    last_degenerate = Some(err);
                    break;
                }
                Err(err) => return Err(err),
            }

            let support = belief.iter().filter(|&&p| p > 0.0).count();
            if support > max_support {
                max_support = support;
            }

            data[collected * n..(collected + 1) * n].copy_from_slice(&belief);
            collected += 1;
            if collected == config.num_beliefs {
                break;
            }
        }

        if collected == before && steps > 0 {
            dry_trajectories += 1;
            if dry_trajectories > MAX_DRY_TRAJECTORIES {
                return Err(last_degenerate.unwrap_or(PlanError::InvalidArgument {
                    reason: "belief expansion made no progress",
                }));
            }
        } else if collected > before {
            dry_trajectories = 0;
        }
    }

    Ok(DenseBeliefs {
        len: collected,
        num_states: n,
        data,
        max_support,
    })
}
