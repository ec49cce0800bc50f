mod planner;

pub use planner::belief::{belief_update, observation_probability};
pub use planner::error::{PlanError, Step};
pub use planner::expand::{expand_random, DenseBeliefs, ExpandConfig};
pub use planner::lao_star::{LaoStar, LaoStarMetrics};
pub use planner::perseus::{Perseus, PerseusMetrics};
pub use planner::policy::{AlphaVectors, ValueFunction};
pub use planner::value_iteration::{SweepMetrics, ValueIteration};
