use thiserror::Error;

#[derive(Debug, Error)]
/// Error type for model validation, construction, schema, and YAML IO.
pub enum ModelError {
    #[error("failed to read YAML file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("model must have at least one {what}")]
    EmptyDimension { what: &'static str },

    #[error("model has too many states for sparse indexing: {states}")]
    TooManyStates { states: usize },

    #[error("discount factor must lie in [0, 1], got {value}")]
    InvalidDiscount { value: f64 },

    #[error("horizon must be at least 1")]
    InvalidHorizon,

    #[error("convergence threshold must be positive and finite, got {value}")]
    InvalidEpsilon { value: f64 },

    #[error("{array} must have length {expected}, got {actual}")]
    ArrayLength {
        array: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{array} row {row} references state {value} outside [0, {states})")]
    IndexOutOfRange {
        array: &'static str,
        row: usize,
        value: i64,
        states: usize,
    },

    #[error("invalid probability {value} in {array} row {row}")]
    InvalidProbability {
        array: &'static str,
        row: usize,
        value: f64,
    },

    #[error("probabilities in {array} row {row} must sum to 1.0 within {tolerance}, got {sum}")]
    ProbabilitySum {
        array: &'static str,
        row: usize,
        sum: f64,
        tolerance: f64,
    },

    #[error("belief {row} has no support")]
    EmptyBelief { row: usize },

    #[error("belief set is over {expected} states but the model has {actual}")]
    BeliefStateMismatch { expected: usize, actual: usize },

    #[error("duplicate state id '{id}'")]
    DuplicateStateId { id: String },

    #[error("duplicate action id '{action}' in state '{state}'")]
    DuplicateActionId { state: String, action: String },

    #[error("state '{state}' declares {actual} actions but the model has {expected}")]
    ActionCountMismatch {
        state: String,
        expected: usize,
        actual: usize,
    },

    #[error("outcome in state '{state}', action '{action}' references unknown next state '{next}'")]
    UnknownNextState {
        state: String,
        action: String,
        next: String,
    },

    #[error("builder referenced state {state} outside [0, {states})")]
    BuilderStateRange { state: usize, states: usize },

    #[error("builder referenced action {action} outside [0, {actions})")]
    BuilderActionRange { action: usize, actions: usize },

    #[error("builder referenced observation {observation} outside [0, {observations})")]
    BuilderObservationRange {
        observation: usize,
        observations: usize,
    },
}
