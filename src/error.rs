//! Error types.
//!
//! Each module family has its own error enum so callers can match on the
//! failures that are actually reachable from the call they made.

use thiserror::Error;

/// Errors raised by the probability rules and by anything that validates
/// probabilities on their way in.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbabilityError {
    #[error("{name} must be in [0,1], got {value}")]
    OutOfRange { name: String, value: f64 },

    #[error("total outcomes must be positive, got {0}")]
    NonPositiveTotal(f64),

    #[error("favorable outcomes cannot be negative, got {0}")]
    NegativeCount(f64),

    #[error("favorable outcomes ({favorable}) cannot exceed total outcomes ({total})")]
    CountExceedsTotal { favorable: f64, total: f64 },

    #[error("{joint} = {value} cannot exceed {bound_name} = {bound}")]
    IntersectionExceedsMarginal {
        joint: &'static str,
        value: f64,
        bound_name: &'static str,
        bound: f64,
    },

    #[error("invalid probabilities: {name} = {value:.4} exceeds 1.0")]
    ExceedsOne { name: &'static str, value: f64 },

    #[error("cannot condition on an impossible event: P(B) = 0")]
    ZeroConditioning,

    #[error("{left} ({left_len}) and {right} ({right_len}) must have same length")]
    LengthMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    #[error("{name} must sum to 1.0, got {sum:.6}")]
    NotNormalized { name: &'static str, sum: f64 },

    #[error("all values must be non-negative, got {0}")]
    NegativeWeight(f64),

    #[error("all values must be finite, got {0}")]
    NonFiniteWeight(f64),

    #[error("cannot normalize: sum of values is 0")]
    ZeroTotal,

    #[error("distribution needs at least one outcome")]
    Empty,

    #[error("outcome {index} must be finite, got {value}")]
    NonFiniteOutcome { index: usize, value: f64 },

    #[error("simulation needs at least one trial")]
    NoTrials,
}

impl ProbabilityError {
    pub(crate) fn out_of_range(name: impl Into<String>, value: f64) -> Self {
        ProbabilityError::OutOfRange {
            name: name.into(),
            value,
        }
    }
}

/// Errors raised while loading or querying an agricultural dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("row {row}, column '{column}': '{value}' is not a number or a missing marker")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: '{value}' is not an ISO date (YYYY-MM-DD)")]
    InvalidDate { row: usize, value: String },

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("dataset has no date column")]
    NoDateColumn,

    #[error("no observed values for '{0}'")]
    NoObservations(String),

    #[error("invalid event '{0}': expected >x, >=x, <x, <=x or lo..hi")]
    InvalidThreshold(String),

    #[error(transparent)]
    Probability(#[from] ProbabilityError),
}

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

pub type Result<T> = std::result::Result<T, ProbabilityError>;
