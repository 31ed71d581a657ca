//! # agri-prob
//!
//! Probability rules implemented from first principles, with agricultural
//! worked examples: germination rates, crop disease diagnosis, soil-type
//! partitions, weather risk.
//!
//! ## Modules
//!
//! - [`rules`] — addition, multiplication, complement, conditional, Bayes,
//!   total probability, independence, expected value
//! - [`discrete`] — validated discrete distributions (yield, profit tables)
//! - [`simulation`] — seeded Monte Carlo checks of the closed-form rules
//! - [`dataset`] — field CSV loading and empirical event probabilities
//! - [`config`] — TOML configuration for tolerances and dataset conventions
//!
//! ## Design Philosophy
//!
//! - **Validate at the boundary**: every probability is checked to lie in
//!   `[0, 1]` and errors name the offending quantity (`P(A∩B)`, `P(B|A)`)
//! - **Compensated summation** for every "sums to one" check
//! - **Property-based testing**: probability axioms verified via proptest

pub mod config;
pub mod dataset;
pub mod discrete;
pub mod error;
pub mod logging;
pub mod numeric;
pub mod rules;
pub mod simulation;

pub use config::Config;
pub use dataset::{FieldDataset, Threshold};
pub use discrete::DiscreteDistribution;
pub use error::{ConfigError, DatasetError, ProbabilityError};
pub use rules::Dependence;
