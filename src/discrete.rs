//! Discrete probability distributions over a finite set of outcomes.
//!
//! A [`DiscreteDistribution`] is a validated probability mass function:
//! outcomes are finite, probabilities lie in `[0, 1]` and sum to one.
//! Once constructed, every query is infallible.
//!
//! # Example
//!
//! Yield in bushels/acre across three seasons of varying quality:
//!
//! ```
//! use agri_prob::discrete::DiscreteDistribution;
//! let yields = DiscreteDistribution::new(
//!     vec![50.0, 75.0, 100.0],
//!     vec![0.20, 0.50, 0.30],
//! ).unwrap();
//! assert!((yields.expected_value() - 77.5).abs() < 1e-9);
//! assert!((yields.cdf(75.0) - 0.70).abs() < 1e-12);
//! ```

use rand::Rng;

use crate::error::{ProbabilityError, Result};
use crate::numeric::{compensated_dot, kahan_sum, SUM_TOLERANCE};
use crate::rules::{normalize_probabilities, validate_pmf};
use crate::simulation::WeightedSampler;

/// Finite probability mass function.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteDistribution {
    outcomes: Vec<f64>,
    probabilities: Vec<f64>,
    sampler: WeightedSampler,
}

impl DiscreteDistribution {
    /// Creates a distribution from parallel outcome/probability vectors.
    ///
    /// # Errors
    /// - [`ProbabilityError::Empty`] if there are no outcomes
    /// - [`ProbabilityError::NonFiniteOutcome`] for NaN or infinite outcomes
    /// - length mismatch, out-of-range probabilities, or a sum other than 1
    pub fn new(outcomes: Vec<f64>, probabilities: Vec<f64>) -> Result<Self> {
        Self::with_tolerance(outcomes, probabilities, SUM_TOLERANCE)
    }

    /// Like [`new`](Self::new) with an explicit probability-sum tolerance.
    pub fn with_tolerance(
        outcomes: Vec<f64>,
        probabilities: Vec<f64>,
        tolerance: f64,
    ) -> Result<Self> {
        if outcomes.is_empty() {
            return Err(ProbabilityError::Empty);
        }
        if let Some((index, &value)) = outcomes.iter().enumerate().find(|(_, x)| !x.is_finite()) {
            return Err(ProbabilityError::NonFiniteOutcome { index, value });
        }
        validate_pmf(&outcomes, &probabilities, tolerance)?;
        let sampler = WeightedSampler::new(&probabilities).ok_or(ProbabilityError::ZeroTotal)?;
        Ok(Self {
            outcomes,
            probabilities,
            sampler,
        })
    }

    /// Creates a distribution from observed counts, e.g. a historical
    /// frequency table of yields.
    ///
    /// # Examples
    /// ```
    /// use agri_prob::discrete::DiscreteDistribution;
    /// // Seasons observed at each rainfall band
    /// let rain = DiscreteDistribution::from_frequencies(
    ///     vec![1.0, 2.0, 3.0, 4.0],
    ///     &[45.0, 30.0, 20.0, 5.0],
    /// ).unwrap();
    /// assert_eq!(rain.probabilities(), &[0.45, 0.3, 0.2, 0.05]);
    /// ```
    pub fn from_frequencies(outcomes: Vec<f64>, counts: &[f64]) -> Result<Self> {
        let probabilities = normalize_probabilities(counts)?;
        Self::new(outcomes, probabilities)
    }

    pub fn outcomes(&self) -> &[f64] {
        &self.outcomes
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Always false: construction rejects empty input.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// E[X] = Σ xᵢ·pᵢ
    pub fn expected_value(&self) -> f64 {
        compensated_dot(&self.outcomes, &self.probabilities)
    }

    /// Var(X) = Σ pᵢ·(xᵢ − μ)²
    ///
    /// Computed around the mean rather than as E[X²] − μ² to avoid
    /// cancellation when outcomes are large relative to their spread.
    pub fn variance(&self) -> f64 {
        let mu = self.expected_value();
        let terms: Vec<f64> = self
            .outcomes
            .iter()
            .zip(&self.probabilities)
            .map(|(x, p)| {
                let d = x - mu;
                p * d * d
            })
            .collect();
        kahan_sum(&terms)
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Total probability of the outcomes satisfying `event`.
    ///
    /// # Examples
    /// ```
    /// use agri_prob::discrete::DiscreteDistribution;
    /// let profit = DiscreteDistribution::new(
    ///     vec![-100.0, 200.0, 500.0],
    ///     vec![0.10, 0.60, 0.30],
    /// ).unwrap();
    /// let p_loss = profit.probability_of(|x| x < 0.0);
    /// assert!((p_loss - 0.10).abs() < 1e-12);
    /// ```
    pub fn probability_of<F: Fn(f64) -> bool>(&self, event: F) -> f64 {
        let selected: Vec<f64> = self
            .outcomes
            .iter()
            .zip(&self.probabilities)
            .filter(|(x, _)| event(**x))
            .map(|(_, p)| *p)
            .collect();
        kahan_sum(&selected).min(1.0)
    }

    /// P(X ≤ x)
    pub fn cdf(&self, x: f64) -> f64 {
        self.probability_of(|o| o <= x)
    }

    /// Draws one outcome.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        self.outcomes[self.sampler.sample(rng)]
    }
}
