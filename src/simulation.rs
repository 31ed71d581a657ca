//! Monte Carlo estimation of event probabilities.
//!
//! Each estimator runs independent Bernoulli trials from a caller-supplied
//! RNG and reports the empirical frequency, so the closed-form rules in
//! [`crate::rules`] can be checked against simulation.
//!
//! # Reproducibility
//!
//! Use [`create_rng`] with a fixed seed. `SmallRng` is deterministic for a
//! given seed on the same platform.

use rand::Rng;

use crate::discrete::DiscreteDistribution;
use crate::error::{ProbabilityError, Result};
use crate::numeric::{check_probabilities, check_probability, compensated};
use crate::rules::calculate_probability;

/// Creates a fast, seeded random number generator.
///
/// # Examples
/// ```
/// use agri_prob::simulation::create_rng;
/// use rand::Rng;
/// let mut rng = create_rng(42);
/// let x: f64 = rng.random();
/// assert!(x >= 0.0 && x < 1.0);
/// ```
pub fn create_rng(seed: u64) -> rand::rngs::SmallRng {
    use rand::SeedableRng;
    rand::rngs::SmallRng::seed_from_u64(seed)
}

/// Empirical frequency of an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Trials in which the event occurred.
    pub favorable: u64,
    /// Trials that count towards the denominator.
    pub observed: u64,
    /// `favorable / observed`.
    pub probability: f64,
}

impl Estimate {
    fn from_counts(favorable: u64, observed: u64) -> Result<Self> {
        let probability = calculate_probability(favorable as f64, observed as f64)?;
        Ok(Self {
            favorable,
            observed,
            probability,
        })
    }
}

/// Estimates P(A) by running `trials` Bernoulli(`p`) trials.
///
/// # Errors
/// - `p` outside `[0, 1]`
/// - [`ProbabilityError::NoTrials`] if `trials == 0`
///
/// # Examples
/// ```
/// use agri_prob::simulation::{create_rng, estimate_probability};
/// let mut rng = create_rng(7);
/// let est = estimate_probability(0.85, 10_000, &mut rng).unwrap();
/// assert!((est.probability - 0.85).abs() < 0.02);
/// ```
pub fn estimate_probability<R: Rng>(p: f64, trials: u64, rng: &mut R) -> Result<Estimate> {
    check_probability("P(A)", p)?;
    if trials == 0 {
        return Err(ProbabilityError::NoTrials);
    }
    let favorable = (0..trials).filter(|_| rng.random_bool(p)).count() as u64;
    tracing::debug!(p, trials, favorable, "bernoulli estimate");
    Estimate::from_counts(favorable, trials)
}

/// Estimates the probability that at least one of several independent
/// events occurs in a trial.
///
/// Every event is drawn on every trial. With no events the estimate is 0.
pub fn estimate_any_of<R: Rng>(probs: &[f64], trials: u64, rng: &mut R) -> Result<Estimate> {
    check_probabilities("Probability", probs)?;
    if trials == 0 {
        return Err(ProbabilityError::NoTrials);
    }
    let mut favorable = 0_u64;
    for _ in 0..trials {
        // draw all events so the stream consumed per trial is fixed
        let mut any = false;
        for &p in probs {
            any |= rng.random_bool(p);
        }
        if any {
            favorable += 1;
        }
    }
    tracing::debug!(events = probs.len(), trials, favorable, "any-of estimate");
    Estimate::from_counts(favorable, trials)
}

/// Estimates P(A|B) by simulating A, then B conditioned on A.
///
/// Each trial draws A ~ Bernoulli(`p_a`), then B from `p_b_given_a` or
/// `p_b_given_not_a`. The estimate counts A among the trials where B
/// occurred, which is what Bayes' theorem predicts in closed form.
///
/// # Errors
/// - any probability outside `[0, 1]`
/// - [`ProbabilityError::NoTrials`] if `trials == 0`
/// - [`ProbabilityError::ZeroConditioning`] if B never occurred
pub fn estimate_conditional<R: Rng>(
    p_a: f64,
    p_b_given_a: f64,
    p_b_given_not_a: f64,
    trials: u64,
    rng: &mut R,
) -> Result<Estimate> {
    check_probability("P(A)", p_a)?;
    check_probability("P(B|A)", p_b_given_a)?;
    check_probability("P(B|¬A)", p_b_given_not_a)?;
    if trials == 0 {
        return Err(ProbabilityError::NoTrials);
    }

    let mut b_count = 0_u64;
    let mut a_and_b = 0_u64;
    for _ in 0..trials {
        let a = rng.random_bool(p_a);
        let b = rng.random_bool(if a { p_b_given_a } else { p_b_given_not_a });
        if b {
            b_count += 1;
            if a {
                a_and_b += 1;
            }
        }
    }
    tracing::debug!(trials, b_count, a_and_b, "conditional estimate");
    if b_count == 0 {
        return Err(ProbabilityError::ZeroConditioning);
    }
    Estimate::from_counts(a_and_b, b_count)
}

/// Mean of `draws` samples from `distribution`.
///
/// Converges to [`DiscreteDistribution::expected_value`] as `draws` grows.
pub fn sample_mean<R: Rng>(
    distribution: &DiscreteDistribution,
    draws: u64,
    rng: &mut R,
) -> Result<f64> {
    if draws == 0 {
        return Err(ProbabilityError::NoTrials);
    }
    let total = compensated((0..draws).map(|_| distribution.sample(rng)));
    Ok(total / draws as f64)
}

/// Pre-computed weighted sampler for O(log n) repeated sampling.
///
/// Builds a cumulative table from the weights, then binary-searches it for
/// each draw. Non-positive weights are never selected.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedSampler {
    cumulative: Vec<f64>,
    total: f64,
}

impl WeightedSampler {
    /// Returns `None` if `weights` is empty or has no positive weight.
    pub fn new(weights: &[f64]) -> Option<Self> {
        if weights.is_empty() {
            return None;
        }

        let mut cumulative = Vec::with_capacity(weights.len());
        let mut total = 0.0;
        for &w in weights {
            if w > 0.0 {
                total += w;
            }
            cumulative.push(total);
        }

        if total <= 0.0 {
            return None;
        }

        Some(Self { cumulative, total })
    }

    /// Samples an index according to the weights.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        let threshold = rng.random_range(0.0..self.total);
        // first entry strictly above the threshold, so zero-weight
        // entries (equal to their predecessor) are skipped
        let idx = self.cumulative.partition_point(|&c| c <= threshold);
        idx.min(self.cumulative.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.total
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{bayes_theorem, combine_probabilities_or, law_of_total_probability};

    #[test]
    fn test_create_rng_deterministic() {
        let mut rng1 = create_rng(42);
        let mut rng2 = create_rng(42);
        let vals1: Vec<f64> = (0..10).map(|_| rng1.random()).collect();
        let vals2: Vec<f64> = (0..10).map(|_| rng2.random()).collect();
        assert_eq!(vals1, vals2);
    }

    #[test]
    fn test_estimate_probability_converges() {
        let mut rng = create_rng(42);
        let est = estimate_probability(0.15, 50_000, &mut rng).unwrap();
        assert_eq!(est.observed, 50_000);
        assert!((est.probability - 0.15).abs() < 0.01, "got {}", est.probability);
    }

    #[test]
    fn test_estimate_probability_degenerate() {
        let mut rng = create_rng(1);
        assert_eq!(estimate_probability(0.0, 100, &mut rng).unwrap().favorable, 0);
        assert_eq!(estimate_probability(1.0, 100, &mut rng).unwrap().favorable, 100);
    }

    #[test]
    fn test_estimate_probability_errors() {
        let mut rng = create_rng(1);
        assert_eq!(
            estimate_probability(0.5, 0, &mut rng),
            Err(ProbabilityError::NoTrials)
        );
        assert!(estimate_probability(1.5, 10, &mut rng).is_err());
    }

    #[test]
    fn test_estimate_any_of_matches_closed_form() {
        let probs = [0.20, 0.15, 0.10];
        let mut rng = create_rng(42);
        let est = estimate_any_of(&probs, 50_000, &mut rng).unwrap();
        let exact = combine_probabilities_or(&probs).unwrap();
        assert!((est.probability - exact).abs() < 0.01, "got {}", est.probability);
    }

    #[test]
    fn test_estimate_any_of_no_events() {
        let mut rng = create_rng(42);
        let est = estimate_any_of(&[], 100, &mut rng).unwrap();
        assert_eq!(est.probability, 0.0);
    }

    #[test]
    fn test_estimate_conditional_matches_bayes() {
        // Disease base rate 5%, test sensitivity 90%, false positive rate 10%
        let (p_a, sens, fpr) = (0.05, 0.90, 0.10);
        let p_b = law_of_total_probability(&[p_a, 1.0 - p_a], &[sens, fpr]).unwrap();
        let exact = bayes_theorem(sens, p_a, p_b).unwrap();

        let mut rng = create_rng(42);
        let est = estimate_conditional(p_a, sens, fpr, 200_000, &mut rng).unwrap();
        assert!((est.probability - exact).abs() < 0.02, "got {}", est.probability);
    }

    #[test]
    fn test_estimate_conditional_never_observed() {
        let mut rng = create_rng(42);
        assert_eq!(
            estimate_conditional(0.5, 0.0, 0.0, 100, &mut rng),
            Err(ProbabilityError::ZeroConditioning)
        );
    }

    #[test]
    fn test_sample_mean_converges() {
        let dist = DiscreteDistribution::new(vec![50.0, 75.0, 100.0], vec![0.2, 0.5, 0.3]).unwrap();
        let mut rng = create_rng(42);
        let mean = sample_mean(&dist, 50_000, &mut rng).unwrap();
        assert!((mean - 77.5).abs() < 0.5, "got {mean}");
    }

    #[test]
    fn test_sample_mean_point_mass_is_exact() {
        let dist = DiscreteDistribution::new(vec![0.1], vec![1.0]).unwrap();
        let mut rng = create_rng(9);
        assert_eq!(sample_mean(&dist, 1_000, &mut rng), Ok(0.1));
    }

    #[test]
    fn test_sample_mean_no_draws() {
        let dist = DiscreteDistribution::new(vec![1.0], vec![1.0]).unwrap();
        let mut rng = create_rng(42);
        assert_eq!(sample_mean(&dist, 0, &mut rng), Err(ProbabilityError::NoTrials));
    }

    #[test]
    fn test_weighted_sampler_basic() {
        let sampler = WeightedSampler::new(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(sampler.len(), 3);
        assert!(!sampler.is_empty());
        assert!((sampler.total_weight() - 6.0).abs() < 1e-15);
    }

    #[test]
    fn test_weighted_sampler_skips_zero_weights() {
        let sampler = WeightedSampler::new(&[0.0, 1.0, 0.0]).unwrap();
        let mut rng = create_rng(42);
        for _ in 0..100 {
            assert_eq!(sampler.sample(&mut rng), 1);
        }
    }

    #[test]
    fn test_weighted_sampler_distribution() {
        let sampler = WeightedSampler::new(&[1.0, 3.0]).unwrap();
        let mut rng = create_rng(42);
        let mut counts = [0u32; 2];
        for _ in 0..10_000 {
            counts[sampler.sample(&mut rng)] += 1;
        }
        let ratio = counts[1] as f64 / counts[0] as f64;
        assert!((ratio - 3.0).abs() < 0.5, "expected ratio ~3.0, got {ratio}");
    }

    #[test]
    fn test_weighted_sampler_rejects_empty() {
        assert!(WeightedSampler::new(&[]).is_none());
        assert!(WeightedSampler::new(&[0.0, -1.0]).is_none());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn estimate_is_a_probability(
            seed in 0_u64..10_000,
            p in 0.0_f64..=1.0,
            trials in 1_u64..500,
        ) {
            let mut rng = create_rng(seed);
            let est = estimate_probability(p, trials, &mut rng).unwrap();
            prop_assert!(est.favorable <= est.observed);
            prop_assert!((0.0..=1.0).contains(&est.probability));
        }

        #[test]
        fn sampler_returns_positive_weight_index(
            seed in 0_u64..10_000,
            weights in proptest::collection::vec(0.0_f64..10.0, 1..20),
        ) {
            if let Some(sampler) = WeightedSampler::new(&weights) {
                let mut rng = create_rng(seed);
                let idx = sampler.sample(&mut rng);
                prop_assert!(idx < weights.len());
                prop_assert!(weights[idx] > 0.0);
            }
        }
    }
}
