//! Core probability rules.
//!
//! Every function validates its inputs and returns a
//! [`ProbabilityError`] naming the offending quantity by its formula
//! symbol (`P(A)`, `P(A∩B)`, `P(B|A)`, ...). NaN never passes validation.
//!
//! | Rule | Formula |
//! |---|---|
//! | [`calculate_probability`] | P(A) = favorable / total |
//! | [`addition_rule`] | P(A∪B) = P(A) + P(B) − P(A∩B) |
//! | [`multiplication_rule`] | P(A∩B) = P(A)·P(B) or P(A)·P(B\|A) |
//! | [`complement_probability`] | P(¬A) = 1 − P(A) |
//! | [`conditional_probability`] | P(A\|B) = P(A∩B) / P(B) |
//! | [`bayes_theorem`] | P(A\|B) = P(B\|A)·P(A) / P(B) |
//! | [`law_of_total_probability`] | P(A) = Σ P(A\|Bᵢ)·P(Bᵢ) |
//! | [`test_independence`] | P(A∩B) ≈ P(A)·P(B) |
//! | [`calculate_expected_value`] | E[X] = Σ xᵢ·P(xᵢ) |
//! | [`combine_probabilities_or`] | P(∪Aᵢ) = 1 − Π(1 − P(Aᵢ)) |

use crate::error::{ProbabilityError, Result};
use crate::numeric::{
    check_normalized, check_probabilities, check_probability, compensated_dot, kahan_sum,
    SUM_TOLERANCE,
};

/// Slack allowed above 1.0 in [`bayes_theorem`] before inputs are rejected
/// as inconsistent. Results inside the slack are capped to 1.0.
pub const BAYES_SLACK: f64 = 1e-4;

/// Default tolerance for [`test_independence`].
pub const INDEPENDENCE_TOLERANCE: f64 = 1e-6;

/// Relationship between A and B for [`multiplication_rule`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dependence {
    /// A and B are independent; `p_b` is P(B).
    Independent { p_b: f64 },
    /// B depends on A; `p_b_given_a` is P(B|A).
    Dependent { p_b_given_a: f64 },
}

/// Basic probability: `favorable / total`.
///
/// # Errors
/// - [`ProbabilityError::NonPositiveTotal`] if `total <= 0`
/// - [`ProbabilityError::NegativeCount`] if `favorable < 0`
/// - [`ProbabilityError::CountExceedsTotal`] if `favorable > total`
///
/// # Examples
/// ```
/// use agri_prob::rules::calculate_probability;
/// // 85 of 100 seeds germinated
/// assert_eq!(calculate_probability(85.0, 100.0).unwrap(), 0.85);
/// // 12 of 80 fields showed blight
/// assert_eq!(calculate_probability(12.0, 80.0).unwrap(), 0.15);
/// ```
pub fn calculate_probability(favorable: f64, total: f64) -> Result<f64> {
    if total.is_nan() || total <= 0.0 {
        return Err(ProbabilityError::NonPositiveTotal(total));
    }
    if favorable.is_nan() || favorable < 0.0 {
        return Err(ProbabilityError::NegativeCount(favorable));
    }
    if favorable > total {
        return Err(ProbabilityError::CountExceedsTotal { favorable, total });
    }
    Ok(favorable / total)
}

/// Addition rule: `P(A∪B) = P(A) + P(B) − P(A∩B)`.
///
/// Pass `p_a_and_b = 0.0` for mutually exclusive events, or use
/// [`mutually_exclusive_union`].
///
/// # Errors
/// - any input outside `[0, 1]`
/// - `P(A∩B) > min(P(A), P(B))`
/// - a union above 1, which means the inputs are inconsistent
///
/// # Examples
/// ```
/// use agri_prob::rules::addition_rule;
/// // Disease and pests can co-occur
/// let p = addition_rule(0.25, 0.30, 0.10).unwrap();
/// assert!((p - 0.45).abs() < 1e-12);
/// ```
pub fn addition_rule(p_a: f64, p_b: f64, p_a_and_b: f64) -> Result<f64> {
    check_probability("P(A)", p_a)?;
    check_probability("P(B)", p_b)?;
    check_probability("P(A∩B)", p_a_and_b)?;

    let bound = p_a.min(p_b);
    if p_a_and_b > bound {
        return Err(ProbabilityError::IntersectionExceedsMarginal {
            joint: "P(A∩B)",
            value: p_a_and_b,
            bound_name: "min(P(A), P(B))",
            bound,
        });
    }

    let union = p_a + p_b - p_a_and_b;
    if union > 1.0 {
        return Err(ProbabilityError::ExceedsOne {
            name: "P(A∪B)",
            value: union,
        });
    }
    Ok(union)
}

/// `P(A∪B) = P(A) + P(B)` for events that cannot co-occur.
///
/// # Examples
/// ```
/// use agri_prob::rules::mutually_exclusive_union;
/// // A day is either sunny or rainy, never both
/// let p = mutually_exclusive_union(0.40, 0.20).unwrap();
/// assert!((p - 0.6).abs() < 1e-12);
/// ```
pub fn mutually_exclusive_union(p_a: f64, p_b: f64) -> Result<f64> {
    addition_rule(p_a, p_b, 0.0)
}

/// Multiplication rule: `P(A∩B)`.
///
/// # Examples
/// ```
/// use agri_prob::rules::{multiplication_rule, Dependence};
/// // Frost in two separate fields
/// let both = multiplication_rule(0.15, Dependence::Independent { p_b: 0.15 }).unwrap();
/// assert!((both - 0.0225).abs() < 1e-12);
///
/// // A field gets infected, then the infection spreads
/// let spread = multiplication_rule(0.30, Dependence::Dependent { p_b_given_a: 0.70 }).unwrap();
/// assert!((spread - 0.21).abs() < 1e-12);
/// ```
pub fn multiplication_rule(p_a: f64, dependence: Dependence) -> Result<f64> {
    check_probability("P(A)", p_a)?;
    match dependence {
        Dependence::Independent { p_b } => {
            check_probability("P(B)", p_b)?;
            Ok(p_a * p_b)
        }
        Dependence::Dependent { p_b_given_a } => {
            check_probability("P(B|A)", p_b_given_a)?;
            Ok(p_a * p_b_given_a)
        }
    }
}

/// Complement rule: `P(¬A) = 1 − P(A)`.
///
/// # Examples
/// ```
/// use agri_prob::rules::complement_probability;
/// // 15% crop failure rate
/// assert!((complement_probability(0.15).unwrap() - 0.85).abs() < 1e-12);
/// ```
pub fn complement_probability(p_a: f64) -> Result<f64> {
    check_probability("P(A)", p_a)?;
    Ok(1.0 - p_a)
}

/// Conditional probability: `P(A|B) = P(A∩B) / P(B)`.
///
/// # Errors
/// - any input outside `[0, 1]`
/// - `P(B) = 0`
/// - `P(A∩B) > P(B)`
///
/// # Examples
/// ```
/// use agri_prob::rules::conditional_probability;
/// // P(Disease | Symptoms)
/// let p = conditional_probability(0.12, 0.30).unwrap();
/// assert!((p - 0.4).abs() < 1e-12);
/// ```
pub fn conditional_probability(p_a_and_b: f64, p_b: f64) -> Result<f64> {
    check_probability("P(A∩B)", p_a_and_b)?;
    check_probability("P(B)", p_b)?;

    if p_b == 0.0 {
        return Err(ProbabilityError::ZeroConditioning);
    }
    if p_a_and_b > p_b {
        return Err(ProbabilityError::IntersectionExceedsMarginal {
            joint: "P(A∩B)",
            value: p_a_and_b,
            bound_name: "P(B)",
            bound: p_b,
        });
    }
    Ok(p_a_and_b / p_b)
}

/// Bayes' theorem: `P(A|B) = P(B|A)·P(A) / P(B)`.
///
/// Results slightly above 1 (within [`BAYES_SLACK`]) are treated as
/// rounding noise and capped to 1.0.
///
/// # Errors
/// - any input outside `[0, 1]`
/// - `P(B) = 0`
/// - posterior above `1 + BAYES_SLACK`
///
/// # Examples
/// ```
/// use agri_prob::rules::bayes_theorem;
/// // 90% sensitive test, 5% base rate, 14% of tests come back positive
/// let posterior = bayes_theorem(0.90, 0.05, 0.14).unwrap();
/// assert!((posterior - 0.3214285714).abs() < 1e-9);
/// ```
pub fn bayes_theorem(p_b_given_a: f64, p_a: f64, p_b: f64) -> Result<f64> {
    check_probability("P(B|A)", p_b_given_a)?;
    check_probability("P(A)", p_a)?;
    check_probability("P(B)", p_b)?;

    if p_b == 0.0 {
        return Err(ProbabilityError::ZeroConditioning);
    }

    let posterior = p_b_given_a * p_a / p_b;
    if posterior > 1.0 + BAYES_SLACK {
        return Err(ProbabilityError::ExceedsOne {
            name: "P(A|B)",
            value: posterior,
        });
    }
    if posterior > 1.0 {
        tracing::warn!(posterior, "capping Bayes posterior to 1.0");
    }
    Ok(posterior.min(1.0))
}

/// Law of total probability: `P(A) = Σ P(A|Bᵢ)·P(Bᵢ)`.
///
/// The partition probabilities must sum to 1 within
/// [`SUM_TOLERANCE`](crate::numeric::SUM_TOLERANCE).
///
/// # Examples
/// ```
/// use agri_prob::rules::law_of_total_probability;
/// // Soil: 30% clay, 50% loam, 20% sandy; high-yield rate per soil type
/// let p = law_of_total_probability(&[0.30, 0.50, 0.20], &[0.60, 0.80, 0.50]).unwrap();
/// assert!((p - 0.68).abs() < 1e-12);
/// ```
pub fn law_of_total_probability(partitions: &[f64], conditionals: &[f64]) -> Result<f64> {
    law_of_total_probability_within(partitions, conditionals, SUM_TOLERANCE)
}

/// [`law_of_total_probability`] with an explicit partition-sum tolerance.
pub fn law_of_total_probability_within(
    partitions: &[f64],
    conditionals: &[f64],
    tolerance: f64,
) -> Result<f64> {
    if partitions.len() != conditionals.len() {
        return Err(ProbabilityError::LengthMismatch {
            left: "Partitions",
            left_len: partitions.len(),
            right: "conditional probabilities",
            right_len: conditionals.len(),
        });
    }
    check_probabilities("Partition probability", partitions)?;
    check_probabilities("Conditional probability", conditionals)?;
    check_normalized("Partitions", partitions, tolerance)?;

    Ok(compensated_dot(partitions, conditionals))
}

/// Tests whether A and B are independent: `|P(A∩B) − P(A)·P(B)| < tolerance`.
///
/// # Examples
/// ```
/// use agri_prob::rules::{test_independence, INDEPENDENCE_TOLERANCE};
/// // Frost in two separate fields
/// assert!(test_independence(0.15, 0.15, 0.0225, INDEPENDENCE_TOLERANCE).unwrap());
/// // Disease and symptoms move together
/// assert!(!test_independence(0.10, 0.25, 0.08, INDEPENDENCE_TOLERANCE).unwrap());
/// ```
pub fn test_independence(p_a: f64, p_b: f64, p_a_and_b: f64, tolerance: f64) -> Result<bool> {
    check_probability("P(A)", p_a)?;
    check_probability("P(B)", p_b)?;
    check_probability("P(A∩B)", p_a_and_b)?;

    Ok((p_a_and_b - p_a * p_b).abs() < tolerance)
}

/// Expected value of a discrete random variable: `E[X] = Σ xᵢ·P(xᵢ)`.
///
/// # Examples
/// ```
/// use agri_prob::rules::calculate_expected_value;
/// // Profit in dollars: loss, modest season, good season
/// let ev = calculate_expected_value(&[-100.0, 200.0, 500.0], &[0.10, 0.60, 0.30]).unwrap();
/// assert!((ev - 260.0).abs() < 1e-9);
/// ```
pub fn calculate_expected_value(outcomes: &[f64], probabilities: &[f64]) -> Result<f64> {
    calculate_expected_value_within(outcomes, probabilities, SUM_TOLERANCE)
}

/// [`calculate_expected_value`] with an explicit probability-sum tolerance.
pub fn calculate_expected_value_within(
    outcomes: &[f64],
    probabilities: &[f64],
    tolerance: f64,
) -> Result<f64> {
    validate_pmf(outcomes, probabilities, tolerance)?;
    Ok(compensated_dot(outcomes, probabilities))
}

/// Validates a probability mass function given as parallel slices.
pub(crate) fn validate_pmf(outcomes: &[f64], probabilities: &[f64], tolerance: f64) -> Result<()> {
    if outcomes.len() != probabilities.len() {
        return Err(ProbabilityError::LengthMismatch {
            left: "Outcomes",
            left_len: outcomes.len(),
            right: "probabilities",
            right_len: probabilities.len(),
        });
    }
    check_probabilities("Probability", probabilities)?;
    check_normalized("Probabilities", probabilities, tolerance)?;
    Ok(())
}

/// Scales non-negative values so they sum to 1.
///
/// # Examples
/// ```
/// use agri_prob::rules::normalize_probabilities;
/// // Historical frequency counts
/// let p = normalize_probabilities(&[45.0, 30.0, 20.0, 5.0]).unwrap();
/// assert_eq!(p, vec![0.45, 0.3, 0.2, 0.05]);
/// ```
pub fn normalize_probabilities(values: &[f64]) -> Result<Vec<f64>> {
    if let Some(&bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(ProbabilityError::NonFiniteWeight(bad));
    }
    if let Some(&negative) = values.iter().find(|v| **v < 0.0) {
        return Err(ProbabilityError::NegativeWeight(negative));
    }
    let total = kahan_sum(values);
    if total == 0.0 {
        return Err(ProbabilityError::ZeroTotal);
    }
    Ok(values.iter().map(|v| v / total).collect())
}

/// Probability that at least one of several independent events occurs:
/// `1 − Π(1 − P(Aᵢ))`.
///
/// An empty slice yields 0.
///
/// # Examples
/// ```
/// use agri_prob::rules::combine_probabilities_or;
/// // Frost, drought, flood
/// let p = combine_probabilities_or(&[0.20, 0.15, 0.10]).unwrap();
/// assert!((p - 0.388).abs() < 1e-12);
/// ```
pub fn combine_probabilities_or(probs: &[f64]) -> Result<f64> {
    check_probabilities("Probability", probs)?;
    let p_none: f64 = probs.iter().map(|p| 1.0 - p).product();
    Ok(1.0 - p_none)
}

// ============================================================================
// Tests
// ============================================================================
