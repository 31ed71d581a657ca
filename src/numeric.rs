//! Numerical helpers shared by the probability rules.
//!
//! Probabilities are accumulated with Neumaier compensated summation so
//! that "sums to one" checks do not drift with the number of terms.

use crate::error::{ProbabilityError, Result};

/// Default absolute tolerance when checking that probabilities sum to 1.
pub const SUM_TOLERANCE: f64 = 1e-6;

/// Relative tolerance term applied by [`is_close`].
pub const RELATIVE_TOLERANCE: f64 = 1e-5;

/// Neumaier compensated summation for O(ε) error independent of `n`.
///
/// Improved Kahan summation that also handles an addend larger in
/// magnitude than the running sum.
///
/// Reference: Neumaier (1974), *ZAMM* 54(1), pp. 39–51.
///
/// # Examples
/// ```
/// use agri_prob::numeric::kahan_sum;
/// let parts = [0.1; 10];
/// assert_eq!(kahan_sum(&parts), 1.0);
/// ```
pub fn kahan_sum(data: &[f64]) -> f64 {
    compensated(data.iter().copied())
}

/// Compensated dot product `Σ xᵢ·yᵢ`.
///
/// Pairs beyond the shorter slice are ignored; callers check lengths.
pub fn compensated_dot(xs: &[f64], ys: &[f64]) -> f64 {
    compensated(xs.iter().zip(ys).map(|(x, y)| x * y))
}

/// Compensated sum of a stream of terms, without buffering them.
pub fn compensated(terms: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0_f64;
    let mut c = 0.0_f64;
    for x in terms {
        let t = sum + x;
        if sum.abs() >= x.abs() {
            c += (sum - t) + x;
        } else {
            c += (x - t) + sum;
        }
        sum = t;
    }
    sum + c
}

/// Returns true if `|a − b| ≤ atol + RELATIVE_TOLERANCE·|b|`.
///
/// Same contract as NumPy's `isclose` with its default relative term.
pub fn is_close(a: f64, b: f64, atol: f64) -> bool {
    (a - b).abs() <= atol + RELATIVE_TOLERANCE * b.abs()
}

/// Validates that `value` is a probability in `[0, 1]`.
///
/// NaN is rejected.
pub fn check_probability(name: &str, value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ProbabilityError::out_of_range(name, value))
    }
}

/// Validates every element of `values`, labelling failures `"{label} {i}"`.
pub fn check_probabilities(label: &str, values: &[f64]) -> Result<()> {
    for (i, &p) in values.iter().enumerate() {
        check_probability(&format!("{label} {i}"), p)?;
    }
    Ok(())
}

/// Checks that `values` sum to one within `tolerance`.
pub(crate) fn check_normalized(name: &'static str, values: &[f64], tolerance: f64) -> Result<f64> {
    let sum = kahan_sum(values);
    if is_close(sum, 1.0, tolerance) {
        Ok(sum)
    } else {
        Err(ProbabilityError::NotNormalized { name, sum })
    }
}
