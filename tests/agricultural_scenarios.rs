//! End-to-end scenarios chaining several rules, the way a field agronomist
//! would reason through them.

use agri_prob::rules::{
    bayes_theorem, calculate_probability, combine_probabilities_or, complement_probability,
    conditional_probability, law_of_total_probability, multiplication_rule, test_independence,
    Dependence, INDEPENDENCE_TOLERANCE,
};
use agri_prob::simulation::{create_rng, estimate_conditional, sample_mean};
use agri_prob::{DiscreteDistribution, ProbabilityError};

#[test]
fn blight_test_posterior_from_field_survey() {
    // 5% of fields carry blight; the leaf test flags 90% of infected fields
    // and 10% of healthy ones.
    let prior = 0.05;
    let sensitivity = 0.90;
    let false_positive = 0.10;

    let p_positive =
        law_of_total_probability(&[prior, 1.0 - prior], &[sensitivity, false_positive]).unwrap();
    assert!((p_positive - 0.14).abs() < 1e-12);

    let posterior = bayes_theorem(sensitivity, prior, p_positive).unwrap();
    let joint = multiplication_rule(prior, Dependence::Dependent { p_b_given_a: sensitivity })
        .unwrap();
    let by_definition = conditional_probability(joint, p_positive).unwrap();
    assert!((posterior - by_definition).abs() < 1e-12);
    assert!((posterior - 0.321_428_571_4).abs() < 1e-9);

    let mut rng = create_rng(2024);
    let simulated = estimate_conditional(prior, sensitivity, false_positive, 200_000, &mut rng)
        .unwrap();
    assert!((simulated.probability - posterior).abs() < 0.02);
}

#[test]
fn seed_lot_germination() {
    // 85 of 100 seeds germinated in the trial tray.
    let p_germ = calculate_probability(85.0, 100.0).unwrap();
    let p_fail = complement_probability(p_germ).unwrap();

    // Three seeds per hole: the hole is empty only if all three fail.
    let p_all_fail = p_fail.powi(3);
    let p_stand = combine_probabilities_or(&[p_germ; 3]).unwrap();
    assert!((p_stand - (1.0 - p_all_fail)).abs() < 1e-12);
    assert!(p_stand > 0.996);
}

#[test]
fn frost_in_neighbouring_fields() {
    let p_frost = 0.15;
    let both = multiplication_rule(p_frost, Dependence::Independent { p_b: p_frost }).unwrap();
    assert!(test_independence(p_frost, p_frost, both, INDEPENDENCE_TOLERANCE).unwrap());

    // Observed joint frost rate well above the product: fields share a
    // cold-air pocket.
    assert!(!test_independence(p_frost, p_frost, 0.10, INDEPENDENCE_TOLERANCE).unwrap());
}

#[test]
fn yield_distribution_summary() {
    let yields =
        DiscreteDistribution::new(vec![50.0, 75.0, 100.0], vec![0.20, 0.50, 0.30]).unwrap();
    assert!((yields.expected_value() - 77.5).abs() < 1e-9);
    assert!((yields.probability_of(|y| y >= 75.0) - 0.80).abs() < 1e-12);

    let mut rng = create_rng(7);
    let mean = sample_mean(&yields, 40_000, &mut rng).unwrap();
    assert!((mean - yields.expected_value()).abs() < 0.5);
}

#[test]
fn inconsistent_survey_numbers_are_rejected() {
    // A survey claiming 40% of fields are diseased AND symptomatic while
    // only 30% are symptomatic cannot be right.
    let err = conditional_probability(0.40, 0.30).unwrap_err();
    assert!(matches!(err, ProbabilityError::IntersectionExceedsMarginal { .. }));

    // Soil-type shares that do not cover the farm.
    let err = law_of_total_probability(&[0.30, 0.50], &[0.6, 0.8]).unwrap_err();
    assert!(matches!(err, ProbabilityError::NotNormalized { .. }));
}
