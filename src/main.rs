use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use agri_prob::dataset::FieldDataset;
use agri_prob::rules::{self, Dependence};
use agri_prob::simulation::{self, create_rng};
use agri_prob::{logging, Config, DiscreteDistribution, Threshold};

#[derive(Parser, Debug)]
#[command(name = "agri-prob", version, about = "Probability rules for agricultural decisions")]
struct Cli {
    /// TOML file with tolerances, dataset conventions and simulation defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// P(A) = favorable / total
    Probability {
        #[arg(long)]
        favorable: f64,
        #[arg(long)]
        total: f64,
    },
    /// P(A∪B) = P(A) + P(B) − P(A∩B)
    Union {
        #[arg(long)]
        p_a: f64,
        #[arg(long)]
        p_b: f64,
        /// Omit for mutually exclusive events
        #[arg(long, default_value_t = 0.0)]
        p_a_and_b: f64,
    },
    /// P(A∩B), from P(B) for independent events or P(B|A) for dependent ones
    Intersection {
        #[arg(long)]
        p_a: f64,
        #[arg(long, conflicts_with = "p_b_given_a", required_unless_present = "p_b_given_a")]
        p_b: Option<f64>,
        #[arg(long)]
        p_b_given_a: Option<f64>,
    },
    /// P(¬A) = 1 − P(A)
    Complement {
        #[arg(long)]
        p_a: f64,
    },
    /// P(A|B) = P(A∩B) / P(B)
    Conditional {
        #[arg(long)]
        p_a_and_b: f64,
        #[arg(long)]
        p_b: f64,
    },
    /// P(A|B) = P(B|A)·P(A) / P(B)
    Bayes {
        /// P(B|A)
        #[arg(long)]
        likelihood: f64,
        /// P(A)
        #[arg(long)]
        prior: f64,
        /// P(B)
        #[arg(long)]
        evidence: f64,
    },
    /// P(A) = Σ P(A|Bᵢ)·P(Bᵢ)
    Total {
        #[arg(long, value_delimiter = ',', required = true)]
        partitions: Vec<f64>,
        #[arg(long, value_delimiter = ',', required = true)]
        conditionals: Vec<f64>,
    },
    /// Checks P(A∩B) ≈ P(A)·P(B)
    Independence {
        #[arg(long)]
        p_a: f64,
        #[arg(long)]
        p_b: f64,
        #[arg(long)]
        p_a_and_b: f64,
        /// Defaults to tolerance.independence from the config
        #[arg(long, value_parser = positive_tolerance)]
        tolerance: Option<f64>,
    },
    /// E[X] = Σ xᵢ·P(xᵢ)
    Expected {
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        outcomes: Vec<f64>,
        #[arg(long, value_delimiter = ',', required = true)]
        probabilities: Vec<f64>,
    },
    /// Scales counts to probabilities
    Normalize {
        #[arg(required = true, allow_hyphen_values = true)]
        values: Vec<f64>,
    },
    /// P(at least one) for independent events
    AnyOf {
        #[arg(required = true)]
        probabilities: Vec<f64>,
    },
    /// Empirical event probability from a field CSV
    Event {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        column: String,
        /// Event on the column: >x, >=x, <x, <=x or lo..hi
        #[arg(long = "when", allow_hyphen_values = true)]
        when: Threshold,
        /// Condition on another column's event
        #[arg(long, requires = "given")]
        given_column: Option<String>,
        #[arg(long, requires = "given_column", allow_hyphen_values = true)]
        given: Option<Threshold>,
        /// First date to include (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        /// Last date to include (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },
    /// Monte Carlo estimate, compared with the closed form
    Simulate {
        #[command(subcommand)]
        experiment: Experiment,
        /// Defaults to simulation.trials from the config
        #[arg(long, global = true)]
        trials: Option<u64>,
        /// Defaults to simulation.seed from the config
        #[arg(long, global = true)]
        seed: Option<u64>,
    },
    /// Walks through every rule with agricultural examples
    Demo,
}

#[derive(Subcommand, Debug)]
enum Experiment {
    /// Repeated Bernoulli trials
    Probability {
        #[arg(long)]
        p: f64,
    },
    /// At least one of several independent events
    AnyOf {
        #[arg(required = true)]
        probabilities: Vec<f64>,
    },
    /// Diagnostic test: P(condition | positive)
    Bayes {
        #[arg(long)]
        prior: f64,
        /// P(positive | condition)
        #[arg(long)]
        sensitivity: f64,
        /// P(positive | no condition)
        #[arg(long)]
        false_positive_rate: f64,
    },
}

fn positive_tolerance(s: &str) -> std::result::Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(format!("tolerance must be a positive finite number, got {v}"))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_cli_logger(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    tracing::debug!(?config, "configuration");

    run(cli.command, &config)
}

fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Probability { favorable, total } => {
            println!("{}", rules::calculate_probability(favorable, total)?);
        }
        Command::Union {
            p_a,
            p_b,
            p_a_and_b,
        } => {
            println!("{}", rules::addition_rule(p_a, p_b, p_a_and_b)?);
        }
        Command::Intersection {
            p_a,
            p_b,
            p_b_given_a,
        } => {
            let dependence = match (p_b, p_b_given_a) {
                (Some(p_b), _) => Dependence::Independent { p_b },
                (None, Some(p_b_given_a)) => Dependence::Dependent { p_b_given_a },
                (None, None) => anyhow::bail!("either --p-b or --p-b-given-a is required"),
            };
            println!("{}", rules::multiplication_rule(p_a, dependence)?);
        }
        Command::Complement { p_a } => {
            println!("{}", rules::complement_probability(p_a)?);
        }
        Command::Conditional { p_a_and_b, p_b } => {
            println!("{}", rules::conditional_probability(p_a_and_b, p_b)?);
        }
        Command::Bayes {
            likelihood,
            prior,
            evidence,
        } => {
            println!("{}", rules::bayes_theorem(likelihood, prior, evidence)?);
        }
        Command::Total {
            partitions,
            conditionals,
        } => {
            let p = rules::law_of_total_probability_within(
                &partitions,
                &conditionals,
                config.tolerance.sum,
            )?;
            println!("{p}");
        }
        Command::Independence {
            p_a,
            p_b,
            p_a_and_b,
            tolerance,
        } => {
            let tolerance = tolerance.unwrap_or(config.tolerance.independence);
            let independent = rules::test_independence(p_a, p_b, p_a_and_b, tolerance)?;
            println!("{}", if independent { "independent" } else { "dependent" });
        }
        Command::Expected {
            outcomes,
            probabilities,
        } => {
            let ev = rules::calculate_expected_value_within(
                &outcomes,
                &probabilities,
                config.tolerance.sum,
            )?;
            println!("{ev}");
        }
        Command::Normalize { values } => {
            let probs = rules::normalize_probabilities(&values)?;
            let text: Vec<String> = probs.iter().map(f64::to_string).collect();
            println!("{}", text.join(","));
        }
        Command::AnyOf { probabilities } => {
            println!("{}", rules::combine_probabilities_or(&probabilities)?);
        }
        Command::Event {
            file,
            column,
            when,
            given_column,
            given,
            from,
            to,
        } => {
            let mut dataset = FieldDataset::from_path(&file, &config.dataset.options())
                .with_context(|| format!("reading {}", file.display()))?;
            if let (Some(from), Some(to)) = (from, to) {
                dataset = dataset.between_dates(from, to)?;
            }
            match (given_column, given) {
                (Some(given_column), Some(given)) => {
                    let c = dataset.conditional_event_probability(
                        &column,
                        when,
                        &given_column,
                        given,
                    )?;
                    println!(
                        "P({column} {when} | {given_column} {given}) = {:.4} ({} of {} rows, {} rows observed)",
                        c.probability, c.joint, c.given, c.observed
                    );
                }
                _ => {
                    let e = dataset.event_probability(&column, when)?;
                    println!(
                        "P({column} {when}) = {:.4} ({} of {} observed, {} missing)",
                        e.probability, e.favorable, e.observed, e.missing
                    );
                }
            }
        }
        Command::Simulate {
            experiment,
            trials,
            seed,
        } => {
            let trials = trials.unwrap_or(config.simulation.trials);
            let mut rng = create_rng(seed.unwrap_or(config.simulation.seed));
            let (estimate, exact) = match experiment {
                Experiment::Probability { p } => {
                    (simulation::estimate_probability(p, trials, &mut rng)?, p)
                }
                Experiment::AnyOf { probabilities } => (
                    simulation::estimate_any_of(&probabilities, trials, &mut rng)?,
                    rules::combine_probabilities_or(&probabilities)?,
                ),
                Experiment::Bayes {
                    prior,
                    sensitivity,
                    false_positive_rate,
                } => {
                    let evidence = rules::law_of_total_probability(
                        &[prior, 1.0 - prior],
                        &[sensitivity, false_positive_rate],
                    )?;
                    (
                        simulation::estimate_conditional(
                            prior,
                            sensitivity,
                            false_positive_rate,
                            trials,
                            &mut rng,
                        )?,
                        rules::bayes_theorem(sensitivity, prior, evidence)?,
                    )
                }
            };
            println!(
                "simulated {:.4} ({} of {}), exact {:.4}",
                estimate.probability, estimate.favorable, estimate.observed, exact
            );
        }
        Command::Demo => demo(config)?,
    }
    Ok(())
}

fn demo(config: &Config) -> Result<()> {
    println!("1. Basic probability");
    println!(
        "   P(germination) with 85/100 seeds: {}",
        rules::calculate_probability(85.0, 100.0)?
    );

    println!("\n2. Addition rule");
    println!(
        "   P(Disease OR Pests): {:.2}",
        rules::addition_rule(0.25, 0.30, 0.10)?
    );

    println!("\n3. Multiplication rule");
    println!(
        "   P(Frost in both fields): {:.4}",
        rules::multiplication_rule(0.15, Dependence::Independent { p_b: 0.15 })?
    );

    println!("\n4. Complement rule");
    println!(
        "   P(Success) given 15% failure: {:.2}",
        rules::complement_probability(0.15)?
    );

    println!("\n5. Conditional probability");
    println!(
        "   P(Disease|Symptoms): {:.2}",
        rules::conditional_probability(0.12, 0.30)?
    );

    println!("\n6. Bayes' theorem");
    println!(
        "   P(Disease|Positive Test): {:.3}",
        rules::bayes_theorem(0.90, 0.05, 0.14)?
    );

    println!("\n7. Law of total probability");
    println!(
        "   Overall yield probability: {:.2}",
        rules::law_of_total_probability(&[0.30, 0.50, 0.20], &[0.60, 0.80, 0.50])?
    );

    println!("\n8. Independence test");
    println!(
        "   Frost events independent? {}",
        rules::test_independence(0.15, 0.15, 0.0225, config.tolerance.independence)?
    );

    println!("\n9. Expected value");
    let yields = DiscreteDistribution::new(vec![50.0, 75.0, 100.0], vec![0.20, 0.50, 0.30])?;
    println!(
        "   Expected crop yield: {:.1} bushels/acre (sd {:.1})",
        yields.expected_value(),
        yields.std_dev()
    );

    println!("\n10. At least one weather problem (frost, drought, flood)");
    let risks = [0.20, 0.15, 0.10];
    let mut rng = create_rng(config.simulation.seed);
    let simulated = simulation::estimate_any_of(&risks, config.simulation.trials, &mut rng)?;
    println!(
        "   exact {:.3}, simulated {:.3} over {} seasons",
        rules::combine_probabilities_or(&risks)?,
        simulated.probability,
        simulated.observed
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_negative_outcomes() {
        let cli = Cli::try_parse_from([
            "agri-prob",
            "expected",
            "--outcomes",
            "-100,200,500",
            "--probabilities",
            "0.1,0.6,0.3",
        ])
        .unwrap();
        match cli.command {
            Command::Expected { outcomes, .. } => assert_eq!(outcomes, vec![-100.0, 200.0, 500.0]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_negative_normalize_values() {
        let cli = Cli::try_parse_from(["agri-prob", "normalize", "-1", "2"]).unwrap();
        match cli.command {
            Command::Normalize { values } => assert_eq!(values, vec![-1.0, 2.0]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_independence_tolerance_must_be_positive() {
        let base = ["agri-prob", "independence", "--p-a", "0.3", "--p-b", "0.4", "--p-a-and-b", "0.12"];
        for bad in ["--tolerance=-0.01", "--tolerance=NaN", "--tolerance=0"] {
            let mut args = base.to_vec();
            args.push(bad);
            assert!(Cli::try_parse_from(args).is_err(), "{bad} should be rejected");
        }
        let mut args = base.to_vec();
        args.push("--tolerance=0.01");
        match Cli::try_parse_from(args).unwrap().command {
            Command::Independence { tolerance, .. } => assert_eq!(tolerance, Some(0.01)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_event_threshold() {
        let cli = Cli::try_parse_from([
            "agri-prob",
            "event",
            "--file",
            "fields.csv",
            "--column",
            "yield",
            "--when",
            ">=70",
        ])
        .unwrap();
        match cli.command {
            Command::Event { when, .. } => assert_eq!(when, Threshold::AtLeast(70.0)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_intersection_requires_one_of() {
        assert!(Cli::try_parse_from(["agri-prob", "intersection", "--p-a", "0.3"]).is_err());
        assert!(Cli::try_parse_from([
            "agri-prob",
            "intersection",
            "--p-a",
            "0.3",
            "--p-b",
            "0.2",
            "--p-b-given-a",
            "0.7"
        ])
        .is_err());
    }

    #[test]
    fn test_demo_runs() {
        let config = Config {
            simulation: agri_prob::config::SimulationConfig {
                seed: 1,
                trials: 1_000,
            },
            ..Config::default()
        };
        demo(&config).unwrap();
    }

    #[test]
    fn test_run_reports_rule_errors() {
        let err = run(Command::Complement { p_a: 1.5 }, &Config::default()).unwrap_err();
        assert_eq!(err.to_string(), "P(A) must be in [0,1], got 1.5");
    }
}
