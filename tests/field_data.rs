//! Loading field CSVs and configuration from disk.

use std::io::Write;

use agri_prob::dataset::{FieldDataset, Threshold};
use agri_prob::{Config, ConfigError, DatasetError};
use chrono::NaiveDate;

const SEASON: &str = "\
date,yield,rainfall
2022-06-01,81.0,35.0
2022-06-15,NaN,22.0
2022-07-01,64.0,18.5
2022-07-15,77.0,41.0
2022-08-01,-999,-999
2022-08-15,59.5,12.0
";

fn write_temp(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn event_probability_from_file() {
    let csv = write_temp(SEASON, ".csv");
    let config = Config::default();
    let ds = FieldDataset::from_path(csv.path(), &config.dataset.options()).unwrap();

    assert_eq!(ds.len(), 6);
    assert_eq!(ds.missing_count("yield").unwrap(), 2);

    let good = ds.event_probability("yield", ">=75".parse().unwrap()).unwrap();
    assert_eq!((good.favorable, good.observed), (2, 4));
    assert_eq!(good.probability, 0.5);
}

#[test]
fn wet_weeks_predict_good_yield() {
    let csv = write_temp(SEASON, ".csv");
    let ds = FieldDataset::from_path(csv.path(), &Config::default().dataset.options()).unwrap();

    let c = ds
        .conditional_event_probability(
            "yield",
            Threshold::AtLeast(75.0),
            "rainfall",
            Threshold::Above(30.0),
        )
        .unwrap();
    assert_eq!((c.joint, c.given, c.observed), (2, 2, 4));
    assert!((c.probability - 1.0).abs() < 1e-12);
}

#[test]
fn date_window_restricts_rows() {
    let csv = write_temp(SEASON, ".csv");
    let ds = FieldDataset::from_path(csv.path(), &Config::default().dataset.options()).unwrap();
    let july = ds
        .between_dates(
            NaiveDate::from_ymd_opt(2022, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 7, 31).unwrap(),
        )
        .unwrap();
    assert_eq!(july.observed("yield").unwrap(), vec![64.0, 77.0]);
}

#[test]
fn missing_file_is_io_error() {
    let err = FieldDataset::from_path(
        "/nonexistent/agri-prob/fields.csv",
        &Config::default().dataset.options(),
    )
    .unwrap_err();
    assert!(matches!(err, DatasetError::Io(_)));
}

#[test]
fn config_file_drives_dataset_conventions() {
    let toml = write_temp(
        "[dataset]\ndate_column = \"week\"\nmissing_markers = [\"n/a\"]\nmissing_sentinels = []\n",
        ".toml",
    );
    let config = Config::from_path(toml.path()).unwrap();

    let csv = write_temp("week,yield\n2022-01-03,n/a\n2022-01-10,-999\n", ".csv");
    let ds = FieldDataset::from_path(csv.path(), &config.dataset.options()).unwrap();
    // -999 is a real reading once the sentinel list is emptied
    assert_eq!(ds.column("yield").unwrap(), &[None, Some(-999.0)]);
    assert!(ds.dates().is_some());
}

#[test]
fn invalid_config_file() {
    let toml = write_temp("[simulation]\ntrials = \"many\"\n", ".toml");
    assert!(matches!(
        Config::from_path(toml.path()),
        Err(ConfigError::Parse(_))
    ));
}
