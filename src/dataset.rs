//! Agricultural field datasets and empirical event probabilities.
//!
//! Datasets are CSV files with a header row. One column (by default
//! `date`) holds ISO-8601 dates; every other column is numeric. Missing
//! readings are written as `NaN`, an empty cell, or the sentinel `-999`.
//!
//! ```text
//! date,yield,rainfall,soil_ph
//! 2023-04-01,72.5,31.2,6.4
//! 2023-04-08,-999,28.0,NaN
//! ```
//!
//! Events are thresholds on a column (`yield > 70`), and their
//! probabilities are relative frequencies over the rows where the column
//! was actually observed.

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::DatasetError;
use crate::rules::{calculate_probability, conditional_probability};

/// Sentinel used by the datasets for "no reading".
pub const MISSING_SENTINEL: f64 = -999.0;

/// How missing readings are spelled in a CSV file.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingPolicy {
    /// Cell texts (after trimming) that mean "missing".
    pub markers: Vec<String>,
    /// Numeric values that mean "missing".
    pub sentinels: Vec<f64>,
}

impl Default for MissingPolicy {
    fn default() -> Self {
        Self {
            markers: ["", "NaN", "nan", "NA"].iter().map(|s| s.to_string()).collect(),
            sentinels: vec![MISSING_SENTINEL],
        }
    }
}

impl MissingPolicy {
    fn is_marker(&self, cell: &str) -> bool {
        self.markers.iter().any(|m| m == cell)
    }

    /// Parses one numeric cell: `Some(None)` is a missing reading, `None`
    /// an unparseable one.
    fn parse(&self, cell: &str) -> Option<Option<f64>> {
        let cell = cell.trim();
        if self.is_marker(cell) {
            return Some(None);
        }
        let value: f64 = cell.parse().ok()?;
        if value.is_nan() || self.sentinels.contains(&value) {
            Some(None)
        } else if value.is_finite() {
            Some(Some(value))
        } else {
            None
        }
    }
}

/// Options for loading a [`FieldDataset`].
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetOptions {
    /// Header of the ISO date column. Absent columns are fine.
    pub date_column: String,
    pub missing: MissingPolicy,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            date_column: "date".to_string(),
            missing: MissingPolicy::default(),
        }
    }
}

/// Column-oriented table of field observations.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDataset {
    dates: Option<Vec<Option<NaiveDate>>>,
    names: Vec<String>,
    columns: Vec<Vec<Option<f64>>>,
}

impl FieldDataset {
    /// Loads a dataset from CSV text.
    pub fn from_reader<R: Read>(reader: R, options: &DatasetOptions) -> Result<Self, DatasetError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();

        let date_idx = headers.iter().position(|h| h == options.date_column);
        let names: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != date_idx)
            .map(|(_, h)| h.to_string())
            .collect();

        let mut dates = date_idx.map(|_| Vec::new());
        let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); names.len()];

        for (r, record) in rdr.records().enumerate() {
            let record = record?;
            let row = r + 1;
            let mut col = 0;
            for (i, cell) in record.iter().enumerate() {
                if Some(i) == date_idx {
                    let date = parse_date(cell, &options.missing, row)?;
                    if let Some(dates) = dates.as_mut() {
                        dates.push(date);
                    }
                    continue;
                }
                let value =
                    options
                        .missing
                        .parse(cell)
                        .ok_or_else(|| DatasetError::InvalidNumber {
                            row,
                            column: names[col].clone(),
                            value: cell.to_string(),
                        })?;
                columns[col].push(value);
                col += 1;
            }
        }

        let dataset = Self {
            dates,
            names,
            columns,
        };
        tracing::debug!(
            rows = dataset.len(),
            columns = dataset.names.len(),
            has_dates = dataset.dates.is_some(),
            "loaded field dataset"
        );
        Ok(dataset)
    }

    /// Loads a dataset from a CSV file.
    pub fn from_path(path: impl AsRef<Path>, options: &DatasetOptions) -> Result<Self, DatasetError> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file, options)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns
            .first()
            .map(Vec::len)
            .or_else(|| self.dates.as_ref().map(Vec::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric column names in file order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Row dates, if the file had a date column.
    pub fn dates(&self) -> Option<&[Option<NaiveDate>]> {
        self.dates.as_deref()
    }

    pub fn column(&self, name: &str) -> Result<&[Option<f64>], DatasetError> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
            .ok_or_else(|| DatasetError::UnknownColumn(name.to_string()))
    }

    /// Number of missing readings in `name`.
    pub fn missing_count(&self, name: &str) -> Result<usize, DatasetError> {
        Ok(self.column(name)?.iter().filter(|v| v.is_none()).count())
    }

    /// Observed (non-missing) values of `name`.
    pub fn observed(&self, name: &str) -> Result<Vec<f64>, DatasetError> {
        Ok(self.column(name)?.iter().flatten().copied().collect())
    }

    /// Empirical P(event) over rows where `column` was observed.
    ///
    /// # Examples
    /// ```
    /// use agri_prob::dataset::{DatasetOptions, FieldDataset, Threshold};
    /// let csv = "date,yield\n2023-05-01,80\n2023-05-08,-999\n2023-05-15,60\n2023-05-22,75\n";
    /// let ds = FieldDataset::from_reader(csv.as_bytes(), &DatasetOptions::default()).unwrap();
    /// let high = ds.event_probability("yield", Threshold::Above(70.0)).unwrap();
    /// assert_eq!((high.favorable, high.observed, high.missing), (2, 3, 1));
    /// ```
    pub fn event_probability(
        &self,
        column: &str,
        threshold: Threshold,
    ) -> Result<EventCount, DatasetError> {
        let values = self.column(column)?;
        let observed = values.iter().filter(|v| v.is_some()).count();
        let missing = values.len() - observed;
        if observed == 0 {
            return Err(DatasetError::NoObservations(column.to_string()));
        }
        let favorable = values
            .iter()
            .flatten()
            .filter(|x| threshold.contains(**x))
            .count();
        let probability = calculate_probability(favorable as f64, observed as f64)?;
        Ok(EventCount {
            favorable,
            observed,
            missing,
            probability,
        })
    }

    /// Empirical P(A | B) over rows where both columns were observed.
    ///
    /// # Errors
    /// - [`DatasetError::NoObservations`] if no row has both readings
    /// - [`ProbabilityError::ZeroConditioning`](crate::error::ProbabilityError::ZeroConditioning)
    ///   if B never occurred
    pub fn conditional_event_probability(
        &self,
        event_column: &str,
        event: Threshold,
        given_column: &str,
        given: Threshold,
    ) -> Result<ConditionalCount, DatasetError> {
        let a = self.column(event_column)?;
        let b = self.column(given_column)?;

        let mut observed = 0_usize;
        let mut given_count = 0_usize;
        let mut joint = 0_usize;
        for (x, y) in a.iter().zip(b) {
            let (Some(x), Some(y)) = (x, y) else {
                continue;
            };
            observed += 1;
            if given.contains(*y) {
                given_count += 1;
                if event.contains(*x) {
                    joint += 1;
                }
            }
        }
        if observed == 0 {
            return Err(DatasetError::NoObservations(format!(
                "{event_column} with {given_column}"
            )));
        }

        let n = observed as f64;
        let p_joint = calculate_probability(joint as f64, n)?;
        let p_given = calculate_probability(given_count as f64, n)?;
        let probability = conditional_probability(p_joint, p_given)?;
        Ok(ConditionalCount {
            joint,
            given: given_count,
            observed,
            probability,
        })
    }

    /// Rows dated within `[start, end]`. Undated rows are dropped.
    pub fn between_dates(&self, start: NaiveDate, end: NaiveDate) -> Result<Self, DatasetError> {
        let dates = self.dates.as_ref().ok_or(DatasetError::NoDateColumn)?;
        let keep: Vec<usize> = dates
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_some_and(|d| d >= start && d <= end))
            .map(|(i, _)| i)
            .collect();

        Ok(Self {
            dates: Some(keep.iter().map(|&i| dates[i]).collect()),
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| keep.iter().map(|&i| c[i]).collect())
                .collect(),
        })
    }
}

fn parse_date(cell: &str, missing: &MissingPolicy, row: usize) -> Result<Option<NaiveDate>, DatasetError> {
    let cell = cell.trim();
    // numeric sentinels (-999, NaN) mark a missing date too
    if missing.is_marker(cell) || matches!(missing.parse(cell), Some(None)) {
        return Ok(None);
    }
    NaiveDate::parse_from_str(cell, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| DatasetError::InvalidDate {
            row,
            value: cell.to_string(),
        })
}

/// Outcome of counting an event in a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventCount {
    pub favorable: usize,
    pub observed: usize,
    pub missing: usize,
    pub probability: f64,
}

/// Outcome of counting A among the rows where B holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionalCount {
    /// Rows where both A and B hold.
    pub joint: usize,
    /// Rows where B holds.
    pub given: usize,
    /// Rows where both columns were observed.
    pub observed: usize,
    pub probability: f64,
}

/// A threshold event on one numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    Above(f64),
    AtLeast(f64),
    Below(f64),
    AtMost(f64),
    /// Inclusive on both ends.
    Between(f64, f64),
}

impl Threshold {
    pub fn contains(&self, x: f64) -> bool {
        match *self {
            Threshold::Above(t) => x > t,
            Threshold::AtLeast(t) => x >= t,
            Threshold::Below(t) => x < t,
            Threshold::AtMost(t) => x <= t,
            Threshold::Between(lo, hi) => x >= lo && x <= hi,
        }
    }
}

impl FromStr for Threshold {
    type Err = DatasetError;

    /// Parses `>x`, `>=x`, `<x`, `<=x`, or `lo..hi`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || DatasetError::InvalidThreshold(s.to_string());
        let num = |t: &str| t.trim().parse::<f64>().ok().filter(|v| v.is_finite());

        let parsed = if let Some(rest) = s.strip_prefix(">=") {
            num(rest).map(Threshold::AtLeast)
        } else if let Some(rest) = s.strip_prefix("<=") {
            num(rest).map(Threshold::AtMost)
        } else if let Some(rest) = s.strip_prefix('>') {
            num(rest).map(Threshold::Above)
        } else if let Some(rest) = s.strip_prefix('<') {
            num(rest).map(Threshold::Below)
        } else if let Some((lo, hi)) = s.split_once("..") {
            match (num(lo), num(hi)) {
                (Some(lo), Some(hi)) if lo <= hi => Some(Threshold::Between(lo, hi)),
                _ => None,
            }
        } else {
            None
        };
        parsed.ok_or_else(invalid)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Above(t) => write!(f, "> {t}"),
            Threshold::AtLeast(t) => write!(f, ">= {t}"),
            Threshold::Below(t) => write!(f, "< {t}"),
            Threshold::AtMost(t) => write!(f, "<= {t}"),
            Threshold::Between(lo, hi) => write!(f, "in [{lo}, {hi}]"),
        }
    }
}
