//! TOML configuration.
//!
//! Every section is optional; omitted keys fall back to the library
//! defaults.
//!
//! ```toml
//! [tolerance]
//! sum = 1e-6
//! independence = 1e-6
//!
//! [dataset]
//! date_column = "date"
//! missing_markers = ["", "NaN", "nan", "NA"]
//! missing_sentinels = [-999.0]
//!
//! [simulation]
//! seed = 42
//! trials = 100000
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dataset::{DatasetOptions, MissingPolicy};
use crate::error::ConfigError;
use crate::numeric::SUM_TOLERANCE;
use crate::rules::INDEPENDENCE_TOLERANCE;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub tolerance: ToleranceConfig,
    pub dataset: DatasetConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToleranceConfig {
    /// Allowed deviation from 1 when probabilities must sum to 1.
    pub sum: f64,
    /// Allowed |P(A∩B) − P(A)P(B)| for events to count as independent.
    pub independence: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            sum: SUM_TOLERANCE,
            independence: INDEPENDENCE_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetConfig {
    pub date_column: String,
    pub missing_markers: Vec<String>,
    pub missing_sentinels: Vec<f64>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        let defaults = DatasetOptions::default();
        Self {
            date_column: defaults.date_column,
            missing_markers: defaults.missing.markers,
            missing_sentinels: defaults.missing.sentinels,
        }
    }
}

impl DatasetConfig {
    pub fn options(&self) -> DatasetOptions {
        DatasetOptions {
            date_column: self.date_column.clone(),
            missing: MissingPolicy {
                markers: self.missing_markers.clone(),
                sentinels: self.missing_sentinels.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub seed: u64,
    pub trials: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            trials: 100_000,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "loading config");
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    message: format!("{name} must be a positive finite number, got {v}"),
                })
            }
        };
        positive("tolerance.sum", self.tolerance.sum)?;
        positive("tolerance.independence", self.tolerance.independence)?;

        if self.dataset.date_column.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "dataset.date_column must not be empty".to_string(),
            });
        }
        if self.simulation.trials == 0 {
            return Err(ConfigError::Invalid {
                message: "simulation.trials must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
