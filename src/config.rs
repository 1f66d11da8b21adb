//! TOML-based study configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Top-level study configuration parsed from TOML.
///
/// All fields have defaults. Load from TOML with
/// [`StudyConfig::from_toml_file`] or use a named preset such as
/// [`StudyConfig::annual_base_case`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudyConfig {
    /// Simulation window and Monte Carlo sizing.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// ELCC bisection solver tolerances.
    #[serde(default)]
    pub elcc: ElccConfig,
}

/// Simulation window and Monte Carlo sizing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// First hour of the study horizon (hours since the UTC epoch).
    pub start_hour: i64,
    /// One past the last hour of the study horizon.
    pub end_hour: i64,
    /// Number of Monte Carlo trials.
    pub trial_size: usize,
    /// Master random seed.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_hour: 0,
            end_hour: 8760,
            trial_size: 1000,
            seed: 42,
        }
    }
}

/// ELCC bisection solver tolerances.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ElccConfig {
    /// Bisection stops once `hi - lo` is no larger than this, in MW.
    pub precision_mw: f64,
    /// Maximum bisection iterations before returning `SolverDidNotConverge`.
    pub max_iters: u32,
}

impl Default for ElccConfig {
    fn default() -> Self {
        Self {
            precision_mw: 0.01,
            max_iters: 20,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.trial_size"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl StudyConfig {
    /// A full-year hourly study at 1000 trials, the default sizing for a
    /// production adequacy assessment.
    pub fn annual_base_case() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            elcc: ElccConfig::default(),
        }
    }

    /// A short, low-trial-count window for fast iteration during development.
    pub fn quick_check() -> Self {
        Self {
            simulation: SimulationConfig {
                start_hour: 0,
                end_hour: 24 * 7,
                trial_size: 50,
                seed: 42,
            },
            elcc: ElccConfig::default(),
        }
    }

    /// A full-year study tuned for repeated ELCC screening: looser precision
    /// and a lower iteration cap so many candidates can be screened quickly.
    pub fn elcc_screening() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            elcc: ElccConfig {
                precision_mw: 1.0,
                max_iters: 12,
            },
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["annual_base_case", "quick_check", "elcc_screening"];

    /// Loads a study configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "annual_base_case" => Ok(Self::annual_base_case()),
            "quick_check" => Ok(Self::quick_check()),
            "elcc_screening" => Ok(Self::elcc_screening()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a study configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "study".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a study configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.start_hour >= s.end_hour {
            errors.push(ConfigError {
                field: "simulation.start_hour".into(),
                message: "must be < simulation.end_hour".into(),
            });
        }

        let e = &self.elcc;
        if e.precision_mw <= 0.0 {
            errors.push(ConfigError {
                field: "elcc.precision_mw".into(),
                message: "must be > 0".into(),
            });
        }
        if e.max_iters == 0 {
            errors.push(ConfigError {
                field: "elcc.max_iters".into(),
                message: "must be > 0".into(),
            });
        }

        errors
    }
}
