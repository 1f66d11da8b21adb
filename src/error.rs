//! Unified error type for every failure condition the engine defines.

use std::fmt;

/// All error conditions raised by the engine's public API.
///
/// Validation errors are raised synchronously at the offending call and
/// never leave partially mutated state. `SolverDidNotConverge` is the one
/// recoverable variant: it still carries the solver's best estimate and
/// final bounds so a caller can use the result despite the warning.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// `EnergySystemBuilder::add_unit` was called with an id already present.
    DuplicateId { id: u64 },
    /// `EnergySystemBuilder::remove_unit` was called with an id not present.
    UnknownId { id: u64 },
    /// A unit's attributes violate a data-model invariant.
    InvalidUnit { id: u64, reason: String },
    /// The requested simulation window is empty or otherwise invalid.
    InvalidWindow { start_hour: i64, end_hour: i64 },
    /// A time series does not cover the requested simulation window.
    MissingTimeSeriesCoverage {
        requested_start_hour: i64,
        requested_end_hour: i64,
        series_start_hour: i64,
        series_end_hour: i64,
    },
    /// The net capacity matrix was accessed before `run()`.
    NotRun,
    /// `run()` was called without a prior `assign_energy_system`.
    NoSystemAssigned,
    /// A saved system directory is corrupted or uses an incompatible version.
    PersistenceError { message: String },
    /// The ELCC solver exhausted `max_iters` without meeting `precision`.
    SolverDidNotConverge {
        estimate_mw: f64,
        lo_mw: f64,
        hi_mw: f64,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { id } => write!(f, "duplicate unit id {id}"),
            Self::UnknownId { id } => write!(f, "unknown unit id {id}"),
            Self::InvalidUnit { id, reason } => write!(f, "unit {id} invalid: {reason}"),
            Self::InvalidWindow {
                start_hour,
                end_hour,
            } => write!(
                f,
                "invalid simulation window [{start_hour}, {end_hour}): start must be < end"
            ),
            Self::MissingTimeSeriesCoverage {
                requested_start_hour,
                requested_end_hour,
                series_start_hour,
                series_end_hour,
            } => write!(
                f,
                "time series covers [{series_start_hour}, {series_end_hour}] but window \
                 [{requested_start_hour}, {requested_end_hour}) was requested"
            ),
            Self::NotRun => write!(f, "net capacity matrix accessed before run()"),
            Self::NoSystemAssigned => write!(f, "run() called without assign_energy_system()"),
            Self::PersistenceError { message } => write!(f, "persistence error: {message}"),
            Self::SolverDidNotConverge {
                estimate_mw,
                lo_mw,
                hi_mw,
            } => write!(
                f,
                "ELCC solver did not converge: best estimate {estimate_mw:.4} MW \
                 (bounds [{lo_mw:.4}, {hi_mw:.4}])"
            ),
        }
    }
}

impl std::error::Error for EngineError {}
