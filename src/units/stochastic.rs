use crate::array::TimeSeries;
use crate::error::EngineError;

/// A resource subject to independent forced outages.
///
/// Each `(hour, trial)` draws an independent availability sample: the unit
/// contributes `hourly_capacity[h]` iff the draw clears `hourly_forced_outage_rate[h]`
/// (see [`crate::sim::simulation::ProbabilisticSimulation`]).
#[derive(Debug, Clone, PartialEq)]
pub struct StochasticUnit {
    id: u64,
    nameplate_capacity: f64,
    hourly_capacity: TimeSeries,
    hourly_forced_outage_rate: TimeSeries,
}

impl StochasticUnit {
    /// Creates a new stochastic unit.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUnit` if `nameplate_capacity` is negative, either time
    /// series contains NaN, or any forced outage rate falls outside `[0, 1]`.
    pub fn new(
        id: u64,
        nameplate_capacity: f64,
        hourly_capacity: TimeSeries,
        hourly_forced_outage_rate: TimeSeries,
    ) -> Result<Self, EngineError> {
        if nameplate_capacity < 0.0 {
            return Err(EngineError::InvalidUnit {
                id,
                reason: "nameplate_capacity must be >= 0".to_string(),
            });
        }
        if hourly_capacity.has_nan() || hourly_forced_outage_rate.has_nan() {
            return Err(EngineError::InvalidUnit {
                id,
                reason: "time series contains NaN".to_string(),
            });
        }
        if hourly_forced_outage_rate
            .values()
            .iter()
            .any(|&r| !(0.0..=1.0).contains(&r))
        {
            return Err(EngineError::InvalidUnit {
                id,
                reason: "hourly_forced_outage_rate must be within [0, 1]".to_string(),
            });
        }
        Ok(Self {
            id,
            nameplate_capacity,
            hourly_capacity,
            hourly_forced_outage_rate,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn nameplate_capacity(&self) -> f64 {
        self.nameplate_capacity
    }

    pub fn hourly_capacity(&self) -> &TimeSeries {
        &self.hourly_capacity
    }

    pub fn hourly_forced_outage_rate(&self) -> &TimeSeries {
        &self.hourly_forced_outage_rate
    }
}
