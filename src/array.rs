//! Time-indexed array primitives: a 1-D hourly time series and the dense
//! (hour × trial) net capacity matrix the simulator and metrics operate on.

use crate::error::EngineError;

/// A finite, hourly-spaced sequence of values anchored at `start_hour`.
///
/// `start_hour` is hours since a fixed UTC epoch; naive (timezone-less)
/// timestamps are treated as already being in UTC (see SPEC_FULL.md §9).
/// Because the grid is always one-hour spaced, the series only needs to
/// carry its values and an integer anchor rather than a parallel timestamp
/// vector.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    start_hour: i64,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Creates a new time series starting at `start_hour`.
    pub fn new(start_hour: i64, values: Vec<f64>) -> Self {
        Self { start_hour, values }
    }

    /// First hour covered by this series.
    pub fn start_hour(&self) -> i64 {
        self.start_hour
    }

    /// Last hour covered by this series (inclusive).
    pub fn end_hour(&self) -> i64 {
        self.start_hour + self.values.len() as i64 - 1
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw backing values, in hour order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at absolute hour `hour`, if covered.
    pub fn get(&self, hour: i64) -> Option<f64> {
        if hour < self.start_hour {
            return None;
        }
        let idx = (hour - self.start_hour) as usize;
        self.values.get(idx).copied()
    }

    /// `true` if every hour in `[start_hour, end_hour)` is covered by this series.
    pub fn covers(&self, start_hour: i64, end_hour: i64) -> bool {
        if start_hour >= end_hour || self.is_empty() {
            return false;
        }
        start_hour >= self.start_hour && end_hour - 1 <= self.end_hour()
    }

    /// Returns the sub-slice covering `[start_hour, end_hour)`.
    ///
    /// # Errors
    ///
    /// Returns `MissingTimeSeriesCoverage` if the series does not fully
    /// cover the requested window.
    pub fn slice(&self, start_hour: i64, end_hour: i64) -> Result<&[f64], EngineError> {
        if !self.covers(start_hour, end_hour) {
            return Err(EngineError::MissingTimeSeriesCoverage {
                requested_start_hour: start_hour,
                requested_end_hour: end_hour,
                series_start_hour: self.start_hour,
                series_end_hour: self.end_hour(),
            });
        }
        let from = (start_hour - self.start_hour) as usize;
        let to = (end_hour - self.start_hour) as usize;
        Ok(&self.values[from..to])
    }

    /// Maximum value in the series (the nameplate convention for DemandUnit).
    ///
    /// Returns `0.0` for an empty series.
    pub fn peak(&self) -> f64 {
        self.values.iter().copied().fold(0.0_f64, f64::max)
    }

    /// `true` if any value is NaN.
    pub fn has_nan(&self) -> bool {
        self.values.iter().any(|v| v.is_nan())
    }
}

/// Dense net-capacity matrix, indexed (hour, trial), stored row-major.
///
/// Units are MW; negative entries denote shortfall, positive denote surplus.
#[derive(Debug, Clone, PartialEq)]
pub struct NetCapacityMatrix {
    hours: usize,
    trials: usize,
    data: Vec<f64>,
}

impl NetCapacityMatrix {
    /// Allocates a zero-filled matrix of shape `(hours, trials)`.
    pub fn zeros(hours: usize, trials: usize) -> Self {
        Self {
            hours,
            trials,
            data: vec![0.0; hours * trials],
        }
    }

    pub fn hours(&self) -> usize {
        self.hours
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    fn index(&self, hour: usize, trial: usize) -> usize {
        hour * self.trials + trial
    }

    pub fn get(&self, hour: usize, trial: usize) -> f64 {
        self.data[self.index(hour, trial)]
    }

    pub fn set(&mut self, hour: usize, trial: usize, value: f64) {
        let idx = self.index(hour, trial);
        self.data[idx] = value;
    }

    pub fn add_at(&mut self, hour: usize, trial: usize, delta: f64) {
        let idx = self.index(hour, trial);
        self.data[idx] += delta;
    }

    /// Adds `delta` to every trial at `hour` (deterministic unit contribution).
    pub fn add_row_broadcast(&mut self, hour: usize, delta: f64) {
        if self.trials == 0 {
            return;
        }
        let start = hour * self.trials;
        for v in &mut self.data[start..start + self.trials] {
            *v += delta;
        }
    }

    /// All trial values for one hour, in trial order.
    pub fn row(&self, hour: usize) -> &[f64] {
        let start = hour * self.trials;
        &self.data[start..start + self.trials]
    }

    /// `true` if any entry is NaN.
    pub fn has_nan(&self) -> bool {
        self.data.iter().any(|v| v.is_nan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_series_covers_its_own_range() {
        let ts = TimeSeries::new(10, vec![1.0, 2.0, 3.0]);
        assert_eq!(ts.start_hour(), 10);
        assert_eq!(ts.end_hour(), 12);
        assert!(ts.covers(10, 13));
        assert!(ts.covers(11, 12));
        assert!(!ts.covers(10, 14));
        assert!(!ts.covers(9, 12));
    }

    #[test]
    fn time_series_get_outside_range_is_none() {
        let ts = TimeSeries::new(5, vec![1.0, 2.0]);
        assert_eq!(ts.get(4), None);
        assert_eq!(ts.get(5), Some(1.0));
        assert_eq!(ts.get(6), Some(2.0));
        assert_eq!(ts.get(7), None);
    }

    #[test]
    fn time_series_slice_errors_on_missing_coverage() {
        let ts = TimeSeries::new(0, vec![1.0, 2.0, 3.0]);
        let err = ts.slice(1, 10).unwrap_err();
        assert!(matches!(
            err,
            EngineError::MissingTimeSeriesCoverage { .. }
        ));
    }

    #[test]
    fn time_series_slice_returns_window() {
        let ts = TimeSeries::new(0, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(ts.slice(1, 3).unwrap(), &[2.0, 3.0]);
    }

    #[test]
    fn peak_is_maximum_value() {
        let ts = TimeSeries::new(0, vec![1.0, 5.0, -2.0, 3.0]);
        assert_eq!(ts.peak(), 5.0);
    }

    #[test]
    fn peak_of_empty_series_is_zero() {
        let ts = TimeSeries::new(0, vec![]);
        assert_eq!(ts.peak(), 0.0);
    }

    #[test]
    fn ncm_zeros_initializes_all_entries() {
        let ncm = NetCapacityMatrix::zeros(3, 2);
        assert_eq!(ncm.hours(), 3);
        assert_eq!(ncm.trials(), 2);
        for h in 0..3 {
            for t in 0..2 {
                assert_eq!(ncm.get(h, t), 0.0);
            }
        }
    }

    #[test]
    fn ncm_add_row_broadcast_affects_all_trials_at_hour() {
        let mut ncm = NetCapacityMatrix::zeros(2, 3);
        ncm.add_row_broadcast(0, 5.0);
        assert_eq!(ncm.row(0), &[5.0, 5.0, 5.0]);
        assert_eq!(ncm.row(1), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn ncm_add_at_targets_single_cell() {
        let mut ncm = NetCapacityMatrix::zeros(2, 2);
        ncm.add_at(1, 0, 3.0);
        assert_eq!(ncm.get(1, 0), 3.0);
        assert_eq!(ncm.get(1, 1), 0.0);
        assert_eq!(ncm.get(0, 0), 0.0);
    }

    #[test]
    fn ncm_zero_width_trial_axis_is_valid() {
        let ncm = NetCapacityMatrix::zeros(4, 0);
        assert_eq!(ncm.trials(), 0);
        assert_eq!(ncm.row(0), &[] as &[f64]);
    }
}
