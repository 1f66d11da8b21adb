//! Effective load-carrying capability: bisection over added constant demand.

use crate::array::NetCapacityMatrix;
use crate::error::EngineError;
use crate::sim::metrics::{self, MetricKind};
use crate::sim::simulation::{ProbabilisticSimulation, SimulationWindow};
use crate::system::{EnergySystem, EnergySystemBuilder};
use crate::units::{DemandUnit, Unit, UnitKind};

const DEFAULT_PRECISION_MW: f64 = 0.01;
const DEFAULT_MAX_ITERS: u32 = 20;
/// Relative metric tolerance used to decide "approximately equal to base_metric".
const METRIC_TOL_FRACTION: f64 = 1e-6;

/// Observable solver state, advanced one step per `evaluate` iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolverState {
    Evaluating,
    Bisecting { lo_mw: f64, hi_mw: f64, iter: u32 },
    Converged { estimate_mw: f64 },
    Exhausted { estimate_mw: f64 },
}

/// One intermediate bisection step, recorded for inspection.
#[derive(Debug, Clone)]
pub struct ElccIteration {
    pub added_demand_mw: f64,
    pub net_capacity_matrix: NetCapacityMatrix,
    pub metric_value: f64,
}

/// Result of a converged (or exhausted) ELCC evaluation.
#[derive(Debug, Clone)]
pub struct ElccResult {
    pub capacity_credit_mw: f64,
    pub base_metric: f64,
    pub original_net_capacity_matrix: NetCapacityMatrix,
    pub intermediate_net_capacity_matrices: Vec<ElccIteration>,
    pub final_state: SolverState,
}

/// Bisects on added constant demand to find the MW value at which a
/// combined system matches the base system's adequacy under `metric`.
pub struct EffectiveLoadCarryingCapability {
    base_system: EnergySystem,
    window: SimulationWindow,
    metric: MetricKind,
    precision_mw: f64,
    max_iters: u32,
}

impl EffectiveLoadCarryingCapability {
    pub fn new(base_system: EnergySystem, window: SimulationWindow, metric: MetricKind) -> Self {
        Self {
            base_system,
            window,
            metric,
            precision_mw: DEFAULT_PRECISION_MW,
            max_iters: DEFAULT_MAX_ITERS,
        }
    }

    pub fn with_precision_mw(mut self, precision_mw: f64) -> Self {
        self.precision_mw = precision_mw;
        self
    }

    pub fn with_max_iters(mut self, max_iters: u32) -> Self {
        self.max_iters = max_iters;
        self
    }

    fn run_metric(
        &self,
        system: EnergySystem,
    ) -> Result<(f64, NetCapacityMatrix), EngineError> {
        let mut sim = ProbabilisticSimulation::new(self.window);
        sim.assign_energy_system(system);
        sim.run()?;
        let ncm = sim.net_hourly_capacity_matrix()?.clone();
        let value = metrics::evaluate(&ncm, self.window, self.metric);
        Ok((value, ncm))
    }

    fn union(&self, additional: &EnergySystem) -> Result<EnergySystem, EngineError> {
        let mut builder = EnergySystemBuilder::new();
        for unit in self.base_system.units() {
            builder.add_unit(unit.clone())?;
        }
        for unit in additional.units() {
            builder.add_unit(unit.clone())?;
        }
        Ok(builder.build())
    }

    /// Evaluates the ELCC of `additional` against this solver's base system.
    ///
    /// # Errors
    ///
    /// Returns `SolverDidNotConverge` (carrying the final midpoint estimate
    /// and bounds) if the bisection exhausts `max_iters` without closing
    /// within `precision_mw`. Other errors propagate from the underlying
    /// simulation runs.
    pub fn evaluate(&self, additional: &EnergySystem) -> Result<ElccResult, EngineError> {
        let (base_metric, original_net_capacity_matrix) =
            self.run_metric(self.base_system.clone())?;

        let combined = self.union(additional)?;

        let additional_nameplate: f64 = additional
            .units()
            .filter(|u| u.kind() != UnitKind::Demand)
            .map(Unit::nameplate_capacity)
            .sum();

        let mut intermediates = Vec::new();

        let combined_with_hi = self.with_added_demand(&combined, additional_nameplate)?;
        let (hi_metric, hi_ncm) = self.run_metric(combined_with_hi)?;
        intermediates.push(ElccIteration {
            added_demand_mw: additional_nameplate,
            net_capacity_matrix: hi_ncm,
            metric_value: hi_metric,
        });
        if hi_metric <= base_metric {
            return Ok(ElccResult {
                capacity_credit_mw: additional_nameplate,
                base_metric,
                original_net_capacity_matrix,
                intermediate_net_capacity_matrices: intermediates,
                final_state: SolverState::Converged {
                    estimate_mw: additional_nameplate,
                },
            });
        }

        let mut lo = 0.0_f64;
        let mut hi = additional_nameplate;
        let tol = base_metric.abs() * METRIC_TOL_FRACTION + 1e-9;

        for _ in 0..self.max_iters {
            if hi - lo <= self.precision_mw {
                break;
            }
            let mid = (lo + hi) / 2.0;
            let candidate = self.with_added_demand(&combined, mid)?;
            let (m, ncm) = self.run_metric(candidate)?;
            intermediates.push(ElccIteration {
                added_demand_mw: mid,
                net_capacity_matrix: ncm,
                metric_value: m,
            });

            if m > base_metric + tol {
                hi = mid;
            } else if m < base_metric - tol {
                lo = mid;
            } else {
                return Ok(ElccResult {
                    capacity_credit_mw: mid,
                    base_metric,
                    original_net_capacity_matrix,
                    intermediate_net_capacity_matrices: intermediates,
                    final_state: SolverState::Converged { estimate_mw: mid },
                });
            }
        }

        let estimate = (lo + hi) / 2.0;
        if hi - lo <= self.precision_mw {
            Ok(ElccResult {
                capacity_credit_mw: estimate,
                base_metric,
                original_net_capacity_matrix,
                intermediate_net_capacity_matrices: intermediates,
                final_state: SolverState::Converged {
                    estimate_mw: estimate,
                },
            })
        } else {
            eprintln!(
                "ELCC solver did not converge within {} iterations: estimate {estimate:.4} MW, bounds [{lo:.4}, {hi:.4}]",
                self.max_iters
            );
            Err(EngineError::SolverDidNotConverge {
                estimate_mw: estimate,
                lo_mw: lo,
                hi_mw: hi,
            })
        }
    }

    fn with_added_demand(
        &self,
        system: &EnergySystem,
        added_mw: f64,
    ) -> Result<EnergySystem, EngineError> {
        let mut builder = EnergySystemBuilder::new();
        for unit in system.units() {
            builder.add_unit(unit.clone())?;
        }
        if added_mw > 0.0 {
            let synthetic_id = next_synthetic_id(system);
            builder.add_unit(DemandUnit::constant(
                synthetic_id,
                self.window.start_hour,
                self.window.end_hour,
                added_mw,
            )?)?;
        }
        Ok(builder.build())
    }
}

fn next_synthetic_id(system: &EnergySystem) -> u64 {
    system.units().map(Unit::id).max().map_or(0, |m| m + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::TimeSeries;
    use crate::units::{DemandUnit, StaticUnit};

    fn base_system_with_shortfall() -> EnergySystem {
        let mut builder = EnergySystemBuilder::new();
        builder
            .add_unit(DemandUnit::constant(1, 0, 24, 100.0).unwrap())
            .unwrap();
        builder
            .add_unit(StaticUnit::new(2, 90.0, TimeSeries::new(0, vec![90.0; 24])).unwrap())
            .unwrap();
        builder.build()
    }

    #[test]
    fn scenario_s6_elcc_of_matching_static_unit_is_near_its_capacity() {
        let window = SimulationWindow::new(0, 24, 1, 0).unwrap();
        let solver =
            EffectiveLoadCarryingCapability::new(base_system_with_shortfall(), window, MetricKind::Eue);

        let mut additional = EnergySystemBuilder::new();
        additional
            .add_unit(StaticUnit::new(10, 1.0, TimeSeries::new(0, vec![1.0; 24])).unwrap())
            .unwrap();
        let additional = additional.build();

        let result = solver.evaluate(&additional).unwrap();
        assert!((result.capacity_credit_mw - 1.0).abs() < 0.05);
    }

    #[test]
    fn elcc_bounds_are_within_zero_and_nameplate() {
        let window = SimulationWindow::new(0, 24, 1, 0).unwrap();
        let solver =
            EffectiveLoadCarryingCapability::new(base_system_with_shortfall(), window, MetricKind::Eue);

        let mut additional = EnergySystemBuilder::new();
        additional
            .add_unit(StaticUnit::new(10, 50.0, TimeSeries::new(0, vec![50.0; 24])).unwrap())
            .unwrap();
        let additional = additional.build();

        let result = solver.evaluate(&additional).unwrap();
        assert!(result.capacity_credit_mw >= 0.0);
        assert!(result.capacity_credit_mw <= 50.0 + 1e-6);
    }

    #[test]
    fn perfectly_adequate_additional_system_returns_hi_bound() {
        let window = SimulationWindow::new(0, 24, 1, 0).unwrap();
        let solver =
            EffectiveLoadCarryingCapability::new(base_system_with_shortfall(), window, MetricKind::Eue);

        let mut additional = EnergySystemBuilder::new();
        additional
            .add_unit(StaticUnit::new(10, 1000.0, TimeSeries::new(0, vec![1000.0; 24])).unwrap())
            .unwrap();
        let additional = additional.build();

        let result = solver.evaluate(&additional).unwrap();
        assert_eq!(result.capacity_credit_mw, 1000.0);
        assert!(matches!(result.final_state, SolverState::Converged { .. }));
    }
}
