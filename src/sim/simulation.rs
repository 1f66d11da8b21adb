//! The Monte Carlo engine: turns an [`EnergySystem`] into a net capacity matrix.

use rand::Rng;

use crate::array::NetCapacityMatrix;
use crate::error::EngineError;
use crate::rng;
use crate::system::EnergySystem;
use crate::units::{Unit, UnitKind};

/// Configuration for one [`ProbabilisticSimulation`] run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationWindow {
    pub start_hour: i64,
    pub end_hour: i64,
    pub trial_size: usize,
    pub seed: u64,
}

impl SimulationWindow {
    pub fn new(start_hour: i64, end_hour: i64, trial_size: usize, seed: u64) -> Result<Self, EngineError> {
        if start_hour >= end_hour {
            return Err(EngineError::InvalidWindow {
                start_hour,
                end_hour,
            });
        }
        Ok(Self {
            start_hour,
            end_hour,
            trial_size,
            seed,
        })
    }

    pub fn hours(&self) -> usize {
        (self.end_hour - self.start_hour) as usize
    }
}

/// Produces the (hour × trial) net capacity matrix for an [`EnergySystem`].
///
/// A simulation is single-owner: `assign_energy_system` replaces the
/// assigned system and discards any previously computed matrix; `run()`
/// is idempotent given unchanged state.
#[derive(Debug, Clone)]
pub struct ProbabilisticSimulation {
    window: SimulationWindow,
    system: Option<EnergySystem>,
    ncm: Option<NetCapacityMatrix>,
}

impl ProbabilisticSimulation {
    pub fn new(window: SimulationWindow) -> Self {
        Self {
            window,
            system: None,
            ncm: None,
        }
    }

    pub fn window(&self) -> SimulationWindow {
        self.window
    }

    /// Assigns `system` to this simulation, invalidating any prior result.
    pub fn assign_energy_system(&mut self, system: EnergySystem) {
        self.system = Some(system);
        self.ncm = None;
    }

    /// Computes the net capacity matrix for the assigned system.
    ///
    /// # Errors
    ///
    /// Returns `NoSystemAssigned` if no system has been assigned, or
    /// `InvalidUnit` if a NaN value appears anywhere in the result.
    pub fn run(&mut self) -> Result<(), EngineError> {
        let system = self.system.as_ref().ok_or(EngineError::NoSystemAssigned)?;
        let start_hour = self.window.start_hour;
        let end_hour = self.window.end_hour;
        let hours = self.window.hours();
        let trials = self.window.trial_size;
        let mut ncm = NetCapacityMatrix::zeros(hours, trials);

        for unit in system.units() {
            match unit {
                Unit::Demand(d) => {
                    let values = d.hourly_demand().slice(start_hour, end_hour)?;
                    for (h, &v) in values.iter().enumerate() {
                        ncm.add_row_broadcast(h, -v);
                    }
                }
                Unit::Static(s) => {
                    let values = s.hourly_capacity().slice(start_hour, end_hour)?;
                    for (h, &v) in values.iter().enumerate() {
                        ncm.add_row_broadcast(h, v);
                    }
                }
                Unit::Stochastic(_) => {}
                Unit::Storage(_) => {}
            }
        }

        for unit in system.units_by_kind(UnitKind::Stochastic) {
            let Unit::Stochastic(s) = unit else {
                unreachable!()
            };
            let capacity = s.hourly_capacity().slice(start_hour, end_hour)?;
            let outage_rate = s.hourly_forced_outage_rate().slice(start_hour, end_hour)?;
            let mut unit_rng = rng::unit_rng(self.window.seed, s.id());
            for (h, (&cap, &rate)) in capacity.iter().zip(outage_rate.iter()).enumerate() {
                for t in 0..trials {
                    let draw: f64 = unit_rng.random();
                    if draw >= rate {
                        ncm.add_at(h, t, cap);
                    }
                }
            }
        }

        for unit in system.units_by_kind(UnitKind::Storage) {
            let Unit::Storage(storage) = unit else {
                unreachable!()
            };
            storage.dispatch(&mut ncm);
        }

        if ncm.has_nan() {
            return Err(EngineError::InvalidUnit {
                id: 0,
                reason: "net capacity matrix contains NaN after run()".to_string(),
            });
        }

        self.ncm = Some(ncm);
        Ok(())
    }

    /// Read-only view of the computed matrix.
    ///
    /// # Errors
    ///
    /// Returns `NotRun` if `run()` has not yet succeeded.
    pub fn net_hourly_capacity_matrix(&self) -> Result<&NetCapacityMatrix, EngineError> {
        self.ncm.as_ref().ok_or(EngineError::NotRun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::TimeSeries;
    use crate::system::EnergySystemBuilder;
    use crate::units::{DemandUnit, StaticUnit, StochasticUnit, StorageUnit};

    fn window(hours: i64, trials: usize, seed: u64) -> SimulationWindow {
        SimulationWindow::new(0, hours, trials, seed).unwrap()
    }

    #[test]
    fn run_without_system_fails() {
        let mut sim = ProbabilisticSimulation::new(window(4, 1, 0));
        assert!(matches!(sim.run(), Err(EngineError::NoSystemAssigned)));
    }

    #[test]
    fn ncm_access_before_run_fails() {
        let sim = ProbabilisticSimulation::new(window(4, 1, 0));
        assert!(matches!(
            sim.net_hourly_capacity_matrix(),
            Err(EngineError::NotRun)
        ));
    }

    #[test]
    fn empty_system_yields_all_zeros() {
        let mut sim = ProbabilisticSimulation::new(window(4, 3, 1));
        sim.assign_energy_system(EnergySystemBuilder::new().build());
        sim.run().unwrap();
        let ncm = sim.net_hourly_capacity_matrix().unwrap();
        for h in 0..4 {
            for t in 0..3 {
                assert_eq!(ncm.get(h, t), 0.0);
            }
        }
    }

    #[test]
    fn scenario_s1_trivial_adequacy() {
        let mut builder = EnergySystemBuilder::new();
        builder
            .add_unit(DemandUnit::constant(1, 0, 8760, 100.0).unwrap())
            .unwrap();
        builder
            .add_unit(StaticUnit::new(2, 200.0, TimeSeries::new(0, vec![200.0; 8760])).unwrap())
            .unwrap();
        let mut sim = ProbabilisticSimulation::new(window(8760, 5, 7));
        sim.assign_energy_system(builder.build());
        sim.run().unwrap();
        let ncm = sim.net_hourly_capacity_matrix().unwrap();
        for h in [0usize, 100, 8759] {
            for t in 0..5 {
                assert_eq!(ncm.get(h, t), 100.0);
            }
        }
    }

    #[test]
    fn scenario_s2_all_outage() {
        let mut builder = EnergySystemBuilder::new();
        builder
            .add_unit(DemandUnit::constant(1, 0, 10, 100.0).unwrap())
            .unwrap();
        builder
            .add_unit(
                StochasticUnit::new(
                    2,
                    100.0,
                    TimeSeries::new(0, vec![100.0; 10]),
                    TimeSeries::new(0, vec![1.0; 10]),
                )
                .unwrap(),
            )
            .unwrap();
        let mut sim = ProbabilisticSimulation::new(window(10, 50, 3));
        sim.assign_energy_system(builder.build());
        sim.run().unwrap();
        let ncm = sim.net_hourly_capacity_matrix().unwrap();
        for h in 0..10 {
            for t in 0..50 {
                assert_eq!(ncm.get(h, t), -100.0);
            }
        }
    }

    #[test]
    fn scenario_s3_storage_smoothing() {
        let mut builder = EnergySystemBuilder::new();
        builder
            .add_unit(
                DemandUnit::new(1, TimeSeries::new(0, vec![0.0, 200.0, 0.0, 200.0])).unwrap(),
            )
            .unwrap();
        builder
            .add_unit(StaticUnit::new(2, 100.0, TimeSeries::new(0, vec![100.0; 4])).unwrap())
            .unwrap();
        builder
            .add_unit(StorageUnit::new(3, 100.0, 100.0, 100.0, 100.0, 1.0).unwrap())
            .unwrap();
        let mut sim = ProbabilisticSimulation::new(window(4, 1, 0));
        sim.assign_energy_system(builder.build());
        sim.run().unwrap();
        let ncm = sim.net_hourly_capacity_matrix().unwrap();
        for h in 0..4 {
            assert_eq!(ncm.get(h, 0), 0.0);
        }
    }

    #[test]
    fn determinism_same_seed_same_matrix() {
        let mut builder = EnergySystemBuilder::new();
        builder
            .add_unit(
                StochasticUnit::new(
                    1,
                    50.0,
                    TimeSeries::new(0, vec![50.0; 24]),
                    TimeSeries::new(0, vec![0.3; 24]),
                )
                .unwrap(),
            )
            .unwrap();
        let system = builder.build();

        let mut sim_a = ProbabilisticSimulation::new(window(24, 20, 99));
        sim_a.assign_energy_system(system.clone());
        sim_a.run().unwrap();

        let mut sim_b = ProbabilisticSimulation::new(window(24, 20, 99));
        sim_b.assign_energy_system(system);
        sim_b.run().unwrap();

        assert_eq!(
            sim_a.net_hourly_capacity_matrix().unwrap(),
            sim_b.net_hourly_capacity_matrix().unwrap()
        );
    }

    #[test]
    fn zero_trial_size_yields_zero_width_axis() {
        let mut sim = ProbabilisticSimulation::new(window(4, 0, 0));
        sim.assign_energy_system(EnergySystemBuilder::new().build());
        sim.run().unwrap();
        assert_eq!(sim.net_hourly_capacity_matrix().unwrap().trials(), 0);
    }
}
