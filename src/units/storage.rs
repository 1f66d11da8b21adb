use crate::array::NetCapacityMatrix;
use crate::error::EngineError;

/// A stateful storage resource dispatched against the net capacity profile
/// left by all other units (see §4.1/§4.2 of SPEC_FULL.md).
///
/// Unlike the other unit kinds, storage has no fixed per-hour contribution:
/// its output depends on the running state of charge, which is integrated
/// forward independently for each trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StorageUnit {
    id: u64,
    nameplate_capacity: f64,
    charge_rate: f64,
    discharge_rate: f64,
    charge_capacity: f64,
    roundtrip_efficiency: f64,
}

impl StorageUnit {
    /// Creates a new storage unit.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUnit` if any rate/capacity is negative, or
    /// `roundtrip_efficiency` is outside `(0, 1]`.
    pub fn new(
        id: u64,
        nameplate_capacity: f64,
        charge_rate: f64,
        discharge_rate: f64,
        charge_capacity: f64,
        roundtrip_efficiency: f64,
    ) -> Result<Self, EngineError> {
        if nameplate_capacity < 0.0 || charge_rate < 0.0 || discharge_rate < 0.0 {
            return Err(EngineError::InvalidUnit {
                id,
                reason: "nameplate_capacity, charge_rate and discharge_rate must be >= 0"
                    .to_string(),
            });
        }
        if charge_capacity < 0.0 {
            return Err(EngineError::InvalidUnit {
                id,
                reason: "charge_capacity must be >= 0".to_string(),
            });
        }
        if !(roundtrip_efficiency > 0.0 && roundtrip_efficiency <= 1.0) {
            return Err(EngineError::InvalidUnit {
                id,
                reason: "roundtrip_efficiency must be in (0, 1]".to_string(),
            });
        }
        Ok(Self {
            id,
            nameplate_capacity,
            charge_rate,
            discharge_rate,
            charge_capacity,
            roundtrip_efficiency,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn nameplate_capacity(&self) -> f64 {
        self.nameplate_capacity
    }

    pub fn charge_rate(&self) -> f64 {
        self.charge_rate
    }

    pub fn discharge_rate(&self) -> f64 {
        self.discharge_rate
    }

    pub fn charge_capacity(&self) -> f64 {
        self.charge_capacity
    }

    pub fn roundtrip_efficiency(&self) -> f64 {
        self.roundtrip_efficiency
    }

    /// Dispatches this unit against `ncm` in place, over hours `[start_hour_idx, end_hour_idx)`.
    ///
    /// For each trial independently, state of charge starts at zero and is
    /// integrated forward across the hour axis per §4.2: round-trip
    /// efficiency is split symmetrically (`√η` on each leg).
    pub fn dispatch(&self, ncm: &mut NetCapacityMatrix) {
        let sqrt_eta = self.roundtrip_efficiency.sqrt();
        for trial in 0..ncm.trials() {
            let mut soc = 0.0_f64;
            for hour in 0..ncm.hours() {
                let n = ncm.get(hour, trial);
                let contribution = if n >= 0.0 && soc < self.charge_capacity {
                    let charged_energy = n.min(self.charge_rate).min(self.charge_capacity - soc);
                    soc += charged_energy * sqrt_eta;
                    soc = soc.clamp(0.0, self.charge_capacity);
                    -charged_energy
                } else if n < 0.0 && soc > 0.0 {
                    let demand_to_meet = -n;
                    let discharged_energy_at_bus = demand_to_meet
                        .min(self.discharge_rate)
                        .min(soc * sqrt_eta);
                    soc -= discharged_energy_at_bus / sqrt_eta;
                    soc = soc.clamp(0.0, self.charge_capacity);
                    discharged_energy_at_bus
                } else {
                    0.0
                };
                ncm.add_at(hour, trial, contribution);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(charge_rate: f64, discharge_rate: f64, capacity: f64, eta: f64) -> StorageUnit {
        StorageUnit::new(0, capacity, charge_rate, discharge_rate, capacity, eta).unwrap()
    }

    #[test]
    fn rejects_negative_rates() {
        let err = StorageUnit::new(0, 100.0, -1.0, 100.0, 100.0, 1.0).unwrap_err();
        assert!(matches!(err, EngineError::InvalidUnit { .. }));
    }

    #[test]
    fn rejects_efficiency_out_of_range() {
        assert!(StorageUnit::new(0, 100.0, 100.0, 100.0, 100.0, 0.0).is_err());
        assert!(StorageUnit::new(0, 100.0, 100.0, 100.0, 100.0, 1.5).is_err());
        assert!(StorageUnit::new(0, 100.0, 100.0, 100.0, 100.0, 1.0).is_ok());
    }

    #[test]
    fn smooths_alternating_surplus_deficit_with_perfect_efficiency() {
        // Pre-storage net profile: +100, -100, +100, -100 (scenario S3).
        let mut ncm = NetCapacityMatrix::zeros(4, 1);
        for (h, v) in [100.0, -100.0, 100.0, -100.0].into_iter().enumerate() {
            ncm.set(h, 0, v);
        }
        let storage = unit(100.0, 100.0, 100.0, 1.0);
        storage.dispatch(&mut ncm);
        assert_eq!(ncm.row(0)[0], 0.0);
        assert_eq!(ncm.row(1)[0], 0.0);
        assert_eq!(ncm.row(2)[0], 0.0);
        assert_eq!(ncm.row(3)[0], 0.0);
    }

    #[test]
    fn roundtrip_loss_halves_discharge_delivery() {
        // Scenario S4: same profile, eta = 0.5 -> sqrt_eta ~ 0.7071.
        let mut ncm = NetCapacityMatrix::zeros(4, 1);
        for (h, v) in [100.0, -100.0, 100.0, -100.0].into_iter().enumerate() {
            ncm.set(h, 0, v);
        }
        let storage = unit(100.0, 100.0, 100.0, 0.5);
        storage.dispatch(&mut ncm);
        assert!((ncm.row(0)[0] - 50.0).abs() < 1e-6);
        assert!((ncm.row(1)[0] - (-50.0)).abs() < 1e-6);
        assert!((ncm.row(2)[0] - 50.0).abs() < 1e-6);
        assert!((ncm.row(3)[0] - (-50.0)).abs() < 1e-6);
    }

    #[test]
    fn soc_never_exceeds_charge_capacity() {
        let mut ncm = NetCapacityMatrix::zeros(3, 1);
        ncm.set(0, 0, 1000.0);
        ncm.set(1, 0, 1000.0);
        ncm.set(2, 0, -1000.0);
        let storage = unit(50.0, 50.0, 100.0, 1.0);
        storage.dispatch(&mut ncm);
        // Charging is capped by charge_rate and remaining headroom each hour;
        // contribution never exceeds -charge_rate.
        assert!(ncm.row(0)[0] >= -50.0 - 1e-9);
        assert!(ncm.row(1)[0] >= -50.0 - 1e-9);
    }

    #[test]
    fn no_action_on_exact_zero_net() {
        let mut ncm = NetCapacityMatrix::zeros(1, 1);
        ncm.set(0, 0, 0.0);
        let storage = unit(50.0, 50.0, 100.0, 0.9);
        storage.dispatch(&mut ncm);
        assert_eq!(ncm.row(0)[0], 0.0);
    }

    #[test]
    fn multiple_trials_are_independent() {
        let mut ncm = NetCapacityMatrix::zeros(2, 2);
        ncm.set(0, 0, 100.0);
        ncm.set(1, 0, -100.0);
        ncm.set(0, 1, -100.0);
        ncm.set(1, 1, 100.0);
        let storage = unit(100.0, 100.0, 100.0, 1.0);
        storage.dispatch(&mut ncm);
        // trial 0: charge then discharge -> fully smoothed
        assert_eq!(ncm.get(0, 0), 0.0);
        assert_eq!(ncm.get(1, 0), 0.0);
        // trial 1: starts in deficit with empty SoC -> no discharge available
        assert_eq!(ncm.get(0, 1), -100.0);
    }
}
