//! An [`EnergySystem`] is an immutable, id-ordered collection of units built
//! via [`EnergySystemBuilder`].

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::EngineError;
use crate::io::persistence;
use crate::units::{Unit, UnitKind};

/// Accumulates units before freezing them into an [`EnergySystem`].
#[derive(Debug, Clone, Default)]
pub struct EnergySystemBuilder {
    units: BTreeMap<u64, Unit>,
}

impl EnergySystemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `unit` to the system.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if a unit with the same id is already present.
    pub fn add_unit(&mut self, unit: impl Into<Unit>) -> Result<(), EngineError> {
        let unit = unit.into();
        let id = unit.id();
        if self.units.contains_key(&id) {
            return Err(EngineError::DuplicateId { id });
        }
        self.units.insert(id, unit);
        Ok(())
    }

    /// Removes the unit with `id`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownId` if no unit with `id` is present.
    pub fn remove_unit(&mut self, id: u64) -> Result<(), EngineError> {
        if self.units.remove(&id).is_none() {
            return Err(EngineError::UnknownId { id });
        }
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.units.len()
    }

    /// Freezes the builder into an [`EnergySystem`].
    pub fn build(self) -> EnergySystem {
        EnergySystem { units: self.units }
    }
}

/// An immutable, id-ordered collection of units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnergySystem {
    units: BTreeMap<u64, Unit>,
}

impl EnergySystem {
    pub fn size(&self) -> usize {
        self.units.len()
    }

    pub fn get(&self, id: u64) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Units in ascending id order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Units of `kind`, in ascending id order.
    pub fn units_by_kind(&self, kind: UnitKind) -> Vec<&Unit> {
        self.units.values().filter(|u| u.kind() == kind).collect()
    }

    /// Sum of nameplate capacity over every non-demand unit.
    pub fn system_capacity(&self) -> f64 {
        self.units
            .values()
            .filter(|u| u.kind() != UnitKind::Demand)
            .map(Unit::nameplate_capacity)
            .sum()
    }

    /// Persists this system to `dir` (see [`crate::io::persistence`]).
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the directory or any backing file
    /// cannot be written.
    pub fn save(&self, dir: &Path) -> Result<(), EngineError> {
        persistence::save(self, dir)
    }

    /// Restores a system previously written with [`EnergySystem::save`].
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the manifest is missing, malformed, or
    /// carries an incompatible version.
    pub fn load(dir: &Path) -> Result<Self, EngineError> {
        persistence::load(dir)
    }
}
