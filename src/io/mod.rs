/// Directory-based save/load for an `EnergySystem`.
pub mod persistence;
