//! Directory-based save/load for an [`EnergySystem`].
//!
//! A saved system is a directory containing `manifest.toml` (unit ids, kinds,
//! and scalar attributes) plus one `<id>_<field>.csv` file per time-series
//! attribute, each with `hour,value` columns.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::array::TimeSeries;
use crate::error::EngineError;
use crate::system::{EnergySystem, EnergySystemBuilder};
use crate::units::{DemandUnit, StaticUnit, StochasticUnit, StorageUnit};

const MANIFEST_VERSION: u32 = 1;
const MANIFEST_FILE_NAME: &str = "manifest.toml";

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    version: u32,
    units: Vec<ManifestUnit>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ManifestUnit {
    Demand { id: u64 },
    Static { id: u64, nameplate_capacity: f64 },
    Stochastic { id: u64, nameplate_capacity: f64 },
    Storage {
        id: u64,
        nameplate_capacity: f64,
        charge_rate: f64,
        discharge_rate: f64,
        charge_capacity: f64,
        roundtrip_efficiency: f64,
    },
}

fn series_file_name(id: u64, field: &str) -> String {
    format!("{id}_{field}.csv")
}

fn persistence_err(message: impl Into<String>) -> EngineError {
    EngineError::PersistenceError {
        message: message.into(),
    }
}

fn write_time_series(dir: &Path, id: u64, field: &str, series: &TimeSeries) -> Result<(), EngineError> {
    let path = dir.join(series_file_name(id, field));
    let file = fs::File::create(&path)
        .map_err(|e| persistence_err(format!("cannot create \"{}\": {e}", path.display())))?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(["hour", "value"])
        .map_err(|e| persistence_err(e.to_string()))?;
    for (offset, &value) in series.values().iter().enumerate() {
        let hour = series.start_hour() + offset as i64;
        wtr.write_record([hour.to_string(), value.to_string()])
            .map_err(|e| persistence_err(e.to_string()))?;
    }
    wtr.flush()
        .map_err(|e| persistence_err(format!("cannot flush \"{}\": {e}", path.display())))
}

fn read_time_series(dir: &Path, id: u64, field: &str) -> Result<TimeSeries, EngineError> {
    let path = dir.join(series_file_name(id, field));
    let mut rdr = csv::ReaderBuilder::new()
        .from_path(&path)
        .map_err(|e| persistence_err(format!("cannot read \"{}\": {e}", path.display())))?;

    let mut start_hour = None;
    let mut values = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| persistence_err(e.to_string()))?;
        let hour: i64 = record
            .get(0)
            .ok_or_else(|| persistence_err("missing hour column"))?
            .parse()
            .map_err(|e| persistence_err(format!("invalid hour: {e}")))?;
        let value: f64 = record
            .get(1)
            .ok_or_else(|| persistence_err("missing value column"))?
            .parse()
            .map_err(|e| persistence_err(format!("invalid value: {e}")))?;
        if start_hour.is_none() {
            start_hour = Some(hour);
        }
        values.push(value);
    }
    Ok(TimeSeries::new(start_hour.unwrap_or(0), values))
}

/// Writes `system` to `dir`, creating it if necessary.
///
/// # Errors
///
/// Returns `PersistenceError` if the directory cannot be created or any
/// manifest/series file cannot be written.
pub fn save(system: &EnergySystem, dir: &Path) -> Result<(), EngineError> {
    fs::create_dir_all(dir)
        .map_err(|e| persistence_err(format!("cannot create \"{}\": {e}", dir.display())))?;

    let mut manifest_units = Vec::with_capacity(system.size());
    for unit in system.units() {
        match unit {
            crate::units::Unit::Demand(d) => {
                write_time_series(dir, d.id(), "hourly_demand", d.hourly_demand())?;
                manifest_units.push(ManifestUnit::Demand { id: d.id() });
            }
            crate::units::Unit::Static(s) => {
                write_time_series(dir, s.id(), "hourly_capacity", s.hourly_capacity())?;
                manifest_units.push(ManifestUnit::Static {
                    id: s.id(),
                    nameplate_capacity: s.nameplate_capacity(),
                });
            }
            crate::units::Unit::Stochastic(s) => {
                write_time_series(dir, s.id(), "hourly_capacity", s.hourly_capacity())?;
                write_time_series(
                    dir,
                    s.id(),
                    "hourly_forced_outage_rate",
                    s.hourly_forced_outage_rate(),
                )?;
                manifest_units.push(ManifestUnit::Stochastic {
                    id: s.id(),
                    nameplate_capacity: s.nameplate_capacity(),
                });
            }
            crate::units::Unit::Storage(s) => {
                manifest_units.push(ManifestUnit::Storage {
                    id: s.id(),
                    nameplate_capacity: s.nameplate_capacity(),
                    charge_rate: s.charge_rate(),
                    discharge_rate: s.discharge_rate(),
                    charge_capacity: s.charge_capacity(),
                    roundtrip_efficiency: s.roundtrip_efficiency(),
                });
            }
        }
    }

    let manifest = Manifest {
        version: MANIFEST_VERSION,
        units: manifest_units,
    };
    let toml_text = toml::to_string_pretty(&manifest).map_err(|e| persistence_err(e.to_string()))?;
    fs::write(dir.join(MANIFEST_FILE_NAME), toml_text)
        .map_err(|e| persistence_err(format!("cannot write manifest: {e}")))?;
    Ok(())
}

/// Reconstructs an [`EnergySystem`] from `dir`.
///
/// # Errors
///
/// Returns `PersistenceError` if the manifest is missing, malformed, has an
/// incompatible `version`, or a referenced series file cannot be read.
pub fn load(dir: &Path) -> Result<EnergySystem, EngineError> {
    let manifest_path = dir.join(MANIFEST_FILE_NAME);
    let text = fs::read_to_string(&manifest_path)
        .map_err(|e| persistence_err(format!("cannot read \"{}\": {e}", manifest_path.display())))?;
    let manifest: Manifest = toml::from_str(&text).map_err(|e| persistence_err(e.to_string()))?;

    if manifest.version != MANIFEST_VERSION {
        return Err(persistence_err(format!(
            "unsupported manifest version {} (expected {MANIFEST_VERSION})",
            manifest.version
        )));
    }

    let mut builder = EnergySystemBuilder::new();
    for entry in manifest.units {
        let unit = match entry {
            ManifestUnit::Demand { id } => {
                let hourly_demand = read_time_series(dir, id, "hourly_demand")?;
                DemandUnit::new(id, hourly_demand)?.into()
            }
            ManifestUnit::Static {
                id,
                nameplate_capacity,
            } => {
                let hourly_capacity = read_time_series(dir, id, "hourly_capacity")?;
                StaticUnit::new(id, nameplate_capacity, hourly_capacity)?.into()
            }
            ManifestUnit::Stochastic {
                id,
                nameplate_capacity,
            } => {
                let hourly_capacity = read_time_series(dir, id, "hourly_capacity")?;
                let hourly_forced_outage_rate =
                    read_time_series(dir, id, "hourly_forced_outage_rate")?;
                StochasticUnit::new(
                    id,
                    nameplate_capacity,
                    hourly_capacity,
                    hourly_forced_outage_rate,
                )?
                .into()
            }
            ManifestUnit::Storage {
                id,
                nameplate_capacity,
                charge_rate,
                discharge_rate,
                charge_capacity,
                roundtrip_efficiency,
            } => StorageUnit::new(
                id,
                nameplate_capacity,
                charge_rate,
                discharge_rate,
                charge_capacity,
                roundtrip_efficiency,
            )?
            .into(),
        };
        builder.add_unit(unit)?;
    }
    Ok(builder.build())
}
