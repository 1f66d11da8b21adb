//! Unit data model: the four resource kinds that compose an [`crate::system::EnergySystem`].

pub mod demand;
pub mod static_unit;
pub mod stochastic;
pub mod storage;

pub use demand::DemandUnit;
pub use static_unit::StaticUnit;
pub use stochastic::StochasticUnit;
pub use storage::StorageUnit;

/// Discriminant for a [`Unit`], used for system filtering and persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnitKind {
    Demand,
    Static,
    Stochastic,
    Storage,
}

impl UnitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Demand => "demand",
            Self::Static => "static",
            Self::Stochastic => "stochastic",
            Self::Storage => "storage",
        }
    }
}

/// A tagged resource in the energy system: one of four kinds, each with its
/// own contribution rule (see §4.1 of SPEC_FULL.md).
#[derive(Debug, Clone, PartialEq)]
pub enum Unit {
    Demand(DemandUnit),
    Static(StaticUnit),
    Stochastic(StochasticUnit),
    Storage(StorageUnit),
}

impl Unit {
    pub fn id(&self) -> u64 {
        match self {
            Self::Demand(u) => u.id(),
            Self::Static(u) => u.id(),
            Self::Stochastic(u) => u.id(),
            Self::Storage(u) => u.id(),
        }
    }

    pub fn nameplate_capacity(&self) -> f64 {
        match self {
            Self::Demand(u) => u.nameplate_capacity(),
            Self::Static(u) => u.nameplate_capacity(),
            Self::Stochastic(u) => u.nameplate_capacity(),
            Self::Storage(u) => u.nameplate_capacity(),
        }
    }

    pub fn kind(&self) -> UnitKind {
        match self {
            Self::Demand(_) => UnitKind::Demand,
            Self::Static(_) => UnitKind::Static,
            Self::Stochastic(_) => UnitKind::Stochastic,
            Self::Storage(_) => UnitKind::Storage,
        }
    }
}

impl From<DemandUnit> for Unit {
    fn from(u: DemandUnit) -> Self {
        Self::Demand(u)
    }
}

impl From<StaticUnit> for Unit {
    fn from(u: StaticUnit) -> Self {
        Self::Static(u)
    }
}

impl From<StochasticUnit> for Unit {
    fn from(u: StochasticUnit) -> Self {
        Self::Stochastic(u)
    }
}

impl From<StorageUnit> for Unit {
    fn from(u: StorageUnit) -> Self {
        Self::Storage(u)
    }
}
