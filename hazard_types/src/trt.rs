//! Tectonic region types
//!
//! Seismotectonic classifications as they appear in source models and
//! gsim logic trees (`applyToTectonicRegionType`).

pub const ACTIVE_SHALLOW_CRUST: &str = "Active Shallow Crust";
pub const STABLE_CONTINENTAL: &str = "Stable Continental Crust";
pub const SUBDUCTION_INTERFACE: &str = "Subduction Interface";
pub const SUBDUCTION_INTRASLAB: &str = "Subduction IntraSlab";
pub const UPPER_MANTLE: &str = "Upper Mantle";
pub const VOLCANIC: &str = "Volcanic";
pub const INDUCED: &str = "Induced";
pub const GEOTHERMAL: &str = "Geothermal";

/// Every tectonic region type known to the built-in models
pub const ALL: &[&str] = &[
    ACTIVE_SHALLOW_CRUST,
    STABLE_CONTINENTAL,
    SUBDUCTION_INTERFACE,
    SUBDUCTION_INTRASLAB,
    UPPER_MANTLE,
    VOLCANIC,
    INDUCED,
    GEOTHERMAL,
];

/// Key of a per-TRT mapping that applies to every region without an entry
pub const DEFAULT_KEY: &str = "default";
