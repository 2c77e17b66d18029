//! oq-config: job configuration engine for seismic hazard calculations
//!
//! Turns a flat set of job parameters (usually a `job.ini`) into a
//! validated, internally consistent [`OqParam`]:
//! - Parameter registry with per-key coercion rules and defaults
//! - Builder performing coercion and construction-time checks
//! - Ordered cross-field validators with tagged results
//! - GSIM declarations, registry and gsim logic tree reader
//! - INI reader/writer for round-tripping a validated job
//! - Calculator driver contract
//!
//! IMT values, tectonic region types and intensity measure components live
//! in the `hazard_types` crate.

pub mod calculator;
pub mod diagnostics;
pub mod error;
pub mod gsim;
pub mod imtls;
pub mod ini;
pub mod inputs;
pub mod literal;
pub mod loader;
pub mod oqparam;
pub mod registry;
pub mod validation;
pub mod values;

// Re-export commonly used types
pub use calculator::{launch, CalcId, Calculator};
pub use diagnostics::{Diagnostic, DiagnosticCode, Severity};
pub use error::{ErrorKind, OqError, OqResult};
pub use gsim::{GroundMotionModel, GsimRegistry, GsimSignature};
pub use imtls::IntensityMeasureSpec;
pub use inputs::{InputSet, InputSource};
pub use loader::JobIniLoader;
pub use oqparam::{JobParams, OqParam, OqParamBuilder};
pub use validation::RuleOutcome;
pub use values::{CalculationMode, MaximumDistance, ParamValue, Reference};

pub use hazard_types::Imt;
