//! Hazard Types - Level 1 Foundation Types
//!
//! Pure data structures shared by the configuration engine and by anything
//! that consumes a validated job: intensity measure types, tectonic region
//! types, and intensity measure components.
//!
//! ## Critical Rules
//!
//! 1. **NO WORKSPACE DEPENDENCIES** - every other crate builds on this one
//! 2. **SERIALIZABLE** - all types support serde
//! 3. **TOTAL ORDER** - IMTs are map keys and sort coefficient tables and
//!    output columns, so their ordering must be total and consistent with
//!    equality

pub mod imc;
pub mod imt;
pub mod trt;

pub use imc::IntensityMeasureComponent;
pub use imt::{python_float, Imt, ImtError, DEFAULT_DAMPING};
