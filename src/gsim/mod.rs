//! Ground-motion models as seen by the validation engine
//!
//! Validation only needs what a model *declares*: its tectonic region type,
//! the IMT families it supports, and the site, rupture and distance
//! parameters it requires. That is [`GsimSignature`]. Models that can also
//! predict ground motion implement [`GroundMotionModel`]; the equations
//! themselves live with the calculators, not here.
//!
//! # Usage
//!
//! ```
//! use oq_config::gsim::{GsimRegistry, GsimSignature};
//! use hazard_types::Imt;
//!
//! let registry = GsimRegistry::builtin();
//! let toro = registry.get("ToroEtAl2002").unwrap();
//! assert!(toro.accepts(&Imt::pga()));
//! assert!(!toro.accepts(&Imt::from_string("PGV").unwrap()));
//! ```

mod catalogue;
pub mod logic_tree;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use hazard_types::{Imt, IntensityMeasureComponent};
use thiserror::Error;

pub use catalogue::{builtin_declarations, GsimDeclaration};
pub use logic_tree::{GsimLogicTree, LogicTreeError};

// =============================================================================
// CAPABILITY INTERFACES
// =============================================================================

/// Declarations of a ground-motion model
pub trait GsimSignature: Send + Sync {
    fn name(&self) -> &str;

    fn tectonic_region_type(&self) -> &str;

    /// Supported IMT families (`"PGA"`, `"SA"`, ...)
    fn intensity_measure_types(&self) -> &[&'static str];

    fn intensity_measure_component(&self) -> IntensityMeasureComponent;

    fn required_site_parameters(&self) -> &[&'static str];

    fn required_rupture_parameters(&self) -> &[&'static str];

    fn required_distances(&self) -> &[&'static str];

    /// True if the model supports the IMT's family
    fn accepts(&self, imt: &Imt) -> bool {
        self.intensity_measure_types().contains(&imt.family())
    }
}

/// Site, rupture and distance values for one rupture and N sites
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GmfContext {
    pub sites: BTreeMap<String, Vec<f64>>,
    pub rupture: BTreeMap<String, f64>,
    pub distances: BTreeMap<String, Vec<f64>>,
}

impl GmfContext {
    pub fn num_sites(&self) -> usize {
        self.distances
            .values()
            .chain(self.sites.values())
            .map(Vec::len)
            .next()
            .unwrap_or(0)
    }

    /// Names the model requires but the context lacks
    pub fn missing_for(&self, model: &dyn GsimSignature) -> Vec<String> {
        let sites = model
            .required_site_parameters()
            .iter()
            .filter(|p| !self.sites.contains_key(**p));
        let rupture = model
            .required_rupture_parameters()
            .iter()
            .filter(|p| !self.rupture.contains_key(**p));
        let distances = model
            .required_distances()
            .iter()
            .filter(|p| !self.distances.contains_key(**p));
        sites.chain(rupture).chain(distances).map(|p| p.to_string()).collect()
    }
}

/// Per-IMT, per-site prediction: natural-log mean and standard deviations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GmfPrediction {
    pub mean: Vec<Vec<f64>>,
    pub sig: Vec<Vec<f64>>,
    pub tau: Vec<Vec<f64>>,
    pub phi: Vec<Vec<f64>>,
}

impl GmfPrediction {
    /// Zero-filled arrays of shape (imts, sites)
    pub fn zeros(num_imts: usize, num_sites: usize) -> Self {
        let zeros = vec![vec![0.0; num_sites]; num_imts];
        Self {
            mean: zeros.clone(),
            sig: zeros.clone(),
            tau: zeros.clone(),
            phi: zeros,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GsimError {
    #[error("{gsim} requires {missing:?}")]
    MissingContext { gsim: String, missing: Vec<String> },

    #[error("The IMT {imt} is not accepted by the GSIM [{gsim}]")]
    UnsupportedImt { gsim: String, imt: String },
}

/// A model that can predict ground motion
pub trait GroundMotionModel: GsimSignature {
    fn compute(&self, ctx: &GmfContext, imts: &[Imt]) -> Result<GmfPrediction, GsimError>;

    /// Check that `ctx` and `imts` are usable before calling `compute`
    fn check_inputs(&self, ctx: &GmfContext, imts: &[Imt]) -> Result<(), GsimError> {
        let missing = ctx.missing_for(self.as_signature());
        if !missing.is_empty() {
            return Err(GsimError::MissingContext {
                gsim: self.name().to_string(),
                missing,
            });
        }
        if let Some(imt) = imts.iter().find(|imt| !self.accepts(imt)) {
            return Err(GsimError::UnsupportedImt {
                gsim: self.name().to_string(),
                imt: imt.to_string(),
            });
        }
        Ok(())
    }

    fn as_signature(&self) -> &dyn GsimSignature;
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Models known by name
#[derive(Clone, Default)]
pub struct GsimRegistry {
    signatures: BTreeMap<String, Arc<dyn GsimSignature>>,
    models: BTreeMap<String, Arc<dyn GroundMotionModel>>,
}

static BUILTIN: LazyLock<Arc<GsimRegistry>> = LazyLock::new(|| {
    let mut registry = GsimRegistry::default();
    for declaration in builtin_declarations() {
        registry.declare(declaration);
    }
    Arc::new(registry)
});

impl GsimRegistry {
    /// Registry holding the built-in declarations
    pub fn builtin() -> Arc<GsimRegistry> {
        Arc::clone(&BUILTIN)
    }

    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration-only model
    pub fn declare<S: GsimSignature + 'static>(&mut self, signature: S) {
        self.signatures
            .insert(signature.name().to_string(), Arc::new(signature));
    }

    /// Add a model that can compute; it also becomes visible to validation
    pub fn register<M: GroundMotionModel + 'static>(&mut self, model: M) {
        let name = model.name().to_string();
        let model = Arc::new(model);
        self.signatures.insert(name.clone(), model.clone());
        self.models.insert(name, model);
    }

    pub fn get(&self, name: &str) -> Option<&dyn GsimSignature> {
        self.signatures.get(name).map(|s| s.as_ref())
    }

    /// A computing model, if one was registered under `name`
    pub fn model(&self, name: &str) -> Option<Arc<dyn GroundMotionModel>> {
        self.models.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.signatures.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.signatures.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

impl fmt::Debug for GsimRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GsimRegistry")
            .field("signatures", &self.signatures.len())
            .field("models", &self.models.keys().collect::<Vec<_>>())
            .finish()
    }
}
