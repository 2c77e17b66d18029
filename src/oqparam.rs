//! The calculation parameter object
//!
//! An [`OqParam`] is built once from raw key/value pairs plus an
//! [`InputSet`] through [`OqParamBuilder`], then validated in place by
//! [`OqParam::validate`]. Construction coerces every recognized key through
//! the Parameter Registry; unknown keys are reported as warnings and
//! dropped.
//!
//! # Usage
//!
//! ```
//! use oq_config::OqParam;
//!
//! let mut oq = OqParam::builder()
//!     .set("calculation_mode", "event_based")
//!     .set("sites", "0.1 0.2")
//!     .set("intensity_measure_types", "PGA")
//!     .set("ses_per_logic_tree_path", "10")
//!     .set("not_existing_param", "XXX")
//!     .build()
//!     .unwrap();
//! oq.validate().unwrap();
//! assert_eq!(oq.warnings().len(), 1);
//! assert_eq!(oq.imtls().names(), vec!["PGA"]);
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use hazard_types::Imt;
use tracing::{debug, info};

use crate::diagnostics::{self, Diagnostic, DiagnosticCode};
use crate::error::{OqError, OqResult};
use crate::gsim::{GsimLogicTree, GsimRegistry};
use crate::imtls::IntensityMeasureSpec;
use crate::inputs::{roles, InputSet, InputSource};
use crate::registry::{self, PARAMETERS};
use crate::validation::{self, RuleOutcome};
use crate::values::{
    CalculationMode, CorrelationModel, MaximumDistance, ParamValue, Point, Reference, TrtSet,
    Vs30Type,
};

// =============================================================================
// TYPED PARAMETERS
// =============================================================================

/// Every recognized parameter, coerced
#[derive(Debug, Clone, PartialEq)]
pub struct JobParams {
    // general
    pub calculation_mode: CalculationMode,
    pub description: String,
    pub hazard_calculation_id: Option<String>,
    pub random_seed: u64,
    pub ses_seed: u64,
    pub master_seed: u64,
    pub export_dir: PathBuf,
    pub exports: Vec<String>,

    // source model
    pub maximum_distance: Option<MaximumDistance>,
    pub investigation_time: Option<f64>,
    pub number_of_logic_tree_samples: u64,
    pub rupture_mesh_spacing: f64,
    pub complex_fault_mesh_spacing: Option<f64>,
    pub width_of_mfd_bin: Option<f64>,
    pub area_source_discretization: Option<f64>,

    // sites
    pub sites: Vec<Point>,
    pub region: Option<Vec<Point>>,
    pub region_grid_spacing: Option<f64>,
    pub reference_vs30_type: Reference<Vs30Type>,
    pub reference_vs30_value: Reference<f64>,
    pub reference_depth_to_1pt0km_per_sec: Reference<f64>,
    pub reference_depth_to_2pt5km_per_sec: Reference<f64>,
    pub reference_backarc: bool,

    // intensity measures
    pub intensity_measure_types_and_levels: Option<IntensityMeasureSpec>,
    pub intensity_measure_types: Vec<Imt>,
    pub minimum_intensity: BTreeMap<Imt, f64>,

    // ground motion
    pub gsim: Option<String>,
    pub truncation_level: Option<f64>,
    pub ground_motion_correlation_model: Option<CorrelationModel>,
    pub ground_motion_fields: bool,
    pub number_of_ground_motion_fields: Option<u64>,
    pub ses_per_logic_tree_path: u64,
    pub hazard_curves_from_gmfs: bool,

    // hazard outputs
    pub hazard_maps: bool,
    pub uniform_hazard_spectra: bool,
    pub mean: bool,
    pub quantiles: Vec<f64>,
    pub poes: Vec<f64>,

    // disaggregation
    pub poes_disagg: Vec<f64>,
    pub iml_disagg: BTreeMap<Imt, f64>,
    pub mag_bin_width: Option<f64>,
    pub distance_bin_width: Option<f64>,
    pub coordinate_bin_width: Option<f64>,
    pub num_epsilon_bins: u64,
    pub disagg_outputs: Vec<String>,
}

impl JobParams {
    /// All fields unset; registry defaults are applied by the builder
    pub fn new(calculation_mode: CalculationMode) -> Self {
        Self {
            calculation_mode,
            description: String::new(),
            hazard_calculation_id: None,
            random_seed: 0,
            ses_seed: 0,
            master_seed: 0,
            export_dir: PathBuf::new(),
            exports: Vec::new(),
            maximum_distance: None,
            investigation_time: None,
            number_of_logic_tree_samples: 0,
            rupture_mesh_spacing: 0.0,
            complex_fault_mesh_spacing: None,
            width_of_mfd_bin: None,
            area_source_discretization: None,
            sites: Vec::new(),
            region: None,
            region_grid_spacing: None,
            reference_vs30_type: Reference::Unspecified,
            reference_vs30_value: Reference::Unspecified,
            reference_depth_to_1pt0km_per_sec: Reference::Unspecified,
            reference_depth_to_2pt5km_per_sec: Reference::Unspecified,
            reference_backarc: false,
            intensity_measure_types_and_levels: None,
            intensity_measure_types: Vec::new(),
            minimum_intensity: BTreeMap::new(),
            gsim: None,
            truncation_level: None,
            ground_motion_correlation_model: None,
            ground_motion_fields: false,
            number_of_ground_motion_fields: None,
            ses_per_logic_tree_path: 0,
            hazard_curves_from_gmfs: false,
            hazard_maps: false,
            uniform_hazard_spectra: false,
            mean: false,
            quantiles: Vec::new(),
            poes: Vec::new(),
            poes_disagg: Vec::new(),
            iml_disagg: BTreeMap::new(),
            mag_bin_width: None,
            distance_bin_width: None,
            coordinate_bin_width: None,
            num_epsilon_bins: 0,
            disagg_outputs: Vec::new(),
        }
    }

    /// Store a coerced value into its field
    pub fn assign(&mut self, name: &str, value: ParamValue) -> OqResult<()> {
        use ParamValue as V;

        match (name, value) {
            ("calculation_mode", V::Mode(m)) => self.calculation_mode = m,
            ("description", V::Text(s)) => self.description = s,
            ("description", V::Null) => self.description.clear(),
            ("hazard_calculation_id", v) => self.hazard_calculation_id = opt_text(name, v)?,
            ("random_seed", V::Int(n)) => self.random_seed = n,
            ("ses_seed", V::Int(n)) => self.ses_seed = n,
            ("master_seed", V::Int(n)) => self.master_seed = n,
            ("export_dir", V::Path(p)) => self.export_dir = p,
            ("exports", V::Texts(v)) => self.exports = v,

            ("maximum_distance", V::Distance(d)) => self.maximum_distance = Some(d),
            ("maximum_distance", V::Null) => self.maximum_distance = None,
            ("investigation_time", v) => self.investigation_time = opt_float(name, v)?,
            ("number_of_logic_tree_samples", V::Int(n)) => self.number_of_logic_tree_samples = n,
            ("rupture_mesh_spacing", V::Float(f)) => self.rupture_mesh_spacing = f,
            ("complex_fault_mesh_spacing", v) => {
                self.complex_fault_mesh_spacing = opt_float(name, v)?
            }
            ("width_of_mfd_bin", v) => self.width_of_mfd_bin = opt_float(name, v)?,
            ("area_source_discretization", v) => {
                self.area_source_discretization = opt_float(name, v)?
            }

            ("sites", V::Points(p)) => self.sites = p,
            ("region", V::Points(p)) => self.region = Some(p),
            ("region", V::Null) => self.region = None,
            ("region_grid_spacing", v) => self.region_grid_spacing = opt_float(name, v)?,
            ("reference_vs30_type", V::Vs30Type(t)) => {
                self.reference_vs30_type = Reference::Value(t)
            }
            ("reference_vs30_type", V::Null) => self.reference_vs30_type = Reference::Null,
            ("reference_vs30_value", v) => self.reference_vs30_value = reference_float(name, v)?,
            ("reference_depth_to_1pt0km_per_sec", v) => {
                self.reference_depth_to_1pt0km_per_sec = reference_float(name, v)?
            }
            ("reference_depth_to_2pt5km_per_sec", v) => {
                self.reference_depth_to_2pt5km_per_sec = reference_float(name, v)?
            }
            ("reference_backarc", V::Bool(b)) => self.reference_backarc = b,

            ("intensity_measure_types_and_levels", V::Imtls(spec)) => {
                self.intensity_measure_types_and_levels = Some(spec)
            }
            ("intensity_measure_types_and_levels", V::Null) => {
                self.intensity_measure_types_and_levels = None
            }
            ("intensity_measure_types", V::Imts(v)) => self.intensity_measure_types = v,
            ("intensity_measure_types", V::Null) => self.intensity_measure_types.clear(),
            ("minimum_intensity", V::ImtFloats(m)) => self.minimum_intensity = m,

            ("gsim", V::Text(s)) => self.gsim = Some(s),
            ("gsim", V::Null) => self.gsim = None,
            ("truncation_level", v) => self.truncation_level = opt_float(name, v)?,
            ("ground_motion_correlation_model", V::Correlation(c)) => {
                self.ground_motion_correlation_model = Some(c)
            }
            ("ground_motion_correlation_model", V::Null) => {
                self.ground_motion_correlation_model = None
            }
            ("ground_motion_fields", V::Bool(b)) => self.ground_motion_fields = b,
            ("number_of_ground_motion_fields", V::Int(n)) => {
                self.number_of_ground_motion_fields = Some(n)
            }
            ("number_of_ground_motion_fields", V::Null) => {
                self.number_of_ground_motion_fields = None
            }
            ("ses_per_logic_tree_path", V::Int(n)) => self.ses_per_logic_tree_path = n,
            ("hazard_curves_from_gmfs", V::Bool(b)) => self.hazard_curves_from_gmfs = b,

            ("hazard_maps", V::Bool(b)) => self.hazard_maps = b,
            ("uniform_hazard_spectra", V::Bool(b)) => self.uniform_hazard_spectra = b,
            ("mean", V::Bool(b)) => self.mean = b,
            ("quantiles", V::Floats(v)) => self.quantiles = v,
            ("poes", V::Floats(v)) => self.poes = v,

            ("poes_disagg", V::Floats(v)) => self.poes_disagg = v,
            ("iml_disagg", V::ImtFloats(m)) => self.iml_disagg = m,
            ("mag_bin_width", v) => self.mag_bin_width = opt_float(name, v)?,
            ("distance_bin_width", v) => self.distance_bin_width = opt_float(name, v)?,
            ("coordinate_bin_width", v) => self.coordinate_bin_width = opt_float(name, v)?,
            ("num_epsilon_bins", V::Int(n)) => self.num_epsilon_bins = n,
            ("disagg_outputs", V::Texts(v)) => self.disagg_outputs = v,

            (name, V::Null) => {
                return Err(OqError::value(format!(
                    "The parameter '{}' cannot be None",
                    name
                )))
            }
            (name, other) => {
                return Err(OqError::value(format!(
                    "Unexpected {} value for the parameter '{}'",
                    other.kind(),
                    name
                )))
            }
        }
        Ok(())
    }

    /// Every set parameter as a typed value, in registry order
    pub fn entries(&self) -> Vec<(&'static str, ParamValue)> {
        use ParamValue as V;

        let float = |v: Option<f64>| v.map(V::Float);
        let reference = |r: &Reference<f64>| match r {
            Reference::Unspecified => None,
            Reference::Null => Some(V::Null),
            Reference::Value(f) => Some(V::Float(*f)),
        };

        PARAMETERS
            .iter()
            .filter_map(|spec| {
                let value = match spec.name {
                    "calculation_mode" => Some(V::Mode(self.calculation_mode)),
                    "description" => Some(V::Text(self.description.clone())),
                    "hazard_calculation_id" => self.hazard_calculation_id.clone().map(V::Text),
                    "random_seed" => Some(V::Int(self.random_seed)),
                    "ses_seed" => Some(V::Int(self.ses_seed)),
                    "master_seed" => Some(V::Int(self.master_seed)),
                    "export_dir" => Some(V::Path(self.export_dir.clone())),
                    "exports" => Some(V::Texts(self.exports.clone())),
                    "maximum_distance" => self.maximum_distance.clone().map(V::Distance),
                    "investigation_time" => float(self.investigation_time),
                    "number_of_logic_tree_samples" => {
                        Some(V::Int(self.number_of_logic_tree_samples))
                    }
                    "rupture_mesh_spacing" => Some(V::Float(self.rupture_mesh_spacing)),
                    "complex_fault_mesh_spacing" => float(self.complex_fault_mesh_spacing),
                    "width_of_mfd_bin" => float(self.width_of_mfd_bin),
                    "area_source_discretization" => float(self.area_source_discretization),
                    "sites" => Some(V::Points(self.sites.clone())),
                    "region" => self.region.clone().map(V::Points),
                    "region_grid_spacing" => float(self.region_grid_spacing),
                    "reference_vs30_type" => match self.reference_vs30_type {
                        Reference::Unspecified => None,
                        Reference::Null => Some(V::Null),
                        Reference::Value(t) => Some(V::Vs30Type(t)),
                    },
                    "reference_vs30_value" => reference(&self.reference_vs30_value),
                    "reference_depth_to_1pt0km_per_sec" => {
                        reference(&self.reference_depth_to_1pt0km_per_sec)
                    }
                    "reference_depth_to_2pt5km_per_sec" => {
                        reference(&self.reference_depth_to_2pt5km_per_sec)
                    }
                    "reference_backarc" => Some(V::Bool(self.reference_backarc)),
                    "intensity_measure_types_and_levels" => self
                        .intensity_measure_types_and_levels
                        .clone()
                        .map(V::Imtls),
                    "intensity_measure_types" if !self.intensity_measure_types.is_empty() => {
                        Some(V::Imts(self.intensity_measure_types.clone()))
                    }
                    "minimum_intensity" => Some(V::ImtFloats(self.minimum_intensity.clone())),
                    "gsim" => self.gsim.clone().map(V::Text),
                    "truncation_level" => float(self.truncation_level),
                    "ground_motion_correlation_model" => {
                        self.ground_motion_correlation_model.map(V::Correlation)
                    }
                    "ground_motion_fields" => Some(V::Bool(self.ground_motion_fields)),
                    "number_of_ground_motion_fields" => {
                        self.number_of_ground_motion_fields.map(V::Int)
                    }
                    "ses_per_logic_tree_path" => Some(V::Int(self.ses_per_logic_tree_path)),
                    "hazard_curves_from_gmfs" => Some(V::Bool(self.hazard_curves_from_gmfs)),
                    "hazard_maps" => Some(V::Bool(self.hazard_maps)),
                    "uniform_hazard_spectra" => Some(V::Bool(self.uniform_hazard_spectra)),
                    "mean" => Some(V::Bool(self.mean)),
                    "quantiles" => Some(V::Floats(self.quantiles.clone())),
                    "poes" => Some(V::Floats(self.poes.clone())),
                    "poes_disagg" => Some(V::Floats(self.poes_disagg.clone())),
                    "iml_disagg" => Some(V::ImtFloats(self.iml_disagg.clone())),
                    "mag_bin_width" => float(self.mag_bin_width),
                    "distance_bin_width" => float(self.distance_bin_width),
                    "coordinate_bin_width" => float(self.coordinate_bin_width),
                    "num_epsilon_bins" => Some(V::Int(self.num_epsilon_bins)),
                    "disagg_outputs" => Some(V::Texts(self.disagg_outputs.clone())),
                    _ => None,
                };
                value.map(|v| (spec.name, v))
            })
            .collect()
    }
}

fn opt_float(name: &str, value: ParamValue) -> OqResult<Option<f64>> {
    match value {
        ParamValue::Float(f) => Ok(Some(f)),
        ParamValue::Null => Ok(None),
        other => Err(mismatch(name, &other)),
    }
}

fn opt_text(name: &str, value: ParamValue) -> OqResult<Option<String>> {
    match value {
        ParamValue::Text(s) => Ok(Some(s)),
        ParamValue::Null => Ok(None),
        other => Err(mismatch(name, &other)),
    }
}

fn reference_float(name: &str, value: ParamValue) -> OqResult<Reference<f64>> {
    match value {
        ParamValue::Float(f) => Ok(Reference::Value(f)),
        ParamValue::Null => Ok(Reference::Null),
        other => Err(mismatch(name, &other)),
    }
}

fn mismatch(name: &str, value: &ParamValue) -> OqError {
    OqError::value(format!(
        "Unexpected {} value for the parameter '{}'",
        value.kind(),
        name
    ))
}

// =============================================================================
// BUILDER
// =============================================================================

/// Collects raw values and inputs, then coerces them into an [`OqParam`]
#[derive(Debug, Default)]
pub struct OqParamBuilder {
    raw: BTreeMap<String, Option<String>>,
    inputs: InputSet,
    trts: TrtSet,
    registry: Option<Arc<GsimRegistry>>,
    diagnostics: Vec<Diagnostic>,
}

impl OqParamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw text value, as found in a job file
    pub fn set(mut self, name: impl Into<String>, raw: impl Into<String>) -> Self {
        self.raw.insert(name.into(), Some(raw.into()));
        self
    }

    /// Explicit `None`
    pub fn set_null(mut self, name: impl Into<String>) -> Self {
        self.raw.insert(name.into(), None);
        self
    }

    /// Many raw values at once; `None` means an explicit `None`
    pub fn params<K, V>(mut self, params: impl IntoIterator<Item = (K, Option<V>)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (name, raw) in params {
            self.raw.insert(name.into(), raw.map(Into::into));
        }
        self
    }

    pub fn input(mut self, role: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.inputs.insert_path(role, path);
        self
    }

    /// Input given by content rather than by file
    pub fn inline_input(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.inputs.insert(role, InputSource::Inline(content.into()));
        self
    }

    pub fn inputs(mut self, inputs: InputSet) -> Self {
        for (role, source) in inputs.iter() {
            self.inputs.insert(role, source.clone());
        }
        self
    }

    /// TRTs of the source model, merged with those of the gsim logic tree
    pub fn tectonic_region_types<S: Into<String>>(
        mut self,
        trts: impl IntoIterator<Item = S>,
    ) -> Self {
        self.trts.extend(trts.into_iter().map(Into::into));
        self
    }

    /// Registry used to resolve GSIM names; the built-in one by default
    pub fn gsim_registry(mut self, registry: Arc<GsimRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Carry a diagnostic produced while reading the raw values
    pub fn diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }

    /// Coerce every value and run the construction-time checks
    pub fn build(self) -> OqResult<OqParam> {
        let OqParamBuilder {
            raw,
            inputs,
            mut trts,
            registry: gsim_registry,
            diagnostics: mut diags,
        } = self;

        let mut values: BTreeMap<&'static str, ParamValue> = BTreeMap::new();
        for (name, raw_value) in &raw {
            match registry::describe(name) {
                Ok(spec) => {
                    let value = spec.rule.coerce(name, raw_value.as_deref())?;
                    values.insert(spec.name, value);
                }
                Err(_) => {
                    let diag = diagnostics::unknown_parameter(name);
                    diag.log();
                    diags.push(diag);
                }
            }
        }

        let mut resolved = Vec::with_capacity(PARAMETERS.len());
        for spec in PARAMETERS.iter() {
            let value = match values.remove(spec.name) {
                Some(value) => Some(value),
                None => spec.absent_value()?,
            };
            if let Some(value) = value {
                resolved.push((spec.name, value));
            }
        }

        let calculation_mode = resolved
            .iter()
            .find_map(|(_, value)| match value {
                ParamValue::Mode(mode) => Some(*mode),
                _ => None,
            })
            .ok_or_else(|| OqError::value("The parameter 'calculation_mode' cannot be None"))?;
        let mut params = JobParams::new(calculation_mode);
        for (name, value) in resolved {
            params.assign(name, value)?;
        }

        let gsims = match inputs.get(roles::GSIM_LOGIC_TREE) {
            Some(source) => {
                let tree = read_gsim_logic_tree(source)?;
                trts.extend(tree.trts());
                tree.gsim_names()
            }
            None => params.gsim.iter().cloned().collect(),
        };

        let imtls = match &params.intensity_measure_types_and_levels {
            Some(spec) => spec.clone(),
            None => IntensityMeasureSpec::from_imts(params.intensity_measure_types.iter().cloned()),
        };

        let mut oq = OqParam {
            params,
            inputs,
            trts,
            gsims,
            imtls,
            gsim_registry: gsim_registry.unwrap_or_else(GsimRegistry::builtin),
            diagnostics: diags,
            validated: false,
        };
        validation::run_construction_rules(&mut oq)?;

        debug!(
            "built job for calculation_mode={} with {} inputs",
            oq.params.calculation_mode,
            oq.inputs.len()
        );
        Ok(oq)
    }

    /// `build` followed by `validate`
    pub fn validated(self) -> OqResult<OqParam> {
        let mut oq = self.build()?;
        oq.validate()?;
        Ok(oq)
    }
}

fn read_gsim_logic_tree(source: &InputSource) -> OqResult<GsimLogicTree> {
    let content = source
        .read()
        .map_err(|e| OqError::invalid_file(format!("{}: {}", source.describe(), e)))?;
    GsimLogicTree::parse(&content)
        .map_err(|e| OqError::invalid_file(format!("{}: {}", source.describe(), e)))
}

// =============================================================================
// OQPARAM
// =============================================================================

/// A calculation specification
#[derive(Debug, Clone)]
pub struct OqParam {
    pub params: JobParams,
    pub inputs: InputSet,
    pub(crate) trts: TrtSet,
    pub(crate) gsims: Vec<String>,
    pub(crate) imtls: IntensityMeasureSpec,
    pub(crate) gsim_registry: Arc<GsimRegistry>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) validated: bool,
}

impl OqParam {
    pub fn builder() -> OqParamBuilder {
        OqParamBuilder::new()
    }

    pub fn calculation_mode(&self) -> CalculationMode {
        self.params.calculation_mode
    }

    /// Run every validator in order; the first failure is returned
    pub fn validate(&mut self) -> OqResult<()> {
        validation::run_rules(self)?;
        self.validated = true;
        info!(
            "validated job for calculation_mode={}",
            self.params.calculation_mode
        );
        Ok(())
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// Check `maximum_distance` against the current TRT set without raising
    pub fn is_valid_maximum_distance(&self) -> RuleOutcome {
        match &self.params.maximum_distance {
            Some(md) => validation::check_maximum_distance(md, &self.trts),
            None => RuleOutcome::Passed,
        }
    }

    /// Merge the IMTs implied by the risk model and recheck the uniform
    /// hazard spectra requirement.
    ///
    /// The merged set is written back to the IMT parameters so that
    /// [`to_ini`](Self::to_ini) carries it. A set mixing IMTs with and
    /// without levels has no job file form; the parameters then keep the
    /// hazard IMTs only.
    pub fn set_risk_imts(&mut self, risk_imtls: &BTreeMap<Imt, Vec<f64>>) -> OqResult<()> {
        for (imt, levels) in risk_imtls {
            self.imtls.insert_missing(imt.clone(), levels.clone());
        }
        self.sync_imt_params();
        if !self.params.uniform_hazard_spectra {
            return Ok(());
        }
        let qualifying = self
            .imtls
            .imts()
            .filter(|imt| imt.is_spectral_acceleration() || imt.name() == "PGA")
            .count();
        match qualifying {
            0 => Err(OqError::value(
                "The `uniform_hazard_spectra` can be True only if the IMT set contains SA(...) or PGA",
            )),
            1 => {
                self.record(
                    Diagnostic::warning(
                        DiagnosticCode::SinglePointSpectrum,
                        "There is a single IMT, the uniform_hazard_spectra plot will contain a single point",
                    )
                    .with_parameter("uniform_hazard_spectra"),
                );
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn sync_imt_params(&mut self) {
        if self.imtls.has_levels() {
            self.params.intensity_measure_types_and_levels = Some(self.imtls.clone());
            self.params.intensity_measure_types.clear();
        } else if self.imtls.iter().all(|(_, levels)| levels.is_empty()) {
            self.params.intensity_measure_types_and_levels = None;
            self.params.intensity_measure_types = self.imts();
        } else {
            debug!("IMT set {:?} mixes levels and bare IMTs", self.imtls.names());
        }
    }

    /// The effective IMT set
    pub fn imtls(&self) -> &IntensityMeasureSpec {
        &self.imtls
    }

    pub fn imts(&self) -> Vec<Imt> {
        self.imtls.imts().cloned().collect()
    }

    pub fn tectonic_region_types(&self) -> &TrtSet {
        &self.trts
    }

    /// Replace the TRT set, e.g. once the source model has been read
    pub fn set_tectonic_region_types<S: Into<String>>(&mut self, trts: impl IntoIterator<Item = S>) {
        self.trts = trts.into_iter().map(Into::into).collect();
    }

    /// GSIMs selected by `gsim` or by the gsim logic tree
    pub fn gsim_names(&self) -> &[String] {
        &self.gsims
    }

    pub fn gsim_registry(&self) -> &GsimRegistry {
        &self.gsim_registry
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning()).collect()
    }

    /// Serialize to a job file that rebuilds an equivalent object
    pub fn to_ini(&self) -> String {
        crate::ini::to_ini(self)
    }

    pub(crate) fn record(&mut self, diagnostic: Diagnostic) {
        diagnostic.log();
        self.diagnostics.push(diagnostic);
    }
}

/// Equivalence: same parameters, inputs (besides `job_ini`), TRTs, GSIMs
/// and effective IMTs. Diagnostics and validation state are not compared.
impl PartialEq for OqParam {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params
            && self.inputs.same_sources(&other.inputs)
            && self.trts == other.trts
            && self.gsims == other.gsims
            && self.imtls == other.imtls
    }
}
