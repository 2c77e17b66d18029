//! Cross-field validation rules
//!
//! Each rule inspects an [`OqParam`] and returns a [`RuleOutcome`]; the
//! runner escalates the first failure into an [`OqError`] of the rule's
//! kind. Rules run in table order because later ones rely on state
//! derived by earlier ones (the effective IMT set, derived `poes`).
//!
//! Two rules also run at construction time, since they concern the
//! applicability of the referenced inputs rather than the parameters:
//! scenario GMFs without a site model, and the disaggregation targets.

use std::fs;

use tracing::debug;

use crate::diagnostics::{self, Diagnostic, DiagnosticCode};
use crate::error::{OqError, OqResult};
use crate::gsim::GsimSignature;
use crate::inputs::roles;
use crate::oqparam::OqParam;
use crate::values::{float_list, name_list, CalculationMode, MaximumDistance, Reference, TrtSet};

// =============================================================================
// OUTCOMES
// =============================================================================

/// Result of a single rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Passed,
    Failed(String),
}

impl RuleOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, RuleOutcome::Passed)
    }

    /// The failure message, if any
    pub fn error(&self) -> Option<&str> {
        match self {
            RuleOutcome::Passed => None,
            RuleOutcome::Failed(msg) => Some(msg),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        RuleOutcome::Failed(message.into())
    }
}

/// Which error a failed rule becomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    Value,
    InvalidFile,
}

impl Escalation {
    fn error(self, message: String) -> OqError {
        match self {
            Escalation::Value => OqError::Value(message),
            Escalation::InvalidFile => OqError::InvalidFile(message),
        }
    }
}

/// A named validation rule
pub struct Rule {
    pub name: &'static str,
    pub escalation: Escalation,
    pub check: fn(&mut OqParam) -> RuleOutcome,
}

const fn rule(
    name: &'static str,
    escalation: Escalation,
    check: fn(&mut OqParam) -> RuleOutcome,
) -> Rule {
    Rule {
        name,
        escalation,
        check,
    }
}

/// Every rule run by `OqParam::validate`, in order
pub static RULES: &[Rule] = &[
    rule("export_dir", Escalation::Value, check_export_dir),
    rule("truncation_level", Escalation::Value, check_truncation_level),
    rule("region_grid_spacing", Escalation::Value, check_region_grid_spacing),
    rule("poes", Escalation::Value, check_poes),
    rule("site_model_parameters", Escalation::Value, check_site_model_parameters),
    rule("maximum_distance", Escalation::Value, check_maximum_distance_rule),
    rule("intensity_measure_types", Escalation::Value, check_imtls),
    rule("gsim_exclusivity", Escalation::InvalidFile, check_gsim_exclusivity),
    rule("gsim_imts", Escalation::Value, check_gsim_imts),
    rule("gsim_site_parameters", Escalation::Value, check_gsim_site_parameters),
    rule("correlation_model", Escalation::Value, check_correlation_model),
    rule("scenario_site_model", Escalation::InvalidFile, check_scenario_site_model),
    rule("disaggregation", Escalation::InvalidFile, check_disaggregation),
    rule("site_geometry", Escalation::Value, check_site_geometry),
    rule("iml_disagg", Escalation::Value, check_iml_disagg),
    rule("number_of_ground_motion_fields", Escalation::Value, check_scenario_gmf_count),
    rule("derived_fields", Escalation::Value, derive_fields),
];

static CONSTRUCTION_RULES: &[Rule] = &[
    rule("scenario_site_model", Escalation::InvalidFile, check_scenario_site_model),
    rule("disaggregation", Escalation::InvalidFile, check_disaggregation),
];

pub(crate) fn run_rules(oq: &mut OqParam) -> OqResult<()> {
    run(RULES, oq)
}

pub(crate) fn run_construction_rules(oq: &mut OqParam) -> OqResult<()> {
    run(CONSTRUCTION_RULES, oq)
}

fn run(rules: &[Rule], oq: &mut OqParam) -> OqResult<()> {
    for rule in rules {
        match (rule.check)(oq) {
            RuleOutcome::Passed => debug!("rule {} passed", rule.name),
            RuleOutcome::Failed(message) => return Err(rule.escalation.error(message)),
        }
    }
    Ok(())
}

// =============================================================================
// RULES
// =============================================================================

fn check_export_dir(oq: &mut OqParam) -> RuleOutcome {
    let dir = &oq.params.export_dir;
    if dir.exists() {
        if !dir.is_dir() {
            return RuleOutcome::fail(format!(
                "The `export_dir` parameter must refer to a directory, but {} is a file",
                dir.display()
            ));
        }
        return RuleOutcome::Passed;
    }
    match fs::create_dir_all(dir) {
        Ok(()) => {
            debug!("created export_dir {}", dir.display());
            RuleOutcome::Passed
        }
        Err(e) => RuleOutcome::fail(format!(
            "The `export_dir` parameter must refer to a directory, but {} cannot be created: {}",
            dir.display(),
            e
        )),
    }
}

fn check_truncation_level(oq: &mut OqParam) -> RuleOutcome {
    let mode = oq.params.calculation_mode;
    match oq.params.truncation_level {
        None if mode.needs_truncation_level() => RuleOutcome::fail(format!(
            "truncation_level cannot be None for calculation_mode={}",
            mode
        )),
        _ => RuleOutcome::Passed,
    }
}

fn check_region_grid_spacing(oq: &mut OqParam) -> RuleOutcome {
    if oq.params.region.is_some() && oq.params.region_grid_spacing.is_none() {
        return RuleOutcome::fail("You must set `region_grid_spacing` when `region` is set");
    }
    RuleOutcome::Passed
}

fn check_poes(oq: &mut OqParam) -> RuleOutcome {
    let p = &oq.params;
    if p.poes.is_empty() {
        if p.hazard_maps {
            return RuleOutcome::fail("`poes` must be set when `hazard_maps` is true");
        }
        if p.uniform_hazard_spectra {
            return RuleOutcome::fail("`poes` must be set when `uniform_hazard_spectra` is true");
        }
    }
    RuleOutcome::Passed
}

fn check_site_model_parameters(oq: &mut OqParam) -> RuleOutcome {
    if oq.inputs.contains(roles::SITE_MODEL) {
        return RuleOutcome::Passed;
    }
    let p = &oq.params;
    let nulls = [
        ("reference_vs30_type", p.reference_vs30_type.is_null()),
        ("reference_vs30_value", p.reference_vs30_value.is_null()),
        (
            "reference_depth_to_1pt0km_per_sec",
            p.reference_depth_to_1pt0km_per_sec.is_null(),
        ),
        (
            "reference_depth_to_2pt5km_per_sec",
            p.reference_depth_to_2pt5km_per_sec.is_null(),
        ),
    ];
    match nulls.iter().find(|(_, is_null)| *is_null) {
        Some((name, _)) => RuleOutcome::fail(format!(
            "The parameter '{}' cannot be None when there is no site_model",
            name
        )),
        None => RuleOutcome::Passed,
    }
}

/// Check a `maximum_distance` against the TRTs of the source model.
/// With no TRT information there is nothing to check.
pub fn check_maximum_distance(md: &MaximumDistance, trts: &TrtSet) -> RuleOutcome {
    let MaximumDistance::ByTrt(by_trt) = md else {
        return RuleOutcome::Passed;
    };
    if trts.is_empty() {
        return RuleOutcome::Passed;
    }
    let default = hazard_types::trt::DEFAULT_KEY;
    if let Some(extra) = by_trt
        .keys()
        .find(|key| key.as_str() != default && !trts.contains(*key))
    {
        return RuleOutcome::fail(format!(
            "invalid TRT: you are setting the maximum_distance for {} which is not in {}",
            extra,
            name_list(trts)
        ));
    }
    if !by_trt.contains_key(default) {
        if let Some(missing) = trts.iter().find(|trt| !by_trt.contains_key(*trt)) {
            return RuleOutcome::fail(format!("missing distance for {} and no default", missing));
        }
    }
    RuleOutcome::Passed
}

fn check_maximum_distance_rule(oq: &mut OqParam) -> RuleOutcome {
    match &oq.params.maximum_distance {
        None if oq.inputs.contains(roles::SOURCE_MODEL_LOGIC_TREE) => {
            RuleOutcome::fail("Missing maximum_distance in the job configuration")
        }
        None => RuleOutcome::Passed,
        Some(_) => oq.is_valid_maximum_distance(),
    }
}

fn needs_levels(oq: &OqParam) -> bool {
    let p = &oq.params;
    match p.calculation_mode {
        CalculationMode::Classical | CalculationMode::Disaggregation => true,
        CalculationMode::ClassicalRisk
        | CalculationMode::ClassicalDamage
        | CalculationMode::ClassicalBcr => !oq.inputs.has_risk_model(),
        mode if mode.is_event_based() => p.hazard_curves_from_gmfs,
        _ => false,
    }
}

fn check_imtls(oq: &mut OqParam) -> RuleOutcome {
    let has_levels = oq.params.intensity_measure_types_and_levels.is_some();
    if needs_levels(oq) && !has_levels {
        let reason = if oq.params.calculation_mode.is_event_based() {
            "when hazard_curves_from_gmfs is true".to_string()
        } else {
            format!("for calculation_mode={}", oq.params.calculation_mode)
        };
        return RuleOutcome::fail(format!(
            "You must provide the `intensity_measure_types_and_levels` {}",
            reason
        ));
    }
    if has_levels && !oq.params.intensity_measure_types.is_empty() {
        oq.record(diagnostics::ignored_parameter(
            "intensity_measure_types",
            "intensity_measure_types_and_levels is set",
        ));
        oq.params.intensity_measure_types.clear();
    }
    let exempt = oq.inputs.has_risk_model() || oq.params.hazard_calculation_id.is_some();
    if oq.imtls.is_empty() && !exempt {
        return RuleOutcome::fail(
            "No IMTs specified: set `intensity_measure_types` or `intensity_measure_types_and_levels`",
        );
    }
    RuleOutcome::Passed
}

fn check_gsim_exclusivity(oq: &mut OqParam) -> RuleOutcome {
    match (&oq.params.gsim, oq.inputs.get(roles::GSIM_LOGIC_TREE)) {
        (Some(_), Some(source)) => RuleOutcome::fail(format!(
            "There is a gsim_logic_tree file ({}), so there must be no `gsim` key in the job configuration",
            source.describe()
        )),
        _ => RuleOutcome::Passed,
    }
}

fn check_gsim_imts(oq: &mut OqParam) -> RuleOutcome {
    for name in &oq.gsims {
        let Some(gsim) = oq.gsim_registry.get(name) else {
            return RuleOutcome::fail(format!("Unknown GSIM: {}", name));
        };
        if let Some(imt) = oq.imtls.imts().find(|imt| !gsim.accepts(imt)) {
            return RuleOutcome::fail(format!(
                "The IMT {} is not accepted by the GSIM [{}]",
                imt, name
            ));
        }
    }
    RuleOutcome::Passed
}

/// Whether the job parameter standing for a site parameter has a value.
/// Site parameters without a job-level counterpart come from elsewhere.
fn site_parameter_is_set(oq: &OqParam, site_param: &str) -> Option<(&'static str, bool)> {
    let p = &oq.params;
    let set = |r: &Reference<f64>| r.is_value();
    match site_param {
        "vs30" => Some(("reference_vs30_value", set(&p.reference_vs30_value))),
        "vs30measured" => Some(("reference_vs30_type", p.reference_vs30_type.is_value())),
        "z1pt0" => Some((
            "reference_depth_to_1pt0km_per_sec",
            set(&p.reference_depth_to_1pt0km_per_sec),
        )),
        "z2pt5" => Some((
            "reference_depth_to_2pt5km_per_sec",
            set(&p.reference_depth_to_2pt5km_per_sec),
        )),
        "backarc" => Some(("reference_backarc", true)),
        _ => None,
    }
}

fn check_gsim_site_parameters(oq: &mut OqParam) -> RuleOutcome {
    if oq.inputs.contains(roles::SITE_MODEL) {
        return RuleOutcome::Passed;
    }
    for name in &oq.gsims {
        let Some(gsim) = oq.gsim_registry.get(name) else {
            continue;
        };
        for site_param in gsim.required_site_parameters() {
            if let Some((param, false)) = site_parameter_is_set(oq, site_param) {
                return RuleOutcome::fail(format!(
                    "Please set a value for '{}', this is required by the GSIM [{}]",
                    param, name
                ));
            }
        }
    }
    RuleOutcome::Passed
}

fn check_correlation_model(oq: &mut OqParam) -> RuleOutcome {
    let Some(model) = oq.params.ground_motion_correlation_model else {
        return RuleOutcome::Passed;
    };
    match oq.imtls.imts().find(|imt| !model.accepts(imt)) {
        Some(imt) => RuleOutcome::fail(format!(
            "Correlation model {} does not accept IMT={}",
            model.name(),
            imt
        )),
        None => RuleOutcome::Passed,
    }
}

fn check_scenario_site_model(oq: &mut OqParam) -> RuleOutcome {
    let inputs = &oq.inputs;
    if oq.params.calculation_mode.is_scenario()
        && inputs.contains(roles::GMFS)
        && !inputs.contains(roles::SITE_MODEL)
        && !inputs.contains(roles::SITES)
    {
        return RuleOutcome::fail("You forgot to specify a site_model");
    }
    RuleOutcome::Passed
}

fn check_disaggregation(oq: &mut OqParam) -> RuleOutcome {
    if oq.params.calculation_mode != CalculationMode::Disaggregation {
        return RuleOutcome::Passed;
    }
    let p = &oq.params;
    if p.poes_disagg.is_empty() && p.iml_disagg.is_empty() {
        return RuleOutcome::fail("poes_disagg or iml_disagg must be set");
    }
    if p.poes_disagg.is_empty() {
        return RuleOutcome::Passed;
    }
    if p.poes.is_empty() {
        let poes = p.poes_disagg.clone();
        oq.params.poes = poes;
        oq.record(
            Diagnostic::info(
                DiagnosticCode::DerivedParameter,
                format!("poes set to poes_disagg={}", float_list(&oq.params.poes)),
            )
            .with_parameter("poes"),
        );
        return RuleOutcome::Passed;
    }
    if p.poes_disagg != p.poes {
        return RuleOutcome::fail(format!(
            "poes_disagg != poes: {}!={}",
            float_list(&p.poes_disagg),
            float_list(&p.poes)
        ));
    }
    RuleOutcome::Passed
}

fn check_site_geometry(oq: &mut OqParam) -> RuleOutcome {
    let p = &oq.params;
    if !p.sites.is_empty() && p.region.is_some() {
        return RuleOutcome::fail("You cannot set both `sites` and `region`");
    }
    if p.hazard_calculation_id.is_some() {
        return RuleOutcome::Passed;
    }
    let from_inputs = [roles::SITES, roles::SITE_MODEL, roles::EXPOSURE, roles::GMFS]
        .iter()
        .any(|role| oq.inputs.contains(role));
    if p.sites.is_empty() && p.region.is_none() && !from_inputs {
        return RuleOutcome::fail(
            "Missing sites: set `sites` or `region`, or provide a sites, site_model or exposure file",
        );
    }
    RuleOutcome::Passed
}

fn check_iml_disagg(oq: &mut OqParam) -> RuleOutcome {
    match oq
        .params
        .iml_disagg
        .keys()
        .find(|imt| !oq.imtls.contains(imt))
    {
        Some(imt) => RuleOutcome::fail(format!(
            "The IMT {} in iml_disagg is not in the IMT set {:?}",
            imt,
            oq.imtls.names()
        )),
        None => RuleOutcome::Passed,
    }
}

fn check_scenario_gmf_count(oq: &mut OqParam) -> RuleOutcome {
    let p = &oq.params;
    if p.calculation_mode.is_scenario()
        && !oq.inputs.contains(roles::GMFS)
        && p.hazard_calculation_id.is_none()
        && p.number_of_ground_motion_fields.is_none()
    {
        return RuleOutcome::fail(format!(
            "Missing number_of_ground_motion_fields for calculation_mode={}",
            p.calculation_mode
        ));
    }
    RuleOutcome::Passed
}

fn derive_fields(oq: &mut OqParam) -> RuleOutcome {
    if oq.params.complex_fault_mesh_spacing.is_none() {
        let spacing = oq.params.rupture_mesh_spacing;
        oq.params.complex_fault_mesh_spacing = Some(spacing);
        oq.record(
            Diagnostic::info(
                DiagnosticCode::DerivedParameter,
                format!("complex_fault_mesh_spacing set to rupture_mesh_spacing={}", spacing),
            )
            .with_parameter("complex_fault_mesh_spacing"),
        );
    }
    RuleOutcome::Passed
}
