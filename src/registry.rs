//! Parameter Registry
//!
//! Central declaration of every recognized job parameter: its name, the
//! coercion rule turning raw text into a typed [`ParamValue`], and its
//! default. Lookup is the only operation; nothing here has side effects.
//!
//! ```
//! use oq_config::registry::{describe, DefaultValue};
//!
//! let spec = describe("rupture_mesh_spacing").unwrap();
//! assert_eq!(spec.rule.name(), "positivefloat");
//! assert_eq!(spec.default, DefaultValue::Raw("5.0"));
//! assert!(describe("not_existing_param").is_err());
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::LazyLock;

use hazard_types::Imt;
use regex::Regex;
use thiserror::Error;

use crate::error::{OqError, OqResult};
use crate::imtls::IntensityMeasureSpec;
use crate::literal::{parse_literal, Literal};
use crate::values::{CalculationMode, CorrelationModel, MaximumDistance, ParamValue, Point, Vs30Type};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegistryError {
    #[error("The parameter '{0}' is unknown")]
    UnknownParameter(String),
}

// =============================================================================
// RULES AND DEFAULTS
// =============================================================================

/// How raw text becomes a typed value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoercionRule {
    Boolean,
    PositiveInt,
    NonNegativeInt,
    PositiveFloat,
    NonNegativeFloat,
    Probabilities,
    Utf8,
    NameList,
    Choices(&'static [&'static str]),
    IntensityMeasureTypesAndLevels,
    IntensityMeasureTypes,
    ImtFloatDict,
    MaximumDistance,
    Coordinates,
    Polygon,
    Gsim,
    CorrelationModel,
    CalculationMode,
    Vs30Type,
    Path,
}

impl CoercionRule {
    /// Name used in coercion error messages
    pub fn name(&self) -> &'static str {
        match self {
            CoercionRule::Boolean => "boolean",
            CoercionRule::PositiveInt => "positiveint",
            CoercionRule::NonNegativeInt => "nonnegativeint",
            CoercionRule::PositiveFloat => "positivefloat",
            CoercionRule::NonNegativeFloat => "nonnegativefloat",
            CoercionRule::Probabilities => "probabilities",
            CoercionRule::Utf8 => "utf8",
            CoercionRule::NameList => "namelist",
            CoercionRule::Choices(_) => "choices",
            CoercionRule::IntensityMeasureTypesAndLevels => "intensity_measure_types_and_levels",
            CoercionRule::IntensityMeasureTypes => "intensity_measure_types",
            CoercionRule::ImtFloatDict => "floatdict",
            CoercionRule::MaximumDistance => "maximum_distance",
            CoercionRule::Coordinates => "coordinates",
            CoercionRule::Polygon => "polygon",
            CoercionRule::Gsim => "gsim",
            CoercionRule::CorrelationModel => "correlation_model",
            CoercionRule::CalculationMode => "calculation_mode",
            CoercionRule::Vs30Type => "vs30_type",
            CoercionRule::Path => "path",
        }
    }

    /// Coerce a raw value. `None` and the literal `None` both yield
    /// [`ParamValue::Null`]; whether null is acceptable is decided by the
    /// field receiving the value.
    pub fn coerce(&self, name: &str, raw: Option<&str>) -> OqResult<ParamValue> {
        let Some(raw) = raw else {
            return Ok(ParamValue::Null);
        };
        let text = raw.trim();
        if text == "None" {
            return Ok(ParamValue::Null);
        }
        self.coerce_text(text).map_err(|reason| {
            OqError::value(format!(
                "{}: could not convert to {}: {}={}",
                reason,
                self.name(),
                name,
                raw
            ))
        })
    }

    fn coerce_text(&self, text: &str) -> Result<ParamValue, String> {
        match self {
            CoercionRule::Boolean => parse_bool(text).map(ParamValue::Bool),
            CoercionRule::PositiveInt => match parse_int(text)? {
                0 => Err("0 is not a positive integer".to_string()),
                n => Ok(ParamValue::Int(n)),
            },
            CoercionRule::NonNegativeInt => parse_int(text).map(ParamValue::Int),
            CoercionRule::PositiveFloat => {
                let value = parse_float(text)?;
                if value <= 0.0 {
                    return Err(format!("{} is not positive", text));
                }
                Ok(ParamValue::Float(value))
            }
            CoercionRule::NonNegativeFloat => {
                let value = parse_float(text)?;
                if value < 0.0 {
                    return Err(format!("{} is negative", text));
                }
                Ok(ParamValue::Float(value))
            }
            CoercionRule::Probabilities => split_list(text)
                .into_iter()
                .map(|item| {
                    let p = parse_float(item)?;
                    if (0.0..=1.0).contains(&p) {
                        Ok(p)
                    } else {
                        Err(format!("{} is not a probability", item))
                    }
                })
                .collect::<Result<Vec<_>, _>>()
                .map(ParamValue::Floats),
            CoercionRule::Utf8 => Ok(ParamValue::Text(text.to_string())),
            CoercionRule::NameList => {
                let names = split_list(text);
                if let Some(bad) = names.iter().find(|n| !NAME_RE.is_match(n)) {
                    return Err(format!("Invalid name '{}'", bad));
                }
                Ok(ParamValue::Texts(names.into_iter().map(String::from).collect()))
            }
            CoercionRule::Choices(choices) => {
                let names = split_list(text);
                if let Some(bad) = names.iter().find(|n| !choices.contains(n)) {
                    return Err(format!("'{}' is not one of {:?}", bad, choices));
                }
                Ok(ParamValue::Texts(names.into_iter().map(String::from).collect()))
            }
            CoercionRule::IntensityMeasureTypesAndLevels => {
                IntensityMeasureSpec::parse(text).map(ParamValue::Imtls)
            }
            CoercionRule::IntensityMeasureTypes => split_imts(text)
                .into_iter()
                .map(|item| Imt::from_string(item).map_err(|e| e.to_string()))
                .collect::<Result<Vec<_>, _>>()
                .map(ParamValue::Imts),
            CoercionRule::ImtFloatDict => parse_imt_floats(text).map(ParamValue::ImtFloats),
            CoercionRule::MaximumDistance => {
                parse_maximum_distance(text).map(ParamValue::Distance)
            }
            CoercionRule::Coordinates => parse_points(text).map(ParamValue::Points),
            CoercionRule::Polygon => {
                let points = parse_points(text)?;
                if points.len() < 3 {
                    return Err(format!(
                        "a polygon needs at least 3 points, got {}",
                        points.len()
                    ));
                }
                Ok(ParamValue::Points(points))
            }
            CoercionRule::Gsim => {
                let name = text.trim_start_matches('[').trim_end_matches(']').trim();
                if !GSIM_RE.is_match(name) {
                    return Err(format!("Invalid GSIM name '{}'", text));
                }
                Ok(ParamValue::Text(name.to_string()))
            }
            CoercionRule::CorrelationModel => CorrelationModel::parse(text)
                .map(ParamValue::Correlation)
                .ok_or_else(|| format!("Unknown correlation model '{}'", text)),
            CoercionRule::CalculationMode => CalculationMode::parse(text)
                .map(ParamValue::Mode)
                .ok_or_else(|| format!("Invalid calculation mode '{}'", text)),
            CoercionRule::Vs30Type => Vs30Type::parse(text)
                .map(ParamValue::Vs30Type)
                .ok_or_else(|| format!("'{}' is not one of measured, inferred", text)),
            CoercionRule::Path => {
                if text.is_empty() {
                    return Err("empty path".to_string());
                }
                Ok(ParamValue::Path(PathBuf::from(text)))
            }
        }
    }
}

/// Default applied when a key is absent from the job
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    /// Absence is a ValueError
    Required,
    /// Absence leaves the field unset
    Unspecified,
    /// Absence is as if this raw text had been given
    Raw(&'static str),
}

/// A registry entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub rule: CoercionRule,
    pub default: DefaultValue,
}

impl ParamSpec {
    /// Value taken when the key is absent from the job; `Ok(None)` leaves
    /// the field unset
    pub fn absent_value(&self) -> OqResult<Option<ParamValue>> {
        match self.default {
            DefaultValue::Required => Err(OqError::value(format!(
                "Missing {} in the job configuration",
                self.name
            ))),
            DefaultValue::Unspecified => Ok(None),
            DefaultValue::Raw(raw) => self.rule.coerce(self.name, Some(raw)).map(Some),
        }
    }
}

const fn param(name: &'static str, rule: CoercionRule, default: DefaultValue) -> ParamSpec {
    ParamSpec {
        name,
        rule,
        default,
    }
}

const DISAGG_OUTPUTS: &[&str] = &[
    "Mag",
    "Dist",
    "Mag_Dist",
    "Mag_Dist_Eps",
    "Lon_Lat",
    "Mag_Lon_Lat",
    "Lon_Lat_TRT",
    "TRT",
    "Mag_Dist_TRT",
    "Mag_Dist_TRT_Eps",
];

// =============================================================================
// PARAMETER TABLE
// =============================================================================

use CoercionRule as R;
use DefaultValue::{Raw, Required, Unspecified};

/// Every recognized parameter
pub static PARAMETERS: &[ParamSpec] = &[
    // general
    param("calculation_mode", R::CalculationMode, Required),
    param("description", R::Utf8, Raw("")),
    param("hazard_calculation_id", R::Utf8, Unspecified),
    param("random_seed", R::NonNegativeInt, Raw("42")),
    param("ses_seed", R::NonNegativeInt, Raw("42")),
    param("master_seed", R::NonNegativeInt, Raw("123456789")),
    // output
    param("export_dir", R::Path, Raw(".")),
    param("exports", R::NameList, Raw("")),
    // source model
    param("maximum_distance", R::MaximumDistance, Unspecified),
    param("investigation_time", R::PositiveFloat, Unspecified),
    param("number_of_logic_tree_samples", R::NonNegativeInt, Raw("0")),
    param("rupture_mesh_spacing", R::PositiveFloat, Raw("5.0")),
    param("complex_fault_mesh_spacing", R::PositiveFloat, Unspecified),
    param("width_of_mfd_bin", R::PositiveFloat, Unspecified),
    param("area_source_discretization", R::PositiveFloat, Unspecified),
    // sites
    param("sites", R::Coordinates, Raw("")),
    param("region", R::Polygon, Unspecified),
    param("region_grid_spacing", R::PositiveFloat, Unspecified),
    param("reference_vs30_type", R::Vs30Type, Raw("inferred")),
    param("reference_vs30_value", R::PositiveFloat, Unspecified),
    param("reference_depth_to_1pt0km_per_sec", R::PositiveFloat, Unspecified),
    param("reference_depth_to_2pt5km_per_sec", R::PositiveFloat, Unspecified),
    param("reference_backarc", R::Boolean, Raw("false")),
    // intensity measures
    param(
        "intensity_measure_types_and_levels",
        R::IntensityMeasureTypesAndLevels,
        Unspecified,
    ),
    param("intensity_measure_types", R::IntensityMeasureTypes, Unspecified),
    param("minimum_intensity", R::ImtFloatDict, Raw("{}")),
    // ground motion
    param("gsim", R::Gsim, Unspecified),
    param("truncation_level", R::NonNegativeFloat, Unspecified),
    param("ground_motion_correlation_model", R::CorrelationModel, Unspecified),
    param("ground_motion_fields", R::Boolean, Raw("true")),
    param("number_of_ground_motion_fields", R::PositiveInt, Unspecified),
    param("ses_per_logic_tree_path", R::PositiveInt, Raw("1")),
    param("hazard_curves_from_gmfs", R::Boolean, Raw("false")),
    // hazard outputs
    param("hazard_maps", R::Boolean, Raw("false")),
    param("uniform_hazard_spectra", R::Boolean, Raw("false")),
    param("mean", R::Boolean, Raw("true")),
    param("quantiles", R::Probabilities, Raw("")),
    param("poes", R::Probabilities, Raw("")),
    // disaggregation
    param("poes_disagg", R::Probabilities, Raw("")),
    param("iml_disagg", R::ImtFloatDict, Raw("{}")),
    param("mag_bin_width", R::PositiveFloat, Unspecified),
    param("distance_bin_width", R::PositiveFloat, Unspecified),
    param("coordinate_bin_width", R::PositiveFloat, Unspecified),
    param("num_epsilon_bins", R::PositiveInt, Raw("1")),
    param("disagg_outputs", R::Choices(DISAGG_OUTPUTS), Raw("")),
];

static BY_NAME: LazyLock<HashMap<&'static str, &'static ParamSpec>> =
    LazyLock::new(|| PARAMETERS.iter().map(|spec| (spec.name, spec)).collect());

/// Look up a parameter by name
pub fn describe(name: &str) -> Result<&'static ParamSpec, RegistryError> {
    BY_NAME
        .get(name)
        .copied()
        .ok_or_else(|| RegistryError::UnknownParameter(name.to_string()))
}

// =============================================================================
// PARSING HELPERS
// =============================================================================

static LIST_SEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,\s]+").expect("list separator regex"));

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.\-]+$").expect("name regex"));

static GSIM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("gsim regex"));

fn split_list(text: &str) -> Vec<&str> {
    LIST_SEP_RE
        .split(text.trim_matches(|c: char| c == '[' || c == ']' || c.is_whitespace()))
        .filter(|item| !item.is_empty())
        .collect()
}

/// Split an IMT list on commas and whitespace outside parentheses, so
/// `SDi(0.1,3.5)` stays in one piece
fn split_imts(text: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' | ' ' | '\t' | '\n' if depth == 0 => {
                if start < i {
                    items.push(&text[start..i]);
                }
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if start < text.len() {
        items.push(&text[start..]);
    }
    items
}

fn parse_bool(text: &str) -> Result<bool, String> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(format!("Not a boolean: {}", text)),
    }
}

fn parse_int(text: &str) -> Result<u64, String> {
    text.parse::<u64>()
        .map_err(|_| format!("'{}' is not a non-negative integer", text))
}

fn parse_float(text: &str) -> Result<f64, String> {
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(format!("'{}' is not a number", text)),
    }
}

fn parse_points(text: &str) -> Result<Vec<Point>, String> {
    let mut points = Vec::new();
    for pair in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let coords: Vec<&str> = pair.split_whitespace().collect();
        let [lon, lat] = coords.as_slice() else {
            return Err(format!("'{}' is not a lon lat pair", pair));
        };
        let (lon, lat) = (parse_float(lon)?, parse_float(lat)?);
        if !(-180.0..=180.0).contains(&lon) {
            return Err(format!("longitude {} out of range", lon));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(format!("latitude {} out of range", lat));
        }
        points.push(Point { lon, lat });
    }
    Ok(points)
}

fn parse_maximum_distance(text: &str) -> Result<MaximumDistance, String> {
    let positive = |value: f64, what: &str| {
        if value > 0.0 {
            Ok(value)
        } else {
            Err(format!("the distance for {} must be positive", what))
        }
    };
    match parse_literal(text)? {
        Literal::Number(d) => Ok(MaximumDistance::Scalar(positive(d, "all TRTs")?)),
        Literal::Dict(entries) => {
            let mut by_trt = BTreeMap::new();
            for (key, value) in entries {
                let trt = key
                    .as_str()
                    .ok_or_else(|| "TRT names must be strings".to_string())?;
                let d = value
                    .as_f64()
                    .ok_or_else(|| format!("the distance for {} must be a number", trt))?;
                by_trt.insert(trt.to_string(), positive(d, trt)?);
            }
            Ok(MaximumDistance::ByTrt(by_trt))
        }
        other => Err(format!(
            "expected a number or a dict, got a {}",
            other.type_name()
        )),
    }
}

fn parse_imt_floats(text: &str) -> Result<BTreeMap<Imt, f64>, String> {
    let Literal::Dict(entries) = parse_literal(text)? else {
        return Err("expected a dict".to_string());
    };
    let mut map = BTreeMap::new();
    for (key, value) in entries {
        let name = key
            .as_str()
            .ok_or_else(|| "IMT keys must be strings".to_string())?;
        let imt = Imt::from_string(name).map_err(|e| e.to_string())?;
        let v = value
            .as_f64()
            .ok_or_else(|| format!("the value for {} must be a number", imt))?;
        map.insert(imt, v);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coerce(name: &str, raw: &str) -> OqResult<ParamValue> {
        let spec = describe(name).unwrap();
        spec.rule.coerce(name, Some(raw))
    }

    #[test]
    fn test_table_has_unique_names() {
        assert_eq!(BY_NAME.len(), PARAMETERS.len());
        assert_eq!(
            PARAMETERS
                .iter()
                .filter(|p| p.default == DefaultValue::Required)
                .map(|p| p.name)
                .collect::<Vec<_>>(),
            vec!["calculation_mode"]
        );
    }

    #[test]
    fn test_absent_values() {
        let required = param("site_effects", R::Utf8, Required);
        let err = required.absent_value().unwrap_err();
        assert!(err
            .to_string()
            .contains("Missing site_effects in the job configuration"));

        assert_eq!(param("gsim", R::Gsim, Unspecified).absent_value().unwrap(), None);
        assert_eq!(
            describe("ses_seed").unwrap().absent_value().unwrap(),
            Some(ParamValue::Int(42))
        );
    }

    #[test]
    fn test_unknown_parameter() {
        assert_eq!(
            describe("not_existing_param"),
            Err(RegistryError::UnknownParameter("not_existing_param".to_string()))
        );
    }

    #[test]
    fn test_scalars() {
        assert_eq!(coerce("hazard_maps", "true").unwrap(), ParamValue::Bool(true));
        assert_eq!(coerce("uniform_hazard_spectra", "1").unwrap(), ParamValue::Bool(true));
        assert_eq!(coerce("rupture_mesh_spacing", "1.5").unwrap(), ParamValue::Float(1.5));
        assert_eq!(coerce("truncation_level", "None").unwrap(), ParamValue::Null);
        assert_eq!(coerce("poes", "").unwrap(), ParamValue::Floats(vec![]));
        assert_eq!(
            coerce("poes", "0.1 0.02, 0.002").unwrap(),
            ParamValue::Floats(vec![0.1, 0.02, 0.002])
        );
    }

    #[test]
    fn test_coercion_error_names_key_and_raw_value() {
        let err = coerce("rupture_mesh_spacing", "-1").unwrap_err();
        assert_eq!(
            err.to_string(),
            "-1 is not positive: could not convert to positivefloat: rupture_mesh_spacing=-1"
        );
        let err = coerce("poes", "1.5").unwrap_err();
        assert!(err.to_string().ends_with("could not convert to probabilities: poes=1.5"));
    }

    #[test]
    fn test_imtls_duplicated_levels() {
        let raw = "{\"PGA\": [0.4, 0.4, 0.6]}";
        let err = coerce("intensity_measure_types_and_levels", raw).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Found duplicated levels for PGA: [0.4, 0.4, 0.6]: could not convert to \
             intensity_measure_types_and_levels: \
             intensity_measure_types_and_levels={\"PGA\": [0.4, 0.4, 0.6]}"
        );
    }

    #[test]
    fn test_imt_list_keeps_sdi_together() {
        let value = coerce("intensity_measure_types", "PGA, SDi(0.1,3.5) SA(0.2)").unwrap();
        let ParamValue::Imts(imts) = value else {
            panic!("expected IMTs");
        };
        let names: Vec<&str> = imts.iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["PGA", "SDi(0.1,3.5)", "SA(0.2)"]);
    }

    #[test]
    fn test_maximum_distance_forms() {
        assert_eq!(
            coerce("maximum_distance", "400").unwrap(),
            ParamValue::Distance(MaximumDistance::Scalar(400.0))
        );
        assert_eq!(
            coerce("maximum_distance", "{\"wrong TRT\": 200}").unwrap(),
            ParamValue::Distance(MaximumDistance::ByTrt(BTreeMap::from([(
                "wrong TRT".to_string(),
                200.0
            )])))
        );
        assert!(coerce("maximum_distance", "[1, 2]").is_err());
    }

    #[test]
    fn test_sites_and_region() {
        assert_eq!(
            coerce("sites", "0.1 0.2, 0.3 0.4").unwrap(),
            ParamValue::Points(vec![
                Point { lon: 0.1, lat: 0.2 },
                Point { lon: 0.3, lat: 0.4 }
            ])
        );
        assert_eq!(coerce("sites", "").unwrap(), ParamValue::Points(vec![]));
        assert!(coerce("region", "0 0, 1 1").is_err());
        assert!(coerce(
            "region",
            "-78.182 15.615, -78.152 15.615, -78.152 15.565, -78.182 15.565"
        )
        .is_ok());
    }

    #[test]
    fn test_gsim_accepts_bracketed_name() {
        assert_eq!(
            coerce("gsim", "[AbrahamsonEtAl2014]").unwrap(),
            ParamValue::Text("AbrahamsonEtAl2014".to_string())
        );
        assert!(coerce("gsim", "not a gsim").is_err());
    }

    #[test]
    fn test_iml_disagg() {
        let ParamValue::ImtFloats(map) = coerce("iml_disagg", "{'PGV': 0.1}").unwrap() else {
            panic!("expected an IMT mapping");
        };
        assert_eq!(map.get(&Imt::from_string("PGV").unwrap()), Some(&0.1));
    }
}
