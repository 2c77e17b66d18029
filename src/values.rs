//! Typed parameter values
//!
//! Everything the registry's coercion rules can produce, plus the small
//! enums that name the closed vocabularies of a job file (calculation modes,
//! vs30 types, correlation models).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use hazard_types::{python_float, Imt};
use serde::{Deserialize, Serialize};

use crate::imtls::IntensityMeasureSpec;

// =============================================================================
// CALCULATION MODE
// =============================================================================

/// The analysis pipeline selected by `calculation_mode`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMode {
    Classical,
    Preclassical,
    Disaggregation,
    EventBased,
    EventBasedRisk,
    EventBasedDamage,
    Scenario,
    ScenarioRisk,
    ScenarioDamage,
    ClassicalRisk,
    ClassicalDamage,
    ClassicalBcr,
}

impl CalculationMode {
    pub const ALL: [CalculationMode; 12] = [
        CalculationMode::Classical,
        CalculationMode::Preclassical,
        CalculationMode::Disaggregation,
        CalculationMode::EventBased,
        CalculationMode::EventBasedRisk,
        CalculationMode::EventBasedDamage,
        CalculationMode::Scenario,
        CalculationMode::ScenarioRisk,
        CalculationMode::ScenarioDamage,
        CalculationMode::ClassicalRisk,
        CalculationMode::ClassicalDamage,
        CalculationMode::ClassicalBcr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationMode::Classical => "classical",
            CalculationMode::Preclassical => "preclassical",
            CalculationMode::Disaggregation => "disaggregation",
            CalculationMode::EventBased => "event_based",
            CalculationMode::EventBasedRisk => "event_based_risk",
            CalculationMode::EventBasedDamage => "event_based_damage",
            CalculationMode::Scenario => "scenario",
            CalculationMode::ScenarioRisk => "scenario_risk",
            CalculationMode::ScenarioDamage => "scenario_damage",
            CalculationMode::ClassicalRisk => "classical_risk",
            CalculationMode::ClassicalDamage => "classical_damage",
            CalculationMode::ClassicalBcr => "classical_bcr",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == s)
    }

    pub fn is_scenario(&self) -> bool {
        self.as_str().starts_with("scenario")
    }

    pub fn is_event_based(&self) -> bool {
        self.as_str().starts_with("event_based")
    }

    /// Classical hazard and the risk modes built on top of it
    pub fn is_classical(&self) -> bool {
        matches!(
            self,
            CalculationMode::Classical
                | CalculationMode::Preclassical
                | CalculationMode::Disaggregation
                | CalculationMode::ClassicalRisk
                | CalculationMode::ClassicalDamage
                | CalculationMode::ClassicalBcr
        )
    }

    /// Modes whose pipeline computes losses or damages
    pub fn is_risk(&self) -> bool {
        matches!(
            self,
            CalculationMode::EventBasedRisk
                | CalculationMode::EventBasedDamage
                | CalculationMode::ScenarioRisk
                | CalculationMode::ScenarioDamage
                | CalculationMode::ClassicalRisk
                | CalculationMode::ClassicalDamage
                | CalculationMode::ClassicalBcr
        )
    }

    /// Modes relying on a truncated ground-motion distribution
    pub fn needs_truncation_level(&self) -> bool {
        matches!(self, CalculationMode::Disaggregation)
    }
}

impl fmt::Display for CalculationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// SITE REFERENCE PARAMETERS
// =============================================================================

/// How the reference vs30 was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vs30Type {
    Measured,
    Inferred,
}

impl Vs30Type {
    pub fn as_str(&self) -> &'static str {
        match self {
            Vs30Type::Measured => "measured",
            Vs30Type::Inferred => "inferred",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "measured" => Some(Vs30Type::Measured),
            "inferred" => Some(Vs30Type::Inferred),
            _ => None,
        }
    }
}

/// A reference site parameter: not given, explicitly `None`, or a value
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Reference<T> {
    #[default]
    Unspecified,
    Null,
    Value(T),
}

impl<T> Reference<T> {
    pub fn is_null(&self) -> bool {
        matches!(self, Reference::Null)
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Reference::Value(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Reference::Value(v) => Some(v),
            _ => None,
        }
    }
}

// =============================================================================
// CORRELATION MODELS
// =============================================================================

/// Spatial correlation model for ground-motion fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrelationModel {
    JB2009,
    HM2018,
}

impl CorrelationModel {
    pub fn name(&self) -> &'static str {
        match self {
            CorrelationModel::JB2009 => "JB2009",
            CorrelationModel::HM2018 => "HM2018",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "JB2009" => Some(CorrelationModel::JB2009),
            "HM2018" => Some(CorrelationModel::HM2018),
            _ => None,
        }
    }

    /// IMT families the model is defined for
    pub fn accepted_families(&self) -> &'static [&'static str] {
        match self {
            CorrelationModel::JB2009 | CorrelationModel::HM2018 => &["PGA", "SA"],
        }
    }

    pub fn accepts(&self, imt: &Imt) -> bool {
        self.accepted_families().contains(&imt.family())
    }
}

// =============================================================================
// MAXIMUM DISTANCE
// =============================================================================

/// Integration distance: one value for every TRT, or one per TRT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MaximumDistance {
    Scalar(f64),
    ByTrt(BTreeMap<String, f64>),
}

impl MaximumDistance {
    /// Distance for a TRT, falling back to the `default` entry
    pub fn get(&self, trt: &str) -> Option<f64> {
        match self {
            MaximumDistance::Scalar(d) => Some(*d),
            MaximumDistance::ByTrt(map) => map
                .get(trt)
                .or_else(|| map.get(hazard_types::trt::DEFAULT_KEY))
                .copied(),
        }
    }
}

// =============================================================================
// SITES
// =============================================================================

/// A (lon, lat) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lon: f64,
    pub lat: f64,
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.lon, self.lat)
    }
}

// =============================================================================
// PARAMETER VALUE
// =============================================================================

/// A coerced parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(u64),
    Float(f64),
    Text(String),
    Floats(Vec<f64>),
    Texts(Vec<String>),
    Imtls(IntensityMeasureSpec),
    Imts(Vec<Imt>),
    ImtFloats(BTreeMap<Imt, f64>),
    Distance(MaximumDistance),
    Points(Vec<Point>),
    Mode(CalculationMode),
    Vs30Type(Vs30Type),
    Correlation(CorrelationModel),
    Path(PathBuf),
}

impl ParamValue {
    /// Variant name for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            ParamValue::Null => "None",
            ParamValue::Bool(_) => "bool",
            ParamValue::Int(_) => "int",
            ParamValue::Float(_) => "float",
            ParamValue::Text(_) => "text",
            ParamValue::Floats(_) => "float list",
            ParamValue::Texts(_) => "name list",
            ParamValue::Imtls(_) => "IMT levels",
            ParamValue::Imts(_) => "IMT list",
            ParamValue::ImtFloats(_) => "IMT mapping",
            ParamValue::Distance(_) => "maximum distance",
            ParamValue::Points(_) => "coordinates",
            ParamValue::Mode(_) => "calculation mode",
            ParamValue::Vs30Type(_) => "vs30 type",
            ParamValue::Correlation(_) => "correlation model",
            ParamValue::Path(_) => "path",
        }
    }

    /// Render the value as job file text that coerces back to itself
    pub fn to_raw(&self) -> String {
        match self {
            ParamValue::Null => "None".to_string(),
            ParamValue::Bool(b) => b.to_string(),
            ParamValue::Int(i) => i.to_string(),
            ParamValue::Float(f) => f.to_string(),
            ParamValue::Text(s) => s.clone(),
            ParamValue::Floats(v) => join_floats(v, " "),
            ParamValue::Texts(v) => v.join(" "),
            ParamValue::Imtls(spec) => spec.to_raw(),
            ParamValue::Imts(v) => v
                .iter()
                .map(|imt| imt.name().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            ParamValue::ImtFloats(map) => {
                let entries: Vec<String> = map
                    .iter()
                    .map(|(imt, v)| format!("\"{}\": {}", imt, v))
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
            ParamValue::Distance(MaximumDistance::Scalar(d)) => d.to_string(),
            ParamValue::Distance(MaximumDistance::ByTrt(map)) => {
                let entries: Vec<String> = map
                    .iter()
                    .map(|(trt, d)| format!("\"{}\": {}", trt, d))
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
            ParamValue::Points(points) => points
                .iter()
                .map(Point::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            ParamValue::Mode(mode) => mode.as_str().to_string(),
            ParamValue::Vs30Type(t) => t.as_str().to_string(),
            ParamValue::Correlation(c) => c.name().to_string(),
            ParamValue::Path(p) => p.display().to_string(),
        }
    }
}

fn join_floats(values: &[f64], sep: &str) -> String {
    values
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}

/// Render a float list the way error messages quote them: `[0.1, 0.2]`
pub fn float_list(values: &[f64]) -> String {
    let items: Vec<String> = values.iter().map(|v| python_float(*v)).collect();
    format!("[{}]", items.join(", "))
}

/// Render a string set the way error messages quote them: `['a', 'b']`
pub fn name_list<'a>(names: impl IntoIterator<Item = &'a String>) -> String {
    let items: Vec<String> = names.into_iter().map(|n| format!("'{}'", n)).collect();
    format!("[{}]", items.join(", "))
}

/// Sorted, de-duplicated set of TRT names
pub type TrtSet = BTreeSet<String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trip_and_families() {
        for mode in CalculationMode::ALL {
            assert_eq!(CalculationMode::parse(mode.as_str()), Some(mode));
        }
        assert!(CalculationMode::ScenarioDamage.is_scenario());
        assert!(CalculationMode::EventBasedRisk.is_event_based());
        assert!(CalculationMode::Disaggregation.is_classical());
        assert!(!CalculationMode::EventBased.is_risk());
        assert_eq!(CalculationMode::parse("classic"), None);
    }

    #[test]
    fn test_maximum_distance_default_fallback() {
        let md = MaximumDistance::ByTrt(BTreeMap::from([
            ("Active Shallow Crust".to_string(), 200.0),
            ("default".to_string(), 100.0),
        ]));
        assert_eq!(md.get("Active Shallow Crust"), Some(200.0));
        assert_eq!(md.get("Stable Continental Crust"), Some(100.0));
        assert_eq!(MaximumDistance::Scalar(300.0).get("anything"), Some(300.0));
    }

    #[test]
    fn test_correlation_model_accepts_pga_and_sa() {
        let jb = CorrelationModel::JB2009;
        assert!(jb.accepts(&Imt::pga()));
        assert!(jb.accepts(&Imt::sa(0.3).unwrap()));
        assert!(!jb.accepts(&Imt::from_string("PGD").unwrap()));
    }

    #[test]
    fn test_float_list_formatting() {
        assert_eq!(float_list(&[0.4, 0.4, 0.6]), "[0.4, 0.4, 0.6]");
        assert_eq!(float_list(&[1.0, 2.5]), "[1.0, 2.5]");
        assert_eq!(float_list(&[]), "[]");
    }

    #[test]
    fn test_reference_states() {
        let unset: Reference<f64> = Reference::default();
        assert!(!unset.is_null() && !unset.is_value());
        assert!(Reference::<f64>::Null.is_null());
        assert_eq!(Reference::Value(760.0).value(), Some(&760.0));
    }
}
