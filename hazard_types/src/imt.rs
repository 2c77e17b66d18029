//! Intensity Measure Types
//!
//! Parses identifiers such as `PGA`, `SA(0.1)`, `AvgSA(0.5)` or
//! `SDi(0.1,3.5)` into a structured value:
//! (canonical string, primary period, damping, optional secondary period).
//!
//! Ordering is by primary period first (numerically, so `SA(9) < SA(10)`),
//! then by canonical string. Two spellings of the same period are the same
//! IMT: `SA(0.1) == SA(0.10)`.

use nom::{
    character::complete::{alpha1, alphanumeric0, char, multispace0},
    combinator::{all_consuming, opt, recognize},
    multi::separated_list1,
    number::complete::double,
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Damping (percent of critical) assumed when none is given
pub const DEFAULT_DAMPING: f64 = 5.0;

/// IMTs without a period argument
const SCALAR_IMTS: &[&str] = &[
    "PGA",
    "PGV",
    "PGD",
    "CAV",
    "IA",
    "RSD",
    "RSD575",
    "RSD595",
    "RSD2080",
    "MMI",
    "JMA",
    "AvgSA",
    "PGDfLatSpread",
    "PGDfSettle",
    "PGDfSlope",
    "PGDfRupture",
    "PGDGeomMean",
    "LiqProb",
    "LiqOccur",
    "LSE",
    "LSD",
];

/// IMT families taking exactly one period (or frequency) argument
const PERIOD_FAMILIES: &[&str] = &["SA", "AvgSA", "FAS", "EAS", "DRVT"];

/// IMT families taking a period and a secondary argument
const SECONDARY_FAMILIES: &[&str] = &["SDi"];

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ImtError {
    /// The identifier does not name any known IMT
    #[error("'{0}'")]
    Unknown(String),

    #[error("invalid IMT '{imt}': {reason}")]
    Invalid { imt: String, reason: String },
}

// ============================================================================
// IMT VALUE TYPE
// ============================================================================

/// A parsed intensity measure type
#[derive(Debug, Clone)]
pub struct Imt {
    name: String,
    period: f64,
    damping: f64,
    secondary: Option<f64>,
}

impl Imt {
    /// Parse a textual IMT identifier
    pub fn from_string(s: &str) -> Result<Self, ImtError> {
        let trimmed = s.trim();
        let (family, args) = match all_consuming(imt_syntax)(trimmed) {
            Ok((_, parsed)) => parsed,
            Err(_) => return Err(ImtError::Unknown(s.to_string())),
        };

        match args {
            None if SCALAR_IMTS.contains(&family) => Ok(Self::scalar(family)),
            Some(args) if PERIOD_FAMILIES.contains(&family) => match args.as_slice() {
                [period] => Self::with_period(family, *period, trimmed),
                _ => Err(ImtError::Invalid {
                    imt: trimmed.to_string(),
                    reason: format!("{} takes a single period", family),
                }),
            },
            Some(args) if SECONDARY_FAMILIES.contains(&family) => match args.as_slice() {
                [period, secondary] => {
                    let mut imt = Self::with_period(family, *period, trimmed)?;
                    imt.secondary = Some(*secondary + 0.0);
                    imt.name = format!(
                        "{}({},{})",
                        family,
                        python_float(imt.period),
                        python_float(*secondary)
                    );
                    Ok(imt)
                }
                _ => Err(ImtError::Invalid {
                    imt: trimmed.to_string(),
                    reason: format!("{} takes a period and a secondary argument", family),
                }),
            },
            _ => Err(ImtError::Unknown(s.to_string())),
        }
    }

    fn scalar(family: &str) -> Self {
        Self {
            name: family.to_string(),
            period: 0.0,
            damping: DEFAULT_DAMPING,
            secondary: None,
        }
    }

    fn with_period(family: &str, period: f64, raw: &str) -> Result<Self, ImtError> {
        if !period.is_finite() || period < 0.0 {
            return Err(ImtError::Invalid {
                imt: raw.to_string(),
                reason: "the period must be a non-negative number".to_string(),
            });
        }
        let period = period + 0.0;
        Ok(Self {
            name: format!("{}({})", family, python_float(period)),
            period,
            damping: DEFAULT_DAMPING,
            secondary: None,
        })
    }

    /// Peak ground acceleration
    pub fn pga() -> Self {
        Self::scalar("PGA")
    }

    /// Spectral acceleration at the given period
    pub fn sa(period: f64) -> Result<Self, ImtError> {
        Self::with_period("SA", period, &format!("SA({})", period))
    }

    /// Canonical string, e.g. `SA(0.1)`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }

    pub fn secondary(&self) -> Option<f64> {
        self.secondary
    }

    /// Family name: the part before the parenthesis (`SA` for `SA(0.1)`)
    pub fn family(&self) -> &str {
        self.name.split('(').next().unwrap_or(&self.name)
    }

    /// True for the SA(...) family
    pub fn is_spectral_acceleration(&self) -> bool {
        self.family() == "SA"
    }

    /// Structured view matching the (string, period, damping, secondary) tuple
    pub fn as_tuple(&self) -> (&str, f64, f64, Option<f64>) {
        (&self.name, self.period, self.damping, self.secondary)
    }
}

/// Format a float the way the canonical IMT strings expect: integral
/// values keep a trailing `.0` (`SA(10.0)`), others use the shortest
/// representation that round-trips (`SA(0.1)`).
pub fn python_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

// ============================================================================
// PARSER
// ============================================================================

type ImtSyntax<'a> = (&'a str, Option<Vec<f64>>);

fn imt_syntax(input: &str) -> IResult<&str, ImtSyntax<'_>> {
    pair(identifier, opt(arguments))(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(alpha1, alphanumeric0))(input)
}

fn arguments(input: &str) -> IResult<&str, Vec<f64>> {
    delimited(
        terminated(char('('), multispace0),
        separated_list1(
            delimited(multispace0, char(','), multispace0),
            double,
        ),
        preceded(multispace0, char(')')),
    )(input)
}

// ============================================================================
// TRAITS
// ============================================================================

fn cmp_optional(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.total_cmp(&y),
    }
}

impl Ord for Imt {
    fn cmp(&self, other: &Self) -> Ordering {
        self.period
            .total_cmp(&other.period)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.damping.total_cmp(&other.damping))
            .then_with(|| cmp_optional(self.secondary, other.secondary))
    }
}

impl PartialOrd for Imt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Imt {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Imt {}

impl Hash for Imt {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.period.to_bits().hash(state);
        self.damping.to_bits().hash(state);
        self.secondary.map(f64::to_bits).hash(state);
    }
}

impl fmt::Display for Imt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for Imt {
    type Err = ImtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl Serialize for Imt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

impl<'de> Deserialize<'de> for Imt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Imt::from_string(&raw).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// TESTS
// ============================================================================
