//! Intensity measure types and their levels
//!
//! An `IntensityMeasureSpec` maps each IMT to the intensity levels at which
//! hazard curves are computed. Levels are optional: a spec built from a bare
//! `intensity_measure_types` list carries IMTs with empty level lists.

use std::collections::BTreeMap;

use hazard_types::Imt;

use crate::literal::{parse_literal, Literal};
use crate::values::float_list;

/// Ordered mapping IMT -> strictly increasing levels
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntensityMeasureSpec {
    entries: BTreeMap<Imt, Vec<f64>>,
}

impl IntensityMeasureSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (IMT, levels) pairs, checking every level list
    pub fn from_levels(
        pairs: impl IntoIterator<Item = (Imt, Vec<f64>)>,
    ) -> Result<Self, String> {
        let mut spec = Self::new();
        for (imt, levels) in pairs {
            check_levels(&imt, &levels)?;
            if spec.entries.contains_key(&imt) {
                return Err(format!("Duplicated IMT {}", imt));
            }
            spec.entries.insert(imt, levels);
        }
        Ok(spec)
    }

    /// IMTs without levels
    pub fn from_imts(imts: impl IntoIterator<Item = Imt>) -> Self {
        Self {
            entries: imts.into_iter().map(|imt| (imt, Vec::new())).collect(),
        }
    }

    /// Parse a literal such as `{'PGA': [0.1, 0.2], 'SA(0.1)': [0.1, 0.4]}`.
    /// The error is the bare reason; the caller adds the parameter context.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let entries = match parse_literal(raw)? {
            Literal::Dict(entries) => entries,
            other => return Err(format!("expected a dict, got a {}", other.type_name())),
        };
        let mut pairs = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let name = key
                .as_str()
                .ok_or_else(|| format!("IMT keys must be strings, got a {}", key.type_name()))?;
            let imt = Imt::from_string(name).map_err(|e| e.to_string())?;
            let levels = match value {
                Literal::List(items) => items
                    .iter()
                    .map(|item| {
                        item.as_f64()
                            .ok_or_else(|| format!("non-numeric level for {}", imt))
                    })
                    .collect::<Result<Vec<f64>, String>>()?,
                other => {
                    return Err(format!(
                        "the levels for {} must be a list, got a {}",
                        imt,
                        other.type_name()
                    ))
                }
            };
            pairs.push((imt, levels));
        }
        Self::from_levels(pairs)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, imt: &Imt) -> bool {
        self.entries.contains_key(imt)
    }

    pub fn imts(&self) -> impl Iterator<Item = &Imt> {
        self.entries.keys()
    }

    /// Canonical IMT names in order
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().map(|imt| imt.name().to_string()).collect()
    }

    pub fn levels(&self, imt: &Imt) -> Option<&[f64]> {
        self.entries.get(imt).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Imt, &[f64])> {
        self.entries.iter().map(|(imt, levels)| (imt, levels.as_slice()))
    }

    /// True when every IMT carries levels
    pub fn has_levels(&self) -> bool {
        !self.entries.is_empty() && self.entries.values().all(|levels| !levels.is_empty())
    }

    /// Add an IMT if absent; existing levels are kept
    pub fn insert_missing(&mut self, imt: Imt, levels: Vec<f64>) {
        self.entries.entry(imt).or_insert(levels);
    }

    /// Job file text that parses back to this spec
    pub fn to_raw(&self) -> String {
        let entries: Vec<String> = self
            .entries
            .iter()
            .map(|(imt, levels)| {
                let levels: Vec<String> = levels.iter().map(f64::to_string).collect();
                format!("\"{}\": [{}]", imt, levels.join(", "))
            })
            .collect();
        format!("{{{}}}", entries.join(", "))
    }
}

fn check_levels(imt: &Imt, levels: &[f64]) -> Result<(), String> {
    if levels.is_empty() {
        return Err(format!("No levels for {}", imt));
    }
    for pair in levels.windows(2) {
        if pair[0] == pair[1] {
            return Err(format!(
                "Found duplicated levels for {}: {}",
                imt,
                float_list(levels)
            ));
        }
    }
    if levels.windows(2).any(|pair| pair[0] > pair[1]) {
        return Err(format!(
            "The levels for {} are not sorted: {}",
            imt,
            float_list(levels)
        ));
    }
    if levels.iter().any(|level| !level.is_finite() || *level < 0.0) {
        return Err(format!(
            "The levels for {} must be non-negative numbers: {}",
            imt,
            float_list(levels)
        ));
    }
    Ok(())
}
