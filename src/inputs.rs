//! Input set: logical input roles mapped to files or inline content

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{OqError, OqResult};

/// Well-known input roles
pub mod roles {
    pub const JOB_INI: &str = "job_ini";
    pub const SITE_MODEL: &str = "site_model";
    pub const SITES: &str = "sites";
    pub const GSIM_LOGIC_TREE: &str = "gsim_logic_tree";
    pub const SOURCE_MODEL_LOGIC_TREE: &str = "source_model_logic_tree";
    pub const EXPOSURE: &str = "exposure";
    pub const GMFS: &str = "gmfs";
}

/// Where an input's content comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    Path(PathBuf),
    Paths(Vec<PathBuf>),
    Inline(String),
}

impl InputSource {
    /// Content of a single-file or inline input
    pub fn read(&self) -> OqResult<String> {
        match self {
            InputSource::Inline(content) => Ok(content.clone()),
            InputSource::Path(path) => read_file(path),
            InputSource::Paths(paths) => match paths.as_slice() {
                [path] => read_file(path),
                _ => Err(OqError::invalid_file(format!(
                    "expected a single file, got {} files",
                    paths.len()
                ))),
            },
        }
    }

    /// Human-readable location, used in error messages
    pub fn describe(&self) -> String {
        match self {
            InputSource::Path(path) => path.display().to_string(),
            InputSource::Paths(paths) => paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" "),
            InputSource::Inline(_) => "<inline>".to_string(),
        }
    }
}

fn read_file(path: &Path) -> OqResult<String> {
    fs::read_to_string(path).map_err(|e| OqError::io(path, e))
}

/// Mapping from input role to source. Presence of a role gates validators.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InputSet {
    entries: BTreeMap<String, InputSource>,
}

impl InputSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, role: impl Into<String>, source: InputSource) {
        self.entries.insert(role.into(), source);
    }

    pub fn insert_path(&mut self, role: impl Into<String>, path: impl Into<PathBuf>) {
        self.insert(role, InputSource::Path(path.into()));
    }

    pub fn contains(&self, role: &str) -> bool {
        self.entries.contains_key(role)
    }

    pub fn get(&self, role: &str) -> Option<&InputSource> {
        self.entries.get(role)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InputSource)> {
        self.entries.iter().map(|(role, source)| (role.as_str(), source))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Any vulnerability/fragility/consequence model among the inputs
    pub fn has_risk_model(&self) -> bool {
        self.entries.keys().any(|role| {
            role.ends_with("_vulnerability")
                || role.ends_with("_fragility")
                || role.ends_with("_consequence")
        })
    }

    /// Equality ignoring the `job_ini` entry, which names the file the
    /// set was read from rather than an input of the calculation
    pub fn same_sources(&self, other: &InputSet) -> bool {
        let strip = |set: &InputSet| {
            set.entries
                .iter()
                .filter(|(role, _)| role.as_str() != roles::JOB_INI)
                .map(|(role, source)| (role.clone(), source.clone()))
                .collect::<BTreeMap<_, _>>()
        };
        strip(self) == strip(other)
    }
}

impl<K: Into<String>> FromIterator<(K, InputSource)> for InputSet {
    fn from_iter<I: IntoIterator<Item = (K, InputSource)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(role, source)| (role.into(), source))
                .collect(),
        }
    }
}
