//! Job file loader
//!
//! Reads a `job.ini`, separates input files from parameters and hands both
//! to an [`OqParamBuilder`].

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info};

use crate::ini::{self, parse_ini};
use crate::inputs::{roles, InputSet, InputSource};
use crate::oqparam::{OqParam, OqParamBuilder};

/// Parameter holding a directory, resolved like input paths
const EXPORT_DIR: &str = "export_dir";

pub struct JobIniLoader {
    job_ini: PathBuf,
}

impl JobIniLoader {
    pub fn new(job_ini: impl Into<PathBuf>) -> Self {
        Self {
            job_ini: job_ini.into(),
        }
    }

    pub fn job_ini(&self) -> &Path {
        &self.job_ini
    }

    /// Directory relative input paths are resolved against
    pub fn job_dir(&self) -> PathBuf {
        match self.job_ini.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Read the file into a builder, without coercing anything yet
    pub fn read(&self) -> Result<OqParamBuilder> {
        let text = std::fs::read_to_string(&self.job_ini)
            .with_context(|| format!("Failed to read {}", self.job_ini.display()))?;
        let builder = builder_from_str(&text, &self.job_dir())
            .with_context(|| format!("Failed to parse {}", self.job_ini.display()))?;
        let mut job = InputSet::new();
        job.insert_path(roles::JOB_INI, self.job_ini.clone());
        Ok(builder.inputs(job))
    }

    /// Read and build; construction-time checks run, `validate` does not
    pub fn load(&self) -> Result<OqParam> {
        let oq = self
            .read()?
            .build()
            .with_context(|| format!("Invalid job file {}", self.job_ini.display()))?;
        info!(
            "Loaded {} (calculation_mode={})",
            self.job_ini.display(),
            oq.calculation_mode()
        );
        Ok(oq)
    }

    /// Read, build and validate
    pub fn load_validated(&self) -> Result<OqParam> {
        let mut oq = self.load()?;
        oq.validate()
            .with_context(|| format!("Invalid job file {}", self.job_ini.display()))?;
        Ok(oq)
    }
}

/// Builder from job file text; relative input paths are joined to `base_dir`
pub fn builder_from_str(text: &str, base_dir: &Path) -> Result<OqParamBuilder> {
    let doc = parse_ini(text).map_err(|e| anyhow!("{}", e))?;
    let (values, diags) = doc.flatten();

    let mut inputs = InputSet::new();
    let mut builder = OqParamBuilder::new();
    for (key, raw) in values {
        match ini::input_role(&key) {
            Some(role) => {
                let source = input_source(&raw, base_dir)
                    .with_context(|| format!("Invalid path for {}", key))?;
                debug!("input {} -> {}", role, source.describe());
                inputs.insert(role, source);
            }
            None if key == EXPORT_DIR && !raw.is_empty() && raw != "None" => {
                let dir = resolve(&raw, base_dir)
                    .with_context(|| format!("Cannot resolve {}={}", key, raw))?;
                builder = builder.set(key, dir.display().to_string());
            }
            None => builder = builder.set(key, raw),
        }
    }
    for diag in diags {
        builder = builder.diagnostic(diag);
    }
    Ok(builder.inputs(inputs))
}

fn input_source(raw: &str, base_dir: &Path) -> Result<InputSource> {
    let mut paths = raw
        .split_whitespace()
        .map(|p| resolve(p, base_dir))
        .collect::<Result<Vec<PathBuf>>>()?;
    match paths.len() {
        0 => Err(anyhow!("no file given")),
        1 => Ok(InputSource::Path(paths.remove(0))),
        _ => Ok(InputSource::Paths(paths)),
    }
}

/// Absolute form of `path`, taken relative to `base_dir`. Written back by
/// `to_ini`, it reads the same from any job directory.
fn resolve(path: &str, base_dir: &Path) -> Result<PathBuf> {
    let joined = base_dir.join(path);
    std::path::absolute(&joined).with_context(|| format!("Cannot resolve {}", joined.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_become_inputs() {
        let oq = builder_from_str(
            "[general]\n\
             calculation_mode = scenario\n\
             number_of_ground_motion_fields = 10\n\
             gsim = ToroEtAl2002\n\
             [files]\n\
             site_model_file = site_model.xml\n\
             sites_csv = /abs/sites.csv\n\
             exposure_file = a.xml b.xml\n",
            Path::new("/jobs/demo"),
        )
        .unwrap()
        .build()
        .unwrap();

        assert_eq!(
            oq.inputs.get("site_model"),
            Some(&InputSource::Path(PathBuf::from("/jobs/demo/site_model.xml")))
        );
        assert_eq!(
            oq.inputs.get("sites"),
            Some(&InputSource::Path(PathBuf::from("/abs/sites.csv")))
        );
        assert!(matches!(oq.inputs.get("exposure"), Some(InputSource::Paths(p)) if p.len() == 2));
        assert_eq!(oq.params.number_of_ground_motion_fields, Some(10));
    }

    #[test]
    fn test_empty_file_value() {
        let err = builder_from_str("calculation_mode = classical\nsite_model_file =\n", Path::new("."))
            .err()
            .unwrap();
        assert!(err.to_string().contains("site_model_file"));
    }

    #[test]
    fn test_missing_job_file() {
        let err = JobIniLoader::new("/nonexistent/job.ini").load().unwrap_err();
        assert!(err.to_string().contains("Failed to read /nonexistent/job.ini"));
    }

    #[test]
    fn test_relative_paths_become_absolute() {
        let oq = builder_from_str(
            "calculation_mode = scenario\n\
             export_dir = out\n\
             site_model_file = site_model.csv\n",
            Path::new("jobs"),
        )
        .unwrap()
        .build()
        .unwrap();

        let cwd = std::env::current_dir().unwrap();
        assert_eq!(oq.params.export_dir, cwd.join("jobs").join("out"));
        assert_eq!(
            oq.inputs.get("site_model"),
            Some(&InputSource::Path(cwd.join("jobs").join("site_model.csv")))
        );
    }

    #[test]
    fn test_job_dir() {
        assert_eq!(JobIniLoader::new("job.ini").job_dir(), PathBuf::from("."));
        assert_eq!(
            JobIniLoader::new("/a/b/job.ini").job_dir(),
            PathBuf::from("/a/b")
        );
    }
}
