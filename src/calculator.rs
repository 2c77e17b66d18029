//! Calculator driver contract
//!
//! A calculator receives a validated, read-only [`OqParam`] and an opaque
//! calculation id. [`launch`] is the only way in: it validates first so no
//! calculator ever starts from an inconsistent configuration.

use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::oqparam::OqParam;

/// Opaque calculation identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalcId(Uuid);

impl CalcId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CalcId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CalcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Something that runs a hazard or risk calculation
pub trait Calculator {
    fn run(&mut self, oq: &OqParam, calc_id: CalcId) -> Result<()>;
}

/// Validate `oq` (unless already validated) and run `calculator` on it
pub fn launch<C: Calculator + ?Sized>(
    calculator: &mut C,
    oq: &mut OqParam,
    calc_id: CalcId,
) -> Result<()> {
    if !oq.is_validated() {
        oq.validate()
            .with_context(|| format!("Calculation {} not started", calc_id))?;
    }
    info!(
        "Starting calculation {} (calculation_mode={})",
        calc_id,
        oq.calculation_mode()
    );
    calculator
        .run(oq, calc_id)
        .with_context(|| format!("Calculation {} failed", calc_id))
}
