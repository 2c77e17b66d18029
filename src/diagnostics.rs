//! Diagnostics for non-fatal configuration issues
//!
//! Anything that does not prevent a safe calculation (unknown keys, ignored
//! parameters, degenerate spectra) becomes a `Diagnostic` instead of an error.
//! Every diagnostic is logged through `tracing` when it is recorded.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Diagnostic severity level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Info,
}

/// Diagnostic codes for categorizing issues
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // =========================================================================
    // Construction
    // =========================================================================
    UnknownParameter,
    DuplicateParameter,

    // =========================================================================
    // Validation
    // =========================================================================
    IgnoredParameter,
    SinglePointSpectrum,
    DerivedParameter,
}

/// A diagnostic message, optionally attached to a parameter name
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    pub parameter: Option<String>,
}

impl Diagnostic {
    /// Create a warning diagnostic
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            parameter: None,
        }
    }

    /// Create an info diagnostic
    pub fn info(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            code,
            message: message.into(),
            parameter: None,
        }
    }

    /// Attach the offending parameter
    pub fn with_parameter(mut self, name: impl Into<String>) -> Self {
        self.parameter = Some(name.into());
        self
    }

    pub fn is_warning(&self) -> bool {
        matches!(self.severity, Severity::Warning)
    }

    /// Emit through tracing at the matching level
    pub fn log(&self) {
        match self.severity {
            Severity::Warning => warn!("{}", self.message),
            Severity::Info => info!("{}", self.message),
        }
    }
}

// =============================================================================
// Convenience Builders
// =============================================================================

/// Warning for a key that is not in the parameter registry
pub fn unknown_parameter(name: &str) -> Diagnostic {
    Diagnostic::warning(
        DiagnosticCode::UnknownParameter,
        format!("The parameter '{}' is unknown, ignoring", name),
    )
    .with_parameter(name)
}

/// Warning for a key given twice in a job file
pub fn duplicate_parameter(name: &str, section: &str) -> Diagnostic {
    Diagnostic::warning(
        DiagnosticCode::DuplicateParameter,
        format!(
            "The parameter '{}' is set again in section [{}], the last value wins",
            name, section
        ),
    )
    .with_parameter(name)
}

/// Warning for a parameter superseded by another one
pub fn ignored_parameter(name: &str, reason: &str) -> Diagnostic {
    Diagnostic::warning(
        DiagnosticCode::IgnoredParameter,
        format!("Ignoring {} since {}", name, reason),
    )
    .with_parameter(name)
}

// =============================================================================
// Tests
// =============================================================================
