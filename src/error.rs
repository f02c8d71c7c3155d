//! Error types for the audit core
//!
//! Only run-aborting conditions live here. Degraded input and failing
//! rules are recovered locally and show up as diagnostics instead.

use thiserror::Error;

/// Errors that abort an audit run or orchestrator construction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuditError {
    /// A phase evaluated zero checks, or was registered with an invalid weight
    #[error("phase contract violated by '{phase}': {reason}")]
    PhaseContractViolation { phase: String, reason: String },

    /// Invalid weight or penalty configuration, detected before any content is processed
    #[error("invalid scoring configuration: {0}")]
    ScoringConfiguration(String),
}

impl AuditError {
    pub fn contract(phase: impl Into<String>, reason: impl Into<String>) -> Self {
        AuditError::PhaseContractViolation {
            phase: phase.into(),
            reason: reason.into(),
        }
    }

    /// Phase id this error is attributed to, if any
    pub fn phase(&self) -> Option<&str> {
        match self {
            AuditError::PhaseContractViolation { phase, .. } => Some(phase),
            AuditError::ScoringConfiguration(_) => None,
        }
    }
}

pub type AuditResult<T> = Result<T, AuditError>;
