//! Core data models for pageaudit
//!
//! These models are the output side of the pipeline: findings produced by
//! rule validators, per-phase results, and the final audit report.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Generate a deterministic finding ID based on content hash.
///
/// The ID is a 16-character hex string derived from hashing:
/// - phase id (which phase ran the rule)
/// - rule id (which rule found it)
/// - element reference (where it was found, if anywhere)
/// - message (what the issue is)
///
/// Stable across runs so that two reports over the same page can be diffed.
pub fn deterministic_finding_id(phase: &str, rule: &str, element: &str, message: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{phase}\n{rule}\n{element}\n{message}").as_bytes());
    let digest = hasher.finalize();
    digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
}

/// Severity levels for findings
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    #[default]
    Info,
    Low,
    Medium,
    High,
    Critical,
    /// A rule failed to evaluate. Reported instead of its real findings.
    InternalError,
}

impl Severity {
    pub const ALL: [Severity; 6] = [
        Severity::Critical,
        Severity::InternalError,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Info,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
            Severity::InternalError => "internal-error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            "internal-error" | "internal_error" => Ok(Severity::InternalError),
            other => Err(format!(
                "unknown severity '{}' (expected critical, high, medium, low, info)",
                other
            )),
        }
    }
}

/// One detected issue on the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Finding {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub rule: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub message: String,
    /// Located element reference, e.g. `img[src="/hero.png"]` or `h3 "Pricing"`
    #[serde(default)]
    pub element: Option<String>,
    #[serde(default)]
    pub suggested_fix: Option<String>,
}

impl Finding {
    /// Create a finding with its deterministic ID already stamped
    pub fn new(
        phase: &str,
        rule: &str,
        severity: Severity,
        message: impl Into<String>,
        element: Option<String>,
    ) -> Self {
        let message = message.into();
        let id = deterministic_finding_id(
            phase,
            rule,
            element.as_deref().unwrap_or(""),
            &message,
        );
        Self {
            id,
            phase: phase.to_string(),
            rule: rule.to_string(),
            severity,
            message,
            element,
            suggested_fix: None,
        }
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }
}

/// Summary of findings by severity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindingsSummary {
    pub critical: usize,
    pub internal_error: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
    pub total: usize,
}

impl FindingsSummary {
    pub fn from_findings<'a>(findings: impl IntoIterator<Item = &'a Finding>) -> Self {
        let mut summary = Self::default();
        for f in findings {
            match f.severity {
                Severity::Critical => summary.critical += 1,
                Severity::InternalError => summary.internal_error += 1,
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
                Severity::Info => summary.info += 1,
            }
            summary.total += 1;
        }
        summary
    }
}

/// Pass/fail record of one individual assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRecord {
    pub rule: String,
    pub check: String,
    pub passed: bool,
}

/// Aggregated result of one phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseResult {
    pub phase: String,
    pub name: String,
    pub weight: f64,
    /// 0-100, 100 when there are no findings
    pub score: u32,
    /// Individual assertions evaluated, passed or failed
    pub total_checks: usize,
    pub passed_checks: usize,
    pub failed_checks: usize,
    pub checks: Vec<CheckRecord>,
    pub findings: Vec<Finding>,
    /// Rules that found nothing to inspect on this page
    #[serde(default)]
    pub rules_not_applicable: Vec<String>,
}

/// Kind of diagnostic note attached to a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    EnrichmentDegradation,
    ValidatorInternalError,
}

/// Non-fatal observation made during an audit run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub rule: Option<String>,
    /// Content field an enrichment degradation applies to
    #[serde(default)]
    pub field: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn degradation(field: &str, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::EnrichmentDegradation,
            phase: None,
            rule: None,
            field: Some(field.to_string()),
            message: message.into(),
        }
    }

    pub fn internal_error(phase: &str, rule: &str, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::ValidatorInternalError,
            phase: Some(phase.to_string()),
            rule: Some(rule.to_string()),
            field: None,
            message: message.into(),
        }
    }

    /// Most specific thing the note is about: rule, then field, then phase
    pub fn scope(&self) -> &str {
        self.rule
            .as_deref()
            .or(self.field.as_deref())
            .or(self.phase.as_deref())
            .unwrap_or("-")
    }
}

/// Final aggregated output of one audit run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub url: String,
    pub topic: String,
    pub overall_score: u32,
    pub grade: String,
    pub phase_results: Vec<PhaseResult>,
    pub findings_summary: FindingsSummary,
    pub diagnostics: Vec<Diagnostic>,
    pub audit_duration_ms: u64,
}

impl AuditReport {
    /// Calculate grade from score
    pub fn grade_from_score(score: u32) -> String {
        match score {
            s if s >= 90 => "A".to_string(),
            s if s >= 80 => "B".to_string(),
            s if s >= 70 => "C".to_string(),
            s if s >= 60 => "D".to_string(),
            _ => "F".to_string(),
        }
    }

    /// All findings across phases, in phase registration order
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.phase_results.iter().flat_map(|p| p.findings.iter())
    }

    pub fn total_checks(&self) -> usize {
        self.phase_results.iter().map(|p| p.total_checks).sum()
    }

    pub fn phase(&self, id: &str) -> Option<&PhaseResult> {
        self.phase_results.iter().find(|p| p.phase == id)
    }
}
