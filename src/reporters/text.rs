//! Text (terminal) reporter with colors and formatting

use crate::models::{AuditReport, Finding, Severity};
use anyhow::Result;

/// Findings listed before the output is cut short
const MAX_LISTED_FINDINGS: usize = 15;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Grade colors (ANSI escape codes)
fn grade_color(grade: &str) -> &'static str {
    match grade {
        "A" => "\x1b[32m", // Green
        "B" => "\x1b[92m", // Light green
        "C" => "\x1b[33m", // Yellow
        "D" => "\x1b[91m", // Light red
        "F" => "\x1b[31m", // Red
        _ => RESET,
    }
}

/// Severity colors
fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "\x1b[31m",
        Severity::InternalError => "\x1b[35m", // Magenta
        Severity::High => "\x1b[91m",
        Severity::Medium => "\x1b[33m",
        Severity::Low => "\x1b[34m",
        Severity::Info => "\x1b[90m",
    }
}

fn score_color(score: u32) -> &'static str {
    if score >= 80 {
        "\x1b[32m"
    } else if score >= 60 {
        "\x1b[33m"
    } else {
        "\x1b[31m"
    }
}

fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "[C]",
        Severity::InternalError => "[!]",
        Severity::High => "[H]",
        Severity::Medium => "[M]",
        Severity::Low => "[L]",
        Severity::Info => "[I]",
    }
}

/// Emits escape codes only when color is on
struct Palette {
    on: bool,
}

impl Palette {
    fn paint(&self, code: &'static str) -> &'static str {
        if self.on {
            code
        } else {
            ""
        }
    }
}

/// Render report as formatted terminal output
pub fn render(report: &AuditReport, color: bool) -> Result<String> {
    let p = Palette { on: color };
    let (bold, dim, reset) = (p.paint(BOLD), p.paint(DIM), p.paint(RESET));
    let mut out = String::new();

    // Header
    let grade_c = p.paint(grade_color(&report.grade));
    out.push_str(&format!("\n{bold}Page Audit{reset}  {}\n", report.url));
    if !report.topic.is_empty() {
        out.push_str(&format!("{dim}Topic: {}{reset}\n", report.topic));
    }
    out.push_str(&format!(
        "{dim}──────────────────────────────────────{reset}\n"
    ));
    out.push_str(&format!(
        "Score: {bold}{}/100{reset}  Grade: {grade_c}{bold}{}{reset}  Checks: {}  Time: {}ms\n\n",
        report.overall_score,
        report.grade,
        report.total_checks(),
        report.audit_duration_ms
    ));

    // Phase scores
    out.push_str(&format!("{bold}PHASES{reset}\n"));
    for phase in &report.phase_results {
        let sc = p.paint(score_color(phase.score));
        out.push_str(&format!(
            "  {:<20} {sc}{:>3}{reset}  {dim}w{:.2}  {}/{} checks passed{reset}\n",
            phase.name, phase.score, phase.weight, phase.passed_checks, phase.total_checks
        ));
    }
    out.push('\n');

    // Findings summary
    let fs = &report.findings_summary;
    out.push_str(&format!("{bold}FINDINGS{reset} ({} total)\n", fs.total));

    let mut summary_parts = Vec::new();
    for (count, label, severity) in [
        (fs.critical, "critical", Severity::Critical),
        (fs.internal_error, "internal error", Severity::InternalError),
        (fs.high, "high", Severity::High),
        (fs.medium, "medium", Severity::Medium),
        (fs.low, "low", Severity::Low),
    ] {
        if count > 0 {
            let c = p.paint(severity_color(severity));
            summary_parts.push(format!("{c}{} {}{reset}", count, label));
        }
    }
    if !summary_parts.is_empty() {
        out.push_str(&format!("  {}\n\n", summary_parts.join(" | ")));
    }

    // Worst findings first
    let mut findings: Vec<&Finding> = report.findings().collect();
    findings.sort_by(|a, b| b.severity.cmp(&a.severity));

    if !findings.is_empty() {
        out.push_str(&format!(
            "{dim}  #   SEV  RULE                        MESSAGE{reset}\n"
        ));
        out.push_str(&format!(
            "{dim}  ─────────────────────────────────────────────────────────────────{reset}\n"
        ));

        for (i, finding) in findings.iter().take(MAX_LISTED_FINDINGS).enumerate() {
            let sev_c = p.paint(severity_color(finding.severity));
            out.push_str(&format!(
                "  {dim}{:>3}{reset}  {sev_c}{}{reset}  {:<26}  {}\n",
                i + 1,
                severity_tag(finding.severity),
                finding.rule,
                truncate(&finding.message, 70)
            ));
            if let Some(element) = &finding.element {
                out.push_str(&format!("{:>35}{dim}at {}{reset}\n", "", truncate(element, 60)));
            }
        }

        let remaining = findings.len().saturating_sub(MAX_LISTED_FINDINGS);
        if remaining > 0 {
            out.push_str(&format!(
                "\n  {dim}...and {} more (use --format json for all){reset}\n",
                remaining
            ));
        }
        out.push('\n');
    }

    if !report.diagnostics.is_empty() {
        out.push_str(&format!("{bold}DIAGNOSTICS{reset}\n"));
        for diag in &report.diagnostics {
            let scope = diag.scope();
            out.push_str(&format!("  {dim}{}{reset}  {}\n", scope, diag.message));
        }
        out.push('\n');
    }

    match report.grade.as_str() {
        "A" => out.push_str(&format!("{dim}Excellent! This page is in great shape.{reset}\n")),
        "B" => out.push_str(&format!(
            "{dim}Good shape. Address remaining findings for an A.{reset}\n"
        )),
        _ => out.push_str(&format!(
            "{dim}Run with --explain to see how each phase contributes.{reset}\n"
        )),
    }

    Ok(out)
}

/// Truncate on char boundaries
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}
