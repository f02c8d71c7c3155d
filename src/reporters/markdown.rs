//! Markdown reporter for GitHub-flavored Markdown output
//!
//! Generates reports suitable for:
//! - Pull request comments on content repositories
//! - Editorial review tickets
//! - Documentation

use crate::models::{AuditReport, Finding, Severity};
use crate::scoring;
use anyhow::Result;
use chrono::Local;

/// Maximum findings to show per severity level
const MAX_FINDINGS_PER_SEVERITY: usize = 10;

/// Render report as GitHub-flavored Markdown
pub fn render(report: &AuditReport) -> Result<String> {
    let mut md = String::new();

    md.push_str(&render_header(report));
    md.push('\n');

    md.push_str(&render_summary(report));
    md.push('\n');

    md.push_str(&render_phase_scores(report));
    md.push('\n');

    md.push_str(&render_findings_summary(report));
    md.push('\n');

    md.push_str(&render_detailed_findings(report));
    md.push('\n');

    if !report.diagnostics.is_empty() {
        md.push_str(&render_diagnostics(report));
        md.push('\n');
    }

    md.push_str(&render_footer());

    Ok(md)
}

fn render_header(report: &AuditReport) -> String {
    let grade_emoji = match report.grade.as_str() {
        "A" => "🏆",
        "B" => "⭐",
        "C" => "⚠️",
        "D" => "❌",
        "F" => "💀",
        _ => "❓",
    };

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");

    format!(
        r#"# {} Page Audit Report

**Grade: {}** | **Score: {}/100**

URL: `{}`
Generated: {}
"#,
        grade_emoji, report.grade, report.overall_score, report.url, timestamp
    )
}

fn render_summary(report: &AuditReport) -> String {
    let assessment = match report.grade.as_str() {
        "A" => "Excellent - ready to publish",
        "B" => "Good - minor improvements recommended",
        "C" => "Fair - several issues should be addressed",
        "D" => "Poor - significant rework needed",
        "F" => "Critical - page is unlikely to rank",
        _ => "",
    };

    format!(
        r#"## Summary

| Metric | Value |
|--------|-------|
| **Topic** | {} |
| **Overall Score** | {}/100 |
| **Checks Evaluated** | {} |
| **Total Findings** | {} |
| **Assessment** | {} |
"#,
        if report.topic.is_empty() { "-" } else { report.topic.as_str() },
        report.overall_score,
        report.total_checks(),
        report.findings_summary.total,
        assessment
    )
}

fn render_phase_scores(report: &AuditReport) -> String {
    let mut md = String::from(
        "## Phase Scores\n\n| Phase | Weight | Score | Checks | Status |\n|-------|--------|-------|--------|--------|\n",
    );
    for phase in &report.phase_results {
        md.push_str(&format!(
            "| {} | {:.2} | {}/100 | {}/{} | {} |\n",
            phase.name,
            phase.weight,
            phase.score,
            phase.passed_checks,
            phase.total_checks,
            score_indicator(phase.score)
        ));
    }
    md.push_str("\n<details><summary>Score breakdown</summary>\n\n");
    md.push_str(&scoring::explain(report));
    md.push_str("\n\n</details>\n");
    md
}

fn render_findings_summary(report: &AuditReport) -> String {
    let fs = &report.findings_summary;

    format!(
        r#"## Findings Summary

| Severity | Count | Emoji |
|----------|-------|-------|
| Critical | {} | 🔴 |
| Internal error | {} | 🟣 |
| High | {} | 🟠 |
| Medium | {} | 🟡 |
| Low | {} | 🔵 |
| Info | {} | ℹ️ |
| **Total** | **{}** | |
"#,
        fs.critical, fs.internal_error, fs.high, fs.medium, fs.low, fs.info, fs.total
    )
}

fn render_detailed_findings(report: &AuditReport) -> String {
    let mut md = String::from("## Detailed Findings\n\n");

    if report.findings_summary.total == 0 {
        md.push_str("✅ No issues found! This page is in great shape.\n");
        return md;
    }

    for severity in Severity::ALL {
        let findings: Vec<&Finding> = report
            .findings()
            .filter(|f| f.severity == severity)
            .collect();

        if findings.is_empty() {
            continue;
        }

        let label = severity.to_string();
        md.push_str(&format!(
            "### {} {} Findings ({})\n\n",
            severity_emoji(severity),
            capitalize(&label.replace('-', " ")),
            findings.len()
        ));

        let hidden = findings.len().saturating_sub(MAX_FINDINGS_PER_SEVERITY);
        for finding in findings.iter().take(MAX_FINDINGS_PER_SEVERITY) {
            md.push_str(&render_finding(finding));
        }

        if hidden > 0 {
            md.push_str(&format!("*...and {} more {} findings*\n\n", hidden, label));
        }
    }

    md
}

fn render_finding(finding: &Finding) -> String {
    let mut md = String::new();

    md.push_str(&format!("#### {}\n\n", finding.message));
    md.push_str(&format!("`{}` / `{}`", finding.phase, finding.rule));
    if let Some(element) = &finding.element {
        md.push_str(&format!(" at `{}`", element.replace('`', "'")));
    }
    md.push_str("\n\n");

    if let Some(fix) = &finding.suggested_fix {
        md.push_str(&format!("> **💡 Fix:** {}\n\n", fix));
    }

    md
}

fn render_diagnostics(report: &AuditReport) -> String {
    let mut md = String::from("## Diagnostics\n\n");
    for diag in &report.diagnostics {
        let scope = diag.scope();
        md.push_str(&format!("- `{}`: {}\n", scope, diag.message));
    }
    md
}

fn render_footer() -> String {
    "---\n\n*Generated by pageaudit*\n".to_string()
}

fn score_indicator(score: u32) -> &'static str {
    if score >= 80 {
        "✅ Good"
    } else if score >= 60 {
        "⚠️ Fair"
    } else {
        "❌ Poor"
    }
}

fn severity_emoji(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴",
        Severity::InternalError => "🟣",
        Severity::High => "🟠",
        Severity::Medium => "🟡",
        Severity::Low => "🔵",
        Severity::Info => "ℹ️",
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}
