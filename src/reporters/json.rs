//! JSON reporter
//!
//! Outputs the full AuditReport as pretty-printed JSON.
//! Useful for machine consumption, piping to jq, or diffing two runs.

use crate::models::AuditReport;
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &AuditReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render report as compact JSON (single line)
pub fn render_compact(report: &AuditReport) -> Result<String> {
    Ok(serde_json::to_string(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_json_render_valid() {
        let report = test_report();
        let json_str = render(&report).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["grade"], "A");
        assert_eq!(parsed["overall_score"], 92);
        assert_eq!(
            parsed["phase_results"].as_array().expect("phase array").len(),
            2
        );
        assert_eq!(parsed["phase_results"][1]["findings"][0]["severity"], "medium");
    }

    #[test]
    fn test_json_render_compact() {
        let report = test_report();
        let json_str = render_compact(&report).expect("render compact JSON");
        assert!(!json_str.contains('\n'));
        let back: AuditReport = serde_json::from_str(&json_str).expect("parse compact JSON");
        assert_eq!(back, report);
    }

    #[test]
    fn test_json_empty_phase_findings() {
        let mut report = test_report();
        for phase in &mut report.phase_results {
            phase.findings.clear();
        }
        report.findings_summary = Default::default();
        let json_str = render(&report).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["findings_summary"]["total"], 0);
    }
}
