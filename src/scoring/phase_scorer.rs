//! Phase and overall score computation

use crate::config::SeverityPenalties;
use crate::error::{AuditError, AuditResult};
use crate::models::{AuditReport, Finding, PhaseResult};
use tracing::debug;

/// Score one phase from its findings: 100 minus the summed penalties,
/// clamped to 0..=100 and rounded.
///
/// Monotonic as long as every penalty is non-negative, which
/// [`SeverityPenalties::validate`] guarantees.
pub fn phase_score(findings: &[Finding], penalties: &SeverityPenalties) -> u32 {
    let penalty: f64 = findings.iter().map(|f| penalties.penalty(f.severity)).sum();
    (100.0 - penalty).clamp(0.0, 100.0).round() as u32
}

/// A phase weight must be a finite number greater than zero
pub fn validate_weight(phase: &str, weight: f64) -> AuditResult<()> {
    if weight.is_finite() && weight > 0.0 {
        Ok(())
    } else {
        Err(AuditError::ScoringConfiguration(format!(
            "phase '{}' has weight {}; weights must be greater than zero",
            phase, weight
        )))
    }
}

/// Weighted average of phase scores, rounded to the nearest integer.
///
/// Always lies between the lowest and highest phase score.
pub fn combine(results: &[PhaseResult]) -> u32 {
    let total_weight: f64 = results.iter().map(|r| r.weight).sum();
    if total_weight <= 0.0 {
        return 0;
    }
    let weighted: f64 = results.iter().map(|r| f64::from(r.score) * r.weight).sum();
    let overall = (weighted / total_weight).round().clamp(0.0, 100.0) as u32;
    debug!(
        "Combined {} phases (total weight {:.2}) into {}",
        results.len(),
        total_weight,
        overall
    );
    overall
}

/// Generate human-readable explanation of the score
pub fn explain(report: &AuditReport) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "# Page Score: {} ({})\n",
        report.overall_score, report.grade
    ));

    lines.push("## Scoring Formula\n".to_string());
    lines.push("```".to_string());
    lines.push("Phase   = clamp(100 - Σ severity_penalty, 0, 100)".to_string());
    lines.push("Overall = round(Σ phase × weight / Σ weight)".to_string());
    lines.push("```\n".to_string());

    let total_weight: f64 = report.phase_results.iter().map(|p| p.weight).sum();
    lines.push("## Phases\n".to_string());
    lines.push("| Phase | Score | Weight | Share | Checks | Findings |".to_string());
    lines.push("|-------|------:|-------:|------:|-------:|---------:|".to_string());
    for phase in &report.phase_results {
        let share = if total_weight > 0.0 {
            phase.weight / total_weight * 100.0
        } else {
            0.0
        };
        lines.push(format!(
            "| {} | {} | {:.2} | {:.1}% | {}/{} | {} |",
            phase.name,
            phase.score,
            phase.weight,
            share,
            phase.passed_checks,
            phase.total_checks,
            phase.findings.len()
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;

    fn finding(severity: Severity) -> Finding {
        Finding::new("p", "r", severity, format!("{:?}", severity), None)
    }

    fn result(score: u32, weight: f64) -> PhaseResult {
        PhaseResult {
            phase: format!("phase-{}", score),
            name: format!("Phase {}", score),
            weight,
            score,
            total_checks: 1,
            passed_checks: 1,
            failed_checks: 0,
            checks: Vec::new(),
            findings: Vec::new(),
            rules_not_applicable: Vec::new(),
        }
    }

    #[test]
    fn test_no_findings_scores_100() {
        assert_eq!(phase_score(&[], &SeverityPenalties::default()), 100);
    }

    #[test]
    fn test_penalties_and_floor() {
        let penalties = SeverityPenalties::default();
        assert_eq!(phase_score(&[finding(Severity::High)], &penalties), 80);
        assert_eq!(
            phase_score(&[finding(Severity::Medium), finding(Severity::Low)], &penalties),
            85
        );
        assert_eq!(phase_score(&[finding(Severity::Info)], &penalties), 100);
        let many = vec![finding(Severity::Critical); 4];
        assert_eq!(phase_score(&many, &penalties), 0);
    }

    #[test]
    fn test_adding_findings_never_raises_score() {
        let penalties = SeverityPenalties::default();
        let mut findings = Vec::new();
        let mut last = phase_score(&findings, &penalties);
        for severity in Severity::ALL.iter().cycle().take(24) {
            findings.push(finding(*severity));
            let score = phase_score(&findings, &penalties);
            assert!(score <= last, "{:?} raised score {} -> {}", severity, last, score);
            last = score;
        }
    }

    #[test]
    fn test_weight_validation() {
        assert!(validate_weight("a", 1.0).is_ok());
        assert!(matches!(
            validate_weight("a", 0.0),
            Err(AuditError::ScoringConfiguration(_))
        ));
        assert!(validate_weight("a", -1.0).is_err());
        assert!(validate_weight("a", f64::NAN).is_err());
    }

    #[test]
    fn test_combine_equal_weights() {
        assert_eq!(combine(&[result(100, 1.0), result(0, 1.0)]), 50);
    }

    #[test]
    fn test_combine_weighted() {
        // (90*3 + 60*1) / 4 = 82.5 -> 83
        assert_eq!(combine(&[result(90, 3.0), result(60, 1.0)]), 83);
    }

    #[test]
    fn test_combine_within_bounds() {
        let results = vec![result(73, 1.5), result(41, 0.75), result(98, 1.25)];
        let overall = combine(&results);
        assert!((41..=98).contains(&overall));
    }

    #[test]
    fn test_combine_empty() {
        assert_eq!(combine(&[]), 0);
    }
}
