//! Factual accuracy rules

use super::{snippet, Issue, Recorder};
use crate::config::Thresholds;
use crate::content::EnrichedContent;
use crate::context::Verdict;
use crate::models::Severity;
use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;

static STATISTIC_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Percentages, currency amounts and grouped figures that read as claims
fn statistic_pattern() -> &'static Regex {
    STATISTIC_PATTERN.get_or_init(|| {
        Regex::new(r"\d+(?:\.\d+)?\s?%|[$€£]\s?\d|\b\d{1,3}(?:,\d{3})+\b|\b\d+(?:\.\d+)?\s?(?:million|billion|percent)\b")
            .expect("valid regex")
    })
}

pub(super) fn fact_verification(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    let checks = content
        .context
        .fact_checks
        .as_deref()
        .filter(|c| !c.is_empty());
    let Some(checks) = checks else {
        rec.check("verification data supplied", false, || {
            Issue::new(Severity::Info, "No fact verification results were supplied")
                .fix("Run claims through fact verification and pass the results in the audit context")
        });
        return Ok(());
    };

    for (i, fact) in checks.iter().enumerate() {
        rec.check(
            format!("claim {}", i + 1),
            fact.verdict == Verdict::Verified,
            || {
                let (severity, state) = match fact.verdict {
                    Verdict::Disputed => (Severity::High, "is disputed"),
                    _ => (Severity::Low, "could not be verified"),
                };
                let mut issue = Issue::new(
                    severity,
                    format!("Claim {}: \"{}\"", state, snippet(&fact.claim, 80)),
                );
                if let Some(source) = &fact.source {
                    issue = issue.at(source.clone());
                }
                issue.fix("Correct the claim or cite a source that supports it")
            },
        );
    }
    Ok(())
}

pub(super) fn source_citations(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    let Some(example) = statistic_pattern().find(&content.text) else {
        return Ok(());
    };
    let cited = content.external_links().next().is_some();
    rec.check("statistics are cited", cited, || {
        Issue::new(
            Severity::Medium,
            format!(
                "Page states figures (e.g. \"{}\") but links to no external source",
                example.as_str()
            ),
        )
        .fix("Link each statistic to the study or dataset it comes from")
    });
    Ok(())
}

pub(super) fn freshness_signals(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    let schema_dated = content
        .json_ld
        .iter()
        .any(|b| b.contains("\"dateModified\"") || b.contains("\"datePublished\""));
    let dated = schema_dated
        || content.time_elements > 0
        || content.headers.contains_key("last-modified");
    rec.check("publication date exposed", dated, || {
        Issue::new(Severity::Low, "Page does not say when it was published or updated")
            .fix("Add datePublished/dateModified to the schema or a visible <time> element")
    });
    Ok(())
}
