//! Call-to-action rules

use super::{snippet, Issue, Recorder};
use crate::config::Thresholds;
use crate::content::EnrichedContent;
use crate::context::SearchIntent;
use crate::models::Severity;
use anyhow::Result;

const ACTION_VERBS: &[&str] = &[
    "add", "apply", "book", "buy", "call", "claim", "compare", "contact", "create", "discover",
    "donate", "download", "explore", "find", "get", "grab", "join", "learn", "order", "read",
    "register", "request", "reserve", "save", "schedule", "see", "shop", "sign", "start",
    "subscribe", "try", "upgrade", "view", "watch",
];

const GENERIC_LABELS: &[&str] = &["submit", "click here", "click", "go", "ok", "send", "enter"];

pub(super) fn cta_present(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    let commercial = matches!(
        content.context.search_intent,
        Some(SearchIntent::Commercial | SearchIntent::Transactional)
    );
    rec.check("call to action present", !content.calls_to_action.is_empty(), || {
        let severity = if commercial { Severity::High } else { Severity::Medium };
        Issue::new(severity, "Page offers no call to action")
            .fix("Add a clear next step: a button or prominent link")
    });
    Ok(())
}

pub(super) fn cta_placement(
    content: &EnrichedContent,
    t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    let earliest = content
        .calls_to_action
        .iter()
        .map(|c| c.position)
        .fold(None, |min: Option<f64>, p| Some(min.map_or(p, |m| m.min(p))));
    let Some(earliest) = earliest else {
        return Ok(());
    };
    rec.check("early call to action", earliest <= t.cta_max_position, || {
        Issue::new(
            Severity::Low,
            format!(
                "First call to action appears {:.0}% of the way through the page",
                earliest * 100.0
            ),
        )
        .fix("Offer a call to action in the first half of the page")
    });
    Ok(())
}

pub(super) fn cta_wording(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    for (i, cta) in content.calls_to_action.iter().enumerate() {
        let label = cta.text.trim().to_lowercase();
        let first = label.split_whitespace().next().unwrap_or("");
        let specific = ACTION_VERBS.contains(&first) && !GENERIC_LABELS.contains(&label.as_str());
        rec.check(format!("cta {} wording", i + 1), specific, || {
            let message = if label.is_empty() {
                "Call to action has no label".to_string()
            } else {
                format!("Call to action '{}' does not lead with a specific action", cta.text)
            };
            Issue::new(Severity::Low, message)
                .at(format!("{:?}: {}", cta.kind, snippet(&cta.text, 40)).to_lowercase())
                .fix("Start the label with a verb that names the outcome, e.g. \"Get the guide\"")
        });
    }
    Ok(())
}

pub(super) fn cta_overload(
    content: &EnrichedContent,
    t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    let count = content.calls_to_action.len();
    if count == 0 {
        return Ok(());
    }
    rec.check("call to action count", count <= t.max_ctas, || {
        Issue::new(
            Severity::Low,
            format!("{} calls to action compete for attention (max {})", count, t.max_ctas),
        )
        .fix("Keep one primary action and demote the rest")
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::{page, run};
    use super::super::Rule;
    use crate::context::{SearchIntent, TopicalMapContext};
    use crate::models::Severity;

    #[test]
    fn test_missing_cta_severity_follows_intent() {
        let html = "<body><p>Just words.</p></body>";
        let info = run(Rule::CtaPresent, &page(html, TopicalMapContext::default()));
        assert_eq!(info.findings[0].severity, Severity::Medium);

        let ctx = TopicalMapContext::new("t").with_search_intent(SearchIntent::Transactional);
        let shop = run(Rule::CtaPresent, &page(html, ctx));
        assert_eq!(shop.findings[0].severity, Severity::High);
    }

    #[test]
    fn test_late_cta() {
        let html = format!("<body><p>{}</p><button>Get started</button></body>", "word ".repeat(50));
        let outcome = run(Rule::CtaPlacement, &page(&html, TopicalMapContext::default()));
        assert_eq!(outcome.check_count(), 1);
        assert_eq!(outcome.findings.len(), 1);
    }

    #[test]
    fn test_wording() {
        let html = r#"<body>
            <button>Download the checklist</button>
            <input type="submit" value="Submit">
            <a class="cta" href="/x">Our pricing</a>
        </body>"#;
        let outcome = run(Rule::CtaWording, &page(html, TopicalMapContext::default()));
        assert_eq!(outcome.check_count(), 3);
        assert_eq!(outcome.findings.len(), 2);
    }

    #[test]
    fn test_overload() {
        let buttons = "<button>Buy now</button>".repeat(9);
        let html = format!("<body>{}</body>", buttons);
        let outcome = run(Rule::CtaOverload, &page(&html, TopicalMapContext::default()));
        assert_eq!(outcome.findings.len(), 1);
    }
}
