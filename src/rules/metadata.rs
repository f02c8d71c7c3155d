//! Document metadata rules

use super::{snippet, Issue, Recorder};
use crate::config::Thresholds;
use crate::content::EnrichedContent;
use crate::models::Severity;
use anyhow::Result;

pub(super) fn title_present(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    rec.check("title present", !content.title.trim().is_empty(), || {
        Issue::new(Severity::High, "Page has no <title>")
            .at("head > title")
            .fix("Add a unique, descriptive <title> that leads with the page topic")
    });
    Ok(())
}

pub(super) fn title_length(
    content: &EnrichedContent,
    t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    if content.title.is_empty() {
        return Ok(());
    }
    let len = content.title.chars().count();
    rec.check(
        "title length",
        (t.title_min_chars..=t.title_max_chars).contains(&len),
        || {
            let direction = if len < t.title_min_chars { "short" } else { "long" };
            Issue::new(
                Severity::Medium,
                format!(
                    "Title is too {} ({} chars, expected {}-{})",
                    direction, len, t.title_min_chars, t.title_max_chars
                ),
            )
            .at(format!("title: {}", snippet(&content.title, 60)))
            .fix("Rewrite the title so it is not truncated in search results")
        },
    );
    Ok(())
}

pub(super) fn meta_description(
    content: &EnrichedContent,
    t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    let present = rec.check(
        "meta description present",
        !content.meta_description.is_empty(),
        || {
            Issue::new(Severity::Medium, "Page has no meta description")
                .at("meta[name=\"description\"]")
                .fix("Write a meta description summarizing the page for search snippets")
        },
    );
    if !present {
        return Ok(());
    }

    let len = content.meta_description.chars().count();
    rec.check(
        "meta description length",
        (t.description_min_chars..=t.description_max_chars).contains(&len),
        || {
            Issue::new(
                Severity::Low,
                format!(
                    "Meta description is {} chars, expected {}-{}",
                    len, t.description_min_chars, t.description_max_chars
                ),
            )
            .at("meta[name=\"description\"]")
        },
    );
    Ok(())
}

pub(super) fn canonical_url(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    let present = rec.check("canonical present", !content.canonical.is_empty(), || {
        Issue::new(Severity::Low, "Page declares no canonical URL")
            .at("link[rel=\"canonical\"]")
            .fix("Add <link rel=\"canonical\"> pointing at the preferred URL")
    });
    if present {
        let absolute =
            content.canonical.starts_with("https://") || content.canonical.starts_with("http://");
        rec.check("canonical is absolute", absolute, || {
            Issue::new(
                Severity::Low,
                format!("Canonical URL '{}' is not absolute", content.canonical),
            )
            .at("link[rel=\"canonical\"]")
        });
    }
    Ok(())
}

pub(super) fn viewport(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    let responsive = content.viewport.contains("width=device-width");
    rec.check("responsive viewport", responsive, || {
        let message = if content.viewport.is_empty() {
            "Page declares no viewport".to_string()
        } else {
            format!("Viewport '{}' is not responsive", content.viewport)
        };
        Issue::new(Severity::Medium, message)
            .at("meta[name=\"viewport\"]")
            .fix("Use <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">")
    });
    Ok(())
}

pub(super) fn indexability(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    rec.check("meta robots allows indexing", !content.robots.contains("noindex"), || {
        Issue::new(Severity::Critical, "Meta robots blocks indexing (noindex)")
            .at("meta[name=\"robots\"]")
            .fix("Remove noindex if the page should rank")
    });

    if let Some(tag) = content.headers.get("x-robots-tag") {
        rec.check(
            "x-robots-tag allows indexing",
            !tag.to_lowercase().contains("noindex"),
            || {
                Issue::new(Severity::Critical, "X-Robots-Tag header blocks indexing (noindex)")
                    .at("header: x-robots-tag")
            },
        );
    }

    if content.status != 0 {
        rec.check(
            "successful status",
            (200..300).contains(&content.status),
            || {
                Issue::new(
                    Severity::Critical,
                    format!("Page responded with HTTP {}", content.status),
                )
                .at("response status")
            },
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::{page, run};
    use super::super::Rule;
    use crate::content::{enrich, FetchedContent};
    use crate::context::TopicalMapContext;
    use crate::models::Severity;

    fn head(inner: &str) -> String {
        format!("<html><head>{}</head><body></body></html>", inner)
    }

    #[test]
    fn test_title_rules() {
        let missing = page(&head(""), TopicalMapContext::default());
        assert_eq!(run(Rule::TitlePresent, &missing).findings.len(), 1);
        assert!(run(Rule::TitleLength, &missing).not_applicable);

        let short = page(&head("<title>Coffee</title>"), TopicalMapContext::default());
        let outcome = run(Rule::TitleLength, &short);
        assert_eq!(outcome.findings.len(), 1);
        assert!(outcome.findings[0].message.contains("too short"));

        let good = page(
            &head("<title>Cold Brew Coffee: A Complete Home Guide</title>"),
            TopicalMapContext::default(),
        );
        assert!(run(Rule::TitleLength, &good).findings.is_empty());
    }

    #[test]
    fn test_meta_description_checks_length_only_when_present() {
        let missing = page(&head(""), TopicalMapContext::default());
        assert_eq!(run(Rule::MetaDescription, &missing).check_count(), 1);

        let short = page(
            &head(r#"<meta name="description" content="Too short.">"#),
            TopicalMapContext::default(),
        );
        let outcome = run(Rule::MetaDescription, &short);
        assert_eq!(outcome.check_count(), 2);
        assert_eq!(outcome.findings[0].severity, Severity::Low);
    }

    #[test]
    fn test_relative_canonical() {
        let content = page(&head(r#"<link rel="canonical" href="/guide">"#), TopicalMapContext::default());
        let outcome = run(Rule::CanonicalUrl, &content);
        assert_eq!(outcome.check_count(), 2);
        assert!(outcome.findings[0].message.contains("not absolute"));
    }

    #[test]
    fn test_viewport() {
        let content = page(
            &head(r#"<meta name="viewport" content="width=1024">"#),
            TopicalMapContext::default(),
        );
        assert_eq!(run(Rule::Viewport, &content).findings.len(), 1);
    }

    #[test]
    fn test_noindex_is_critical() {
        let fetched = FetchedContent::from_html(
            "https://example.com/a",
            head(r#"<meta name="robots" content="noindex, follow">"#),
        )
        .with_status(404)
        .with_header("X-Robots-Tag", "all");
        let content = enrich(&fetched, &TopicalMapContext::default());
        let outcome = run(Rule::Indexability, &content);
        assert_eq!(outcome.check_count(), 3);
        assert_eq!(outcome.findings.len(), 2);
        assert!(outcome.findings.iter().all(|f| f.severity == Severity::Critical));
    }

    #[test]
    fn test_indexable_page_without_status() {
        let content = page(&head(""), TopicalMapContext::default());
        let outcome = run(Rule::Indexability, &content);
        assert_eq!(outcome.check_count(), 1);
        assert!(outcome.findings.is_empty());
    }
}
