//! Heading outline rules

use super::{snippet, Issue, Recorder};
use crate::config::Thresholds;
use crate::content::EnrichedContent;
use crate::models::Severity;
use anyhow::Result;

pub(super) fn single_h1(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    let count = content.h1s().count();
    let present = rec.check("h1 present", count > 0, || {
        Issue::new(Severity::High, "Page has no h1 heading")
            .at("h1")
            .fix("Add a single h1 that states the page topic")
    });
    if present {
        rec.check("exactly one h1", count == 1, || {
            Issue::new(Severity::Medium, format!("Page has {} h1 headings", count))
                .at("h1")
                .fix("Keep one h1 and demote the others to h2")
        });
    }
    Ok(())
}

pub(super) fn heading_hierarchy(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    let Some(first) = content.headings.first() else {
        return Ok(());
    };
    rec.check("outline starts at h1", first.level == 1, || {
        Issue::new(
            Severity::Low,
            format!("First heading is h{}, not h1", first.level),
        )
        .at(format!("h{}: {}", first.level, snippet(&first.text, 40)))
    });

    for pair in content.headings.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        // Going back up the outline never skips
        if next.level <= prev.level {
            continue;
        }
        rec.check(
            format!("h{} -> h{}", prev.level, next.level),
            next.level == prev.level + 1,
            || {
                Issue::new(
                    Severity::Medium,
                    format!("Heading level skipped: h{} → h{}", prev.level, next.level),
                )
                .at(format!("h{}: {}", next.level, snippet(&next.text, 40)))
                .fix(format!("Use h{} here or add the missing level", prev.level + 1))
            },
        );
    }
    Ok(())
}

pub(super) fn empty_headings(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    for (i, heading) in content.headings.iter().enumerate() {
        rec.check(
            format!("heading {} has text", i + 1),
            !heading.text.trim().is_empty(),
            || {
                Issue::new(Severity::Medium, format!("Heading h{} is empty", heading.level))
                    .at(format!("h{} #{}", heading.level, i + 1))
                    .fix("Give the heading text or remove it")
            },
        );
    }
    Ok(())
}

pub(super) fn subheading_coverage(
    content: &EnrichedContent,
    t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    if content.word_count <= t.subheading_min_words {
        return Ok(());
    }
    let h2s = content.headings.iter().filter(|h| h.level == 2).count();
    let needed = content.word_count.div_ceil(t.words_per_h2.max(1));
    rec.check("h2 per section", h2s >= needed, || {
        Issue::new(
            Severity::Low,
            format!(
                "{} words are covered by {} h2 subheadings, expected at least {}",
                content.word_count, h2s, needed
            ),
        )
        .fix("Break the copy into sections with descriptive h2 subheadings")
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::{page, run};
    use super::super::Rule;
    use crate::context::TopicalMapContext;

    fn body(inner: &str) -> String {
        format!("<html><body>{}</body></html>", inner)
    }

    #[test]
    fn test_h1_presence_and_uniqueness() {
        let none = page(&body("<h2>A</h2>"), TopicalMapContext::default());
        let outcome = run(Rule::SingleH1, &none);
        assert_eq!(outcome.check_count(), 1);
        assert_eq!(outcome.findings.len(), 1);

        let two = page(&body("<h1>A</h1><h1>B</h1>"), TopicalMapContext::default());
        let outcome = run(Rule::SingleH1, &two);
        assert_eq!(outcome.check_count(), 2);
        assert!(outcome.findings[0].message.contains("2 h1"));
    }

    #[test]
    fn test_skipped_level() {
        let content = page(&body("<h1>A</h1><h3>B</h3><h2>C</h2><h3>D</h3>"), TopicalMapContext::default());
        let outcome = run(Rule::HeadingHierarchy, &content);
        // start + h1->h3 + h2->h3 (h3->h2 goes up and is not checked)
        assert_eq!(outcome.check_count(), 3);
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(outcome.findings[0].message, "Heading level skipped: h1 → h3");
    }

    #[test]
    fn test_no_headings_is_not_applicable() {
        let content = page(&body("<p>text</p>"), TopicalMapContext::default());
        assert!(run(Rule::HeadingHierarchy, &content).not_applicable);
        assert!(run(Rule::EmptyHeadings, &content).not_applicable);
    }

    #[test]
    fn test_empty_heading() {
        let content = page(&body("<h1>Title</h1><h2>  </h2>"), TopicalMapContext::default());
        let outcome = run(Rule::EmptyHeadings, &content);
        assert_eq!(outcome.check_count(), 2);
        assert_eq!(outcome.findings.len(), 1);
    }

    #[test]
    fn test_subheading_coverage_on_long_copy() {
        let words = "word ".repeat(900);
        let content = page(
            &body(&format!("<h1>T</h1><h2>One</h2><p>{}</p>", words)),
            TopicalMapContext::default(),
        );
        let outcome = run(Rule::SubheadingCoverage, &content);
        assert_eq!(outcome.check_count(), 1);
        assert_eq!(outcome.findings.len(), 1);
    }
}
