//! Body copy rules

use super::{snippet, Issue, Recorder};
use crate::config::Thresholds;
use crate::content::EnrichedContent;
use crate::models::Severity;
use anyhow::Result;

/// Split text into sentences on terminal punctuation
fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.split_whitespace().next().is_some())
}

pub(super) fn thin_content(
    content: &EnrichedContent,
    t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    let words = content.word_count;
    rec.check("minimum word count", words >= t.min_words, || {
        Issue::new(
            Severity::High,
            format!("Thin content: {} words, expected at least {}", words, t.min_words),
        )
        .fix("Expand the page with substantive copy that answers the topic fully")
    });

    if let Some(competitor) = content.context.competitor_word_count.filter(|c| *c > 0) {
        let target = (f64::from(competitor) * t.competitor_ratio).round() as usize;
        rec.check("competitive depth", words >= target, || {
            Issue::new(
                Severity::Medium,
                format!(
                    "Page has {} words, competing pages average {} (target {})",
                    words, competitor, target
                ),
            )
        });
    }
    Ok(())
}

pub(super) fn paragraph_length(
    content: &EnrichedContent,
    t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    for (i, paragraph) in content.paragraphs.iter().enumerate() {
        let words = paragraph.split_whitespace().count();
        rec.check(
            format!("paragraph {} length", i + 1),
            words <= t.max_paragraph_words,
            || {
                Issue::new(
                    Severity::Low,
                    format!(
                        "Paragraph has {} words, over the {} word limit",
                        words, t.max_paragraph_words
                    ),
                )
                .at(format!("p: {}", snippet(paragraph, 50)))
                .fix("Split the paragraph")
            },
        );
    }
    Ok(())
}

pub(super) fn sentence_length(
    content: &EnrichedContent,
    t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    let (count, words) = sentences(&content.text).fold((0usize, 0usize), |(n, w), s| {
        (n + 1, w + s.split_whitespace().count())
    });
    if count == 0 {
        return Ok(());
    }
    let average = words as f64 / count as f64;
    rec.check(
        "average sentence length",
        average <= t.max_avg_sentence_words,
        || {
            Issue::new(
                Severity::Low,
                format!(
                    "Average sentence is {:.1} words, over {}",
                    average, t.max_avg_sentence_words
                ),
            )
            .fix("Shorten long sentences")
        },
    );
    Ok(())
}

pub(super) fn text_to_html_ratio(
    content: &EnrichedContent,
    t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    if content.html_bytes == 0 {
        return Ok(());
    }
    let ratio = content.text.len() as f64 / content.html_bytes as f64;
    rec.check("text to html ratio", ratio >= t.min_text_ratio, || {
        Issue::new(
            Severity::Low,
            format!(
                "Visible text is {:.1}% of the markup, expected at least {:.0}%",
                ratio * 100.0,
                t.min_text_ratio * 100.0
            ),
        )
        .fix("Trim inline scripts and boilerplate markup or add copy")
    });
    Ok(())
}

pub(super) fn structured_formatting(
    content: &EnrichedContent,
    t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    if content.word_count <= t.formatting_min_words {
        return Ok(());
    }
    rec.check(
        "lists or tables",
        content.list_count + content.table_count > 0,
        || {
            Issue::new(
                Severity::Low,
                format!("{} words of copy with no lists or tables", content.word_count),
            )
            .fix("Use lists or tables for steps, comparisons and key facts")
        },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::{page, run};
    use super::super::Rule;
    use super::*;
    use crate::context::TopicalMapContext;

    #[test]
    fn test_sentence_split() {
        let parts: Vec<&str> = sentences("One two. Three!  ? Four five six").collect();
        assert_eq!(parts, vec!["One two", "Three", "Four five six"]);
    }

    #[test]
    fn test_thin_content_against_competitors() {
        let copy = format!("<p>{}</p>", "word ".repeat(400));
        let ctx = TopicalMapContext::new("t").with_competitor_word_count(1000);
        let content = page(&copy, ctx);
        let outcome = run(Rule::ThinContent, &content);
        assert_eq!(outcome.check_count(), 2);
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(outcome.findings[0].severity, Severity::Medium);
    }

    #[test]
    fn test_empty_page_is_thin() {
        let content = page("", TopicalMapContext::default());
        let outcome = run(Rule::ThinContent, &content);
        assert_eq!(outcome.check_count(), 1);
        assert_eq!(outcome.findings[0].severity, Severity::High);
        assert!(run(Rule::SentenceLength, &content).not_applicable);
        assert!(run(Rule::TextToHtmlRatio, &content).not_applicable);
    }

    #[test]
    fn test_long_paragraph() {
        let html = format!("<p>Short one.</p><p>{}</p>", "word ".repeat(200));
        let outcome = run(Rule::ParagraphLength, &page(&html, TopicalMapContext::default()));
        assert_eq!(outcome.check_count(), 2);
        assert_eq!(outcome.findings.len(), 1);
    }

    #[test]
    fn test_long_copy_needs_lists() {
        let html = format!("<p>{}</p>", "word ".repeat(700));
        let outcome = run(Rule::StructuredFormatting, &page(&html, TopicalMapContext::default()));
        assert_eq!(outcome.findings.len(), 1);

        let html = format!("<p>{}</p><ul><li>a</li></ul>", "word ".repeat(700));
        let outcome = run(Rule::StructuredFormatting, &page(&html, TopicalMapContext::default()));
        assert!(outcome.findings.is_empty());
    }
}
