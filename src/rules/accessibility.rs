//! Accessibility rules

use super::{snippet, Issue, Recorder};
use crate::config::Thresholds;
use crate::content::{AltText, EnrichedContent, Image};
use crate::models::Severity;
use anyhow::Result;

fn image_ref(i: usize, image: &Image) -> String {
    if image.src.is_empty() {
        format!("img #{}", i + 1)
    } else {
        format!("img[src=\"{}\"]", snippet(&image.src, 60))
    }
}

pub(super) fn document_language(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    rec.check("html lang declared", !content.lang.is_empty(), || {
        Issue::new(Severity::Medium, "Document does not declare a language")
            .at("html")
            .fix("Add a lang attribute, e.g. <html lang=\"en\">")
    });
    Ok(())
}

pub(super) fn image_alt_text(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    for (i, image) in content.images.iter().enumerate() {
        // alt="" only counts as decorative alongside role=presentation/none or aria-hidden
        let (ok, message) = match &image.alt {
            AltText::Text(_) => (true, ""),
            _ if image.decorative => (true, ""),
            AltText::Empty => (false, "Image has empty alt text but is not marked decorative"),
            AltText::Missing => (false, "Image has no alt attribute"),
        };
        rec.check(format!("image {} alt", i + 1), ok, || {
            Issue::new(Severity::Medium, message)
                .at(image_ref(i, image))
                .fix("Describe the image in alt, or pair alt=\"\" with role=\"presentation\" if it is decorative")
        });
    }
    Ok(())
}

pub(super) fn link_text(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    for (i, link) in content.links.iter().enumerate() {
        let discernible = !link.text.trim().is_empty() || !link.aria_label.trim().is_empty();
        rec.check(format!("link {} text", i + 1), discernible, || {
            Issue::new(Severity::Medium, "Link has no discernible text")
                .at(format!("a[href=\"{}\"]", snippet(&link.href, 60)))
                .fix("Give the link visible text or an aria-label")
        });
    }
    Ok(())
}

pub(super) fn image_dimensions(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    for (i, image) in content.images.iter().enumerate() {
        rec.check(
            format!("image {} dimensions", i + 1),
            image.has_dimensions,
            || {
                Issue::new(Severity::Low, "Image does not declare width and height")
                    .at(image_ref(i, image))
                    .fix("Set width and height to reserve layout space")
            },
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::{page, run};
    use super::super::Rule;
    use crate::context::TopicalMapContext;

    #[test]
    fn test_missing_lang() {
        let content = page("<html><body></body></html>", TopicalMapContext::default());
        assert_eq!(run(Rule::DocumentLanguage, &content).findings.len(), 1);
    }

    #[test]
    fn test_alt_states() {
        let html = r#"<body>
            <img src="/a.png" alt="Chart">
            <img src="/b.png" alt="" role="presentation">
            <img src="/c.png" role="presentation">
            <img src="/d.png">
            <img src="/e.png" alt="" aria-hidden="true">
        </body>"#;
        let outcome = run(Rule::ImageAltText, &page(html, TopicalMapContext::default()));
        assert_eq!(outcome.check_count(), 5);
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(outcome.findings[0].element.as_deref(), Some("img[src=\"/d.png\"]"));
    }

    #[test]
    fn test_empty_alt_needs_decorative_marker() {
        let html = r#"<body>
            <img src="/hero.jpg" alt="">
            <img src="/rule.png" alt=" " role="none">
        </body>"#;
        let outcome = run(Rule::ImageAltText, &page(html, TopicalMapContext::default()));
        assert_eq!(outcome.check_count(), 2);
        assert_eq!(outcome.findings.len(), 1);
        let finding = &outcome.findings[0];
        assert_eq!(finding.element.as_deref(), Some("img[src=\"/hero.jpg\"]"));
        assert!(finding.message.contains("not marked decorative"));
    }

    #[test]
    fn test_link_text_accepts_aria_label() {
        let html = r#"<body><a href="/x" aria-label="Close"></a><a href="/y"></a></body>"#;
        let outcome = run(Rule::LinkText, &page(html, TopicalMapContext::default()));
        assert_eq!(outcome.check_count(), 2);
        assert_eq!(outcome.findings.len(), 1);
    }

    #[test]
    fn test_no_images_not_applicable() {
        let content = page("<body><p>x</p></body>", TopicalMapContext::default());
        assert!(run(Rule::ImageDimensions, &content).not_applicable);
    }
}
