//! Link graph rules

use super::{snippet, Issue, Recorder};
use crate::config::Thresholds;
use crate::content::EnrichedContent;
use crate::models::Severity;
use anyhow::Result;

const GENERIC_ANCHORS: &[&str] = &["click here", "read more", "here", "link", "this", "more", "learn more"];

pub(super) fn link_inventory(
    content: &EnrichedContent,
    t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    let internal = content.internal_links().count();
    rec.check("internal links", internal >= t.min_internal_links, || {
        Issue::new(
            Severity::Medium,
            format!(
                "Page has {} internal links, expected at least {}",
                internal, t.min_internal_links
            ),
        )
        .fix("Link to related pages in the same topic cluster")
    });
    Ok(())
}

pub(super) fn external_references(
    content: &EnrichedContent,
    t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    let external = content.external_links().count();
    rec.check("external references", external >= t.min_external_links, || {
        Issue::new(Severity::Low, "Page references no external sources")
            .fix("Cite authoritative external sources where claims are made")
    });
    Ok(())
}

pub(super) fn generic_anchor_text(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    for (i, link) in content.links.iter().enumerate() {
        let text = link
            .text
            .trim()
            .trim_end_matches(['.', '!', '…'])
            .to_lowercase();
        if text.is_empty() {
            // link-text covers empty anchors
            continue;
        }
        rec.check(
            format!("link {} anchor", i + 1),
            !GENERIC_ANCHORS.contains(&text.as_str()),
            || {
                Issue::new(
                    Severity::Low,
                    format!("Anchor text '{}' does not describe the destination", link.text),
                )
                .at(format!("a[href=\"{}\"]", snippet(&link.href, 60)))
                .fix("Use anchor text that names what the reader will find")
            },
        );
    }
    Ok(())
}

pub(super) fn unsafe_hrefs(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    for (i, link) in content.links.iter().enumerate() {
        let href = link.href.trim();
        let crawlable = !(href.is_empty()
            || href == "#"
            || href.to_ascii_lowercase().starts_with("javascript:"));
        rec.check(format!("link {} href", i + 1), crawlable, || {
            Issue::new(
                Severity::Low,
                format!("Link href '{}' is not crawlable", snippet(href, 40)),
            )
            .at(format!("a: {}", snippet(&link.text, 40)))
            .fix("Point the link at a real URL or use a button for scripted actions")
        });
    }
    Ok(())
}
