//! Topical relevance rules
//!
//! Matching is case-insensitive and whole-word. Text and keywords are both
//! reduced to lowercase words joined by single spaces, so hyphens and runs
//! of whitespace never decide a match, and "car" is not found in "scar".

use super::{Issue, Recorder};
use crate::config::Thresholds;
use crate::content::EnrichedContent;
use crate::models::Severity;
use anyhow::Result;
use memchr::memmem;

/// Lowercase alphanumeric words joined by single spaces
fn normalize(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whole-word occurrences of a normalized phrase in normalized text
fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let hay = haystack.as_bytes();
    memmem::find_iter(hay, needle.as_bytes())
        .filter(|&start| {
            let end = start + needle.len();
            (start == 0 || hay[start - 1] == b' ') && (end == hay.len() || hay[end] == b' ')
        })
        .count()
}

fn mentions(haystack: &str, needle: &str) -> bool {
    count_occurrences(haystack, needle) > 0
}

/// Path of a URL as normalized words
fn slug_words(url: &str) -> String {
    let path = match url.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_, p)| p).unwrap_or(""),
        None => url,
    };
    normalize(path.split(['?', '#']).next().unwrap_or(""))
}

pub(super) fn keyword_placement(
    content: &EnrichedContent,
    t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    let Some(keyword) = content.context.keyword() else {
        rec.check("target keyword defined", false, || {
            Issue::new(
                Severity::Medium,
                "No target keyword supplied; topical placement cannot be judged",
            )
            .fix("Supply the page's target keyword from the topical map")
        });
        return Ok(());
    };

    let needle = normalize(&keyword);
    rec.check("keyword in title", mentions(&normalize(&content.title), &needle), || {
        Issue::new(Severity::High, format!("Title does not contain '{}'", keyword)).at("title")
    });

    let in_h1 = content
        .h1s()
        .any(|h| mentions(&normalize(&h.text), &needle));
    rec.check("keyword in h1", in_h1, || {
        Issue::new(Severity::Medium, format!("h1 does not contain '{}'", keyword)).at("h1")
    });

    rec.check(
        "keyword in meta description",
        mentions(&normalize(&content.meta_description), &needle),
        || {
            Issue::new(
                Severity::Low,
                format!("Meta description does not contain '{}'", keyword),
            )
            .at("meta[name=\"description\"]")
        },
    );

    let intro = content
        .text
        .split_whitespace()
        .take(t.keyword_intro_words)
        .collect::<Vec<_>>()
        .join(" ");
    rec.check("keyword in introduction", mentions(&normalize(&intro), &needle), || {
        Issue::new(
            Severity::Medium,
            format!(
                "'{}' does not appear in the first {} words",
                keyword, t.keyword_intro_words
            ),
        )
        .fix("Mention the topic early so readers and crawlers see it up front")
    });

    rec.check("keyword in url", mentions(&slug_words(&content.url), &needle), || {
        Issue::new(Severity::Low, format!("URL slug does not contain '{}'", keyword))
            .at(content.url.clone())
    });
    Ok(())
}

pub(super) fn keyword_density(
    content: &EnrichedContent,
    t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    let Some(keyword) = content.context.keyword() else {
        return Ok(());
    };
    if content.word_count == 0 {
        return Ok(());
    }
    let needle = normalize(&keyword);
    let hits = count_occurrences(&normalize(&content.text), &needle);
    let keyword_len = needle.split(' ').count().max(1);
    let density = (hits * keyword_len) as f64 / content.word_count as f64 * 100.0;

    let natural = (t.min_keyword_density..=t.max_keyword_density).contains(&density);
    rec.check("keyword density", natural, || {
        if density < t.min_keyword_density {
            Issue::new(
                Severity::Low,
                format!(
                    "Keyword density {:.2}% is below {:.1}%",
                    density, t.min_keyword_density
                ),
            )
            .fix(format!("Work '{}' into the copy where it reads naturally", keyword))
        } else {
            Issue::new(
                Severity::Medium,
                format!(
                    "Keyword density {:.2}% exceeds {:.1}% (keyword stuffing)",
                    density, t.max_keyword_density
                ),
            )
            .fix("Replace repeated exact matches with synonyms and related terms")
        }
    });
    Ok(())
}

pub(super) fn secondary_keyword_coverage(
    content: &EnrichedContent,
    t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    let keywords: Vec<String> = content
        .context
        .secondary_keywords
        .iter()
        .map(|k| normalize(k))
        .filter(|k| !k.is_empty())
        .collect();
    if keywords.is_empty() {
        return Ok(());
    }
    let text = normalize(&content.text);
    let missing: Vec<&str> = keywords
        .iter()
        .filter(|k| !mentions(&text, k))
        .map(String::as_str)
        .collect();
    let coverage = 1.0 - missing.len() as f64 / keywords.len() as f64;
    rec.check(
        "secondary keyword coverage",
        coverage >= t.min_secondary_coverage,
        || {
            Issue::new(
                Severity::Low,
                format!(
                    "{:.0}% of secondary keywords covered; missing: {}",
                    coverage * 100.0,
                    missing.join(", ")
                ),
            )
        },
    );
    Ok(())
}

pub(super) fn entity_coverage(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    let text = normalize(&content.text);
    for entity in &content.context.entities {
        let needle = normalize(entity);
        if needle.is_empty() {
            continue;
        }
        rec.check(format!("mentions {}", entity), mentions(&text, &needle), || {
            Issue::new(Severity::Low, format!("Entity '{}' is never mentioned", entity))
                .fix("Cover the entities search engines associate with this topic")
        });
    }
    Ok(())
}
