//! Content enrichment
//!
//! Turns raw fetcher output into the canonical [`EnrichedContent`] shape.
//! Enrichment never fails: a missing field becomes an explicit empty value
//! and a wrongly-typed one is coerced to that default with a degradation
//! diagnostic, so no rule ever reads an absent field.

use super::markup::{normalize_ws, parse_markup, RawLink};
use super::{AltText, EnrichedContent, FetchedContent, Heading, Image, Link, LinkScope};
use crate::context::TopicalMapContext;
use crate::models::Diagnostic;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Collects degradation notes while fields are coerced
struct Coercer {
    notes: Vec<Diagnostic>,
}

impl Coercer {
    fn degrade(&mut self, field: &str, message: String) {
        warn!("Enrichment degraded field '{}': {}", field, message);
        self.notes.push(Diagnostic::degradation(field, message));
    }

    /// A textual field. `None` when absent; malformed values degrade to `""`.
    fn string(&mut self, field: &str, value: Option<&Value>) -> Option<String> {
        match value? {
            Value::String(s) => Some(s.clone()),
            other => {
                self.degrade(
                    field,
                    format!("expected text, got {}; using empty value", json_kind(other)),
                );
                Some(String::new())
            }
        }
    }

    /// A list field. `None` when absent or malformed, so it can be derived
    /// from markup instead.
    fn list<'a>(&mut self, field: &str, value: Option<&'a Value>) -> Option<&'a Vec<Value>> {
        match value? {
            Value::Array(items) => Some(items),
            other => {
                self.degrade(
                    field,
                    format!("expected a list, got {}; deriving from markup", json_kind(other)),
                );
                None
            }
        }
    }

    fn status(&mut self, value: Option<&Value>) -> u16 {
        let parsed = match value {
            None => return 0,
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
            Some(_) => None,
        };
        match parsed {
            Some(code) if (100..=599).contains(&code) => code as u16,
            _ => {
                self.degrade("status", "unrecognised status code; treating as unknown".into());
                0
            }
        }
    }

    fn headers(&mut self, value: Option<&Value>) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        match value {
            None => {}
            Some(Value::Object(map)) => {
                for (name, v) in map {
                    match v {
                        Value::String(s) => {
                            headers.insert(name.to_ascii_lowercase(), s.clone());
                        }
                        other => self.degrade(
                            "headers",
                            format!("header '{}' is {}; dropped", name, json_kind(other)),
                        ),
                    }
                }
            }
            Some(other) => self.degrade(
                "headers",
                format!("expected a map, got {}; using no headers", json_kind(other)),
            ),
        }
        headers
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "text",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// `{"level": 2, "text": ".."}`, `{"tag": "h2", ..}` or `"h2: .."`
fn heading_from(value: &Value) -> Option<Heading> {
    fn level_of(v: &Value) -> Option<u8> {
        match v {
            Value::Number(n) => n.as_u64().and_then(|l| u8::try_from(l).ok()),
            Value::String(s) => s.trim().trim_start_matches(['h', 'H']).parse().ok(),
            _ => None,
        }
    }

    let heading = match value {
        Value::Object(map) => {
            let level = map
                .get("level")
                .or_else(|| map.get("tag"))
                .and_then(level_of)?;
            let text = map.get("text").and_then(Value::as_str).unwrap_or("");
            Heading {
                level,
                text: normalize_ws(text),
            }
        }
        Value::String(s) => {
            let (tag, text) = s.split_once(':')?;
            Heading {
                level: level_of(&Value::String(tag.to_string()))?,
                text: normalize_ws(text),
            }
        }
        _ => return None,
    };
    (1..=6).contains(&heading.level).then_some(heading)
}

fn image_from(coercer: &mut Coercer, value: &Value) -> Option<Image> {
    let map = value.as_object()?;
    let str_of = |key: &str| map.get(key).and_then(Value::as_str).unwrap_or("").trim();
    let alt = match map.get("alt") {
        None | Some(Value::Null) => AltText::Missing,
        Some(Value::String(s)) if s.trim().is_empty() => AltText::Empty,
        Some(Value::String(s)) => AltText::Text(normalize_ws(s)),
        Some(other) => {
            coercer.degrade(
                "images",
                format!(
                    "alt of image '{}' is {}; treating it as missing",
                    str_of("src"),
                    json_kind(other)
                ),
            );
            AltText::Missing
        }
    };
    let role = str_of("role");
    Some(Image {
        src: str_of("src").to_string(),
        alt,
        decorative: role.eq_ignore_ascii_case("presentation")
            || role.eq_ignore_ascii_case("none")
            || map.get("decorative").and_then(Value::as_bool).unwrap_or(false),
        has_dimensions: map.get("width").is_some_and(|v| !v.is_null())
            && map.get("height").is_some_and(|v| !v.is_null()),
        lazy: str_of("loading").eq_ignore_ascii_case("lazy"),
    })
}

fn raw_link_from(value: &Value) -> Option<RawLink> {
    let map = value.as_object()?;
    let str_of = |key: &str| map.get(key).and_then(Value::as_str).unwrap_or("").trim();
    let href = str_of("href");
    if href.is_empty() {
        return None;
    }
    Some(RawLink {
        href: href.to_string(),
        text: normalize_ws(str_of("text")),
        rel: str_of("rel").to_lowercase(),
        aria_label: str_of("aria_label").to_string(),
    })
}

/// Host part of an absolute URL, lowercased, without `www.`
fn host_of(url: &str) -> Option<String> {
    let rest = url.trim().split_once("://")?.1;
    let host = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or("")
        .rsplit('@')
        .next()
        .unwrap_or("")
        .split(':')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    (!host.is_empty()).then_some(host)
}

/// `mailto:`, `tel:`, `javascript:`, `data:` and similar: a scheme with no
/// `//` authority after it
fn has_opaque_scheme(href: &str) -> bool {
    let Some((scheme, rest)) = href.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && !rest.starts_with("//")
}

fn classify_link(raw: RawLink, page_host: Option<&str>) -> Link {
    let href = raw.href.trim();
    let scope = if href.is_empty() || href.starts_with('#') || has_opaque_scheme(href) {
        LinkScope::NonNavigational
    } else {
        let host = if href.starts_with("//") {
            host_of(&format!("https:{}", href))
        } else {
            host_of(href)
        };
        match host {
            Some(host) if Some(host.as_str()) != page_host => LinkScope::External,
            _ => LinkScope::Internal,
        }
    };
    Link {
        href: raw.href,
        text: raw.text,
        rel: raw.rel,
        aria_label: raw.aria_label,
        scope,
    }
}

/// Map a fetcher-supplied list, dropping malformed items with one note
fn supplied_items<T>(
    coercer: &mut Coercer,
    field: &str,
    items: &[Value],
    mut parse: impl FnMut(&mut Coercer, &Value) -> Option<T>,
) -> Vec<T> {
    let parsed: Vec<T> = items.iter().filter_map(|item| parse(coercer, item)).collect();
    let dropped = items.len() - parsed.len();
    if dropped > 0 {
        coercer.degrade(field, format!("{} malformed item(s) dropped", dropped));
    }
    parsed
}

/// Produce the canonical content shape for one audit run.
///
/// The caller's context is cloned in, never modified. Deterministic: the
/// same input always yields an equal output.
pub fn enrich(fetched: &FetchedContent, context: &TopicalMapContext) -> EnrichedContent {
    let mut coercer = Coercer { notes: Vec::new() };

    let url = coercer.string("url", fetched.url.as_ref()).unwrap_or_default();
    let html = coercer.string("html", fetched.html.as_ref());
    let text = coercer.string("text", fetched.text.as_ref());
    if html.is_none() && text.is_none() {
        coercer.degrade("html", "neither markup nor text supplied; using empty values".into());
    }
    let html = html.unwrap_or_default();

    let outline = parse_markup(&html);

    let text = match text {
        Some(t) if !t.trim().is_empty() => normalize_ws(&t),
        _ => outline.body_text.clone(),
    };
    let title = coercer
        .string("title", fetched.title.as_ref())
        .filter(|t| !t.trim().is_empty())
        .map(|t| normalize_ws(&t))
        .unwrap_or_else(|| outline.title.clone());
    let meta_description = coercer
        .string("meta_description", fetched.meta_description.as_ref())
        .filter(|d| !d.trim().is_empty())
        .map(|d| normalize_ws(&d))
        .unwrap_or_else(|| outline.meta_description.clone());

    let headings = match coercer.list("headings", fetched.headings.as_ref()) {
        Some(items) => supplied_items(&mut coercer, "headings", items, |_, v| heading_from(v)),
        None => outline.headings.clone(),
    };
    let images = match coercer.list("images", fetched.images.as_ref()) {
        Some(items) => supplied_items(&mut coercer, "images", items, image_from),
        None => outline.images.clone(),
    };
    let raw_links = match coercer.list("links", fetched.links.as_ref()) {
        Some(items) => supplied_items(&mut coercer, "links", items, |_, v| raw_link_from(v)),
        None => outline.links.clone(),
    };

    let page_host = host_of(&url);
    let links = raw_links
        .into_iter()
        .map(|l| classify_link(l, page_host.as_deref()))
        .collect();

    let status = coercer.status(fetched.status.as_ref());
    let headers = coercer.headers(fetched.headers.as_ref());
    let word_count = text.split_whitespace().count();

    let enriched = EnrichedContent {
        url,
        html_bytes: html.len(),
        html,
        word_count,
        text,
        title,
        meta_description,
        canonical: outline.canonical,
        lang: outline.lang,
        robots: outline.robots,
        viewport: outline.viewport,
        status,
        headers,
        headings,
        images,
        links,
        json_ld: outline.json_ld,
        paragraphs: outline.paragraphs,
        list_count: outline.list_count,
        table_count: outline.table_count,
        time_elements: outline.time_elements,
        calls_to_action: outline.calls_to_action,
        blocking_scripts: outline.blocking_scripts,
        stylesheets: outline.stylesheets,
        context: context.clone(),
        degradations: coercer.notes,
    };

    debug!(
        "Enriched {}: {} words, {} headings, {} images, {} links, {} json-ld blocks, {} degradations",
        if enriched.url.is_empty() { "<no url>" } else { &enriched.url },
        enriched.word_count,
        enriched.headings.len(),
        enriched.images.len(),
        enriched.links.len(),
        enriched.json_ld.len(),
        enriched.degradations.len()
    );

    enriched
}
