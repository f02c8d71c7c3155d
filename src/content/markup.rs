//! Markup extraction
//!
//! Parses raw HTML once with `scraper` and pulls out everything the rules
//! need: document metadata, outline, media, links, structured data blocks
//! and call-to-action candidates. Parsing is lenient; malformed markup
//! yields whatever html5ever recovers, never an error.

use super::{AltText, CallToAction, CtaKind, Heading, Image};
use scraper::{ElementRef, Html, Node, Selector};

/// Link as found in markup, before internal/external classification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLink {
    pub href: String,
    pub text: String,
    pub rel: String,
    pub aria_label: String,
}

/// Everything extracted from one document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkupOutline {
    pub title: String,
    pub meta_description: String,
    pub canonical: String,
    pub lang: String,
    pub robots: String,
    pub viewport: String,
    pub headings: Vec<Heading>,
    pub images: Vec<Image>,
    pub links: Vec<RawLink>,
    pub json_ld: Vec<String>,
    pub paragraphs: Vec<String>,
    pub list_count: usize,
    pub table_count: usize,
    pub time_elements: usize,
    pub calls_to_action: Vec<CallToAction>,
    pub blocking_scripts: usize,
    pub stylesheets: usize,
    /// Visible body text, whitespace-normalized
    pub body_text: String,
}

/// Elements whose text never reaches the reader
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "svg", "head"];

fn select_all<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Collapse runs of whitespace into single spaces
pub(crate) fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(el: &ElementRef<'_>) -> String {
    normalize_ws(&el.text().collect::<String>())
}

fn attr(el: &ElementRef<'_>, name: &str) -> String {
    el.value().attr(name).unwrap_or("").trim().to_string()
}

fn has_token(value: &str, token: &str) -> bool {
    value
        .split_whitespace()
        .any(|t| t.eq_ignore_ascii_case(token))
}

/// Classify an element as a call to action, returning its label
fn cta_candidate(el: &ElementRef<'_>) -> Option<(CtaKind, String)> {
    let value = el.value();
    match value.name() {
        "button" => Some((CtaKind::Button, element_text(el))),
        "input" => {
            let kind = value.attr("type").unwrap_or("").to_ascii_lowercase();
            if kind == "submit" || kind == "button" {
                Some((CtaKind::Input, attr(el, "value")))
            } else {
                None
            }
        }
        "a" => {
            let class = value.attr("class").unwrap_or("").to_ascii_lowercase();
            let role = value.attr("role").unwrap_or("");
            let styled = class
                .split_whitespace()
                .any(|c| c.contains("btn") || c.contains("button") || c.contains("cta"));
            if styled || role.eq_ignore_ascii_case("button") {
                Some((CtaKind::Link, element_text(el)))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Walk the body in document order, collecting visible text and the word
/// offset at which each call to action appears.
fn walk_body(document: &Html) -> (String, Vec<(CtaKind, String, usize)>) {
    let mut words: Vec<String> = Vec::new();
    let mut ctas = Vec::new();

    let root = select_all(document, "body")
        .into_iter()
        .next()
        .unwrap_or_else(|| document.root_element());

    for node in root.descendants() {
        match node.value() {
            Node::Text(text) => {
                let hidden = node.ancestors().any(|a| {
                    a.value()
                        .as_element()
                        .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
                });
                if !hidden {
                    words.extend(text.split_whitespace().map(str::to_string));
                }
            }
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(node) {
                    if let Some((kind, label)) = cta_candidate(&el) {
                        ctas.push((kind, label, words.len()));
                    }
                }
            }
            _ => {}
        }
    }

    (words.join(" "), ctas)
}

fn image_from(el: &ElementRef<'_>) -> Image {
    let value = el.value();
    let alt = match value.attr("alt") {
        None => AltText::Missing,
        Some(a) if a.trim().is_empty() => AltText::Empty,
        Some(a) => AltText::Text(normalize_ws(a)),
    };
    let role = value.attr("role").unwrap_or("");
    let decorative = role.eq_ignore_ascii_case("presentation")
        || role.eq_ignore_ascii_case("none")
        || value
            .attr("aria-hidden")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
    Image {
        src: attr(el, "src"),
        alt,
        decorative,
        has_dimensions: value.attr("width").is_some() && value.attr("height").is_some(),
        lazy: value
            .attr("loading")
            .is_some_and(|v| v.eq_ignore_ascii_case("lazy")),
    }
}

fn link_from(el: &ElementRef<'_>) -> RawLink {
    let mut text = element_text(el);
    if text.is_empty() {
        // An image-only link takes its label from the image alt
        if let Ok(img) = Selector::parse("img[alt]") {
            if let Some(image) = el.select(&img).next() {
                text = attr(&image, "alt");
            }
        }
    }
    RawLink {
        href: attr(el, "href"),
        text,
        rel: attr(el, "rel").to_lowercase(),
        aria_label: attr(el, "aria-label"),
    }
}

/// Parse a document and extract its outline
pub fn parse_markup(html: &str) -> MarkupOutline {
    let mut outline = MarkupOutline::default();
    if html.trim().is_empty() {
        return outline;
    }

    let document = Html::parse_document(html);

    outline.lang = document
        .root_element()
        .value()
        .attr("lang")
        .unwrap_or("")
        .trim()
        .to_string();

    if let Some(title) = select_all(&document, "title").first() {
        outline.title = element_text(title);
    }

    for meta in select_all(&document, "meta[name]") {
        let name = attr(&meta, "name").to_ascii_lowercase();
        let content = normalize_ws(meta.value().attr("content").unwrap_or(""));
        match name.as_str() {
            "description" if outline.meta_description.is_empty() => {
                outline.meta_description = content
            }
            "robots" => outline.robots = content.to_lowercase(),
            "viewport" => outline.viewport = content,
            _ => {}
        }
    }

    for link in select_all(&document, "link[rel]") {
        let rel = attr(&link, "rel");
        if has_token(&rel, "canonical") && outline.canonical.is_empty() {
            outline.canonical = attr(&link, "href");
        } else if has_token(&rel, "stylesheet") {
            outline.stylesheets += 1;
        }
    }

    for script in select_all(&document, "script") {
        let value = script.value();
        let kind = value.attr("type").unwrap_or("").trim().to_ascii_lowercase();
        if kind == "application/ld+json" {
            outline.json_ld.push(script.text().collect::<String>().trim().to_string());
        } else if value.attr("src").is_some()
            && value.attr("async").is_none()
            && value.attr("defer").is_none()
            && kind != "module"
        {
            outline.blocking_scripts += 1;
        }
    }

    outline.headings = select_all(&document, "h1, h2, h3, h4, h5, h6")
        .iter()
        .filter_map(|h| {
            let level = h.value().name()[1..].parse::<u8>().ok()?;
            Some(Heading {
                level,
                text: element_text(h),
            })
        })
        .collect();

    outline.images = select_all(&document, "img").iter().map(image_from).collect();
    outline.links = select_all(&document, "a[href]").iter().map(link_from).collect();

    outline.paragraphs = select_all(&document, "p")
        .iter()
        .map(element_text)
        .filter(|p| !p.is_empty())
        .collect();

    outline.list_count = select_all(&document, "ul, ol").len();
    outline.table_count = select_all(&document, "table").len();
    outline.time_elements = select_all(&document, "time").len();

    let (body_text, ctas) = walk_body(&document);
    let total_words = body_text.split_whitespace().count().max(1) as f64;
    outline.calls_to_action = ctas
        .into_iter()
        .map(|(kind, text, offset)| CallToAction {
            text,
            kind,
            position: (offset as f64 / total_words).min(1.0),
        })
        .collect();
    outline.body_text = body_text;

    outline
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <title> Cold Brew   Guide </title>
  <meta name="description" content="How to make cold brew at home.">
  <meta name="robots" content="INDEX, follow">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <link rel="canonical" href="https://example.com/cold-brew">
  <link rel="stylesheet" href="/site.css">
  <script src="/app.js"></script>
  <script src="/late.js" defer></script>
  <script type="application/ld+json">{"@context":"https://schema.org","@type":"Article"}</script>
</head>
<body>
  <h1>Cold Brew</h1>
  <p>Intro words here.</p>
  <a class="btn btn-primary" href="/buy">Buy beans</a>
  <h3>Ratio</h3>
  <img src="/a.png" alt="A jar" width="10" height="10" loading="lazy">
  <img src="/b.png">
  <img src="/c.png" alt="" role="presentation">
  <a href="/more"><img src="/d.png" alt="More recipes"></a>
  <ul><li>one</li></ul>
  <script>var hidden = "not text";</script>
  <button>Subscribe now</button>
</body>
</html>"#;

    #[test]
    fn test_metadata_extraction() {
        let o = parse_markup(PAGE);
        assert_eq!(o.lang, "en");
        assert_eq!(o.title, "Cold Brew Guide");
        assert_eq!(o.meta_description, "How to make cold brew at home.");
        assert_eq!(o.robots, "index, follow");
        assert_eq!(o.canonical, "https://example.com/cold-brew");
        assert_eq!(o.stylesheets, 1);
        assert_eq!(o.blocking_scripts, 1);
        assert_eq!(o.json_ld.len(), 1);
    }

    #[test]
    fn test_outline_and_media() {
        let o = parse_markup(PAGE);
        let levels: Vec<u8> = o.headings.iter().map(|h| h.level).collect();
        assert_eq!(levels, vec![1, 3]);

        assert_eq!(o.images.len(), 4);
        assert_eq!(o.images[0].alt, AltText::Text("A jar".into()));
        assert!(o.images[0].has_dimensions && o.images[0].lazy);
        assert_eq!(o.images[1].alt, AltText::Missing);
        assert_eq!(o.images[2].alt, AltText::Empty);
        assert!(o.images[2].decorative);

        // image-only link takes its text from alt
        let more = o.links.iter().find(|l| l.href == "/more").expect("link");
        assert_eq!(more.text, "More recipes");
        assert_eq!(o.list_count, 1);
    }

    #[test]
    fn test_body_text_skips_scripts() {
        let o = parse_markup(PAGE);
        assert!(o.body_text.contains("Intro words here."));
        assert!(!o.body_text.contains("not text"));
    }

    #[test]
    fn test_calls_to_action_with_position() {
        let o = parse_markup(PAGE);
        assert_eq!(o.calls_to_action.len(), 2);
        assert_eq!(o.calls_to_action[0].text, "Buy beans");
        assert_eq!(o.calls_to_action[0].kind, CtaKind::Link);
        assert_eq!(o.calls_to_action[1].kind, CtaKind::Button);
        assert!(o.calls_to_action[0].position < o.calls_to_action[1].position);
    }

    #[test]
    fn test_empty_markup() {
        assert_eq!(parse_markup("   "), MarkupOutline::default());
    }
}
