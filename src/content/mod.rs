//! Page content: raw fetcher output and the canonical enriched shape
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐    enrich()     ┌──────────────────────────┐
//! │ FetchedContent       │ ──────────────▶ │ EnrichedContent          │
//! │ - loosely typed JSON │                 │ - every field present    │
//! │ - aliased field names│   + context     │ - derived from markup    │
//! │ - may be malformed   │ ──────────────▶ │   when fetcher omitted it│
//! └──────────────────────┘                 └──────────────────────────┘
//! ```
//!
//! Rules only ever see `EnrichedContent`. It is a closed value type with no
//! optional members for anything a rule reads; missing input becomes an
//! explicit empty value plus a degradation diagnostic.

mod enricher;
mod markup;

pub use enricher::enrich;
pub use markup::{parse_markup, MarkupOutline};

use crate::context::TopicalMapContext;
use crate::models::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Raw output of the external fetcher.
///
/// Fields are kept as untyped JSON so that a wrongly-typed value never
/// fails deserialization. Accepts the field-name variants different fetch
/// layers have used (`raw_html`, `content`, `plain_text`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct FetchedContent {
    pub url: Option<Value>,
    pub html: Option<Value>,
    pub text: Option<Value>,
    pub title: Option<Value>,
    pub meta_description: Option<Value>,
    pub headings: Option<Value>,
    pub images: Option<Value>,
    pub links: Option<Value>,
    pub status: Option<Value>,
    pub headers: Option<Value>,
}

const URL_KEYS: &[&str] = &["url", "final_url", "page_url"];
const HTML_KEYS: &[&str] = &["html", "raw_html", "content", "body", "markup"];
const TEXT_KEYS: &[&str] = &["text", "plain_text", "markdown", "content_text"];
const TITLE_KEYS: &[&str] = &["title", "page_title"];
const DESCRIPTION_KEYS: &[&str] = &["meta_description", "description"];
const STATUS_KEYS: &[&str] = &["status", "status_code"];

/// First non-null value among the aliases, in alias order
fn take_alias(map: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    let mut found = None;
    for key in keys {
        if let Some(value) = map.remove(*key) {
            if found.is_none() && !value.is_null() {
                found = Some(value);
            }
        }
    }
    found
}

impl From<Value> for FetchedContent {
    fn from(value: Value) -> Self {
        let mut map = match value {
            Value::Object(map) => map,
            _ => return FetchedContent::default(),
        };
        FetchedContent {
            url: take_alias(&mut map, URL_KEYS),
            html: take_alias(&mut map, HTML_KEYS),
            text: take_alias(&mut map, TEXT_KEYS),
            title: take_alias(&mut map, TITLE_KEYS),
            meta_description: take_alias(&mut map, DESCRIPTION_KEYS),
            headings: take_alias(&mut map, &["headings"]),
            images: take_alias(&mut map, &["images"]),
            links: take_alias(&mut map, &["links"]),
            status: take_alias(&mut map, STATUS_KEYS),
            headers: take_alias(&mut map, &["headers", "response_headers"]),
        }
    }
}

impl FetchedContent {
    /// Content as a browser-style fetch would return it: a URL and its markup
    pub fn from_html(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: Some(Value::String(url.into())),
            html: Some(Value::String(html.into())),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(Value::String(text.into()));
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(Value::from(status));
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        let mut headers = match self.headers.take() {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        headers.insert(name.to_string(), Value::String(value.to_string()));
        self.headers = Some(Value::Object(headers));
        self
    }
}

/// A heading in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

/// State of an image's `alt` attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "kebab-case")]
pub enum AltText {
    Missing,
    Empty,
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    pub alt: AltText,
    /// `role="presentation"`/`none` or `aria-hidden="true"`
    pub decorative: bool,
    pub has_dimensions: bool,
    pub lazy: bool,
}

/// Where a link leads, relative to the audited page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkScope {
    /// Same host as the page, or relative
    Internal,
    External,
    /// Fragment-only, `javascript:`, `data:`, `mailto:`, `tel:` and other
    /// hrefs that do not load another page
    NonNavigational,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub text: String,
    pub rel: String,
    pub aria_label: String,
    pub scope: LinkScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CtaKind {
    Button,
    Link,
    Input,
}

/// A call-to-action candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToAction {
    pub text: String,
    pub kind: CtaKind,
    /// Fraction of the document's words that precede this element (0.0-1.0)
    pub position: f64,
}

/// Canonical content shape consumed by every rule.
///
/// Produced once per run by [`enrich`]; never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrichedContent {
    pub url: String,
    pub html: String,
    pub text: String,
    pub title: String,
    pub meta_description: String,
    pub canonical: String,
    pub lang: String,
    pub robots: String,
    pub viewport: String,
    /// HTTP status, 0 when the fetcher did not report one
    pub status: u16,
    /// Response headers with lowercased names
    pub headers: BTreeMap<String, String>,
    pub headings: Vec<Heading>,
    pub images: Vec<Image>,
    pub links: Vec<Link>,
    /// Raw bodies of `application/ld+json` scripts
    pub json_ld: Vec<String>,
    pub paragraphs: Vec<String>,
    pub list_count: usize,
    pub table_count: usize,
    pub time_elements: usize,
    pub calls_to_action: Vec<CallToAction>,
    /// External scripts without `async`/`defer`
    pub blocking_scripts: usize,
    pub stylesheets: usize,
    pub word_count: usize,
    pub html_bytes: usize,
    pub context: TopicalMapContext,
    pub degradations: Vec<Diagnostic>,
}

impl EnrichedContent {
    /// True when there is neither markup nor text to audit
    pub fn is_empty(&self) -> bool {
        self.html.trim().is_empty() && self.text.trim().is_empty()
    }

    pub fn h1s(&self) -> impl Iterator<Item = &Heading> {
        self.headings.iter().filter(|h| h.level == 1)
    }

    pub fn internal_links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(|l| l.scope == LinkScope::Internal)
    }

    pub fn external_links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(|l| l.scope == LinkScope::External)
    }

    /// Size of a field, for shape reporting. Every field always exists;
    /// this reports how much is in it.
    pub fn field_len(&self, field: ContentField) -> usize {
        match field {
            ContentField::Url => self.url.len(),
            ContentField::Html => self.html.len(),
            ContentField::Text => self.text.len(),
            ContentField::Title => self.title.len(),
            ContentField::MetaDescription => self.meta_description.len(),
            ContentField::Canonical => self.canonical.len(),
            ContentField::Lang => self.lang.len(),
            ContentField::Robots => self.robots.len(),
            ContentField::Viewport => self.viewport.len(),
            ContentField::Status => usize::from(self.status != 0),
            ContentField::Headers => self.headers.len(),
            ContentField::Headings => self.headings.len(),
            ContentField::Images => self.images.len(),
            ContentField::Links => self.links.len(),
            ContentField::JsonLd => self.json_ld.len(),
            ContentField::Paragraphs => self.paragraphs.len(),
            ContentField::CallsToAction => self.calls_to_action.len(),
            ContentField::Resources => self.blocking_scripts + self.stylesheets,
            ContentField::WordCount => self.word_count,
            ContentField::Context => usize::from(!self.context.topic.is_empty()),
        }
    }
}

/// Named fields of [`EnrichedContent`] a rule may declare it reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentField {
    Url,
    Html,
    Text,
    Title,
    MetaDescription,
    Canonical,
    Lang,
    Robots,
    Viewport,
    Status,
    Headers,
    Headings,
    Images,
    Links,
    JsonLd,
    Paragraphs,
    CallsToAction,
    Resources,
    WordCount,
    Context,
}
