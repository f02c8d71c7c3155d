//! Rule validators
//!
//! A rule is the atomic unit of analysis: it inspects one narrow property
//! of the enriched page and records every assertion it evaluates, passed or
//! failed, plus a finding for each failure.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    RuleValidator trait                      │
//! │  - id(): stable kebab-case identifier                       │
//! │  - requires(): fields of EnrichedContent the rule reads     │
//! │  - validate(phase, content): checks + findings              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Rule enum                            │
//! │  Closed set of every built-in rule, grouped by phase.       │
//! │  Dispatches to plain functions in the phase modules.        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rules are pure: no I/O, no shared state. They may run in any order.

mod accessibility;
mod content_quality;
mod cta;
mod experience;
mod factual;
mod headings;
mod linking;
mod metadata;
mod structured_data;
mod topical;

use crate::config::Thresholds;
use crate::content::{ContentField, EnrichedContent};
use crate::models::{CheckRecord, Finding, Severity};
use crate::phases::PhaseKind;
use anyhow::Result;

/// A failed assertion, before it is stamped with phase and rule ids
#[derive(Debug, Clone)]
pub struct Issue {
    severity: Severity,
    message: String,
    element: Option<String>,
    fix: Option<String>,
}

impl Issue {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            element: None,
            fix: None,
        }
    }

    pub fn at(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    pub fn fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }
}

/// What one rule evaluated
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleOutcome {
    pub checks: Vec<CheckRecord>,
    pub findings: Vec<Finding>,
    /// The rule found nothing on the page to inspect
    pub not_applicable: bool,
}

impl RuleOutcome {
    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    pub fn passed(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }
}

/// Accumulates checks for one rule invocation
pub struct Recorder<'a> {
    phase: &'a str,
    rule: &'a str,
    checks: Vec<CheckRecord>,
    findings: Vec<Finding>,
}

impl<'a> Recorder<'a> {
    /// Start recording for `rule` running inside `phase`
    pub fn new(phase: &'a str, rule: &'a str) -> Self {
        Self {
            phase,
            rule,
            checks: Vec::new(),
            findings: Vec::new(),
        }
    }

    /// Record one assertion. `on_fail` builds the finding only when needed.
    pub fn check(
        &mut self,
        name: impl Into<String>,
        passed: bool,
        on_fail: impl FnOnce() -> Issue,
    ) -> bool {
        self.checks.push(CheckRecord {
            rule: self.rule.to_string(),
            check: name.into(),
            passed,
        });
        if !passed {
            let issue = on_fail();
            let mut finding = Finding::new(
                self.phase,
                self.rule,
                issue.severity,
                issue.message,
                issue.element,
            );
            finding.suggested_fix = issue.fix;
            self.findings.push(finding);
        }
        passed
    }

    pub fn finish(self) -> RuleOutcome {
        RuleOutcome {
            not_applicable: self.checks.is_empty(),
            checks: self.checks,
            findings: self.findings,
        }
    }
}

/// Trait for anything a phase can run
pub trait RuleValidator: Send + Sync {
    /// Stable kebab-case identifier, unique across all phases
    fn id(&self) -> &'static str;

    /// Human-readable description of what the rule checks
    fn description(&self) -> &'static str;

    /// Minimum shape of `EnrichedContent` this rule reads
    fn requires(&self) -> &'static [ContentField];

    /// Evaluate the rule on behalf of `phase`, the id findings are stamped
    /// with. Errors are contained by the phase.
    fn validate(
        &self,
        phase: &str,
        content: &EnrichedContent,
        thresholds: &Thresholds,
    ) -> Result<RuleOutcome>;
}

/// Every built-in rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rule {
    // structured-data
    JsonLdPresent,
    JsonLdSyntax,
    SchemaContext,
    SchemaRequiredProperties,
    SchemaIntentMatch,
    // metadata
    TitlePresent,
    TitleLength,
    MetaDescription,
    CanonicalUrl,
    Viewport,
    Indexability,
    // heading-structure
    SingleH1,
    HeadingHierarchy,
    EmptyHeadings,
    SubheadingCoverage,
    // content-quality
    ThinContent,
    ParagraphLength,
    SentenceLength,
    TextToHtmlRatio,
    StructuredFormatting,
    // accessibility
    DocumentLanguage,
    ImageAltText,
    LinkText,
    ImageDimensions,
    // internal-linking
    LinkInventory,
    ExternalReferences,
    GenericAnchorText,
    UnsafeHrefs,
    // calls-to-action
    CtaPresent,
    CtaPlacement,
    CtaWording,
    CtaOverload,
    // topical-relevance
    KeywordPlacement,
    KeywordDensity,
    SecondaryKeywordCoverage,
    EntityCoverage,
    // page-experience
    VitalsFieldData,
    PageWeight,
    RenderBlocking,
    LazyImages,
    // factual-accuracy
    FactVerification,
    SourceCitations,
    FreshnessSignals,
}

type RuleFn = fn(&EnrichedContent, &Thresholds, &mut Recorder<'_>) -> Result<()>;

struct RuleMeta {
    id: &'static str,
    description: &'static str,
    requires: &'static [ContentField],
    run: RuleFn,
}

impl Rule {
    pub const ALL: [Rule; 43] = [
        Rule::JsonLdPresent,
        Rule::JsonLdSyntax,
        Rule::SchemaContext,
        Rule::SchemaRequiredProperties,
        Rule::SchemaIntentMatch,
        Rule::TitlePresent,
        Rule::TitleLength,
        Rule::MetaDescription,
        Rule::CanonicalUrl,
        Rule::Viewport,
        Rule::Indexability,
        Rule::SingleH1,
        Rule::HeadingHierarchy,
        Rule::EmptyHeadings,
        Rule::SubheadingCoverage,
        Rule::ThinContent,
        Rule::ParagraphLength,
        Rule::SentenceLength,
        Rule::TextToHtmlRatio,
        Rule::StructuredFormatting,
        Rule::DocumentLanguage,
        Rule::ImageAltText,
        Rule::LinkText,
        Rule::ImageDimensions,
        Rule::LinkInventory,
        Rule::ExternalReferences,
        Rule::GenericAnchorText,
        Rule::UnsafeHrefs,
        Rule::CtaPresent,
        Rule::CtaPlacement,
        Rule::CtaWording,
        Rule::CtaOverload,
        Rule::KeywordPlacement,
        Rule::KeywordDensity,
        Rule::SecondaryKeywordCoverage,
        Rule::EntityCoverage,
        Rule::VitalsFieldData,
        Rule::PageWeight,
        Rule::RenderBlocking,
        Rule::LazyImages,
        Rule::FactVerification,
        Rule::SourceCitations,
        Rule::FreshnessSignals,
    ];

    /// Look a rule up by id
    pub fn from_id(id: &str) -> Option<Rule> {
        Rule::ALL.iter().copied().find(|r| r.id() == id)
    }

    /// The phase this rule belongs to
    pub fn phase(&self) -> PhaseKind {
        use Rule::*;
        match self {
            JsonLdPresent | JsonLdSyntax | SchemaContext | SchemaRequiredProperties
            | SchemaIntentMatch => PhaseKind::StructuredData,
            TitlePresent | TitleLength | MetaDescription | CanonicalUrl | Viewport
            | Indexability => PhaseKind::Metadata,
            SingleH1 | HeadingHierarchy | EmptyHeadings | SubheadingCoverage => {
                PhaseKind::HeadingStructure
            }
            ThinContent | ParagraphLength | SentenceLength | TextToHtmlRatio
            | StructuredFormatting => PhaseKind::ContentQuality,
            DocumentLanguage | ImageAltText | LinkText | ImageDimensions => {
                PhaseKind::Accessibility
            }
            LinkInventory | ExternalReferences | GenericAnchorText | UnsafeHrefs => {
                PhaseKind::InternalLinking
            }
            CtaPresent | CtaPlacement | CtaWording | CtaOverload => PhaseKind::CallsToAction,
            KeywordPlacement | KeywordDensity | SecondaryKeywordCoverage | EntityCoverage => {
                PhaseKind::TopicalRelevance
            }
            VitalsFieldData | PageWeight | RenderBlocking | LazyImages => {
                PhaseKind::PageExperience
            }
            FactVerification | SourceCitations | FreshnessSignals => PhaseKind::FactualAccuracy,
        }
    }

    fn meta(&self) -> RuleMeta {
        use ContentField as F;
        match self {
            Rule::JsonLdPresent => RuleMeta {
                id: "json-ld-present",
                description: "Page carries at least one JSON-LD structured data block",
                requires: &[F::JsonLd],
                run: structured_data::json_ld_present,
            },
            Rule::JsonLdSyntax => RuleMeta {
                id: "json-ld-syntax",
                description: "Every JSON-LD block is valid JSON",
                requires: &[F::JsonLd],
                run: structured_data::json_ld_syntax,
            },
            Rule::SchemaContext => RuleMeta {
                id: "schema-context",
                description: "JSON-LD declares a schema.org @context and every entity has an @type",
                requires: &[F::JsonLd],
                run: structured_data::schema_context,
            },
            Rule::SchemaRequiredProperties => RuleMeta {
                id: "schema-required-properties",
                description: "Known schema.org types carry their required properties",
                requires: &[F::JsonLd],
                run: structured_data::schema_required_properties,
            },
            Rule::SchemaIntentMatch => RuleMeta {
                id: "schema-intent-match",
                description: "Schema types fit the page's search intent",
                requires: &[F::JsonLd, F::Context],
                run: structured_data::schema_intent_match,
            },
            Rule::TitlePresent => RuleMeta {
                id: "title-present",
                description: "Page has a <title>",
                requires: &[F::Title],
                run: metadata::title_present,
            },
            Rule::TitleLength => RuleMeta {
                id: "title-length",
                description: "Title length fits search result snippets",
                requires: &[F::Title],
                run: metadata::title_length,
            },
            Rule::MetaDescription => RuleMeta {
                id: "meta-description",
                description: "Meta description is present and snippet-sized",
                requires: &[F::MetaDescription],
                run: metadata::meta_description,
            },
            Rule::CanonicalUrl => RuleMeta {
                id: "canonical-url",
                description: "Page declares an absolute canonical URL",
                requires: &[F::Canonical],
                run: metadata::canonical_url,
            },
            Rule::Viewport => RuleMeta {
                id: "viewport",
                description: "Page declares a responsive viewport",
                requires: &[F::Viewport],
                run: metadata::viewport,
            },
            Rule::Indexability => RuleMeta {
                id: "indexability",
                description: "Page is indexable: no noindex directive, successful status",
                requires: &[F::Robots, F::Headers, F::Status],
                run: metadata::indexability,
            },
            Rule::SingleH1 => RuleMeta {
                id: "single-h1",
                description: "Page has exactly one h1",
                requires: &[F::Headings],
                run: headings::single_h1,
            },
            Rule::HeadingHierarchy => RuleMeta {
                id: "heading-hierarchy",
                description: "Heading levels descend without skipping",
                requires: &[F::Headings],
                run: headings::heading_hierarchy,
            },
            Rule::EmptyHeadings => RuleMeta {
                id: "empty-headings",
                description: "Headings carry text",
                requires: &[F::Headings],
                run: headings::empty_headings,
            },
            Rule::SubheadingCoverage => RuleMeta {
                id: "subheading-coverage",
                description: "Long content is broken up by h2 subheadings",
                requires: &[F::Headings, F::WordCount],
                run: headings::subheading_coverage,
            },
            Rule::ThinContent => RuleMeta {
                id: "thin-content",
                description: "Page has enough body copy for its topic",
                requires: &[F::WordCount, F::Context],
                run: content_quality::thin_content,
            },
            Rule::ParagraphLength => RuleMeta {
                id: "paragraph-length",
                description: "Paragraphs stay readable in length",
                requires: &[F::Paragraphs],
                run: content_quality::paragraph_length,
            },
            Rule::SentenceLength => RuleMeta {
                id: "sentence-length",
                description: "Average sentence length stays readable",
                requires: &[F::Text],
                run: content_quality::sentence_length,
            },
            Rule::TextToHtmlRatio => RuleMeta {
                id: "text-to-html-ratio",
                description: "Visible text is a reasonable share of the markup",
                requires: &[F::Text, F::Html],
                run: content_quality::text_to_html_ratio,
            },
            Rule::StructuredFormatting => RuleMeta {
                id: "structured-formatting",
                description: "Long content uses lists or tables",
                requires: &[F::WordCount],
                run: content_quality::structured_formatting,
            },
            Rule::DocumentLanguage => RuleMeta {
                id: "document-language",
                description: "Document declares its language",
                requires: &[F::Lang],
                run: accessibility::document_language,
            },
            Rule::ImageAltText => RuleMeta {
                id: "image-alt-text",
                description: "Informative images have alt text",
                requires: &[F::Images],
                run: accessibility::image_alt_text,
            },
            Rule::LinkText => RuleMeta {
                id: "link-text",
                description: "Links have discernible text",
                requires: &[F::Links],
                run: accessibility::link_text,
            },
            Rule::ImageDimensions => RuleMeta {
                id: "image-dimensions",
                description: "Images declare width and height",
                requires: &[F::Images],
                run: accessibility::image_dimensions,
            },
            Rule::LinkInventory => RuleMeta {
                id: "link-inventory",
                description: "Page links into the rest of the site",
                requires: &[F::Links, F::Url],
                run: linking::link_inventory,
            },
            Rule::ExternalReferences => RuleMeta {
                id: "external-references",
                description: "Page references at least one external source",
                requires: &[F::Links, F::Url],
                run: linking::external_references,
            },
            Rule::GenericAnchorText => RuleMeta {
                id: "generic-anchor-text",
                description: "Anchor text describes the destination",
                requires: &[F::Links],
                run: linking::generic_anchor_text,
            },
            Rule::UnsafeHrefs => RuleMeta {
                id: "unsafe-hrefs",
                description: "Links point somewhere crawlable",
                requires: &[F::Links],
                run: linking::unsafe_hrefs,
            },
            Rule::CtaPresent => RuleMeta {
                id: "cta-present",
                description: "Page offers a call to action",
                requires: &[F::CallsToAction, F::Context],
                run: cta::cta_present,
            },
            Rule::CtaPlacement => RuleMeta {
                id: "cta-placement",
                description: "A call to action appears early in the page",
                requires: &[F::CallsToAction],
                run: cta::cta_placement,
            },
            Rule::CtaWording => RuleMeta {
                id: "cta-wording",
                description: "Calls to action lead with a specific action verb",
                requires: &[F::CallsToAction],
                run: cta::cta_wording,
            },
            Rule::CtaOverload => RuleMeta {
                id: "cta-overload",
                description: "Page does not overwhelm the reader with calls to action",
                requires: &[F::CallsToAction],
                run: cta::cta_overload,
            },
            Rule::KeywordPlacement => RuleMeta {
                id: "keyword-placement",
                description: "Target keyword appears in the key on-page positions",
                requires: &[F::Context, F::Title, F::Headings, F::MetaDescription, F::Text, F::Url],
                run: topical::keyword_placement,
            },
            Rule::KeywordDensity => RuleMeta {
                id: "keyword-density",
                description: "Target keyword density is natural",
                requires: &[F::Context, F::Text, F::WordCount],
                run: topical::keyword_density,
            },
            Rule::SecondaryKeywordCoverage => RuleMeta {
                id: "secondary-keyword-coverage",
                description: "Secondary keywords from the topical map are covered",
                requires: &[F::Context, F::Text],
                run: topical::secondary_keyword_coverage,
            },
            Rule::EntityCoverage => RuleMeta {
                id: "entity-coverage",
                description: "Topical entities are mentioned",
                requires: &[F::Context, F::Text],
                run: topical::entity_coverage,
            },
            Rule::VitalsFieldData => RuleMeta {
                id: "vitals-field-data",
                description: "Core Web Vitals field data meets the good thresholds",
                requires: &[F::Context],
                run: experience::vitals_field_data,
            },
            Rule::PageWeight => RuleMeta {
                id: "page-weight",
                description: "HTML document stays light",
                requires: &[F::Html],
                run: experience::page_weight,
            },
            Rule::RenderBlocking => RuleMeta {
                id: "render-blocking",
                description: "Few render-blocking scripts and stylesheets",
                requires: &[F::Resources],
                run: experience::render_blocking,
            },
            Rule::LazyImages => RuleMeta {
                id: "lazy-images",
                description: "Below-the-fold images load lazily",
                requires: &[F::Images],
                run: experience::lazy_images,
            },
            Rule::FactVerification => RuleMeta {
                id: "fact-verification",
                description: "Claims checked by fact verification hold up",
                requires: &[F::Context],
                run: factual::fact_verification,
            },
            Rule::SourceCitations => RuleMeta {
                id: "source-citations",
                description: "Statistical claims are backed by outbound citations",
                requires: &[F::Text, F::Links],
                run: factual::source_citations,
            },
            Rule::FreshnessSignals => RuleMeta {
                id: "freshness-signals",
                description: "Page exposes when it was published or updated",
                requires: &[F::JsonLd, F::Headers, F::Html],
                run: factual::freshness_signals,
            },
        }
    }
}

impl RuleValidator for Rule {
    fn id(&self) -> &'static str {
        self.meta().id
    }

    fn description(&self) -> &'static str {
        self.meta().description
    }

    fn requires(&self) -> &'static [ContentField] {
        self.meta().requires
    }

    fn validate(
        &self,
        phase: &str,
        content: &EnrichedContent,
        thresholds: &Thresholds,
    ) -> Result<RuleOutcome> {
        let mut recorder = Recorder::new(phase, self.id());
        (self.meta().run)(content, thresholds, &mut recorder)?;
        Ok(recorder.finish())
    }
}

/// Truncate long text for finding element references
pub(crate) fn snippet(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    } else {
        text.to_string()
    }
}
