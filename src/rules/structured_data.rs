//! Structured data rules (JSON-LD / schema.org)

use super::{snippet, Issue, Recorder};
use crate::config::Thresholds;
use crate::content::EnrichedContent;
use crate::context::SearchIntent;
use crate::models::Severity;
use anyhow::Result;
use serde_json::Value;

/// Required properties for the schema.org types we know how to judge
const REQUIRED_PROPERTIES: &[(&str, &[&str])] = &[
    ("Article", &["headline", "author", "datePublished"]),
    ("BlogPosting", &["headline", "author", "datePublished"]),
    ("NewsArticle", &["headline", "author", "datePublished"]),
    ("Product", &["name", "offers"]),
    ("FAQPage", &["mainEntity"]),
    ("HowTo", &["step"]),
    ("Organization", &["name", "url"]),
    ("LocalBusiness", &["name", "url"]),
    ("Service", &["name", "provider"]),
    ("BreadcrumbList", &["itemListElement"]),
];

const EDITORIAL_TYPES: &[&str] = &[
    "Article",
    "BlogPosting",
    "NewsArticle",
    "FAQPage",
    "HowTo",
    "WebPage",
];
const COMMERCIAL_TYPES: &[&str] = &["Product", "Offer", "Service", "AggregateOffer", "LocalBusiness"];

/// A parsed JSON-LD document and the entities it declares
struct Document {
    context: Option<Value>,
    entities: Vec<Value>,
}

/// Parse every block that is valid JSON. Arrays and `@graph` are flattened;
/// graph members inherit the document's `@context`.
fn parse_documents(content: &EnrichedContent) -> Vec<Document> {
    let mut documents = Vec::new();
    for block in &content.json_ld {
        let Ok(value) = serde_json::from_str::<Value>(block) else {
            continue;
        };
        let roots = match value {
            Value::Array(items) => items,
            other => vec![other],
        };
        for root in roots {
            let context = root.get("@context").cloned();
            let entities = match root.get("@graph") {
                Some(Value::Array(graph)) => graph.clone(),
                _ => vec![root],
            };
            documents.push(Document { context, entities });
        }
    }
    documents
}

/// `@type` as a list of names; accepts a string or an array of strings
fn types_of(entity: &Value) -> Vec<String> {
    match entity.get("@type") {
        Some(Value::String(t)) => vec![t.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn mentions_schema_org(context: &Value) -> bool {
    match context {
        Value::String(s) => s.contains("schema.org"),
        Value::Array(items) => items.iter().any(mentions_schema_org),
        Value::Object(map) => map
            .get("@vocab")
            .is_some_and(mentions_schema_org),
        _ => false,
    }
}

fn is_filled(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(_) => true,
    }
}

pub(super) fn json_ld_present(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    rec.check("json-ld block present", !content.json_ld.is_empty(), || {
        Issue::new(Severity::High, "No JSON-LD structured data found on the page")
            .at("head")
            .fix("Add a <script type=\"application/ld+json\"> block describing the page with schema.org types")
    });
    Ok(())
}

pub(super) fn json_ld_syntax(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    for (i, block) in content.json_ld.iter().enumerate() {
        let parsed = serde_json::from_str::<Value>(block);
        let error = parsed.as_ref().err().map(|e| e.to_string());
        rec.check(format!("block {} parses", i + 1), parsed.is_ok(), || {
            Issue::new(
                Severity::High,
                format!(
                    "JSON-LD block {} is not valid JSON: {}",
                    i + 1,
                    error.unwrap_or_default()
                ),
            )
            .at(format!("script[type=\"application/ld+json\"] #{}", i + 1))
            .fix("Validate the block with a JSON linter; search engines ignore unparsable structured data")
        });
    }
    Ok(())
}

pub(super) fn schema_context(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    for (i, doc) in parse_documents(content).iter().enumerate() {
        let has_context = doc.context.as_ref().is_some_and(mentions_schema_org);
        rec.check(format!("document {} @context", i + 1), has_context, || {
            Issue::new(
                Severity::Medium,
                "JSON-LD document does not declare a schema.org @context",
            )
            .at(format!("json-ld document #{}", i + 1))
            .fix("Set \"@context\": \"https://schema.org\"")
        });
        for (j, entity) in doc.entities.iter().enumerate() {
            rec.check(
                format!("document {} entity {} @type", i + 1, j + 1),
                !types_of(entity).is_empty(),
                || {
                    Issue::new(Severity::Medium, "JSON-LD entity has no @type")
                        .at(format!("json-ld document #{} entity #{}", i + 1, j + 1))
                        .fix("Give every entity an explicit schema.org @type")
                },
            );
        }
    }
    Ok(())
}

pub(super) fn schema_required_properties(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    for doc in parse_documents(content) {
        for entity in &doc.entities {
            for kind in types_of(entity) {
                let Some((_, required)) = REQUIRED_PROPERTIES.iter().find(|(t, _)| *t == kind)
                else {
                    continue;
                };
                for property in *required {
                    rec.check(
                        format!("{} has {}", kind, property),
                        is_filled(entity.get(*property)),
                        || {
                            Issue::new(
                                Severity::Medium,
                                format!("{} schema is missing required property '{}'", kind, property),
                            )
                            .at(format!("json-ld {}", kind))
                            .fix(format!("Add \"{}\" to the {} entity", property, kind))
                        },
                    );
                }
            }
        }
    }
    Ok(())
}

pub(super) fn schema_intent_match(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    let Some(intent) = content.context.search_intent else {
        return Ok(());
    };
    let types: Vec<String> = parse_documents(content)
        .iter()
        .flat_map(|d| d.entities.iter().flat_map(types_of))
        .collect();
    if types.is_empty() {
        return Ok(());
    }

    let expected: &[&str] = match intent {
        SearchIntent::Commercial | SearchIntent::Transactional => COMMERCIAL_TYPES,
        SearchIntent::Informational => EDITORIAL_TYPES,
        // navigational pages are judged on their own name, not type
        SearchIntent::Navigational => return Ok(()),
    };
    let matched = types.iter().any(|t| expected.contains(&t.as_str()));
    rec.check("schema type fits intent", matched, || {
        Issue::new(
            Severity::Low,
            format!(
                "Schema types [{}] do not fit {:?} search intent",
                snippet(&types.join(", "), 60),
                intent
            ),
        )
        .fix(format!("Describe the page with one of: {}", expected.join(", ")))
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::{page, run};
    use super::super::Rule;
    use crate::context::{SearchIntent, TopicalMapContext};

    fn with_ld(blocks: &[&str]) -> String {
        let scripts: String = blocks
            .iter()
            .map(|b| format!("<script type=\"application/ld+json\">{}</script>", b))
            .collect();
        format!("<html><head>{}</head><body><p>x</p></body></html>", scripts)
    }

    #[test]
    fn test_missing_json_ld() {
        let content = page("<html><body><p>x</p></body></html>", TopicalMapContext::default());
        let outcome = run(Rule::JsonLdPresent, &content);
        assert_eq!(outcome.check_count(), 1);
        assert_eq!(outcome.findings.len(), 1);

        // nothing to parse, nothing to check
        assert!(run(Rule::JsonLdSyntax, &content).not_applicable);
        assert!(run(Rule::SchemaContext, &content).not_applicable);
    }

    #[test]
    fn test_invalid_block_is_flagged() {
        let content = page(
            &with_ld(&[r#"{"@context":"https://schema.org","@type":"Article"}"#, "{oops"]),
            TopicalMapContext::default(),
        );
        let outcome = run(Rule::JsonLdSyntax, &content);
        assert_eq!(outcome.check_count(), 2);
        assert_eq!(outcome.findings.len(), 1);
        assert!(outcome.findings[0].message.contains("block 2"));
    }

    #[test]
    fn test_graph_members_inherit_context() {
        let content = page(
            &with_ld(&[r#"{"@context":"https://schema.org","@graph":[{"@type":"WebPage"},{"name":"untyped"}]}"#]),
            TopicalMapContext::default(),
        );
        let outcome = run(Rule::SchemaContext, &content);
        // one context check + two entity type checks
        assert_eq!(outcome.check_count(), 3);
        assert_eq!(outcome.findings.len(), 1);
        assert!(outcome.findings[0].message.contains("no @type"));
    }

    #[test]
    fn test_required_properties_per_type() {
        let content = page(
            &with_ld(&[r#"{"@context":"https://schema.org","@type":"Article","headline":"H","author":{"name":"A"}}"#]),
            TopicalMapContext::default(),
        );
        let outcome = run(Rule::SchemaRequiredProperties, &content);
        assert_eq!(outcome.check_count(), 3);
        assert_eq!(outcome.findings.len(), 1);
        assert!(outcome.findings[0].message.contains("datePublished"));
    }

    #[test]
    fn test_intent_mismatch() {
        let ctx = TopicalMapContext::new("beans").with_search_intent(SearchIntent::Transactional);
        let content = page(
            &with_ld(&[r#"{"@context":"https://schema.org","@type":"BlogPosting"}"#]),
            ctx,
        );
        let outcome = run(Rule::SchemaIntentMatch, &content);
        assert_eq!(outcome.check_count(), 1);
        assert_eq!(outcome.findings.len(), 1);
    }

    #[test]
    fn test_intent_without_context_not_applicable() {
        let content = page(
            &with_ld(&[r#"{"@context":"https://schema.org","@type":"BlogPosting"}"#]),
            TopicalMapContext::default(),
        );
        assert!(run(Rule::SchemaIntentMatch, &content).not_applicable);
    }
}
