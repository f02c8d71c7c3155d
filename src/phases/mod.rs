//! Audit phases
//!
//! A phase is a weighted group of rule validators covering one audit
//! dimension. The built-in set is closed and statically enumerable through
//! [`PhaseKind::ALL`]; [`Phase`] is generic over its validators so that
//! any [`RuleValidator`] can be run and scored the same way.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                       Phase::run                        │
//! ├─────────────────────────────────────────────────────────┤
//! │  1. Run each validator in declaration order             │
//! │  2. Contain errors and panics as internal-error         │
//! │  3. Apply configured severity overrides                 │
//! │  4. Refuse zero checks (phase contract)                 │
//! │  5. Score findings                                      │
//! └─────────────────────────────────────────────────────────┘
//! ```

use crate::config::{AuditConfig, SeverityPenalties, Thresholds};
use crate::content::EnrichedContent;
use crate::error::{AuditError, AuditResult};
use crate::models::{CheckRecord, Diagnostic, Finding, PhaseResult, Severity};
use crate::rules::{Rule, RuleOutcome, RuleValidator};
use crate::scoring;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Every built-in phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PhaseKind {
    StructuredData,
    Metadata,
    HeadingStructure,
    ContentQuality,
    Accessibility,
    InternalLinking,
    CallsToAction,
    TopicalRelevance,
    PageExperience,
    FactualAccuracy,
}

impl PhaseKind {
    /// Registration order of the default audit
    pub const ALL: [PhaseKind; 10] = [
        PhaseKind::StructuredData,
        PhaseKind::Metadata,
        PhaseKind::HeadingStructure,
        PhaseKind::ContentQuality,
        PhaseKind::Accessibility,
        PhaseKind::InternalLinking,
        PhaseKind::CallsToAction,
        PhaseKind::TopicalRelevance,
        PhaseKind::PageExperience,
        PhaseKind::FactualAccuracy,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            PhaseKind::StructuredData => "structured-data",
            PhaseKind::Metadata => "metadata",
            PhaseKind::HeadingStructure => "heading-structure",
            PhaseKind::ContentQuality => "content-quality",
            PhaseKind::Accessibility => "accessibility",
            PhaseKind::InternalLinking => "internal-linking",
            PhaseKind::CallsToAction => "calls-to-action",
            PhaseKind::TopicalRelevance => "topical-relevance",
            PhaseKind::PageExperience => "page-experience",
            PhaseKind::FactualAccuracy => "factual-accuracy",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PhaseKind::StructuredData => "Structured Data",
            PhaseKind::Metadata => "Metadata",
            PhaseKind::HeadingStructure => "Heading Structure",
            PhaseKind::ContentQuality => "Content Quality",
            PhaseKind::Accessibility => "Accessibility",
            PhaseKind::InternalLinking => "Internal Linking",
            PhaseKind::CallsToAction => "Calls to Action",
            PhaseKind::TopicalRelevance => "Topical Relevance",
            PhaseKind::PageExperience => "Page Experience",
            PhaseKind::FactualAccuracy => "Factual Accuracy",
        }
    }

    pub fn default_weight(&self) -> f64 {
        match self {
            PhaseKind::StructuredData | PhaseKind::ContentQuality => 1.5,
            PhaseKind::HeadingStructure | PhaseKind::TopicalRelevance => 1.25,
            PhaseKind::PageExperience => 0.75,
            _ => 1.0,
        }
    }

    /// Rules in declaration order
    pub fn rules(&self) -> &'static [Rule] {
        use Rule::*;
        match self {
            PhaseKind::StructuredData => &[
                JsonLdPresent,
                JsonLdSyntax,
                SchemaContext,
                SchemaRequiredProperties,
                SchemaIntentMatch,
            ],
            PhaseKind::Metadata => &[
                TitlePresent,
                TitleLength,
                MetaDescription,
                CanonicalUrl,
                Viewport,
                Indexability,
            ],
            PhaseKind::HeadingStructure => {
                &[SingleH1, HeadingHierarchy, EmptyHeadings, SubheadingCoverage]
            }
            PhaseKind::ContentQuality => &[
                ThinContent,
                ParagraphLength,
                SentenceLength,
                TextToHtmlRatio,
                StructuredFormatting,
            ],
            PhaseKind::Accessibility => {
                &[DocumentLanguage, ImageAltText, LinkText, ImageDimensions]
            }
            PhaseKind::InternalLinking => &[
                LinkInventory,
                ExternalReferences,
                GenericAnchorText,
                UnsafeHrefs,
            ],
            PhaseKind::CallsToAction => &[CtaPresent, CtaPlacement, CtaWording, CtaOverload],
            PhaseKind::TopicalRelevance => &[
                KeywordPlacement,
                KeywordDensity,
                SecondaryKeywordCoverage,
                EntityCoverage,
            ],
            PhaseKind::PageExperience => &[VitalsFieldData, PageWeight, RenderBlocking, LazyImages],
            PhaseKind::FactualAccuracy => &[FactVerification, SourceCitations, FreshnessSignals],
        }
    }

    pub fn from_id(id: &str) -> Option<PhaseKind> {
        PhaseKind::ALL.iter().copied().find(|p| p.id() == id)
    }
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Output of one phase run: the scored result plus anything worth
/// reporting as a diagnostic
#[derive(Debug, Clone)]
pub struct PhaseRun {
    pub result: PhaseResult,
    pub diagnostics: Vec<Diagnostic>,
}

/// A weighted group of validators
#[derive(Debug)]
pub struct Phase<R: RuleValidator = Rule> {
    id: String,
    name: String,
    weight: f64,
    penalties: SeverityPenalties,
    validators: Vec<R>,
    severity_overrides: BTreeMap<String, Severity>,
}

impl<R: RuleValidator> Phase<R> {
    /// Create a phase with default penalties
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        weight: f64,
        validators: Vec<R>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            weight,
            penalties: SeverityPenalties::default(),
            validators,
            severity_overrides: BTreeMap::new(),
        }
    }

    pub fn with_penalties(mut self, penalties: SeverityPenalties) -> Self {
        self.penalties = penalties;
        self
    }

    /// Report every finding of `rule` at `severity` instead of its own
    pub fn with_severity_override(mut self, rule: impl Into<String>, severity: Severity) -> Self {
        self.severity_overrides.insert(rule.into(), severity);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn validators(&self) -> &[R] {
        &self.validators
    }

    /// Check weight and penalties before any content is processed
    pub fn validate_config(&self) -> AuditResult<()> {
        scoring::validate_weight(&self.id, self.weight)?;
        self.penalties.validate().map_err(|e| match e {
            AuditError::ScoringConfiguration(msg) => {
                AuditError::ScoringConfiguration(format!("phase '{}': {}", self.id, msg))
            }
            other => other,
        })
    }

    /// Run every validator against the content and score the result.
    ///
    /// Fails with [`AuditError::PhaseContractViolation`] when no check at
    /// all was evaluated.
    pub fn run(&self, content: &EnrichedContent, thresholds: &Thresholds) -> AuditResult<PhaseRun> {
        let start = Instant::now();
        let mut checks: Vec<CheckRecord> = Vec::new();
        let mut findings: Vec<Finding> = Vec::new();
        let mut not_applicable: Vec<String> = Vec::new();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();

        for validator in &self.validators {
            let rule_id = validator.id();
            match self.run_single_validator(validator, content, thresholds) {
                Ok(outcome) => {
                    if outcome.not_applicable {
                        let empty: Vec<_> = validator
                            .requires()
                            .iter()
                            .filter(|f| content.field_len(**f) == 0)
                            .collect();
                        debug!(
                            "Rule {} in phase {} not applicable (empty fields: {:?})",
                            rule_id, self.id, empty
                        );
                        not_applicable.push(rule_id.to_string());
                    }
                    checks.extend(outcome.checks);
                    findings.extend(outcome.findings.into_iter().map(|f| self.apply_override(f)));
                }
                Err(message) => {
                    warn!("Rule {} in phase {} failed: {}", rule_id, self.id, message);
                    checks.push(CheckRecord {
                        rule: rule_id.to_string(),
                        check: "rule evaluated".to_string(),
                        passed: false,
                    });
                    findings.push(
                        Finding::new(
                            &self.id,
                            rule_id,
                            Severity::InternalError,
                            format!("Rule '{}' failed to evaluate: {}", rule_id, message),
                            None,
                        )
                        .with_fix("This is a defect in the rule, not in the page"),
                    );
                    diagnostics.push(Diagnostic::internal_error(&self.id, rule_id, message));
                }
            }
        }

        if checks.is_empty() {
            error!(
                "Phase {} evaluated zero checks across {} rules",
                self.id,
                self.validators.len()
            );
            return Err(AuditError::contract(
                &self.id,
                format!(
                    "evaluated zero checks ({} rules registered, {} not applicable)",
                    self.validators.len(),
                    not_applicable.len()
                ),
            ));
        }

        let score = scoring::phase_score(&findings, &self.penalties);
        let passed = checks.iter().filter(|c| c.passed).count();

        debug!(
            "Phase {} scored {} with {}/{} checks passed, {} findings in {:?}",
            self.id,
            score,
            passed,
            checks.len(),
            findings.len(),
            start.elapsed()
        );

        Ok(PhaseRun {
            result: PhaseResult {
                phase: self.id.clone(),
                name: self.name.clone(),
                weight: self.weight,
                score,
                total_checks: checks.len(),
                passed_checks: passed,
                failed_checks: checks.len() - passed,
                checks,
                findings,
                rules_not_applicable: not_applicable,
            },
            diagnostics,
        })
    }

    /// Run one validator, turning errors and panics into a message
    fn run_single_validator(
        &self,
        validator: &R,
        content: &EnrichedContent,
        thresholds: &Thresholds,
    ) -> Result<RuleOutcome, String> {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            validator.validate(&self.id, content, thresholds)
        }));

        match result {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(e)) => Err(format!("{:#}", e)),
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                Err(format!("panic: {}", panic_msg))
            }
        }
    }

    fn apply_override(&self, mut finding: Finding) -> Finding {
        if let Some(severity) = self.severity_overrides.get(&finding.rule) {
            finding.severity = *severity;
        }
        finding
    }
}

impl Phase<Rule> {
    /// A built-in phase with its default weight and every rule
    pub fn builtin(kind: PhaseKind) -> Self {
        Phase::new(kind.id(), kind.name(), kind.default_weight(), kind.rules().to_vec())
    }

    /// A built-in phase shaped by configuration: weight, disabled rules,
    /// severity overrides and penalties
    pub fn from_config(kind: PhaseKind, config: &AuditConfig) -> Self {
        let rules: Vec<Rule> = kind
            .rules()
            .iter()
            .copied()
            .filter(|r| {
                let enabled = config.is_rule_enabled(kind.id(), r.id());
                if !enabled {
                    debug!("Rule {} disabled by config", r.id());
                }
                enabled
            })
            .collect();

        let mut phase = Phase::new(
            kind.id(),
            kind.name(),
            config.phase_weight(kind.id()).unwrap_or(kind.default_weight()),
            rules,
        )
        .with_penalties(config.scoring.penalties.clone());

        for rule in kind.rules() {
            if let Some(severity) = config.severity_override(rule.id()) {
                phase = phase.with_severity_override(rule.id(), severity);
            }
        }
        phase
    }
}

/// The default phase registry: every enabled built-in phase, in order
pub fn default_phases(config: &AuditConfig) -> Vec<Phase> {
    PhaseKind::ALL
        .iter()
        .filter(|kind| {
            let enabled = config.is_phase_enabled(kind.id());
            if !enabled {
                debug!("Phase {} disabled by config", kind.id());
            }
            enabled
        })
        .map(|kind| Phase::from_config(*kind, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{enrich, ContentField, FetchedContent};
    use crate::context::TopicalMapContext;
    use crate::rules::{Issue, Recorder};
    use anyhow::{bail, Result};
    use std::collections::HashSet;

    /// Validator with scripted behavior
    enum Mock {
        Checks { id: &'static str, passed: usize, failed: usize },
        Errors(&'static str),
        Panics(&'static str),
        NothingToCheck(&'static str),
    }

    impl RuleValidator for Mock {
        fn id(&self) -> &'static str {
            match self {
                Mock::Checks { id, .. } => *id,
                Mock::Errors(id) | Mock::Panics(id) | Mock::NothingToCheck(id) => *id,
            }
        }

        fn description(&self) -> &'static str {
            "mock"
        }

        fn requires(&self) -> &'static [ContentField] {
            &[ContentField::Text]
        }

        fn validate(
            &self,
            phase: &str,
            _content: &EnrichedContent,
            _t: &Thresholds,
        ) -> Result<RuleOutcome> {
            match self {
                Mock::Checks { id, passed, failed } => {
                    let mut rec = Recorder::new(phase, *id);
                    for i in 0..*passed {
                        rec.check(format!("pass {}", i), true, || unreachable!());
                    }
                    for i in 0..*failed {
                        rec.check(format!("fail {}", i), false, || {
                            Issue::new(Severity::Medium, format!("failure {}", i))
                        });
                    }
                    Ok(rec.finish())
                }
                Mock::Errors(_) => bail!("selector exploded"),
                Mock::Panics(_) => panic!("index out of bounds"),
                Mock::NothingToCheck(id) => Ok(Recorder::new(phase, *id).finish()),
            }
        }
    }

    fn content() -> EnrichedContent {
        enrich(
            &FetchedContent::from_html("https://example.com", "<p>Hello world.</p>"),
            &TopicalMapContext::default(),
        )
    }

    #[test]
    fn test_checks_and_findings_aggregate_in_order() {
        let phase = Phase::new(
            "mock-phase",
            "Mock",
            1.0,
            vec![
                Mock::Checks { id: "a", passed: 4, failed: 1 },
                Mock::Checks { id: "b", passed: 0, failed: 2 },
            ],
        );
        let run = phase.run(&content(), &Thresholds::default()).expect("phase runs");
        let result = run.result;
        assert_eq!(result.total_checks, 7);
        assert_eq!(result.passed_checks, 4);
        assert_eq!(result.failed_checks, 3);
        let rules: Vec<&str> = result.findings.iter().map(|f| f.rule.as_str()).collect();
        assert_eq!(rules, vec!["a", "b", "b"]);
        assert_eq!(result.score, 70);
        assert!(run.diagnostics.is_empty());
    }

    #[test]
    fn test_error_becomes_internal_error_finding() {
        let phase = Phase::new("mock-phase", "Mock", 1.0, vec![Mock::Errors("broken")]);
        let run = phase.run(&content(), &Thresholds::default()).expect("errors are contained");
        assert_eq!(run.result.total_checks, 1);
        assert_eq!(run.result.findings.len(), 1);
        assert_eq!(run.result.findings[0].severity, Severity::InternalError);
        assert!(run.result.findings[0].message.contains("selector exploded"));
        assert_eq!(run.result.score, 75);
        assert_eq!(run.diagnostics.len(), 1);
        assert_eq!(run.diagnostics[0].rule.as_deref(), Some("broken"));
    }

    #[test]
    fn test_panic_is_contained() {
        let phase = Phase::new(
            "mock-phase",
            "Mock",
            1.0,
            vec![Mock::Panics("crashy"), Mock::Checks { id: "ok", passed: 2, failed: 0 }],
        );
        let run = phase.run(&content(), &Thresholds::default()).expect("panics are contained");
        assert_eq!(run.result.total_checks, 3);
        assert!(run.result.findings[0].message.contains("index out of bounds"));
    }

    #[test]
    fn test_zero_checks_is_contract_violation() {
        let phase = Phase::new("mock-phase", "Mock", 1.0, vec![Mock::NothingToCheck("idle")]);
        match phase.run(&content(), &Thresholds::default()) {
            Err(AuditError::PhaseContractViolation { phase, reason }) => {
                assert_eq!(phase, "mock-phase");
                assert!(reason.contains("zero checks"));
            }
            other => panic!("expected contract violation, got {:?}", other.map(|r| r.result)),
        }
    }

    #[test]
    fn test_not_applicable_rules_are_listed() {
        let phase = Phase::new(
            "mock-phase",
            "Mock",
            1.0,
            vec![Mock::NothingToCheck("idle"), Mock::Checks { id: "a", passed: 1, failed: 0 }],
        );
        let run = phase.run(&content(), &Thresholds::default()).expect("phase runs");
        assert_eq!(run.result.rules_not_applicable, vec!["idle".to_string()]);
    }

    #[test]
    fn test_severity_override() {
        let phase = Phase::new(
            "mock-phase",
            "Mock",
            1.0,
            vec![Mock::Checks { id: "a", passed: 0, failed: 1 }],
        )
        .with_severity_override("a", Severity::Critical);
        let run = phase.run(&content(), &Thresholds::default()).expect("phase runs");
        assert_eq!(run.result.findings[0].severity, Severity::Critical);
        assert_eq!(run.result.score, 60);
    }

    #[test]
    fn test_findings_carry_the_running_phase_id() {
        let phase = Phase::new(
            "seo-basics",
            "SEO basics",
            1.0,
            vec![Rule::TitlePresent, Rule::DocumentLanguage],
        );
        let empty = enrich(&FetchedContent::default(), &TopicalMapContext::default());
        let result = phase.run(&empty, &Thresholds::default()).expect("phase runs").result;
        assert_eq!(result.findings.len(), 2);
        for finding in &result.findings {
            assert_eq!(finding.phase, result.phase);
            let expected = crate::models::deterministic_finding_id(
                "seo-basics",
                &finding.rule,
                finding.element.as_deref().unwrap_or(""),
                &finding.message,
            );
            assert_eq!(finding.id, expected);
        }
    }

    #[test]
    fn test_validate_config() {
        let zero: Phase<Mock> = Phase::new("z", "Zero", 0.0, Vec::new());
        assert!(matches!(
            zero.validate_config(),
            Err(AuditError::ScoringConfiguration(_))
        ));

        let negative_penalty: Phase<Mock> = Phase::new("n", "Neg", 1.0, Vec::new())
            .with_penalties(SeverityPenalties {
                medium: -1.0,
                ..Default::default()
            });
        assert!(negative_penalty.validate_config().is_err());
    }

    #[test]
    fn test_rule_phase_mapping_is_consistent() {
        let mut seen = HashSet::new();
        for kind in PhaseKind::ALL {
            for rule in kind.rules() {
                assert_eq!(rule.phase(), kind, "{} listed under {}", rule.id(), kind);
                assert!(seen.insert(*rule), "{} listed twice", rule.id());
            }
        }
        assert_eq!(seen.len(), Rule::ALL.len());
    }

    #[test]
    fn test_phase_ids_round_trip() {
        for kind in PhaseKind::ALL {
            assert_eq!(PhaseKind::from_id(kind.id()), Some(kind));
            assert!(kind.default_weight() > 0.0);
        }
    }

    #[test]
    fn test_every_builtin_phase_checks_empty_content() {
        let empty = enrich(&FetchedContent::default(), &TopicalMapContext::default());
        for kind in PhaseKind::ALL {
            let run = Phase::builtin(kind)
                .run(&empty, &Thresholds::default())
                .expect("built-in phases always evaluate something");
            assert!(run.result.total_checks > 0, "{}", kind);
        }
    }

    #[test]
    fn test_from_config() {
        let config: AuditConfig = toml::from_str(
            r#"
[phases.metadata]
weight = 2.5
disabled_rules = ["viewport", "canonical-url"]

[rules.title-present]
severity = "critical"
"#,
        )
        .expect("parse config");
        let phase = Phase::from_config(PhaseKind::Metadata, &config);
        assert!((phase.weight() - 2.5).abs() < f64::EPSILON);
        assert_eq!(phase.validators().len(), 4);

        let empty = enrich(&FetchedContent::default(), &TopicalMapContext::default());
        let run = phase.run(&empty, &Thresholds::default()).expect("phase runs");
        let title = run
            .result
            .findings
            .iter()
            .find(|f| f.rule == "title-present")
            .expect("title finding");
        assert_eq!(title.severity, Severity::Critical);
    }

    #[test]
    fn test_default_phases_respects_enabled() {
        let config: AuditConfig =
            toml::from_str("[phases.page-experience]\nenabled = false").expect("parse config");
        let phases = default_phases(&config);
        assert_eq!(phases.len(), 9);
        assert!(phases.iter().all(|p| p.id() != "page-experience"));
        assert_eq!(default_phases(&AuditConfig::default()).len(), 10);
    }
}
