//! pageaudit - deterministic single-page SEO and content-quality auditing
//!
//! A fetched page is enriched once into a canonical content shape, run
//! through a fixed registry of weighted audit phases, and combined into a
//! 0-100 score.
//!
//! ```no_run
//! use pageaudit::{AuditConfig, AuditEngine, FetchedContent, TopicalMapContext};
//!
//! let engine = AuditEngine::from_config(&AuditConfig::default())?;
//! let page = FetchedContent::from_html("https://example.com/", "<title>Hi</title>");
//! let report = engine.run_audit(&page, &TopicalMapContext::new("greetings"))?;
//! println!("{} ({})", report.overall_score, report.grade);
//! # Ok::<(), pageaudit::AuditError>(())
//! ```

pub mod cli;
pub mod config;
pub mod content;
pub mod context;
pub mod engine;
pub mod error;
pub mod models;
pub mod phases;
pub mod reporters;
pub mod rules;
pub mod scoring;

pub use config::AuditConfig;
pub use content::{enrich, EnrichedContent, FetchedContent};
pub use context::TopicalMapContext;
pub use engine::{run_audit, AuditEngine, AuditEngineBuilder};
pub use error::{AuditError, AuditResult};
pub use models::{AuditReport, Finding, PhaseResult, Severity};
pub use phases::{default_phases, Phase, PhaseKind};
pub use rules::{Rule, RuleValidator};
