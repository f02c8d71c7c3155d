//! Audit orchestration with parallel phase execution
//!
//! The AuditEngine runs one audit end to end:
//! - Enriches the fetched content exactly once
//! - Fans the phases out over a rayon pool, all reading the same content
//! - Joins the results in registration order
//! - Combines phase scores into the overall score
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      AuditEngine                        │
//! ├─────────────────────────────────────────────────────────┤
//! │  0. Validate registry (at construction)                 │
//! │  1. Enrich content                                      │
//! │  2. Run phases in parallel (rayon)                      │
//! │  3. Collect in registration order, abort on violation   │
//! │  4. Combine scores and stamp duration                   │
//! └─────────────────────────────────────────────────────────┘
//! ```

use crate::config::{AuditConfig, Thresholds};
use crate::content::{enrich, FetchedContent};
use crate::context::TopicalMapContext;
use crate::error::{AuditError, AuditResult};
use crate::models::{AuditReport, FindingsSummary};
use crate::phases::{default_phases, Phase, PhaseRun};
use crate::rules::{Rule, RuleValidator};
use crate::scoring;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Upper bound for auto-detected worker threads
const MAX_AUTO_WORKERS: usize = 16;

/// Runs a fixed, validated set of phases against fetched pages
#[derive(Debug)]
pub struct AuditEngine<R: RuleValidator = Rule> {
    /// Registered phases, in report order
    phases: Vec<Phase<R>>,
    thresholds: Thresholds,
    /// Number of worker threads for phase fan-out
    workers: usize,
    /// Built once per worker count; `None` runs phases sequentially
    pool: Option<rayon::ThreadPool>,
}

fn resolve_workers(workers: usize) -> usize {
    if workers == 0 {
        std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(4)
            .min(MAX_AUTO_WORKERS)
    } else {
        workers
    }
}

fn build_pool(workers: usize) -> Option<rayon::ThreadPool> {
    match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => Some(pool),
        Err(e) => {
            warn!("Failed to build worker pool, running phases sequentially: {}", e);
            None
        }
    }
}

impl<R: RuleValidator> AuditEngine<R> {
    /// Create an engine over an ordered phase registry.
    ///
    /// Fails with [`AuditError::ScoringConfiguration`] when the registry is
    /// empty, a phase id repeats, or any weight or penalty is invalid.
    pub fn new(phases: Vec<Phase<R>>) -> AuditResult<Self> {
        Self::assemble(phases, 0)
    }

    fn assemble(phases: Vec<Phase<R>>, workers: usize) -> AuditResult<Self> {
        if phases.is_empty() {
            return Err(AuditError::ScoringConfiguration(
                "no phases registered; at least one phase is required".to_string(),
            ));
        }

        let mut seen = FxHashSet::default();
        for phase in &phases {
            if !seen.insert(phase.id()) {
                return Err(AuditError::ScoringConfiguration(format!(
                    "phase '{}' is registered more than once",
                    phase.id()
                )));
            }
            phase.validate_config()?;
        }

        debug!(
            "Audit engine ready with {} phases: {}",
            phases.len(),
            phases.iter().map(|p| p.id()).collect::<Vec<_>>().join(", ")
        );

        let workers = resolve_workers(workers);
        Ok(Self {
            phases,
            thresholds: Thresholds::default(),
            workers,
            pool: build_pool(workers),
        })
    }

    /// Set worker threads (0 = auto-detect)
    pub fn with_workers(mut self, workers: usize) -> Self {
        let workers = resolve_workers(workers);
        if workers != self.workers || self.pool.is_none() {
            self.workers = workers;
            self.pool = build_pool(workers);
        }
        self
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    pub fn phase_ids(&self) -> Vec<&str> {
        self.phases.iter().map(|p| p.id()).collect()
    }

    pub fn phases(&self) -> &[Phase<R>] {
        &self.phases
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Audit one page.
    ///
    /// Returns a report with exactly one result per registered phase, or
    /// the first contract violation in registration order.
    pub fn run_audit(
        &self,
        fetched: &FetchedContent,
        context: &TopicalMapContext,
    ) -> AuditResult<AuditReport> {
        let start = Instant::now();
        let content = enrich(fetched, context);

        info!(
            "Auditing {} with {} phases on {} workers",
            if content.url.is_empty() { "<no url>" } else { content.url.as_str() },
            self.phases.len(),
            self.workers
        );

        let runs: Vec<AuditResult<PhaseRun>> = match &self.pool {
            Some(pool) => pool.install(|| {
                self.phases
                    .par_iter()
                    .map(|phase| phase.run(&content, &self.thresholds))
                    .collect()
            }),
            None => self
                .phases
                .iter()
                .map(|phase| phase.run(&content, &self.thresholds))
                .collect(),
        };

        let mut phase_results = Vec::with_capacity(runs.len());
        let mut diagnostics = content.degradations.clone();
        for run in runs {
            let run = run?;
            diagnostics.extend(run.diagnostics);
            phase_results.push(run.result);
        }

        let overall_score = scoring::combine(&phase_results);
        let findings_summary =
            FindingsSummary::from_findings(phase_results.iter().flat_map(|p| p.findings.iter()));
        let duration = start.elapsed();
        let audit_duration_ms = u64::try_from(duration.as_millis())
            .unwrap_or(u64::MAX)
            .max(1);

        info!(
            "Audit complete: score {} from {} phases, {} findings, {} diagnostics in {:?}",
            overall_score,
            phase_results.len(),
            findings_summary.total,
            diagnostics.len(),
            duration
        );

        Ok(AuditReport {
            url: content.url.clone(),
            topic: context.topic.clone(),
            overall_score,
            grade: AuditReport::grade_from_score(overall_score),
            phase_results,
            findings_summary,
            diagnostics,
            audit_duration_ms,
        })
    }
}

impl AuditEngine<Rule> {
    /// Engine over the built-in phases shaped by configuration
    pub fn from_config(config: &AuditConfig) -> AuditResult<Self> {
        Ok(AuditEngine::new(default_phases(config))?.with_thresholds(config.thresholds.clone()))
    }
}

/// Builder for AuditEngine with fluent API
pub struct AuditEngineBuilder<R: RuleValidator = Rule> {
    workers: usize,
    thresholds: Thresholds,
    phases: Vec<Phase<R>>,
}

impl<R: RuleValidator> AuditEngineBuilder<R> {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            workers: 0,
            thresholds: Thresholds::default(),
            phases: Vec::new(),
        }
    }

    /// Set number of worker threads
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Add a phase
    pub fn phase(mut self, phase: Phase<R>) -> Self {
        self.phases.push(phase);
        self
    }

    /// Add multiple phases
    pub fn phases(mut self, phases: impl IntoIterator<Item = Phase<R>>) -> Self {
        self.phases.extend(phases);
        self
    }

    /// Validate the registry and build the engine
    pub fn build(self) -> AuditResult<AuditEngine<R>> {
        Ok(AuditEngine::assemble(self.phases, self.workers)?.with_thresholds(self.thresholds))
    }
}

impl<R: RuleValidator> Default for AuditEngineBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Audit one page against an explicit phase registry
pub fn run_audit<R: RuleValidator>(
    fetched: &FetchedContent,
    context: &TopicalMapContext,
    phases: Vec<Phase<R>>,
) -> AuditResult<AuditReport> {
    AuditEngine::new(phases)?.run_audit(fetched, context)
}
