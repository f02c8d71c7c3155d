//! Page scoring
//!
//! Each phase scores itself from its findings; the overall score is the
//! weighted average of phase scores.
//!
//! # Scoring Formula
//!
//! ```text
//! Phase   = clamp(100 - Σ penalty(finding.severity), 0, 100)
//! Overall = round(Σ phase.score × phase.weight / Σ phase.weight)
//! ```
//!
//! # Finding Penalties (per finding, configurable under `[scoring.penalties]`)
//!
//! - Critical: 40
//! - Internal error: 25
//! - High: 20
//! - Medium: 10
//! - Low: 5
//! - Info: 0
//!
//! # Default Phase Weights
//!
//! Structured data and content quality weigh 1.5, headings and topical
//! relevance 1.25, page experience 0.75, everything else 1.0.
//!
//! # Example
//!
//! A metadata phase with one high and one low finding scores
//! 100 - 20 - 5 = 75. Alongside a structured-data phase at 100
//! (weight 1.5): (75 × 1.0 + 100 × 1.5) / 2.5 = 90.

mod phase_scorer;

pub use phase_scorer::{combine, explain, phase_score, validate_weight};
