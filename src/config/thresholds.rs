//! Rule thresholds
//!
//! Every numeric limit a rule compares against. All fields have defaults so
//! a `[thresholds]` table only needs the values it changes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    // metadata
    pub title_min_chars: usize,
    pub title_max_chars: usize,
    pub description_min_chars: usize,
    pub description_max_chars: usize,

    // heading-structure
    /// Copy longer than this needs h2 subheadings
    pub subheading_min_words: usize,
    pub words_per_h2: usize,

    // content-quality
    pub min_words: usize,
    /// Fraction of the competitor word count the page should reach
    pub competitor_ratio: f64,
    pub max_paragraph_words: usize,
    pub max_avg_sentence_words: f64,
    /// Visible text bytes over markup bytes
    pub min_text_ratio: f64,
    /// Copy longer than this should use lists or tables
    pub formatting_min_words: usize,

    // internal-linking
    pub min_internal_links: usize,
    pub min_external_links: usize,

    // calls-to-action
    /// Latest acceptable position of the first CTA, as a fraction of the page
    pub cta_max_position: f64,
    pub max_ctas: usize,

    // topical-relevance
    pub keyword_intro_words: usize,
    /// Percent of words
    pub min_keyword_density: f64,
    pub max_keyword_density: f64,
    pub min_secondary_coverage: f64,

    // page-experience
    pub lcp_ms: f64,
    pub inp_ms: f64,
    pub cls: f64,
    pub max_html_kb: usize,
    pub max_blocking_scripts: usize,
    pub max_stylesheets: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            title_min_chars: 30,
            title_max_chars: 60,
            description_min_chars: 70,
            description_max_chars: 160,
            subheading_min_words: 300,
            words_per_h2: 400,
            min_words: 300,
            competitor_ratio: 0.7,
            max_paragraph_words: 150,
            max_avg_sentence_words: 25.0,
            min_text_ratio: 0.10,
            formatting_min_words: 600,
            min_internal_links: 3,
            min_external_links: 1,
            cta_max_position: 0.5,
            max_ctas: 8,
            keyword_intro_words: 100,
            min_keyword_density: 0.5,
            max_keyword_density: 3.0,
            min_secondary_coverage: 0.5,
            lcp_ms: 2500.0,
            inp_ms: 200.0,
            cls: 0.1,
            max_html_kb: 100,
            max_blocking_scripts: 3,
            max_stylesheets: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_table_keeps_defaults() {
        let t: Thresholds = toml::from_str("min_words = 800\nlcp_ms = 2000.0").expect("parse thresholds");
        assert_eq!(t.min_words, 800);
        assert!((t.lcp_ms - 2000.0).abs() < f64::EPSILON);
        assert_eq!(t.title_max_chars, 60);
        assert_eq!(t.max_ctas, 8);
    }
}
