//! Caller-supplied topical context
//!
//! Everything in here is resolved before an audit starts: keyword targets
//! from the topical map, competitive signals, and optional Core Web Vitals
//! and fact-verification data from external sources. Phases only read it.

use serde::{Deserialize, Serialize};

/// What the searcher is trying to do on this page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchIntent {
    Informational,
    Commercial,
    Transactional,
    Navigational,
}

/// Field data for the page, in milliseconds except CLS
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreWebVitals {
    #[serde(default)]
    pub lcp_ms: Option<f64>,
    #[serde(default)]
    pub inp_ms: Option<f64>,
    #[serde(default)]
    pub cls: Option<f64>,
    #[serde(default)]
    pub fcp_ms: Option<f64>,
    #[serde(default)]
    pub ttfb_ms: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Verified,
    Disputed,
    Unverified,
}

/// Result of checking one claim made on the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactVerification {
    pub claim: String,
    pub verdict: Verdict,
    #[serde(default)]
    pub source: Option<String>,
}

/// Contextual metadata for the page being audited
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicalMapContext {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub target_keyword: Option<String>,
    #[serde(default)]
    pub secondary_keywords: Vec<String>,
    #[serde(default)]
    pub entities: Vec<String>,
    /// Median word count of ranking competitors
    #[serde(default)]
    pub competitor_word_count: Option<u32>,
    #[serde(default)]
    pub search_intent: Option<SearchIntent>,
    #[serde(default)]
    pub core_web_vitals: Option<CoreWebVitals>,
    #[serde(default)]
    pub fact_checks: Option<Vec<FactVerification>>,
}

impl TopicalMapContext {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Default::default()
        }
    }

    pub fn with_target_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.target_keyword = Some(keyword.into());
        self
    }

    pub fn with_secondary_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.secondary_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_entities<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entities = entities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_search_intent(mut self, intent: SearchIntent) -> Self {
        self.search_intent = Some(intent);
        self
    }

    pub fn with_core_web_vitals(mut self, vitals: CoreWebVitals) -> Self {
        self.core_web_vitals = Some(vitals);
        self
    }

    pub fn with_fact_checks(mut self, checks: Vec<FactVerification>) -> Self {
        self.fact_checks = Some(checks);
        self
    }

    pub fn with_competitor_word_count(mut self, words: u32) -> Self {
        self.competitor_word_count = Some(words);
        self
    }

    /// Target keyword, trimmed and lowercased; `None` when blank
    pub fn keyword(&self) -> Option<String> {
        self.target_keyword
            .as_deref()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
    }
}
