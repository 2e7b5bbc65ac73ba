//! Policy data driving the scoring pipeline.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

const POSITIVE_WORDS: &[&str] = &[
    "amazing", "awesome", "best", "brilliant", "celebrate", "excellent", "exciting", "fantastic",
    "good", "great", "growth", "happy", "incredible", "innovative", "inspiring", "love", "proud",
    "success", "thrilled", "win", "wonderful",
];

const NEGATIVE_WORDS: &[&str] = &[
    "angry", "awful", "bad", "broken", "crisis", "difficult", "disappointing", "fail", "failure",
    "hate", "loss", "poor", "problem", "sad", "terrible", "ugly", "worst", "wrong",
];

const TRENDING_KEYWORDS: &[&str] = &[
    "ai", "automation", "community", "future", "innovation", "productivity", "remote",
    "sustainability", "tips", "trends",
];

const PREFERRED_HOURS: &[u32] = &[9, 12, 15, 18];

fn owned_set(words: &[&str]) -> BTreeSet<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

/// Lexicons and thresholds used by the content intelligence engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentPolicy {
    /// Words that raise sentiment by 0.1 per occurrence.
    pub positive_words: BTreeSet<String>,
    /// Words that lower sentiment by 0.1 per occurrence.
    pub negative_words: BTreeSet<String>,
    /// Keywords that raise viral potential by 0.1 each when present.
    pub trending_keywords: BTreeSet<String>,
    /// UTC posting hours that earn the engagement bonus.
    pub preferred_hours: BTreeSet<u32>,
    /// Readability below this suggests simplifying language.
    pub readability_floor: f64,
    /// Engagement prediction below this suggests a call-to-action.
    pub engagement_floor: f64,
    /// Fewer hashtags than this suggests adding more.
    pub min_hashtags: usize,
    /// Sentiment below this suggests a warmer tone.
    pub sentiment_floor: f64,
}

impl Default for ContentPolicy {
    fn default() -> Self {
        Self {
            positive_words: owned_set(POSITIVE_WORDS),
            negative_words: owned_set(NEGATIVE_WORDS),
            trending_keywords: owned_set(TRENDING_KEYWORDS),
            preferred_hours: PREFERRED_HOURS.iter().copied().collect(),
            readability_floor: 60.0,
            engagement_floor: 0.6,
            min_hashtags: 3,
            sentiment_floor: 0.4,
        }
    }
}

impl ContentPolicy {
    /// Replace the trending keyword list.
    #[must_use]
    pub fn with_trending<S: AsRef<str>>(mut self, keywords: impl IntoIterator<Item = S>) -> Self {
        self.trending_keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().to_lowercase())
            .collect();
        self
    }
}
