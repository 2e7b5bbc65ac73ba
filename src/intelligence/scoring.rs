//! Pure scoring functions.
//!
//! Each score is rounded to four decimal places so repeated runs and
//! serialized snapshots compare exactly.

use std::collections::BTreeSet;

use super::content::ContentItem;
use super::policy::ContentPolicy;

/// Starting sentiment before lexicon hits.
pub const NEUTRAL_SENTIMENT: f64 = 0.5;
/// Sentiment change per lexicon hit.
pub const SENTIMENT_STEP: f64 = 0.1;
/// Words per sentence considered easy to read.
pub const IDEAL_SENTENCE_WORDS: (f64, f64) = (10.0, 20.0);

/// Lowercased alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|t| t.trim_matches('\'').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Lexicon sentiment over title and description, 0 to 1.
#[allow(clippy::cast_precision_loss)]
pub fn sentiment(item: &ContentItem, policy: &ContentPolicy) -> f64 {
    let text = format!("{} {}", item.title, item.description);
    let (positive, negative) = tokenize(&text).iter().fold((0_i64, 0_i64), |(p, n), token| {
        (
            p + i64::from(policy.positive_words.contains(token)),
            n + i64::from(policy.negative_words.contains(token)),
        )
    });
    let score = ((positive - negative) as f64).mul_add(SENTIMENT_STEP, NEUTRAL_SENTIMENT);
    round_score(score.clamp(0.0, 1.0))
}

/// Readability from average sentence length, 0 to 100.
///
/// The description is scored; the title stands in when the description is blank.
#[allow(clippy::cast_precision_loss)]
pub fn readability(item: &ContentItem) -> f64 {
    let text = if item.description.trim().is_empty() {
        item.title.as_str()
    } else {
        item.description.as_str()
    };

    let words = text.split_whitespace().count();
    if words == 0 {
        return 0.0;
    }
    let sentences = text
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
        .max(1);

    let avg = words as f64 / sentences as f64;
    let (low, high) = IDEAL_SENTENCE_WORDS;
    let mut score = 100.0;
    if avg > high {
        score -= (avg - high) * 2.0;
    } else if avg < low {
        score -= (low - avg) * 1.5;
    }
    round_score(score.clamp(0.0, 100.0))
}

/// Engagement prediction from posting context, 0 to 1.
pub fn engagement(item: &ContentItem, policy: &ContentPolicy) -> f64 {
    let mut score: f64 = 0.5;
    if item
        .scheduled_hour()
        .is_some_and(|h| policy.preferred_hours.contains(&h))
    {
        score += 0.15;
    }
    if (100..=300).contains(&item.body_len()) {
        score += 0.10;
    }
    if item.distinct_platforms().len() >= 2 {
        score += 0.10;
    }
    if item.has_media() {
        score += 0.15;
    }
    if (3..=7).contains(&item.hashtag_count()) {
        score += 0.10;
    }
    round_score(score.clamp(0.0, 1.0))
}

/// Viral potential from trending keywords, media and hashtag volume, 0 to 1.
#[allow(clippy::cast_precision_loss)]
pub fn viral_potential(item: &ContentItem, policy: &ContentPolicy) -> f64 {
    let text = format!(
        "{} {} {}",
        item.title,
        item.description,
        item.hashtags.join(" ")
    );
    let tokens: BTreeSet<String> = tokenize(&text).into_iter().collect();
    let matched = policy
        .trending_keywords
        .iter()
        .filter(|k| tokens.contains(*k))
        .count();

    let mut score = (matched as f64).mul_add(0.1, 0.3);
    if item.has_media() {
        score += 0.2;
    }
    if item.hashtag_count() > 5 {
        score += 0.1;
    }
    round_score(score.clamp(0.0, 1.0))
}

/// Aggregate performance score, capped at 100.
pub fn performance_score(sentiment: f64, readability: f64, engagement: f64) -> u32 {
    let mut score = 60;
    if sentiment > 0.6 {
        score += 15;
    }
    if readability > 70.0 {
        score += 15;
    }
    if engagement > 0.6 {
        score += 10;
    }
    score.min(100)
}

fn round_score(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
