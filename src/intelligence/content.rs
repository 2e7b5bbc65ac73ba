//! Content items, analysis results and engine errors.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::serde::{Platform, Priority};

const MS_PER_HOUR: u128 = 3_600_000;

/// A piece of content scheduled for multi-platform publishing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Calendar entry identifier.
    pub id: String,
    /// Headline.
    pub title: String,
    /// Body text.
    pub description: String,
    /// Attached media references.
    #[serde(default)]
    pub media_urls: Vec<String>,
    /// Target platforms.
    pub platforms: Vec<Platform>,
    /// Hashtags, with or without the leading `#`.
    #[serde(default)]
    pub hashtags: Vec<String>,
    /// Scheduled publish time, epoch milliseconds (UTC).
    #[serde(default)]
    pub scheduled_at_ms: Option<u128>,
}

impl ContentItem {
    /// Create an item with no media, platforms, hashtags or schedule.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            media_urls: Vec::new(),
            platforms: Vec::new(),
            hashtags: Vec::new(),
            scheduled_at_ms: None,
        }
    }

    /// Set target platforms.
    #[must_use]
    pub fn with_platforms(mut self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        self.platforms = platforms.into_iter().collect();
        self
    }

    /// Set hashtags.
    #[must_use]
    pub fn with_hashtags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.hashtags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set media references.
    #[must_use]
    pub fn with_media<S: Into<String>>(mut self, urls: impl IntoIterator<Item = S>) -> Self {
        self.media_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Set the scheduled publish time.
    #[must_use]
    pub fn scheduled_at(mut self, epoch_ms: u128) -> Self {
        self.scheduled_at_ms = Some(epoch_ms);
        self
    }

    /// Body length in characters.
    pub fn body_len(&self) -> usize {
        self.description.chars().count()
    }

    /// Whether any media is attached.
    pub fn has_media(&self) -> bool {
        self.media_urls.iter().any(|u| !u.trim().is_empty())
    }

    /// Number of non-blank hashtags.
    pub fn hashtag_count(&self) -> usize {
        self.hashtags
            .iter()
            .filter(|t| !t.trim().trim_start_matches('#').is_empty())
            .count()
    }

    /// Distinct target platforms, in declaration order of [`Platform`].
    pub fn distinct_platforms(&self) -> Vec<Platform> {
        self.platforms
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// UTC hour of the scheduled time.
    #[allow(clippy::cast_possible_truncation)]
    pub fn scheduled_hour(&self) -> Option<u32> {
        self.scheduled_at_ms
            .map(|ms| ((ms / MS_PER_HOUR) % 24) as u32)
    }
}

/// Text rewritten for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformVariant {
    /// Target platform.
    pub platform: Platform,
    /// Text to publish.
    pub text: String,
    /// Length of `text` in characters.
    pub char_count: usize,
    /// Whether source text had to be shortened.
    pub truncated: bool,
    /// Hashtags included in `text`.
    pub hashtags: Vec<String>,
}

/// Kind of improvement suggested before publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    /// Shorter sentences, simpler words.
    SimplifyLanguage,
    /// Ask the audience to act.
    AddCallToAction,
    /// Add discoverability tags.
    AddHashtags,
    /// Attach an image or video.
    AddMedia,
    /// Warmer wording.
    ImproveTone,
}

/// A ranked improvement suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// What to change.
    pub kind: RecommendationKind,
    /// How urgent the change is.
    pub priority: Priority,
    /// Human-readable advice.
    pub message: String,
    /// Expected relative lift in engagement, 0 to 1.
    pub estimated_impact: f64,
}

/// Result of analyzing one content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentAnalysis {
    /// Analyzed item.
    pub content_id: String,
    /// 0 (negative) to 1 (positive).
    pub sentiment: f64,
    /// 0 (hard) to 100 (easy).
    pub readability: f64,
    /// Predicted engagement, 0 to 1.
    pub engagement_prediction: f64,
    /// Predicted virality, 0 to 1.
    pub viral_potential: f64,
    /// One variant per distinct target platform.
    pub variants: Vec<PlatformVariant>,
    /// Suggestions ordered by priority, then impact.
    pub recommendations: Vec<Recommendation>,
    /// Aggregate performance score, 0 to 100.
    pub performance_score: u32,
}

impl ContentAnalysis {
    /// Variant for a platform.
    pub fn variant(&self, platform: Platform) -> Option<&PlatformVariant> {
        self.variants.iter().find(|v| v.platform == platform)
    }
}

/// Reasons the engine refuses to score an item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntelligenceError {
    /// Neither title nor description carries text.
    #[error("content `{0}` has no text to analyze")]
    EmptyContent(String),
    /// The item targets no platform.
    #[error("content `{0}` targets no platform")]
    NoPlatforms(String),
}
