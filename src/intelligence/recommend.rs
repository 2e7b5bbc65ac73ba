//! Improvement suggestions derived from scores.

use std::cmp::Ordering;

use super::content::{ContentItem, Recommendation, RecommendationKind};
use super::policy::ContentPolicy;
use crate::util::serde::Priority;

/// Scores a recommendation pass looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreCard {
    /// 0 to 1.
    pub sentiment: f64,
    /// 0 to 100.
    pub readability: f64,
    /// 0 to 1.
    pub engagement: f64,
}

/// Ranked suggestions: highest priority first, then largest impact.
pub fn recommend(
    item: &ContentItem,
    scores: ScoreCard,
    policy: &ContentPolicy,
) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if scores.readability < policy.readability_floor {
        out.push(Recommendation {
            kind: RecommendationKind::SimplifyLanguage,
            priority: Priority::High,
            message: "Use shorter sentences and simpler words to improve readability".into(),
            estimated_impact: 0.25,
        });
    }
    if scores.engagement < policy.engagement_floor {
        out.push(Recommendation {
            kind: RecommendationKind::AddCallToAction,
            priority: Priority::High,
            message: "Add a clear call-to-action to invite responses".into(),
            estimated_impact: 0.20,
        });
    }
    if item.hashtag_count() < policy.min_hashtags {
        out.push(Recommendation {
            kind: RecommendationKind::AddHashtags,
            priority: Priority::Medium,
            message: format!(
                "Add at least {} relevant hashtags to improve discoverability",
                policy.min_hashtags
            ),
            estimated_impact: 0.15,
        });
    }
    if !item.has_media() {
        out.push(Recommendation {
            kind: RecommendationKind::AddMedia,
            priority: Priority::Medium,
            message: "Attach an image or short video; visual posts reach further".into(),
            estimated_impact: 0.20,
        });
    }
    if scores.sentiment < policy.sentiment_floor {
        out.push(Recommendation {
            kind: RecommendationKind::ImproveTone,
            priority: Priority::Low,
            message: "Consider a warmer, more positive tone".into(),
            estimated_impact: 0.10,
        });
    }

    out.sort_by(|a, b| {
        b.priority.cmp(&a.priority).then_with(|| {
            b.estimated_impact
                .partial_cmp(&a.estimated_impact)
                .unwrap_or(Ordering::Equal)
        })
    });
    out
}
