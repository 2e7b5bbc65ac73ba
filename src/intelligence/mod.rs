//! Content intelligence engine.
//!
//! Scores a [`ContentItem`], rewrites it for each target platform and ranks
//! improvement suggestions. The pipeline is pure: the same item and policy
//! always produce the same [`ContentAnalysis`].
//!
//! # Example
//! ```
//! use prometheus_publish_core::intelligence::{ContentIntelligence, ContentItem, ContentOptimizer};
//! use prometheus_publish_core::util::Platform;
//!
//! let engine = ContentIntelligence::default();
//! let item = ContentItem::new("c1", "Launch", "We are thrilled to share our new release.")
//!     .with_platforms([Platform::Twitter]);
//! let analysis = engine.analyze(&item).unwrap();
//! assert!(analysis.sentiment > 0.5);
//! assert_eq!(analysis.variants.len(), 1);
//! ```

pub mod content;
pub mod policy;
pub mod recommend;
pub mod scoring;
pub mod transform;

pub use content::{
    ContentAnalysis, ContentItem, IntelligenceError, PlatformVariant, Recommendation,
    RecommendationKind,
};
pub use policy::ContentPolicy;
pub use recommend::ScoreCard;

/// Anything that can turn a content item into an analysis.
pub trait ContentOptimizer: Send + Sync {
    /// Score and rewrite `item`.
    fn analyze(&self, item: &ContentItem) -> Result<ContentAnalysis, IntelligenceError>;
}

/// Rule-based optimizer driven by a [`ContentPolicy`].
#[derive(Debug, Clone, Default)]
pub struct ContentIntelligence {
    policy: ContentPolicy,
}

impl ContentIntelligence {
    /// Engine using `policy`.
    pub const fn new(policy: ContentPolicy) -> Self {
        Self { policy }
    }

    /// Active policy.
    pub const fn policy(&self) -> &ContentPolicy {
        &self.policy
    }

    fn validate(item: &ContentItem) -> Result<(), IntelligenceError> {
        if item.title.trim().is_empty() && item.description.trim().is_empty() {
            return Err(IntelligenceError::EmptyContent(item.id.clone()));
        }
        if item.platforms.is_empty() {
            return Err(IntelligenceError::NoPlatforms(item.id.clone()));
        }
        Ok(())
    }
}

impl ContentOptimizer for ContentIntelligence {
    fn analyze(&self, item: &ContentItem) -> Result<ContentAnalysis, IntelligenceError> {
        Self::validate(item)?;

        let sentiment = scoring::sentiment(item, &self.policy);
        let readability = scoring::readability(item);
        let engagement = scoring::engagement(item, &self.policy);
        let viral_potential = scoring::viral_potential(item, &self.policy);
        let scores = ScoreCard {
            sentiment,
            readability,
            engagement,
        };

        Ok(ContentAnalysis {
            content_id: item.id.clone(),
            sentiment,
            readability,
            engagement_prediction: engagement,
            viral_potential,
            variants: transform::variants(item),
            recommendations: recommend::recommend(item, scores, &self.policy),
            performance_score: scoring::performance_score(sentiment, readability, engagement),
        })
    }
}
