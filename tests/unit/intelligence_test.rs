//! Tests for the content intelligence engine

use prometheus_publish_core::intelligence::{
    ContentIntelligence, ContentItem, ContentOptimizer, ContentPolicy, IntelligenceError,
    RecommendationKind,
};
use prometheus_publish_core::util::{Platform, Priority};

const HOUR_MS: u128 = 3_600_000;

fn engine() -> ContentIntelligence {
    ContentIntelligence::new(ContentPolicy::default())
}

#[test]
fn test_engagement_example() {
    let item = ContentItem::new("c1", "Title", "y".repeat(180))
        .with_platforms([Platform::Twitter, Platform::Facebook])
        .with_media(["https://cdn.example.com/a.jpg"])
        .with_hashtags(["one", "two", "three", "four", "five"])
        .scheduled_at(19_000 * 24 * HOUR_MS + 12 * HOUR_MS);
    let analysis = engine().analyze(&item).unwrap();
    assert_eq!(analysis.engagement_prediction, 1.0);
}

#[test]
fn test_aggregate_with_strong_sentiment_and_readability() {
    let item = ContentItem::new(
        "c2",
        "Great news",
        "We love this amazing update. It makes planning easy for every team today.",
    )
    .with_platforms([Platform::LinkedIn]);
    let analysis = engine().analyze(&item).unwrap();
    assert!(analysis.sentiment > 0.6);
    assert!(analysis.readability > 70.0);
    assert!(analysis.performance_score >= 85);
}

#[test]
fn test_weak_content_gets_ranked_advice() {
    let item = ContentItem::new(
        "c3",
        "Problem",
        "This terrible awful broken release was a failure and a problem for everyone who relied on it during the busiest week of the entire year without any warning at all and nobody on the support team could explain what went wrong or when a fix would finally arrive for customers, and the whole team still had no clear answers for anyone several long days later",
    )
    .with_platforms([Platform::Twitter]);
    assert!(item.body_len() > 300);
    let analysis = engine().analyze(&item).unwrap();
    assert_eq!(analysis.sentiment, 0.0);
    assert_eq!(analysis.engagement_prediction, 0.5);
    assert_eq!(analysis.performance_score, 60);

    let kinds: Vec<RecommendationKind> = analysis.recommendations.iter().map(|r| r.kind).collect();
    assert_eq!(kinds[0], RecommendationKind::SimplifyLanguage);
    assert_eq!(kinds[1], RecommendationKind::AddCallToAction);
    assert!(kinds.contains(&RecommendationKind::ImproveTone));
    let priorities: Vec<Priority> = analysis.recommendations.iter().map(|r| r.priority).collect();
    let mut sorted = priorities.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(priorities, sorted);
}

#[test]
fn test_variants_cover_each_distinct_platform() {
    let item = ContentItem::new("c4", "Hello", "World")
        .with_platforms([Platform::TikTok, Platform::Twitter, Platform::TikTok]);
    let analysis = engine().analyze(&item).unwrap();
    let platforms: Vec<Platform> = analysis.variants.iter().map(|v| v.platform).collect();
    assert_eq!(platforms, vec![Platform::Twitter, Platform::TikTok]);
    for variant in &analysis.variants {
        assert!(variant.char_count <= variant.platform.char_limit());
    }
}

#[test]
fn test_errors_are_typed() {
    let missing_text = ContentItem::new("c5", "", "").with_platforms([Platform::Twitter]);
    assert_eq!(
        engine().analyze(&missing_text).unwrap_err(),
        IntelligenceError::EmptyContent("c5".into())
    );
}

#[test]
fn test_analysis_serializes() {
    let item = ContentItem::new("c6", "Hello", "World").with_platforms([Platform::Instagram]);
    let analysis = engine().analyze(&item).unwrap();
    let json = serde_json::to_value(&analysis).unwrap();
    assert_eq!(json["content_id"], "c6");
    assert_eq!(json["variants"][0]["platform"], "instagram");
    assert!(json["recommendations"].is_array());
}
