//! Shared serializable types used across modules.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tenant identifier.
pub type TenantId = String;

/// Billing tier applied when no tier is supplied.
pub const DEFAULT_TIER: &str = "standard";

/// External platforms a content item can be published to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Short-form microblogging.
    Twitter,
    /// Professional network.
    LinkedIn,
    /// Image-first network.
    Instagram,
    /// General social network.
    Facebook,
    /// Short-form video.
    TikTok,
}

impl Platform {
    /// All supported platforms.
    pub const ALL: [Self; 5] = [
        Self::Twitter,
        Self::LinkedIn,
        Self::Instagram,
        Self::Facebook,
        Self::TikTok,
    ];

    /// Stable lowercase name, used for metric tags and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Twitter => "twitter",
            Self::LinkedIn => "linkedin",
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::TikTok => "tiktok",
        }
    }

    /// Maximum post length in characters.
    pub const fn char_limit(self) -> usize {
        match self {
            Self::Twitter => 280,
            Self::LinkedIn => 3000,
            Self::Instagram | Self::TikTok => 2200,
            Self::Facebook => 63_206,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority attached to recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Nice to have.
    Low,
    /// Worth doing.
    Medium,
    /// Act before publishing.
    High,
}

/// Caller identity supplied by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestContext {
    /// Tenant the request acts for.
    pub tenant_id: TenantId,
    /// Billing/tier label selecting the rate-limit policy.
    pub tier: String,
}

impl RequestContext {
    /// Context on the default tier.
    pub fn new(tenant_id: impl Into<TenantId>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            tier: DEFAULT_TIER.to_string(),
        }
    }

    /// Override the billing tier.
    #[must_use]
    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = tier.into();
        self
    }
}
