//! # Prometheus Publish Core
//!
//! Resilience and content-optimization core for multi-platform content publishing.
//!
//! Publishing a calendar entry touches an external service that can be slow,
//! rate limited or down, and several tenants share the same process. This crate
//! provides the pieces that keep that path safe and observable, plus a rule-based
//! engine that scores content and rewrites it for each platform.
//!
//! ## Components
//!
//! - **Metrics Collector**: tagged counters, gauges and bounded histograms with percentiles
//! - **Circuit Breaker**: Closed / Open / HalfOpen with a single trial call and optional fallback
//! - **Rate Limiter**: fixed window per tenant and endpoint with additive burst headroom
//! - **Lock Manager**: TTL-scoped advisory locks with ownership tokens and RAII guards
//! - **Content Intelligence**: sentiment, readability, engagement and viral scores,
//!   per-platform variants and ranked recommendations
//! - **Publish Orchestrator**: admission, locking, optimization, breaker-protected
//!   publishing, record persistence and metrics at every step
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use prometheus_publish_core::builders::build_orchestrator;
//! use prometheus_publish_core::config::CoreConfig;
//! use prometheus_publish_core::infra::{InMemoryContentStore, ScriptedPublisher};
//! use prometheus_publish_core::intelligence::ContentItem;
//! use prometheus_publish_core::orchestrator::PublishRequest;
//! use prometheus_publish_core::util::{Platform, RequestContext, SystemClock};
//!
//! # async fn run() -> prometheus_publish_core::core::AppResult<()> {
//! let store = Arc::new(InMemoryContentStore::default());
//! store.insert_item(
//!     ContentItem::new("post-1", "Launch", "Our new release is out.")
//!         .with_platforms([Platform::Twitter, Platform::LinkedIn]),
//! );
//!
//! let orchestrator = build_orchestrator(
//!     &CoreConfig::from_env()?,
//!     store,
//!     Arc::new(ScriptedPublisher::new()),
//!     SystemClock::shared(),
//! )?;
//!
//! let record = orchestrator
//!     .publish(PublishRequest::new(RequestContext::new("acme"), "post-1"))
//!     .await?;
//! assert!(record.success);
//! # Ok(())
//! # }
//! ```
//!
//! For complete scenarios, see `tests/orchestrator_test.rs` and `tests/bulk_publish_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Resilience primitives and the error taxonomy.
pub mod core;
/// Configuration models for the core and its components.
pub mod config;
/// Builders to construct the orchestrator from configuration.
pub mod builders;
/// In-memory adapters for storage and publishing.
pub mod infra;
/// Content scoring, platform rewrites and recommendations.
pub mod intelligence;
/// The publish pipeline.
pub mod orchestrator;
/// API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
