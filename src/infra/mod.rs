//! In-memory adapters for the orchestrator's collaborators.

pub mod publisher;
pub mod store;

pub use publisher::{PublishCall, ScriptedPublisher};
pub use store::{InMemoryContentStore, DEFAULT_RECORD_CAPACITY};
