//! API surface over the publish orchestrator.

pub mod api;

pub use api::{
    health, submit_bulk, submit_publish, submit_publish_json, BulkSubmission, ErrorResponse,
    Health, PublishResponse, PublishSubmission,
};
