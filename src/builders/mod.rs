//! Builders to construct the publishing core from configuration.

pub mod orchestrator_builder;

pub use orchestrator_builder::build_orchestrator;
