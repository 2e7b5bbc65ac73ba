//! Unit tests for individual components

mod builders_test;
mod circuit_breaker_test;
mod config_test;
mod error_test;
mod intelligence_test;
mod lock_manager_test;
mod metrics_test;
mod rate_limiter_test;
mod runtime_test;
mod util_test;
