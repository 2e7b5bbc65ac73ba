//! Circuit breaker guarding one kind of risky downstream operation.
//!
//! The circuit breaker fails fast while a dependency is unhealthy. It has
//! three states:
//! - Closed: normal operation, calls pass through and failures are counted
//! - Open: calls short-circuit (or run the fallback) until the cooldown elapses
//! - HalfOpen: a single trial call decides between Closed and Open
//!
//! The breaker never waits: it runs the operation, runs the fallback, or
//! fails immediately.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::clock::SharedClock;

/// State of the circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Calls pass through normally.
    Closed,
    /// Calls short-circuit until the cooldown elapses.
    Open,
    /// One trial call is in flight.
    HalfOpen,
}

/// Configuration for circuit breaker behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit.
    pub failure_threshold: u32,
    /// Cooldown after the last failure before a trial call is allowed.
    pub timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Error returned by a breaker-protected call.
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// The circuit is open and no fallback was supplied.
    #[error("circuit `{name}` is open; retry in {retry_after_ms}ms")]
    Open {
        /// Breaker name.
        name: String,
        /// Milliseconds until a trial call may be let through.
        retry_after_ms: u128,
    },
    /// The operation (or fallback) itself failed.
    #[error("{0}")]
    Inner(E),
}

impl<E> BreakerError<E> {
    /// The wrapped operation error, if the call was not short-circuited.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Inner(e) => Some(e),
            Self::Open { .. } => None,
        }
    }
}

/// Point-in-time view of a breaker for health reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitSnapshot {
    /// Breaker name.
    pub name: String,
    /// Current state.
    pub state: CircuitState,
    /// Consecutive failures counted while closed.
    pub failure_count: u32,
    /// Time of the most recent counted failure.
    pub last_failure_ms: Option<u128>,
    /// Calls short-circuited since creation.
    pub short_circuited: u64,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    last_failure_ms: Option<u128>,
    trial_in_flight: bool,
    /// Bumped every time the circuit opens; outcomes from older generations are stale.
    generation: u64,
    short_circuited: u64,
}

/// Admission ticket for one protected call.
struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    trial: bool,
    generation: u64,
    completed: bool,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        // A cancelled trial must not wedge the breaker in HalfOpen.
        if self.trial && !self.completed {
            let mut state = self.breaker.state.lock();
            if state.generation == self.generation && state.state == CircuitState::HalfOpen {
                state.trial_in_flight = false;
            }
        }
    }
}

/// Circuit breaker for one protected operation kind.
///
/// # Example
/// ```
/// use prometheus_publish_core::core::{CircuitBreaker, CircuitBreakerConfig};
/// use prometheus_publish_core::util::SystemClock;
///
/// # tokio_test();
/// # fn tokio_test() {
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let breaker = CircuitBreaker::new("publisher", CircuitBreakerConfig::default(), SystemClock::shared());
/// let value = breaker
///     .call_with_fallback(
///         || async { Err::<u32, String>("boom".into()) },
///         || async { Ok(0) },
///     )
///     .await;
/// assert!(value.is_err());
/// # });
/// # }
/// ```
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    clock: SharedClock,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    /// Create a closed breaker.
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig, clock: SharedClock) -> Self {
        Self {
            name: name.into(),
            config,
            clock,
            state: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failure_count: 0,
                last_failure_ms: None,
                trial_in_flight: false,
                generation: 0,
                short_circuited: 0,
            }),
        }
    }

    /// Breaker name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration fixed at construction.
    pub const fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Current state.
    pub fn state(&self) -> CircuitState {
        self.state.lock().state
    }

    /// Consecutive failures counted while closed.
    pub fn failure_count(&self) -> u32 {
        self.state.lock().failure_count
    }

    /// Health view of the breaker.
    pub fn snapshot(&self) -> CircuitSnapshot {
        let state = self.state.lock();
        CircuitSnapshot {
            name: self.name.clone(),
            state: state.state,
            failure_count: state.failure_count,
            last_failure_ms: state.last_failure_ms,
            short_circuited: state.short_circuited,
        }
    }

    /// Run `operation` unless the circuit is open, in which case fail fast.
    pub async fn call<T, E, F, Fut>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let permit = match self.admit() {
            Ok(permit) => permit,
            Err(retry_after_ms) => {
                return Err(BreakerError::Open {
                    name: self.name.clone(),
                    retry_after_ms,
                });
            }
        };
        let result = operation().await;
        self.complete(permit, result).map_err(BreakerError::Inner)
    }

    /// Run `operation` unless the circuit is open, in which case run `fallback`.
    ///
    /// Fallback outcomes do not affect the breaker state.
    pub async fn call_with_fallback<T, E, F, Fut, G, GFut>(
        &self,
        operation: F,
        fallback: G,
    ) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        G: FnOnce() -> GFut,
        GFut: Future<Output = Result<T, E>>,
    {
        let permit = match self.admit() {
            Ok(permit) => permit,
            Err(_) => {
                tracing::debug!(breaker = %self.name, "circuit open, running fallback");
                return fallback().await.map_err(BreakerError::Inner);
            }
        };
        let result = operation().await;
        self.complete(permit, result).map_err(BreakerError::Inner)
    }

    /// Decide whether a call may run. `Err` carries the retry hint.
    fn admit(&self) -> Result<Permit<'_>, u128> {
        let now = self.clock.now_ms();
        let timeout_ms = self.config.timeout.as_millis();
        let mut state = self.state.lock();

        match state.state {
            CircuitState::Closed => Ok(Permit {
                breaker: self,
                trial: false,
                generation: state.generation,
                completed: false,
            }),
            CircuitState::Open => {
                let elapsed = now.saturating_sub(state.last_failure_ms.unwrap_or(0));
                if elapsed > timeout_ms {
                    state.state = CircuitState::HalfOpen;
                    state.trial_in_flight = true;
                    tracing::info!(breaker = %self.name, "circuit half-open, allowing trial call");
                    Ok(Permit {
                        breaker: self,
                        trial: true,
                        generation: state.generation,
                        completed: false,
                    })
                } else {
                    state.short_circuited += 1;
                    Err((timeout_ms + 1).saturating_sub(elapsed))
                }
            }
            CircuitState::HalfOpen => {
                if state.trial_in_flight {
                    state.short_circuited += 1;
                    Err(0)
                } else {
                    state.trial_in_flight = true;
                    Ok(Permit {
                        breaker: self,
                        trial: true,
                        generation: state.generation,
                        completed: false,
                    })
                }
            }
        }
    }

    fn complete<T, E>(&self, mut permit: Permit<'_>, result: Result<T, E>) -> Result<T, E> {
        if result.is_ok() {
            self.on_success(&permit);
        } else {
            self.on_failure(&permit);
        }
        permit.completed = true;
        result
    }

    fn on_success(&self, permit: &Permit<'_>) {
        let mut state = self.state.lock();
        if state.generation != permit.generation {
            return;
        }
        match state.state {
            CircuitState::HalfOpen if permit.trial => {
                state.state = CircuitState::Closed;
                state.failure_count = 0;
                state.trial_in_flight = false;
                tracing::info!(breaker = %self.name, "trial call succeeded, circuit closed");
            }
            CircuitState::Closed => state.failure_count = 0,
            // Stale outcome from a call admitted before the circuit last changed.
            CircuitState::HalfOpen | CircuitState::Open => {}
        }
    }

    fn on_failure(&self, permit: &Permit<'_>) {
        let now = self.clock.now_ms();
        let mut state = self.state.lock();
        if state.generation != permit.generation {
            return;
        }
        match state.state {
            CircuitState::HalfOpen if permit.trial => {
                state.state = CircuitState::Open;
                state.last_failure_ms = Some(now);
                state.trial_in_flight = false;
                state.generation += 1;
                tracing::warn!(breaker = %self.name, "trial call failed, circuit reopened");
            }
            CircuitState::Closed => {
                state.failure_count += 1;
                state.last_failure_ms = Some(now);
                if state.failure_count >= self.config.failure_threshold {
                    state.state = CircuitState::Open;
                    state.generation += 1;
                    tracing::warn!(
                        breaker = %self.name,
                        failures = state.failure_count,
                        "failure threshold reached, circuit opened"
                    );
                }
            }
            CircuitState::HalfOpen | CircuitState::Open => {}
        }
    }
}
