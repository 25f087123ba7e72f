//! Supervised two-path execution: oracle first, deterministic fallback second.
//!
//! The primary path is an oracle future raced against a timeout. The
//! fallback is a plain synchronous closure so it can never suspend.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{OracleError, OracleResult};
use crate::types::results::Provenance;

/// A value tagged with the path that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub value: T,
    pub provenance: Provenance,
    /// Set when the oracle path was abandoned
    pub degraded_reason: Option<OracleError>,
}

impl<T> Sourced<T> {
    pub fn oracle(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Oracle,
            degraded_reason: None,
        }
    }

    pub fn fallback(value: T, reason: OracleError) -> Self {
        Self {
            value,
            provenance: Provenance::Fallback,
            degraded_reason: Some(reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sourced<U> {
        Sourced {
            value: f(self.value),
            provenance: self.provenance,
            degraded_reason: self.degraded_reason,
        }
    }
}

/// Timeout-bounded oracle call with a guaranteed fallback.
#[derive(Debug, Clone, Copy)]
pub struct FallbackPolicy {
    timeout: Duration,
}

impl FallbackPolicy {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `primary` under the timeout; on timeout or error return `fallback()`.
    pub async fn run<T, F, Fb>(&self, operation: &'static str, primary: F, fallback: Fb) -> Sourced<T>
    where
        F: Future<Output = OracleResult<T>>,
        Fb: FnOnce() -> T,
    {
        let reason = match tokio::time::timeout(self.timeout, primary).await {
            Ok(Ok(value)) => {
                debug!(operation, "Oracle path succeeded");
                return Sourced::oracle(value);
            }
            Ok(Err(e)) => e,
            Err(_) => OracleError::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            },
        };

        warn!(operation, error = %reason, "Oracle unavailable, using deterministic fallback");
        Sourced::fallback(fallback(), reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn oracle_success_is_tagged_oracle() {
        let policy = FallbackPolicy::new(Duration::from_secs(1));
        let result = policy.run("test", async { Ok(7) }, || 0).await;
        assert_eq!(result.value, 7);
        assert_eq!(result.provenance, Provenance::Oracle);
        assert!(result.degraded_reason.is_none());
    }

    #[tokio::test]
    async fn oracle_error_runs_fallback() {
        let policy = FallbackPolicy::new(Duration::from_secs(1));
        let result = policy
            .run("test", async { Err(OracleError::Api("rate limited".into())) }, || 3)
            .await;
        assert_eq!(result.value, 3);
        assert_eq!(result.provenance, Provenance::Fallback);
        assert_eq!(result.degraded_reason, Some(OracleError::Api("rate limited".into())));
    }

    #[tokio::test]
    async fn slow_oracle_times_out() {
        let policy = FallbackPolicy::new(Duration::from_millis(20));
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(1)
        };
        let started = std::time::Instant::now();
        let result = policy.run("test", slow, || 2).await;

        assert_eq!(result.value, 2);
        assert_eq!(result.degraded_reason, Some(OracleError::Timeout { after_ms: 20 }));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn map_keeps_provenance() {
        let sourced = Sourced::fallback(2, OracleError::Network("down".into())).map(|v| v * 10);
        assert_eq!(sourced.value, 20);
        assert_eq!(sourced.provenance, Provenance::Fallback);
    }
}
