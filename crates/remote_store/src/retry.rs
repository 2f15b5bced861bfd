//! Bounded retry with exponential backoff
//!
//! Only transient failures are retried; shape and auth errors return
//! immediately.

use std::future::Future;

use contracts::{CoreError, RetryPolicy};
use tracing::warn;

/// Run `operation` up to `policy.max_attempts` times, sleeping the policy's
/// backoff between attempts.
///
/// Returns the first non-transient error unchanged, or the last transient
/// error once the budget is exhausted.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, CoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CoreError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.backoff(attempt);
                warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "transient failure, backing off"
                );
                metrics::counter!("ride_syncer_retry_total", "operation" => operation_name.to_string())
                    .increment(1);
                tokio::time::sleep(delay).await;
            }
            Err(error) => return Err(error),
        }
    }
}
