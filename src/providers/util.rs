use anyhow::Error;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retries an async operation with exponential backoff
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `attempts`: Total number of runs, including the first (at least one)
/// - `base_delay`: Delay after the first failure; doubled after each further failure
///
/// # Returns
/// Either the successful result or the error from the last attempt
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    attempts: usize,
    base_delay: Duration,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let attempts = attempts.max(1);
    let mut delay = base_delay;
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt >= attempts {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}...",
                    attempt, attempts, err, delay
                );
                attempt += 1;
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }
    }
}
