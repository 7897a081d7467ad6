//! Async retry with a fixed delay between attempts

use std::time::Duration;

/// How many times to try and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

/// Retry an async operation while `should_retry` accepts the error.
///
/// Returns `Ok((value, attempts))` on success, or `Err((error, attempts))`
/// once the error is not retryable or attempts are exhausted.
pub async fn retry_async<T, E, F, Fut, P>(
    policy: RetryPolicy,
    should_retry: P,
    mut operation: F,
) -> Result<(T, u32), (E, u32)>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match operation().await {
            Ok(value) => return Ok((value, attempts)),
            Err(e) => {
                if attempts >= policy.max_attempts || !should_retry(&e) {
                    return Err((e, attempts));
                }
                tracing::warn!(
                    error = %e,
                    attempt = attempts,
                    delay_ms = policy.delay.as_millis(),
                    "Retrying after transient error"
                );
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(50))
    }

    #[tokio::test]
    async fn test_success_on_first_try() {
        let result = retry_async(policy(3), |_: &&str| true, || async { Ok::<_, &str>(7) }).await;
        assert_eq!(result, Ok((7, 1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_retry() {
        let calls = Cell::new(0);
        let started = tokio::time::Instant::now();
        let result = retry_async(
            policy(5),
            |_: &&str| true,
            || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move { if n < 3 { Err("locked") } else { Ok(()) } }
            },
        )
        .await;
        assert_eq!(result, Ok(((), 3)));
        // Two fixed sleeps between three attempts
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_after_max_attempts() {
        let result = retry_async(policy(3), |_: &&str| true, || async {
            Err::<(), _>("persistent error")
        })
        .await;
        assert_eq!(result, Err(("persistent error", 3)));
    }

    #[tokio::test]
    async fn test_non_retryable_fails_immediately() {
        let calls = Cell::new(0);
        let result = retry_async(
            policy(5),
            |e: &&str| *e == "locked",
            || {
                calls.set(calls.get() + 1);
                async { Err::<(), _>("constraint failed") }
            },
        )
        .await;
        assert_eq!(result, Err(("constraint failed", 1)));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_policy_needs_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }
}
