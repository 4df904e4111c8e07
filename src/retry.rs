use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

/// How many times a transaction step may be attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Keep trying until the step succeeds.
    Unlimited,
    /// At most this many attempts (always at least one).
    Attempts(u32),
}

impl RetryPolicy {
    /// Interpret the retry answer: `0` is unlimited, `none` is a single
    /// attempt and `n` allows `n` attempts. Unparseable answers fall back to a
    /// single attempt.
    pub fn from_answer(answer: &str) -> Self {
        let answer = answer.trim().to_lowercase();
        if answer == "none" {
            return RetryPolicy::Attempts(1);
        }
        match answer.parse::<u32>() {
            Ok(0) => RetryPolicy::Unlimited,
            Ok(n) => RetryPolicy::Attempts(n),
            Err(_) => {
                tracing::warn!(answer = %answer, "Invalid retry count, defaulting to no retries");
                RetryPolicy::Attempts(1)
            }
        }
    }

    fn allows(&self, attempt: u32) -> bool {
        match self {
            RetryPolicy::Unlimited => true,
            RetryPolicy::Attempts(max) => attempt <= (*max).max(1),
        }
    }
}

impl Display for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetryPolicy::Unlimited => write!(f, "unlimited"),
            RetryPolicy::Attempts(n) => write!(f, "{n} attempt(s)"),
        }
    }
}

/// Run `op` until it succeeds or the policy's attempt budget is spent,
/// sleeping `delay` between attempts. `op` receives the 1-based attempt number.
pub async fn run_with_retry<F, Fut, T, E>(
    policy: RetryPolicy,
    label: &str,
    delay: Duration,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if policy.allows(attempt + 1) => {
                tracing::warn!(attempt, error = %e, "{label} failed, retrying");
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(attempt, error = %e, "Max retries reached for {label}. Skipping to next process");
                return Err(e);
            }
        }
    }
}
