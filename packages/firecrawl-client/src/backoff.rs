//! Backoff decisions for retries and status polling.
//!
//! A [`BackoffPolicy`] is a pure decision function: given the attempt
//! number and the wait accumulated so far, it either names the next
//! delay or says stop. The caller owns the sleeping, so the policy is
//! testable without time.

use std::time::Duration;

/// What to do before the next attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Wait this long, then attempt again.
    Wait(Duration),
    /// Attempt or wait budget is exhausted; give up.
    Stop,
}

/// Exponential backoff bounded by an attempt count and a total wait
/// budget.
///
/// Two instances are configured per client: a transport-retry schedule
/// (applied to connection failures and 429s) and a polling schedule
/// (the interval between job status fetches), with distinct bases.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub base_delay: Duration,
    pub multiplier: f64,
    pub max_attempts: u32,
    pub max_total_wait: Duration,
}

impl BackoffPolicy {
    /// Default schedule for transport-level retries: 2s base, doubling,
    /// three attempts, one minute ceiling.
    pub fn transport() -> Self {
        Self {
            base_delay: Duration::from_secs(2),
            multiplier: 2.0,
            max_attempts: 3,
            max_total_wait: Duration::from_secs(60),
        }
    }

    /// Default schedule for job status polling: flat 5s interval,
    /// bounded at five minutes of waiting.
    pub fn polling() -> Self {
        Self {
            base_delay: Duration::from_secs(5),
            multiplier: 1.0,
            max_attempts: 60,
            max_total_wait: Duration::from_secs(300),
        }
    }

    /// Decide whether to wait before attempt `attempt` (1-based).
    ///
    /// A server-suggested delay replaces the computed candidate when
    /// present. The returned wait never exceeds what remains of the
    /// total wait budget given `elapsed` already spent waiting.
    pub fn decide(
        &self,
        attempt: u32,
        elapsed: Duration,
        server_suggested: Option<Duration>,
    ) -> Decision {
        if attempt > self.max_attempts {
            return Decision::Stop;
        }
        let candidate = server_suggested.unwrap_or_else(|| {
            self.base_delay
                .mul_f64(self.multiplier.powi(attempt.saturating_sub(1) as i32))
        });
        let remaining = self.max_total_wait.saturating_sub(elapsed);
        if remaining.is_zero() {
            return Decision::Stop;
        }
        Decision::Wait(candidate.min(remaining))
    }
}

/// Attempt count and accumulated wait for one retryable operation.
/// Scoped to a single logical request; discarded after success or
/// exhaustion.
#[derive(Debug, Default)]
pub struct RetryState {
    attempt: u32,
    waited: Duration,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts consumed so far.
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    /// Register a failed attempt and ask the policy for the next step.
    pub fn next_delay(&mut self, policy: &BackoffPolicy, suggested: Option<Duration>) -> Decision {
        self.attempt += 1;
        let decision = policy.decide(self.attempt, self.waited, suggested);
        if let Decision::Wait(delay) = decision {
            self.waited += delay;
        }
        decision
    }
}

/// Parse a `Retry-After` header value as whole seconds. Non-numeric
/// values (including HTTP-date form) are ignored and treated as absent.
pub fn parse_retry_after(value: Option<&str>) -> Option<Duration> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
