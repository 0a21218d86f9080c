//! Bounded polling with backoff.
//!
//! Replaces a sleep-in-a-loop with an explicit policy: the probe runs once
//! immediately, then after each sleep until it yields a value, the deadline
//! passes, or the cancellation token fires.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

const DEFAULT_INTERVAL_MS: u64 = 500;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
// Stand-in deadline for timeouts too large to add to `Instant::now()`.
const FAR_DEADLINE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub initial_interval: Duration,
    /// Growth factor applied to the interval after each attempt. `1.0` keeps
    /// it fixed.
    pub multiplier: f64,
    pub max_interval: Duration,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            multiplier: 1.0,
            max_interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl PollPolicy {
    pub fn fixed(interval: Duration, timeout: Duration) -> Self {
        Self {
            initial_interval: interval,
            multiplier: 1.0,
            max_interval: interval,
            timeout,
        }
    }

    /// Interval to use after `current`, capped at `max_interval`.
    pub fn next_interval(&self, current: Duration) -> Duration {
        let multiplier = if self.multiplier.is_finite() && self.multiplier >= 1.0 {
            self.multiplier
        } else {
            1.0
        };
        Duration::try_from_secs_f64(current.as_secs_f64() * multiplier)
            .unwrap_or(Duration::MAX)
            .min(self.max_interval.max(self.initial_interval))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<T> {
    Ready(T),
    TimedOut,
    Cancelled,
}

/// Run `probe` until it returns `Ok(Some(_))`.
///
/// A probe error stops polling and is returned as-is.
pub async fn poll_until<T, E, F, Fut>(
    policy: &PollPolicy,
    cancel: &CancellationToken,
    mut probe: F,
) -> Result<PollOutcome<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let started = Instant::now();
    let deadline = started
        .checked_add(policy.timeout)
        .unwrap_or_else(|| started + FAR_DEADLINE);
    let mut interval = policy.initial_interval;
    let mut attempts: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return Ok(PollOutcome::Cancelled);
        }

        attempts += 1;
        if let Some(value) = probe().await? {
            log::debug!("Poll ready after {} attempt(s)", attempts);
            return Ok(PollOutcome::Ready(value));
        }

        let now = Instant::now();
        if now >= deadline {
            log::debug!("Poll timed out after {} attempt(s)", attempts);
            return Ok(PollOutcome::TimedOut);
        }

        let pause = interval.min(deadline - now);
        tokio::select! {
            _ = cancel.cancelled() => return Ok(PollOutcome::Cancelled),
            _ = sleep(pause) => {}
        }
        interval = policy.next_interval(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn quick_policy(timeout_ms: u64) -> PollPolicy {
        PollPolicy::fixed(Duration::from_millis(5), Duration::from_millis(timeout_ms))
    }

    #[test]
    fn test_default_policy_is_half_second_for_thirty_seconds() {
        let policy = PollPolicy::default();
        assert_eq!(policy.initial_interval, Duration::from_millis(500));
        assert_eq!(policy.timeout, Duration::from_secs(30));
        assert_eq!(
            policy.next_interval(policy.initial_interval),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = PollPolicy {
            initial_interval: Duration::from_millis(100),
            multiplier: 2.0,
            max_interval: Duration::from_millis(300),
            timeout: Duration::from_secs(1),
        };
        let second = policy.next_interval(policy.initial_interval);
        assert_eq!(second, Duration::from_millis(200));
        assert_eq!(policy.next_interval(second), Duration::from_millis(300));
    }

    #[test]
    fn test_bad_multiplier_keeps_interval_fixed() {
        let policy = PollPolicy {
            initial_interval: Duration::from_millis(100),
            multiplier: 0.25,
            max_interval: Duration::from_millis(100),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(
            policy.next_interval(Duration::from_millis(100)),
            Duration::from_millis(100)
        );
    }

    #[actix_rt::test]
    async fn test_ready_on_third_probe() {
        let calls = Cell::new(0);
        let outcome: Result<PollOutcome<&str>, ()> =
            poll_until(&quick_policy(1_000), &CancellationToken::new(), || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move { Ok(if n >= 3 { Some("completed") } else { None }) }
            })
            .await;

        assert_eq!(outcome, Ok(PollOutcome::Ready("completed")));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_huge_backoff_does_not_overflow() {
        let policy = PollPolicy {
            initial_interval: Duration::MAX,
            multiplier: 4.0,
            max_interval: Duration::MAX,
            timeout: Duration::from_secs(1),
        };
        assert_eq!(policy.next_interval(Duration::MAX), Duration::MAX);
    }

    #[actix_rt::test]
    async fn test_unbounded_timeout_still_polls() {
        let policy = PollPolicy::fixed(Duration::from_millis(5), Duration::from_secs(u64::MAX));
        let calls = Cell::new(0);
        let outcome: Result<PollOutcome<u32>, ()> =
            poll_until(&policy, &CancellationToken::new(), || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move { Ok((n >= 2).then_some(n)) }
            })
            .await;

        assert_eq!(outcome, Ok(PollOutcome::Ready(2)));
    }

    #[actix_rt::test]
    async fn test_times_out_when_never_ready() {
        let started = Instant::now();
        let outcome: Result<PollOutcome<()>, ()> =
            poll_until(&quick_policy(40), &CancellationToken::new(), || async {
                Ok(None)
            })
            .await;

        assert_eq!(outcome, Ok(PollOutcome::TimedOut));
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[actix_rt::test]
    async fn test_cancelled_token_stops_before_probing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let calls = Cell::new(0);

        let outcome: Result<PollOutcome<()>, ()> =
            poll_until(&quick_policy(1_000), &cancel, || {
                calls.set(calls.get() + 1);
                async { Ok(None) }
            })
            .await;

        assert_eq!(outcome, Ok(PollOutcome::Cancelled));
        assert_eq!(calls.get(), 0);
    }

    #[actix_rt::test]
    async fn test_cancellation_interrupts_sleep() {
        let cancel = CancellationToken::new();
        let policy = PollPolicy::fixed(Duration::from_secs(10), Duration::from_secs(60));
        let trigger = cancel.clone();
        actix_rt::spawn(async move {
            sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let outcome: Result<PollOutcome<()>, ()> =
            poll_until(&policy, &cancel, || async { Ok(None) }).await;

        assert_eq!(outcome, Ok(PollOutcome::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[actix_rt::test]
    async fn test_probe_error_is_returned() {
        let outcome: Result<PollOutcome<()>, String> =
            poll_until(&quick_policy(1_000), &CancellationToken::new(), || async {
                Err("run failed".to_string())
            })
            .await;

        assert_eq!(outcome, Err("run failed".to_string()));
    }
}
