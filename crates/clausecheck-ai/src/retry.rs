//! Backoff policy for rate-limited completion calls.
//!
//! The delay math is pure ([`RetryPolicy::compute_delay`], [`RetryPolicy::jittered`]);
//! the only side effect is the suspension, which goes through [`Sleeper`] so
//! tests can record delays instead of waiting them out.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use regex::Regex;

/// Jitter spread as a fraction of the computed delay (±10%).
pub const JITTER_RATIO: f64 = 0.1;

static RETRY_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:retry|try again)\s+in\s+([\d.]+)s").expect("retry hint pattern is valid")
});

/// Bounded exponential backoff.
///
/// Attempts are zero-indexed: attempt 0 is the initial call, so at most
/// `max_retries + 1` calls are made.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(2_000),
            max_delay: Duration::from_millis(60_000),
            backoff_multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Pre-jitter delay after a rate-limited `attempt`.
    ///
    /// `min(max(base * multiplier^attempt, server_suggested), max_delay)`
    pub fn compute_delay(&self, attempt: u32, server_suggested: Option<Duration>) -> Duration {
        let factor = self.backoff_multiplier.saturating_pow(attempt);
        let mut delay = self.base_delay.saturating_mul(factor);
        if let Some(suggested) = server_suggested {
            delay = delay.max(suggested);
        }
        delay.min(self.max_delay)
    }

    /// Apply jitter to `delay`. `unit` is a sample from `[-1, 1]`; the result
    /// is rounded to the nearest millisecond.
    pub fn jittered(delay: Duration, unit: f64) -> Duration {
        let unit = unit.clamp(-1.0, 1.0);
        let ms = delay.as_millis() as f64;
        Duration::from_millis((ms + ms * JITTER_RATIO * unit).round() as u64)
    }

    /// Jittered delay for the next retry, using the thread RNG.
    pub fn next_delay(&self, attempt: u32, server_suggested: Option<Duration>) -> Duration {
        let unit: f64 = rand::thread_rng().gen_range(-1.0..=1.0);
        Self::jittered(self.compute_delay(attempt, server_suggested), unit)
    }
}

/// Whether an error message describes rate limiting (case-insensitive).
pub fn is_rate_limit_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("429")
        || lower.contains("too many requests")
        || lower.contains("quota")
        || lower.contains("rate limit")
        || lower.contains("rate_limit")
}

/// Parse a "retry in N s" hint, rounding up to whole milliseconds.
///
/// Also accepts "try again in N s", the phrasing Groq uses.
pub fn parse_retry_after(message: &str) -> Option<Duration> {
    let caps = RETRY_HINT.captures(message)?;
    let secs: f64 = caps[1].parse().ok()?;
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    Some(Duration::from_millis((secs * 1000.0).ceil() as u64))
}

/// Suspension primitive used between retry attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

/// Suspends on the Tokio timer without blocking the worker thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn default_policy() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_retries, 3);
        assert_eq!(p.base_delay, ms(2000));
        assert_eq!(p.max_delay, ms(60_000));
        assert_eq!(p.backoff_multiplier, 2);
    }

    #[test]
    fn exponential_delays() {
        let p = RetryPolicy::default();
        assert_eq!(p.compute_delay(0, None), ms(2000));
        assert_eq!(p.compute_delay(1, None), ms(4000));
        assert_eq!(p.compute_delay(2, None), ms(8000));
    }

    #[test]
    fn delays_are_monotonic_and_capped() {
        let p = RetryPolicy::default();
        let mut prev = Duration::ZERO;
        for attempt in 0..40 {
            let d = p.compute_delay(attempt, None);
            assert!(d >= prev, "attempt {attempt} decreased");
            assert!(d <= p.max_delay);
            prev = d;
        }
        assert_eq!(p.compute_delay(10, None), p.max_delay);
    }

    #[test]
    fn server_hint_raises_delay() {
        let p = RetryPolicy::default();
        assert_eq!(p.compute_delay(0, Some(ms(5500))), ms(5500));
        // Hint below the computed backoff is ignored.
        assert_eq!(p.compute_delay(2, Some(ms(5500))), ms(8000));
        // Hint above the cap is capped.
        assert_eq!(p.compute_delay(0, Some(ms(120_000))), ms(60_000));
    }

    #[test]
    fn jitter_bounds() {
        let d = ms(8000);
        assert_eq!(RetryPolicy::jittered(d, 1.0), ms(8800));
        assert_eq!(RetryPolicy::jittered(d, -1.0), ms(7200));
        assert_eq!(RetryPolicy::jittered(d, 0.0), d);
        assert_eq!(RetryPolicy::jittered(d, 5.0), ms(8800));
        assert_eq!(RetryPolicy::jittered(ms(1234), 0.5), ms(1296));
    }

    #[test]
    fn sampled_jitter_stays_within_ten_percent() {
        let p = RetryPolicy::default();
        for attempt in 0..3 {
            let base = p.compute_delay(attempt, None).as_millis() as f64;
            for _ in 0..200 {
                let d = p.next_delay(attempt, None).as_millis() as f64;
                assert!(d >= (base * 0.9).floor() && d <= (base * 1.1).ceil());
            }
        }
    }

    #[test]
    fn parses_retry_hint() {
        assert_eq!(parse_retry_after("retry in 5.5s"), Some(ms(5500)));
        assert_eq!(parse_retry_after("Please RETRY IN 12s."), Some(ms(12_000)));
        assert_eq!(
            parse_retry_after("Please try again in 7.5s. Visit ..."),
            Some(ms(7500))
        );
        assert_eq!(parse_retry_after("retry in 0.0001s"), Some(ms(1)));
        assert_eq!(parse_retry_after("retry later"), None);
        assert_eq!(parse_retry_after("retry in .s"), None);
    }

    #[test]
    fn rate_limit_substrings() {
        assert!(is_rate_limit_message("HTTP 429"));
        assert!(is_rate_limit_message("Too Many Requests"));
        assert!(is_rate_limit_message("quota exceeded"));
        assert!(is_rate_limit_message("Rate limit reached"));
        assert!(is_rate_limit_message("code: rate_limit_exceeded"));
        assert!(!is_rate_limit_message("invalid_api_key"));
        assert!(!is_rate_limit_message("internal server error"));
    }
}
