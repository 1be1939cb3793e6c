use std::time::Duration;

use clausecheck_core::ReportError;
use thiserror::Error;

use crate::retry::{is_rate_limit_message, parse_retry_after};

/// Failure reported by a [`CompletionClient`](crate::CompletionClient).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamFailure {
    /// Transient throttling or quota exhaustion. Eligible for retry.
    #[error("rate limited: {message}")]
    RateLimited {
        /// Delay suggested by the server, if it gave one.
        retry_after: Option<Duration>,
        message: String,
    },
    /// Credentials were missing, invalid, or not allowed to use the model.
    #[error("invalid or unauthorised API key: {0}")]
    Auth(String),
    #[error("{0}")]
    Other(String),
}

impl UpstreamFailure {
    /// Classify a failure from its text alone.
    ///
    /// Only for transports that report errors as prose. Rate limits are
    /// recognised by `429`, "too many requests", "quota" or "rate limit";
    /// a "retry in N s" hint becomes `retry_after`.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if is_rate_limit_message(&message) {
            return Self::RateLimited {
                retry_after: parse_retry_after(&message),
                message,
            };
        }
        let lower = message.to_lowercase();
        if lower.contains("api_key") || lower.contains("api key") {
            return Self::Auth(message);
        }
        Self::Other(message)
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// Terminal outcome of a failed [`Invoker::invoke`](crate::Invoker::invoke).
#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("rate limit persisted after {attempts} attempts: {message}")]
    RateLimitExhausted {
        attempts: u32,
        /// Last server-suggested delay, for callers that report a retry time.
        retry_after: Option<Duration>,
        message: String,
    },
    #[error("LLM analysis failed: {0}")]
    Upstream(UpstreamFailure),
    #[error("malformed model response: {source}")]
    MalformedResponse {
        #[source]
        source: ReportError,
        /// Raw payload as received, kept for diagnosis.
        raw: String,
    },
}
