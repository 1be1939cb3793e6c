//! Retrying compliance invoker.
//!
//! Sends one prompt pair to a [`CompletionClient`], retries rate-limited
//! attempts per [`RetryPolicy`], and parses the payload into a
//! [`ComplianceReport`]. Each call is self-contained: the invoker holds only
//! immutable configuration and can be shared across concurrent tasks.

use clausecheck_core::{ComplianceReport, Prompts, RegulationProfile, build_prompts};
use tracing::{error, info, warn};

use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::{CompletionClient, InvokeError, UpstreamFailure};

pub struct Invoker<C, S = TokioSleeper> {
    client: C,
    policy: RetryPolicy,
    sleeper: S,
}

impl<C: CompletionClient> Invoker<C> {
    /// Invoker with the default policy, sleeping on the Tokio timer.
    pub fn new(client: C) -> Self {
        Self {
            client,
            policy: RetryPolicy::default(),
            sleeper: TokioSleeper,
        }
    }
}

impl<C: CompletionClient, S: Sleeper> Invoker<C, S> {
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the suspension primitive used between attempts.
    pub fn with_sleeper<S2: Sleeper>(self, sleeper: S2) -> Invoker<C, S2> {
        Invoker {
            client: self.client,
            policy: self.policy,
            sleeper,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Build the prompts for a contract and run [`invoke`](Self::invoke).
    pub async fn analyze(
        &self,
        document_text: &str,
        profile: &RegulationProfile,
    ) -> Result<ComplianceReport, InvokeError> {
        let prompts = build_prompts(document_text, profile);
        self.invoke(&prompts).await
    }

    /// Run the completion with retries and parse the result.
    ///
    /// Malformed payloads are never retried.
    pub async fn invoke(&self, prompts: &Prompts) -> Result<ComplianceReport, InvokeError> {
        let payload = self.complete_with_retry(prompts).await?;
        match ComplianceReport::from_json(&payload) {
            Ok(report) => {
                info!(
                    score = report.overall_score,
                    status = report.overall_status.as_str(),
                    findings = report.findings.len(),
                    "compliance report parsed"
                );
                Ok(report)
            }
            Err(source) => {
                error!(error = %source, payload_len = payload.len(), "model returned malformed report");
                Err(InvokeError::MalformedResponse {
                    source,
                    raw: payload,
                })
            }
        }
    }

    async fn complete_with_retry(&self, prompts: &Prompts) -> Result<String, InvokeError> {
        let max_retries = self.policy.max_retries;
        let mut attempt = 0u32;
        loop {
            let (retry_after, message) = match self.client.complete(prompts).await {
                Ok(payload) => {
                    if attempt > 0 {
                        info!(attempts = attempt + 1, "completion succeeded after retries");
                    }
                    return Ok(payload);
                }
                Err(UpstreamFailure::RateLimited {
                    retry_after,
                    message,
                }) => (retry_after, message),
                Err(failure) => {
                    error!(error = %failure, attempt, "upstream failure, not retrying");
                    return Err(InvokeError::Upstream(failure));
                }
            };

            if attempt >= max_retries {
                error!(max_retries, error = %message, "max retries exceeded for rate limit error");
                return Err(InvokeError::RateLimitExhausted {
                    attempts: attempt + 1,
                    retry_after,
                    message,
                });
            }

            let delay = self.policy.next_delay(attempt, retry_after);
            warn!(
                attempt = attempt + 1,
                max_retries,
                delay_ms = delay.as_millis() as u64,
                server_hint_ms = retry_after.map(|d| d.as_millis() as u64),
                "rate limit hit, backing off"
            );
            self.sleeper.sleep(delay).await;
            attempt += 1;
        }
    }
}
