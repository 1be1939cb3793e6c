//! Groq chat-completions client (OpenAI-compatible API).

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use clausecheck_core::Prompts;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::retry::parse_retry_after;
use crate::{CompletionClient, UpstreamFailure};

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Connection settings for [`GroqClient`]. Built once at startup.
#[derive(Clone)]
pub struct GroqConfig {
    pub api_key: String,
    pub model: String,
    /// Like `https://api.groq.com/openai/v1` (no trailing slash needed).
    pub base_url: String,
    pub temperature: f32,
    /// Per-request transport timeout. Retries are not covered by it.
    pub timeout: Duration,
}

impl GroqConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.1,
            timeout: Duration::from_secs(120),
        }
    }
}

impl fmt::Debug for GroqConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroqConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: u64,
}

/// HTTP client for Groq's `/chat/completions` endpoint.
pub struct GroqClient {
    client: reqwest::Client,
    config: GroqConfig,
    endpoint: String,
}

impl GroqClient {
    pub fn new(config: GroqConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn request_body<'a>(&'a self, prompts: &'a Prompts) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompts.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompts.user,
                },
            ],
            temperature: self.config.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        }
    }
}

#[async_trait]
impl CompletionClient for GroqClient {
    async fn complete(&self, prompts: &Prompts) -> Result<String, UpstreamFailure> {
        info!(model = %self.config.model, prompt_chars = prompts.user.len(), "requesting completion");
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(prompts))
            .send()
            .await
            .map_err(|e| UpstreamFailure::from_message(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let retry_after = header_retry_after(resp.headers());
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), retry_after, body));
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| UpstreamFailure::Other(format!("invalid completion envelope: {e}")))?;
        if let Some(usage) = &parsed.usage {
            debug!(tokens = usage.total_tokens, "completion received");
        }

        // An empty payload fails report parsing downstream.
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

/// Map a non-success HTTP response to a failure class.
///
/// 429 is a rate limit, 401/403 an auth failure; anything else falls back to
/// text classification, since some providers report quota errors with other codes.
fn classify_status(status: u16, retry_after: Option<Duration>, body: String) -> UpstreamFailure {
    match status {
        429 => UpstreamFailure::RateLimited {
            retry_after: retry_after.or_else(|| parse_retry_after(&body)),
            message: format!("429 Too Many Requests: {body}"),
        },
        401 | 403 => UpstreamFailure::Auth(format!("server returned {status}: {body}")),
        _ => UpstreamFailure::from_message(format!("server returned {status}: {body}")),
    }
}

/// `Retry-After` in seconds. HTTP-date values are ignored.
fn header_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let secs: f64 = headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()?;
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    Some(Duration::from_millis((secs * 1000.0).ceil() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn endpoint_trims_trailing_slash() {
        let mut config = GroqConfig::new("gsk_test");
        config.base_url = "http://localhost:8080/v1/".into();
        let client = GroqClient::new(config).unwrap();
        assert_eq!(client.endpoint, "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = GroqConfig::new("gsk_secret");
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("gsk_secret"));
        assert!(dbg.contains(DEFAULT_MODEL));
    }

    #[test]
    fn request_body_shape() {
        let client = GroqClient::new(GroqConfig::new("k")).unwrap();
        let prompts = Prompts {
            system: "sys".into(),
            user: "usr".into(),
        };
        let json = serde_json::to_value(client.request_body(&prompts)).unwrap();
        assert_eq!(json["model"], DEFAULT_MODEL);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "sys");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "usr");
        assert_eq!(json["response_format"]["type"], "json_object");
        assert!((json["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn response_envelope_parses() {
        let json = r#"{
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "{}"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("{}"));
        assert_eq!(parsed.usage.unwrap().total_tokens, 12);
    }

    #[test]
    fn status_429_is_rate_limited() {
        let f = classify_status(429, Some(Duration::from_secs(3)), "slow down".into());
        assert_eq!(
            f,
            UpstreamFailure::RateLimited {
                retry_after: Some(Duration::from_secs(3)),
                message: "429 Too Many Requests: slow down".into(),
            }
        );
    }

    #[test]
    fn status_429_falls_back_to_body_hint() {
        let body = r#"{"error":{"message":"Rate limit reached. Please try again in 2.5s.","code":"rate_limit_exceeded"}}"#;
        let f = classify_status(429, None, body.into());
        assert!(matches!(
            f,
            UpstreamFailure::RateLimited { retry_after: Some(d), .. } if d == Duration::from_millis(2500)
        ));
    }

    #[test]
    fn auth_statuses() {
        assert!(matches!(
            classify_status(401, None, "invalid_api_key".into()),
            UpstreamFailure::Auth(_)
        ));
        assert!(matches!(
            classify_status(403, None, String::new()),
            UpstreamFailure::Auth(_)
        ));
    }

    #[test]
    fn other_statuses_use_text_fallback() {
        assert!(matches!(
            classify_status(500, None, "internal error".into()),
            UpstreamFailure::Other(_)
        ));
        assert!(classify_status(400, None, "monthly quota exhausted".into()).is_rate_limited());
    }

    #[test]
    fn retry_after_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(header_retry_after(&headers), None);
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
        assert_eq!(header_retry_after(&headers), Some(Duration::from_secs(7)));
        headers.insert(RETRY_AFTER, HeaderValue::from_static("1.5"));
        assert_eq!(header_retry_after(&headers), Some(Duration::from_millis(1500)));
        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(header_retry_after(&headers), None);
    }
}
