//! AI layer: remote completion client and the retrying compliance invoker.

mod client;
mod error;
mod groq;
mod invoker;
pub mod retry;

pub use client::CompletionClient;
pub use error::{InvokeError, UpstreamFailure};
pub use groq::{DEFAULT_BASE_URL, DEFAULT_MODEL, GroqClient, GroqConfig};
pub use invoker::Invoker;
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
