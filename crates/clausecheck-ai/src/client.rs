use async_trait::async_trait;
use clausecheck_core::Prompts;

use crate::UpstreamFailure;

/// A remote structured-completion endpoint.
///
/// Implementations send the system and user prompts in JSON-object output
/// mode and return the model's textual payload unparsed. Failures must be
/// classified into [`UpstreamFailure`] so the invoker can decide whether to retry.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompts: &Prompts) -> Result<String, UpstreamFailure>;
}

#[async_trait]
impl<C: CompletionClient + ?Sized> CompletionClient for std::sync::Arc<C> {
    async fn complete(&self, prompts: &Prompts) -> Result<String, UpstreamFailure> {
        (**self).complete(prompts).await
    }
}
