//! Generation client: one request/response exchange per specification.

use crate::artifact::Artifact;
use crate::catalog::Specification;
use crate::error::ForgeError;
use crate::generation::prompt::PromptBuilder;
use crate::generation::response::parse_artifact;
use crate::provider::{ChatMessage, CompletionOptions, ModelProviderClient};
use tracing::debug;

/// Produces an artifact for a specification.
///
/// Implementations never write to storage and never retry.
#[allow(async_fn_in_trait)]
pub trait ArtifactGenerator {
    async fn generate(&self, spec: &Specification) -> Result<Artifact, ForgeError>;
}

/// Generator backed by a model provider.
pub struct GenerationClient {
    provider: Box<dyn ModelProviderClient>,
    prompts: PromptBuilder,
    options: CompletionOptions,
}

impl GenerationClient {
    pub fn new(
        provider: Box<dyn ModelProviderClient>,
        prompts: PromptBuilder,
        options: CompletionOptions,
    ) -> Self {
        Self {
            provider,
            prompts,
            options,
        }
    }

    pub fn provider(&self) -> &dyn ModelProviderClient {
        self.provider.as_ref()
    }

    fn messages(&self, spec: &Specification) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.prompts.system_prompt()),
            ChatMessage::user(self.prompts.user_prompt(spec)),
        ]
    }
}

impl ArtifactGenerator for GenerationClient {
    async fn generate(&self, spec: &Specification) -> Result<Artifact, ForgeError> {
        let response = self
            .provider
            .complete(self.messages(spec), self.options.clone())
            .await?;

        debug!(
            id = %spec.id,
            model = %response.model,
            completion_tokens = response.usage.completion_tokens,
            finish_reason = ?response.finish_reason,
            "Received completion"
        );

        let mut artifact = parse_artifact(&response.content, response.was_truncated())?;
        artifact.normalize_generated();
        Ok(artifact)
    }
}
