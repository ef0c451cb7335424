//! The generation-service seam.
//!
//! [`ChatModel`] is the only way the rest of the crate talks to an LLM: given
//! an ordered list of messages it returns exactly one assistant text.
//! [`OpenRouterModel`] is the production implementation on top of
//! [`OpenRouterClient`].

use std::future::Future;
use std::pin::Pin;

use crate::agent::config::ChatConfig;
use crate::{ChatError, ChatRequest, Message, OpenRouterClient};

/// Boxed future returned by [`ChatModel::complete`].
pub type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<String, ChatError>> + Send + 'a>>;

/// A text-generation service.
///
/// Implementations must return one non-empty assistant text per call or an
/// error. Failures are never retried by callers.
pub trait ChatModel: Send + Sync {
    /// Model identifier, for logging.
    fn name(&self) -> &str;

    /// Generate a reply to `messages`.
    fn complete<'a>(&'a self, messages: &'a [Message]) -> CompletionFuture<'a>;
}

/// [`ChatModel`] backed by a chat completions endpoint.
pub struct OpenRouterModel {
    client: OpenRouterClient,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenRouterModel {
    pub fn new(client: OpenRouterClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens: 0,
            temperature: 0.0,
        }
    }

    /// Build a model using the sampling settings from `config`.
    pub fn from_config(client: OpenRouterClient, config: &ChatConfig) -> Self {
        Self::new(client, config.model.clone())
            .with_max_tokens(config.max_tokens)
            .with_temperature(config.temperature)
    }

    /// Maximum tokens per reply. `0` leaves the limit to the provider.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

impl ChatModel for OpenRouterModel {
    fn name(&self) -> &str {
        &self.model
    }

    fn complete<'a>(&'a self, messages: &'a [Message]) -> CompletionFuture<'a> {
        Box::pin(async move {
            let body = ChatRequest {
                model: self.model.clone(),
                messages: messages.to_vec(),
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            };
            let completion = self.client.chat(&body).await?;
            completion
                .content
                .filter(|text| !text.trim().is_empty())
                .ok_or(ChatError::EmptyCompletion)
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedModel;
    use super::*;

    #[tokio::test]
    async fn scripted_model_replays_queue_then_numbers() {
        let model = ScriptedModel::new().with_reply("first");
        let messages = vec![Message::user("hi")];
        assert_eq!(model.complete(&messages).await.unwrap(), "first");
        assert_eq!(model.complete(&messages).await.unwrap(), "reply 2");
        assert_eq!(model.requests().len(), 2);
    }

    #[tokio::test]
    async fn scripted_model_failure_is_an_api_error() {
        let model = ScriptedModel::new().with_failure("overloaded");
        let err = model.complete(&[Message::user("hi")]).await.unwrap_err();
        assert!(matches!(err, ChatError::Api { status: 503, .. }));
    }

    #[test]
    fn openrouter_model_takes_sampling_from_config() {
        let config = ChatConfig::new("some/model", "sys")
            .with_max_tokens(256)
            .with_temperature(0.4);
        let model = OpenRouterModel::from_config(OpenRouterClient::new("key").unwrap(), &config);
        assert_eq!(model.name(), "some/model");
        assert_eq!(model.max_tokens, 256);
        assert!((model.temperature - 0.4).abs() < f32::EPSILON);
    }
}
