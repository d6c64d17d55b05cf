//! OpenAI chat-completions client.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, error};

use crate::error::{ModelError, Result};
use crate::{ChatModel, ChatRequest, Role};

/// A [`ChatModel`] backed by the OpenAI chat completions API.
///
/// Also works against OpenAI-compatible endpoints via
/// [`compatible`](OpenAIChatModel::compatible).
#[derive(Debug)]
pub struct OpenAIChatModel {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAIChatModel {
    /// Create a new client with the given API key and model name.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ModelError::Config("OpenAI API key must not be empty".into()));
        }
        let model = model.into();
        if model.is_empty() {
            return Err(ModelError::Config("model name must not be empty".into()));
        }

        let config = OpenAIConfig::new().with_api_key(api_key);
        Ok(Self { client: Client::with_config(config), model })
    }

    /// Create a new client using the `OPENAI_API_KEY` environment variable.
    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ModelError::Config("OPENAI_API_KEY environment variable not set".into())
        })?;
        Self::new(api_key, model)
    }

    /// Create a client for an OpenAI-compatible API at a custom base URL.
    pub fn compatible(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ModelError::Config("API key must not be empty".into()));
        }
        let config = OpenAIConfig::new().with_api_key(api_key).with_api_base(base_url.into());
        Ok(Self { client: Client::with_config(config), model: model.into() })
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: ChatRequest) -> Result<String> {
        let map_build_err = |e: async_openai::error::OpenAIError| ModelError::Generation {
            provider: "OpenAI".into(),
            message: format!("failed to build request: {e}"),
        };

        // Convert messages
        let mut messages: Vec<ChatCompletionRequestMessage> =
            Vec::with_capacity(request.messages.len());
        for message in &request.messages {
            let converted = match message.role {
                Role::System => ChatCompletionRequestSystemMessageArgs::default()
                    .content(message.content.as_str())
                    .build()
                    .map_err(map_build_err)?
                    .into(),
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(message.content.as_str())
                    .build()
                    .map_err(map_build_err)?
                    .into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(message.content.as_str())
                    .build()
                    .map_err(map_build_err)?
                    .into(),
            };
            messages.push(converted);
        }

        // Build request
        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder.model(&self.model).messages(messages);
        if let Some(temperature) = request.temperature {
            request_builder.temperature(temperature);
        }
        if let Some(max_tokens) = request.max_output_tokens {
            request_builder.max_tokens(max_tokens);
        }

        let openai_request = request_builder.build().map_err(map_build_err)?;

        debug!(model = %self.model, messages = request.messages.len(), "chat completion request");

        let response = self.client.chat().create(openai_request).await.map_err(|e| {
            error!(model = %self.model, error = %e, "OpenAI API error");
            ModelError::Generation { provider: "OpenAI".into(), message: e.to_string() }
        })?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| ModelError::Generation {
                provider: "OpenAI".into(),
                message: "API returned an empty completion".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_api_key() {
        let err = OpenAIChatModel::new("", "gpt-4").unwrap_err();
        assert!(matches!(err, ModelError::Config(_)));
    }

    #[test]
    fn rejects_empty_model_name() {
        let err = OpenAIChatModel::new("sk-test", "").unwrap_err();
        assert!(matches!(err, ModelError::Config(_)));
    }
}
