//! Completion client seam.
//!
//! The session core talks to the model through the [`LLMClient`] trait so
//! the answer pipeline can be exercised against a mock, with
//! [`OpenAICompatibleClient`] as the production implementation for any
//! OpenAI-compatible endpoint.

use crate::history::{Role, Turn};
use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;

/// Failure from the completion boundary. Callers pattern-match on this
/// instead of catching generic errors.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion API error: {0}")]
    Api(#[from] OpenAIError),
    #[error("completion response contained no text")]
    EmptyResponse,
}

/// A client that can turn a shaped request into answer text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Makes a single, non-streaming completion call.
    ///
    /// `turns` is the already-windowed history ending with the user's
    /// question; the instruction payload and sampling bounds come from the
    /// caller's shaping policy.
    async fn complete(
        &self,
        system_prompt: &str,
        turns: &[Turn],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, CompletionError>;
}

/// An implementation of `LLMClient` for any OpenAI-compatible API.
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAICompatibleClient {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the OpenAI client, including API key and base URL.
    /// * `model` - The model identifier to use for chat completions (e.g., "gpt-4o-mini").
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

fn to_request_message(turn: &Turn) -> Result<ChatCompletionRequestMessage, OpenAIError> {
    Ok(match turn.role {
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(turn.content.clone())
            .build()?
            .into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(turn.content.clone())
            .build()?
            .into(),
    })
}

#[async_trait]
impl LLMClient for OpenAICompatibleClient {
    async fn complete(
        &self,
        system_prompt: &str,
        turns: &[Turn],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, CompletionError> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()?
                .into(),
        ];
        for turn in turns {
            messages.push(to_request_message(turn)?);
        }

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_completion_tokens(max_tokens)
            .temperature(temperature)
            .build()?;

        let response = self.client.chat().create(request).await?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or(CompletionError::EmptyResponse)?;

        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_conversion_preserves_roles() {
        let user = to_request_message(&Turn::user("hi")).unwrap();
        assert!(matches!(user, ChatCompletionRequestMessage::User(_)));

        let assistant = to_request_message(&Turn::assistant("hello")).unwrap();
        assert!(matches!(
            assistant,
            ChatCompletionRequestMessage::Assistant(_)
        ));
    }
}
