//! Model Provider Abstraction
//!
//! The generative service behind the pipeline: a chat-completion endpoint that
//! takes a system and a user message and returns raw text. The pipeline only
//! relies on the request/response shape; any OpenAI-compatible endpoint works.

use crate::config::{Credential, ProviderConfig};
use crate::error::ForgeError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Completion options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub temperature: Option<f32>, // 0.0-2.0
    pub max_tokens: Option<u32>,  // output ceiling
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: Some(0.7),
            max_tokens: Some(8000),
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
    pub finish_reason: Option<String>,
}

impl CompletionResponse {
    /// True when the service stopped because it hit the output ceiling.
    pub fn was_truncated(&self) -> bool {
        self.finish_reason.as_deref() == Some("length")
    }
}

/// Model provider client trait
#[async_trait]
pub trait ModelProviderClient: Send + Sync {
    /// Generate a completion from a list of messages
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, ForgeError>;

    /// Get the provider name
    fn provider_name(&self) -> &str;

    /// Get the model name
    fn model_name(&self) -> &str;
}

// OpenAI-compatible API request/response structures
#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    model: String,
    choices: Vec<Choice>,
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

fn role_to_string(role: MessageRole) -> &'static str {
    match role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    }
}

// Transport-level failures (no HTTP status to inspect)
fn map_http_error(error: reqwest::Error) -> ForgeError {
    if let Some(status) = error.status() {
        map_status_error(status, &error.to_string())
    } else if error.is_timeout() {
        ForgeError::ProviderRequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ForgeError::ProviderRequestFailed(format!("Connection error: {}", error))
    } else {
        ForgeError::ProviderError(format!("HTTP error: {}", error))
    }
}

fn map_status_error(status: StatusCode, body: &str) -> ForgeError {
    match status.as_u16() {
        401 | 403 => ForgeError::ProviderAuthFailed(format!("Authentication failed: {}", body)),
        429 => ForgeError::ProviderRateLimit(format!("Rate limit exceeded: {}", body)),
        404 => ForgeError::ProviderModelNotFound(format!("Model not found: {}", body)),
        _ => ForgeError::ProviderRequestFailed(format!(
            "Request failed with status {}: {}",
            status, body
        )),
    }
}

const PROVIDER_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

fn build_provider_http_client(request_timeout: Duration) -> Result<Client, ForgeError> {
    Client::builder()
        .connect_timeout(PROVIDER_HTTP_CONNECT_TIMEOUT)
        .timeout(request_timeout)
        .build()
        .map_err(|e| ForgeError::ProviderError(format!("Failed to create HTTP client: {}", e)))
}

/// OpenAI-compatible chat-completion client
pub struct OpenAIClient {
    client: Client,
    model: String,
    credential: Credential,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(
        model: String,
        credential: Credential,
        base_url: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, ForgeError> {
        let client = build_provider_http_client(request_timeout)?;
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            model,
            credential,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: messages
                .into_iter()
                .map(|msg| OpenAIMessage {
                    role: role_to_string(msg.role),
                    content: msg.content,
                })
                .collect(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stream: false,
        }
    }
}

#[async_trait]
impl ModelProviderClient for OpenAIClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, ForgeError> {
        let request = self.build_request(messages, options);

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.credential.expose())
            .json(&request)
            .send()
            .await
            .map_err(map_http_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_status_error(status, &error_text));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ForgeError::ProviderError(format!("Failed to parse response: {}", e)))?;

        completion_from_wire(completion)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn completion_from_wire(
    completion: ChatCompletionResponse,
) -> Result<CompletionResponse, ForgeError> {
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ForgeError::ProviderError("No choices in response".to_string()))?;

    Ok(CompletionResponse {
        content: choice.message.content.unwrap_or_default(),
        model: completion.model,
        usage: completion.usage.unwrap_or_default(),
        finish_reason: choice.finish_reason,
    })
}

/// Provider factory for creating provider clients
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_client(
        config: &ProviderConfig,
        credential: Credential,
    ) -> Result<Box<dyn ModelProviderClient>, ForgeError> {
        Ok(Box::new(OpenAIClient::new(
            config.model.clone(),
            credential,
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAIClient {
        OpenAIClient::new(
            "gpt-4o".to_string(),
            Credential::new("test-key"),
            Some("http://localhost:8080/v1/".to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_request_shape() {
        let request = client().build_request(
            vec![ChatMessage::system("standards"), ChatMessage::user("topic")],
            CompletionOptions::default(),
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4o");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "topic");
        assert_eq!(value["max_tokens"], 8000);
        assert_eq!(value["stream"], false);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(client().base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            map_status_error(StatusCode::UNAUTHORIZED, "bad key"),
            ForgeError::ProviderAuthFailed(_)
        ));
        assert!(matches!(
            map_status_error(StatusCode::TOO_MANY_REQUESTS, "slow down"),
            ForgeError::ProviderRateLimit(_)
        ));
        assert!(matches!(
            map_status_error(StatusCode::NOT_FOUND, "no model"),
            ForgeError::ProviderModelNotFound(_)
        ));
        assert!(matches!(
            map_status_error(StatusCode::BAD_GATEWAY, "upstream"),
            ForgeError::ProviderRequestFailed(_)
        ));
    }

    #[test]
    fn test_completion_from_wire() {
        let wire: ChatCompletionResponse = serde_json::from_str(
            r#"{
                "id": "chatcmpl-1",
                "model": "gpt-4o-2024",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "{}"}, "finish_reason": "length"}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 8000, "total_tokens": 8010}
            }"#,
        )
        .unwrap();
        let response = completion_from_wire(wire).unwrap();
        assert_eq!(response.content, "{}");
        assert!(response.was_truncated());
        assert_eq!(response.usage.completion_tokens, 8000);
    }

    #[test]
    fn test_null_content_and_missing_choices() {
        let wire: ChatCompletionResponse = serde_json::from_str(
            r#"{"model": "m", "choices": [{"message": {"content": null}, "finish_reason": "stop"}]}"#,
        )
        .unwrap();
        assert_eq!(completion_from_wire(wire).unwrap().content, "");

        let empty: ChatCompletionResponse =
            serde_json::from_str(r#"{"model": "m", "choices": []}"#).unwrap();
        assert!(completion_from_wire(empty).is_err());
    }

    #[test]
    fn test_provider_factory_openai() {
        let config = ProviderConfig::default();
        let client = ProviderFactory::create_client(&config, Credential::new("k")).unwrap();
        assert_eq!(client.provider_name(), "openai");
        assert_eq!(client.model_name(), "gpt-4o");
    }

    #[test]
    fn test_message_role_serialization() {
        let role = MessageRole::System;
        let serialized = serde_json::to_string(&role).unwrap();
        let deserialized: MessageRole = serde_json::from_str(&serialized).unwrap();
        assert_eq!(role, deserialized);
    }
}
