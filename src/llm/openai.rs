//! `OpenAI` client.

use super::LlmProvider;
use crate::config::LlmConfig;
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// `OpenAI` chat completions client.
pub struct OpenAiClient {
    /// API key.
    api_key: Option<SecretString>,
    /// API endpoint.
    endpoint: String,
    /// Model to use.
    model: String,
    /// Completion token limit.
    max_tokens: u32,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl OpenAiClient {
    /// Default API endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.openai.com/v1";

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";

    /// Default completion token limit.
    pub const DEFAULT_MAX_TOKENS: u32 = 300;

    /// Creates a new `OpenAI` client, reading the key from `OPENAI_API_KEY`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok().map(SecretString::from),
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Creates a client from configuration, falling back to defaults.
    #[must_use]
    pub fn from_config(config: &LlmConfig) -> Self {
        let mut client = Self::new();
        if let Some(endpoint) = &config.endpoint {
            client = client.with_endpoint(endpoint.clone());
        }
        if let Some(model) = &config.model {
            client = client.with_model(model.clone());
        }
        if let Some(key) = &config.api_key {
            client.api_key = Some(key.clone());
        }
        client.with_max_tokens(config.max_tokens)
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Sets the API endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the completion token limit.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Validates that the client is configured.
    fn validate(&self) -> Result<&SecretString> {
        self.api_key.as_ref().ok_or_else(|| Error::OperationFailed {
            operation: "openai_request".to_string(),
            cause: "OPENAI_API_KEY not set".to_string(),
        })
    }

    /// Checks if the model takes `max_completion_tokens` and no temperature.
    fn is_reasoning_model(&self) -> bool {
        self.model.starts_with("gpt-5") || self.model.starts_with("o1") || self.model.starts_with("o3")
    }

    fn build_request(&self, messages: Vec<ChatMessage>) -> ChatCompletionRequest {
        if self.is_reasoning_model() {
            ChatCompletionRequest {
                model: self.model.clone(),
                messages,
                max_tokens: None,
                max_completion_tokens: Some(self.max_tokens),
                temperature: None,
            }
        } else {
            ChatCompletionRequest {
                model: self.model.clone(),
                messages,
                max_tokens: Some(self.max_tokens),
                max_completion_tokens: None,
                temperature: Some(0.7),
            }
        }
    }

    /// Makes a request to the `OpenAI` API.
    fn request(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let api_key = self.validate()?;
        let request = self.build_request(messages);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(api_key.expose_secret())
            .json(&request)
            .send()
            .map_err(|e| Error::OperationFailed {
                operation: "openai_request".to_string(),
                cause: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::OperationFailed {
                operation: "openai_request".to_string(),
                cause: format!("API returned status: {status} - {body}"),
            });
        }

        let response: ChatCompletionResponse =
            response.json().map_err(|e| Error::OperationFailed {
                operation: "openai_response".to_string(),
                cause: e.to_string(),
            })?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::OperationFailed {
                operation: "openai_response".to_string(),
                cause: "No choices in response".to_string(),
            })
    }
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmProvider for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[tracing::instrument(skip(self, prompt), fields(provider = "openai", model = %self.model, prompt_len = prompt.len()))]
    fn complete(&self, prompt: &str) -> Result<String> {
        self.request(vec![ChatMessage::new("user", prompt)])
    }

    #[tracing::instrument(skip(self, system, user), fields(provider = "openai", model = %self.model, prompt_len = user.len()))]
    fn complete_with_system(&self, system: &str, user: &str) -> Result<String> {
        self.request(vec![
            ChatMessage::new("system", system),
            ChatMessage::new("user", user),
        ])
    }
}

/// Request to the Chat Completions API.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// A message in the chat.
#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

/// Response from the Chat Completions API.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

/// A choice in the response.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_configuration() {
        let client = OpenAiClient::new()
            .with_api_key("test-key")
            .with_endpoint("https://custom.endpoint/")
            .with_model("gpt-4o")
            .with_max_tokens(120);

        assert_eq!(client.name(), "openai");
        assert_eq!(client.endpoint, "https://custom.endpoint");
        assert_eq!(client.model(), "gpt-4o");
        assert_eq!(client.max_tokens, 120);
        assert!(client.validate().is_ok());
    }

    #[test]
    fn test_from_config() {
        let config = LlmConfig {
            model: Some("gpt-4.1-mini".to_string()),
            api_key: Some(SecretString::from("sk-test".to_string())),
            ..LlmConfig::default()
        };
        let client = OpenAiClient::from_config(&config);
        assert_eq!(client.model(), "gpt-4.1-mini");
        assert_eq!(client.endpoint, OpenAiClient::DEFAULT_ENDPOINT);
        assert_eq!(client.max_tokens, 300);
        assert!(client.validate().is_ok());
    }

    #[test]
    fn test_validate_no_key() {
        let mut client = OpenAiClient::new();
        client.api_key = None;
        assert!(client.validate().is_err());
        assert!(client.complete("hola").is_err());
    }

    #[test]
    fn test_request_shape_by_model_family() {
        let client = OpenAiClient::new().with_max_tokens(200);
        let request = client.build_request(vec![ChatMessage::new("user", "hola")]);
        assert_eq!(request.max_tokens, Some(200));
        assert!(request.max_completion_tokens.is_none());

        let client = client.with_model("o3-mini");
        let request = client.build_request(vec![]);
        assert_eq!(request.max_completion_tokens, Some(200));
        assert!(request.temperature.is_none());
    }
}
