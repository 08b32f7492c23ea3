//! Completion API client.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Environment variable holding the completion API key.
pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";

/// Errors from completion requests.
#[derive(Debug, Error)]
pub enum ResearchError {
    /// No API key was provided or found in the environment.
    #[error("API key not found, set {API_KEY_VAR}")]
    MissingApiKey,

    /// HTTP transport or decoding failure.
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("completion API returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        message: String,
    },

    /// The API answered successfully but carried no completion text.
    #[error("completion response carried no content")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct WebSearchOptions {
    search_context_size: &'static str,
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    web_search_options: Option<WebSearchOptions>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Blocking client for a chat-completions endpoint.
pub struct CompletionClient {
    http: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl CompletionClient {
    /// Creates a client for the given endpoint and model.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ResearchError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("bughound/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// Creates a client taking the API key from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the key variable is unset or the HTTP client
    /// cannot be built.
    pub fn from_env(
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ResearchError> {
        let api_key = std::env::var(API_KEY_VAR).map_err(|_| ResearchError::MissingApiKey)?;
        Self::new(base_url, model, api_key)
    }

    /// Sends one prompt and returns the completion text.
    ///
    /// With `web_search` set, the request asks the provider for
    /// high-context search augmentation.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or a
    /// response without content.
    pub fn complete(&self, prompt: &str, web_search: bool) -> Result<String, ResearchError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            web_search_options: web_search.then_some(WebSearchOptions {
                search_context_size: "high",
            }),
        };

        info!("requesting completion from {} ({})", self.base_url, self.model);
        let response = self
            .http
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResearchError::Api {
                status: status.as_u16(),
                message: response.text().unwrap_or_default(),
            });
        }

        let completion: CompletionResponse = response.json()?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(ResearchError::EmptyResponse)
    }
}
