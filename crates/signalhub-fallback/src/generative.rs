//! Client for the generative-text (chat completion) API.
//!
//! Requests ask for a strict JSON-schema response, so the first choice's
//! content can be decoded straight into a caller type.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use signalhub_core::{Classify, ErrorKind};
use signalhub_executor::{RequestError, RequestExecutor, RequestOptions};

#[cfg(feature = "tracing")]
use tracing::debug;

/// Errors returned by [`GenerativeClient`].
#[derive(Debug, thiserror::Error)]
pub enum GenerativeError {
    /// No API key configured; raised before any network access.
    #[error("generative API misconfigured: {0}")]
    Configuration(String),

    #[error(transparent)]
    Request(#[from] RequestError),

    /// The completion had no choices or no content.
    #[error("generative API returned no content")]
    EmptyResponse,

    /// The content was not JSON of the requested shape.
    #[error("generative API content did not match the schema: {0}")]
    InvalidContent(#[source] serde_json::Error),
}

impl Classify for GenerativeError {
    fn kind(&self) -> ErrorKind {
        match self {
            GenerativeError::Configuration(_) => ErrorKind::Configuration,
            GenerativeError::Request(e) => e.kind(),
            GenerativeError::EmptyResponse | GenerativeError::InvalidContent(_) => {
                ErrorKind::Decode
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct Completion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Builder for a [`GenerativeClient`].
pub struct GenerativeConfigBuilder {
    api_key: Option<String>,
    base_url: String,
    model: String,
    executor: Option<RequestExecutor>,
}

impl GenerativeConfigBuilder {
    /// Creates a builder with defaults.
    ///
    /// Defaults:
    /// - no API key (calls fail with a configuration error)
    /// - base_url: `https://api.openai.com/v1`
    /// - model: `gpt-4o-mini`
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            executor: None,
        }
    }

    /// Sets the bearer token.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the API root; `/chat/completions` is appended.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Issues requests through `executor`.
    pub fn executor(mut self, executor: RequestExecutor) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn build(self) -> GenerativeClient {
        GenerativeClient {
            api_key: self.api_key.filter(|key| !key.trim().is_empty()),
            endpoint: format!("{}/chat/completions", self.base_url.trim_end_matches('/')),
            model: self.model,
            executor: self
                .executor
                .unwrap_or_else(|| RequestExecutor::builder().build()),
        }
    }
}

impl Default for GenerativeConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Produces structured JSON from a system and a user prompt.
#[derive(Clone)]
pub struct GenerativeClient {
    api_key: Option<String>,
    endpoint: String,
    model: String,
    executor: RequestExecutor,
}

impl GenerativeClient {
    pub fn builder() -> GenerativeConfigBuilder {
        GenerativeConfigBuilder::new()
    }

    /// Request body for a completion constrained to `schema`.
    pub fn request_body(
        &self,
        system: &str,
        user: &str,
        schema_name: &str,
        schema: &Value,
    ) -> Value {
        json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": schema_name,
                    "strict": true,
                    "schema": schema,
                },
            },
        })
    }

    /// Asks the model for a response matching `schema` and decodes it as `T`.
    pub async fn generate<T>(
        &self,
        system: &str,
        user: &str,
        schema_name: &str,
        schema: &Value,
    ) -> Result<T, GenerativeError>
    where
        T: DeserializeOwned,
    {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GenerativeError::Configuration("API key is not set".to_string()))?;

        let options = RequestOptions::post()
            .header("Authorization", format!("Bearer {api_key}"))
            .json(self.request_body(system, user, schema_name, schema));

        let completion: Completion = self
            .executor
            .execute(&self.endpoint, options, "generative.completion")
            .await?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(GenerativeError::EmptyResponse)?;

        #[cfg(feature = "tracing")]
        debug!(model = %self.model, bytes = content.len(), "completion received");

        serde_json::from_str(&content).map_err(GenerativeError::InvalidContent)
    }
}
