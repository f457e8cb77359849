use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use vigil_core::{LlmConfig, VigilError};

// Sampling is pinned so reviews stay terse and reproducible across runs on
// the same input; only the output cap comes from configuration.
const TEMPERATURE: f64 = 0.0;
const TOP_P: f64 = 1.0;
const FREQUENCY_PENALTY: f64 = 0.0;
const PRESENCE_PENALTY: f64 = 0.0;

/// A completion service that turns a review prompt into generated text.
///
/// The production implementation is [`OpenAiBackend`]; tests substitute
/// in-memory fakes.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send one prompt and return the raw generated text.
    async fn complete(&self, prompt: &str) -> Result<String, VigilError>;

    /// Identifier of the model answering the prompts.
    fn model(&self) -> &str;
}

/// OpenAI-compatible chat completions backend.
///
/// Works with any provider that exposes the `/v1/chat/completions` endpoint:
/// OpenAI, Ollama, vLLM, LiteLLM, etc.
///
/// # Examples
///
/// ```
/// use vigil_core::LlmConfig;
/// use vigil_review::llm::OpenAiBackend;
///
/// let config = LlmConfig {
///     api_key: Some("test-key".into()),
///     ..LlmConfig::default()
/// };
/// let backend = OpenAiBackend::new(&config).unwrap();
/// ```
pub struct OpenAiBackend {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiBackend {
    /// Create a new backend from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Llm`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, VigilError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| VigilError::Llm(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": TEMPERATURE,
            "top_p": TOP_P,
            "max_tokens": self.config.max_output_tokens,
            "frequency_penalty": FREQUENCY_PENALTY,
            "presence_penalty": PRESENCE_PENALTY,
        })
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, prompt: &str) -> Result<String, VigilError> {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("https://api.openai.com");
        let url = format!("{base_url}/v1/chat/completions");

        let mut request = self.client.post(&url);
        if let Some(api_key) = &self.config.api_key {
            request = request.header("Authorization", format!("Bearer {api_key}"));
        }
        request = request.header("Content-Type", "application/json");

        let response = request
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| VigilError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(VigilError::Llm(format!(
                "completion API error {status}: {body_text}"
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| VigilError::Llm(format!("failed to parse response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| VigilError::Llm("response contained no message content".into()))
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Boundary between the pipeline and the completion service.
///
/// Collapses backend failures and blank responses into "no comment": the
/// caller only ever sees a trimmed non-empty critique or [`None`]. A failed
/// call is logged and swallowed here so one flaky request cannot abort
/// analysis of the remaining hunks.
#[derive(Clone)]
pub struct ReviewClient {
    backend: Arc<dyn CompletionBackend>,
}

impl ReviewClient {
    /// Wrap a completion backend.
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Identifier of the underlying model.
    pub fn model(&self) -> &str {
        self.backend.model()
    }

    /// Request a critique for one prompt.
    ///
    /// Returns `None` when the backend call fails for any reason or when the
    /// generated text is empty after trimming: the model signals "nothing
    /// to say" by producing no output.
    pub async fn review(&self, prompt: &str) -> Option<String> {
        match self.backend.complete(prompt).await {
            Ok(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Err(e) => {
                tracing::warn!("completion call failed: {e}");
                None
            }
        }
    }
}
