use crate::domain::ports::{ConfigProvider, ModelClient};
use crate::utils::error::{ConverterError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Hugging Face inference router, OpenAI-compatible chat completions.
pub struct HuggingFaceClient {
    endpoint: String,
    model: String,
    api_token: String,
    max_tokens: u32,
    temperature: f32,
    client: Client,
}

impl HuggingFaceClient {
    pub fn new<C: ConfigProvider>(config: &C, api_token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ConverterError::ConfigError {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            endpoint: config.model_endpoint().to_string(),
            model: config.model_id().to_string(),
            api_token,
            max_tokens: config.max_tokens(),
            temperature: config.temperature(),
            client,
        })
    }
}

#[async_trait]
impl ModelClient for HuggingFaceClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: false,
        };

        tracing::debug!("Calling model {} at {}", self.model, self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Model response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConverterError::upstream(
                format!("provider returned {}: {}", status, truncate(&body, 300)),
                Some(status.as_u16()),
            ));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ConverterError::upstream("model response contained no completion", None))
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}
