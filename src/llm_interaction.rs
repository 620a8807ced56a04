use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::constants;
use crate::error::{BotError, Result};

// Structures matching Ollama's /api/generate endpoint
#[derive(Serialize, Debug)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    format: &'a str, // Always "json": ask Ollama to constrain output to JSON
    stream: bool,    // We want the full response, not a stream
}

#[derive(Deserialize, Debug)]
struct OllamaResponse {
    response: String, // The generated text
    // Other fields like model, created_at, done, timings are ignored
}

/// Thin client over a single Ollama model. No retries and no timeout
/// beyond reqwest's defaults.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    generate_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            generate_url: format!(
                "{}{}",
                base_url.trim_end_matches('/'),
                constants::GENERATE_PATH
            ),
            model: model.into(),
        }
    }

    /// Client for the configured endpoint and model.
    pub fn from_env() -> Self {
        Self::new(&constants::OLLAMA_URL, constants::COMMAND_BOT_MODEL.clone())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `prompt` and return the model's raw text.
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let request_payload = OllamaRequest {
            model: &self.model,
            prompt,
            format: "json",
            stream: false,
        };

        debug!(url = %self.generate_url, "Sending generate request");

        let response = self
            .client
            .post(&self.generate_url)
            .json(&request_payload)
            .send()
            .await
            .map_err(BotError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(BotError::Transport)?;

        if !status.is_success() {
            warn!(%status, %body, "Ollama API request failed");
            return Err(BotError::Status { status, body });
        }

        let ollama_response: OllamaResponse =
            serde_json::from_str(&body).map_err(BotError::EnvelopeDecode)?;

        debug!(response = ?ollama_response.response, "Received Ollama response");

        Ok(ollama_response.response)
    }
}
