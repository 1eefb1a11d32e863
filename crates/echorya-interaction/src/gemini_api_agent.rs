//! GeminiApiAgent - Direct REST API implementation for Gemini.
//!
//! Sends the conversation history plus the new prompt to
//! `models/{model}:generateContent` and returns the reply text.

use async_trait::async_trait;
use echorya_core::config::{AppConfig, SecretConfig};
use echorya_core::generation::{GenerationError, HistoryTurn, LanguageModel};
use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// [`LanguageModel`] implementation that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiAgent {
    client: Client,
    api_key: String,
    model: String,
    system_instruction: Option<String>,
}

impl GeminiApiAgent {
    /// Creates a new agent with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            system_instruction: None,
        }
    }

    /// Builds an agent from loaded secrets and settings.
    ///
    /// Fails with [`GenerationError::NotInitialized`] when no Gemini key is
    /// configured.
    pub fn from_config(
        secrets: &SecretConfig,
        config: &AppConfig,
    ) -> Result<Self, GenerationError> {
        let api_key = secrets
            .gemini_api_key()
            .ok_or(GenerationError::NotInitialized)?;
        Ok(Self::new(api_key, config.model.clone())
            .with_system_instruction(config.system_instruction.clone()))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Adds a system instruction that will be sent alongside every request.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        let instruction = instruction.into();
        self.system_instruction = (!instruction.trim().is_empty()).then_some(instruction);
        self
    }

    fn build_request(&self, prompt: &str, history: &[HistoryTurn]) -> GenerateContentRequest {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|turn| Content::text(Some(turn.role.as_str()), &turn.text))
            .collect();
        contents.push(Content::text(Some("user"), prompt));

        GenerateContentRequest {
            contents,
            system_instruction: self
                .system_instruction
                .as_deref()
                .map(|text| Content::text(None, text)),
        }
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String, GenerationError> {
        let url = format!("{}/{model}:generateContent", BASE_URL, model = self.model);

        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text, retry_after));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| {
                GenerationError::Decode(format!("Failed to parse Gemini response: {err}"))
            })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl LanguageModel for GeminiApiAgent {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        prompt: &str,
        history: &[HistoryTurn],
    ) -> Result<String, GenerationError> {
        debug!(model = %self.model, turns = history.len(), "sending Gemini request");
        let request = self.build_request(prompt, history);
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn request_error(err: reqwest::Error) -> GenerationError {
    let retryable = err.is_connect() || err.is_timeout();
    GenerationError::Request {
        // Strip the URL, it carries the key as a query parameter.
        message: format!("Gemini API request failed: {}", err.without_url()),
        retryable,
    }
}

/// Joins the text parts of the first candidate.
fn extract_text_response(response: GenerateContentResponse) -> Result<String, GenerationError> {
    let text: String = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        Err(GenerationError::EmptyResponse)
    } else {
        Ok(text)
    }
}

fn map_http_error(
    status: StatusCode,
    body: String,
    retry_after: Option<Duration>,
) -> GenerationError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    let retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    GenerationError::Http {
        status: status.as_u16(),
        message,
        retryable,
        retry_after_secs: retry_after.map(|d| d.as_secs()),
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    // HTTP-date values are not supported
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
