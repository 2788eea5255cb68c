//! Inference client for the Gemini Generative Language API
//!
//! One request per call, no retries. The credential is checked before the
//! transport is touched, so a missing key never reaches the network.

use crate::config::{Credentials, InferenceConfig};
use crate::error::{Result, ResumeLensError};
use crate::llm::prompts::RenderedPrompt;
use crate::llm::schema::SchemaDescriptor;
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const JSON_MIME_TYPE: &str = "application/json";

/// Everything a transport needs for one structured-output call.
#[derive(Clone, Copy)]
pub struct InferenceRequest<'a> {
    pub model: &'a str,
    pub prompt_text: &'a str,
    pub output_schema: &'a SchemaDescriptor,
    pub api_key: &'a str,
}

/// Performs the single outbound call and returns the model's raw text.
#[async_trait]
pub trait InferenceTransport: Send + Sync {
    async fn send(&self, request: InferenceRequest<'_>) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

fn request_body<'a>(request: &InferenceRequest<'a>) -> GenerateContentRequest<'a> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part {
                text: request.prompt_text,
            }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: JSON_MIME_TYPE,
            response_schema: &request.output_schema.schema,
        },
    }
}

/// Concatenated text parts of the first candidate; empty when there are none.
fn response_text(response: GenerateContentResponse) -> Result<String> {
    if let Some(error) = response.error {
        return Err(ResumeLensError::Inference(format!("Gemini API error: {}", error.message)));
    }

    let text = response
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .and_then(|c| c.parts)
        .map(|parts| parts.into_iter().filter_map(|p| p.text).collect::<String>())
        .unwrap_or_default();

    Ok(text)
}

/// HTTP transport for `models/{model}:generateContent`.
pub struct GeminiTransport {
    client: Client,
    endpoint: String,
}

impl GeminiTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            ResumeLensError::Configuration(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.endpoint, model)
    }
}

#[async_trait]
impl InferenceTransport for GeminiTransport {
    async fn send(&self, request: InferenceRequest<'_>) -> Result<String> {
        let response = self
            .client
            .post(self.url(request.model))
            .header("x-goog-api-key", request.api_key)
            .json(&request_body(&request))
            .send()
            .await
            .map_err(|e| ResumeLensError::Inference(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("Gemini API returned {}", status);
            return Err(ResumeLensError::Inference(format!(
                "Gemini API error ({}): {}",
                status, message
            )));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            ResumeLensError::Inference(format!("Failed to parse Gemini response: {}", e))
        })?;

        response_text(parsed)
    }
}

/// Single-shot structured-output client.
#[derive(Clone)]
pub struct InferenceClient {
    transport: Arc<dyn InferenceTransport>,
    model: String,
}

impl InferenceClient {
    pub fn new(transport: Arc<dyn InferenceTransport>, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
        }
    }

    pub fn from_config(config: &InferenceConfig) -> Result<Self> {
        let transport = GeminiTransport::new(&config.endpoint, Duration::from_secs(config.timeout_secs))?;
        Ok(Self::new(Arc::new(transport), config.model.clone()))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn infer(&self, prompt: &RenderedPrompt, credentials: &Credentials) -> Result<String> {
        let api_key = credentials.api_key()?;

        info!(
            "Requesting structured analysis from {} ({} prompt chars)",
            self.model,
            prompt.prompt_text.chars().count()
        );

        let raw = self
            .transport
            .send(InferenceRequest {
                model: &self.model,
                prompt_text: &prompt.prompt_text,
                output_schema: &prompt.output_schema,
                api_key,
            })
            .await?;

        if raw.trim().is_empty() {
            return Err(ResumeLensError::Inference("empty response".to_string()));
        }

        debug!("Received {} response chars", raw.chars().count());
        Ok(raw)
    }
}
