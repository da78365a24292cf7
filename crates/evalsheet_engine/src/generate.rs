use std::sync::RwLock;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use serde::{Deserialize, Serialize};

use crate::prompt::build_prompt;
use crate::{FailureKind, GenerationError, GenerationRequest};

const API_KEY_HEADER: &str = "x-goog-api-key";
const CONNECTION_PROBE: &str = "Test connection";

#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub base_url: String,
    pub model: String,
    pub connect_timeout: Duration,
    /// Overall request limit; `None` leaves it to the server.
    pub request_timeout: Option<Duration>,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
        }
    }
}

#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Gemini `generateContent` client holding the active API key.
#[derive(Debug)]
pub struct GeminiGenerator {
    client: reqwest::Client,
    settings: GenerationSettings,
    api_key: RwLock<String>,
}

impl GeminiGenerator {
    pub fn new(settings: GenerationSettings) -> Result<Self, GenerationError> {
        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| GenerationError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            client,
            settings,
            api_key: RwLock::new(String::new()),
        })
    }

    /// Replace the key used for subsequent requests.
    pub fn set_api_key(&self, key: &str) {
        if let Ok(mut guard) = self.api_key.write() {
            *guard = key.trim().to_string();
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.current_key().is_some()
    }

    fn current_key(&self) -> Option<String> {
        self.api_key
            .read()
            .ok()
            .map(|key| key.clone())
            .filter(|key| !key.is_empty())
    }

    /// Send a tiny request with `key` to check that it is accepted.
    pub async fn test_connection(&self, key: &str) -> Result<(), GenerationError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(missing_key());
        }
        let body = GenerateContentRequest {
            contents: vec![text_content(CONNECTION_PROBE)],
            generation_config: None,
        };
        self.send(key, &body).await.map(|_| ())
    }

    async fn send(
        &self,
        key: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenerationError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, key)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&error_body)
                .ok()
                .and_then(|parsed| parsed.error)
                .map(|detail| detail.message)
                .unwrap_or(error_body);
            engine_warn!("Generation request failed: status={} message={}", status, message);
            return Err(GenerationError::new(
                classify_status(status.as_u16(), &message),
                message,
            ));
        }

        response.json().await.map_err(map_reqwest_error)
    }
}

#[async_trait::async_trait]
impl Generator for GeminiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let key = self.current_key().ok_or_else(missing_key)?;

        let body = GenerateContentRequest {
            contents: vec![text_content(&build_prompt(request))],
            generation_config: Some(GenerationConfig {
                temperature: self.settings.temperature,
                top_k: self.settings.top_k,
                top_p: self.settings.top_p,
            }),
        };
        engine_debug!(
            "Requesting generation model={} target_length={}",
            self.settings.model,
            request.target_length
        );

        let response = self.send(&key, &body).await?;
        let text = response_text(response);
        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::new(
                FailureKind::EmptyResponse,
                "No content generated",
            ));
        }
        Ok(text.to_string())
    }
}

fn text_content(text: &str) -> Content {
    Content {
        parts: vec![Part {
            text: Some(text.to_string()),
        }],
    }
}

fn response_text(response: GenerateContentResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default()
}

fn missing_key() -> GenerationError {
    GenerationError::new(
        FailureKind::MissingCredential,
        "API key is missing. Save one with `evalsheet key set`.",
    )
}

fn classify_status(code: u16, message: &str) -> FailureKind {
    match code {
        401 | 403 => FailureKind::InvalidCredential,
        400 if message.to_lowercase().contains("api key") => FailureKind::InvalidCredential,
        _ => FailureKind::HttpStatus(code),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        return GenerationError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return GenerationError::new(FailureKind::InvalidResponse, err.to_string());
    }
    GenerationError::new(FailureKind::Network, err.to_string())
}
