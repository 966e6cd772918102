//! Gemini (Google) implementation of [`StudioClient`].

use crate::client::provider::{StudioClient, EMPTY_CHAT_REPLY};
use crate::client::session::{ChatSession, Role};
use crate::error::{parse_retry_after, sanitize_error_message, Result, StudioError};
use crate::image::{
    AnalysisRequest, AspectRatio, EditRequest, GenerationRequest, ImageReference, ImageSize,
    UpscaleRequest,
};
use crate::media::MediaPayload;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Reasoning budget used for chat turns.
pub const DEFAULT_THINKING_BUDGET: u32 = 32768;

/// Environment variables checked for an API key, in order.
pub const API_KEY_ENV_VARS: [&str; 3] = ["GEMINI_API_KEY", "GOOGLE_API_KEY", "API_KEY"];

/// Model identifiers used for each feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiModels {
    /// Multi-turn chat.
    pub chat: String,
    /// Image analysis.
    pub analysis: String,
    /// Text-to-image.
    pub generation: String,
    /// Instruction edits.
    pub edit: String,
    /// Deblur and upscale.
    pub upscale: String,
}

impl Default for GeminiModels {
    fn default() -> Self {
        Self {
            chat: "gemini-3-pro-preview".into(),
            analysis: "gemini-3-pro-preview".into(),
            generation: "gemini-3-pro-image-preview".into(),
            edit: "gemini-2.5-flash-image".into(),
            upscale: "gemini-3-pro-image-preview".into(),
        }
    }
}

/// Builder for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiClientBuilder {
    api_key: Option<String>,
    base_url: String,
    models: GeminiModels,
    thinking_budget: u32,
    timeout: Option<Duration>,
}

impl Default for GeminiClientBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.into(),
            models: GeminiModels::default(),
            thinking_budget: DEFAULT_THINKING_BUDGET,
            timeout: None,
        }
    }
}

impl GeminiClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to the [`API_KEY_ENV_VARS`].
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Overrides the API root, e.g. for a proxy.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replaces the whole model table.
    pub fn models(mut self, models: GeminiModels) -> Self {
        self.models = models;
        self
    }

    /// Sets the chat model.
    pub fn chat_model(mut self, model: impl Into<String>) -> Self {
        self.models.chat = model.into();
        self
    }

    /// Sets the reasoning budget for chat turns.
    pub fn thinking_budget(mut self, budget: u32) -> Self {
        self.thinking_budget = budget;
        self
    }

    /// Sets a per-request timeout. None by default; image calls can be slow.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client, resolving the API key.
    pub fn build(self) -> Result<GeminiClient> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .find_map(|var| std::env::var(var).ok().filter(|k| !k.trim().is_empty()))
            })
            .ok_or_else(|| {
                StudioError::Auth(format!(
                    "none of {} set and no API key provided",
                    API_KEY_ENV_VARS.join(", ")
                ))
            })?;

        let mut client = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            client = client.timeout(timeout);
        }

        Ok(GeminiClient {
            client: client.build()?,
            api_key,
            base_url: self.base_url,
            models: self.models,
            thinking_budget: self.thinking_budget,
        })
    }
}

/// Client for the Gemini `generateContent` API.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    models: GeminiModels,
    thinking_budget: u32,
}

impl GeminiClient {
    /// Creates a new `GeminiClientBuilder`.
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::new()
    }

    /// Model table in use.
    pub fn models(&self) -> &GeminiModels {
        &self.models
    }

    /// Checks that the chat model is reachable with the configured key.
    pub async fn health_check(&self) -> Result<()> {
        let url = format!("{}/models/{}", self.base_url, self.models.chat);

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        match response.status().as_u16() {
            401 | 403 => Err(StudioError::Auth("Invalid API key".into())),
            404 => Err(StudioError::InvalidRequest(
                "Model not found. Verify the model name is correct.".into(),
            )),
            s if !(200..300).contains(&s) => Err(StudioError::Api {
                status: s,
                message: "Health check failed".into(),
            }),
            _ => Ok(()),
        }
    }

    async fn generate_content(
        &self,
        feature: &'static str,
        model: &str,
        body: &GeminiRequest,
    ) -> Result<ResponsePayload> {
        let start = Instant::now();
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        tracing::debug!(feature, model, turns = body.contents.len(), "sending request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            let err = parse_error(status.as_u16(), &text, &headers);
            tracing::warn!(feature, model, status = status.as_u16(), "request failed: {err}");
            return Err(err);
        }

        let body = response.text().await?;
        let gemini_response: GeminiResponse = serde_json::from_str(&body)?;
        let payload = gemini_response.into_payload()?;

        tracing::debug!(
            feature,
            model,
            duration_ms = start.elapsed().as_millis() as u64,
            kind = payload.kind(),
            "response received"
        );

        Ok(payload)
    }
}

fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> StudioError {
    let text = sanitize_error_message(text);
    if status == 404 {
        return StudioError::InvalidRequest(
            "Model not found. Verify the model name is correct.".into(),
        );
    }
    if status == 429 {
        let retry_after = parse_retry_after(headers).map(Duration::from_secs);
        return StudioError::RateLimited { retry_after };
    }
    if status == 401 || status == 403 {
        return StudioError::Auth(text);
    }
    let lower = text.to_lowercase();
    if lower.contains("safety")
        || lower.contains("blocked")
        || lower.contains("prohibited")
    {
        return StudioError::ContentBlocked(text);
    }
    StudioError::Api {
        status,
        message: text,
    }
}

#[async_trait]
impl StudioClient for GeminiClient {
    fn open_chat_session(&self) -> ChatSession {
        ChatSession::new(self.models.chat.clone(), self.thinking_budget)
    }

    async fn send_chat_turn(&self, session: &mut ChatSession, text: &str) -> Result<String> {
        let body = GeminiRequest::chat(session, text);
        let reply = self
            .generate_content("chat", session.model(), &body)
            .await?
            .into_text();

        // An exchange without model text is never replayed.
        match reply {
            Some(reply) => {
                session.record_exchange(text, reply.clone());
                Ok(reply)
            }
            None => {
                tracing::debug!(session = %session.id(), "chat reply had no text");
                Ok(EMPTY_CHAT_REPLY.to_string())
            }
        }
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<String> {
        let body = GeminiRequest::analysis(request);
        self.generate_content("analyze", &self.models.analysis, &body)
            .await?
            .into_text()
            .ok_or_else(|| StudioError::NoResult("Could not analyze image.".into()))
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<ImageReference> {
        let body = GeminiRequest::generation(request);
        self.generate_content("generate", &self.models.generation, &body)
            .await?
            .into_image()
            .ok_or_else(|| StudioError::NoResult("No image generated.".into()))
    }

    async fn edit(&self, request: &EditRequest) -> Result<ImageReference> {
        let body = GeminiRequest::edit(request);
        self.generate_content("edit", &self.models.edit, &body)
            .await?
            .into_image()
            .ok_or_else(|| StudioError::NoResult("No edited image returned.".into()))
    }

    async fn upscale(&self, request: &UpscaleRequest) -> Result<ImageReference> {
        let body = GeminiRequest::upscale(request);
        self.generate_content("upscale", &self.models.upscale, &body)
            .await?
            .into_image()
            .ok_or_else(|| StudioError::NoResult("No upscaled image returned.".into()))
    }
}

/// Validated shape of a `generateContent` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePayload {
    /// Text only.
    Text(String),
    /// An inline image, with any accompanying text.
    Image {
        /// MIME type the service reported.
        mime_type: String,
        /// Base64 image bytes.
        data: String,
        /// Text parts returned next to the image.
        caption: Option<String>,
    },
    /// Nothing usable.
    Empty,
}

impl ResponsePayload {
    fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image { .. } => "image",
            Self::Empty => "empty",
        }
    }

    /// Extracts reply text, if any.
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Image { caption, .. } => caption,
            Self::Empty => None,
        }
    }

    /// Extracts the first inline image as a PNG data URI reference.
    pub fn into_image(self) -> Option<ImageReference> {
        match self {
            Self::Image { data, .. } => Some(ImageReference::from_base64(data)),
            _ => None,
        }
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - can be text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

impl GeminiRequestPart {
    fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    fn media(payload: &MediaPayload) -> Self {
        Self::InlineData {
            inline_data: GeminiInlineData {
                mime_type: payload.mime_type.clone(),
                data: payload.data.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'static str>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<AspectRatio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_size: Option<ImageSize>,
}

impl GeminiRequest {
    fn single(parts: Vec<GeminiRequestPart>, generation_config: Option<GeminiConfig>) -> Self {
        Self {
            contents: vec![GeminiContent { role: None, parts }],
            generation_config,
        }
    }

    fn image_output(image_config: Option<ImageConfig>) -> Option<GeminiConfig> {
        Some(GeminiConfig {
            image_config,
            response_modalities: Some(vec!["TEXT", "IMAGE"]),
            ..Default::default()
        })
    }

    fn chat(session: &ChatSession, text: &str) -> Self {
        let mut contents: Vec<GeminiContent> = session
            .history()
            .iter()
            .map(|turn| GeminiContent {
                role: Some(turn.role.as_str()),
                parts: vec![GeminiRequestPart::text(turn.text.clone())],
            })
            .collect();

        contents.push(GeminiContent {
            role: Some(Role::User.as_str()),
            parts: vec![GeminiRequestPart::text(text)],
        });

        Self {
            contents,
            generation_config: Some(GeminiConfig {
                thinking_config: Some(ThinkingConfig {
                    thinking_budget: session.thinking_budget(),
                }),
                ..Default::default()
            }),
        }
    }

    fn analysis(req: &AnalysisRequest) -> Self {
        Self::single(
            vec![
                GeminiRequestPart::media(&req.source),
                GeminiRequestPart::text(req.prompt.clone()),
            ],
            None,
        )
    }

    fn generation(req: &GenerationRequest) -> Self {
        Self::single(
            vec![GeminiRequestPart::text(req.prompt.clone())],
            Self::image_output(Some(ImageConfig {
                aspect_ratio: Some(req.aspect_ratio),
                image_size: Some(req.image_size),
            })),
        )
    }

    fn edit(req: &EditRequest) -> Self {
        Self::single(
            vec![
                GeminiRequestPart::media(&req.source),
                GeminiRequestPart::text(req.instruction.clone()),
            ],
            Self::image_output(None),
        )
    }

    fn upscale(req: &UpscaleRequest) -> Self {
        Self::single(
            vec![
                GeminiRequestPart::media(&req.source),
                GeminiRequestPart::text(req.instruction()),
            ],
            Self::image_output(Some(ImageConfig {
                aspect_ratio: None,
                image_size: Some(ImageSize::MAX),
            })),
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: Option<bool>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

const BLOCKING_FINISH_REASONS: [&str; 8] = [
    "SAFETY",
    "IMAGE_SAFETY",
    "IMAGE_PROHIBITED_CONTENT",
    "IMAGE_RECITATION",
    "RECITATION",
    "PROHIBITED_CONTENT",
    "BLOCKLIST",
    "SPII",
];

impl GeminiResponse {
    /// Validates the reply and classifies it before any extraction.
    fn into_payload(self) -> Result<ResponsePayload> {
        // Blocks come back as HTTP 200
        if let Some(feedback) = self.prompt_feedback {
            if let Some(reason) = feedback.block_reason {
                let msg = feedback
                    .block_reason_message
                    .unwrap_or_else(|| format!("Prompt blocked: {}", reason));
                return Err(StudioError::ContentBlocked(msg));
            }
        }

        let Some(candidate) = self.candidates.into_iter().next() else {
            return Ok(ResponsePayload::Empty);
        };

        if let Some(reason) = candidate.finish_reason.as_deref() {
            if BLOCKING_FINISH_REASONS.contains(&reason) {
                return Err(StudioError::ContentBlocked(format!(
                    "Content blocked by Gemini safety filter: {}",
                    reason
                )));
            }
        }

        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();

        let mut text = String::new();
        let mut image = None;
        for part in parts {
            if part.thought.unwrap_or(false) {
                continue;
            }
            if let Some(inline) = part.inline_data {
                if image.is_none() && !inline.data.is_empty() {
                    image = Some(inline);
                }
                continue;
            }
            if let Some(t) = part.text {
                text.push_str(&t);
            }
        }

        let caption = (!text.trim().is_empty()).then_some(text);
        Ok(match (image, caption) {
            (Some(inline), caption) => ResponsePayload::Image {
                mime_type: inline.mime_type,
                data: inline.data,
                caption,
            },
            (None, Some(text)) => ResponsePayload::Text(text),
            (None, None) => ResponsePayload::Empty,
        })
    }
}
