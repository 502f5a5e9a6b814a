use base64::{engine::general_purpose, Engine as _};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::CONFIG;
use crate::headshot::{compile_prompt, GenerationConfig};
use crate::llm::media::SourceImage;
use crate::utils::http::get_http_client;

const GENERATE_CONTENT_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,
    #[error("request to the image service failed: {0}")]
    Transport(String),
    #[error("image service returned status {status}: {detail}")]
    Api { status: StatusCode, detail: String },
    #[error("image service response could not be read: {0}")]
    InvalidResponse(String),
    #[error("no image produced")]
    NoImageProduced,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        #[allow(dead_code)]
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

/// The generated headshot as returned by the service.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl GeneratedImage {
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

fn redact_api_key(text: &str, api_key: &str) -> String {
    let key = api_key.trim();
    if key.is_empty() {
        return text.to_string();
    }
    text.replace(key, "[redacted]")
}

fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

fn summarize_error_body(body: &str) -> (Option<String>, String) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return (None, "empty response body".to_string());
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        let message = value
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .map(|v| v.to_string())
            .or_else(|| {
                value
                    .get("message")
                    .and_then(|v| v.as_str())
                    .map(|v| v.to_string())
            });
        return (message, truncate_for_log(&value.to_string(), 2000));
    }

    (None, truncate_for_log(trimmed, 2000))
}

pub fn select_model(high_quality: bool) -> &'static str {
    if high_quality {
        &CONFIG.gemini_image_model_hq
    } else {
        &CONFIG.gemini_image_model
    }
}

fn build_payload(image: &SourceImage, prompt: &str, high_quality: bool) -> Value {
    let mut image_config = json!({ "aspectRatio": "1:1" });
    if high_quality {
        image_config["imageSize"] = json!("2K");
    }

    json!({
        "contents": [{
            "role": "user",
            "parts": [
                {
                    "inlineData": {
                        "mimeType": image.mime_type,
                        "data": image.to_base64()
                    }
                },
                { "text": prompt }
            ]
        }],
        "generationConfig": {
            "responseModalities": ["TEXT", "IMAGE"],
            "imageConfig": image_config
        }
    })
}

fn extract_image(response: GeminiResponse) -> Option<GeneratedImage> {
    for candidate in response.candidates.unwrap_or_default() {
        let Some(content) = candidate.content else {
            continue;
        };
        for part in content.parts.unwrap_or_default() {
            if let GeminiPart::InlineData { inline_data } = part {
                if !inline_data.mime_type.starts_with("image/") {
                    continue;
                }
                if let Ok(bytes) = general_purpose::STANDARD.decode(inline_data.data) {
                    return Some(GeneratedImage {
                        bytes,
                        mime_type: inline_data.mime_type,
                    });
                }
            }
        }
    }
    None
}

async fn call_generate_content(
    api_key: &str,
    model: &str,
    payload: &Value,
) -> Result<GeminiResponse, GenerationError> {
    let client = get_http_client();
    let url = format!("{GENERATE_CONTENT_URL}/{model}:generateContent?key={api_key}");

    let response = client.post(&url).json(payload).send().await.map_err(|err| {
        let detail = redact_api_key(&err.to_string(), api_key);
        warn!(
            "Generation request failed to send: {} (timeout={}, connect={})",
            detail,
            err.is_timeout(),
            err.is_connect()
        );
        GenerationError::Transport(detail)
    })?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let (message, body_summary) = summarize_error_body(&body);
        warn!("Generation API error: status={status}, body={body_summary}");
        let detail = redact_api_key(&message.unwrap_or(body_summary), api_key);
        return Err(GenerationError::Api { status, detail });
    }

    response
        .json::<GeminiResponse>()
        .await
        .map_err(|err| GenerationError::InvalidResponse(redact_api_key(&err.to_string(), api_key)))
}

/// One generation attempt: compile the prompt, issue a single request,
/// return the first inline image of the response. No retries; every
/// failure is surfaced to the caller untouched.
pub async fn generate_headshot(
    image: &SourceImage,
    config: &GenerationConfig,
) -> Result<GeneratedImage, GenerationError> {
    generate_with_key(&CONFIG.gemini_api_key, image, config).await
}

async fn generate_with_key(
    api_key: &str,
    image: &SourceImage,
    config: &GenerationConfig,
) -> Result<GeneratedImage, GenerationError> {
    if api_key.trim().is_empty() {
        return Err(GenerationError::MissingApiKey);
    }

    let model = select_model(config.high_quality);
    let prompt = compile_prompt(config);
    let payload = build_payload(image, &prompt, config.high_quality);
    debug!(
        target: "studio.gemini",
        model,
        prompt_chars = prompt.chars().count(),
        image_bytes = image.bytes.len(),
        "Issuing generation request"
    );

    let response = call_generate_content(api_key, model, &payload).await?;
    extract_image(response).ok_or(GenerationError::NoImageProduced)
}
