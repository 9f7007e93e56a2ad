//! Extraction HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required).
//! Speaks either the Gemini `generateContent` API or an OpenAI-compatible
//! `chat/completions` API; both are asked for a JSON object reply.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::{debug, info};
use parceltrack_core::ParseResult;
use serde_json::{json, Value};

use crate::reply::{parse_reply, EXTRACTION_PROMPT};

const IMAGE_INSTRUCTION: &str =
    "Extract the package information from this screenshot of a delivery notification.";

/// Image types accepted by both APIs.
const SUPPORTED_IMAGE_TYPES: [&str; 5] =
    ["image/png", "image/jpeg", "image/webp", "image/gif", "image/heic"];

/// Something that can turn raw input into a `ParseResult`.
///
/// Implementations are single-shot and may fail; callers treat any error as
/// "no result".
pub trait Extractor {
    fn extract_from_text(&self, text: &str) -> Result<ParseResult, ExtractError>;
    fn extract_from_image(&self, bytes: &[u8], mime_type: &str) -> Result<ParseResult, ExtractError>;
}

/// Error type for extraction calls.
#[derive(Debug)]
pub enum ExtractError {
    /// Network error (connect, timeout, TLS)
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// Response or reply was not in the expected shape
    Parse(String),
    /// The model answered but found no package data
    NoData,
    /// Input rejected before sending (empty text, unsupported image type)
    Input(String),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::Network(msg) => write!(f, "Network error: {}", msg),
            ExtractError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            ExtractError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ExtractError::NoData => write!(f, "no package data in reply"),
            ExtractError::Input(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Which wire format the endpoint speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFlavor {
    Gemini,
    OpenAI,
}

/// Everything needed to talk to one endpoint.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub flavor: ApiFlavor,
    /// API base URL without trailing slash
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
}

/// Extraction API client (blocking).
#[derive(Clone)]
pub struct ExtractClient {
    http: reqwest::blocking::Client,
    config: ClientConfig,
}

impl ExtractClient {
    pub fn new(config: ClientConfig) -> Result<Self, ExtractError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("parcels/{}", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| ExtractError::Network(format!("cannot create HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    fn run(&self, parts: UserContent) -> Result<ParseResult, ExtractError> {
        let (url, body) = match self.config.flavor {
            ApiFlavor::Gemini => (
                format!("{}/models/{}:generateContent", self.config.endpoint, self.config.model),
                gemini_body(&parts),
            ),
            ApiFlavor::OpenAI => (
                format!("{}/chat/completions", self.config.endpoint),
                openai_body(&self.config.model, &parts),
            ),
        };

        info!("extraction request: {} ({})", url, parts.kind());
        let json = self.post_json(&url, &body)?;

        let reply = match self.config.flavor {
            ApiFlavor::Gemini => gemini_reply_text(&json)?,
            ApiFlavor::OpenAI => openai_reply_text(&json)?,
        };
        debug!("extraction reply: {}", reply);

        parse_reply(&reply)
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn post_json(&self, url: &str, body: &Value) -> Result<Value, ExtractError> {
        let req = self.http.post(url).json(body);
        let req = match self.config.flavor {
            ApiFlavor::Gemini => req.header("x-goog-api-key", &self.config.api_key),
            ApiFlavor::OpenAI => req.bearer_auth(&self.config.api_key),
        };

        let response = req
            .send()
            .map_err(|e| ExtractError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExtractError::Http(status, body));
        }

        response
            .json::<Value>()
            .map_err(|e| ExtractError::Parse(e.to_string()))
    }
}

impl Extractor for ExtractClient {
    fn extract_from_text(&self, text: &str) -> Result<ParseResult, ExtractError> {
        if text.trim().is_empty() {
            return Err(ExtractError::Input("nothing to extract: text is empty".into()));
        }
        self.run(UserContent::Text(text))
    }

    fn extract_from_image(&self, bytes: &[u8], mime_type: &str) -> Result<ParseResult, ExtractError> {
        if bytes.is_empty() {
            return Err(ExtractError::Input("nothing to extract: image is empty".into()));
        }
        if !SUPPORTED_IMAGE_TYPES.contains(&mime_type) {
            return Err(ExtractError::Input(format!("unsupported image type: {mime_type}")));
        }
        self.run(UserContent::Image {
            mime_type,
            data: BASE64.encode(bytes),
        })
    }
}

// ── Wire formats ────────────────────────────────────────────────────

enum UserContent<'a> {
    Text(&'a str),
    Image { mime_type: &'a str, data: String },
}

impl UserContent<'_> {
    fn kind(&self) -> &'static str {
        match self {
            UserContent::Text(_) => "text",
            UserContent::Image { .. } => "image",
        }
    }
}

fn gemini_body(content: &UserContent) -> Value {
    let parts = match content {
        UserContent::Text(text) => json!([{ "text": text }]),
        UserContent::Image { mime_type, data } => json!([
            { "inlineData": { "mimeType": mime_type, "data": data } },
            { "text": IMAGE_INSTRUCTION },
        ]),
    };

    json!({
        "systemInstruction": { "parts": [{ "text": EXTRACTION_PROMPT }] },
        "contents": [{ "role": "user", "parts": parts }],
        "generationConfig": { "responseMimeType": "application/json", "temperature": 0 },
    })
}

fn openai_body(model: &str, content: &UserContent) -> Value {
    let user = match content {
        UserContent::Text(text) => json!(text),
        UserContent::Image { mime_type, data } => json!([
            { "type": "text", "text": IMAGE_INSTRUCTION },
            { "type": "image_url", "image_url": { "url": format!("data:{mime_type};base64,{data}") } },
        ]),
    };

    json!({
        "model": model,
        "temperature": 0,
        "messages": [
            { "role": "system", "content": EXTRACTION_PROMPT },
            { "role": "user", "content": user },
        ],
    })
}

fn gemini_reply_text(json: &Value) -> Result<String, ExtractError> {
    let parts = json["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| ExtractError::Parse("Missing candidates[0].content.parts in response".into()))?;

    let text: String = parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect();

    if text.trim().is_empty() {
        return Err(ExtractError::NoData);
    }
    Ok(text)
}

fn openai_reply_text(json: &Value) -> Result<String, ExtractError> {
    match &json["choices"][0]["message"]["content"] {
        Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
        Value::String(_) | Value::Null => Err(ExtractError::NoData),
        _ => Err(ExtractError::Parse("Missing choices[0].message.content in response".into())),
    }
}
