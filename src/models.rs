//! Data models and structures
//!
//! Defines the request envelope produced by the transport layer, the result
//! shapes returned to callers, the inline payload handed to the model, and
//! the process configuration.

use crate::ai::gemini;
use crate::features::FeatureId;
use crate::{Error, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Prompt used for image analysis when the upload carries none.
pub const DEFAULT_IMAGE_PROMPT: &str = "Describe this image.";

/// Language used by the code feature when the request names none.
pub const DEFAULT_CODE_LANGUAGE: &str = "javascript";

/// A validated request, one variant per transport shape.
#[derive(Debug, Clone)]
pub enum RequestEnvelope {
    Structured(StructuredRequest),
    Binary(BinaryRequest),
}

/// A JSON request after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    pub prompt: String,
    pub feature: FeatureId,
    pub language: Option<String>,
}

/// Raw JSON body as posted by clients.
#[derive(Debug, Default, Deserialize)]
pub struct StructuredBody {
    pub prompt: Option<String>,
    pub feature: Option<String>,
    pub language: Option<String>,
}

impl StructuredBody {
    /// Checks required fields before anything leaves the process.
    pub fn validate(self) -> Result<StructuredRequest> {
        let prompt = non_blank(self.prompt).ok_or(Error::MissingField("Prompt"))?;
        let feature = match self.feature {
            Some(tag) => tag.parse()?,
            None => FeatureId::default(),
        };

        Ok(StructuredRequest {
            prompt,
            feature,
            language: non_blank(self.language),
        })
    }
}

/// A multipart request after validation.
#[derive(Debug, Clone)]
pub struct BinaryRequest {
    pub prompt: String,
    pub attachment: Attachment,
}

impl BinaryRequest {
    pub fn new(prompt: Option<String>, attachment: Option<Attachment>) -> Result<Self> {
        let attachment = attachment
            .filter(|a| !a.bytes.is_empty())
            .ok_or(Error::MissingField("Image"))?;

        Ok(Self {
            prompt: non_blank(prompt).unwrap_or_else(|| DEFAULT_IMAGE_PROMPT.to_string()),
            attachment,
        })
    }
}

/// An uploaded file as received from the client.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Base64 bytes plus MIME type, sent alongside a text instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlinePayload {
    pub mime_type: String,
    pub data: String,
}

/// Success payload. Exactly one shape per response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GenerationResult {
    Chat {
        text: String,
        personality: String,
    },
    Text {
        text: String,
    },
    Image {
        #[serde(rename = "imageUrl")]
        image_url: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub tone_model: String,
    pub gemini_base_url: String,
    pub request_timeout: Duration,
    pub bind_addr: SocketAddr,
    pub max_body_bytes: usize,
    pub dream_placeholder_url: Url,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = var("GEMINI_API_KEY")
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::Config("GEMINI_API_KEY not set".to_string()))?;
        let gemini_model =
            var("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.0-flash-001".to_string());
        let tone_model = var("GEMINI_TONE_MODEL").unwrap_or_else(|| gemini_model.clone());

        let timeout_secs: u64 = parse_var(&var, "GEMINI_TIMEOUT_SECS", 30)?;
        let bind_addr = parse_var(&var, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?;
        let max_body_bytes = parse_var(&var, "MAX_BODY_BYTES", 20 * 1024 * 1024)?;

        let placeholder = var("DREAM_PLACEHOLDER_URL")
            .unwrap_or_else(|| "https://placehold.co/1024x1024/png".to_string());
        let dream_placeholder_url = Url::parse(&placeholder)
            .map_err(|e| Error::Config(format!("DREAM_PLACEHOLDER_URL is invalid: {}", e)))?;

        Ok(Self {
            gemini_api_key,
            gemini_model,
            tone_model,
            gemini_base_url: var("GEMINI_BASE_URL")
                .unwrap_or_else(|| gemini::client::DEFAULT_BASE_URL.to_string()),
            request_timeout: Duration::from_secs(timeout_secs),
            bind_addr,
            max_body_bytes,
            dream_placeholder_url,
        })
    }
}

fn parse_var<F, T>(var: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("{} is invalid: {}", key, e))),
        None => Ok(default),
    }
}
