//! Classification of inbound requests by declared content type.

use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    /// `application/json` body carrying a structured request.
    Json,
    /// `multipart/form-data` body carrying an image upload.
    Multipart,
    /// Anything else, with the declared value (or `<none>`).
    Unsupported(String),
}

impl Transport {
    /// Classify on the declared media type only; the body is never inspected.
    pub fn classify(content_type: Option<&str>) -> Self {
        let Some(raw) = content_type else {
            return Transport::Unsupported("<none>".to_string());
        };

        let essence = raw.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case("application/json") {
            Transport::Json
        } else if essence.eq_ignore_ascii_case("multipart/form-data") {
            Transport::Multipart
        } else {
            Transport::Unsupported(raw.to_string())
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::classify(headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()))
    }
}
