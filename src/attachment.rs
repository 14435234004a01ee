//! Conversion of uploaded files into inline model payloads.

use crate::ai::mime::detect_image_mime;
use crate::models::{Attachment, InlinePayload};
use base64::Engine as _;

impl Attachment {
    /// Builds an attachment, inferring the MIME type from the bytes when the
    /// upload did not declare one.
    pub fn new(bytes: Vec<u8>, declared_mime: Option<String>) -> Self {
        let mime_type = declared_mime
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| detect_image_mime(&bytes).to_string());

        Self { bytes, mime_type }
    }

    pub fn to_inline_payload(&self) -> InlinePayload {
        InlinePayload {
            mime_type: self.mime_type.clone(),
            data: base64::engine::general_purpose::STANDARD.encode(&self.bytes),
        }
    }
}
