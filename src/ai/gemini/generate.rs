use super::client::GeminiHttpClient;
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, InlineData, Part,
};
use crate::ai::GenerativeService;
use crate::models::InlinePayload;
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// `GenerativeService` backed by Gemini's `generateContent`.
pub struct GeminiClient {
    http: GeminiHttpClient,
    max_output_tokens: Option<u32>,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(
            api_key,
            model,
            Duration::from_secs(30),
            reqwest::Client::new(),
        )
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, model, timeout, client),
            max_output_tokens: None,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn model(&self) -> &str {
        self.http.model()
    }

    async fn send(&self, parts: Vec<Part>) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: self.max_output_tokens.map(|max| GenerationConfig {
                max_output_tokens: Some(max),
            }),
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        response
            .text()
            .ok_or_else(|| Error::AiProvider("No text in Gemini response".to_string()))
    }
}

#[async_trait]
impl GenerativeService for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        tracing::debug!(
            "Sending text prompt ({} chars) to Gemini model {}",
            prompt.len(),
            self.model()
        );

        self.send(vec![Part::Text {
            text: prompt.to_string(),
        }])
        .await
    }

    async fn generate_with_inline(
        &self,
        prompt: &str,
        payload: &InlinePayload,
    ) -> Result<String> {
        tracing::debug!(
            "Sending {} payload ({} base64 chars) to Gemini model {}",
            payload.mime_type,
            payload.data.len(),
            self.model()
        );

        self.send(vec![
            Part::InlineData {
                inline_data: InlineData::from(payload),
            },
            Part::Text {
                text: prompt.to_string(),
            },
        ])
        .await
    }
}
