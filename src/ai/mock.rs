use super::GenerativeService;
use crate::models::InlinePayload;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// In-memory `GenerativeService` for tests and local harnesses.
///
/// Clones share state, so a clone kept outside the dispatcher works as a
/// probe for call counts and the instructions that were sent.
#[derive(Clone, Default)]
pub struct MockGenerativeClient {
    responses: Arc<Mutex<Vec<String>>>,
    failure: Arc<Mutex<Option<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    payloads: Arc<Mutex<Vec<InlinePayload>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockGenerativeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, response: String) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    /// Every call fails with `Error::AiProvider(message)`.
    pub fn with_failure(self, message: String) -> Self {
        *self.failure.lock().unwrap() = Some(message);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn get_payloads(&self) -> Vec<InlinePayload> {
        self.payloads.lock().unwrap().clone()
    }

    fn respond(&self, prompt: &str) -> Result<String> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(message) = self.failure.lock().unwrap().as_ref() {
            return Err(Error::AiProvider(message.clone()));
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Default mock response
            Ok(format!("Mock response to: {}", prompt))
        } else {
            let index = (*count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}

#[async_trait]
impl GenerativeService for MockGenerativeClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.respond(prompt)
    }

    async fn generate_with_inline(
        &self,
        prompt: &str,
        payload: &InlinePayload,
    ) -> Result<String> {
        self.payloads.lock().unwrap().push(payload.clone());
        self.respond(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_default_response_echoes_prompt() {
        let client = MockGenerativeClient::new();
        let text = client.generate("apple").await.unwrap();
        assert!(text.contains("apple"));
    }

    #[tokio::test]
    async fn test_mock_custom_responses_cycle() {
        let client = MockGenerativeClient::new()
            .with_response("first".to_string())
            .with_response("second".to_string());

        assert_eq!(client.generate("a").await.unwrap(), "first");
        assert_eq!(client.generate("b").await.unwrap(), "second");
        // Should cycle back
        assert_eq!(client.generate("c").await.unwrap(), "first");
    }

    #[tokio::test]
    async fn test_mock_failure_still_counts_calls() {
        let client = MockGenerativeClient::new().with_failure("boom".to_string());
        let probe = client.clone();

        assert!(client.generate("x").await.is_err());
        assert_eq!(probe.get_call_count(), 1);
        assert_eq!(probe.get_prompts(), vec!["x".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_records_payloads() {
        let client = MockGenerativeClient::new();
        let payload = InlinePayload {
            mime_type: "image/png".to_string(),
            data: "AAEC".to_string(),
        };

        client.generate_with_inline("look", &payload).await.unwrap();
        assert_eq!(client.get_payloads(), vec![payload]);
        assert_eq!(client.get_call_count(), 1);
    }
}
