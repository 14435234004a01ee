//! Tone analysis for the chat feature.
//!
//! One short auxiliary model call reduces the user's message to a compact
//! personality descriptor. A failed or empty analysis never fails the chat
//! request; it yields [`ToneOutcome::Fallback`] instead.

use crate::ai::GenerativeService;
use crate::prompts;
use tracing::{debug, warn};

/// Descriptor used whenever tone analysis produces nothing usable.
pub const FALLBACK_DESCRIPTOR: &str = "Default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToneOutcome {
    Analyzed(String),
    Fallback,
}

impl ToneOutcome {
    pub fn descriptor(&self) -> &str {
        match self {
            ToneOutcome::Analyzed(descriptor) => descriptor,
            ToneOutcome::Fallback => FALLBACK_DESCRIPTOR,
        }
    }

    pub fn into_descriptor(self) -> String {
        match self {
            ToneOutcome::Analyzed(descriptor) => descriptor,
            ToneOutcome::Fallback => FALLBACK_DESCRIPTOR.to_string(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ToneOutcome::Fallback)
    }
}

/// Analyze the tone of `message`.
pub async fn analyze(service: &dyn GenerativeService, message: &str) -> ToneOutcome {
    match service.generate(&prompts::tone_instruction(message)).await {
        Ok(raw) => {
            let descriptor = raw.trim();
            if descriptor.is_empty() {
                warn!("Tone analysis returned no text, using fallback descriptor");
                ToneOutcome::Fallback
            } else {
                debug!("Tone analysis result: {}", descriptor);
                ToneOutcome::Analyzed(descriptor.to_string())
            }
        }
        Err(e) => {
            warn!("Tone analysis failed, using fallback descriptor: {}", e);
            ToneOutcome::Fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockGenerativeClient;

    #[tokio::test]
    async fn test_analyze_trims_model_output() {
        let service = MockGenerativeClient::new().with_response("  Warm and curious \n".to_string());

        let outcome = analyze(&service, "hi! what's new?").await;
        assert_eq!(outcome, ToneOutcome::Analyzed("Warm and curious".to_string()));
        assert_eq!(outcome.descriptor(), "Warm and curious");
    }

    #[tokio::test]
    async fn test_analyze_sends_tone_instruction() {
        let service = MockGenerativeClient::new().with_response("Terse".to_string());

        analyze(&service, "fix it now").await;
        let prompts = service.get_prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0], prompts::tone_instruction("fix it now"));
    }

    #[tokio::test]
    async fn test_analyze_failure_falls_back() {
        let service = MockGenerativeClient::new().with_failure("network down".to_string());

        let outcome = analyze(&service, "hello").await;
        assert!(outcome.is_fallback());
        assert_eq!(outcome.descriptor(), FALLBACK_DESCRIPTOR);
        assert_eq!(service.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_analyze_blank_output_falls_back() {
        let service = MockGenerativeClient::new().with_response("   ".to_string());

        let outcome = analyze(&service, "hello").await;
        assert_eq!(outcome.into_descriptor(), "Default");
    }
}
