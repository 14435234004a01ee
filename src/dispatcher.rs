//! Request dispatch: feature selection, prompt construction, and model calls.

use crate::ai::{GeminiClient, GenerativeService};
use crate::features::{FeatureId, Pipeline};
use crate::models::{
    BinaryRequest, Config, GenerationResult, RequestEnvelope, StructuredRequest,
};
use crate::prompts::{self, PromptInput};
use crate::{dream, tone, Result};
use reqwest::Url;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Output cap for the tone-analysis call; the descriptor is a few words.
const TONE_MAX_OUTPUT_TOKENS: u32 = 64;

/// Routes validated requests to their generation pipeline.
pub struct Dispatcher {
    generator: Box<dyn GenerativeService>,
    tone: Box<dyn GenerativeService>,
    dream_base_url: Url,
}

/// Injectable service bundle used to construct [`Dispatcher`] in tests/harnesses.
pub struct DispatcherServices {
    pub generator: Box<dyn GenerativeService>,
    pub tone: Box<dyn GenerativeService>,
}

impl Dispatcher {
    /// Build a dispatcher from concrete service dependencies.
    pub fn with_services(services: DispatcherServices, dream_base_url: Url) -> Self {
        Self {
            generator: services.generator,
            tone: services.tone,
            dream_base_url,
        }
    }

    /// Construct a dispatcher backed by Gemini.
    pub fn from_config(config: &Config) -> Self {
        // Reuse one HTTP connection pool across both clients.
        let http_client = reqwest::Client::new();

        let generator = GeminiClient::new_with_client(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            config.request_timeout,
            http_client.clone(),
        )
        .with_base_url(config.gemini_base_url.clone());
        info!("Generation model: {}", generator.model());

        let tone = GeminiClient::new_with_client(
            config.gemini_api_key.clone(),
            config.tone_model.clone(),
            config.request_timeout,
            http_client,
        )
        .with_base_url(config.gemini_base_url.clone())
        .with_max_output_tokens(TONE_MAX_OUTPUT_TOKENS);
        info!("Tone analysis model: {}", tone.model());

        Self::with_services(
            DispatcherServices {
                generator: Box::new(generator),
                tone: Box::new(tone),
            },
            config.dream_placeholder_url.clone(),
        )
    }

    /// Run one request to completion. Errors are returned untouched for the
    /// HTTP boundary to normalize.
    pub async fn dispatch(&self, envelope: RequestEnvelope) -> Result<GenerationResult> {
        let feature = match &envelope {
            RequestEnvelope::Structured(request) => request.feature,
            RequestEnvelope::Binary(_) => FeatureId::Image,
        };
        let span = info_span!("dispatch", request_id = %Uuid::new_v4(), %feature);

        async move {
            info!("Dispatching request");
            match envelope {
                RequestEnvelope::Structured(request) => self.run_structured(request).await,
                RequestEnvelope::Binary(request) => self.run_binary(request).await,
            }
        }
        .instrument(span)
        .await
    }

    async fn run_structured(&self, request: StructuredRequest) -> Result<GenerationResult> {
        let input = PromptInput::new(&request.prompt).with_language(request.language.as_deref());

        match request.feature.pipeline() {
            Pipeline::Persona => self.run_chat(&request.prompt).await,
            Pipeline::Text => {
                let instruction = prompts::build(request.feature, &input);
                let text = self.generator.generate(&instruction).await?;
                info!("Generated {} chars", text.len());
                Ok(GenerationResult::Text { text })
            }
            Pipeline::PlaceholderImage => {
                let description = prompts::build(request.feature, &input);
                let image_url = dream::placeholder_image_url(&self.dream_base_url, &description);
                info!("Fabricated placeholder image reference");
                Ok(GenerationResult::Image { image_url })
            }
        }
    }

    async fn run_chat(&self, message: &str) -> Result<GenerationResult> {
        let tone = tone::analyze(self.tone.as_ref(), message).await;

        let input = PromptInput::new(message).with_personality(tone.descriptor());
        let instruction = prompts::build(FeatureId::Chat, &input);
        let text = self.generator.generate(&instruction).await?;
        info!(
            "Generated chat reply ({} chars, personality: {})",
            text.len(),
            tone.descriptor()
        );

        Ok(GenerationResult::Chat {
            text,
            personality: tone.into_descriptor(),
        })
    }

    async fn run_binary(&self, request: BinaryRequest) -> Result<GenerationResult> {
        let instruction = prompts::build(FeatureId::Image, &PromptInput::new(&request.prompt));
        let payload = request.attachment.to_inline_payload();
        info!(
            "Analyzing {} upload ({} bytes)",
            payload.mime_type,
            request.attachment.bytes.len()
        );

        let text = self
            .generator
            .generate_with_inline(&instruction, &payload)
            .await?;
        Ok(GenerationResult::Text { text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockGenerativeClient;
    use crate::models::Attachment;
    use crate::tone::FALLBACK_DESCRIPTOR;
    use crate::Error;

    const TEST_DREAM_BASE: &str = "https://placeholder.test/img";

    fn build_test_dispatcher(
        generator: MockGenerativeClient,
        tone: MockGenerativeClient,
    ) -> Dispatcher {
        Dispatcher::with_services(
            DispatcherServices {
                generator: Box::new(generator),
                tone: Box::new(tone),
            },
            Url::parse(TEST_DREAM_BASE).unwrap(),
        )
    }

    fn structured(prompt: &str, feature: FeatureId, language: Option<&str>) -> RequestEnvelope {
        RequestEnvelope::Structured(StructuredRequest {
            prompt: prompt.to_string(),
            feature,
            language: language.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_every_feature_produces_its_result_shape() {
        for feature in FeatureId::ALL {
            let dispatcher = build_test_dispatcher(
                MockGenerativeClient::new().with_response("generated".to_string()),
                MockGenerativeClient::new().with_response("Calm".to_string()),
            );

            let result = dispatcher
                .dispatch(structured("something", feature, None))
                .await
                .unwrap();

            match (feature, result) {
                (FeatureId::Chat, GenerationResult::Chat { text, personality }) => {
                    assert_eq!(text, "generated");
                    assert_eq!(personality, "Calm");
                }
                (FeatureId::Dream, GenerationResult::Image { image_url }) => {
                    assert!(image_url.starts_with(TEST_DREAM_BASE));
                }
                (FeatureId::Chat | FeatureId::Dream, other) => {
                    panic!("{feature} produced unexpected shape {other:?}")
                }
                (_, GenerationResult::Text { text }) => assert_eq!(text, "generated"),
                (_, other) => panic!("{feature} produced unexpected shape {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_chat_interpolates_trimmed_tone() {
        let generator = MockGenerativeClient::new().with_response("Hi!".to_string());
        let generator_probe = generator.clone();
        let tone = MockGenerativeClient::new().with_response("  Playful, upbeat \n".to_string());
        let tone_probe = tone.clone();

        let dispatcher = build_test_dispatcher(generator, tone);
        let result = dispatcher
            .dispatch(structured("yo what's up", FeatureId::Chat, None))
            .await
            .unwrap();

        assert_eq!(
            result,
            GenerationResult::Chat {
                text: "Hi!".to_string(),
                personality: "Playful, upbeat".to_string(),
            }
        );
        assert_eq!(tone_probe.get_call_count(), 1);

        let prompts = generator_probe.get_prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Playful, upbeat"));
        assert!(prompts[0].contains("yo what's up"));
    }

    #[tokio::test]
    async fn test_chat_tone_failure_uses_fallback() {
        let generator = MockGenerativeClient::new().with_response("Hello.".to_string());
        let generator_probe = generator.clone();
        let tone = MockGenerativeClient::new().with_failure("quota exceeded".to_string());

        let dispatcher = build_test_dispatcher(generator, tone);
        let result = dispatcher
            .dispatch(structured("hello", FeatureId::Chat, None))
            .await
            .unwrap();

        assert_eq!(
            result,
            GenerationResult::Chat {
                text: "Hello.".to_string(),
                personality: FALLBACK_DESCRIPTOR.to_string(),
            }
        );
        assert_eq!(generator_probe.get_call_count(), 1);
        assert!(generator_probe.get_prompts()[0].contains(FALLBACK_DESCRIPTOR));
    }

    #[tokio::test]
    async fn test_chat_primary_failure_is_an_error() {
        let dispatcher = build_test_dispatcher(
            MockGenerativeClient::new().with_failure("503".to_string()),
            MockGenerativeClient::new().with_response("Calm".to_string()),
        );

        let err = dispatcher
            .dispatch(structured("hello", FeatureId::Chat, None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_non_chat_features_skip_tone_analysis() {
        let tone = MockGenerativeClient::new();
        let tone_probe = tone.clone();
        let dispatcher = build_test_dispatcher(MockGenerativeClient::new(), tone);

        dispatcher
            .dispatch(structured("a dragon", FeatureId::Story, None))
            .await
            .unwrap();
        assert_eq!(tone_probe.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_code_language_reaches_instruction() {
        let generator = MockGenerativeClient::new();
        let probe = generator.clone();
        let dispatcher = build_test_dispatcher(generator, MockGenerativeClient::new());

        dispatcher
            .dispatch(structured("fizzbuzz", FeatureId::Code, None))
            .await
            .unwrap();
        dispatcher
            .dispatch(structured("fizzbuzz", FeatureId::Code, Some("rust")))
            .await
            .unwrap();

        let prompts = probe.get_prompts();
        assert_eq!(
            prompts[0],
            "Generate a code snippet in javascript for: fizzbuzz"
        );
        assert_eq!(prompts[1], "Generate a code snippet in rust for: fizzbuzz");
    }

    #[tokio::test]
    async fn test_dream_never_invokes_model() {
        let generator = MockGenerativeClient::new();
        let generator_probe = generator.clone();
        let tone = MockGenerativeClient::new();
        let tone_probe = tone.clone();

        let dispatcher = build_test_dispatcher(generator, tone);
        let result = dispatcher
            .dispatch(structured("a glass forest", FeatureId::Dream, None))
            .await
            .unwrap();

        assert_eq!(
            result,
            GenerationResult::Image {
                image_url: format!("{}?text=a+glass+forest", TEST_DREAM_BASE),
            }
        );
        assert_eq!(generator_probe.get_call_count(), 0);
        assert_eq!(tone_probe.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_binary_request_sends_inline_payload() {
        let generator = MockGenerativeClient::new().with_response("A red bicycle".to_string());
        let probe = generator.clone();
        let dispatcher = build_test_dispatcher(generator, MockGenerativeClient::new());

        let request = BinaryRequest::new(
            Some("What is in the picture?".to_string()),
            Some(Attachment::new(b"hello".to_vec(), Some("image/png".to_string()))),
        )
        .unwrap();

        let result = dispatcher
            .dispatch(RequestEnvelope::Binary(request))
            .await
            .unwrap();
        assert_eq!(
            result,
            GenerationResult::Text {
                text: "A red bicycle".to_string()
            }
        );

        let payloads = probe.get_payloads();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].mime_type, "image/png");
        assert_eq!(payloads[0].data, "aGVsbG8=");
        assert_eq!(probe.get_prompts(), vec!["What is in the picture?".to_string()]);
    }

    #[tokio::test]
    async fn test_structured_image_is_text_only() {
        let generator = MockGenerativeClient::new();
        let probe = generator.clone();
        let dispatcher = build_test_dispatcher(generator, MockGenerativeClient::new());

        dispatcher
            .dispatch(structured("describe a sunset", FeatureId::Image, None))
            .await
            .unwrap();

        assert!(probe.get_payloads().is_empty());
        assert_eq!(probe.get_prompts(), vec!["describe a sunset".to_string()]);
    }

    #[tokio::test]
    async fn test_identical_requests_build_identical_instructions() {
        let generator = MockGenerativeClient::new();
        let probe = generator.clone();
        let dispatcher = build_test_dispatcher(generator, MockGenerativeClient::new());

        for _ in 0..2 {
            dispatcher
                .dispatch(structured("my week was long", FeatureId::Journal, None))
                .await
                .unwrap();
        }

        let prompts = probe.get_prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0], prompts[1]);
    }
}
