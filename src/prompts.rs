use crate::features::FeatureId;
use crate::models::DEFAULT_CODE_LANGUAGE;
use crate::tone::FALLBACK_DESCRIPTOR;

pub const CHAT: &str = include_str!("../data/prompts/chat.txt");
pub const TONE: &str = include_str!("../data/prompts/tone.txt");
pub const CODE: &str = include_str!("../data/prompts/code.txt");
pub const JOURNAL: &str = include_str!("../data/prompts/journal.txt");
pub const LIVECODE: &str = include_str!("../data/prompts/livecode.txt");
pub const STORY: &str = include_str!("../data/prompts/story.txt");
pub const RECIPE: &str = include_str!("../data/prompts/recipe.txt");
pub const WORKOUT: &str = include_str!("../data/prompts/workout.txt");
pub const DEBUGGER: &str = include_str!("../data/prompts/debugger.txt");

/// Fields a feature may draw on when building its instruction.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptInput<'a> {
    pub prompt: &'a str,
    pub language: Option<&'a str>,
    /// Tone descriptor; only read by chat.
    pub personality: Option<&'a str>,
}

impl<'a> PromptInput<'a> {
    pub fn new(prompt: &'a str) -> Self {
        Self {
            prompt,
            ..Default::default()
        }
    }

    pub fn with_language(mut self, language: Option<&'a str>) -> Self {
        self.language = language;
        self
    }

    pub fn with_personality(mut self, personality: &'a str) -> Self {
        self.personality = Some(personality);
        self
    }
}

/// Exact instruction text sent to the model for `feature`.
///
/// For `image` the prompt travels unmodified next to the inline payload. For
/// `dream` the result is the description embedded in the placeholder URL;
/// it never reaches a model.
pub fn build(feature: FeatureId, input: &PromptInput<'_>) -> String {
    let prompt = input.prompt;
    match feature {
        FeatureId::Chat => render(
            CHAT,
            &[
                (
                    "personality",
                    input.personality.unwrap_or(FALLBACK_DESCRIPTOR),
                ),
                ("prompt", prompt),
            ],
        ),
        FeatureId::Code => render(
            CODE,
            &[
                ("language", input.language.unwrap_or(DEFAULT_CODE_LANGUAGE)),
                ("prompt", prompt),
            ],
        ),
        FeatureId::Image | FeatureId::Dream => prompt.to_string(),
        FeatureId::Journal => render(JOURNAL, &[("prompt", prompt)]),
        FeatureId::LiveCode => render(LIVECODE, &[("prompt", prompt)]),
        FeatureId::Story => render(STORY, &[("prompt", prompt)]),
        FeatureId::Recipe => render(RECIPE, &[("prompt", prompt)]),
        FeatureId::Workout => render(WORKOUT, &[("prompt", prompt)]),
        FeatureId::Debugger => render(DEBUGGER, &[("prompt", prompt)]),
    }
}

/// Instruction for the auxiliary tone-analysis call.
pub fn tone_instruction(message: &str) -> String {
    render(TONE, &[("prompt", message)])
}

/// Replace `{{key}}` placeholders in a template string.
///
/// Substitution is single-pass: text inserted for one key is never scanned
/// for further placeholders. Unknown keys are left as written.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find("}}") else {
            result.push_str(&rest[start..]);
            return result;
        };

        let key = &after[..end];
        match vars.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => result.push_str(value),
            None => result.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }

    result.push_str(rest);
    result
}
