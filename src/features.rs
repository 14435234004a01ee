//! The closed set of generation features exposed by the gateway.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureId {
    #[default]
    Chat,
    Code,
    Image,
    Journal,
    #[serde(rename = "livecode")]
    LiveCode,
    Story,
    Recipe,
    Workout,
    Dream,
    Debugger,
}

impl FeatureId {
    pub const ALL: [FeatureId; 10] = [
        FeatureId::Chat,
        FeatureId::Code,
        FeatureId::Image,
        FeatureId::Journal,
        FeatureId::LiveCode,
        FeatureId::Story,
        FeatureId::Recipe,
        FeatureId::Workout,
        FeatureId::Dream,
        FeatureId::Debugger,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureId::Chat => "chat",
            FeatureId::Code => "code",
            FeatureId::Image => "image",
            FeatureId::Journal => "journal",
            FeatureId::LiveCode => "livecode",
            FeatureId::Story => "story",
            FeatureId::Recipe => "recipe",
            FeatureId::Workout => "workout",
            FeatureId::Dream => "dream",
            FeatureId::Debugger => "debugger",
        }
    }

    /// Which generation pipeline serves this feature.
    pub fn pipeline(self) -> Pipeline {
        match self {
            FeatureId::Chat => Pipeline::Persona,
            FeatureId::Dream => Pipeline::PlaceholderImage,
            FeatureId::Code
            | FeatureId::Image
            | FeatureId::Journal
            | FeatureId::LiveCode
            | FeatureId::Story
            | FeatureId::Recipe
            | FeatureId::Workout
            | FeatureId::Debugger => Pipeline::Text,
        }
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureId {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self> {
        FeatureId::ALL
            .into_iter()
            .find(|feature| feature.as_str() == tag)
            .ok_or_else(|| Error::UnknownFeature(tag.to_string()))
    }
}

/// How a feature reaches (or bypasses) the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    /// Tone analysis followed by a persona-conditioned generation call.
    Persona,
    /// A single generation call with the feature's instruction text.
    Text,
    /// No model call; a placeholder image reference is fabricated.
    PlaceholderImage,
}
