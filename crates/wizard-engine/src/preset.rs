use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wizard_spec::AnswerSet;

/// Current persistence envelope version.
pub const ENVELOPE_VERSION: u32 = 1;

/// A named, persisted snapshot of a complete answer set, scoped to one
/// questionnaire definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub questionnaire_id: String,
    pub answers: AnswerSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Preset {
    pub(crate) fn mint(
        name: &str,
        answers: AnswerSet,
        questionnaire_id: &str,
        description: Option<String>,
        tags: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            questionnaire_id: questionnaire_id.to_string(),
            answers,
            description,
            tags,
            created_at: now,
            updated_at: now,
        }
    }

    /// Case-insensitive match against name, description, and tags;
    /// `needle` must already be lowercased.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|text| text.to_lowercase().contains(needle))
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(needle))
    }
}

/// Partial update applied by `PresetStore::update`; `None` fields are
/// left as stored.
#[derive(Debug, Clone, Default)]
pub struct PresetPatch {
    pub name: Option<String>,
    pub answers: Option<AnswerSet>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Versioned persistence envelope holding every stored preset.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PresetFile {
    pub version: u32,
    pub updated_at: DateTime<Utc>,
    pub presets: Vec<Preset>,
}

impl Default for PresetFile {
    fn default() -> Self {
        Self {
            version: ENVELOPE_VERSION,
            updated_at: Utc::now(),
            presets: Vec::new(),
        }
    }
}
