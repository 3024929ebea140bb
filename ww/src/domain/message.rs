//! Form input and generated drafts

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::intent::{IntentType, TargetLanguage};

/// The compose form: everything the generator needs to draft a message
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInput {
    pub intent: IntentType,
    /// Who is this for?
    pub recipient: String,
    /// e.g. classmate, best friend, professor
    pub relationship: String,
    /// What happened?
    pub context: String,
    pub target_language: TargetLanguage,
}

impl UserInput {
    /// Blank form drafting in `language`
    pub fn with_language(language: TargetLanguage) -> Self {
        Self {
            target_language: language,
            ..Self::default()
        }
    }

    /// Copy of this form with a single field replaced
    pub fn with_field(&self, field: InputField) -> Self {
        let mut next = self.clone();
        match field {
            InputField::Intent(intent) => next.intent = intent,
            InputField::Recipient(v) => next.recipient = v,
            InputField::Relationship(v) => next.relationship = v,
            InputField::Context(v) => next.context = v,
            InputField::TargetLanguage(lang) => next.target_language = lang,
        }
        next
    }
}

/// A saved draft as read back from storage
///
/// Fields missing from the stored document stay `None`, so applying it never
/// resets the live form to defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SavedDraft {
    pub intent: Option<IntentType>,
    pub recipient: Option<String>,
    pub relationship: Option<String>,
    pub context: Option<String>,
    pub target_language: Option<TargetLanguage>,
}

impl SavedDraft {
    /// `base` with every present, non-empty saved field applied
    pub fn apply_to(self, base: &UserInput) -> UserInput {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        let mut next = base.clone();
        if let Some(intent) = self.intent {
            next.intent = intent;
        }
        if let Some(recipient) = non_empty(self.recipient) {
            next.recipient = recipient;
        }
        if let Some(relationship) = non_empty(self.relationship) {
            next.relationship = relationship;
        }
        if let Some(context) = non_empty(self.context) {
            next.context = context;
        }
        if let Some(language) = self.target_language {
            next.target_language = language;
        }
        next
    }
}

/// A single-field edit of [`UserInput`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputField {
    Intent(IntentType),
    Recipient(String),
    Relationship(String),
    Context(String),
    TargetLanguage(TargetLanguage),
}

/// One of the four fixed renderings of the same message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tone {
    Warm,
    Playful,
    Polite,
    /// Rendered as "firm but civil" when the source text was aggressive
    Direct,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Self::Warm, Self::Playful, Self::Polite, Self::Direct];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warm => "Warm",
            Self::Playful => "Playful",
            Self::Polite => "Polite",
            Self::Direct => "Direct",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown tone '{}'", s))
    }
}

/// A drafted message; immutable once produced by the generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMessage {
    pub tone: Tone,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_note: Option<String>,
}

/// Hard-block outcome relayed from the generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyAlert {
    pub triggered: bool,
    #[serde(default)]
    pub message: String,
}

/// Result of one draft request
///
/// A triggered alert and a non-empty variation list never coexist.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftOutcome {
    pub variations: Vec<GeneratedMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_alert: Option<SafetyAlert>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_intent: Option<String>,
}

impl DraftOutcome {
    pub fn is_blocked(&self) -> bool {
        self.safety_alert.as_ref().is_some_and(|a| a.triggered)
    }
}
