//! Wizard steps, tabs and the state each step displays

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{
    DraftOutcome, Extras, GeneratedMessage, RadarAxis, SafetyAlert, TargetLanguage, ThemeType,
};
use crate::handoff::Cipher;

/// Compose flow position; the number is what the UI shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Step {
    #[default]
    Idle,
    IntentChosen,
    Drafting,
    Results,
    Finalized,
}

impl Step {
    pub fn number(&self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::IntentChosen => 1,
            Self::Drafting => 2,
            Self::Results => 3,
            Self::Finalized => 4,
        }
    }

    /// Step reached by backward navigation
    pub fn previous(&self) -> Option<Step> {
        match self {
            Self::Idle => None,
            Self::IntentChosen => Some(Self::Idle),
            Self::Drafting => Some(Self::IntentChosen),
            Self::Results => Some(Self::Drafting),
            Self::Finalized => Some(Self::Results),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::IntentChosen => "intent",
            Self::Drafting => "drafting",
            Self::Results => "results",
            Self::Finalized => "final",
        };
        write!(f, "{} ({})", name, self.number())
    }
}

/// Top-level tab, independent of the compose step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Explore,
    Create,
    Me,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Explore => "explore",
            Self::Create => "create",
            Self::Me => "me",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "explore" | "wall" => Ok(Self::Explore),
            "create" | "compose" => Ok(Self::Create),
            "me" | "mine" => Ok(Self::Me),
            other => Err(format!("Unknown tab '{}' (explore, create, me)", other)),
        }
    }
}

/// App-wide settings owned by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppSettings {
    /// UI language; new drafts start in it
    pub app_language: TargetLanguage,
    pub theme: ThemeType,
}

/// What the results step should render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsView {
    Loading,
    /// Safety alert instead of a selection grid
    Alert,
    Choices,
    /// Generation failed, or produced nothing to choose from
    Failed,
}

/// Outcome of the latest draft request
#[derive(Debug, Clone, Default)]
pub struct GenerationState {
    pub loading: bool,
    pub variations: Vec<GeneratedMessage>,
    pub safety_alert: Option<SafetyAlert>,
    pub detected_intent: Option<String>,
    pub error: Option<String>,
}

impl GenerationState {
    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub fn from_outcome(outcome: DraftOutcome) -> Self {
        Self {
            loading: false,
            variations: outcome.variations,
            safety_alert: outcome.safety_alert.filter(|a| a.triggered),
            detected_intent: outcome.detected_intent,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn view(&self) -> ResultsView {
        if self.loading {
            ResultsView::Loading
        } else if self.safety_alert.is_some() {
            ResultsView::Alert
        } else if self.variations.is_empty() {
            ResultsView::Failed
        } else {
            ResultsView::Choices
        }
    }
}

/// The chosen message on the final dashboard
#[derive(Debug, Clone)]
pub struct FinalState {
    pub selected: GeneratedMessage,
    pub extras: Extras,
    /// Transform applied to the displayed text
    pub cipher: Option<Cipher>,
    /// Id of the wall post made from this message
    pub posted: Option<String>,
}

impl FinalState {
    pub fn new(selected: GeneratedMessage, extras: Extras) -> Self {
        Self {
            selected,
            extras,
            cipher: None,
            posted: None,
        }
    }

    /// Text currently shown: the message, or its transformed form
    pub fn display_text(&self) -> String {
        match self.cipher {
            Some(cipher) => cipher.apply(&self.selected.content),
            None => self.selected.content.clone(),
        }
    }

    pub fn radar(&self) -> Vec<RadarAxis> {
        self.extras.radar()
    }
}
