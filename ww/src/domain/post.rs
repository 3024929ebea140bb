//! Published wall posts

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::intent::IntentType;

/// A message published to the anonymous wall
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallPost {
    /// Time-ordered unique id
    pub id: String,
    pub content: String,
    pub intent: IntentType,
    /// Unix milliseconds
    pub timestamp: i64,
    /// Detected intent label for posts written under OTHERS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_label: Option<String>,
    /// Raw text behind a polished VENT post
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_content: Option<String>,
}

impl WallPost {
    /// Label shown on the wall card
    pub fn display_label(&self) -> &str {
        self.custom_label.as_deref().unwrap_or_else(|| self.intent.label())
    }

    pub fn has_original(&self) -> bool {
        self.original_content.is_some()
    }
}

/// Which posts the wall shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WallFilter {
    #[default]
    All,
    Vent,
}

impl WallFilter {
    pub fn matches(&self, post: &WallPost) -> bool {
        match self {
            Self::All => true,
            Self::Vent => post.intent == IntentType::Vent,
        }
    }
}

impl fmt::Display for WallFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "ALL"),
            Self::Vent => write!(f, "VENT"),
        }
    }
}

impl FromStr for WallFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "" => Ok(Self::All),
            "vent" => Ok(Self::Vent),
            other => Err(format!("Unknown wall filter '{}' (all, vent)", other)),
        }
    }
}
