//! Intent catalogue, target languages and themes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// What the user is trying to do with the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentType {
    Confess,
    Repair,
    Help,
    Suggest,
    Vent,
    Appreciation,
    #[default]
    Friendship,
    Others,
}

impl IntentType {
    /// Every intent, in menu order
    pub const ALL: [IntentType; 8] = [
        Self::Confess,
        Self::Repair,
        Self::Help,
        Self::Suggest,
        Self::Vent,
        Self::Appreciation,
        Self::Friendship,
        Self::Others,
    ];

    /// Wire name used in prompts and persisted posts
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confess => "CONFESS",
            Self::Repair => "REPAIR",
            Self::Help => "HELP",
            Self::Suggest => "SUGGEST",
            Self::Vent => "VENT",
            Self::Appreciation => "APPRECIATION",
            Self::Friendship => "FRIENDSHIP",
            Self::Others => "OTHERS",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Confess => "Confess",
            Self::Repair => "Repair",
            Self::Help => "Ask for Help",
            Self::Suggest => "Suggest",
            Self::Vent => "Vent",
            Self::Appreciation => "Appreciate",
            Self::Friendship => "Friendship",
            Self::Others => "Others",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Confess => "Say the thing you've been holding back",
            Self::Repair => "Mend a misunderstanding or apologize",
            Self::Help => "Reach out when you need support",
            Self::Suggest => "Offer an idea without stepping on toes",
            Self::Vent => "Let off steam, safely and anonymously",
            Self::Appreciation => "Thank someone who made a difference",
            Self::Friendship => "Start or deepen a connection",
            Self::Others => "Something else entirely",
        }
    }

    /// Whether the generator should also name the intent it detected
    pub fn wants_detected_label(&self) -> bool {
        matches!(self, Self::Others)
    }
}

impl fmt::Display for IntentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IntentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "IntentType::from_str: called");
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|i| i.as_str().eq_ignore_ascii_case(wanted) || i.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown intent '{}'", s))
    }
}

/// Language the drafts are written in (also the app UI language)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TargetLanguage {
    #[default]
    English,
    Chinese,
    Korean,
    Japanese,
}

impl TargetLanguage {
    pub const ALL: [TargetLanguage; 4] = [Self::English, Self::Chinese, Self::Korean, Self::Japanese];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Chinese => "Chinese",
            Self::Korean => "Korean",
            Self::Japanese => "Japanese",
        }
    }

    /// Name of the language in itself
    pub fn native_name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Chinese => "中文",
            Self::Korean => "한국어",
            Self::Japanese => "日本語",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Chinese => "zh",
            Self::Korean => "ko",
            Self::Japanese => "ja",
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TargetLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|l| {
                l.as_str().eq_ignore_ascii_case(wanted) || l.code().eq_ignore_ascii_case(wanted) || l.native_name() == wanted
            })
            .ok_or_else(|| format!("Unknown language '{}' (English, Chinese, Korean, Japanese)", s))
    }
}

/// Visual theme id; rendering is up to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThemeType {
    #[default]
    Dark,
    Light,
    Code,
    Word,
    Excel,
    PowerPoint,
    WeChat,
    X,
}

impl ThemeType {
    pub const ALL: [ThemeType; 8] = [
        Self::Dark,
        Self::Light,
        Self::Code,
        Self::Word,
        Self::Excel,
        Self::PowerPoint,
        Self::WeChat,
        Self::X,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
            Self::Code => "Code",
            Self::Word => "Word",
            Self::Excel => "Excel",
            Self::PowerPoint => "PowerPoint",
            Self::WeChat => "WeChat",
            Self::X => "X",
        }
    }
}

impl fmt::Display for ThemeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ThemeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown theme '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_wire_names() {
        assert_eq!(serde_json::to_string(&IntentType::Vent).unwrap(), "\"VENT\"");
        assert_eq!(
            serde_json::from_str::<IntentType>("\"APPRECIATION\"").unwrap(),
            IntentType::Appreciation
        );
        for intent in IntentType::ALL {
            let json = serde_json::to_string(&intent).unwrap();
            assert_eq!(json, format!("\"{}\"", intent.as_str()));
        }
    }

    #[test]
    fn test_intent_from_str() {
        assert_eq!("vent".parse::<IntentType>().unwrap(), IntentType::Vent);
        assert_eq!("Ask for Help".parse::<IntentType>().unwrap(), IntentType::Help);
        assert_eq!(" OTHERS ".parse::<IntentType>().unwrap(), IntentType::Others);
        assert!("gossip".parse::<IntentType>().is_err());
    }

    #[test]
    fn test_only_others_wants_label() {
        let wanting: Vec<_> = IntentType::ALL.into_iter().filter(|i| i.wants_detected_label()).collect();
        assert_eq!(wanting, vec![IntentType::Others]);
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!("ko".parse::<TargetLanguage>().unwrap(), TargetLanguage::Korean);
        assert_eq!("japanese".parse::<TargetLanguage>().unwrap(), TargetLanguage::Japanese);
        assert_eq!("中文".parse::<TargetLanguage>().unwrap(), TargetLanguage::Chinese);
        assert!("klingon".parse::<TargetLanguage>().is_err());
        assert_eq!(serde_json::to_string(&TargetLanguage::English).unwrap(), "\"English\"");
    }

    #[test]
    fn test_theme_parsing() {
        assert_eq!("powerpoint".parse::<ThemeType>().unwrap(), ThemeType::PowerPoint);
        assert_eq!(ThemeType::default(), ThemeType::Dark);
    }
}
