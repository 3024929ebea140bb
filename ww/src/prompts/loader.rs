//! Prompt Loader
//!
//! Loads prompt templates from an override directory or falls back to
//! embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;
use crate::domain::{TargetLanguage, UserInput};

/// Context for the draft generation template
#[derive(Debug, Clone, Serialize)]
pub struct DraftPromptContext {
    pub intent: &'static str,
    pub recipient: String,
    pub relationship: String,
    pub context: String,
    pub target_language: &'static str,
    /// Only OTHERS asks the model for a detected intent label
    pub wants_detected_intent: bool,
}

impl From<&UserInput> for DraftPromptContext {
    fn from(input: &UserInput) -> Self {
        Self {
            intent: input.intent.as_str(),
            recipient: input.recipient.clone(),
            relationship: input.relationship.clone(),
            context: input.context.clone(),
            target_language: input.target_language.as_str(),
            wants_detected_intent: input.intent.wants_detected_label(),
        }
    }
}

/// Context for the extras template
#[derive(Debug, Clone, Serialize)]
pub struct ExtrasPromptContext {
    pub context: String,
    pub target_language: &'static str,
}

impl ExtrasPromptContext {
    pub fn new(context: impl Into<String>, language: TargetLanguage) -> Self {
        Self {
            context: context.into(),
            target_language: language.as_str(),
        }
    }
}

/// Context for the channel formatting template
#[derive(Debug, Clone, Serialize)]
pub struct ChannelPromptContext {
    /// "EMAIL" or "SMS"
    pub channel: &'static str,
    pub is_email: bool,
    pub content: String,
    pub target_language: &'static str,
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory
    user_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader that checks `user_dir` before the embedded templates
    pub fn new(user_dir: Option<impl AsRef<Path>>) -> Self {
        let user_dir = user_dir.map(|d| d.as_ref().to_path_buf());
        debug!(?user_dir, "PromptLoader::new: called");

        let user_dir = match user_dir {
            Some(dir) if dir.is_dir() => Some(dir),
            Some(dir) => {
                debug!(?dir, "PromptLoader::new: override directory missing, ignoring");
                None
            }
            None => None,
        };

        Self {
            hbs: Self::engine(),
            user_dir,
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            user_dir: None,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        // Prompts are plain text; user text must reach the model unaltered
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `{user_dir}/{name}.pmt`
    /// 2. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref user_dir) = self.user_dir {
            let path = user_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found in user override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read user prompt {}: {}", path.display(), e));
            }
            debug!(?path, "PromptLoader::load_template: not found in user override");
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: found in embedded");
            return Ok(content.to_string());
        }

        debug!(%name, "PromptLoader::load_template: not found anywhere");
        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render<C: Serialize>(&self, template_name: &str, context: &C) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        self.hbs
            .render_template(&template, context)
            .map(|text| text.trim().to_string())
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }

    /// System instruction for draft generation
    pub fn drafts_system(&self) -> Result<String> {
        self.load_template("drafts-system").map(|t| t.trim().to_string())
    }

    pub fn drafts(&self, input: &UserInput) -> Result<String> {
        self.render("drafts", &DraftPromptContext::from(input))
    }

    pub fn extras(&self, context: &str, language: TargetLanguage) -> Result<String> {
        self.render("extras", &ExtrasPromptContext::new(context, language))
    }

    pub fn channel(&self, context: &ChannelPromptContext) -> Result<String> {
        self.render("channel", context)
    }
}

impl Default for PromptLoader {
    fn default() -> Self {
        Self::embedded_only()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IntentType;
    use tempfile::TempDir;

    fn vent_input() -> UserInput {
        UserInput {
            intent: IntentType::Vent,
            recipient: "Sam".to_string(),
            relationship: "lab partner".to_string(),
            context: "You <never> show up & I do \"all\" the work".to_string(),
            target_language: TargetLanguage::Korean,
        }
    }

    #[test]
    fn test_drafts_prompt_embeds_input_unescaped() {
        let loader = PromptLoader::embedded_only();
        let prompt = loader.drafts(&vent_input()).unwrap();

        assert!(prompt.contains("Intent category: VENT"));
        assert!(prompt.contains("Recipient: Sam"));
        assert!(prompt.contains("Relationship: lab partner"));
        assert!(prompt.contains("You <never> show up & I do \"all\" the work"));
        assert!(prompt.contains("Target language: Korean"));
        assert!(prompt.contains("Leave \"detectedIntent\" empty"));
    }

    #[test]
    fn test_drafts_prompt_asks_for_label_only_for_others() {
        let loader = PromptLoader::embedded_only();
        let input = UserInput {
            intent: IntentType::Others,
            ..vent_input()
        };
        let prompt = loader.drafts(&input).unwrap();
        assert!(prompt.contains("The intent category is OTHERS"));
        assert!(!prompt.contains("Leave \"detectedIntent\" empty"));
    }

    #[test]
    fn test_channel_prompt_branches() {
        let loader = PromptLoader::embedded_only();
        let email = loader
            .channel(&ChannelPromptContext {
                channel: "EMAIL",
                is_email: true,
                content: "hi".to_string(),
                target_language: "English",
            })
            .unwrap();
        assert!(email.contains("EMAIL delivery in English"));
        assert!(email.contains("at most 6 words"));

        let sms = loader
            .channel(&ChannelPromptContext {
                channel: "SMS",
                is_email: false,
                content: "hi".to_string(),
                target_language: "Japanese",
            })
            .unwrap();
        assert!(sms.contains("1-3 emoji"));
        assert!(!sms.contains("subject line"));
    }

    #[test]
    fn test_extras_prompt() {
        let loader = PromptLoader::embedded_only();
        let prompt = loader.extras("we met at orientation", TargetLanguage::Chinese).unwrap();
        assert!(prompt.contains("\"we met at orientation\""));
        assert!(prompt.contains("in Chinese"));
    }

    #[test]
    fn test_user_override_wins() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("extras.pmt"), "custom {{context}}").unwrap();

        let loader = PromptLoader::new(Some(dir.path()));
        assert_eq!(loader.extras("ctx", TargetLanguage::English).unwrap(), "custom ctx");
        // Templates without an override still come from the embedded set
        assert!(loader.drafts_system().unwrap().contains("communication coach"));
    }

    #[test]
    fn test_missing_override_dir_is_ignored() {
        let loader = PromptLoader::new(Some("/definitely/not/a/prompt/dir"));
        assert!(loader.drafts_system().is_ok());
    }

    #[test]
    fn test_unknown_template() {
        let loader = PromptLoader::embedded_only();
        assert!(loader.load_template("nonexistent-template").is_err());
    }
}
