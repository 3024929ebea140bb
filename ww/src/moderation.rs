//! Local soft-censor stage for generated drafts
//!
//! Masks profanity the remote model left in place, keeping the first letter
//! and replacing the rest of the word with asterisks. Never blocks a draft.

use regex::{Captures, Regex};
use tracing::debug;

use crate::config::ModerationConfig;
use crate::domain::GeneratedMessage;

/// Terms masked by default, matched as whole words with common inflections
pub const DEFAULT_TERMS: &[&str] = &[
    "fuck", "shit", "bitch", "asshole", "bastard", "dick", "crap", "damn", "piss", "stupid", "idiot", "moron",
    "dumbass", "jerk", "wtf",
];

/// Inflections accepted after a term; anything else is a different word
const SUFFIXES: &str = "s|es|ed|er|ers|ing|in";

/// Whole-word, case-insensitive matcher over a list of terms
#[derive(Debug, Clone)]
pub struct LocalFilter {
    pattern: Regex,
}

impl LocalFilter {
    /// Filter over the default terms plus `extra_terms`
    pub fn new<S: AsRef<str>>(extra_terms: &[S]) -> Result<Self, regex::Error> {
        let mut terms: Vec<String> = DEFAULT_TERMS.iter().map(|t| t.to_string()).collect();
        terms.extend(
            extra_terms
                .iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty()),
        );
        debug!(term_count = terms.len(), "LocalFilter::new: called");

        // Longer terms first so alternation prefers the most specific match
        terms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        terms.dedup();
        let alternation = terms.iter().map(|s| regex::escape(s)).collect::<Vec<_>>().join("|");
        let pattern = Regex::new(&format!(r"(?i)\b(?:{})(?:{})?\b", alternation, SUFFIXES))?;

        Ok(Self { pattern })
    }

    /// Build from config; `None` when the stage is switched off
    pub fn from_config(config: &ModerationConfig) -> Result<Option<Self>, regex::Error> {
        if !config.local_filter {
            debug!("LocalFilter::from_config: disabled");
            return Ok(None);
        }
        Self::new(&config.extra_terms).map(Some)
    }

    /// Mask every matching word
    pub fn mask(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, |caps: &Captures| mask_word(&caps[0]))
            .into_owned()
    }

    /// True when `text` still holds a word that would be masked
    pub fn contains_unmasked(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Mask the content and safety note of every variation in place
    pub fn apply(&self, variations: &mut [GeneratedMessage]) -> usize {
        let mut changed = 0;
        for message in variations.iter_mut() {
            if self.contains_unmasked(&message.content) {
                message.content = self.mask(&message.content);
                changed += 1;
            }
            if let Some(note) = message.safety_note.as_mut()
                && self.contains_unmasked(note)
            {
                *note = self.mask(note);
            }
        }
        debug!(%changed, "LocalFilter::apply: done");
        changed
    }
}

/// First letter kept, the rest as asterisks
pub fn mask_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => std::iter::once(first).chain(chars.map(|_| '*')).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Tone;

    fn filter() -> LocalFilter {
        LocalFilter::new::<&str>(&[]).unwrap()
    }

    #[test]
    fn test_mask_word() {
        assert_eq!(mask_word("fuck"), "f***");
        assert_eq!(mask_word("stupid"), "s*****");
        assert_eq!(mask_word("a"), "a");
        assert_eq!(mask_word(""), "");
    }

    #[test]
    fn test_masks_profanity_keeping_case_of_first_letter() {
        let text = "I hate this Fucking class, it's so STUPID.";
        assert_eq!(filter().mask(text), "I hate this F****** class, it's so S*****.");
    }

    #[test]
    fn test_whole_word_only() {
        // "scrappy" contains "crap" but does not start with it
        let text = "a scrappy classic";
        assert_eq!(filter().mask(text), text);
        assert!(!filter().contains_unmasked(text));
    }

    #[test]
    fn test_names_and_innocent_words_untouched() {
        let text = "Let's read Dickens and Emily Dickinson, then grab beef jerky at Crapo Park.";
        assert_eq!(filter().mask(text), text);
        assert!(!filter().contains_unmasked(text));
    }

    #[test]
    fn test_inflections_masked() {
        let text = "jerks, idiots and damned fuckers";
        assert_eq!(filter().mask(text), "j****, i***** and d***** f******");
    }

    #[test]
    fn test_already_masked_text_is_clean() {
        let text = "I hate this f***ing class";
        assert!(!filter().contains_unmasked(text));
        assert_eq!(filter().mask(text), text);
    }

    #[test]
    fn test_extra_terms() {
        let f = LocalFilter::new(&["Heck", "  "]).unwrap();
        assert_eq!(f.mask("what the heckin heck"), "what the h***** h***");
    }

    #[test]
    fn test_from_config_disabled() {
        let config = ModerationConfig {
            local_filter: false,
            extra_terms: vec![],
        };
        assert!(LocalFilter::from_config(&config).unwrap().is_none());
        assert!(LocalFilter::from_config(&ModerationConfig::default()).unwrap().is_some());
    }

    #[test]
    fn test_apply_to_variations() {
        let mut variations = vec![
            GeneratedMessage {
                tone: Tone::Direct,
                content: "This shit has to stop.".to_string(),
                safety_note: Some("It's ok to be pissed".to_string()),
            },
            GeneratedMessage {
                tone: Tone::Warm,
                content: "I miss you.".to_string(),
                safety_note: None,
            },
        ];

        assert_eq!(filter().apply(&mut variations), 1);
        assert_eq!(variations[0].content, "This s*** has to stop.");
        assert_eq!(variations[0].safety_note.as_deref(), Some("It's ok to be p*****"));
        assert_eq!(variations[1].content, "I miss you.");
    }
}
