//! Response schemas and validation of structured replies
//!
//! Each reply is decoded into a loose wire shape first, then checked and
//! normalized into the domain type. Shape mismatches are parse failures.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::domain::{
    Channel, DEFAULT_RELATIONSHIP_SCORE, DraftOutcome, EXTRAS_LIST_LEN, Extras, FormattedMessage, FriendshipMission,
    GeneratedMessage, IntentType, SafetyAlert, Tone, TopicSuggestion,
};
use crate::llm::ResponseSchema;

/// Most variations a draft reply may carry
pub const MAX_VARIATIONS: usize = 4;

/// Longest accepted detected-intent label, in words
pub const MAX_LABEL_WORDS: usize = 3;

/// Longest email subject kept, in words
pub const MAX_SUBJECT_WORDS: usize = 6;

pub fn drafts_schema() -> ResponseSchema {
    ResponseSchema::new(
        "emit_drafts",
        "Return the drafted message variations, or a safety alert instead of drafts.",
        json!({
            "type": "object",
            "properties": {
                "detectedIntent": {
                    "type": "string",
                    "description": "If the intent is OTHERS, a short 1-3 word label for the detected intent in the target language. Otherwise empty."
                },
                "variations": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "tone": { "type": "string", "enum": ["Warm", "Playful", "Polite", "Direct"] },
                            "content": { "type": "string" },
                            "safetyNote": {
                                "type": "string",
                                "description": "A brief psychological safety note or self-reflection prompt for the sender."
                            }
                        },
                        "required": ["tone", "content"]
                    }
                },
                "safetyAlert": {
                    "type": "object",
                    "properties": {
                        "triggered": { "type": "boolean" },
                        "message": { "type": "string" }
                    },
                    "required": ["triggered"]
                }
            },
            "required": ["variations"]
        }),
    )
}

pub fn extras_schema() -> ResponseSchema {
    ResponseSchema::new(
        "emit_extras",
        "Return friendship missions, conversation topics and a relationship score.",
        json!({
            "type": "object",
            "properties": {
                "missions": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "difficulty": { "type": "string", "enum": ["Easy", "Medium", "Deep"] },
                            "description": { "type": "string" }
                        },
                        "required": ["title", "difficulty", "description"]
                    }
                },
                "topics": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "category": { "type": "string" },
                            "starter": { "type": "string" }
                        },
                        "required": ["category", "starter"]
                    }
                },
                "relationshipScore": {
                    "type": "number",
                    "description": "0-100 estimated health/closeness based on context"
                }
            },
            "required": ["missions", "topics", "relationshipScore"]
        }),
    )
}

pub fn channel_schema() -> ResponseSchema {
    ResponseSchema::new(
        "emit_formatted",
        "Return the message rewritten for the delivery channel.",
        json!({
            "type": "object",
            "properties": {
                "subject": { "type": "string" },
                "body": { "type": "string" }
            },
            "required": ["body"]
        }),
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDrafts {
    variations: Option<Vec<WireVariation>>,
    safety_alert: Option<WireAlert>,
    detected_intent: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireVariation {
    tone: String,
    content: String,
    safety_note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireAlert {
    #[serde(default)]
    triggered: bool,
    message: Option<String>,
}

/// Validate a draft reply for a request made under `intent`
pub fn parse_drafts(payload: Value, intent: IntentType) -> Result<DraftOutcome, String> {
    debug!(%intent, "parse_drafts: called");
    let wire: WireDrafts = serde_json::from_value(payload).map_err(|e| e.to_string())?;

    let alert = wire.safety_alert.filter(|a| a.triggered).map(|a| SafetyAlert {
        triggered: true,
        message: a.message.map(|m| m.trim().to_string()).unwrap_or_default(),
    });

    if let Some(alert) = alert {
        debug!("parse_drafts: safety alert triggered, dropping variations");
        return Ok(DraftOutcome {
            variations: Vec::new(),
            safety_alert: Some(alert),
            detected_intent: None,
        });
    }

    let wire_variations = wire
        .variations
        .ok_or_else(|| "reply has neither variations nor a safety alert".to_string())?;

    let mut variations = Vec::with_capacity(MAX_VARIATIONS);
    for v in wire_variations {
        let tone: Tone = v.tone.parse()?;
        let content = v.content.trim();
        if content.is_empty() {
            debug!(%tone, "parse_drafts: skipping empty variation");
            continue;
        }
        variations.push(GeneratedMessage {
            tone,
            content: content.to_string(),
            safety_note: v.safety_note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        });
    }
    variations.truncate(MAX_VARIATIONS);

    let detected_intent = if intent.wants_detected_label() {
        wire.detected_intent.and_then(normalize_label)
    } else {
        None
    };

    Ok(DraftOutcome {
        variations,
        safety_alert: None,
        detected_intent,
    })
}

fn normalize_label(label: String) -> Option<String> {
    let words: Vec<&str> = label.split_whitespace().collect();
    if words.is_empty() || words.len() > MAX_LABEL_WORDS {
        debug!(%label, "normalize_label: rejected");
        return None;
    }
    Some(words.join(" "))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireExtras {
    #[serde(default)]
    missions: Vec<FriendshipMission>,
    #[serde(default)]
    topics: Vec<TopicSuggestion>,
    relationship_score: Option<f64>,
}

/// Validate an extras reply
pub fn parse_extras(payload: Value) -> Result<Extras, String> {
    debug!("parse_extras: called");
    let wire: WireExtras = serde_json::from_value(payload).map_err(|e| e.to_string())?;

    let relationship_score = match wire.relationship_score {
        None => DEFAULT_RELATIONSHIP_SCORE,
        Some(score) if score.is_finite() && (0.0..=100.0).contains(&score) => score.round() as u8,
        Some(score) => return Err(format!("relationship score {} outside 0..=100", score)),
    };

    let mut missions = wire.missions;
    missions.truncate(EXTRAS_LIST_LEN);
    let mut topics = wire.topics;
    topics.truncate(EXTRAS_LIST_LEN);

    Ok(Extras {
        missions,
        topics,
        relationship_score,
    })
}

#[derive(Debug, Deserialize)]
struct WireFormatted {
    subject: Option<String>,
    #[serde(default)]
    body: String,
}

/// Validate a channel formatting reply
pub fn parse_formatted(payload: Value, channel: Channel) -> Result<FormattedMessage, String> {
    debug!(%channel, "parse_formatted: called");
    let wire: WireFormatted = serde_json::from_value(payload).map_err(|e| e.to_string())?;

    let body = wire.body.trim();
    if body.is_empty() {
        return Err("reply body is empty".to_string());
    }

    let subject = match channel {
        Channel::Sms => None,
        Channel::Email => wire.subject.and_then(|s| {
            let words: Vec<&str> = s.split_whitespace().take(MAX_SUBJECT_WORDS).collect();
            if words.is_empty() { None } else { Some(words.join(" ")) }
        }),
    };

    Ok(FormattedMessage {
        subject,
        body: body.to_string(),
    })
}
