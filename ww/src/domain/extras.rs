//! Relationship extras fetched after a draft is chosen

use serde::{Deserialize, Serialize};

/// Score used whenever the real one is unavailable
pub const DEFAULT_RELATIONSHIP_SCORE: u8 = 50;

/// How many missions and topics a reply may carry
pub const EXTRAS_LIST_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Deep,
}

/// A small action that improves the connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendshipMission {
    pub title: String,
    pub difficulty: Difficulty,
    pub description: String,
}

/// A conversation starter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSuggestion {
    pub category: String,
    pub starter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extras {
    pub missions: Vec<FriendshipMission>,
    pub topics: Vec<TopicSuggestion>,
    /// 0..=100 closeness estimate
    pub relationship_score: u8,
}

impl Default for Extras {
    fn default() -> Self {
        Self::fallback()
    }
}

impl Extras {
    /// Empty suggestions with a neutral score
    pub fn fallback() -> Self {
        Self {
            missions: Vec::new(),
            topics: Vec::new(),
            relationship_score: DEFAULT_RELATIONSHIP_SCORE,
        }
    }

    /// Five-axis view of the relationship score
    pub fn radar(&self) -> Vec<RadarAxis> {
        let score = f64::from(self.relationship_score);
        vec![
            RadarAxis::new("Trust", score),
            RadarAxis::new("Fun", score * 0.8),
            RadarAxis::new("Depth", score * 0.9),
            RadarAxis::new("Openness", score * 0.7),
            RadarAxis::new("Empathy", 85.0),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarAxis {
    pub label: &'static str,
    pub value: f64,
    pub max: f64,
}

impl RadarAxis {
    fn new(label: &'static str, value: f64) -> Self {
        Self { label, value, max: 100.0 }
    }
}
