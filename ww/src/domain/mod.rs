//! Domain types shared by the generator, the wizard and the wall

mod channel;
mod extras;
mod intent;
mod message;
mod post;

pub use channel::{Channel, FormattedMessage};
pub use extras::{
    DEFAULT_RELATIONSHIP_SCORE, Difficulty, EXTRAS_LIST_LEN, Extras, FriendshipMission, RadarAxis, TopicSuggestion,
};
pub use intent::{IntentType, TargetLanguage, ThemeType};
pub use message::{DraftOutcome, GeneratedMessage, InputField, SafetyAlert, SavedDraft, Tone, UserInput};
pub use post::{WallFilter, WallPost};
