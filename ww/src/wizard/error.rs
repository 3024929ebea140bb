//! Wizard errors

use thiserror::Error;

use super::Step;

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Cannot {action} at step {step}")]
    InvalidStep { action: &'static str, step: Step },

    #[error("A {0} request is already in flight")]
    Busy(&'static str),

    #[error("Recipient and context are required before generating")]
    IncompleteForm,

    #[error("No variation #{0} to choose")]
    NoSuchVariation(usize),

    #[error("This message is already on the wall")]
    AlreadyPosted,

    #[error("Post {0} was not written on this device")]
    NotOwner(String),

    #[error("No post with id {0}")]
    NoSuchPost(String),

    #[error("Local storage failed: {0}")]
    Storage(#[from] wallstore::StoreError),
}
