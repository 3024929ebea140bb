//! Compose wizard
//!
//! The step machine that drives one message from intent to wall post.

mod controller;
mod error;
mod state;

pub use controller::{DRAFT_KEY, GenerationTicket, Handoff, SelectionTicket, WizardController};
pub use error::WizardError;
pub use state::{AppSettings, FinalState, GenerationState, ResultsView, Step, Tab};
