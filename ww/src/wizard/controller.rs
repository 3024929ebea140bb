//! The compose wizard state machine
//!
//! Idle(0) -> IntentChosen(1) -> Drafting(2) -> Results(3) -> Finalized(4),
//! with backward navigation, reset to Idle from anywhere, and a top-level tab
//! that moves independently of the step.
//!
//! Async work is split into `begin_*` (validate, mark in flight, hand out a
//! ticket) and `complete_*` (apply the result if the ticket is still current).
//! Reset and backward navigation bump the epoch, so late replies for an
//! abandoned request are dropped instead of overwriting newer state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use wallstore::{LocalStore, StoreExt};

use super::{AppSettings, FinalState, GenerationState, ResultsView, Step, Tab, WizardError};
use crate::domain::{
    Channel, DraftOutcome, Extras, GeneratedMessage, InputField, IntentType, SavedDraft, TargetLanguage, ThemeType,
    UserInput, WallPost,
};
use crate::handoff::{self, Cipher};
use crate::history::EditHistoryManager;
use crate::service::{DraftService, GenerationError};
use crate::wall::{DeleteRequest, WallRepository, WallView};

/// Storage key of the saved draft slot
pub const DRAFT_KEY: &str = "whisperwall_draft";

/// Proof that a draft request was started, and for which input
#[derive(Debug, Clone)]
pub struct GenerationTicket {
    epoch: u64,
    pub input: UserInput,
}

/// Proof that an extras prefetch was started for a chosen message
#[derive(Debug, Clone)]
pub struct SelectionTicket {
    epoch: u64,
    pub message: GeneratedMessage,
    pub context: String,
    pub language: TargetLanguage,
}

/// A ready-to-open composition URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
    pub channel: Channel,
    pub subject: Option<String>,
    pub body: String,
    pub url: String,
}

pub struct WizardController {
    service: Arc<DraftService>,
    store: Arc<dyn LocalStore>,
    wall: WallRepository,
    wall_view: WallView,
    settings: AppSettings,
    tab: Tab,
    step: Step,
    history: EditHistoryManager<UserInput>,
    generation: GenerationState,
    final_state: Option<FinalState>,
    epoch: u64,
    extras_in_flight: Option<u64>,
}

impl WizardController {
    pub fn new(
        service: Arc<DraftService>,
        store: Arc<dyn LocalStore>,
        settings: AppSettings,
        debounce: Duration,
    ) -> Self {
        debug!(?settings, "WizardController::new: called");
        let wall = WallRepository::open(store.clone());
        Self {
            service,
            store,
            wall,
            wall_view: WallView::new(),
            settings,
            tab: Tab::default(),
            step: Step::Idle,
            history: EditHistoryManager::new(UserInput::with_language(settings.app_language), debounce),
            generation: GenerationState::default(),
            final_state: None,
            epoch: 0,
            extras_in_flight: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn settings(&self) -> AppSettings {
        self.settings
    }

    /// The live form
    pub fn input(&self) -> &UserInput {
        self.history.current()
    }

    pub fn history(&self) -> &EditHistoryManager<UserInput> {
        &self.history
    }

    pub fn generation(&self) -> &GenerationState {
        &self.generation
    }

    pub fn results_view(&self) -> ResultsView {
        self.generation.view()
    }

    pub fn final_state(&self) -> Option<&FinalState> {
        self.final_state.as_ref()
    }

    pub fn wall(&self) -> &WallRepository {
        &self.wall
    }

    pub fn wall_view(&self) -> &WallView {
        &self.wall_view
    }

    pub fn wall_view_mut(&mut self) -> &mut WallView {
        &mut self.wall_view
    }

    fn require(&self, action: &'static str, allowed: &[Step]) -> Result<(), WizardError> {
        if allowed.contains(&self.step) {
            Ok(())
        } else {
            debug!(%action, step = %self.step, "require: rejected");
            Err(WizardError::InvalidStep { action, step: self.step })
        }
    }

    fn set_step(&mut self, step: Step) {
        debug!(from = %self.step, to = %step, "set_step: called");
        self.step = step;
    }

    // Navigation

    /// 0 -> 1
    pub fn start(&mut self) -> Result<(), WizardError> {
        self.require("start", &[Step::Idle])?;
        self.set_step(Step::IntentChosen);
        Ok(())
    }

    /// 1 -> 2, recording the intent into the form
    pub fn select_intent(&mut self, intent: IntentType, now: Instant) -> Result<(), WizardError> {
        self.require("choose an intent", &[Step::IntentChosen])?;
        self.record(InputField::Intent(intent), now);
        self.set_step(Step::Drafting);
        Ok(())
    }

    /// Edit one form field
    pub fn edit(&mut self, field: InputField, now: Instant) -> Result<(), WizardError> {
        self.require("edit the draft", &[Step::Drafting])?;
        self.record(field, now);
        Ok(())
    }

    fn record(&mut self, field: InputField, now: Instant) {
        let next = self.history.current().with_field(field);
        self.history.record(next, now);
    }

    /// Commit a debounced edit whose window has elapsed
    pub fn tick(&mut self, now: Instant) -> bool {
        self.history.tick(now)
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo().is_some()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo().is_some()
    }

    /// One step backward
    ///
    /// Leaving the results or final step abandons anything in flight.
    pub fn back(&mut self) -> Result<(), WizardError> {
        let Some(previous) = self.step.previous() else {
            return Err(WizardError::InvalidStep {
                action: "go back",
                step: self.step,
            });
        };

        match self.step {
            Step::Results => {
                self.epoch += 1;
                self.extras_in_flight = None;
                self.generation = GenerationState::default();
            }
            Step::Finalized => {
                self.epoch += 1;
                self.final_state = None;
            }
            _ => {}
        }
        self.set_step(previous);
        Ok(())
    }

    /// Back to Idle with a blank form in the app language
    pub fn reset(&mut self) {
        info!(step = %self.step, "reset: called");
        self.epoch += 1;
        self.set_step(Step::Idle);
        self.history.reset(UserInput::with_language(self.settings.app_language));
        self.generation = GenerationState::default();
        self.final_state = None;
        self.extras_in_flight = None;
    }

    // Tabs and settings

    /// Switch tabs; the compose step is kept
    pub fn set_tab(&mut self, tab: Tab) {
        debug!(from = %self.tab, to = %tab, "set_tab: called");
        self.tab = tab;
    }

    /// Start over on the create tab
    pub fn write_new_whisper(&mut self) {
        self.set_tab(Tab::Create);
        self.reset();
        self.set_step(Step::IntentChosen);
    }

    /// Change the UI language; the draft follows it
    pub fn set_app_language(&mut self, language: TargetLanguage, now: Instant) {
        debug!(%language, "set_app_language: called");
        self.settings.app_language = language;
        if self.input().target_language != language {
            self.record(InputField::TargetLanguage(language), now);
        }
    }

    pub fn set_theme(&mut self, theme: ThemeType) {
        debug!(%theme, "set_theme: called");
        self.settings.theme = theme;
    }

    // Draft slot

    /// Overwrite the saved draft with the live form
    pub fn save_draft(&self) -> Result<(), WizardError> {
        debug!("save_draft: called");
        self.store.save(DRAFT_KEY, self.input())?;
        info!("Saved draft");
        Ok(())
    }

    /// Saved draft, if one exists and is readable
    pub fn saved_draft(&self) -> Option<SavedDraft> {
        self.store.load(DRAFT_KEY)
    }

    /// Apply the saved draft's present, non-empty fields as a single edit
    ///
    /// Returns false when there is no readable saved draft.
    pub fn load_draft(&mut self, now: Instant) -> Result<bool, WizardError> {
        self.require("load a draft", &[Step::Drafting])?;
        let Some(saved) = self.saved_draft() else {
            debug!("load_draft: nothing saved");
            return Ok(false);
        };

        let next = saved.apply_to(self.input());
        self.history.record(next, now);
        info!("Loaded saved draft");
        Ok(true)
    }

    // Generation

    /// 2 -> 3: validate the form and mark generation in flight
    pub fn begin_generate(&mut self) -> Result<GenerationTicket, WizardError> {
        self.require("generate", &[Step::Drafting, Step::Results])?;
        if self.generation.loading {
            return Err(WizardError::Busy("generation"));
        }
        let input = self.input();
        if input.recipient.trim().is_empty() || input.context.trim().is_empty() {
            return Err(WizardError::IncompleteForm);
        }

        self.history.flush();
        self.epoch += 1;
        self.extras_in_flight = None;
        self.final_state = None;
        self.generation = GenerationState::loading();
        self.set_step(Step::Results);

        Ok(GenerationTicket {
            epoch: self.epoch,
            input: self.input().clone(),
        })
    }

    /// Apply a draft result; false when the ticket is stale
    pub fn complete_generate(
        &mut self,
        ticket: GenerationTicket,
        result: Result<DraftOutcome, GenerationError>,
    ) -> bool {
        if ticket.epoch != self.epoch || self.step != Step::Results {
            debug!(ticket = ticket.epoch, epoch = self.epoch, "complete_generate: discarding stale result");
            return false;
        }

        self.generation = match result {
            Ok(outcome) => GenerationState::from_outcome(outcome),
            Err(e) => {
                warn!(error = %e, "complete_generate: generation failed");
                GenerationState::failed(e.user_message())
            }
        };
        info!(view = ?self.generation.view(), "complete_generate: applied");
        true
    }

    /// Run a whole draft request
    pub async fn generate(&mut self) -> Result<ResultsView, WizardError> {
        let ticket = self.begin_generate()?;
        let service = self.service.clone();
        let result = service.draft_messages(&ticket.input).await;
        self.complete_generate(ticket, result);
        Ok(self.generation.view())
    }

    // Selection

    /// Choose variation `index` and mark the extras prefetch in flight
    pub fn begin_select(&mut self, index: usize) -> Result<SelectionTicket, WizardError> {
        self.require("choose a message", &[Step::Results])?;
        if self.generation.loading {
            return Err(WizardError::Busy("generation"));
        }
        if self.extras_in_flight == Some(self.epoch) {
            return Err(WizardError::Busy("extras"));
        }
        let message = self
            .generation
            .variations
            .get(index)
            .cloned()
            .ok_or(WizardError::NoSuchVariation(index))?;

        self.extras_in_flight = Some(self.epoch);
        let input = self.input();
        Ok(SelectionTicket {
            epoch: self.epoch,
            message,
            context: input.context.clone(),
            language: input.target_language,
        })
    }

    /// 3 -> 4 with the prefetched extras; false when the ticket is stale
    pub fn complete_select(&mut self, ticket: SelectionTicket, extras: Extras) -> bool {
        if ticket.epoch != self.epoch || self.step != Step::Results {
            debug!(ticket = ticket.epoch, epoch = self.epoch, "complete_select: discarding stale extras");
            return false;
        }
        self.extras_in_flight = None;
        self.final_state = Some(FinalState::new(ticket.message, extras));
        self.set_step(Step::Finalized);
        true
    }

    /// Choose a variation, prefetch extras, and enter the final dashboard
    pub async fn select(&mut self, index: usize) -> Result<(), WizardError> {
        let ticket = self.begin_select(index)?;
        let service = self.service.clone();
        let extras = service.fetch_extras(&ticket.context, ticket.language).await;
        self.complete_select(ticket, extras);
        Ok(())
    }

    // Final dashboard

    fn final_mut(&mut self, action: &'static str) -> Result<&mut FinalState, WizardError> {
        let step = self.step;
        match self.final_state.as_mut() {
            Some(state) if step == Step::Finalized => Ok(state),
            _ => Err(WizardError::InvalidStep { action, step }),
        }
    }

    fn final_ref(&self, action: &'static str) -> Result<&FinalState, WizardError> {
        match self.final_state.as_ref() {
            Some(state) if self.step == Step::Finalized => Ok(state),
            _ => Err(WizardError::InvalidStep { action, step: self.step }),
        }
    }

    /// Text shown on the final dashboard
    pub fn display_text(&self) -> Option<String> {
        self.final_state.as_ref().map(FinalState::display_text)
    }

    pub fn apply_cipher(&mut self, cipher: Cipher) -> Result<String, WizardError> {
        let state = self.final_mut("transform the message")?;
        state.cipher = Some(cipher);
        Ok(state.display_text())
    }

    pub fn restore_original(&mut self) -> Result<String, WizardError> {
        let state = self.final_mut("restore the message")?;
        state.cipher = None;
        Ok(state.display_text())
    }

    /// Composition URL for `channel`
    ///
    /// The body is the channel-formatted text, or the transformed display
    /// text when a cipher is active.
    pub async fn handoff(&self, channel: Channel, ios: bool) -> Result<Handoff, WizardError> {
        let state = self.final_ref("hand off the message")?;
        let formatted = self
            .service
            .format_for_channel(&state.selected.content, channel, self.input().target_language)
            .await;

        let body = match state.cipher {
            Some(_) => state.display_text(),
            None => formatted.body,
        };

        let handoff = match channel {
            Channel::Email => {
                let subject = formatted.subject.unwrap_or_else(|| handoff::DEFAULT_SUBJECT.to_string());
                Handoff {
                    channel,
                    url: handoff::mailto_url(&subject, &body),
                    subject: Some(subject),
                    body,
                }
            }
            Channel::Sms => Handoff {
                channel,
                url: handoff::sms_url(&body, ios),
                subject: None,
                body,
            },
        };
        debug!(%channel, url_len = handoff.url.len(), "handoff: built");
        Ok(handoff)
    }

    /// Publish the chosen message to the wall, once
    pub fn publish(&mut self) -> Result<WallPost, WizardError> {
        let state = self.final_ref("post to the wall")?;
        if state.posted.is_some() {
            return Err(WizardError::AlreadyPosted);
        }

        let input = self.history.current();
        let content = state.selected.content.clone();
        let label = self.generation.detected_intent.clone();
        let original = (input.intent == IntentType::Vent).then(|| input.context.clone());
        let post = self.wall.create(content, input.intent, label, original);

        if let Some(state) = self.final_state.as_mut() {
            state.posted = Some(post.id.clone());
        }
        self.set_tab(Tab::Explore);
        Ok(post)
    }

    // Wall

    fn require_owner(&self, id: &str) -> Result<(), WizardError> {
        if self.wall.get(id).is_none() {
            return Err(WizardError::NoSuchPost(id.to_string()));
        }
        if !self.wall.is_mine(id) {
            return Err(WizardError::NotOwner(id.to_string()));
        }
        Ok(())
    }

    /// Delete one of our posts immediately
    pub fn delete_post(&mut self, id: &str) -> Result<(), WizardError> {
        self.require_owner(id)?;
        self.wall.delete(id);
        Ok(())
    }

    /// Two-step delete of one of our posts
    pub fn request_delete(&mut self, id: &str, now: Instant) -> Result<DeleteRequest, WizardError> {
        self.require_owner(id)?;
        let request = self.wall_view.request_delete(id, now);
        if request == DeleteRequest::Confirmed {
            self.wall.delete(id);
        }
        Ok(request)
    }
}
