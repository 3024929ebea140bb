//! End-to-end compose flow against a scripted generative service
//!
//! The scripted client answers by response schema, so the same client serves
//! drafts, extras and channel formatting in whatever order the flow asks.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{Value, json};
use tempfile::TempDir;

use wallstore::{FileStore, LocalStore};
use whisperwall::domain::{Channel, InputField, IntentType, TargetLanguage, Tone};
use whisperwall::handoff::Cipher;
use whisperwall::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError};
use whisperwall::prompts::PromptLoader;
use whisperwall::retry::RetryPolicy;
use whisperwall::service::DraftService;
use whisperwall::wizard::{AppSettings, ResultsView, Step, Tab, WizardController, WizardError};
use whisperwall::{LocalFilter, WallRepository};

struct ScriptedClient {
    drafts: Value,
    fail_first: usize,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn new(drafts: Value) -> Self {
        Self {
            drafts,
            fail_first: 0,
            calls: AtomicUsize::new(0),
        }
    }

    fn flaky(drafts: Value, fail_first: usize) -> Self {
        Self {
            fail_first,
            ..Self::new(drafts)
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.fail_first {
            return Err(LlmError::RateLimited {
                retry_after: Duration::from_secs(1),
            });
        }

        let name = request.response_schema.map(|s| s.name).unwrap_or_default();
        let payload = match name.as_str() {
            "emit_drafts" => self.drafts.clone(),
            "emit_extras" => json!({
                "missions": [{ "title": "Coffee", "difficulty": "Easy", "description": "Grab a coffee together" }],
                "topics": [{ "category": "Music", "starter": "Heard anything good lately?" }],
                "relationshipScore": 64
            }),
            "emit_formatted" => json!({ "subject": "A quick note", "body": "Hi!\n\nSorry about your mug." }),
            other => return Err(LlmError::InvalidResponse(format!("unexpected schema {}", other))),
        };

        // Text body with a code fence, as some models reply
        Ok(CompletionResponse::text(format!("```json\n{}\n```", payload)))
    }

    fn provider(&self) -> &'static str {
        "scripted"
    }
}

fn drafts() -> Value {
    json!({
        "variations": [
            { "tone": "Warm", "content": "I'm so sorry I broke your mug. Let me replace it?" },
            { "tone": "Playful", "content": "RIP mug. I owe you a new one (and a coffee)." },
            { "tone": "Polite", "content": "I apologize for breaking your mug." },
            { "tone": "Direct", "content": "I broke your mug. I'll buy a new one today." }
        ],
        "detectedIntent": "Apology"
    })
}

fn wizard_with(client: Arc<ScriptedClient>, store: Arc<dyn LocalStore>, retry: RetryPolicy) -> WizardController {
    let service = DraftService::new(client, PromptLoader::embedded_only(), retry)
        .with_filter(Some(LocalFilter::new::<&str>(&[]).expect("filter")));
    WizardController::new(Arc::new(service), store, AppSettings::default(), Duration::from_millis(500))
}

fn file_store(dir: &TempDir) -> Arc<dyn LocalStore> {
    Arc::new(FileStore::open(dir.path()).expect("Failed to open store"))
}

fn fill(wizard: &mut WizardController, intent: IntentType) {
    let now = Instant::now();
    wizard.start().expect("start");
    wizard.select_intent(intent, now).expect("intent");
    wizard.edit(InputField::Recipient("Sam".to_string()), now).expect("recipient");
    wizard.edit(InputField::Relationship("roommate".to_string()), now).expect("relationship");
    wizard.edit(InputField::Context("I broke her favourite mug".to_string()), now).expect("context");
}

#[tokio::test]
async fn test_compose_to_wall_persists_across_sessions() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let client = Arc::new(ScriptedClient::new(drafts()));
    let mut wizard = wizard_with(client.clone(), file_store(&temp_dir), RetryPolicy::immediate(0));

    fill(&mut wizard, IntentType::Others);
    assert_eq!(wizard.generate().await.expect("generate"), ResultsView::Choices);
    assert_eq!(wizard.generation().detected_intent.as_deref(), Some("Apology"));

    wizard.select(3).await.expect("select");
    assert_eq!(wizard.step(), Step::Finalized);
    let state = wizard.final_state().expect("final state");
    assert_eq!(state.selected.tone, Tone::Direct);
    assert_eq!(state.extras.missions.len(), 1);
    assert_eq!(state.extras.relationship_score, 64);

    let email = wizard.handoff(Channel::Email, false).await.expect("handoff");
    assert_eq!(email.subject.as_deref(), Some("A quick note"));
    assert!(email.url.starts_with("mailto:?subject=A%20quick%20note&body="));

    let post = wizard.publish().expect("publish");
    assert_eq!(wizard.tab(), Tab::Explore);
    assert_eq!(post.custom_label.as_deref(), Some("Apology"));
    assert_eq!(client.calls(), 3);

    // A fresh session on the same storage sees the post as ours
    let repo = WallRepository::open(file_store(&temp_dir));
    assert_eq!(repo.list().len(), 1);
    assert_eq!(repo.list()[0].id, post.id);
    assert!(repo.is_mine(&post.id));
}

#[tokio::test]
async fn test_vent_post_keeps_original_and_masks_profanity() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let client = Arc::new(ScriptedClient::new(json!({
        "variations": [
            { "tone": "Warm", "content": "This damn class is wearing me down." },
            { "tone": "Playful", "content": "Me vs. this class: round 12." },
            { "tone": "Polite", "content": "I am finding this class difficult." },
            { "tone": "Direct", "content": "This class is too much." }
        ]
    })));
    let mut wizard = wizard_with(client, file_store(&temp_dir), RetryPolicy::immediate(0));

    fill(&mut wizard, IntentType::Vent);
    wizard.generate().await.expect("generate");
    assert_eq!(
        wizard.generation().variations[0].content,
        "This d*** class is wearing me down."
    );

    wizard.select(0).await.expect("select");
    let post = wizard.publish().expect("publish");
    assert_eq!(post.original_content.as_deref(), Some("I broke her favourite mug"));
    assert!(post.custom_label.is_none());
    assert!(matches!(wizard.publish(), Err(WizardError::AlreadyPosted)));
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_generation_recovers_after_backoff() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let client = Arc::new(ScriptedClient::flaky(drafts(), 2));
    let retry = RetryPolicy {
        retries: 3,
        base_delay: Duration::from_secs(1),
        max_delay: Duration::from_secs(8),
    };
    let mut wizard = wizard_with(client.clone(), file_store(&temp_dir), retry);
    fill(&mut wizard, IntentType::Repair);

    let started = tokio::time::Instant::now();
    assert_eq!(wizard.generate().await.expect("generate"), ResultsView::Choices);
    assert_eq!(client.calls(), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(3));
}

#[tokio::test]
async fn test_exhausted_retries_show_failure_at_results() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let client = Arc::new(ScriptedClient::flaky(drafts(), usize::MAX));
    let mut wizard = wizard_with(client.clone(), file_store(&temp_dir), RetryPolicy::immediate(2));
    fill(&mut wizard, IntentType::Help);

    assert_eq!(wizard.generate().await.expect("generate"), ResultsView::Failed);
    assert_eq!(wizard.step(), Step::Results);
    assert_eq!(client.calls(), 3);

    // Going back keeps the form for another try
    wizard.back().expect("back");
    assert_eq!(wizard.input().recipient, "Sam");
}

#[tokio::test]
async fn test_reply_arriving_after_reset_is_dropped() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let client = Arc::new(ScriptedClient::new(drafts()));
    let service = Arc::new(DraftService::new(
        client.clone(),
        PromptLoader::embedded_only(),
        RetryPolicy::immediate(0),
    ));
    let mut wizard = WizardController::new(
        service.clone(),
        file_store(&temp_dir),
        AppSettings::default(),
        Duration::from_millis(500),
    );
    fill(&mut wizard, IntentType::Repair);

    let ticket = wizard.begin_generate().expect("begin");
    let reply = service.draft_messages(&ticket.input).await;
    wizard.reset();

    assert!(!wizard.complete_generate(ticket, reply));
    assert_eq!(wizard.step(), Step::Idle);
    assert!(wizard.generation().variations.is_empty());
}

#[tokio::test]
async fn test_saved_draft_survives_restart() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let client = Arc::new(ScriptedClient::new(drafts()));

    let mut first = wizard_with(client.clone(), file_store(&temp_dir), RetryPolicy::immediate(0));
    fill(&mut first, IntentType::Repair);
    first
        .edit(InputField::TargetLanguage(TargetLanguage::Japanese), Instant::now())
        .expect("language");
    first.save_draft().expect("save");

    let mut second = wizard_with(client, file_store(&temp_dir), RetryPolicy::immediate(0));
    second.start().expect("start");
    second.select_intent(IntentType::Help, Instant::now()).expect("intent");
    assert!(second.load_draft(Instant::now()).expect("load"));
    assert_eq!(second.input().intent, IntentType::Repair);
    assert_eq!(second.input().context, "I broke her favourite mug");
    assert_eq!(second.input().target_language, TargetLanguage::Japanese);

    // Loading is a single undoable edit
    assert!(second.undo());
    assert_eq!(second.input().intent, IntentType::Help);
    assert_eq!(second.input().context, "");
}

#[tokio::test]
async fn test_cipher_changes_handoff_body() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let client = Arc::new(ScriptedClient::new(drafts()));
    let mut wizard = wizard_with(client, file_store(&temp_dir), RetryPolicy::immediate(0));
    fill(&mut wizard, IntentType::Repair);
    wizard.generate().await.expect("generate");
    wizard.select(2).await.expect("select");

    let encoded = wizard.apply_cipher(Cipher::Base64).expect("cipher");
    let sms = wizard.handoff(Channel::Sms, false).await.expect("handoff");
    assert_eq!(sms.body, encoded);
    assert!(sms.url.starts_with("sms:?body="));

    wizard.restore_original().expect("restore");
    let sms = wizard.handoff(Channel::Sms, false).await.expect("handoff");
    assert_eq!(sms.body, "Hi!\n\nSorry about your mug.");
}
