//! Interactive compose session
//!
//! A line-editing front end over [`WizardController`]. Plain text is not sent
//! anywhere; everything is a slash command.

use std::io;
use std::time::Instant;

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, warn};

use crate::domain::{Channel, InputField, IntentType, TargetLanguage, ThemeType, WallFilter, WallPost};
use crate::handoff::{self, Cipher};
use crate::wall::DeleteRequest;
use crate::wizard::{ResultsView, Step, Tab, WizardController, WizardError};

/// A parsed slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Quit,
    Status,
    Start,
    Intent(IntentType),
    Set(InputField),
    Undo,
    Redo,
    Save,
    Load,
    Generate,
    Pick(usize),
    Cipher(Option<Cipher>),
    Copy,
    Handoff { channel: Channel, ios: bool },
    Post,
    Wall(Option<WallFilter>),
    Reveal(String),
    Delete(String),
    Mine,
    Tab(Tab),
    New,
    Reset,
    Back,
    AppLanguage(TargetLanguage),
    Theme(ThemeType),
}

/// Parse one input line into a command
pub fn parse_command(line: &str) -> Result<SlashCommand, String> {
    let line = line.trim();
    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    };

    let required = |what: &str| required_arg(cmd, rest, what);

    let command = match cmd {
        "/help" | "/h" => SlashCommand::Help,
        "/quit" | "/q" | "/exit" => SlashCommand::Quit,
        "/status" | "/s" => SlashCommand::Status,
        "/start" => SlashCommand::Start,
        "/intent" => SlashCommand::Intent(required("an intent")?.parse()?),
        "/set" => {
            let (field, value) = required("a field and a value")?
                .split_once(char::is_whitespace)
                .map(|(f, v)| (f, v.trim().to_string()))
                .unwrap_or((rest, String::new()));
            let field = match field.to_ascii_lowercase().as_str() {
                "recipient" | "to" => InputField::Recipient(value),
                "relationship" | "rel" => InputField::Relationship(value),
                "context" | "what" => InputField::Context(value),
                other => return Err(format!("Unknown field '{}' (recipient, relationship, context)", other)),
            };
            SlashCommand::Set(field)
        }
        "/lang" => SlashCommand::Set(InputField::TargetLanguage(required("a language")?.parse()?)),
        "/undo" | "/u" => SlashCommand::Undo,
        "/redo" | "/r" => SlashCommand::Redo,
        "/save" => SlashCommand::Save,
        "/load" => SlashCommand::Load,
        "/generate" | "/g" => SlashCommand::Generate,
        "/pick" => {
            let n: usize = required("a variation number")?
                .parse()
                .map_err(|_| format!("'{}' is not a number", rest))?;
            if n == 0 {
                return Err("Variations are numbered from 1".to_string());
            }
            SlashCommand::Pick(n - 1)
        }
        "/cipher" => match required("base64, rot13, reverse or off")? {
            "off" | "none" => SlashCommand::Cipher(None),
            name => SlashCommand::Cipher(Some(name.parse()?)),
        },
        "/copy" => SlashCommand::Copy,
        "/email" => SlashCommand::Handoff {
            channel: Channel::Email,
            ios: false,
        },
        "/sms" => SlashCommand::Handoff {
            channel: Channel::Sms,
            ios: rest.eq_ignore_ascii_case("ios"),
        },
        "/post" => SlashCommand::Post,
        "/wall" => SlashCommand::Wall(if rest.is_empty() { None } else { Some(rest.parse()?) }),
        "/reveal" => SlashCommand::Reveal(required("a post id")?.to_string()),
        "/delete" => SlashCommand::Delete(required("a post id")?.to_string()),
        "/mine" => SlashCommand::Mine,
        "/tab" => SlashCommand::Tab(required("explore, create or me")?.parse()?),
        "/new" => SlashCommand::New,
        "/reset" => SlashCommand::Reset,
        "/back" | "/b" => SlashCommand::Back,
        "/applang" => SlashCommand::AppLanguage(required("a language")?.parse()?),
        "/theme" => SlashCommand::Theme(required("a theme")?.parse()?),
        other => return Err(format!("Unknown command: {}", other)),
    };
    Ok(command)
}

fn required_arg<'a>(cmd: &str, rest: &'a str, what: &str) -> Result<&'a str, String> {
    if rest.is_empty() {
        Err(format!("{} expects {}", cmd, what))
    } else {
        Ok(rest)
    }
}

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Quit,
}

/// Interactive compose session
pub struct ComposeSession {
    wizard: WizardController,
}

impl ComposeSession {
    pub fn new(wizard: WizardController) -> Self {
        Self { wizard }
    }

    pub fn wizard(&self) -> &WizardController {
        &self.wizard
    }

    /// Run the session main loop
    pub async fn run(&mut self) -> Result<()> {
        debug!("ComposeSession::run: called");
        self.print_welcome();

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let prompt = format!("{} ", format!("[{}]>", self.wizard.step()).bright_green());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(input);

                    if !input.starts_with('/') {
                        println!("{} Commands start with '/'. Type {} for help", "?".yellow(), "/help".yellow());
                        continue;
                    }

                    self.wizard.tick(Instant::now());
                    match parse_command(input) {
                        Ok(command) => {
                            if let SlashResult::Quit = self.handle(command).await {
                                break;
                            }
                        }
                        Err(e) => println!("{} {}", "?".yellow(), e),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    async fn handle(&mut self, command: SlashCommand) -> SlashResult {
        debug!(?command, "handle: called");
        let now = Instant::now();

        let outcome: Result<(), WizardError> = match command {
            SlashCommand::Help => {
                print_help();
                Ok(())
            }
            SlashCommand::Quit => return SlashResult::Quit,
            SlashCommand::Status => {
                self.print_step();
                Ok(())
            }
            SlashCommand::Start => self.wizard.start().map(|_| self.print_step()),
            SlashCommand::Intent(intent) => self.wizard.select_intent(intent, now).map(|_| self.print_step()),
            SlashCommand::Set(field) => self.wizard.edit(field, now).map(|_| self.print_form()),
            SlashCommand::Undo => {
                if !self.wizard.undo() {
                    println!("{}", "Nothing to undo.".dimmed());
                }
                self.print_form();
                Ok(())
            }
            SlashCommand::Redo => {
                if !self.wizard.redo() {
                    println!("{}", "Nothing to redo.".dimmed());
                }
                self.print_form();
                Ok(())
            }
            SlashCommand::Save => self
                .wizard
                .save_draft()
                .map(|_| println!("{}", "Draft saved.".green())),
            SlashCommand::Load => self.wizard.load_draft(now).map(|loaded| {
                if loaded {
                    println!("{}", "Draft loaded.".green());
                    self.print_form();
                } else {
                    println!("{}", "No saved draft.".dimmed());
                }
            }),
            SlashCommand::Generate => {
                println!("{}", "Drafting...".dimmed());
                self.wizard.generate().await.map(|_| self.print_step())
            }
            SlashCommand::Pick(index) => {
                println!("{}", "Preparing your dashboard...".dimmed());
                self.wizard.select(index).await.map(|_| self.print_step())
            }
            SlashCommand::Cipher(Some(cipher)) => self.wizard.apply_cipher(cipher).map(|text| println!("{}", text)),
            SlashCommand::Cipher(None) => self.wizard.restore_original().map(|text| println!("{}", text)),
            SlashCommand::Copy => {
                match self.wizard.display_text() {
                    Some(text) => match handoff::copy_to_clipboard(&mut io::stdout(), &text) {
                        Ok(()) => println!("{}", "Copied.".green()),
                        Err(e) => println!("{} Copy failed: {}", "!".red(), e),
                    },
                    None => println!("{}", "Nothing to copy yet.".dimmed()),
                }
                Ok(())
            }
            SlashCommand::Handoff { channel, ios } => {
                println!("{}", format!("Formatting for {}...", channel).dimmed());
                self.wizard.handoff(channel, ios).await.map(|h| {
                    if let Some(subject) = &h.subject {
                        println!("{} {}", "Subject:".bright_cyan(), subject);
                    }
                    println!("{}", h.body);
                    println!("{} {}", "Link:".bright_cyan(), h.url);
                    if let Err(e) = handoff::open_url(&h.url) {
                        warn!(error = %e, "handle: failed to open composition url");
                    }
                })
            }
            SlashCommand::Post => self.wizard.publish().map(|post| {
                println!("{} {}", "Posted to the wall:".green(), post.id.dimmed());
                self.print_wall();
            }),
            SlashCommand::Wall(filter) => {
                if let Some(filter) = filter {
                    self.wizard.wall_view_mut().set_filter(filter);
                }
                self.wizard.set_tab(Tab::Explore);
                self.print_wall();
                Ok(())
            }
            SlashCommand::Reveal(id) => {
                let shown = self.wizard.wall_view_mut().toggle_reveal(&id);
                println!("{}", if shown { "Original shown." } else { "Original hidden." }.dimmed());
                Ok(())
            }
            SlashCommand::Delete(id) => self.wizard.request_delete(&id, now).map(|request| match request {
                DeleteRequest::Armed => {
                    println!("{} Run {} again within 3s to confirm", "?".yellow(), format!("/delete {}", id).yellow())
                }
                DeleteRequest::Confirmed => println!("{}", "Deleted.".green()),
            }),
            SlashCommand::Mine => {
                self.wizard.set_tab(Tab::Me);
                let posts: Vec<WallPost> = self.wizard.wall().my_posts().into_iter().cloned().collect();
                if posts.is_empty() {
                    println!("{}", "You haven't posted anything yet.".dimmed());
                }
                for post in &posts {
                    self.print_post(post);
                }
                Ok(())
            }
            SlashCommand::Tab(tab) => {
                self.wizard.set_tab(tab);
                match tab {
                    Tab::Explore => self.print_wall(),
                    Tab::Create => self.print_step(),
                    Tab::Me => println!("{} {}", "Theme:".bright_cyan(), self.wizard.settings().theme),
                }
                Ok(())
            }
            SlashCommand::New => {
                self.wizard.write_new_whisper();
                self.print_step();
                Ok(())
            }
            SlashCommand::Reset => {
                self.wizard.reset();
                self.print_step();
                Ok(())
            }
            SlashCommand::Back => self.wizard.back().map(|_| self.print_step()),
            SlashCommand::AppLanguage(language) => {
                self.wizard.set_app_language(language, now);
                println!("{} {}", "App language:".bright_cyan(), language.native_name());
                Ok(())
            }
            SlashCommand::Theme(theme) => {
                self.wizard.set_theme(theme);
                println!("{} {}", "Theme:".bright_cyan(), theme);
                Ok(())
            }
        };

        if let Err(e) = outcome {
            println!("{} {}", "!".red(), e);
        }
        SlashResult::Continue
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "WhisperWall".bright_cyan().bold());
        println!("Say the hard thing, kindly.");
        println!(
            "Type {} to write a message, {} for help, {} to quit",
            "/start".yellow(),
            "/help".yellow(),
            "/quit".yellow()
        );
        println!();
    }

    fn print_form(&self) {
        let input = self.wizard.input();
        let field = |value: &str| if value.is_empty() { "-".dimmed().to_string() } else { value.to_string() };
        println!("  {:14} {}", "intent".bright_cyan(), input.intent.label());
        println!("  {:14} {}", "recipient".bright_cyan(), field(&input.recipient));
        println!("  {:14} {}", "relationship".bright_cyan(), field(&input.relationship));
        println!("  {:14} {}", "context".bright_cyan(), field(&input.context));
        println!("  {:14} {}", "language".bright_cyan(), input.target_language.native_name());
    }

    fn print_step(&self) {
        println!();
        match self.wizard.step() {
            Step::Idle => println!("Type {} to write a new whisper.", "/start".yellow()),
            Step::IntentChosen => {
                println!("{}", "What do you want to do?".bright_cyan());
                for intent in IntentType::ALL {
                    println!("  {:14} {}", intent.as_str().to_lowercase().yellow(), intent.description());
                }
                println!("Choose with {}", "/intent <name>".yellow());
            }
            Step::Drafting => {
                println!("{}", "Tell us about it:".bright_cyan());
                self.print_form();
                println!(
                    "Fill in with {}, then {}",
                    "/set recipient|relationship|context <text>".yellow(),
                    "/generate".yellow()
                );
            }
            Step::Results => self.print_results(),
            Step::Finalized => self.print_final(),
        }
        println!();
    }

    fn print_results(&self) {
        let generation = self.wizard.generation();
        match self.wizard.results_view() {
            ResultsView::Loading => println!("{}", "Drafting...".dimmed()),
            ResultsView::Alert => {
                if let Some(alert) = &generation.safety_alert {
                    println!("{} {}", "Heads up:".bright_yellow().bold(), alert.message);
                }
                println!("Edit your message with {}", "/back".yellow());
            }
            ResultsView::Failed => {
                let reason = generation.error.as_deref().unwrap_or("No drafts came back.");
                println!("{} {}", "!".red(), reason);
                println!("Try {} again or {}", "/generate".yellow(), "/back".yellow());
            }
            ResultsView::Choices => {
                if let Some(label) = &generation.detected_intent {
                    println!("{} {}", "Sounds like:".bright_cyan(), label);
                }
                for (i, message) in generation.variations.iter().enumerate() {
                    println!("{} {}", format!("{}.", i + 1).yellow(), message.tone.to_string().bright_cyan());
                    println!("   {}", message.content);
                    if let Some(note) = &message.safety_note {
                        println!("   {}", note.dimmed());
                    }
                }
                println!("Choose with {}", "/pick <n>".yellow());
            }
        }
    }

    fn print_final(&self) {
        let Some(state) = self.wizard.final_state() else {
            return;
        };
        println!("{}", "Your message".bright_cyan().bold());
        println!("  {}", state.display_text());
        println!();

        println!(
            "{} {}/100",
            "Relationship score:".bright_cyan(),
            state.extras.relationship_score
        );
        for axis in state.radar() {
            let filled = (axis.value / axis.max * 20.0).round() as usize;
            println!("  {:9} {} {:.0}", axis.label, "#".repeat(filled.min(20)).green(), axis.value);
        }

        if !state.extras.missions.is_empty() {
            println!("{}", "Missions:".bright_cyan());
            for mission in &state.extras.missions {
                println!("  [{:?}] {} - {}", mission.difficulty, mission.title.bold(), mission.description);
            }
        }
        if !state.extras.topics.is_empty() {
            println!("{}", "Talk about:".bright_cyan());
            for topic in &state.extras.topics {
                println!("  {}: {}", topic.category.bold(), topic.starter);
            }
        }

        println!();
        let post = if state.posted.is_some() { "posted".dimmed().to_string() } else { "/post".yellow().to_string() };
        println!(
            "{} {} {} {} {} {}",
            "/copy".yellow(),
            "/email".yellow(),
            "/sms".yellow(),
            "/cipher".yellow(),
            post,
            "/new".yellow()
        );
    }

    fn print_wall(&self) {
        let view = self.wizard.wall_view();
        let posts = view.visible(self.wizard.wall().list());
        println!();
        println!("{} {}", "The Wall".bright_cyan().bold(), format!("({})", view.filter()).dimmed());
        if posts.is_empty() {
            println!("{}", "No whispers yet.".dimmed());
        }
        for post in posts {
            self.print_post(post);
        }
        println!();
    }

    fn print_post(&self, post: &WallPost) {
        let when = chrono::DateTime::from_timestamp_millis(post.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let mine = if self.wizard.wall().is_mine(&post.id) { " (you)" } else { "" };
        println!(
            "{} {} {}{}",
            format!("[{}]", post.display_label()).bright_magenta(),
            when.dimmed(),
            post.id.dimmed(),
            mine.dimmed()
        );
        println!("  {}", post.content);
        if let Some(original) = &post.original_content {
            if self.wizard.wall_view().is_revealed(&post.id) {
                println!("  {} {}", "original:".dimmed(), original.italic());
            } else {
                println!("  {}", format!("/reveal {} to see the original", post.id).dimmed());
            }
        }
    }
}

fn print_help() {
    println!();
    println!("{}", "Compose:".bright_cyan());
    println!("  {:28} Begin a new message", "/start".yellow());
    println!("  {:28} Choose what you want to do", "/intent <name>".yellow());
    println!("  {:28} Fill in the form", "/set <field> <text>".yellow());
    println!("  {:28} Language of the message", "/lang <language>".yellow());
    println!("  {:28} Undo or redo form edits", "/undo  /redo".yellow());
    println!("  {:28} Save or load the draft slot", "/save  /load".yellow());
    println!("  {:28} Draft four tone variations", "/generate".yellow());
    println!("  {:28} Choose a variation", "/pick <n>".yellow());
    println!("  {:28} One step back", "/back".yellow());
    println!("  {:28} Start over", "/reset  /new".yellow());
    println!();
    println!("{}", "Your message:".bright_cyan());
    println!("  {:28} Transform the displayed text", "/cipher <name|off>".yellow());
    println!("  {:28} Copy to the clipboard", "/copy".yellow());
    println!("  {:28} Open an email or SMS draft", "/email  /sms [ios]".yellow());
    println!("  {:28} Publish to the wall", "/post".yellow());
    println!();
    println!("{}", "Wall:".bright_cyan());
    println!("  {:28} Show the wall", "/wall [all|vent]".yellow());
    println!("  {:28} Show or hide a vent original", "/reveal <id>".yellow());
    println!("  {:28} Delete one of your posts", "/delete <id>".yellow());
    println!("  {:28} Your posts", "/mine".yellow());
    println!();
    println!("{}", "Session:".bright_cyan());
    println!("  {:28} Switch tab", "/tab <explore|create|me>".yellow());
    println!("  {:28} App language and theme", "/applang  /theme".yellow());
    println!("  {:28} Where you are", "/status".yellow());
    println!("  {:28} Show this help or exit", "/help  /quit".yellow());
    println!();
}
