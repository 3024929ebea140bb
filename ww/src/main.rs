//! WhisperWall - guided message composer
//!
//! CLI entry point for the compose session, the wall and the draft slot.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use wallstore::{FileStore, LocalStore, StoreExt};
use whisperwall::cli::{Cli, Command, DraftCommand, OutputFormat, WallCommand, generate_after_help, get_log_path};
use whisperwall::config::Config;
use whisperwall::domain::{Channel, IntentType, SavedDraft, TargetLanguage, WallFilter};
use whisperwall::llm::create_client;
use whisperwall::service::DraftService;
use whisperwall::session::ComposeSession;
use whisperwall::wall::WallRepository;
use whisperwall::wizard::{AppSettings, DRAFT_KEY, WizardController};

fn parse_level(level: Option<&str>) -> tracing::Level {
    match level.map(|s| s.to_uppercase()).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    }
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Priority: CLI --log-level > config file > INFO
    let level = parse_level(cli_log_level.or(config_log_level));
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    let log_path = get_log_path();
    let log_file = log_path
        .parent()
        .map(fs::create_dir_all)
        .transpose()
        .and_then(|_| fs::File::create(&log_path));

    match log_file {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_writer(file)
                .with_ansi(false)
                .with_env_filter(filter)
                .try_init()
                .map_err(|e| eyre::eyre!("Failed to install subscriber: {}", e))?;
        }
        Err(e) => {
            eprintln!("Warning: cannot write {} ({}), logging to stderr", log_path.display(), e);
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .try_init()
                .map_err(|e| eyre::eyre!("Failed to install subscriber: {}", e))?;
        }
    }

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(provider = %config.llm.provider, "WhisperWall loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None | Some(Command::Compose) => cmd_compose(&config).await,
        Some(Command::Intents) => cmd_intents(),
        Some(Command::Wall { command }) => match command {
            WallCommand::List {
                vent,
                mine,
                reveal,
                format,
            } => cmd_wall_list(&config, vent, mine, reveal, format),
            WallCommand::Delete { id } => cmd_wall_delete(&config, &id),
        },
        Some(Command::Draft { command }) => match command {
            DraftCommand::Show => cmd_draft_show(&config),
            DraftCommand::Clear => cmd_draft_clear(&config),
        },
        Some(Command::Format {
            channel,
            text,
            language,
        }) => cmd_format(&config, channel, &text, language).await,
    }
}

fn open_store(config: &Config) -> Result<Arc<dyn LocalStore>> {
    let dir: PathBuf = config.storage.resolve_dir()?;
    debug!(?dir, "open_store: called");
    let store = FileStore::open(&dir).context(format!("Failed to open storage at {}", dir.display()))?;
    Ok(Arc::new(store))
}

fn draft_service(config: &Config) -> Result<DraftService> {
    config.validate().context("The generative service is not configured")?;
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    DraftService::from_config(llm, config)
}

/// Interactive compose session
async fn cmd_compose(config: &Config) -> Result<()> {
    debug!("cmd_compose: called");
    let service = Arc::new(draft_service(config)?);
    let store = open_store(config)?;
    let settings = AppSettings {
        app_language: config.app.language,
        theme: config.app.theme,
    };

    let wizard = WizardController::new(service, store, settings, config.history.window());
    ComposeSession::new(wizard).run().await
}

/// Print the intent catalogue
fn cmd_intents() -> Result<()> {
    debug!("cmd_intents: called");
    for intent in IntentType::ALL {
        println!(
            "{:14} {:14} {}",
            intent.as_str().yellow(),
            intent.label().bright_cyan(),
            intent.description()
        );
    }
    Ok(())
}

fn cmd_wall_list(config: &Config, vent: bool, mine: bool, reveal: bool, format: OutputFormat) -> Result<()> {
    debug!(vent, mine, reveal, %format, "cmd_wall_list: called");
    let repo = WallRepository::open(open_store(config)?);
    let filter = if vent { WallFilter::Vent } else { WallFilter::All };
    let posts: Vec<_> = repo
        .list()
        .iter()
        .filter(|p| filter.matches(p))
        .filter(|p| !mine || repo.is_mine(&p.id))
        .collect();

    match format {
        OutputFormat::Json => {
            let json: Vec<serde_json::Value> = posts
                .iter()
                .map(|p| -> Result<serde_json::Value, serde_json::Error> {
                    let mut value = serde_json::to_value(p)?;
                    if !reveal && let Some(obj) = value.as_object_mut() {
                        obj.remove("originalContent");
                    }
                    if let Some(obj) = value.as_object_mut() {
                        obj.insert("mine".to_string(), repo.is_mine(&p.id).into());
                    }
                    Ok(value)
                })
                .collect::<Result<_, serde_json::Error>>()?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            if posts.is_empty() {
                println!("No whispers yet.");
            }
            for post in posts {
                let when = chrono::DateTime::from_timestamp_millis(post.timestamp)
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                let owner = if repo.is_mine(&post.id) { " (you)" } else { "" };
                println!(
                    "{} {} {}{}",
                    format!("[{}]", post.display_label()).bright_magenta(),
                    when.dimmed(),
                    post.id.dimmed(),
                    owner.dimmed()
                );
                println!("  {}", post.content);
                if reveal && let Some(original) = &post.original_content {
                    println!("  {} {}", "original:".dimmed(), original);
                }
            }
        }
    }
    Ok(())
}

fn cmd_wall_delete(config: &Config, id: &str) -> Result<()> {
    debug!(%id, "cmd_wall_delete: called");
    let mut repo = WallRepository::open(open_store(config)?);
    if repo.get(id).is_none() {
        eyre::bail!("No post with id {}", id);
    }
    if !repo.is_mine(id) {
        eyre::bail!("Post {} was not written on this device", id);
    }
    repo.delete(id);
    println!("Deleted {}", id);
    Ok(())
}

fn cmd_draft_show(config: &Config) -> Result<()> {
    debug!("cmd_draft_show: called");
    let store = open_store(config)?;
    match store.try_load::<SavedDraft>(DRAFT_KEY).context("Saved draft is unreadable")? {
        Some(draft) => {
            let fields = [
                ("intent", draft.intent.map(|i| i.label().to_string())),
                ("recipient", draft.recipient),
                ("relationship", draft.relationship),
                ("context", draft.context),
                ("language", draft.target_language.map(|l| l.to_string())),
            ];
            for (name, value) in fields {
                println!("{:14} {}", name.bright_cyan(), value.unwrap_or_default());
            }
        }
        None => println!("No saved draft."),
    }
    Ok(())
}

fn cmd_draft_clear(config: &Config) -> Result<()> {
    debug!("cmd_draft_clear: called");
    open_store(config)?.remove(DRAFT_KEY)?;
    println!("Draft cleared.");
    Ok(())
}

/// One-shot channel formatting
async fn cmd_format(config: &Config, channel: Channel, text: &str, language: TargetLanguage) -> Result<()> {
    debug!(%channel, %language, "cmd_format: called");
    let service = draft_service(config)?;
    let formatted = service.format_for_channel(text, channel, language).await;

    if let Some(subject) = &formatted.subject {
        println!("{} {}", "Subject:".bright_cyan(), subject);
    }
    println!("{}", formatted.body);
    Ok(())
}
