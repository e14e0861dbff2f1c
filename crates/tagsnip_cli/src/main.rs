//! Command-line client for a tagsnip server.

mod output;

use anyhow::{anyhow, bail, Context};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use serde_json::Value;
use std::collections::HashMap;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tagsnip_cli::{validate, ApiClient, ClientError, TokenStore, TOKENS_FILE_NAME};
use tagsnip_core::autosave::AutoSaver;
use tagsnip_core::config::client_state_dir;
use tagsnip_core::detection::languages::language_for_file_name;
use tagsnip_core::detection::{self, LanguageTracker};
use tagsnip_core::models::folder::{CreateFolderRequest, FolderColor, UpdateFolderRequest};
use tagsnip_core::models::snippet::{CreateSnippetRequest, UpdateSnippetRequest};
use tagsnip_core::search::{FilterState, SnippetCollection};
use tagsnip_core::settings::{Settings, SETTINGS_FILE_NAME};
use tagsnip_core::tabs::TabManager;
use tagsnip_core::text::normalize_tags;
use tagsnip_core::DEFAULT_CLI_SERVER_URL;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tsnip", version, about = "Manage code snippets on a tagsnip server")]
struct Cli {
    /// Server URL
    #[arg(short, long, env = "TSNIP_SERVER")]
    server: Option<String>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Print how long the command took
    #[arg(long, global = true)]
    timing: bool,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and sign in
    Signup {
        username: String,
        #[arg(long, env = "TSNIP_PASSWORD", hide_env_values = true)]
        password: String,
        /// Repeat the password to guard against typos
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Sign in
    Login {
        username: String,
        #[arg(long, env = "TSNIP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List snippets, optionally narrowed by filters
    List {
        /// Fuzzy query over title, tags, code and description
        #[arg(short, long)]
        query: Option<String>,
        /// Required tag (repeatable; all must match)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        /// Folder id or name
        #[arg(short, long)]
        folder: Option<String>,
        /// Only favorites
        #[arg(long)]
        favorites: bool,
    },
    /// Show one snippet
    Get { id: String },
    /// Create a snippet from a file or stdin
    New {
        /// Source file; reads stdin when omitted or `-`
        file: Option<PathBuf>,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        language: Option<String>,
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        description: Option<String>,
        /// Folder id or name
        #[arg(short, long)]
        folder: Option<String>,
        #[arg(long)]
        favorite: bool,
    },
    /// Change fields of an existing snippet
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        /// Replace the code with the contents of this file (`-` for stdin)
        #[arg(long)]
        code: Option<PathBuf>,
        #[arg(short, long)]
        language: Option<String>,
        /// Replace the tag list (repeatable)
        #[arg(short, long = "tag")]
        tags: Option<Vec<String>>,
        #[arg(long)]
        description: Option<String>,
        /// Folder id or name; an empty value unfiles the snippet
        #[arg(short, long)]
        folder: Option<String>,
    },
    /// Delete a snippet
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Toggle a snippet's favorite flag
    Fav { id: String },
    /// Manage folders
    Folders {
        #[command(subcommand)]
        action: FolderCommand,
    },
    /// Inspect and tidy tags
    Tags {
        #[command(subcommand)]
        action: TagCommand,
    },
    /// Manage open tabs
    Tabs {
        #[command(subcommand)]
        action: TabCommand,
    },
    /// Export every snippet as JSON
    Export {
        /// Output file; prints to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import snippets from an export file or a JSON array
    Import { file: PathBuf },
    /// Show snippet statistics
    Stats,
    /// Fetch a shared snippet without signing in
    Share { id: String },
    /// Guess the language of a file or stdin
    Detect { file: Option<PathBuf> },
    /// Show or change local settings
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
    /// Generate shell completion scripts
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum FolderCommand {
    List,
    Create {
        name: String,
        #[arg(long)]
        color: Option<FolderColor>,
    },
    Rename {
        id: String,
        name: String,
        #[arg(long)]
        color: Option<FolderColor>,
    },
    /// Delete a folder; its snippets become unfiled
    Delete { id: String },
}

#[derive(Subcommand)]
enum TagCommand {
    List,
    /// Remove tags no snippet uses
    Cleanup,
}

#[derive(Subcommand)]
enum TabCommand {
    Show,
    Open { id: String },
    Close { id: String },
    CloseAll,
    CloseOthers { id: String },
    Activate { id: String },
    /// Move the tab at position FROM to position TO (zero-based)
    Move { from: usize, to: usize },
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Print all settings or one category
    Show { category: Option<String> },
    /// Set `category.key` to a JSON value (bare words are taken as strings)
    Set { key: String, value: String },
    /// Restore every default
    Reset,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tsnip=warn,tagsnip_cli=warn,tagsnip_core=warn".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let started = cli.timing.then(Instant::now);
    let result = run(cli).await;
    if let Some(started) = started {
        eprintln!("took {:?}", started.elapsed());
    }
    result
}

fn settings_path() -> PathBuf {
    client_state_dir().join(SETTINGS_FILE_NAME)
}

/// Saved settings over the defaults; `AUTO_SAVE_DELAY_MS` supplies the
/// auto-save delay unless the file sets one.
fn load_settings(path: &Path) -> Settings {
    Settings::load_over(path, Settings::from_env_defaults())
}

fn build_client(server: Option<String>, timeout_secs: u64) -> Result<ApiClient, ClientError> {
    let server = server.unwrap_or_else(|| DEFAULT_CLI_SERVER_URL.to_string());
    let tokens = TokenStore::load(client_state_dir().join(TOKENS_FILE_NAME));
    ApiClient::new(&server, Duration::from_secs(timeout_secs), tokens)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let json = cli.json;
    let command = match cli.command {
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "tsnip", &mut io::stdout());
            return Ok(());
        }
        Commands::Settings { action } => return run_settings(action, json),
        Commands::Detect { file } => {
            let code = read_source(file.as_deref())?;
            println!("{}", output::format_detection(&code, file.as_deref(), json)?);
            return Ok(());
        }
        other => other,
    };

    let client = build_client(cli.server, cli.timeout)?;
    let settings = load_settings(&settings_path());

    match command {
        Commands::Signup {
            username,
            password,
            confirm,
        } => {
            let credentials = validate::credentials(&username, &password, confirm.as_deref())?;
            let profile = client.signup(&credentials).await?;
            client.login(&credentials).await?;
            println!("Signed up and signed in as {}", profile.username);
        }
        Commands::Login { username, password } => {
            let credentials = validate::credentials(&username, &password, None)?;
            client.login(&credentials).await?;
            println!("Signed in as {}", credentials.username.to_lowercase());
        }
        Commands::Logout => {
            client.logout()?;
            println!("Signed out");
        }
        Commands::Whoami => {
            let profile = client.me().await?;
            println!("{}", output::format_profile(&profile, json)?);
        }
        Commands::List {
            query,
            tags,
            folder,
            favorites,
        } => {
            let folder_id = match folder {
                Some(folder) => Some(resolve_folder(&client, &folder).await?),
                None => None,
            };
            let mut authorized = client.tokens().is_signed_in();
            let snippets = if authorized {
                match client.all_snippets().await {
                    Ok(snippets) => snippets,
                    Err(ClientError::Unauthorized) => {
                        authorized = false;
                        Vec::new()
                    }
                    Err(err) => return Err(err.into()),
                }
            } else {
                Vec::new()
            };
            let collection = SnippetCollection::new(snippets);
            let state = FilterState {
                query: query.unwrap_or_default(),
                tags: normalize_tags(&tags),
                folder_id,
                favorites_only: favorites,
            };
            let view = collection.recompute(&state);
            match collection.empty_state(&view, authorized) {
                Some(_) if json => println!("[]"),
                Some(empty) => println!("{}", empty.message()),
                None => println!("{}", output::format_snippet_rows(&view, json)?),
            }
        }
        Commands::Get { id } => {
            let snippet = client.get_snippet(&id).await?;
            println!("{}", output::format_snippet(&snippet, json)?);
        }
        Commands::New {
            file,
            title,
            language,
            tags,
            description,
            folder,
            favorite,
        } => {
            let code = read_source(file.as_deref())?;
            let language = language.unwrap_or_else(|| pick_language(&code, file.as_deref(), &settings));
            let title = title.or_else(|| {
                file.as_deref()
                    .filter(|path| *path != Path::new("-"))
                    .and_then(Path::file_name)
                    .map(|name| name.to_string_lossy().into_owned())
            });
            let folder_id = match folder {
                Some(folder) => Some(resolve_folder(&client, &folder).await?),
                None => None,
            };
            let request = CreateSnippetRequest {
                title,
                description,
                code: Some(code),
                language: Some(language),
                tags: Some(tags),
                folder_id,
                is_favorite: Some(favorite),
            };
            let snippet = client.create_snippet(&request).await?;
            if json {
                println!("{}", output::to_json(&snippet)?);
            } else {
                println!("Created {} ({}, {})", snippet.id, snippet.title, snippet.language);
            }
        }
        Commands::Edit {
            id,
            title,
            code,
            language,
            tags,
            description,
            folder,
        } => {
            let current = client.get_snippet(&id).await?;
            let mut snapshot = UpdateSnippetRequest::snapshot_of(&current);
            if let Some(title) = title {
                snapshot.title = Some(title);
            }
            if let Some(description) = description {
                snapshot.description = Some(description);
            }
            if let Some(tags) = tags {
                snapshot.tags = Some(tags);
            }
            if let Some(folder) = folder {
                let folder_id = if folder.trim().is_empty() {
                    String::new()
                } else {
                    resolve_folder(&client, &folder).await?
                };
                snapshot.folder_id = Some(folder_id);
            }
            if let Some(path) = code {
                let new_code = read_source(Some(&path))?;
                if language.is_none() {
                    let mut tracker =
                        LanguageTracker::new(&current.code, settings.snippets.auto_detect_language);
                    if let Some(detected) = tracker.on_change(&new_code, &current.language) {
                        tracing::info!("language re-detected as {}", detected);
                        snapshot.language = Some(detected.to_string());
                    }
                }
                snapshot.code = Some(new_code);
            }
            if let Some(language) = language {
                snapshot.language = Some(language);
            }

            let saver = AutoSaver::with_enabled(
                client.clone(),
                Duration::from_millis(settings.auto_save.delay),
                settings.auto_save.enabled,
            );
            saver.switch_session(id.as_str());
            let saved = saver
                .save_now(Some(snapshot))
                .await?
                .ok_or_else(|| anyhow!("nothing to save"))?;
            if json {
                println!("{}", output::to_json(&saved)?);
            } else {
                println!("Saved {} ({})", saved.id, saved.title);
            }
        }
        Commands::Delete { id, yes } => {
            if settings.snippets.confirm_delete && !yes {
                let snippet = client.get_snippet(&id).await?;
                if !confirm(&format!("Delete \"{}\"?", snippet.title))? {
                    println!("Cancelled");
                    return Ok(());
                }
            }
            client.delete_snippet(&id).await?;
            println!("Deleted {}", id);
        }
        Commands::Fav { id } => {
            let snippet = client.toggle_favorite(&id).await?;
            if json {
                println!("{}", output::to_json(&snippet)?);
            } else if snippet.is_favorite {
                println!("Starred {}", snippet.title);
            } else {
                println!("Unstarred {}", snippet.title);
            }
        }
        Commands::Folders { action } => run_folders(&client, action, json).await?,
        Commands::Tags { action } => match action {
            TagCommand::List => {
                let tags = client.list_tags().await?;
                println!("{}", output::format_tags(&tags, json)?);
            }
            TagCommand::Cleanup => {
                let removed = client.cleanup_tags().await?;
                println!("Removed {} unused tag(s)", removed);
            }
        },
        Commands::Tabs { action } => run_tabs(&client, action, json).await?,
        Commands::Export { output: target } => {
            let document = client.export().await?;
            let rendered = serde_json::to_string_pretty(&document)?;
            match target {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!(
                        "Exported {} snippet(s) to {}",
                        document.snippets.len(),
                        path.display()
                    );
                }
                None => println!("{}", rendered),
            }
        }
        Commands::Import { file } => {
            let raw = read_source(Some(&file))?;
            let request = validate::import_payload(&raw)?;
            let result = client.import(&request).await?;
            println!("{}", output::format_import(&result, json)?);
        }
        Commands::Stats => {
            let stats = client.stats().await?;
            println!("{}", output::format_stats(&stats, json)?);
        }
        Commands::Share { id } => match client.shared_snippet(&id).await {
            Ok(snippet) => println!("{}", output::format_snippet(&snippet, json)?),
            Err(ClientError::NotFound) => bail!("Shared snippet {} does not exist", id),
            Err(err) => return Err(err.into()),
        },
        Commands::Completions { .. } | Commands::Settings { .. } | Commands::Detect { .. } => {}
    }
    Ok(())
}

async fn run_folders(client: &ApiClient, action: FolderCommand, json: bool) -> anyhow::Result<()> {
    match action {
        FolderCommand::List => {
            let folders = client.list_folders().await?;
            println!("{}", output::format_folders(&folders, json)?);
        }
        FolderCommand::Create { name, color } => {
            let folder = client
                .create_folder(&CreateFolderRequest { name, color })
                .await?;
            println!("Created folder {} ({})", folder.name, folder.id);
        }
        FolderCommand::Rename { id, name, color } => {
            let id = resolve_folder(client, &id).await?;
            let request = UpdateFolderRequest {
                name: Some(name),
                color,
            };
            let folder = client.update_folder(&id, &request).await?;
            println!("Renamed folder to {}", folder.name);
        }
        FolderCommand::Delete { id } => {
            let id = resolve_folder(client, &id).await?;
            client.delete_folder(&id).await?;
            println!("Deleted folder {}; its snippets are now unfiled", id);
        }
    }
    Ok(())
}

async fn run_tabs(client: &ApiClient, action: TabCommand, json: bool) -> anyhow::Result<()> {
    let mut tabs = TabManager::load(Arc::new(client.clone())).await?;
    match action {
        TabCommand::Show => {}
        TabCommand::Open { id } => {
            client.get_snippet(&id).await?;
            tabs.open(&id);
        }
        TabCommand::Close { id } => {
            if !tabs.contains(&id) {
                bail!("{} is not open", id);
            }
            tabs.close(&id);
        }
        TabCommand::CloseAll => tabs.close_all(),
        TabCommand::CloseOthers { id } => {
            if !tabs.contains(&id) {
                bail!("{} is not open", id);
            }
            tabs.close_others(&id);
        }
        TabCommand::Activate { id } => {
            if !tabs.set_active(&id) {
                bail!("{} is not open", id);
            }
        }
        TabCommand::Move { from, to } => {
            if !tabs.reorder(from, to) {
                bail!("no tab at position {}", from);
            }
        }
    }
    tabs.settle().await;

    let titles: HashMap<String, String> = if tabs.is_empty() {
        HashMap::new()
    } else {
        match client.all_snippets().await {
            Ok(snippets) => snippets.into_iter().map(|s| (s.id, s.title)).collect(),
            Err(err) => {
                tracing::debug!("tab titles unavailable: {}", err);
                HashMap::new()
            }
        }
    };
    println!(
        "{}",
        output::format_tabs(tabs.tabs(), tabs.active(), &titles, json)?
    );
    Ok(())
}

fn run_settings(action: SettingsCommand, json: bool) -> anyhow::Result<()> {
    let path = settings_path();
    let mut settings = load_settings(&path);
    match action {
        SettingsCommand::Show { category } => {
            let document = serde_json::to_value(&settings)?;
            let shown = match category {
                Some(category) => document
                    .get(&category)
                    .cloned()
                    .ok_or_else(|| anyhow!("unknown settings category '{}'", category))?,
                None => document,
            };
            println!("{}", output::format_settings(&shown, json)?);
        }
        SettingsCommand::Set { key, value } => {
            let (category, key) = key
                .split_once('.')
                .ok_or_else(|| anyhow!("expected CATEGORY.KEY, got '{}'", key))?;
            settings.update_setting(category, key, parse_setting_value(&value))?;
            settings.save(&path)?;
            println!("{}.{} updated", category, key);
        }
        SettingsCommand::Reset => {
            settings = Settings::from_env_defaults();
            settings.save(&path)?;
            println!("Settings reset to defaults");
        }
    }
    Ok(())
}

/// JSON if it parses, otherwise the raw text as a string.
fn parse_setting_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Language for new code: detection first when enabled, then the file
/// extension, then the configured default.
fn pick_language(code: &str, file: Option<&Path>, settings: &Settings) -> String {
    let detected = settings
        .snippets
        .auto_detect_language
        .then(|| detection::detect(code))
        .flatten();
    let from_name = || {
        file.and_then(Path::to_str)
            .and_then(language_for_file_name)
    };
    detected
        .or_else(from_name)
        .map(str::to_string)
        .unwrap_or_else(|| settings.snippets.default_language.clone())
}

/// Accept a folder id or a case-insensitive folder name.
async fn resolve_folder(client: &ApiClient, folder: &str) -> anyhow::Result<String> {
    let folders = client.list_folders().await?;
    folders
        .iter()
        .find(|f| f.id == folder)
        .or_else(|| folders.iter().find(|f| f.name.eq_ignore_ascii_case(folder.trim())))
        .map(|f| f.id.clone())
        .ok_or_else(|| anyhow!("no folder named '{}'", folder))
}

fn read_source(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    eprint!("{} [y/N] ", prompt);
    io::stderr().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
