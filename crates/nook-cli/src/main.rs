//! Nook CLI - categorized note capture from the command line
//!
//! Writes go through the same offline-aware router the mobile client uses:
//! when the remote API is unreachable (or `--offline` is given) they are
//! buffered locally and replayed by `nook sync`.

mod config;
mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use nook_core::persistence::FilePersistence;
use nook_core::services::{CategoryService, NewCategory, NewNote, NoteService, NoteUpdate};
use nook_core::{
    Category, CategoryId, ConnectivityMonitor, ConnectivityStatus, HttpRemoteStore, Note, NoteId,
    PendingQueue, RemoteStore, SyncEngine, WriteOutcome, WriteRouter,
};
use serde::Serialize;

use crate::config::{resolve_data_dir, CliConfig};
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "nook")]
#[command(about = "Organize notes into categories, online or off")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Optional data directory override
    #[arg(long, global = true, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Remote API base URL (overrides config and NOOK_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Owner identity stamped on new records (overrides config and NOOK_OWNER)
    #[arg(long, global = true, value_name = "NAME")]
    owner: Option<String>,

    /// Treat the device as offline: buffer writes instead of calling the API
    #[arg(long, global = true)]
    offline: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Manage notes
    Note {
        #[command(subcommand)]
        command: NoteCommands,
    },
    /// Replay queued writes against the remote store
    Sync,
    /// Show writes waiting to sync
    Queue {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show connectivity, queue depth, and configuration
    Status,
    /// Configure the CLI
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum CategoryCommands {
    /// Create a category
    Add {
        /// Category name
        name: String,
        /// Parent category ID (top-level when omitted)
        #[arg(long, value_name = "ID")]
        parent: Option<String>,
        /// Cover image URI
        #[arg(long, value_name = "URL")]
        image_url: Option<String>,
    },
    /// List categories
    List {
        /// Only direct children of this category
        #[arg(long, value_name = "ID")]
        parent: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Move a category under a new parent
    Move {
        /// Category ID
        id: String,
        /// New parent ID (becomes top-level when omitted)
        #[arg(long, value_name = "ID")]
        parent: Option<String>,
    },
}

#[derive(Subcommand)]
enum NoteCommands {
    /// Create a note
    Add {
        /// Note title
        title: String,
        /// Category ID the note belongs to
        #[arg(long, value_name = "ID")]
        category: String,
        /// Note content
        #[arg(long, default_value = "")]
        content: String,
    },
    /// List notes
    List {
        /// Only notes in this category
        #[arg(long, value_name = "ID")]
        category: Option<String>,
        /// Only favourite notes
        #[arg(long)]
        favourites: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a note's title, content, or category
    Edit {
        /// Note ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New content
        #[arg(long)]
        content: Option<String>,
        /// Move the note to this category
        #[arg(long, value_name = "ID")]
        category: Option<String>,
    },
    /// Delete a note
    Delete {
        /// Note ID
        id: String,
    },
    /// Mark or unmark a note as favourite
    Favourite {
        /// Note ID
        id: String,
        /// Remove the favourite flag instead
        #[arg(long)]
        off: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Initialize or update CLI config
    Init {
        /// Remote API base URL
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
        /// Bearer token for the remote API
        #[arg(long, value_name = "TOKEN")]
        auth_token: Option<String>,
        /// Owner identity stamped on new records
        #[arg(long, value_name = "NAME")]
        owner: Option<String>,
    },
    /// Print current config
    Show,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nook=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let data_dir = resolve_data_dir(cli.data_dir.clone());
    let stored = CliConfig::load(&data_dir)?;
    let config = merged_config(&cli, stored);

    match cli.command {
        Commands::Category { command } => {
            let app = App::build(&data_dir, &config, cli.offline)?;
            match command {
                CategoryCommands::Add {
                    name,
                    parent,
                    image_url,
                } => run_category_add(&app, name, parent, image_url).await?,
                CategoryCommands::List { parent, json } => {
                    run_category_list(&app, parent, json).await?;
                }
                CategoryCommands::Move { id, parent } => run_category_move(&app, &id, parent).await?,
            }
        }
        Commands::Note { command } => {
            let app = App::build(&data_dir, &config, cli.offline)?;
            match command {
                NoteCommands::Add {
                    title,
                    category,
                    content,
                } => run_note_add(&app, title, &category, content).await?,
                NoteCommands::List {
                    category,
                    favourites,
                    json,
                } => run_note_list(&app, category, favourites, json).await?,
                NoteCommands::Edit {
                    id,
                    title,
                    content,
                    category,
                } => run_note_edit(&app, &id, title, content, category).await?,
                NoteCommands::Delete { id } => run_note_delete(&app, &id).await?,
                NoteCommands::Favourite { id, off } => run_note_favourite(&app, &id, !off).await?,
            }
        }
        Commands::Sync => {
            let app = App::build(&data_dir, &config, cli.offline)?;
            let report = app.engine.drain().await;
            println!(
                "Synced {} operation(s), {} remaining",
                report.synced, report.remaining
            );
        }
        Commands::Queue { json } => run_queue(&data_dir, json).await?,
        Commands::Status => run_status(&data_dir, &config, cli.offline).await?,
        Commands::Config { command } => run_config(&data_dir, &config, command)?,
    }

    Ok(())
}

/// Flags override environment, environment overrides the stored file.
fn merged_config(cli: &Cli, stored: CliConfig) -> CliConfig {
    CliConfig {
        api_url: first_set([cli.api_url.clone(), env_var("NOOK_API_URL"), stored.api_url]),
        auth_token: first_set([None, env_var("NOOK_API_TOKEN"), stored.auth_token]),
        owner: first_set([cli.owner.clone(), env_var("NOOK_OWNER"), stored.owner]),
    }
}

fn first_set(values: [Option<String>; 3]) -> Option<String> {
    values.into_iter().flatten().next()
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Everything a command needs, wired the way the mobile shell wires it.
struct App {
    owner: String,
    categories: CategoryService,
    notes: NoteService,
    engine: SyncEngine,
}

impl App {
    fn build(data_dir: &Path, config: &CliConfig, offline: bool) -> Result<Self, CliError> {
        let api_url = config.api_url.clone().ok_or(CliError::ApiNotConfigured)?;
        let owner = config.owner.clone().ok_or(CliError::OwnerNotConfigured)?;

        let queue = open_queue(data_dir)?;
        let mut http = HttpRemoteStore::new(api_url)?;
        if let Some(token) = &config.auth_token {
            http = http.with_auth_token(token.clone());
        }
        let remote: Arc<dyn RemoteStore> = Arc::new(http);

        let monitor = ConnectivityMonitor::new(if offline {
            ConnectivityStatus::Offline
        } else {
            ConnectivityStatus::Online
        });
        let router = WriteRouter::new(Arc::clone(&remote), queue.clone(), monitor);

        Ok(Self {
            owner,
            categories: CategoryService::new(router.clone(), Arc::clone(&remote)),
            notes: NoteService::new(router, Arc::clone(&remote)),
            engine: SyncEngine::new(remote, queue),
        })
    }
}

fn open_queue(data_dir: &Path) -> Result<PendingQueue, CliError> {
    let persistence = FilePersistence::new(data_dir.join("storage"))?;
    Ok(PendingQueue::new(Arc::new(persistence)))
}

fn parse_category_id(raw: &str) -> Result<CategoryId, CliError> {
    raw.parse()
        .map_err(|_| CliError::InvalidId(format!("not a category ID: {raw}")))
}

fn parse_note_id(raw: &str) -> Result<NoteId, CliError> {
    raw.parse()
        .map_err(|_| CliError::InvalidId(format!("not a note ID: {raw}")))
}

fn print_outcome(outcome: &WriteOutcome) {
    match outcome {
        WriteOutcome::SavedRemotely(id) => println!("Saved remotely ({id})"),
        WriteOutcome::SavedLocally => println!("Saved locally, will sync when back online"),
    }
}

async fn run_category_add(
    app: &App,
    name: String,
    parent: Option<String>,
    image_url: Option<String>,
) -> Result<(), CliError> {
    let parent = parent.as_deref().map(parse_category_id).transpose()?;
    let (category, outcome) = app
        .categories
        .create(NewCategory {
            name,
            parent,
            image_url,
            owner: app.owner.clone(),
        })
        .await?;
    println!("{}", category.id);
    print_outcome(&outcome);
    Ok(())
}

async fn run_category_list(
    app: &App,
    parent: Option<String>,
    as_json: bool,
) -> Result<(), CliError> {
    let categories = match parent {
        Some(raw) => {
            let parent = parse_category_id(&raw)?;
            app.categories
                .subcategories(&app.owner, Some(parent))
                .await?
        }
        None => app.categories.list(&app.owner).await?,
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
        return Ok(());
    }
    if categories.is_empty() {
        println!("No categories");
        return Ok(());
    }
    for category in &categories {
        println!("{}  {}{}", category.id, category.name, parent_suffix(category));
    }
    Ok(())
}

fn parent_suffix(category: &Category) -> String {
    category
        .parent
        .map_or_else(String::new, |parent| format!("  (in {parent})"))
}

async fn run_category_move(
    app: &App,
    id: &str,
    parent: Option<String>,
) -> Result<(), CliError> {
    let id = parse_category_id(id)?;
    let parent = parent.as_deref().map(parse_category_id).transpose()?;
    app.categories.reparent(&app.owner, id, parent).await?;
    println!("Moved {id}");
    Ok(())
}

async fn run_note_add(
    app: &App,
    title: String,
    category: &str,
    content: String,
) -> Result<(), CliError> {
    let category_id = parse_category_id(category)?;
    let (note, outcome) = app
        .notes
        .create(NewNote {
            title,
            category_id,
            content,
            owner: app.owner.clone(),
        })
        .await?;
    println!("{}", note.id);
    print_outcome(&outcome);
    Ok(())
}

async fn run_note_list(
    app: &App,
    category: Option<String>,
    favourites: bool,
    as_json: bool,
) -> Result<(), CliError> {
    let notes = if favourites {
        app.notes.favourites(&app.owner).await?
    } else if let Some(raw) = category {
        let category_id = parse_category_id(&raw)?;
        app.notes.by_category(&app.owner, category_id).await?
    } else {
        app.notes.list(&app.owner).await?
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&notes)?);
        return Ok(());
    }
    if notes.is_empty() {
        println!("No notes");
        return Ok(());
    }
    for note in &notes {
        println!("{}  {}{}", note.id, note.title, favourite_marker(note));
    }
    Ok(())
}

fn favourite_marker(note: &Note) -> &'static str {
    if note.is_favourite {
        "  *"
    } else {
        ""
    }
}

async fn run_note_edit(
    app: &App,
    id: &str,
    title: Option<String>,
    content: Option<String>,
    category: Option<String>,
) -> Result<(), CliError> {
    let id = parse_note_id(id)?;
    let category_id = category.as_deref().map(parse_category_id).transpose()?;
    app.notes
        .update(
            &id,
            NoteUpdate {
                title,
                content,
                category_id,
            },
        )
        .await?;
    println!("Updated {id}");
    Ok(())
}

async fn run_note_delete(app: &App, id: &str) -> Result<(), CliError> {
    let id = parse_note_id(id)?;
    app.notes.delete(&id).await?;
    println!("Deleted {id}");
    Ok(())
}

async fn run_note_favourite(app: &App, id: &str, favourite: bool) -> Result<(), CliError> {
    let id = parse_note_id(id)?;
    app.notes.set_favourite(&id, favourite).await?;
    println!(
        "{} {}",
        if favourite { "Favourited" } else { "Unfavourited" },
        id
    );
    Ok(())
}

#[derive(Debug, Serialize)]
struct QueueItem {
    kind: String,
    queued_at: i64,
    name: Option<String>,
}

async fn run_queue(data_dir: &Path, as_json: bool) -> Result<(), CliError> {
    let queue = open_queue(data_dir)?;
    let items: Vec<QueueItem> = queue
        .read_all()
        .await?
        .into_iter()
        .map(|op| QueueItem {
            kind: op.kind.to_string(),
            queued_at: op.queued_at,
            name: op
                .payload
                .get("name")
                .or_else(|| op.payload.get("title"))
                .and_then(|v| v.as_str())
                .map(ToString::to_string),
        })
        .collect();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }
    if items.is_empty() {
        println!("Queue is empty");
        return Ok(());
    }
    for item in &items {
        println!(
            "{}  {}  {}",
            format_timestamp(item.queued_at),
            item.kind,
            item.name.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

fn format_timestamp(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map_or_else(|| millis.to_string(), |ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
}

async fn run_status(data_dir: &Path, config: &CliConfig, offline: bool) -> Result<(), CliError> {
    let queue = open_queue(data_dir)?;
    let pending = queue.len().await?;
    println!(
        "Connectivity: {}",
        if offline { "offline (forced)" } else { "online" }
    );
    println!("Pending writes: {pending}");
    println!(
        "API: {}",
        config.api_url.as_deref().unwrap_or("not configured")
    );
    println!(
        "Owner: {}",
        config.owner.as_deref().unwrap_or("not configured")
    );
    Ok(())
}

fn run_config(
    data_dir: &Path,
    current: &CliConfig,
    command: ConfigCommands,
) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            api_url,
            auth_token,
            owner,
        } => {
            let updated = CliConfig {
                api_url: first_set([api_url, current.api_url.clone(), None]),
                auth_token: first_set([auth_token, current.auth_token.clone(), None]),
                owner: first_set([owner, current.owner.clone(), None]),
            };
            updated.save(data_dir)?;
            println!("Config written to {}", data_dir.display());
        }
        ConfigCommands::Show => {
            println!(
                "api_url: {}",
                current.api_url.as_deref().unwrap_or("not set")
            );
            println!(
                "auth_token: {}",
                if current.auth_token.is_some() {
                    "[set]"
                } else {
                    "not set"
                }
            );
            println!("owner: {}", current.owner.as_deref().unwrap_or("not set"));
        }
    }
    Ok(())
}
