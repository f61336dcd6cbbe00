//! vorbabuna-cli: terminal client for the Vorbă Bună proverb service
//!
//! Talks to the HTTP API for catalog, search, recommendations and tracking.
//! Favorites and view history live in a local JSON file, the same data a
//! browser client keeps in local storage.
//!
//! # Subcommands
//! - `random`                                  : proverb of the moment
//! - `show <id>`                               : one proverb
//! - `search <query> [-c <category>] [-n <limit>]`
//! - `recommend [--type <kind>] [-n <limit>]`  : uses local favorites/history
//! - `contribute <text> <meaning> -c <category> [-r <region>]`
//! - `track <id> <event>`
//! - `favorite add|remove|list|export|import`
//! - `history [--clear]`
//! - `status`                                  : show server health

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use vorbabuna_core::favorites::HistoryEntry;
use vorbabuna_core::text;
use vorbabuna_core::{ApiResponse, Favorites, JsonFileStorage, Proverb};

const DEFAULT_SERVER: &str = "http://127.0.0.1:8787";
const DEFAULT_LIMIT: usize = 5;
const DATA_FILE: &str = ".vorbabuna.json";
/// Meanings longer than this are cut short in list output.
const LIST_MEANING_WIDTH: usize = 100;

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "vorbabuna-cli",
    version,
    about = "Vorbă Bună: Romanian proverbs from the terminal"
)]
struct Cli {
    /// Vorbă Bună HTTP server URL (overrides VORBABUNA_HTTP_URL env var)
    #[arg(long, env = "VORBABUNA_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    /// Local favorites/history file (defaults to ~/.vorbabuna.json)
    #[arg(long, env = "VORBABUNA_DATA")]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show a random proverb
    Random,

    /// Show one proverb by id
    Show { id: String },

    /// Search proverbs by text, meaning or keyword
    Search {
        query: String,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short = 'n', long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        /// Print the raw JSON data
        #[arg(long)]
        json: bool,
    },

    /// Get recommendations based on local favorites and history
    Recommend {
        /// popular, new, random, feed, similar, related, category, region, trending
        #[arg(long = "type", default_value = "personalized")]
        kind: String,

        #[arg(short = 'n', long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        /// Seed proverb for similar/related
        #[arg(long)]
        proverb: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        region: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Submit a proverb for review
    Contribute {
        text: String,
        meaning: String,

        #[arg(short, long)]
        category: String,

        #[arg(short, long)]
        region: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },

    /// Record an interaction (view, share, favorite, audio_play, quiz_attempt)
    Track { id: String, event: String },

    /// Manage local favorites
    Favorite {
        #[command(subcommand)]
        action: FavoriteCommand,
    },

    /// Show or clear the local view history
    History {
        #[arg(long)]
        clear: bool,
    },

    /// Show server status
    Status,
}

#[derive(Debug, Subcommand)]
enum FavoriteCommand {
    Add { id: String },
    Remove { id: String },
    List,
    /// Print favorites as a JSON array
    Export,
    /// Merge favorites from a JSON array file
    Import { file: PathBuf },
}

// ============================================================================
// HTTP Client
// ============================================================================

struct Api {
    client: reqwest::blocking::Client,
    server: String,
}

impl Api {
    fn new(server: &str) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            server: server.trim_end_matches('/').to_string(),
        })
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> anyhow::Result<ApiResponse> {
        let url = format!("{}{}", self.server, path);
        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| anyhow::anyhow!("connection failed to {}: {}", url, e))?;
        read_envelope(resp)
    }

    fn post(&self, path: &str, body: &serde_json::Value) -> anyhow::Result<ApiResponse> {
        let url = format!("{}{}", self.server, path);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| anyhow::anyhow!("connection failed to {}: {}", url, e))?;
        read_envelope(resp)
    }
}

fn read_envelope(resp: reqwest::blocking::Response) -> anyhow::Result<ApiResponse> {
    let status = resp.status();
    let text = resp.text().unwrap_or_default();
    let envelope: ApiResponse = serde_json::from_str(&text)
        .map_err(|_| anyhow::anyhow!("server returned {}: {}", status, text))?;
    check_envelope(envelope)
}

/// Turn an error envelope into an error.
fn check_envelope(envelope: ApiResponse) -> anyhow::Result<ApiResponse> {
    if envelope.success {
        Ok(envelope)
    } else {
        Err(anyhow::anyhow!(
            "{}",
            envelope.error.unwrap_or_else(|| "unknown error".to_string())
        ))
    }
}

fn data_as<T: DeserializeOwned>(envelope: ApiResponse) -> anyhow::Result<T> {
    let data = envelope.data.unwrap_or(serde_json::Value::Null);
    Ok(serde_json::from_value(data)?)
}

// ============================================================================
// Formatting
// ============================================================================

/// Human-readable block for one proverb.
fn format_proverb(p: &Proverb, meaning_width: Option<usize>) -> String {
    let meaning = match meaning_width {
        Some(width) => text::truncate(&p.meaning, width),
        None => p.meaning.clone(),
    };
    let mut out = format!("„{}”\n  {}", p.text, meaning);
    let tags: Vec<&str> = [p.category.as_deref(), p.region.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !tags.is_empty() {
        out.push_str(&format!("\n  [{}]", tags.join(" · ")));
    }
    out.push_str(&format!("\n  {} · {} views", p.id, p.popularity));
    out
}

/// Path of a single proverb; the id is encoded as one segment.
fn proverb_path(id: &str) -> String {
    format!("/api/proverb/{}", urlencoding::encode(id.trim()))
}

fn print_proverbs(proverbs: &[Proverb]) {
    if proverbs.is_empty() {
        eprintln!("No proverbs found");
        return;
    }
    for p in proverbs {
        println!("{}\n", format_proverb(p, Some(LIST_MEANING_WIDTH)));
    }
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Most recent first, as stored.
fn history_ids(history: &[HistoryEntry]) -> Vec<String> {
    history.iter().map(|h| h.id.clone()).collect()
}

/// `~/.vorbabuna.json`, or the working directory when there is no home.
fn data_path(explicit: Option<PathBuf>, home: Option<String>) -> PathBuf {
    match (explicit, home) {
        (Some(path), _) => path,
        (None, Some(home)) if !home.is_empty() => PathBuf::from(home).join(DATA_FILE),
        _ => PathBuf::from(DATA_FILE),
    }
}

// ============================================================================
// Commands
// ============================================================================

type LocalFavorites = Favorites<JsonFileStorage>;

fn do_random(api: &Api, local: &mut LocalFavorites) -> anyhow::Result<()> {
    let proverb: Proverb = data_as(api.get("/api/proverb", &[])?)?;
    local.add_to_history(&proverb.id.to_string())?;
    println!("{}", format_proverb(&proverb, None));
    Ok(())
}

fn do_show(api: &Api, local: &mut LocalFavorites, id: &str) -> anyhow::Result<()> {
    let proverb: Proverb = data_as(api.get(&proverb_path(id), &[])?)?;
    local.add_to_history(&proverb.id.to_string())?;
    let star = if local.is_favorite(id)? { " ★" } else { "" };
    println!("{}{}", format_proverb(&proverb, None), star);
    Ok(())
}

fn do_search(
    api: &Api,
    query: &str,
    category: Option<String>,
    limit: usize,
    json: bool,
) -> anyhow::Result<()> {
    let mut params = vec![("q", query.to_string()), ("limit", limit.to_string())];
    if let Some(c) = category {
        params.push(("category", c));
    }
    let envelope = api.get("/api/proverb/search", &params)?;
    if json {
        return print_json(&envelope.data.unwrap_or_default());
    }
    let proverbs: Vec<Proverb> = data_as(envelope)?;
    print_proverbs(&proverbs);
    Ok(())
}

struct RecommendArgs {
    kind: String,
    limit: usize,
    proverb: Option<String>,
    category: Option<String>,
    region: Option<String>,
    json: bool,
}

/// Query parameters for `/api/recommendations`.
fn recommendation_query(
    args: &RecommendArgs,
    favorites: &[String],
    history: &[String],
) -> Vec<(&'static str, String)> {
    let mut params = vec![("type", args.kind.clone()), ("limit", args.limit.to_string())];
    if !favorites.is_empty() {
        params.push(("favorites", favorites.join(",")));
    }
    if !history.is_empty() {
        params.push(("history", history.join(",")));
    }
    if let Some(id) = &args.proverb {
        params.push(("proverbId", id.clone()));
    }
    if let Some(c) = &args.category {
        params.push(("category", c.clone()));
    }
    if let Some(r) = &args.region {
        params.push(("region", r.clone()));
    }
    params
}

fn do_recommend(api: &Api, local: &LocalFavorites, args: RecommendArgs) -> anyhow::Result<()> {
    let favorites = local.list()?;
    let history = history_ids(&local.history()?);
    let params = recommendation_query(&args, &favorites, &history);
    let data = api
        .get("/api/recommendations", &params)?
        .data
        .unwrap_or_default();

    if args.json {
        return print_json(&data);
    }
    if let Some(buckets) = data.as_object() {
        for label in ["recommended", "popular", "new", "random"] {
            let proverbs: Vec<Proverb> =
                serde_json::from_value(buckets.get(label).cloned().unwrap_or_default())
                    .unwrap_or_default();
            println!("== {} ==", label);
            print_proverbs(&proverbs);
        }
        return Ok(());
    }
    let proverbs: Vec<Proverb> = serde_json::from_value(data)?;
    print_proverbs(&proverbs);
    Ok(())
}

fn do_contribute(
    api: &Api,
    text: &str,
    meaning: &str,
    category: &str,
    region: Option<String>,
    email: Option<String>,
) -> anyhow::Result<()> {
    let body = serde_json::json!({
        "text": text,
        "meaning": meaning,
        "category": category,
        "region": region,
        "email": email,
    });
    let envelope = api.post("/api/contribute", &body)?;
    let id = envelope
        .data
        .as_ref()
        .and_then(|d| d["id"].as_str())
        .unwrap_or("?")
        .to_string();
    println!("✅ Submitted {}", id);
    if let Some(message) = envelope.message {
        println!("{}", message);
    }
    Ok(())
}

fn do_track(api: &Api, id: &str, event: &str) -> anyhow::Result<()> {
    let body = serde_json::json!({ "proverbId": id, "eventType": event });
    let envelope = api.post("/api/analytics/track", &body)?;
    let popularity = envelope
        .data
        .as_ref()
        .and_then(|d| d["popularity"].as_i64())
        .unwrap_or_default();
    println!("Tracked {} on {} (popularity {})", event, id, popularity);
    Ok(())
}

fn do_favorite(local: &mut LocalFavorites, action: FavoriteCommand) -> anyhow::Result<()> {
    match action {
        FavoriteCommand::Add { id } => {
            if local.add(&id)? {
                println!("★ Added {}", id);
            } else {
                println!("{} is already a favorite", id);
            }
        }
        FavoriteCommand::Remove { id } => {
            if local.remove(&id)? {
                println!("Removed {}", id);
            } else {
                println!("{} was not a favorite", id);
            }
        }
        FavoriteCommand::List => {
            let ids = local.list()?;
            if ids.is_empty() {
                eprintln!("No favorites yet");
            }
            for id in ids {
                println!("{}", id);
            }
        }
        FavoriteCommand::Export => println!("{}", local.export()?),
        FavoriteCommand::Import { file } => {
            let json = std::fs::read_to_string(&file)?;
            if !local.import(&json)? {
                anyhow::bail!("{} does not contain a JSON array of ids", file.display());
            }
            println!("Favorites: {}", local.count()?);
        }
    }
    Ok(())
}

fn do_history(local: &mut LocalFavorites, clear: bool) -> anyhow::Result<()> {
    if clear {
        local.clear_history()?;
        println!("History cleared");
        return Ok(());
    }
    let history = local.history()?;
    if history.is_empty() {
        eprintln!("No history yet");
    }
    for entry in history {
        let when = chrono::DateTime::from_timestamp_millis(entry.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("{}  {}", when, entry.id);
    }
    Ok(())
}

/// Show the server status by calling GET /health.
fn do_status(server: &str) -> anyhow::Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;

    let url = format!("{}/health", server.trim_end_matches('/'));
    match client.get(&url).send() {
        Ok(r) if r.status().is_success() => {
            let body: serde_json::Value = r.json().unwrap_or_default();
            println!("Vorbă Bună server: {}", body["status"].as_str().unwrap_or("unknown"));
            println!("Version:           {}", body["version"].as_str().unwrap_or("?"));
            println!("Store:             {}", body["store"].as_str().unwrap_or("?"));
        }
        Ok(r) => {
            eprintln!("vorbabuna-cli: server unhealthy (HTTP {})", r.status());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("vorbabuna-cli: cannot reach {}: {}", url, e);
            std::process::exit(1);
        }
    }
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn run(cli: Cli) -> anyhow::Result<()> {
    let path = data_path(cli.data, std::env::var("HOME").ok());
    let mut local = Favorites::new(JsonFileStorage::open(&path)?);
    let api = Api::new(&cli.server)?;

    match cli.command {
        Commands::Random => do_random(&api, &mut local),
        Commands::Show { id } => do_show(&api, &mut local, &id),
        Commands::Search {
            query,
            category,
            limit,
            json,
        } => do_search(&api, &query, category, limit, json),
        Commands::Recommend {
            kind,
            limit,
            proverb,
            category,
            region,
            json,
        } => do_recommend(
            &api,
            &local,
            RecommendArgs {
                kind,
                limit,
                proverb,
                category,
                region,
                json,
            },
        ),
        Commands::Contribute {
            text,
            meaning,
            category,
            region,
            email,
        } => do_contribute(&api, &text, &meaning, &category, region, email),
        Commands::Track { id, event } => do_track(&api, &id, &event),
        Commands::Favorite { action } => do_favorite(&mut local, action),
        Commands::History { clear } => do_history(&mut local, clear),
        Commands::Status => do_status(&cli.server),
    }
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("vorbabuna-cli: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
