//! crosscast operations binary.
//!
//! Subcommands cover the offline pipeline (`ingest`, `derive-eligibility`,
//! `generate`) and the HTTP API server (`serve`). Configuration is read from
//! `config.toml` (or the path given with `--config`), with `CROSSCAST_*`
//! environment variables taking precedence.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use crosscast_core::{
  catalog::Catalog,
  eligibility,
  generator::{self, GeneratorConfig},
  store::GridStore as _,
};
use crosscast_store_sqlite::SqliteStore;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Crosscast daily puzzle backend")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Override the store path from the config file.
  #[arg(long, value_name = "FILE")]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Load a catalog JSON file into the store.
  Ingest {
    /// Catalog file with `shows`, `people` and `appearances` arrays.
    #[arg(short, long)]
    file: PathBuf,

    /// Parse the file and report counts without opening the store.
    #[arg(long)]
    dry_run: bool,
  },

  /// Recompute distinct-show counts and eligibility flags for everyone.
  DeriveEligibility,

  /// Generate the daily puzzle for a date, replacing any existing one.
  Generate {
    /// Puzzle date; defaults to today (UTC).
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Seeded shuffle attempts before giving up.
    #[arg(long, default_value_t = 100)]
    max_attempts: u32,
  },

  /// Serve the puzzle API over HTTP.
  Serve,
}

/// Runtime configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
struct AppConfig {
  #[serde(default = "default_host")]
  host:       String,
  #[serde(default = "default_port")]
  port:       u16,
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
}

fn default_host() -> String {
  "127.0.0.1".to_string()
}

fn default_port() -> u16 {
  8640
}

fn default_store_path() -> PathBuf {
  PathBuf::from("crosscast.db")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("CROSSCAST"))
    .build()
    .context("failed to read config file")?;

  let app_cfg: AppConfig = settings
    .try_deserialize()
    .context("failed to deserialise AppConfig")?;

  let store_path =
    expand_tilde(cli.store.as_deref().unwrap_or(&app_cfg.store_path));

  match cli.command {
    Command::Ingest { file, dry_run } => {
      ingest(&store_path, &file, dry_run).await
    }
    Command::DeriveEligibility => derive_eligibility(&store_path).await,
    Command::Generate { date, max_attempts } => {
      let date = date.unwrap_or_else(|| Utc::now().date_naive());
      generate(&store_path, date, max_attempts).await
    }
    Command::Serve => serve(&store_path, &app_cfg).await,
  }
}

// ─── Subcommands ──────────────────────────────────────────────────────────────

/// Parse a catalog file and upsert its contents.
async fn ingest(
  store_path: &Path,
  file: &Path,
  dry_run: bool,
) -> anyhow::Result<()> {
  let raw = tokio::fs::read(file)
    .await
    .with_context(|| format!("failed to read catalog file {file:?}"))?;
  let catalog: Catalog =
    serde_json::from_slice(&raw).context("failed to parse catalog JSON")?;

  tracing::info!(
    shows = catalog.shows.len(),
    people = catalog.people.len(),
    appearances = catalog.appearances.len(),
    "catalog parsed"
  );

  if dry_run {
    tracing::info!("dry run, nothing written");
    return Ok(());
  }

  let store = open_store(store_path).await?;

  // Shows and people first: appearance rows reference both.
  store.upsert_shows(catalog.shows).await?;
  store.upsert_people(catalog.people).await?;
  store.upsert_appearances(catalog.appearances).await?;

  tracing::info!("catalog ingested");
  Ok(())
}

/// Run one eligibility derivation pass over the whole store.
async fn derive_eligibility(store_path: &Path) -> anyhow::Result<()> {
  let store = open_store(store_path).await?;
  eligibility::derive_eligibility(&store).await?;
  Ok(())
}

/// Generate and persist the puzzle for `date`.
async fn generate(
  store_path: &Path,
  date: NaiveDate,
  max_attempts: u32,
) -> anyhow::Result<()> {
  let store = open_store(store_path).await?;
  let config = GeneratorConfig { max_attempts };
  let generated = generator::generate(&store, date, &config).await?;

  tracing::info!(
    puzzle_id = %generated.puzzle.puzzle_id,
    %date,
    attempt = generated.attempt,
    rows = ?generated.puzzle.row_show_ids,
    cols = ?generated.puzzle.col_show_ids,
    counts = ?generated.counts,
    "puzzle generated"
  );
  Ok(())
}

/// Serve the HTTP API until interrupted.
async fn serve(store_path: &Path, config: &AppConfig) -> anyhow::Result<()> {
  let store = open_store(store_path).await?;
  let app = crosscast_api::api_router(Arc::new(store))
    .layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", config.host, config.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

async fn open_store(path: &Path) -> anyhow::Result<SqliteStore> {
  SqliteStore::open(path)
    .await
    .with_context(|| format!("failed to open store at {path:?}"))
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
