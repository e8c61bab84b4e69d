//! cohort-server binary.
//!
//! Reads `cohort.toml` (or the path given with `--config`), opens the SQLite
//! store, and serves the grouping API over HTTP.
//!
//! # Seeding contacts
//!
//! A JSON array of contacts can be loaded for one user without starting the
//! server:
//!
//! ```text
//! cohort-server --import contacts.json --user alice
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use cohort_core::contact::Contact;
use cohort_server::{AppState, ServerConfig};
use cohort_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Cohort contact grouping server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "cohort.toml")]
  config: PathBuf,

  /// Load contacts from a JSON file into the store and exit.
  #[arg(long, requires = "user")]
  import: Option<PathBuf>,

  /// Owner of the imported contacts.
  #[arg(long)]
  user: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8080)?
    .set_default("store_path", "~/.local/share/cohort/cohort.db")?
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(
      config::Environment::with_prefix("COHORT")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  server_cfg
    .default_options
    .validate()
    .context("invalid default_options")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    tokio::fs::create_dir_all(parent)
      .await
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if let (Some(file), Some(user)) = (cli.import, cli.user) {
    return import_contacts(&store, &file, &user).await;
  }

  let state = AppState::new(Arc::new(store), server_cfg.clone());
  let app = cohort_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn import_contacts(store: &SqliteStore, file: &Path, user: &str) -> anyhow::Result<()> {
  let raw = tokio::fs::read_to_string(file)
    .await
    .with_context(|| format!("failed to read {file:?}"))?;
  let contacts: Vec<Contact> =
    serde_json::from_str(&raw).with_context(|| format!("{file:?} is not a contact list"))?;

  let written = store
    .put_contacts(user, &contacts)
    .await
    .context("failed to store contacts")?;
  tracing::info!(user, written, "imported contacts");
  Ok(())
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
