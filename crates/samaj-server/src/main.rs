//! samaj portal server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `SAMAJ_*` environment variables, opens the SQLite store, seeds the form
//! registry, and serves the JSON API over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `bootstrap_superadmin.password_hash`:
//!
//! ```
//! cargo run -p samaj-server --bin server -- --hash-password
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::Utc;
use clap::Parser;
use samaj_core::store::PortalStore;
use samaj_server::{AppState, ServerConfig, auth::hash_password};
use samaj_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Samaj community portal server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
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

  if cli.hash_password {
    let password = read_password()?;
    println!("{}", hash_password(&password).context("failed to hash password")?);
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("SAMAJ"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let forms = store
    .ensure_forms_seeded(Utc::now())
    .await
    .context("failed to seed form registry")?;
  tracing::info!(count = forms.len(), "form registry ready");

  samaj_server::bootstrap(&store, &server_cfg)
    .await
    .context("failed to create bootstrap superadmin")?;

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let app = samaj_server::router(AppState::new(store, &server_cfg));

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
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
