//! HTTP layer for the samaj community portal.
//!
//! Exposes an axum [`Router`] backed by any [`PortalStore`]. Every route that
//! needs a caller declares its policy through the
//! [`Authorized`](auth::Authorized) extractor, so authorization happens in one
//! place before any handler body runs.

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use chrono::Duration;
use samaj_core::{
  member::{Member, NewMember},
  role::Role,
  store::PortalStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;
use handlers::{accounts, bookings, committee, forms, registrations, users};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SAMAJ_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub store_path:           PathBuf,
  /// HS256 signing secret for bearer tokens.
  pub jwt_secret:           String,
  #[serde(default = "default_token_ttl_hours")]
  pub token_ttl_hours:      i64,
  /// Created on startup when no account with this email exists.
  #[serde(default)]
  pub bootstrap_superadmin: Option<BootstrapAccount>,
}

fn default_token_ttl_hours() -> i64 { 24 }

#[derive(Deserialize, Clone)]
pub struct BootstrapAccount {
  pub name:          String,
  pub email:         String,
  /// argon2 PHC string, see `server --hash-password`.
  pub password_hash: String,
  #[serde(default)]
  pub village:       Option<String>,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: PortalStore> {
  pub store: Arc<S>,
  pub auth:  Arc<AuthConfig>,
}

impl<S: PortalStore> AppState<S> {
  pub fn new(store: S, config: &ServerConfig) -> Self {
    let auth = AuthConfig::new(&config.jwt_secret, Duration::hours(config.token_ttl_hours));
    Self {
      store: Arc::new(store),
      auth:  Arc::new(auth),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the portal's axum [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: PortalStore + Clone + 'static,
{
  Router::new()
    // Accounts
    .route("/auth/register",                         post(accounts::register::<S>))
    .route("/auth/login",                            post(accounts::login::<S>))
    .route("/auth/me",                               get(accounts::me::<S>))
    // Form registry
    .route("/forms/public/status",                   get(forms::public_status::<S>))
    .route("/forms/status",                          get(forms::admin_status_all::<S>))
    .route(
      "/forms/status/{form_type}",
      get(forms::admin_status_one::<S>).put(forms::set_window::<S>),
    )
    .route("/forms/check-form-visibility/{form_name}", get(forms::check_visibility::<S>))
    .route("/forms/can-access-form/{form_name}",     get(forms::can_access::<S>))
    // Registrations
    .route(
      "/registrations/{form_name}",
      get(registrations::list::<S>).post(registrations::submit::<S>),
    )
    // User management
    .route("/users",                                 get(users::list::<S>))
    .route("/users/{id}",                            delete(users::remove::<S>))
    .route("/users/{id}/role",                       put(users::set_role::<S>))
    // Committee
    .route("/committee/pending",                     get(committee::pending::<S>))
    .route("/committee/members",                     post(committee::add_member::<S>))
    .route("/committee/users/{id}",                  delete(committee::reject::<S>))
    .route("/committee/users/{id}/approve",          post(committee::approve::<S>))
    .route("/committee/users/{id}/bookings",         post(committee::book_for_member::<S>))
    // Bookings
    .route("/bookings",                              get(bookings::list::<S>).post(bookings::create::<S>))
    .route("/bookings/{id}/status",                  put(bookings::set_status::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Startup ─────────────────────────────────────────────────────────────────

/// Create the configured superadmin if no account uses its email yet.
/// Returns the new account, or `None` when there was nothing to do.
pub async fn bootstrap<S: PortalStore>(
  store: &S,
  config: &ServerConfig,
) -> Result<Option<Member>, Error> {
  let Some(account) = &config.bootstrap_superadmin else {
    return Ok(None);
  };

  let email = account.email.trim().to_lowercase();
  if store.find_credentials(&email).await.map_err(Error::store)?.is_some() {
    tracing::debug!(%email, "bootstrap superadmin already present");
    return Ok(None);
  }

  let member = store
    .add_member(NewMember {
      name:          account.name.clone(),
      email:         email.clone(),
      password_hash: account.password_hash.clone(),
      role:          Role::Superadmin,
      village:       account.village.clone(),
      is_verified:   true,
    })
    .await
    .map_err(Error::store)?;

  tracing::info!(user_id = %member.user_id, %email, "bootstrap superadmin created");
  Ok(Some(member))
}

#[cfg(test)]
pub(crate) fn test_config() -> ServerConfig {
  ServerConfig {
    host:                 "127.0.0.1".to_string(),
    port:                 8080,
    store_path:           PathBuf::from(":memory:"),
    jwt_secret:           "test-secret".to_string(),
    token_ttl_hours:      1,
    bootstrap_superadmin: None,
  }
}

// ─── Integration tests ───────────────────────────────────────────────────────
