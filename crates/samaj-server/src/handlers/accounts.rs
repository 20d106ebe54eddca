//! Handlers for `/auth` endpoints.
//!
//! | Method | Path | Gate |
//! |--------|------|------|
//! | `POST` | `/auth/register` | public |
//! | `POST` | `/auth/login` | public |
//! | `GET`  | `/auth/me` | AnyCredential |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use samaj_core::{
  access::AnyCredential,
  member::{Member, NewMember},
  role::Role,
  store::PortalStore,
};
use serde::{Deserialize, Serialize};

use super::{ApiJson, normalize_email, required};
use crate::{
  AppState,
  auth::{Authorized, hash_password, issue_token, verify_password},
  error::Error,
};

const MIN_PASSWORD_LEN: usize = 8;

/// Body for creating an account, shared with the committee's add-member
/// route.
#[derive(Debug, Deserialize)]
pub struct AccountBody {
  pub name:     String,
  pub email:    String,
  pub password: String,
  #[serde(default)]
  pub village:  Option<String>,
}

impl AccountBody {
  /// Validate the body and hash its password. A blank village is dropped.
  pub(crate) fn into_new_member(
    self,
    role: Role,
    is_verified: bool,
  ) -> Result<NewMember, Error> {
    let name = required("name", &self.name)?;
    let email = normalize_email(&self.email)?;
    if self.password.chars().count() < MIN_PASSWORD_LEN {
      return Err(
        samaj_core::Error::invalid(
          "password",
          format!("must be at least {MIN_PASSWORD_LEN} characters"),
        )
        .into(),
      );
    }
    let village = self
      .village
      .map(|v| v.trim().to_owned())
      .filter(|v| !v.is_empty());

    Ok(NewMember {
      name,
      email,
      password_hash: hash_password(&self.password)?,
      role,
      village,
      is_verified,
    })
  }
}

/// Fail with `409` when the email is already registered.
pub(crate) async fn ensure_email_free<S>(store: &S, email: &str) -> Result<(), Error>
where
  S: PortalStore,
{
  if store.find_credentials(email).await.map_err(Error::store)?.is_some() {
    return Err(Error::Conflict(format!("an account with email {email} already exists")));
  }
  Ok(())
}

#[derive(Debug, Serialize)]
pub struct Session {
  pub token:  String,
  pub member: Member,
}

// ─── Register ────────────────────────────────────────────────────────────────

/// `POST /auth/register`
///
/// New accounts are plain `user`s awaiting verification by a committee
/// member of their village.
pub async fn register<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<AccountBody>,
) -> Result<impl IntoResponse, Error>
where
  S: PortalStore + Clone + 'static,
{
  let input = body.into_new_member(Role::User, false)?;
  ensure_email_free(state.store.as_ref(), &input.email).await?;

  let member = state.store.add_member(input).await.map_err(Error::store)?;
  tracing::info!(user_id = %member.user_id, village = ?member.village, "account registered");

  let token = issue_token(&state.auth, &member, Utc::now())?;
  Ok((StatusCode::CREATED, Json(Session { token, member })))
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

/// `POST /auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<LoginBody>,
) -> Result<Json<Session>, Error>
where
  S: PortalStore + Clone + 'static,
{
  let bad_credentials = || Error::unauthenticated("incorrect email or password");

  let email = body.email.trim().to_lowercase();
  let (member, hash) = state
    .store
    .find_credentials(&email)
    .await
    .map_err(Error::store)?
    .ok_or_else(bad_credentials)?;

  if !verify_password(&body.password, &hash) {
    tracing::debug!(user_id = %member.user_id, "password mismatch");
    return Err(bad_credentials());
  }

  let token = issue_token(&state.auth, &member, Utc::now())?;
  Ok(Json(Session { token, member }))
}

// ─── Me ──────────────────────────────────────────────────────────────────────

/// `GET /auth/me`
///
/// Reachable while unverified, so the client can show the pending state.
pub async fn me<S>(
  caller: Authorized<AnyCredential>,
  State(state): State<AppState<S>>,
) -> Result<Json<Member>, Error>
where
  S: PortalStore + Clone + 'static,
{
  state
    .store
    .get_member(caller.principal.subject_id)
    .await
    .map_err(Error::store)?
    .map(Json)
    .ok_or_else(|| Error::unauthenticated("account no longer exists; please log in again"))
}
