//! Handlers for `/users` endpoints (user management).
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/users` | Optional `?village=&verified=&role=` |
//! | `PUT`    | `/users/{id}/role` | Body: `{"role":"formmanager"}` |
//! | `DELETE` | `/users/{id}` | 204 on success |
//!
//! All routes require [`UserManagers`]. Nobody may change or delete their own
//! account here, and superadmin accounts are reserved to superadmins.

use axum::{Json, extract::State, http::StatusCode};
use samaj_core::{
  access::{UserManagers, ensure_can_manage},
  member::{Member, MemberQuery},
  role::Role,
  store::PortalStore,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiJson, ApiPath, ApiQuery, load_member};
use crate::{AppState, auth::Authorized, error::Error};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub village:  Option<String>,
  pub verified: Option<bool>,
  pub role:     Option<Role>,
}

/// `GET /users`
pub async fn list<S>(
  _caller: Authorized<UserManagers>,
  State(state): State<AppState<S>>,
  ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<Member>>, Error>
where
  S: PortalStore + Clone + 'static,
{
  let query = MemberQuery {
    village:  params.village,
    verified: params.verified,
    role:     params.role,
  };
  let members = state.store.list_members(&query).await.map_err(Error::store)?;
  Ok(Json(members))
}

// ─── Role change ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RoleBody {
  pub role: Role,
}

/// `PUT /users/{id}/role`
pub async fn set_role<S>(
  caller: Authorized<UserManagers>,
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(body): ApiJson<RoleBody>,
) -> Result<Json<Member>, Error>
where
  S: PortalStore + Clone + 'static,
{
  let target = load_member(state.store.as_ref(), id).await?;
  ensure_can_manage(&caller.principal, &target, Some(body.role))?;

  let updated = state
    .store
    .set_role(id, body.role)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::not_found(format!("no user with id {id}")))?;

  tracing::info!(
    user_id = %id,
    from = %target.role,
    to = %updated.role,
    by = %caller.principal.subject_id,
    "role changed"
  );
  Ok(Json(updated))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /users/{id}`
pub async fn remove<S>(
  caller: Authorized<UserManagers>,
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, Error>
where
  S: PortalStore + Clone + 'static,
{
  let target = load_member(state.store.as_ref(), id).await?;
  ensure_can_manage(&caller.principal, &target, None)?;

  if !state.store.delete_member(id).await.map_err(Error::store)? {
    return Err(Error::not_found(format!("no user with id {id}")));
  }
  tracing::info!(user_id = %id, by = %caller.principal.subject_id, "user deleted");
  Ok(StatusCode::NO_CONTENT)
}
