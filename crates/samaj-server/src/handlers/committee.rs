//! Handlers for `/committee` endpoints.
//!
//! A committee member manages the accounts of their own village: approving or
//! rejecting pending registrations, adding members directly, and booking on a
//! member's behalf. Every route requires [`CommitteeMembers`] and then applies
//! village scoping to the target.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/committee/pending` | unverified `user` accounts of the caller's village |
//! | `POST`   | `/committee/members` | creates a verified `user` |
//! | `POST`   | `/committee/users/{id}/approve` | |
//! | `DELETE` | `/committee/users/{id}` | rejects a pending registration |
//! | `POST`   | `/committee/users/{id}/bookings` | |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use samaj_core::{
  access::{CommitteeMembers, ensure_approvable, ensure_rejectable, same_village_or_superadmin},
  member::{Member, MemberQuery},
  role::Role,
  store::PortalStore,
};
use uuid::Uuid;

use super::{
  ApiJson, ApiPath,
  accounts::{AccountBody, ensure_email_free},
  bookings::BookingBody,
  load_member,
};
use crate::{AppState, auth::Authorized, error::Error};

/// `GET /committee/pending`
pub async fn pending<S>(
  caller: Authorized<CommitteeMembers>,
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Member>>, Error>
where
  S: PortalStore + Clone + 'static,
{
  let p = &caller.principal;
  same_village_or_superadmin(p, p.village())?;

  let query = MemberQuery {
    village:  (!p.role.is_superadmin()).then(|| p.village.clone()).flatten(),
    verified: Some(false),
    role:     Some(Role::User),
  };
  let members = state.store.list_members(&query).await.map_err(Error::store)?;
  Ok(Json(members))
}

/// `POST /committee/members`
///
/// The new account lands in the caller's village unless the body names one.
pub async fn add_member<S>(
  caller: Authorized<CommitteeMembers>,
  State(state): State<AppState<S>>,
  ApiJson(mut body): ApiJson<AccountBody>,
) -> Result<impl IntoResponse, Error>
where
  S: PortalStore + Clone + 'static,
{
  let p = &caller.principal;
  if body.village.as_deref().is_none_or(|v| v.trim().is_empty()) {
    body.village = p.village.clone();
  }

  let input = body.into_new_member(Role::User, true)?;
  same_village_or_superadmin(p, input.village.as_deref())?;
  ensure_email_free(state.store.as_ref(), &input.email).await?;

  let member = state.store.add_member(input).await.map_err(Error::store)?;
  tracing::info!(
    user_id = %member.user_id,
    village = ?member.village,
    by = %p.subject_id,
    "member added by committee"
  );
  Ok((StatusCode::CREATED, Json(member)))
}

/// `POST /committee/users/{id}/approve`
pub async fn approve<S>(
  caller: Authorized<CommitteeMembers>,
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Member>, Error>
where
  S: PortalStore + Clone + 'static,
{
  let target = load_member(state.store.as_ref(), id).await?;
  ensure_approvable(&caller.principal, &target)?;

  let member = state
    .store
    .set_verified(id, true)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::not_found(format!("no user with id {id}")))?;

  tracing::info!(user_id = %id, by = %caller.principal.subject_id, "account approved");
  Ok(Json(member))
}

/// `DELETE /committee/users/{id}`
pub async fn reject<S>(
  caller: Authorized<CommitteeMembers>,
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, Error>
where
  S: PortalStore + Clone + 'static,
{
  let target = load_member(state.store.as_ref(), id).await?;
  ensure_rejectable(&caller.principal, &target)?;

  if !state.store.delete_member(id).await.map_err(Error::store)? {
    return Err(Error::not_found(format!("no user with id {id}")));
  }
  tracing::info!(user_id = %id, by = %caller.principal.subject_id, "registration rejected");
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /committee/users/{id}/bookings`
pub async fn book_for_member<S>(
  caller: Authorized<CommitteeMembers>,
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(body): ApiJson<BookingBody>,
) -> Result<impl IntoResponse, Error>
where
  S: PortalStore + Clone + 'static,
{
  let target = load_member(state.store.as_ref(), id).await?;
  same_village_or_superadmin(&caller.principal, target.village.as_deref())?;

  let input = body.into_new_booking(target.user_id, caller.principal.subject_id)?;
  let booking = state.store.add_booking(input).await.map_err(Error::store)?;

  tracing::info!(
    booking_id = %booking.booking_id,
    member_id = %id,
    by = %caller.principal.subject_id,
    "booking placed on behalf of member"
  );
  Ok((StatusCode::CREATED, Json(booking)))
}
