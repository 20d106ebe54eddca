//! Handlers for the form registry.
//!
//! | Method | Path | Gate |
//! |--------|------|------|
//! | `GET`  | `/forms/public/status` | public |
//! | `GET`  | `/forms/status` | FormManagers |
//! | `GET`  | `/forms/status/{formType}` | FormManagers |
//! | `PUT`  | `/forms/status/{formType}` | FormManagers |
//! | `GET`  | `/forms/check-form-visibility/{formName}` | public |
//! | `GET`  | `/forms/can-access-form/{formName}` | AnyVerified |

use std::{collections::BTreeMap, str::FromStr};

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use samaj_core::{
  access::{AnyVerified, FormManagers},
  form::{
    AdminFormStatus, FormType, PublicFormStatus, WindowPayload, public_status_map,
    validate_window,
  },
  store::PortalStore,
};
use serde::Serialize;

use super::{ApiPath, form_named};
use crate::{AppState, auth::Authorized, error::Error};

// ─── Status reads ────────────────────────────────────────────────────────────

/// `GET /forms/public/status`
///
/// Read-only: absent records are reported as closed, never created.
pub async fn public_status<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<BTreeMap<FormType, PublicFormStatus>>, Error>
where
  S: PortalStore + Clone + 'static,
{
  let records = state.store.list_forms().await.map_err(Error::store)?;
  Ok(Json(public_status_map(&records, Utc::now())))
}

/// `GET /forms/status`
pub async fn admin_status_all<S>(
  _caller: Authorized<FormManagers>,
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<AdminFormStatus>>, Error>
where
  S: PortalStore + Clone + 'static,
{
  let now = Utc::now();
  let records = state.store.ensure_forms_seeded(now).await.map_err(Error::store)?;
  Ok(Json(records.iter().map(|r| AdminFormStatus::of(r, now)).collect()))
}

/// `GET /forms/status/{formType}`
pub async fn admin_status_one<S>(
  _caller: Authorized<FormManagers>,
  State(state): State<AppState<S>>,
  ApiPath(key): ApiPath<String>,
) -> Result<Json<AdminFormStatus>, Error>
where
  S: PortalStore + Clone + 'static,
{
  let form_type = FormType::from_str(&key)
    .map_err(|_| Error::not_found(format!("no form type {key:?}")))?;

  let now = Utc::now();
  let records = state.store.ensure_forms_seeded(now).await.map_err(Error::store)?;
  records
    .iter()
    .find(|r| r.form_type == form_type)
    .map(|r| Json(AdminFormStatus::of(r, now)))
    .ok_or_else(|| Error::not_found(format!("no record for form type {key:?}")))
}

// ─── Window mutation ─────────────────────────────────────────────────────────

/// `PUT /forms/status/{formType}`
///
/// An unknown form type is reported before a malformed body.
pub async fn set_window<S>(
  caller: Authorized<FormManagers>,
  State(state): State<AppState<S>>,
  ApiPath(key): ApiPath<String>,
  body: Result<Json<WindowPayload>, JsonRejection>,
) -> Result<Json<AdminFormStatus>, Error>
where
  S: PortalStore + Clone + 'static,
{
  let payload = match body {
    Ok(Json(payload)) => payload,
    Err(rejection) => {
      FormType::parse_key(&key)?;
      return Err(rejection.into());
    }
  };

  let window = validate_window(&key, &payload)?;
  let now = Utc::now();
  let record = state
    .store
    .upsert_form(window.into_record(now))
    .await
    .map_err(Error::store)?;

  tracing::info!(
    form_type = %record.form_type,
    active = record.active,
    start_time = ?record.start_time,
    end_time = ?record.end_time,
    by = %caller.principal.subject_id,
    "form window updated"
  );
  Ok(Json(AdminFormStatus::of(&record, now)))
}

// ─── Visibility ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Visibility {
  pub visible: bool,
}

/// `GET /forms/check-form-visibility/{formName}`
pub async fn check_visibility<S>(
  State(state): State<AppState<S>>,
  ApiPath(name): ApiPath<String>,
) -> Result<Json<Visibility>, Error>
where
  S: PortalStore + Clone + 'static,
{
  let form_type = form_named(&name)?;
  let record = state.store.get_form(form_type).await.map_err(Error::store)?;
  let status = PublicFormStatus::of(record.as_ref(), Utc::now());
  Ok(Json(Visibility { visible: status.is_currently_open }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessAnswer {
  pub can_access:  bool,
  pub form_type:   FormType,
  pub form_status: PublicFormStatus,
}

/// `GET /forms/can-access-form/{formName}`
///
/// Answers only whether the window is open. Submission limits are enforced
/// by the registration handler.
pub async fn can_access<S>(
  _caller: Authorized<AnyVerified>,
  State(state): State<AppState<S>>,
  ApiPath(name): ApiPath<String>,
) -> Result<Json<AccessAnswer>, Error>
where
  S: PortalStore + Clone + 'static,
{
  let form_type = form_named(&name)?;
  let record = state.store.get_form(form_type).await.map_err(Error::store)?;
  let form_status = PublicFormStatus::of(record.as_ref(), Utc::now());
  Ok(Json(AccessAnswer {
    can_access: form_status.is_currently_open,
    form_type,
    form_status,
  }))
}
