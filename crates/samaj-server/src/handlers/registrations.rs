//! Handlers for `/registrations` endpoints.
//!
//! Submitting is where the two halves of "may this caller fill in this form"
//! meet: the registry says whether the window is open, and this handler
//! enforces the one-submission rule for the forms that have it.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use samaj_core::{
  access::{AnyVerified, FormManagers},
  registration::{NewRegistration, Registration},
  store::PortalStore,
};
use serde_json::Value;

use super::{ApiJson, ApiPath, form_named};
use crate::{AppState, auth::Authorized, error::Error};

/// `POST /registrations/{formName}`
///
/// Body: a JSON object of form answers, stored verbatim.
pub async fn submit<S>(
  caller: Authorized<AnyVerified>,
  State(state): State<AppState<S>>,
  ApiPath(name): ApiPath<String>,
  ApiJson(details): ApiJson<Value>,
) -> Result<impl IntoResponse, Error>
where
  S: PortalStore + Clone + 'static,
{
  let form_type = form_named(&name)?;
  if !details.is_object() {
    return Err(samaj_core::Error::invalid("details", "expected a JSON object").into());
  }

  let record = state.store.get_form(form_type).await.map_err(Error::store)?;
  if !record.is_some_and(|r| r.is_open_at(Utc::now())) {
    return Err(
      samaj_core::Error::Forbidden(format!(
        "{} is not accepting submissions right now",
        form_type.title()
      ))
      .into(),
    );
  }

  let user_id = caller.principal.subject_id;
  if form_type.single_submission()
    && state
      .store
      .count_registrations(form_type, user_id)
      .await
      .map_err(Error::store)?
      > 0
  {
    return Err(Error::Conflict(format!(
      "you have already submitted {}",
      form_type.title()
    )));
  }

  let registration = state
    .store
    .add_registration(NewRegistration { form_type, user_id, details })
    .await
    .map_err(Error::store)?;

  tracing::info!(
    registration_id = %registration.registration_id,
    form_type = %form_type,
    user_id = %user_id,
    "form submitted"
  );
  Ok((StatusCode::CREATED, Json(registration)))
}

/// `GET /registrations/{formName}`
pub async fn list<S>(
  _caller: Authorized<FormManagers>,
  State(state): State<AppState<S>>,
  ApiPath(name): ApiPath<String>,
) -> Result<Json<Vec<Registration>>, Error>
where
  S: PortalStore + Clone + 'static,
{
  let form_type = form_named(&name)?;
  let registrations = state
    .store
    .list_registrations(form_type)
    .await
    .map_err(Error::store)?;
  Ok(Json(registrations))
}
