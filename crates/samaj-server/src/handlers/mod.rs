//! Route handlers, one module per resource.
//!
//! Every handler that needs a caller takes an [`Authorized`](crate::auth::Authorized)
//! extractor as its first argument, so the gate has already run by the time
//! the body executes.

pub mod accounts;
pub mod bookings;
pub mod committee;
pub mod forms;
pub mod registrations;
pub mod users;

use axum::extract::{FromRequest, FromRequestParts};
use samaj_core::{form::FormType, member::Member, store::PortalStore};
use uuid::Uuid;

use crate::error::Error;

/// `Path` whose rejection renders through [`Error`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct ApiPath<T>(pub T);

/// `Query` whose rejection renders through [`Error`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct ApiQuery<T>(pub T);

/// `Json` whose rejection renders through [`Error`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

pub(crate) async fn load_member<S: PortalStore>(store: &S, id: Uuid) -> Result<Member, Error> {
  store
    .get_member(id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::not_found(format!("no user with id {id}")))
}

/// Resolve a public-facing form name, `404` when unknown.
pub(crate) fn form_named(name: &str) -> Result<FormType, Error> {
  FormType::from_public_name(name)
    .ok_or_else(|| Error::not_found(format!("no form named {name:?}")))
}

/// Trim and lowercase an email address, rejecting anything without an `@`.
pub(crate) fn normalize_email(email: &str) -> Result<String, Error> {
  let email = email.trim().to_lowercase();
  match email.split_once('@') {
    Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
    _ => Err(
      samaj_core::Error::invalid("email", format!("received {email:?}, expected an email address"))
        .into(),
    ),
  }
}

/// Reject blank required text fields.
pub(crate) fn required(field: &'static str, value: &str) -> Result<String, Error> {
  let value = value.trim();
  if value.is_empty() {
    return Err(samaj_core::Error::invalid(field, "must not be empty").into());
  }
  Ok(value.to_owned())
}
