//! Handlers for `/bookings` endpoints.
//!
//! | Method | Path | Gate |
//! |--------|------|------|
//! | `POST` | `/bookings` | AnyVerified, books for the caller |
//! | `GET`  | `/bookings` | BookingManagers, optional `?status=` |
//! | `PUT`  | `/bookings/{id}/status` | BookingManagers |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use samaj_core::{
  access::{AnyVerified, BookingManagers},
  booking::{Booking, BookingStatus, NewBooking},
  form::parse_timestamp,
  store::PortalStore,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::{ApiJson, ApiPath, ApiQuery, required};
use crate::{AppState, auth::Authorized, error::Error};

/// Body for placing a booking, shared with the committee route.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingBody {
  pub venue:      String,
  #[serde(default)]
  pub event_date: Option<Value>,
  #[serde(default)]
  pub notes:      Option<String>,
}

impl BookingBody {
  pub(crate) fn into_new_booking(
    self,
    member_id: Uuid,
    booked_by: Uuid,
  ) -> Result<NewBooking, Error> {
    let venue = required("venue", &self.venue)?;
    let event_date = parse_timestamp("eventDate", self.event_date.as_ref())?
      .ok_or_else(|| samaj_core::Error::invalid("eventDate", "missing, expected a date"))?;
    let notes = self.notes.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty());
    Ok(NewBooking { member_id, booked_by, venue, event_date, notes })
  }
}

/// `POST /bookings`
pub async fn create<S>(
  caller: Authorized<AnyVerified>,
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<BookingBody>,
) -> Result<impl IntoResponse, Error>
where
  S: PortalStore + Clone + 'static,
{
  let me = caller.principal.subject_id;
  let booking = state
    .store
    .add_booking(body.into_new_booking(me, me)?)
    .await
    .map_err(Error::store)?;
  tracing::info!(booking_id = %booking.booking_id, member_id = %me, "booking placed");
  Ok((StatusCode::CREATED, Json(booking)))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub status: Option<String>,
}

/// `GET /bookings[?status=pending|approved|rejected]`
pub async fn list<S>(
  _caller: Authorized<BookingManagers>,
  State(state): State<AppState<S>>,
  ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<Booking>>, Error>
where
  S: PortalStore + Clone + 'static,
{
  let status = params.status.as_deref().map(BookingStatus::parse).transpose()?;
  let bookings = state.store.list_bookings(status).await.map_err(Error::store)?;
  Ok(Json(bookings))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: String,
}

/// `PUT /bookings/{id}/status`
pub async fn set_status<S>(
  caller: Authorized<BookingManagers>,
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(body): ApiJson<StatusBody>,
) -> Result<Json<Booking>, Error>
where
  S: PortalStore + Clone + 'static,
{
  let status = BookingStatus::parse(&body.status)?;
  let booking = state
    .store
    .set_booking_status(id, status)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::not_found(format!("no booking with id {id}")))?;

  tracing::info!(booking_id = %id, status = %status, by = %caller.principal.subject_id, "booking status changed");
  Ok(Json(booking))
}
