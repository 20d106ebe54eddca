//! Venue bookings.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BookingStatus {
  #[default]
  Pending,
  Approved,
  Rejected,
}

impl BookingStatus {
  pub fn as_str(self) -> &'static str { self.into() }

  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| {
      Error::invalid(
        "status",
        format!("received {s:?}, expected pending, approved or rejected"),
      )
    })
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
  pub booking_id: Uuid,
  /// The member the venue is booked for.
  pub member_id:  Uuid,
  /// Who placed the booking; differs from `member_id` when a committee member
  /// books on someone's behalf.
  pub booked_by:  Uuid,
  pub venue:      String,
  pub event_date: DateTime<Utc>,
  pub notes:      Option<String>,
  pub status:     BookingStatus,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
  pub member_id:  Uuid,
  pub booked_by:  Uuid,
  pub venue:      String,
  pub event_date: DateTime<Utc>,
  pub notes:      Option<String>,
}
