//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Enums are stored by their
//! wire names. UUIDs are stored as hyphenated lowercase strings.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use samaj_core::{
  booking::{Booking, BookingStatus},
  form::{FormRecord, FormType},
  member::Member,
  registration::Registration,
  role::Role,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── Enums ────────────────────────────────────────────────────────────────────

fn decode_enum<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  T::from_str(s).map_err(|_| Error::Decode { column, value: s.to_owned() })
}

pub fn decode_role(s: &str) -> Result<Role> { decode_enum("role", s) }

pub fn decode_form_type(s: &str) -> Result<FormType> { decode_enum("form_type", s) }

pub fn decode_booking_status(s: &str) -> Result<BookingStatus> {
  decode_enum("status", s)
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const MEMBER_COLUMNS: &str =
  "user_id, name, email, role, village, is_verified, created_at";

/// Raw values read directly from a `members` row (see [`MEMBER_COLUMNS`]).
pub struct RawMember {
  pub user_id:     String,
  pub name:        String,
  pub email:       String,
  pub role:        String,
  pub village:     Option<String>,
  pub is_verified: bool,
  pub created_at:  String,
}

impl RawMember {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:     row.get(0)?,
      name:        row.get(1)?,
      email:       row.get(2)?,
      role:        row.get(3)?,
      village:     row.get(4)?,
      is_verified: row.get(5)?,
      created_at:  row.get(6)?,
    })
  }

  pub fn into_member(self) -> Result<Member> {
    Ok(Member {
      user_id:     decode_uuid(&self.user_id)?,
      name:        self.name,
      email:       self.email,
      role:        decode_role(&self.role)?,
      village:     self.village,
      is_verified: self.is_verified,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub const FORM_COLUMNS: &str =
  "form_type, active, start_time, end_time, event_date, last_updated";

/// Raw values read directly from a `forms` row (see [`FORM_COLUMNS`]).
pub struct RawForm {
  pub form_type:    String,
  pub active:       bool,
  pub start_time:   Option<String>,
  pub end_time:     Option<String>,
  pub event_date:   Option<String>,
  pub last_updated: String,
}

impl RawForm {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      form_type:    row.get(0)?,
      active:       row.get(1)?,
      start_time:   row.get(2)?,
      end_time:     row.get(3)?,
      event_date:   row.get(4)?,
      last_updated: row.get(5)?,
    })
  }

  pub fn into_record(self) -> Result<FormRecord> {
    Ok(FormRecord {
      form_type:    decode_form_type(&self.form_type)?,
      active:       self.active,
      start_time:   decode_opt_dt(self.start_time.as_deref())?,
      end_time:     decode_opt_dt(self.end_time.as_deref())?,
      event_date:   decode_opt_dt(self.event_date.as_deref())?,
      last_updated: decode_dt(&self.last_updated)?,
    })
  }
}

pub const REGISTRATION_COLUMNS: &str =
  "registration_id, form_type, user_id, details_json, submitted_at";

pub struct RawRegistration {
  pub registration_id: String,
  pub form_type:       String,
  pub user_id:         String,
  pub details_json:    String,
  pub submitted_at:    String,
}

impl RawRegistration {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      registration_id: row.get(0)?,
      form_type:       row.get(1)?,
      user_id:         row.get(2)?,
      details_json:    row.get(3)?,
      submitted_at:    row.get(4)?,
    })
  }

  pub fn into_registration(self) -> Result<Registration> {
    Ok(Registration {
      registration_id: decode_uuid(&self.registration_id)?,
      form_type:       decode_form_type(&self.form_type)?,
      user_id:         decode_uuid(&self.user_id)?,
      details:         serde_json::from_str(&self.details_json)?,
      submitted_at:    decode_dt(&self.submitted_at)?,
    })
  }
}

pub const BOOKING_COLUMNS: &str =
  "booking_id, member_id, booked_by, venue, event_date, notes, status, created_at";

pub struct RawBooking {
  pub booking_id: String,
  pub member_id:  String,
  pub booked_by:  String,
  pub venue:      String,
  pub event_date: String,
  pub notes:      Option<String>,
  pub status:     String,
  pub created_at: String,
}

impl RawBooking {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      booking_id: row.get(0)?,
      member_id:  row.get(1)?,
      booked_by:  row.get(2)?,
      venue:      row.get(3)?,
      event_date: row.get(4)?,
      notes:      row.get(5)?,
      status:     row.get(6)?,
      created_at: row.get(7)?,
    })
  }

  pub fn into_booking(self) -> Result<Booking> {
    Ok(Booking {
      booking_id: decode_uuid(&self.booking_id)?,
      member_id:  decode_uuid(&self.member_id)?,
      booked_by:  decode_uuid(&self.booked_by)?,
      venue:      self.venue,
      event_date: decode_dt(&self.event_date)?,
      notes:      self.notes,
      status:     decode_booking_status(&self.status)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
