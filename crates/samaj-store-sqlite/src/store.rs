//! The SQLite implementation of [`PortalStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use samaj_core::{
  booking::{Booking, BookingStatus, NewBooking},
  form::{FormRecord, FormType},
  member::{Member, MemberQuery, NewMember},
  registration::{NewRegistration, Registration},
  role::Role,
  store::PortalStore,
};

use crate::{
  Error, Result,
  encode::{
    BOOKING_COLUMNS, FORM_COLUMNS, MEMBER_COLUMNS, REGISTRATION_COLUMNS, RawBooking,
    RawForm, RawMember, RawRegistration, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A portal store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, used by the tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_booking(&self, id_str: String) -> Result<Option<Booking>> {
    let raw: Option<RawBooking> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE booking_id = ?1"),
            rusqlite::params![id_str],
            RawBooking::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawBooking::into_booking).transpose()
  }
}

// ─── PortalStore impl ────────────────────────────────────────────────────────

impl PortalStore for SqliteStore {
  type Error = Error;

  // ── Members ───────────────────────────────────────────────────────────────

  async fn add_member(&self, input: NewMember) -> Result<Member> {
    let member = Member {
      user_id:     Uuid::new_v4(),
      name:        input.name,
      email:       input.email,
      role:        input.role,
      village:     input.village,
      is_verified: input.is_verified,
      created_at:  Utc::now(),
    };

    let id_str   = encode_uuid(member.user_id);
    let name     = member.name.clone();
    let email    = member.email.clone();
    let role_str = member.role.as_str();
    let village  = member.village.clone();
    let verified = member.is_verified;
    let at_str   = encode_dt(member.created_at);
    let hash     = input.password_hash;

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let taken = conn
          .query_row(
            "SELECT 1 FROM members WHERE email = ?1",
            rusqlite::params![email],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(false);
        }

        conn.execute(
          "INSERT INTO members
             (user_id, name, email, password_hash, role, village, is_verified, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![id_str, name, email, hash, role_str, village, verified, at_str],
        )?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::DuplicateEmail(member.email));
    }
    Ok(member)
  }

  async fn get_member(&self, id: Uuid) -> Result<Option<Member>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawMember> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {MEMBER_COLUMNS} FROM members WHERE user_id = ?1"),
            rusqlite::params![id_str],
            RawMember::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawMember::into_member).transpose()
  }

  async fn find_credentials(&self, email: &str) -> Result<Option<(Member, String)>> {
    let email = email.to_owned();

    let raw: Option<(RawMember, String)> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {MEMBER_COLUMNS}, password_hash FROM members WHERE email = ?1"),
            rusqlite::params![email],
            |row| Ok((RawMember::from_row(row)?, row.get(7)?)),
          )
          .optional()?)
      })
      .await?;

    raw
      .map(|(raw, hash)| raw.into_member().map(|member| (member, hash)))
      .transpose()
  }

  async fn list_members(&self, query: &MemberQuery) -> Result<Vec<Member>> {
    let village  = query.village.clone();
    let verified = query.verified;
    let role     = query.role.map(Role::as_str);

    let raws: Vec<RawMember> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MEMBER_COLUMNS} FROM members
           WHERE (?1 IS NULL OR village = ?1)
             AND (?2 IS NULL OR is_verified = ?2)
             AND (?3 IS NULL OR role = ?3)
           ORDER BY created_at, email"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![village, verified, role], RawMember::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMember::into_member).collect()
  }

  async fn set_verified(&self, id: Uuid, verified: bool) -> Result<Option<Member>> {
    let id_str = encode_uuid(id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE members SET is_verified = ?2 WHERE user_id = ?1",
          rusqlite::params![id_str, verified],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_member(id).await
  }

  async fn set_role(&self, id: Uuid, role: Role) -> Result<Option<Member>> {
    let id_str   = encode_uuid(id);
    let role_str = role.as_str();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE members SET role = ?2 WHERE user_id = ?1",
          rusqlite::params![id_str, role_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_member(id).await
  }

  async fn delete_member(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM members WHERE user_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  // ── Form registry ─────────────────────────────────────────────────────────

  async fn get_form(&self, form_type: FormType) -> Result<Option<FormRecord>> {
    let key = form_type.as_str();

    let raw: Option<RawForm> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {FORM_COLUMNS} FROM forms WHERE form_type = ?1"),
            rusqlite::params![key],
            RawForm::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawForm::into_record).transpose()
  }

  async fn list_forms(&self) -> Result<Vec<FormRecord>> {
    let raws: Vec<RawForm> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {FORM_COLUMNS} FROM forms ORDER BY form_type"))?;
        let rows = stmt
          .query_map([], RawForm::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawForm::into_record).collect()
  }

  async fn upsert_form(&self, record: FormRecord) -> Result<FormRecord> {
    let key        = record.form_type.as_str();
    let active     = record.active;
    let start_time = record.start_time.map(encode_dt);
    let end_time   = record.end_time.map(encode_dt);
    let event_date = record.event_date.map(encode_dt);
    let updated    = encode_dt(record.last_updated);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO forms (form_type, active, start_time, end_time, event_date, last_updated)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT(form_type) DO UPDATE SET
             active       = excluded.active,
             start_time   = excluded.start_time,
             end_time     = excluded.end_time,
             event_date   = excluded.event_date,
             last_updated = excluded.last_updated",
          rusqlite::params![key, active, start_time, end_time, event_date, updated],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn ensure_forms_seeded(&self, now: DateTime<Utc>) -> Result<Vec<FormRecord>> {
    let at_str = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for form_type in FormType::ALL {
          tx.execute(
            "INSERT OR IGNORE INTO forms (form_type, active, last_updated) VALUES (?1, 0, ?2)",
            rusqlite::params![form_type.as_str(), at_str],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    self.list_forms().await
  }

  // ── Registrations ─────────────────────────────────────────────────────────

  async fn add_registration(&self, input: NewRegistration) -> Result<Registration> {
    let registration = Registration {
      registration_id: Uuid::new_v4(),
      form_type:       input.form_type,
      user_id:         input.user_id,
      details:         input.details,
      submitted_at:    Utc::now(),
    };

    let id_str      = encode_uuid(registration.registration_id);
    let key         = registration.form_type.as_str();
    let user_str    = encode_uuid(registration.user_id);
    let details_str = registration.details.to_string();
    let at_str      = encode_dt(registration.submitted_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO registrations (registration_id, form_type, user_id, details_json, submitted_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, key, user_str, details_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(registration)
  }

  async fn count_registrations(&self, form_type: FormType, user_id: Uuid) -> Result<usize> {
    let key      = form_type.as_str();
    let user_str = encode_uuid(user_id);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM registrations WHERE form_type = ?1 AND user_id = ?2",
          rusqlite::params![key, user_str],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count as usize)
  }

  async fn list_registrations(&self, form_type: FormType) -> Result<Vec<Registration>> {
    let key = form_type.as_str();

    let raws: Vec<RawRegistration> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REGISTRATION_COLUMNS} FROM registrations
           WHERE form_type = ?1 ORDER BY submitted_at"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![key], RawRegistration::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRegistration::into_registration).collect()
  }

  // ── Bookings ──────────────────────────────────────────────────────────────

  async fn add_booking(&self, input: NewBooking) -> Result<Booking> {
    let booking = Booking {
      booking_id: Uuid::new_v4(),
      member_id:  input.member_id,
      booked_by:  input.booked_by,
      venue:      input.venue,
      event_date: input.event_date,
      notes:      input.notes,
      status:     BookingStatus::Pending,
      created_at: Utc::now(),
    };

    let id_str     = encode_uuid(booking.booking_id);
    let member_str = encode_uuid(booking.member_id);
    let by_str     = encode_uuid(booking.booked_by);
    let venue      = booking.venue.clone();
    let event_str  = encode_dt(booking.event_date);
    let notes      = booking.notes.clone();
    let status     = booking.status.as_str();
    let at_str     = encode_dt(booking.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO bookings
             (booking_id, member_id, booked_by, venue, event_date, notes, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![id_str, member_str, by_str, venue, event_str, notes, status, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(booking)
  }

  async fn list_bookings(&self, status: Option<BookingStatus>) -> Result<Vec<Booking>> {
    let status = status.map(BookingStatus::as_str);

    let raws: Vec<RawBooking> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {BOOKING_COLUMNS} FROM bookings
           WHERE (?1 IS NULL OR status = ?1)
           ORDER BY event_date, created_at"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![status], RawBooking::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBooking::into_booking).collect()
  }

  async fn set_booking_status(
    &self,
    id: Uuid,
    status: BookingStatus,
  ) -> Result<Option<Booking>> {
    let id_str     = encode_uuid(id);
    let status_str = status.as_str();
    let lookup     = id_str.clone();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE bookings SET status = ?2 WHERE booking_id = ?1",
          rusqlite::params![id_str, status_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.fetch_booking(lookup).await
  }
}
