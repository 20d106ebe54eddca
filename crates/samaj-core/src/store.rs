//! The `PortalStore` trait.
//!
//! Implemented by storage backends (e.g. `samaj-store-sqlite`). The server
//! depends on this abstraction, not on any concrete backend. Every write
//! touches a single row; concurrent writers to the same row resolve as
//! last-write-wins.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  booking::{Booking, BookingStatus, NewBooking},
  form::{FormRecord, FormType},
  member::{Member, MemberQuery, NewMember},
  registration::{NewRegistration, Registration},
  role::Role,
};

/// Abstraction over a portal store backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PortalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Members ───────────────────────────────────────────────────────────

  /// Persist a new account. Fails if the email is already registered.
  fn add_member(
    &self,
    input: NewMember,
  ) -> impl Future<Output = Result<Member, Self::Error>> + Send + '_;

  fn get_member(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Member>, Self::Error>> + Send + '_;

  /// Look up an account by email together with its password hash.
  fn find_credentials<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<(Member, String)>, Self::Error>> + Send + 'a;

  fn list_members<'a>(
    &'a self,
    query: &'a MemberQuery,
  ) -> impl Future<Output = Result<Vec<Member>, Self::Error>> + Send + 'a;

  /// Returns the updated member, or `None` if it does not exist.
  fn set_verified(
    &self,
    id: Uuid,
    verified: bool,
  ) -> impl Future<Output = Result<Option<Member>, Self::Error>> + Send + '_;

  /// Returns the updated member, or `None` if it does not exist.
  fn set_role(
    &self,
    id: Uuid,
    role: Role,
  ) -> impl Future<Output = Result<Option<Member>, Self::Error>> + Send + '_;

  /// Remove an account along with its registrations and bookings. Returns
  /// `false` if nothing was deleted.
  fn delete_member(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Form registry ─────────────────────────────────────────────────────

  fn get_form(
    &self,
    form_type: FormType,
  ) -> impl Future<Output = Result<Option<FormRecord>, Self::Error>> + Send + '_;

  fn list_forms(
    &self,
  ) -> impl Future<Output = Result<Vec<FormRecord>, Self::Error>> + Send + '_;

  /// Create or overwrite the record for `record.form_type`.
  fn upsert_form(
    &self,
    record: FormRecord,
  ) -> impl Future<Output = Result<FormRecord, Self::Error>> + Send + '_;

  /// Insert an inactive record for every form type that has none. Existing
  /// records are left untouched, so repeated calls are harmless. Returns all
  /// records afterwards.
  fn ensure_forms_seeded(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<FormRecord>, Self::Error>> + Send + '_;

  // ── Registrations ─────────────────────────────────────────────────────

  fn add_registration(
    &self,
    input: NewRegistration,
  ) -> impl Future<Output = Result<Registration, Self::Error>> + Send + '_;

  fn count_registrations(
    &self,
    form_type: FormType,
    user_id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn list_registrations(
    &self,
    form_type: FormType,
  ) -> impl Future<Output = Result<Vec<Registration>, Self::Error>> + Send + '_;

  // ── Bookings ──────────────────────────────────────────────────────────

  fn add_booking(
    &self,
    input: NewBooking,
  ) -> impl Future<Output = Result<Booking, Self::Error>> + Send + '_;

  fn list_bookings(
    &self,
    status: Option<BookingStatus>,
  ) -> impl Future<Output = Result<Vec<Booking>, Self::Error>> + Send + '_;

  /// Returns the updated booking, or `None` if it does not exist.
  fn set_booking_status(
    &self,
    id: Uuid,
    status: BookingStatus,
  ) -> impl Future<Output = Result<Option<Booking>, Self::Error>> + Send + '_;
}
