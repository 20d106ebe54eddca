//! SQL schema for the samaj SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS members (
    user_id       TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,       -- argon2 PHC string
    role          TEXT NOT NULL,       -- samaj_core::role::Role wire name
    village       TEXT,
    is_verified   INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL
);

-- One row per form type; rows are overwritten in place, never deleted.
CREATE TABLE IF NOT EXISTS forms (
    form_type    TEXT PRIMARY KEY,
    active       INTEGER NOT NULL DEFAULT 0,
    start_time   TEXT,
    end_time     TEXT,
    event_date   TEXT,
    last_updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS registrations (
    registration_id TEXT PRIMARY KEY,
    form_type       TEXT NOT NULL,
    user_id         TEXT NOT NULL REFERENCES members(user_id) ON DELETE CASCADE,
    details_json    TEXT NOT NULL,
    submitted_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS bookings (
    booking_id TEXT PRIMARY KEY,
    member_id  TEXT NOT NULL REFERENCES members(user_id) ON DELETE CASCADE,
    booked_by  TEXT NOT NULL,
    venue      TEXT NOT NULL,
    event_date TEXT NOT NULL,
    notes      TEXT,
    status     TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS members_village_idx      ON members(village);
CREATE INDEX IF NOT EXISTS registrations_form_idx   ON registrations(form_type, user_id);
CREATE INDEX IF NOT EXISTS bookings_status_idx      ON bookings(status);

PRAGMA user_version = 1;
";
