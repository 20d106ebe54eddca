//! Form registry types and the availability rules.
//!
//! Each [`FormType`] has at most one [`FormRecord`]. Openness is never stored;
//! it is recomputed from the record and the wall clock on every read by
//! [`is_currently_open`].

use std::{collections::BTreeMap, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString, IntoStaticStr};

use crate::{Error, Result};

// ─── Form types ──────────────────────────────────────────────────────────────

/// The administrator-controlled registration forms.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum FormType {
  /// Group-marriage registration.
  SamuhLagan,
  StudentAwards,
  TeamRegistration,
}

/// Public-facing form names accepted by the visibility endpoints.
const PUBLIC_NAMES: &[(&str, FormType)] = &[
  ("samuh-lagan", FormType::SamuhLagan),
  ("group-marriage", FormType::SamuhLagan),
  ("samuhLagan", FormType::SamuhLagan),
  ("student-awards", FormType::StudentAwards),
  ("student-award", FormType::StudentAwards),
  ("studentAwards", FormType::StudentAwards),
  ("team-registration", FormType::TeamRegistration),
  ("teamRegistration", FormType::TeamRegistration),
];

impl FormType {
  pub const ALL: [FormType; 3] =
    [Self::SamuhLagan, Self::StudentAwards, Self::TeamRegistration];

  pub fn as_str(self) -> &'static str { self.into() }

  pub fn title(self) -> &'static str {
    match self {
      Self::SamuhLagan => "Samuh Lagan",
      Self::StudentAwards => "Student Awards",
      Self::TeamRegistration => "Team Registration",
    }
  }

  /// Whether a principal may submit this form at most once. Enforced by the
  /// registration handler, not by the registry.
  pub fn single_submission(self) -> bool {
    matches!(self, Self::StudentAwards | Self::TeamRegistration)
  }

  /// Parse an internal `formType` key, reporting failures against the
  /// `formType` field.
  pub fn parse_key(key: &str) -> Result<Self> {
    Self::from_str(key).map_err(|_| {
      let known: Vec<&str> = Self::ALL.iter().map(|f| f.as_str()).collect();
      Error::invalid(
        "formType",
        format!("received {key:?}, expected one of {}", known.join(", ")),
      )
    })
  }

  pub fn from_public_name(name: &str) -> Option<Self> {
    PUBLIC_NAMES
      .iter()
      .find(|(public, _)| *public == name)
      .map(|(_, form_type)| *form_type)
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// The persisted window configuration of one form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRecord {
  pub form_type:    FormType,
  /// Master switch; `false` closes the form regardless of the window.
  pub active:       bool,
  pub start_time:   Option<DateTime<Utc>>,
  pub end_time:     Option<DateTime<Utc>>,
  /// Date of the physical event. Informational only.
  pub event_date:   Option<DateTime<Utc>>,
  pub last_updated: DateTime<Utc>,
}

impl FormRecord {
  /// The default seeded record: inactive, no window.
  pub fn inactive(form_type: FormType, now: DateTime<Utc>) -> Self {
    Self {
      form_type,
      active: false,
      start_time: None,
      end_time: None,
      event_date: None,
      last_updated: now,
    }
  }

  pub fn is_open_at(&self, now: DateTime<Utc>) -> bool { is_currently_open(self, now) }
}

/// Both window bounds are inclusive.
pub fn is_currently_open(record: &FormRecord, now: DateTime<Utc>) -> bool {
  if !record.active {
    return false;
  }
  let after_start = record.start_time.is_none_or(|start| now >= start);
  let before_end = record.end_time.is_none_or(|end| now <= end);
  after_start && before_end
}

// ─── Status views ────────────────────────────────────────────────────────────

/// Unauthenticated view of a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicFormStatus {
  pub active:            bool,
  pub start_time:        Option<DateTime<Utc>>,
  pub end_time:          Option<DateTime<Utc>>,
  pub event_date:        Option<DateTime<Utc>>,
  pub is_currently_open: bool,
}

impl PublicFormStatus {
  /// Status of a form with no stored record.
  pub fn missing() -> Self {
    Self {
      active:            false,
      start_time:        None,
      end_time:          None,
      event_date:        None,
      is_currently_open: false,
    }
  }

  pub fn of(record: Option<&FormRecord>, now: DateTime<Utc>) -> Self {
    let Some(record) = record else {
      return Self::missing();
    };
    Self {
      active:            record.active,
      start_time:        record.start_time,
      end_time:          record.end_time,
      event_date:        record.event_date,
      is_currently_open: is_currently_open(record, now),
    }
  }
}

/// Administrator view of a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminFormStatus {
  pub form_type:    FormType,
  #[serde(flatten)]
  pub status:       PublicFormStatus,
  pub last_updated: DateTime<Utc>,
}

impl AdminFormStatus {
  pub fn of(record: &FormRecord, now: DateTime<Utc>) -> Self {
    Self {
      form_type:    record.form_type,
      status:       PublicFormStatus::of(Some(record), now),
      last_updated: record.last_updated,
    }
  }
}

/// One entry per known form type, synthesising missing records as closed.
pub fn public_status_map(
  records: &[FormRecord],
  now: DateTime<Utc>,
) -> BTreeMap<FormType, PublicFormStatus> {
  FormType::ALL
    .into_iter()
    .map(|form_type| {
      let record = records.iter().find(|r| r.form_type == form_type);
      (form_type, PublicFormStatus::of(record, now))
    })
    .collect()
}

// ─── Window mutation ─────────────────────────────────────────────────────────

/// Raw body of a window update. Fields stay untyped so that every defect can
/// be reported against the field that caused it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowPayload {
  #[serde(default)]
  pub active:     Option<Value>,
  #[serde(default)]
  pub start_time: Option<Value>,
  #[serde(default)]
  pub end_time:   Option<Value>,
  #[serde(default)]
  pub event_date: Option<Value>,
}

/// A window update that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidWindow {
  pub form_type:  FormType,
  pub active:     bool,
  pub start_time: Option<DateTime<Utc>>,
  pub end_time:   Option<DateTime<Utc>>,
  pub event_date: Option<DateTime<Utc>>,
}

impl ValidWindow {
  pub fn into_record(self, now: DateTime<Utc>) -> FormRecord {
    FormRecord {
      form_type:    self.form_type,
      active:       self.active,
      start_time:   self.start_time,
      end_time:     self.end_time,
      event_date:   self.event_date,
      last_updated: now,
    }
  }
}

/// Validate a window update. The first failing check wins:
/// form type, then `active`, then each timestamp, then ordering.
pub fn validate_window(form_type: &str, payload: &WindowPayload) -> Result<ValidWindow> {
  let form_type = FormType::parse_key(form_type)?;

  let active = match &payload.active {
    Some(Value::Bool(active)) => *active,
    Some(other) => {
      return Err(Error::invalid(
        "active",
        format!("received {other}, expected true or false"),
      ));
    }
    None => return Err(Error::invalid("active", "missing, expected true or false")),
  };

  let start_time = parse_timestamp("startTime", payload.start_time.as_ref())?;
  let end_time = parse_timestamp("endTime", payload.end_time.as_ref())?;
  let event_date = parse_timestamp("eventDate", payload.event_date.as_ref())?;

  if let (Some(start), Some(end)) = (start_time, end_time)
    && end <= start
  {
    return Err(Error::invalid("endTime", "endTime must be after startTime"));
  }

  Ok(ValidWindow { form_type, active, start_time, end_time, event_date })
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM±HH:MM`, `YYYY-MM-DDTHH:MM[:SS]` (read as UTC), `YYYY-MM-DD`
/// (midnight UTC) and integer epoch milliseconds. `null` and `""` mean unset.
pub fn parse_timestamp(
  field: &'static str,
  value: Option<&Value>,
) -> Result<Option<DateTime<Utc>>> {
  let expected = "expected an ISO 8601 date/time or epoch milliseconds";
  match value {
    None | Some(Value::Null) => Ok(None),
    Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
    Some(Value::String(s)) => parse_text(s.trim())
      .map(Some)
      .ok_or_else(|| Error::invalid(field, format!("received {s:?}, {expected}"))),
    Some(Value::Number(n)) => n
      .as_i64()
      .and_then(DateTime::from_timestamp_millis)
      .map(Some)
      .ok_or_else(|| Error::invalid(field, format!("received {n}, {expected}"))),
    Some(other) => Err(Error::invalid(field, format!("received {other}, {expected}"))),
  }
}

fn parse_text(s: &str) -> Option<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }
  if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M%:z") {
    return Some(dt.with_timezone(&Utc));
  }
  let naive = s.strip_suffix('Z').unwrap_or(s);
  for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
    if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
      return Some(dt.and_utc());
    }
  }
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};
  use serde_json::json;

  use super::*;

  fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
  }

  fn record(
    active: bool,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
  ) -> FormRecord {
    FormRecord {
      form_type: FormType::StudentAwards,
      active,
      start_time: start,
      end_time: end,
      event_date: None,
      last_updated: at(2024, 12, 1, 0, 0),
    }
  }

  fn payload(value: Value) -> WindowPayload { serde_json::from_value(value).unwrap() }

  // ── Availability ──────────────────────────────────────────────────────────

  #[test]
  fn window_bounds_are_inclusive() {
    let start = at(2025, 1, 1, 0, 0);
    let end = at(2025, 1, 31, 23, 59);
    let r = record(true, Some(start), Some(end));
    assert!(is_currently_open(&r, start));
    assert!(is_currently_open(&r, end));
    assert!(!is_currently_open(&r, start - Duration::seconds(1)));
    assert!(!is_currently_open(&r, end + Duration::seconds(1)));
  }

  #[test]
  fn student_awards_january_window() {
    let r = record(true, Some(at(2025, 1, 1, 0, 0)), Some(at(2025, 1, 31, 23, 59)));
    assert!(r.is_open_at(at(2025, 1, 1, 0, 0)));
    assert!(!r.is_open_at(at(2025, 2, 1, 0, 0)));
  }

  #[test]
  fn master_switch_dominates() {
    let start = at(2025, 1, 1, 0, 0);
    let end = at(2025, 1, 31, 0, 0);
    let now = at(2025, 1, 15, 12, 0);
    for (s, e) in [(None, None), (Some(start), None), (None, Some(end)), (Some(start), Some(end))] {
      assert!(!is_currently_open(&record(false, s, e), now));
    }
  }

  #[test]
  fn active_without_window_is_always_open() {
    let r = record(true, None, None);
    for now in [at(1970, 1, 1, 0, 0), at(2025, 6, 1, 12, 0), at(2999, 12, 31, 23, 59)] {
      assert!(is_currently_open(&r, now));
    }
  }

  #[test]
  fn half_open_windows() {
    let pivot = at(2025, 3, 1, 0, 0);
    let only_start = record(true, Some(pivot), None);
    assert!(!only_start.is_open_at(pivot - Duration::days(1)));
    assert!(only_start.is_open_at(pivot + Duration::days(365)));

    let only_end = record(true, None, Some(pivot));
    assert!(only_end.is_open_at(pivot - Duration::days(365)));
    assert!(!only_end.is_open_at(pivot + Duration::days(1)));
  }

  #[test]
  fn every_form_type_is_listed_once() {
    let names: Vec<&str> = FormType::ALL.iter().map(|f| f.as_str()).collect();
    assert_eq!(names, ["samuhLagan", "studentAwards", "teamRegistration"]);
    for form in FormType::ALL {
      assert_eq!(FormType::parse_key(form.as_str()).unwrap(), form);
    }
  }

  #[test]
  fn public_map_synthesises_missing_types() {
    let map = public_status_map(&[], Utc::now());
    assert_eq!(map.len(), 3);
    assert!(map.values().all(|s| *s == PublicFormStatus::missing()));

    let json = serde_json::to_value(&map).unwrap();
    assert_eq!(json["teamRegistration"]["isCurrentlyOpen"], json!(false));
    assert_eq!(json["samuhLagan"]["active"], json!(false));
    assert!(json["studentAwards"]["startTime"].is_null());
  }

  #[test]
  fn admin_status_flattens_public_fields() {
    let r = record(true, None, None);
    let json = serde_json::to_value(AdminFormStatus::of(&r, Utc::now())).unwrap();
    assert_eq!(json["formType"], json!("studentAwards"));
    assert_eq!(json["isCurrentlyOpen"], json!(true));
    assert!(json.get("lastUpdated").is_some());
  }

  // ── Names ─────────────────────────────────────────────────────────────────

  #[test]
  fn public_names_resolve() {
    assert_eq!(FormType::from_public_name("samuh-lagan"), Some(FormType::SamuhLagan));
    assert_eq!(FormType::from_public_name("teamRegistration"), Some(FormType::TeamRegistration));
    assert_eq!(FormType::from_public_name("student-awards"), Some(FormType::StudentAwards));
    assert_eq!(FormType::from_public_name("bake-sale"), None);
  }

  #[test]
  fn only_award_and_team_forms_are_single_submission() {
    assert!(FormType::StudentAwards.single_submission());
    assert!(FormType::TeamRegistration.single_submission());
    assert!(!FormType::SamuhLagan.single_submission());
  }

  // ── Validation ────────────────────────────────────────────────────────────

  fn invalid_field(err: Error) -> &'static str {
    match err {
      Error::InvalidArgument { field, .. } => field,
      other => panic!("expected InvalidArgument, got {other:?}"),
    }
  }

  #[test]
  fn unknown_form_type_fails_first() {
    let err = validate_window("bakeSale", &payload(json!({ "active": "yes" }))).unwrap_err();
    assert_eq!(invalid_field(err), "formType");
  }

  #[test]
  fn active_must_be_boolean() {
    for bad in [json!({ "active": "true" }), json!({ "active": 1 }), json!({})] {
      let err = validate_window("studentAwards", &payload(bad)).unwrap_err();
      assert_eq!(invalid_field(err), "active");
    }
  }

  #[test]
  fn bad_timestamp_names_its_field() {
    let err = validate_window(
      "studentAwards",
      &payload(json!({ "active": true, "startTime": "2025-01-01", "endTime": "soon" })),
    )
    .unwrap_err();
    assert_eq!(invalid_field(err), "endTime");

    let err = validate_window(
      "studentAwards",
      &payload(json!({ "active": true, "eventDate": { "day": 1 } })),
    )
    .unwrap_err();
    assert_eq!(invalid_field(err), "eventDate");
  }

  #[test]
  fn end_before_start_is_rejected() {
    let err = validate_window(
      "teamRegistration",
      &payload(json!({ "active": true, "startTime": "2025-03-10", "endTime": "2025-03-05" })),
    )
    .unwrap_err();
    assert!(err.to_string().contains("endTime must be after startTime"), "{err}");

    let same = json!({ "active": true, "startTime": "2025-03-10", "endTime": "2025-03-10" });
    assert!(validate_window("teamRegistration", &payload(same)).is_err());
  }

  #[test]
  fn accepted_timestamp_shapes() {
    let w = validate_window(
      "samuhLagan",
      &payload(json!({
        "active": true,
        "startTime": "2025-01-01T00:00Z",
        "endTime": "2025-01-31T23:59:00+00:00",
        "eventDate": 1_738_368_000_000_i64,
      })),
    )
    .unwrap();
    assert_eq!(w.start_time, Some(at(2025, 1, 1, 0, 0)));
    assert_eq!(w.end_time, Some(at(2025, 1, 31, 23, 59)));
    assert_eq!(w.event_date, Some(at(2025, 2, 1, 0, 0)));

    let cleared = validate_window(
      "samuhLagan",
      &payload(json!({ "active": false, "startTime": null, "endTime": "" })),
    )
    .unwrap();
    assert_eq!(cleared.start_time, None);
    assert_eq!(cleared.end_time, None);
  }

  #[test]
  fn offset_without_seconds_is_accepted() {
    let parsed = parse_timestamp("startTime", Some(&json!("2025-01-01T00:00+05:30"))).unwrap();
    assert_eq!(parsed, Some(at(2024, 12, 31, 18, 30)));

    let utc = parse_timestamp("startTime", Some(&json!("2025-01-01T00:00Z"))).unwrap();
    assert_eq!(utc, Some(at(2025, 1, 1, 0, 0)));
  }

  #[test]
  fn valid_window_stamps_last_updated() {
    let now = at(2025, 5, 5, 5, 5);
    let w = validate_window("studentAwards", &payload(json!({ "active": true }))).unwrap();
    let r = w.into_record(now);
    assert_eq!(r.last_updated, now);
    assert!(r.is_open_at(now));
  }
}
