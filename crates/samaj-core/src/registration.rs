//! Form submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::form::FormType;

/// A stored submission of one of the registry's forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
  pub registration_id: Uuid,
  pub form_type:       FormType,
  pub user_id:         Uuid,
  /// Form-specific answers, stored verbatim.
  pub details:         serde_json::Value,
  pub submitted_at:    DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRegistration {
  pub form_type: FormType,
  pub user_id:   Uuid,
  pub details:   serde_json::Value,
}
