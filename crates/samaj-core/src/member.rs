//! Member accounts: the stored side of a principal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;

/// A registered portal account. The password hash never leaves the store
/// layer; see [`crate::store::PortalStore::find_credentials`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
  pub user_id:     Uuid,
  pub name:        String,
  pub email:       String,
  pub role:        Role,
  /// Village affiliation; drives committee scoping.
  pub village:     Option<String>,
  pub is_verified: bool,
  pub created_at:  DateTime<Utc>,
}

/// Input for [`crate::store::PortalStore::add_member`].
#[derive(Debug, Clone)]
pub struct NewMember {
  pub name:          String,
  pub email:         String,
  /// argon2 PHC string.
  pub password_hash: String,
  pub role:          Role,
  pub village:       Option<String>,
  pub is_verified:   bool,
}

/// Filters for [`crate::store::PortalStore::list_members`].
#[derive(Debug, Clone, Default)]
pub struct MemberQuery {
  pub village:  Option<String>,
  pub verified: Option<bool>,
  pub role:     Option<Role>,
}
