//! The authenticated caller and the token claim shape it is decoded from.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, member::Member, role::Role};

/// Decoded bearer-token payload.
///
/// The subject id may arrive under any of `_id`, `id` or `userId`; the first
/// non-null one wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claims {
  #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
  pub underscore_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id:            Option<String>,
  #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
  pub user_id:       Option<String>,
  pub role:          String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub village:       Option<String>,
  #[serde(rename = "isVerified", default)]
  pub is_verified:   bool,
  pub iat:           i64,
  pub exp:           i64,
}

impl Claims {
  pub fn subject(&self) -> Option<&str> {
    self
      .underscore_id
      .as_deref()
      .or(self.id.as_deref())
      .or(self.user_id.as_deref())
  }
}

/// The identity making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
  pub subject_id:  Uuid,
  pub role:        Role,
  pub village:     Option<String>,
  pub is_verified: bool,
}

impl Principal {
  /// Validate a decoded claim. Any defect means the caller is treated as
  /// logged out.
  pub fn from_claims(claims: &Claims) -> Result<Self> {
    let subject = claims.subject().ok_or_else(|| {
      Error::Unauthenticated("token carries no subject id; please log in again".into())
    })?;
    let subject_id = Uuid::parse_str(subject).map_err(|_| {
      Error::Unauthenticated(format!("token subject {subject:?} is not a valid id"))
    })?;
    let role = Role::from_str(&claims.role).map_err(|_| {
      Error::Unauthenticated(format!("token role {:?} is not recognised", claims.role))
    })?;

    Ok(Self {
      subject_id,
      role,
      village: claims.village.clone(),
      is_verified: claims.is_verified,
    })
  }

  /// Current attributes straight from the stored account.
  pub fn from_member(member: &Member) -> Self {
    Self {
      subject_id:  member.user_id,
      role:        member.role,
      village:     member.village.clone(),
      is_verified: member.is_verified,
    }
  }

  pub fn village(&self) -> Option<&str> { self.village.as_deref() }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn claims(role: &str) -> Claims {
    Claims { role: role.into(), iat: 0, exp: 0, ..Default::default() }
  }

  #[test]
  fn first_non_null_subject_wins() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let mut c = claims("user");
    c.id = Some(a.to_string());
    c.user_id = Some(b.to_string());
    assert_eq!(Principal::from_claims(&c).unwrap().subject_id, a);

    c.underscore_id = Some(b.to_string());
    assert_eq!(Principal::from_claims(&c).unwrap().subject_id, b);
  }

  #[test]
  fn missing_subject_is_unauthenticated() {
    let err = Principal::from_claims(&claims("admin")).unwrap_err();
    assert!(matches!(err, Error::Unauthenticated(_)));
  }

  #[test]
  fn unknown_role_is_unauthenticated() {
    let mut c = claims("janitor");
    c.user_id = Some(Uuid::new_v4().to_string());
    assert!(matches!(Principal::from_claims(&c), Err(Error::Unauthenticated(_))));
  }

  #[test]
  fn wire_names_round_trip_through_json() {
    let json = serde_json::json!({
      "userId": Uuid::nil().to_string(),
      "role": "committeemember",
      "village": "Vadodara",
      "isVerified": true,
      "iat": 1,
      "exp": 2,
    });
    let c: Claims = serde_json::from_value(json).unwrap();
    let p = Principal::from_claims(&c).unwrap();
    assert_eq!(p.role, Role::Committeemember);
    assert_eq!(p.village(), Some("Vadodara"));
    assert!(p.is_verified);
  }
}
