//! The fixed role enumeration.
//!
//! Roles are flat capability sets. No role implies another; the only
//! exception is the `superadmin` override, which is applied by
//! [`crate::access::authorize`] and nowhere else.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  User,
  Admin,
  Superadmin,
  Usermanager,
  Contentmanager,
  Formmanager,
  Bookingmanager,
  Contactmanager,
  Committeemember,
}

impl Role {
  pub fn is_superadmin(self) -> bool { self == Self::Superadmin }

  pub fn as_str(self) -> &'static str { self.into() }
}
