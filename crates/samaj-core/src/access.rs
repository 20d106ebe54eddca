//! The authorization gate.
//!
//! [`authorize`] is the only place that decides whether a principal satisfies
//! a route's declared [`Requirement`], including the `superadmin` override.
//! The data-dependent checks (village scoping, self-protection, protected
//! roles) live beside it so every handler applies the same rules.

use uuid::Uuid;

use crate::{Error, Result, member::Member, principal::Principal, role::Role};

// ─── Requirements ────────────────────────────────────────────────────────────

/// What a route demands of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
  /// No credential needed.
  Public,
  /// Any valid credential, verified or not. Reserved for the
  /// verification-completion flow.
  Credential,
  /// Any verified account.
  Verified,
  Role(Role),
  AnyOf(&'static [Role]),
}

/// A named, declarative allow-list attached to a route.
pub trait Policy {
  const NAME: &'static str;
  const REQUIREMENT: Requirement;
}

macro_rules! policy {
  ($(#[$doc:meta])* $name:ident => $req:expr) => {
    $(#[$doc])*
    #[derive(Debug, Clone, Copy)]
    pub struct $name;

    impl Policy for $name {
      const NAME: &'static str = stringify!($name);
      const REQUIREMENT: Requirement = $req;
    }
  };
}

policy!(
  /// Token holders whose account may still be pending verification.
  AnyCredential => Requirement::Credential
);
policy!(AnyVerified => Requirement::Verified);
policy!(FormManagers => Requirement::AnyOf(&[Role::Admin, Role::Formmanager]));
policy!(UserManagers => Requirement::AnyOf(&[Role::Admin, Role::Usermanager]));
policy!(BookingManagers => Requirement::Role(Role::Bookingmanager));
policy!(CommitteeMembers => Requirement::Role(Role::Committeemember));

// ─── Gate ────────────────────────────────────────────────────────────────────

/// Decide whether `principal` may invoke a route declaring `requirement`.
pub fn authorize(principal: Option<&Principal>, requirement: &Requirement) -> Result<()> {
  let allowed: &[Role] = match requirement {
    Requirement::Public => return Ok(()),
    Requirement::Credential | Requirement::Verified => &[],
    Requirement::Role(role) => std::slice::from_ref(role),
    Requirement::AnyOf(roles) => *roles,
  };

  let principal = principal.ok_or_else(|| {
    Error::Unauthenticated("no credential presented; please log in".into())
  })?;

  if *requirement == Requirement::Credential {
    return Ok(());
  }
  if !principal.is_verified {
    return Err(Error::Unverified);
  }
  if *requirement == Requirement::Verified {
    return Ok(());
  }

  if principal.role.is_superadmin() || allowed.contains(&principal.role) {
    return Ok(());
  }

  let names: Vec<&str> = allowed.iter().map(|r| r.as_str()).collect();
  Err(Error::Forbidden(format!(
    "role {} may not perform this action (requires one of: {}); contact an administrator",
    principal.role,
    names.join(", "),
  )))
}

// ─── Data-dependent checks ───────────────────────────────────────────────────

/// Village scoping: the principal must share the target's village unless it
/// is a superadmin. Comparison is case-sensitive.
pub fn same_village_or_superadmin(
  principal: &Principal,
  target_village: Option<&str>,
) -> Result<()> {
  if principal.role.is_superadmin() {
    return Ok(());
  }
  match (principal.village(), target_village) {
    (Some(own), Some(target)) if own == target => Ok(()),
    (None, _) => Err(Error::Forbidden(
      "your account has no village affiliation; contact an administrator".into(),
    )),
    (Some(own), target) => Err(Error::Forbidden(format!(
      "target belongs to village {:?}, you may only act within {own:?}",
      target.unwrap_or("<none>"),
    ))),
  }
}

/// A principal may never delete or demote its own account.
pub fn ensure_not_self(principal: &Principal, target_id: Uuid) -> Result<()> {
  if principal.subject_id == target_id {
    return Err(Error::Forbidden(
      "you cannot delete or change the role of your own account".into(),
    ));
  }
  Ok(())
}

/// Rejecting (deleting) a pending registration: only unverified `user`
/// accounts inside the caller's village qualify.
pub fn ensure_rejectable(principal: &Principal, target: &Member) -> Result<()> {
  ensure_not_self(principal, target.user_id)?;

  if target.role != Role::User {
    return Err(Error::Forbidden(format!(
      "{} accounts cannot be rejected",
      target.role
    )));
  }
  if target.is_verified {
    return Err(Error::Forbidden(
      "only accounts awaiting verification can be rejected".into(),
    ));
  }
  same_village_or_superadmin(principal, target.village.as_deref())
}

/// Approving (verifying) a pending registration: only `user` accounts inside
/// the caller's village qualify. Elevated roles are verified through user
/// management, never by a committee.
pub fn ensure_approvable(principal: &Principal, target: &Member) -> Result<()> {
  ensure_not_self(principal, target.user_id)?;

  if target.role != Role::User {
    return Err(Error::Forbidden(format!(
      "{} accounts cannot be approved by a committee member",
      target.role
    )));
  }
  same_village_or_superadmin(principal, target.village.as_deref())
}

/// User management on `target`, optionally assigning `new_role`. Only a
/// superadmin touches superadmin accounts or hands out the superadmin role.
pub fn ensure_can_manage(
  principal: &Principal,
  target: &Member,
  new_role: Option<Role>,
) -> Result<()> {
  ensure_not_self(principal, target.user_id)?;

  if principal.role.is_superadmin() {
    return Ok(());
  }
  if target.role.is_superadmin() {
    return Err(Error::Forbidden("only a superadmin may modify a superadmin account".into()));
  }
  if new_role.is_some_and(Role::is_superadmin) {
    return Err(Error::Forbidden("only a superadmin may grant the superadmin role".into()));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use strum::IntoEnumIterator;

  use super::*;

  fn principal(role: Role, village: Option<&str>) -> Principal {
    Principal {
      subject_id: Uuid::new_v4(),
      role,
      village: village.map(str::to_owned),
      is_verified: true,
    }
  }

  fn member(role: Role, village: &str, is_verified: bool) -> Member {
    Member {
      user_id: Uuid::new_v4(),
      name: "Target".into(),
      email: "target@example.com".into(),
      role,
      village: Some(village.into()),
      is_verified,
      created_at: Utc::now(),
    }
  }

  const ALL_POLICIES: &[Requirement] = &[
    AnyVerified::REQUIREMENT,
    FormManagers::REQUIREMENT,
    UserManagers::REQUIREMENT,
    BookingManagers::REQUIREMENT,
    CommitteeMembers::REQUIREMENT,
  ];

  #[test]
  fn public_needs_no_principal() {
    assert!(authorize(None, &Requirement::Public).is_ok());
  }

  #[test]
  fn missing_principal_is_unauthenticated() {
    for req in ALL_POLICIES.iter().chain([&Requirement::Credential]) {
      assert!(matches!(authorize(None, req), Err(Error::Unauthenticated(_))));
    }
  }

  #[test]
  fn unverified_is_distinct_from_forbidden() {
    let mut p = principal(Role::Superadmin, None);
    p.is_verified = false;
    for req in ALL_POLICIES {
      assert!(matches!(authorize(Some(&p), req), Err(Error::Unverified)));
    }
    assert!(authorize(Some(&p), &Requirement::Credential).is_ok());
  }

  #[test]
  fn superadmin_passes_every_role_requirement() {
    let p = principal(Role::Superadmin, None);
    for req in ALL_POLICIES {
      assert!(authorize(Some(&p), req).is_ok(), "{req:?}");
    }
    for role in Role::iter() {
      assert!(authorize(Some(&p), &Requirement::Role(role)).is_ok());
    }
  }

  #[test]
  fn listed_roles_pass_and_others_are_forbidden() {
    let req = BookingManagers::REQUIREMENT;
    assert!(authorize(Some(&principal(Role::Bookingmanager, None)), &req).is_ok());
    for role in Role::iter().filter(|r| !matches!(r, Role::Bookingmanager | Role::Superadmin)) {
      let err = authorize(Some(&principal(role, None)), &req).unwrap_err();
      assert!(matches!(err, Error::Forbidden(_)), "{role}");
    }
  }

  #[test]
  fn roles_do_not_imply_each_other() {
    let admin = principal(Role::Admin, None);
    assert!(authorize(Some(&admin), &FormManagers::REQUIREMENT).is_ok());
    assert!(authorize(Some(&admin), &CommitteeMembers::REQUIREMENT).is_err());
    assert!(authorize(Some(&admin), &BookingManagers::REQUIREMENT).is_err());
  }

  #[test]
  fn village_scoping_is_exact() {
    let p = principal(Role::Committeemember, Some("Vadodara"));
    assert!(same_village_or_superadmin(&p, Some("Vadodara")).is_ok());
    assert!(matches!(same_village_or_superadmin(&p, Some("Surat")), Err(Error::Forbidden(_))));
    assert!(same_village_or_superadmin(&p, Some("vadodara")).is_err());
    assert!(same_village_or_superadmin(&p, None).is_err());

    let unaffiliated = principal(Role::Committeemember, None);
    assert!(same_village_or_superadmin(&unaffiliated, Some("Vadodara")).is_err());

    let root = principal(Role::Superadmin, None);
    assert!(same_village_or_superadmin(&root, Some("Surat")).is_ok());
  }

  #[test]
  fn cannot_target_self() {
    let p = principal(Role::Admin, None);
    assert!(matches!(ensure_not_self(&p, p.subject_id), Err(Error::Forbidden(_))));
    assert!(ensure_not_self(&p, Uuid::new_v4()).is_ok());

    let mut me = member(Role::User, "Surat", false);
    me.user_id = p.subject_id;
    assert!(ensure_can_manage(&p, &me, None).is_err());
  }

  #[test]
  fn committee_rejection_rules() {
    let p = principal(Role::Committeemember, Some("Vadodara"));

    assert!(ensure_rejectable(&p, &member(Role::User, "Vadodara", false)).is_ok());
    assert!(ensure_rejectable(&p, &member(Role::User, "Surat", false)).is_err());
    assert!(ensure_rejectable(&p, &member(Role::User, "Vadodara", true)).is_err());

    for protected in [Role::Admin, Role::Superadmin, Role::Committeemember] {
      let err = ensure_rejectable(&p, &member(protected, "Vadodara", false)).unwrap_err();
      assert!(matches!(err, Error::Forbidden(_)), "{protected}");
    }
  }

  #[test]
  fn committee_approval_rules() {
    let p = principal(Role::Committeemember, Some("Vadodara"));

    assert!(ensure_approvable(&p, &member(Role::User, "Vadodara", false)).is_ok());
    assert!(ensure_approvable(&p, &member(Role::User, "Surat", false)).is_err());

    for elevated in Role::iter().filter(|r| *r != Role::User) {
      let err = ensure_approvable(&p, &member(elevated, "Vadodara", false)).unwrap_err();
      assert!(matches!(err, Error::Forbidden(_)), "{elevated}");
    }

    let root = principal(Role::Superadmin, None);
    assert!(ensure_approvable(&root, &member(Role::User, "Surat", false)).is_ok());
    assert!(ensure_approvable(&root, &member(Role::Admin, "Surat", false)).is_err());
  }

  #[test]
  fn superadmin_accounts_are_protected_from_other_managers() {
    let manager = principal(Role::Usermanager, None);
    let root = member(Role::Superadmin, "Surat", true);
    assert!(ensure_can_manage(&manager, &root, None).is_err());

    let plain = member(Role::User, "Surat", true);
    assert!(ensure_can_manage(&manager, &plain, Some(Role::Contentmanager)).is_ok());
    assert!(ensure_can_manage(&manager, &plain, Some(Role::Superadmin)).is_err());

    let superadmin = principal(Role::Superadmin, None);
    assert!(ensure_can_manage(&superadmin, &root, Some(Role::Admin)).is_ok());
  }
}
