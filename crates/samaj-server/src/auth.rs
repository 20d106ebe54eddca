//! Bearer-token authentication and the request-boundary authorization gate.
//!
//! [`Authorized<P>`] is the only way a handler obtains a [`Principal`]. It
//! decodes the token, reloads the account so role and village changes take
//! effect on the next request, and runs [`authorize`] against the policy `P`
//! before the handler body executes.

use std::marker::PhantomData;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand_core::OsRng;
use samaj_core::{
  access::{Policy, authorize},
  member::Member,
  principal::{Claims, Principal},
  store::PortalStore,
};

use crate::{AppState, error::Error};

/// Token signing material for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  encoding:  EncodingKey,
  decoding:  DecodingKey,
  pub ttl:   Duration,
}

impl AuthConfig {
  pub fn new(secret: &str, ttl: Duration) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      ttl,
    }
  }
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// Sign a token for `member`, valid for the configured TTL.
pub fn issue_token(config: &AuthConfig, member: &Member, now: DateTime<Utc>) -> Result<String, Error> {
  let claims = Claims {
    underscore_id: Some(member.user_id.to_string()),
    role: member.role.as_str().to_owned(),
    village: member.village.clone(),
    is_verified: member.is_verified,
    iat: now.timestamp(),
    exp: (now + config.ttl).timestamp(),
    ..Default::default()
  };
  Ok(jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &config.encoding)?)
}

/// Check signature and expiry and turn the claims into a [`Principal`].
pub fn decode_token(config: &AuthConfig, token: &str) -> Result<Principal, Error> {
  let data = jsonwebtoken::decode::<Claims>(token, &config.decoding, &Validation::new(Algorithm::HS256))
    .map_err(|e| Error::unauthenticated(format!("invalid or expired token ({e}); please log in again")))?;
  Ok(Principal::from_claims(&data.claims)?)
}

/// Extract the bearer token, if any. A present but malformed header is an
/// error rather than an anonymous request.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, Error> {
  let Some(value) = headers.get(header::AUTHORIZATION) else {
    return Ok(None);
  };
  value
    .to_str()
    .ok()
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(Some)
    .ok_or_else(|| Error::unauthenticated("Authorization header must be `Bearer <token>`"))
}

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Produce an argon2 PHC string for `password`.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::Password(e.to_string()))
}

pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    .unwrap_or(false)
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// A caller that satisfied policy `P`.
pub struct Authorized<P> {
  pub principal: Principal,
  _policy:       PhantomData<fn() -> P>,
}

async fn current_principal<S>(state: &AppState<S>, token: &str) -> Result<Principal, Error>
where
  S: PortalStore + Clone + 'static,
{
  let claimed = decode_token(&state.auth, token)?;
  let member = state
    .store
    .get_member(claimed.subject_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::unauthenticated("account no longer exists; please log in again"))?;
  Ok(Principal::from_member(&member))
}

impl<S, P> FromRequestParts<AppState<S>> for Authorized<P>
where
  S: PortalStore + Clone + 'static,
  P: Policy,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let principal = match bearer_token(&parts.headers)? {
      Some(token) => Some(current_principal(state, token).await?),
      None => None,
    };

    if let Err(e) = authorize(principal.as_ref(), &P::REQUIREMENT) {
      tracing::debug!(policy = P::NAME, path = %parts.uri.path(), error = %e, "request rejected");
      return Err(e.into());
    }

    let principal = principal.ok_or_else(|| Error::unauthenticated("please log in"))?;
    Ok(Self { principal, _policy: PhantomData })
  }
}
