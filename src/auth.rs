use std::time::Duration;

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::AppConfig, connectivity::ProbeState, error::AppError, models::Role};

/// Claims
///
/// Token payload: the identity and its role, plus the registered `iat`/`exp`
/// timestamps that bound its lifetime. `demo` marks identities taken from the
/// built-in demo accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub role: Role,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub demo: bool,
    pub iat: i64,
    pub exp: i64,
}

/// JwtKeys
///
/// Signing and verification material derived from the configured secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.jwt_secret, config.jwt_ttl)
    }

    /// Issues a token for `id`/`role` that expires one TTL from now.
    pub fn issue(&self, id: Uuid, role: Role) -> Result<String, AppError> {
        self.issue_at(id, role, Utc::now())
    }

    /// Issues a token for an identity served in demo mode.
    pub fn issue_demo(&self, id: Uuid, role: Role) -> Result<String, AppError> {
        self.sign(id, role, true, Utc::now())
    }

    pub fn issue_at(&self, id: Uuid, role: Role, now: DateTime<Utc>) -> Result<String, AppError> {
        self.sign(id, role, false, now)
    }

    fn sign(
        &self,
        id: Uuid,
        role: Role,
        demo: bool,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let iat = now.timestamp();
        let claims = Claims {
            id,
            role,
            demo,
            iat,
            exp: iat.saturating_add(ttl),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Verifies signature and expiry. Every failure collapses to `Unauthorized`.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|err| {
                tracing::debug!(error = %err, "bearer token rejected");
                AppError::Unauthorized
            })
    }
}

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// AuthUser
///
/// The verified identity attached to a request. Resolution is purely
/// cryptographic: there is no store lookup, so the gate works the same in demo mode.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
    /// Signed in through a demo account.
    pub demo: bool,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Already resolved by `auth_middleware` further out.
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let claims = JwtKeys::from_ref(state).verify(token)?;

        Ok(AuthUser {
            id: claims.id,
            role: claims.role,
            demo: claims.demo,
        })
    }
}

/// Fails with `Forbidden` unless the identity holds one of `allowed`.
pub fn ensure_role(user: &AuthUser, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        tracing::debug!(user_id = %user.id, role = %user.role, "role check failed");
        Err(AppError::Forbidden)
    }
}

/// auth_middleware
///
/// Authentication gate for protected routers. The `AuthUser` extractor rejects
/// with 401 before the handler runs; on success the identity is stored in the
/// request extensions for the role gate and handlers.
pub async fn auth_middleware(auth_user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(auth_user);
    next.run(request).await
}

/// require_admin
///
/// Role gate layered inside `auth_middleware`. The demo admin credentials are
/// public, so their tokens lose admin rights once the live store is back.
pub async fn require_admin(
    State(probe): State<ProbeState>,
    auth_user: AuthUser,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    ensure_role(&auth_user, &[Role::Admin])?;
    if auth_user.demo && probe.is_connected() {
        tracing::warn!(user_id = %auth_user.id, "demo token refused on live admin route");
        return Err(AppError::Forbidden);
    }
    Ok(next.run(request).await)
}
