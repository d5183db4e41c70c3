//! Bearer-token authentication and role checks.

use axum::{async_trait, extract::FromRequestParts, http::{header, request::Parts}};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use crate::{http::AppState, ShopError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role { Admin, Customer }

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: i64,
}

/// HS256 signing and verification keys.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    pub fn issue(&self, user_id: &str, role: Role, ttl_secs: i64) -> crate::Result<String> {
        let claims = Claims { sub: user_id.to_string(), role, exp: Utc::now().timestamp() + ttl_secs };
        encode(&Header::default(), &claims, &self.encoding).map_err(|e| ShopError::Internal(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> crate::Result<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| ShopError::Unauthorized(e.to_string()))
    }
}

/// The caller identity, extracted from `Authorization: Bearer <jwt>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool { self.role == Role::Admin }

    pub fn require_admin(&self) -> crate::Result<()> {
        if self.is_admin() { Ok(()) } else { Err(ShopError::Forbidden("admin role required".into())) }
    }

    /// Owner of the resource, or any admin.
    pub fn require_owner_or_admin(&self, owner_id: &str) -> crate::Result<()> {
        if self.is_admin() || self.user_id == owner_id { Ok(()) } else { Err(ShopError::Forbidden("not the owner".into())) }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ShopError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts.headers.get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or_else(|| ShopError::Unauthorized("missing bearer token".into()))?;
        let claims = state.jwt.verify(token)?;
        Ok(AuthUser { user_id: claims.sub, role: claims.role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let keys = JwtKeys::new("test-secret");
        let token = keys.issue("U1", Role::Admin, 60).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, "U1");
        assert_eq!(claims.role, Role::Admin);
        assert!(matches!(JwtKeys::new("other").verify(&token), Err(ShopError::Unauthorized(_))));
    }

    #[test]
    fn test_role_checks() {
        let customer = AuthUser { user_id: "U1".into(), role: Role::Customer };
        assert!(matches!(customer.require_admin(), Err(ShopError::Forbidden(_))));
        assert!(customer.require_owner_or_admin("U1").is_ok());
        assert!(customer.require_owner_or_admin("U2").is_err());
        let admin = AuthUser { user_id: "A".into(), role: Role::Admin };
        assert!(admin.require_owner_or_admin("U2").is_ok());
    }
}
