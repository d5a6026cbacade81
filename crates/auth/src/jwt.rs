//! HS256 token issuing and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::claims::{JwtClaims, TokenType, TokenValidationError, validate_claims};
use crate::Principal;

/// Verifies bearer tokens presented on requests.
pub trait JwtValidator: Send + Sync {
    /// Decode and verify an access token at `now`.
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to sign token: {0}")]
pub struct TokenIssueError(String);

/// Access token plus the refresh token that can renew it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Symmetric-key JWT issuer and validator.
#[derive(Clone)]
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl core::fmt::Debug for Hs256Jwt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256Jwt")
            .field("access_lifetime", &self.access_lifetime)
            .field("refresh_lifetime", &self.refresh_lifetime)
            .finish_non_exhaustive()
    }
}

impl Hs256Jwt {
    pub fn new(secret: &[u8], access_lifetime_secs: i64, refresh_lifetime_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_lifetime: Duration::seconds(access_lifetime_secs),
            refresh_lifetime: Duration::seconds(refresh_lifetime_secs),
        }
    }

    pub fn issue(
        &self,
        principal: &Principal,
        token_type: TokenType,
        now: DateTime<Utc>,
    ) -> Result<String, TokenIssueError> {
        let lifetime = match token_type {
            TokenType::Access => self.access_lifetime,
            TokenType::Refresh => self.refresh_lifetime,
        };

        let claims = JwtClaims {
            sub: principal.user_id,
            username: principal.username.clone(),
            role: principal.role,
            token_type,
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            jti: Uuid::now_v7().to_string(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenIssueError(e.to_string()))
    }

    pub fn issue_pair(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenIssueError> {
        Ok(TokenPair {
            access_token: self.issue(principal, TokenType::Access, now)?,
            refresh_token: self.issue(principal, TokenType::Refresh, now)?,
        })
    }

    /// Decode a token of the expected type and check its time window at `now`.
    pub fn decode(
        &self,
        token: &str,
        expected: TokenType,
        now: DateTime<Utc>,
    ) -> Result<JwtClaims, TokenValidationError> {
        // Expiry is checked against the supplied clock in `validate_claims`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &validation)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))?;
        let claims = data.claims;

        validate_claims(&claims, now)?;

        if claims.token_type != expected {
            return Err(TokenValidationError::WrongTokenType {
                expected,
                found: claims.token_type,
            });
        }

        Ok(claims)
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError> {
        self.decode(token, TokenType::Access, now)
    }
}
