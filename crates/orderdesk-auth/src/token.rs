//! JWT access/refresh token issuance and verification.
//!
//! Both token kinds are self-contained HMAC-signed JWTs. They differ only
//! in lifetime and in the `type` claim, which [`verify_token`] checks
//! against the kind the caller expects.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }

    fn lifetime_secs(self, config: &AuthConfig) -> u64 {
        match self {
            TokenKind::Access => config.access_token_lifetime_secs,
            TokenKind::Refresh => config.refresh_token_lifetime_secs,
        }
    }
}

/// JWT claims embedded in every token.
///
/// `sub` and `type` are optional on the wire so that a token missing
/// them decodes and is then rejected with a specific reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user's email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// `access` or `refresh`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
    /// Unique token ID.
    #[serde(default)]
    pub jti: String,
}

/// An access/refresh pair as handed to a client.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Issue a token of `kind` for `subject` as if minted at `issued_at`.
pub fn issue_token_at(
    subject: &str,
    kind: TokenKind,
    issued_at: DateTime<Utc>,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let lifetime = i64::try_from(kind.lifetime_secs(config))
        .map_err(|_| AuthError::Config("token lifetime out of range".into()))?;
    let expires_at = issued_at + Duration::seconds(lifetime);

    let claims = TokenClaims {
        sub: Some(subject.to_string()),
        kind: Some(kind.as_str().to_string()),
        iat: issued_at.timestamp(),
        exp: expires_at.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    jsonwebtoken::encode(&Header::new(config.jwt_algorithm), &claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

pub fn issue_access_token(subject: &str, config: &AuthConfig) -> Result<String, AuthError> {
    issue_token_at(subject, TokenKind::Access, Utc::now(), config)
}

pub fn issue_refresh_token(subject: &str, config: &AuthConfig) -> Result<String, AuthError> {
    issue_token_at(subject, TokenKind::Refresh, Utc::now(), config)
}

/// Issue a fresh access + refresh pair for `subject`.
pub fn issue_token_pair(subject: &str, config: &AuthConfig) -> Result<TokenPair, AuthError> {
    Ok(TokenPair {
        access_token: issue_access_token(subject, config)?,
        refresh_token: issue_refresh_token(subject, config)?,
        token_type: "bearer",
        expires_in: config.access_token_lifetime_secs,
    })
}

/// Decode a token, checking signature and expiry only.
pub fn decode_token(token: &str, config: &AuthConfig) -> Result<TokenClaims, AuthError> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::new(config.jwt_algorithm);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);

    jsonwebtoken::decode::<TokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}

/// Verify a token and return its subject.
///
/// Fails if the signature is bad, the token is expired, the subject is
/// absent, or the `type` claim is not `expected`.
pub fn verify_token(
    token: &str,
    expected: TokenKind,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let claims = decode_token(token, config)?;

    let subject = claims
        .sub
        .filter(|s| !s.is_empty())
        .ok_or(AuthError::MissingSubject)?;

    match claims.kind.as_deref() {
        Some(kind) if kind == expected.as_str() => Ok(subject),
        other => Err(AuthError::WrongTokenKind {
            expected: expected.as_str().to_string(),
            found: other.unwrap_or("none").to_string(),
        }),
    }
}
