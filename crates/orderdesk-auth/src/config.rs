//! Authentication configuration.

use jsonwebtoken::Algorithm;

use crate::error::AuthError;

/// Configuration for the authentication service.
///
/// Resolved once at startup and passed by value into [`AuthService`]
/// and the token functions.
///
/// [`AuthService`]: crate::service::AuthService
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared HMAC secret used to sign and verify every token.
    pub jwt_secret: String,
    /// Signing algorithm. Only the HMAC family is accepted.
    pub jwt_algorithm: Algorithm,
    /// Access token lifetime in seconds (default: 900 = 15 minutes).
    pub access_token_lifetime_secs: u64,
    /// Refresh token lifetime in seconds (default: 604_800 = 7 days).
    pub refresh_token_lifetime_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_algorithm: Algorithm::HS256,
            access_token_lifetime_secs: 900,
            refresh_token_lifetime_secs: 604_800,
        }
    }
}

impl AuthConfig {
    /// Reject configurations the token functions cannot work with.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt_secret.is_empty() {
            return Err(AuthError::Config("JWT secret must not be empty".into()));
        }
        if !matches!(
            self.jwt_algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(AuthError::Config(format!(
                "unsupported signing algorithm {:?}; expected HS256, HS384 or HS512",
                self.jwt_algorithm
            )));
        }
        if self.access_token_lifetime_secs == 0 || self.refresh_token_lifetime_secs == 0 {
            return Err(AuthError::Config("token lifetimes must be positive".into()));
        }
        Ok(())
    }
}
