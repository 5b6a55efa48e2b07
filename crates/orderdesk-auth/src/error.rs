//! Authentication error types.

use orderdesk_core::error::{OrderDeskError, UnauthorizedReason};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token has expired")]
    TokenExpired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has no subject")]
    MissingSubject,

    #[error("expected {expected} token, got {found}")]
    WrongTokenKind { expected: String, found: String },

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl AuthError {
    /// The internal reason behind a token rejection, if this is one.
    pub fn unauthorized_reason(&self) -> Option<UnauthorizedReason> {
        match self {
            AuthError::TokenExpired => Some(UnauthorizedReason::Expired),
            AuthError::InvalidSignature => Some(UnauthorizedReason::InvalidSignature),
            AuthError::MissingSubject => Some(UnauthorizedReason::MissingSubject),
            AuthError::WrongTokenKind { .. } => Some(UnauthorizedReason::WrongKind),
            AuthError::TokenInvalid(_) => Some(UnauthorizedReason::Malformed),
            AuthError::InvalidCredentials | AuthError::Config(_) | AuthError::Crypto(_) => None,
        }
    }
}

impl From<AuthError> for OrderDeskError {
    fn from(err: AuthError) -> Self {
        if let Some(reason) = err.unauthorized_reason() {
            return OrderDeskError::Unauthorized(reason);
        }
        match err {
            AuthError::InvalidCredentials => OrderDeskError::InvalidCredentials,
            AuthError::Config(msg) => OrderDeskError::Internal(msg),
            other => OrderDeskError::Crypto(other.to_string()),
        }
    }
}
