//! OrderDesk Auth — password hashing, JWT access/refresh token issuance
//! and verification, and the authentication service.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{AuthService, LoginInput, RegisterInput};
pub use token::{TokenClaims, TokenKind, TokenPair};
