//! Authentication service: registration, login, token refresh and
//! request authentication.

use orderdesk_core::error::{OrderDeskError, OrderDeskResult, UnauthorizedReason};
use orderdesk_core::models::user::{CreateUser, User};
use orderdesk_core::repository::UserRepository;
use tracing::{debug, info};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token::{self, TokenKind, TokenPair};

/// Input for the registration flow. Field-level validation (lengths,
/// email syntax) has already happened upstream.
#[derive(Debug)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Authentication service.
///
/// Generic over the user repository so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    config: AuthConfig,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: U, config: AuthConfig) -> Self {
        Self { user_repo, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Create an account. Fails with `DuplicateEmail` if the email is
    /// already registered.
    pub async fn register(&self, input: RegisterInput) -> OrderDeskResult<User> {
        match self.user_repo.get_by_email(&input.email).await {
            Ok(_) => return Err(OrderDeskError::DuplicateEmail),
            Err(OrderDeskError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let password_hash = password::hash_password(&input.password)?;

        // The unique index still guards against a concurrent registration
        // slipping in between the lookup and the insert.
        let user = self
            .user_repo
            .create(CreateUser {
                name: input.name,
                email: input.email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                OrderDeskError::AlreadyExists { .. } => OrderDeskError::DuplicateEmail,
                other => other,
            })?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Check email + password and issue a token pair.
    ///
    /// An unknown email and a wrong password produce the same
    /// `InvalidCredentials` error.
    pub async fn login(&self, input: LoginInput) -> OrderDeskResult<TokenPair> {
        let user = match self.user_repo.get_by_email(&input.email).await {
            Ok(user) => user,
            Err(OrderDeskError::NotFound { .. }) => {
                // Keep the unknown-email path as slow as a wrong password.
                password::verify_against_dummy(&input.password);
                debug!("login rejected: unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        if !password::verify_password(&input.password, &user.password_hash) {
            debug!(user_id = %user.id, "login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        let pair = token::issue_token_pair(&user.email, &self.config)?;
        info!(user_id = %user.id, "user logged in");
        Ok(pair)
    }

    /// Exchange a valid refresh token for a new access + refresh pair.
    pub async fn refresh(&self, refresh_token: &str) -> OrderDeskResult<TokenPair> {
        let user = self.resolve(refresh_token, TokenKind::Refresh).await?;
        let pair = token::issue_token_pair(&user.email, &self.config)?;
        debug!(user_id = %user.id, "token pair refreshed");
        Ok(pair)
    }

    /// Resolve an access token to the user it was issued for.
    ///
    /// Fails with `Unauthorized` if the token is invalid or the account
    /// no longer exists.
    pub async fn authenticate(&self, access_token: &str) -> OrderDeskResult<User> {
        self.resolve(access_token, TokenKind::Access).await
    }

    async fn resolve(&self, raw: &str, kind: TokenKind) -> OrderDeskResult<User> {
        let subject = token::verify_token(raw, kind, &self.config).map_err(|e| {
            debug!(kind = kind.as_str(), reason = %e, "token rejected");
            OrderDeskError::from(e)
        })?;

        match self.user_repo.get_by_email(&subject).await {
            Ok(user) => Ok(user),
            Err(OrderDeskError::NotFound { .. }) => {
                debug!(kind = kind.as_str(), "token rejected: subject no longer exists");
                Err(OrderDeskError::Unauthorized(
                    UnauthorizedReason::UnknownSubject,
                ))
            }
            Err(e) => Err(e),
        }
    }
}
