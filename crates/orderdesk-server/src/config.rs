//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ORDERDESK_JWT_SECRET` - HMAC secret used to sign access and refresh tokens
//!
//! ## Optional
//! - `ORDERDESK_DB_URL` - SurrealDB WebSocket address (default: 127.0.0.1:8000)
//! - `ORDERDESK_DB_NAMESPACE` - namespace (default: orderdesk)
//! - `ORDERDESK_DB_DATABASE` - database (default: main)
//! - `ORDERDESK_DB_USER` / `ORDERDESK_DB_PASSWORD` - root credentials (default: root/root)
//! - `ORDERDESK_JWT_ALGORITHM` - HS256, HS384 or HS512 (default: HS256)
//! - `ORDERDESK_ACCESS_TOKEN_MINUTES` - access token lifetime (default: 15)
//! - `ORDERDESK_REFRESH_TOKEN_DAYS` - refresh token lifetime (default: 7)
//! - `ORDERDESK_SWEEP_INTERVAL_SECS` - order sweep interval (default: 120)
//! - `ORDERDESK_PROCESSING_DELAY_MS` - simulated per-order processing time (default: 1000)
//! - `ORDERDESK_SEED_USER_EMAIL` / `ORDERDESK_SEED_USER_PASSWORD` - if both are
//!   set, this user is registered at startup unless it already exists
//! - `ORDERDESK_SEED_USER_NAME` - display name for the seed user (default: Test User)

use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use orderdesk_auth::{AuthConfig, AuthError};
use orderdesk_db::DbConfig;
use orderdesk_orders::SweeperConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Invalid auth configuration: {0}")]
    Auth(#[from] AuthError),
}

/// Account created at startup when configured.
#[derive(Clone)]
pub struct SeedUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SeedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db: DbConfig,
    pub auth: AuthConfig,
    pub sweeper: SweeperConfig,
    pub seed_user: Option<SeedUser>,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);
        let db_defaults = DbConfig::default();
        let sweeper_defaults = SweeperConfig::default();

        let db = DbConfig {
            url: env.or_default("ORDERDESK_DB_URL", &db_defaults.url),
            namespace: env.or_default("ORDERDESK_DB_NAMESPACE", &db_defaults.namespace),
            database: env.or_default("ORDERDESK_DB_DATABASE", &db_defaults.database),
            username: env.or_default("ORDERDESK_DB_USER", &db_defaults.username),
            password: env.or_default("ORDERDESK_DB_PASSWORD", &db_defaults.password),
        };

        let jwt_algorithm = match env.optional("ORDERDESK_JWT_ALGORITHM") {
            Some(raw) => Algorithm::from_str(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("ORDERDESK_JWT_ALGORITHM".to_string(), e.to_string())
            })?,
            None => Algorithm::HS256,
        };
        let access_minutes: u64 = env.parsed_or("ORDERDESK_ACCESS_TOKEN_MINUTES", 15)?;
        let refresh_days: u64 = env.parsed_or("ORDERDESK_REFRESH_TOKEN_DAYS", 7)?;

        let auth = AuthConfig {
            jwt_secret: env.required("ORDERDESK_JWT_SECRET")?,
            jwt_algorithm,
            access_token_lifetime_secs: access_minutes.saturating_mul(60),
            refresh_token_lifetime_secs: refresh_days.saturating_mul(86_400),
        };
        auth.validate()?;

        let sweep_interval_secs: u64 = env.parsed_or(
            "ORDERDESK_SWEEP_INTERVAL_SECS",
            sweeper_defaults.interval.as_secs(),
        )?;
        if sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "ORDERDESK_SWEEP_INTERVAL_SECS".to_string(),
                "must be positive".to_string(),
            ));
        }
        let processing_delay_ms: u64 = env.parsed_or(
            "ORDERDESK_PROCESSING_DELAY_MS",
            sweeper_defaults.processing_delay.as_millis() as u64,
        )?;
        let sweeper = SweeperConfig {
            interval: Duration::from_secs(sweep_interval_secs),
            processing_delay: Duration::from_millis(processing_delay_ms),
            ..sweeper_defaults
        };

        let seed_user = match (
            env.optional("ORDERDESK_SEED_USER_EMAIL"),
            env.optional("ORDERDESK_SEED_USER_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(SeedUser {
                name: env.or_default("ORDERDESK_SEED_USER_NAME", "Test User"),
                email,
                password,
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::MissingEnvVar(
                    "ORDERDESK_SEED_USER_PASSWORD".to_string(),
                ));
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingEnvVar(
                    "ORDERDESK_SEED_USER_EMAIL".to_string(),
                ));
            }
        };

        Ok(Self {
            db,
            auth,
            sweeper,
            seed_user,
        })
    }
}

/// Lookup wrapper; blank values count as unset.
struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
            None => Ok(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_with_only_the_secret() {
        let config = load(&[("ORDERDESK_JWT_SECRET", "s3cret")]).unwrap();

        assert_eq!(config.db.url, "127.0.0.1:8000");
        assert_eq!(config.db.namespace, "orderdesk");
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.auth.jwt_algorithm, Algorithm::HS256);
        assert_eq!(config.auth.access_token_lifetime_secs, 900);
        assert_eq!(config.auth.refresh_token_lifetime_secs, 604_800);
        assert_eq!(config.sweeper.interval, Duration::from_secs(120));
        assert_eq!(config.sweeper.processing_delay, Duration::from_secs(1));
        assert!(config.seed_user.is_none());
    }

    #[test]
    fn missing_secret_fails() {
        let err = load(&[]).unwrap_err();
        assert!(
            matches!(&err, ConfigError::MissingEnvVar(key) if key == "ORDERDESK_JWT_SECRET"),
            "{err:?}"
        );

        let err = load(&[("ORDERDESK_JWT_SECRET", "  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("ORDERDESK_JWT_SECRET", "s3cret"),
            ("ORDERDESK_JWT_ALGORITHM", "HS512"),
            ("ORDERDESK_ACCESS_TOKEN_MINUTES", "5"),
            ("ORDERDESK_REFRESH_TOKEN_DAYS", "1"),
            ("ORDERDESK_SWEEP_INTERVAL_SECS", "30"),
            ("ORDERDESK_PROCESSING_DELAY_MS", "0"),
            ("ORDERDESK_DB_URL", "db.internal:8000"),
        ])
        .unwrap();

        assert_eq!(config.auth.jwt_algorithm, Algorithm::HS512);
        assert_eq!(config.auth.access_token_lifetime_secs, 300);
        assert_eq!(config.auth.refresh_token_lifetime_secs, 86_400);
        assert_eq!(config.sweeper.interval, Duration::from_secs(30));
        assert_eq!(config.sweeper.processing_delay, Duration::ZERO);
        assert_eq!(config.db.url, "db.internal:8000");
    }

    #[test]
    fn non_hmac_algorithm_is_rejected() {
        let err = load(&[
            ("ORDERDESK_JWT_SECRET", "s3cret"),
            ("ORDERDESK_JWT_ALGORITHM", "RS256"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Auth(_)), "{err:?}");

        let err = load(&[
            ("ORDERDESK_JWT_SECRET", "s3cret"),
            ("ORDERDESK_JWT_ALGORITHM", "rot13"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(..)), "{err:?}");
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = load(&[
            ("ORDERDESK_JWT_SECRET", "s3cret"),
            ("ORDERDESK_SWEEP_INTERVAL_SECS", "soon"),
        ])
        .unwrap_err();
        assert!(
            matches!(&err, ConfigError::InvalidEnvVar(key, _) if key == "ORDERDESK_SWEEP_INTERVAL_SECS")
        );

        let err = load(&[
            ("ORDERDESK_JWT_SECRET", "s3cret"),
            ("ORDERDESK_SWEEP_INTERVAL_SECS", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(..)));

        let err = load(&[
            ("ORDERDESK_JWT_SECRET", "s3cret"),
            ("ORDERDESK_ACCESS_TOKEN_MINUTES", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Auth(_)));
    }

    #[test]
    fn seed_user_needs_email_and_password() {
        let config = load(&[
            ("ORDERDESK_JWT_SECRET", "s3cret"),
            ("ORDERDESK_SEED_USER_EMAIL", "test@example.com"),
            ("ORDERDESK_SEED_USER_PASSWORD", "testpassword"),
        ])
        .unwrap();
        let seed = config.seed_user.unwrap();
        assert_eq!(seed.name, "Test User");
        assert_eq!(seed.email, "test@example.com");
        assert!(!format!("{seed:?}").contains("testpassword"));

        let err = load(&[
            ("ORDERDESK_JWT_SECRET", "s3cret"),
            ("ORDERDESK_SEED_USER_EMAIL", "test@example.com"),
        ])
        .unwrap_err();
        assert!(
            matches!(&err, ConfigError::MissingEnvVar(key) if key == "ORDERDESK_SEED_USER_PASSWORD")
        );
    }
}
