//! SurrealDB connection management.
//!
//! A [`DbManager`] is only handed out once the schema is current, so every
//! repository built from it can assume the tables exist.

use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;
use crate::repository::{SurrealOrderRepository, SurrealUserRepository};
use crate::schema::run_migrations;

/// Where the order store lives and how to sign in to it.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket address, `host:port`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "orderdesk".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// A migrated database handle and the repositories built on it.
#[derive(Clone)]
pub struct DbManager<C: Connection> {
    db: Surreal<C>,
}

impl DbManager<Client> {
    /// Open the configured store over WebSocket, select its namespace and
    /// database, then bring the schema up to date.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "connecting to order store"
        );

        let db = Surreal::new::<Ws>(config.url.as_str()).await?;
        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await?;

        Self::from_client(db).await
    }
}

impl<C: Connection> DbManager<C> {
    /// Wrap an already selected namespace/database, applying any pending
    /// migrations first.
    pub async fn from_client(db: Surreal<C>) -> Result<Self, DbError> {
        run_migrations(&db).await?;
        info!("order store ready");
        Ok(Self { db })
    }

    pub fn client(&self) -> &Surreal<C> {
        &self.db
    }

    pub fn users(&self) -> SurrealUserRepository<C> {
        SurrealUserRepository::new(self.db.clone())
    }

    pub fn orders(&self) -> SurrealOrderRepository<C> {
        SurrealOrderRepository::new(self.db.clone())
    }
}
