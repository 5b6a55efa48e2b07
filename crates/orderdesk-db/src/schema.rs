//! Schema definitions and migration runner for SurrealDB.
//!
//! Both tables are SCHEMAFULL. UUIDs are stored as strings; order status
//! is stored as its lowercase name with an ASSERT constraint.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "users_and_orders",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE users SCHEMAFULL;
DEFINE FIELD name ON TABLE users TYPE string;
DEFINE FIELD email ON TABLE users TYPE string;
DEFINE FIELD password_hash ON TABLE users TYPE string;
DEFINE FIELD created_at ON TABLE users TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_users_email ON TABLE users COLUMNS email UNIQUE;

-- =======================================================================
-- Orders (owned by a user, removed with it)
-- =======================================================================
DEFINE TABLE orders SCHEMAFULL;
DEFINE FIELD user_id ON TABLE orders TYPE string;
DEFINE FIELD product_name ON TABLE orders TYPE string;
DEFINE FIELD amount ON TABLE orders TYPE float ASSERT $value > 0;
DEFINE FIELD status ON TABLE orders TYPE string \
    ASSERT $value IN ['pending', 'processing', 'completed', 'cancelled'] \
    DEFAULT 'pending';
DEFINE FIELD created_at ON TABLE orders TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE orders TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_orders_user_id ON TABLE orders COLUMNS user_id;
DEFINE INDEX idx_orders_status ON TABLE orders COLUMNS status;
DEFINE INDEX idx_orders_created_at ON TABLE orders COLUMNS created_at;
";

/// Apply all pending migrations.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

        info!(version = migration.version, "Migration applied");
    }

    Ok(())
}
