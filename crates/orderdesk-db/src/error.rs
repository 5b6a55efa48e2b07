//! Database-specific error types and conversions.

use orderdesk_core::error::OrderDeskError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Corrupt row: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique constraint violated on {entity}")]
    Duplicate { entity: String },
}

impl DbError {
    /// Classify a failed statement, recognising unique-index violations.
    pub(crate) fn from_statement(entity: &str, err: surrealdb::Error) -> Self {
        let message = err.to_string();
        if message.contains("already contains") {
            DbError::Duplicate {
                entity: entity.to_string(),
            }
        } else {
            DbError::Query(message)
        }
    }
}

impl From<DbError> for OrderDeskError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => OrderDeskError::NotFound { entity, id },
            DbError::Duplicate { entity } => OrderDeskError::AlreadyExists { entity },
            other => OrderDeskError::Database(other.to_string()),
        }
    }
}
