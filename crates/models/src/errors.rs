use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("duplicate entry: {0}")]
    Conflict(String),
    #[error("foreign key constraint violation: {0}")]
    ForeignKey(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ModelError {
    /// Classify a SeaORM error by the underlying SQL error kind so the HTTP
    /// layer can map constraint violations to stable status codes.
    pub fn from_db_err(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => ModelError::Conflict(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => ModelError::ForeignKey(msg),
            _ => ModelError::Db(e.to_string()),
        }
    }
}
