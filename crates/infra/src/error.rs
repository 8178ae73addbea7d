use thiserror::Error;

use pharmastock_auth::PasswordError;
use pharmastock_core::DomainError;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Business rule failure (validation, not found, conflict, ...).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Unknown CI or wrong password. Callers cannot tell which.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("schema setup failed: {0}")]
    Migrate(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            StoreError::Domain(err) => Some(err),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        match &value {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Domain(DomainError::conflict(db.message().to_string()))
            }
            sqlx::Error::Database(db) if db.is_check_violation() => {
                StoreError::Domain(DomainError::invariant(db.message().to_string()))
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                StoreError::Domain(DomainError::invariant(db.message().to_string()))
            }
            _ => StoreError::Database(value),
        }
    }
}

/// Convert an error, replacing a UNIQUE violation's message with `conflict`.
pub(crate) fn unique_as(err: sqlx::Error, conflict: impl FnOnce() -> String) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Domain(DomainError::conflict(conflict()))
        }
        _ => err.into(),
    }
}
