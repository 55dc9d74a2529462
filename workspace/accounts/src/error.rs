use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use tracing::warn;

/// Error types for account operations
#[derive(Error, Debug)]
pub enum AccountError {
    /// Input rejected before it reached storage
    #[error("Validation error: {0}")]
    Validation(String),

    /// The normalized email is already registered
    #[error("Email '{0}' is already registered")]
    EmailTaken(String),

    /// No user with the given id
    #[error("User {0} not found")]
    NotFound(i32),

    /// Error from the credential hasher
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl AccountError {
    /// Classify a failed user insert/update, surfacing unique violations on
    /// the email column as [`AccountError::EmailTaken`].
    pub(crate) fn from_user_write(err: DbErr, email: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                warn!("Unique constraint violated for '{}': {}", email, detail);
                AccountError::EmailTaken(email.to_string())
            }
            _ => match err {
                // Raised by the entity's save hook
                DbErr::Custom(message) => AccountError::Validation(message),
                other => AccountError::Database(other),
            },
        }
    }
}

/// Type alias for Result with AccountError
pub type Result<T> = std::result::Result<T, AccountError>;
