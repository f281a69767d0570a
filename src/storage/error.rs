use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn validation(msg: impl Into<String>) -> Self {
        StorageError::Validation(msg.into())
    }

    /// True when the error comes from the backing store itself rather than
    /// from the request. Only these justify falling back to another store.
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            StorageError::Sqlx(_) | StorageError::Migrate(_) | StorageError::Unavailable(_)
        )
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
