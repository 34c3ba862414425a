use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// A concurrent writer won the race; the whole operation may be retried.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    /// `40001` serialization_failure or `40P01` deadlock_detected.
    pub fn is_serialization_failure(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if matches!(e.code().as_deref(), Some("40001") | Some("40P01"))
        )
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::TransactionFailed(_)) || self.is_serialization_failure()
    }

    /// Folds retryable database errors into `TransactionFailed` and unique
    /// violations into `ConstraintViolation` with the given message.
    pub fn classify(self, unique_message: &str) -> Self {
        if self.is_serialization_failure() {
            return StorageError::TransactionFailed(self.to_string());
        }
        if self.is_unique_violation() {
            return StorageError::ConstraintViolation(unique_message.to_string());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_failed_is_retryable() {
        let err = StorageError::TransactionFailed("balance changed".to_string());
        assert!(err.is_retryable());
        assert!(!StorageError::NotFound.is_retryable());
    }

    #[test]
    fn test_classify_leaves_unrelated_errors_alone() {
        let err = StorageError::NotFound.classify("duplicate");
        assert!(matches!(err, StorageError::NotFound));

        let err = StorageError::Database(sqlx::Error::RowNotFound).classify("duplicate");
        assert!(matches!(err, StorageError::Database(sqlx::Error::RowNotFound)));
    }
}
