//! Storage-layer errors
//!
//! Every model operation returns `Result<T, StoreError>`. Ownership failures
//! are reported as `*NotFound`, never as "forbidden": a record owned by
//! another user is indistinguishable from one that does not exist.
//!
//! Unique-constraint violations are mapped narrowly by constraint name so
//! that a race lost at the storage layer still surfaces as the matching
//! domain conflict.

/// Unique constraint on `users.username`
pub const USERNAME_CONSTRAINT: &str = "users_username_key";

/// Unique constraint on `users.email`
pub const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Unique constraint on `statuses (user_id, sort_order)`
pub const STATUS_ORDER_CONSTRAINT: &str = "statuses_user_order_key";

/// Foreign key from `tasks.status_id` to `statuses.id`
pub const TASK_STATUS_FK: &str = "tasks_status_id_fkey";

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Username or email is already registered
    #[error("Username or email already registered")]
    DuplicateIdentity,

    /// User does not exist
    #[error("User not found")]
    UserNotFound,

    /// Status does not exist or belongs to another user
    #[error("Status not found")]
    StatusNotFound,

    /// Task does not exist or belongs to another user
    #[error("Task not found")]
    TaskNotFound,

    /// Status is still referenced by at least one task
    #[error("Status is referenced by existing tasks")]
    StatusInUse,

    /// Reorder request does not list exactly the owner's statuses
    #[error("Reorder must list every status exactly once")]
    InvalidReorderSet,

    /// Concurrent write lost a uniqueness race
    #[error("Conflicting concurrent update: {0}")]
    Conflict(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            match db_err.constraint() {
                Some(USERNAME_CONSTRAINT) | Some(EMAIL_CONSTRAINT) => {
                    return StoreError::DuplicateIdentity;
                }
                Some(TASK_STATUS_FK) => return StoreError::StatusInUse,
                Some(STATUS_ORDER_CONSTRAINT) => {
                    return StoreError::Conflict("status order changed concurrently".to_string());
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

/// Result alias for storage operations
pub type StoreResult<T> = Result<T, StoreError>;
