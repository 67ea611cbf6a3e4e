pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Missing or malformed required input.
    #[error("{0}")]
    Validation(String),

    #[error("roll number already exists: {0}")]
    DuplicateRoll(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: u64 },

    #[error("invalid username or password")]
    InvalidCredentials,

    /// Writing a collection failed; in-memory state was left untouched.
    #[error("failed to persist data: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation(message.into())
    }

    pub fn student_not_found(id: u64) -> Self {
        StoreError::NotFound {
            kind: "student",
            id,
        }
    }

    /// Stable code used on the sidecar wire.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Validation(_) => "validation",
            StoreError::DuplicateRoll(_) => "duplicate_roll",
            StoreError::NotFound { .. } => "not_found",
            StoreError::InvalidCredentials => "invalid_credentials",
            StoreError::Storage(_) => "storage_failed",
        }
    }
}
