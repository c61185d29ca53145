/// Errors returned by the consultation core.
///
/// Rule violations found by the validator are not errors; they are reported as data in a
/// [`crate::ValidationResult`]. These variants cover malformed input and collaborator failures.
#[derive(Debug, thiserror::Error)]
pub enum ConsultError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("translation error: {0}")]
    Translation(String),

    #[error("failed to serialize consultation: {0}")]
    Serialization(serde_json::Error),

    #[error("failed to deserialize consultation: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("{operation} failed with status {status}")]
    Api {
        operation: &'static str,
        status: u16,
    },

    #[error("{0} returned no data")]
    MissingData(&'static str),
}

/// Type alias for Results that can fail with a [`ConsultError`].
pub type ConsultResult<T> = std::result::Result<T, ConsultError>;
