use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromoPerfError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Not found: {entity} '{id}'")]
    NotFound { entity: String, id: String },

    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for PromoPerfError {
    fn from(e: serde_json::Error) -> Self {
        PromoPerfError::SerializationError(e.to_string())
    }
}
