use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EsppError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl EsppError {
    /// Shorthand for the validation failure every public entry point raises.
    pub fn invalid(field: &str, reason: &str) -> Self {
        EsppError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for EsppError {
    fn from(e: serde_json::Error) -> Self {
        EsppError::SerializationError(e.to_string())
    }
}
