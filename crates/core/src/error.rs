//! Error types for the skiff domain.
//!
//! Uses `thiserror`. Each capability port has its own error enum; the
//! top-level [`Error`] wraps them.

use thiserror::Error;

/// The top-level error type for all skiff operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("Skill error: {0}")]
    Skill(#[from] SkillError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Errors from the vector store and document parser ports.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("Document parse failed for {path}: {reason}")]
    ParseFailed { path: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkillError {
    #[error("Unknown skill: {0}")]
    UnknownSkill(String),

    #[error("Skill already registered: {0}")]
    DuplicateSkillName(String),

    #[error("Missing required field '{0}'")]
    MissingField(String),

    #[error("Field '{field}' must be of type {expected}")]
    TypeMismatch { field: String, expected: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("External call failed: {0}")]
    ExternalCallFailure(String),

    #[error("{skill} failed: {reason}")]
    ExecutionFailed { skill: String, reason: String },
}

impl From<ProviderError> for SkillError {
    fn from(e: ProviderError) -> Self {
        SkillError::ExternalCallFailure(e.to_string())
    }
}

impl From<MemoryError> for SkillError {
    fn from(e: MemoryError) -> Self {
        SkillError::ExternalCallFailure(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Chat session is closed")]
    SessionClosed,

    #[error("No agent selected")]
    NoAgentSelected,

    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chat store failed: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn missing_field_names_the_field() {
        let err = SkillError::MissingField("book_name".into());
        assert!(err.to_string().contains("book_name"));
    }

    #[test]
    fn port_errors_become_external_call_failures() {
        let err: SkillError = ProviderError::Network("connection reset".into()).into();
        assert!(matches!(err, SkillError::ExternalCallFailure(ref m) if m.contains("connection reset")));

        let err: SkillError = MemoryError::Storage("disk full".into()).into();
        assert!(matches!(err, SkillError::ExternalCallFailure(ref m) if m.contains("disk full")));
    }
}
