//! Common error types for ideahub

use thiserror::Error;

/// Common result type for ideahub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the core and the HTTP layer
#[derive(Error, Debug)]
pub enum Error {
    /// Bad credentials or no session
    #[error("Authentication required: {0}")]
    Auth(String),

    /// Authenticated, but the role or visibility does not allow the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Idea or page absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed import, malformed request or malformed generator output
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Attempt to delete the only page of an idea
    #[error("Cannot delete the last page. An idea must have at least one page.")]
    LastPage,

    /// Identity collision (idea id or page filename already taken)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// I/O failure against the idea store or settings document
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Generator call failed or returned unusable content
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Validation sub-kinds. Each carries enough detail to name the failing
/// field or file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing or malformed field `{0}`")]
    MissingField(String),

    #[error("page file {0} specified in metadata not found")]
    MissingFile(String),

    #[error("page {0} missing <h1> tag")]
    MissingHeading(String),

    #[error("visibility must be \"public\", \"private\", or an array of usernames")]
    BadVisibility,

    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    #[error("invalid metadata.json: {0}")]
    InvalidMetadata(String),

    #[error("invalid page order: {0}")]
    PageOrder(String),

    #[error("description is required")]
    EmptyBrief,

    #[error("description too long (max {max} characters, got {actual})")]
    BriefTooLong { max: usize, actual: usize },
}

impl Error {
    /// Wrap a serde_json failure on a persisted document as a storage error
    pub(crate) fn corrupt_document(what: &str, err: serde_json::Error) -> Self {
        Error::Storage(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{}: {}", what, err),
        ))
    }
}
