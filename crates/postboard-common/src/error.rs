//! Common error types used throughout postboard.
//!
//! The variants mirror the failure classes of the two remote services plus
//! input validation, so callers can decide per class whether a failure aborts
//! an operation or is only logged.

/// Common error type for postboard.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input was rejected before any network call was made.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The image hosting service did not accept an upload.
    #[error("Image upload failed: {0}")]
    Upload(String),

    /// The image hosting service did not delete an image.
    #[error("Image deletion failed: {0}")]
    Deletion(String),

    /// The document store rejected a request.
    #[error("Store error: {0}")]
    Store(String),

    /// The requested post does not exist in the document store.
    #[error("Post not found: {0}")]
    NotFound(String),

    /// A request could not be delivered or its response could not be read.
    #[error("Network error: {0}")]
    Network(String),
}

impl Error {
    /// Create a new Validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new Upload error.
    pub fn upload<S: Into<String>>(msg: S) -> Self {
        Self::Upload(msg.into())
    }

    /// Create a new Deletion error.
    pub fn deletion<S: Into<String>>(msg: S) -> Self {
        Self::Deletion(msg.into())
    }

    /// Create a new Store error.
    pub fn store<S: Into<String>>(msg: S) -> Self {
        Self::Store(msg.into())
    }

    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Network error.
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::Network(msg.into())
    }

    /// Whether this error was raised before contacting any remote service.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
