//! Client error types.
//!
//! Only [`ClientError::NotFound`] is interpreted by the client itself (see
//! `ObjectClient::exists`); every other error is surfaced to the caller
//! unchanged.

use rustack_s3_presign::PresignError;

/// Errors returned by the object client and its storage collaborators.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The object (or object version) does not exist.
    #[error("The specified key does not exist: {bucket}/{key}")]
    NotFound {
        /// The bucket that was searched.
        bucket: String,
        /// The key that was not found.
        key: String,
    },

    /// The caller misused an operation. Raised before any storage call.
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// A failure reported by the storage collaborator.
    #[error("Storage service error: {0:#}")]
    Upstream(anyhow::Error),

    /// A failure raised by a caller-supplied part producer.
    #[error("Part production failed: {0:#}")]
    Production(anyhow::Error),

    /// A URL could not be signed.
    #[error(transparent)]
    Presign(#[from] PresignError),

    /// A data source could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Wrap an error raised while producing multipart parts.
    pub fn production(err: impl Into<anyhow::Error>) -> Self {
        Self::Production(err.into())
    }

    /// Wrap an error reported by the storage collaborator.
    pub fn upstream(err: impl Into<anyhow::Error>) -> Self {
        Self::Upstream(err.into())
    }

    /// Returns `true` if this is a [`ClientError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
