//! Error types for request signing and presigned URL handling.
//!
//! Signing itself cannot fail for well-formed input; every variant here
//! describes either a caller contract violation detected before signing or
//! a verification failure.

/// Errors that can occur while signing or verifying presigned URLs.
#[derive(Debug, thiserror::Error)]
pub enum PresignError {
    /// The verb is neither an HTTP method we sign for nor a `read`/`write` alias.
    #[error("Unsupported verb: {0}")]
    UnsupportedVerb(String),

    /// The expiration could not be normalized to Unix seconds.
    #[error("Invalid expiration: {0}")]
    InvalidExpiration(String),

    /// A header name or value is not valid HTTP.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A required query parameter is missing from a presigned URL.
    #[error("Missing required query parameter: {0}")]
    MissingQueryParam(String),

    /// The access key ID was not found in the credential store.
    #[error("Access key not found: {0}")]
    AccessKeyNotFound(String),

    /// The computed signature does not match the provided signature.
    #[error("Signature does not match")]
    SignatureDoesNotMatch,

    /// The presigned URL has expired.
    #[error("Request has expired")]
    RequestExpired,
}
