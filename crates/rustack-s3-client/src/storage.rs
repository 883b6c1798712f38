//! The storage service collaborator.
//!
//! [`StorageClient`] is the minimal surface the object client needs from an
//! S3-compatible service. Transport, retries and response decoding belong to
//! the implementation; the client only sees typed requests and responses.

use std::collections::BTreeMap;
use std::fmt::Debug;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use rustack_s3_model::{ObjectLocator, PartDescriptor};
use typed_builder::TypedBuilder;

use crate::error::ClientError;

/// Headers and metadata sent with a put, copy or multipart initiation.
///
/// Every field is passed through to the service unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
pub struct ObjectOptions {
    /// `Content-Type` of the stored object.
    #[builder(default, setter(strip_option, into))]
    pub content_type: Option<String>,
    /// `Content-Disposition` of the stored object.
    #[builder(default, setter(strip_option, into))]
    pub content_disposition: Option<String>,
    /// `Content-Encoding` of the stored object.
    #[builder(default, setter(strip_option, into))]
    pub content_encoding: Option<String>,
    /// `Cache-Control` of the stored object.
    #[builder(default, setter(strip_option, into))]
    pub cache_control: Option<String>,
    /// Base64 MD5 of the body. Only meaningful for single-request puts.
    #[builder(default, setter(strip_option, into))]
    pub content_md5: Option<String>,
    /// Canned ACL (e.g. `public-read`).
    #[builder(default, setter(strip_option, into))]
    pub acl: Option<String>,
    /// Storage class (e.g. `STANDARD_IA`).
    #[builder(default, setter(strip_option, into))]
    pub storage_class: Option<String>,
    /// Server-side encryption algorithm (e.g. `AES256`).
    #[builder(default, setter(strip_option, into))]
    pub server_side_encryption: Option<String>,
    /// User metadata (`x-amz-meta-*`).
    #[builder(default)]
    pub metadata: BTreeMap<String, String>,
}

/// How a copy treats the source object's metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MetadataDirective {
    /// Keep the source metadata; the copy's [`ObjectOptions`] are ignored.
    #[default]
    Copy,
    /// Replace the metadata with the copy's [`ObjectOptions`].
    Replace,
}

impl MetadataDirective {
    /// The `x-amz-metadata-directive` header value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Copy => "COPY",
            Self::Replace => "REPLACE",
        }
    }
}

/// Options for a server-side copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
pub struct CopyOptions {
    /// Copy a specific version of the source.
    #[builder(default, setter(strip_option, into))]
    pub source_version_id: Option<String>,
    /// Whether to keep or replace the source metadata.
    #[builder(default)]
    pub metadata_directive: MetadataDirective,
    /// Headers and metadata applied under [`MetadataDirective::Replace`].
    #[builder(default)]
    pub object: ObjectOptions,
}

/// Response to a `head` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadOutput {
    /// Entity tag of the object.
    pub etag: String,
    /// Size in bytes.
    pub content_length: u64,
    /// Stored `Content-Type`, if any.
    pub content_type: Option<String>,
    /// Stored `Content-Encoding`, if any.
    pub content_encoding: Option<String>,
    /// Stored `Content-Disposition`, if any.
    pub content_disposition: Option<String>,
    /// Stored `Cache-Control`, if any.
    pub cache_control: Option<String>,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
    /// Version of the object, when versioning is enabled.
    pub version_id: Option<String>,
    /// Stored storage class, if any.
    pub storage_class: Option<String>,
    /// User metadata.
    pub metadata: BTreeMap<String, String>,
}

/// Response to a `get` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetOutput {
    /// The object body.
    pub body: Bytes,
    /// The object's headers.
    pub head: HeadOutput,
}

/// Response to a request that stores an object (`put`, `copy`,
/// `complete_multipart`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutOutput {
    /// Entity tag of the stored object, when the service returns one.
    pub etag: Option<String>,
    /// Version of the stored object, when versioning is enabled.
    pub version_id: Option<String>,
}

/// An S3-compatible storage service.
///
/// Implementations report a missing object as [`ClientError::NotFound`] and
/// any other service failure as [`ClientError::Upstream`].
#[async_trait]
pub trait StorageClient: Send + Sync + Debug {
    /// Fetch an object's headers.
    async fn head(
        &self,
        object: &ObjectLocator,
        version_id: Option<&str>,
    ) -> Result<HeadOutput, ClientError>;

    /// Fetch an object.
    async fn get(
        &self,
        object: &ObjectLocator,
        version_id: Option<&str>,
    ) -> Result<GetOutput, ClientError>;

    /// Store an object in a single request.
    async fn put(
        &self,
        object: &ObjectLocator,
        body: Bytes,
        options: &ObjectOptions,
    ) -> Result<PutOutput, ClientError>;

    /// Delete an object. Deleting a missing object succeeds.
    async fn delete(
        &self,
        object: &ObjectLocator,
        version_id: Option<&str>,
    ) -> Result<(), ClientError>;

    /// Copy `source` onto `object` server side.
    async fn copy(
        &self,
        object: &ObjectLocator,
        source: &ObjectLocator,
        options: &CopyOptions,
    ) -> Result<PutOutput, ClientError>;

    /// Start a multipart upload and return its upload ID.
    async fn initiate_multipart(
        &self,
        object: &ObjectLocator,
        options: &ObjectOptions,
    ) -> Result<String, ClientError>;

    /// Upload one part and return its entity tag.
    async fn upload_part(
        &self,
        object: &ObjectLocator,
        upload_id: &str,
        part_number: u32,
        body: Bytes,
    ) -> Result<String, ClientError>;

    /// Assemble the listed parts into the final object.
    async fn complete_multipart(
        &self,
        object: &ObjectLocator,
        upload_id: &str,
        parts: &[PartDescriptor],
    ) -> Result<PutOutput, ClientError>;

    /// Discard a multipart upload and its parts.
    async fn abort_multipart(&self, object: &ObjectLocator, upload_id: &str)
    -> Result<(), ClientError>;
}
