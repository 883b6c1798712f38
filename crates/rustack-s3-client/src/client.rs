//! The object client facade.
//!
//! [`ObjectClient`] ties a [`StorageClient`] to a [`ClientConfig`] and a
//! [`PresignedUrlBuilder`]. Uploads live in [`crate::writer`]; everything here
//! is a thin mapping onto a single storage call or a URL computation.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use rustack_s3_model::{ObjectLocator, ObjectReference};
use rustack_s3_presign::{PresignedUrlBuilder, SigningVerb, UrlOptions, VirtualHostResolver};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::multipart::{MultipartCoordinator, PartWriter};
use crate::storage::{CopyOptions, HeadOutput, MetadataDirective, ObjectOptions, StorageClient};

/// Client for objects in an S3-compatible store.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use rustack_s3_client::{ClientConfig, ObjectClient};
/// use rustack_s3_client::memory::InMemoryStorage;
/// use rustack_s3_model::ObjectLocator;
///
/// let client = ObjectClient::new(Arc::new(InMemoryStorage::new()), ClientConfig::default());
/// assert_eq!(
///     client.public_url(&ObjectLocator::new("foobucket", "foo"), &Default::default()),
///     "https://foobucket.s3.amazonaws.com/foo"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ObjectClient {
    storage: Arc<dyn StorageClient>,
    urls: PresignedUrlBuilder,
    config: ClientConfig,
}

impl ObjectClient {
    /// Create a client over `storage`, signing URLs with the credentials in
    /// `config`.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageClient>, config: ClientConfig) -> Self {
        let resolver = VirtualHostResolver::new(config.s3_endpoint.clone())
            .with_port(config.s3_port)
            .with_force_path_style(config.s3_force_path_style);
        let urls = PresignedUrlBuilder::new(config.credentials(), Arc::new(resolver))
            .with_secure(config.use_ssl)
            .with_default_expires_secs(config.default_url_expires_secs);

        Self {
            storage,
            urls,
            config,
        }
    }

    /// Replace the URL builder, e.g. to use a custom endpoint resolver.
    #[must_use]
    pub fn with_url_builder(mut self, urls: PresignedUrlBuilder) -> Self {
        self.urls = urls;
        self
    }

    /// The client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The storage collaborator.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn StorageClient> {
        &self.storage
    }

    /// A multipart coordinator over this client's storage.
    #[must_use]
    pub fn multipart(&self) -> MultipartCoordinator {
        MultipartCoordinator::new(Arc::clone(&self.storage))
    }

    /// Whether `object` exists.
    ///
    /// # Errors
    ///
    /// Returns any storage error other than [`ClientError::NotFound`].
    pub async fn exists(&self, object: &ObjectLocator) -> Result<bool, ClientError> {
        match self.storage.head(object, None).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Fetch the headers of `object`, or of one of its versions.
    pub async fn head(
        &self,
        object: &ObjectLocator,
        version_id: Option<&str>,
    ) -> Result<HeadOutput, ClientError> {
        self.storage.head(object, version_id).await
    }

    /// Read the body of `object`, or of one of its versions.
    pub async fn read(
        &self,
        object: &ObjectLocator,
        version_id: Option<&str>,
    ) -> Result<Bytes, ClientError> {
        Ok(self.storage.get(object, version_id).await?.body)
    }

    /// Delete `object`, or one of its versions.
    pub async fn delete(
        &self,
        object: &ObjectLocator,
        version_id: Option<&str>,
    ) -> Result<(), ClientError> {
        self.storage.delete(object, version_id).await
    }

    /// Copy `source` onto `object` server side.
    pub async fn copy_from(
        &self,
        object: &ObjectLocator,
        source: &ObjectLocator,
        options: &CopyOptions,
    ) -> Result<ObjectReference, ClientError> {
        let output = self.storage.copy(object, source, options).await?;
        Ok(ObjectReference::new(object.clone(), output.version_id))
    }

    /// Change the storage class of `object` by copying it onto itself.
    ///
    /// The copy keeps the stored headers and user metadata; only the storage
    /// class is replaced.
    pub async fn set_storage_class(
        &self,
        object: &ObjectLocator,
        storage_class: &str,
    ) -> Result<ObjectReference, ClientError> {
        let options = CopyOptions::builder()
            .metadata_directive(MetadataDirective::Copy)
            .object(ObjectOptions::builder().storage_class(storage_class).build())
            .build();

        debug!(object = %object, storage_class, "changing storage class");
        self.copy_from(object, object, &options).await
    }

    /// Upload `object` in parts supplied by `producer`.
    ///
    /// See [`MultipartCoordinator::run`].
    pub async fn multipart_upload<F>(
        &self,
        object: &ObjectLocator,
        options: &ObjectOptions,
        producer: F,
    ) -> Result<Option<ObjectReference>, ClientError>
    where
        F: AsyncFnOnce(&mut PartWriter<'_>) -> Result<(), ClientError>,
    {
        self.multipart().run(object, options, producer).await
    }

    /// A presigned URL for `verb` on `object`, valid from now.
    pub fn url_for(
        &self,
        object: &ObjectLocator,
        verb: SigningVerb,
        options: &UrlOptions,
    ) -> Result<String, ClientError> {
        self.presigned_url(object, verb, options, Utc::now())
    }

    /// A presigned URL for `verb` on `object`, with expirations measured
    /// from `now`.
    pub fn presigned_url(
        &self,
        object: &ObjectLocator,
        verb: SigningVerb,
        options: &UrlOptions,
        now: DateTime<Utc>,
    ) -> Result<String, ClientError> {
        Ok(self.urls.build(object, verb, options, now)?)
    }

    /// An unsigned URL for `object`.
    #[must_use]
    pub fn public_url(&self, object: &ObjectLocator, options: &UrlOptions) -> String {
        self.urls.public_url(object, options)
    }
}
