//! Multipart upload coordination.
//!
//! [`MultipartCoordinator::run`] drives one upload through its lifecycle:
//!
//! ```text
//! initiate ──► producer adds parts ──► complete   (producer Ok, >= 1 part)
//!                                  └─► abort      (producer Err, or 0 parts)
//! ```
//!
//! Once initiation succeeds exactly one terminal call (complete or abort) is
//! issued. A failed initiation has no session and nothing to terminate.

use std::sync::Arc;

use bytes::Bytes;
use rustack_s3_model::{ObjectLocator, ObjectReference, PartDescriptor};
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::storage::{ObjectOptions, StorageClient};

/// Largest part number S3 accepts.
pub const MAX_PART_NUMBER: u32 = 10_000;

/// An initiated multipart upload.
///
/// Parts are appended in submission order. The session is consumed when its
/// terminal action is issued, so its part list cannot change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartSession {
    upload_id: String,
    object: ObjectLocator,
    completed_parts: Vec<PartDescriptor>,
}

impl MultipartSession {
    fn new(upload_id: String, object: ObjectLocator) -> Self {
        Self {
            upload_id,
            object,
            completed_parts: Vec::new(),
        }
    }

    /// The service-assigned upload ID.
    #[must_use]
    pub fn upload_id(&self) -> &str {
        &self.upload_id
    }

    /// The object being uploaded.
    #[must_use]
    pub fn object(&self) -> &ObjectLocator {
        &self.object
    }

    /// Parts uploaded so far, ordered by part number.
    #[must_use]
    pub fn completed_parts(&self) -> &[PartDescriptor] {
        &self.completed_parts
    }
}

/// The handle a part producer uses to upload parts.
#[derive(Debug)]
pub struct PartWriter<'a> {
    storage: &'a dyn StorageClient,
    session: &'a mut MultipartSession,
}

impl PartWriter<'_> {
    /// Upload `body` as the next part.
    ///
    /// The part number is one more than the number of parts added so far.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Precondition`] once [`MAX_PART_NUMBER`] parts
    /// have been added, or whatever the storage service reports.
    pub async fn add_part(&mut self, body: impl Into<Bytes>) -> Result<PartDescriptor, ClientError> {
        let body = body.into();
        let part_number = u32::try_from(self.session.completed_parts.len() + 1)
            .ok()
            .filter(|n| *n <= MAX_PART_NUMBER)
            .ok_or_else(|| {
                ClientError::Precondition(format!(
                    "a multipart upload holds at most {MAX_PART_NUMBER} parts"
                ))
            })?;

        let size = body.len();
        let etag = self
            .storage
            .upload_part(
                &self.session.object,
                &self.session.upload_id,
                part_number,
                body,
            )
            .await?;

        debug!(
            upload_id = %self.session.upload_id,
            part_number,
            size,
            "uploaded part"
        );

        let part = PartDescriptor::new(part_number, etag);
        self.session.completed_parts.push(part.clone());
        Ok(part)
    }

    /// Parts uploaded so far.
    #[must_use]
    pub fn parts(&self) -> &[PartDescriptor] {
        &self.session.completed_parts
    }

    /// The session being written.
    #[must_use]
    pub fn session(&self) -> &MultipartSession {
        self.session
    }
}

/// Runs multipart uploads against a storage service.
#[derive(Debug, Clone)]
pub struct MultipartCoordinator {
    storage: Arc<dyn StorageClient>,
}

impl MultipartCoordinator {
    /// Create a coordinator for `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageClient>) -> Self {
        Self { storage }
    }

    /// Upload `object` in parts supplied by `producer`.
    ///
    /// `producer` receives a [`PartWriter`] bound to the new session and
    /// adds parts through it. Afterwards:
    ///
    /// - if the producer failed, the upload is aborted and the producer's
    ///   error is returned, even when parts were added;
    /// - if no parts were added, the upload is aborted and `Ok(None)` is
    ///   returned;
    /// - otherwise the upload is completed with the parts in order.
    ///
    /// # Errors
    ///
    /// Returns the initiation error (no abort is attempted), the producer's
    /// error, or the error of the terminal complete/abort call.
    ///
    /// # Panics
    ///
    /// A panic in `producer` propagates out of `run` and no abort is issued.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use rustack_s3_client::memory::InMemoryStorage;
    /// use rustack_s3_client::multipart::{MultipartCoordinator, PartWriter};
    /// use rustack_s3_client::storage::ObjectOptions;
    /// use rustack_s3_model::ObjectLocator;
    ///
    /// # tokio_test::block_on(async {
    /// let storage = Arc::new(InMemoryStorage::new());
    /// let coordinator = MultipartCoordinator::new(storage.clone());
    /// let object = ObjectLocator::new("bucket", "big.bin");
    ///
    /// let reference = coordinator
    ///     .run(&object, &ObjectOptions::default(), async |parts: &mut PartWriter<'_>| {
    ///         parts.add_part("hello ").await?;
    ///         parts.add_part("world").await?;
    ///         Ok(())
    ///     })
    ///     .await
    ///     .unwrap();
    ///
    /// assert_eq!(reference.unwrap().object(), &object);
    /// assert_eq!(storage.object_body(&object).unwrap().as_ref(), b"hello world");
    /// # });
    /// ```
    pub async fn run<F>(
        &self,
        object: &ObjectLocator,
        options: &ObjectOptions,
        producer: F,
    ) -> Result<Option<ObjectReference>, ClientError>
    where
        F: AsyncFnOnce(&mut PartWriter<'_>) -> Result<(), ClientError>,
    {
        let upload_id = self.storage.initiate_multipart(object, options).await?;
        debug!(bucket = %object.bucket(), key = %object.key(), %upload_id, "started multipart upload");

        let mut session = MultipartSession::new(upload_id, object.clone());
        let produced = {
            let mut writer = PartWriter {
                storage: self.storage.as_ref(),
                session: &mut session,
            };
            producer(&mut writer).await
        };

        self.finalize(session, produced).await
    }

    /// Issue the terminal action for `session`.
    async fn finalize(
        &self,
        session: MultipartSession,
        produced: Result<(), ClientError>,
    ) -> Result<Option<ObjectReference>, ClientError> {
        let MultipartSession {
            upload_id,
            object,
            completed_parts,
        } = session;

        if let Err(err) = produced {
            warn!(
                bucket = %object.bucket(),
                key = %object.key(),
                %upload_id,
                parts = completed_parts.len(),
                error = %err,
                "part production failed, aborting multipart upload"
            );
            if let Err(abort_err) = self.storage.abort_multipart(&object, &upload_id).await {
                warn!(%upload_id, error = %abort_err, "failed to abort multipart upload");
            }
            return Err(err);
        }

        if completed_parts.is_empty() {
            debug!(%upload_id, "no parts produced, aborting multipart upload");
            self.storage.abort_multipart(&object, &upload_id).await?;
            return Ok(None);
        }

        let output = self
            .storage
            .complete_multipart(&object, &upload_id, &completed_parts)
            .await?;

        debug!(
            bucket = %object.bucket(),
            key = %object.key(),
            %upload_id,
            parts = completed_parts.len(),
            version_id = ?output.version_id,
            "completed multipart upload"
        );

        Ok(Some(ObjectReference::new(object, output.version_id)))
    }
}
