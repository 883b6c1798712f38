//! In-memory storage collaborator.
//!
//! [`InMemoryStorage`] implements [`StorageClient`] over [`DashMap`]s, with
//! optional versioning. Every call is appended to a journal before it runs,
//! and any operation can be made to fail, which makes it the test double for
//! the upload and multipart flows.

use std::collections::BTreeMap;

use anyhow::anyhow;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use rustack_s3_model::{ObjectLocator, PartDescriptor};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::checksums;
use crate::error::ClientError;
use crate::storage::{
    CopyOptions, GetOutput, HeadOutput, MetadataDirective, ObjectOptions, PutOutput,
    StorageClient,
};

/// A [`StorageClient`] operation, used to select injected faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageOperation {
    /// [`StorageClient::head`].
    Head,
    /// [`StorageClient::get`].
    Get,
    /// [`StorageClient::put`].
    Put,
    /// [`StorageClient::delete`].
    Delete,
    /// [`StorageClient::copy`].
    Copy,
    /// [`StorageClient::initiate_multipart`].
    InitiateMultipart,
    /// [`StorageClient::upload_part`].
    UploadPart,
    /// [`StorageClient::complete_multipart`].
    CompleteMultipart,
    /// [`StorageClient::abort_multipart`].
    AbortMultipart,
}

/// A recorded call, with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    /// A `head` call.
    Head {
        /// Target object.
        object: ObjectLocator,
        /// Requested version.
        version_id: Option<String>,
    },
    /// A `get` call.
    Get {
        /// Target object.
        object: ObjectLocator,
        /// Requested version.
        version_id: Option<String>,
    },
    /// A `put` call.
    Put {
        /// Target object.
        object: ObjectLocator,
        /// Uploaded body.
        body: Bytes,
        /// Passthrough options.
        options: ObjectOptions,
    },
    /// A `delete` call.
    Delete {
        /// Target object.
        object: ObjectLocator,
        /// Requested version.
        version_id: Option<String>,
    },
    /// A `copy` call.
    Copy {
        /// Destination object.
        object: ObjectLocator,
        /// Source object.
        source: ObjectLocator,
        /// Copy options.
        options: CopyOptions,
    },
    /// An `initiate_multipart` call.
    InitiateMultipart {
        /// Target object.
        object: ObjectLocator,
        /// Passthrough options.
        options: ObjectOptions,
    },
    /// An `upload_part` call.
    UploadPart {
        /// Target object.
        object: ObjectLocator,
        /// Upload the part belongs to.
        upload_id: String,
        /// Part number.
        part_number: u32,
        /// Part body.
        body: Bytes,
    },
    /// A `complete_multipart` call.
    CompleteMultipart {
        /// Target object.
        object: ObjectLocator,
        /// Upload being completed.
        upload_id: String,
        /// Parts listed in the request.
        parts: Vec<PartDescriptor>,
    },
    /// An `abort_multipart` call.
    AbortMultipart {
        /// Target object.
        object: ObjectLocator,
        /// Upload being aborted.
        upload_id: String,
    },
}

impl StorageCall {
    /// The operation this call invoked.
    #[must_use]
    pub fn operation(&self) -> StorageOperation {
        match self {
            Self::Head { .. } => StorageOperation::Head,
            Self::Get { .. } => StorageOperation::Get,
            Self::Put { .. } => StorageOperation::Put,
            Self::Delete { .. } => StorageOperation::Delete,
            Self::Copy { .. } => StorageOperation::Copy,
            Self::InitiateMultipart { .. } => StorageOperation::InitiateMultipart,
            Self::UploadPart { .. } => StorageOperation::UploadPart,
            Self::CompleteMultipart { .. } => StorageOperation::CompleteMultipart,
            Self::AbortMultipart { .. } => StorageOperation::AbortMultipart,
        }
    }
}

#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    etag: String,
    options: ObjectOptions,
    last_modified: DateTime<Utc>,
    version_id: Option<String>,
}

impl StoredObject {
    fn head(&self) -> HeadOutput {
        HeadOutput {
            etag: self.etag.clone(),
            content_length: self.body.len() as u64,
            content_type: self.options.content_type.clone(),
            content_encoding: self.options.content_encoding.clone(),
            content_disposition: self.options.content_disposition.clone(),
            cache_control: self.options.cache_control.clone(),
            last_modified: self.last_modified,
            version_id: self.version_id.clone(),
            storage_class: self.options.storage_class.clone(),
            metadata: self.options.metadata.clone(),
        }
    }
}

#[derive(Debug)]
struct PendingUpload {
    object: ObjectLocator,
    options: ObjectOptions,
    parts: BTreeMap<u32, (String, Bytes)>,
}

/// In-memory S3 collaborator with a call journal and fault injection.
///
/// Thread-safe: objects and uploads live in [`DashMap`]s and the journal
/// behind a [`Mutex`].
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use rustack_s3_client::memory::InMemoryStorage;
/// use rustack_s3_client::storage::{ObjectOptions, StorageClient};
/// use rustack_s3_model::ObjectLocator;
///
/// # tokio_test::block_on(async {
/// let storage = InMemoryStorage::new();
/// let object = ObjectLocator::new("my-bucket", "hello.txt");
/// storage
///     .put(&object, Bytes::from("hello"), &ObjectOptions::default())
///     .await
///     .unwrap();
///
/// let output = storage.get(&object, None).await.unwrap();
/// assert_eq!(output.body.as_ref(), b"hello");
/// assert_eq!(storage.calls().len(), 2);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    /// Object versions keyed by locator, oldest first.
    objects: DashMap<ObjectLocator, Vec<StoredObject>>,
    /// In-progress multipart uploads keyed by upload ID.
    uploads: DashMap<String, PendingUpload>,
    versioning: bool,
    journal: Mutex<Vec<StorageCall>>,
    faults: DashMap<StorageOperation, String>,
}

impl InMemoryStorage {
    /// Create an empty, unversioned store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep every version of an object and return version IDs.
    #[must_use]
    pub fn with_versioning(mut self, versioning: bool) -> Self {
        self.versioning = versioning;
        self
    }

    /// Make every subsequent `operation` fail with an upstream error
    /// carrying `message`.
    pub fn inject_fault(&self, operation: StorageOperation, message: impl Into<String>) {
        self.faults.insert(operation, message.into());
    }

    /// Remove a previously injected fault.
    pub fn clear_fault(&self, operation: StorageOperation) {
        self.faults.remove(&operation);
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<StorageCall> {
        self.journal.lock().clone()
    }

    /// The operations invoked so far, in order.
    #[must_use]
    pub fn operations(&self) -> Vec<StorageOperation> {
        self.journal.lock().iter().map(StorageCall::operation).collect()
    }

    /// Forget all recorded calls.
    pub fn clear_calls(&self) {
        self.journal.lock().clear();
    }

    /// The latest body stored under `object`.
    #[must_use]
    pub fn object_body(&self, object: &ObjectLocator) -> Option<Bytes> {
        self.objects
            .get(object)
            .and_then(|versions| versions.last().map(|v| v.body.clone()))
    }

    /// Number of versions stored under `object`.
    #[must_use]
    pub fn version_count(&self, object: &ObjectLocator) -> usize {
        self.objects.get(object).map_or(0, |versions| versions.len())
    }

    /// Number of multipart uploads neither completed nor aborted.
    #[must_use]
    pub fn pending_uploads(&self) -> usize {
        self.uploads.len()
    }

    /// Remove every object, upload, fault and recorded call.
    pub fn reset(&self) {
        debug!("resetting in-memory storage");
        self.objects.clear();
        self.uploads.clear();
        self.faults.clear();
        self.journal.lock().clear();
    }

    /// Record `call`, then fail if a fault is injected for its operation.
    fn record(&self, call: StorageCall) -> Result<(), ClientError> {
        let operation = call.operation();
        trace!(?operation, "recording storage call");
        self.journal.lock().push(call);

        if let Some(message) = self.faults.get(&operation).map(|m| m.value().clone()) {
            debug!(?operation, %message, "injected storage fault");
            return Err(ClientError::upstream(anyhow!(message)));
        }
        Ok(())
    }

    fn store(
        &self,
        object: &ObjectLocator,
        body: Bytes,
        etag: String,
        options: ObjectOptions,
    ) -> PutOutput {
        let version_id = self.versioning.then(|| Uuid::new_v4().simple().to_string());

        let stored = StoredObject {
            body,
            etag: etag.clone(),
            options,
            last_modified: Utc::now(),
            version_id: version_id.clone(),
        };

        let mut versions = self.objects.entry(object.clone()).or_default();
        if !self.versioning {
            versions.clear();
        }
        versions.push(stored);

        PutOutput {
            etag: Some(etag),
            version_id,
        }
    }

    fn find(
        &self,
        object: &ObjectLocator,
        version_id: Option<&str>,
    ) -> Result<StoredObject, ClientError> {
        let not_found = || ClientError::NotFound {
            bucket: object.bucket().to_owned(),
            key: object.key().to_owned(),
        };

        let versions = self.objects.get(object).ok_or_else(not_found)?;
        let found = match version_id {
            Some(id) => versions
                .iter()
                .find(|v| v.version_id.as_deref() == Some(id)),
            None => versions.last(),
        };
        found.cloned().ok_or_else(not_found)
    }
}

#[async_trait]
impl StorageClient for InMemoryStorage {
    async fn head(
        &self,
        object: &ObjectLocator,
        version_id: Option<&str>,
    ) -> Result<HeadOutput, ClientError> {
        self.record(StorageCall::Head {
            object: object.clone(),
            version_id: version_id.map(ToOwned::to_owned),
        })?;
        Ok(self.find(object, version_id)?.head())
    }

    async fn get(
        &self,
        object: &ObjectLocator,
        version_id: Option<&str>,
    ) -> Result<GetOutput, ClientError> {
        self.record(StorageCall::Get {
            object: object.clone(),
            version_id: version_id.map(ToOwned::to_owned),
        })?;
        let stored = self.find(object, version_id)?;
        Ok(GetOutput {
            head: stored.head(),
            body: stored.body,
        })
    }

    async fn put(
        &self,
        object: &ObjectLocator,
        body: Bytes,
        options: &ObjectOptions,
    ) -> Result<PutOutput, ClientError> {
        self.record(StorageCall::Put {
            object: object.clone(),
            body: body.clone(),
            options: options.clone(),
        })?;

        if let Some(expected) = &options.content_md5 {
            let actual = checksums::compute_content_md5(&body);
            if *expected != actual {
                return Err(ClientError::upstream(anyhow!(
                    "BadDigest: Content-MD5 {expected} does not match body digest {actual}"
                )));
            }
        }

        let etag = checksums::compute_etag(&body);
        let size = body.len();
        let output = self.store(object, body, etag, options.clone());
        debug!(bucket = %object.bucket(), key = %object.key(), size, "stored object");
        Ok(output)
    }

    async fn delete(
        &self,
        object: &ObjectLocator,
        version_id: Option<&str>,
    ) -> Result<(), ClientError> {
        self.record(StorageCall::Delete {
            object: object.clone(),
            version_id: version_id.map(ToOwned::to_owned),
        })?;

        match version_id {
            Some(id) => {
                if let Some(mut versions) = self.objects.get_mut(object) {
                    versions.retain(|v| v.version_id.as_deref() != Some(id));
                }
                self.objects.remove_if(object, |_, versions| versions.is_empty());
            }
            None => {
                self.objects.remove(object);
            }
        }

        trace!(bucket = %object.bucket(), key = %object.key(), "deleted object");
        Ok(())
    }

    async fn copy(
        &self,
        object: &ObjectLocator,
        source: &ObjectLocator,
        options: &CopyOptions,
    ) -> Result<PutOutput, ClientError> {
        self.record(StorageCall::Copy {
            object: object.clone(),
            source: source.clone(),
            options: options.clone(),
        })?;

        let stored = self.find(source, options.source_version_id.as_deref())?;
        let object_options = match options.metadata_directive {
            MetadataDirective::Copy => with_copy_overrides(stored.options, &options.object),
            MetadataDirective::Replace => options.object.clone(),
        };

        debug!(
            src = %source,
            dst = %object,
            directive = options.metadata_directive.as_str(),
            "copying object"
        );
        Ok(self.store(object, stored.body, stored.etag, object_options))
    }

    async fn initiate_multipart(
        &self,
        object: &ObjectLocator,
        options: &ObjectOptions,
    ) -> Result<String, ClientError> {
        self.record(StorageCall::InitiateMultipart {
            object: object.clone(),
            options: options.clone(),
        })?;

        let upload_id = Uuid::new_v4().simple().to_string();
        self.uploads.insert(
            upload_id.clone(),
            PendingUpload {
                object: object.clone(),
                options: options.clone(),
                parts: BTreeMap::new(),
            },
        );

        debug!(bucket = %object.bucket(), key = %object.key(), %upload_id, "initiated multipart upload");
        Ok(upload_id)
    }

    async fn upload_part(
        &self,
        object: &ObjectLocator,
        upload_id: &str,
        part_number: u32,
        body: Bytes,
    ) -> Result<String, ClientError> {
        self.record(StorageCall::UploadPart {
            object: object.clone(),
            upload_id: upload_id.to_owned(),
            part_number,
            body: body.clone(),
        })?;

        let mut upload = self
            .uploads
            .get_mut(upload_id)
            .filter(|upload| upload.object == *object)
            .ok_or_else(|| no_such_upload(upload_id))?;

        let etag = checksums::compute_etag(&body);
        trace!(upload_id, part_number, size = body.len(), "stored part");
        upload.parts.insert(part_number, (etag.clone(), body));
        Ok(etag)
    }

    async fn complete_multipart(
        &self,
        object: &ObjectLocator,
        upload_id: &str,
        parts: &[PartDescriptor],
    ) -> Result<PutOutput, ClientError> {
        self.record(StorageCall::CompleteMultipart {
            object: object.clone(),
            upload_id: upload_id.to_owned(),
            parts: parts.to_vec(),
        })?;

        if parts.is_empty() {
            return Err(ClientError::upstream(anyhow!(
                "MalformedXML: a multipart upload needs at least one part"
            )));
        }
        if parts.windows(2).any(|w| w[0].part_number >= w[1].part_number) {
            return Err(ClientError::upstream(anyhow!(
                "InvalidPartOrder: parts must be listed in ascending order"
            )));
        }

        let (_, upload) = self
            .uploads
            .remove_if(upload_id, |_, upload| upload.object == *object)
            .ok_or_else(|| no_such_upload(upload_id))?;

        let mut combined = BytesMut::new();
        for part in parts {
            match upload.parts.get(&part.part_number) {
                Some((etag, body)) if *etag == part.etag => combined.extend_from_slice(body),
                _ => {
                    // The upload stays open, as it would on the service.
                    let part_number = part.part_number;
                    self.uploads.insert(upload_id.to_owned(), upload);
                    return Err(ClientError::upstream(anyhow!(
                        "InvalidPart: part {part_number} was not uploaded or its etag does not match"
                    )));
                }
            }
        }

        let etags: Vec<&str> = parts.iter().map(|p| p.etag.as_str()).collect();
        let etag = checksums::compute_multipart_etag(&etags);
        let size = combined.len();
        let output = self.store(object, combined.freeze(), etag, upload.options);

        debug!(
            bucket = %object.bucket(),
            key = %object.key(),
            upload_id,
            size,
            parts = parts.len(),
            "completed multipart upload"
        );
        Ok(output)
    }

    async fn abort_multipart(
        &self,
        object: &ObjectLocator,
        upload_id: &str,
    ) -> Result<(), ClientError> {
        self.record(StorageCall::AbortMultipart {
            object: object.clone(),
            upload_id: upload_id.to_owned(),
        })?;

        self.uploads
            .remove_if(upload_id, |_, upload| upload.object == *object)
            .ok_or_else(|| no_such_upload(upload_id))?;

        debug!(bucket = %object.bucket(), key = %object.key(), upload_id, "aborted multipart upload");
        Ok(())
    }
}

/// Apply the copy request settings S3 honours even under the `COPY`
/// directive: storage class, ACL and server-side encryption.
fn with_copy_overrides(mut stored: ObjectOptions, requested: &ObjectOptions) -> ObjectOptions {
    if let Some(storage_class) = &requested.storage_class {
        stored.storage_class = Some(storage_class.clone());
    }
    if let Some(acl) = &requested.acl {
        stored.acl = Some(acl.clone());
    }
    if let Some(sse) = &requested.server_side_encryption {
        stored.server_side_encryption = Some(sse.clone());
    }
    stored
}

fn no_such_upload(upload_id: &str) -> ClientError {
    ClientError::upstream(anyhow!(
        "NoSuchUpload: the specified multipart upload does not exist: {upload_id}"
    ))
}
