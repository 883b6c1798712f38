//! The upload splitter.
//!
//! [`ObjectClient::write`] stores a payload with one `put` when it is small
//! (or when asked to), and otherwise streams it through a multipart upload
//! in chunks of exactly `multipart_min_part_size` bytes, the last chunk
//! possibly shorter.

use std::path::PathBuf;

use bytes::Bytes;
use rustack_s3_model::{ObjectLocator, ObjectReference};
use tracing::debug;
use typed_builder::TypedBuilder;

use crate::client::ObjectClient;
use crate::error::ClientError;
use crate::multipart::PartWriter;
use crate::source::DataSource;
use crate::storage::ObjectOptions;

/// Options for [`ObjectClient::write`].
///
/// Unset sizes fall back to the client's [`ClientConfig`](crate::ClientConfig).
#[derive(Debug, Clone, Default, TypedBuilder)]
pub struct WriteOptions {
    /// Payload size above which a multipart upload is used.
    #[builder(default, setter(strip_option))]
    pub multipart_threshold: Option<u64>,
    /// Size of each multipart chunk.
    #[builder(default, setter(strip_option))]
    pub multipart_min_part_size: Option<u64>,
    /// Always upload with a single request, whatever the size.
    #[builder(default)]
    pub single_request: bool,
    /// Payload given as an option instead of the positional argument.
    #[builder(default, setter(strip_option, into))]
    pub data: Option<Bytes>,
    /// File to upload instead of the positional argument.
    #[builder(default, setter(strip_option, into))]
    pub file: Option<PathBuf>,
    /// Headers and metadata passed through to the service.
    #[builder(default)]
    pub object: ObjectOptions,
}

impl WriteOptions {
    /// Pick the payload from the positional argument and the options.
    ///
    /// The positional argument excludes `data` and `file`, and `data`
    /// excludes `file`. No payload at all means an empty object.
    fn take_source(&mut self, data: Option<DataSource>) -> Result<DataSource, ClientError> {
        if data.is_some() && self.file.is_some() {
            return Err(ClientError::Precondition(
                "payload given both as argument and as `file` option".to_owned(),
            ));
        }
        if data.is_some() && self.data.is_some() {
            return Err(ClientError::Precondition(
                "payload given both as argument and as `data` option".to_owned(),
            ));
        }
        if self.data.is_some() && self.file.is_some() {
            return Err(ClientError::Precondition(
                "`data` and `file` options are mutually exclusive".to_owned(),
            ));
        }

        let source = data
            .or_else(|| self.data.take().map(DataSource::InMemory))
            .or_else(|| self.file.take().map(DataSource::FilePath))
            .unwrap_or(DataSource::InMemory(Bytes::new()));
        Ok(source)
    }
}

impl ObjectClient {
    /// Store a payload under `object`.
    ///
    /// Returns the stored object's reference, tagged with its version when
    /// the service reports one. Returns `Ok(None)` only if a multipart
    /// payload turned out to be empty, in which case nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Precondition`] before any storage call when
    /// the payload is given more than once or the part size is zero, and
    /// otherwise any source or storage error.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use rustack_s3_client::memory::InMemoryStorage;
    /// use rustack_s3_client::{ClientConfig, ObjectClient, WriteOptions};
    /// use rustack_s3_model::ObjectLocator;
    ///
    /// # tokio_test::block_on(async {
    /// let storage = Arc::new(InMemoryStorage::new());
    /// let client = ObjectClient::new(storage.clone(), ClientConfig::default());
    /// let object = ObjectLocator::new("bucket", "greeting.txt");
    ///
    /// client
    ///     .write(&object, Some("hello".into()), WriteOptions::default())
    ///     .await
    ///     .unwrap();
    /// assert_eq!(storage.object_body(&object).unwrap().as_ref(), b"hello");
    /// # });
    /// ```
    pub async fn write(
        &self,
        object: &ObjectLocator,
        data: Option<DataSource>,
        mut options: WriteOptions,
    ) -> Result<Option<ObjectReference>, ClientError> {
        let source = options.take_source(data)?;
        let threshold = options
            .multipart_threshold
            .unwrap_or(self.config().multipart_threshold);
        let part_size = options
            .multipart_min_part_size
            .unwrap_or(self.config().multipart_min_part_size);
        let chunk_size = usize::try_from(part_size)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                ClientError::Precondition(format!("invalid multipart part size: {part_size}"))
            })?;

        let mut reader = source.open().await?;
        let size = reader.size();

        if options.single_request || size <= threshold {
            debug!(object = %object, size, "uploading in a single request");
            let body = reader.read_all().await?;
            let output = self.storage().put(object, body, &options.object).await?;
            return Ok(Some(ObjectReference::new(
                object.clone(),
                output.version_id,
            )));
        }

        debug!(object = %object, size, part_size, "uploading in parts");
        self.multipart()
            .run(
                object,
                &options.object,
                async move |parts: &mut PartWriter<'_>| {
                    loop {
                        let chunk = reader.read_chunk(chunk_size).await?;
                        if chunk.is_empty() {
                            return Ok(());
                        }
                        parts.add_part(chunk).await?;
                    }
                },
            )
            .await
    }
}
