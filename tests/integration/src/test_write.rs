//! Upload splitting, end to end.

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use bytes::Bytes;
    use rustack_s3_client::checksums::{compute_content_md5, compute_etag, compute_multipart_etag};
    use rustack_s3_client::memory::{StorageCall, StorageOperation};
    use rustack_s3_client::{ClientError, DataSource, ObjectOptions, WriteOptions};

    use crate::{test_client, test_object};

    #[tokio::test]
    async fn test_should_write_large_payload_and_read_it_back() {
        let (storage, client) = test_client();
        let object = test_object("write-large");

        let reference = client
            .write(&object, Some("the quick brown fox".into()), WriteOptions::default())
            .await
            .expect("write should succeed")
            .expect("payload is not empty");

        assert_eq!(reference.object(), &object);
        assert!(reference.version_id().is_some());
        assert_eq!(storage.operations(), vec![
            StorageOperation::InitiateMultipart,
            StorageOperation::UploadPart,
            StorageOperation::UploadPart,
            StorageOperation::UploadPart,
            StorageOperation::UploadPart,
            StorageOperation::UploadPart,
            StorageOperation::CompleteMultipart,
        ]);

        let body = client
            .read(&object, reference.version_id())
            .await
            .expect("read should succeed");
        assert_eq!(body.as_ref(), b"the quick brown fox");
    }

    #[tokio::test]
    async fn test_should_report_multipart_etag_for_split_upload() {
        let (_, client) = test_client();
        let object = test_object("write-etag");

        client
            .write(&object, Some("0123456789".into()), WriteOptions::default())
            .await
            .expect("write should succeed");

        let expected = compute_multipart_etag(&[
            compute_etag(b"0123"),
            compute_etag(b"4567"),
            compute_etag(b"89"),
        ]);
        let head = client.head(&object, None).await.expect("head should succeed");
        assert_eq!(head.etag, expected);
        assert!(head.etag.ends_with("-3\""));
        assert_eq!(head.content_length, 10);
    }

    #[tokio::test]
    async fn test_should_write_positional_file_source() {
        let (storage, client) = test_client();
        let object = test_object("write-file");
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"file-backed payload").expect("write temp file");
        file.flush().expect("flush temp file");

        client
            .write(
                &object,
                Some(DataSource::from(file.path().to_path_buf())),
                WriteOptions::default(),
            )
            .await
            .expect("write should succeed");

        assert_eq!(
            storage.object_body(&object).expect("object stored").as_ref(),
            b"file-backed payload"
        );
    }

    #[tokio::test]
    async fn test_should_write_stream_from_its_current_position() {
        let (storage, client) = test_client();
        let object = test_object("write-stream");
        let mut cursor = Cursor::new(b"header:0123456789".to_vec());
        cursor.set_position(7);

        client
            .write(&object, Some(DataSource::stream(cursor)), WriteOptions::default())
            .await
            .expect("write should succeed");

        let parts: Vec<Bytes> = storage
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                StorageCall::UploadPart { body, .. } => Some(body),
                _ => None,
            })
            .collect();
        assert_eq!(parts, vec![
            Bytes::from("0123"),
            Bytes::from("4567"),
            Bytes::from("89")
        ]);
        assert_eq!(
            storage.object_body(&object).expect("object stored").as_ref(),
            b"0123456789"
        );
    }

    #[tokio::test]
    async fn test_should_keep_every_version_of_rewritten_object() {
        let (storage, client) = test_client();
        let object = test_object("write-versions");

        let first = client
            .write(&object, Some("first".into()), WriteOptions::default())
            .await
            .expect("first write")
            .expect("reference");
        let second = client
            .write(&object, Some("second, and longer".into()), WriteOptions::default())
            .await
            .expect("second write")
            .expect("reference");

        assert_ne!(first.version_id(), second.version_id());
        assert_eq!(storage.version_count(&object), 2);
        assert_eq!(
            client
                .read(&object, first.version_id())
                .await
                .expect("read old version")
                .as_ref(),
            b"first"
        );
        assert_eq!(
            client.read(&object, None).await.expect("read latest").as_ref(),
            b"second, and longer"
        );
    }

    #[tokio::test]
    async fn test_should_verify_content_md5_on_single_put() {
        let (_, client) = test_client();
        let object = test_object("write-md5");

        let good = WriteOptions::builder()
            .object(
                ObjectOptions::builder()
                    .content_md5(compute_content_md5(b"small"))
                    .build(),
            )
            .build();
        client
            .write(&object, Some("small".into()), good)
            .await
            .expect("matching digest should be accepted");

        let bad = WriteOptions::builder()
            .object(
                ObjectOptions::builder()
                    .content_md5(compute_content_md5(b"other"))
                    .build(),
            )
            .build();
        let result = client.write(&object, Some("small".into()), bad).await;
        assert!(matches!(result, Err(ClientError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_should_store_nothing_when_completion_fails() {
        let (storage, client) = test_client();
        let object = test_object("write-fault");
        storage.inject_fault(StorageOperation::CompleteMultipart, "InternalError");

        let result = client
            .write(&object, Some("0123456789".into()), WriteOptions::default())
            .await;

        assert!(matches!(result, Err(ClientError::Upstream(_))));
        assert!(!client.exists(&object).await.expect("exists"));

        storage.clear_fault(StorageOperation::CompleteMultipart);
        client
            .write(&object, Some("0123456789".into()), WriteOptions::default())
            .await
            .expect("retry should succeed");
        assert!(client.exists(&object).await.expect("exists"));
    }
}
