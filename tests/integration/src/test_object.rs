//! Single-request object operations through the client facade.

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rustack_s3_client::memory::StorageOperation;
    use rustack_s3_client::{ClientError, CopyOptions, MetadataDirective, ObjectOptions, WriteOptions};
    use rustack_s3_model::ObjectLocator;

    use crate::{test_client, test_object};

    #[tokio::test]
    async fn test_should_report_existence_across_write_and_delete() {
        let (_, client) = test_client();
        let object = test_object("obj-exists");

        assert!(!client.exists(&object).await.expect("exists"));
        client
            .write(&object, Some("here".into()), WriteOptions::default())
            .await
            .expect("write should succeed");
        assert!(client.exists(&object).await.expect("exists"));

        client.delete(&object, None).await.expect("delete should succeed");
        assert!(!client.exists(&object).await.expect("exists"));
    }

    #[tokio::test]
    async fn test_should_return_not_found_for_missing_object() {
        let (_, client) = test_client();
        let object = test_object("obj-missing");

        let err = client
            .read(&object, None)
            .await
            .expect_err("missing object should fail");
        assert!(err.is_not_found());
        assert!(err.to_string().contains(object.key()));
    }

    #[tokio::test]
    async fn test_should_surface_access_errors_from_exists() {
        let (storage, client) = test_client();
        storage.inject_fault(StorageOperation::Head, "AccessDenied");

        let result = client.exists(&test_object("obj-denied")).await;
        assert!(matches!(result, Err(ClientError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_should_copy_specific_source_version() {
        let (_, client) = test_client();
        let source = test_object("obj-copy-src");
        let target = test_object("obj-copy-dst");

        let old = client
            .write(&source, Some("old".into()), WriteOptions::default())
            .await
            .expect("first write")
            .expect("reference");
        client
            .write(&source, Some("new".into()), WriteOptions::default())
            .await
            .expect("second write");

        let options = CopyOptions::builder()
            .source_version_id(old.version_id().expect("versioned write"))
            .build();
        let copied = client
            .copy_from(&target, &source, &options)
            .await
            .expect("copy should succeed");

        assert_eq!(copied.object(), &target);
        assert_eq!(
            client.read(&target, None).await.expect("read copy").as_ref(),
            b"old"
        );
    }

    #[tokio::test]
    async fn test_should_replace_metadata_on_copy() {
        let (_, client) = test_client();
        let source = test_object("obj-meta-src");
        let target = test_object("obj-meta-dst");
        let write = WriteOptions::builder()
            .object(
                ObjectOptions::builder()
                    .metadata(BTreeMap::from([("stage".to_owned(), "draft".to_owned())]))
                    .build(),
            )
            .build();
        client
            .write(&source, Some("doc".into()), write)
            .await
            .expect("write should succeed");

        let options = CopyOptions::builder()
            .metadata_directive(MetadataDirective::Replace)
            .object(
                ObjectOptions::builder()
                    .metadata(BTreeMap::from([("stage".to_owned(), "final".to_owned())]))
                    .build(),
            )
            .build();
        client
            .copy_from(&target, &source, &options)
            .await
            .expect("copy should succeed");

        let head = client.head(&target, None).await.expect("head");
        assert_eq!(head.metadata["stage"], "final");
        let head = client.head(&source, None).await.expect("head");
        assert_eq!(head.metadata["stage"], "draft");
    }

    #[tokio::test]
    async fn test_should_change_storage_class_in_place() {
        let (storage, client) = test_client();
        let object = test_object("obj-class");
        let write = WriteOptions::builder()
            .object(ObjectOptions::builder().content_type("image/png").build())
            .build();
        client
            .write(&object, Some("png".into()), write)
            .await
            .expect("write should succeed");

        let reference = client
            .set_storage_class(&object, "GLACIER")
            .await
            .expect("storage class change should succeed");

        let head = client.head(&object, None).await.expect("head");
        assert_eq!(head.storage_class.as_deref(), Some("GLACIER"));
        assert_eq!(head.content_type.as_deref(), Some("image/png"));
        assert_eq!(head.version_id.as_deref(), reference.version_id());
        assert_eq!(storage.version_count(&object), 2);
    }

    #[tokio::test]
    async fn test_should_keep_content_encoding_across_storage_class_change() {
        let (_, client) = test_client();
        let object = test_object("obj-gzip");
        let write = WriteOptions::builder()
            .object(
                ObjectOptions::builder()
                    .content_type("application/javascript")
                    .content_encoding("gzip")
                    .cache_control("public, max-age=86400")
                    .content_disposition("inline")
                    .acl("public-read")
                    .build(),
            )
            .build();
        client
            .write(&object, Some("gz".into()), write)
            .await
            .expect("write should succeed");

        client
            .set_storage_class(&object, "STANDARD_IA")
            .await
            .expect("storage class change should succeed");

        let head = client.head(&object, None).await.expect("head");
        assert_eq!(head.storage_class.as_deref(), Some("STANDARD_IA"));
        assert_eq!(head.content_encoding.as_deref(), Some("gzip"));
        assert_eq!(head.cache_control.as_deref(), Some("public, max-age=86400"));
        assert_eq!(head.content_disposition.as_deref(), Some("inline"));
        assert_eq!(head.content_type.as_deref(), Some("application/javascript"));
        assert_eq!(
            client.read(&object, None).await.expect("read").as_ref(),
            b"gz"
        );
    }

    #[tokio::test]
    async fn test_should_fail_storage_class_change_for_missing_object() {
        let (storage, client) = test_client();
        let object = ObjectLocator::new("test-obj-class", "absent.bin");

        let result = client.set_storage_class(&object, "GLACIER").await;

        assert!(matches!(result, Err(ClientError::NotFound { .. })));
        assert_eq!(storage.operations(), vec![StorageOperation::Copy]);
    }
}
