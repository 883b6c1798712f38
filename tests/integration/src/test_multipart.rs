//! Caller-driven multipart uploads.

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use rustack_s3_client::memory::{StorageCall, StorageOperation};
    use rustack_s3_client::{ClientError, ObjectOptions, PartWriter};

    use crate::{test_client, test_object};

    #[tokio::test]
    async fn test_should_complete_upload_from_producer_parts() {
        let (storage, client) = test_client();
        let object = test_object("mp-complete");

        let reference = client
            .multipart_upload(&object, &ObjectOptions::default(), async |parts: &mut PartWriter<'_>| {
                for chunk in ["alpha-", "beta-", "gamma"] {
                    parts.add_part(chunk).await?;
                }
                Ok(())
            })
            .await
            .expect("upload should succeed")
            .expect("parts were produced");

        assert!(reference.version_id().is_some());
        assert_eq!(
            storage.object_body(&object).expect("object stored").as_ref(),
            b"alpha-beta-gamma"
        );

        let completed = storage.calls().into_iter().find_map(|call| match call {
            StorageCall::CompleteMultipart { parts, .. } => Some(parts),
            _ => None,
        });
        let numbers: Vec<u32> = completed
            .expect("complete was called")
            .iter()
            .map(|p| p.part_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_should_expose_session_to_producer() {
        let (_, client) = test_client();
        let object = test_object("mp-session");
        let expected = object.clone();

        client
            .multipart_upload(&object, &ObjectOptions::default(), async move |parts: &mut PartWriter<'_>| {
                assert_eq!(parts.session().object(), &expected);
                assert!(!parts.session().upload_id().is_empty());

                let first = parts.add_part("one").await?;
                assert_eq!(first.part_number, 1);
                assert_eq!(parts.parts().len(), 1);
                assert_eq!(parts.session().completed_parts(), parts.parts());
                Ok(())
            })
            .await
            .expect("upload should succeed");
    }

    #[tokio::test]
    async fn test_should_abort_and_store_nothing_without_parts() {
        let (storage, client) = test_client();
        let object = test_object("mp-empty");

        let reference = client
            .multipart_upload(&object, &ObjectOptions::default(), async |_: &mut PartWriter<'_>| Ok(()))
            .await
            .expect("empty upload is not an error");

        assert!(reference.is_none());
        assert_eq!(storage.operations().last(), Some(&StorageOperation::AbortMultipart));
        assert_eq!(storage.pending_uploads(), 0);
        assert!(!client.exists(&object).await.expect("exists"));
    }

    #[tokio::test]
    async fn test_should_abort_and_reraise_producer_error() {
        let (storage, client) = test_client();
        let object = test_object("mp-producer-error");

        let result = client
            .multipart_upload(&object, &ObjectOptions::default(), async |parts: &mut PartWriter<'_>| {
                parts.add_part("partial").await?;
                Err(ClientError::production(anyhow!("source went away")))
            })
            .await;

        let err = result.expect_err("producer error should surface");
        assert!(matches!(err, ClientError::Production(_)));
        assert!(err.to_string().contains("source went away"));
        assert_eq!(storage.operations(), vec![
            StorageOperation::InitiateMultipart,
            StorageOperation::UploadPart,
            StorageOperation::AbortMultipart,
        ]);
        assert_eq!(storage.pending_uploads(), 0);
        assert!(!client.exists(&object).await.expect("exists"));
    }

    #[tokio::test]
    async fn test_should_surface_producer_error_when_abort_fails() {
        let (storage, client) = test_client();
        let object = test_object("mp-abort-fails");
        storage.inject_fault(StorageOperation::AbortMultipart, "ServiceUnavailable");

        let result = client
            .multipart_upload(&object, &ObjectOptions::default(), async |_: &mut PartWriter<'_>| {
                Err(ClientError::production(anyhow!("boom")))
            })
            .await;

        assert!(matches!(result, Err(ClientError::Production(_))));
    }

    #[tokio::test]
    async fn test_should_not_abort_when_initiation_fails() {
        let (storage, client) = test_client();
        let object = test_object("mp-initiate-fails");
        storage.inject_fault(StorageOperation::InitiateMultipart, "AccessDenied");
        let mut produced = false;

        let result = client
            .multipart_upload(&object, &ObjectOptions::default(), async |_: &mut PartWriter<'_>| {
                produced = true;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(ClientError::Upstream(_))));
        assert!(!produced);
        assert_eq!(storage.operations(), vec![StorageOperation::InitiateMultipart]);
    }

    #[tokio::test]
    async fn test_should_carry_options_into_completed_object() {
        let (_, client) = test_client();
        let object = test_object("mp-options");
        let options = ObjectOptions::builder()
            .content_type("application/octet-stream")
            .storage_class("STANDARD_IA")
            .build();

        client
            .multipart_upload(&object, &options, async |parts: &mut PartWriter<'_>| {
                parts.add_part("body").await?;
                Ok(())
            })
            .await
            .expect("upload should succeed");

        let head = client.head(&object, None).await.expect("head should succeed");
        assert_eq!(head.content_type.as_deref(), Some("application/octet-stream"));
        assert_eq!(head.storage_class.as_deref(), Some("STANDARD_IA"));
    }
}
