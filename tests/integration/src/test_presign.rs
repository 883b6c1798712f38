//! Presigned URLs built by the client and checked by the verifier.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rustack_s3_client::ObjectClient;
    use rustack_s3_client::memory::InMemoryStorage;
    use rustack_s3_model::{Credentials, ObjectLocator};
    use rustack_s3_presign::{
        Expiration, PresignError, SigningVerb, StaticCredentialProvider, UrlOptions,
        verify_presigned_url,
    };

    use crate::{TEST_ACCESS_KEY_ID, TEST_SECRET_ACCESS_KEY, test_client, test_config};

    fn frozen_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 8, 30, 0).unwrap()
    }

    fn provider() -> StaticCredentialProvider {
        StaticCredentialProvider::from(&Credentials::new(
            TEST_ACCESS_KEY_ID,
            TEST_SECRET_ACCESS_KEY,
        ))
    }

    #[test]
    fn test_should_verify_url_built_by_client() {
        let (_, client) = test_client();
        let object = ObjectLocator::new("reports", "2026/q3 summary.pdf");
        let options = UrlOptions::builder()
            .response_content_disposition("attachment; filename=\"q3.pdf\"")
            .response_content_type("application/pdf")
            .build();

        let url = client
            .presigned_url(&object, SigningVerb::Get, &options, frozen_now())
            .expect("url should build");
        assert!(url.starts_with("https://reports.s3.amazonaws.com/2026/q3%20summary.pdf?"));

        let verified = verify_presigned_url(
            SigningVerb::Get,
            &url,
            "s3.amazonaws.com",
            &provider(),
            frozen_now(),
        )
        .expect("url should verify");
        assert_eq!(verified.access_key_id, TEST_ACCESS_KEY_ID);
        assert_eq!(verified.expires, frozen_now().timestamp() + 3600);
    }

    #[test]
    fn test_should_bind_url_to_its_verb() {
        let (_, client) = test_client();
        let object = ObjectLocator::new("uploads", "incoming.bin");

        let url = client
            .presigned_url(&object, SigningVerb::WRITE, &UrlOptions::default(), frozen_now())
            .expect("url should build");

        let result = verify_presigned_url(
            SigningVerb::READ,
            &url,
            "s3.amazonaws.com",
            &provider(),
            frozen_now(),
        );
        assert!(matches!(result, Err(PresignError::SignatureDoesNotMatch)));
    }

    #[test]
    fn test_should_reject_url_after_expiry() {
        let (_, client) = test_client();
        let object = ObjectLocator::new("reports", "daily.csv");
        let options = UrlOptions::builder().expires(Expiration::In(60)).build();

        let url = client
            .presigned_url(&object, SigningVerb::Get, &options, frozen_now())
            .expect("url should build");

        let later = frozen_now() + Duration::seconds(61);
        let result = verify_presigned_url(
            SigningVerb::Get,
            &url,
            "s3.amazonaws.com",
            &provider(),
            later,
        );
        assert!(matches!(result, Err(PresignError::RequestExpired)));
    }

    #[test]
    fn test_should_sign_identically_for_every_expiration_form() {
        let (_, client) = test_client();
        let object = ObjectLocator::new("reports", "daily.csv");
        let at = frozen_now() + Duration::seconds(900);

        let urls: Vec<String> = [
            Expiration::In(900),
            Expiration::At(at),
            Expiration::Literal(at.to_rfc3339()),
            Expiration::Literal(at.timestamp().to_string()),
        ]
        .into_iter()
        .map(|expires| {
            let options = UrlOptions::builder().expires(expires).build();
            client
                .presigned_url(&object, SigningVerb::Get, &options, frozen_now())
                .expect("url should build")
        })
        .collect();

        assert!(urls.iter().all(|url| url == &urls[0]));
        assert!(urls[0].ends_with(&format!("&Expires={}", at.timestamp())));
    }

    #[test]
    fn test_should_verify_path_style_url_with_session_token() {
        let mut config = test_config();
        config.s3_endpoint = "localhost".to_owned();
        config.s3_port = Some(4566);
        config.use_ssl = false;
        config.session_token = Some("FQoGZXIvYXdzEXAMPLE".to_owned());
        let client = ObjectClient::new(Arc::new(InMemoryStorage::new()), config);
        let object = ObjectLocator::new("my.dotted.bucket", "a/b.txt");
        let options = UrlOptions::builder()
            .force_path_style(true)
            .version_id("3HL4kqtJlcpXroDTDmJ")
            .build();

        let url = client
            .presigned_url(&object, SigningVerb::Get, &options, frozen_now())
            .expect("url should build");
        assert!(url.starts_with("http://localhost:4566/my.dotted.bucket/a/b.txt?"));
        assert!(url.contains("&versionId=3HL4kqtJlcpXroDTDmJ&"));
        assert!(url.ends_with("&x-amz-security-token=FQoGZXIvYXdzEXAMPLE"));

        verify_presigned_url(SigningVerb::Get, &url, "localhost", &provider(), frozen_now())
            .expect("url should verify");
    }

    #[test]
    fn test_should_build_public_urls_without_signature() {
        let (_, client) = test_client();

        assert_eq!(
            client.public_url(&ObjectLocator::new("foobucket", "foo"), &UrlOptions::default()),
            "https://foobucket.s3.amazonaws.com/foo"
        );
        assert_eq!(
            client.public_url(&ObjectLocator::new("foo..bar", "foo"), &UrlOptions::default()),
            "https://s3.amazonaws.com/foo..bar/foo"
        );
        assert_eq!(
            client.public_url(
                &ObjectLocator::new("foobucket", "foo"),
                &UrlOptions::builder().secure(false).build()
            ),
            "http://foobucket.s3.amazonaws.com/foo"
        );
    }

    #[test]
    fn test_should_fail_to_sign_unparseable_expiration() {
        let (_, client) = test_client();
        let options = UrlOptions::builder()
            .expires(Expiration::Literal("next tuesday".to_owned()))
            .build();

        let result = client.url_for(
            &ObjectLocator::new("reports", "daily.csv"),
            SigningVerb::Get,
            &options,
        );
        assert!(result.is_err());
    }
}
