//! Presigned and public object URLs.
//!
//! A presigned URL has the layout
//!
//! ```text
//! <scheme>://<host>[:port]/<path>?<response-overrides>
//!     &AWSAccessKeyId=<id>[&versionId=<v>]&Signature=<sig>&Expires=<secs>
//!     [&x-amz-security-token=<token>]
//! ```
//!
//! Query parameter order is fixed so that identical inputs (including the
//! supplied current time) always produce byte-identical URLs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rustack_s3_model::{Credentials, ObjectLocator};
use tracing::debug;
use typed_builder::TypedBuilder;

use crate::canonical::uri_encode;
use crate::endpoint::{EndpointResolver, ResolvedEndpoint};
use crate::error::PresignError;
use crate::expiration::{DEFAULT_EXPIRES_SECS, Expiration};
use crate::signer::{SECURITY_TOKEN_HEADER, SignedRequest, sign};
use crate::verb::SigningVerb;

/// Options recognized when building an object URL.
///
/// Every field is optional; unset fields fall back to the builder's
/// defaults.
#[derive(Debug, Clone, Default, TypedBuilder)]
pub struct UrlOptions {
    /// Use `https` (`true`) or `http` (`false`).
    #[builder(default, setter(strip_option))]
    pub secure: Option<bool>,
    /// When the URL expires.
    #[builder(default, setter(strip_option, into))]
    pub expires: Option<Expiration>,
    /// Override for the `Content-Type` response header.
    #[builder(default, setter(strip_option, into))]
    pub response_content_type: Option<String>,
    /// Override for the `Content-Language` response header.
    #[builder(default, setter(strip_option, into))]
    pub response_content_language: Option<String>,
    /// Override for the `Expires` response header.
    #[builder(default, setter(strip_option, into))]
    pub response_expires: Option<String>,
    /// Override for the `Cache-Control` response header.
    #[builder(default, setter(strip_option, into))]
    pub response_cache_control: Option<String>,
    /// Override for the `Content-Disposition` response header.
    #[builder(default, setter(strip_option, into))]
    pub response_content_disposition: Option<String>,
    /// Override for the `Content-Encoding` response header.
    #[builder(default, setter(strip_option, into))]
    pub response_content_encoding: Option<String>,
    /// Address a specific object version.
    #[builder(default, setter(strip_option, into))]
    pub version_id: Option<String>,
    /// Override the endpoint host.
    #[builder(default, setter(strip_option, into))]
    pub endpoint: Option<String>,
    /// Override the endpoint port.
    #[builder(default, setter(strip_option))]
    pub port: Option<u16>,
    /// Override path-style addressing.
    #[builder(default, setter(strip_option))]
    pub force_path_style: Option<bool>,
}

impl UrlOptions {
    /// The response-override query parameters that are set, sorted by name.
    #[must_use]
    pub fn response_overrides(&self) -> Vec<(&'static str, &str)> {
        let candidates = [
            ("response-cache-control", &self.response_cache_control),
            (
                "response-content-disposition",
                &self.response_content_disposition,
            ),
            ("response-content-encoding", &self.response_content_encoding),
            ("response-content-language", &self.response_content_language),
            ("response-content-type", &self.response_content_type),
            ("response-expires", &self.response_expires),
        ];

        candidates
            .into_iter()
            .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
            .collect()
    }
}

/// Builds presigned and public URLs for objects.
///
/// The builder holds no mutable state; building a URL is a pure function of
/// the object, verb, options, current time and credentials.
#[derive(Debug, Clone)]
pub struct PresignedUrlBuilder {
    credentials: Credentials,
    resolver: Arc<dyn EndpointResolver>,
    secure: bool,
    default_expires_secs: i64,
}

impl PresignedUrlBuilder {
    /// Create a builder that signs with `credentials` and resolves hosts
    /// through `resolver`. URLs default to `https` and a one-hour lifetime.
    #[must_use]
    pub fn new(credentials: Credentials, resolver: Arc<dyn EndpointResolver>) -> Self {
        Self {
            credentials,
            resolver,
            secure: true,
            default_expires_secs: DEFAULT_EXPIRES_SECS,
        }
    }

    /// Set the default scheme used when [`UrlOptions::secure`] is unset.
    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set the lifetime used when [`UrlOptions::expires`] is unset.
    #[must_use]
    pub fn with_default_expires_secs(mut self, secs: i64) -> Self {
        self.default_expires_secs = secs;
        self
    }

    /// The credentials URLs are signed with.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Build a presigned URL authorizing `verb` on `object` until the
    /// configured expiration.
    ///
    /// # Errors
    ///
    /// Returns [`PresignError::InvalidExpiration`] if the expiration cannot
    /// be normalized to Unix seconds.
    pub fn build(
        &self,
        object: &ObjectLocator,
        verb: SigningVerb,
        options: &UrlOptions,
        now: DateTime<Utc>,
    ) -> Result<String, PresignError> {
        let endpoint = self.resolver.resolve(object, options);
        let expiration = options
            .expires
            .clone()
            .unwrap_or(Expiration::In(self.default_expires_secs));

        let overrides = options.response_overrides();

        let mut request = SignedRequest::new(verb, endpoint.resource_path.clone(), expiration);
        for (name, value) in &overrides {
            request = request.with_query_param(*name, *value);
        }
        if let Some(version_id) = &options.version_id {
            request = request.with_query_param("versionId", version_id.clone());
        }

        let signed = sign(&request, now, &self.credentials)?;

        let mut query: Vec<String> = overrides
            .iter()
            .map(|(name, value)| format!("{name}={}", uri_encode(value)))
            .collect();
        query.push(format!(
            "AWSAccessKeyId={}",
            uri_encode(&self.credentials.access_key_id)
        ));
        if let Some(version_id) = &options.version_id {
            query.push(format!("versionId={}", uri_encode(version_id)));
        }
        query.push(format!("Signature={}", uri_encode(&signed.signature)));
        query.push(format!("Expires={}", signed.expires));
        if let Some(token) = &self.credentials.session_token {
            query.push(format!("{SECURITY_TOKEN_HEADER}={}", uri_encode(token)));
        }

        let url = format!("{}?{}", self.base_url(&endpoint, options), query.join("&"));

        debug!(
            bucket = %object.bucket(),
            key = %object.key(),
            verb = %verb,
            expires = signed.expires,
            "Built presigned URL"
        );

        Ok(url)
    }

    /// Build an unsigned URL for `object`.
    ///
    /// Only meaningful for publicly readable objects. Expiration, overrides
    /// and version options are ignored.
    #[must_use]
    pub fn public_url(&self, object: &ObjectLocator, options: &UrlOptions) -> String {
        let endpoint = self.resolver.resolve(object, options);
        self.base_url(&endpoint, options)
    }

    fn base_url(&self, endpoint: &ResolvedEndpoint, options: &UrlOptions) -> String {
        let secure = options.secure.unwrap_or(self.secure);
        let scheme = if secure { "https" } else { "http" };
        format!("{scheme}://{}{}", endpoint.authority(secure), endpoint.path)
    }
}
