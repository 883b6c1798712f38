//! Host and path resolution for object URLs.
//!
//! A bucket whose name is a valid DNS label sequence is addressed
//! virtual-hosted style (`bucket.endpoint/key`); any other bucket is
//! addressed path style (`endpoint/bucket/key`).

use std::fmt::Debug;

use rustack_s3_model::ObjectLocator;

use crate::canonical::{escape_path, uri_encode};
use crate::url::UrlOptions;

/// Maximum length of a DNS-compatible bucket name.
const MAX_DNS_BUCKET_NAME_LEN: usize = 63;

/// Minimum length of a DNS-compatible bucket name.
const MIN_DNS_BUCKET_NAME_LEN: usize = 3;

/// Where a request for an object is sent, and what resource it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    /// Host name, without port.
    pub host: String,
    /// Explicit port, if any.
    pub port: Option<u16>,
    /// Escaped request path, starting with `/`.
    pub path: String,
    /// The resource path used for signing. For virtual-hosted requests this
    /// is the request path prefixed with `/bucket`.
    pub resource_path: String,
    /// Whether the bucket is carried in the path rather than the host.
    pub path_style: bool,
}

impl ResolvedEndpoint {
    /// The `host[:port]` authority, omitting the port when it is the
    /// scheme's default.
    #[must_use]
    pub fn authority(&self, secure: bool) -> String {
        let default_port = if secure { 443 } else { 80 };
        match self.port {
            Some(port) if port != default_port => format!("{}:{port}", self.host),
            _ => self.host.clone(),
        }
    }
}

/// Resolves the host and path a request for an object is sent to.
pub trait EndpointResolver: Send + Sync + Debug {
    /// Resolve the endpoint for `object`, honoring any endpoint overrides in
    /// `options`.
    fn resolve(&self, object: &ObjectLocator, options: &UrlOptions) -> ResolvedEndpoint;
}

/// The standard S3 resolver: virtual-hosted style for DNS-compatible bucket
/// names, path style otherwise or when forced.
///
/// # Examples
///
/// ```
/// use rustack_s3_model::ObjectLocator;
/// use rustack_s3_presign::{EndpointResolver, UrlOptions, VirtualHostResolver};
///
/// let resolver = VirtualHostResolver::new("s3.amazonaws.com");
/// let options = UrlOptions::default();
///
/// let vhost = resolver.resolve(&ObjectLocator::new("foobucket", "a b"), &options);
/// assert_eq!(vhost.host, "foobucket.s3.amazonaws.com");
/// assert_eq!(vhost.path, "/a%20b");
/// assert_eq!(vhost.resource_path, "/foobucket/a%20b");
///
/// let path = resolver.resolve(&ObjectLocator::new("foo..bar", "k"), &options);
/// assert_eq!(path.host, "s3.amazonaws.com");
/// assert_eq!(path.path, "/foo..bar/k");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualHostResolver {
    endpoint: String,
    port: Option<u16>,
    force_path_style: bool,
}

impl VirtualHostResolver {
    /// Create a resolver for the given endpoint host.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            port: None,
            force_path_style: false,
        }
    }

    /// Use an explicit port.
    #[must_use]
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Always address buckets path style.
    #[must_use]
    pub fn with_force_path_style(mut self, force_path_style: bool) -> Self {
        self.force_path_style = force_path_style;
        self
    }

    /// The endpoint host.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl EndpointResolver for VirtualHostResolver {
    fn resolve(&self, object: &ObjectLocator, options: &UrlOptions) -> ResolvedEndpoint {
        let endpoint = options.endpoint.as_deref().unwrap_or(&self.endpoint);
        let port = options.port.or(self.port);
        let force_path_style = options.force_path_style.unwrap_or(self.force_path_style);

        let bucket = object.bucket();
        let key = escape_path(object.key());
        let path_style = force_path_style || !is_dns_compatible_bucket_name(bucket);

        if path_style {
            let path = format!("/{}/{key}", uri_encode(bucket));
            ResolvedEndpoint {
                host: endpoint.to_owned(),
                port,
                resource_path: path.clone(),
                path,
                path_style,
            }
        } else {
            let path = format!("/{key}");
            ResolvedEndpoint {
                host: format!("{bucket}.{endpoint}"),
                port,
                resource_path: format!("/{bucket}{path}"),
                path,
                path_style,
            }
        }
    }
}

/// Returns `true` if `name` can be used as a DNS host label prefix.
///
/// Rules:
/// - 3-63 characters long
/// - Only lowercase letters, numbers, hyphens, and dots
/// - Must start and end with a letter or number
/// - No consecutive dots (`..`) and no dash next to a dot (`-.`, `.-`)
/// - Not formatted like an IPv4 address (e.g. `192.168.5.4`)
///
/// # Examples
///
/// ```
/// use rustack_s3_presign::is_dns_compatible_bucket_name;
///
/// assert!(is_dns_compatible_bucket_name("foobucket"));
/// assert!(is_dns_compatible_bucket_name("my.bucket-01"));
/// assert!(!is_dns_compatible_bucket_name("foo..bar"));
/// assert!(!is_dns_compatible_bucket_name("MyBucket"));
/// assert!(!is_dns_compatible_bucket_name("192.168.5.4"));
/// ```
#[must_use]
pub fn is_dns_compatible_bucket_name(name: &str) -> bool {
    let len = name.len();

    if !(MIN_DNS_BUCKET_NAME_LEN..=MAX_DNS_BUCKET_NAME_LEN).contains(&len) {
        return false;
    }

    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.')
    {
        return false;
    }

    let first = name.as_bytes()[0];
    let last = name.as_bytes()[len - 1];
    if !(first.is_ascii_lowercase() || first.is_ascii_digit())
        || !(last.is_ascii_lowercase() || last.is_ascii_digit())
    {
        return false;
    }

    if name.contains("..") || name.contains("-.") || name.contains(".-") {
        return false;
    }

    !looks_like_ipv4(name)
}

/// Matches four dot-separated digit groups anywhere in the name.
fn looks_like_ipv4(name: &str) -> bool {
    let labels: Vec<&str> = name.split('.').collect();
    labels.windows(4).any(|window| {
        window[0].ends_with(|c: char| c.is_ascii_digit())
            && window[1..3]
                .iter()
                .all(|label| !label.is_empty() && label.bytes().all(|b| b.is_ascii_digit()))
            && window[3].starts_with(|c: char| c.is_ascii_digit())
    })
}
