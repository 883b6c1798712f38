//! Client configuration.
//!
//! Provides [`ClientConfig`], the source of every default the client applies
//! when an operation's options leave a value unset. Values can be loaded
//! from environment variables.

use rustack_s3_model::Credentials;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Default object size above which `write` switches to a multipart upload (16 MiB).
pub const DEFAULT_MULTIPART_THRESHOLD: u64 = 16 * 1024 * 1024;

/// Default size of each multipart chunk (5 MiB, the smallest part S3 accepts).
pub const DEFAULT_MULTIPART_MIN_PART_SIZE: u64 = 5 * 1024 * 1024;

/// Default lifetime of presigned URLs, in seconds.
pub const DEFAULT_URL_EXPIRES_SECS: i64 = 3600;

/// Object client configuration.
///
/// # Examples
///
/// ```
/// use rustack_s3_client::config::ClientConfig;
///
/// let config = ClientConfig::default();
/// assert_eq!(config.s3_endpoint, "s3.amazonaws.com");
/// assert!(config.use_ssl);
/// assert_eq!(config.multipart_threshold, 16 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Service host objects are addressed under (e.g. `"s3.amazonaws.com"`).
    #[builder(default = String::from("s3.amazonaws.com"))]
    pub s3_endpoint: String,

    /// Explicit service port. `None` uses the scheme's default port.
    #[builder(default)]
    pub s3_port: Option<u16>,

    /// Whether URLs use `https`.
    #[builder(default = true)]
    pub use_ssl: bool,

    /// Always address buckets path style, even when the name is DNS compatible.
    #[builder(default = false)]
    pub s3_force_path_style: bool,

    /// Payload size (bytes) above which `write` uses a multipart upload.
    #[builder(default = DEFAULT_MULTIPART_THRESHOLD)]
    pub multipart_threshold: u64,

    /// Chunk size (bytes) used when splitting a multipart payload.
    #[builder(default = DEFAULT_MULTIPART_MIN_PART_SIZE)]
    pub multipart_min_part_size: u64,

    /// Lifetime of presigned URLs that do not set an expiration.
    #[builder(default = DEFAULT_URL_EXPIRES_SECS)]
    pub default_url_expires_secs: i64,

    /// Access key ID used to sign URLs.
    #[builder(default)]
    pub access_key_id: String,

    /// Secret access key used to sign URLs.
    #[builder(default)]
    #[serde(default, skip_serializing)]
    pub secret_access_key: String,

    /// Session token of temporary credentials.
    #[builder(default)]
    #[serde(default, skip_serializing)]
    pub session_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            s3_endpoint: String::from("s3.amazonaws.com"),
            s3_port: None,
            use_ssl: true,
            s3_force_path_style: false,
            multipart_threshold: DEFAULT_MULTIPART_THRESHOLD,
            multipart_min_part_size: DEFAULT_MULTIPART_MIN_PART_SIZE,
            default_url_expires_secs: DEFAULT_URL_EXPIRES_SECS,
            access_key_id: String::new(),
            secret_access_key: String::new(),
            session_token: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables (falling back to defaults):
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `S3_ENDPOINT` | `s3.amazonaws.com` |
    /// | `S3_PORT` | unset |
    /// | `S3_USE_SSL` | `true` |
    /// | `S3_FORCE_PATH_STYLE` | `false` |
    /// | `S3_MULTIPART_THRESHOLD` | `16777216` |
    /// | `S3_MULTIPART_MIN_PART_SIZE` | `5242880` |
    /// | `S3_URL_EXPIRES` | `3600` |
    /// | `AWS_ACCESS_KEY_ID` | empty |
    /// | `AWS_SECRET_ACCESS_KEY` | empty |
    /// | `AWS_SESSION_TOKEN` | unset |
    ///
    /// Values that fail to parse are ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("S3_ENDPOINT") {
            config.s3_endpoint = v;
        }
        if let Some(v) = lookup("S3_PORT") {
            if let Ok(port) = v.parse::<u16>() {
                config.s3_port = Some(port);
            }
        }
        if let Some(v) = lookup("S3_USE_SSL") {
            config.use_ssl = parse_bool(&v);
        }
        if let Some(v) = lookup("S3_FORCE_PATH_STYLE") {
            config.s3_force_path_style = parse_bool(&v);
        }
        if let Some(v) = lookup("S3_MULTIPART_THRESHOLD") {
            if let Ok(n) = v.parse::<u64>() {
                config.multipart_threshold = n;
            }
        }
        if let Some(v) = lookup("S3_MULTIPART_MIN_PART_SIZE") {
            if let Ok(n) = v.parse::<u64>() {
                config.multipart_min_part_size = n;
            }
        }
        if let Some(v) = lookup("S3_URL_EXPIRES") {
            if let Ok(n) = v.parse::<i64>() {
                config.default_url_expires_secs = n;
            }
        }
        if let Some(v) = lookup("AWS_ACCESS_KEY_ID") {
            config.access_key_id = v;
        }
        if let Some(v) = lookup("AWS_SECRET_ACCESS_KEY") {
            config.secret_access_key = v;
        }
        if let Some(v) = lookup("AWS_SESSION_TOKEN") {
            config.session_token = Some(v);
        }

        config
    }

    /// The static credentials URLs are signed with.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        let credentials = Credentials::new(&self.access_key_id, &self.secret_access_key);
        match &self.session_token {
            Some(token) => credentials.with_session_token(token),
            None => credentials,
        }
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
