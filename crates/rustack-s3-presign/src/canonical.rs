//! Canonical forms used in the Signature Version 2 string to sign.
//!
//! ```text
//! HTTP-Verb + "\n" +
//! Content-MD5 + "\n" +
//! Content-Type + "\n" +
//! Expires + "\n" +
//! CanonicalizedAmzHeaders +
//! CanonicalizedResource
//! ```
//!
//! Each component is normalized so that the signer and any verifier agree
//! byte-for-byte on what was signed.

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// The set of characters that must be percent-encoded in path segments and
/// query values.
///
/// Everything except the RFC 3986 unreserved characters
/// (A-Z, a-z, 0-9, `-`, `_`, `.`, `~`) is encoded.
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Query parameters that override response headers on a GET.
///
/// These are signed as part of the canonicalized resource and also appear
/// literally in the presigned URL.
pub const RESPONSE_OVERRIDE_PARAMS: &[&str] = &[
    "response-cache-control",
    "response-content-disposition",
    "response-content-encoding",
    "response-content-language",
    "response-content-type",
    "response-expires",
];

/// Sub-resource parameters (beyond the response overrides) that take part in
/// the canonicalized resource.
const SUB_RESOURCES: &[&str] = &["versionId"];

/// Returns `true` if a query parameter with this name is included in the
/// canonicalized resource.
///
/// # Examples
///
/// ```
/// use rustack_s3_presign::canonical::is_signed_query_param;
///
/// assert!(is_signed_query_param("response-content-type"));
/// assert!(is_signed_query_param("versionId"));
/// assert!(!is_signed_query_param("AWSAccessKeyId"));
/// ```
#[must_use]
pub fn is_signed_query_param(name: &str) -> bool {
    RESPONSE_OVERRIDE_PARAMS.contains(&name) || SUB_RESOURCES.contains(&name)
}

/// Build the full string to sign from its normalized components.
///
/// `amz_headers` is the output of [`build_canonicalized_amz_headers`]; every
/// line it contains is already newline-terminated, so the string to sign
/// never ends with a newline.
///
/// # Examples
///
/// ```
/// use rustack_s3_presign::canonical::build_string_to_sign;
///
/// let s = build_string_to_sign("GET", "", "", 1_175_139_620, "", "/johnsmith/photos/puppy.jpg");
/// assert_eq!(s, "GET\n\n\n1175139620\n/johnsmith/photos/puppy.jpg");
/// ```
#[must_use]
pub fn build_string_to_sign(
    verb: &str,
    content_md5: &str,
    content_type: &str,
    expires: i64,
    amz_headers: &str,
    resource: &str,
) -> String {
    format!("{verb}\n{content_md5}\n{content_type}\n{expires}\n{amz_headers}{resource}")
}

/// Build the CanonicalizedAmzHeaders string.
///
/// All `x-amz-*` headers are lowercased and sorted by name. Values are
/// trimmed, internal runs of whitespace are collapsed to one space, and
/// repeated headers are folded into one comma-separated line. Each header is
/// formatted as `name:value\n`. Headers without the `x-amz-` prefix are
/// ignored.
///
/// # Examples
///
/// ```
/// use rustack_s3_presign::canonical::build_canonicalized_amz_headers;
///
/// let headers = [
///     ("X-Amz-Meta-Reviewer", "joe"),
///     ("Content-Type", "image/jpeg"),
///     ("x-amz-meta-reviewer", "jane"),
///     ("x-amz-acl", "public-read"),
/// ];
/// assert_eq!(
///     build_canonicalized_amz_headers(headers),
///     "x-amz-acl:public-read\nx-amz-meta-reviewer:joe,jane\n"
/// );
/// ```
#[must_use]
pub fn build_canonicalized_amz_headers<'a>(
    headers: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> String {
    let mut amz_headers: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (name, value) in headers {
        let name = name.to_ascii_lowercase();
        if name.starts_with("x-amz-") {
            amz_headers
                .entry(name)
                .or_default()
                .push(collapse_whitespace(value.trim()));
        }
    }

    let mut result = String::new();
    for (name, values) in &amz_headers {
        result.push_str(name);
        result.push(':');
        result.push_str(&values.join(","));
        result.push('\n');
    }

    result
}

/// Build the CanonicalizedResource string.
///
/// This is the resource path plus any signed query parameters (see
/// [`is_signed_query_param`]), sorted by name and appended as
/// `?name=value&name=value`. Values are used verbatim (not percent-encoded);
/// an empty value contributes the bare parameter name.
///
/// # Examples
///
/// ```
/// use rustack_s3_presign::canonical::build_canonicalized_resource;
///
/// let params = vec![
///     ("response-content-type".to_owned(), "text/plain".to_owned()),
///     ("foo".to_owned(), "ignored".to_owned()),
///     ("response-cache-control".to_owned(), "no-cache".to_owned()),
/// ];
/// assert_eq!(
///     build_canonicalized_resource("/bucket/key", &params),
///     "/bucket/key?response-cache-control=no-cache&response-content-type=text/plain"
/// );
/// ```
#[must_use]
pub fn build_canonicalized_resource(path: &str, query_params: &[(String, String)]) -> String {
    let mut signed: Vec<(&str, &str)> = query_params
        .iter()
        .filter(|(name, _)| is_signed_query_param(name))
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();

    if signed.is_empty() {
        return path.to_owned();
    }

    signed.sort_unstable();

    let params_str: Vec<String> = signed
        .iter()
        .map(|(name, value)| {
            if value.is_empty() {
                (*name).to_owned()
            } else {
                format!("{name}={value}")
            }
        })
        .collect();

    format!("{path}?{}", params_str.join("&"))
}

/// Percent-encode an object key for use in a URL path.
///
/// Each `/`-separated segment is encoded individually so slashes survive.
///
/// # Examples
///
/// ```
/// use rustack_s3_presign::canonical::escape_path;
///
/// assert_eq!(escape_path("photos/my cat.jpg"), "photos/my%20cat.jpg");
/// assert_eq!(escape_path("100%+done"), "100%25%2Bdone");
/// ```
#[must_use]
pub fn escape_path(path: &str) -> String {
    path.split('/')
        .map(uri_encode)
        .collect::<Vec<_>>()
        .join("/")
}

/// Percent-encode a query parameter name or value.
#[must_use]
pub fn uri_encode(input: &str) -> String {
    utf8_percent_encode(input, URI_ENCODE_SET).to_string()
}

/// Collapse consecutive whitespace characters in a string to a single space.
fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            result.push(ch);
            prev_was_space = false;
        }
    }
    result
}
