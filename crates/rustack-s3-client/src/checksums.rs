//! Entity tag and `Content-MD5` digests.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use md5::Digest;

/// Compute the lowercase hex MD5 digest of `data`.
///
/// # Examples
///
/// ```
/// use rustack_s3_client::checksums::compute_md5;
///
/// assert_eq!(compute_md5(b"hello"), "5d41402abc4b2a76b9719d911017c592");
/// ```
#[must_use]
pub fn compute_md5(data: &[u8]) -> String {
    hex::encode(md5::Md5::digest(data))
}

/// Compute the quoted MD5 entity tag of a single-request object.
#[must_use]
pub fn compute_etag(data: &[u8]) -> String {
    format!("\"{}\"", compute_md5(data))
}

/// Compute the base64 MD5 digest carried in a `Content-MD5` header.
///
/// # Examples
///
/// ```
/// use rustack_s3_client::checksums::compute_content_md5;
///
/// assert_eq!(compute_content_md5(b""), "1B2M2Y8AsgTpgAmY7PhCfg==");
/// ```
#[must_use]
pub fn compute_content_md5(data: &[u8]) -> String {
    BASE64.encode(md5::Md5::digest(data))
}

/// Compute the composite entity tag of a multipart object.
///
/// This is the MD5 of the concatenated binary part digests, formatted as
/// `"<hex>-<part_count>"`. Part entity tags may be quoted.
#[must_use]
pub fn compute_multipart_etag(part_etags: &[impl AsRef<str>]) -> String {
    let mut combined = Vec::with_capacity(part_etags.len() * 16);
    for etag in part_etags {
        if let Ok(bytes) = hex::decode(etag.as_ref().trim_matches('"')) {
            combined.extend_from_slice(&bytes);
        }
    }
    format!(
        "\"{}-{}\"",
        hex::encode(md5::Md5::digest(&combined)),
        part_etags.len()
    )
}
