//! HTTP verb normalization.
//!
//! Callers may name the operation a presigned URL authorizes either by its
//! HTTP method or by one of two semantic aliases: `read` (GET) and `write`
//! (PUT). Parsing is case-insensitive; the normalized form is always the
//! uppercase method token.

use std::fmt;
use std::str::FromStr;

use crate::error::PresignError;

/// The HTTP verb a signature authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningVerb {
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
    /// `POST`
    Post,
}

impl SigningVerb {
    /// Alias for reading an object.
    pub const READ: Self = Self::Get;

    /// Alias for writing an object.
    pub const WRITE: Self = Self::Put;

    /// The uppercase method token used in the string to sign.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for SigningVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SigningVerb {
    type Err = PresignError;

    /// Parse a verb token.
    ///
    /// # Examples
    ///
    /// ```
    /// use rustack_s3_presign::SigningVerb;
    ///
    /// assert_eq!("read".parse::<SigningVerb>().unwrap(), SigningVerb::Get);
    /// assert_eq!("Write".parse::<SigningVerb>().unwrap(), SigningVerb::Put);
    /// assert_eq!("delete".parse::<SigningVerb>().unwrap(), SigningVerb::Delete);
    /// assert!("patch".parse::<SigningVerb>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.eq_ignore_ascii_case("get") || token.eq_ignore_ascii_case("read") {
            Ok(Self::Get)
        } else if token.eq_ignore_ascii_case("put") || token.eq_ignore_ascii_case("write") {
            Ok(Self::Put)
        } else if token.eq_ignore_ascii_case("delete") {
            Ok(Self::Delete)
        } else if token.eq_ignore_ascii_case("head") {
            Ok(Self::Head)
        } else if token.eq_ignore_ascii_case("post") {
            Ok(Self::Post)
        } else {
            Err(PresignError::UnsupportedVerb(s.to_owned()))
        }
    }
}

impl TryFrom<&http::Method> for SigningVerb {
    type Error = PresignError;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

impl From<SigningVerb> for http::Method {
    fn from(verb: SigningVerb) -> Self {
        match verb {
            SigningVerb::Get => Self::GET,
            SigningVerb::Put => Self::PUT,
            SigningVerb::Delete => Self::DELETE,
            SigningVerb::Head => Self::HEAD,
            SigningVerb::Post => Self::POST,
        }
    }
}
