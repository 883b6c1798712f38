//! Expiration inputs for presigned URLs.
//!
//! The `Expires` field of the string to sign and of the final query string
//! is always an integer number of seconds since the Unix epoch. Callers may
//! express it as an absolute instant, as an offset from "now", or as a
//! timestamp literal; [`Expiration::resolve`] normalizes all three. The
//! current time is always passed in explicitly so signing stays a pure
//! function of its inputs.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::PresignError;

/// Default validity of a presigned URL when no expiration is given (one hour).
pub const DEFAULT_EXPIRES_SECS: i64 = 3600;

/// Layouts accepted for naive (zone-less) literals, interpreted as UTC.
const NAIVE_LAYOUTS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y%m%dT%H%M%SZ"];

/// When a presigned URL stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expiration {
    /// An absolute point in time.
    At(DateTime<Utc>),
    /// A number of seconds after the current time.
    In(i64),
    /// A timestamp literal: RFC 3339, RFC 2822, `YYYY-MM-DD HH:MM:SS` (UTC)
    /// or integer Unix seconds.
    Literal(String),
}

impl Default for Expiration {
    fn default() -> Self {
        Self::In(DEFAULT_EXPIRES_SECS)
    }
}

impl Expiration {
    /// Normalize to integer Unix seconds, relative to `now` when needed.
    ///
    /// # Errors
    ///
    /// Returns [`PresignError::InvalidExpiration`] if a literal cannot be
    /// parsed or a relative offset overflows.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use rustack_s3_presign::Expiration;
    ///
    /// let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    /// let at = Utc.with_ymd_and_hms(2026, 3, 1, 13, 0, 0).unwrap();
    ///
    /// assert_eq!(Expiration::At(at).resolve(now).unwrap(), at.timestamp());
    /// assert_eq!(Expiration::In(3600).resolve(now).unwrap(), at.timestamp());
    /// assert_eq!(
    ///     Expiration::Literal("2026-03-01T13:00:00Z".into()).resolve(now).unwrap(),
    ///     at.timestamp()
    /// );
    /// ```
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<i64, PresignError> {
        match self {
            Self::At(at) => Ok(at.timestamp()),
            Self::In(secs) => now.timestamp().checked_add(*secs).ok_or_else(|| {
                PresignError::InvalidExpiration(format!("offset of {secs} seconds overflows"))
            }),
            Self::Literal(literal) => parse_literal(literal),
        }
    }
}

impl From<DateTime<Utc>> for Expiration {
    fn from(at: DateTime<Utc>) -> Self {
        Self::At(at)
    }
}

impl From<i64> for Expiration {
    fn from(secs: i64) -> Self {
        Self::In(secs)
    }
}

impl From<std::time::Duration> for Expiration {
    fn from(duration: std::time::Duration) -> Self {
        Self::In(i64::try_from(duration.as_secs()).unwrap_or(i64::MAX))
    }
}

impl From<&str> for Expiration {
    fn from(literal: &str) -> Self {
        Self::Literal(literal.to_owned())
    }
}

impl From<String> for Expiration {
    fn from(literal: String) -> Self {
        Self::Literal(literal)
    }
}

fn parse_literal(literal: &str) -> Result<i64, PresignError> {
    let trimmed = literal.trim();

    if let Ok(secs) = trimmed.parse::<i64>() {
        return Ok(secs);
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(at.timestamp());
    }
    if let Ok(at) = DateTime::parse_from_rfc2822(trimmed) {
        return Ok(at.timestamp());
    }
    for layout in NAIVE_LAYOUTS {
        if let Ok(at) = NaiveDateTime::parse_from_str(trimmed, layout) {
            return Ok(at.and_utc().timestamp());
        }
    }

    Err(PresignError::InvalidExpiration(literal.to_owned()))
}
