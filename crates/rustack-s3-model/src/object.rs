//! Object identity types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The immutable identity of a target object: a bucket name and a key.
///
/// Equality is structural. Two locators built independently from the same
/// bucket and key compare equal.
///
/// # Examples
///
/// ```
/// use rustack_s3_model::ObjectLocator;
///
/// let a = ObjectLocator::new("photos", "2024/cat.jpg");
/// let b = ObjectLocator::new(String::from("photos"), String::from("2024/cat.jpg"));
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "photos/2024/cat.jpg");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectLocator {
    bucket: String,
    key: String,
}

impl ObjectLocator {
    /// Create a locator for `key` inside `bucket`.
    #[must_use]
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// The bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The object key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for ObjectLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// A reference to a stored object returned by a completed write.
///
/// When the storage service reports a version identifier the reference is
/// version-tagged; otherwise it points at the plain object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "type")]
pub enum ObjectReference {
    /// The latest (or only) version of an object.
    Object {
        /// The object that was written.
        object: ObjectLocator,
    },
    /// A specific version of an object.
    Version {
        /// The object that was written.
        object: ObjectLocator,
        /// The version identifier assigned by the storage service.
        version_id: String,
    },
}

impl ObjectReference {
    /// Build a reference, tagging it with `version_id` when one is present.
    #[must_use]
    pub fn new(object: ObjectLocator, version_id: Option<String>) -> Self {
        match version_id {
            Some(version_id) => Self::Version { object, version_id },
            None => Self::Object { object },
        }
    }

    /// The referenced object.
    #[must_use]
    pub fn object(&self) -> &ObjectLocator {
        match self {
            Self::Object { object } | Self::Version { object, .. } => object,
        }
    }

    /// The version identifier, if this reference is version-tagged.
    #[must_use]
    pub fn version_id(&self) -> Option<&str> {
        match self {
            Self::Object { .. } => None,
            Self::Version { version_id, .. } => Some(version_id),
        }
    }
}
