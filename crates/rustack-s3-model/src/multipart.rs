//! Multipart upload value types.

use serde::{Deserialize, Serialize};

/// A part that the storage service has accepted for a multipart upload.
///
/// Part numbers start at 1 and are contiguous within an upload. The entity
/// tag is the opaque token returned by the service for the part body and is
/// echoed back when the upload is completed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartDescriptor {
    /// The part number (1-based).
    pub part_number: u32,
    /// The entity tag returned for this part.
    pub etag: String,
}

impl PartDescriptor {
    /// Create a new part descriptor.
    #[must_use]
    pub fn new(part_number: u32, etag: impl Into<String>) -> Self {
        Self {
            part_number,
            etag: etag.into(),
        }
    }
}
