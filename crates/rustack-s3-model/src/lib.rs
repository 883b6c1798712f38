//! Value types shared by the Rustack S3 client crates.
//!
//! These types carry no behavior beyond construction, accessors and
//! structural equality. They are used by both the presigned URL signer
//! (`rustack-s3-presign`) and the upload coordinator (`rustack-s3-client`).

mod credentials;
mod multipart;
mod object;

pub use credentials::Credentials;
pub use multipart::PartDescriptor;
pub use object::{ObjectLocator, ObjectReference};
