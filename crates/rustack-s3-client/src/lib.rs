//! Object client for S3-compatible storage.
//!
//! The client sits between application code and a [`StorageClient`]
//! implementation. It adds:
//!
//! - an upload splitter ([`ObjectClient::write`]) that chooses between one
//!   `put` and a multipart upload,
//! - a multipart coordinator ([`MultipartCoordinator`]) that guarantees one
//!   complete or abort per initiated upload,
//! - presigned and public URLs via [`rustack_s3_presign`].
//!
//! # Modules
//!
//! - [`checksums`] - ETag and `Content-MD5` digests
//! - [`client`] - The [`ObjectClient`] facade
//! - [`config`] - Client configuration
//! - [`error`] - Error types
//! - [`memory`] - In-memory storage collaborator with call journal
//! - [`multipart`] - Multipart upload lifecycle
//! - [`source`] - Upload payload sources
//! - [`storage`] - The storage collaborator trait and its types
//! - [`writer`] - Upload splitting

pub mod checksums;
pub mod client;
pub mod config;
pub mod error;
pub mod memory;
pub mod multipart;
pub mod source;
pub mod storage;
pub mod writer;

pub use client::ObjectClient;
pub use config::ClientConfig;
pub use error::ClientError;
pub use multipart::{MultipartCoordinator, MultipartSession, PartWriter};
pub use source::DataSource;
pub use storage::{
    CopyOptions, GetOutput, HeadOutput, MetadataDirective, ObjectOptions, PutOutput,
    StorageClient,
};
pub use writer::WriteOptions;
