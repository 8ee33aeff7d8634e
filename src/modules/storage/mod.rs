//! Storage module for uploaded documents
//!
//! Provides the `ObjectStore` abstraction and its MinIO/S3-compatible
//! implementation used for document blobs.

mod minio_client;
mod object_store;

pub use minio_client::MinIOClient;
pub use object_store::ObjectStore;
