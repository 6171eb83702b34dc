//! Tubely Storage Library
//!
//! Remote object storage for ingested videos. The `Storage` trait hides
//! whether objects land in S3 (or an S3-compatible store) or on the local
//! filesystem, and also produces the locator clients use to fetch them.
//!
//! # Key format
//!
//! Every key is `{namespace}/{name}` where the namespace is the aspect class
//! (`landscape`, `portrait` or `other`) and the name is 32 random bytes in
//! URL-safe base64 followed by `.mp4`. See the `keys` module.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::RemoteKey;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use tubely_core::{LocatorStrategy, StorageBackend};
pub use traits::{Storage, StorageError, StorageResult};
