//! Object storage for question images.
//!
//! - [`store::ObjectStore`] is the seam between the service and a bucket.
//! - [`s3::S3ObjectStore`] talks to Amazon S3 or an S3-compatible server.
//! - [`memory::MemoryObjectStore`] keeps objects in process and records
//!   every call, for tests and local runs without a bucket.
//! - [`lifecycle::ImageLifecycle`] keeps a question's `image` reference and
//!   the bucket contents in step.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod s3;
pub mod store;

pub use config::StorageConfig;
pub use error::StorageError;
pub use lifecycle::{ImageAction, ImageChange, ImageLifecycle};
pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;
pub use store::{ImageUpload, ObjectStore};
