use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StorageError;

/// An uploaded image as received from the client.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// File name as sent by the client, used to derive the object key.
    pub file_name: String,
    /// MIME type stored alongside the object.
    pub content_type: String,
    pub bytes: Bytes,
}

/// A bucket that can store and remove objects by key.
///
/// Implementations are bound to a single bucket; callers only deal in keys
/// and the fully-qualified locations the store hands back.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `body` under `key` and return the object's public location.
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<String, StorageError>;

    /// Remove the object under `key`. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Join a base URL and an object key into a location string.
///
/// Each `/`-separated segment of the key is percent-encoded, so keys
/// carrying spaces, `?` or `#` from the client's file name still form a
/// resolvable URL.
pub fn object_url(base_url: &str, key: &str) -> String {
    let path = key
        .trim_start_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/{path}", base_url.trim_end_matches('/'))
}
