/// Failures reported by an [`ObjectStore`](crate::store::ObjectStore).
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The store was unreachable or rejected the write.
    #[error("Failed to upload object '{key}': {message}")]
    Write { key: String, message: String },

    /// The store was unreachable or rejected the delete.
    #[error("Failed to delete object '{key}': {message}")]
    Delete { key: String, message: String },
}

impl StorageError {
    /// Key of the object the failed operation targeted.
    pub fn key(&self) -> &str {
        match self {
            StorageError::Write { key, .. } | StorageError::Delete { key, .. } => key,
        }
    }
}
