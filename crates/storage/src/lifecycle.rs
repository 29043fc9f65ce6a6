//! Keeps a question's `image` reference and the bucket in step.
//!
//! Per question the image column moves through two states:
//!
//! ```text
//! NoImage --upload--> HasImage(r)
//! HasImage(r1) --replace--> HasImage(r2)      r1 deleted
//! HasImage(r) --clear / delete record--> NoImage   r deleted
//! ```
//!
//! Uploads happen before the database write so a failed upload never
//! leaves a reference to a missing object. Deleting the superseded object
//! is best-effort: it runs on a detached task and a failure only leaves an
//! orphaned object behind, which is logged.

use std::sync::Arc;

use satprep_core::image_key::{generate_object_key, object_key_from_reference};
use tokio_util::task::TaskTracker;

use crate::error::StorageError;
use crate::store::{ImageUpload, ObjectStore};

/// What a write wants to do with a question's image.
#[derive(Debug, Clone)]
pub enum ImageAction {
    /// Leave the current image as it is.
    Keep,
    /// Upload a new file and make it the question's image.
    Replace(ImageUpload),
    /// Remove the current image.
    Clear,
}

impl ImageAction {
    /// Whether applying this action to a question whose image is `current`
    /// leaves the image as it is.
    pub fn is_noop_for(&self, current: Option<&str>) -> bool {
        matches!((self, current), (ImageAction::Keep, _) | (ImageAction::Clear, None))
    }
}

/// The storage side of an image transition, staged before the database write.
///
/// Pass it to [`ImageLifecycle::commit`] once the new reference is
/// persisted, or to [`ImageLifecycle::rollback`] if the write failed.
#[derive(Debug, Default)]
#[must_use = "a staged image change must be committed or rolled back"]
pub struct ImageChange {
    changed: bool,
    image: Option<String>,
    superseded: Option<String>,
}

impl ImageChange {
    /// Whether the `image` column must be rewritten.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// The reference to persist when [`is_changed`](Self::is_changed).
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Record `current` as the reference this change replaces.
    ///
    /// Unchanged images supersede nothing.
    pub fn superseding(mut self, current: Option<&str>) -> Self {
        if self.changed {
            self.superseded = current.map(str::to_string);
        }
        self
    }
}

/// Uploads, replaces and deletes question images.
pub struct ImageLifecycle {
    store: Arc<dyn ObjectStore>,
    key_prefix: String,
    cleanup: TaskTracker,
}

impl ImageLifecycle {
    pub fn new(store: Arc<dyn ObjectStore>, key_prefix: impl Into<String>) -> Self {
        Self {
            store,
            key_prefix: key_prefix.into(),
            cleanup: TaskTracker::new(),
        }
    }

    /// Object key a file with this name would be stored under.
    pub fn generate_object_key(&self, original_file_name: &str) -> String {
        generate_object_key(&self.key_prefix, original_file_name)
    }

    /// Store a new image and return its location.
    pub async fn upload_image(&self, upload: &ImageUpload) -> Result<String, StorageError> {
        let key = self.generate_object_key(&upload.file_name);
        let location = self
            .store
            .put(&key, upload.bytes.clone(), &upload.content_type)
            .await?;

        tracing::info!(
            key = %key,
            size = upload.bytes.len(),
            content_type = %upload.content_type,
            "Uploaded question image"
        );
        Ok(location)
    }

    /// Upload `upload` and schedule removal of `existing`.
    ///
    /// For callers with nothing to persist in between. Handlers that write
    /// the reference to the database use [`prepare`](Self::prepare) and
    /// [`commit`](Self::commit) so the old object outlives a failed write.
    pub async fn replace_image(
        &self,
        existing: Option<&str>,
        upload: ImageUpload,
    ) -> Result<String, StorageError> {
        let change = self.prepare(existing, ImageAction::Replace(upload)).await?;
        let location = change.image.clone().unwrap_or_default();
        self.commit(change);
        Ok(location)
    }

    /// Delete the object behind `reference` and wait for the outcome.
    pub async fn delete_image(&self, reference: Option<&str>) -> Result<(), StorageError> {
        let Some(key) = reference.and_then(|r| self.key_for(r)) else {
            return Ok(());
        };
        self.store.delete(&key).await?;
        tracing::info!(key = %key, "Deleted question image");
        Ok(())
    }

    /// Stage an image transition for a question whose image is `current`.
    ///
    /// Uploads happen here; nothing is deleted until the change is
    /// committed. A failed upload returns the error and leaves storage and
    /// `current` untouched.
    pub async fn prepare(
        &self,
        current: Option<&str>,
        action: ImageAction,
    ) -> Result<ImageChange, StorageError> {
        if action.is_noop_for(current) {
            return Ok(ImageChange::default());
        }
        Ok(self.stage(action).await?.superseding(current))
    }

    /// Stage an image transition before the current image is known.
    ///
    /// Performs the upload for [`ImageAction::Replace`]. The caller reads
    /// the current reference later, typically under a row lock, and passes
    /// it to [`ImageChange::superseding`] before committing.
    pub async fn stage(&self, action: ImageAction) -> Result<ImageChange, StorageError> {
        match action {
            ImageAction::Keep => Ok(ImageChange::default()),
            ImageAction::Clear => Ok(ImageChange {
                changed: true,
                image: None,
                superseded: None,
            }),
            ImageAction::Replace(upload) => {
                let location = self.upload_image(&upload).await?;
                Ok(ImageChange {
                    changed: true,
                    image: Some(location),
                    superseded: None,
                })
            }
        }
    }

    /// The new reference is persisted: drop the superseded object.
    pub fn commit(&self, change: ImageChange) {
        self.discard(change.superseded);
    }

    /// The database write failed: drop the object uploaded for it.
    pub fn rollback(&self, change: ImageChange) {
        if change.changed {
            self.discard(change.image);
        }
    }

    /// Delete the object behind `reference` on a detached task.
    ///
    /// Failures are logged as orphaned objects and never reach the caller.
    pub fn discard(&self, reference: Option<String>) {
        let Some(reference) = reference else {
            return;
        };
        let Some(key) = self.key_for(&reference) else {
            return;
        };

        let store = Arc::clone(&self.store);
        self.cleanup.spawn(async move {
            match store.delete(&key).await {
                Ok(()) => tracing::info!(key = %key, "Deleted superseded question image"),
                Err(e) => tracing::warn!(
                    key = %key,
                    reference = %reference,
                    error = %e,
                    "Failed to delete superseded question image, object is orphaned"
                ),
            }
        });
    }

    /// Wait until every detached cleanup task spawned so far has finished.
    pub async fn wait_for_cleanup(&self) {
        self.cleanup.close();
        self.cleanup.wait().await;
        self.cleanup.reopen();
    }

    /// Number of cleanup tasks still running.
    pub fn pending_cleanups(&self) -> usize {
        self.cleanup.len()
    }

    fn key_for(&self, reference: &str) -> Option<String> {
        let key = object_key_from_reference(&self.key_prefix, reference);
        if key.is_none() {
            tracing::warn!(reference = %reference, "Image reference has no object name, skipping delete");
        }
        key
    }
}
