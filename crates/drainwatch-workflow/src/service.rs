use drainwatch_core::config::WorkflowConfig;
use drainwatch_core::error::{DrainError, Result};
use drainwatch_core::models::Actor;
use drainwatch_core::ports::{FileStore, Notifier, Upload};
use drainwatch_store::ports::{Store, UnitOfWork};
use std::sync::Arc;

/// Report workflow, reconciliation engine and queries over one storage backend
#[derive(Clone)]
pub struct DrainageService {
    pub(crate) store: Arc<dyn Store>,
    pub(crate) files: Arc<dyn FileStore>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) config: WorkflowConfig,
}

impl DrainageService {
    pub fn new(
        store: Arc<dyn Store>,
        files: Arc<dyn FileStore>,
        notifier: Arc<dyn Notifier>,
        config: WorkflowConfig,
    ) -> Self {
        Self { store, files, notifier, config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Public URL of a stored attachment
    pub fn attachment_url(&self, path: &str) -> String {
        self.files.public_url(path)
    }

    pub(crate) fn require_staff(&self, actor: &Actor, action: impl Into<String>) -> Result<()> {
        if actor.is_staff() {
            Ok(())
        } else {
            Err(DrainError::unauthorized(action))
        }
    }

    /// Check an upload against the configured extension and size limits
    pub(crate) fn validate_attachment(&self, field: &str, upload: &Upload) -> Result<()> {
        let extension = upload.normalized_extension();
        if !self.config.attachment_extensions.iter().any(|allowed| *allowed == extension) {
            return Err(DrainError::validation(
                field,
                format!(
                    "file type '{}' is not allowed, expected one of {}",
                    extension,
                    self.config.attachment_extensions.join(", ")
                ),
            ));
        }
        if upload.size_kb() > self.config.attachment_max_kb {
            return Err(DrainError::validation(
                field,
                format!(
                    "file is {} KB, the limit is {} KB",
                    upload.size_kb(),
                    self.config.attachment_max_kb
                ),
            ));
        }
        Ok(())
    }

    /// Remove a stored file after its owning change failed or was undone
    pub(crate) async fn discard_attachment(&self, path: &str) {
        if let Err(e) = self.files.delete(path).await {
            tracing::warn!(path, error = %e, "Failed to delete attachment");
        }
    }
}

/// Commit on success, roll back on failure
pub(crate) async fn finish<T>(tx: Box<dyn UnitOfWork>, outcome: Result<T>) -> Result<T> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}
