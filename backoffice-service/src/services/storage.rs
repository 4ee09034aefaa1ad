//! Attachment storage boundary.
//!
//! Invoices and quotes carry attachment locators, never bytes. The
//! backend behind this trait owns the bytes; local disk is the only
//! implementation shipped here.

use async_trait::async_trait;
use service_core::error::AppError;
use std::path::PathBuf;
use tracing::{info, instrument};
use uuid::Uuid;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Store the bytes and return an opaque locator for them.
    async fn upload(&self, filename: &str, data: &[u8]) -> Result<String, AppError>;

    /// Resolve a locator to a URL a client can fetch.
    fn download_url(&self, locator: &str) -> String;

    async fn delete(&self, locator: &str) -> Result<(), AppError>;
}

/// Local filesystem storage. Locators are relative paths under
/// `base_path`, prefixed with a UUID so filenames never collide.
pub struct LocalStorage {
    base_path: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            public_base_url: public_base_url.into(),
        }
    }

    fn resolve(&self, locator: &str) -> Result<PathBuf, AppError> {
        // Locators are generated by upload; reject anything that walks
        // out of the base directory.
        if locator.contains("..") || locator.starts_with('/') {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Invalid attachment locator: {}",
                locator
            )));
        }
        Ok(self.base_path.join(locator))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn upload(&self, filename: &str, data: &[u8]) -> Result<String, AppError> {
        let safe_name: String = filename
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let locator = format!("{}_{}", Uuid::new_v4(), safe_name);
        let path = self.resolve(&locator)?;

        tokio::fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| {
                AppError::StorageError(anyhow::anyhow!("Failed to create storage dir: {}", e))
            })?;
        tokio::fs::write(&path, data).await.map_err(|e| {
            AppError::StorageError(anyhow::anyhow!("Failed to write attachment: {}", e))
        })?;

        info!(locator = %locator, "Stored attachment");
        Ok(locator)
    }

    fn download_url(&self, locator: &str) -> String {
        format!("{}/{}", self.public_base_url.trim_end_matches('/'), locator)
    }

    #[instrument(skip(self))]
    async fn delete(&self, locator: &str) -> Result<(), AppError> {
        let path = self.resolve(locator)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::StorageError(anyhow::anyhow!(
                "Failed to delete attachment: {}",
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_rejects_traversal() {
        let storage = LocalStorage::new("/tmp/attachments", "http://localhost:8086/files");
        assert!(storage.resolve("../etc/passwd").is_err());
        assert!(storage.resolve("/etc/passwd").is_err());
        assert!(storage.resolve("abc_invoice.pdf").is_ok());
    }

    #[test]
    fn download_url_joins_cleanly() {
        let storage = LocalStorage::new("/tmp/attachments", "http://localhost:8086/files/");
        assert_eq!(
            storage.download_url("abc_invoice.pdf"),
            "http://localhost:8086/files/abc_invoice.pdf"
        );
    }
}
