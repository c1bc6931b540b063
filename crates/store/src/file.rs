use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use stockwatch_core::domain::status::ProductStatus;
use tracing::debug;

use crate::{StatusStore, StoreError};

/// Status slot backed by a plain text file holding `available` or
/// `unavailable`. No locking: concurrent writers resolve as last-write-wins.
#[derive(Clone, Debug)]
pub struct FileStatusStore {
    path: PathBuf,
}

impl FileStatusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StatusStore for FileStatusStore {
    async fn read(&self) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => {
                let trimmed = raw.trim();
                Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no recorded status yet");
                Ok(None)
            }
            Err(source) => Err(StoreError::Read { path: self.path.clone(), source }),
        }
    }

    async fn write(&self, status: ProductStatus) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Write { path: self.path.clone(), source })?;
        }

        tokio::fs::write(&self.path, status.as_str())
            .await
            .map_err(|source| StoreError::Write { path: self.path.clone(), source })
    }
}
