use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;
use thiserror::Error;

use crate::domain::product::CatalogProduct;
use crate::domain::status::ProductStatus;

/// Source of catalog listings. Transport and decode failures are logged by the
/// implementation and surface as `None`, the same as a missing product.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn find_product(&self, name: &str) -> Option<CatalogProduct>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub product_name: String,
    pub catalog_url: String,
    pub triggered_at: DateTime<Local>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyOutcome {
    Sent,
    Failed,
}

impl NotifyOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Whether credentials are present; an unconfigured notifier always fails.
    fn is_configured(&self) -> bool;

    async fn notify(&self, notification: &Notification) -> NotifyOutcome;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not read status file `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not write status file `{path}`: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("status store unavailable: {0}")]
    Unavailable(String),
}

/// Single scalar status slot, overwritten on every check.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Raw recorded value, `None` when nothing has been recorded yet.
    async fn read(&self) -> Result<Option<String>, StoreError>;
    async fn write(&self, status: ProductStatus) -> Result<(), StoreError>;
}
