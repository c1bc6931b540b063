use async_trait::async_trait;
use stockwatch_core::domain::status::ProductStatus;
use tokio::sync::RwLock;

use crate::{StatusStore, StoreError};

#[derive(Default)]
pub struct InMemoryStatusStore {
    status: RwLock<Option<String>>,
    fail_writes: bool,
}

impl InMemoryStatusStore {
    pub fn with_status(status: ProductStatus) -> Self {
        Self { status: RwLock::new(Some(status.as_str().to_string())), fail_writes: false }
    }

    /// A store whose writes always fail while reads keep returning `initial`.
    pub fn failing_writes(initial: Option<ProductStatus>) -> Self {
        Self {
            status: RwLock::new(initial.map(|status| status.as_str().to_string())),
            fail_writes: true,
        }
    }
}

#[async_trait]
impl StatusStore for InMemoryStatusStore {
    async fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.status.read().await.clone())
    }

    async fn write(&self, status: ProductStatus) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Unavailable("in-memory store rejects writes".to_string()));
        }
        *self.status.write().await = Some(status.as_str().to_string());
        Ok(())
    }
}
