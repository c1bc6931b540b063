//! Availability check orchestration.
//!
//! One `check` queries the catalog, compares against the recorded status,
//! sends a notification on an unavailable -> available transition and records
//! the new status. Store failures are logged and never fail the check.

use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::CatalogConfig;
use crate::domain::status::ProductStatus;
use crate::errors::CheckError;
use crate::ports::{CatalogClient, Notification, Notifier, NotifyOutcome, StatusStore};

pub const UNAVAILABLE_MESSAGE: &str = "Product still doesn't have stock.";
pub const AVAILABLE_MESSAGE: &str = "Product is AVAILABLE now!";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonitorSettings {
    pub product_name: String,
    pub catalog_url: String,
    pub api_url: String,
}

impl From<&CatalogConfig> for MonitorSettings {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            product_name: config.product_name.clone(),
            catalog_url: config.catalog_url.clone(),
            api_url: config.api_url.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub product_status: ProductStatus,
    pub previous_status: Option<String>,
    pub message: String,
    pub notification: Option<NotifyOutcome>,
    pub checked_at: DateTime<Local>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MonitorSummary {
    pub product: String,
    pub api_url: String,
    pub email_configured: bool,
}

pub struct StockMonitor {
    settings: MonitorSettings,
    catalog: Arc<dyn CatalogClient>,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn StatusStore>,
}

impl StockMonitor {
    pub fn new(
        settings: MonitorSettings,
        catalog: Arc<dyn CatalogClient>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn StatusStore>,
    ) -> Self {
        Self { settings, catalog, notifier, store }
    }

    pub fn summary(&self) -> MonitorSummary {
        MonitorSummary {
            product: self.settings.product_name.clone(),
            api_url: self.settings.api_url.clone(),
            email_configured: self.notifier.is_configured(),
        }
    }

    /// Last recorded status; read failures are logged and reported as absent.
    pub async fn last_status(&self) -> Option<String> {
        self.read_recorded("status_query").await
    }

    pub async fn check(&self) -> Result<CheckReport, CheckError> {
        let correlation_id = Uuid::new_v4().simple().to_string();
        let product_name = self.settings.product_name.as_str();
        info!(
            event_name = "monitor.check.start",
            correlation_id = %correlation_id,
            product = %product_name,
            "checking product status"
        );

        let Some(product) = self.catalog.find_product(product_name).await else {
            warn!(
                event_name = "monitor.check.product_missing",
                correlation_id = %correlation_id,
                product = %product_name,
                "product not found in catalog response"
            );
            return Err(CheckError::ProductNotFound { product: product_name.to_string() });
        };

        let Some(product_status) = product.status() else {
            warn!(
                event_name = "monitor.check.stock_flag_missing",
                correlation_id = %correlation_id,
                product = %product_name,
                "catalog entry has no stock flag"
            );
            return Err(CheckError::StockFlagMissing { product: product_name.to_string() });
        };

        let previous_status = self.read_recorded(&correlation_id).await;
        let mut notification = None;

        let message = match product_status {
            ProductStatus::Unavailable => UNAVAILABLE_MESSAGE.to_string(),
            ProductStatus::Available => {
                let mut message = AVAILABLE_MESSAGE.to_string();
                if !ProductStatus::was_available(previous_status.as_deref()) {
                    let outcome = self
                        .notifier
                        .notify(&Notification {
                            product_name: product_name.to_string(),
                            catalog_url: self.settings.catalog_url.clone(),
                            triggered_at: Local::now(),
                        })
                        .await;
                    message.push_str(&format!(" | Email sent: {}", outcome.is_sent()));
                    notification = Some(outcome);
                }
                message
            }
        };
        info!(
            event_name = "monitor.check.evaluated",
            correlation_id = %correlation_id,
            product = %product_name,
            product_status = %product_status,
            previous_status = previous_status.as_deref().unwrap_or("none"),
            "{message}"
        );

        if let Err(error) = self.store.write(product_status).await {
            error!(
                event_name = "monitor.store.write_failed",
                correlation_id = %correlation_id,
                error = %error,
                "failed to record product status"
            );
        }

        Ok(CheckReport {
            product_status,
            previous_status,
            message,
            notification,
            checked_at: Local::now(),
        })
    }

    async fn read_recorded(&self, correlation_id: &str) -> Option<String> {
        match self.store.read().await {
            Ok(status) => status,
            Err(error) => {
                error!(
                    event_name = "monitor.store.read_failed",
                    correlation_id = %correlation_id,
                    error = %error,
                    "failed to read recorded product status"
                );
                None
            }
        }
    }
}
