pub mod catalog;
pub mod mailjet;
pub mod template;

use std::sync::Arc;

use stockwatch_core::config::AppConfig;
use stockwatch_core::monitor::{MonitorSettings, StockMonitor};
use stockwatch_store::FileStatusStore;
use thiserror::Error;

pub use catalog::{CatalogError, HttpCatalogClient};
pub use mailjet::{MailjetNotifier, NotifyError};
pub use template::EmailTemplate;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http client could not be built: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("email template failed to compile: {0}")]
    Template(#[from] tera::Error),
}

/// Wires the production monitor: HTTP catalog, Mailjet notifier and the
/// file-backed status store named in `config`.
pub fn monitor_from_config(config: &AppConfig) -> Result<StockMonitor, ProviderError> {
    let catalog = HttpCatalogClient::from_config(&config.catalog)?;
    let notifier = MailjetNotifier::from_config(&config.mail)?;
    let store = FileStatusStore::new(config.store.status_file.clone());

    Ok(StockMonitor::new(
        MonitorSettings::from(&config.catalog),
        Arc::new(catalog),
        Arc::new(notifier),
        Arc::new(store),
    ))
}
