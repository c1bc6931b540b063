use std::sync::Arc;

use stockwatch_core::config::{AppConfig, ConfigError};
use stockwatch_core::monitor::StockMonitor;
use stockwatch_providers::{monitor_from_config, ProviderError};
use thiserror::Error;
use tracing::{info, warn};

pub struct Application {
    pub config: AppConfig,
    pub monitor: Arc<StockMonitor>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("provider initialization failed: {0}")]
    Provider(#[from] ProviderError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        product = %config.catalog.product_name,
        status_file = %config.store.status_file.display(),
        "starting application bootstrap"
    );

    let monitor = monitor_from_config(&config)?;
    if !config.mail.credentials_configured() {
        warn!(
            event_name = "system.bootstrap.mail_unconfigured",
            correlation_id = "bootstrap",
            "mailjet credentials are missing; availability emails will fail"
        );
    }

    Ok(Application { config, monitor: Arc::new(monitor) })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use stockwatch_core::config::{AppConfig, ConfigOverrides, LoadOptions};

    use crate::bootstrap::{bootstrap_with_config, BootstrapError};

    #[test]
    fn bootstrap_wires_monitor_from_config() {
        let mut config = AppConfig::default();
        config.catalog.product_name = "Cerveza Parranda 355ml".to_string();
        config.store.status_file = PathBuf::from("/tmp/stockwatch-bootstrap-test.txt");

        let app = bootstrap_with_config(config).expect("bootstrap should succeed");

        let summary = app.monitor.summary();
        assert_eq!(summary.product, "Cerveza Parranda 355ml");
        assert!(!summary.email_configured);
        assert_eq!(app.config.server.port, 10000);
    }

    #[test]
    fn bootstrap_fails_fast_on_invalid_config() {
        let result = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                catalog_api_url: Some("ftp://api.example.com/products".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .map_err(BootstrapError::from)
        .and_then(bootstrap_with_config);

        let error = result.err().expect("invalid api url should fail");
        assert!(matches!(error, BootstrapError::Config(_)));
        assert!(error.to_string().contains("catalog.api_url"));
    }
}
