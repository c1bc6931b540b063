use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub mail: MailConfig,
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub product_name: String,
    pub catalog_url: String,
    pub api_url: String,
    pub currency: String,
    pub page_size: u32,
    pub municipality: String,
    pub region: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: Option<SecretString>,
    pub secret_key: Option<SecretString>,
    pub sender_email: String,
    pub sender_name: String,
    pub recipients: Vec<String>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub status_file: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub product_name: Option<String>,
    pub catalog_api_url: Option<String>,
    pub mail_api_url: Option<String>,
    pub mail_api_key: Option<String>,
    pub mail_secret_key: Option<String>,
    pub mail_recipients: Option<Vec<String>>,
    pub status_file: Option<PathBuf>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig {
                product_name: "Pallet Malta Guajira 330ml".to_string(),
                catalog_url: "https://cervezaparranda.com/catalog?sort=order".to_string(),
                api_url: "https://api.cervezaparranda.com/ms-auth/api/products/visibles"
                    .to_string(),
                currency: "USD".to_string(),
                page_size: 24,
                municipality: "09".to_string(),
                region: "23".to_string(),
                timeout_secs: 15,
            },
            mail: MailConfig {
                api_url: "https://api.mailjet.com/v3.1/send".to_string(),
                api_key: None,
                secret_key: None,
                sender_email: "your_email@example.com".to_string(),
                sender_name: "Product Crawler".to_string(),
                recipients: vec![
                    "recipient@example.com".to_string(),
                    "alerts@example.com".to_string(),
                ],
                timeout_secs: 10,
            },
            store: StoreConfig { status_file: PathBuf::from("./static/product_status.txt") },
            server: ServerConfig { bind_address: "0.0.0.0".to_string(), port: 10000 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl MailConfig {
    /// Both Mailjet credentials are present and non-blank.
    pub fn credentials_configured(&self) -> bool {
        let present = |value: &Option<SecretString>| {
            value.as_ref().map(|secret| !secret.expose_secret().trim().is_empty()).unwrap_or(false)
        };
        present(&self.api_key) && present(&self.secret_key)
    }

    fn set_primary_recipient(&mut self, email: String) {
        match self.recipients.first_mut() {
            Some(primary) => *primary = email,
            None => self.recipients.push(email),
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("stockwatch.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(catalog) = patch.catalog {
            if let Some(product_name) = catalog.product_name {
                self.catalog.product_name = product_name;
            }
            if let Some(catalog_url) = catalog.catalog_url {
                self.catalog.catalog_url = catalog_url;
            }
            if let Some(api_url) = catalog.api_url {
                self.catalog.api_url = api_url;
            }
            if let Some(currency) = catalog.currency {
                self.catalog.currency = currency;
            }
            if let Some(page_size) = catalog.page_size {
                self.catalog.page_size = page_size;
            }
            if let Some(municipality) = catalog.municipality {
                self.catalog.municipality = municipality;
            }
            if let Some(region) = catalog.region {
                self.catalog.region = region;
            }
            if let Some(timeout_secs) = catalog.timeout_secs {
                self.catalog.timeout_secs = timeout_secs;
            }
        }

        if let Some(mail) = patch.mail {
            if let Some(api_url) = mail.api_url {
                self.mail.api_url = api_url;
            }
            if let Some(mail_api_key_value) = mail.api_key {
                self.mail.api_key = Some(secret_value(mail_api_key_value));
            }
            if let Some(mail_secret_key_value) = mail.secret_key {
                self.mail.secret_key = Some(secret_value(mail_secret_key_value));
            }
            if let Some(sender_email) = mail.sender_email {
                self.mail.sender_email = sender_email;
            }
            if let Some(sender_name) = mail.sender_name {
                self.mail.sender_name = sender_name;
            }
            if let Some(recipients) = mail.recipients {
                self.mail.recipients = recipients;
            }
            if let Some(timeout_secs) = mail.timeout_secs {
                self.mail.timeout_secs = timeout_secs;
            }
        }

        if let Some(store) = patch.store {
            if let Some(status_file) = store.status_file {
                self.store.status_file = status_file;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("STOCKWATCH_CATALOG_PRODUCT_NAME") {
            self.catalog.product_name = value;
        }
        if let Some(value) = read_env("STOCKWATCH_CATALOG_URL") {
            self.catalog.catalog_url = value;
        }
        if let Some(value) = read_env("STOCKWATCH_CATALOG_API_URL") {
            self.catalog.api_url = value;
        }
        if let Some(value) = read_env("STOCKWATCH_CATALOG_CURRENCY") {
            self.catalog.currency = value;
        }
        if let Some(value) = read_env("STOCKWATCH_CATALOG_PAGE_SIZE") {
            self.catalog.page_size = parse_env("STOCKWATCH_CATALOG_PAGE_SIZE", &value)?;
        }
        if let Some(value) = read_env("STOCKWATCH_CATALOG_MUNICIPALITY") {
            self.catalog.municipality = value;
        }
        if let Some(value) = read_env("STOCKWATCH_CATALOG_REGION") {
            self.catalog.region = value;
        }
        if let Some(value) = read_env("STOCKWATCH_CATALOG_TIMEOUT_SECS") {
            self.catalog.timeout_secs = parse_env("STOCKWATCH_CATALOG_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("STOCKWATCH_MAIL_API_URL") {
            self.mail.api_url = value;
        }
        let api_key =
            read_env("STOCKWATCH_MAIL_API_KEY").or_else(|| read_env("MAILJET_API_KEY"));
        if let Some(value) = api_key {
            self.mail.api_key = Some(secret_value(value));
        }
        let secret_key =
            read_env("STOCKWATCH_MAIL_SECRET_KEY").or_else(|| read_env("MAILJET_SECRET_KEY"));
        if let Some(value) = secret_key {
            self.mail.secret_key = Some(secret_value(value));
        }
        let sender_email =
            read_env("STOCKWATCH_MAIL_SENDER_EMAIL").or_else(|| read_env("SENDER_EMAIL"));
        if let Some(value) = sender_email {
            self.mail.sender_email = value;
        }
        let sender_name =
            read_env("STOCKWATCH_MAIL_SENDER_NAME").or_else(|| read_env("SENDER_NAME"));
        if let Some(value) = sender_name {
            self.mail.sender_name = value;
        }
        if let Some(value) = read_env("STOCKWATCH_MAIL_RECIPIENTS") {
            self.mail.recipients = parse_list(&value);
        } else if let Some(value) = read_env("RECIPIENT_EMAIL") {
            self.mail.set_primary_recipient(value.trim().to_string());
        }
        if let Some(value) = read_env("STOCKWATCH_MAIL_TIMEOUT_SECS") {
            self.mail.timeout_secs = parse_env("STOCKWATCH_MAIL_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("STOCKWATCH_STORE_STATUS_FILE") {
            self.store.status_file = PathBuf::from(value);
        }

        if let Some(value) = read_env("STOCKWATCH_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("STOCKWATCH_SERVER_PORT") {
            self.server.port = parse_env("STOCKWATCH_SERVER_PORT", &value)?;
        } else if let Some(value) = read_env("PORT") {
            self.server.port = parse_env("PORT", &value)?;
        }

        let log_level =
            read_env("STOCKWATCH_LOGGING_LEVEL").or_else(|| read_env("STOCKWATCH_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("STOCKWATCH_LOGGING_FORMAT").or_else(|| read_env("STOCKWATCH_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(product_name) = overrides.product_name {
            self.catalog.product_name = product_name;
        }
        if let Some(catalog_api_url) = overrides.catalog_api_url {
            self.catalog.api_url = catalog_api_url;
        }
        if let Some(mail_api_url) = overrides.mail_api_url {
            self.mail.api_url = mail_api_url;
        }
        if let Some(mail_api_key) = overrides.mail_api_key {
            self.mail.api_key = Some(secret_value(mail_api_key));
        }
        if let Some(mail_secret_key) = overrides.mail_secret_key {
            self.mail.secret_key = Some(secret_value(mail_secret_key));
        }
        if let Some(recipients) = overrides.mail_recipients {
            self.mail.recipients = recipients;
        }
        if let Some(status_file) = overrides.status_file {
            self.store.status_file = status_file;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_catalog(&self.catalog)?;
        validate_mail(&self.mail)?;
        validate_store(&self.store)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// The config file `load` will read: `explicit_path` when it exists,
/// otherwise the first of `stockwatch.toml` and `config/stockwatch.toml`.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("stockwatch.toml"), PathBuf::from("config/stockwatch.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let reference = &rest[start + 2..];
        let end = reference.find('}').ok_or(ConfigError::UnterminatedInterpolation)?;
        let var = &reference[..end];
        let value = env::var(var)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: var.to_string() })?;
        output.push_str(&value);
        rest = &reference[end + 1..];
    }

    output.push_str(rest);
    Ok(output)
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    if catalog.product_name.trim().is_empty() {
        return Err(ConfigError::Validation("catalog.product_name must not be empty".to_string()));
    }

    if !is_http_url(&catalog.api_url) {
        return Err(ConfigError::Validation(
            "catalog.api_url must start with http:// or https://".to_string(),
        ));
    }

    if !is_http_url(&catalog.catalog_url) {
        return Err(ConfigError::Validation(
            "catalog.catalog_url must start with http:// or https://".to_string(),
        ));
    }

    if catalog.page_size == 0 || catalog.page_size > 100 {
        return Err(ConfigError::Validation(
            "catalog.page_size must be in range 1..=100".to_string(),
        ));
    }

    if catalog.timeout_secs == 0 || catalog.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "catalog.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_mail(mail: &MailConfig) -> Result<(), ConfigError> {
    if !is_http_url(&mail.api_url) {
        return Err(ConfigError::Validation(
            "mail.api_url must start with http:// or https://".to_string(),
        ));
    }

    if !mail.sender_email.contains('@') {
        return Err(ConfigError::Validation(
            "mail.sender_email must be an email address".to_string(),
        ));
    }

    if mail.recipients.is_empty() {
        return Err(ConfigError::Validation(
            "mail.recipients must list at least one address".to_string(),
        ));
    }

    if let Some(invalid) = mail.recipients.iter().find(|recipient| !recipient.contains('@')) {
        return Err(ConfigError::Validation(format!(
            "mail.recipients entry `{invalid}` is not an email address"
        )));
    }

    if mail.timeout_secs == 0 || mail.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "mail.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_store(store: &StoreConfig) -> Result<(), ConfigError> {
    if store.status_file.as_os_str().is_empty() {
        return Err(ConfigError::Validation("store.status_file must not be empty".to_string()));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation(
            "server.bind_address must not be empty".to_string(),
        ));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    catalog: Option<CatalogPatch>,
    mail: Option<MailPatch>,
    store: Option<StorePatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    product_name: Option<String>,
    catalog_url: Option<String>,
    api_url: Option<String>,
    currency: Option<String>,
    page_size: Option<u32>,
    municipality: Option<String>,
    region: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct MailPatch {
    api_url: Option<String>,
    api_key: Option<String>,
    secret_key: Option<String>,
    sender_email: Option<String>,
    sender_name: Option<String>,
    recipients: Option<Vec<String>>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct StorePatch {
    status_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
