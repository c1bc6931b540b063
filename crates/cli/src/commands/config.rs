use std::env;
use std::fs;
use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use stockwatch_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

use crate::commands::CommandResult;

const PRIMARY_RECIPIENT_ENV: &str = "RECIPIENT_EMAIL";

struct ConfigField {
    key_path: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

/// Renders the effective configuration, one line per field, with the layer
/// each value came from. Mail credentials never appear in clear text.
pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            );
        }
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key_path,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key_path, &field.value, source));
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn fields(config: &AppConfig) -> Vec<ConfigField> {
    let catalog = &config.catalog;
    let mail = &config.mail;

    vec![
        ConfigField {
            key_path: "catalog.product_name",
            value: catalog.product_name.clone(),
            env_keys: &["STOCKWATCH_CATALOG_PRODUCT_NAME"],
        },
        ConfigField {
            key_path: "catalog.catalog_url",
            value: catalog.catalog_url.clone(),
            env_keys: &["STOCKWATCH_CATALOG_URL"],
        },
        ConfigField {
            key_path: "catalog.api_url",
            value: catalog.api_url.clone(),
            env_keys: &["STOCKWATCH_CATALOG_API_URL"],
        },
        ConfigField {
            key_path: "catalog.currency",
            value: catalog.currency.clone(),
            env_keys: &["STOCKWATCH_CATALOG_CURRENCY"],
        },
        ConfigField {
            key_path: "catalog.page_size",
            value: catalog.page_size.to_string(),
            env_keys: &["STOCKWATCH_CATALOG_PAGE_SIZE"],
        },
        ConfigField {
            key_path: "catalog.municipality",
            value: catalog.municipality.clone(),
            env_keys: &["STOCKWATCH_CATALOG_MUNICIPALITY"],
        },
        ConfigField {
            key_path: "catalog.region",
            value: catalog.region.clone(),
            env_keys: &["STOCKWATCH_CATALOG_REGION"],
        },
        ConfigField {
            key_path: "catalog.timeout_secs",
            value: catalog.timeout_secs.to_string(),
            env_keys: &["STOCKWATCH_CATALOG_TIMEOUT_SECS"],
        },
        ConfigField {
            key_path: "mail.api_url",
            value: mail.api_url.clone(),
            env_keys: &["STOCKWATCH_MAIL_API_URL"],
        },
        ConfigField {
            key_path: "mail.api_key",
            value: redact_secret(mail.api_key.as_ref()),
            env_keys: &["STOCKWATCH_MAIL_API_KEY", "MAILJET_API_KEY"],
        },
        ConfigField {
            key_path: "mail.secret_key",
            value: redact_secret(mail.secret_key.as_ref()),
            env_keys: &["STOCKWATCH_MAIL_SECRET_KEY", "MAILJET_SECRET_KEY"],
        },
        ConfigField {
            key_path: "mail.sender_email",
            value: mail.sender_email.clone(),
            env_keys: &["STOCKWATCH_MAIL_SENDER_EMAIL", "SENDER_EMAIL"],
        },
        ConfigField {
            key_path: "mail.sender_name",
            value: mail.sender_name.clone(),
            env_keys: &["STOCKWATCH_MAIL_SENDER_NAME", "SENDER_NAME"],
        },
        ConfigField {
            key_path: "mail.recipients",
            value: mail.recipients.join(", "),
            env_keys: &["STOCKWATCH_MAIL_RECIPIENTS"],
        },
        ConfigField {
            key_path: "mail.timeout_secs",
            value: mail.timeout_secs.to_string(),
            env_keys: &["STOCKWATCH_MAIL_TIMEOUT_SECS"],
        },
        ConfigField {
            key_path: "store.status_file",
            value: config.store.status_file.display().to_string(),
            env_keys: &["STOCKWATCH_STORE_STATUS_FILE"],
        },
        ConfigField {
            key_path: "server.bind_address",
            value: config.server.bind_address.clone(),
            env_keys: &["STOCKWATCH_SERVER_BIND_ADDRESS"],
        },
        ConfigField {
            key_path: "server.port",
            value: config.server.port.to_string(),
            env_keys: &["STOCKWATCH_SERVER_PORT", "PORT"],
        },
        ConfigField {
            key_path: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["STOCKWATCH_LOGGING_LEVEL", "STOCKWATCH_LOG_LEVEL"],
        },
        ConfigField {
            key_path: "logging.format",
            value: format!("{:?}", config.logging.format).to_lowercase(),
            env_keys: &["STOCKWATCH_LOGGING_FORMAT", "STOCKWATCH_LOG_FORMAT"],
        },
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env_is_set(key)) {
        return format!("env ({env_key})");
    }

    let layered = file_or_default_source(key_path, config_file_doc, config_file_path);

    // RECIPIENT_EMAIL only replaces the first recipient.
    if key_path == "mail.recipients" && env_is_set(PRIMARY_RECIPIENT_ENV) {
        return format!("env ({PRIMARY_RECIPIENT_ENV}) for the first entry, {layered} for the rest");
    }

    layered
}

fn file_or_default_source(
    key_path: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn env_is_set(key: &str) -> bool {
    env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false)
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_secret(secret: Option<&SecretString>) -> String {
    match secret {
        None => "<unset>".to_string(),
        Some(secret) if secret.expose_secret().trim().is_empty() => "<empty>".to_string(),
        Some(_) => "<redacted>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use toml::Value;

    use super::{contains_path, redact_secret};

    #[test]
    fn secrets_are_never_echoed() {
        let key = SecretString::from("mj-live-0123456789".to_string());
        let blank = SecretString::from("  ".to_string());

        assert_eq!(redact_secret(Some(&key)), "<redacted>");
        assert_eq!(redact_secret(Some(&blank)), "<empty>");
        assert_eq!(redact_secret(None), "<unset>");
    }

    #[test]
    fn nested_keys_are_found_in_config_document() {
        let doc: Value = "[mail]\nrecipients = [\"a@example.com\"]\n".parse().expect("toml");

        assert!(contains_path(&doc, "mail.recipients"));
        assert!(!contains_path(&doc, "mail.api_key"));
        assert!(!contains_path(&doc, "catalog.product_name"));
    }
}
