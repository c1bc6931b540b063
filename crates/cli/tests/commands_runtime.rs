use std::env;
use std::net::SocketAddr;
use std::sync::{mpsc, Mutex, OnceLock};
use std::thread;

use axum::{routing::post, Json, Router};
use serde_json::{json, Value};
use stockwatch_cli::commands::{check, config, status};
use tempfile::TempDir;

const PRODUCT: &str = "Pallet Malta Guajira 330ml";

#[test]
fn check_reports_restock_and_records_status() {
    let dir = TempDir::new().expect("tempdir");
    let status_file = dir.path().join("static").join("product_status.txt");
    let api_url = spawn_catalog(json!([
        { "name": "Cerveza Parranda 355ml", "hasStock": false },
        { "name": "pallet malta guajira 330ml", "hasStock": true }
    ]));

    with_env(
        &[
            ("STOCKWATCH_CATALOG_API_URL", api_url.as_str()),
            ("STOCKWATCH_STORE_STATUS_FILE", status_file.to_str().expect("utf-8 path")),
        ],
        || {
            let result = check::run();
            assert_eq!(result.exit_code, 0, "expected successful check: {}", result.output);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["status"], "success");
            assert_eq!(payload["product_status"], "available");
            assert!(payload["previous_status"].is_null());
            assert_eq!(payload["message"], "Product is AVAILABLE now! | Email sent: false");

            let recorded = std::fs::read_to_string(&status_file).expect("status file");
            assert_eq!(recorded, "available");
        },
    );
}

#[test]
fn check_exits_one_when_product_is_missing() {
    let dir = TempDir::new().expect("tempdir");
    let status_file = dir.path().join("product_status.txt");
    let api_url = spawn_catalog(json!([{ "name": "Cerveza Parranda 355ml", "hasStock": true }]));

    with_env(
        &[
            ("STOCKWATCH_CATALOG_API_URL", api_url.as_str()),
            ("STOCKWATCH_STORE_STATUS_FILE", status_file.to_str().expect("utf-8 path")),
        ],
        || {
            let result = check::run();
            assert_eq!(result.exit_code, 1, "expected product-not-found exit code");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["status"], "error");
            assert_eq!(payload["message"], format!("Product '{PRODUCT}' not found in API response"));
            assert!(!status_file.exists(), "missing product must not record a status");
        },
    );
}

#[test]
fn check_exits_one_when_matched_entry_has_no_stock_flag() {
    let dir = TempDir::new().expect("tempdir");
    let status_file = dir.path().join("product_status.txt");
    let api_url = spawn_catalog(json!([{ "name": PRODUCT, "price": 30 }]));

    with_env(
        &[
            ("STOCKWATCH_CATALOG_API_URL", api_url.as_str()),
            ("STOCKWATCH_STORE_STATUS_FILE", status_file.to_str().expect("utf-8 path")),
        ],
        || {
            let result = check::run();
            assert_eq!(result.exit_code, 1);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["status"], "error");
            assert_eq!(
                payload["message"],
                format!("Product '{PRODUCT}' has no 'hasStock' field in API response")
            );
            assert!(!status_file.exists());
        },
    );
}

#[test]
fn check_returns_config_failure_for_invalid_api_url() {
    with_env(&[("STOCKWATCH_CATALOG_API_URL", "ftp://api.example.com/products")], || {
        let result = check::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "check");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn status_reads_recorded_value() {
    let dir = TempDir::new().expect("tempdir");
    let status_file = dir.path().join("product_status.txt");
    std::fs::write(&status_file, "unavailable\n").expect("seed status file");

    with_env(&[("STOCKWATCH_STORE_STATUS_FILE", status_file.to_str().expect("utf-8 path"))], || {
        let result = status::run();
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["last_status"], "unavailable");
        assert!(payload["timestamp"].is_string());
    });
}

#[test]
fn status_is_null_before_first_check() {
    let dir = TempDir::new().expect("tempdir");
    let status_file = dir.path().join("never-written.txt");

    with_env(&[("STOCKWATCH_STORE_STATUS_FILE", status_file.to_str().expect("utf-8 path"))], || {
        let result = status::run();
        assert_eq!(result.exit_code, 0);
        assert!(parse_payload(&result.output)["last_status"].is_null());
    });
}

#[test]
fn config_attributes_sources_and_redacts_credentials() {
    with_env(
        &[
            ("MAILJET_API_KEY", "mj-public-abcdef"),
            ("STOCKWATCH_MAIL_SECRET_KEY", "mj-private-123456"),
            ("PORT", "8088"),
        ],
        || {
            let result = config::run();
            assert_eq!(result.exit_code, 0);

            let output = result.output;
            assert!(output.contains("- mail.api_key = <redacted> (source: env (MAILJET_API_KEY))"));
            assert!(output.contains(
                "- mail.secret_key = <redacted> (source: env (STOCKWATCH_MAIL_SECRET_KEY))"
            ));
            assert!(output.contains("- server.port = 8088 (source: env (PORT))"));
            assert!(output.contains(&format!("- catalog.product_name = {PRODUCT} (source: default)")));
            assert!(!output.contains("mj-public-abcdef"));
            assert!(!output.contains("mj-private-123456"));
        },
    );
}

#[test]
fn config_attributes_primary_recipient_override_to_first_entry_only() {
    with_env(&[("RECIPIENT_EMAIL", "me@example.com")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 0);

        assert!(result.output.contains(
            "- mail.recipients = me@example.com, alerts@example.com \
             (source: env (RECIPIENT_EMAIL) for the first entry, default for the rest)"
        ));
    });
}

fn spawn_catalog(listing: Value) -> String {
    let (sender, receiver) = mpsc::channel::<SocketAddr>();
    thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("catalog runtime");
        runtime.block_on(async move {
            let router = Router::new().route(
                "/products/visibles",
                post(move || {
                    let listing = listing.clone();
                    async move { Json(listing) }
                }),
            );
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
            sender.send(listener.local_addr().expect("local addr")).expect("send addr");
            let _ = axum::serve(listener, router).await;
        });
    });
    let address = receiver.recv().expect("catalog address");
    format!("http://{address}/products/visibles")
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "STOCKWATCH_CATALOG_PRODUCT_NAME",
        "STOCKWATCH_CATALOG_URL",
        "STOCKWATCH_CATALOG_API_URL",
        "STOCKWATCH_CATALOG_CURRENCY",
        "STOCKWATCH_CATALOG_PAGE_SIZE",
        "STOCKWATCH_CATALOG_MUNICIPALITY",
        "STOCKWATCH_CATALOG_REGION",
        "STOCKWATCH_CATALOG_TIMEOUT_SECS",
        "STOCKWATCH_MAIL_API_URL",
        "STOCKWATCH_MAIL_API_KEY",
        "STOCKWATCH_MAIL_SECRET_KEY",
        "STOCKWATCH_MAIL_SENDER_EMAIL",
        "STOCKWATCH_MAIL_SENDER_NAME",
        "STOCKWATCH_MAIL_RECIPIENTS",
        "STOCKWATCH_MAIL_TIMEOUT_SECS",
        "STOCKWATCH_STORE_STATUS_FILE",
        "STOCKWATCH_SERVER_BIND_ADDRESS",
        "STOCKWATCH_SERVER_PORT",
        "STOCKWATCH_LOGGING_LEVEL",
        "STOCKWATCH_LOGGING_FORMAT",
        "STOCKWATCH_LOG_LEVEL",
        "STOCKWATCH_LOG_FORMAT",
        "MAILJET_API_KEY",
        "MAILJET_SECRET_KEY",
        "SENDER_EMAIL",
        "SENDER_NAME",
        "RECIPIENT_EMAIL",
        "PORT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
