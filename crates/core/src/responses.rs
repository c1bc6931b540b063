//! JSON bodies shared by the HTTP surface and the operator CLI.

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::domain::status::ProductStatus;
use crate::errors::CheckError;
use crate::monitor::{CheckReport, MonitorSummary};

pub const INDEX_MESSAGE: &str = "Product crawler is active. Use /check endpoint to run the crawler.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexResponse {
    pub status: String,
    pub product: String,
    pub url: String,
    pub message: String,
    pub email_configured: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub status: String,
    pub product_status: ProductStatus,
    pub message: String,
    pub previous_status: Option<String>,
    pub timestamp: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub last_status: Option<String>,
    pub timestamp: String,
}

impl From<MonitorSummary> for IndexResponse {
    fn from(summary: MonitorSummary) -> Self {
        Self {
            status: "running".to_string(),
            product: summary.product,
            url: summary.api_url,
            message: INDEX_MESSAGE.to_string(),
            email_configured: summary.email_configured,
        }
    }
}

impl From<CheckReport> for CheckResponse {
    fn from(report: CheckReport) -> Self {
        Self {
            status: "success".to_string(),
            product_status: report.product_status,
            message: report.message,
            previous_status: report.previous_status,
            timestamp: report.checked_at.to_rfc3339(),
        }
    }
}

impl From<&CheckError> for ErrorResponse {
    fn from(error: &CheckError) -> Self {
        Self { status: "error".to_string(), message: error.to_string(), timestamp: timestamp() }
    }
}

impl StatusResponse {
    pub fn new(last_status: Option<String>) -> Self {
        Self { last_status, timestamp: timestamp() }
    }
}

pub fn timestamp() -> String {
    Local::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use chrono::Local;
    use serde_json::json;

    use super::{CheckResponse, ErrorResponse, IndexResponse, StatusResponse};
    use crate::domain::status::ProductStatus;
    use crate::errors::CheckError;
    use crate::monitor::{CheckReport, MonitorSummary};

    #[test]
    fn check_response_uses_wire_field_names() {
        let response = CheckResponse::from(CheckReport {
            product_status: ProductStatus::Available,
            previous_status: Some("unavailable".to_string()),
            message: "Product is AVAILABLE now! | Email sent: true".to_string(),
            notification: None,
            checked_at: Local::now(),
        });

        let value = serde_json::to_value(&response).expect("serialize");
        assert_eq!(value["status"], "success");
        assert_eq!(value["product_status"], "available");
        assert_eq!(value["previous_status"], "unavailable");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn absent_statuses_serialize_as_null() {
        let value = serde_json::to_value(StatusResponse::new(None)).expect("serialize");
        assert_eq!(value["last_status"], json!(null));
    }

    #[test]
    fn error_response_carries_error_message() {
        let error = CheckError::ProductNotFound { product: "Malta".to_string() };
        let response = ErrorResponse::from(&error);

        assert_eq!(response.status, "error");
        assert_eq!(response.message, "Product 'Malta' not found in API response");
    }

    #[test]
    fn index_response_reports_running_service() {
        let response = IndexResponse::from(MonitorSummary {
            product: "Malta".to_string(),
            api_url: "https://api.example.com/products".to_string(),
            email_configured: false,
        });

        assert_eq!(response.status, "running");
        assert_eq!(response.url, "https://api.example.com/products");
        assert!(!response.email_configured);
    }
}
