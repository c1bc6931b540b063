pub mod config;
pub mod domain;
pub mod errors;
pub mod monitor;
pub mod ports;
pub mod responses;

pub use domain::product::{find_in_listing, CatalogProduct};
pub use domain::status::{ProductStatus, StatusParseError};
pub use errors::CheckError;
pub use monitor::{CheckReport, MonitorSettings, MonitorSummary, StockMonitor};
pub use ports::{CatalogClient, Notification, Notifier, NotifyOutcome, StatusStore, StoreError};
