use stockwatch_core::config::{AppConfig, LoadOptions};
use stockwatch_core::responses::StatusResponse;
use stockwatch_store::{FileStatusStore, StatusStore};

use crate::commands::{current_thread_runtime, init_logging, CommandResult};

/// Prints the last recorded status without contacting the catalog.
pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "status",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };
    init_logging(&config.logging);

    let runtime = match current_thread_runtime("status") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let store = FileStatusStore::new(config.store.status_file);
    match runtime.block_on(store.read()) {
        Ok(last_status) => CommandResult::payload(&StatusResponse::new(last_status), 0),
        Err(error) => CommandResult::failure("status", "status_read", error.to_string(), 5),
    }
}
