use stockwatch_core::config::{AppConfig, LoadOptions};
use stockwatch_core::errors::CheckError;
use stockwatch_core::responses::{CheckResponse, ErrorResponse};
use stockwatch_providers::monitor_from_config;

use crate::commands::{current_thread_runtime, init_logging, CommandResult};

/// Runs one availability check with the same semantics as `GET /check`.
///
/// Exit codes: 0 on success, 1 when the catalog response lacks the product
/// or its stock flag, 2 for configuration problems, 3 when providers cannot
/// be built, 4 when the async runtime fails to start and 6 when the check
/// itself aborts.
pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "check",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };
    init_logging(&config.logging);

    let monitor = match monitor_from_config(&config) {
        Ok(monitor) => monitor,
        Err(error) => {
            return CommandResult::failure("check", "provider_init", error.to_string(), 3);
        }
    };

    let runtime = match current_thread_runtime("check") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    match runtime.block_on(monitor.check()) {
        Ok(report) => CommandResult::payload(&CheckResponse::from(report), 0),
        Err(error) => CommandResult::payload(&ErrorResponse::from(&error), exit_code(&error)),
    }
}

fn exit_code(error: &CheckError) -> u8 {
    match error {
        CheckError::ProductNotFound { .. } | CheckError::StockFlagMissing { .. } => 1,
        CheckError::Aborted(_) => 6,
    }
}
