pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "stockwatch",
    about = "Stockwatch operator CLI",
    long_about = "Run one-off availability checks, read the recorded status, and inspect configuration.",
    after_help = "Examples:\n  stockwatch check\n  stockwatch status\n  stockwatch config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Query the catalog once, notify on a new restock, and record the status")]
    Check,
    #[command(about = "Print the last recorded product status")]
    Status,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check => commands::check::run(),
        Command::Status => commands::status::run(),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
