use std::process::ExitCode;

fn main() -> ExitCode {
    stockwatch_cli::run()
}
