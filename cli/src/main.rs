use clap::Parser;
use std::process::ExitCode;
use themer_cli::args::Cli;
use themer_cli::commands::{self, CommandStatus};
use themer_cli::config::{self, ConfigLoadResult};
use themer_cli::logger;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config::load_config(cli.config.as_deref()) {
        ConfigLoadResult::Success(config) => config,
        ConfigLoadResult::LoadError(e) | ConfigLoadResult::DeserializeError(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(errors) = config.validate() {
        let messages: Vec<String> = errors.iter().map(|e| e.user_message()).collect();
        eprintln!("Configuration validation failed:\n{}", messages.join("\n\n"));
        return ExitCode::FAILURE;
    }

    if let Err(e) = logger::setup_logger(config.logging(), cli.verbose) {
        eprintln!("Failed to initialize logger: {e}");
    }

    let mut stdout = std::io::stdout();
    match commands::run(&cli, &config, &mut stdout).await {
        Ok(CommandStatus::Success) => ExitCode::SUCCESS,
        Ok(CommandStatus::Failure) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
