//! AdRep CLI - Main entry point

use adrep_cli::{Cli, Commands};
use adrep_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use clap::Parser;
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LogConfig::builder()
            .level(LogLevel::Debug)
            .output(LogOutput::Console)
            .log_file_prefix("adrep-cli".to_string())
            .build()
    } else {
        LogConfig::builder()
            .level(LogLevel::Warn)
            .output(LogOutput::Console)
            .log_file_prefix("adrep-cli".to_string())
            .build()
    };

    // Environment settings take precedence over the flag-derived defaults.
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    // The CLI should still work when logging cannot initialize.
    let _ = init_logging(&log_config);

    if let Err(e) = execute_command(cli).await {
        error!(error = %e, "command failed");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn execute_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run {
            accounts,
            reports,
            date_range,
            start,
            end,
            output,
            endpoint,
            fields_file,
        } => {
            adrep_cli::commands::run::run(adrep_cli::commands::run::RunOptions {
                accounts,
                reports,
                date_range,
                start,
                end,
                output,
                endpoint,
                fields_file,
            })
            .await
        },

        Commands::Fields { report } => adrep_cli::commands::fields::run(report),
    }
}
