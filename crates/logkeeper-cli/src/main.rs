//! Logkeeper - archive old log files into daily bundles and expire old bundles.

use clap::Parser;
use logkeeper_cli::cli::RunArgs;
use logkeeper_cli::commands;
use logkeeper_cli::{config, Cli, Command, Formatter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> logkeeper_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    logkeeper_cli::init_tracing(cli.log_level());

    // Load and validate config
    let (config_path, janitor_config) = config::load(cli.config.as_deref())?;

    let format = cli.format.map(Into::into).unwrap_or_default();
    let formatter = Formatter::new(format, !cli.no_color);

    match cli.command {
        None => {
            commands::execute_run(RunArgs::default(), janitor_config, &config_path, &formatter)
                .await?;
        }
        Some(Command::Run(args)) => {
            commands::execute_run(args, janitor_config, &config_path, &formatter).await?;
        }
        Some(Command::Watch(args)) => {
            commands::execute_watch(args, janitor_config, &config_path, &formatter).await?;
        }
        Some(Command::Check) => {
            commands::execute_check(&config_path, &janitor_config, &formatter)?;
        }
    }

    Ok(())
}
