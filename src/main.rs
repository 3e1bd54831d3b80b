use anyhow::Result;
use clap::Parser;
use meetcap::{
    app,
    cli::{handle_inspect_command, handle_platforms_command, Cli, CliCommand},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(CliCommand::Version) => {
            println!("meetcap {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(CliCommand::Platforms) => {
            handle_platforms_command();
            Ok(())
        }
        Some(CliCommand::Inspect(args)) => {
            handle_inspect_command(&args);
            Ok(())
        }
        None => app::run_service().await,
    }
}
