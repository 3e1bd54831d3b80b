use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "meetcap")]
#[command(about = "Meeting capture and live transcription service", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Print version information
    Version,
    /// List the supported meeting platform integrations
    Platforms,
    /// Inspect a meeting invite URL (platform, meeting id)
    Inspect(InspectCliArgs),
}

#[derive(ClapArgs, Debug)]
pub struct InspectCliArgs {
    /// Meeting invite URL to inspect
    pub url: String,
}
