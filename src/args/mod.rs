//! Abstractions related to the inputs of the CLI program.

#[derive(clap::Parser)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version,
    about = "Start, stop and query a Factorio server hosted on a CloudFormation stack."
)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(long, short, value_name = "PATH")]
    pub config: Option<std::path::PathBuf>,

    /// Log at debug level regardless of the configuration.
    #[arg(long, short)]
    pub verbose: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(clap::Subcommand, Debug, PartialEq, Eq)]
pub enum Cmd {
    #[command(about = "Show the current state of the server.")]
    State,

    #[command(about = "Request the server to start. Does not wait for it to come up.")]
    Start,

    #[command(about = "Request the server to stop. Does not wait for it to go down.")]
    Stop,

    #[command(about = "List the players online, over RCON.")]
    Players,
}
