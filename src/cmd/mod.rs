use clap::{Parser, Subcommand};
use jobs_api::{pkg::server::listen, prelude::Result};

mod migrate;

#[derive(Parser)]
#[command(about = "serves the job resource")]
struct Cmd {
    #[command(subcommand)]
    command: Option<SubCommandType>,
}

#[derive(Subcommand)]
enum SubCommandType {
    /// Start the HTTP server
    Listen,
    /// Apply pending database migrations
    Migrate,
}

pub async fn run() -> Result<()> {
    let args = Cmd::parse();
    match args.command {
        Some(SubCommandType::Listen) => {
            listen().await?;
        }
        Some(SubCommandType::Migrate) => {
            migrate::apply().await?;
        }
        None => {
            tracing::error!("no subcommand passed");
        }
    }
    Ok(())
}
