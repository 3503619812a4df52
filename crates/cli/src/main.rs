mod commands;
mod config;
mod error;
mod patch;
mod templates;
mod utils;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use error::CliError;

#[derive(Parser)]
#[command(name = "stratum")]
#[command(about = "Ordered, reversible migrations with pre/post deploy scopes")]
struct Cli {
    /// Project root to operate in
    #[arg(long, global = true, default_value = ".")]
    path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run once on a new project to install the default config and layout
    Init,

    /// Create a new migration unit and register it
    New {
        /// A name for the migration
        name: String,
    },

    /// List migration units found in the project
    List,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => commands::init::run(&cli.path).await?,
        Commands::New { name } => commands::new::run(&cli.path, &name).await?,
        Commands::List => commands::list::run(&cli.path).await?,
    }

    Ok(())
}
