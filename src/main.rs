// src/main.rs
// telescope - command line client for the Telescope log explorer

mod cli;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands, Session};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env files (global first, then project - project overrides)
    if let Some(home) = dirs::home_dir() {
        let _ = dotenvy::from_path(home.join(".telescope/.env"));
    }
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "telescope_client=debug,telescope=debug"
    } else {
        "telescope_client=warn,telescope=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match &cli.command {
        Commands::Whoami => {
            let session = Session::open(&cli).await?;
            cli::run_whoami(&session).await?;
        }
        Commands::Users { action } => {
            let session = Session::open(&cli).await?;
            cli::users::run(&session, action.clone()).await?;
        }
        Commands::Params {
            query_string,
            source,
            view,
        } => {
            cli::inspect::run_params(query_string, source.as_deref(), view.as_deref())?;
        }
        Commands::Highlight {
            query,
            raw_query,
            value,
        } => {
            cli::inspect::run_highlight(query, raw_query, value.as_deref())?;
        }
        Commands::Route { path, offline } => {
            cli::inspect::run_route(&cli, path, *offline).await?;
        }
    }

    Ok(())
}
