// src/cli/mod.rs
// Command line interface for the telescope binary

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use telescope_client::config::ClientConfig;
use telescope_client::http::{HttpClient, Transport};
use telescope_client::services::AuthService;
use telescope_client::stores::AuthStore;

pub mod inspect;
pub mod users;

#[derive(Parser)]
#[command(name = "telescope")]
#[command(about = "Command line client for the Telescope log explorer")]
#[command(version)]
pub struct Cli {
    /// Backend base URL (overrides config file and TELESCOPE_URL)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Log in with this username before running the command
    #[arg(long, global = true, env = "TELESCOPE_USERNAME")]
    pub username: Option<String>,

    #[arg(long, global = true, env = "TELESCOPE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the user owning the session
    Whoami,

    /// Manage users
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },

    /// Reconcile explore page parameters and print the request projections
    Params {
        /// URL query string, e.g. 'limit=10&ctx_host=web-1'
        #[arg(index = 1, default_value = "")]
        query_string: String,

        /// Source definition (JSON)
        #[arg(long)]
        source: Option<PathBuf>,

        /// Saved view (JSON)
        #[arg(long)]
        view: Option<PathBuf>,
    },

    /// Extract highlight keywords and render a value with them marked
    Highlight {
        /// FlyQL query
        #[arg(long, default_value = "")]
        query: String,

        /// Raw query
        #[arg(long, default_value = "")]
        raw_query: String,

        /// Value to render; parsed as JSON when possible
        #[arg(index = 1)]
        value: Option<String>,
    },

    /// Resolve a client path and run the navigation guard
    Route {
        #[arg(index = 1)]
        path: String,

        /// Only resolve, skip the login check
        #[arg(long)]
        offline: bool,
    },
}

#[derive(Subcommand, Clone)]
pub enum UsersAction {
    /// List users
    List {
        /// Only usernames and names
        #[arg(long)]
        simple: bool,
    },

    /// Create a local user
    Create {
        #[arg(long = "new-username")]
        username: String,
        #[arg(long = "new-password")]
        password: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, default_value = "")]
        email: String,
    },

    /// Delete a user
    Delete {
        #[arg(index = 1)]
        id: i64,
    },

    /// Set a new password for a user
    ResetPassword {
        #[arg(index = 1)]
        id: i64,
        #[arg(long = "new-password")]
        password: String,
        /// Defaults to the new password
        #[arg(long)]
        confirm: Option<String>,
    },
}

/// Shared transport for one command run
pub struct Session {
    pub transport: Arc<dyn Transport>,
}

impl Session {
    /// Build the transport and log in when credentials were given
    pub async fn open(cli: &Cli) -> Result<Self> {
        let mut config = ClientConfig::load();
        if let Some(url) = &cli.url {
            config.base_url = url.clone();
        }

        let validation = config.validate();
        for warning in &validation.warnings {
            warn!("{}", warning);
        }
        if !validation.is_valid() {
            bail!("{}", validation.report());
        }

        let transport: Arc<dyn Transport> = Arc::new(HttpClient::new(&config)?);
        let session = Self { transport };

        if let (Some(username), Some(password)) = (&cli.username, &cli.password) {
            let mut auth = session.auth_store();
            if let Some(error) = auth.submit_login(username, password).await {
                bail!("login failed: {}", error);
            }
            info!(username = %username, "Session opened");
        }

        Ok(session)
    }

    pub fn auth_store(&self) -> AuthStore {
        AuthStore::new(AuthService::new(self.transport.clone()))
    }
}

/// Print a serializable value as pretty JSON
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run_whoami(session: &Session) -> Result<()> {
    let mut auth = session.auth_store();
    if let Some(error) = auth.login().await {
        bail!("not logged in: {}", error);
    }
    match &auth.user {
        Some(user) => print_json(user),
        None => bail!("backend returned no user"),
    }
}
